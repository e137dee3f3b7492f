//! Walking generated bytecode instruction by instruction.

use std::iter::FusedIterator;

use evm_progen_interface::{opcodes, OpcodeCatalog};

use crate::{error::InvariantViolation, synthesizer::ResourceUsage};

/// One decoded instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction<'a> {
    /// Byte offset of the opcode.
    pub offset: usize,
    /// Opcode byte.
    pub opcode: u8,
    /// Immediate bytes; shorter than declared if the bytecode ends early.
    pub immediate: &'a [u8],
}

/// Iterator over the instructions of a bytecode. See [`instructions`].
#[derive(Debug, Clone)]
pub struct Instructions<'a> {
    bytecode: &'a [u8],
    offset: usize,
}

/// Iterates over `bytecode`, skipping `PUSHn` immediates.
pub fn instructions(bytecode: &[u8]) -> Instructions<'_> {
    Instructions {
        bytecode,
        offset: 0,
    }
}

impl<'a> Iterator for Instructions<'a> {
    type Item = Instruction<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.offset;
        let opcode = *self.bytecode.get(offset)?;
        let width = opcodes::push_width(opcode).map_or(0, usize::from);
        let end = (offset + 1 + width).min(self.bytecode.len());
        self.offset = offset + 1 + width;
        Some(Instruction {
            offset,
            opcode,
            immediate: &self.bytecode[offset + 1..end],
        })
    }
}

impl FusedIterator for Instructions<'_> {}

/// Instruction count and static gas of `bytecode` according to `catalog`.
///
/// # Errors
///
/// Fails on an opcode the catalog does not know.
pub fn cost(catalog: &OpcodeCatalog, bytecode: &[u8]) -> Result<ResourceUsage, InvariantViolation> {
    let mut usage = ResourceUsage::default();
    for instruction in instructions(bytecode) {
        let spec = catalog
            .get(instruction.opcode)
            .ok_or(InvariantViolation::UnknownOpcode(instruction.opcode))?;
        usage.record(spec);
    }
    Ok(usage)
}

/// Virtual stack depth observed while replaying a bytecode linearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackReplay {
    /// Lowest depth seen right before an instruction pops its inputs, minus those inputs.
    /// Negative means an instruction would underflow.
    pub min_depth: i64,
    /// Depth after the last instruction.
    pub final_depth: i64,
    /// Number of instructions replayed.
    pub instructions: usize,
}

/// Replays the declared arity of every instruction, ignoring control flow.
///
/// Generated jumps always land on the instruction right after them, so a linear replay
/// matches the executed path.
///
/// # Errors
///
/// Fails on an opcode the catalog does not know.
pub fn replay_stack(
    catalog: &OpcodeCatalog,
    bytecode: &[u8],
) -> Result<StackReplay, InvariantViolation> {
    let mut depth = 0_i64;
    let mut replay = StackReplay {
        min_depth: 0,
        final_depth: 0,
        instructions: 0,
    };
    for instruction in instructions(bytecode) {
        let spec = catalog
            .get(instruction.opcode)
            .ok_or(InvariantViolation::UnknownOpcode(instruction.opcode))?;
        depth -= i64::from(spec.removed);
        replay.min_depth = replay.min_depth.min(depth);
        depth += i64::from(spec.added);
        replay.instructions += 1;
    }
    replay.final_depth = depth;
    Ok(replay)
}
