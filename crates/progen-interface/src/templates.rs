use crate::opcodes;

/// Fixed byte sequences spliced into generated programs.
///
/// The synthesizer treats them as opaque; their cost is obtained by decoding them against
/// the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BytecodeTemplates {
    memory_preamble: Vec<u8>,
    landing_marker: u8,
    terminal: Vec<u8>,
}

impl Default for BytecodeTemplates {
    fn default() -> Self {
        Self::evm()
    }
}

impl BytecodeTemplates {
    /// Highest memory offset the preamble touches; bounded memory operands stay below it.
    pub const PREALLOCATED_MEMORY: u32 = 1 << 14;

    /// Creates templates from raw parts.
    pub fn new(memory_preamble: Vec<u8>, landing_marker: u8, terminal: Vec<u8>) -> Self {
        Self {
            memory_preamble,
            landing_marker,
            terminal,
        }
    }

    /// EVM templates: `PUSH1 0 PUSH2 0x3fe0 MSTORE`, `JUMPDEST` landings and a `STOP` marker.
    pub fn evm() -> Self {
        let [high, low] = u16::try_from(Self::PREALLOCATED_MEMORY - 32)
            .unwrap_or(u16::MAX)
            .to_be_bytes();
        Self::new(
            vec![
                opcodes::PUSH1,
                0x00,
                opcodes::push(2),
                high,
                low,
                opcodes::MSTORE,
            ],
            opcodes::JUMPDEST,
            vec![opcodes::STOP],
        )
    }

    /// Bytes that grow memory to its final size before the generated part runs.
    pub fn memory_preamble(&self) -> &[u8] {
        &self.memory_preamble
    }

    /// Bytes appended after the generated part.
    pub fn terminal(&self) -> &[u8] {
        &self.terminal
    }

    /// Builds `PUSHn <dest> <jump> <landing>` for a pattern starting at byte `offset`,
    /// where `<dest>` is the offset of the landing marker.
    ///
    /// The destination is pushed with `PUSH2` while it fits into 16 bits and with `PUSH4` after that.
    pub fn jump_pattern(&self, jump: u8, offset: usize) -> Vec<u8> {
        let width: usize = if offset + 4 <= usize::from(u16::MAX) {
            2
        } else {
            4
        };
        let destination = offset + width + 2;
        let destination = u32::try_from(destination)
            .unwrap_or(u32::MAX)
            .to_be_bytes();

        let mut pattern = Vec::with_capacity(width + 3);
        pattern.push(if width == 2 {
            opcodes::push(2)
        } else {
            opcodes::push(4)
        });
        pattern.extend_from_slice(&destination[4 - width..]);
        pattern.push(jump);
        pattern.push(self.landing_marker);
        pattern
    }
}
