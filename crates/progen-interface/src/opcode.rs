use std::{fmt, ops::RangeInclusive};

use crate::opcodes;

/// How the synthesizer fills in the stack inputs of an opcode.
///
/// Assigned once per opcode when the catalog is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum OperandStrategy {
    /// Takes no stack inputs.
    Nullary,
    /// Every input is an unconstrained value of the configured push width.
    Unconstrained,
    /// `EXP`: a full-width base, an exponent below 256 and a `SWAP1` so the exponent ends up second.
    Exponent,
    /// `BYTE`, `SIGNEXTEND`: one unconstrained value plus a byte index in `0..=31` on top.
    ByteIndex,
    /// `SHL`, `SHR`, `SAR`: one unconstrained value plus a shift amount in `0..=255` on top.
    Shift,
    /// Memory and calldata reads; every input is an offset or length below 16 KiB.
    MemoryRead,
    /// `MSTORE`, `MSTORE8`: an unconstrained value, then an offset below 16 KiB.
    MemoryWrite,
    /// `JUMP`, `JUMPI`: the destination comes from the jump landing template.
    Jump,
}

impl OperandStrategy {
    /// Classifies a concrete opcode.
    pub fn classify(opcode: u8, removed: u8) -> Self {
        match opcode {
            opcodes::EXP => Self::Exponent,
            opcodes::BYTE | opcodes::SIGNEXTEND => Self::ByteIndex,
            opcodes::SHL | opcodes::SHR | opcodes::SAR => Self::Shift,
            opcodes::CALLDATALOAD
            | opcodes::CALLDATASIZE
            | opcodes::CALLDATACOPY
            | opcodes::CODECOPY
            | opcodes::MLOAD => Self::MemoryRead,
            opcodes::MSTORE | opcodes::MSTORE8 => Self::MemoryWrite,
            opcodes::JUMP | opcodes::JUMPI => Self::Jump,
            _ if removed == 0 => Self::Nullary,
            _ => Self::Unconstrained,
        }
    }

    /// Returns `true` for strategies whose operands are only safe on a freshly cleaned stack.
    pub fn needs_clean_stack(self) -> bool {
        matches!(self, Self::MemoryRead | Self::MemoryWrite)
    }
}

/// Static description of one concrete opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpcodeSpec {
    /// Opcode byte.
    pub opcode: u8,
    /// Human-readable name, e.g. `ADDMOD`.
    pub mnemonic: &'static str,
    /// Number of stack values consumed.
    pub removed: u8,
    /// Number of stack values produced.
    pub added: u8,
    /// Static gas cost.
    pub gas: u32,
    /// Number of immediate bytes following the opcode.
    pub immediate: u8,
    /// Operand synthesis strategy.
    pub strategy: OperandStrategy,
}

impl OpcodeSpec {
    /// Creates a spec and classifies its operand strategy.
    pub fn new(
        opcode: u8,
        mnemonic: &'static str,
        removed: u8,
        added: u8,
        gas: u32,
        immediate: u8,
    ) -> Self {
        Self {
            opcode,
            mnemonic,
            removed,
            added,
            gas,
            immediate,
            strategy: OperandStrategy::classify(opcode, removed),
        }
    }

    /// Number of stack inputs the synthesizer has to provide.
    ///
    /// Jumps get their destination from the landing template, so it is not counted.
    pub fn operand_arity(&self) -> u8 {
        match self.strategy {
            OperandStrategy::Jump => self.removed.saturating_sub(1),
            _ => self.removed,
        }
    }
}

/// A selectable element of the opcode population.
///
/// The family variants stand for all of their members and are resolved to a concrete opcode
/// every time they are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum OpcodeClass {
    /// A single opcode.
    Concrete(u8),
    /// `PUSH1..=PUSH32`.
    Push,
    /// `DUP1..=DUP16`.
    Dup,
    /// `SWAP1..=SWAP16`.
    Swap,
}

impl OpcodeClass {
    /// Members of a family, or `None` for a concrete opcode.
    pub fn family(self) -> Option<RangeInclusive<u8>> {
        match self {
            Self::Concrete(_) => None,
            Self::Push => Some(opcodes::PUSH1..=opcodes::PUSH32),
            Self::Dup => Some(opcodes::DUP1..=opcodes::DUP16),
            Self::Swap => Some(opcodes::SWAP1..=opcodes::SWAP16),
        }
    }

    /// Concrete opcodes this class stands for.
    pub fn members(self) -> RangeInclusive<u8> {
        match self {
            Self::Concrete(opcode) => opcode..=opcode,
            family => family.family().unwrap_or(0..=0),
        }
    }

    /// Parses a family name (`PUSH`, `DUP`, `SWAP`, optionally suffixed with `class`).
    pub fn parse_family(name: &str) -> Option<Self> {
        let name = name.strip_suffix("class").unwrap_or(name);
        if name.eq_ignore_ascii_case("PUSH") {
            Some(Self::Push)
        } else if name.eq_ignore_ascii_case("DUP") {
            Some(Self::Dup)
        } else if name.eq_ignore_ascii_case("SWAP") {
            Some(Self::Swap)
        } else {
            None
        }
    }
}

impl fmt::Display for OpcodeClass {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Concrete(opcode) => write!(formatter, "{opcode:#04x}"),
            Self::Push => formatter.write_str("PUSH"),
            Self::Dup => formatter.write_str("DUP"),
            Self::Swap => formatter.write_str("SWAP"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classification() {
        assert_eq!(OperandStrategy::classify(opcodes::ADD, 2), OperandStrategy::Unconstrained);
        assert_eq!(OperandStrategy::classify(opcodes::EXP, 2), OperandStrategy::Exponent);
        assert_eq!(OperandStrategy::classify(opcodes::SAR, 2), OperandStrategy::Shift);
        assert_eq!(OperandStrategy::classify(opcodes::GAS, 0), OperandStrategy::Nullary);
        assert_eq!(OperandStrategy::classify(opcodes::CALLDATASIZE, 0), OperandStrategy::MemoryRead);
        assert!(OperandStrategy::MemoryWrite.needs_clean_stack());
        assert!(!OperandStrategy::Jump.needs_clean_stack());
    }

    #[test]
    fn jumps_do_not_synthesize_their_destination() {
        let jumpi = OpcodeSpec::new(opcodes::JUMPI, "JUMPI", 2, 0, 10, 0);
        assert_eq!(jumpi.operand_arity(), 1);
        let jump = OpcodeSpec::new(opcodes::JUMP, "JUMP", 1, 0, 8, 0);
        assert_eq!(jump.operand_arity(), 0);
    }

    #[test]
    fn families() {
        assert_eq!(OpcodeClass::Push.family().map(Iterator::count), Some(32));
        assert_eq!(OpcodeClass::Dup.family().map(Iterator::count), Some(16));
        assert_eq!(OpcodeClass::Swap.family().map(Iterator::count), Some(16));
        assert_eq!(OpcodeClass::Concrete(opcodes::ADD).family(), None);
        assert_eq!(OpcodeClass::parse_family("SWAPclass"), Some(OpcodeClass::Swap));
        assert_eq!(OpcodeClass::parse_family("dup"), Some(OpcodeClass::Dup));
        assert_eq!(OpcodeClass::parse_family("ADD"), None);
    }
}
