use evm_progen_interface::opcodes;
use primitive_types::U256;

/// Append-only bytecode buffer.
///
/// Pushes are written as `PUSHn` followed by exactly `n` big-endian bytes, so the first value
/// pushed ends up deepest on the stack. The assembler never draws randomness itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct BytecodeAssembler {
    bytes: Vec<u8>,
}

impl BytecodeAssembler {
    /// Empty buffer.
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Current length in bytes, which is also the offset of the next byte.
    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Appends a single opcode byte.
    pub(crate) fn opcode(&mut self, opcode: u8) {
        self.bytes.push(opcode);
    }

    /// Appends `PUSH<width>` and `value`, left-padded with zeroes to `width` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `width` is not in `1..=32`. Debug builds also check that `value` fits.
    pub(crate) fn push(&mut self, width: u8, value: U256) {
        debug_assert!(
            value.bits() <= usize::from(width) * 8,
            "{value:#x} does not fit into {width} bytes"
        );
        self.bytes.push(opcodes::push(width));
        self.immediate(width, value);
    }

    /// Appends `value` as a `width`-byte big-endian immediate without an opcode.
    pub(crate) fn immediate(&mut self, width: u8, value: U256) {
        let mut word = [0_u8; 32];
        value.to_big_endian(&mut word);
        self.bytes.extend_from_slice(&word[32 - usize::from(width)..]);
    }

    /// Appends raw template bytes.
    pub(crate) fn raw(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Consumes the assembler.
    pub(crate) fn finish(self) -> Vec<u8> {
        self.bytes
    }
}
