//! Byte values of the EVM opcodes known to the built-in catalog.

macro_rules! forall_fixed_opcodes {
    ($m:ident) => {
        $m!(STOP, 0x00, 0, 0, 0);
        $m!(ADD, 0x01, 2, 1, 3);
        $m!(MUL, 0x02, 2, 1, 5);
        $m!(SUB, 0x03, 2, 1, 3);
        $m!(DIV, 0x04, 2, 1, 5);
        $m!(SDIV, 0x05, 2, 1, 5);
        $m!(MOD, 0x06, 2, 1, 5);
        $m!(SMOD, 0x07, 2, 1, 5);
        $m!(ADDMOD, 0x08, 3, 1, 8);
        $m!(MULMOD, 0x09, 3, 1, 8);
        $m!(EXP, 0x0a, 2, 1, 10);
        $m!(SIGNEXTEND, 0x0b, 2, 1, 5);
        $m!(LT, 0x10, 2, 1, 3);
        $m!(GT, 0x11, 2, 1, 3);
        $m!(SLT, 0x12, 2, 1, 3);
        $m!(SGT, 0x13, 2, 1, 3);
        $m!(EQ, 0x14, 2, 1, 3);
        $m!(ISZERO, 0x15, 1, 1, 3);
        $m!(AND, 0x16, 2, 1, 3);
        $m!(OR, 0x17, 2, 1, 3);
        $m!(XOR, 0x18, 2, 1, 3);
        $m!(NOT, 0x19, 1, 1, 3);
        $m!(BYTE, 0x1a, 2, 1, 3);
        $m!(SHL, 0x1b, 2, 1, 3);
        $m!(SHR, 0x1c, 2, 1, 3);
        $m!(SAR, 0x1d, 2, 1, 3);
        $m!(ADDRESS, 0x30, 0, 1, 2);
        $m!(ORIGIN, 0x32, 0, 1, 2);
        $m!(CALLER, 0x33, 0, 1, 2);
        $m!(CALLVALUE, 0x34, 0, 1, 2);
        $m!(CALLDATALOAD, 0x35, 1, 1, 3);
        $m!(CALLDATASIZE, 0x36, 0, 1, 2);
        $m!(CALLDATACOPY, 0x37, 3, 0, 3);
        $m!(CODESIZE, 0x38, 0, 1, 2);
        $m!(CODECOPY, 0x39, 3, 0, 3);
        $m!(GASPRICE, 0x3a, 0, 1, 2);
        $m!(RETURNDATASIZE, 0x3d, 0, 1, 2);
        $m!(COINBASE, 0x41, 0, 1, 2);
        $m!(TIMESTAMP, 0x42, 0, 1, 2);
        $m!(NUMBER, 0x43, 0, 1, 2);
        $m!(DIFFICULTY, 0x44, 0, 1, 2);
        $m!(GASLIMIT, 0x45, 0, 1, 2);
        $m!(CHAINID, 0x46, 0, 1, 2);
        $m!(SELFBALANCE, 0x47, 0, 1, 5);
        $m!(POP, 0x50, 1, 0, 2);
        $m!(MLOAD, 0x51, 1, 1, 3);
        $m!(MSTORE, 0x52, 2, 0, 3);
        $m!(MSTORE8, 0x53, 2, 0, 3);
        $m!(JUMP, 0x56, 1, 0, 8);
        $m!(JUMPI, 0x57, 2, 0, 10);
        $m!(PC, 0x58, 0, 1, 2);
        $m!(MSIZE, 0x59, 0, 1, 2);
        $m!(GAS, 0x5a, 0, 1, 2);
        $m!(JUMPDEST, 0x5b, 0, 0, 1);
        $m!(INVALID, 0xfe, 0, 0, 0);
    };
}

pub(crate) use forall_fixed_opcodes;

macro_rules! opcode_const {
    ($name:ident, $byte:literal, $removed:literal, $added:literal, $gas:literal) => {
        #[doc = concat!("`", stringify!($name), "` opcode.")]
        pub const $name: u8 = $byte;
    };
}

forall_fixed_opcodes!(opcode_const);

/// `PUSH1`; `PUSHn` is `PUSH1 + n - 1`.
pub const PUSH1: u8 = 0x60;
/// `PUSH32`.
pub const PUSH32: u8 = 0x7f;
/// `DUP1`; `DUPn` is `DUP1 + n - 1`.
pub const DUP1: u8 = 0x80;
/// `DUP16`.
pub const DUP16: u8 = 0x8f;
/// `SWAP1`; `SWAPn` is `SWAP1 + n - 1`.
pub const SWAP1: u8 = 0x90;
/// `SWAP16`.
pub const SWAP16: u8 = 0x9f;

/// Static gas cost shared by every `PUSHn`, `DUPn` and `SWAPn`.
pub const VERY_LOW_GAS: u32 = 3;

/// Returns the `PUSHn` opcode pushing `width` immediate bytes.
///
/// # Panics
///
/// Panics if `width` is not in `1..=32`.
pub const fn push(width: u8) -> u8 {
    assert!(width >= 1 && width <= 32, "push width must be in 1..=32");
    PUSH1 + width - 1
}

/// Returns the immediate width of a `PUSHn` opcode, or `None` for any other byte.
pub const fn push_width(opcode: u8) -> Option<u8> {
    if opcode >= PUSH1 && opcode <= PUSH32 {
        Some(opcode - PUSH1 + 1)
    } else {
        None
    }
}
