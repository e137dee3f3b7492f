use evm_progen_interface::{CatalogError, OpcodeClass};

/// Rejected generator configuration. Detected before any byte is emitted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Push width outside `1..=32`.
    #[error("push width {0} is outside 1..=32")]
    PushWidth(u8),
    /// The dominant token is not a member of the selectable population.
    #[error("dominant {0} is not a member of the selectable population")]
    DominantOutsidePopulation(OpcodeClass),
    /// The dominant token could not be parsed.
    #[error("unknown dominant opcode or class `{0}`")]
    UnknownDominant(String),
    /// A limit was configured as zero.
    #[error("the {0} limit must be positive")]
    ZeroLimit(&'static str),
    /// Randomizing the operation limit needs an upper bound.
    #[error("a randomized operation limit needs an operation limit to draw from")]
    RandomizedLimitWithoutOps,
    /// The warm-up push is only consumed when values are carried between opcodes.
    #[error("the warm-up push requires the carry stack discipline")]
    WarmUpWithoutCarry,
    /// Unknown flavor name.
    #[error("unknown flavor `{0}`")]
    UnknownFlavor(String),
    /// The catalog could not be built.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// The stack discipline and an opcode family do not fit together.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvariantViolation {
    /// A memory opcode was selected while values are carried between opcodes.
    #[error("{mnemonic} requires the clean stack discipline")]
    MemoryAccessUnderCarry {
        /// Offending opcode.
        mnemonic: &'static str,
    },
    /// The population resolved to an opcode the catalog does not know.
    #[error("opcode {0:#04x} is missing from the catalog")]
    UnknownOpcode(u8),
}

/// Any failure while generating a program or a batch. None of them is retryable: generation
/// is deterministic and fails the same way on the same inputs.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// See [`ConfigurationError`].
    #[error("invalid configuration: {0}")]
    Configuration(#[from] ConfigurationError),
    /// See [`InvariantViolation`].
    #[error("invariant violated: {0}")]
    InvariantViolation(#[from] InvariantViolation),
}

impl From<CatalogError> for GenerationError {
    fn from(error: CatalogError) -> Self {
        Self::Configuration(error.into())
    }
}
