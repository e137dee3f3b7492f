use std::{fmt, str::FromStr};

use evm_progen_interface::{opcodes, CatalogError, OpcodeCatalog, OpcodeClass};
use rand::Rng;

use crate::{
    error::{ConfigurationError, GenerationError, InvariantViolation},
    stack::StackDiscipline,
    synthesizer::ResourceUsage,
};

/// Width of the unconstrained values pushed as operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum PushPolicy {
    /// Every operand is pushed with `PUSHn` for this `n`.
    Fixed(u8),
    /// Each operand draws its width uniformly from `1..=max`.
    Randomized {
        /// Largest width drawn.
        max: u8,
    },
}

impl Default for PushPolicy {
    fn default() -> Self {
        Self::Fixed(32)
    }
}

impl PushPolicy {
    /// Fixed width, or widths drawn up to `width` when `randomize` is set.
    pub fn new(width: u8, randomize: bool) -> Self {
        if randomize {
            Self::Randomized { max: width }
        } else {
            Self::Fixed(width)
        }
    }

    /// Largest width this policy can produce.
    pub fn max_width(self) -> u8 {
        match self {
            Self::Fixed(width) | Self::Randomized { max: width } => width,
        }
    }

    pub(crate) fn validate(self) -> Result<(), ConfigurationError> {
        let width = self.max_width();
        if (1..=32).contains(&width) {
            Ok(())
        } else {
            Err(ConfigurationError::PushWidth(width))
        }
    }

    pub(crate) fn draw<R: Rng + ?Sized>(self, rng: &mut R) -> u8 {
        match self {
            Self::Fixed(width) => width,
            Self::Randomized { max } => rng.gen_range(1..=max),
        }
    }
}

/// What is emitted before the generated part of a program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Preamble {
    /// Nothing.
    None,
    /// One push of the policy's maximal width, carried into the first opcode. Only valid under
    /// [`StackDiscipline::Carry`].
    WarmUpPush,
    /// The memory preallocation template followed by one mandatory `JUMP` landing pattern.
    MemoryAndJump,
}

/// Soft resource bounds, checked before each generation step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GenerationLimits {
    /// Static gas.
    pub gas: Option<u64>,
    /// Emitted instructions, operand pushes and pops included.
    pub ops: Option<u64>,
    /// Bytecode length in bytes.
    pub bytes: Option<u64>,
}

impl GenerationLimits {
    /// Operation limit applied when no limit is configured at all.
    pub const DEFAULT_OPS: u64 = 100;

    /// Limits with only an operation bound.
    pub fn ops(ops: u64) -> Self {
        Self {
            ops: Some(ops),
            ..Self::default()
        }
    }

    /// Limits with only a gas bound.
    pub fn gas(gas: u64) -> Self {
        Self {
            gas: Some(gas),
            ..Self::default()
        }
    }

    /// Limits with only a bytecode length bound.
    pub fn bytes(bytes: u64) -> Self {
        Self {
            bytes: Some(bytes),
            ..Self::default()
        }
    }

    /// Applies [`Self::DEFAULT_OPS`] if nothing is configured.
    #[must_use]
    pub fn effective(self) -> Self {
        if self.gas.is_none() && self.ops.is_none() && self.bytes.is_none() {
            Self::ops(Self::DEFAULT_OPS)
        } else {
            self
        }
    }

    fn validate(self) -> Result<(), ConfigurationError> {
        for (name, limit) in [("gas", self.gas), ("operation", self.ops), ("bytecode", self.bytes)] {
            if limit == Some(0) {
                return Err(ConfigurationError::ZeroLimit(name));
            }
        }
        Ok(())
    }

    /// Returns `true` once any configured bound has been reached.
    pub(crate) fn exhausted(&self, usage: &ResourceUsage, bytecode_len: usize) -> bool {
        let reached = |limit: Option<u64>, used: u64| limit.is_some_and(|limit| used >= limit);
        reached(self.gas, usage.gas)
            || reached(self.ops, usage.ops)
            || reached(self.bytes, bytecode_len as u64)
    }
}

/// Opcode or class selected with elevated probability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Dominant {
    /// Uniform selection only.
    #[default]
    None,
    /// Picked with probability 1/2 on every draw; a class is re-resolved every time.
    Fixed(OpcodeClass),
    /// One population member drawn per program, resolved to a concrete opcode and kept for
    /// the whole program.
    RandomPerProgram,
}

impl Dominant {
    /// Parses `random`, a class name (`PUSH`, `DUPclass`, ...), a mnemonic or a hex byte.
    ///
    /// # Errors
    ///
    /// Fails if the token names nothing in the catalog. Population membership is checked by
    /// [`GeneratorConfig::validate`].
    pub fn parse(token: &str, catalog: &OpcodeCatalog) -> Result<Self, ConfigurationError> {
        if token.eq_ignore_ascii_case("random") {
            return Ok(Self::RandomPerProgram);
        }
        if let Some(class) = OpcodeClass::parse_family(token) {
            return Ok(Self::Fixed(class));
        }
        let opcode = match token.strip_prefix("0x") {
            Some(hex) => u8::from_str_radix(hex, 16).ok(),
            None => catalog.find(token).map(|spec| spec.opcode),
        };
        opcode
            .filter(|&opcode| catalog.get(opcode).is_some())
            .map(|opcode| Self::Fixed(OpcodeClass::Concrete(opcode)))
            .ok_or_else(|| ConfigurationError::UnknownDominant(token.to_owned()))
    }
}

/// Preset combinations of population, preamble, termination and defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Flavor {
    /// Arithmetic opcodes only, values carried between opcodes, bounded by gas.
    ArithmeticV1,
    /// Every supported opcode family, clean stack, memory preamble and terminal marker.
    Validation,
}

impl Flavor {
    /// All flavors.
    pub const ALL: [Self; 2] = [Self::ArithmeticV1, Self::Validation];

    /// Gas limit of [`Self::ArithmeticV1`] when none is given.
    pub const ARITHMETIC_GAS: u64 = 10_000;

    /// CLI name of the flavor.
    pub fn name(self) -> &'static str {
        match self {
            Self::ArithmeticV1 => "arithmetic-v1",
            Self::Validation => "validation",
        }
    }

    /// Selectable population of the flavor.
    pub fn population(self) -> Vec<OpcodeClass> {
        let concrete: &[u8] = match self {
            Self::ArithmeticV1 => &ARITHMETIC,
            Self::Validation => &VALIDATION,
        };
        let mut population: Vec<_> = concrete.iter().copied().map(OpcodeClass::Concrete).collect();
        if self == Self::Validation {
            // Classes are drawn as often as any single opcode; their variants are drawn afterwards.
            population.extend([OpcodeClass::Push, OpcodeClass::Dup, OpcodeClass::Swap]);
        }
        population
    }

    /// Built-in EVM catalog restricted to this flavor's population.
    ///
    /// # Errors
    ///
    /// Never fails for the built-in table; the error is kept for custom tables.
    pub fn catalog(self) -> Result<OpcodeCatalog, CatalogError> {
        OpcodeCatalog::builder().population(self.population()).build()
    }

    /// Default configuration of the flavor.
    pub fn config(self) -> GeneratorConfig {
        match self {
            Self::ArithmeticV1 => GeneratorConfig {
                limits: GenerationLimits::gas(Self::ARITHMETIC_GAS),
                discipline: StackDiscipline::Carry,
                preamble: Preamble::WarmUpPush,
                terminate: false,
                ..GeneratorConfig::default()
            },
            Self::Validation => GeneratorConfig {
                limits: GenerationLimits::default(),
                discipline: StackDiscipline::Clean,
                preamble: Preamble::MemoryAndJump,
                terminate: true,
                ..GeneratorConfig::default()
            },
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.name())
    }
}

impl FromStr for Flavor {
    type Err = ConfigurationError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|flavor| flavor.name() == name)
            .ok_or_else(|| ConfigurationError::UnknownFlavor(name.to_owned()))
    }
}

const ARITHMETIC: [u8; 9] = [
    opcodes::ADD,
    opcodes::MUL,
    opcodes::SUB,
    opcodes::DIV,
    opcodes::SDIV,
    opcodes::MOD,
    opcodes::SMOD,
    opcodes::ADDMOD,
    opcodes::MULMOD,
];

const VALIDATION: [u8; 53] = [
    // arithmetic
    opcodes::ADD,
    opcodes::MUL,
    opcodes::SUB,
    opcodes::DIV,
    opcodes::SDIV,
    opcodes::MOD,
    opcodes::SMOD,
    opcodes::ADDMOD,
    opcodes::MULMOD,
    opcodes::EXP,
    // bitwise
    opcodes::AND,
    opcodes::OR,
    opcodes::XOR,
    opcodes::NOT,
    opcodes::BYTE,
    opcodes::SIGNEXTEND,
    opcodes::SHL,
    opcodes::SHR,
    opcodes::SAR,
    // comparison
    opcodes::LT,
    opcodes::GT,
    opcodes::SLT,
    opcodes::SGT,
    opcodes::EQ,
    opcodes::ISZERO,
    // environment
    opcodes::ADDRESS,
    opcodes::ORIGIN,
    opcodes::CALLER,
    opcodes::CALLVALUE,
    opcodes::CODESIZE,
    opcodes::GASPRICE,
    opcodes::COINBASE,
    opcodes::TIMESTAMP,
    opcodes::NUMBER,
    opcodes::DIFFICULTY,
    opcodes::GASLIMIT,
    opcodes::CHAINID,
    opcodes::SELFBALANCE,
    opcodes::PC,
    opcodes::MSIZE,
    opcodes::GAS,
    // stack and control flow
    opcodes::POP,
    opcodes::JUMPDEST,
    // memory, calldata and jumps
    opcodes::CALLDATALOAD,
    opcodes::CALLDATASIZE,
    opcodes::CALLDATACOPY,
    opcodes::CODECOPY,
    opcodes::MLOAD,
    opcodes::JUMP,
    opcodes::JUMPI,
    opcodes::MSTORE,
    opcodes::MSTORE8,
    opcodes::RETURNDATASIZE,
];

/// Everything the generator needs besides the catalog and the random stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Soft bounds for each program.
    pub limits: GenerationLimits,
    /// Dominant opcode or class.
    pub dominant: Dominant,
    /// Operand push width.
    pub push: PushPolicy,
    /// Stack bookkeeping.
    pub discipline: StackDiscipline,
    /// What precedes the generated part.
    pub preamble: Preamble,
    /// Whether the terminal marker is appended.
    pub terminate: bool,
    /// Draw each program's operation limit from `1..=ops`.
    pub randomize_ops_limit: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            limits: GenerationLimits::default(),
            dominant: Dominant::None,
            push: PushPolicy::default(),
            discipline: StackDiscipline::Clean,
            preamble: Preamble::None,
            terminate: false,
            randomize_ops_limit: false,
        }
    }
}

impl GeneratorConfig {
    /// Checks the configuration against `catalog`.
    ///
    /// # Errors
    ///
    /// - [`ConfigurationError`] for a push width outside `1..=32`, a zero limit, a randomized
    ///   operation limit without an operation bound, a warm-up push without the carry
    ///   discipline, or a dominant outside the population.
    /// - [`InvariantViolation`] if the carry discipline could select a memory opcode.
    pub fn validate(&self, catalog: &OpcodeCatalog) -> Result<(), GenerationError> {
        self.push.validate()?;
        self.limits.validate()?;
        if self.randomize_ops_limit && self.limits.effective().ops.is_none() {
            return Err(ConfigurationError::RandomizedLimitWithoutOps.into());
        }
        if self.preamble == Preamble::WarmUpPush && self.discipline != StackDiscipline::Carry {
            return Err(ConfigurationError::WarmUpWithoutCarry.into());
        }
        if let Dominant::Fixed(class) = self.dominant {
            if !catalog.contains(class) {
                return Err(ConfigurationError::DominantOutsidePopulation(class).into());
            }
        }
        if self.discipline == StackDiscipline::Carry {
            if let Some(spec) = catalog
                .reachable()
                .find(|spec| spec.strategy.needs_clean_stack())
            {
                return Err(InvariantViolation::MemoryAccessUnderCarry {
                    mnemonic: spec.mnemonic,
                }
                .into());
            }
        }
        Ok(())
    }
}
