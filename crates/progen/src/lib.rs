//! # Random EVM program synthesizer
//!
//! Generates batches of syntactically valid, stack-safe EVM bytecode for benchmarking and
//! differential fuzzing. Every program is a straight line of opcodes drawn from a population,
//! each preceded by the operand pushes it needs. Operand values are random but bounded where an
//! unbounded value would make execution meaningless (memory offsets, shift amounts, exponents).
//!
//! Generation is deterministic: the same catalog, configuration and seed always produce the
//! same batch.
//!
//! ```
//! use evm_progen::{generate, Flavor, GenerationLimits};
//! use evm_progen_interface::BytecodeTemplates;
//!
//! let flavor = Flavor::ArithmeticV1;
//! let catalog = flavor.catalog().unwrap();
//! let config = evm_progen::GeneratorConfig {
//!     limits: GenerationLimits::gas(100),
//!     ..flavor.config()
//! };
//!
//! let programs = generate(&catalog, &BytecodeTemplates::evm(), config, 3, 123_123_123).unwrap();
//! assert_eq!(programs.len(), 3);
//! assert!(programs.iter().all(|program| program.to_hex().starts_with("7f")));
//! ```

pub use self::{
    config::{Dominant, Flavor, GenerationLimits, GeneratorConfig, Preamble, PushPolicy},
    driver::{generate, ProgramBatchDriver},
    error::{ConfigurationError, GenerationError, InvariantViolation},
    output::{write_programs, OutputError, OutputMode},
    resolver::OpClassResolver,
    stack::{StackDiscipline, StackState},
    synthesizer::{InstructionSynthesizer, Program, ProgramSettings, ResourceUsage},
};

mod assembler;
mod config;
pub mod decode;
mod driver;
mod error;
mod output;
mod resolver;
mod stack;
mod synthesizer;
#[cfg(test)]
mod tests;
