//! # EVM program synthesizer interface
//!
//! This crate holds the data the synthesizer consumes but never produces: the opcode
//! catalog (byte, mnemonic, stack arity, gas, immediate size) and the fixed byte templates
//! spliced into generated programs (memory preallocation, jump landing, terminal marker).
//!
//! The catalog is built once and is immutable afterwards. Every concrete opcode carries an
//! [`OperandStrategy`] that is assigned while the catalog is built, so the generation loop
//! dispatches on a single precomputed value instead of testing family membership per draw.
//!
//! ```
//! use evm_progen_interface::{opcodes, OpcodeCatalog, OpcodeClass, OperandStrategy};
//!
//! let catalog = OpcodeCatalog::builder()
//!     .population([OpcodeClass::Concrete(opcodes::ADD), OpcodeClass::Push])
//!     .build()
//!     .unwrap();
//!
//! let add = catalog.get(opcodes::ADD).unwrap();
//! assert_eq!(add.mnemonic, "ADD");
//! assert_eq!((add.removed, add.added), (2, 1));
//! assert_eq!(add.strategy, OperandStrategy::Unconstrained);
//! assert!(catalog.contains(OpcodeClass::Push));
//! ```

pub use self::{
    catalog::{CatalogError, OpcodeCatalog, OpcodeCatalogBuilder},
    opcode::{OpcodeClass, OpcodeSpec, OperandStrategy},
    templates::BytecodeTemplates,
};

mod catalog;
mod opcode;
pub mod opcodes;
mod templates;
