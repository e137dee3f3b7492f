use std::fmt;

use crate::{
    opcodes::{self, forall_fixed_opcodes},
    OpcodeClass, OpcodeSpec,
};

/// Errors raised while assembling an [`OpcodeCatalog`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The selectable population is empty.
    #[error("the selectable population is empty")]
    EmptyPopulation,
    /// A population member references an opcode missing from the table.
    #[error("population member {0} is missing from the opcode table")]
    MissingOpcode(OpcodeClass),
    /// An opcode declares more immediate bytes than fit into a stack word.
    #[error("{mnemonic} declares {width} immediate bytes, at most 32 are supported")]
    ImmediateTooWide {
        /// Offending opcode.
        mnemonic: &'static str,
        /// Declared immediate width.
        width: u8,
    },
}

/// Immutable mapping from opcode byte to [`OpcodeSpec`] plus the ordered population the
/// synthesizer draws from.
#[derive(Clone, PartialEq, Eq)]
pub struct OpcodeCatalog {
    specs: Box<[Option<OpcodeSpec>; 256]>,
    population: Vec<OpcodeClass>,
}

impl fmt::Debug for OpcodeCatalog {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("OpcodeCatalog")
            .field("opcodes", &self.iter().count())
            .field("population", &self.population)
            .finish()
    }
}

impl OpcodeCatalog {
    /// Starts a builder preloaded with the built-in EVM table and an empty population.
    pub fn builder() -> OpcodeCatalogBuilder {
        OpcodeCatalogBuilder::evm()
    }

    /// Looks up a concrete opcode.
    #[inline(always)]
    pub fn get(&self, opcode: u8) -> Option<&OpcodeSpec> {
        self.specs[usize::from(opcode)].as_ref()
    }

    /// Finds a concrete opcode by mnemonic, ignoring ASCII case.
    pub fn find(&self, mnemonic: &str) -> Option<&OpcodeSpec> {
        self.iter()
            .find(|spec| spec.mnemonic.eq_ignore_ascii_case(mnemonic))
    }

    /// All known opcodes in byte order.
    pub fn iter(&self) -> impl Iterator<Item = &OpcodeSpec> + '_ {
        self.specs.iter().flatten()
    }

    /// The ordered selectable population.
    pub fn population(&self) -> &[OpcodeClass] {
        &self.population
    }

    /// Returns `true` if `class` is a member of the selectable population.
    pub fn contains(&self, class: OpcodeClass) -> bool {
        self.population.contains(&class)
    }

    /// Concrete opcodes reachable from the population, family members included.
    pub fn reachable(&self) -> impl Iterator<Item = &OpcodeSpec> + '_ {
        self.population
            .iter()
            .flat_map(move |class| class.members().filter_map(move |opcode| self.get(opcode)))
    }
}

/// Builder for [`OpcodeCatalog`]. Operand strategies are assigned by [`OpcodeSpec::new`]
/// as specs are inserted, never during generation.
#[derive(Debug, Clone)]
pub struct OpcodeCatalogBuilder {
    specs: Box<[Option<OpcodeSpec>; 256]>,
    population: Vec<OpcodeClass>,
}

impl OpcodeCatalogBuilder {
    /// A builder with no opcodes at all.
    pub fn empty() -> Self {
        Self {
            specs: Box::new([None; 256]),
            population: Vec::new(),
        }
    }

    /// A builder holding the built-in EVM table.
    pub fn evm() -> Self {
        let mut builder = Self::empty();

        macro_rules! insert_fixed {
            ($name:ident, $byte:literal, $removed:literal, $added:literal, $gas:literal) => {
                builder = builder.insert(OpcodeSpec::new(
                    opcodes::$name,
                    stringify!($name),
                    $removed,
                    $added,
                    $gas,
                    0,
                ));
            };
        }
        forall_fixed_opcodes!(insert_fixed);

        for n in 1..=32_u8 {
            builder = builder.insert(OpcodeSpec::new(
                opcodes::push(n),
                PUSH_MNEMONICS[usize::from(n - 1)],
                0,
                1,
                opcodes::VERY_LOW_GAS,
                n,
            ));
        }
        for n in 1..=16_u8 {
            let index = usize::from(n - 1);
            builder = builder
                .insert(OpcodeSpec::new(
                    opcodes::DUP1 + n - 1,
                    DUP_MNEMONICS[index],
                    n,
                    n + 1,
                    opcodes::VERY_LOW_GAS,
                    0,
                ))
                .insert(OpcodeSpec::new(
                    opcodes::SWAP1 + n - 1,
                    SWAP_MNEMONICS[index],
                    n + 1,
                    n + 1,
                    opcodes::VERY_LOW_GAS,
                    0,
                ));
        }
        builder
    }

    /// Inserts or replaces a spec.
    #[must_use]
    pub fn insert(mut self, spec: OpcodeSpec) -> Self {
        self.specs[usize::from(spec.opcode)] = Some(spec);
        self
    }

    /// Replaces the selectable population.
    #[must_use]
    pub fn population(mut self, population: impl IntoIterator<Item = OpcodeClass>) -> Self {
        self.population = population.into_iter().collect();
        self
    }

    /// Checks that every population member resolves to known opcodes and freezes the catalog.
    ///
    /// # Errors
    ///
    /// Fails if the population is empty or references an opcode absent from the table, or if
    /// any opcode declares an immediate wider than 32 bytes.
    pub fn build(self) -> Result<OpcodeCatalog, CatalogError> {
        if self.population.is_empty() {
            return Err(CatalogError::EmptyPopulation);
        }
        if let Some(spec) = self.specs.iter().flatten().find(|spec| spec.immediate > 32) {
            return Err(CatalogError::ImmediateTooWide {
                mnemonic: spec.mnemonic,
                width: spec.immediate,
            });
        }
        for &class in &self.population {
            if !class
                .members()
                .all(|opcode| self.specs[usize::from(opcode)].is_some())
            {
                return Err(CatalogError::MissingOpcode(class));
            }
        }
        Ok(OpcodeCatalog {
            specs: self.specs,
            population: self.population,
        })
    }
}

const PUSH_MNEMONICS: [&str; 32] = [
    "PUSH1", "PUSH2", "PUSH3", "PUSH4", "PUSH5", "PUSH6", "PUSH7", "PUSH8", "PUSH9", "PUSH10",
    "PUSH11", "PUSH12", "PUSH13", "PUSH14", "PUSH15", "PUSH16", "PUSH17", "PUSH18", "PUSH19",
    "PUSH20", "PUSH21", "PUSH22", "PUSH23", "PUSH24", "PUSH25", "PUSH26", "PUSH27", "PUSH28",
    "PUSH29", "PUSH30", "PUSH31", "PUSH32",
];

const DUP_MNEMONICS: [&str; 16] = [
    "DUP1", "DUP2", "DUP3", "DUP4", "DUP5", "DUP6", "DUP7", "DUP8", "DUP9", "DUP10", "DUP11",
    "DUP12", "DUP13", "DUP14", "DUP15", "DUP16",
];

const SWAP_MNEMONICS: [&str; 16] = [
    "SWAP1", "SWAP2", "SWAP3", "SWAP4", "SWAP5", "SWAP6", "SWAP7", "SWAP8", "SWAP9", "SWAP10",
    "SWAP11", "SWAP12", "SWAP13", "SWAP14", "SWAP15", "SWAP16",
];

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::OperandStrategy;

    #[test]
    fn builtin_table_arity() {
        let catalog = OpcodeCatalog::builder()
            .population([OpcodeClass::Dup])
            .build()
            .unwrap();

        let dup3 = catalog.get(0x82).unwrap();
        assert_eq!((dup3.mnemonic, dup3.removed, dup3.added), ("DUP3", 3, 4));
        let swap16 = catalog.get(opcodes::SWAP16).unwrap();
        assert_eq!((swap16.mnemonic, swap16.removed, swap16.added), ("SWAP16", 17, 17));
        let push20 = catalog.get(opcodes::push(20)).unwrap();
        assert_eq!((push20.mnemonic, push20.immediate), ("PUSH20", 20));
        assert_eq!(catalog.get(opcodes::MSTORE).unwrap().strategy, OperandStrategy::MemoryWrite);
        assert_eq!(catalog.find("mulmod").map(|spec| spec.opcode), Some(opcodes::MULMOD));
        assert!(catalog.get(0x0c).is_none());
        assert_eq!(catalog.reachable().count(), 16);
    }

    #[test]
    fn population_must_be_known() {
        assert_eq!(
            OpcodeCatalog::builder().build(),
            Err(CatalogError::EmptyPopulation)
        );
        assert_eq!(
            OpcodeCatalog::builder()
                .population([OpcodeClass::Concrete(0x0c)])
                .build(),
            Err(CatalogError::MissingOpcode(OpcodeClass::Concrete(0x0c)))
        );
        assert_eq!(
            OpcodeCatalogBuilder::empty()
                .population([OpcodeClass::Push])
                .build(),
            Err(CatalogError::MissingOpcode(OpcodeClass::Push))
        );
    }

    #[test]
    fn immediates_fit_into_a_word() {
        let wide = OpcodeSpec::new(0x0c, "WIDE", 0, 0, 1, 40);
        assert_eq!(
            OpcodeCatalog::builder()
                .insert(wide)
                .population([OpcodeClass::Concrete(0x0c)])
                .build(),
            Err(CatalogError::ImmediateTooWide {
                mnemonic: "WIDE",
                width: 40
            })
        );

        let widest = OpcodeSpec::new(0x0c, "WIDEST", 0, 0, 1, 32);
        let catalog = OpcodeCatalog::builder()
            .insert(widest)
            .population([OpcodeClass::Concrete(0x0c)])
            .build()
            .unwrap();
        assert_eq!(catalog.get(0x0c).map(|spec| spec.immediate), Some(32));
    }
}
