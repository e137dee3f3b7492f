use evm_progen_interface::{OpcodeCatalog, OpcodeClass, OpcodeSpec};
use rand::Rng;

use crate::error::InvariantViolation;

/// Turns population tokens into concrete opcodes.
///
/// Never caches: each call on a family draws a fresh member.
#[derive(Debug, Clone, Copy)]
pub struct OpClassResolver<'a> {
    catalog: &'a OpcodeCatalog,
}

impl<'a> OpClassResolver<'a> {
    /// Resolver over `catalog`.
    pub fn new(catalog: &'a OpcodeCatalog) -> Self {
        Self { catalog }
    }

    /// Identity for a concrete opcode, a uniform draw among the members of a family.
    ///
    /// # Errors
    ///
    /// Fails if the resolved opcode is missing from the catalog.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        class: OpcodeClass,
        rng: &mut R,
    ) -> Result<&'a OpcodeSpec, InvariantViolation> {
        let opcode = match class {
            OpcodeClass::Concrete(opcode) => opcode,
            family => rng.gen_range(family.members()),
        };
        self.catalog
            .get(opcode)
            .ok_or(InvariantViolation::UnknownOpcode(opcode))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use evm_progen_interface::opcodes;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;

    #[test]
    fn families_cover_all_members() {
        let catalog = OpcodeCatalog::builder()
            .population([OpcodeClass::Push, OpcodeClass::Dup, OpcodeClass::Swap])
            .build()
            .unwrap();
        let resolver = OpClassResolver::new(&catalog);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        for (class, expected) in [
            (OpcodeClass::Push, opcodes::PUSH1..=opcodes::PUSH32),
            (OpcodeClass::Dup, opcodes::DUP1..=opcodes::DUP16),
            (OpcodeClass::Swap, opcodes::SWAP1..=opcodes::SWAP16),
        ] {
            let seen: BTreeSet<u8> = (0..2_000)
                .map(|_| resolver.resolve(class, &mut rng).unwrap().opcode)
                .collect();
            assert_eq!(seen, expected.collect());
        }
    }

    #[test]
    fn concrete_is_identity() {
        let catalog = OpcodeCatalog::builder()
            .population([OpcodeClass::Concrete(opcodes::SHR)])
            .build()
            .unwrap();
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let spec = OpClassResolver::new(&catalog)
            .resolve(OpcodeClass::Concrete(opcodes::SHR), &mut rng)
            .unwrap();
        assert_eq!(spec.mnemonic, "SHR");
        assert_eq!(
            OpClassResolver::new(&catalog).resolve(OpcodeClass::Concrete(0x0c), &mut rng),
            Err(InvariantViolation::UnknownOpcode(0x0c))
        );
    }
}
