use evm_progen_interface::OpcodeSpec;

use crate::error::InvariantViolation;

/// How produced values are handled between opcodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum StackDiscipline {
    /// Fresh operands before every opcode and a `POP` per produced value after it.
    #[default]
    Clean,
    /// Produced values are left on the stack and count towards the next opcode's inputs.
    Carry,
}

/// Virtual operand-stack occupancy of the program under construction.
///
/// Under [`StackDiscipline::Carry`] only the outputs of the last opcode are tracked. Values
/// buried beneath them are not modelled; this is an approximation, not a stack proof.
#[derive(Debug, Clone)]
pub struct StackState {
    available: usize,
    discipline: StackDiscipline,
}

impl StackState {
    /// Empty stack.
    pub fn new(discipline: StackDiscipline) -> Self {
        Self {
            available: 0,
            discipline,
        }
    }

    /// Discipline in force.
    pub fn discipline(&self) -> StackDiscipline {
        self.discipline
    }

    /// Values the next opcode may consume without pushing anything.
    pub fn available(&self) -> usize {
        self.available
    }

    /// Records values pushed outside of an opcode's operand synthesis (the warm-up push).
    pub fn preload(&mut self, values: usize) {
        if self.discipline == StackDiscipline::Carry {
            self.available += values;
        }
    }

    /// Number of operands to synthesize for an opcode needing `arity` inputs.
    pub fn needed_pushes(&self, arity: usize) -> usize {
        match self.discipline {
            StackDiscipline::Clean => arity,
            StackDiscipline::Carry => arity.saturating_sub(self.available),
        }
    }

    /// Fails if `spec` cannot be synthesized under the current discipline.
    pub fn check(&self, spec: &OpcodeSpec) -> Result<(), InvariantViolation> {
        if self.discipline == StackDiscipline::Carry && spec.strategy.needs_clean_stack() {
            return Err(InvariantViolation::MemoryAccessUnderCarry {
                mnemonic: spec.mnemonic,
            });
        }
        Ok(())
    }

    /// Accounts for the `added` outputs of an executed opcode and returns how many `POP`s
    /// must follow it.
    pub fn settle(&mut self, added: usize) -> usize {
        match self.discipline {
            StackDiscipline::Clean => {
                self.available = 0;
                added
            }
            StackDiscipline::Carry => {
                self.available = added;
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use evm_progen_interface::{opcodes, OpcodeCatalog, OpcodeClass};

    use super::*;

    #[test]
    fn clean_stack_always_returns_to_zero() {
        let mut stack = StackState::new(StackDiscipline::Clean);
        stack.preload(1);
        assert_eq!(stack.needed_pushes(3), 3);
        assert_eq!(stack.settle(2), 2);
        assert_eq!(stack.available(), 0);
        assert_eq!(stack.needed_pushes(1), 1);
    }

    #[test]
    fn carry_reuses_previous_outputs() {
        let mut stack = StackState::new(StackDiscipline::Carry);
        stack.preload(1);
        assert_eq!(stack.needed_pushes(3), 2);
        assert_eq!(stack.settle(1), 0);
        assert_eq!(stack.needed_pushes(2), 1);
        // DUP3 leaves 4 values; a following ADD needs nothing.
        assert_eq!(stack.settle(4), 0);
        assert_eq!(stack.needed_pushes(2), 0);
        assert_eq!(stack.settle(0), 0);
        assert_eq!(stack.needed_pushes(2), 2);
    }

    #[test]
    fn memory_opcodes_need_clean_stack() {
        let catalog = OpcodeCatalog::builder()
            .population([OpcodeClass::Concrete(opcodes::MLOAD)])
            .build()
            .unwrap();
        let mload = catalog.get(opcodes::MLOAD).unwrap();
        let add = catalog.get(opcodes::ADD).unwrap();

        assert!(StackState::new(StackDiscipline::Clean).check(mload).is_ok());
        assert!(StackState::new(StackDiscipline::Carry).check(add).is_ok());
        assert_eq!(
            StackState::new(StackDiscipline::Carry).check(mload),
            Err(InvariantViolation::MemoryAccessUnderCarry { mnemonic: "MLOAD" })
        );
    }
}
