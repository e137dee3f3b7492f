use arbitrary::Arbitrary;
use evm_progen::{
    decode, ConfigurationError, Dominant, Flavor, GenerationError, GenerationLimits,
    GeneratorConfig, InvariantViolation, Preamble, Program, ProgramBatchDriver, PushPolicy,
    StackDiscipline,
};
use evm_progen_interface::{BytecodeTemplates, OpcodeCatalog};
use pretty_assertions::assert_eq;

/// Largest step of the built-in flavors: `SWAP16` with 17 pushes and 17 pops.
const MAX_STEP_OPS: u64 = 35;
/// Memory preamble, jump landing and terminal marker, none of which is limited.
const MAX_TEMPLATE_OPS: u64 = 7;

#[derive(Arbitrary, Debug)]
pub struct GeneratorInput {
    pub flavor: Flavor,
    pub seed: u64,
    pub ops: u16,
    pub count: u8,
    pub push: PushPolicy,
    pub discipline: StackDiscipline,
    pub dominant: Option<u8>,
    pub random_dominant: bool,
    pub randomize_ops_limit: bool,
}

impl GeneratorInput {
    pub fn catalog(&self) -> OpcodeCatalog {
        match self.flavor.catalog() {
            Ok(catalog) => catalog,
            Err(error) => panic!("built-in catalog of {} is invalid: {error}", self.flavor),
        }
    }

    pub fn config(&self, catalog: &OpcodeCatalog) -> GeneratorConfig {
        let population = catalog.population();
        let dominant = if self.random_dominant {
            Dominant::RandomPerProgram
        } else {
            self.dominant.map_or(Dominant::None, |index| {
                Dominant::Fixed(population[usize::from(index) % population.len()])
            })
        };
        GeneratorConfig {
            limits: GenerationLimits::ops(u64::from(self.ops % 2_048)),
            push: self.push,
            discipline: self.discipline,
            dominant,
            randomize_ops_limit: self.randomize_ops_limit,
            ..self.flavor.config()
        }
    }

    pub fn count(&self) -> usize {
        usize::from(self.count % 4) + 1
    }

    /// Generates the batch twice and checks determinism and stack safety of every program.
    /// Returns the batch, or `None` if the configuration was rightly rejected.
    pub fn check(&self) -> Option<Vec<Program>> {
        let catalog = self.catalog();
        let config = self.config(&catalog);
        let templates = BytecodeTemplates::evm();

        let generate = || {
            ProgramBatchDriver::new(&catalog, &templates, config, self.seed)
                .and_then(|mut driver| driver.generate(self.count()))
        };
        let programs = match generate() {
            Ok(programs) => programs,
            Err(error) => {
                assert_rejection_is_expected(&config, &error);
                return None;
            }
        };
        assert_eq!(generate().ok().as_ref(), Some(&programs));

        let limit = config.limits.ops.unwrap_or(GenerationLimits::DEFAULT_OPS);
        for program in &programs {
            let replay = match decode::replay_stack(&catalog, &program.bytecode) {
                Ok(replay) => replay,
                Err(error) => panic!("generated an unknown opcode: {error}"),
            };
            assert!(replay.min_depth >= 0, "stack underflow in {}", program.to_hex());
            if config.discipline == StackDiscipline::Clean {
                assert_eq!(replay.final_depth, 0);
            }
            assert_eq!(decode::cost(&catalog, &program.bytecode).ok(), Some(program.usage));
            assert!(program.usage.ops <= limit + MAX_STEP_OPS + MAX_TEMPLATE_OPS);
        }
        Some(programs)
    }
}

fn assert_rejection_is_expected(config: &GeneratorConfig, error: &GenerationError) {
    match error {
        GenerationError::Configuration(ConfigurationError::PushWidth(width)) => {
            assert!(!(1..=32).contains(width));
        }
        GenerationError::Configuration(ConfigurationError::ZeroLimit(_)) => {
            assert_eq!(config.limits.ops, Some(0));
        }
        GenerationError::Configuration(ConfigurationError::WarmUpWithoutCarry) => {
            assert_eq!(config.preamble, Preamble::WarmUpPush);
            assert_eq!(config.discipline, StackDiscipline::Clean);
        }
        GenerationError::InvariantViolation(InvariantViolation::MemoryAccessUnderCarry {
            ..
        }) => {
            assert_eq!(config.discipline, StackDiscipline::Carry);
        }
        other => panic!("unexpected rejection of {config:?}: {other}"),
    }
}
