use evm_progen_interface::{BytecodeTemplates, OpcodeCatalog, OpcodeClass};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{
    config::{Dominant, GeneratorConfig},
    error::GenerationError,
    resolver::OpClassResolver,
    synthesizer::{InstructionSynthesizer, Program, ProgramSettings},
};

/// Generates a sequence of independent programs from one random stream.
///
/// The stream is seeded once and only ever advances, so generating fewer or more programs
/// changes only the tail of a batch.
#[derive(Debug)]
pub struct ProgramBatchDriver<'a> {
    catalog: &'a OpcodeCatalog,
    templates: &'a BytecodeTemplates,
    config: GeneratorConfig,
    rng: ChaCha8Rng,
    generated: usize,
}

impl<'a> ProgramBatchDriver<'a> {
    /// Validates `config` and seeds the random stream.
    ///
    /// # Errors
    ///
    /// See [`GeneratorConfig::validate`].
    pub fn new(
        catalog: &'a OpcodeCatalog,
        templates: &'a BytecodeTemplates,
        config: GeneratorConfig,
        seed: u64,
    ) -> Result<Self, GenerationError> {
        config.validate(catalog)?;
        Ok(Self {
            catalog,
            templates,
            config,
            rng: ChaCha8Rng::seed_from_u64(seed),
            generated: 0,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Generates the next program of the batch.
    ///
    /// The per-program operation limit is drawn before the per-program dominant.
    ///
    /// # Errors
    ///
    /// Propagates synthesizer failures; the program in progress is discarded.
    pub fn next_program(&mut self) -> Result<Program, GenerationError> {
        let mut settings = ProgramSettings::new(&self.config);

        if self.config.randomize_ops_limit {
            if let Some(max) = settings.limits.ops {
                settings.limits.ops = Some(self.rng.gen_range(1..=max));
            }
        }
        if self.config.dominant == Dominant::RandomPerProgram {
            let population = self.catalog.population();
            let class = population[self.rng.gen_range(0..population.len())];
            let spec = OpClassResolver::new(self.catalog).resolve(class, &mut self.rng)?;
            settings.dominant = Some(OpcodeClass::Concrete(spec.opcode));
        }

        debug!(
            index = self.generated,
            limits = ?settings.limits,
            dominant = ?settings.dominant,
            "generating program"
        );
        let program =
            InstructionSynthesizer::new(self.catalog, self.templates, settings, &mut self.rng)?
                .run()?;
        self.generated += 1;
        Ok(program)
    }

    /// Generates `count` programs, aborting at the first failure.
    ///
    /// # Errors
    ///
    /// Propagates the first failure; no partial batch is returned.
    pub fn generate(&mut self, count: usize) -> Result<Vec<Program>, GenerationError> {
        (0..count).map(|_| self.next_program()).collect()
    }
}

/// Generates a batch of `count` programs seeded with `seed`.
///
/// # Errors
///
/// See [`ProgramBatchDriver::new`] and [`ProgramBatchDriver::generate`].
pub fn generate(
    catalog: &OpcodeCatalog,
    templates: &BytecodeTemplates,
    config: GeneratorConfig,
    count: usize,
    seed: u64,
) -> Result<Vec<Program>, GenerationError> {
    ProgramBatchDriver::new(catalog, templates, config, seed)?.generate(count)
}
