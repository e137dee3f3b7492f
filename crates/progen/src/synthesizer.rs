use evm_progen_interface::{
    opcodes, BytecodeTemplates, OpcodeCatalog, OpcodeClass, OpcodeSpec, OperandStrategy,
};
use primitive_types::U256;
use rand::Rng;
use tracing::trace;

use crate::{
    assembler::BytecodeAssembler,
    config::{Dominant, GenerationLimits, GeneratorConfig, Preamble, PushPolicy},
    decode,
    error::{GenerationError, InvariantViolation},
    resolver::OpClassResolver,
    stack::{StackDiscipline, StackState},
};

/// Largest memory offset or length pushed for memory opcodes.
const MAX_MEMORY_OPERAND: u32 = BytecodeTemplates::PREALLOCATED_MEMORY - 1;
/// Largest `BYTE` index or `SIGNEXTEND` size.
const MAX_BYTE_INDEX: u32 = 31;
/// Largest shift amount and exponent.
const MAX_SINGLE_BYTE: u32 = 0xff;

/// Instructions emitted and static gas spent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceUsage {
    /// Instructions, operand pushes and pops included.
    pub ops: u64,
    /// Static gas.
    pub gas: u64,
}

impl ResourceUsage {
    /// Accounts one instruction.
    pub fn record(&mut self, spec: &OpcodeSpec) {
        self.ops += 1;
        self.gas += u64::from(spec.gas);
    }

    fn extend(&mut self, other: Self) {
        self.ops += other.ops;
        self.gas += other.gas;
    }

    fn since(self, baseline: Self) -> Self {
        Self {
            ops: self.ops - baseline.ops,
            gas: self.gas - baseline.gas,
        }
    }
}

/// A generated program. Immutable once returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    /// Bytecode, preamble and terminal marker included.
    pub bytecode: Vec<u8>,
    /// Mnemonic of the dominant opcode or name of the dominant class, if one was configured.
    pub dominant: Option<String>,
    /// Resources accounted while generating.
    pub usage: ResourceUsage,
}

impl Program {
    /// Lowercase hex rendering of the bytecode.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytecode)
    }
}

/// Settings of a single program: a [`GeneratorConfig`] with the per-program draws applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgramSettings {
    /// Effective limits.
    pub limits: GenerationLimits,
    /// Token picked with probability 1/2.
    pub dominant: Option<OpcodeClass>,
    /// Operand push width.
    pub push: PushPolicy,
    /// Stack bookkeeping.
    pub discipline: StackDiscipline,
    /// What precedes the generated part.
    pub preamble: Preamble,
    /// Whether the terminal marker is appended.
    pub terminate: bool,
}

impl ProgramSettings {
    /// Settings taken from `config` as is. A per-program dominant is left unset.
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            limits: config.limits.effective(),
            dominant: match config.dominant {
                Dominant::Fixed(class) => Some(class),
                Dominant::None | Dominant::RandomPerProgram => None,
            },
            push: config.push,
            discipline: config.discipline,
            preamble: config.preamble,
            terminate: config.terminate,
        }
    }
}

/// The generation loop for one program.
#[derive(Debug)]
pub struct InstructionSynthesizer<'a, R: ?Sized> {
    catalog: &'a OpcodeCatalog,
    templates: &'a BytecodeTemplates,
    resolver: OpClassResolver<'a>,
    settings: ProgramSettings,
    rng: &'a mut R,
    assembler: BytecodeAssembler,
    stack: StackState,
    usage: ResourceUsage,
    /// Usage excluded from the ops and gas limits.
    baseline: ResourceUsage,
}

impl<'a, R: Rng + ?Sized> InstructionSynthesizer<'a, R> {
    /// Prepares a synthesizer drawing from `rng`.
    ///
    /// # Errors
    ///
    /// Fails if the push width is outside `1..=32`.
    pub fn new(
        catalog: &'a OpcodeCatalog,
        templates: &'a BytecodeTemplates,
        settings: ProgramSettings,
        rng: &'a mut R,
    ) -> Result<Self, GenerationError> {
        settings.push.validate()?;
        Ok(Self {
            catalog,
            templates,
            resolver: OpClassResolver::new(catalog),
            settings,
            rng,
            assembler: BytecodeAssembler::new(),
            stack: StackState::new(settings.discipline),
            usage: ResourceUsage::default(),
            baseline: ResourceUsage::default(),
        })
    }

    /// Generates the program.
    ///
    /// Limits are checked before each step only, so the last step may overshoot them. The
    /// memory and jump preamble counts towards the bytecode limit but not towards the ops and
    /// gas limits; the warm-up push counts towards all of them.
    ///
    /// # Errors
    ///
    /// Fails with [`InvariantViolation`] if a memory opcode is drawn under the carry discipline
    /// or an opcode is missing from the catalog.
    pub fn run(mut self) -> Result<Program, GenerationError> {
        self.preamble()?;
        while !self.settings.limits.exhausted(
            &self.usage.since(self.baseline),
            self.assembler.len(),
        ) {
            let class = self.draw();
            let spec = self.resolver.resolve(class, &mut *self.rng)?;
            self.step(spec)?;
        }
        if self.settings.terminate {
            let templates = self.templates;
            self.template(templates.terminal())?;
        }

        let dominant = self
            .settings
            .dominant
            .map(|class| dominant_name(self.catalog, class));
        Ok(Program {
            bytecode: self.assembler.finish(),
            dominant,
            usage: self.usage,
        })
    }

    fn preamble(&mut self) -> Result<(), InvariantViolation> {
        match self.settings.preamble {
            Preamble::None => {}
            Preamble::WarmUpPush => {
                self.push_random(self.settings.push.max_width())?;
                self.stack.preload(1);
            }
            Preamble::MemoryAndJump => {
                let templates = self.templates;
                self.template(templates.memory_preamble())?;
                let jump = templates.jump_pattern(opcodes::JUMP, self.assembler.len());
                self.template(&jump)?;
                self.baseline = self.usage;
            }
        }
        Ok(())
    }

    fn draw(&mut self) -> OpcodeClass {
        if let Some(dominant) = self.settings.dominant {
            if self.rng.gen_bool(0.5) {
                return dominant;
            }
        }
        let population = self.catalog.population();
        population[self.rng.gen_range(0..population.len())]
    }

    fn step(&mut self, spec: &OpcodeSpec) -> Result<(), InvariantViolation> {
        self.stack.check(spec)?;
        let arity = usize::from(spec.operand_arity());
        let needed = self.stack.needed_pushes(arity);

        match spec.strategy {
            OperandStrategy::Nullary | OperandStrategy::Unconstrained | OperandStrategy::Jump => {
                for _ in 0..needed {
                    self.push_operand()?;
                }
            }
            OperandStrategy::Exponent => {
                // Both operands are always fresh so the exponent stays below 256.
                self.push_operand()?;
                self.push_bounded(1, MAX_SINGLE_BYTE)?;
                self.emit(opcodes::SWAP1)?;
            }
            OperandStrategy::ByteIndex | OperandStrategy::Shift => {
                if needed == arity {
                    self.push_operand()?;
                }
                let max = if spec.strategy == OperandStrategy::ByteIndex {
                    MAX_BYTE_INDEX
                } else {
                    MAX_SINGLE_BYTE
                };
                self.push_bounded(1, max)?;
            }
            OperandStrategy::MemoryRead => {
                for _ in 0..needed {
                    self.push_bounded(2, MAX_MEMORY_OPERAND)?;
                }
            }
            OperandStrategy::MemoryWrite => {
                self.push_operand()?;
                self.push_bounded(2, MAX_MEMORY_OPERAND)?;
            }
        }

        trace!(
            opcode = spec.mnemonic,
            offset = self.assembler.len(),
            pushed = needed,
            "synthesizing instruction"
        );
        if spec.strategy == OperandStrategy::Jump {
            let pattern = self
                .templates
                .jump_pattern(spec.opcode, self.assembler.len());
            self.template(&pattern)?;
        } else {
            self.assembler.opcode(spec.opcode);
            self.usage.record(spec);
            if spec.immediate > 0 {
                let value = self.random_value(spec.immediate);
                self.assembler.immediate(spec.immediate, value);
            }
        }

        for _ in 0..self.stack.settle(usize::from(spec.added)) {
            self.emit(opcodes::POP)?;
        }
        Ok(())
    }

    /// Pushes an unconstrained operand with a width drawn from the push policy.
    fn push_operand(&mut self) -> Result<(), InvariantViolation> {
        let width = self.settings.push.draw(&mut *self.rng);
        self.push_random(width)
    }

    fn push_random(&mut self, width: u8) -> Result<(), InvariantViolation> {
        let value = self.random_value(width);
        self.push(width, value)
    }

    fn push_bounded(&mut self, width: u8, max: u32) -> Result<(), InvariantViolation> {
        let value = self.rng.gen_range(0..=max);
        self.push(width, U256::from(value))
    }

    fn push(&mut self, width: u8, value: U256) -> Result<(), InvariantViolation> {
        self.assembler.push(width, value);
        self.account(opcodes::push(width))
    }

    fn emit(&mut self, opcode: u8) -> Result<(), InvariantViolation> {
        self.assembler.opcode(opcode);
        self.account(opcode)
    }

    fn account(&mut self, opcode: u8) -> Result<(), InvariantViolation> {
        let spec = self
            .catalog
            .get(opcode)
            .ok_or(InvariantViolation::UnknownOpcode(opcode))?;
        self.usage.record(spec);
        Ok(())
    }

    fn template(&mut self, bytes: &[u8]) -> Result<(), InvariantViolation> {
        let cost = decode::cost(self.catalog, bytes)?;
        self.assembler.raw(bytes);
        self.usage.extend(cost);
        Ok(())
    }

    fn random_value(&mut self, width: u8) -> U256 {
        let mut word = [0_u8; 32];
        self.rng.fill(&mut word[32 - usize::from(width)..]);
        U256::from_big_endian(&word)
    }
}

fn dominant_name(catalog: &OpcodeCatalog, class: OpcodeClass) -> String {
    match class {
        OpcodeClass::Concrete(opcode) => catalog
            .get(opcode)
            .map_or_else(|| class.to_string(), |spec| spec.mnemonic.to_owned()),
        family => family.to_string(),
    }
}
