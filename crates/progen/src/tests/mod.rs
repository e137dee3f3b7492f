use evm_progen_interface::{BytecodeTemplates, OpcodeCatalog};

use crate::{decode, GenerationError, GeneratorConfig, Program, ProgramBatchDriver};


fn generate(
    catalog: &OpcodeCatalog,
    config: GeneratorConfig,
    count: usize,
    seed: u64,
) -> Result<Vec<Program>, GenerationError> {
    ProgramBatchDriver::new(catalog, &BytecodeTemplates::evm(), config, seed)?.generate(count)
}

fn opcodes_of(program: &Program) -> Vec<u8> {
    decode::instructions(&program.bytecode)
        .map(|instruction| instruction.opcode)
        .collect()
}

/// Usage accounted during generation must equal the cost of the emitted bytes.
fn assert_usage_matches_bytecode(catalog: &OpcodeCatalog, program: &Program) {
    let usage = decode::cost(catalog, &program.bytecode).unwrap();
    assert_eq!(usage, program.usage, "{}", program.to_hex());
}
