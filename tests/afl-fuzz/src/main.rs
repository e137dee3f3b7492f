use evm_progen_afl_fuzz::GeneratorInput;

fn main() {
    afl::fuzz!(|data: &[u8]| {
        if let Ok(input) = arbitrary::Unstructured::new(data).arbitrary::<GeneratorInput>() {
            input.check();
        }
    });
}
