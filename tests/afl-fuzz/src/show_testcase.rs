use std::{env, fs};

use anyhow::Context as _;
use evm_progen_afl_fuzz::GeneratorInput;

fn main() -> anyhow::Result<()> {
    let filename = env::args()
        .nth(1)
        .context("Please provide the test case to show as argument.")?;
    let bytes = fs::read(&filename).with_context(|| format!("Failed to read {filename}"))?;

    let input: GeneratorInput = arbitrary::Unstructured::new(&bytes)
        .arbitrary()
        .context("Test case does not decode into a generator input")?;
    println!("{input:#?}");

    let catalog = input.catalog();
    println!("{:#?}", input.config(&catalog));

    match input.check() {
        Some(programs) => {
            for program in programs {
                println!("{} ({:?})", program.to_hex(), program.usage);
            }
        }
        None => println!("Configuration rejected"),
    }
    Ok(())
}
