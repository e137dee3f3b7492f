//! `evm-progen`: prints randomly generated EVM programs to stdout.

use std::io::{self, BufWriter};

use anyhow::Context as _;
use clap::{Parser, ValueEnum};
use evm_progen::{
    write_programs, Dominant, Flavor, GenerationLimits, OutputMode, ProgramBatchDriver,
    PushPolicy, StackDiscipline,
};
use evm_progen_interface::BytecodeTemplates;
use tracing::info;
use tracing_subscriber::{
    filter::{EnvFilter, LevelFilter},
    FmtSubscriber,
};

/// Generates random, stack-valid EVM programs. With no limit given, `validation` programs stop
/// after 100 operations and `arithmetic-v1` programs after 10000 gas.
#[derive(Debug, Parser)]
#[command(name = "evm-progen", version, about, long_about = None)]
struct Args {
    /// Program flavor: `arithmetic-v1` or `validation`.
    #[arg(long, default_value_t = Flavor::Validation)]
    flavor: Flavor,
    /// Number of programs to generate.
    #[arg(long, default_value_t = 1)]
    count: usize,
    /// Seed of the random stream.
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// Static gas limit of a single program.
    #[arg(long)]
    gas_limit: Option<u64>,
    /// Operation limit of a single program, operand pushes included.
    #[arg(long)]
    ops_limit: Option<u64>,
    /// Bytecode length limit of a single program, in bytes.
    #[arg(long)]
    bytecode_limit: Option<u64>,
    /// Draw each program's operation limit from 1 up to the operation limit.
    #[arg(long)]
    randomize_ops_limit: bool,
    /// Opcode or class picked with probability 1/2: a mnemonic, a hex byte, `PUSH`, `DUP`,
    /// `SWAP` or `random` for one dominant per program.
    #[arg(long)]
    dominant: Option<String>,
    /// Width of operand pushes, 1..=32.
    #[arg(long, default_value_t = 32)]
    push: u8,
    /// Draw every operand width from 1 up to `--push`.
    #[arg(long)]
    randomize_push: bool,
    /// Stack discipline; the flavor's default if omitted.
    #[arg(long, value_enum)]
    discipline: Option<Discipline>,
    /// Output format: `lines` prints one bytecode per line, `csv` adds program ids and dominants.
    #[arg(long, default_value_t = OutputMode::Lines)]
    output: OutputMode,
    /// Shorthand for `--output csv`.
    #[arg(long)]
    full_csv: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Discipline {
    /// Pop every produced value right away.
    Clean,
    /// Leave produced values for the next opcode.
    Carry,
}

impl From<Discipline> for StackDiscipline {
    fn from(discipline: Discipline) -> Self {
        match discipline {
            Discipline::Clean => Self::Clean,
            Discipline::Carry => Self::Carry,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to install tracing subscriber")?;

    let args = Args::parse();
    let catalog = args
        .flavor
        .catalog()
        .with_context(|| format!("failed to build the {} catalog", args.flavor))?;

    let mut config = args.flavor.config();
    if args.gas_limit.is_some() || args.ops_limit.is_some() || args.bytecode_limit.is_some() {
        config.limits = GenerationLimits {
            gas: args.gas_limit,
            ops: args.ops_limit,
            bytes: args.bytecode_limit,
        };
    }
    if let Some(token) = &args.dominant {
        config.dominant = Dominant::parse(token, &catalog)?;
    }
    config.push = PushPolicy::new(args.push, args.randomize_push);
    if let Some(discipline) = args.discipline {
        config.discipline = discipline.into();
    }
    config.randomize_ops_limit = args.randomize_ops_limit;

    let templates = BytecodeTemplates::evm();
    let programs = ProgramBatchDriver::new(&catalog, &templates, config, args.seed)
        .and_then(|mut driver| driver.generate(args.count))
        .with_context(|| format!("failed to generate {} {} programs", args.count, args.flavor))?;
    info!(
        count = programs.len(),
        bytes = programs.iter().map(|program| program.bytecode.len()).sum::<usize>(),
        "generated programs"
    );

    let mode = if args.full_csv {
        OutputMode::Csv
    } else {
        args.output
    };
    let stdout = BufWriter::new(io::stdout().lock());
    write_programs(stdout, &programs, mode, config.dominant != Dominant::None)?;
    Ok(())
}
