//! Loop lowering driver
//!
//! Builds `int main() { for (i = start; i < end; i += step) {} return 0; }`
//! through the counting loop lowering, checks the resulting CFG and prints
//! the module.

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};
use log::info;
use looplow_common::CompilerError;
use looplow_ir::{Function, IntConstant, IrType, Module, Value};
use looplow_lower::{check_module, lower_counting_loop_with, CountingLoop, EmptyBody, StartSlotInit};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "looplow")]
#[command(about = "Lower a counting loop into basic blocks and print the IR")]
#[command(version)]
struct Cli {
    /// Initial index value (only stored with --start-from-value)
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    start: i64,

    /// Exclusive upper bound of the index
    #[arg(long, default_value_t = 10, allow_hyphen_values = true)]
    end: i64,

    /// Amount added to the index after each iteration
    #[arg(long, default_value_t = 1)]
    step: i64,

    /// Bit width of the loop counter
    #[arg(long, default_value_t = 32)]
    width: u32,

    /// Initialize the counter slots from --start instead of literal 0
    #[arg(long)]
    start_from_value: bool,

    /// Output format
    #[arg(long, value_enum, default_value_t = Emit::Text)]
    emit: Emit,

    /// Write the output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Enable logging (filter with RUST_LOG)
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Emit {
    Text,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        env_logger::init();
    }

    let module = build_count_module(&cli)?;

    let failures = check_module(&module);
    if !failures.is_empty() {
        for report in &failures {
            eprintln!("{report}");
        }
        bail!("{} function(s) failed verification", failures.len());
    }

    let rendered = render(&module, cli.emit)?;
    match &cli.output {
        Some(path) => {
            fs::write(path, &rendered)?;
            info!("IR written to {}", path.display());
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

fn build_count_module(cli: &Cli) -> Result<Module> {
    if cli.step <= 0 {
        bail!("--step must be positive, got {}", cli.step);
    }

    let ty = IrType::int(cli.width)?;
    let start = IntConstant::new(cli.start, ty.clone())?;
    let end = IntConstant::new(cli.end, ty)?;

    let mut counting = CountingLoop::new(start, end)?.with_step(cli.step);
    if cli.start_from_value {
        counting = counting.with_start_init(StartSlotInit::StartValue);
    }

    let mut main = Function::new("main", IrType::I32);
    let mut exit = main.new_block();
    let lowered = lower_counting_loop_with(&mut main, exit.id, &counting, &mut EmptyBody);
    main.build(&mut exit).ret(Value::Constant(0), IrType::I32);
    main.append_block(exit);
    info!(
        "Lowered loop into L{}, L{}, L{} with exit L{}",
        lowered.alloc, lowered.compare, lowered.increment, lowered.exit
    );

    let mut module = Module::new("count");
    module.add_function(main);
    Ok(module)
}

fn render(module: &Module, emit: Emit) -> Result<String, CompilerError> {
    match emit {
        Emit::Text => Ok(module.to_string()),
        Emit::Json => module.to_json().map(|json| json + "\n"),
    }
}
