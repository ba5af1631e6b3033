//! RV32IM pipeline simulator CLI.
//!
//! This binary drives the cycle-level core model. It provides:
//! 1. **Run:** Load a raw binary or ELF program and run it to completion or a cycle limit.
//! 2. **Config:** Print the default configuration as JSON, as a starting point for `--config`.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rv32im_core::config::Config;
use rv32im_core::sim::loader::read_program;
use rv32im_core::sim::{RunOutcome, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "rv32sim",
    author,
    version,
    about = "Cycle-level RV32IM six-stage pipeline simulator",
    long_about = "Run a bare-metal RV32IM program on a configurable six-stage pipeline.\n\nThe program ends when it stores its exit code to the finisher device.\n\nExamples:\n  rv32sim run program.bin --config core.json --max-cycles 100000\n  rv32sim run program.elf --elf --regs\n  rv32sim config > core.json"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a program.
    Run {
        /// Program to execute (raw binary unless --elf is given).
        program: PathBuf,

        /// JSON configuration file; missing fields take their defaults.
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Treat the program as an ELF executable.
        #[arg(long)]
        elf: bool,

        /// Load address of a raw binary (defaults to the reset address).
        #[arg(long, value_parser = parse_u32)]
        load_addr: Option<u32>,

        /// Stop after this many cycles.
        #[arg(long, default_value_t = 10_000_000)]
        max_cycles: u64,

        /// Log every retired instruction.
        #[arg(long)]
        trace: bool,

        /// Print the register file when the run ends.
        #[arg(long)]
        regs: bool,
    },

    /// Print the default configuration as JSON.
    Config,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            program,
            config,
            elf,
            load_addr,
            max_cycles,
            trace,
            regs,
        } => {
            init_tracing(trace);
            match cmd_run(
                &program,
                config.as_deref(),
                elf,
                load_addr,
                max_cycles,
                regs,
            ) {
                Ok(code) => code,
                Err(e) => {
                    error!("{e}");
                    eprintln!("error: {e}");
                    ExitCode::FAILURE
                }
            }
        }
        Commands::Config => match serde_json::to_string_pretty(&Config::default()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

/// Installs the log subscriber; `RUST_LOG` overrides the default level.
fn init_tracing(trace: bool) {
    let default = if trace { "trace" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Accepts decimal or `0x`-prefixed hexadecimal addresses.
fn parse_u32(s: &str) -> Result<u32, String> {
    let parsed = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .map_or_else(|| s.parse::<u32>(), |hex| u32::from_str_radix(hex, 16));
    parsed.map_err(|e| format!("invalid address '{s}': {e}"))
}

fn load_config(path: Option<&Path>) -> Result<Config, String> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("invalid config {}: {e}", path.display()))
}

/// Loads the program, runs it and prints the outcome and statistics.
///
/// # Returns
///
/// The process exit code: the program's own exit code when it finished, failure otherwise.
fn cmd_run(
    program: &Path,
    config: Option<&Path>,
    elf: bool,
    load_addr: Option<u32>,
    max_cycles: u64,
    regs: bool,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let config = load_config(config)?;
    let mut sim = Simulator::new(&config)?;
    let bytes = read_program(program)?;

    if elf {
        let entry = sim.load_elf(&bytes)?;
        info!(entry = %format_args!("{entry:#010x}"), "ELF loaded");
    } else {
        let addr = load_addr.unwrap_or(config.general.reset_address);
        sim.load_binary(addr, &bytes)?;
    }

    println!("[*] Running {} (max {max_cycles} cycles)", program.display());
    let outcome = sim.run(max_cycles);
    let code = match outcome {
        RunOutcome::Finished(code) => {
            println!("\n[*] Exit code {code}");
            ExitCode::from((code & 0xff) as u8)
        }
        RunOutcome::CycleLimit => {
            println!("\n[!] Cycle limit reached after {max_cycles} cycles");
            ExitCode::FAILURE
        }
        RunOutcome::DebugHalted => {
            println!("\n[!] Core halted in debug mode at {:#010x}", sim.cpu.csrs.dpc);
            ExitCode::FAILURE
        }
    };

    print!("{}", sim.stats().report(&[]));
    if regs {
        println!("{}", sim.cpu.dump_state());
    }
    Ok(code)
}
