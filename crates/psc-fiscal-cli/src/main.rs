mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::contract::{CashflowArgs, RunArgs};
use commands::depreciation::DepreciationArgs;
use commands::indicators::IndicatorsArgs;
use commands::scenarios::{MonteCarloArgs, SensitivityArgs};

/// Production sharing contract fiscal calculations
#[derive(Parser)]
#[command(
    name = "psc",
    version,
    about = "Production sharing contract fiscal calculations",
    long_about = "Runs Cost Recovery and Gross Split production sharing contracts \
                  with decimal precision and evaluates the contractor cash flow \
                  (NPV, IRR, POT, PV ratio). Contracts are read as JSON or YAML."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log engine diagnostics to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a contract and print its economic summary
    Run(RunArgs),
    /// Run a contract and print the annual cash flow table
    Cashflow(CashflowArgs),
    /// Evaluate NPV, IRR, POT and PV ratio of a bare cash flow
    Indicators(IndicatorsArgs),
    /// Print a depreciation schedule for one asset
    Depreciation(DepreciationArgs),
    /// One-at-a-time sensitivity of contractor NPV
    Sensitivity(SensitivityArgs),
    /// Monte Carlo simulation of contractor NPV, IRR and POT
    MonteCarlo(MonteCarloArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Run(args) => commands::contract::run_contract(args),
        Commands::Cashflow(args) => commands::contract::run_cashflow(args),
        Commands::Indicators(args) => commands::indicators::run_indicators(args),
        Commands::Depreciation(args) => commands::depreciation::run_depreciation(args),
        Commands::Sensitivity(args) => commands::scenarios::run_sensitivity(args),
        Commands::MonteCarlo(args) => commands::scenarios::run_monte_carlo(args),
        Commands::Version => {
            println!("psc {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
