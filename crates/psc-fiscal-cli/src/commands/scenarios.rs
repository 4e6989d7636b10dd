use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use psc_fiscal_core::cashflow::EconomicConfig;
use psc_fiscal_core::contracts::Contract;
use psc_fiscal_core::scenarios::monte_carlo::{self, MonteCarloInput};
use psc_fiscal_core::scenarios::sensitivity::{self, SensitivityInput};
use psc_fiscal_core::scenarios::ScenarioParameter;

use super::EconomicArgs;
use crate::input;

/// Arguments for one-at-a-time sensitivity analysis
#[derive(Args)]
pub struct SensitivityArgs {
    /// Path to a sensitivity document, or to a bare contract when --parameters is given
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated input groups: oil_price, gas_price, opex, capex, lifting
    #[arg(long, value_delimiter = ',')]
    pub parameters: Option<Vec<ScenarioParameter>>,

    /// Comma-separated multipliers
    #[arg(long, value_delimiter = ',', default_value = "0.8,0.9,1,1.1,1.2")]
    pub factors: Vec<Decimal>,

    #[command(flatten)]
    pub economics: EconomicArgs,
}

/// Arguments for Monte Carlo simulation
#[derive(Args)]
pub struct MonteCarloArgs {
    /// Path to a Monte Carlo document (contract, variables, num_simulations, seed)
    #[arg(long)]
    pub input: Option<String>,

    /// Override the number of simulations
    #[arg(long)]
    pub simulations: Option<u32>,

    /// Override the random seed
    #[arg(long)]
    pub seed: Option<u64>,
}

pub fn run_sensitivity(args: SensitivityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let sens_input = match args.parameters {
        Some(parameters) => {
            let contract: Contract =
                input::read_document(args.input.as_deref(), "sensitivity analysis")?;
            SensitivityInput {
                contract,
                parameters,
                factors: args.factors,
                economics: EconomicConfig::from(&args.economics),
            }
        }
        None => input::read_document(args.input.as_deref(), "sensitivity analysis")?,
    };
    let result = sensitivity::run_sensitivity(&sens_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_monte_carlo(args: MonteCarloArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut mc_input: MonteCarloInput =
        input::read_document(args.input.as_deref(), "Monte Carlo simulation")?;
    if let Some(n) = args.simulations {
        mc_input.num_simulations = n;
    }
    if args.seed.is_some() {
        mc_input.seed = args.seed;
    }
    let result = monte_carlo::run_monte_carlo(&mc_input)?;
    Ok(serde_json::to_value(result)?)
}
