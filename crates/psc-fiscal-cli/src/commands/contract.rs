use clap::{Args, ValueEnum};
use serde_json::{Map, Value};

use psc_fiscal_core::cashflow::EconomicConfig;
use psc_fiscal_core::contracts::{Contract, ContractResult};
use psc_fiscal_core::summary::get_summary;
use psc_fiscal_core::types::Money;

use super::EconomicArgs;
use crate::input;

/// Arguments for running a contract to its summary
#[derive(Args)]
pub struct RunArgs {
    /// Path to a contract document (.json, .yaml or .yml)
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub economics: EconomicArgs,
}

/// Arguments for printing the annual cash flow of a contract
#[derive(Args)]
pub struct CashflowArgs {
    /// Path to a contract document (.json, .yaml or .yml)
    #[arg(long)]
    pub input: Option<String>,

    /// Which cash flow to print
    #[arg(long, default_value = "consolidated")]
    pub fluid: FluidView,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum FluidView {
    Oil,
    Gas,
    Consolidated,
}

fn load_and_run(path: Option<&str>) -> Result<ContractResult, Box<dyn std::error::Error>> {
    let contract: Contract = input::read_document(path, "a contract run")?;
    tracing::debug!(contract_type = ?contract.contract_type(), "running contract");
    Ok(contract.run()?)
}

pub fn run_contract(args: RunArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = load_and_run(args.input.as_deref())?;
    let config = EconomicConfig::from(&args.economics);
    let summary = get_summary(&result, &config)?;
    Ok(serde_json::to_value(summary)?)
}

pub fn run_cashflow(args: CashflowArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let result = load_and_run(args.input.as_deref())?;

    let arrays: Vec<(&'static str, &[Money])> = match (&result, args.fluid) {
        (ContractResult::CostRecovery(r), FluidView::Oil) => r.oil.arrays(),
        (ContractResult::CostRecovery(r), FluidView::Gas) => r.gas.arrays(),
        (ContractResult::CostRecovery(r), FluidView::Consolidated) => r.consolidated.arrays(),
        (ContractResult::GrossSplit(r), FluidView::Oil) => r.oil.arrays(),
        (ContractResult::GrossSplit(r), FluidView::Gas) => r.gas.arrays(),
        (ContractResult::GrossSplit(r), FluidView::Consolidated) => r.consolidated.arrays(),
    };

    let rows: Vec<Value> = result
        .project_years()
        .iter()
        .enumerate()
        .map(|(i, year)| {
            let mut row = Map::new();
            row.insert("year".into(), Value::from(*year));
            for (name, values) in &arrays {
                let cell = values.get(i).map(|v| v.to_string()).unwrap_or_default();
                row.insert((*name).into(), Value::String(cell));
            }
            Value::Object(row)
        })
        .collect();

    Ok(serde_json::json!({
        "contract_type": result.contract_type(),
        "fluid": format!("{:?}", args.fluid).to_lowercase(),
        "warnings": result.warnings(),
        "rows": rows,
    }))
}
