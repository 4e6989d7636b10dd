use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use psc_fiscal_core::cashflow::{evaluate_cashflow, EconomicConfig};
use psc_fiscal_core::types::{Money, Year};

use super::EconomicArgs;
use crate::input;

/// Arguments for evaluating a bare cash flow
#[derive(Args)]
pub struct IndicatorsArgs {
    /// Path to a cash flow document with `years`, `cashflow` and optional `investment`
    #[arg(long)]
    pub input: Option<String>,

    /// Comma-separated annual cash flow (e.g. "-100,30,40,50")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cashflow: Option<Vec<Decimal>>,

    /// First year of an inline --cashflow
    #[arg(long, default_value = "2020")]
    pub start_year: Year,

    #[command(flatten)]
    pub economics: EconomicArgs,
}

#[derive(Debug, Deserialize)]
struct CashflowDocument {
    years: Vec<Year>,
    cashflow: Vec<Money>,
    /// Defaults to the negative part of the cash flow
    #[serde(default)]
    investment: Option<Vec<Money>>,
}

pub fn run_indicators(args: IndicatorsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let doc = match args.cashflow {
        Some(cashflow) => CashflowDocument {
            years: (args.start_year..).take(cashflow.len()).collect(),
            cashflow,
            investment: None,
        },
        None => input::read_document(args.input.as_deref(), "indicator evaluation")?,
    };

    let investment = doc.investment.unwrap_or_else(|| {
        doc.cashflow
            .iter()
            .map(|cf| (-*cf).max(Decimal::ZERO))
            .collect()
    });

    let config = EconomicConfig::from(&args.economics);
    let indicators = evaluate_cashflow(&doc.cashflow, &investment, &doc.years, &config)?;
    Ok(serde_json::to_value(indicators)?)
}
