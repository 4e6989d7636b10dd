use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use psc_fiscal_core::timeseries::depreciation::{depreciation_schedule, DepreciationInput};
use psc_fiscal_core::types::DeprMethod;

use crate::input;

/// Arguments for a single-asset depreciation schedule
#[derive(Args)]
pub struct DepreciationArgs {
    /// Path to a depreciation document; overrides the flags below
    #[arg(long)]
    pub input: Option<String>,

    /// straight_line, declining_balance, psc_declining_balance, unit_of_production
    #[arg(long, default_value = "psc_declining_balance")]
    pub method: DeprMethod,

    /// Asset cost
    #[arg(long)]
    pub cost: Option<Decimal>,

    /// Salvage value at the end of the useful life
    #[arg(long, default_value = "0")]
    pub salvage_value: Decimal,

    /// Useful life in years
    #[arg(long, default_value = "5")]
    pub useful_life: u32,

    /// Decline factor for declining balance
    #[arg(long, default_value = "2")]
    pub decline_factor: Decimal,

    /// Annual rate for PSC declining balance
    #[arg(long, default_value = "0.5")]
    pub depreciation_factor: Decimal,

    /// Comma-separated production for unit of production
    #[arg(long, value_delimiter = ',')]
    pub production: Option<Vec<Decimal>>,

    /// Recoverable reserves; defaults to total production
    #[arg(long)]
    pub reserves: Option<Decimal>,
}

pub fn run_depreciation(args: DepreciationArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let depr_input: DepreciationInput = match (args.input.as_deref(), args.cost) {
        (None, Some(cost)) => DepreciationInput {
            method: args.method,
            cost,
            salvage_value: args.salvage_value,
            useful_life: args.useful_life,
            decline_factor: args.decline_factor,
            depreciation_factor: args.depreciation_factor,
            production: args.production.unwrap_or_default(),
            reserves: args.reserves,
            depreciation_len: 0,
        },
        (path, _) => input::read_document(path, "a depreciation schedule (or pass --cost)")?,
    };

    let schedule = depreciation_schedule(&depr_input)?;
    let rows: Vec<Value> = schedule
        .charges
        .iter()
        .zip(&schedule.book_value)
        .enumerate()
        .map(|(i, (charge, book))| {
            serde_json::json!({
                "period": i + 1,
                "depreciation": charge.to_string(),
                "book_value": book.to_string(),
            })
        })
        .collect();

    Ok(serde_json::json!({
        "method": depr_input.method,
        "total_depreciation": schedule.total_depreciation.to_string(),
        "undepreciated": schedule.undepreciated.to_string(),
        "rows": rows,
    }))
}
