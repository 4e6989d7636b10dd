pub mod contract;
pub mod depreciation;
pub mod indicators;
pub mod scenarios;

use clap::Args;
use rust_decimal::Decimal;

use psc_fiscal_core::cashflow::EconomicConfig;
use psc_fiscal_core::types::{DiscountingMode, NpvMode};

/// Discounting flags shared by every command that evaluates a cash flow
#[derive(Args, Debug, Clone)]
pub struct EconomicArgs {
    /// Reference (discounting) year; defaults to the first project year
    #[arg(long)]
    pub reference_year: Option<i32>,

    /// Annual discount rate
    #[arg(long, default_value = "0.1")]
    pub discount_rate: Decimal,

    /// Annual inflation rate for real-terms NPV
    #[arg(long, default_value = "0")]
    pub inflation_rate: Decimal,

    /// NPV convention: skk_real, skk_nominal, nominal, real, point_forward
    #[arg(long, default_value = "skk_real")]
    pub npv_mode: NpvMode,

    /// Discount at end of year or mid-year
    #[arg(long, default_value = "end_year")]
    pub discounting: DiscountingMode,

    /// Divide NPV by undiscounted investment for the PV ratio
    #[arg(long)]
    pub pv_ratio_undiscounted: bool,
}

impl From<&EconomicArgs> for EconomicConfig {
    fn from(args: &EconomicArgs) -> Self {
        EconomicConfig {
            reference_year: args.reference_year,
            discount_rate: args.discount_rate,
            inflation_rate: args.inflation_rate,
            npv_mode: args.npv_mode,
            discounting_mode: args.discounting,
            pv_ratio_undiscounted: args.pv_ratio_undiscounted,
        }
    }
}
