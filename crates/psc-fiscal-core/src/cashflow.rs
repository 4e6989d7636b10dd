//! Economic evaluation of a contract cash flow.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::contracts::ContractResult;
use crate::error::{check_len, check_year, PscError};
use crate::indicators::{self, DiscountSettings};
use crate::types::{DiscountingMode, Money, NpvMode, Rate, Year};
use crate::PscResult;

/// Discounting conventions for an evaluation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EconomicConfig {
    /// Defaults to the first project year
    #[serde(default)]
    pub reference_year: Option<Year>,
    #[serde(default = "default_discount_rate")]
    pub discount_rate: Rate,
    #[serde(default)]
    pub inflation_rate: Rate,
    #[serde(default)]
    pub npv_mode: NpvMode,
    #[serde(default)]
    pub discounting_mode: DiscountingMode,
    /// Divide NPV by the undiscounted investment total for the PV ratio
    #[serde(default)]
    pub pv_ratio_undiscounted: bool,
}

fn default_discount_rate() -> Rate {
    dec!(0.1)
}

impl Default for EconomicConfig {
    fn default() -> Self {
        Self {
            reference_year: None,
            discount_rate: default_discount_rate(),
            inflation_rate: Decimal::ZERO,
            npv_mode: NpvMode::default(),
            discounting_mode: DiscountingMode::default(),
            pv_ratio_undiscounted: false,
        }
    }
}

impl EconomicConfig {
    /// Discount settings over `years`, checking the reference year.
    pub fn settings(&self, years: &[Year]) -> PscResult<DiscountSettings> {
        let (Some(&start), Some(&end)) = (years.first(), years.last()) else {
            return Err(PscError::InsufficientData(
                "Evaluation requires at least one project year".into(),
            ));
        };
        let reference_year = self.reference_year.unwrap_or(start);
        check_year("reference_year", reference_year, start, end)?;
        Ok(DiscountSettings {
            discount_rate: self.discount_rate,
            inflation_rate: self.inflation_rate,
            reference_year,
            discounting_mode: self.discounting_mode,
        })
    }

    /// NPV of any per-year series under this configuration.
    pub fn npv(&self, values: &[Money], years: &[Year]) -> PscResult<Money> {
        let settings = self.settings(years)?;
        indicators::npv(self.npv_mode, values, years, &settings)
    }
}

/// Indicators of one cash flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomicIndicators {
    pub reference_year: Year,
    pub npv: Money,
    pub irr: Option<Rate>,
    /// Years after the reference year
    pub pot: Option<Decimal>,
    pub pv_ratio: Decimal,
    pub pi: Decimal,
    pub warnings: Vec<String>,
}

/// Evaluate a bare cash flow with its investment series.
pub fn evaluate_cashflow(
    cashflow: &[Money],
    investment: &[Money],
    years: &[Year],
    config: &EconomicConfig,
) -> PscResult<EconomicIndicators> {
    check_len("cashflow", years.len(), cashflow.len())?;
    check_len("investment", years.len(), investment.len())?;
    let settings = config.settings(years)?;
    let mut warnings = Vec::new();

    let npv = indicators::npv(config.npv_mode, cashflow, years, &settings)?;

    let irr = match indicators::irr(cashflow) {
        Ok(rate) => Some(rate),
        Err(e) => {
            tracing::warn!(error = %e, "IRR not found");
            warnings.push(format!("IRR not found: {e}"));
            None
        }
    };

    let pot = indicators::pot(cashflow, years, settings.reference_year)?;
    if pot.is_none() {
        tracing::warn!("cumulative cash flow never pays out");
        warnings.push("Cumulative cash flow never pays out; POT undefined".into());
    }

    let (pv_ratio, pi) = match indicators::pv_ratio(
        npv,
        investment,
        years,
        config.npv_mode,
        &settings,
        config.pv_ratio_undiscounted,
    )? {
        Some(ratio) => (ratio, indicators::profitability_index(ratio)),
        None => {
            tracing::warn!("investment is zero, PV ratio set to zero");
            warnings.push("Investment is zero; PV ratio and PI reported as zero".into());
            (Decimal::ZERO, Decimal::ZERO)
        }
    };

    Ok(EconomicIndicators {
        reference_year: settings.reference_year,
        npv,
        irr,
        pot,
        pv_ratio,
        pi,
        warnings,
    })
}

/// Evaluate the consolidated contractor cash flow of a contract run.
pub fn economic_indicators(
    result: &ContractResult,
    config: &EconomicConfig,
) -> PscResult<EconomicIndicators> {
    evaluate_cashflow(
        result.cashflow(),
        &result.investment(),
        result.project_years(),
        config,
    )
}
