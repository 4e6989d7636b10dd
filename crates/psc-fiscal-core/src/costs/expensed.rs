use rust_decimal::prelude::*;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::{check_non_negative, CostClass, CostContext, CostLine, CostTerms};
use crate::error::PscError;
use crate::timeseries::cost_tools::{allocate_at_year, calc_distributed_cost, YearWindow};
use crate::types::{Money, Rate, Volume, Year};
use crate::PscResult;

/// Land-and-building tax tariff applied to the taxable sale value
const LBT_TARIFF: Decimal = dec!(0.005);
/// Share of the sale value that is taxable
const LBT_TAXABLE_SHARE: Decimal = dec!(0.4);
/// Subsurface sale-value multiplier on gross revenue
const LBT_SUBSURFACE_MULTIPLIER: Decimal = dec!(10.04);

// ---------------------------------------------------------------------------
// Intangible
// ---------------------------------------------------------------------------

/// Intangible drilling and development cost, expensed in its year.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntangibleCost {
    pub cost: Money,
    #[serde(flatten)]
    pub terms: CostTerms,
}

impl CostLine for IntangibleCost {
    fn terms(&self) -> &CostTerms {
        &self.terms
    }

    fn validate(&self, window: YearWindow) -> PscResult<()> {
        self.terms.validate(window)?;
        check_non_negative("cost", self.cost)
    }

    fn expenditures_pre_tax(&self, window: YearWindow) -> PscResult<Vec<Money>> {
        allocate_at_year(self.cost, self.terms.expense_year, window)
    }

    fn expenditures(&self, ctx: &CostContext) -> PscResult<Vec<Money>> {
        let adjusted = ctx.adjust(self.cost, &self.terms, CostClass::Capex)?;
        allocate_at_year(adjusted, self.terms.expense_year, ctx.window)
    }
}

// ---------------------------------------------------------------------------
// OPEX
// ---------------------------------------------------------------------------

/// Operating cost: a fixed part plus a part proportional to production.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpexCost {
    #[serde(default)]
    pub fixed_cost: Money,
    #[serde(default)]
    pub prod_rate: Volume,
    #[serde(default)]
    pub cost_per_volume: Money,
    #[serde(flatten)]
    pub terms: CostTerms,
}

impl OpexCost {
    pub fn cost(&self) -> Money {
        self.fixed_cost + self.prod_rate * self.cost_per_volume
    }
}

impl CostLine for OpexCost {
    fn terms(&self) -> &CostTerms {
        &self.terms
    }

    fn validate(&self, window: YearWindow) -> PscResult<()> {
        self.terms.validate(window)?;
        check_non_negative("fixed_cost", self.fixed_cost)?;
        check_non_negative("prod_rate", self.prod_rate)?;
        check_non_negative("cost_per_volume", self.cost_per_volume)
    }

    fn expenditures_pre_tax(&self, window: YearWindow) -> PscResult<Vec<Money>> {
        allocate_at_year(self.cost(), self.terms.expense_year, window)
    }

    fn expenditures(&self, ctx: &CostContext) -> PscResult<Vec<Money>> {
        let adjusted = ctx.adjust(self.cost(), &self.terms, CostClass::Opex)?;
        allocate_at_year(adjusted, self.terms.expense_year, ctx.window)
    }
}

// ---------------------------------------------------------------------------
// ASR
// ---------------------------------------------------------------------------

/// Abandonment and site restoration fund contribution. The cost is
/// grown to its future value at the end of the project and collected in
/// equal installments from the expense year to `final_year`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsrCost {
    pub cost: Money,
    #[serde(flatten)]
    pub terms: CostTerms,
    /// Defaults to the project end year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_year: Option<Year>,
    #[serde(default = "default_future_rate")]
    pub future_rate: Rate,
}

fn default_future_rate() -> Rate {
    dec!(0.02)
}

impl AsrCost {
    fn final_year(&self, window: YearWindow) -> Year {
        self.final_year.unwrap_or(window.end_year)
    }

    /// `cost * (1 + future_rate)^(end_year - expense_year + 1)`
    pub fn future_value(&self, cost: Money, window: YearWindow) -> Money {
        let periods = i64::from(window.end_year - self.terms.expense_year + 1);
        cost * (Decimal::ONE + self.future_rate).powi(periods)
    }
}

impl CostLine for AsrCost {
    fn terms(&self) -> &CostTerms {
        &self.terms
    }

    fn validate(&self, window: YearWindow) -> PscResult<()> {
        self.terms.validate(window)?;
        check_non_negative("cost", self.cost)?;
        check_non_negative("future_rate", self.future_rate)?;
        validate_final_year(self.final_year(window), self.terms.expense_year, window)
    }

    fn expenditures_pre_tax(&self, window: YearWindow) -> PscResult<Vec<Money>> {
        calc_distributed_cost(
            self.cost,
            self.terms.expense_year,
            self.final_year(window),
            window,
        )
    }

    fn expenditures(&self, ctx: &CostContext) -> PscResult<Vec<Money>> {
        let adjusted = ctx.adjust(self.cost, &self.terms, CostClass::Opex)?;
        calc_distributed_cost(
            self.future_value(adjusted, ctx.window),
            self.terms.expense_year,
            self.final_year(ctx.window),
            ctx.window,
        )
    }
}

fn validate_final_year(final_year: Year, expense_year: Year, window: YearWindow) -> PscResult<()> {
    window.check("final_year", final_year)?;
    if final_year < expense_year {
        return Err(PscError::InvalidInput {
            field: "final_year".into(),
            reason: format!("Final year {final_year} precedes expense year {expense_year}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// LBT
// ---------------------------------------------------------------------------

/// Land and building tax. Either a stated `cost` or the object values to
/// derive it from, spread from the expense year to `final_year`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LbtCost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Money>,
    #[serde(flatten)]
    pub terms: CostTerms,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub final_year: Option<Year>,
    #[serde(default)]
    pub utilized_land_area: Decimal,
    #[serde(default)]
    pub land_njop: Money,
    #[serde(default)]
    pub utilized_building_area: Decimal,
    #[serde(default)]
    pub building_njop: Money,
    /// Gross revenue the subsurface object value is based on
    #[serde(default)]
    pub gross_revenue: Money,
}

impl LbtCost {
    fn final_year(&self, window: YearWindow) -> Year {
        self.final_year.unwrap_or(window.end_year)
    }

    /// Stated cost, or surface plus subsurface tax derived from object values.
    pub fn cost(&self) -> Money {
        if let Some(cost) = self.cost {
            return cost;
        }
        let surface = self.utilized_land_area * self.land_njop
            + self.utilized_building_area * self.building_njop;
        let subsurface = LBT_SUBSURFACE_MULTIPLIER * self.gross_revenue;
        LBT_TARIFF * LBT_TAXABLE_SHARE * (surface + subsurface)
    }
}

impl CostLine for LbtCost {
    fn terms(&self) -> &CostTerms {
        &self.terms
    }

    fn validate(&self, window: YearWindow) -> PscResult<()> {
        self.terms.validate(window)?;
        check_non_negative("cost", self.cost())?;
        validate_final_year(self.final_year(window), self.terms.expense_year, window)
    }

    fn expenditures_pre_tax(&self, window: YearWindow) -> PscResult<Vec<Money>> {
        calc_distributed_cost(
            self.cost(),
            self.terms.expense_year,
            self.final_year(window),
            window,
        )
    }

    fn expenditures(&self, ctx: &CostContext) -> PscResult<Vec<Money>> {
        let adjusted = ctx.adjust(self.cost(), &self.terms, CostClass::Opex)?;
        calc_distributed_cost(
            adjusted,
            self.terms.expense_year,
            self.final_year(ctx.window),
            ctx.window,
        )
    }
}

// ---------------------------------------------------------------------------
// Cost of sales
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostOfSales {
    pub cost: Money,
    #[serde(flatten)]
    pub terms: CostTerms,
}

impl CostLine for CostOfSales {
    fn terms(&self) -> &CostTerms {
        &self.terms
    }

    fn validate(&self, window: YearWindow) -> PscResult<()> {
        self.terms.validate(window)?;
        check_non_negative("cost", self.cost)
    }

    fn expenditures_pre_tax(&self, window: YearWindow) -> PscResult<Vec<Money>> {
        allocate_at_year(self.cost, self.terms.expense_year, window)
    }

    fn expenditures(&self, ctx: &CostContext) -> PscResult<Vec<Money>> {
        let adjusted = ctx.adjust(self.cost, &self.terms, CostClass::Opex)?;
        allocate_at_year(adjusted, self.terms.expense_year, ctx.window)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FluidType;

    fn window() -> YearWindow {
        YearWindow::new(2020, 2023).unwrap()
    }

    #[test]
    fn test_asr_future_value_spread() {
        let asr = AsrCost {
            cost: dec!(100),
            terms: CostTerms::new(2022, FluidType::Oil),
            final_year: None,
            future_rate: dec!(0.1),
        };
        let ctx = CostContext::plain(window());
        // 100 * 1.1^2 = 121 spread over 2022 and 2023
        let out = asr.expenditures(&ctx).unwrap();
        assert_eq!(out, vec![dec!(0), dec!(0), dec!(60.5), dec!(60.5)]);
    }

    #[test]
    fn test_lbt_cost_derived_from_object_values() {
        let lbt = LbtCost {
            cost: None,
            terms: CostTerms::new(2020, FluidType::Gas),
            final_year: Some(2021),
            utilized_land_area: dec!(100),
            land_njop: dec!(10),
            utilized_building_area: dec!(0),
            building_njop: dec!(0),
            gross_revenue: dec!(1000),
        };
        // 0.005 * 0.4 * (1000 + 10040)
        assert_eq!(lbt.cost(), dec!(22.08));
        let out = lbt.expenditures_pre_tax(window()).unwrap();
        assert_eq!(out, vec![dec!(11.04), dec!(11.04), dec!(0), dec!(0)]);
    }

    #[test]
    fn test_opex_fixed_plus_variable() {
        let opex = OpexCost {
            fixed_cost: dec!(5),
            prod_rate: dec!(3),
            cost_per_volume: dec!(2),
            terms: CostTerms::new(2021, FluidType::Oil),
        };
        assert_eq!(opex.cost(), dec!(11));
    }

    #[test]
    fn test_asr_final_year_before_expense_rejected() {
        let asr = AsrCost {
            cost: dec!(100),
            terms: CostTerms::new(2022, FluidType::Oil),
            final_year: Some(2021),
            future_rate: dec!(0.02),
        };
        assert!(matches!(
            asr.validate(window()).unwrap_err(),
            PscError::InvalidInput { .. }
        ));
    }
}
