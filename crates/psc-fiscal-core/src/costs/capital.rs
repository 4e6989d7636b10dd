use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{check_non_negative, CostClass, CostContext, CostTerms, DepreciationSettings};
use crate::error::{check_fraction, PscError};
use crate::timeseries::cost_tools::YearWindow;
use crate::timeseries::depreciation::{
    declining_balance_rate, psc_declining_balance_rate, straight_line_rate,
    unit_of_production_rate,
};
use crate::timeseries::zeros;
use crate::types::{DeprMethod, Money, Rate, Volume, Year};
use crate::PscResult;

/// A tangible (depreciable) cost line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalCost {
    pub cost: Money,
    #[serde(flatten)]
    pub terms: CostTerms,
    /// Placed-in-service year; depreciation starts here. Defaults to the expense year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pis_year: Option<Year>,
    #[serde(default)]
    pub salvage_value: Money,
    #[serde(default = "default_useful_life")]
    pub useful_life: u32,
    /// Per-period rate of the PSC declining-balance method
    #[serde(default = "default_depreciation_factor")]
    pub depreciation_factor: Rate,
    /// Eligible for investment credit
    #[serde(default)]
    pub is_ic_applied: bool,
}

fn default_useful_life() -> u32 {
    5
}

fn default_depreciation_factor() -> Rate {
    Decimal::new(5, 1)
}

impl CapitalCost {
    pub fn new(cost: Money, terms: CostTerms, useful_life: u32) -> Self {
        Self {
            cost,
            terms,
            pis_year: None,
            salvage_value: Decimal::ZERO,
            useful_life,
            depreciation_factor: default_depreciation_factor(),
            is_ic_applied: false,
        }
    }

    pub fn placed_in_service(&self) -> Year {
        self.pis_year.unwrap_or(self.terms.expense_year)
    }

    pub fn validate(&self, window: YearWindow) -> PscResult<()> {
        self.terms.validate(window)?;
        check_non_negative("cost", self.cost)?;
        check_fraction("depreciation_factor", self.depreciation_factor)?;
        let pis = self.placed_in_service();
        window.check("pis_year", pis)?;
        if pis < self.terms.expense_year {
            return Err(PscError::InvalidInput {
                field: "pis_year".into(),
                reason: format!(
                    "Placed in service {pis} before expense year {}",
                    self.terms.expense_year
                ),
            });
        }
        if self.useful_life == 0 {
            return Err(PscError::InvalidInput {
                field: "useful_life".into(),
                reason: "Useful life must be at least one year".into(),
            });
        }
        if self.salvage_value < Decimal::ZERO || self.salvage_value > self.cost {
            return Err(PscError::InvalidInput {
                field: "salvage_value".into(),
                reason: format!("Salvage value {} must lie in [0, {}]", self.salvage_value, self.cost),
            });
        }
        Ok(())
    }

    pub fn adjusted_cost(&self, ctx: &CostContext) -> PscResult<Money> {
        ctx.adjust(self.cost, &self.terms, CostClass::Capex)
    }

    /// Depreciation of `adjusted_cost` on the project axis, starting at the
    /// placed-in-service year and truncated at the end year, with the
    /// amount left undepreciated at the end year.
    pub fn depreciation(
        &self,
        adjusted_cost: Money,
        window: YearWindow,
        settings: DepreciationSettings,
        production: &[Volume],
    ) -> PscResult<(Vec<Money>, Money)> {
        let start = window.index(self.placed_in_service());
        let horizon = window.duration() - start;
        // Salvage is stated on the nominal cost; scale it with the adjustment.
        let salvage = if self.cost.is_zero() {
            Decimal::ZERO
        } else {
            self.salvage_value * adjusted_cost / self.cost
        };

        let schedule = match settings.method {
            DeprMethod::StraightLine => {
                straight_line_rate(adjusted_cost, salvage, self.useful_life, horizon)?
            }
            DeprMethod::DecliningBalance => declining_balance_rate(
                adjusted_cost,
                salvage,
                self.useful_life,
                settings.decline_factor,
                horizon,
            )?,
            DeprMethod::PscDecliningBalance => psc_declining_balance_rate(
                adjusted_cost,
                self.useful_life,
                self.depreciation_factor,
                horizon,
            )?,
            DeprMethod::UnitOfProduction => {
                let remaining = &production[start..];
                let reserves: Volume = remaining.iter().copied().sum();
                if reserves.is_zero() {
                    tracing::warn!(
                        pis_year = self.placed_in_service(),
                        "no production after placed-in-service year, capital cost left undepreciated"
                    );
                    zeros(horizon)
                } else {
                    unit_of_production_rate(adjusted_cost, salvage, reserves, remaining, horizon)?
                }
            }
        };

        let mut charges = zeros(window.duration());
        for (slot, charge) in charges[start..].iter_mut().zip(&schedule) {
            *slot = *charge;
        }
        let charged: Money = charges.iter().copied().sum();
        Ok((charges, adjusted_cost - charged))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FluidType;
    use rust_decimal_macros::dec;

    fn window() -> YearWindow {
        YearWindow::new(2020, 2024).unwrap()
    }

    fn line(cost: Money, year: Year, life: u32) -> CapitalCost {
        CapitalCost::new(cost, CostTerms::new(year, FluidType::Oil), life)
    }

    #[test]
    fn test_depreciation_truncated_at_end_year() {
        let asset = line(dec!(1000), 2022, 5);
        let settings = DepreciationSettings {
            method: DeprMethod::StraightLine,
            decline_factor: dec!(2),
        };
        let (charges, left) = asset
            .depreciation(dec!(1000), window(), settings, &zeros(5))
            .unwrap();
        assert_eq!(charges, vec![dec!(0), dec!(0), dec!(200), dec!(200), dec!(200)]);
        assert_eq!(left, dec!(400));
    }

    #[test]
    fn test_psc_declining_balance_from_pis_year() {
        let mut asset = line(dec!(1000), 2020, 3);
        asset.pis_year = Some(2021);
        let settings = DepreciationSettings {
            method: DeprMethod::PscDecliningBalance,
            decline_factor: dec!(2),
        };
        let (charges, left) = asset
            .depreciation(dec!(1000), window(), settings, &zeros(5))
            .unwrap();
        assert_eq!(charges, vec![dec!(0), dec!(500), dec!(250), dec!(250), dec!(0)]);
        assert_eq!(left, Decimal::ZERO);
    }

    #[test]
    fn test_unit_of_production_uses_remaining_production() {
        let asset = line(dec!(900), 2021, 5);
        let settings = DepreciationSettings {
            method: DeprMethod::UnitOfProduction,
            decline_factor: dec!(2),
        };
        let production = [dec!(50), dec!(10), dec!(20), dec!(0), dec!(0)];
        let (charges, left) = asset
            .depreciation(dec!(900), window(), settings, &production)
            .unwrap();
        assert_eq!(charges, vec![dec!(0), dec!(300), dec!(600), dec!(0), dec!(0)]);
        assert_eq!(left, Decimal::ZERO);
    }

    #[test]
    fn test_pis_before_expense_rejected() {
        let mut asset = line(dec!(100), 2022, 5);
        asset.pis_year = Some(2021);
        assert!(matches!(
            asset.validate(window()).unwrap_err(),
            PscError::InvalidInput { .. }
        ));
    }
}
