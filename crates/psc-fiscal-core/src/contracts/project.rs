//! Inputs shared by both contract types and their preparation into
//! year-aligned per-fluid arrays.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::costs::{CostBook, CostContext, DepreciationSettings, FluidCosts};
use crate::error::PscError;
use crate::lifting::{Lifting, LiftingSeries};
use crate::timeseries::cost_tools::YearWindow;
use crate::timeseries::{add, project_years};
use crate::types::{
    DeprMethod, FluidType, InflationAppliedTo, Money, OtherRevenue, Rate, RateSchedule, TaxRegime,
    Year,
};
use crate::PscResult;

use super::psc_tools::{check_sunk_cost_reference_year, effective_tax_rate};

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Dates, liftings and cost lines of a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Defaults to January 1st of the first year with oil revenue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oil_onstream_date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gas_onstream_date: Option<NaiveDate>,
    #[serde(default)]
    pub lifting: Vec<Lifting>,
    #[serde(default)]
    pub costs: CostBook,
}

/// Options of a single run, shared by both contract types.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOptions {
    #[serde(default = "default_sulfur_revenue")]
    pub sulfur_revenue: OtherRevenue,
    #[serde(default = "default_electricity_revenue")]
    pub electricity_revenue: OtherRevenue,
    #[serde(default = "default_co2_revenue")]
    pub co2_revenue: OtherRevenue,
    /// Blend the DMO fee over the year the holiday ends in
    #[serde(default)]
    pub dmo_end_weighted: bool,
    #[serde(default)]
    pub tax_regime: TaxRegime,
    /// Explicit income tax rate, overrides `tax_regime`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax_rate: Option<RateSchedule>,
    /// Defaults to the start year
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunk_cost_reference_year: Option<Year>,
    #[serde(default)]
    pub depr_method: DeprMethod,
    #[serde(default = "default_decline_factor")]
    pub decline_factor: Decimal,
    /// Indirect tax (VAT) rate applied through each line's tax portion
    #[serde(default)]
    pub vat_rate: RateSchedule,
    #[serde(default)]
    pub inflation_rate: RateSchedule,
    /// Base year of cost escalation. Defaults to the start year.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub year_inflation: Option<Year>,
    #[serde(default)]
    pub inflation_applied_to: InflationAppliedTo,
}

fn default_sulfur_revenue() -> OtherRevenue {
    OtherRevenue::AdditionToGasRevenue
}

fn default_electricity_revenue() -> OtherRevenue {
    OtherRevenue::AdditionToOilRevenue
}

fn default_co2_revenue() -> OtherRevenue {
    OtherRevenue::AdditionToGasRevenue
}

fn default_decline_factor() -> Decimal {
    Decimal::TWO
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            sulfur_revenue: default_sulfur_revenue(),
            electricity_revenue: default_electricity_revenue(),
            co2_revenue: default_co2_revenue(),
            dmo_end_weighted: false,
            tax_regime: TaxRegime::default(),
            tax_rate: None,
            sunk_cost_reference_year: None,
            depr_method: DeprMethod::default(),
            decline_factor: default_decline_factor(),
            vat_rate: RateSchedule::default(),
            inflation_rate: RateSchedule::default(),
            year_inflation: None,
            inflation_applied_to: InflationAppliedTo::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Prepared arrays
// ---------------------------------------------------------------------------

/// Revenue and cost arrays of one fluid before any fiscal terms apply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidBase {
    pub lifting: LiftingSeries,
    /// Revenue including other revenue routed to this fluid
    pub revenue: Vec<Money>,
    pub wap_price: Vec<Money>,
    pub costs: FluidCosts,
    pub onstream: NaiveDate,
}

/// A validated project with every fluid's base arrays.
#[derive(Debug, Clone)]
pub struct PreparedProject {
    pub window: YearWindow,
    pub project_years: Vec<Year>,
    pub oil: FluidBase,
    pub gas: FluidBase,
    pub tax_rate: Vec<Rate>,
    pub sunk_cost_reference_year: Year,
}

impl PreparedProject {
    pub fn sunk_reference_index(&self) -> usize {
        self.window.index(self.sunk_cost_reference_year)
    }

    pub fn onstream_years(&self) -> [Year; 2] {
        [self.oil.onstream.year(), self.gas.onstream.year()]
    }
}

impl Project {
    pub fn window(&self) -> PscResult<YearWindow> {
        YearWindow::new(self.start_date.year(), self.end_date.year())
    }

    fn cost_context(&self, options: &RunOptions, window: YearWindow) -> PscResult<CostContext> {
        let year_inflation = options.year_inflation.unwrap_or(window.start_year);
        window.check("year_inflation", year_inflation)?;
        let tax_rates = options.vat_rate.resolve("vat_rate", window.duration())?;
        for rate in &tax_rates {
            crate::error::check_fraction("vat_rate", *rate)?;
        }
        Ok(CostContext {
            window,
            tax_rates,
            inflation_rates: options
                .inflation_rate
                .resolve("inflation_rate", window.duration())?,
            year_inflation,
            inflation_applied_to: options.inflation_applied_to,
        })
    }

    fn onstream(
        &self,
        explicit: Option<NaiveDate>,
        fluid: FluidType,
        series: &LiftingSeries,
        window: YearWindow,
    ) -> PscResult<NaiveDate> {
        let first_revenue = series.first_revenue_year(window);
        match (explicit, first_revenue) {
            (Some(date), first) => {
                window.check(&format!("{fluid:?}_onstream_date").to_lowercase(), date.year())?;
                if let Some(first) = first {
                    if first != date.year() {
                        return Err(PscError::InvalidInput {
                            field: format!("{fluid:?}_onstream_date").to_lowercase(),
                            reason: format!(
                                "Onstream year {} differs from the first year with revenue {first}",
                                date.year()
                            ),
                        });
                    }
                }
                Ok(date)
            }
            (None, Some(first)) => NaiveDate::from_ymd_opt(first, 1, 1)
                .ok_or_else(|| PscError::DateError(format!("Invalid onstream year {first}"))),
            (None, None) => Ok(self.end_date),
        }
    }

    /// Validate every input and build the per-fluid base arrays.
    pub fn prepare(&self, options: &RunOptions) -> PscResult<PreparedProject> {
        if self.end_date < self.start_date {
            return Err(PscError::InvalidInput {
                field: "end_date".into(),
                reason: format!("End date {} precedes start date {}", self.end_date, self.start_date),
            });
        }
        let window = self.window()?;
        for lifting in &self.lifting {
            lifting.validate(window)?;
        }
        self.costs.validate(window)?;
        if options.decline_factor <= Decimal::ZERO {
            return Err(PscError::InvalidInput {
                field: "decline_factor".into(),
                reason: "Decline factor must be positive".into(),
            });
        }
        let ctx = self.cost_context(options, window)?;
        let tax_rate = effective_tax_rate(options.tax_regime, options.tax_rate.as_ref(), window)?;

        let oil_lifting = LiftingSeries::aggregate(&self.lifting, FluidType::Oil, window)?;
        let gas_lifting = LiftingSeries::aggregate(&self.lifting, FluidType::Gas, window)?;
        let oil_onstream = self.onstream(self.oil_onstream_date, FluidType::Oil, &oil_lifting, window)?;
        let gas_onstream = self.onstream(self.gas_onstream_date, FluidType::Gas, &gas_lifting, window)?;

        let sunk_cost_reference_year = options.sunk_cost_reference_year.unwrap_or(window.start_year);
        check_sunk_cost_reference_year(
            sunk_cost_reference_year,
            window,
            &[oil_onstream.year(), gas_onstream.year()],
        )?;

        let depreciation = DepreciationSettings {
            method: options.depr_method,
            decline_factor: options.decline_factor,
        };
        let mut oil_costs = self.costs.fluid_costs(
            FluidType::Oil,
            &ctx,
            depreciation,
            &oil_lifting.production_rate,
        )?;
        let mut gas_costs = self.costs.fluid_costs(
            FluidType::Gas,
            &ctx,
            depreciation,
            &gas_lifting.production_rate,
        )?;

        let mut oil_revenue = oil_lifting.revenue.clone();
        let mut gas_revenue = gas_lifting.revenue.clone();
        for (fluid, route) in [
            (FluidType::Sulfur, options.sulfur_revenue),
            (FluidType::Electricity, options.electricity_revenue),
            (FluidType::Co2, options.co2_revenue),
        ] {
            let revenue = LiftingSeries::aggregate(&self.lifting, fluid, window)?.revenue;
            match route {
                OtherRevenue::AdditionToOilRevenue => oil_revenue = add(&oil_revenue, &revenue),
                OtherRevenue::AdditionToGasRevenue => gas_revenue = add(&gas_revenue, &revenue),
                OtherRevenue::ReductionToOilOpex => oil_costs.reduce_opex(&revenue),
                OtherRevenue::ReductionToGasOpex => gas_costs.reduce_opex(&revenue),
            }
        }

        Ok(PreparedProject {
            project_years: project_years(window.start_year, window.end_year),
            window,
            oil: FluidBase {
                wap_price: oil_lifting.wap_price(),
                lifting: oil_lifting,
                revenue: oil_revenue,
                costs: oil_costs,
                onstream: oil_onstream,
            },
            gas: FluidBase {
                wap_price: gas_lifting.wap_price(),
                lifting: gas_lifting,
                revenue: gas_revenue,
                costs: gas_costs,
                onstream: gas_onstream,
            },
            tax_rate,
            sunk_cost_reference_year,
        })
    }
}
