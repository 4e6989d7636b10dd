//! Cost containers.
//!
//! A contract holds one `Vec` of lines per cost category. Every line knows
//! how to validate itself against the project window and how to turn itself
//! into a year-aligned expenditure array once the run's tax and inflation
//! schedules are known (the [`CostContext`]).

pub mod capital;
pub mod expensed;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use capital::CapitalCost;
pub use expensed::{AsrCost, CostOfSales, IntangibleCost, LbtCost, OpexCost};

use crate::error::{check_fraction, PscError};
use crate::timeseries::cost_tools::{
    get_cost_adjustment_by_inflation, get_cost_adjustment_by_tax, YearWindow,
};
use crate::timeseries::{add, add_all, zeros};
use crate::types::{DeprMethod, FluidType, InflationAppliedTo, Money, Rate, Volume, Year};
use crate::PscResult;

// ---------------------------------------------------------------------------
// Shared line terms
// ---------------------------------------------------------------------------

/// Fields every cost line carries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostTerms {
    pub expense_year: Year,
    /// Fluid the cost is charged to (oil or gas)
    #[serde(default)]
    pub allocation: FluidType,
    /// Share of the cost subject to indirect tax
    #[serde(default)]
    pub tax_portion: Rate,
    /// Share of the indirect tax waived
    #[serde(default)]
    pub tax_discount: Rate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl CostTerms {
    pub fn new(expense_year: Year, allocation: FluidType) -> Self {
        Self {
            expense_year,
            allocation,
            tax_portion: Decimal::ZERO,
            tax_discount: Decimal::ZERO,
            description: None,
        }
    }

    pub(crate) fn validate(&self, window: YearWindow) -> PscResult<()> {
        window.check("expense_year", self.expense_year)?;
        check_fraction("tax_portion", self.tax_portion)?;
        check_fraction("tax_discount", self.tax_discount)?;
        if !matches!(self.allocation, FluidType::Oil | FluidType::Gas) {
            return Err(PscError::InvalidInput {
                field: "allocation".into(),
                reason: format!("Costs are allocated to oil or gas, got {:?}", self.allocation),
            });
        }
        Ok(())
    }
}

pub(crate) fn check_non_negative(field: &str, value: Money) -> PscResult<()> {
    if value < Decimal::ZERO {
        return Err(PscError::InvalidInput {
            field: field.into(),
            reason: format!("Must not be negative, got {value}"),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Run context
// ---------------------------------------------------------------------------

/// Whether a line belongs to the capital or the operating side when
/// inflation is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CostClass {
    Capex,
    Opex,
}

/// Per-run schedules that turn nominal cost lines into adjusted arrays.
#[derive(Debug, Clone)]
pub struct CostContext {
    pub window: YearWindow,
    /// Indirect tax (VAT) rate per project year
    pub tax_rates: Vec<Rate>,
    /// Inflation rate per project year
    pub inflation_rates: Vec<Rate>,
    pub year_inflation: Year,
    pub inflation_applied_to: InflationAppliedTo,
}

impl CostContext {
    /// A context with no indirect tax and no inflation.
    pub fn plain(window: YearWindow) -> Self {
        Self {
            window,
            tax_rates: zeros(window.duration()),
            inflation_rates: zeros(window.duration()),
            year_inflation: window.start_year,
            inflation_applied_to: InflationAppliedTo::None,
        }
    }

    /// Tax adjustment first, inflation second when it covers the class.
    pub fn adjust(&self, cost: Money, terms: &CostTerms, class: CostClass) -> PscResult<Money> {
        let taxed = get_cost_adjustment_by_tax(
            cost,
            terms.expense_year,
            terms.tax_portion,
            &self.tax_rates,
            terms.tax_discount,
            self.window,
        )?;
        let inflate = match class {
            CostClass::Capex => self.inflation_applied_to.covers_capex(),
            CostClass::Opex => self.inflation_applied_to.covers_opex(),
        };
        if !inflate {
            return Ok(taxed);
        }
        get_cost_adjustment_by_inflation(
            taxed,
            terms.expense_year,
            &self.inflation_rates,
            self.year_inflation,
            self.window,
        )
    }
}

/// Behaviour shared by the expensed cost categories.
pub trait CostLine {
    fn terms(&self) -> &CostTerms;

    fn validate(&self, window: YearWindow) -> PscResult<()>;

    /// Unadjusted cash expenditure on the project axis.
    fn expenditures_pre_tax(&self, window: YearWindow) -> PscResult<Vec<Money>>;

    /// Tax and inflation adjusted expenditure on the project axis.
    fn expenditures(&self, ctx: &CostContext) -> PscResult<Vec<Money>>;
}

fn sum_lines<L: CostLine>(lines: &[L], fluid: FluidType, ctx: &CostContext) -> PscResult<Vec<Money>> {
    let mut out = zeros(ctx.window.duration());
    for line in lines.iter().filter(|l| l.terms().allocation == fluid) {
        out = add(&out, &line.expenditures(ctx)?);
    }
    Ok(out)
}

fn sum_lines_pre_tax<L: CostLine>(
    lines: &[L],
    fluid: FluidType,
    window: YearWindow,
) -> PscResult<Vec<Money>> {
    let mut out = zeros(window.duration());
    for line in lines.iter().filter(|l| l.terms().allocation == fluid) {
        out = add(&out, &line.expenditures_pre_tax(window)?);
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Cost book
// ---------------------------------------------------------------------------

/// Every cost line of a contract, grouped by category.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CostBook {
    #[serde(default)]
    pub capital: Vec<CapitalCost>,
    #[serde(default)]
    pub intangible: Vec<IntangibleCost>,
    #[serde(default)]
    pub opex: Vec<OpexCost>,
    #[serde(default)]
    pub asr: Vec<AsrCost>,
    #[serde(default)]
    pub lbt: Vec<LbtCost>,
    #[serde(default)]
    pub cost_of_sales: Vec<CostOfSales>,
}

/// Depreciation settings shared by every capital line of a run.
#[derive(Debug, Clone, Copy)]
pub struct DepreciationSettings {
    pub method: DeprMethod,
    pub decline_factor: Decimal,
}

impl CostBook {
    pub fn validate(&self, window: YearWindow) -> PscResult<()> {
        for line in &self.capital {
            line.validate(window)?;
        }
        for line in &self.intangible {
            line.validate(window)?;
        }
        for line in &self.opex {
            line.validate(window)?;
        }
        for line in &self.asr {
            line.validate(window)?;
        }
        for line in &self.lbt {
            line.validate(window)?;
        }
        for line in &self.cost_of_sales {
            line.validate(window)?;
        }
        Ok(())
    }

    /// Adjusted cost arrays of one fluid. `production` is the fluid's
    /// production rate, used by unit-of-production depreciation.
    pub fn fluid_costs(
        &self,
        fluid: FluidType,
        ctx: &CostContext,
        depreciation: DepreciationSettings,
        production: &[Volume],
    ) -> PscResult<FluidCosts> {
        let len = ctx.window.duration();
        let mut capital = zeros(len);
        let mut capital_pre_tax = zeros(len);
        let mut charges = zeros(len);
        let mut ic_base = zeros(len);
        let mut undepreciated = Decimal::ZERO;

        for line in self.capital.iter().filter(|l| l.terms.allocation == fluid) {
            let adjusted = line.adjusted_cost(ctx)?;
            let idx = ctx.window.index(line.terms.expense_year);
            capital[idx] += adjusted;
            capital_pre_tax[idx] += line.cost;
            if line.is_ic_applied {
                ic_base[idx] += adjusted;
            }
            let (line_charges, remainder) =
                line.depreciation(adjusted, ctx.window, depreciation, production)?;
            charges = add(&charges, &line_charges);
            undepreciated += remainder;
        }

        let intangible = sum_lines(&self.intangible, fluid, ctx)?;
        let opex = sum_lines(&self.opex, fluid, ctx)?;
        let asr = sum_lines(&self.asr, fluid, ctx)?;
        let lbt = sum_lines(&self.lbt, fluid, ctx)?;
        let cost_of_sales = sum_lines(&self.cost_of_sales, fluid, ctx)?;

        let non_capital_pre_tax = add_all(
            len,
            &[
                &sum_lines_pre_tax(&self.intangible, fluid, ctx.window)?,
                &sum_lines_pre_tax(&self.opex, fluid, ctx.window)?,
                &sum_lines_pre_tax(&self.asr, fluid, ctx.window)?,
                &sum_lines_pre_tax(&self.lbt, fluid, ctx.window)?,
                &sum_lines_pre_tax(&self.cost_of_sales, fluid, ctx.window)?,
            ],
        );

        Ok(FluidCosts {
            capital,
            capital_pre_tax,
            intangible,
            opex,
            asr,
            lbt,
            cost_of_sales,
            non_capital_pre_tax,
            depreciation: charges,
            undepreciated,
            ic_base,
        })
    }
}

/// Adjusted cost arrays of one fluid on the project axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluidCosts {
    /// Capital expenditure in its expense year
    pub capital: Vec<Money>,
    pub capital_pre_tax: Vec<Money>,
    pub intangible: Vec<Money>,
    pub opex: Vec<Money>,
    pub asr: Vec<Money>,
    pub lbt: Vec<Money>,
    pub cost_of_sales: Vec<Money>,
    pub non_capital_pre_tax: Vec<Money>,
    pub depreciation: Vec<Money>,
    /// Adjusted capital cost not depreciated by the end year
    pub undepreciated: Money,
    /// Capital expenditure of lines eligible for investment credit
    pub ic_base: Vec<Money>,
}

impl FluidCosts {
    /// Intangible + OPEX + ASR + LBT + cost of sales.
    pub fn non_capital(&self) -> Vec<Money> {
        add_all(
            self.capital.len(),
            &[
                &self.intangible,
                &self.opex,
                &self.asr,
                &self.lbt,
                &self.cost_of_sales,
            ],
        )
    }

    /// Capital and non-capital cash expenditure.
    pub fn total_expenditures(&self) -> Vec<Money> {
        add(&self.capital, &self.non_capital())
    }

    /// Capital and non-capital expenditure before tax and inflation.
    pub fn total_expenditures_pre_tax(&self) -> Vec<Money> {
        add(&self.capital_pre_tax, &self.non_capital_pre_tax)
    }

    pub fn investment(&self) -> Vec<Money> {
        add(&self.capital, &self.intangible)
    }

    /// Remove `reduction` (other revenue routed to opex) from the OPEX array.
    pub fn reduce_opex(&mut self, reduction: &[Money]) {
        for (o, r) in self.opex.iter_mut().zip(reduction) {
            *o -= r;
        }
        for (o, r) in self.non_capital_pre_tax.iter_mut().zip(reduction) {
            *o -= r;
        }
    }
}
