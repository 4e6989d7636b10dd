use rust_decimal::Decimal;

use crate::error::{check_fraction, check_len, check_year, PscError};
use crate::timeseries::{year_index, zeros};
use crate::types::{Money, Rate, Year};
use crate::PscResult;

/// The project window a cost is placed into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub start_year: Year,
    pub end_year: Year,
}

impl YearWindow {
    pub fn new(start_year: Year, end_year: Year) -> PscResult<Self> {
        if end_year < start_year {
            return Err(PscError::InvalidInput {
                field: "end_year".into(),
                reason: format!("End year {end_year} precedes start year {start_year}"),
            });
        }
        Ok(Self {
            start_year,
            end_year,
        })
    }

    pub fn duration(&self) -> usize {
        (self.end_year - self.start_year + 1) as usize
    }

    pub fn check(&self, field: &str, year: Year) -> PscResult<()> {
        check_year(field, year, self.start_year, self.end_year)
    }

    pub fn index(&self, year: Year) -> usize {
        year_index(year, self.start_year)
    }

    pub fn contains(&self, year: Year) -> bool {
        (self.start_year..=self.end_year).contains(&year)
    }
}

/// Cost inflated by the indirect tax share that is not discounted away:
/// `cost * (1 + tax_portion * tax_rate[year] * (1 - tax_discount))`.
///
/// `tax_rates` holds one rate per project year.
pub fn get_cost_adjustment_by_tax(
    cost: Money,
    expense_year: Year,
    tax_portion: Rate,
    tax_rates: &[Rate],
    tax_discount: Rate,
    window: YearWindow,
) -> PscResult<Money> {
    window.check("expense_year", expense_year)?;
    check_fraction("tax_portion", tax_portion)?;
    check_fraction("tax_discount", tax_discount)?;
    check_len("tax_rate", window.duration(), tax_rates.len())?;

    let rate = tax_rates[window.index(expense_year)];
    Ok(cost * (Decimal::ONE + tax_portion * rate * (Decimal::ONE - tax_discount)))
}

/// Cost escalated from `year_inflation` to its expense year by compounding
/// `1 + inflation_rate` of every year after the reference up to and
/// including the expense year. Costs at or before the reference year are
/// not escalated.
pub fn get_cost_adjustment_by_inflation(
    cost: Money,
    expense_year: Year,
    inflation_rates: &[Rate],
    year_inflation: Year,
    window: YearWindow,
) -> PscResult<Money> {
    window.check("expense_year", expense_year)?;
    window.check("year_inflation", year_inflation)?;
    check_len("inflation_rate", window.duration(), inflation_rates.len())?;

    let from = window.index(year_inflation) + 1;
    let to = window.index(expense_year);
    let multiplier: Decimal = (from..=to)
        .map(|i| Decimal::ONE + inflation_rates[i])
        .product();
    Ok(cost * multiplier)
}

/// Spread a lump cost evenly over `expense_year..=final_year`.
pub fn calc_distributed_cost(
    cost: Money,
    expense_year: Year,
    final_year: Year,
    window: YearWindow,
) -> PscResult<Vec<Money>> {
    window.check("expense_year", expense_year)?;
    window.check("final_year", final_year)?;
    if final_year < expense_year {
        return Err(PscError::InvalidInput {
            field: "final_year".into(),
            reason: format!("Final year {final_year} precedes expense year {expense_year}"),
        });
    }

    let installments = Decimal::from(final_year - expense_year + 1);
    let installment = cost / installments;
    let mut out = zeros(window.duration());
    for slot in &mut out[window.index(expense_year)..=window.index(final_year)] {
        *slot = installment;
    }
    Ok(out)
}

/// Place a lump cost at its expense year.
pub fn allocate_at_year(cost: Money, expense_year: Year, window: YearWindow) -> PscResult<Vec<Money>> {
    window.check("expense_year", expense_year)?;
    let mut out = zeros(window.duration());
    out[window.index(expense_year)] = cost;
    Ok(out)
}
