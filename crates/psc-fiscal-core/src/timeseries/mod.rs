//! Year-indexed array helpers shared by the cost containers and the engines.
//!
//! Every array in the engine is aligned to the project year axis
//! `start_year..=end_year`, index 0 being the start year.

pub mod cost_tools;
pub mod depreciation;

use rust_decimal::Decimal;

use crate::types::{Money, Year};

/// A zero-filled array of `len` years.
pub fn zeros(len: usize) -> Vec<Money> {
    vec![Decimal::ZERO; len]
}

/// Element-wise `a + b`.
pub fn add(a: &[Money], b: &[Money]) -> Vec<Money> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

/// Element-wise `a - b`.
pub fn sub(a: &[Money], b: &[Money]) -> Vec<Money> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}

/// Element-wise sum of any number of equally long arrays.
pub fn add_all(len: usize, arrays: &[&[Money]]) -> Vec<Money> {
    let mut out = zeros(len);
    for arr in arrays {
        for (o, v) in out.iter_mut().zip(arr.iter()) {
            *o += v;
        }
    }
    out
}

/// Running total.
pub fn cumsum(values: &[Money]) -> Vec<Money> {
    let mut acc = Decimal::ZERO;
    values
        .iter()
        .map(|v| {
            acc += v;
            acc
        })
        .collect()
}

pub fn total(values: &[Money]) -> Money {
    values.iter().copied().sum()
}

/// Index of `year` on an axis starting at `start_year`. Callers validate the range first.
pub fn year_index(year: Year, start_year: Year) -> usize {
    (year - start_year).max(0) as usize
}

/// The project year axis.
pub fn project_years(start_year: Year, end_year: Year) -> Vec<Year> {
    (start_year..=end_year).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_cumsum() {
        let c = cumsum(&[dec!(1), dec!(-2), dec!(5)]);
        assert_eq!(c, vec![dec!(1), dec!(-1), dec!(4)]);
    }

    #[test]
    fn test_add_all() {
        let a = [dec!(1), dec!(2)];
        let b = [dec!(10), dec!(20)];
        assert_eq!(add_all(2, &[&a, &b, &a]), vec![dec!(12), dec!(24)]);
    }

    #[test]
    fn test_project_years_inclusive() {
        assert_eq!(project_years(2020, 2023), vec![2020, 2021, 2022, 2023]);
    }
}
