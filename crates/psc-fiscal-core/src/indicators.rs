//! Economic indicators over a yearly cash flow: five NPV conventions, IRR,
//! payout time, PV ratio and profitability index.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::{check_len, PscError};
use crate::types::{DiscountingMode, Money, NpvMode, Rate, Year};
use crate::PscResult;

const CONVERGENCE_THRESHOLD: Decimal = dec!(0.0000001);
const MAX_IRR_ITERATIONS: u32 = 100;
const IRR_GUESS: Rate = dec!(0.1);
const IRR_FLOOR: Rate = dec!(-0.99);
const IRR_CEILING: Rate = dec!(100);

/// Rates probed for a sign change when Newton-Raphson fails.
const IRR_BRACKETS: &[Rate] = &[
    dec!(-0.9),
    dec!(-0.5),
    dec!(-0.2),
    dec!(0),
    dec!(0.1),
    dec!(0.25),
    dec!(0.5),
    dec!(1),
    dec!(2),
    dec!(5),
    dec!(10),
];

// ---------------------------------------------------------------------------
// NPV
// ---------------------------------------------------------------------------

/// Discounting parameters shared by every NPV convention.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiscountSettings {
    pub discount_rate: Rate,
    /// Used by real-terms NPV only
    pub inflation_rate: Rate,
    pub reference_year: Year,
    pub discounting_mode: DiscountingMode,
}

fn validate_rate(field: &str, rate: Rate) -> PscResult<()> {
    if rate <= dec!(-1) {
        return Err(PscError::InvalidInput {
            field: field.into(),
            reason: "Rate must be greater than -100%".into(),
        });
    }
    Ok(())
}

fn validate_series(cashflow: &[Money], years: &[Year]) -> PscResult<()> {
    check_len("cashflow_years", cashflow.len(), years.len())?;
    if cashflow.is_empty() {
        return Err(PscError::InsufficientData(
            "NPV requires at least one cash flow".into(),
        ));
    }
    Ok(())
}

/// Discount exponent for a period count; mid-year discounting pulls every
/// positive exponent half a year closer.
fn exponent(periods: i64, mode: DiscountingMode) -> Decimal {
    let t = Decimal::from(periods);
    match mode {
        DiscountingMode::MidYear if periods > 0 => t - dec!(0.5),
        _ => t,
    }
}

fn discount(cf: Money, rate: Rate, periods: i64, mode: DiscountingMode) -> Money {
    if periods <= 0 {
        return cf;
    }
    cf / (Decimal::ONE + rate).powd(exponent(periods, mode))
}

/// Nominal terms: discounted to the reference year; earlier years are taken
/// at face value.
pub fn npv_nominal_terms(
    cashflow: &[Money],
    years: &[Year],
    settings: &DiscountSettings,
) -> PscResult<Money> {
    validate_series(cashflow, years)?;
    validate_rate("discount_rate", settings.discount_rate)?;
    Ok(cashflow
        .iter()
        .zip(years)
        .map(|(cf, y)| {
            discount(
                *cf,
                settings.discount_rate,
                i64::from(y - settings.reference_year),
                settings.discounting_mode,
            )
        })
        .sum())
}

/// Real terms: years before the reference year are inflated forward to it,
/// later years discounted back.
pub fn npv_real_terms(
    cashflow: &[Money],
    years: &[Year],
    settings: &DiscountSettings,
) -> PscResult<Money> {
    validate_series(cashflow, years)?;
    validate_rate("discount_rate", settings.discount_rate)?;
    validate_rate("inflation_rate", settings.inflation_rate)?;
    let inflation = Decimal::ONE + settings.inflation_rate;
    Ok(cashflow
        .iter()
        .zip(years)
        .map(|(cf, y)| {
            let offset = i64::from(y - settings.reference_year);
            if offset < 0 {
                cf * inflation.powi(-offset)
            } else {
                discount(
                    *cf,
                    settings.discount_rate,
                    offset,
                    settings.discounting_mode,
                )
            }
        })
        .sum())
}

/// SKK nominal terms: every year discounted back to the first project year.
pub fn npv_skk_nominal_terms(
    cashflow: &[Money],
    years: &[Year],
    settings: &DiscountSettings,
) -> PscResult<Money> {
    validate_series(cashflow, years)?;
    validate_rate("discount_rate", settings.discount_rate)?;
    let first = years[0];
    Ok(cashflow
        .iter()
        .zip(years)
        .map(|(cf, y)| {
            discount(
                *cf,
                settings.discount_rate,
                i64::from(y - first),
                settings.discounting_mode,
            )
        })
        .sum())
}

/// SKK real terms: discounted to the reference year, with years before it
/// compounded forward at the discount rate.
pub fn npv_skk_real_terms(
    cashflow: &[Money],
    years: &[Year],
    settings: &DiscountSettings,
) -> PscResult<Money> {
    validate_series(cashflow, years)?;
    validate_rate("discount_rate", settings.discount_rate)?;
    let one_plus_r = Decimal::ONE + settings.discount_rate;
    Ok(cashflow
        .iter()
        .zip(years)
        .map(|(cf, y)| {
            let offset = i64::from(y - settings.reference_year);
            if offset < 0 {
                cf * one_plus_r.powi(-offset)
            } else {
                discount(
                    *cf,
                    settings.discount_rate,
                    offset,
                    settings.discounting_mode,
                )
            }
        })
        .sum())
}

/// Point forward: cash flow before the reference year is ignored, the rest
/// discounted to it.
pub fn npv_point_forward(
    cashflow: &[Money],
    years: &[Year],
    settings: &DiscountSettings,
) -> PscResult<Money> {
    validate_series(cashflow, years)?;
    validate_rate("discount_rate", settings.discount_rate)?;
    Ok(cashflow
        .iter()
        .zip(years)
        .filter(|(_, y)| **y >= settings.reference_year)
        .map(|(cf, y)| {
            discount(
                *cf,
                settings.discount_rate,
                i64::from(y - settings.reference_year),
                settings.discounting_mode,
            )
        })
        .sum())
}

/// NPV under the selected convention.
pub fn npv(
    mode: NpvMode,
    cashflow: &[Money],
    years: &[Year],
    settings: &DiscountSettings,
) -> PscResult<Money> {
    match mode {
        NpvMode::NominalTerms => npv_nominal_terms(cashflow, years, settings),
        NpvMode::RealTerms => npv_real_terms(cashflow, years, settings),
        NpvMode::SkkNominalTerms => npv_skk_nominal_terms(cashflow, years, settings),
        NpvMode::SkkRealTerms => npv_skk_real_terms(cashflow, years, settings),
        NpvMode::PointForward => npv_point_forward(cashflow, years, settings),
    }
}

// ---------------------------------------------------------------------------
// IRR
// ---------------------------------------------------------------------------

/// NPV at `rate` with the first flow undiscounted and its derivative.
/// `None` when the discount factors leave decimal range.
fn npv_and_slope(rate: Rate, cashflow: &[Money]) -> Option<(Decimal, Decimal)> {
    let factor = Decimal::ONE.checked_div(Decimal::ONE + rate)?;
    let mut weight = Decimal::ONE;
    let mut value = Decimal::ZERO;
    let mut slope = Decimal::ZERO;
    for (t, cf) in cashflow.iter().enumerate() {
        let term = cf.checked_mul(weight)?;
        value = value.checked_add(term)?;
        if t > 0 {
            let d = Decimal::from(t as i64)
                .checked_mul(term)?
                .checked_mul(factor)?;
            slope = slope.checked_sub(d)?;
        }
        weight = weight.checked_mul(factor)?;
    }
    Some((value, slope))
}

fn newton_irr(cashflow: &[Money]) -> Option<Rate> {
    let mut rate = IRR_GUESS;
    for _ in 0..MAX_IRR_ITERATIONS {
        let (value, slope) = npv_and_slope(rate, cashflow)?;
        if value.abs() < CONVERGENCE_THRESHOLD {
            return Some(rate);
        }
        if slope.is_zero() {
            return None;
        }
        rate = (rate - value.checked_div(slope)?).clamp(IRR_FLOOR, IRR_CEILING);
    }
    None
}

fn bisection_irr(cashflow: &[Money]) -> PscResult<Rate> {
    let probes: Vec<(Rate, Decimal)> = IRR_BRACKETS
        .iter()
        .filter_map(|r| npv_and_slope(*r, cashflow).map(|(v, _)| (*r, v)))
        .collect();
    let bracket = probes
        .windows(2)
        .find(|w| w[0].1.is_sign_negative() != w[1].1.is_sign_negative());
    let Some(&[(mut lo, mut lo_value), (mut hi, _)]) = bracket else {
        return Err(PscError::ConvergenceFailure {
            function: "IRR".into(),
            iterations: 0,
            last_delta: Decimal::ZERO,
        });
    };

    let mut mid = lo;
    for _ in 0..MAX_IRR_ITERATIONS {
        mid = (lo + hi) / dec!(2);
        let value = match npv_and_slope(mid, cashflow) {
            Some((v, _)) => v,
            None => break,
        };
        if value.abs() < CONVERGENCE_THRESHOLD || (hi - lo).abs() < CONVERGENCE_THRESHOLD {
            return Ok(mid);
        }
        if value.is_sign_negative() == lo_value.is_sign_negative() {
            lo = mid;
            lo_value = value;
        } else {
            hi = mid;
        }
    }
    Err(PscError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv_and_slope(mid, cashflow).map_or(Decimal::MAX, |(v, _)| v),
    })
}

/// Internal rate of return of a yearly cash flow.
///
/// Newton-Raphson from 10%, falling back to bisection over a bracket where
/// the NPV changes sign. Requires at least one sign change in the flows.
pub fn irr(cashflow: &[Money]) -> PscResult<Rate> {
    if cashflow.len() < 2 {
        return Err(PscError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    let has_negative = cashflow.iter().any(|c| c.is_sign_negative() && !c.is_zero());
    let has_positive = cashflow.iter().any(|c| c.is_sign_positive() && !c.is_zero());
    if !(has_negative && has_positive) {
        return Err(PscError::InsufficientData(
            "IRR requires both negative and positive cash flows".into(),
        ));
    }
    match newton_irr(cashflow) {
        Some(rate) => Ok(rate),
        None => {
            tracing::debug!("newton-raphson IRR failed, bisecting");
            bisection_irr(cashflow)
        }
    }
}

// ---------------------------------------------------------------------------
// POT
// ---------------------------------------------------------------------------

/// Payout time in years after the reference year.
///
/// Finds the year in which the cumulative cash flow turns non-negative for
/// good and interpolates the fraction within it. `Some(0)` when the
/// cumulative flow is never negative, `None` when it ends negative.
pub fn pot(cashflow: &[Money], years: &[Year], reference_year: Year) -> PscResult<Option<Decimal>> {
    check_len("cashflow_years", cashflow.len(), years.len())?;
    let mut cumulative = Vec::with_capacity(cashflow.len());
    let mut running = Decimal::ZERO;
    for cf in cashflow {
        running += cf;
        cumulative.push(running);
    }
    if cumulative.iter().all(|c| *c >= Decimal::ZERO) {
        return Ok(Some(Decimal::ZERO));
    }
    if cumulative.last().map_or(true, |c| *c < Decimal::ZERO) {
        return Ok(None);
    }
    // Last index still negative; the cumulative flow stays non-negative after it.
    let Some(last_negative) = cumulative.iter().rposition(|c| *c < Decimal::ZERO) else {
        return Ok(Some(Decimal::ZERO));
    };
    let k = last_negative + 1;
    let before = cumulative[last_negative];
    let after = cumulative[k];
    let fraction = -before / (after - before);
    Ok(Some(Decimal::from(years[k] - reference_year) + fraction))
}

// ---------------------------------------------------------------------------
// PV ratio / PI
// ---------------------------------------------------------------------------

/// NPV divided by the NPV of investment, or by the undiscounted investment
/// total. `None` when the denominator is zero.
pub fn pv_ratio(
    npv_cashflow: Money,
    investment: &[Money],
    years: &[Year],
    mode: NpvMode,
    settings: &DiscountSettings,
    undiscounted: bool,
) -> PscResult<Option<Decimal>> {
    let denominator = if undiscounted {
        investment.iter().copied().sum()
    } else {
        npv(mode, investment, years, settings)?
    };
    if denominator.is_zero() {
        return Ok(None);
    }
    Ok(Some(npv_cashflow / denominator))
}

/// Profitability index.
pub fn profitability_index(pv_ratio: Decimal) -> Decimal {
    Decimal::ONE + pv_ratio
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(rate: Rate) -> DiscountSettings {
        DiscountSettings {
            discount_rate: rate,
            inflation_rate: dec!(0.03),
            reference_year: 2023,
            discounting_mode: DiscountingMode::EndYear,
        }
    }

    fn sample() -> (Vec<Money>, Vec<Year>) {
        let mut cf = vec![dec!(-100000)];
        cf.extend([Decimal::ZERO; 6]);
        cf.extend([dec!(50000); 4]);
        (cf, (2018..=2028).collect())
    }

    fn close(a: Decimal, b: Decimal, tol: Decimal) -> bool {
        (a - b).abs() < tol
    }

    #[test]
    fn test_npv_zero_rate_is_sum() {
        let (cf, years) = sample();
        for mode in [
            NpvMode::NominalTerms,
            NpvMode::SkkNominalTerms,
            NpvMode::SkkRealTerms,
        ] {
            assert_eq!(npv(mode, &cf, &years, &settings(Decimal::ZERO)).unwrap(), dec!(100000));
        }
    }

    #[test]
    fn test_point_forward_drops_history() {
        let (cf, years) = sample();
        let value = npv_point_forward(&cf, &years, &settings(dec!(0.1))).unwrap();
        assert!(close(value, dec!(144084.793015877), dec!(0.001)));
    }

    #[test]
    fn test_mid_year_discounts_less() {
        let (cf, years) = sample();
        let end = npv_skk_nominal_terms(&cf, &years, &settings(dec!(0.1))).unwrap();
        let mut mid_settings = settings(dec!(0.1));
        mid_settings.discounting_mode = DiscountingMode::MidYear;
        let mid = npv_skk_nominal_terms(&cf, &years, &mid_settings).unwrap();
        assert!(mid > end);
    }

    #[test]
    fn test_npv_length_mismatch() {
        let result = npv_nominal_terms(&[dec!(1), dec!(2)], &[2020], &settings(dec!(0.1)));
        assert!(matches!(result, Err(PscError::LengthMismatch { .. })));
    }

    #[test]
    fn test_irr_annuity() {
        let mut cf = vec![dec!(-100)];
        cf.extend([dec!(50); 7]);
        let rate = irr(&cf).unwrap();
        assert!(close(rate, dec!(0.46557), dec!(0.0001)));
    }

    #[test]
    fn test_irr_requires_sign_change() {
        assert!(irr(&[dec!(10), dec!(20)]).is_err());
        assert!(irr(&[dec!(-10)]).is_err());
    }

    #[test]
    fn test_irr_negative_rate() {
        let rate = irr(&[dec!(-100), dec!(40), dec!(40)]).unwrap();
        assert!(rate < Decimal::ZERO);
        let (value, _) = npv_and_slope(rate, &[dec!(-100), dec!(40), dec!(40)]).unwrap();
        assert!(value.abs() < dec!(0.0001));
    }

    #[test]
    fn test_pot_interpolates() {
        let cf = [dec!(-100), dec!(40), dec!(40), dec!(40)];
        let years = [2020, 2021, 2022, 2023];
        // cumulative -100, -60, -20, 20: crosses in 2023
        assert_eq!(pot(&cf, &years, 2020).unwrap(), Some(dec!(3.5)));
    }

    #[test]
    fn test_pot_edge_cases() {
        let years = [2020, 2021];
        assert_eq!(pot(&[dec!(1), dec!(1)], &years, 2020).unwrap(), Some(Decimal::ZERO));
        assert_eq!(pot(&[dec!(-1), dec!(0.5)], &years, 2020).unwrap(), None);
    }

    #[test]
    fn test_pv_ratio_zero_investment() {
        let years = [2020, 2021];
        let ratio = pv_ratio(
            dec!(10),
            &[Decimal::ZERO; 2],
            &years,
            NpvMode::SkkNominalTerms,
            &settings(dec!(0.1)),
            false,
        )
        .unwrap();
        assert_eq!(ratio, None);
        assert_eq!(profitability_index(dec!(0.25)), dec!(1.25));
    }
}
