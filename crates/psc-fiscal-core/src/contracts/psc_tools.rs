//! Building blocks shared by the Cost Recovery and Gross Split engines.

use chrono::{Datelike, Months, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PscError;
use crate::timeseries::cost_tools::YearWindow;
use crate::timeseries::zeros;
use crate::types::{Money, Rate, RateSchedule, TaxRegime, Volume, Year};
use crate::PscResult;

// ---------------------------------------------------------------------------
// Cost recovery / deduction with carry-forward
// ---------------------------------------------------------------------------

/// Outcome of recovering a cost stream out of an available amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recovery {
    /// Cost recovered (or deducted) each year
    pub recovered: Vec<Money>,
    /// Balance carried into the next year
    pub unrecovered: Vec<Money>,
    /// Available amount left after recovery
    pub surplus: Vec<Money>,
}

impl Recovery {
    fn with_len(len: usize) -> Self {
        Self {
            recovered: zeros(len),
            unrecovered: zeros(len),
            surplus: zeros(len),
        }
    }
}

/// One year of recovery: returns (recovered, unrecovered, surplus).
fn recover_year(available: Money, cost: Money, carried: Money) -> (Money, Money, Money) {
    let available = available.max(Decimal::ZERO);
    let recovered = available.min(cost + carried).max(Decimal::ZERO);
    (recovered, carried + cost - recovered, available - recovered)
}

/// Recover `cost` out of `available` year by year. Whatever cannot be
/// recovered is carried into the next year.
///
/// Used for investment credit, cost recovery and the Gross Split
/// deductible cost alike.
pub fn recover_costs(available: &[Money], cost: &[Money]) -> Recovery {
    let mut out = Recovery::with_len(available.len());
    let mut carried = Decimal::ZERO;
    for (i, (avail, c)) in available.iter().zip(cost).enumerate() {
        let (recovered, unrecovered, surplus) = recover_year(*avail, *c, carried);
        out.recovered[i] = recovered;
        out.unrecovered[i] = unrecovered;
        out.surplus[i] = surplus;
        carried = unrecovered;
    }
    out
}

/// Oil and gas recovered jointly, with unrecovered cost of one fluid paid
/// out of the other fluid's surplus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JointRecovery {
    pub oil: Recovery,
    pub gas: Recovery,
    /// Gas surplus used to recover oil cost
    pub transfer_to_oil: Vec<Money>,
    /// Oil surplus used to recover gas cost
    pub transfer_to_gas: Vec<Money>,
}

/// Recover both fluids year by year. In a year where exactly one fluid
/// still carries unrecovered cost, the other fluid's surplus pays it down.
/// At most one direction transfers in any year.
///
/// The receiving fluid's `recovered` includes the transfer; the giving
/// fluid's `surplus` is reduced by it.
pub fn recover_with_transfer(
    oil_available: &[Money],
    oil_cost: &[Money],
    gas_available: &[Money],
    gas_cost: &[Money],
) -> JointRecovery {
    let len = oil_available.len();
    let mut out = JointRecovery {
        oil: Recovery::with_len(len),
        gas: Recovery::with_len(len),
        transfer_to_oil: zeros(len),
        transfer_to_gas: zeros(len),
    };
    let mut oil_carried = Decimal::ZERO;
    let mut gas_carried = Decimal::ZERO;

    for i in 0..len {
        let (mut oil_rec, mut oil_ur, mut oil_surplus) =
            recover_year(oil_available[i], oil_cost[i], oil_carried);
        let (mut gas_rec, mut gas_ur, mut gas_surplus) =
            recover_year(gas_available[i], gas_cost[i], gas_carried);

        if oil_ur > Decimal::ZERO && gas_ur.is_zero() {
            let t = gas_surplus.min(oil_ur);
            out.transfer_to_oil[i] = t;
            oil_rec += t;
            oil_ur -= t;
            gas_surplus -= t;
        } else if gas_ur > Decimal::ZERO && oil_ur.is_zero() {
            let t = oil_surplus.min(gas_ur);
            out.transfer_to_gas[i] = t;
            gas_rec += t;
            gas_ur -= t;
            oil_surplus -= t;
        }

        out.oil.recovered[i] = oil_rec;
        out.oil.unrecovered[i] = oil_ur;
        out.oil.surplus[i] = oil_surplus;
        out.gas.recovered[i] = gas_rec;
        out.gas.unrecovered[i] = gas_ur;
        out.gas.surplus[i] = gas_surplus;
        oil_carried = oil_ur;
        gas_carried = gas_ur;
    }
    out
}

// ---------------------------------------------------------------------------
// Sunk cost
// ---------------------------------------------------------------------------

/// Move everything before `reference_index` into the reference year.
/// Returns the pooled array and the pooled amount.
pub fn pool_before(values: &[Money], reference_index: usize) -> (Vec<Money>, Money) {
    let mut out = values.to_vec();
    let pooled: Money = values[..reference_index].iter().copied().sum();
    for v in &mut out[..reference_index] {
        *v = Decimal::ZERO;
    }
    if let Some(slot) = out.get_mut(reference_index) {
        *slot += pooled;
    }
    (out, pooled)
}

/// The sunk-cost reference year must lie in
/// `[start_year, min(onstream years)] ∩ [start_year, end_year]`.
pub fn check_sunk_cost_reference_year(
    year: Year,
    window: YearWindow,
    onstream_years: &[Year],
) -> PscResult<()> {
    if year < window.start_year || year > window.end_year {
        return Err(PscError::SunkCostReferenceYear {
            year,
            reason: format!(
                "outside the project window [{}, {}]",
                window.start_year, window.end_year
            ),
        });
    }
    if let Some(first_onstream) = onstream_years.iter().min() {
        if year > *first_onstream {
            return Err(PscError::SunkCostReferenceYear {
                year,
                reason: format!("after the first onstream year {first_onstream}"),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Income tax rate
// ---------------------------------------------------------------------------

/// Prevailing statutory income tax rate in a calendar year.
pub fn prevailing_tax_rate(year: Year) -> Rate {
    if year < 2016 {
        dec!(0.44)
    } else if year < 2020 {
        dec!(0.42)
    } else {
        dec!(0.40)
    }
}

/// Effective income tax rate per project year: an explicit schedule wins,
/// otherwise the regime decides.
pub fn effective_tax_rate(
    regime: TaxRegime,
    explicit: Option<&RateSchedule>,
    window: YearWindow,
) -> PscResult<Vec<Rate>> {
    if let Some(schedule) = explicit {
        let rates = schedule.resolve("tax_rate", window.duration())?;
        for rate in &rates {
            crate::error::check_fraction("tax_rate", *rate)?;
        }
        return Ok(rates);
    }
    let len = window.duration();
    Ok(match regime {
        TaxRegime::Uu36_2008 => vec![dec!(0.44); len],
        TaxRegime::Uu02_2020 => vec![dec!(0.42); len],
        TaxRegime::Uu07_2021 => vec![dec!(0.40); len],
        TaxRegime::NailedDown => vec![prevailing_tax_rate(window.start_year); len],
        TaxRegime::Prevailing => (window.start_year..=window.end_year)
            .map(prevailing_tax_rate)
            .collect(),
    })
}

// ---------------------------------------------------------------------------
// DMO
// ---------------------------------------------------------------------------

/// First day after the DMO holiday.
pub fn dmo_holiday_end(onstream: NaiveDate, holiday_months: u32) -> PscResult<NaiveDate> {
    onstream
        .checked_add_months(Months::new(holiday_months))
        .ok_or_else(|| {
            PscError::DateError(format!(
                "DMO holiday of {holiday_months} months from {onstream} overflows the calendar"
            ))
        })
}

/// Parameters of one DMO evaluation.
#[derive(Debug, Clone)]
pub struct DmoParams<'a> {
    pub window: YearWindow,
    pub holiday_end: NaiveDate,
    pub volume_portion: Rate,
    pub fee_portion: Rate,
    pub end_weighted: bool,
    /// Lifted volume per year
    pub lifting: &'a [Volume],
    /// Weighted-average price per year
    pub price: &'a [Money],
    /// Contractor share of the lifting per year (pretax share or split)
    pub share: &'a [Rate],
    /// Unrecovered (carried) cost after transfer
    pub unrecovered: &'a [Money],
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dmo {
    pub volume: Vec<Volume>,
    pub fee: Vec<Money>,
    pub ddmo: Vec<Money>,
}

impl Dmo {
    pub fn zero(len: usize) -> Self {
        Self {
            volume: zeros(len),
            fee: zeros(len),
            ddmo: zeros(len),
        }
    }
}

/// DMO volume before any entitlement cap.
pub fn dmo_volume(params: &DmoParams<'_>) -> Vec<Volume> {
    params
        .lifting
        .iter()
        .zip(params.share)
        .map(|(lifting, share)| params.volume_portion * lifting * share)
        .collect()
}

/// DMO fee and DDMO for a given volume.
///
/// The fee is the discounted `fee_portion` of market value once the
/// holiday is over and the fluid carries no unrecovered cost, and the full
/// market value otherwise. With end weighting, the year the holiday ends
/// blends both by the month the holiday ends in.
pub fn dmo_fee(params: &DmoParams<'_>, volume: Vec<Volume>) -> Dmo {
    let len = params.window.duration();
    let end_year = params.holiday_end.year();
    let mut fee = zeros(len);

    for i in 0..len {
        let year = params.window.start_year + i as Year;
        let market_value = volume[i] * params.price[i];
        let holiday = year < end_year;
        fee[i] = if !holiday && params.unrecovered[i].is_zero() {
            params.fee_portion * market_value
        } else {
            market_value
        };
    }

    // End weighting only touches the holiday-end year, and only when that
    // year already qualifies for the reduced fee (no unrecovered cost).
    // The holiday covers `month / 12` of it at market value, the rest pays
    // the reduced fee. A year still carrying unrecovered cost keeps the
    // full market-value fee.
    if params.end_weighted && params.window.contains(end_year) {
        let i = params.window.index(end_year);
        if params.unrecovered[i].is_zero() {
            let in_holiday = Decimal::from(params.holiday_end.month()) / dec!(12);
            let market_value = volume[i] * params.price[i];
            fee[i] = in_holiday * market_value
                + (Decimal::ONE - in_holiday) * params.fee_portion * market_value;
        }
    }

    let ddmo = volume
        .iter()
        .zip(params.price)
        .zip(&fee)
        .map(|((v, p), f)| v * p - f)
        .collect();
    Dmo { volume, fee, ddmo }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recover_costs_carries_forward() {
        let available = [dec!(10), dec!(50), dec!(50)];
        let cost = [dec!(30), dec!(20), dec!(0)];
        let r = recover_costs(&available, &cost);
        assert_eq!(r.recovered, vec![dec!(10), dec!(40), dec!(0)]);
        assert_eq!(r.unrecovered, vec![dec!(20), dec!(0), dec!(0)]);
        assert_eq!(r.surplus, vec![dec!(0), dec!(10), dec!(50)]);
    }

    #[test]
    fn test_transfer_only_one_direction_per_year() {
        let joint = recover_with_transfer(
            &[dec!(10), dec!(100)],
            &[dec!(50), dec!(0)],
            &[dec!(100), dec!(0)],
            &[dec!(20), dec!(30)],
        );
        // Year 0: oil short by 40, gas surplus 80 pays it.
        assert_eq!(joint.transfer_to_oil, vec![dec!(40), dec!(0)]);
        assert_eq!(joint.gas.surplus[0], dec!(40));
        assert_eq!(joint.oil.recovered[0], dec!(50));
        // Year 1: gas short by 30, oil surplus pays it.
        assert_eq!(joint.transfer_to_gas, vec![dec!(0), dec!(30)]);
        assert_eq!(joint.oil.surplus[1], dec!(70));
        for i in 0..2 {
            assert!(joint.transfer_to_oil[i].is_zero() || joint.transfer_to_gas[i].is_zero());
        }
    }

    #[test]
    fn test_no_transfer_when_both_short() {
        let joint = recover_with_transfer(&[dec!(0)], &[dec!(5)], &[dec!(0)], &[dec!(5)]);
        assert!(joint.transfer_to_oil[0].is_zero());
        assert!(joint.transfer_to_gas[0].is_zero());
    }

    #[test]
    fn test_pool_before_reference() {
        let (pooled, sunk) = pool_before(&[dec!(1), dec!(2), dec!(3), dec!(4)], 2);
        assert_eq!(pooled, vec![dec!(0), dec!(0), dec!(6), dec!(4)]);
        assert_eq!(sunk, dec!(3));
    }

    #[test]
    fn test_sunk_cost_reference_after_onstream_rejected() {
        let window = YearWindow::new(2020, 2030).unwrap();
        assert!(check_sunk_cost_reference_year(2022, window, &[2023, 2025]).is_ok());
        let err = check_sunk_cost_reference_year(2024, window, &[2023, 2025]).unwrap_err();
        assert!(matches!(err, PscError::SunkCostReferenceYear { year: 2024, .. }));
    }

    #[test]
    fn test_tax_regimes() {
        let window = YearWindow::new(2015, 2021).unwrap();
        let prevailing = effective_tax_rate(TaxRegime::Prevailing, None, window).unwrap();
        assert_eq!(prevailing[0], dec!(0.44));
        assert_eq!(prevailing[1], dec!(0.42));
        assert_eq!(prevailing[6], dec!(0.40));
        let nailed = effective_tax_rate(TaxRegime::NailedDown, None, window).unwrap();
        assert!(nailed.iter().all(|r| *r == dec!(0.44)));
        let explicit = RateSchedule::Flat(dec!(0.3));
        let rates = effective_tax_rate(TaxRegime::Uu36_2008, Some(&explicit), window).unwrap();
        assert_eq!(rates, vec![dec!(0.3); 7]);
    }

    #[test]
    fn test_dmo_holiday_and_fee() {
        let window = YearWindow::new(2020, 2023).unwrap();
        let onstream = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let lifting = [dec!(100); 4];
        let price = [dec!(10); 4];
        let share = [dec!(0.5); 4];
        let unrecovered = [dec!(0), dec!(0), dec!(0), dec!(0)];
        let params = DmoParams {
            window,
            holiday_end: dmo_holiday_end(onstream, 24).unwrap(),
            volume_portion: dec!(0.25),
            fee_portion: dec!(0.25),
            end_weighted: false,
            lifting: &lifting,
            price: &price,
            share: &share,
            unrecovered: &unrecovered,
        };
        let dmo = dmo_fee(&params, dmo_volume(&params));
        assert_eq!(dmo.volume, vec![dec!(12.5); 4]);
        // Holiday through 2021, discounted fee from 2022.
        assert_eq!(dmo.ddmo, vec![dec!(0), dec!(0), dec!(93.75), dec!(93.75)]);
    }

    #[test]
    fn test_dmo_end_weighting_blends_holiday_end_year() {
        let window = YearWindow::new(2020, 2022).unwrap();
        let onstream = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let lifting = [dec!(120); 3];
        let price = [dec!(1); 3];
        let share = [dec!(1); 3];
        let unrecovered = [dec!(0); 3];
        let params = DmoParams {
            window,
            // Holiday ends 2021-07-01
            holiday_end: dmo_holiday_end(onstream, 18).unwrap(),
            volume_portion: dec!(1),
            fee_portion: dec!(0),
            end_weighted: true,
            lifting: &lifting,
            price: &price,
            share: &share,
            unrecovered: &unrecovered,
        };
        let dmo = dmo_fee(&params, dmo_volume(&params));
        // 7/12 at full price, 5/12 at zero fee
        assert_eq!(dmo.fee[1].round_dp(6), dec!(70));
        assert_eq!(dmo.ddmo[2], dec!(120));
    }

    #[test]
    fn test_dmo_end_weighting_skipped_while_cost_unrecovered() {
        let window = YearWindow::new(2020, 2022).unwrap();
        let onstream = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        let lifting = [dec!(120); 3];
        let price = [dec!(1); 3];
        let share = [dec!(1); 3];
        let unrecovered = [dec!(50), dec!(10), dec!(0)];
        let params = DmoParams {
            window,
            holiday_end: dmo_holiday_end(onstream, 18).unwrap(),
            volume_portion: dec!(1),
            fee_portion: dec!(0),
            end_weighted: true,
            lifting: &lifting,
            price: &price,
            share: &share,
            unrecovered: &unrecovered,
        };
        let dmo = dmo_fee(&params, dmo_volume(&params));
        // 2021 still carries cost: full market value, no DDMO.
        assert_eq!(dmo.fee, vec![dec!(120), dec!(120), dec!(0)]);
        assert_eq!(dmo.ddmo, vec![dec!(0), dec!(0), dec!(120)]);
    }
}
