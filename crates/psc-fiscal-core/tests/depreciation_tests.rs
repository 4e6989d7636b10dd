use pretty_assertions::assert_eq;
use psc_fiscal_core::timeseries::depreciation::{
    depreciation_schedule, psc_declining_balance_rate, unit_of_production_rate, DepreciationInput,
};
use psc_fiscal_core::types::DeprMethod;
use psc_fiscal_core::PscError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn asset(method: DeprMethod) -> DepreciationInput {
    DepreciationInput {
        method,
        cost: dec!(200000),
        salvage_value: dec!(25000),
        useful_life: 5,
        decline_factor: dec!(2),
        depreciation_factor: dec!(0.5),
        production: vec![],
        reserves: None,
        depreciation_len: 0,
    }
}

// ===========================================================================
// Reference schedules
// ===========================================================================

#[test]
fn test_straight_line_schedule() {
    let schedule = depreciation_schedule(&asset(DeprMethod::StraightLine)).unwrap();
    assert_eq!(schedule.charges, vec![dec!(35000); 5]);
    assert_eq!(
        schedule.book_value,
        vec![dec!(165000), dec!(130000), dec!(95000), dec!(60000), dec!(25000)]
    );
    assert_eq!(schedule.total_depreciation, dec!(175000));
}

#[test]
fn test_double_declining_balance_schedule() {
    let schedule = depreciation_schedule(&asset(DeprMethod::DecliningBalance)).unwrap();
    assert_eq!(
        schedule.charges,
        vec![dec!(80000), dec!(48000), dec!(28800), dec!(17280), dec!(920)]
    );
    assert_eq!(
        schedule.book_value,
        vec![dec!(120000), dec!(72000), dec!(43200), dec!(25920), dec!(25000)]
    );
}

// ===========================================================================
// Conservation
// ===========================================================================

#[test]
fn test_declining_balance_never_passes_salvage() {
    for factor in [dec!(1), dec!(1.5), dec!(2), dec!(3)] {
        let mut input = asset(DeprMethod::DecliningBalance);
        input.decline_factor = factor;
        let schedule = depreciation_schedule(&input).unwrap();
        assert!(schedule.total_depreciation <= dec!(175000));
        assert!(schedule.charges.iter().all(|c| *c >= Decimal::ZERO));
        assert_eq!(*schedule.book_value.last().unwrap(), dec!(25000));
    }
}

#[test]
fn test_unit_of_production_fully_depreciates() {
    let production = [dec!(10), dec!(30), dec!(40), dec!(20)];
    let charges = unit_of_production_rate(dec!(1000), dec!(100), dec!(100), &production, 6).unwrap();
    assert_eq!(charges.len(), 6);
    assert_eq!(charges[0], dec!(90));
    assert_eq!(charges.iter().copied().sum::<Decimal>(), dec!(900));
}

#[test]
fn test_unit_of_production_partial_horizon() {
    let production = [dec!(10), dec!(30)];
    let charges = unit_of_production_rate(dec!(1000), dec!(0), dec!(100), &production, 2).unwrap();
    assert!(charges.iter().copied().sum::<Decimal>() < dec!(1000));
}

#[test]
fn test_psc_declining_balance_writes_off_in_last_year() {
    let charges = psc_declining_balance_rate(dec!(1000), 5, dec!(0.25), 7).unwrap();
    assert_eq!(charges.iter().copied().sum::<Decimal>(), dec!(1000));
    assert_eq!(charges[0], dec!(250));
    assert_eq!(&charges[5..], &[Decimal::ZERO, Decimal::ZERO]);
}

#[test]
fn test_zero_reserves_rejected() {
    let result = unit_of_production_rate(dec!(1000), dec!(0), dec!(0), &[dec!(1)], 1);
    assert!(matches!(result, Err(PscError::InvalidInput { .. })));
}
