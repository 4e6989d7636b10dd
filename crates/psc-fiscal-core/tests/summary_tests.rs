mod common;

use common::{assert_close, oil_gas_project};
use psc_fiscal_core::cashflow::{economic_indicators, EconomicConfig};
use psc_fiscal_core::contracts::{Contract, ContractType, CostRecovery, GrossSplit};
use psc_fiscal_core::summary::get_summary;
use psc_fiscal_core::types::{NpvMode, RateSchedule};
use psc_fiscal_core::PscError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

#[test]
fn test_cost_recovery_summary() {
    let contract = Contract::CostRecovery(CostRecovery::new(oil_gas_project()));
    let result = contract.run().unwrap();
    let out = get_summary(&result, &EconomicConfig::default()).unwrap();
    let s = &out.result;

    assert_eq!(s.contract_type, ContractType::CostRecovery);
    assert_eq!(s.reference_year, 2020);
    // 8 years of oil at 100 and 7 years of gas at 500
    assert_eq!(s.lifting_oil, dec!(800));
    assert_eq!(s.lifting_gas, dec!(3500));
    assert_eq!(s.oil_wap, dec!(60));
    assert_eq!(s.gross_revenue_oil, dec!(48000));
    assert_eq!(s.gross_revenue_gas, dec!(21000));
    assert_eq!(s.gross_revenue, dec!(69000));
    assert_eq!(s.tangible, dec!(2800));
    assert_eq!(s.intangible, dec!(2100));
    assert_eq!(s.investment, dec!(4900));
    assert_eq!(s.opex, dec!(3240));
    assert_eq!(s.opex_and_asr, s.opex + s.asr);
    assert_eq!(s.deductible_cost, Decimal::ZERO);
    assert!(s.cost_recovery > Decimal::ZERO);
    assert!(s.gov_ftp_share > Decimal::ZERO);
    assert_close(
        s.gov_take_over_gross_rev,
        s.gov_take / s.gross_revenue,
        "government take ratio",
    );
    assert_eq!(s.ctr_npv, economic_indicators(&result, &EconomicConfig::default()).unwrap().npv);
    assert!(s.ctr_irr.is_some());
    assert_eq!(out.methodology, "PSC Economic Summary");
}

#[test]
fn test_gross_split_summary() {
    let contract = Contract::GrossSplit(GrossSplit::new(oil_gas_project()));
    let result = contract.run().unwrap();
    let config = EconomicConfig {
        npv_mode: NpvMode::PointForward,
        reference_year: Some(2023),
        ..Default::default()
    };
    let s = get_summary(&result, &config).unwrap().result;

    assert_eq!(s.contract_type, ContractType::GrossSplit);
    assert_eq!(s.reference_year, 2023);
    assert_eq!(s.cost_recovery, Decimal::ZERO);
    assert!(s.deductible_cost > Decimal::ZERO);
    assert_eq!(s.gov_ftp_share, Decimal::ZERO);
    assert_eq!(s.gov_equity_share, Decimal::ZERO);
    assert_close(
        s.ctr_gross_share + s.gov_gross_share,
        s.gross_revenue,
        "gross shares",
    );
}

#[test]
fn test_vat_lands_in_cost_adjustment_not_pre_tax_expenditure() {
    let plain = Contract::CostRecovery(CostRecovery::new(oil_gas_project()))
        .run()
        .unwrap();
    let plain = get_summary(&plain, &EconomicConfig::default()).unwrap().result;

    let mut cr = CostRecovery::new(oil_gas_project());
    for line in &mut cr.project.costs.intangible {
        line.terms.tax_portion = dec!(1);
    }
    cr.options.vat_rate = RateSchedule::Flat(dec!(0.1));
    let taxed = Contract::CostRecovery(cr).run().unwrap();
    let taxed = get_summary(&taxed, &EconomicConfig::default()).unwrap().result;

    assert_eq!(taxed.expenditures_pre_tax, plain.expenditures_pre_tax);
    // 10% on 2100 of intangible
    assert_eq!(taxed.cost_adjustment - plain.cost_adjustment, dec!(210));
    assert_eq!(taxed.intangible, dec!(2310));
}

#[test]
fn test_summary_rejects_reference_year_outside_project() {
    let contract = Contract::CostRecovery(CostRecovery::new(oil_gas_project()));
    let result = contract.run().unwrap();
    let config = EconomicConfig {
        reference_year: Some(2019),
        ..Default::default()
    };
    assert!(matches!(
        get_summary(&result, &config),
        Err(PscError::YearOutOfRange { year: 2019, .. })
    ));
}

#[test]
fn test_summary_serializes_flat() {
    let contract = Contract::GrossSplit(GrossSplit::new(oil_gas_project()));
    let result = contract.run().unwrap();
    let out = get_summary(&result, &EconomicConfig::default()).unwrap();
    let json = serde_json::to_value(&out.result).unwrap();
    for key in ["lifting_oil", "ctr_npv", "ctr_irr", "gov_take_npv", "unrec_cost"] {
        assert!(json.get(key).is_some(), "missing {key}");
    }
}
