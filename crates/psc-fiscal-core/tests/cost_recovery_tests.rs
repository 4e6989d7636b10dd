mod common;

use common::{assert_close, oil_gas_project};
use pretty_assertions::assert_eq;
use psc_fiscal_core::contracts::cost_recovery::{SplitCondition, TaxSplit};
use psc_fiscal_core::contracts::{Contract, ContractResult, CostRecovery};
use psc_fiscal_core::types::{FtpTaxRegime, Money, RateSchedule};
use psc_fiscal_core::PscError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn contract() -> CostRecovery {
    CostRecovery::new(oil_gas_project())
}

fn total(values: &[Money]) -> Money {
    values.iter().copied().sum()
}

// ===========================================================================
// Structural properties
// ===========================================================================

#[test]
fn test_every_array_spans_the_project() {
    let result = contract().run().unwrap();
    assert_eq!(result.project_years, (2020..=2029).collect::<Vec<_>>());
    for cashflow in [&result.oil, &result.gas, &result.consolidated] {
        for (name, values) in cashflow.arrays() {
            assert_eq!(values.len(), 10, "{name}");
        }
    }
    assert_eq!(result.transfer_to_oil.len(), 10);
    assert_eq!(result.unpaid_tax_balance.len(), 10);
}

#[test]
fn test_transfers_are_mutually_exclusive() {
    let result = contract().run().unwrap();
    for (to_oil, to_gas) in result.transfer_to_oil.iter().zip(&result.transfer_to_gas) {
        assert!(to_oil.is_zero() || to_gas.is_zero());
        assert!(*to_oil >= Decimal::ZERO && *to_gas >= Decimal::ZERO);
    }
    assert_eq!(result.oil.transfer_in, result.transfer_to_oil);
    assert_eq!(result.gas.transfer_out, result.transfer_to_oil);
}

#[test]
fn test_revenue_is_fully_distributed() {
    for regime in [FtpTaxRegime::Pdjp20_2017, FtpTaxRegime::Pre2017, FtpTaxRegime::Direct] {
        let mut cr = contract();
        cr.ftp_tax_regime = regime;
        let result = cr.run().unwrap();
        let c = &result.consolidated;
        for i in 0..c.revenue.len() {
            assert_close(
                c.revenue[i],
                c.contractor_take[i] + c.government_take[i],
                &format!("{regime:?} year {i}"),
            );
        }
    }
}

#[test]
fn test_recovered_cost_never_exceeds_cost() {
    let result = contract().run().unwrap();
    let c = &result.consolidated;
    assert!(total(&c.cost_recovered) <= total(&c.cost_to_recover));
    let last_unrecovered = *c.unrecovered.last().unwrap();
    assert_close(
        total(&c.cost_recovered) + last_unrecovered,
        total(&c.cost_to_recover),
        "recovered plus unrecovered",
    );
}

#[test]
fn test_pre_tax_expenditures_exclude_vat() {
    let plain = contract().run().unwrap();
    // 2021: oil capital 2000 and intangible 1500
    assert_eq!(plain.oil.expenditures_pre_tax[1], dec!(3500));
    assert_eq!(plain.oil.expenditures[1], dec!(3500));

    let mut cr = contract();
    cr.project.costs.intangible[0].terms.tax_portion = dec!(0.5);
    cr.options.vat_rate = RateSchedule::Flat(dec!(0.1));
    let taxed = cr.run().unwrap();
    assert_eq!(taxed.oil.expenditures_pre_tax[1], dec!(3500));
    assert_eq!(taxed.oil.expenditures[1], dec!(3575));
    assert_eq!(
        taxed.consolidated.expenditures_pre_tax,
        plain.consolidated.expenditures_pre_tax
    );
}

#[test]
fn test_run_is_idempotent() {
    let first = contract().run().unwrap();
    let second = contract().run().unwrap();
    assert_eq!(first, second);
}

// ===========================================================================
// Fiscal terms
// ===========================================================================

#[test]
fn test_pre_2017_tax_carried_on_consolidated_equity() {
    let mut cr = contract();
    cr.ftp_tax_regime = FtpTaxRegime::Pre2017;
    let result = cr.run().unwrap();
    let c = &result.consolidated;

    // The first year with positive equity is taxed on cumulative taxable
    // income, later ones on their own. Tax beyond equity is carried.
    let mut carried = Decimal::ZERO;
    let mut cumulative = Decimal::ZERO;
    let mut taxed_before = false;
    for i in 0..c.tax.len() {
        cumulative += c.taxable_income[i];
        let positive = c.contractor_equity[i] > Decimal::ZERO;
        let due = match (positive, taxed_before) {
            (true, false) => cumulative * result.tax_rate[i],
            (true, true) => c.taxable_income[i] * result.tax_rate[i],
            _ => Decimal::ZERO,
        };
        taxed_before = positive;
        let owed = (carried + due).max(Decimal::ZERO);
        let paid = c.contractor_equity[i].max(Decimal::ZERO).min(owed);
        assert_eq!(c.tax[i], paid, "tax paid in year {i}");
        carried = owed - paid;
        assert_eq!(result.unpaid_tax_balance[i], carried, "unpaid balance in year {i}");
    }
    assert!(c.tax[..2].iter().all(|t| t.is_zero()));
    assert!(total(&c.tax) > Decimal::ZERO);

    for fluid in [&result.oil, &result.gas] {
        for (ddmo, equity) in fluid.ddmo.iter().zip(&fluid.contractor_equity) {
            if *equity <= Decimal::ZERO {
                assert!(ddmo.is_zero());
            }
        }
    }
}

#[test]
fn test_direct_tax_consolidates_as_fluid_sum() {
    // Only the pre-2017 regime recomputes consolidated tax from
    // consolidated equity.
    let mut cr = contract();
    cr.ftp_tax_regime = FtpTaxRegime::Direct;
    let result = cr.run().unwrap();
    for i in 0..result.consolidated.tax.len() {
        assert_eq!(
            result.consolidated.tax[i],
            result.oil.tax[i] + result.gas.tax[i]
        );
    }
    assert!(result.unpaid_tax_balance.iter().all(|u| u.is_zero()));
}

#[test]
fn test_ftp_unavailable() {
    let mut cr = contract();
    cr.oil.ftp_is_available = false;
    let result = cr.run().unwrap();
    assert!(result.oil.ftp_contractor.iter().all(|v| v.is_zero()));
    assert!(result.oil.ftp_government.iter().all(|v| v.is_zero()));
    assert!(result.gas.ftp.iter().any(|v| !v.is_zero()));
}

#[test]
fn test_ftp_is_twenty_percent_of_revenue() {
    let result = contract().run().unwrap();
    for (ftp, revenue) in result.oil.ftp.iter().zip(&result.oil.revenue) {
        assert_eq!(*ftp, revenue * dec!(0.2));
    }
}

#[test]
fn test_sunk_cost_pooled_in_reference_year() {
    let mut cr = contract();
    cr.options.sunk_cost_reference_year = Some(2022);
    let result = cr.run().unwrap();
    // Oil intangible of 2021 is pooled into 2022.
    assert_eq!(result.oil.sunk_cost[2], dec!(1500));
    assert_eq!(result.oil.cost_to_recover[1], result.oil.depreciation[1]);
    assert_eq!(result.sunk_cost_reference_year, 2022);
}

#[test]
fn test_sunk_cost_reference_after_onstream_rejected() {
    let mut cr = contract();
    cr.options.sunk_cost_reference_year = Some(2024);
    assert!(matches!(
        cr.run(),
        Err(PscError::SunkCostReferenceYear { year: 2024, .. })
    ));
}

#[test]
fn test_sliding_scale_without_match_is_error() {
    let mut cr = contract();
    cr.tax_split = TaxSplit::SlidingScale {
        conditions: vec![SplitCondition {
            bottom_limit: dec!(100),
            top_limit: dec!(200),
            pretax_oil: dec!(0.3),
            pretax_gas: dec!(0.5),
        }],
        indicator: None,
    };
    assert!(matches!(cr.run(), Err(PscError::InvalidInput { .. })));
}

#[test]
fn test_sliding_scale_sets_pretax_share() {
    let mut cr = contract();
    cr.tax_split = TaxSplit::SlidingScale {
        conditions: vec![SplitCondition {
            bottom_limit: dec!(50),
            top_limit: dec!(70),
            pretax_oil: dec!(0.35),
            pretax_gas: dec!(0.6),
        }],
        indicator: None,
    };
    let result = cr.run().unwrap();
    // Oil price is 60 from 2022.
    assert_eq!(result.oil_pretax_share[2], dec!(0.35));
    assert_eq!(result.gas_pretax_share[5], dec!(0.6));
}

#[test]
fn test_contract_sum_type_dispatch() {
    let contract = Contract::CostRecovery(contract());
    let result = contract.run().unwrap();
    assert!(matches!(result, ContractResult::CostRecovery(_)));
    assert_eq!(result.project_years().len(), 10);
    assert_eq!(result.cashflow().len(), 10);
}

#[test]
fn test_contract_round_trips_through_json() {
    let contract = Contract::CostRecovery(contract());
    let json = serde_json::to_string(&contract).unwrap();
    assert!(json.contains("\"contract_type\":\"cost_recovery\""));
    let back: Contract = serde_json::from_str(&json).unwrap();
    assert_eq!(back.run().unwrap(), contract.run().unwrap());
}
