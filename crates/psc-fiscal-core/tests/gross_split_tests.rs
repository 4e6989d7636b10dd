mod common;

use common::{assert_close, oil_gas_project, small_oil_project};
use pretty_assertions::assert_eq;
use psc_fiscal_core::contracts::gross_split::SunkCostTreatment;
use psc_fiscal_core::contracts::split_tables::SplitRegime;
use psc_fiscal_core::contracts::{Contract, ContractResult, GrossSplit};
use psc_fiscal_core::costs::{CapitalCost, CostTerms};
use psc_fiscal_core::types::{DeprMethod, FluidType, Money};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn contract() -> GrossSplit {
    GrossSplit::new(oil_gas_project())
}

fn total(values: &[Money]) -> Money {
    values.iter().copied().sum()
}

// ===========================================================================
// Split
// ===========================================================================

#[test]
fn test_split_above_one_is_clipped_and_reported() {
    let mut gs = GrossSplit::new(small_oil_project());
    // 0.895 + variable 0.10 + price (60) 0.025 + cumulative (< 1 MMBOE) 0.05
    // + discretion 0.08 = 1.15
    gs.base_split_ctr_oil = dec!(0.895);
    let result = gs.run().unwrap();

    let producing = 1; // 2022
    assert_eq!(result.oil_split.raw[producing], dec!(1.15));
    assert_eq!(result.oil_split.ctr_split[producing], Decimal::ONE);
    assert!(result.years_of_max_split.oil.contains(&2022));
    assert!(!result.warnings.is_empty());
    assert_eq!(result.oil.government_share[producing], Decimal::ZERO);
}

#[test]
fn test_split_never_exceeds_one() {
    let mut gs = contract();
    gs.base_split_ctr_oil = Decimal::ONE;
    gs.base_split_ctr_gas = Decimal::ONE;
    let result = gs.run().unwrap();
    for split in result.oil_split.ctr_split.iter().chain(&result.gas_split.ctr_split) {
        assert!(*split <= Decimal::ONE && *split >= Decimal::ZERO);
    }
    assert_eq!(result.years_of_max_split.oil.len(), 10);
}

#[test]
fn test_default_split_is_not_clipped() {
    let result = contract().run().unwrap();
    assert!(result.years_of_max_split.oil.is_empty());
    assert!(result.years_of_max_split.gas.is_empty());
    assert_eq!(result.oil_split.base[0], dec!(0.43));
    assert_eq!(result.gas_split.base[0], dec!(0.48));
}

#[test]
fn test_cumulative_production_in_oil_equivalent() {
    let result = contract().run().unwrap();
    // 2023: oil 100 + 100, gas 500 / 5.6
    assert_eq!(result.cumulative_production[2], dec!(100));
    assert_close(
        result.cumulative_production[3],
        dec!(200) + dec!(500) / dec!(5.6),
        "cumulative production 2023",
    );
}

// ===========================================================================
// Structural properties
// ===========================================================================

#[test]
fn test_every_array_spans_the_project() {
    let result = contract().run().unwrap();
    for cashflow in [&result.oil, &result.gas, &result.consolidated] {
        for (name, values) in cashflow.arrays() {
            assert_eq!(values.len(), 10, "{name}");
        }
    }
    assert_eq!(result.oil_split.ctr_split.len(), 10);
    assert_eq!(result.cumulative_production.len(), 10);
}

#[test]
fn test_transfers_are_mutually_exclusive() {
    let result = contract().run().unwrap();
    for (to_oil, to_gas) in result.transfer_to_oil.iter().zip(&result.transfer_to_gas) {
        assert!(to_oil.is_zero() || to_gas.is_zero());
    }
}

#[test]
fn test_revenue_is_fully_distributed() {
    for treatment in [SunkCostTreatment::Expensed, SunkCostTreatment::Amortized] {
        let mut gs = contract();
        gs.sunk_cost_treatment = treatment;
        gs.options.sunk_cost_reference_year = Some(2022);
        let result = gs.run().unwrap();
        let c = &result.consolidated;
        for i in 0..c.revenue.len() {
            assert_close(
                c.revenue[i],
                c.contractor_take[i] + c.government_take[i],
                &format!("{treatment:?} year {i}"),
            );
            assert!(c.ddmo[i] >= Decimal::ZERO);
            assert!(c.ddmo[i] <= c.net_operating_profit[i].max(Decimal::ZERO));
        }
    }
}

#[test]
fn test_cashflow_identity() {
    let result = contract().run().unwrap();
    let c = &result.consolidated;
    for i in 0..c.revenue.len() {
        assert_close(
            c.cashflow[i],
            c.contractor_share[i] - c.expenditures[i] - c.ddmo[i] - c.tax[i],
            &format!("year {i}"),
        );
    }
}

#[test]
fn test_amortized_sunk_cost_follows_production() {
    let mut gs = contract();
    gs.sunk_cost_treatment = SunkCostTreatment::Amortized;
    gs.options.sunk_cost_reference_year = Some(2022);
    let result = gs.run().unwrap();
    // Oil produces 100 a year over 2022-2029: 1500 / 8 per year.
    assert_eq!(result.oil.sunk_cost[2], dec!(1500));
    for i in 2..10 {
        assert_eq!(result.oil.amortization[i], dec!(187.5));
    }
    assert_eq!(total(&result.oil.amortization), dec!(1500));
}

#[test]
fn test_undepreciated_cost_summed_when_enabled() {
    let mut gs = contract();
    gs.options.depr_method = DeprMethod::StraightLine;
    gs.project.costs.capital.push(CapitalCost::new(
        dec!(500),
        CostTerms::new(2028, FluidType::Oil),
        5,
    ));
    let without = gs.clone().run().unwrap();
    gs.sum_undepreciated_cost = true;
    let with = gs.run().unwrap();
    assert!(total(&without.consolidated.undepreciated).is_zero());
    assert_eq!(total(&with.consolidated.undepreciated), dec!(300));
    assert_eq!(
        total(&with.consolidated.cost_to_deduct) - total(&without.consolidated.cost_to_deduct),
        total(&with.consolidated.undepreciated)
    );
}

#[test]
fn test_run_is_idempotent() {
    let mut gs = contract();
    gs.split_regime = SplitRegime::PermenEsdm52_2017;
    assert_eq!(gs.run().unwrap(), gs.run().unwrap());
}

#[test]
fn test_contract_sum_type_dispatch() {
    let contract = Contract::GrossSplit(contract());
    let result = contract.run().unwrap();
    assert!(matches!(result, ContractResult::GrossSplit(_)));
    let inputs = result.summary_inputs();
    assert_eq!(inputs.gov_ftp_share, Decimal::ZERO);
    assert_close(
        inputs.gross_revenue,
        inputs.gross_revenue_oil + inputs.gross_revenue_gas,
        "gross revenue",
    );
}
