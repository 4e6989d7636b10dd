#![cfg(feature = "scenarios")]

mod common;

use common::oil_gas_project;
use psc_fiscal_core::cashflow::EconomicConfig;
use psc_fiscal_core::contracts::{Contract, CostRecovery, GrossSplit};
use psc_fiscal_core::scenarios::sensitivity::{run_sensitivity, SensitivityInput};
use psc_fiscal_core::scenarios::{apply_multiplier, ScenarioParameter};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn cost_recovery() -> Contract {
    Contract::CostRecovery(CostRecovery::new(oil_gas_project()))
}

#[test]
fn test_apply_multiplier_scales_only_its_group() {
    let mut contract = cost_recovery();
    apply_multiplier(&mut contract, ScenarioParameter::OilPrice, dec!(1.5));
    let project = contract.project();
    assert_eq!(project.lifting[0].price[0], dec!(90));
    assert_eq!(project.lifting[1].price[0], dec!(6));
    assert_eq!(project.costs.capital[0].cost, dec!(2000));
}

#[test]
fn test_sensitivity_npv_rises_with_oil_price() {
    let input = SensitivityInput {
        contract: cost_recovery(),
        parameters: vec![ScenarioParameter::OilPrice, ScenarioParameter::Opex],
        factors: vec![dec!(1.2), dec!(0.8), dec!(1.0)],
        economics: EconomicConfig::default(),
    };
    let out = run_sensitivity(&input).unwrap().result;
    assert_eq!(out.series.len(), 2);

    let price = &out.series[0];
    let factors: Vec<Decimal> = price.points.iter().map(|p| p.factor).collect();
    assert_eq!(factors, vec![dec!(0.8), dec!(1.0), dec!(1.2)]);
    assert_eq!(price.points[1].npv, out.base_npv);
    assert!(price.points[0].npv < price.points[2].npv);
    assert!(price.npv_swing > Decimal::ZERO);

    let opex = &out.series[1];
    assert!(opex.points[0].npv > opex.points[2].npv);
}

#[test]
fn test_sensitivity_rejects_negative_factor() {
    let input = SensitivityInput {
        contract: Contract::GrossSplit(GrossSplit::new(oil_gas_project())),
        parameters: vec![ScenarioParameter::Capex],
        factors: vec![dec!(-1)],
        economics: EconomicConfig::default(),
    };
    assert!(run_sensitivity(&input).is_err());
}

#[cfg(feature = "monte_carlo")]
mod monte_carlo {
    use super::*;
    use psc_fiscal_core::scenarios::monte_carlo::{
        run_monte_carlo, McDistribution, McVariable, MonteCarloInput,
    };

    fn input(seed: u64) -> MonteCarloInput {
        MonteCarloInput {
            contract: Contract::GrossSplit(GrossSplit::new(oil_gas_project())),
            variables: vec![
                McVariable {
                    parameter: ScenarioParameter::OilPrice,
                    distribution: McDistribution::Triangular {
                        min: 0.7,
                        mode: 1.0,
                        max: 1.4,
                    },
                },
                McVariable {
                    parameter: ScenarioParameter::Opex,
                    distribution: McDistribution::Uniform { min: 0.9, max: 1.1 },
                },
            ],
            num_simulations: 40,
            seed: Some(seed),
            economics: EconomicConfig::default(),
        }
    }

    #[test]
    fn test_seeded_runs_are_reproducible() {
        let a = run_monte_carlo(&input(42)).unwrap().result;
        let b = run_monte_carlo(&input(42)).unwrap().result;
        assert_eq!(a, b);
        assert_eq!(a.num_simulations, 40);
        assert_eq!(a.failed_iterations, 0);
        assert_eq!(a.npv.count, 40);
        assert!(a.npv.p10 <= a.npv.p50 && a.npv.p50 <= a.npv.p90);
    }
}
