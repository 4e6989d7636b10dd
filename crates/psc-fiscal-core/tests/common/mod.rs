#![allow(dead_code)]

use chrono::NaiveDate;
use psc_fiscal_core::contracts::Project;
use psc_fiscal_core::costs::{AsrCost, CapitalCost, CostBook, CostTerms, IntangibleCost, OpexCost};
use psc_fiscal_core::lifting::Lifting;
use psc_fiscal_core::types::{FluidType, Money, Year};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

pub const TOLERANCE: Decimal = dec!(0.000001);

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn assert_close(a: Decimal, b: Decimal, context: &str) {
    assert!(
        (a - b).abs() <= TOLERANCE,
        "{context}: {a} differs from {b}"
    );
}

fn opex_line(year: Year, fluid: FluidType, fixed: Money) -> OpexCost {
    OpexCost {
        fixed_cost: fixed,
        prod_rate: Decimal::ZERO,
        cost_per_volume: Decimal::ZERO,
        terms: CostTerms::new(year, fluid),
    }
}

/// Ten-year oil and gas field: development in 2021-2022, oil from 2022,
/// gas from 2023.
pub fn oil_gas_project() -> Project {
    let oil_years: Vec<Year> = (2022..=2029).collect();
    let gas_years: Vec<Year> = (2023..=2029).collect();

    let mut opex = Vec::new();
    for year in 2022..=2029 {
        opex.push(opex_line(year, FluidType::Oil, dec!(300)));
    }
    for year in 2023..=2029 {
        opex.push(opex_line(year, FluidType::Gas, dec!(120)));
    }

    Project {
        start_date: date(2020, 1, 1),
        end_date: date(2029, 12, 31),
        oil_onstream_date: None,
        gas_onstream_date: None,
        lifting: vec![
            Lifting {
                fluid_type: FluidType::Oil,
                prod_year: oil_years.clone(),
                lifting_rate: vec![dec!(100); oil_years.len()],
                price: vec![dec!(60); oil_years.len()],
                ghv: None,
                prod_rate: None,
            },
            Lifting {
                fluid_type: FluidType::Gas,
                prod_year: gas_years.clone(),
                lifting_rate: vec![dec!(500); gas_years.len()],
                price: vec![dec!(6); gas_years.len()],
                ghv: Some(vec![Decimal::ONE; gas_years.len()]),
                prod_rate: None,
            },
        ],
        costs: CostBook {
            capital: vec![
                CapitalCost::new(dec!(2000), CostTerms::new(2021, FluidType::Oil), 5),
                CapitalCost::new(dec!(800), CostTerms::new(2022, FluidType::Gas), 5),
            ],
            intangible: vec![
                IntangibleCost {
                    cost: dec!(1500),
                    terms: CostTerms::new(2021, FluidType::Oil),
                },
                IntangibleCost {
                    cost: dec!(600),
                    terms: CostTerms::new(2022, FluidType::Gas),
                },
            ],
            opex,
            asr: vec![AsrCost {
                cost: dec!(200),
                terms: CostTerms::new(2022, FluidType::Oil),
                final_year: None,
                future_rate: dec!(0.02),
            }],
            ..Default::default()
        },
    }
}

/// Oil-only project with a small cumulative production, so the
/// cumulative-production split stays in its top band.
pub fn small_oil_project() -> Project {
    let years: Vec<Year> = (2022..=2025).collect();
    Project {
        start_date: date(2021, 1, 1),
        end_date: date(2025, 12, 31),
        oil_onstream_date: None,
        gas_onstream_date: None,
        lifting: vec![Lifting {
            fluid_type: FluidType::Oil,
            prod_year: years.clone(),
            lifting_rate: vec![dec!(0.2); years.len()],
            price: vec![dec!(60); years.len()],
            ghv: None,
            prod_rate: None,
        }],
        costs: CostBook {
            capital: vec![CapitalCost::new(dec!(3), CostTerms::new(2021, FluidType::Oil), 5)],
            opex: years
                .iter()
                .map(|y| opex_line(*y, FluidType::Oil, dec!(1)))
                .collect(),
            ..Default::default()
        },
    }
}
