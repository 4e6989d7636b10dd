//! Scenario drivers: rerun a contract under scaled inputs.

#[cfg(feature = "monte_carlo")]
pub mod monte_carlo;
pub mod sensitivity;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cashflow::{economic_indicators, EconomicConfig, EconomicIndicators};
use crate::contracts::Contract;
use crate::error::PscError;
use crate::types::FluidType;
use crate::PscResult;

/// Input group a scenario multiplier scales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioParameter {
    OilPrice,
    GasPrice,
    Opex,
    Capex,
    Lifting,
}

impl std::str::FromStr for ScenarioParameter {
    type Err = PscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "oil_price" | "oil" => Ok(ScenarioParameter::OilPrice),
            "gas_price" | "gas" => Ok(ScenarioParameter::GasPrice),
            "opex" => Ok(ScenarioParameter::Opex),
            "capex" => Ok(ScenarioParameter::Capex),
            "lifting" | "production" => Ok(ScenarioParameter::Lifting),
            _ => Err(PscError::UnknownVariant {
                kind: "scenario parameter".into(),
                value: s.into(),
            }),
        }
    }
}

/// Scale one input group of `contract` in place.
pub fn apply_multiplier(contract: &mut Contract, parameter: ScenarioParameter, factor: Decimal) {
    let project = contract.project_mut();
    match parameter {
        ScenarioParameter::OilPrice | ScenarioParameter::GasPrice => {
            let fluid = if parameter == ScenarioParameter::OilPrice {
                FluidType::Oil
            } else {
                FluidType::Gas
            };
            for lifting in project.lifting.iter_mut().filter(|l| l.fluid_type == fluid) {
                lifting.price.iter_mut().for_each(|p| *p *= factor);
            }
        }
        ScenarioParameter::Lifting => {
            for lifting in &mut project.lifting {
                lifting.lifting_rate.iter_mut().for_each(|v| *v *= factor);
                if let Some(prod) = lifting.prod_rate.as_mut() {
                    prod.iter_mut().for_each(|v| *v *= factor);
                }
            }
        }
        ScenarioParameter::Opex => {
            for line in &mut project.costs.opex {
                line.fixed_cost *= factor;
                line.cost_per_volume *= factor;
            }
        }
        ScenarioParameter::Capex => {
            for line in &mut project.costs.capital {
                line.cost *= factor;
                line.salvage_value *= factor;
            }
            for line in &mut project.costs.intangible {
                line.cost *= factor;
            }
        }
    }
}

/// Run a scaled clone of `contract` and evaluate its cash flow.
pub(crate) fn evaluate_scaled(
    contract: &Contract,
    multipliers: &[(ScenarioParameter, Decimal)],
    economics: &EconomicConfig,
) -> PscResult<EconomicIndicators> {
    let mut scaled = contract.clone();
    for (parameter, factor) in multipliers {
        apply_multiplier(&mut scaled, *parameter, *factor);
    }
    let result = scaled.run()?;
    economic_indicators(&result, economics)
}
