use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::{evaluate_scaled, ScenarioParameter};
use crate::cashflow::EconomicConfig;
use crate::contracts::Contract;
use crate::error::PscError;
use crate::types::{with_metadata, ComputationOutput, Money, Rate};
use crate::PscResult;

/// One-at-a-time sensitivity of contractor NPV and IRR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityInput {
    pub contract: Contract,
    pub parameters: Vec<ScenarioParameter>,
    /// Multipliers applied to each parameter in turn (1.0 = base case)
    pub factors: Vec<Decimal>,
    #[serde(default)]
    pub economics: EconomicConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub factor: Decimal,
    pub npv: Money,
    pub irr: Option<Rate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySeries {
    pub parameter: ScenarioParameter,
    pub points: Vec<SensitivityPoint>,
    /// NPV at the highest factor less NPV at the lowest
    pub npv_swing: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityOutput {
    pub base_npv: Money,
    pub base_irr: Option<Rate>,
    pub series: Vec<SensitivitySeries>,
}

fn validate(input: &SensitivityInput) -> PscResult<()> {
    if input.parameters.is_empty() {
        return Err(PscError::InsufficientData(
            "At least one sensitivity parameter is required".into(),
        ));
    }
    if input.factors.is_empty() {
        return Err(PscError::InsufficientData(
            "At least one sensitivity factor is required".into(),
        ));
    }
    if let Some(f) = input.factors.iter().find(|f| f.is_sign_negative()) {
        return Err(PscError::InvalidInput {
            field: "factors".into(),
            reason: format!("Multipliers cannot be negative, got {f}"),
        });
    }
    Ok(())
}

/// Rerun the contract with each parameter scaled by each factor.
pub fn run_sensitivity(
    input: &SensitivityInput,
) -> PscResult<ComputationOutput<SensitivityOutput>> {
    let start = Instant::now();
    validate(input)?;
    let mut warnings: Vec<String> = Vec::new();

    let base = evaluate_scaled(&input.contract, &[], &input.economics)?;
    warnings.extend(base.warnings.iter().cloned());

    let mut factors = input.factors.clone();
    factors.sort();
    factors.dedup();

    let mut series = Vec::with_capacity(input.parameters.len());
    for parameter in &input.parameters {
        let mut points = Vec::with_capacity(factors.len());
        for factor in &factors {
            let out = evaluate_scaled(&input.contract, &[(*parameter, *factor)], &input.economics)?;
            points.push(SensitivityPoint {
                factor: *factor,
                npv: out.npv,
                irr: out.irr,
            });
        }
        let npv_swing = match (points.first(), points.last()) {
            (Some(low), Some(high)) => high.npv - low.npv,
            _ => Decimal::ZERO,
        };
        tracing::debug!(?parameter, %npv_swing, "sensitivity series complete");
        series.push(SensitivitySeries {
            parameter: *parameter,
            points,
            npv_swing,
        });
    }

    let output = SensitivityOutput {
        base_npv: base.npv,
        base_irr: base.irr,
        series,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "PSC One-at-a-Time Sensitivity",
        &serde_json::json!({
            "contract_type": input.contract.contract_type(),
            "parameters": input.parameters,
            "factors": factors.iter().map(|f| f.to_string()).collect::<Vec<_>>(),
            "npv_mode": input.economics.npv_mode,
            "discount_rate": input.economics.discount_rate.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factors_required() {
        let input: Result<SensitivityInput, _> = serde_json::from_str(r#"{"contract": {}}"#);
        assert!(input.is_err());
    }

    #[test]
    fn test_parse_parameter() {
        assert_eq!(
            "oil-price".parse::<ScenarioParameter>().unwrap(),
            ScenarioParameter::OilPrice
        );
        assert!("tariff".parse::<ScenarioParameter>().is_err());
    }
}
