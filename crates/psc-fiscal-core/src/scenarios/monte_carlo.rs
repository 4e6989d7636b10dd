use rand::rngs::StdRng;
use rand::Rng;
use rand::SeedableRng;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use statrs::distribution::{Normal, Triangular, Uniform};
use std::time::Instant;

use super::{evaluate_scaled, ScenarioParameter};
use crate::cashflow::EconomicConfig;
use crate::contracts::Contract;
use crate::error::PscError;
use crate::types::{with_metadata, ComputationOutput};
use crate::PscResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Distribution of a multiplier (1.0 = base case).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum McDistribution {
    Normal { mean: f64, std_dev: f64 },
    Triangular { min: f64, mode: f64, max: f64 },
    Uniform { min: f64, max: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McVariable {
    pub parameter: ScenarioParameter,
    pub distribution: McDistribution,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonteCarloInput {
    pub contract: Contract,
    pub variables: Vec<McVariable>,
    #[serde(default = "default_num_simulations")]
    pub num_simulations: u32,
    /// Optional seed for reproducibility.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub economics: EconomicConfig,
}

fn default_num_simulations() -> u32 {
    500
}

/// Summary statistics of one simulated indicator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McStatistics {
    /// Iterations contributing a value
    pub count: u32,
    pub mean: f64,
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    pub p10: f64,
    pub p50: f64,
    pub p90: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloOutput {
    pub num_simulations: u32,
    /// Iterations whose contract run failed; recorded as zero
    pub failed_iterations: u32,
    pub npv: McStatistics,
    /// `None` when no iteration produced an IRR
    pub irr: Option<McStatistics>,
    /// `None` when no iteration paid out
    pub pot: Option<McStatistics>,
}

// ---------------------------------------------------------------------------
// Sampling
// ---------------------------------------------------------------------------

fn sample(rng: &mut StdRng, dist: &McDistribution) -> PscResult<f64> {
    match dist {
        McDistribution::Normal { mean, std_dev } => {
            let n = Normal::new(*mean, *std_dev).map_err(|e| PscError::InvalidInput {
                field: "distribution".into(),
                reason: format!("Invalid Normal parameters: {e}"),
            })?;
            Ok(rng.sample(n))
        }
        McDistribution::Triangular { min, mode, max } => {
            let t = Triangular::new(*min, *max, *mode).map_err(|e| PscError::InvalidInput {
                field: "distribution".into(),
                reason: format!("Invalid Triangular parameters: {e}"),
            })?;
            Ok(rng.sample(t))
        }
        McDistribution::Uniform { min, max } => {
            let u = Uniform::new(*min, *max).map_err(|e| PscError::InvalidInput {
                field: "distribution".into(),
                reason: format!("Invalid Uniform parameters: {e}"),
            })?;
            Ok(rng.sample(u))
        }
    }
}

/// Multipliers are floored at zero; a negative price or volume has no meaning.
fn to_multiplier(x: f64) -> Decimal {
    Decimal::from_f64(x.max(0.0)).unwrap_or(Decimal::ZERO)
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

/// Percentile of a **sorted** slice with linear interpolation.
fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let rank = p / 100.0 * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    if lower == upper {
        sorted[lower]
    } else {
        let frac = rank - lower as f64;
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

fn statistics(mut values: Vec<f64>) -> Option<McStatistics> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(McStatistics {
        count: values.len() as u32,
        mean,
        std_dev: variance.sqrt(),
        min: values[0],
        max: values[values.len() - 1],
        p10: percentile_sorted(&values, 10.0),
        p50: percentile_sorted(&values, 50.0),
        p90: percentile_sorted(&values, 90.0),
    })
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Rerun the contract under sampled multipliers and summarize contractor
/// NPV, IRR and POT.
pub fn run_monte_carlo(input: &MonteCarloInput) -> PscResult<ComputationOutput<MonteCarloOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.num_simulations == 0 {
        return Err(PscError::InvalidInput {
            field: "num_simulations".into(),
            reason: "Must be at least 1".into(),
        });
    }
    if input.variables.is_empty() {
        return Err(PscError::InsufficientData(
            "At least one variable is required".into(),
        ));
    }

    let mut rng = match input.seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    };

    let n = input.num_simulations as usize;
    let mut npv = Vec::with_capacity(n);
    let mut irr = Vec::with_capacity(n);
    let mut pot = Vec::with_capacity(n);
    let mut failed_iterations = 0u32;

    for iteration in 0..n {
        let mut multipliers = Vec::with_capacity(input.variables.len());
        for var in &input.variables {
            multipliers.push((var.parameter, to_multiplier(sample(&mut rng, &var.distribution)?)));
        }
        match evaluate_scaled(&input.contract, &multipliers, &input.economics) {
            Ok(out) => {
                npv.push(out.npv.to_f64().unwrap_or(0.0));
                if let Some(rate) = out.irr.and_then(|r| r.to_f64()) {
                    irr.push(rate);
                }
                if let Some(years) = out.pot.and_then(|p| p.to_f64()) {
                    pot.push(years);
                }
            }
            Err(e) => {
                tracing::warn!(iteration, error = %e, "monte carlo iteration failed");
                failed_iterations += 1;
                npv.push(0.0);
                irr.push(0.0);
                pot.push(0.0);
            }
        }
    }

    if failed_iterations > 0 {
        warnings.push(format!(
            "{failed_iterations} of {n} iterations failed and were recorded as zero"
        ));
    }

    let npv = statistics(npv).ok_or_else(|| {
        PscError::InsufficientData("Monte Carlo produced no NPV samples".into())
    })?;
    let output = MonteCarloOutput {
        num_simulations: input.num_simulations,
        failed_iterations,
        npv,
        irr: statistics(irr),
        pot: statistics(pot),
    };

    let elapsed = start.elapsed().as_micros() as u64;
    let mut out = with_metadata(
        "PSC Monte Carlo Simulation",
        &serde_json::json!({
            "contract_type": input.contract.contract_type(),
            "num_simulations": input.num_simulations,
            "seed": input.seed,
            "parameters": input.variables.iter().map(|v| v.parameter).collect::<Vec<_>>(),
        }),
        warnings,
        elapsed,
        output,
    );
    out.metadata.precision = "ieee754_f64".to_string();
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentiles_interpolate() {
        let stats = statistics(vec![4.0, 1.0, 3.0, 2.0, 5.0]).unwrap();
        assert_eq!(stats.p50, 3.0);
        assert!((stats.p10 - 1.4).abs() < 1e-12);
        assert!((stats.p90 - 4.6).abs() < 1e-12);
        assert_eq!(stats.min, 1.0);
        assert_eq!(stats.max, 5.0);
        assert_eq!(statistics(vec![]), None);
    }

    #[test]
    fn test_sampling_is_seeded() {
        let dist = McDistribution::Triangular {
            min: 0.8,
            mode: 1.0,
            max: 1.3,
        };
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let x = sample(&mut a, &dist).unwrap();
            assert_eq!(x, sample(&mut b, &dist).unwrap());
            assert!((0.8..=1.3).contains(&x));
        }
    }

    #[test]
    fn test_negative_multiplier_floored() {
        assert_eq!(to_multiplier(-0.5), Decimal::ZERO);
    }

    #[test]
    fn test_invalid_distribution() {
        let mut rng = StdRng::seed_from_u64(1);
        let dist = McDistribution::Uniform { min: 2.0, max: 1.0 };
        assert!(sample(&mut rng, &dist).is_err());
    }
}
