use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{check_fraction, PscError};
use crate::types::{DeprMethod, Money, Rate, Volume};
use crate::PscResult;

// ---------------------------------------------------------------------------
// Schedule parameters
// ---------------------------------------------------------------------------

/// Everything needed to depreciate one asset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationInput {
    pub method: DeprMethod,
    pub cost: Money,
    #[serde(default)]
    pub salvage_value: Money,
    pub useful_life: u32,
    /// Decline factor for declining balance (2.0 = double declining).
    #[serde(default = "default_decline_factor")]
    pub decline_factor: Decimal,
    /// Per-period rate for the PSC declining balance method.
    #[serde(default = "default_depreciation_factor")]
    pub depreciation_factor: Rate,
    /// Production per period, unit-of-production only.
    #[serde(default)]
    pub production: Vec<Volume>,
    /// Recoverable reserves, unit-of-production only. Defaults to total production.
    #[serde(default)]
    pub reserves: Option<Volume>,
    /// Pad the schedule with trailing zeros up to this length.
    #[serde(default)]
    pub depreciation_len: usize,
}

fn default_decline_factor() -> Decimal {
    Decimal::TWO
}

fn default_depreciation_factor() -> Rate {
    Decimal::new(5, 1)
}

/// A depreciation schedule with the matching book values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepreciationSchedule {
    pub charges: Vec<Money>,
    pub book_value: Vec<Money>,
    pub total_depreciation: Money,
    pub undepreciated: Money,
}

/// Dispatch on the method and attach book values.
pub fn depreciation_schedule(input: &DepreciationInput) -> PscResult<DepreciationSchedule> {
    let charges = match input.method {
        DeprMethod::StraightLine => straight_line_rate(
            input.cost,
            input.salvage_value,
            input.useful_life,
            input.depreciation_len,
        )?,
        DeprMethod::DecliningBalance => declining_balance_rate(
            input.cost,
            input.salvage_value,
            input.useful_life,
            input.decline_factor,
            input.depreciation_len,
        )?,
        DeprMethod::PscDecliningBalance => psc_declining_balance_rate(
            input.cost,
            input.useful_life,
            input.depreciation_factor,
            input.depreciation_len,
        )?,
        DeprMethod::UnitOfProduction => {
            let reserves = input
                .reserves
                .unwrap_or_else(|| input.production.iter().copied().sum());
            unit_of_production_rate(
                input.cost,
                input.salvage_value,
                reserves,
                &input.production,
                input.depreciation_len,
            )?
        }
    };
    let total_depreciation: Money = charges.iter().copied().sum();
    Ok(DepreciationSchedule {
        book_value: book_value(input.cost, &charges),
        undepreciated: input.cost - total_depreciation,
        total_depreciation,
        charges,
    })
}

// ---------------------------------------------------------------------------
// Methods
// ---------------------------------------------------------------------------

fn validate_asset(cost: Money, salvage_value: Money, useful_life: u32) -> PscResult<()> {
    if cost < Decimal::ZERO {
        return Err(PscError::InvalidInput {
            field: "cost".into(),
            reason: "Asset cost cannot be negative".into(),
        });
    }
    if salvage_value < Decimal::ZERO || salvage_value > cost {
        return Err(PscError::InvalidInput {
            field: "salvage_value".into(),
            reason: format!("Salvage value {salvage_value} must lie in [0, {cost}]"),
        });
    }
    if useful_life == 0 {
        return Err(PscError::InvalidInput {
            field: "useful_life".into(),
            reason: "Useful life must be at least one period".into(),
        });
    }
    Ok(())
}

fn pad(mut charges: Vec<Money>, len: usize) -> Vec<Money> {
    if charges.len() < len {
        charges.resize(len, Decimal::ZERO);
    }
    charges
}

/// Straight-line charge `(cost - salvage) / life` for each period of the life.
pub fn straight_line_rate(
    cost: Money,
    salvage_value: Money,
    useful_life: u32,
    depreciation_len: usize,
) -> PscResult<Vec<Money>> {
    validate_asset(cost, salvage_value, useful_life)?;
    let charge = (cost - salvage_value) / Decimal::from(useful_life);
    Ok(pad(vec![charge; useful_life as usize], depreciation_len))
}

/// Declining balance at `decline_factor / useful_life` per period.
///
/// The last period of the life writes the book value down to salvage. A
/// charge that would take the book value below salvage earlier is clipped
/// to the remainder and every later period is zero.
pub fn declining_balance_rate(
    cost: Money,
    salvage_value: Money,
    useful_life: u32,
    decline_factor: Decimal,
    depreciation_len: usize,
) -> PscResult<Vec<Money>> {
    validate_asset(cost, salvage_value, useful_life)?;
    if decline_factor <= Decimal::ZERO {
        return Err(PscError::InvalidInput {
            field: "decline_factor".into(),
            reason: "Decline factor must be positive".into(),
        });
    }

    let rate = decline_factor / Decimal::from(useful_life);
    let depreciable = cost - salvage_value;
    let mut charges = Vec::with_capacity(useful_life as usize);
    let mut charged = Decimal::ZERO;

    for period in 0..useful_life {
        let remaining = depreciable - charged;
        let charge = if period + 1 == useful_life {
            remaining
        } else {
            (rate * (cost - charged)).min(remaining)
        };
        charges.push(charge);
        charged += charge;
    }

    Ok(pad(charges, depreciation_len))
}

/// PSC declining balance: `depreciation_factor` of the book value per
/// period, the final period of the life takes the whole remaining balance.
pub fn psc_declining_balance_rate(
    cost: Money,
    useful_life: u32,
    depreciation_factor: Rate,
    depreciation_len: usize,
) -> PscResult<Vec<Money>> {
    validate_asset(cost, Decimal::ZERO, useful_life)?;
    check_fraction("depreciation_factor", depreciation_factor)?;

    let mut charges = Vec::with_capacity(useful_life as usize);
    let mut book = cost;
    for period in 0..useful_life {
        let charge = if period + 1 == useful_life {
            book
        } else {
            depreciation_factor * book
        };
        charges.push(charge);
        book -= charge;
    }

    Ok(pad(charges, depreciation_len))
}

/// Unit of production: `production / reserves` of the depreciable base per
/// period, clipped so the cumulative charge never passes `cost - salvage`.
pub fn unit_of_production_rate(
    cost: Money,
    salvage_value: Money,
    reserves: Volume,
    production: &[Volume],
    amortization_len: usize,
) -> PscResult<Vec<Money>> {
    validate_asset(cost, salvage_value, 1)?;
    if reserves <= Decimal::ZERO {
        return Err(PscError::InvalidInput {
            field: "reserves".into(),
            reason: "Reserves must be positive for unit of production".into(),
        });
    }
    if let Some(p) = production.iter().find(|p| **p < Decimal::ZERO) {
        return Err(PscError::InvalidInput {
            field: "production".into(),
            reason: format!("Production cannot be negative, got {p}"),
        });
    }

    let depreciable = cost - salvage_value;
    let mut charged = Decimal::ZERO;
    let charges = production
        .iter()
        .map(|p| {
            let charge = (depreciable * *p / reserves).min(depreciable - charged);
            charged += charge;
            charge
        })
        .collect();

    Ok(pad(charges, amortization_len))
}

/// Book value at the end of each period.
pub fn book_value(cost: Money, charges: &[Money]) -> Vec<Money> {
    let mut book = cost;
    charges
        .iter()
        .map(|c| {
            book -= c;
            book
        })
        .collect()
}
