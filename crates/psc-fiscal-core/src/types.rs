use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PscError;
use crate::PscResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Rates expressed as decimals (0.05 = 5%). Never as percentages.
pub type Rate = Decimal;

/// Production volumes (MMBO, BSCF, MMBOE, ...)
pub type Volume = Decimal;

/// Calendar year
pub type Year = i32;

// ---------------------------------------------------------------------------
// Fiscal enums
// ---------------------------------------------------------------------------

/// Product stream a lifting or cost line belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FluidType {
    #[default]
    Oil,
    Gas,
    Sulfur,
    Electricity,
    Co2,
}

impl FromStr for FluidType {
    type Err = PscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "oil" => Ok(FluidType::Oil),
            "gas" => Ok(FluidType::Gas),
            "sulfur" => Ok(FluidType::Sulfur),
            "electricity" => Ok(FluidType::Electricity),
            "co2" => Ok(FluidType::Co2),
            _ => Err(PscError::UnknownVariant {
                kind: "fluid type".into(),
                value: s.into(),
            }),
        }
    }
}

/// Depreciation method for capital cost.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeprMethod {
    StraightLine,
    DecliningBalance,
    #[default]
    PscDecliningBalance,
    UnitOfProduction,
}

impl FromStr for DeprMethod {
    type Err = PscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "straight_line" | "sl" => Ok(DeprMethod::StraightLine),
            "declining_balance" | "db" => Ok(DeprMethod::DecliningBalance),
            "psc_declining_balance" | "psc_db" => Ok(DeprMethod::PscDecliningBalance),
            "unit_of_production" | "uop" => Ok(DeprMethod::UnitOfProduction),
            _ => Err(PscError::UnknownVariant {
                kind: "depreciation method".into(),
                value: s.into(),
            }),
        }
    }
}

/// Statutory income tax regime used when no explicit tax rate is given.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    #[default]
    NailedDown,
    Prevailing,
    Uu36_2008,
    Uu02_2020,
    Uu07_2021,
}

impl FromStr for TaxRegime {
    type Err = PscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "nailed_down" => Ok(TaxRegime::NailedDown),
            "prevailing" => Ok(TaxRegime::Prevailing),
            "uu36_2008" | "uu_36_2008" => Ok(TaxRegime::Uu36_2008),
            "uu02_2020" | "uu_02_2020" => Ok(TaxRegime::Uu02_2020),
            "uu07_2021" | "uu_07_2021" => Ok(TaxRegime::Uu07_2021),
            _ => Err(PscError::UnknownVariant {
                kind: "tax regime".into(),
                value: s.into(),
            }),
        }
    }
}

/// How contractor FTP enters the income tax base.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FtpTaxRegime {
    /// FTP is taxed once cumulative FTP exceeds the unrecovered balance.
    #[default]
    Pdjp20_2017,
    /// Tax accrues from the first year with positive equity share and
    /// is paid down against contractor equity with a carry-forward.
    Pre2017,
    /// Plain taxable income times rate.
    Direct,
}

/// Destination of sulfur, electricity and CO2 revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OtherRevenue {
    AdditionToOilRevenue,
    AdditionToGasRevenue,
    ReductionToOilOpex,
    ReductionToGasOpex,
}

/// Cost categories escalated by the inflation schedule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InflationAppliedTo {
    #[default]
    Capex,
    Opex,
    CapexAndOpex,
    None,
}

impl InflationAppliedTo {
    pub fn covers_capex(self) -> bool {
        matches!(self, InflationAppliedTo::Capex | InflationAppliedTo::CapexAndOpex)
    }

    pub fn covers_opex(self) -> bool {
        matches!(self, InflationAppliedTo::Opex | InflationAppliedTo::CapexAndOpex)
    }
}

/// NPV convention.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NpvMode {
    NominalTerms,
    RealTerms,
    SkkNominalTerms,
    #[default]
    SkkRealTerms,
    PointForward,
}

impl FromStr for NpvMode {
    type Err = PscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "nominal" | "nominal_terms" => Ok(NpvMode::NominalTerms),
            "real" | "real_terms" => Ok(NpvMode::RealTerms),
            "skk_nominal" | "skk_nominal_terms" => Ok(NpvMode::SkkNominalTerms),
            "skk_real" | "skk_real_terms" => Ok(NpvMode::SkkRealTerms),
            "point_forward" => Ok(NpvMode::PointForward),
            _ => Err(PscError::UnknownVariant {
                kind: "NPV mode".into(),
                value: s.into(),
            }),
        }
    }
}

/// Timing of cash flows within a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountingMode {
    #[default]
    EndYear,
    MidYear,
}

impl FromStr for DiscountingMode {
    type Err = PscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "end_year" => Ok(DiscountingMode::EndYear),
            "mid_year" => Ok(DiscountingMode::MidYear),
            _ => Err(PscError::UnknownVariant {
                kind: "discounting mode".into(),
                value: s.into(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Rate schedules
// ---------------------------------------------------------------------------

/// A rate given either once for every year or year by year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RateSchedule {
    Flat(Rate),
    PerYear(Vec<Rate>),
}

impl Default for RateSchedule {
    fn default() -> Self {
        RateSchedule::Flat(Decimal::ZERO)
    }
}

impl RateSchedule {
    /// Expand to one rate per project year.
    pub fn resolve(&self, field: &str, project_duration: usize) -> PscResult<Vec<Rate>> {
        match self {
            RateSchedule::Flat(rate) => Ok(vec![*rate; project_duration]),
            RateSchedule::PerYear(rates) => {
                crate::error::check_len(field, project_duration, rates.len())?;
                Ok(rates.clone())
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Output envelope
// ---------------------------------------------------------------------------

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_flat_schedule_broadcasts() {
        let rates = RateSchedule::Flat(dec!(0.4)).resolve("tax_rate", 3).unwrap();
        assert_eq!(rates, vec![dec!(0.4); 3]);
    }

    #[test]
    fn test_per_year_schedule_length_checked() {
        let schedule = RateSchedule::PerYear(vec![dec!(0.1), dec!(0.2)]);
        let err = schedule.resolve("vat_rate", 3).unwrap_err();
        assert!(matches!(err, PscError::LengthMismatch { expected: 3, actual: 2, .. }));
    }

    #[test]
    fn test_schedule_deserializes_scalar_or_array() {
        let flat: RateSchedule = serde_json::from_str("\"0.05\"").unwrap();
        assert_eq!(flat, RateSchedule::Flat(dec!(0.05)));
        let per_year: RateSchedule = serde_json::from_str("[\"0.1\", \"0.2\"]").unwrap();
        assert_eq!(per_year, RateSchedule::PerYear(vec![dec!(0.1), dec!(0.2)]));
    }

    #[test]
    fn test_unknown_npv_mode_rejected() {
        let err = "full_cycle".parse::<NpvMode>().unwrap_err();
        assert!(matches!(err, PscError::UnknownVariant { .. }));
        assert_eq!("point-forward".parse::<NpvMode>().unwrap(), NpvMode::PointForward);
    }

    #[test]
    fn test_depr_method_short_names() {
        assert_eq!("psc_db".parse::<DeprMethod>().unwrap(), DeprMethod::PscDecliningBalance);
        assert_eq!("Straight Line".parse::<DeprMethod>().unwrap(), DeprMethod::StraightLine);
        assert!("sum_of_years".parse::<DeprMethod>().is_err());
    }
}
