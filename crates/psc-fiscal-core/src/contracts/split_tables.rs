//! Gross Split lookup tables.
//!
//! Each regulation is a set of immutable tables. Variable-split
//! contributions are `(key, contribution)` rows; a key the regulation does
//! not list contributes nothing. Progressive components are piecewise
//! functions of price and cumulative production.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::PscError;
use crate::types::{FluidType, Money, Rate, Volume};

// ---------------------------------------------------------------------------
// Regimes and field characteristics
// ---------------------------------------------------------------------------

/// Ministerial regulation the split is computed under.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitRegime {
    /// Permen ESDM 8/2017
    #[default]
    PermenEsdm8_2017,
    /// Permen ESDM 52/2017, the 2017 amendment with formula price bands
    PermenEsdm52_2017,
    /// Permen ESDM 13/2024
    PermenEsdm13_2024,
}

impl FromStr for SplitRegime {
    type Err = PscError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
            "2017" | "permen_esdm_8_2017" | "permen_esdm8_2017" => Ok(SplitRegime::PermenEsdm8_2017),
            "2017_variant" | "permen_esdm_52_2017" | "permen_esdm52_2017" => {
                Ok(SplitRegime::PermenEsdm52_2017)
            }
            "2024" | "permen_esdm_13_2024" | "permen_esdm13_2024" => {
                Ok(SplitRegime::PermenEsdm13_2024)
            }
            _ => Err(PscError::UnknownVariant {
                kind: "split regime".into(),
                value: s.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    PodI,
    PodII,
    #[default]
    NoPod,
}

/// Onshore, or offshore by water depth in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldLocation {
    #[default]
    Onshore,
    OffshoreUpTo20,
    Offshore20To50,
    Offshore50To150,
    Offshore150To1000,
    OffshoreBeyond1000,
}

/// Reservoir depth in metres.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservoirDepth {
    #[default]
    UpTo2500,
    Beyond2500,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Infrastructure {
    #[default]
    WellDeveloped,
    NewFrontierOffshore,
    NewFrontierOnshore,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservoirType {
    #[default]
    Conventional,
    NonConventional,
}

/// Oil API gravity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OilApi {
    #[default]
    Below25,
    AtLeast25,
}

/// Domestic content (TKDN) in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomesticContent {
    Below30,
    From30To50,
    #[default]
    From50To70,
    From70To100,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProductionStage {
    Primary,
    #[default]
    Secondary,
    Tertiary,
}

/// CO2 content in percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Co2Content {
    #[default]
    Below5,
    From5To10,
    From10To20,
    From20To40,
    From40To60,
    AtLeast60,
}

/// H2S content in ppm.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum H2sContent {
    #[default]
    Below100,
    From100To1000,
    From1000To2000,
    From2000To3000,
    From3000To4000,
    AtLeast4000,
}

/// Field characteristics driving the variable split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldCharacteristics {
    pub field_status: FieldStatus,
    pub field_location: FieldLocation,
    pub reservoir_depth: ReservoirDepth,
    pub infrastructure: Infrastructure,
    pub reservoir_type: ReservoirType,
    pub oil_api: OilApi,
    pub domestic_content: DomesticContent,
    pub production_stage: ProductionStage,
    pub co2_content: Co2Content,
    pub h2s_content: H2sContent,
}

/// One row key of a variable-split table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitKey {
    Status(FieldStatus),
    Location(FieldLocation),
    Depth(ReservoirDepth),
    Infrastructure(Infrastructure),
    Reservoir(ReservoirType),
    Api(OilApi),
    Domestic(DomesticContent),
    Stage(ProductionStage),
    Co2(Co2Content),
    H2s(H2sContent),
}

impl FieldCharacteristics {
    fn keys(&self) -> [SplitKey; 10] {
        [
            SplitKey::Status(self.field_status),
            SplitKey::Location(self.field_location),
            SplitKey::Depth(self.reservoir_depth),
            SplitKey::Infrastructure(self.infrastructure),
            SplitKey::Reservoir(self.reservoir_type),
            SplitKey::Api(self.oil_api),
            SplitKey::Domestic(self.domestic_content),
            SplitKey::Stage(self.production_stage),
            SplitKey::Co2(self.co2_content),
            SplitKey::H2s(self.h2s_content),
        ]
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

static VARIABLE_SPLIT_2017: &[(SplitKey, Rate)] = &[
    (SplitKey::Status(FieldStatus::PodI), dec!(0.05)),
    (SplitKey::Status(FieldStatus::PodII), dec!(0.03)),
    (SplitKey::Status(FieldStatus::NoPod), dec!(0)),
    (SplitKey::Location(FieldLocation::Onshore), dec!(0)),
    (SplitKey::Location(FieldLocation::OffshoreUpTo20), dec!(0.08)),
    (SplitKey::Location(FieldLocation::Offshore20To50), dec!(0.10)),
    (SplitKey::Location(FieldLocation::Offshore50To150), dec!(0.12)),
    (SplitKey::Location(FieldLocation::Offshore150To1000), dec!(0.14)),
    (SplitKey::Location(FieldLocation::OffshoreBeyond1000), dec!(0.16)),
    (SplitKey::Depth(ReservoirDepth::UpTo2500), dec!(0)),
    (SplitKey::Depth(ReservoirDepth::Beyond2500), dec!(0.01)),
    (SplitKey::Infrastructure(Infrastructure::WellDeveloped), dec!(0)),
    (SplitKey::Infrastructure(Infrastructure::NewFrontierOffshore), dec!(0.02)),
    (SplitKey::Infrastructure(Infrastructure::NewFrontierOnshore), dec!(0.04)),
    (SplitKey::Reservoir(ReservoirType::Conventional), dec!(0)),
    (SplitKey::Reservoir(ReservoirType::NonConventional), dec!(0.16)),
    (SplitKey::Api(OilApi::Below25), dec!(0.01)),
    (SplitKey::Api(OilApi::AtLeast25), dec!(0)),
    (SplitKey::Domestic(DomesticContent::Below30), dec!(0)),
    (SplitKey::Domestic(DomesticContent::From30To50), dec!(0.02)),
    (SplitKey::Domestic(DomesticContent::From50To70), dec!(0.03)),
    (SplitKey::Domestic(DomesticContent::From70To100), dec!(0.04)),
    (SplitKey::Stage(ProductionStage::Primary), dec!(0)),
    (SplitKey::Stage(ProductionStage::Secondary), dec!(0.06)),
    (SplitKey::Stage(ProductionStage::Tertiary), dec!(0.10)),
    (SplitKey::Co2(Co2Content::Below5), dec!(0)),
    (SplitKey::Co2(Co2Content::From5To10), dec!(0.005)),
    (SplitKey::Co2(Co2Content::From10To20), dec!(0.01)),
    (SplitKey::Co2(Co2Content::From20To40), dec!(0.015)),
    (SplitKey::Co2(Co2Content::From40To60), dec!(0.02)),
    (SplitKey::Co2(Co2Content::AtLeast60), dec!(0.04)),
    (SplitKey::H2s(H2sContent::Below100), dec!(0)),
    (SplitKey::H2s(H2sContent::From100To1000), dec!(0.01)),
    (SplitKey::H2s(H2sContent::From1000To2000), dec!(0.02)),
    (SplitKey::H2s(H2sContent::From2000To3000), dec!(0.04)),
    (SplitKey::H2s(H2sContent::From3000To4000), dec!(0.04)),
    (SplitKey::H2s(H2sContent::AtLeast4000), dec!(0.05)),
];

// Condensed parameter set: only location, depth, infrastructure and
// reservoir type remain. Values pending confirmation against the gazetted text.
static VARIABLE_SPLIT_2024: &[(SplitKey, Rate)] = &[
    (SplitKey::Location(FieldLocation::Onshore), dec!(0)),
    (SplitKey::Location(FieldLocation::OffshoreUpTo20), dec!(0.08)),
    (SplitKey::Location(FieldLocation::Offshore20To50), dec!(0.10)),
    (SplitKey::Location(FieldLocation::Offshore50To150), dec!(0.12)),
    (SplitKey::Location(FieldLocation::Offshore150To1000), dec!(0.14)),
    (SplitKey::Location(FieldLocation::OffshoreBeyond1000), dec!(0.16)),
    (SplitKey::Depth(ReservoirDepth::UpTo2500), dec!(0)),
    (SplitKey::Depth(ReservoirDepth::Beyond2500), dec!(0.01)),
    (SplitKey::Infrastructure(Infrastructure::WellDeveloped), dec!(0)),
    (SplitKey::Infrastructure(Infrastructure::NewFrontierOffshore), dec!(0.02)),
    (SplitKey::Infrastructure(Infrastructure::NewFrontierOnshore), dec!(0.04)),
    (SplitKey::Reservoir(ReservoirType::Conventional), dec!(0)),
    (SplitKey::Reservoir(ReservoirType::NonConventional), dec!(0.16)),
];

/// `(upper bound exclusive, contribution)`; the last row has no bound.
type Bands = &'static [(Option<Decimal>, Rate)];

static OIL_PRICE_BANDS_2017: Bands = &[
    (Some(dec!(40)), dec!(0.075)),
    (Some(dec!(55)), dec!(0.05)),
    (Some(dec!(70)), dec!(0.025)),
    (Some(dec!(85)), dec!(0)),
    (Some(dec!(100)), dec!(-0.025)),
    (Some(dec!(115)), dec!(-0.05)),
    (None, dec!(-0.075)),
];

/// Cumulative production in MMBOE.
static CUMULATIVE_BANDS_2017: Bands = &[
    (Some(dec!(1)), dec!(0.05)),
    (Some(dec!(10)), dec!(0.04)),
    (Some(dec!(20)), dec!(0.03)),
    (Some(dec!(50)), dec!(0.02)),
    (Some(dec!(150)), dec!(0.01)),
    (None, dec!(0)),
];

fn band_lookup(bands: Bands, x: Decimal) -> Rate {
    bands
        .iter()
        .find(|(upper, _)| upper.map_or(true, |u| x < u))
        .map(|(_, rate)| *rate)
        .unwrap_or(Decimal::ZERO)
}

fn variable_table(regime: SplitRegime) -> &'static [(SplitKey, Rate)] {
    match regime {
        SplitRegime::PermenEsdm8_2017 | SplitRegime::PermenEsdm52_2017 => VARIABLE_SPLIT_2017,
        SplitRegime::PermenEsdm13_2024 => VARIABLE_SPLIT_2024,
    }
}

// ---------------------------------------------------------------------------
// Lookups
// ---------------------------------------------------------------------------

/// Contribution of one key; zero when the regime does not list it.
pub fn variable_contribution(regime: SplitRegime, key: SplitKey) -> Rate {
    variable_table(regime)
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, rate)| *rate)
        .unwrap_or(Decimal::ZERO)
}

/// Sum of the variable-split contributions of a field.
pub fn variable_split(regime: SplitRegime, field: &FieldCharacteristics) -> Rate {
    field
        .keys()
        .iter()
        .map(|key| variable_contribution(regime, *key))
        .sum()
}

/// Price component of the progressive split.
pub fn progressive_price_split(regime: SplitRegime, fluid: FluidType, price: Money) -> Rate {
    match (regime, fluid) {
        (SplitRegime::PermenEsdm8_2017, FluidType::Oil) => band_lookup(OIL_PRICE_BANDS_2017, price),
        (SplitRegime::PermenEsdm8_2017, _) => Decimal::ZERO,
        (_, FluidType::Oil) => {
            if price < dec!(85) {
                (dec!(85) - price) * dec!(0.0025)
            } else {
                Decimal::ZERO
            }
        }
        (_, FluidType::Gas) => {
            if price < dec!(7) {
                (dec!(7) - price) * dec!(0.025)
            } else if price > dec!(10) {
                (dec!(10) - price) * dec!(0.025)
            } else {
                Decimal::ZERO
            }
        }
        _ => Decimal::ZERO,
    }
}

/// Cumulative-production component of the progressive split. The 2024
/// regulation has no cumulative component.
pub fn progressive_cumulative_split(regime: SplitRegime, cumulative: Volume) -> Rate {
    match regime {
        SplitRegime::PermenEsdm8_2017 | SplitRegime::PermenEsdm52_2017 => {
            band_lookup(CUMULATIVE_BANDS_2017, cumulative)
        }
        SplitRegime::PermenEsdm13_2024 => Decimal::ZERO,
    }
}
