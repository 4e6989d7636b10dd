use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{check_len, PscError};
use crate::timeseries::cost_tools::YearWindow;
use crate::timeseries::{add, zeros};
use crate::types::{FluidType, Money, Volume, Year};
use crate::PscResult;

// ---------------------------------------------------------------------------
// Input types
// ---------------------------------------------------------------------------

/// Production and price schedule of one product stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lifting {
    pub fluid_type: FluidType,
    /// Calendar year of each entry. Several entries may share a year.
    pub prod_year: Vec<Year>,
    /// Sold volume per entry
    pub lifting_rate: Vec<Volume>,
    /// Price per unit of volume per entry
    pub price: Vec<Money>,
    /// Gross heating value per entry, gas only (revenue = rate * ghv * price)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ghv: Option<Vec<Decimal>>,
    /// Produced (not necessarily sold) volume per entry. Defaults to the lifting rate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prod_rate: Option<Vec<Volume>>,
}

impl Lifting {
    pub fn validate(&self, window: YearWindow) -> PscResult<()> {
        let n = self.prod_year.len();
        check_len("lifting_rate", n, self.lifting_rate.len())?;
        check_len("price", n, self.price.len())?;
        if let Some(ghv) = &self.ghv {
            check_len("ghv", n, ghv.len())?;
        }
        if let Some(prod_rate) = &self.prod_rate {
            check_len("prod_rate", n, prod_rate.len())?;
        }
        for year in &self.prod_year {
            window.check("prod_year", *year)?;
        }
        if let Some(rate) = self.lifting_rate.iter().find(|r| **r < Decimal::ZERO) {
            return Err(PscError::InvalidInput {
                field: "lifting_rate".into(),
                reason: format!("Lifting rate cannot be negative, got {rate}"),
            });
        }
        Ok(())
    }

    fn revenue_of(&self, i: usize) -> Money {
        let base = self.lifting_rate[i] * self.price[i];
        match (&self.fluid_type, &self.ghv) {
            (FluidType::Gas, Some(ghv)) => base * ghv[i],
            _ => base,
        }
    }
}

// ---------------------------------------------------------------------------
// Year-aligned series
// ---------------------------------------------------------------------------

/// Liftings of one fluid binned onto the project year axis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LiftingSeries {
    pub lifting_rate: Vec<Volume>,
    pub production_rate: Vec<Volume>,
    pub revenue: Vec<Money>,
    /// Sum of rate * price per year, the WAP numerator
    pub price_volume: Vec<Money>,
}

impl LiftingSeries {
    pub fn empty(len: usize) -> Self {
        Self {
            lifting_rate: zeros(len),
            production_rate: zeros(len),
            revenue: zeros(len),
            price_volume: zeros(len),
        }
    }

    /// Bin every lifting of `fluid` onto the project axis.
    pub fn aggregate(liftings: &[Lifting], fluid: FluidType, window: YearWindow) -> PscResult<Self> {
        let mut series = Self::empty(window.duration());
        for lifting in liftings.iter().filter(|l| l.fluid_type == fluid) {
            lifting.validate(window)?;
            for (i, year) in lifting.prod_year.iter().enumerate() {
                let idx = window.index(*year);
                series.lifting_rate[idx] += lifting.lifting_rate[i];
                series.production_rate[idx] += lifting
                    .prod_rate
                    .as_ref()
                    .map(|p| p[i])
                    .unwrap_or(lifting.lifting_rate[i]);
                series.revenue[idx] += lifting.revenue_of(i);
                series.price_volume[idx] += lifting.lifting_rate[i] * lifting.price[i];
            }
        }
        Ok(series)
    }

    /// Weighted-average price per year, zero in years without volume.
    pub fn wap_price(&self) -> Vec<Money> {
        self.price_volume
            .iter()
            .zip(&self.lifting_rate)
            .map(|(pv, rate)| if rate.is_zero() { Decimal::ZERO } else { pv / rate })
            .collect()
    }

    /// Weighted-average price over the whole contract life.
    pub fn lifetime_wap(&self) -> Money {
        let volume: Volume = self.lifting_rate.iter().copied().sum();
        if volume.is_zero() {
            return Decimal::ZERO;
        }
        self.price_volume.iter().copied().sum::<Money>() / volume
    }

    /// First year with positive revenue.
    pub fn first_revenue_year(&self, window: YearWindow) -> Option<Year> {
        self.revenue
            .iter()
            .position(|r| *r > Decimal::ZERO)
            .map(|i| window.start_year + i as Year)
    }

    pub fn combined(&self, other: &Self) -> Self {
        Self {
            lifting_rate: add(&self.lifting_rate, &other.lifting_rate),
            production_rate: add(&self.production_rate, &other.production_rate),
            revenue: add(&self.revenue, &other.revenue),
            price_volume: add(&self.price_volume, &other.price_volume),
        }
    }
}
