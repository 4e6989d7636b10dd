//! Gross Split PSC.
//!
//! Gross revenue is split up front by a contractor split built from a base
//! rate, field characteristics, price and cumulative production, and a
//! ministerial discretion. The contractor bears its own cost, deducted
//! from its share with carry-forward and cross-fluid transfer, and pays DMO
//! and income tax on what remains.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::cost_recovery::DmoTerms;
use super::project::{FluidBase, PreparedProject, Project, RunOptions};
use super::psc_tools::{
    dmo_fee, dmo_holiday_end, dmo_volume, pool_before, recover_costs, recover_with_transfer, Dmo,
    DmoParams, Recovery,
};
use super::split_tables::{
    progressive_cumulative_split, progressive_price_split, variable_split, FieldCharacteristics,
    SplitRegime,
};
use crate::error::{check_fraction, PscError};
use crate::lifting::LiftingSeries;
use crate::timeseries::depreciation::unit_of_production_rate;
use crate::timeseries::{add, add_all, cumsum, sub, zeros};
use crate::types::{FluidType, Money, Rate, Volume, Year};
use crate::PscResult;

// ---------------------------------------------------------------------------
// Terms
// ---------------------------------------------------------------------------

/// How non-capital cost incurred before the sunk-cost reference year is deducted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SunkCostTreatment {
    /// Deducted in full in the reference year
    #[default]
    Expensed,
    /// Amortized by unit of production from the reference year
    Amortized,
}

/// A Gross Split production sharing contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrossSplit {
    #[serde(flatten)]
    pub project: Project,
    #[serde(default)]
    pub split_regime: SplitRegime,
    #[serde(default)]
    pub field: FieldCharacteristics,
    #[serde(default = "default_base_split_oil")]
    pub base_split_ctr_oil: Rate,
    #[serde(default = "default_base_split_gas")]
    pub base_split_ctr_gas: Rate,
    #[serde(default = "default_ministry_discretion")]
    pub split_ministry_disc: Rate,
    #[serde(default = "default_oil_dmo")]
    pub oil_dmo: DmoTerms,
    #[serde(default = "default_gas_dmo")]
    pub gas_dmo: DmoTerms,
    /// Gas volume per barrel of oil equivalent
    #[serde(default = "default_conversion")]
    pub conversion_boe_to_scf: Decimal,
    /// Add the undepreciated capital cost to the final year's deductible cost
    #[serde(default)]
    pub sum_undepreciated_cost: bool,
    #[serde(default)]
    pub sunk_cost_treatment: SunkCostTreatment,
    #[serde(default)]
    pub options: RunOptions,
}

fn default_base_split_oil() -> Rate {
    dec!(0.43)
}

fn default_base_split_gas() -> Rate {
    dec!(0.48)
}

fn default_ministry_discretion() -> Rate {
    dec!(0.08)
}

fn default_oil_dmo() -> DmoTerms {
    DmoTerms {
        volume_portion: dec!(0.25),
        fee_portion: Decimal::ONE,
        holiday_duration_months: 60,
    }
}

fn default_gas_dmo() -> DmoTerms {
    DmoTerms {
        volume_portion: Decimal::ONE,
        fee_portion: Decimal::ONE,
        holiday_duration_months: 60,
    }
}

fn default_conversion() -> Decimal {
    dec!(5.6)
}

impl GrossSplit {
    /// A Gross Split contract with every default term.
    pub fn new(project: Project) -> Self {
        Self {
            project,
            split_regime: SplitRegime::default(),
            field: FieldCharacteristics::default(),
            base_split_ctr_oil: default_base_split_oil(),
            base_split_ctr_gas: default_base_split_gas(),
            split_ministry_disc: default_ministry_discretion(),
            oil_dmo: default_oil_dmo(),
            gas_dmo: default_gas_dmo(),
            conversion_boe_to_scf: default_conversion(),
            sum_undepreciated_cost: false,
            sunk_cost_treatment: SunkCostTreatment::default(),
            options: RunOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

cashflow_arrays! {
    /// Gross Split arrays of one fluid, or of both consolidated.
    pub struct GrossSplitCashflow {
        pub revenue,
        /// Contractor share of gross revenue before transfer
        pub contractor_share,
        pub government_share,
        pub capital,
        pub intangible,
        pub opex,
        pub asr,
        pub lbt,
        pub cost_of_sales,
        pub depreciation,
        pub undepreciated,
        /// Non-capital cost incurred before the sunk-cost reference year
        pub sunk_cost,
        /// Sunk cost amortization (amortized treatment only)
        pub amortization,
        pub cost_to_deduct,
        pub deductible_cost_before_transfer,
        pub carry_forward_before_transfer,
        pub transfer_in,
        pub transfer_out,
        pub contractor_share_after_transfer,
        pub deductible_cost,
        /// Carry-forward deductible cost after transfer
        pub carry_forward,
        pub net_operating_profit,
        pub dmo_volume,
        pub dmo_fee,
        pub ddmo,
        pub taxable_income,
        pub tax,
        pub net_share,
        pub contractor_take,
        pub expenditures,
        /// Cash expenditure before indirect tax and inflation
        pub expenditures_pre_tax,
        pub cashflow,
        pub government_take,
    }
}

/// Components of the contractor split of one fluid, per year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitBreakdown {
    pub base: Vec<Rate>,
    pub variable: Vec<Rate>,
    pub progressive_price: Vec<Rate>,
    pub progressive_cumulative: Vec<Rate>,
    pub ministry_discretion: Vec<Rate>,
    /// Sum of the components before clipping
    pub raw: Vec<Rate>,
    /// Contractor split clipped into [0, 1]
    pub ctr_split: Vec<Rate>,
}

/// Years whose raw split reached 100% and was clipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MaxSplitYears {
    pub oil: Vec<Year>,
    pub gas: Vec<Year>,
}

/// Everything a Gross Split run derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrossSplitResult {
    pub project_years: Vec<Year>,
    pub oil: GrossSplitCashflow,
    pub gas: GrossSplitCashflow,
    pub consolidated: GrossSplitCashflow,
    pub oil_split: SplitBreakdown,
    pub gas_split: SplitBreakdown,
    pub years_of_max_split: MaxSplitYears,
    /// Cumulative oil-equivalent production
    pub cumulative_production: Vec<Volume>,
    pub transfer_to_oil: Vec<Money>,
    pub transfer_to_gas: Vec<Money>,
    pub tax_rate: Vec<Rate>,
    pub oil_lifting: LiftingSeries,
    pub gas_lifting: LiftingSeries,
    pub oil_wap_price: Vec<Money>,
    pub gas_wap_price: Vec<Money>,
    pub oil_onstream_year: Year,
    pub gas_onstream_year: Year,
    pub sunk_cost_reference_year: Year,
    pub warnings: Vec<String>,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

struct PreTransfer {
    split: SplitBreakdown,
    contractor_share: Vec<Money>,
    government_share: Vec<Money>,
    undepreciated: Vec<Money>,
    sunk_cost: Vec<Money>,
    amortization: Vec<Money>,
    cost_to_deduct: Vec<Money>,
    before: Recovery,
}

impl GrossSplit {
    fn validate(&self) -> PscResult<()> {
        check_fraction("base_split_ctr_oil", self.base_split_ctr_oil)?;
        check_fraction("base_split_ctr_gas", self.base_split_ctr_gas)?;
        check_fraction("split_ministry_disc", self.split_ministry_disc)?;
        self.oil_dmo.validate("oil")?;
        self.gas_dmo.validate("gas")?;
        if self.conversion_boe_to_scf <= Decimal::ZERO {
            return Err(PscError::InvalidInput {
                field: "conversion_boe_to_scf".into(),
                reason: "Conversion factor must be positive".into(),
            });
        }
        Ok(())
    }

    /// Run the contract.
    pub fn run(&self) -> PscResult<GrossSplitResult> {
        tracing::debug!(
            start = %self.project.start_date,
            end = %self.project.end_date,
            regime = ?self.split_regime,
            "running gross split contract"
        );
        self.validate()?;
        let prepared = self.project.prepare(&self.options)?;
        let mut warnings = Vec::new();

        let cumulative_production = cumsum(
            &prepared
                .oil
                .lifting
                .lifting_rate
                .iter()
                .zip(&prepared.gas.lifting.lifting_rate)
                .map(|(oil, gas)| oil + gas / self.conversion_boe_to_scf)
                .collect::<Vec<_>>(),
        );
        let variable = variable_split(self.split_regime, &self.field);

        let oil_pre = self.pre_transfer(
            &prepared,
            &prepared.oil,
            FluidType::Oil,
            self.base_split_ctr_oil,
            variable,
            &cumulative_production,
            &mut warnings,
        )?;
        let gas_pre = self.pre_transfer(
            &prepared,
            &prepared.gas,
            FluidType::Gas,
            self.base_split_ctr_gas,
            variable,
            &cumulative_production,
            &mut warnings,
        )?;

        let years_of_max_split = MaxSplitYears {
            oil: max_split_years(&oil_pre.split, &prepared.project_years),
            gas: max_split_years(&gas_pre.split, &prepared.project_years),
        };
        for (fluid, years) in [("oil", &years_of_max_split.oil), ("gas", &years_of_max_split.gas)] {
            if !years.is_empty() {
                tracing::warn!(fluid, ?years, "contractor split reached 100% and was clipped");
                warnings.push(format!(
                    "{fluid} contractor split reached 100% and was clipped in {years:?}"
                ));
            }
        }

        let joint = recover_with_transfer(
            &oil_pre.contractor_share,
            &oil_pre.cost_to_deduct,
            &gas_pre.contractor_share,
            &gas_pre.cost_to_deduct,
        );

        let (oil_split, oil) = self.post_transfer(
            &prepared,
            &prepared.oil,
            &self.oil_dmo,
            oil_pre,
            &joint.oil,
            &joint.transfer_to_oil,
            &joint.transfer_to_gas,
        )?;
        let (gas_split, gas) = self.post_transfer(
            &prepared,
            &prepared.gas,
            &self.gas_dmo,
            gas_pre,
            &joint.gas,
            &joint.transfer_to_gas,
            &joint.transfer_to_oil,
        )?;
        let consolidated = oil.combined(&gas);

        tracing::debug!(
            years = prepared.project_years.len(),
            "gross split contract complete"
        );

        Ok(GrossSplitResult {
            project_years: prepared.project_years.clone(),
            oil,
            gas,
            consolidated,
            oil_split,
            gas_split,
            years_of_max_split,
            cumulative_production,
            transfer_to_oil: joint.transfer_to_oil,
            transfer_to_gas: joint.transfer_to_gas,
            tax_rate: prepared.tax_rate.clone(),
            oil_wap_price: prepared.oil.wap_price.clone(),
            gas_wap_price: prepared.gas.wap_price.clone(),
            oil_lifting: prepared.oil.lifting.clone(),
            gas_lifting: prepared.gas.lifting.clone(),
            oil_onstream_year: prepared.onstream_years()[0],
            gas_onstream_year: prepared.onstream_years()[1],
            sunk_cost_reference_year: prepared.sunk_cost_reference_year,
            warnings,
        })
    }

    /// Contractor split components of one fluid.
    pub fn split_breakdown(
        &self,
        fluid: FluidType,
        base_split: Rate,
        variable: Rate,
        price: &[Money],
        cumulative_production: &[Volume],
    ) -> SplitBreakdown {
        let len = price.len();
        let progressive_price: Vec<Rate> = price
            .iter()
            .map(|p| progressive_price_split(self.split_regime, fluid, *p))
            .collect();
        let progressive_cumulative: Vec<Rate> = cumulative_production
            .iter()
            .map(|c| progressive_cumulative_split(self.split_regime, *c))
            .collect();
        let base = vec![base_split; len];
        let variable = vec![variable; len];
        let ministry_discretion = vec![self.split_ministry_disc; len];
        let raw = add_all(
            len,
            &[
                &base,
                &variable,
                &progressive_price,
                &progressive_cumulative,
                &ministry_discretion,
            ],
        );
        let ctr_split = raw
            .iter()
            .map(|&s| s.max(Decimal::ZERO).min(Decimal::ONE))
            .collect();
        SplitBreakdown {
            base,
            variable,
            progressive_price,
            progressive_cumulative,
            ministry_discretion,
            raw,
            ctr_split,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn pre_transfer(
        &self,
        prepared: &PreparedProject,
        base: &FluidBase,
        fluid: FluidType,
        base_split: Rate,
        variable: Rate,
        cumulative_production: &[Volume],
        warnings: &mut Vec<String>,
    ) -> PscResult<PreTransfer> {
        let len = prepared.window.duration();
        let split = self.split_breakdown(
            fluid,
            base_split,
            variable,
            &base.wap_price,
            cumulative_production,
        );
        let contractor_share: Vec<Money> = base
            .revenue
            .iter()
            .zip(&split.ctr_split)
            .map(|(r, s)| r * s)
            .collect();
        let government_share = sub(&base.revenue, &contractor_share);

        let mut undepreciated = zeros(len);
        if self.sum_undepreciated_cost {
            if let Some(last) = undepreciated.last_mut() {
                *last = base.costs.undepreciated;
            }
        }

        let reference = prepared.sunk_reference_index();
        let non_capital = base.costs.non_capital();
        let mut sunk_cost = zeros(len);
        let mut amortization = zeros(len);
        let deductible_non_capital = match self.sunk_cost_treatment {
            SunkCostTreatment::Expensed => {
                let (pooled, sunk) = pool_before(&non_capital, reference);
                sunk_cost[reference] = sunk;
                pooled
            }
            SunkCostTreatment::Amortized => {
                let (_, sunk) = pool_before(&non_capital, reference);
                sunk_cost[reference] = sunk;
                let mut current = non_capital.clone();
                for v in &mut current[..reference] {
                    *v = Decimal::ZERO;
                }
                amortization = self.amortize(sunk, reference, &base.lifting.production_rate, fluid, warnings)?;
                add(&current, &amortization)
            }
        };

        let cost_to_deduct = add_all(
            len,
            &[&base.costs.depreciation, &undepreciated, &deductible_non_capital],
        );
        let before = recover_costs(&contractor_share, &cost_to_deduct);

        Ok(PreTransfer {
            split,
            contractor_share,
            government_share,
            undepreciated,
            sunk_cost,
            amortization,
            cost_to_deduct,
            before,
        })
    }

    /// Unit-of-production amortization of `sunk` over production from the
    /// reference year. Without later production it is deducted at once.
    fn amortize(
        &self,
        sunk: Money,
        reference: usize,
        production: &[Volume],
        fluid: FluidType,
        warnings: &mut Vec<String>,
    ) -> PscResult<Vec<Money>> {
        let len = production.len();
        let mut out = zeros(len);
        if sunk.is_zero() {
            return Ok(out);
        }
        let remaining = &production[reference..];
        let reserves: Volume = remaining.iter().copied().sum();
        if reserves <= Decimal::ZERO {
            tracing::warn!(?fluid, "no production to amortize sunk cost over, expensed in reference year");
            warnings.push(format!(
                "{fluid:?} sunk cost expensed in the reference year: no production to amortize over"
            ));
            out[reference] = sunk;
            return Ok(out);
        }
        let charges = unit_of_production_rate(sunk, Decimal::ZERO, reserves, remaining, len - reference)?;
        for (slot, charge) in out[reference..].iter_mut().zip(&charges) {
            *slot = *charge;
        }
        Ok(out)
    }

    #[allow(clippy::too_many_arguments)]
    fn post_transfer(
        &self,
        prepared: &PreparedProject,
        base: &FluidBase,
        dmo: &DmoTerms,
        pre: PreTransfer,
        after: &Recovery,
        transfer_in: &[Money],
        transfer_out: &[Money],
    ) -> PscResult<(SplitBreakdown, GrossSplitCashflow)> {
        let contractor_share_after_transfer =
            add(&sub(&pre.contractor_share, transfer_out), transfer_in);
        let net_operating_profit = sub(&contractor_share_after_transfer, &after.recovered);

        let params = DmoParams {
            window: prepared.window,
            holiday_end: dmo_holiday_end(base.onstream, dmo.holiday_months())?,
            volume_portion: dmo.volume_portion,
            fee_portion: dmo.fee_portion,
            end_weighted: self.options.dmo_end_weighted,
            lifting: &base.lifting.lifting_rate,
            price: &base.wap_price,
            share: &pre.split.ctr_split,
            unrecovered: &after.unrecovered,
        };
        let Dmo { volume, fee, ddmo } = dmo_fee(&params, dmo_volume(&params));
        let ddmo: Vec<Money> = ddmo
            .iter()
            .zip(&net_operating_profit)
            .map(|(&d, &nop)| d.max(Decimal::ZERO).min(nop.max(Decimal::ZERO)))
            .collect();

        let taxable_income = sub(&net_operating_profit, &ddmo);
        let tax: Vec<Money> = taxable_income
            .iter()
            .zip(&prepared.tax_rate)
            .map(|(ti, r)| ti * r)
            .collect();
        let net_share = sub(&taxable_income, &tax);
        let contractor_take = add(&net_share, &after.recovered);
        let expenditures = base.costs.total_expenditures();
        let cashflow = sub(
            &sub(&sub(&pre.contractor_share, &expenditures), &ddmo),
            &tax,
        );
        let government_take = add(&add(&pre.government_share, &ddmo), &tax);

        let cashflow = GrossSplitCashflow {
            revenue: base.revenue.clone(),
            contractor_share: pre.contractor_share,
            government_share: pre.government_share,
            capital: base.costs.capital.clone(),
            intangible: base.costs.intangible.clone(),
            opex: base.costs.opex.clone(),
            asr: base.costs.asr.clone(),
            lbt: base.costs.lbt.clone(),
            cost_of_sales: base.costs.cost_of_sales.clone(),
            depreciation: base.costs.depreciation.clone(),
            undepreciated: pre.undepreciated,
            sunk_cost: pre.sunk_cost,
            amortization: pre.amortization,
            cost_to_deduct: pre.cost_to_deduct,
            deductible_cost_before_transfer: pre.before.recovered,
            carry_forward_before_transfer: pre.before.unrecovered,
            transfer_in: transfer_in.to_vec(),
            transfer_out: transfer_out.to_vec(),
            contractor_share_after_transfer,
            deductible_cost: after.recovered.clone(),
            carry_forward: after.unrecovered.clone(),
            net_operating_profit,
            dmo_volume: volume,
            dmo_fee: fee,
            ddmo,
            taxable_income,
            tax,
            net_share,
            contractor_take,
            expenditures,
            expenditures_pre_tax: base.costs.total_expenditures_pre_tax(),
            cashflow,
            government_take,
        };
        Ok((pre.split, cashflow))
    }
}

fn max_split_years(split: &SplitBreakdown, years: &[Year]) -> Vec<Year> {
    split
        .raw
        .iter()
        .zip(years)
        .filter(|(raw, _)| **raw >= Decimal::ONE)
        .map(|(_, year)| *year)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contracts::split_tables::{FieldLocation, ReservoirType};
    use chrono::NaiveDate;

    fn contract() -> GrossSplit {
        GrossSplit::new(Project {
            start_date: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2022, 12, 31).unwrap(),
            oil_onstream_date: None,
            gas_onstream_date: None,
            lifting: vec![],
            costs: Default::default(),
        })
    }

    #[test]
    fn test_split_breakdown_sums_components() {
        let gs = contract();
        let b = gs.split_breakdown(
            FluidType::Oil,
            dec!(0.43),
            dec!(0.10),
            &[dec!(60)],
            &[dec!(0.5)],
        );
        // 0.43 + 0.10 + 0.025 + 0.05 + 0.08
        assert_eq!(b.raw, vec![dec!(0.685)]);
        assert_eq!(b.ctr_split, vec![dec!(0.685)]);
    }

    #[test]
    fn test_split_clipped_at_one() {
        let mut gs = contract();
        gs.field.field_location = FieldLocation::OffshoreBeyond1000;
        gs.field.reservoir_type = ReservoirType::NonConventional;
        let variable = variable_split(gs.split_regime, &gs.field);
        let b = gs.split_breakdown(FluidType::Oil, dec!(0.8), variable, &[dec!(30)], &[dec!(0)]);
        assert!(b.raw[0] > Decimal::ONE);
        assert_eq!(b.ctr_split[0], Decimal::ONE);
        assert_eq!(max_split_years(&b, &[2020]), vec![2020]);
    }

    #[test]
    fn test_amortization_over_remaining_production() {
        let gs = contract();
        let mut warnings = Vec::new();
        let production = [dec!(0), dec!(25), dec!(75)];
        let out = gs
            .amortize(dec!(100), 1, &production, FluidType::Oil, &mut warnings)
            .unwrap();
        assert_eq!(out, vec![dec!(0), dec!(25), dec!(75)]);
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_amortization_without_production_expensed() {
        let gs = contract();
        let mut warnings = Vec::new();
        let out = gs
            .amortize(dec!(100), 1, &[dec!(0); 3], FluidType::Gas, &mut warnings)
            .unwrap();
        assert_eq!(out, vec![dec!(0), dec!(100), dec!(0)]);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_invalid_base_split_rejected() {
        let mut gs = contract();
        gs.base_split_ctr_gas = dec!(1.5);
        assert!(matches!(gs.run(), Err(PscError::FractionOutOfRange { .. })));
    }
}
