//! Cost Recovery PSC.
//!
//! Revenue is shared in a fixed order: First Tranche Petroleum, investment
//! credit, cost recovery (with carry-forward and cross-fluid transfer), then
//! equity split by the contractor pre-tax share. DMO and income tax are
//! charged against the contractor's entitlement.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::project::{FluidBase, PreparedProject, Project, RunOptions};
use super::psc_tools::{
    dmo_fee, dmo_holiday_end, dmo_volume, pool_before, recover_costs, recover_with_transfer, Dmo,
    DmoParams, Recovery,
};
use crate::error::{check_fraction, PscError};
use crate::lifting::LiftingSeries;
use crate::timeseries::{add, cumsum, sub, zeros};
use crate::types::{FtpTaxRegime, Money, Rate, Year};
use crate::PscResult;

// ---------------------------------------------------------------------------
// Fiscal terms
// ---------------------------------------------------------------------------

/// Domestic market obligation terms of one fluid.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmoTerms {
    /// Share of the contractor's lifting to be sold domestically
    pub volume_portion: Rate,
    /// Share of the market price received for DMO volume after the holiday
    pub fee_portion: Rate,
    /// Months after onstream during which the full price is received
    pub holiday_duration_months: i32,
}

impl DmoTerms {
    pub(crate) fn validate(&self, fluid: &str) -> PscResult<()> {
        check_fraction(&format!("{fluid}_dmo_volume_portion"), self.volume_portion)?;
        check_fraction(&format!("{fluid}_dmo_fee_portion"), self.fee_portion)?;
        if self.holiday_duration_months < 0 {
            return Err(PscError::InvalidInput {
                field: format!("{fluid}_dmo_holiday_duration"),
                reason: format!(
                    "Holiday duration cannot be negative, got {}",
                    self.holiday_duration_months
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn holiday_months(&self) -> u32 {
        self.holiday_duration_months.max(0) as u32
    }
}

/// Per-fluid Cost Recovery terms.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRecoveryTerms {
    #[serde(default = "default_true")]
    pub ftp_is_available: bool,
    /// FTP is split with the contractor by the pre-tax share
    #[serde(default = "default_true")]
    pub ftp_is_shared: bool,
    #[serde(default = "default_ftp_portion")]
    pub ftp_portion: Rate,
    /// Contractor share of equity before tax
    pub ctr_pretax_share: Rate,
    /// Investment credit as a share of eligible capital cost
    #[serde(default)]
    pub ic_rate: Rate,
    /// Cap on cost recovery as a share of revenue after FTP and IC
    #[serde(default = "default_cr_cap_rate")]
    pub cr_cap_rate: Rate,
    pub dmo: DmoTerms,
}

fn default_true() -> bool {
    true
}

fn default_ftp_portion() -> Rate {
    dec!(0.2)
}

fn default_cr_cap_rate() -> Rate {
    Decimal::ONE
}

impl CostRecoveryTerms {
    pub fn oil() -> Self {
        Self {
            ftp_is_available: true,
            ftp_is_shared: true,
            ftp_portion: default_ftp_portion(),
            ctr_pretax_share: dec!(0.25),
            ic_rate: Decimal::ZERO,
            cr_cap_rate: Decimal::ONE,
            dmo: DmoTerms {
                volume_portion: dec!(0.25),
                fee_portion: dec!(0.25),
                holiday_duration_months: 60,
            },
        }
    }

    pub fn gas() -> Self {
        Self {
            ctr_pretax_share: dec!(0.5),
            dmo: DmoTerms {
                volume_portion: Decimal::ONE,
                fee_portion: Decimal::ONE,
                holiday_duration_months: 60,
            },
            ..Self::oil()
        }
    }

    fn validate(&self, fluid: &str) -> PscResult<()> {
        check_fraction(&format!("{fluid}_ftp_portion"), self.ftp_portion)?;
        check_fraction(&format!("{fluid}_ctr_pretax_share"), self.ctr_pretax_share)?;
        check_fraction(&format!("{fluid}_cr_cap_rate"), self.cr_cap_rate)?;
        if self.ic_rate < Decimal::ZERO {
            return Err(PscError::InvalidInput {
                field: format!("{fluid}_ic_rate"),
                reason: format!("IC rate cannot be negative, got {}", self.ic_rate),
            });
        }
        self.dmo.validate(fluid)
    }
}

/// One row of a pre-tax share schedule: applies when
/// `bottom_limit < indicator <= top_limit`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitCondition {
    pub bottom_limit: Decimal,
    pub top_limit: Decimal,
    pub pretax_oil: Rate,
    pub pretax_gas: Rate,
}

/// Where the contractor pre-tax share comes from.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TaxSplit {
    /// Constant per-fluid `ctr_pretax_share`
    #[default]
    Conventional,
    /// Share by price indicator, by default the oil weighted-average price
    SlidingScale {
        conditions: Vec<SplitCondition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        indicator: Option<Vec<Decimal>>,
    },
    /// Share by cumulative revenue over cumulative cost
    RevenueOverCost {
        conditions: Vec<SplitCondition>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        indicator: Option<Vec<Decimal>>,
    },
}

impl TaxSplit {
    fn validate(&self, duration: usize) -> PscResult<()> {
        let (conditions, indicator) = match self {
            TaxSplit::Conventional => return Ok(()),
            TaxSplit::SlidingScale { conditions, indicator }
            | TaxSplit::RevenueOverCost { conditions, indicator } => (conditions, indicator),
        };
        if conditions.is_empty() {
            return Err(PscError::InvalidInput {
                field: "tax_split.conditions".into(),
                reason: "At least one condition is required".into(),
            });
        }
        for c in conditions {
            if c.top_limit <= c.bottom_limit {
                return Err(PscError::InvalidInput {
                    field: "tax_split.conditions".into(),
                    reason: format!("Top limit {} not above bottom limit {}", c.top_limit, c.bottom_limit),
                });
            }
            check_fraction("pretax_oil", c.pretax_oil)?;
            check_fraction("pretax_gas", c.pretax_gas)?;
        }
        if let Some(indicator) = indicator {
            crate::error::check_len("tax_split.indicator", duration, indicator.len())?;
        }
        Ok(())
    }
}

/// A Cost Recovery production sharing contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostRecovery {
    #[serde(flatten)]
    pub project: Project,
    #[serde(default = "CostRecoveryTerms::oil")]
    pub oil: CostRecoveryTerms,
    #[serde(default = "CostRecoveryTerms::gas")]
    pub gas: CostRecoveryTerms,
    #[serde(default)]
    pub tax_split: TaxSplit,
    /// Investment credit is granted at all
    #[serde(default)]
    pub ic_is_available: bool,
    #[serde(default)]
    pub ftp_tax_regime: FtpTaxRegime,
    /// DMO volume follows the post UU 22/2001 scheme (uncapped)
    #[serde(default = "default_true")]
    pub post_uu_22_2001: bool,
    #[serde(default)]
    pub options: RunOptions,
}

impl CostRecovery {
    /// A Cost Recovery contract with every default term.
    pub fn new(project: Project) -> Self {
        Self {
            project,
            oil: CostRecoveryTerms::oil(),
            gas: CostRecoveryTerms::gas(),
            tax_split: TaxSplit::default(),
            ic_is_available: false,
            ftp_tax_regime: FtpTaxRegime::default(),
            post_uu_22_2001: true,
            options: RunOptions::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

cashflow_arrays! {
    /// Cost Recovery arrays of one fluid, or of both consolidated.
    pub struct CostRecoveryCashflow {
        pub revenue,
        pub ftp,
        pub ftp_contractor,
        pub ftp_government,
        pub investment_credit,
        pub ic_paid,
        pub ic_unrecovered,
        pub capital,
        pub intangible,
        pub opex,
        pub asr,
        pub lbt,
        pub cost_of_sales,
        pub depreciation,
        /// Undepreciated capital cost, recovered in the final year
        pub undepreciated,
        /// Non-capital cost incurred before the sunk-cost reference year
        pub sunk_cost,
        /// Depreciation + undepreciated + non-capital (sunk cost pooled)
        pub cost_to_recover,
        pub cost_recovery_allocation,
        pub cost_recovered_before_transfer,
        pub unrecovered_before_transfer,
        pub ets_before_transfer,
        pub transfer_in,
        pub transfer_out,
        /// Cost recovered after transfer (CTR)
        pub cost_recovered,
        /// Unrecovered cost after transfer
        pub unrecovered,
        /// Equity to be split after transfer
        pub ets,
        pub contractor_equity,
        pub government_equity,
        pub contractor_share,
        pub government_share,
        pub dmo_volume,
        pub dmo_fee,
        pub ddmo,
        pub taxable_income,
        pub tax,
        pub net_share,
        pub contractor_take,
        /// Capital and non-capital cash expenditure
        pub expenditures,
        /// Cash expenditure before indirect tax and inflation
        pub expenditures_pre_tax,
        pub cashflow,
        pub government_take,
    }
}

/// Everything a Cost Recovery run derives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostRecoveryResult {
    pub project_years: Vec<Year>,
    pub oil: CostRecoveryCashflow,
    pub gas: CostRecoveryCashflow,
    pub consolidated: CostRecoveryCashflow,
    pub oil_pretax_share: Vec<Rate>,
    pub gas_pretax_share: Vec<Rate>,
    pub transfer_to_oil: Vec<Money>,
    pub transfer_to_gas: Vec<Money>,
    /// Consolidated tax carried forward (pre-2017 FTP tax regime only)
    pub unpaid_tax_balance: Vec<Money>,
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

/// Arrays of one fluid up to cost recovery before transfer.
struct PreTransfer {
    ftp: Vec<Money>,
    ftp_contractor: Vec<Money>,
    ftp_government: Vec<Money>,
    investment_credit: Vec<Money>,
    ic: Recovery,
    revenue_after_ic: Vec<Money>,
    undepreciated: Vec<Money>,
    sunk_cost: Vec<Money>,
    cost_to_recover: Vec<Money>,
    allocation: Vec<Money>,
    before: Recovery,
}

impl CostRecovery {
    fn validate(&self) -> PscResult<()> {
        self.oil.validate("oil")?;
        self.gas.validate("gas")?;
        let window = self.project.window()?;
        self.tax_split.validate(window.duration())
    }

    /// Run the contract.
    pub fn run(&self) -> PscResult<CostRecoveryResult> {
        tracing::debug!(
            start = %self.project.start_date,
            end = %self.project.end_date,
            "running cost recovery contract"
        );
        self.validate()?;
        let prepared = self.project.prepare(&self.options)?;
        let mut warnings = Vec::new();

        let (oil_pretax, gas_pretax) = self.pretax_shares(&prepared, &mut warnings)?;

        let oil_pre = self.pre_transfer(&prepared, &prepared.oil, &self.oil, &oil_pretax);
        let gas_pre = self.pre_transfer(&prepared, &prepared.gas, &self.gas, &gas_pretax);

        let joint = recover_with_transfer(
            &oil_pre.allocation,
            &oil_pre.cost_to_recover,
            &gas_pre.allocation,
            &gas_pre.cost_to_recover,
        );

        let oil = self.post_transfer(
            &prepared,
            &prepared.oil,
            &self.oil,
            &oil_pretax,
            oil_pre,
            &joint.oil,
            &joint.transfer_to_oil,
            &joint.transfer_to_gas,
        )?;
        let gas = self.post_transfer(
            &prepared,
            &prepared.gas,
            &self.gas,
            &gas_pretax,
            gas_pre,
            &joint.gas,
            &joint.transfer_to_gas,
            &joint.transfer_to_oil,
        )?;

        let mut consolidated = oil.combined(&gas);
        let unpaid_tax_balance = if self.ftp_tax_regime == FtpTaxRegime::Pre2017 {
            let due = pre_2017_tax(
                &consolidated.contractor_equity,
                &consolidated.taxable_income,
                &prepared.tax_rate,
            );
            let (unpaid, paid) = unpaid_tax_balance(&due, &consolidated.contractor_equity);
            consolidated.tax = paid;
            consolidated.net_share = sub(&consolidated.taxable_income, &consolidated.tax);
            consolidated.contractor_take =
                add(&consolidated.net_share, &consolidated.cost_recovered);
            consolidated.cashflow =
                sub(&consolidated.contractor_take, &consolidated.expenditures);
            consolidated.government_take = government_take(
                &consolidated.ftp_government,
                &consolidated.government_equity,
                &consolidated.tax,
                &consolidated.ddmo,
            );
            unpaid
        } else {
            zeros(prepared.window.duration())
        };

        tracing::debug!(
            years = prepared.project_years.len(),
            "cost recovery contract complete"
        );

        Ok(CostRecoveryResult {
            project_years: prepared.project_years.clone(),
            oil,
            gas,
            consolidated,
            oil_pretax_share: oil_pretax,
            gas_pretax_share: gas_pretax,
            transfer_to_oil: joint.transfer_to_oil,
            transfer_to_gas: joint.transfer_to_gas,
            unpaid_tax_balance,
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

    /// Contractor pre-tax share per year for oil and gas.
    fn pretax_shares(
        &self,
        prepared: &PreparedProject,
        warnings: &mut Vec<String>,
    ) -> PscResult<(Vec<Rate>, Vec<Rate>)> {
        let len = prepared.window.duration();
        let conventional = (
            vec![self.oil.ctr_pretax_share; len],
            vec![self.gas.ctr_pretax_share; len],
        );
        let (conditions, indicator) = match &self.tax_split {
            TaxSplit::Conventional => return Ok(conventional),
            TaxSplit::SlidingScale { conditions, indicator } => (
                conditions,
                given_or(indicator, || {
                    prepared
                        .oil
                        .wap_price
                        .iter()
                        .map(|p| (!p.is_zero()).then_some(*p))
                        .collect()
                }),
            ),
            TaxSplit::RevenueOverCost { conditions, indicator } => {
                (conditions, given_or(indicator, || revenue_over_cost(prepared)))
            }
        };

        let mut oil = conventional.0;
        let mut gas = conventional.1;
        let mut fallback_years = Vec::new();
        for (i, value) in indicator.iter().enumerate() {
            let Some(x) = value else {
                fallback_years.push(prepared.project_years[i]);
                continue;
            };
            let condition = conditions
                .iter()
                .find(|c| c.bottom_limit < *x && *x <= c.top_limit)
                .ok_or_else(|| PscError::InvalidInput {
                    field: "tax_split.conditions".into(),
                    reason: format!(
                        "No condition covers indicator {x} in year {}",
                        prepared.project_years[i]
                    ),
                })?;
            oil[i] = condition.pretax_oil;
            gas[i] = condition.pretax_gas;
        }
        if !fallback_years.is_empty() {
            tracing::debug!(?fallback_years, "tax split indicator undefined, using conventional share");
            warnings.push(format!(
                "Tax split indicator undefined in {} year(s); conventional pre-tax share used",
                fallback_years.len()
            ));
        }
        Ok((oil, gas))
    }

    fn pre_transfer(
        &self,
        prepared: &PreparedProject,
        base: &FluidBase,
        terms: &CostRecoveryTerms,
        pretax: &[Rate],
    ) -> PreTransfer {
        let len = prepared.window.duration();
        let revenue = &base.revenue;

        let ftp: Vec<Money> = if terms.ftp_is_available {
            revenue.iter().map(|r| terms.ftp_portion * r).collect()
        } else {
            zeros(len)
        };
        let ftp_contractor: Vec<Money> = if terms.ftp_is_shared {
            ftp.iter().zip(pretax).map(|(f, s)| f * s).collect()
        } else {
            zeros(len)
        };
        let ftp_government = sub(&ftp, &ftp_contractor);
        let revenue_after_ftp = sub(revenue, &ftp);

        let investment_credit: Vec<Money> = if self.ic_is_available {
            base.costs.ic_base.iter().map(|c| terms.ic_rate * c).collect()
        } else {
            zeros(len)
        };
        let ic = recover_costs(&revenue_after_ftp, &investment_credit);
        let revenue_after_ic = sub(&revenue_after_ftp, &ic.recovered);
        let allocation: Vec<Money> = revenue_after_ic
            .iter()
            .map(|r| terms.cr_cap_rate * r)
            .collect();

        let mut undepreciated = zeros(len);
        if let Some(last) = undepreciated.last_mut() {
            *last = base.costs.undepreciated;
        }
        let reference = prepared.sunk_reference_index();
        let (non_capital, pooled) = pool_before(&base.costs.non_capital(), reference);
        let mut sunk_cost = zeros(len);
        sunk_cost[reference] = pooled;
        let cost_to_recover = add(&add(&base.costs.depreciation, &undepreciated), &non_capital);

        let before = recover_costs(&allocation, &cost_to_recover);

        PreTransfer {
            ftp,
            ftp_contractor,
            ftp_government,
            investment_credit,
            ic,
            revenue_after_ic,
            undepreciated,
            sunk_cost,
            cost_to_recover,
            allocation,
            before,
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn post_transfer(
        &self,
        prepared: &PreparedProject,
        base: &FluidBase,
        terms: &CostRecoveryTerms,
        pretax: &[Rate],
        pre: PreTransfer,
        after: &Recovery,
        transfer_in: &[Money],
        transfer_out: &[Money],
    ) -> PscResult<CostRecoveryCashflow> {
        let len = prepared.window.duration();
        let ets_before_transfer = sub(&pre.revenue_after_ic, &pre.before.recovered);

        // Own revenue left after own recovery, less what was handed to the other fluid.
        let own_recovered = sub(&after.recovered, transfer_in);
        let ets = sub(&sub(&pre.revenue_after_ic, &own_recovered), transfer_out);

        let contractor_equity: Vec<Money> = ets.iter().zip(pretax).map(|(e, s)| e * s).collect();
        let government_equity = sub(&ets, &contractor_equity);
        let contractor_share = add(&add(&pre.ftp_contractor, &contractor_equity), &pre.ic.recovered);
        let government_share = add(&pre.ftp_government, &government_equity);

        let params = DmoParams {
            window: prepared.window,
            holiday_end: dmo_holiday_end(base.onstream, terms.dmo.holiday_months())?,
            volume_portion: terms.dmo.volume_portion,
            fee_portion: terms.dmo.fee_portion,
            end_weighted: self.options.dmo_end_weighted,
            lifting: &base.lifting.lifting_rate,
            price: &base.wap_price,
            share: pretax,
            unrecovered: &after.unrecovered,
        };
        let mut volume = dmo_volume(&params);
        if !self.post_uu_22_2001 {
            for i in 0..len {
                let price = base.wap_price[i];
                volume[i] = if ets[i] > Decimal::ZERO && !price.is_zero() {
                    volume[i].min((contractor_equity[i] + pre.ftp_contractor[i]) / price)
                } else {
                    Decimal::ZERO
                };
            }
        }
        let Dmo { volume: dmo_volume, fee: dmo_fee_arr, mut ddmo } = dmo_fee(&params, volume);
        if self.ftp_tax_regime == FtpTaxRegime::Pre2017 {
            for (d, e) in ddmo.iter_mut().zip(&contractor_equity) {
                if *e <= Decimal::ZERO {
                    *d = Decimal::ZERO;
                }
            }
        }

        let taxable_income = sub(
            &add(&add(&pre.ftp_contractor, &contractor_equity), &pre.ic.recovered),
            &ddmo,
        );
        let tax = match self.ftp_tax_regime {
            FtpTaxRegime::Direct => taxable_income
                .iter()
                .zip(&prepared.tax_rate)
                .map(|(ti, r)| ti * r)
                .collect(),
            FtpTaxRegime::Pre2017 => {
                pre_2017_tax(&contractor_equity, &taxable_income, &prepared.tax_rate)
            }
            FtpTaxRegime::Pdjp20_2017 => pdjp_2017_tax(
                &taxable_income,
                &pre.ftp_contractor,
                &after.unrecovered,
                &prepared.tax_rate,
            ),
        };
        let net_share = sub(&taxable_income, &tax);
        let contractor_take = add(&net_share, &after.recovered);
        let expenditures = base.costs.total_expenditures();
        let cashflow = sub(&contractor_take, &expenditures);
        let government_take =
            government_take(&pre.ftp_government, &government_equity, &tax, &ddmo);

        Ok(CostRecoveryCashflow {
            revenue: base.revenue.clone(),
            ftp: pre.ftp,
            ftp_contractor: pre.ftp_contractor,
            ftp_government: pre.ftp_government,
            investment_credit: pre.investment_credit,
            ic_paid: pre.ic.recovered,
            ic_unrecovered: pre.ic.unrecovered,
            capital: base.costs.capital.clone(),
            intangible: base.costs.intangible.clone(),
            opex: base.costs.opex.clone(),
            asr: base.costs.asr.clone(),
            lbt: base.costs.lbt.clone(),
            cost_of_sales: base.costs.cost_of_sales.clone(),
            depreciation: base.costs.depreciation.clone(),
            undepreciated: pre.undepreciated,
            sunk_cost: pre.sunk_cost,
            cost_to_recover: pre.cost_to_recover,
            cost_recovery_allocation: pre.allocation,
            cost_recovered_before_transfer: pre.before.recovered,
            unrecovered_before_transfer: pre.before.unrecovered,
            ets_before_transfer,
            transfer_in: transfer_in.to_vec(),
            transfer_out: transfer_out.to_vec(),
            cost_recovered: after.recovered.clone(),
            unrecovered: after.unrecovered.clone(),
            ets,
            contractor_equity,
            government_equity,
            contractor_share,
            government_share,
            dmo_volume,
            dmo_fee: dmo_fee_arr,
            ddmo,
            taxable_income,
            tax,
            net_share,
            contractor_take,
            expenditures,
            expenditures_pre_tax: base.costs.total_expenditures_pre_tax(),
            cashflow,
            government_take,
        })
    }
}

fn given_or(
    indicator: &Option<Vec<Decimal>>,
    default: impl FnOnce() -> Vec<Option<Decimal>>,
) -> Vec<Option<Decimal>> {
    match indicator {
        Some(values) => values.iter().copied().map(Some).collect(),
        None => default(),
    }
}

/// Cumulative revenue over cumulative expenditure, undefined while no
/// expenditure has been made.
fn revenue_over_cost(prepared: &PreparedProject) -> Vec<Option<Decimal>> {
    let revenue = cumsum(&add(&prepared.oil.revenue, &prepared.gas.revenue));
    let cost = cumsum(&add(
        &prepared.oil.costs.total_expenditures(),
        &prepared.gas.costs.total_expenditures(),
    ));
    revenue
        .iter()
        .zip(&cost)
        .map(|(r, c)| (!c.is_zero()).then(|| r / c))
        .collect()
}

fn government_take(
    ftp_government: &[Money],
    government_equity: &[Money],
    tax: &[Money],
    ddmo: &[Money],
) -> Vec<Money> {
    add(&add(&add(ftp_government, government_equity), tax), ddmo)
}

/// Tax with FTP taxed only once cumulative contractor FTP exceeds the
/// unrecovered balance (PDJP-20/2017).
fn pdjp_2017_tax(
    taxable_income: &[Money],
    ftp_contractor: &[Money],
    unrecovered: &[Money],
    tax_rate: &[Rate],
) -> Vec<Money> {
    let cumulative_ftp = cumsum(ftp_contractor);
    let mut prior = Decimal::ZERO;
    let mut considered_prev = Decimal::ZERO;
    let mut tax = zeros(taxable_income.len());
    for i in 0..taxable_income.len() {
        prior += considered_prev;
        let diff = if cumulative_ftp[i] > unrecovered[i] {
            cumulative_ftp[i] - prior
        } else {
            Decimal::ZERO
        };
        let considered = if diff > unrecovered[i] {
            diff - unrecovered[i]
        } else {
            Decimal::ZERO
        };
        tax[i] = considered * tax_rate[i] + (taxable_income[i] - ftp_contractor[i]) * tax_rate[i];
        considered_prev = considered;
    }
    tax
}

/// Tax before PDJP-20/2017: the first year with positive contractor
/// equity is taxed on the cumulative taxable income, later such years on
/// their own taxable income.
fn pre_2017_tax(contractor_equity: &[Money], taxable_income: &[Money], tax_rate: &[Rate]) -> Vec<Money> {
    let cumulative = cumsum(taxable_income);
    let mut applied_prev = false;
    contractor_equity
        .iter()
        .enumerate()
        .map(|(i, equity)| {
            let applied = *equity > Decimal::ZERO;
            let tax = match (applied, applied_prev) {
                (true, false) => cumulative[i] * tax_rate[i],
                (true, true) => taxable_income[i] * tax_rate[i],
                _ => Decimal::ZERO,
            };
            applied_prev = applied;
            tax
        })
        .collect()
}

/// Pay tax due out of contractor equity, carrying any shortfall forward.
/// A year without positive equity pays nothing. Returns
/// `(unpaid balance, tax paid)`.
fn unpaid_tax_balance(due: &[Money], contractor_equity: &[Money]) -> (Vec<Money>, Vec<Money>) {
    let mut unpaid = zeros(due.len());
    let mut paid = zeros(due.len());
    let mut carried = Decimal::ZERO;
    for i in 0..due.len() {
        let owed = (carried + due[i]).max(Decimal::ZERO);
        paid[i] = contractor_equity[i].max(Decimal::ZERO).min(owed);
        unpaid[i] = owed - paid[i];
        carried = unpaid[i];
    }
    (unpaid, paid)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdjp_ftp_taxed_once_unrecovered_is_covered() {
        let ti = [dec!(10), dec!(10), dec!(10)];
        let ftp = [dec!(10), dec!(10), dec!(10)];
        let unrecovered = [dec!(50), dec!(5), dec!(0)];
        let tax = pdjp_2017_tax(&ti, &ftp, &unrecovered, &[dec!(0.5); 3]);
        // Year 0: cumulative FTP 10 < 50, nothing considered.
        assert_eq!(tax[0], dec!(0));
        // Year 1: cumulative 20 > 5, considered 20 - 5 = 15.
        assert_eq!(tax[1], dec!(7.5));
        // Year 2: prior 15, diff 30 - 15 = 15, considered 15.
        assert_eq!(tax[2], dec!(7.5));
    }

    #[test]
    fn test_pre_2017_first_year_taxes_cumulative() {
        let equity = [dec!(0), dec!(10), dec!(10)];
        let ti = [dec!(4), dec!(6), dec!(10)];
        let tax = pre_2017_tax(&equity, &ti, &[dec!(0.5); 3]);
        assert_eq!(tax, vec![dec!(0), dec!(5), dec!(5)]);
    }

    #[test]
    fn test_unpaid_tax_carried_forward() {
        let (unpaid, paid) = unpaid_tax_balance(&[dec!(10), dec!(5)], &[dec!(4), dec!(20)]);
        assert_eq!(paid, vec![dec!(4), dec!(11)]);
        assert_eq!(unpaid, vec![dec!(6), dec!(0)]);
    }

    #[test]
    fn test_unpaid_tax_not_paid_from_negative_equity() {
        let (unpaid, paid) =
            unpaid_tax_balance(&[dec!(8), dec!(0), dec!(2)], &[dec!(-5), dec!(3), dec!(100)]);
        assert_eq!(paid, vec![dec!(0), dec!(3), dec!(7)]);
        assert_eq!(unpaid, vec![dec!(8), dec!(5), dec!(0)]);
    }

    #[test]
    fn test_terms_defaults() {
        let gas = CostRecoveryTerms::gas();
        assert_eq!(gas.ctr_pretax_share, dec!(0.5));
        assert_eq!(gas.ftp_portion, dec!(0.2));
        assert_eq!(gas.dmo.fee_portion, Decimal::ONE);
    }

    #[test]
    fn test_negative_holiday_rejected() {
        let mut terms = CostRecoveryTerms::oil();
        terms.dmo.holiday_duration_months = -1;
        assert!(matches!(terms.validate("oil"), Err(PscError::InvalidInput { .. })));
    }

    #[test]
    fn test_pretax_share_must_be_fraction() {
        let mut terms = CostRecoveryTerms::oil();
        terms.ctr_pretax_share = dec!(1.2);
        assert!(matches!(
            terms.validate("oil"),
            Err(PscError::FractionOutOfRange { .. })
        ));
    }
}
