//! Contract models.
//!
//! A [`Contract`] is either a Cost Recovery or a Gross Split PSC. Running
//! one returns an immutable [`ContractResult`] holding every derived array,
//! per fluid and consolidated, aligned to the project years.

/// Declare a record of named per-year arrays with element-wise helpers.
macro_rules! cashflow_arrays {
    (
        $(#[$meta:meta])*
        pub struct $name:ident {
            $( $(#[$fmeta:meta])* pub $field:ident, )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]
        pub struct $name {
            $( $(#[$fmeta])* pub $field: Vec<crate::types::Money>, )*
        }

        impl $name {
            /// Element-wise sum of two fluids.
            pub fn combined(&self, other: &Self) -> Self {
                Self {
                    $( $field: crate::timeseries::add(&self.$field, &other.$field), )*
                }
            }

            /// Every array with its name, in declaration order.
            pub fn arrays(&self) -> Vec<(&'static str, &[crate::types::Money])> {
                vec![ $( (stringify!($field), self.$field.as_slice()), )* ]
            }
        }
    };
}

pub mod cost_recovery;
pub mod gross_split;
pub mod project;
pub mod psc_tools;
pub mod split_tables;

use serde::{Deserialize, Serialize};

pub use cost_recovery::{CostRecovery, CostRecoveryResult};
pub use gross_split::{GrossSplit, GrossSplitResult};
pub use project::{Project, RunOptions};

use crate::timeseries::{add, total};
use crate::types::{Money, Volume, Year};
use crate::PscResult;

// ---------------------------------------------------------------------------
// Contract sum type
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractType {
    CostRecovery,
    GrossSplit,
}

/// A PSC of either fiscal type.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "contract_type", rename_all = "snake_case")]
pub enum Contract {
    CostRecovery(CostRecovery),
    GrossSplit(GrossSplit),
}

impl Contract {
    pub fn contract_type(&self) -> ContractType {
        match self {
            Contract::CostRecovery(_) => ContractType::CostRecovery,
            Contract::GrossSplit(_) => ContractType::GrossSplit,
        }
    }

    pub fn project(&self) -> &Project {
        match self {
            Contract::CostRecovery(c) => &c.project,
            Contract::GrossSplit(c) => &c.project,
        }
    }

    pub fn project_mut(&mut self) -> &mut Project {
        match self {
            Contract::CostRecovery(c) => &mut c.project,
            Contract::GrossSplit(c) => &mut c.project,
        }
    }

    pub fn run(&self) -> PscResult<ContractResult> {
        match self {
            Contract::CostRecovery(c) => c.run().map(ContractResult::from),
            Contract::GrossSplit(c) => c.run().map(ContractResult::from),
        }
    }
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Result of running a [`Contract`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "contract_type", rename_all = "snake_case")]
pub enum ContractResult {
    CostRecovery(Box<CostRecoveryResult>),
    GrossSplit(Box<GrossSplitResult>),
}

impl From<CostRecoveryResult> for ContractResult {
    fn from(r: CostRecoveryResult) -> Self {
        ContractResult::CostRecovery(Box::new(r))
    }
}

impl From<GrossSplitResult> for ContractResult {
    fn from(r: GrossSplitResult) -> Self {
        ContractResult::GrossSplit(Box::new(r))
    }
}

/// Flat totals and arrays the summary and indicator layers need from
/// either contract type. Keys a contract type does not have are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryInputs {
    pub contract_type: ContractType,
    pub project_years: Vec<Year>,
    pub lifting_oil: Volume,
    pub oil_wap: Money,
    pub lifting_gas: Volume,
    pub gas_wap: Money,
    pub gross_revenue: Money,
    pub gross_revenue_oil: Money,
    pub gross_revenue_gas: Money,
    pub ctr_gross_share: Money,
    pub gov_gross_share: Money,
    pub sunk_cost: Money,
    pub tangible: Money,
    pub intangible: Money,
    pub opex: Money,
    pub asr: Money,
    /// Lifetime cash expenditure before indirect tax and inflation
    pub expenditures_pre_tax: Money,
    /// Cost recovered (Cost Recovery) or cost deducted (Gross Split)
    pub cost_recovery: Money,
    pub unrecovered_cost: Money,
    pub ctr_net_share: Money,
    pub ctr_net_cashflow: Money,
    pub gov_ftp_share: Money,
    pub gov_equity_share: Money,
    pub gov_ddmo: Money,
    pub gov_tax_income: Money,
    pub gov_take: Money,
    /// Contractor cash flow per year
    pub cashflow: Vec<Money>,
    /// Government take per year
    pub government_take: Vec<Money>,
    /// Tangible + intangible per year
    pub investment: Vec<Money>,
}

impl ContractResult {
    pub fn contract_type(&self) -> ContractType {
        match self {
            ContractResult::CostRecovery(_) => ContractType::CostRecovery,
            ContractResult::GrossSplit(_) => ContractType::GrossSplit,
        }
    }

    pub fn project_years(&self) -> &[Year] {
        match self {
            ContractResult::CostRecovery(r) => &r.project_years,
            ContractResult::GrossSplit(r) => &r.project_years,
        }
    }

    /// Consolidated contractor cash flow.
    pub fn cashflow(&self) -> &[Money] {
        match self {
            ContractResult::CostRecovery(r) => &r.consolidated.cashflow,
            ContractResult::GrossSplit(r) => &r.consolidated.cashflow,
        }
    }

    pub fn government_take(&self) -> &[Money] {
        match self {
            ContractResult::CostRecovery(r) => &r.consolidated.government_take,
            ContractResult::GrossSplit(r) => &r.consolidated.government_take,
        }
    }

    /// Consolidated tangible + intangible expenditure.
    pub fn investment(&self) -> Vec<Money> {
        match self {
            ContractResult::CostRecovery(r) => add(&r.consolidated.capital, &r.consolidated.intangible),
            ContractResult::GrossSplit(r) => add(&r.consolidated.capital, &r.consolidated.intangible),
        }
    }

    /// Consolidated adjusted cash expenditure.
    pub fn expenditures(&self) -> &[Money] {
        match self {
            ContractResult::CostRecovery(r) => &r.consolidated.expenditures,
            ContractResult::GrossSplit(r) => &r.consolidated.expenditures,
        }
    }

    pub fn warnings(&self) -> &[String] {
        match self {
            ContractResult::CostRecovery(r) => &r.warnings,
            ContractResult::GrossSplit(r) => &r.warnings,
        }
    }

    pub fn summary_inputs(&self) -> SummaryInputs {
        match self {
            ContractResult::CostRecovery(r) => {
                let c = &r.consolidated;
                let last = |v: &[Money]| v.last().copied().unwrap_or_default();
                SummaryInputs {
                    contract_type: ContractType::CostRecovery,
                    project_years: r.project_years.clone(),
                    lifting_oil: total(&r.oil_lifting.lifting_rate),
                    oil_wap: r.oil_lifting.lifetime_wap(),
                    lifting_gas: total(&r.gas_lifting.lifting_rate),
                    gas_wap: r.gas_lifting.lifetime_wap(),
                    gross_revenue: total(&c.revenue),
                    gross_revenue_oil: total(&r.oil.revenue),
                    gross_revenue_gas: total(&r.gas.revenue),
                    ctr_gross_share: total(&c.contractor_share),
                    gov_gross_share: total(&c.government_share),
                    sunk_cost: total(&c.sunk_cost),
                    tangible: total(&c.capital),
                    intangible: total(&c.intangible),
                    opex: total(&c.opex),
                    asr: total(&c.asr),
                    expenditures_pre_tax: total(&c.expenditures_pre_tax),
                    cost_recovery: total(&c.cost_recovered),
                    unrecovered_cost: last(&c.unrecovered),
                    ctr_net_share: total(&c.net_share),
                    ctr_net_cashflow: total(&c.cashflow),
                    gov_ftp_share: total(&c.ftp_government),
                    gov_equity_share: total(&c.government_equity),
                    gov_ddmo: total(&c.ddmo),
                    gov_tax_income: total(&c.tax),
                    gov_take: total(&c.government_take),
                    cashflow: c.cashflow.clone(),
                    government_take: c.government_take.clone(),
                    investment: add(&c.capital, &c.intangible),
                }
            }
            ContractResult::GrossSplit(r) => {
                let c = &r.consolidated;
                let last = |v: &[Money]| v.last().copied().unwrap_or_default();
                SummaryInputs {
                    contract_type: ContractType::GrossSplit,
                    project_years: r.project_years.clone(),
                    lifting_oil: total(&r.oil_lifting.lifting_rate),
                    oil_wap: r.oil_lifting.lifetime_wap(),
                    lifting_gas: total(&r.gas_lifting.lifting_rate),
                    gas_wap: r.gas_lifting.lifetime_wap(),
                    gross_revenue: total(&c.revenue),
                    gross_revenue_oil: total(&r.oil.revenue),
                    gross_revenue_gas: total(&r.gas.revenue),
                    ctr_gross_share: total(&c.contractor_share),
                    gov_gross_share: total(&c.government_share),
                    sunk_cost: total(&c.sunk_cost),
                    tangible: total(&c.capital),
                    intangible: total(&c.intangible),
                    opex: total(&c.opex),
                    asr: total(&c.asr),
                    expenditures_pre_tax: total(&c.expenditures_pre_tax),
                    cost_recovery: total(&c.deductible_cost),
                    unrecovered_cost: last(&c.carry_forward),
                    ctr_net_share: total(&c.net_share),
                    ctr_net_cashflow: total(&c.cashflow),
                    gov_ftp_share: Money::ZERO,
                    gov_equity_share: Money::ZERO,
                    gov_ddmo: total(&c.ddmo),
                    gov_tax_income: total(&c.tax),
                    gov_take: total(&c.government_take),
                    cashflow: c.cashflow.clone(),
                    government_take: c.government_take.clone(),
                    investment: add(&c.capital, &c.intangible),
                }
            }
        }
    }
}
