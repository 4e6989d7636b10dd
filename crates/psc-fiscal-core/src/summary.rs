//! Flat summary of a contract run.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::cashflow::{economic_indicators, EconomicConfig};
use crate::contracts::{ContractResult, ContractType};
use crate::timeseries::total;
use crate::types::{with_metadata, ComputationOutput, Money, Rate, Volume, Year};
use crate::PscResult;

/// Lifetime totals and indicators of one contract run. Keys that do not
/// apply to the contract type are zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub contract_type: ContractType,
    pub reference_year: Year,
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
    pub investment: Money,
    pub tangible: Money,
    pub intangible: Money,
    pub opex_and_asr: Money,
    pub opex: Money,
    pub asr: Money,
    pub expenditures_pre_tax: Money,
    /// Indirect tax, inflation and ASR escalation added to the cost lines
    pub cost_adjustment: Money,
    /// Cost Recovery only
    pub cost_recovery: Money,
    /// Gross Split only
    pub deductible_cost: Money,
    pub cost_recovery_over_gross_rev: Rate,
    pub unrec_cost: Money,
    pub unrec_over_gross_rev: Rate,
    pub ctr_net_share: Money,
    pub ctr_net_share_over_gross_share: Rate,
    pub ctr_net_cashflow: Money,
    pub ctr_net_cashflow_over_gross_rev: Rate,
    pub ctr_npv: Money,
    pub ctr_irr: Option<Rate>,
    pub ctr_pot: Option<Decimal>,
    pub ctr_pv_ratio: Decimal,
    pub ctr_pi: Decimal,
    pub gov_ftp_share: Money,
    pub gov_equity_share: Money,
    pub gov_ddmo: Money,
    pub gov_tax_income: Money,
    pub gov_take: Money,
    pub gov_take_over_gross_rev: Rate,
    pub gov_take_npv: Money,
}

fn ratio(numerator: Money, denominator: Money) -> Rate {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        numerator / denominator
    }
}

/// Summarize a contract run under `config`.
pub fn get_summary(
    result: &ContractResult,
    config: &EconomicConfig,
) -> PscResult<ComputationOutput<Summary>> {
    let start = Instant::now();
    let inputs = result.summary_inputs();
    let indicators = economic_indicators(result, config)?;
    let gov_take_npv = config.npv(&inputs.government_take, &inputs.project_years)?;

    let mut warnings: Vec<String> = result.warnings().to_vec();
    warnings.extend(indicators.warnings.iter().cloned());

    let (cost_recovery, deductible_cost) = match inputs.contract_type {
        ContractType::CostRecovery => (inputs.cost_recovery, Decimal::ZERO),
        ContractType::GrossSplit => (Decimal::ZERO, inputs.cost_recovery),
    };
    let gross_revenue = inputs.gross_revenue;

    let summary = Summary {
        contract_type: inputs.contract_type,
        reference_year: indicators.reference_year,
        lifting_oil: inputs.lifting_oil,
        oil_wap: inputs.oil_wap,
        lifting_gas: inputs.lifting_gas,
        gas_wap: inputs.gas_wap,
        gross_revenue,
        gross_revenue_oil: inputs.gross_revenue_oil,
        gross_revenue_gas: inputs.gross_revenue_gas,
        ctr_gross_share: inputs.ctr_gross_share,
        gov_gross_share: inputs.gov_gross_share,
        sunk_cost: inputs.sunk_cost,
        investment: inputs.tangible + inputs.intangible,
        tangible: inputs.tangible,
        intangible: inputs.intangible,
        opex_and_asr: inputs.opex + inputs.asr,
        opex: inputs.opex,
        asr: inputs.asr,
        expenditures_pre_tax: inputs.expenditures_pre_tax,
        cost_adjustment: total(result.expenditures()) - inputs.expenditures_pre_tax,
        cost_recovery,
        deductible_cost,
        cost_recovery_over_gross_rev: ratio(inputs.cost_recovery, gross_revenue),
        unrec_cost: inputs.unrecovered_cost,
        unrec_over_gross_rev: ratio(inputs.unrecovered_cost, gross_revenue),
        ctr_net_share: inputs.ctr_net_share,
        ctr_net_share_over_gross_share: ratio(inputs.ctr_net_share, inputs.ctr_gross_share),
        ctr_net_cashflow: inputs.ctr_net_cashflow,
        ctr_net_cashflow_over_gross_rev: ratio(inputs.ctr_net_cashflow, gross_revenue),
        ctr_npv: indicators.npv,
        ctr_irr: indicators.irr,
        ctr_pot: indicators.pot,
        ctr_pv_ratio: indicators.pv_ratio,
        ctr_pi: indicators.pi,
        gov_ftp_share: inputs.gov_ftp_share,
        gov_equity_share: inputs.gov_equity_share,
        gov_ddmo: inputs.gov_ddmo,
        gov_tax_income: inputs.gov_tax_income,
        gov_take: inputs.gov_take,
        gov_take_over_gross_rev: ratio(inputs.gov_take, gross_revenue),
        gov_take_npv,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "PSC Economic Summary",
        &serde_json::json!({
            "contract_type": inputs.contract_type,
            "reference_year": indicators.reference_year,
            "discount_rate": config.discount_rate.to_string(),
            "inflation_rate": config.inflation_rate.to_string(),
            "npv_mode": config.npv_mode,
            "discounting_mode": config.discounting_mode,
        }),
        warnings,
        elapsed,
        summary,
    ))
}
