//! Merged Simples Nacional / Lucro Presumido comparison.
//!
//! The report gathers the scenario comparison, the all-annexes sweep, the
//! presumed-profit liabilities and the pró-labore charges into one value,
//! and extends the with-Fator-R scenario with totals that include the
//! pró-labore charges:
//!
//! ```text
//! total_monthly_including_prolabore       = tax_monthly + inss + irrf
//! total_annual_including_prolabore        = tax_annual + 12 × (inss + irrf)
//! total_annual_including_prolabore_irrf50 = tax_annual + 12 × inss + max(0, 12 × irrf × 50 %)
//! total_monthly_including_prolabore_irrf50 = previous / 12
//! ```
//!
//! The `irrf50` variant assumes half of the withheld income tax is
//! recovered in the annual adjustment. Totals are built from unrounded
//! amounts and rounded once.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::calculations::common::{MONTHS_PER_YEAR, max, round_half_up};
use crate::calculations::{
    AnnexResult, CalculationError, DecisionBasis, PresumidoCalculator, PresumidoInput,
    PresumidoParams, PresumidoResult, Scenario, ScenarioComparator, ScenarioResult,
    WithholdingResult, sweep_all_annexes,
};
use crate::models::{ActivityContext, ActivityKind, Annex, ServiceAnnex, TableSet};

const IRRF_RECOVERED_SHARE: Decimal = Decimal::from_parts(5, 0, 0, false, 1);

/// Inputs echoed back in a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportInputs {
    /// Zero when the request carried no monthly figure.
    pub monthly_revenue: Decimal,
    pub annual_revenue: Decimal,
    pub annual_payroll: Decimal,
    pub pro_labore_monthly: Decimal,
    pub atividade: ActivityKind,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_anexo: Option<ServiceAnnex>,
}

impl From<&ActivityContext> for ReportInputs {
    fn from(ctx: &ActivityContext) -> Self {
        Self {
            monthly_revenue: ctx.monthly_revenue.unwrap_or_default(),
            annual_revenue: ctx.annual_revenue,
            annual_payroll: ctx.annual_payroll,
            pro_labore_monthly: ctx.owner_payroll_monthly,
            atividade: ctx.activity_kind,
            force_anexo: ctx.forced_annex,
        }
    }
}

/// Scenario totals that include the pró-labore charges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProLaboreTotals {
    pub total_monthly_including_prolabore: Decimal,
    pub total_annual_including_prolabore: Decimal,
    pub total_annual_including_prolabore_irrf50: Decimal,
    pub total_monthly_including_prolabore_irrf50: Decimal,
}

impl ProLaboreTotals {
    fn new(
        scenario: &ScenarioResult,
        withholding: &WithholdingResult,
    ) -> Self {
        let social = withholding.exact_social_contribution;
        let income = withholding.exact_income_withholding;

        let monthly = scenario.exact_tax_monthly + withholding.exact_total();
        let annual = scenario.exact_tax_annual + withholding.exact_total() * MONTHS_PER_YEAR;
        let annual_irrf50 = scenario.exact_tax_annual
            + social * MONTHS_PER_YEAR
            + max(Decimal::ZERO, income * MONTHS_PER_YEAR * IRRF_RECOVERED_SHARE);

        Self {
            total_monthly_including_prolabore: round_half_up(monthly),
            total_annual_including_prolabore: round_half_up(annual),
            total_annual_including_prolabore_irrf50: round_half_up(annual_irrf50),
            total_monthly_including_prolabore_irrf50: round_half_up(
                annual_irrf50 / MONTHS_PER_YEAR,
            ),
        }
    }
}

/// The with-Fator-R scenario extended with the pró-labore totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioWithProLabore {
    #[serde(flatten)]
    pub scenario: ScenarioResult,

    #[serde(flatten)]
    pub totals: ProLaboreTotals,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplesScenarios {
    pub with_factor_r: ScenarioWithProLabore,
    pub without_factor_r: ScenarioResult,
    pub decision_reason: String,
    pub basis: DecisionBasis,
    pub cheaper_scenario: Scenario,
}

/// Everything a comparison request returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub inputs: ReportInputs,

    /// Authoritative Simples Nacional scenario.
    pub simples: ScenarioResult,

    pub simples_all: BTreeMap<Annex, AnnexResult>,

    pub simples_scenarios: SimplesScenarios,

    pub presumido: PresumidoResult,

    pub prolabore: WithholdingResult,
}

impl ComparisonReport {
    /// Builds the report for `ctx` over `tables`.
    ///
    /// # Errors
    ///
    /// Propagates the [`CalculationError`] of the scenario comparison (a
    /// missing or empty table) and of invalid presumed-profit parameters.
    /// The sweep never fails.
    pub fn build(
        ctx: &ActivityContext,
        tables: &TableSet,
        presumido_params: &PresumidoParams,
        social_rate: Decimal,
    ) -> Result<Self, CalculationError> {
        let comparison = ScenarioComparator::new(tables)
            .with_social_rate(social_rate)
            .compare(ctx)?;

        let presumido_input = PresumidoInput {
            annual_revenue: ctx.annual_revenue,
            monthly_revenue: ctx.monthly_revenue,
            annual_payroll: ctx.annual_payroll,
            owner_payroll_monthly: ctx.owner_payroll_monthly,
        };
        let presumido =
            PresumidoCalculator::new(presumido_params.clone()).calculate(&presumido_input)?;

        let simples_all = sweep_all_annexes(tables, ctx.annual_revenue, ctx.monthly_revenue);

        let totals = ProLaboreTotals::new(&comparison.with_factor_r, &comparison.owner_withholding);

        info!(
            annual_revenue = %ctx.annual_revenue,
            simples_annex = %comparison.chosen.annex,
            simples_annual = %comparison.chosen.tax_annual,
            presumido_annual = %presumido.total_annual,
            "built comparison report"
        );

        Ok(Self {
            inputs: ReportInputs::from(ctx),
            simples: comparison.chosen,
            simples_all,
            simples_scenarios: SimplesScenarios {
                with_factor_r: ScenarioWithProLabore {
                    scenario: comparison.with_factor_r,
                    totals,
                },
                without_factor_r: comparison.without_factor_r,
                decision_reason: comparison.reason,
                basis: comparison.basis,
                cheaper_scenario: comparison.cheaper_scenario,
            },
            presumido,
            prolabore: comparison.owner_withholding,
        })
    }
}
