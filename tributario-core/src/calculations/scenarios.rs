//! With/without Fator R scenario comparison.
//!
//! The comparator resolves the Simples Nacional tax twice for the same
//! activity: once letting the Fator R rule pick the annex and once with the
//! rule switched off. The result explains which run is authoritative and
//! which was cheaper.
//!
//! The pró-labore withholding is computed first and reported alongside. It
//! never enters the Fator R base, which is the raw payroll plus twelve
//! months of gross pró-labore.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::common::{format_percent, round_half_up};
use crate::calculations::{
    AnnexDecision, AnnexQuery, BracketResolver, CalculationError, DecisionBasis, FactorRRule,
    WithholdingCalculator, WithholdingResult,
};
use crate::models::{ActivityContext, ServiceAnnex, TableSet};

/// One Simples Nacional run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    #[serde(rename = "anexo")]
    pub annex: ServiceAnnex,

    /// Fator R rounded to two places.
    pub factor_r: Decimal,

    #[serde(rename = "aliquota")]
    pub rate: Decimal,

    #[serde(rename = "deduz")]
    pub deduction: Decimal,

    pub tax_annual: Decimal,

    pub tax_monthly: Decimal,

    #[serde(skip)]
    pub(crate) exact_tax_annual: Decimal,

    #[serde(skip)]
    pub(crate) exact_tax_monthly: Decimal,
}

/// Identifies one of the two runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scenario {
    WithFactorR,
    WithoutFactorR,
}

/// Both runs, the authoritative one and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioComparison {
    pub with_factor_r: ScenarioResult,

    pub without_factor_r: ScenarioResult,

    /// Copy of the authoritative run.
    pub chosen: ScenarioResult,

    pub basis: DecisionBasis,

    #[serde(rename = "decision_reason")]
    pub reason: String,

    /// Run with the strictly lower annual tax; ties go to the run without
    /// Fator R. Informational only, never used to pick `chosen`.
    pub cheaper_scenario: Scenario,

    /// Pró-labore charges of the owner.
    pub owner_withholding: WithholdingResult,
}

/// Runs and compares both Simples Nacional scenarios over a table set.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tributario_core::calculations::ScenarioComparator;
/// use tributario_core::models::{ActivityContext, Bracket, BracketTable, ServiceAnnex, TableSet};
///
/// let tables = TableSet {
///     anexo_iii: Some(BracketTable::new(vec![Bracket::new(dec!(4800000), dec!(0.06), dec!(0))])),
///     anexo_v: Some(BracketTable::new(vec![Bracket::new(dec!(4800000), dec!(0.155), dec!(0))])),
///     irrf_table: Some(BracketTable::new(vec![Bracket::new(dec!(2259.20), dec!(0), dec!(0))])),
///     ..TableSet::default()
/// };
///
/// let ctx = ActivityContext::new(dec!(600000), dec!(180000));
/// let comparison = ScenarioComparator::new(&tables).compare(&ctx).unwrap();
///
/// assert_eq!(comparison.chosen.annex, ServiceAnnex::III);
/// assert_eq!(comparison.chosen.tax_annual, dec!(36000.00));
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioComparator<'a> {
    tables: &'a TableSet,
    rule: FactorRRule,
    withholding: WithholdingCalculator,
}

impl<'a> ScenarioComparator<'a> {
    /// Comparator with the 28 % threshold and the default INSS rate.
    pub fn new(tables: &'a TableSet) -> Self {
        Self {
            tables,
            rule: FactorRRule::default(),
            withholding: WithholdingCalculator::default(),
        }
    }

    pub fn with_rule(
        mut self,
        rule: FactorRRule,
    ) -> Self {
        self.rule = rule;
        self
    }

    pub fn with_social_rate(
        mut self,
        social_rate: Decimal,
    ) -> Self {
        self.withholding = WithholdingCalculator::new(social_rate);
        self
    }

    /// Compares the two scenarios for `ctx`.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::MissingTable`] when the IRRF table or the
    /// annex a run selects is absent, and [`CalculationError::EmptyTable`]
    /// when one of them has no brackets.
    pub fn compare(
        &self,
        ctx: &ActivityContext,
    ) -> Result<ScenarioComparison, CalculationError> {
        if ctx.annual_revenue.is_zero() {
            warn!("annual revenue is zero; Fator R and every effective rate are zero");
        }

        let irrf = self.tables.require_irrf()?;
        let owner_withholding = self
            .withholding
            .calculate(ctx.owner_payroll_monthly, irrf.brackets())?;

        let (with_factor_r, with_decision) = self.run(ctx, true)?;
        let (without_factor_r, without_decision) = self.run(ctx, false)?;

        let factor_r = with_decision.factor_r;
        let percent = format_percent(factor_r);

        let (chosen, basis, reason) = if with_factor_r.annex == without_factor_r.annex {
            let reason = self.shared_reason(&with_decision, &percent);
            (with_factor_r.clone(), with_decision.basis, reason)
        } else if self.rule.is_met(factor_r) {
            let reason = format!(
                "Escolhi Fator R (Anexo III) pois a folha (inclui pró-labore) é >= {}% do faturamento (fator_r={percent}%).",
                self.threshold_percent()
            );
            (with_factor_r.clone(), with_decision.basis, reason)
        } else {
            (
                without_factor_r.clone(),
                without_decision.basis,
                self.not_met_reason(&percent),
            )
        };

        let cheaper_scenario = if with_factor_r.tax_annual < without_factor_r.tax_annual {
            Scenario::WithFactorR
        } else {
            Scenario::WithoutFactorR
        };

        debug!(
            chosen = %chosen.annex,
            ?basis,
            factor_r = %factor_r,
            ?cheaper_scenario,
            "compared Simples Nacional scenarios"
        );

        Ok(ScenarioComparison {
            with_factor_r,
            without_factor_r,
            chosen,
            basis,
            reason,
            cheaper_scenario,
            owner_withholding,
        })
    }

    fn run(
        &self,
        ctx: &ActivityContext,
        use_factor_r: bool,
    ) -> Result<(ScenarioResult, AnnexDecision), CalculationError> {
        let query = AnnexQuery {
            effective_payroll: ctx.effective_payroll(),
            annual_revenue: ctx.annual_revenue,
            activity_kind: ctx.activity_kind,
            forced_annex: ctx.forced_annex,
            code_override: ctx.activity_code_override,
            use_factor_r,
        };
        let decision = self.rule.decide(&query);

        let annex = decision.annex.annex();
        let table = self.tables.require_annex(annex)?;
        let resolution = BracketResolver::new(annex.table_key(), table.brackets())
            .resolve(ctx.annual_revenue, ctx.monthly_revenue)?;

        let result = ScenarioResult {
            annex: decision.annex,
            factor_r: round_half_up(decision.factor_r),
            rate: resolution.rate,
            deduction: resolution.deduction,
            tax_annual: round_half_up(resolution.tax_annual),
            tax_monthly: round_half_up(resolution.tax_monthly),
            exact_tax_annual: resolution.tax_annual,
            exact_tax_monthly: resolution.tax_monthly,
        };

        Ok((result, decision))
    }

    fn shared_reason(
        &self,
        decision: &AnnexDecision,
        percent: &str,
    ) -> String {
        match decision.basis {
            DecisionBasis::Forced => format!(
                "Anexo definido por forçamento: {}. Fator R informado: {percent}%.",
                decision.annex
            ),
            DecisionBasis::ActivityCode => format!(
                "Anexo definido por CNAE: {}. Fator R informado: {percent}%.",
                decision.annex
            ),
            DecisionBasis::NotEligible => format!(
                "Atividade não elegível ao Fator R; aplicado Anexo {}. Fator R informado: {percent}%.",
                decision.annex
            ),
            DecisionBasis::FactorRNotMet => self.not_met_reason(percent),
            DecisionBasis::FactorRMet | DecisionBasis::FactorRIgnored => format!(
                "Anexo {} nos dois cenários. Fator R informado: {percent}%.",
                decision.annex
            ),
        }
    }

    fn not_met_reason(
        &self,
        percent: &str,
    ) -> String {
        format!(
            "Não apliquei Fator R (Anexo V) pois a folha (inclui pró-labore) é < {}% do faturamento (fator_r={percent}%).",
            self.threshold_percent()
        )
    }

    fn threshold_percent(&self) -> Decimal {
        (self.rule.threshold * Decimal::ONE_HUNDRED).normalize()
    }
}
