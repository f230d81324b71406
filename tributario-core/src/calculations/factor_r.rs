//! Fator R annex decision for Simples Nacional service activities.
//!
//! Fator R is the ratio of payroll (including the owner's gross pró-labore)
//! to revenue over the last twelve months. Service activities whose ratio
//! reaches 28 % are taxed under Anexo III; the rest fall under Anexo V.
//!
//! Precedence, first match wins:
//!
//! 1. a forced annex;
//! 2. an activity-code (CNAE) rule naming III or V;
//! 3. Fator R enabled, service activity and ratio ≥ threshold → III;
//! 4. otherwise → V.
//!
//! A CNAE rule that defers to Fator R falls through to steps 3 and 4.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::ratio;
use crate::models::{ActivityKind, CnaeRule, ServiceAnnex};

/// Ratio at or above which a service activity moves to Anexo III.
pub const FACTOR_R_THRESHOLD: Decimal = Decimal::from_parts(28, 0, 0, false, 2);

/// Computes Fator R, or zero when there is no revenue.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tributario_core::calculations::factor_r;
///
/// assert_eq!(factor_r(dec!(180000), dec!(600000)), dec!(0.3));
/// assert_eq!(factor_r(dec!(180000), dec!(0)), dec!(0));
/// ```
pub fn factor_r(
    effective_payroll: Decimal,
    annual_revenue: Decimal,
) -> Decimal {
    ratio(effective_payroll, annual_revenue)
}

/// Why an annex was selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecisionBasis {
    /// The caller forced the annex.
    Forced,

    /// The activity code maps to a fixed annex.
    ActivityCode,

    /// Fator R reached the threshold.
    FactorRMet,

    /// Fator R stayed below the threshold.
    FactorRNotMet,

    /// The activity is not a service activity.
    NotEligible,

    /// The Fator R test was switched off for this run.
    FactorRIgnored,
}

impl DecisionBasis {
    /// True when the annex was dictated by a force or an activity code.
    pub fn is_override(&self) -> bool {
        matches!(self, Self::Forced | Self::ActivityCode)
    }
}

/// Inputs of one annex decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnexQuery {
    pub effective_payroll: Decimal,
    pub annual_revenue: Decimal,
    pub activity_kind: ActivityKind,
    pub forced_annex: Option<ServiceAnnex>,
    pub code_override: Option<CnaeRule>,
    pub use_factor_r: bool,
}

/// Outcome of an annex decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnexDecision {
    pub annex: ServiceAnnex,
    pub basis: DecisionBasis,

    /// Unrounded ratio the decision saw.
    pub factor_r: Decimal,
}

/// The Fator R rule with its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorRRule {
    pub threshold: Decimal,
}

impl Default for FactorRRule {
    fn default() -> Self {
        Self {
            threshold: FACTOR_R_THRESHOLD,
        }
    }
}

impl FactorRRule {
    pub fn new(threshold: Decimal) -> Self {
        Self { threshold }
    }

    /// True when `factor_r` reaches the threshold.
    pub fn is_met(
        &self,
        factor_r: Decimal,
    ) -> bool {
        factor_r >= self.threshold
    }

    /// Decides between Anexo III and Anexo V.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tributario_core::calculations::{AnnexQuery, DecisionBasis, FactorRRule};
    /// use tributario_core::models::{ActivityKind, ServiceAnnex};
    ///
    /// let query = AnnexQuery {
    ///     effective_payroll: dec!(180000),
    ///     annual_revenue: dec!(600000),
    ///     activity_kind: ActivityKind::Services,
    ///     forced_annex: None,
    ///     code_override: None,
    ///     use_factor_r: true,
    /// };
    ///
    /// let decision = FactorRRule::default().decide(&query);
    ///
    /// assert_eq!(decision.annex, ServiceAnnex::III);
    /// assert_eq!(decision.basis, DecisionBasis::FactorRMet);
    /// ```
    pub fn decide(
        &self,
        query: &AnnexQuery,
    ) -> AnnexDecision {
        let factor_r = factor_r(query.effective_payroll, query.annual_revenue);
        let (annex, basis) = self.select(query, factor_r);

        debug!(
            annex = %annex,
            ?basis,
            factor_r = %factor_r,
            use_factor_r = query.use_factor_r,
            "annex decided"
        );

        AnnexDecision {
            annex,
            basis,
            factor_r,
        }
    }

    fn select(
        &self,
        query: &AnnexQuery,
        factor_r: Decimal,
    ) -> (ServiceAnnex, DecisionBasis) {
        if let Some(annex) = query.forced_annex {
            return (annex, DecisionBasis::Forced);
        }
        if let Some(CnaeRule::Fixed(annex)) = query.code_override {
            return (annex, DecisionBasis::ActivityCode);
        }
        if !query.use_factor_r {
            return (ServiceAnnex::V, DecisionBasis::FactorRIgnored);
        }
        if query.activity_kind != ActivityKind::Services {
            return (ServiceAnnex::V, DecisionBasis::NotEligible);
        }
        if self.is_met(factor_r) {
            (ServiceAnnex::III, DecisionBasis::FactorRMet)
        } else {
            (ServiceAnnex::V, DecisionBasis::FactorRNotMet)
        }
    }
}
