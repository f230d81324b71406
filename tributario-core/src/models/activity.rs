use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::ServiceAnnex;
use crate::calculations::common::MONTHS_PER_YEAR;

/// Simplified activity category of the business.
///
/// Only service activities are eligible for the Fator R rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityKind {
    #[default]
    #[serde(rename = "servicos", alias = "services")]
    Services,

    #[serde(rename = "outros", other)]
    Other,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Services => "servicos",
            Self::Other => "outros",
        }
    }

    /// Any label other than `servicos`/`services` is a non-service activity.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "servicos" | "serviços" | "services" => Self::Services,
            _ => Self::Other,
        }
    }
}

/// Annex determination attached to an activity code (CNAE).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CnaeRule {
    /// The activity is always taxed under this annex.
    Fixed(ServiceAnnex),

    /// The annex is left to the Fator R test.
    FactorR,
}

impl From<String> for CnaeRule {
    fn from(raw: String) -> Self {
        match raw.trim() {
            "fator_r" => Self::FactorR,
            other => match ServiceAnnex::parse(other) {
                Some(annex) => Self::Fixed(annex),
                None => {
                    warn!(rule = %raw, "unknown CNAE rule; deferring to Fator R");
                    Self::FactorR
                }
            },
        }
    }
}

impl From<CnaeRule> for String {
    fn from(rule: CnaeRule) -> Self {
        match rule {
            CnaeRule::Fixed(annex) => annex.to_string(),
            CnaeRule::FactorR => "fator_r".to_string(),
        }
    }
}

/// Inputs of one Simples Nacional calculation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityContext {
    pub annual_revenue: Decimal,

    /// Annual payroll, excluding the owner's pró-labore.
    pub annual_payroll: Decimal,

    /// Revenue of the reference month; when absent the monthly tax is
    /// derived from `annual_revenue / 12`.
    pub monthly_revenue: Option<Decimal>,

    /// Gross monthly pró-labore of the owner-manager.
    pub owner_payroll_monthly: Decimal,

    pub activity_kind: ActivityKind,

    pub forced_annex: Option<ServiceAnnex>,

    pub activity_code_override: Option<CnaeRule>,
}

impl ActivityContext {
    /// A services context with no overrides.
    pub fn new(
        annual_revenue: Decimal,
        annual_payroll: Decimal,
    ) -> Self {
        Self {
            annual_revenue,
            annual_payroll,
            monthly_revenue: None,
            owner_payroll_monthly: Decimal::ZERO,
            activity_kind: ActivityKind::Services,
            forced_annex: None,
            activity_code_override: None,
        }
    }

    /// Payroll base of the Fator R ratio: payroll plus twelve months of gross
    /// pró-labore. Withholding on the pró-labore is never part of it.
    pub fn effective_payroll(&self) -> Decimal {
        self.annual_payroll + self.owner_payroll_monthly * MONTHS_PER_YEAR
    }
}
