//! # Regime Comparison API
//!
//! Routes:
//! - POST /compare: Simples Nacional scenarios, all-annexes sweep, Lucro
//!   Presumido and pró-labore charges for one set of inputs

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use tributario_core::calculations::{ComparisonReport, DEFAULT_SOCIAL_RATE, PresumidoParams};
use tributario_core::{ActivityContext, ActivityKind, ServiceAnnex, TableMeta, TableSet};

use crate::error::AppError;
use crate::state::AppState;

/// Largest amount accepted for revenue, payroll or pró-labore (10^15).
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Body of `POST /compare`. Every field is optional.
///
/// Presumed-profit overrides fall back to [`PresumidoParams::default`] and
/// `inss_rate_effective` to [`DEFAULT_SOCIAL_RATE`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompareRequest {
    pub monthly_revenue: Option<Decimal>,

    /// Defaults to `monthly_revenue × 12`.
    pub annual_revenue: Option<Decimal>,

    pub annual_payroll: Decimal,
    pub pro_labore_monthly: Decimal,

    /// `servicos` (default) or any other label for non-service activities.
    pub atividade: Option<String>,

    /// `III` or `V`; anything else is ignored.
    pub force_anexo: Option<String>,

    /// Activity code looked up in the bundle's `cnae_rules`.
    pub cnae: Option<String>,

    pub presumption_percent: Option<Decimal>,
    pub csll_presumption_percent: Option<Decimal>,
    pub pis_rate: Option<Decimal>,
    pub cofins_rate: Option<Decimal>,
    pub iss_rate: Option<Decimal>,
    pub inss_patronal_rate: Option<Decimal>,
    pub inss_rate_effective: Option<Decimal>,
}

impl CompareRequest {
    pub fn annual_revenue(&self) -> Decimal {
        self.annual_revenue
            .or_else(|| self.monthly_revenue.map(|monthly| monthly * Decimal::from(12)))
            .unwrap_or_default()
    }

    /// Rejects negative or oversized amounts and an out-of-range social rate.
    pub fn validate(&self) -> Result<(), AppError> {
        let amounts = [
            ("monthly_revenue", self.monthly_revenue),
            ("annual_revenue", self.annual_revenue),
            ("annual_payroll", Some(self.annual_payroll)),
            ("pro_labore_monthly", Some(self.pro_labore_monthly)),
        ];
        for (name, value) in amounts {
            let Some(value) = value else { continue };
            if value < Decimal::ZERO {
                return Err(AppError::Validation(format!(
                    "{name} must be non-negative, got {value}"
                )));
            }
            if value > MAX_AMOUNT {
                return Err(AppError::Validation(format!(
                    "{name} must be at most {MAX_AMOUNT}, got {value}"
                )));
            }
        }

        let social_rate = self.social_rate();
        if social_rate < Decimal::ZERO || social_rate > Decimal::ONE {
            return Err(AppError::Validation(format!(
                "inss_rate_effective must be between 0 and 1, got {social_rate}"
            )));
        }

        Ok(())
    }

    /// Calculation inputs, resolving `force_anexo` and `cnae` against `tables`.
    pub fn activity_context(
        &self,
        tables: &TableSet,
    ) -> ActivityContext {
        let forced_annex = self.force_anexo.as_deref().and_then(|raw| {
            let annex = ServiceAnnex::parse(raw);
            if annex.is_none() {
                warn!(force_anexo = raw, "ignoring forced annex other than III or V");
            }
            annex
        });

        let activity_code_override = self.cnae.as_deref().and_then(|code| {
            let rule = tables.cnae_rule(code);
            if rule.is_none() {
                debug!(cnae = code, "activity code has no rule in the table set");
            }
            rule
        });

        ActivityContext {
            annual_revenue: self.annual_revenue(),
            annual_payroll: self.annual_payroll,
            monthly_revenue: self.monthly_revenue,
            owner_payroll_monthly: self.pro_labore_monthly,
            activity_kind: self
                .atividade
                .as_deref()
                .map(ActivityKind::parse)
                .unwrap_or_default(),
            forced_annex,
            activity_code_override,
        }
    }

    pub fn presumido_params(&self) -> PresumidoParams {
        let defaults = PresumidoParams::default();
        PresumidoParams {
            irpj_presumption: self.presumption_percent.unwrap_or(defaults.irpj_presumption),
            csll_presumption: self.csll_presumption_percent.unwrap_or(defaults.csll_presumption),
            pis_rate: self.pis_rate.unwrap_or(defaults.pis_rate),
            cofins_rate: self.cofins_rate.unwrap_or(defaults.cofins_rate),
            iss_rate: self.iss_rate.unwrap_or(defaults.iss_rate),
            employer_social_rate: self.inss_patronal_rate.unwrap_or(defaults.employer_social_rate),
            ..defaults
        }
    }

    pub fn social_rate(&self) -> Decimal {
        self.inss_rate_effective.unwrap_or(DEFAULT_SOCIAL_RATE)
    }
}

/// The table set a comparison ran against.
#[derive(Debug, Serialize)]
pub struct TablesUsed {
    pub meta: TableMeta,
    pub tables: Arc<TableSet>,
}

#[derive(Debug, Serialize)]
pub struct CompareResponse {
    #[serde(flatten)]
    pub report: ComparisonReport,

    pub tables_used: TablesUsed,
}

pub fn router() -> Router<AppState> {
    Router::new().route("/compare", post(compare))
}

/// POST /compare
async fn compare(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<CompareResponse>, AppError> {
    if body.is_empty() {
        return Err(AppError::BadRequest("JSON body expected".to_string()));
    }
    let request: CompareRequest =
        serde_json::from_slice(&body).map_err(|err| AppError::BadRequest(err.to_string()))?;
    request.validate()?;

    let (tables, meta) = state
        .active_tables()
        .ok_or_else(|| AppError::ServiceUnavailable("no tax tables loaded".to_string()))?;

    let ctx = request.activity_context(&tables);
    let report = ComparisonReport::build(
        &ctx,
        &tables,
        &request.presumido_params(),
        request.social_rate(),
    )?;

    Ok(Json(CompareResponse {
        report,
        tables_used: TablesUsed { meta, tables },
    }))
}
