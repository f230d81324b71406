//! Simples Nacional, Lucro Presumido and pró-labore calculations.
//!
//! Calculators take the table set and plain decimal inputs, keep full
//! precision throughout and round to cents only when building their output.

pub mod common;
mod error;
mod factor_r;
mod presumido;
mod report;
mod resolver;
mod scenarios;
mod sweep;
mod withholding;

pub use error::CalculationError;
pub use factor_r::{
    AnnexDecision, AnnexQuery, DecisionBasis, FACTOR_R_THRESHOLD, FactorRRule, factor_r,
};
pub use presumido::{
    CSLL_RATE, IRPJ_RATE, IRPJ_SURCHARGE_RATE, PresumidoCalculator, PresumidoInput,
    PresumidoParams, PresumidoResult, RatesUsed,
};
pub use report::{
    ComparisonReport, ProLaboreTotals, ReportInputs, ScenarioWithProLabore, SimplesScenarios,
};
pub use resolver::{BracketResolution, BracketResolver};
pub use scenarios::{Scenario, ScenarioComparator, ScenarioComparison, ScenarioResult};
pub use sweep::{AnnexResult, sweep_all_annexes};
pub use withholding::{DEFAULT_SOCIAL_RATE, WithholdingCalculator, WithholdingResult};
