//! Bracket table resolution for Simples Nacional annex tables.
//!
//! A bracket table is a list of `(upper bound, rate, deduction)` rows. The
//! resolver picks the first row whose upper bound covers the annual base and
//! computes
//!
//! ```text
//! tax_annual     = max(0, base × rate − deduction)
//! effective_rate = tax_annual / base            (0 when base is 0)
//! tax_monthly    = effective_rate × monthly_base
//! ```
//!
//! The monthly figure re-applies the effective annual rate to the month's
//! revenue, so a month that differs from `annual / 12` (seasonal businesses)
//! still reports a consistent monthly tax. When no monthly base is given, or
//! it is negative, `annual / 12` is used.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tributario_core::calculations::BracketResolver;
//! use tributario_core::models::Bracket;
//!
//! let brackets = vec![
//!     Bracket::new(dec!(180000), dec!(0.06), dec!(0)),
//!     Bracket::new(dec!(360000), dec!(0.112), dec!(9360)),
//!     Bracket::new(dec!(720000), dec!(0.135), dec!(17640)),
//! ];
//!
//! let resolver = BracketResolver::new("anexo_III", &brackets);
//! let result = resolver.resolve(dec!(600000), None).unwrap();
//!
//! assert_eq!(result.tax_annual, dec!(63360));
//! assert_eq!(result.tax_monthly, dec!(5280));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::CalculationError;
use crate::calculations::common::{MONTHS_PER_YEAR, max, ratio, round_half_up};
use crate::models::Bracket;

/// Unrounded outcome of resolving one annual base against a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketResolution {
    /// Nominal rate of the selected bracket.
    pub rate: Decimal,

    /// Deduction of the selected bracket.
    pub deduction: Decimal,

    /// `tax_annual / annual_base`.
    pub effective_rate: Decimal,

    pub tax_annual: Decimal,

    pub tax_monthly: Decimal,
}

impl BracketResolution {
    /// Copy with monetary amounts rounded half-up to cents.
    pub fn rounded(&self) -> Self {
        Self {
            tax_annual: round_half_up(self.tax_annual),
            tax_monthly: round_half_up(self.tax_monthly),
            ..self.clone()
        }
    }
}

/// Resolver over one named bracket table.
#[derive(Debug, Clone)]
pub struct BracketResolver<'a> {
    table: &'a str,
    brackets: &'a [Bracket],
}

impl<'a> BracketResolver<'a> {
    /// `table` names the table in errors and logs (e.g. `anexo_III`).
    pub fn new(
        table: &'a str,
        brackets: &'a [Bracket],
    ) -> Self {
        Self { table, brackets }
    }

    /// Selects the bracket applicable to `annual_base`.
    ///
    /// Brackets are scanned in the given order and the first whose upper
    /// bound is at or above the base wins. A base above every bound closes
    /// on the last bracket, which is open-ended.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::EmptyTable`] when the table has no rows.
    pub fn select(
        &self,
        annual_base: Decimal,
    ) -> Result<&'a Bracket, CalculationError> {
        let Some(top) = self.brackets.last() else {
            return Err(CalculationError::EmptyTable(self.table.to_string()));
        };

        match self.brackets.iter().find(|b| annual_base <= b.upper_bound) {
            Some(bracket) => Ok(bracket),
            None => {
                debug!(
                    table = self.table,
                    annual_base = %annual_base,
                    top_bound = %top.upper_bound,
                    "base above every bound; using open-ended top bracket"
                );
                Ok(top)
            }
        }
    }

    /// Resolves annual and monthly tax for `annual_base`.
    ///
    /// Amounts are returned at full precision; call
    /// [`BracketResolution::rounded`] when producing output.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::EmptyTable`] when the table has no rows.
    pub fn resolve(
        &self,
        annual_base: Decimal,
        monthly_base: Option<Decimal>,
    ) -> Result<BracketResolution, CalculationError> {
        let bracket = self.select(annual_base)?;

        let tax_annual = self.tax_annual(annual_base, bracket);
        let effective_rate = ratio(tax_annual, annual_base);
        let monthly_base = self.monthly_base(annual_base, monthly_base);
        let tax_monthly = effective_rate * monthly_base;

        debug!(
            table = self.table,
            annual_base = %annual_base,
            rate = %bracket.rate,
            deduction = %bracket.deduction,
            tax_annual = %tax_annual,
            "resolved bracket"
        );

        Ok(BracketResolution {
            rate: bracket.rate,
            deduction: bracket.deduction,
            effective_rate,
            tax_annual,
            tax_monthly,
        })
    }

    /// `max(0, base × rate − deduction)`.
    fn tax_annual(
        &self,
        annual_base: Decimal,
        bracket: &Bracket,
    ) -> Decimal {
        max(annual_base * bracket.rate - bracket.deduction, Decimal::ZERO)
    }

    /// The month's revenue, or `annual / 12` when absent or negative.
    fn monthly_base(
        &self,
        annual_base: Decimal,
        monthly_base: Option<Decimal>,
    ) -> Decimal {
        match monthly_base {
            Some(base) if base >= Decimal::ZERO => base,
            Some(base) => {
                warn!(
                    table = self.table,
                    monthly_base = %base,
                    "negative monthly base; falling back to annual / 12"
                );
                annual_base / MONTHS_PER_YEAR
            }
            None => annual_base / MONTHS_PER_YEAR,
        }
    }
}
