//! Pró-labore withholding.
//!
//! The owner's monthly pró-labore carries two employee-side charges:
//!
//! | Charge | Formula |
//! |--------|---------|
//! | INSS   | `pro_labore × social_rate` (flat, 11 % by default) |
//! | IRRF   | `max(0, pro_labore × rate − deduction)` from the progressive table |
//!
//! The IRRF base is the gross pró-labore; INSS is not deducted from it.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tributario_core::calculations::WithholdingCalculator;
//! use tributario_core::models::Bracket;
//!
//! let irrf = vec![
//!     Bracket::new(dec!(2259.20), dec!(0), dec!(0)),
//!     Bracket::new(dec!(4664.68), dec!(0.225), dec!(662.77)),
//!     Bracket::new(dec!(999999999), dec!(0.275), dec!(896.00)),
//! ];
//!
//! let result = WithholdingCalculator::default()
//!     .calculate(dec!(5000), &irrf)
//!     .unwrap();
//!
//! assert_eq!(result.social_contribution, dec!(550.00));
//! assert_eq!(result.income_withholding, dec!(479.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::common::{max, round_half_up};
use crate::calculations::{BracketResolver, CalculationError};
use crate::models::{Bracket, IRRF_TABLE_KEY};

/// Effective employee INSS rate applied to the pró-labore.
pub const DEFAULT_SOCIAL_RATE: Decimal = Decimal::from_parts(11, 0, 0, false, 2);

/// Monthly charges withheld from the pró-labore.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithholdingResult {
    /// Employee social contribution (INSS).
    #[serde(rename = "inss")]
    pub social_contribution: Decimal,

    /// Income tax withheld at source (IRRF).
    #[serde(rename = "irrf")]
    pub income_withholding: Decimal,

    #[serde(skip)]
    pub(crate) exact_social_contribution: Decimal,

    #[serde(skip)]
    pub(crate) exact_income_withholding: Decimal,
}

impl WithholdingResult {
    fn from_exact(
        social_contribution: Decimal,
        income_withholding: Decimal,
    ) -> Self {
        Self {
            social_contribution: round_half_up(social_contribution),
            income_withholding: round_half_up(income_withholding),
            exact_social_contribution: social_contribution,
            exact_income_withholding: income_withholding,
        }
    }

    /// Sum of both charges, unrounded.
    pub(crate) fn exact_total(&self) -> Decimal {
        self.exact_social_contribution + self.exact_income_withholding
    }
}

/// Calculator for the pró-labore charges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WithholdingCalculator {
    social_rate: Decimal,
}

impl Default for WithholdingCalculator {
    fn default() -> Self {
        Self::new(DEFAULT_SOCIAL_RATE)
    }
}

impl WithholdingCalculator {
    pub fn new(social_rate: Decimal) -> Self {
        Self { social_rate }
    }

    pub fn social_rate(&self) -> Decimal {
        self.social_rate
    }

    /// Computes INSS and IRRF on a gross monthly pró-labore.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::EmptyTable`] when `irrf_table` has no
    /// rows.
    pub fn calculate(
        &self,
        pro_labore_monthly: Decimal,
        irrf_table: &[Bracket],
    ) -> Result<WithholdingResult, CalculationError> {
        let social_contribution = pro_labore_monthly * self.social_rate;

        let bracket = BracketResolver::new(IRRF_TABLE_KEY, irrf_table).select(pro_labore_monthly)?;
        let income_withholding = max(
            Decimal::ZERO,
            pro_labore_monthly * bracket.rate - bracket.deduction,
        );

        debug!(
            pro_labore_monthly = %pro_labore_monthly,
            social_rate = %self.social_rate,
            irrf_rate = %bracket.rate,
            irrf_deduction = %bracket.deduction,
            "computed pró-labore withholding"
        );

        Ok(WithholdingResult::from_exact(
            social_contribution,
            income_withholding,
        ))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn irrf_table() -> Vec<Bracket> {
        vec![
            Bracket::new(dec!(2259.20), dec!(0), dec!(0)),
            Bracket::new(dec!(2826.65), dec!(0.075), dec!(169.44)),
            Bracket::new(dec!(3751.05), dec!(0.15), dec!(381.44)),
            Bracket::new(dec!(4664.68), dec!(0.225), dec!(662.77)),
            Bracket::new(dec!(999999999), dec!(0.275), dec!(896.00)),
        ]
    }

    // =========================================================================
    // calculate tests
    // =========================================================================

    #[test]
    fn calculates_both_charges_on_gross_pro_labore() {
        let result = WithholdingCalculator::default()
            .calculate(dec!(5000), &irrf_table())
            .unwrap();

        assert_eq!(result.social_contribution, dec!(550.00));
        // 5000 × 0.275 − 896
        assert_eq!(result.income_withholding, dec!(479.00));
    }

    #[test]
    fn income_withholding_ignores_social_contribution() {
        // Net of INSS the base would be 2670 and fall in the 7.5 % bracket.
        let result = WithholdingCalculator::default()
            .calculate(dec!(3000), &irrf_table())
            .unwrap();

        assert_eq!(result.income_withholding, dec!(68.56));
    }

    #[test]
    fn exempt_bracket_yields_zero() {
        let result = WithholdingCalculator::default()
            .calculate(dec!(2000), &irrf_table())
            .unwrap();

        assert_eq!(result.social_contribution, dec!(220.00));
        assert_eq!(result.income_withholding, dec!(0));
    }

    #[test]
    fn above_top_bound_uses_last_bracket() {
        let table = vec![
            Bracket::new(dec!(2259.20), dec!(0), dec!(0)),
            Bracket::new(dec!(4664.68), dec!(0.225), dec!(662.77)),
        ];

        let result = WithholdingCalculator::default()
            .calculate(dec!(10000), &table)
            .unwrap();

        assert_eq!(result.income_withholding, dec!(1587.23));
    }

    #[test]
    fn withholding_is_floored_at_zero() {
        let table = vec![Bracket::new(dec!(5000), dec!(0.075), dec!(169.44))];

        let result = WithholdingCalculator::default()
            .calculate(dec!(1000), &table)
            .unwrap();

        assert_eq!(result.income_withholding, dec!(0));
    }

    #[test]
    fn zero_pro_labore_yields_zero_charges() {
        let result = WithholdingCalculator::default()
            .calculate(Decimal::ZERO, &irrf_table())
            .unwrap();

        assert_eq!(result, WithholdingResult::default());
    }

    #[test]
    fn custom_social_rate_is_applied() {
        let result = WithholdingCalculator::new(dec!(0.20))
            .calculate(dec!(5000), &irrf_table())
            .unwrap();

        assert_eq!(result.social_contribution, dec!(1000.00));
    }

    #[test]
    fn empty_table_is_an_error() {
        let result = WithholdingCalculator::default().calculate(dec!(5000), &[]);

        assert_eq!(
            result,
            Err(CalculationError::EmptyTable("irrf_table".to_string()))
        );
    }

    #[test]
    fn serializes_with_short_labels() {
        let result = WithholdingCalculator::default()
            .calculate(dec!(5000), &irrf_table())
            .unwrap();

        let json = serde_json::to_value(&result).unwrap();

        assert_eq!(json, serde_json::json!({"inss": 550.0, "irrf": 479.0}));
    }
}
