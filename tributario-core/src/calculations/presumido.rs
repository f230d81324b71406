//! Lucro Presumido (presumed profit) calculations.
//!
//! Every levy is a flat rate over revenue, or over a statutory share of it:
//!
//! | Levy            | Formula |
//! |-----------------|---------|
//! | IRPJ            | `revenue × irpj_presumption × 15 %` |
//! | IRPJ adicional  | `(base_irpj / 12 − threshold) × 12 × 10 %` above the monthly threshold |
//! | CSLL            | `revenue × csll_presumption × 9 %` |
//! | PIS             | `revenue × pis_rate` |
//! | COFINS          | `revenue × cofins_rate` |
//! | ISS             | `monthly_revenue × iss_rate × 12` |
//! | INSS patronal   | `(payroll / 12 + pró-labore) × employer_social_rate × 12` |
//!
//! The surcharge is evaluated on the monthly base and then annualized. When
//! no positive monthly revenue is given, ISS uses `revenue / 12`.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use tributario_core::calculations::{PresumidoCalculator, PresumidoInput, PresumidoParams};
//!
//! let params = PresumidoParams {
//!     csll_presumption: dec!(0.12),
//!     iss_rate: dec!(0.03),
//!     ..PresumidoParams::default()
//! };
//!
//! let result = PresumidoCalculator::new(params)
//!     .calculate(&PresumidoInput::new(dec!(600000)))
//!     .unwrap();
//!
//! assert_eq!(result.total_annual, dec!(75180.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::CalculationError;
use crate::calculations::common::{MONTHS_PER_YEAR, round_half_up};

/// IRPJ rate over the presumed profit.
pub const IRPJ_RATE: Decimal = Decimal::from_parts(15, 0, 0, false, 2);

/// Surcharge rate over the monthly presumed profit above the threshold.
pub const IRPJ_SURCHARGE_RATE: Decimal = Decimal::from_parts(10, 0, 0, false, 2);

/// CSLL rate over the presumed profit.
pub const CSLL_RATE: Decimal = Decimal::from_parts(9, 0, 0, false, 2);

/// Rates and thresholds of the presumed-profit regime.
///
/// Defaults are the usual values for service companies: 32 % presumption for
/// IRPJ and CSLL, cumulative PIS/COFINS, 2 % ISS and 20 % employer INSS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresumidoParams {
    /// Share of revenue presumed as profit for IRPJ.
    pub irpj_presumption: Decimal,

    /// Share of revenue presumed as profit for CSLL.
    pub csll_presumption: Decimal,

    pub pis_rate: Decimal,

    pub cofins_rate: Decimal,

    pub iss_rate: Decimal,

    /// Monthly presumed profit above which the IRPJ surcharge applies.
    pub surcharge_threshold_monthly: Decimal,

    /// Employer INSS rate over payroll plus pró-labore.
    pub employer_social_rate: Decimal,
}

impl Default for PresumidoParams {
    fn default() -> Self {
        Self {
            irpj_presumption: Decimal::from_parts(32, 0, 0, false, 2),
            csll_presumption: Decimal::from_parts(32, 0, 0, false, 2),
            pis_rate: Decimal::from_parts(65, 0, 0, false, 4),
            cofins_rate: Decimal::from_parts(3, 0, 0, false, 2),
            iss_rate: Decimal::from_parts(2, 0, 0, false, 2),
            surcharge_threshold_monthly: Decimal::from(20_000),
            employer_social_rate: Decimal::from_parts(20, 0, 0, false, 2),
        }
    }
}

impl PresumidoParams {
    /// Validates the parameter values.
    ///
    /// # Errors
    ///
    /// Returns [`CalculationError::InvalidRate`] for a rate outside `[0, 1]`
    /// and [`CalculationError::InvalidThreshold`] for a negative threshold.
    ///
    /// # Example
    ///
    /// ```
    /// use rust_decimal_macros::dec;
    /// use tributario_core::calculations::{CalculationError, PresumidoParams};
    ///
    /// let params = PresumidoParams {
    ///     iss_rate: dec!(1.5),
    ///     ..PresumidoParams::default()
    /// };
    ///
    /// assert_eq!(
    ///     params.validate(),
    ///     Err(CalculationError::InvalidRate { name: "iss_rate", value: dec!(1.5) })
    /// );
    /// ```
    pub fn validate(&self) -> Result<(), CalculationError> {
        let rates = [
            ("irpj_presumption", self.irpj_presumption),
            ("csll_presumption", self.csll_presumption),
            ("pis_rate", self.pis_rate),
            ("cofins_rate", self.cofins_rate),
            ("iss_rate", self.iss_rate),
            ("employer_social_rate", self.employer_social_rate),
        ];
        for (name, value) in rates {
            if value < Decimal::ZERO || value > Decimal::ONE {
                return Err(CalculationError::InvalidRate { name, value });
            }
        }
        if self.surcharge_threshold_monthly < Decimal::ZERO {
            return Err(CalculationError::InvalidThreshold(
                self.surcharge_threshold_monthly,
            ));
        }
        Ok(())
    }
}

/// Company figures the regime is applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresumidoInput {
    pub annual_revenue: Decimal,

    /// Revenue of the reference month, used for ISS.
    pub monthly_revenue: Option<Decimal>,

    /// Annual payroll, excluding the pró-labore.
    pub annual_payroll: Decimal,

    pub owner_payroll_monthly: Decimal,
}

impl PresumidoInput {
    pub fn new(annual_revenue: Decimal) -> Self {
        Self {
            annual_revenue,
            monthly_revenue: None,
            annual_payroll: Decimal::ZERO,
            owner_payroll_monthly: Decimal::ZERO,
        }
    }
}

/// Parameters echoed back with a result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatesUsed {
    pub presumption_percent_irpj: Decimal,
    pub irpj_rate: Decimal,
    pub irpj_additional_rate: Decimal,
    pub irpj_additional_threshold_monthly: Decimal,
    pub presumption_percent_csll: Decimal,
    pub csll_rate: Decimal,
    pub pis_rate: Decimal,
    pub cofins_rate: Decimal,
    pub iss_rate: Decimal,
    pub inss_patronal_rate: Decimal,

    /// Monthly employer INSS base, rounded to cents.
    pub inss_patronal_base_monthly: Decimal,
}

/// Presumed-profit liabilities, rounded to cents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresumidoResult {
    pub base_irpj: Decimal,

    pub irpj: Decimal,

    #[serde(rename = "irpj_adicional")]
    pub irpj_surcharge: Decimal,

    pub csll: Decimal,

    pub pis: Decimal,

    pub cofins: Decimal,

    /// Annual ISS.
    pub iss: Decimal,

    pub iss_monthly: Decimal,

    /// Sum of the six levies, without employer INSS.
    pub total_annual: Decimal,

    pub total_monthly: Decimal,

    #[serde(rename = "inss_patronal_monthly")]
    pub employer_social_monthly: Decimal,

    #[serde(rename = "inss_patronal_annual")]
    pub employer_social_annual: Decimal,

    #[serde(rename = "total_annual_with_patronal")]
    pub total_annual_with_employer_social: Decimal,

    #[serde(rename = "total_monthly_with_patronal")]
    pub total_monthly_with_employer_social: Decimal,

    pub rates_used: RatesUsed,
}

/// Calculator for the presumed-profit regime.
#[derive(Debug, Clone, Default)]
pub struct PresumidoCalculator {
    params: PresumidoParams,
}

impl PresumidoCalculator {
    pub fn new(params: PresumidoParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &PresumidoParams {
        &self.params
    }

    /// Calculates every levy for `input`.
    ///
    /// # Errors
    ///
    /// Returns the [`PresumidoParams::validate`] error when the parameters
    /// are out of range.
    pub fn calculate(
        &self,
        input: &PresumidoInput,
    ) -> Result<PresumidoResult, CalculationError> {
        self.params.validate()?;
        let p = &self.params;
        let revenue = input.annual_revenue;

        let base_irpj = revenue * p.irpj_presumption;
        let irpj = base_irpj * IRPJ_RATE;
        let irpj_surcharge = self.irpj_surcharge(base_irpj);
        let csll = revenue * p.csll_presumption * CSLL_RATE;
        let pis = revenue * p.pis_rate;
        let cofins = revenue * p.cofins_rate;

        let iss_monthly = match input.monthly_revenue {
            Some(monthly) if monthly > Decimal::ZERO => monthly * p.iss_rate,
            _ => revenue / MONTHS_PER_YEAR * p.iss_rate,
        };
        let iss = iss_monthly * MONTHS_PER_YEAR;

        let total_annual = irpj + irpj_surcharge + csll + pis + cofins + iss;

        let employer_social_base =
            input.annual_payroll / MONTHS_PER_YEAR + input.owner_payroll_monthly;
        let employer_social_monthly = employer_social_base * p.employer_social_rate;
        let employer_social_annual = employer_social_monthly * MONTHS_PER_YEAR;
        let total_with_employer_social = total_annual + employer_social_annual;

        debug!(
            annual_revenue = %revenue,
            base_irpj = %base_irpj,
            irpj_surcharge = %irpj_surcharge,
            total_annual = %total_annual,
            "computed presumed-profit levies"
        );

        Ok(PresumidoResult {
            base_irpj: round_half_up(base_irpj),
            irpj: round_half_up(irpj),
            irpj_surcharge: round_half_up(irpj_surcharge),
            csll: round_half_up(csll),
            pis: round_half_up(pis),
            cofins: round_half_up(cofins),
            iss: round_half_up(iss),
            iss_monthly: round_half_up(iss_monthly),
            total_annual: round_half_up(total_annual),
            total_monthly: round_half_up(total_annual / MONTHS_PER_YEAR),
            employer_social_monthly: round_half_up(employer_social_monthly),
            employer_social_annual: round_half_up(employer_social_annual),
            total_annual_with_employer_social: round_half_up(total_with_employer_social),
            total_monthly_with_employer_social: round_half_up(
                total_with_employer_social / MONTHS_PER_YEAR,
            ),
            rates_used: RatesUsed {
                presumption_percent_irpj: p.irpj_presumption,
                irpj_rate: IRPJ_RATE,
                irpj_additional_rate: IRPJ_SURCHARGE_RATE,
                irpj_additional_threshold_monthly: p.surcharge_threshold_monthly,
                presumption_percent_csll: p.csll_presumption,
                csll_rate: CSLL_RATE,
                pis_rate: p.pis_rate,
                cofins_rate: p.cofins_rate,
                iss_rate: p.iss_rate,
                inss_patronal_rate: p.employer_social_rate,
                inss_patronal_base_monthly: round_half_up(employer_social_base),
            },
        })
    }

    /// Annual IRPJ surcharge, from the monthly excess over the threshold.
    fn irpj_surcharge(
        &self,
        base_irpj: Decimal,
    ) -> Decimal {
        let monthly_base = base_irpj / MONTHS_PER_YEAR;
        let threshold = self.params.surcharge_threshold_monthly;
        if monthly_base > threshold {
            (monthly_base - threshold) * MONTHS_PER_YEAR * IRPJ_SURCHARGE_RATE
        } else {
            Decimal::ZERO
        }
    }
}
