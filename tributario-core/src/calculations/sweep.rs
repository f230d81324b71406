//! Resolution of every annex table present in a bundle.
//!
//! The sweep ignores the Fator R rule; it only reads each table so a report
//! can show what the revenue would cost under every annex.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::calculations::BracketResolver;
use crate::models::{Annex, TableSet};

/// Resolution of one annex table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnexResult {
    #[serde(rename = "anexo")]
    pub annex: Annex,

    #[serde(rename = "aliquota")]
    pub rate: Decimal,

    #[serde(rename = "deduz")]
    pub deduction: Decimal,

    pub tax_annual: Decimal,

    pub tax_monthly: Decimal,
}

/// Resolves `annual_revenue` against every annex table in `tables`.
///
/// Absent tables are omitted. Empty tables are omitted with a warning; the
/// sweep itself never fails. Keys iterate in canonical order (`I` to `V`).
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use tributario_core::calculations::sweep_all_annexes;
/// use tributario_core::models::{Annex, Bracket, BracketTable, TableSet};
///
/// let mut tables = TableSet::default();
/// tables.set_annex(
///     Annex::I,
///     BracketTable::new(vec![Bracket::new(dec!(180000), dec!(0.04), dec!(0))]),
/// );
///
/// let results = sweep_all_annexes(&tables, dec!(120000), None);
///
/// assert_eq!(results.len(), 1);
/// assert_eq!(results[&Annex::I].tax_annual, dec!(4800.00));
/// ```
pub fn sweep_all_annexes(
    tables: &TableSet,
    annual_revenue: Decimal,
    monthly_revenue: Option<Decimal>,
) -> BTreeMap<Annex, AnnexResult> {
    let mut results = BTreeMap::new();

    for (annex, table) in tables.annexes() {
        let resolver = BracketResolver::new(annex.table_key(), table.brackets());
        match resolver.resolve(annual_revenue, monthly_revenue) {
            Ok(resolution) => {
                let resolution = resolution.rounded();
                results.insert(
                    annex,
                    AnnexResult {
                        annex,
                        rate: resolution.rate,
                        deduction: resolution.deduction,
                        tax_annual: resolution.tax_annual,
                        tax_monthly: resolution.tax_monthly,
                    },
                );
            }
            Err(error) => {
                warn!(annex = %annex, %error, "skipping empty annex table in sweep");
            }
        }
    }

    debug!(
        annual_revenue = %annual_revenue,
        annexes = results.len(),
        "swept annex tables"
    );

    results
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Bracket, BracketTable};

    fn single(
        rate: Decimal,
        deduction: Decimal,
    ) -> BracketTable {
        BracketTable::new(vec![
            Bracket::new(dec!(180000), rate, dec!(0)),
            Bracket::new(dec!(4800000), rate * dec!(2), deduction),
        ])
    }

    // =========================================================================
    // sweep_all_annexes tests
    // =========================================================================

    #[test]
    fn sweeps_every_present_annex() {
        let mut tables = TableSet::default();
        for annex in Annex::ALL {
            tables.set_annex(annex, single(dec!(0.05), dec!(9000)));
        }

        let results = sweep_all_annexes(&tables, dec!(600000), None);

        assert_eq!(results.keys().copied().collect::<Vec<_>>(), Annex::ALL.to_vec());
        // 600000 × 0.10 − 9000
        assert_eq!(results[&Annex::IV].tax_annual, dec!(51000.00));
        assert_eq!(results[&Annex::IV].tax_monthly, dec!(4250.00));
        assert_eq!(results[&Annex::IV].annex, Annex::IV);
    }

    #[test]
    fn absent_tables_are_omitted() {
        let mut tables = TableSet::default();
        tables.set_annex(Annex::II, single(dec!(0.045), dec!(0)));
        tables.set_annex(Annex::V, single(dec!(0.155), dec!(0)));

        let results = sweep_all_annexes(&tables, dec!(100000), None);

        assert_eq!(results.keys().copied().collect::<Vec<_>>(), vec![Annex::II, Annex::V]);
    }

    #[test]
    fn empty_tables_are_skipped() {
        let mut tables = TableSet::default();
        tables.set_annex(Annex::I, BracketTable::default());
        tables.set_annex(Annex::III, single(dec!(0.06), dec!(0)));

        let results = sweep_all_annexes(&tables, dec!(100000), None);

        assert_eq!(results.len(), 1);
        assert!(results.contains_key(&Annex::III));
    }

    #[test]
    fn empty_bundle_yields_empty_map() {
        let results = sweep_all_annexes(&TableSet::default(), dec!(100000), None);

        assert!(results.is_empty());
    }

    #[test]
    fn monthly_revenue_is_forwarded() {
        let mut tables = TableSet::default();
        tables.set_annex(Annex::III, single(dec!(0.06), dec!(0)));

        let results = sweep_all_annexes(&tables, dec!(120000), Some(dec!(15000)));

        assert_eq!(results[&Annex::III].tax_monthly, dec!(900.00));
    }

    #[test]
    fn serializes_with_annex_labels() {
        let mut tables = TableSet::default();
        tables.set_annex(Annex::II, single(dec!(0.045), dec!(0)));

        let results = sweep_all_annexes(&tables, dec!(100000), None);
        let json = serde_json::to_value(&results).unwrap();

        assert_eq!(json["II"]["anexo"], "II");
        assert_eq!(json["II"]["tax_annual"], 4500.0);
    }
}
