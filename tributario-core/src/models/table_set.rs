use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Annex, BracketTable, CnaeRule};
use crate::calculations::CalculationError;

/// Bundle key of the progressive withholding table.
pub const IRRF_TABLE_KEY: &str = "irrf_table";

/// Typed bundle of every table a calculation may read.
///
/// Built once at the boundary (file, URL or upload) and then shared
/// read-only. Tables absent from the source stay `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSet {
    #[serde(rename = "anexo_I", default, skip_serializing_if = "Option::is_none")]
    pub anexo_i: Option<BracketTable>,

    #[serde(rename = "anexo_II", default, skip_serializing_if = "Option::is_none")]
    pub anexo_ii: Option<BracketTable>,

    #[serde(rename = "anexo_III", default, skip_serializing_if = "Option::is_none")]
    pub anexo_iii: Option<BracketTable>,

    #[serde(rename = "anexo_IV", default, skip_serializing_if = "Option::is_none")]
    pub anexo_iv: Option<BracketTable>,

    #[serde(rename = "anexo_V", default, skip_serializing_if = "Option::is_none")]
    pub anexo_v: Option<BracketTable>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub irrf_table: Option<BracketTable>,

    #[serde(default)]
    pub cnae_rules: BTreeMap<String, CnaeRule>,
}

impl TableSet {
    pub fn annex(
        &self,
        annex: Annex,
    ) -> Option<&BracketTable> {
        match annex {
            Annex::I => self.anexo_i.as_ref(),
            Annex::II => self.anexo_ii.as_ref(),
            Annex::III => self.anexo_iii.as_ref(),
            Annex::IV => self.anexo_iv.as_ref(),
            Annex::V => self.anexo_v.as_ref(),
        }
    }

    /// Like [`TableSet::annex`], but a missing table is an error.
    pub fn require_annex(
        &self,
        annex: Annex,
    ) -> Result<&BracketTable, CalculationError> {
        self.annex(annex)
            .ok_or_else(|| CalculationError::MissingTable(annex.table_key().to_string()))
    }

    /// Slot holding the table of `annex`.
    pub fn annex_mut(
        &mut self,
        annex: Annex,
    ) -> &mut Option<BracketTable> {
        match annex {
            Annex::I => &mut self.anexo_i,
            Annex::II => &mut self.anexo_ii,
            Annex::III => &mut self.anexo_iii,
            Annex::IV => &mut self.anexo_iv,
            Annex::V => &mut self.anexo_v,
        }
    }

    pub fn set_annex(
        &mut self,
        annex: Annex,
        table: BracketTable,
    ) {
        *self.annex_mut(annex) = Some(table);
    }

    /// Present annex tables in canonical order.
    pub fn annexes(&self) -> impl Iterator<Item = (Annex, &BracketTable)> {
        Annex::ALL
            .into_iter()
            .filter_map(|annex| self.annex(annex).map(|table| (annex, table)))
    }

    pub fn require_irrf(&self) -> Result<&BracketTable, CalculationError> {
        self.irrf_table
            .as_ref()
            .ok_or_else(|| CalculationError::MissingTable(IRRF_TABLE_KEY.to_string()))
    }

    /// True when the bundle carries no table and no activity-code rule.
    pub fn is_empty(&self) -> bool {
        self.annexes().next().is_none() && self.irrf_table.is_none() && self.cnae_rules.is_empty()
    }

    /// Rule configured for an activity code, if the bundle knows the code.
    pub fn cnae_rule(
        &self,
        code: &str,
    ) -> Option<CnaeRule> {
        self.cnae_rules.get(code.trim()).copied()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{Bracket, ServiceAnnex};

    const BUNDLE: &str = r#"{
        "anexo_III": [
            {"min": 0, "max": 180000, "aliquota": 0.06, "deduz": 0},
            {"min": 180000.01, "max": 360000, "aliquota": 0.112, "deduz": 9360}
        ],
        "irrf_table": [
            {"max": 2259.20, "aliquota": 0, "deducao": 0},
            {"max": 2826.65, "aliquota": 0.075, "deducao": 169.44}
        ],
        "cnae_rules": {"6201-5/01": "fator_r", "6911-7/01": "III"},
        "notes": "ignored"
    }"#;

    #[test]
    fn deserializes_portuguese_field_names() {
        let tables: TableSet = serde_json::from_str(BUNDLE).unwrap();

        let anexo_iii = tables.annex(Annex::III).unwrap();
        assert_eq!(anexo_iii.len(), 2);
        assert_eq!(
            anexo_iii.brackets()[1],
            Bracket::new(dec!(360000), dec!(0.112), dec!(9360))
        );
        assert_eq!(tables.require_irrf().unwrap().brackets()[1].deduction, dec!(169.44));
    }

    #[test]
    fn missing_annex_is_reported_by_key() {
        let tables: TableSet = serde_json::from_str(BUNDLE).unwrap();

        assert!(tables.annex(Annex::V).is_none());
        assert_eq!(
            tables.require_annex(Annex::V),
            Err(CalculationError::MissingTable("anexo_V".to_string()))
        );
    }

    #[test]
    fn annexes_iterates_present_tables_in_order() {
        let mut tables = TableSet::default();
        tables.set_annex(Annex::V, BracketTable::default());
        tables.set_annex(Annex::I, BracketTable::default());

        let present: Vec<Annex> = tables.annexes().map(|(annex, _)| annex).collect();

        assert_eq!(present, vec![Annex::I, Annex::V]);
    }

    #[test]
    fn cnae_rule_lookup_trims_code() {
        let tables: TableSet = serde_json::from_str(BUNDLE).unwrap();

        assert_eq!(
            tables.cnae_rule(" 6911-7/01 "),
            Some(CnaeRule::Fixed(ServiceAnnex::III))
        );
        assert_eq!(tables.cnae_rule("6201-5/01"), Some(CnaeRule::FactorR));
        assert_eq!(tables.cnae_rule("0000-0/00"), None);
    }

    #[test]
    fn is_empty_considers_tables_and_rules() {
        let mut tables = TableSet::default();
        assert!(tables.is_empty());

        tables.cnae_rules.insert("6201-5/01".to_string(), CnaeRule::FactorR);
        assert!(!tables.is_empty());

        let bundle: TableSet = serde_json::from_str(BUNDLE).unwrap();
        assert!(!bundle.is_empty());
    }

    #[test]
    fn annex_mut_exposes_the_slot() {
        let mut tables = TableSet::default();

        tables
            .annex_mut(Annex::II)
            .get_or_insert_with(BracketTable::default)
            .push(Bracket::new(dec!(180000), dec!(0.045), dec!(0)));

        assert_eq!(tables.annex(Annex::II).map(BracketTable::len), Some(1));
    }

    #[test]
    fn missing_irrf_table_is_an_error() {
        let tables = TableSet::default();

        assert_eq!(
            tables.require_irrf(),
            Err(CalculationError::MissingTable("irrf_table".to_string()))
        );
    }
}
