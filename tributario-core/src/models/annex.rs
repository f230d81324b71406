use std::fmt;

use serde::{Deserialize, Serialize};

/// Simples Nacional bracket-table category ("Anexo").
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Annex {
    I,
    II,
    III,
    IV,
    V,
}

impl Annex {
    /// Every annex, in canonical order.
    pub const ALL: [Annex; 5] = [Annex::I, Annex::II, Annex::III, Annex::IV, Annex::V];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::II => "II",
            Self::III => "III",
            Self::IV => "IV",
            Self::V => "V",
        }
    }

    /// Key of this annex inside a table bundle (`anexo_III`).
    pub fn table_key(&self) -> &'static str {
        match self {
            Self::I => "anexo_I",
            Self::II => "anexo_II",
            Self::III => "anexo_III",
            Self::IV => "anexo_IV",
            Self::V => "anexo_V",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" => Some(Self::I),
            "II" => Some(Self::II),
            "III" => Some(Self::III),
            "IV" => Some(Self::IV),
            "V" => Some(Self::V),
            _ => None,
        }
    }

    /// Derives the annex from a bundle key by its suffix (`anexo_IV` → `IV`).
    pub fn from_table_key(key: &str) -> Option<Self> {
        key.split_once('_').and_then(|(_, suffix)| Self::parse(suffix))
    }
}

impl fmt::Display for Annex {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// The two annexes the Fator R rule chooses between.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceAnnex {
    III,
    V,
}

impl ServiceAnnex {
    /// Parses `"III"` or `"V"`; any other annex is not a Fator R outcome.
    pub fn parse(s: &str) -> Option<Self> {
        match Annex::parse(s)? {
            Annex::III => Some(Self::III),
            Annex::V => Some(Self::V),
            _ => None,
        }
    }

    pub fn annex(self) -> Annex {
        match self {
            Self::III => Annex::III,
            Self::V => Annex::V,
        }
    }
}

impl From<ServiceAnnex> for Annex {
    fn from(annex: ServiceAnnex) -> Self {
        annex.annex()
    }
}

impl fmt::Display for ServiceAnnex {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.pad(self.annex().as_str())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_roman_numerals_case_insensitively() {
        assert_eq!(Annex::parse("iii"), Some(Annex::III));
        assert_eq!(Annex::parse(" IV "), Some(Annex::IV));
        assert_eq!(Annex::parse("VI"), None);
    }

    #[test]
    fn from_table_key_uses_suffix() {
        assert_eq!(Annex::from_table_key("anexo_I"), Some(Annex::I));
        assert_eq!(Annex::from_table_key("anexo_V"), Some(Annex::V));
        assert_eq!(Annex::from_table_key("irrf_table"), None);
    }

    #[test]
    fn table_key_round_trips_through_from_table_key() {
        for annex in Annex::ALL {
            assert_eq!(Annex::from_table_key(annex.table_key()), Some(annex));
        }
    }

    #[test]
    fn service_annex_rejects_non_factor_r_annexes() {
        assert_eq!(ServiceAnnex::parse("III"), Some(ServiceAnnex::III));
        assert_eq!(ServiceAnnex::parse("v"), Some(ServiceAnnex::V));
        assert_eq!(ServiceAnnex::parse("IV"), None);
        assert_eq!(ServiceAnnex::parse(""), None);
    }
}
