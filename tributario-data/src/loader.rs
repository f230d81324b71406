use std::io::Read;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use tributario_core::{Annex, Bracket, BracketTable, IRRF_TABLE_KEY, SourceError, TableSet};

/// Errors that can occur when loading a table bundle.
#[derive(Debug, Error)]
pub enum TableLoadError {
    #[error("JSON parse error: {0}")]
    Json(String),

    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("Unknown table '{0}' (expected anexo_I..anexo_V or irrf_table)")]
    UnknownTable(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("HTTP error: {0}")]
    Http(String),
}

impl From<csv::Error> for TableLoadError {
    fn from(err: csv::Error) -> Self {
        TableLoadError::CsvParse(err.to_string())
    }
}

impl From<serde_json::Error> for TableLoadError {
    fn from(err: serde_json::Error) -> Self {
        TableLoadError::Json(err.to_string())
    }
}

impl From<std::io::Error> for TableLoadError {
    fn from(err: std::io::Error) -> Self {
        TableLoadError::Io(err.to_string())
    }
}

impl From<reqwest::Error> for TableLoadError {
    fn from(err: reqwest::Error) -> Self {
        TableLoadError::Http(err.to_string())
    }
}

impl From<TableLoadError> for SourceError {
    fn from(err: TableLoadError) -> Self {
        match err {
            TableLoadError::Io(msg) => SourceError::Read(msg),
            TableLoadError::Http(msg) => SourceError::Connection(msg),
            other => SourceError::Invalid(other.to_string()),
        }
    }
}

/// Serialization format of a table bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Json,
    Csv,
}

impl TableFormat {
    /// `.csv` files are CSV; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// A single record from a table bundle CSV file.
///
/// - `table`: `anexo_I` .. `anexo_V` or `irrf_table`
/// - `upper_bound`: upper bound of the bracket (`max` is accepted)
/// - `rate`: rate as a fraction, e.g. 0.06 (`aliquota` is accepted)
/// - `deduction`: amount deducted, empty for zero (`deduz`/`deducao` are accepted)
///
/// Rows of one table are in bracket order.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TableBracketRecord {
    pub table: String,

    #[serde(alias = "max")]
    pub upper_bound: Decimal,

    #[serde(alias = "aliquota")]
    pub rate: Decimal,

    #[serde(
        default,
        alias = "deduz",
        alias = "deducao",
        deserialize_with = "deserialize_decimal_or_zero"
    )]
    pub deduction: Decimal,
}

fn deserialize_decimal_or_zero<'de, D>(deserializer: D) -> Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(Decimal::ZERO),
        Some(s) => s.trim().parse::<Decimal>().map_err(serde::de::Error::custom),
        None => Ok(Decimal::ZERO),
    }
}

/// Parser for table bundles in JSON or CSV form.
pub struct TableLoader;

impl TableLoader {
    /// Parse a bundle in the given format.
    pub fn parse<R: Read>(
        reader: R,
        format: TableFormat,
    ) -> Result<TableSet, TableLoadError> {
        match format {
            TableFormat::Json => Self::parse_json(reader),
            TableFormat::Csv => Self::parse_csv(reader),
        }
    }

    /// Parse a JSON bundle.
    ///
    /// The document must be an object; unknown keys are ignored.
    pub fn parse_json<R: Read>(reader: R) -> Result<TableSet, TableLoadError> {
        let value: serde_json::Value = serde_json::from_reader(reader)?;
        if !value.is_object() {
            return Err(TableLoadError::Json(
                "expected a JSON object at the top level".to_string(),
            ));
        }
        let tables: TableSet = serde_json::from_value(value)?;

        debug!(
            annexes = tables.annexes().count(),
            has_irrf = tables.irrf_table.is_some(),
            cnae_rules = tables.cnae_rules.len(),
            "parsed JSON table bundle"
        );

        Ok(tables)
    }

    /// Parse bracket records from a CSV reader.
    pub fn parse_records<R: Read>(reader: R) -> Result<Vec<TableBracketRecord>, TableLoadError> {
        let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: TableBracketRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Parse a CSV bundle.
    ///
    /// CSV bundles carry brackets only; `cnae_rules` stays empty.
    pub fn parse_csv<R: Read>(reader: R) -> Result<TableSet, TableLoadError> {
        let records = Self::parse_records(reader)?;
        let count = records.len();
        let tables = Self::assemble(records)?;

        debug!(records = count, "parsed CSV table bundle");

        Ok(tables)
    }

    /// Groups records into a table set, keeping row order within each table.
    pub fn assemble(records: Vec<TableBracketRecord>) -> Result<TableSet, TableLoadError> {
        let mut tables = TableSet::default();

        for record in records {
            let key = record.table.trim();
            let slot = if key == IRRF_TABLE_KEY {
                &mut tables.irrf_table
            } else {
                match key.strip_prefix("anexo_").and_then(Annex::parse) {
                    Some(annex) => tables.annex_mut(annex),
                    None => return Err(TableLoadError::UnknownTable(key.to_string())),
                }
            };
            slot.get_or_insert_with(BracketTable::default).push(Bracket::new(
                record.upper_bound,
                record.rate,
                record.deduction,
            ));
        }

        Ok(tables)
    }
}
