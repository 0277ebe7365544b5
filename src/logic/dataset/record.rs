//! Labelled Changeset - one line of the input changeset list
//!
//! The list is CSV: `changeset_id,harmful[,...]`. Extra columns are ignored
//! and an optional header row is skipped.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::logic::error::{ExtractError, ExtractResult};
use crate::logic::features::AttributeValue;

/// Ground-truth label, passed through unmodified
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Harmful {
    Harmful,
    Benign,
    #[default]
    Unknown,
}

impl Harmful {
    /// Only the exact texts `true` / `false` are recognised
    pub fn parse(value: &str) -> Self {
        match value {
            "true" => Harmful::Harmful,
            "false" => Harmful::Benign,
            _ => Harmful::Unknown,
        }
    }

    /// 1 / 0 / blank
    pub fn cell(&self) -> AttributeValue {
        match self {
            Harmful::Harmful => AttributeValue::Int(1),
            Harmful::Benign => AttributeValue::Int(0),
            Harmful::Unknown => AttributeValue::Blank,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelledChangeset {
    pub id: String,
    pub harmful: Harmful,
}

impl LabelledChangeset {
    pub fn new(id: impl Into<String>, harmful: Harmful) -> Self {
        Self { id: id.into(), harmful }
    }
}

const HEADER_IDS: &[&str] = &["changeset_id", "changeset", "id"];

/// Read the changeset list from a file
pub fn read_changeset_list(path: &Path) -> ExtractResult<Vec<LabelledChangeset>> {
    let text = fs::read_to_string(path)?;
    parse_changeset_list(&text)
}

/// Parse the changeset list. Blank lines are skipped; duplicates are kept
/// (deduplication belongs to the assembler).
pub fn parse_changeset_list(text: &str) -> ExtractResult<Vec<LabelledChangeset>> {
    let mut list = Vec::new();

    for record in split_csv_records(text)? {
        if record.is_blank() {
            continue;
        }
        let id = record.fields.first().map(|f| f.trim()).unwrap_or_default();

        if list.is_empty() && HEADER_IDS.iter().any(|h| id.eq_ignore_ascii_case(h)) {
            continue;
        }
        if id.is_empty() {
            return Err(ExtractError::ChangesetList {
                line: record.line,
                reason: "empty changeset id".to_string(),
            });
        }

        let harmful = record
            .fields
            .get(1)
            .map_or(Harmful::Unknown, |f| Harmful::parse(f.trim()));
        list.push(LabelledChangeset::new(id, harmful));
    }

    Ok(list)
}

/// One CSV record and the line it starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CsvRecord {
    pub line: usize,
    pub fields: Vec<String>,
}

impl CsvRecord {
    fn is_blank(&self) -> bool {
        self.fields.iter().all(|f| f.trim().is_empty())
    }
}

/// Split CSV text into records, honouring `"..."` quoting with `""` escapes.
/// Quoted fields may span `\n` and `\r\n` line breaks.
pub(crate) fn split_csv_records(text: &str) -> ExtractResult<Vec<CsvRecord>> {
    let mut records = Vec::new();
    let mut fields = Vec::new();
    let mut field = String::new();
    let mut chars = text.chars().peekable();
    let mut in_quotes = false;
    let mut line = 1;
    let mut record_line = 1;

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if field.trim().is_empty() => {
                field.clear();
                in_quotes = true;
            }
            (',', false) => fields.push(std::mem::take(&mut field)),
            ('\r', false) if chars.peek() == Some(&'\n') => {}
            ('\n', false) => {
                fields.push(std::mem::take(&mut field));
                records.push(CsvRecord {
                    line: record_line,
                    fields: std::mem::take(&mut fields),
                });
                line += 1;
                record_line = line;
            }
            ('\n', true) => {
                field.push(c);
                line += 1;
            }
            _ => field.push(c),
        }
    }

    if in_quotes {
        return Err(ExtractError::ChangesetList {
            line: record_line,
            reason: "unterminated quoted field".to_string(),
        });
    }
    if !field.is_empty() || !fields.is_empty() {
        fields.push(field);
        records.push(CsvRecord { line: record_line, fields });
    }
    Ok(records)
}
