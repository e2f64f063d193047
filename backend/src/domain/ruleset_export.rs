//! Tab-separated export of a ruleset's rules.
//!
//! Exports are addressed by an unguessable hash of the project and ruleset
//! ids so they can be fetched without a session.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

use crate::domain::{Condition, Rule};

/// Column headings of the export.
pub const TSV_HEADER: [&str; 7] = [
    "Rule Number",
    "Logic",
    "Property Name",
    "Predicate",
    "Value",
    "Report Severity",
    "Message",
];

const SEVERITY: &str = "Error";

/// Failures while rendering an export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("failed to write tsv row: {0}")]
    Write(#[from] csv::Error),
    #[error("tsv output is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),
}

/// Public address of a ruleset export.
///
/// # Examples
/// ```
/// use model_checker::domain::ruleset_hash;
///
/// let hash = ruleset_hash("project", "ruleset");
/// assert_eq!(hash.len(), 43);
/// assert!(!hash.contains('='));
/// ```
pub fn ruleset_hash(project_id: &str, ruleset_id: &str) -> String {
    let digest = Sha256::digest(format!("{project_id}:{ruleset_id}").as_bytes());
    URL_SAFE_NO_PAD.encode(digest)
}

/// Attachment filename for a ruleset export, e.g. `fire_safety.tsv`.
pub fn export_filename(ruleset_name: &str) -> String {
    let stem = ruleset_name.trim();
    let stem = if stem.is_empty() { "ruleset" } else { stem };
    format!("{}.tsv", stem.replace(' ', "_").to_lowercase())
}

fn logic_for(index: usize, count: usize) -> &'static str {
    match index {
        0 => "WHERE",
        last if last + 1 == count => "CHECK",
        _ => "AND",
    }
}

/// Render rules, already in rank order, as TSV.
///
/// Rules without conditions are skipped and do not consume a rule number.
pub fn render_tsv(rules: &[Rule]) -> Result<String, ExportError> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .from_writer(Vec::new());
    writer.write_record(TSV_HEADER)?;

    let numbered = rules.iter().filter(|rule| !rule.conditions.is_empty());
    for (number, rule) in (1_usize..).zip(numbered) {
        write_rule(&mut writer, number, rule)?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|error| ExportError::Write(error.into_error().into()))?;
    Ok(String::from_utf8(bytes)?)
}

fn write_rule(
    writer: &mut csv::Writer<Vec<u8>>,
    number: usize,
    rule: &Rule,
) -> Result<(), ExportError> {
    let count = rule.conditions.len();
    for (index, condition) in rule.conditions.iter().enumerate() {
        let is_last = index + 1 == count;
        let Condition {
            property_name,
            predicate,
            value,
        } = condition;
        writer.write_record([
            if index == 0 { number.to_string() } else { String::new() },
            logic_for(index, count).to_owned(),
            property_name.clone(),
            predicate.clone(),
            value.to_string(),
            if is_last { SEVERITY.to_owned() } else { String::new() },
            if is_last { rule.message.clone() } else { String::new() },
        ])?;
    }
    Ok(())
}
