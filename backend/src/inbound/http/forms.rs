//! Decoding of the ruleset and rule HTML forms.
//!
//! Rule forms carry an indexed list of conditions as
//! `conditions[{i}][propertyName|predicate|value]`. Indices need not be
//! contiguous; conditions are kept in ascending index order.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::domain::{Condition, ConditionValue, DraftValidationError, RuleDraft, RulesetDraft};

/// Raised when a submitted form cannot become a draft.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error(transparent)]
    Draft(#[from] DraftValidationError),
    #[error("malformed condition field '{0}'")]
    MalformedCondition(String),
}

/// Body of `POST /rulesets` and `POST /rulesets/{id}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RulesetForm {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_id: String,
}

impl TryFrom<RulesetForm> for RulesetDraft {
    type Error = FormError;

    fn try_from(form: RulesetForm) -> Result<Self, Self::Error> {
        Ok(RulesetDraft::new(form.name, form.description, form.project_id)?)
    }
}

#[derive(Default)]
struct ConditionFields {
    property_name: String,
    predicate: String,
    value: String,
}

/// Build a rule draft from raw urlencoded pairs.
///
/// Unknown top-level fields are ignored. Condition values are kept as text.
///
/// # Errors
///
/// Returns [`FormError::MalformedCondition`] for a `conditions` key that
/// does not match the indexed shape, and [`FormError::Draft`] when the name
/// is missing or blank.
pub fn rule_draft_from_pairs(pairs: Vec<(String, String)>) -> Result<RuleDraft, FormError> {
    let mut name = String::new();
    let mut description = String::new();
    let mut message = String::new();
    let mut conditions: BTreeMap<usize, ConditionFields> = BTreeMap::new();

    for (key, value) in pairs {
        match key.as_str() {
            "name" => name = value,
            "description" => description = value,
            "message" => message = value,
            other if other.starts_with("conditions") => {
                let (index, field) = parse_condition_key(other)
                    .ok_or_else(|| FormError::MalformedCondition(other.to_owned()))?;
                let entry = conditions.entry(index).or_default();
                match field {
                    "propertyName" => entry.property_name = value,
                    "predicate" => entry.predicate = value,
                    "value" => entry.value = value,
                    _ => return Err(FormError::MalformedCondition(other.to_owned())),
                }
            }
            _ => {}
        }
    }

    let conditions = conditions
        .into_values()
        .map(|fields| {
            Condition::new(
                fields.property_name,
                fields.predicate,
                ConditionValue::Text(fields.value),
            )
        })
        .collect();
    Ok(RuleDraft::new(name, description, message, conditions)?)
}

fn parse_condition_key(key: &str) -> Option<(usize, &str)> {
    let rest = key.strip_prefix("conditions[")?;
    let (index, rest) = rest.split_once("][")?;
    let field = rest.strip_suffix(']')?;
    Some((index.parse().ok()?, field))
}
