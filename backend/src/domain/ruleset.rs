//! Rulesets, rules and their conditions.
//!
//! Conditions are stored verbatim and never evaluated here; the only
//! structural logic is rule ranking (see [`ReorderDirection`]).

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A named, project-scoped collection of rules.
///
/// `rules` is carried for compatibility with stored documents but is never
/// populated from the per-ruleset sub-collection; read rules through the
/// ruleset service instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ruleset {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub rules: Vec<Rule>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named check composed of conditions plus a display message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub conditions: Vec<Condition>,
    #[serde(default)]
    pub message: String,
    /// 1-based rank within the ruleset. Legacy documents without a rank sort first.
    #[serde(default)]
    pub order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A single property predicate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase", default)]
pub struct Condition {
    pub property_name: String,
    pub predicate: String,
    /// String, number, boolean or null.
    #[schema(value_type = Object)]
    pub value: ConditionValue,
}

impl Condition {
    /// Build a condition from raw parts.
    pub fn new(
        property_name: impl Into<String>,
        predicate: impl Into<String>,
        value: ConditionValue,
    ) -> Self {
        Self {
            property_name: property_name.into(),
            predicate: predicate.into(),
            value,
        }
    }
}

/// Scalar value compared by a condition.
///
/// Stored as the matching JSON scalar so numbers and booleans round-trip
/// without being coerced to strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    Text(String),
}

impl fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => Ok(()),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(value) => f.write_str(value),
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

/// Drop conditions whose property name is blank.
///
/// # Examples
/// ```
/// use model_checker::domain::{clean_conditions, Condition, ConditionValue};
///
/// let cleaned = clean_conditions(vec![
///     Condition::new("Height", "greater than", ConditionValue::from("3")),
///     Condition::new("  ", "equal to", ConditionValue::Null),
/// ]);
/// assert_eq!(cleaned.len(), 1);
/// ```
pub fn clean_conditions(conditions: Vec<Condition>) -> Vec<Condition> {
    conditions
        .into_iter()
        .filter(|condition| !condition.property_name.trim().is_empty())
        .collect()
}

/// Validation errors raised for submitted ruleset or rule content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DraftValidationError {
    /// The name was blank.
    #[error("name must not be empty")]
    EmptyName,
}

/// User-submitted ruleset content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RulesetDraft {
    name: String,
    description: String,
    project_id: String,
}

impl RulesetDraft {
    /// Validate raw form input.
    ///
    /// # Errors
    ///
    /// Returns [`DraftValidationError::EmptyName`] when `name` is blank.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        project_id: impl Into<String>,
    ) -> Result<Self, DraftValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DraftValidationError::EmptyName);
        }
        Ok(Self {
            name: name.trim().to_owned(),
            description: description.into(),
            project_id: project_id.into().trim().to_owned(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }
}

/// User-submitted rule content.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleDraft {
    name: String,
    description: String,
    message: String,
    conditions: Vec<Condition>,
}

impl RuleDraft {
    /// Validate raw form input, dropping blank conditions.
    ///
    /// # Errors
    ///
    /// Returns [`DraftValidationError::EmptyName`] when `name` is blank.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        message: impl Into<String>,
        conditions: Vec<Condition>,
    ) -> Result<Self, DraftValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DraftValidationError::EmptyName);
        }
        Ok(Self {
            name: name.trim().to_owned(),
            description: description.into(),
            message: message.into(),
            conditions: clean_conditions(conditions),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }
}

/// Direction for moving a rule one slot within its ruleset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReorderDirection {
    Up,
    Down,
}

/// Raised when a direction string is neither `up` nor `down`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid reorder direction '{0}'; expected up|down")]
pub struct InvalidDirection(pub String);

impl FromStr for ReorderDirection {
    type Err = InvalidDirection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(InvalidDirection(s.to_owned())),
        }
    }
}

/// Best-effort listing: decodable items plus the number of documents skipped.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub skipped: usize,
}

impl<T> Listing<T> {
    pub fn new(items: Vec<T>, skipped: usize) -> Self {
        Self { items, skipped }
    }
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self::new(Vec::new(), 0)
    }
}
