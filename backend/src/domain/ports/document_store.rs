//! Port abstraction for the document database holding rulesets, rules and
//! user tokens.
//!
//! The store is primitive: documents are JSON objects addressed
//! by a collection path and an id. Typed mapping lives in the domain services.

use std::fmt;

use async_trait::async_trait;
use rand::Rng;
use rand::distributions::Alphanumeric;
use serde_json::Value;

use super::define_port_error;

/// Length of store-generated document ids.
pub const DOCUMENT_ID_LEN: usize = 20;

const RULESETS: &str = "rulesets";
const RULES: &str = "rules";
const USER_TOKENS: &str = "userTokens";

define_port_error! {
    /// Errors raised by document store adapters.
    pub enum DocumentStoreError {
        /// No document exists at the given address.
        NotFound { collection: String, id: String } => "document {collection}/{id} not found",
        /// Store connection could not be established.
        Connection { message: String } => "document store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "document store query failed: {message}",
    }
}

impl DocumentStoreError {
    /// Whether the error reports a missing document.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Address of a collection, e.g. `rulesets` or `rulesets/{id}/rules`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionPath(String);

impl CollectionPath {
    /// Root collection of rulesets.
    pub fn rulesets() -> Self {
        Self(RULESETS.to_owned())
    }

    /// Rules nested under one ruleset.
    pub fn rules(ruleset_id: &str) -> Self {
        Self(format!("{RULESETS}/{ruleset_id}/{RULES}"))
    }

    /// Stored bearer tokens keyed by user id.
    pub fn user_tokens() -> Self {
        Self(USER_TOKENS.to_owned())
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for CollectionPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A document as returned by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: String,
    pub fields: Value,
}

impl StoredDocument {
    pub fn new(id: impl Into<String>, fields: Value) -> Self {
        Self {
            id: id.into(),
            fields,
        }
    }
}

/// Single-field equality filter applied by [`DocumentStore::list`].
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether a document's fields satisfy the filter.
    pub fn matches(&self, fields: &Value) -> bool {
        fields.get(&self.field) == Some(&self.value)
    }
}

/// Generate a random alphanumeric document id.
pub fn generate_document_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(DOCUMENT_ID_LEN)
        .map(char::from)
        .collect()
}

/// Copy the document id into the `id` field of an object body.
pub fn with_mirrored_id(mut fields: Value, id: &str) -> Value {
    if let Value::Object(map) = &mut fields {
        map.insert("id".to_owned(), Value::String(id.to_owned()));
    }
    fields
}

/// Port for document persistence.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch one document. Missing documents are [`DocumentStoreError::NotFound`].
    async fn get(
        &self,
        collection: &CollectionPath,
        id: &str,
    ) -> Result<StoredDocument, DocumentStoreError>;

    /// Insert a document under a store-generated id and return that id.
    async fn add(
        &self,
        collection: &CollectionPath,
        fields: Value,
    ) -> Result<String, DocumentStoreError>;

    /// Create or overwrite the document at `id`.
    async fn set(
        &self,
        collection: &CollectionPath,
        id: &str,
        fields: Value,
    ) -> Result<(), DocumentStoreError>;

    /// Delete the document at `id`. Missing documents are an error.
    async fn delete(&self, collection: &CollectionPath, id: &str) -> Result<(), DocumentStoreError>;

    /// List documents in id order, optionally filtered on one field.
    async fn list(
        &self,
        collection: &CollectionPath,
        filter: Option<FieldFilter>,
    ) -> Result<Vec<StoredDocument>, DocumentStoreError>;

    /// Overwrite several documents in one batch.
    async fn set_all(
        &self,
        collection: &CollectionPath,
        documents: Vec<StoredDocument>,
    ) -> Result<(), DocumentStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn generated_ids_are_alphanumeric() {
        let id = generate_document_id();
        assert_eq!(id.len(), DOCUMENT_ID_LEN);
        assert!(id.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[rstest]
    fn generated_ids_differ() {
        assert_ne!(generate_document_id(), generate_document_id());
    }

    #[rstest]
    #[case::rulesets(CollectionPath::rulesets(), "rulesets")]
    #[case::rules(CollectionPath::rules("abc"), "rulesets/abc/rules")]
    #[case::tokens(CollectionPath::user_tokens(), "userTokens")]
    fn collection_paths_render(#[case] path: CollectionPath, #[case] expected: &str) {
        assert_eq!(path.to_string(), expected);
    }

    #[rstest]
    fn mirrors_id_into_objects_only() {
        assert_eq!(
            with_mirrored_id(json!({"name": "a"}), "x1"),
            json!({"name": "a", "id": "x1"})
        );
        assert_eq!(with_mirrored_id(json!(3), "x1"), json!(3));
    }

    #[rstest]
    #[case(json!({"projectId": "p1"}), true)]
    #[case(json!({"projectId": "p2"}), false)]
    #[case(json!({}), false)]
    fn filter_matches_on_equality(#[case] fields: Value, #[case] expected: bool) {
        assert_eq!(FieldFilter::eq("projectId", "p1").matches(&fields), expected);
    }
}
