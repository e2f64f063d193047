//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `migrations/` exactly.

diesel::table! {
    /// JSON documents addressed by collection path and id.
    documents (collection, id) {
        /// Collection path, e.g. `rulesets` or `rulesets/{id}/rules`.
        collection -> Text,
        /// Document id, unique within its collection.
        id -> Text,
        /// Document fields as stored by the domain.
        body -> Jsonb,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}
