//! Ruleset and rule persistence over the document store port.
//!
//! Rulesets live in the root `rulesets` collection; rules live in the
//! `rulesets/{id}/rules` sub-collection. Store errors are returned unchanged
//! so handlers decide how to surface them.

use std::sync::Arc;

use mockable::Clock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::ports::{
    CollectionPath, DocumentStore, DocumentStoreError, FieldFilter, StoredDocument,
};
use crate::domain::{
    Listing, ReorderDirection, Rule, RuleDraft, Ruleset, RulesetDraft, ruleset_hash,
};

/// Field used to scope rulesets to a Speckle project.
const PROJECT_ID_FIELD: &str = "projectId";

/// CRUD and ranking operations for rulesets and their rules.
#[derive(Clone)]
pub struct RulesetService {
    store: Arc<dyn DocumentStore>,
    clock: Arc<dyn Clock>,
}

impl RulesetService {
    /// Create a service backed by `store`, stamping writes with `clock`.
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// All rulesets in store order.
    pub async fn list_rulesets(&self) -> Result<Listing<Ruleset>, DocumentStoreError> {
        let collection = CollectionPath::rulesets();
        let documents = self.store.list(&collection, None).await?;
        Ok(decode_listing(&collection, documents, assign_ruleset_id))
    }

    /// Rulesets attached to one project.
    pub async fn list_project_rulesets(
        &self,
        project_id: &str,
    ) -> Result<Listing<Ruleset>, DocumentStoreError> {
        let collection = CollectionPath::rulesets();
        let filter = FieldFilter::eq(PROJECT_ID_FIELD, project_id);
        let documents = self.store.list(&collection, Some(filter)).await?;
        Ok(decode_listing(&collection, documents, assign_ruleset_id))
    }

    /// Fetch one ruleset; a missing id is a not-found error.
    pub async fn get_ruleset(&self, id: &str) -> Result<Ruleset, DocumentStoreError> {
        let collection = CollectionPath::rulesets();
        let document = self.store.get(&collection, id).await?;
        let mut ruleset: Ruleset = decode_document(&collection, document.fields, id)?;
        ruleset.id = document.id;
        Ok(ruleset)
    }

    /// Ruleset whose export hash equals `hash`, scanning every ruleset.
    pub async fn find_by_export_hash(
        &self,
        hash: &str,
    ) -> Result<Option<Ruleset>, DocumentStoreError> {
        let listing = self.list_rulesets().await?;
        Ok(listing
            .items
            .into_iter()
            .find(|ruleset| ruleset_hash(&ruleset.project_id, &ruleset.id) == hash))
    }

    /// Persist a new ruleset and return it with its generated id.
    pub async fn create_ruleset(&self, draft: &RulesetDraft) -> Result<Ruleset, DocumentStoreError> {
        let now = self.clock.utc();
        let mut ruleset = Ruleset {
            id: String::new(),
            name: draft.name().to_owned(),
            description: draft.description().to_owned(),
            project_id: draft.project_id().to_owned(),
            rules: Vec::new(),
            created_at: now,
            updated_at: now,
        };
        let collection = CollectionPath::rulesets();
        ruleset.id = self.store.add(&collection, encode(&ruleset)?).await?;
        debug!(ruleset_id = %ruleset.id, "ruleset created");
        Ok(ruleset)
    }

    /// Overwrite an existing ruleset, keeping its creation time.
    pub async fn update_ruleset(
        &self,
        id: &str,
        draft: &RulesetDraft,
    ) -> Result<Ruleset, DocumentStoreError> {
        let mut ruleset = self.get_ruleset(id).await?;
        ruleset.name = draft.name().to_owned();
        ruleset.description = draft.description().to_owned();
        ruleset.project_id = draft.project_id().to_owned();
        ruleset.updated_at = self.clock.utc();
        self.store
            .set(&CollectionPath::rulesets(), id, encode(&ruleset)?)
            .await?;
        Ok(ruleset)
    }

    /// Delete a ruleset document. Its rules sub-collection is left in place.
    pub async fn delete_ruleset(&self, id: &str) -> Result<(), DocumentStoreError> {
        self.store.delete(&CollectionPath::rulesets(), id).await
    }

    /// Rules of a ruleset ordered by rank, ties broken by id.
    pub async fn list_rules(&self, ruleset_id: &str) -> Result<Listing<Rule>, DocumentStoreError> {
        let collection = CollectionPath::rules(ruleset_id);
        let documents = self.store.list(&collection, None).await?;
        let mut listing = decode_listing(&collection, documents, assign_rule_id);
        sort_rules(&mut listing.items);
        Ok(listing)
    }

    /// Fetch one rule of a ruleset.
    pub async fn get_rule(&self, ruleset_id: &str, rule_id: &str) -> Result<Rule, DocumentStoreError> {
        let collection = CollectionPath::rules(ruleset_id);
        let document = self.store.get(&collection, rule_id).await?;
        let mut rule: Rule = decode_document(&collection, document.fields, rule_id)?;
        rule.id = document.id;
        Ok(rule)
    }

    /// Append a rule at the end of the ruleset's ranking.
    pub async fn create_rule(
        &self,
        ruleset_id: &str,
        draft: &RuleDraft,
    ) -> Result<Rule, DocumentStoreError> {
        let existing = self.list_rules(ruleset_id).await?;
        let order = existing
            .items
            .iter()
            .map(|rule| rule.order)
            .max()
            .unwrap_or(0)
            .saturating_add(1);
        let now = self.clock.utc();
        let mut rule = Rule {
            id: String::new(),
            name: draft.name().to_owned(),
            description: draft.description().to_owned(),
            conditions: draft.conditions().to_vec(),
            message: draft.message().to_owned(),
            order,
            created_at: now,
            updated_at: now,
        };
        let collection = CollectionPath::rules(ruleset_id);
        rule.id = self.store.add(&collection, encode(&rule)?).await?;
        debug!(ruleset_id, rule_id = %rule.id, order, "rule created");
        Ok(rule)
    }

    /// Overwrite an existing rule, keeping its creation time and rank.
    pub async fn update_rule(
        &self,
        ruleset_id: &str,
        rule_id: &str,
        draft: &RuleDraft,
    ) -> Result<Rule, DocumentStoreError> {
        let mut rule = self.get_rule(ruleset_id, rule_id).await?;
        rule.name = draft.name().to_owned();
        rule.description = draft.description().to_owned();
        rule.message = draft.message().to_owned();
        rule.conditions = draft.conditions().to_vec();
        rule.updated_at = self.clock.utc();
        self.store
            .set(&CollectionPath::rules(ruleset_id), rule_id, encode(&rule)?)
            .await?;
        Ok(rule)
    }

    /// Delete one rule; a missing id is a not-found error.
    pub async fn delete_rule(&self, ruleset_id: &str, rule_id: &str) -> Result<(), DocumentStoreError> {
        self.store
            .delete(&CollectionPath::rules(ruleset_id), rule_id)
            .await
    }

    /// Move a rule one slot up or down and return the resulting order.
    ///
    /// Moving past either end is a no-op. Otherwise every rule is renumbered
    /// 1..n and written back in one batch. The read and the batch write are
    /// not isolated from concurrent edits.
    pub async fn reorder_rule(
        &self,
        ruleset_id: &str,
        rule_id: &str,
        direction: ReorderDirection,
    ) -> Result<Vec<Rule>, DocumentStoreError> {
        let collection = CollectionPath::rules(ruleset_id);
        let mut rules = self.list_rules(ruleset_id).await?.items;
        let position = rules
            .iter()
            .position(|rule| rule.id == rule_id)
            .ok_or_else(|| DocumentStoreError::not_found(collection.as_str(), rule_id))?;

        let Some(neighbour) = neighbour_position(position, rules.len(), direction) else {
            debug!(ruleset_id, rule_id, ?direction, "rule already at boundary");
            return Ok(rules);
        };
        rules.swap(position, neighbour);

        let now = self.clock.utc();
        let mut documents = Vec::with_capacity(rules.len());
        for (rank, rule) in (1_i64..).zip(rules.iter_mut()) {
            rule.order = rank;
            rule.updated_at = now;
            documents.push(StoredDocument::new(rule.id.clone(), encode(&*rule)?));
        }
        self.store.set_all(&collection, documents).await?;
        debug!(ruleset_id, rule_id, ?direction, "rule reordered");
        Ok(rules)
    }
}

fn neighbour_position(position: usize, len: usize, direction: ReorderDirection) -> Option<usize> {
    match direction {
        ReorderDirection::Up => position.checked_sub(1),
        ReorderDirection::Down => position.checked_add(1).filter(|next| *next < len),
    }
}

fn sort_rules(rules: &mut [Rule]) {
    rules.sort_by(|left, right| {
        left.order
            .cmp(&right.order)
            .then_with(|| left.id.cmp(&right.id))
    });
}

fn assign_ruleset_id(ruleset: &mut Ruleset, id: String) {
    ruleset.id = id;
}

fn assign_rule_id(rule: &mut Rule, id: String) {
    rule.id = id;
}

fn decode_listing<T, F>(
    collection: &CollectionPath,
    documents: Vec<StoredDocument>,
    assign_id: F,
) -> Listing<T>
where
    T: DeserializeOwned,
    F: Fn(&mut T, String),
{
    let mut items = Vec::with_capacity(documents.len());
    let mut skipped = 0;
    for document in documents {
        match serde_json::from_value::<T>(document.fields) {
            Ok(mut item) => {
                assign_id(&mut item, document.id);
                items.push(item);
            }
            Err(error) => {
                skipped += 1;
                warn!(
                    collection = %collection,
                    document_id = %document.id,
                    %error,
                    "skipping undecodable document"
                );
            }
        }
    }
    if skipped > 0 {
        warn!(collection = %collection, skipped, "listing returned partial results");
    }
    Listing::new(items, skipped)
}

fn decode_document<T: DeserializeOwned>(
    collection: &CollectionPath,
    fields: Value,
    id: &str,
) -> Result<T, DocumentStoreError> {
    serde_json::from_value(fields).map_err(|error| {
        DocumentStoreError::query(format!("document {collection}/{id} is malformed: {error}"))
    })
}

fn encode<T: Serialize>(value: &T) -> Result<Value, DocumentStoreError> {
    serde_json::to_value(value)
        .map_err(|error| DocumentStoreError::query(format!("failed to encode document: {error}")))
}

#[cfg(test)]
#[path = "ruleset_service_tests.rs"]
mod tests;
