//! Tests for the ruleset service.

use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone, Utc};
use rstest::{fixture, rstest};
use serde_json::json;

use super::*;
use crate::domain::ports::MockDocumentStore;
use crate::domain::{Condition, ConditionValue, DraftValidationError};

struct FixtureClock {
    utc_now: DateTime<Utc>,
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc_now.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.utc_now
    }
}

fn created_at() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0)
        .single()
        .expect("valid timestamp")
}

#[fixture]
fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 30, 0)
        .single()
        .expect("valid timestamp")
}

fn service(store: MockDocumentStore, now: DateTime<Utc>) -> RulesetService {
    RulesetService::new(Arc::new(store), Arc::new(FixtureClock { utc_now: now }))
}

fn ruleset_fields(name: &str, project_id: &str) -> Value {
    json!({
        "name": name,
        "description": "",
        "projectId": project_id,
        "rules": [],
        "createdAt": created_at(),
        "updatedAt": created_at(),
    })
}

fn rule_document(id: &str, order: i64) -> StoredDocument {
    StoredDocument::new(
        id,
        json!({
            "id": id,
            "name": format!("rule {id}"),
            "description": "",
            "conditions": [{"propertyName": "Height", "predicate": "greater than", "value": "3"}],
            "message": "too low",
            "order": order,
            "createdAt": created_at(),
            "updatedAt": created_at(),
        }),
    )
}

fn draft(name: &str) -> RulesetDraft {
    RulesetDraft::new(name, "Checks for walls", "project-1").expect("valid draft")
}

fn rule_draft() -> Result<RuleDraft, DraftValidationError> {
    RuleDraft::new(
        "Fire rating",
        "",
        "Doors need a rating",
        vec![Condition::new("FireRating", "exists", ConditionValue::Null)],
    )
}

fn ids(rules: &[Rule]) -> Vec<&str> {
    rules.iter().map(|rule| rule.id.as_str()).collect()
}

#[rstest]
#[tokio::test]
async fn listing_skips_undecodable_documents(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store.expect_list().times(1).return_once(|_, _| {
        Ok(vec![
            StoredDocument::new("a", ruleset_fields("Walls", "p1")),
            StoredDocument::new("b", json!({"name": 42})),
            StoredDocument::new("c", ruleset_fields("Doors", "p2")),
        ])
    });

    let listing = service(store, now).list_rulesets().await.expect("listing");

    assert_eq!(listing.skipped, 1);
    let names: Vec<_> = listing.items.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, ["Walls", "Doors"]);
    assert_eq!(listing.items.first().map(|r| r.id.as_str()), Some("a"));
}

#[rstest]
#[tokio::test]
async fn listing_surfaces_query_failures(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store
        .expect_list()
        .return_once(|_, _| Err(DocumentStoreError::connection("refused")));

    let error = service(store, now)
        .list_rulesets()
        .await
        .expect_err("store failure");
    assert_eq!(error, DocumentStoreError::connection("refused"));
}

#[rstest]
#[tokio::test]
async fn project_listing_filters_on_project_id(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store
        .expect_list()
        .withf(|collection, filter| {
            collection == &CollectionPath::rulesets()
                && filter.as_ref() == Some(&FieldFilter::eq("projectId", "p1"))
        })
        .return_once(|_, _| Ok(vec![StoredDocument::new("a", ruleset_fields("Walls", "p1"))]));

    let listing = service(store, now)
        .list_project_rulesets("p1")
        .await
        .expect("listing");
    assert_eq!(listing.items.len(), 1);
}

#[rstest]
#[tokio::test]
async fn create_assigns_id_and_matching_timestamps(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store
        .expect_add()
        .withf(|collection, fields| {
            collection == &CollectionPath::rulesets() && fields["name"] == json!("Walls")
        })
        .return_once(|_, _| Ok("generated01".to_owned()));

    let ruleset = service(store, now)
        .create_ruleset(&draft("Walls"))
        .await
        .expect("created");

    assert_eq!(ruleset.id, "generated01");
    assert_eq!(ruleset.created_at, now);
    assert_eq!(ruleset.created_at, ruleset.updated_at);
    assert_eq!(ruleset.project_id, "project-1");
}

#[rstest]
#[tokio::test]
async fn update_preserves_created_at(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store
        .expect_get()
        .return_once(|_, id| Ok(StoredDocument::new(id, ruleset_fields("Old", "project-1"))));
    store
        .expect_set()
        .withf(move |_, id, fields| {
            id == "r1"
                && fields["name"] == json!("Renamed")
                && fields["createdAt"] == json!(created_at())
                && fields["updatedAt"] == json!(now)
        })
        .times(1)
        .return_once(|_, _, _| Ok(()));

    let ruleset = service(store, now)
        .update_ruleset("r1", &draft("Renamed"))
        .await
        .expect("updated");

    assert_eq!(ruleset.created_at, created_at());
    assert!(ruleset.updated_at > ruleset.created_at);
}

#[rstest]
#[tokio::test]
async fn update_of_missing_ruleset_is_not_found(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store
        .expect_get()
        .return_once(|_, id| Err(DocumentStoreError::not_found("rulesets", id)));
    store.expect_set().never();

    let error = service(store, now)
        .update_ruleset("missing", &draft("Walls"))
        .await
        .expect_err("missing ruleset");
    assert!(error.is_not_found());
}

#[rstest]
#[tokio::test]
async fn delete_of_missing_rule_surfaces_store_error(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store
        .expect_delete()
        .withf(|collection, id| collection == &CollectionPath::rules("r1") && id == "nope")
        .return_once(|collection, id| Err(DocumentStoreError::not_found(collection.as_str(), id)));

    let error = service(store, now)
        .delete_rule("r1", "nope")
        .await
        .expect_err("missing rule");
    assert!(error.is_not_found());
}

#[rstest]
#[tokio::test]
async fn rules_are_sorted_by_rank_then_id(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store.expect_list().return_once(|_, _| {
        Ok(vec![
            rule_document("a", 3),
            rule_document("b", 1),
            rule_document("c", 1),
            rule_document("d", 2),
        ])
    });

    let listing = service(store, now).list_rules("r1").await.expect("rules");
    assert_eq!(ids(&listing.items), ["b", "c", "d", "a"]);
}

#[rstest]
#[tokio::test]
async fn new_rules_are_ranked_last(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store
        .expect_list()
        .return_once(|_, _| Ok(vec![rule_document("a", 1), rule_document("b", 4)]));
    store
        .expect_add()
        .withf(|collection, fields| {
            collection == &CollectionPath::rules("r1") && fields["order"] == json!(5)
        })
        .return_once(|_, _| Ok("new-rule".to_owned()));

    let rule = service(store, now)
        .create_rule("r1", &rule_draft().expect("draft"))
        .await
        .expect("created");
    assert_eq!(rule.order, 5);
    assert_eq!(rule.id, "new-rule");
}

#[rstest]
#[case::first_up("a", ReorderDirection::Up)]
#[case::last_down("c", ReorderDirection::Down)]
#[tokio::test]
async fn reorder_at_boundary_is_a_no_op(
    now: DateTime<Utc>,
    #[case] rule_id: &str,
    #[case] direction: ReorderDirection,
) {
    let mut store = MockDocumentStore::new();
    store.expect_list().return_once(|_, _| {
        Ok(vec![
            rule_document("a", 1),
            rule_document("b", 2),
            rule_document("c", 3),
        ])
    });
    store.expect_set_all().never();

    let rules = service(store, now)
        .reorder_rule("r1", rule_id, direction)
        .await
        .expect("no-op");
    assert_eq!(ids(&rules), ["a", "b", "c"]);
}

#[rstest]
#[tokio::test]
async fn reorder_up_swaps_with_predecessor_and_renumbers(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store.expect_list().return_once(|_, _| {
        Ok(vec![
            rule_document("a", 1),
            rule_document("b", 5),
            rule_document("c", 9),
        ])
    });
    store
        .expect_set_all()
        .withf(|collection, documents| {
            let written: Vec<_> = documents
                .iter()
                .map(|doc| (doc.id.as_str(), doc.fields["order"].clone()))
                .collect();
            collection == &CollectionPath::rules("r1")
                && written == [("b", json!(1)), ("a", json!(2)), ("c", json!(3))]
        })
        .times(1)
        .return_once(|_, _| Ok(()));

    let rules = service(store, now)
        .reorder_rule("r1", "b", ReorderDirection::Up)
        .await
        .expect("reordered");
    assert_eq!(ids(&rules), ["b", "a", "c"]);
    assert!(rules.iter().all(|rule| rule.updated_at == now));
}

#[rstest]
#[tokio::test]
async fn reorder_of_unknown_rule_is_not_found(now: DateTime<Utc>) {
    let mut store = MockDocumentStore::new();
    store
        .expect_list()
        .return_once(|_, _| Ok(vec![rule_document("a", 1)]));
    store.expect_set_all().never();

    let error = service(store, now)
        .reorder_rule("r1", "zzz", ReorderDirection::Down)
        .await
        .expect_err("unknown rule");
    assert!(error.is_not_found());
}
