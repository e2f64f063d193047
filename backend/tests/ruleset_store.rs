//! Ruleset persistence behaviour over the in-memory document store.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};
use mockable::MockClock;
use rstest::{fixture, rstest};
use serde_json::json;

use model_checker::domain::ports::{CollectionPath, DocumentStore};
use model_checker::domain::{
    Condition, ConditionValue, ReorderDirection, RuleDraft, RulesetDraft, RulesetService,
};
use model_checker::outbound::persistence::MemoryDocumentStore;

fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0)
        .single()
        .expect("valid timestamp")
}

/// Clock advancing one second per reading.
fn stepping_clock() -> MockClock {
    let ticks = Arc::new(AtomicI64::new(0));
    let mut clock = MockClock::new();
    clock
        .expect_utc()
        .returning(move || epoch() + Duration::seconds(ticks.fetch_add(1, Ordering::SeqCst)));
    clock
}

struct Fixture {
    store: Arc<MemoryDocumentStore>,
    service: RulesetService,
}

#[fixture]
fn fixture() -> Fixture {
    let store = Arc::new(MemoryDocumentStore::new());
    let service = RulesetService::new(store.clone(), Arc::new(stepping_clock()));
    Fixture { store, service }
}

fn rule_draft(name: &str) -> RuleDraft {
    let conditions = vec![Condition::new(
        "Category",
        "equal to",
        ConditionValue::from(name),
    )];
    RuleDraft::new(name, "", format!("{name} failed"), conditions).expect("rule draft")
}

#[rstest]
#[tokio::test]
async fn update_keeps_creation_time_and_advances_update_time(fixture: Fixture) {
    let draft = RulesetDraft::new("Acoustics", "", "p-7").expect("draft");
    let created = fixture.service.create_ruleset(&draft).await.expect("create");
    assert!(!created.id.is_empty());
    assert_eq!(created.created_at, created.updated_at);

    let renamed = RulesetDraft::new("Acoustics v2", "tightened", "p-7").expect("draft");
    let updated = fixture
        .service
        .update_ruleset(&created.id, &renamed)
        .await
        .expect("update");
    assert_eq!(updated.created_at, created.created_at);
    assert!(updated.updated_at > created.updated_at);

    let fetched = fixture.service.get_ruleset(&created.id).await.expect("get");
    assert_eq!(fetched.name, "Acoustics v2");
    assert_eq!(fetched.description, "tightened");
    assert_eq!(fetched.created_at, created.created_at);
}

#[rstest]
#[tokio::test]
async fn undecodable_rulesets_are_skipped_and_counted(fixture: Fixture) {
    for name in ["Fire", "Egress"] {
        let draft = RulesetDraft::new(name, "", "p-1").expect("draft");
        fixture.service.create_ruleset(&draft).await.expect("create");
    }
    fixture
        .store
        .set(&CollectionPath::rulesets(), "broken", json!({ "name": 42 }))
        .await
        .expect("raw write");

    let listing = fixture.service.list_rulesets().await.expect("listing");
    assert_eq!(listing.items.len(), 2);
    assert_eq!(listing.skipped, 1);
}

#[rstest]
#[tokio::test]
async fn project_listing_only_returns_matching_rulesets(fixture: Fixture) {
    for (name, project) in [("Fire", "p-1"), ("Egress", "p-2"), ("Doors", "p-1")] {
        let draft = RulesetDraft::new(name, "", project).expect("draft");
        fixture.service.create_ruleset(&draft).await.expect("create");
    }

    let listing = fixture
        .service
        .list_project_rulesets("p-1")
        .await
        .expect("listing");
    let mut names: Vec<_> = listing.items.iter().map(|r| r.name.clone()).collect();
    names.sort();
    assert_eq!(names, ["Doors", "Fire"]);
}

#[rstest]
#[case::first_up(0, ReorderDirection::Up, ["A", "B", "C"])]
#[case::last_down(2, ReorderDirection::Down, ["A", "B", "C"])]
#[case::middle_up(1, ReorderDirection::Up, ["B", "A", "C"])]
#[case::middle_down(1, ReorderDirection::Down, ["A", "C", "B"])]
#[tokio::test]
async fn reorder_moves_one_slot_within_bounds(
    fixture: Fixture,
    #[case] index: usize,
    #[case] direction: ReorderDirection,
    #[case] expected: [&str; 3],
) {
    let ruleset = fixture
        .service
        .create_ruleset(&RulesetDraft::new("Ranked", "", "p-1").expect("draft"))
        .await
        .expect("ruleset");
    let mut ids = Vec::new();
    for name in ["A", "B", "C"] {
        let rule = fixture
            .service
            .create_rule(&ruleset.id, &rule_draft(name))
            .await
            .expect("rule");
        ids.push(rule.id);
    }

    fixture
        .service
        .reorder_rule(&ruleset.id, &ids[index], direction)
        .await
        .expect("reorder");

    let listed = fixture.service.list_rules(&ruleset.id).await.expect("rules");
    let names: Vec<_> = listed.items.iter().map(|rule| rule.name.as_str()).collect();
    assert_eq!(names, expected);
    let orders: Vec<_> = listed.items.iter().map(|rule| rule.order).collect();
    assert_eq!(orders, [1, 2, 3]);
}

#[rstest]
#[tokio::test]
async fn legacy_rules_without_rank_sort_first(fixture: Fixture) {
    let ruleset = fixture
        .service
        .create_ruleset(&RulesetDraft::new("Legacy", "", "p-1").expect("draft"))
        .await
        .expect("ruleset");
    fixture
        .service
        .create_rule(&ruleset.id, &rule_draft("Ranked"))
        .await
        .expect("rule");
    let stamp = epoch().to_rfc3339();
    fixture
        .store
        .set(
            &CollectionPath::rules(&ruleset.id),
            "legacy",
            json!({
                "name": "Unranked",
                "conditions": [],
                "createdAt": stamp,
                "updatedAt": stamp,
            }),
        )
        .await
        .expect("raw write");

    let listed = fixture.service.list_rules(&ruleset.id).await.expect("rules");
    let names: Vec<_> = listed.items.iter().map(|rule| rule.name.as_str()).collect();
    assert_eq!(names, ["Unranked", "Ranked"]);
    assert_eq!(listed.items[0].id, "legacy");
}

#[rstest]
#[tokio::test]
async fn deleting_missing_documents_is_an_error(fixture: Fixture) {
    let ruleset_err = fixture
        .service
        .delete_ruleset("missing")
        .await
        .expect_err("missing ruleset");
    assert!(ruleset_err.is_not_found());

    let rule_err = fixture
        .service
        .delete_rule("missing", "missing-rule")
        .await
        .expect_err("missing rule");
    assert!(rule_err.is_not_found());
}

#[rstest]
#[tokio::test]
async fn export_hash_finds_its_ruleset(fixture: Fixture) {
    let ruleset = fixture
        .service
        .create_ruleset(&RulesetDraft::new("Shared", "", "p-3").expect("draft"))
        .await
        .expect("ruleset");
    let hash = model_checker::domain::ruleset_hash("p-3", &ruleset.id);

    let found = fixture
        .service
        .find_by_export_hash(&hash)
        .await
        .expect("lookup")
        .expect("ruleset for hash");
    assert_eq!(found.id, ruleset.id);
    assert!(
        fixture
            .service
            .find_by_export_hash("unknown")
            .await
            .expect("lookup")
            .is_none()
    );
}
