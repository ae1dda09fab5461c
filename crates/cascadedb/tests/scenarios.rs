mod common;

use cascadedb::{
    ErrorKind,
    core::{
        db::budget::estimate_document_bytes,
        obs::{metrics_report, metrics_reset_all},
    },
    prelude::*,
};
use common::{
    MARKER, OrgShape, drain, engine, flat_store, owned_rows, schema, seed_org, store, table,
};

#[test]
fn parent_with_single_child_is_removed_in_one_step() {
    let store = store();
    let scheduler = MemoryScheduler::new();
    let schema = schema();
    let parent = store.insert(&table("parents"), [("name", Value::from("a"))]);
    store.insert(&table("children"), [("parent_id", Value::Id(parent))]);
    let cascade = engine(&store, &scheduler, &schema, CascadeConfig::default());

    cascade
        .request_cascading_deletion(&table("parents"), parent)
        .expect("deletion should run");

    assert!(store.is_empty());
    assert_eq!(scheduler.enqueued(), 0, "nothing should be scheduled");
}

fn seed_subscriptions(store: &MemoryStore, rows: usize) -> (Id, Id) {
    let channel = store.insert(&table("channels"), [("name", Value::from("news"))]);
    let person = store.insert(&table("people"), [("name", Value::from("p"))]);
    for _ in 0..rows {
        store.insert(
            &table("subscriptions"),
            [
                ("channel_id", Value::Id(channel)),
                ("person_id", Value::Id(person)),
            ],
        );
    }

    (channel, person)
}

#[test]
fn ten_thousand_join_rows_take_five_scheduled_steps() {
    metrics_reset_all();

    // 64 bytes a row keeps every page under the byte cap, so only the
    // document cap ends a step: four full steps of 2048 rows, then 1808.
    let store = flat_store(64);
    let scheduler = MemoryScheduler::new();
    let schema = schema();
    let (channel, person) = seed_subscriptions(&store, 10_000);
    let cascade = engine(&store, &scheduler, &schema, CascadeConfig::default());

    cascade
        .schedule_cascading_deletion(&table("channels"), channel, 0)
        .expect("deletion should schedule");
    assert_eq!(store.len(&table("subscriptions")), 10_000, "nothing runs inline");
    drain(&store, &scheduler, &cascade);

    assert_eq!(scheduler.delivered(), 5, "one scheduler invocation per step");
    assert_eq!(store.len(&table("subscriptions")), 0);
    assert!(!store.contains(&table("channels"), channel));
    assert!(store.contains(&table("people"), person), "join targets survive");

    let report = metrics_report();
    assert_eq!(report.ops.steps_resumed, 4, "every step after the first resumes");
    assert_eq!(report.ops.steps_suspended, 4);
    assert_eq!(report.ops.max_step_documents, cascadedb::core::HARD_DOC_CAP);
    assert_eq!(report.ops.max_step_bytes, 2048 * 64);
    assert_eq!(report.ops.rows_deleted, 10_001);
    assert_eq!(store.rows_deleted(), 10_001);
}

#[test]
fn default_byte_cap_is_never_exceeded() {
    metrics_reset_all();

    let store = store();
    let scheduler = MemoryScheduler::new();
    let schema = schema();
    let (channel, _) = seed_subscriptions(&store, 2_000);
    let row_bytes = store
        .get(&table("subscriptions"), store.ids(&table("subscriptions"))[0])
        .expect("row should load")
        .map(|doc| estimate_document_bytes(&doc))
        .expect("row should exist");
    assert!(
        row_bytes * 2_000 > cascadedb::core::HARD_BYTE_CAP,
        "rows should outweigh one step"
    );
    let cascade = engine(&store, &scheduler, &schema, CascadeConfig::default());

    cascade
        .request_cascading_deletion(&table("channels"), channel)
        .expect("first step should run");
    drain(&store, &scheduler, &cascade);

    assert_eq!(store.len(&table("subscriptions")), 0);
    assert!(!store.contains(&table("channels"), channel));

    let report = metrics_report();
    assert!(report.ops.steps_suspended >= 1);
    assert!(
        report.ops.max_step_bytes <= cascadedb::core::HARD_BYTE_CAP,
        "step read {} bytes",
        report.ops.max_step_bytes
    );
}

#[test]
fn document_cap_bounds_every_step() {
    metrics_reset_all();

    let store = store();
    let scheduler = MemoryScheduler::new();
    let schema = schema();
    let shape = OrgShape {
        tasks_per_project: vec![40, 0, 13, 7],
        labels: 30,
    };
    let org = seed_org(&store, &shape);
    let config = CascadeConfig::default().with_step_caps(16, cascadedb::core::HARD_BYTE_CAP);
    let cascade = engine(&store, &scheduler, &schema, config);

    cascade
        .request_cascading_deletion(&table("orgs"), org)
        .expect("first step should run");
    drain(&store, &scheduler, &cascade);

    let report = metrics_report();
    assert!(report.ops.max_step_documents <= 16);
    assert!(report.ops.steps_suspended >= 5);
    assert_eq!(store.total_len(), shape.labels, "only labels remain");
    assert_eq!(
        u64::try_from(owned_rows(&shape)).expect("row count fits"),
        report.ops.rows_deleted
    );
}

#[test]
fn symmetric_follows_are_removed_in_both_directions() {
    let store = store();
    let scheduler = MemoryScheduler::new();
    let schema = schema();
    let people = table("people");
    let follows = table("follows");
    let ana = store.insert(&people, [("name", Value::from("ana"))]);
    let ben = store.insert(&people, [("name", Value::from("ben"))]);
    let cy = store.insert(&people, [("name", Value::from("cy"))]);
    for (from, to) in [(ana, ben), (ben, ana), (cy, ana), (ben, cy)] {
        store.insert(
            &follows,
            [("follower_id", Value::Id(from)), ("followee_id", Value::Id(to))],
        );
    }
    let cascade = engine(&store, &scheduler, &schema, CascadeConfig::default());

    cascade
        .request_cascading_deletion(&people, ana)
        .expect("deletion should run");

    assert_eq!(store.len(&follows), 1, "only ben -> cy remains");
    assert!(store.contains(&people, ben) && store.contains(&people, cy));
}

#[test]
fn undoing_a_soft_delete_cancels_the_scheduled_hard_delete() {
    let store = store();
    let scheduler = MemoryScheduler::new();
    let schema = schema();
    let shape = OrgShape {
        tasks_per_project: vec![3, 3],
        labels: 2,
    };
    let org = seed_org(&store, &shape);
    let cascade = engine(&store, &scheduler, &schema, CascadeConfig::default());

    store
        .set_field(&table("orgs"), org, MARKER, Value::Timestamp(1_000))
        .expect("soft delete should apply");
    cascade
        .schedule_cascading_deletion(&table("orgs"), org, 60_000)
        .expect("hard delete should schedule");
    store
        .set_field(&table("orgs"), org, MARKER, Value::Null)
        .expect("undo should apply");
    let before = store.total_len();

    drain(&store, &scheduler, &cascade);

    assert_eq!(store.total_len(), before);
    assert_eq!(store.rows_deleted(), 0);
}

#[test]
fn scheduled_hard_delete_runs_after_soft_delete() {
    let store = store();
    let scheduler = MemoryScheduler::new();
    let schema = schema();
    let shape = OrgShape {
        tasks_per_project: vec![5],
        labels: 1,
    };
    let org = seed_org(&store, &shape);
    let cascade = engine(&store, &scheduler, &schema, CascadeConfig::default());

    store
        .set_field(&table("orgs"), org, MARKER, Value::Timestamp(1_000))
        .expect("soft delete should apply");
    cascade
        .schedule_cascading_deletion(&table("orgs"), org, 60_000)
        .expect("hard delete should schedule");
    assert_eq!(scheduler.pending_delays(), vec![60_000]);

    drain(&store, &scheduler, &cascade);

    assert_eq!(store.total_len(), shape.labels);
}

#[test]
fn transient_store_faults_are_retried_to_completion() {
    let store = store();
    let scheduler = MemoryScheduler::new();
    let schema = schema();
    let shape = OrgShape {
        tasks_per_project: vec![20, 20],
        labels: 10,
    };
    let org = seed_org(&store, &shape);
    let config = CascadeConfig::default().with_step_caps(8, cascadedb::core::HARD_BYTE_CAP);
    let cascade = engine(&store, &scheduler, &schema, config);

    cascade
        .request_cascading_deletion(&table("orgs"), org)
        .expect("first step should run");
    store.inject_transient_faults(3);
    drain(&store, &scheduler, &cascade);

    assert_eq!(scheduler.retried(), 3);
    assert_eq!(store.total_len(), shape.labels);
}

#[test]
fn foreign_id_is_reported_as_invalid_origin() {
    let store = store();
    let scheduler = MemoryScheduler::new();
    let schema = schema();
    let parent = store.insert(&table("parents"), [("name", Value::from("a"))]);
    let cascade = engine(&store, &scheduler, &schema, CascadeConfig::default());

    let err = cascade
        .request_cascading_deletion(&table("orgs"), parent)
        .map_err(cascadedb::Error::from)
        .expect_err("parent id is not an org id");

    assert_eq!(err.kind, ErrorKind::InvalidOrigin);
    assert!(!err.is_transient());
    assert!(store.contains(&table("parents"), parent));
}
