#![allow(dead_code)]

use cascadedb::prelude::*;

pub const MARKER: &str = "deletion_time";

pub fn table(name: &str) -> TableName {
    TableName::new(name).expect("test table name should be valid")
}

/// Ownership graph used by the integration scenarios.
///
/// - `parents` own one `children` row each through a single back-reference
/// - `orgs` own `projects`, which own `tasks` and one `readmes` row; orgs
///   link to `labels` through the `org_labels` join table
/// - `channels` link to `people` through the `subscriptions` join table
/// - `people` follow each other through the symmetric `follows` join table
pub fn schema() -> Schema {
    Schema::builder()
        .table(
            table("parents"),
            vec![EdgeDescriptor::single_ref("child", table("children"), "parent_id")],
        )
        .table(table("children"), Vec::new())
        .table(
            table("orgs"),
            vec![
                EdgeDescriptor::many_field("projects", table("projects"), "org_id"),
                EdgeDescriptor::join(
                    "labels",
                    table("labels"),
                    table("org_labels"),
                    "org_id",
                    "label_id",
                ),
            ],
        )
        .table(
            table("projects"),
            vec![
                EdgeDescriptor::local_field("org", table("orgs"), "org_id"),
                EdgeDescriptor::many_field("tasks", table("tasks"), "project_id"),
                EdgeDescriptor::single_ref("readme", table("readmes"), "project_id"),
            ],
        )
        .table(table("tasks"), Vec::new())
        .table(table("readmes"), Vec::new())
        .table(table("labels"), Vec::new())
        .table(table("org_labels"), Vec::new())
        .table(
            table("channels"),
            vec![EdgeDescriptor::join(
                "subscribers",
                table("people"),
                table("subscriptions"),
                "channel_id",
                "person_id",
            )],
        )
        .table(table("subscriptions"), Vec::new())
        .table(
            table("people"),
            vec![
                EdgeDescriptor::join(
                    "follows",
                    table("people"),
                    table("follows"),
                    "follower_id",
                    "followee_id",
                )
                .symmetric(),
            ],
        )
        .table(table("follows"), Vec::new())
        .build()
        .expect("test schema should build")
}

/// Store with every index the test schema scans.
pub fn store() -> MemoryStore {
    indexed(MemoryStore::new())
}

/// Like [`store`], but every scanned document costs exactly `bytes`.
pub fn flat_store(bytes: u64) -> MemoryStore {
    indexed(MemoryStore::with_document_bytes(bytes))
}

fn indexed(store: MemoryStore) -> MemoryStore {
    for (name, index) in [
        ("children", "parent_id"),
        ("projects", "org_id"),
        ("tasks", "project_id"),
        ("readmes", "project_id"),
        ("org_labels", "org_id"),
        ("subscriptions", "channel_id"),
        ("follows", "follower_id"),
        ("follows", "followee_id"),
    ] {
        store.define_index(&table(name), index, index);
    }

    store
}

pub fn engine<'a>(
    store: &'a MemoryStore,
    scheduler: &'a MemoryScheduler,
    schema: &'a Schema,
    config: CascadeConfig,
) -> Cascade<'a, MemoryStore, MemoryScheduler, Schema> {
    Cascade::new(store, scheduler, schema, config).expect("test config should validate")
}

/// Deliver queued continuations until the queue is empty, running every step
/// as one atomic unit.
pub fn drain(
    store: &MemoryStore,
    scheduler: &MemoryScheduler,
    cascade: &Cascade<'_, MemoryStore, MemoryScheduler, Schema>,
) -> u64 {
    scheduler
        .run_until_idle(100_000, |message| store.atomic(|| cascade.resume(message)))
        .expect("queue should drain")
}

///
/// OrgShape
///

#[derive(Clone, Debug)]
pub struct OrgShape {
    pub tasks_per_project: Vec<usize>,
    pub labels: usize,
}

/// Insert one org shaped by `shape` and return its id.
pub fn seed_org(store: &MemoryStore, shape: &OrgShape) -> Id {
    let org = store.insert(&table("orgs"), [("name", Value::from("org"))]);

    for tasks in &shape.tasks_per_project {
        let project = store.insert(&table("projects"), [("org_id", Value::Id(org))]);
        store.insert(&table("readmes"), [("project_id", Value::Id(project))]);
        for _ in 0..*tasks {
            store.insert(&table("tasks"), [("project_id", Value::Id(project))]);
        }
    }

    for _ in 0..shape.labels {
        let label = store.insert(&table("labels"), [("text", Value::from("l"))]);
        store.insert(
            &table("org_labels"),
            [("org_id", Value::Id(org)), ("label_id", Value::Id(label))],
        );
    }

    org
}

/// Rows an org of `shape` owns, itself included.
pub fn owned_rows(shape: &OrgShape) -> usize {
    1 + shape.labels
        + shape
            .tasks_per_project
            .iter()
            .map(|tasks| 2 + tasks)
            .sum::<usize>()
}
