use crate::{
    db::store::memory::MemoryStore,
    model::{EdgeDescriptor, Schema},
    types::{Id, TableName},
    value::Value,
};

pub(crate) const MARKER: &str = "deletion_time";

pub(crate) fn table(name: &str) -> TableName {
    TableName::new(name).expect("test table name should be valid")
}

/// Ownership graph shared by engine tests.
///
/// - teams own one profile, many members (each owning notes) and tags
///   through the `team_tags` join table
/// - users befriend users through the symmetric `friendships` join table
pub(crate) fn fixture_schema() -> Schema {
    Schema::builder()
        .table(
            table("teams"),
            vec![
                EdgeDescriptor::single_ref("profile", table("profiles"), "team_id"),
                EdgeDescriptor::many_field("members", table("members"), "team_id"),
                EdgeDescriptor::join(
                    "tags",
                    table("tags"),
                    table("team_tags"),
                    "team_id",
                    "tag_id",
                ),
            ],
        )
        .table(
            table("members"),
            vec![
                EdgeDescriptor::local_field("team", table("teams"), "team_id"),
                EdgeDescriptor::many_field("notes", table("notes"), "member_id"),
            ],
        )
        .table(table("notes"), Vec::new())
        .table(table("profiles"), Vec::new())
        .table(table("tags"), Vec::new())
        .table(table("team_tags"), Vec::new())
        .table(
            table("users"),
            vec![
                EdgeDescriptor::join(
                    "friends",
                    table("users"),
                    table("friendships"),
                    "user_a",
                    "user_b",
                )
                .symmetric(),
            ],
        )
        .table(table("friendships"), Vec::new())
        .build()
        .expect("fixture schema should build")
}

/// Empty store with every index the fixture schema scans.
pub(crate) fn fixture_store() -> MemoryStore {
    let store = MemoryStore::new();
    store.define_index(&table("profiles"), "team_id", "team_id");
    store.define_index(&table("members"), "team_id", "team_id");
    store.define_index(&table("notes"), "member_id", "member_id");
    store.define_index(&table("team_tags"), "team_id", "team_id");
    store.define_index(&table("friendships"), "user_a", "user_a");
    store.define_index(&table("friendships"), "user_b", "user_b");

    store
}

///
/// TeamSeed
///

pub(crate) struct TeamSeed {
    pub(crate) team: Id,
    pub(crate) members: Vec<Id>,
    pub(crate) tags: Vec<Id>,
}

/// Insert one team with a profile, `members` members owning `notes` notes
/// each, and `tags` tags linked through join rows.
pub(crate) fn seed_team(store: &MemoryStore, members: usize, notes: usize, tags: usize) -> TeamSeed {
    let team = store.insert(&table("teams"), [("name", Value::from("crew"))]);
    store.insert(&table("profiles"), [("team_id", Value::Id(team))]);

    let member_ids = (0..members)
        .map(|_| {
            let member = store.insert(&table("members"), [("team_id", Value::Id(team))]);
            for _ in 0..notes {
                store.insert(&table("notes"), [("member_id", Value::Id(member))]);
            }
            member
        })
        .collect();

    let tag_ids = (0..tags)
        .map(|_| {
            let tag = store.insert(&table("tags"), [("label", Value::from("t"))]);
            store.insert(
                &table("team_tags"),
                [("team_id", Value::Id(team)), ("tag_id", Value::Id(tag))],
            );
            tag
        })
        .collect();

    TeamSeed {
        team,
        members: member_ids,
        tags: tag_ids,
    }
}
