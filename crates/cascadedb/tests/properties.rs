mod common;

use cascadedb::{
    core::obs::{metrics_report, metrics_reset_all},
    prelude::*,
};
use common::{OrgShape, drain, engine, schema, seed_org, store, table};
use proptest::prelude::*;

fn org_shape() -> impl Strategy<Value = OrgShape> {
    (prop::collection::vec(0usize..12, 0..6), 0usize..10).prop_map(
        |(tasks_per_project, labels)| OrgShape {
            tasks_per_project,
            labels,
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    // Deleting one org removes exactly what it owns, whatever the step cap.
    #[test]
    fn deletion_is_complete_and_contained(
        target in org_shape(),
        bystander in org_shape(),
        doc_cap in 1u64..24,
    ) {
        metrics_reset_all();

        let store = store();
        let scheduler = MemoryScheduler::new();
        let schema = schema();
        let org = seed_org(&store, &target);
        let other = seed_org(&store, &bystander);
        let untouched = store.total_len() - common::owned_rows(&target);
        let config = CascadeConfig::default()
            .with_step_caps(doc_cap, cascadedb::core::HARD_BYTE_CAP);
        let cascade = engine(&store, &scheduler, &schema, config);

        cascade
            .request_cascading_deletion(&table("orgs"), org)
            .expect("first step should run");
        drain(&store, &scheduler, &cascade);

        prop_assert!(!store.contains(&table("orgs"), org));
        prop_assert!(store.contains(&table("orgs"), other));
        prop_assert_eq!(store.total_len(), untouched);
        prop_assert!(metrics_report().ops.max_step_documents <= doc_cap);
    }

    // Running every step twice leaves the same end state as running it once.
    #[test]
    fn every_step_is_repeat_safe(
        target in org_shape(),
        doc_cap in 1u64..16,
    ) {
        let store = store();
        let scheduler = MemoryScheduler::new();
        let schema = schema();
        let org = seed_org(&store, &target);
        let config = CascadeConfig::default()
            .with_step_caps(doc_cap, cascadedb::core::HARD_BYTE_CAP);
        let cascade = engine(&store, &scheduler, &schema, config);

        cascade
            .request_cascading_deletion(&table("orgs"), org)
            .expect("first step should run");

        let mut deliveries = 0;
        while let Some(message) = scheduler.take_next().expect("queue should decode") {
            let pending = scheduler.pending();
            cascade.resume(message.clone()).expect("step should run");

            // Replay the same message, then drop whatever the replay enqueued.
            cascade.resume(message).expect("replayed step should run");
            while scheduler.pending() > pending + 1 {
                let _ = scheduler.take_next().expect("queue should decode");
            }

            deliveries += 1;
            prop_assert!(deliveries < 10_000, "deletion should converge");
        }

        prop_assert_eq!(store.total_len(), target.labels);
    }
}
