use proptest::prelude::*;

use hookstock::{
    core::store::RecordStore,
    record::{HookRecord, Origin, RecordDraft},
    types::TimestampMs,
};

fn draft(id: &str, date: &str, quantity: &str) -> RecordDraft {
    RecordDraft {
        date: date.to_string(),
        id: id.to_string(),
        order: "A1".to_string(),
        pants_code: String::new(),
        shirt_code: String::new(),
        color: "black".to_string(),
        group: "team-1".to_string(),
        quantity: quantity.to_string(),
    }
}

fn confirmed(id: &str, year: &str, row_index: u32) -> HookRecord {
    HookRecord {
        date: format!("01/05/{year}"),
        id: id.to_string(),
        order: "A1".to_string(),
        pants_code: String::new(),
        shirt_code: String::new(),
        color: "black".to_string(),
        group: "team-1".to_string(),
        quantity: "5".to_string(),
        origin: Origin::Confirmed {
            year: year.to_string(),
            row_index,
        },
    }
}

#[test]
fn pending_survives_iff_strictly_after_watermark() {
    let mut store = RecordStore::new();
    store.insert_pending(draft("M1", "2024-05-01", "5"), 49);
    store.insert_pending(draft("M2", "2024-05-01", "5"), 50);
    store.insert_pending(draft("M3", "2024-05-01", "5"), 51);

    let pruned = store.apply_snapshot(vec![confirmed("M1", "2024", 2)], 50);

    assert_eq!(pruned, 2);
    let surviving: Vec<_> = store.pending().iter().map(|r| r.id.clone()).collect();
    assert_eq!(surviving, vec!["M3".to_string()]);
}

#[test]
fn tie_with_watermark_is_retained_not_pruned() {
    let mut store = RecordStore::new();
    store.insert_pending(draft("M1", "2024-05-01", "5"), 100);

    let pruned = store.apply_snapshot(Vec::new(), 100);

    assert_eq!(pruned, 0);
    assert_eq!(store.pending_len(), 1);
}

#[test]
fn record_created_during_fetch_stays_visible_until_next_cycle() {
    let mut store = RecordStore::new();

    // Fetch started at t0=50; the submission at t=100 happened while it was
    // in flight, so the snapshot already contains an equivalent row.
    store.insert_pending(draft("M1", "2024-05-01", "5"), 100);
    store.apply_snapshot(vec![confirmed("M1", "2024", 2)], 50);

    // Visible duplicate: the pending copy is retained alongside the
    // confirmed row rather than risking data loss.
    assert_eq!(store.pending_len(), 1);
    assert_eq!(store.confirmed_len(), 1);
    assert_eq!(store.unified().len(), 2);

    // The next cycle's watermark is at or past the submission instant and
    // resolves the duplicate.
    store.apply_snapshot(vec![confirmed("M1", "2024", 2)], 100);
    assert_eq!(store.pending_len(), 0);
    assert_eq!(store.unified().len(), 1);
}

#[test]
fn pruning_never_touches_the_confirmed_partition() {
    let mut store = RecordStore::new();
    store.insert_pending(draft("M1", "2024-05-01", "5"), 10);
    store.apply_snapshot(vec![confirmed("S1", "2024", 2), confirmed("S2", "2024", 3)], 20);

    assert_eq!(store.pending_len(), 0);
    assert_eq!(store.confirmed_len(), 2);
}

proptest! {
    #[test]
    fn watermark_keeps_exactly_the_strictly_later_records(
        timestamps in prop::collection::vec(0u64..2_000, 0..60),
        watermark in 0u64..2_000,
    ) {
        let mut store = RecordStore::new();
        for (i, ts) in timestamps.iter().enumerate() {
            store.insert_pending(draft(&format!("M{i}"), "2024-05-01", "1"), *ts);
        }

        store.apply_snapshot(Vec::new(), watermark);

        let expected: usize = timestamps.iter().filter(|t| **t > watermark).count();
        prop_assert_eq!(store.pending_len(), expected);
        for rec in store.pending() {
            let created = rec.created_ms().expect("pending record");
            prop_assert!(created > watermark);
        }
    }

    #[test]
    fn reapplying_the_same_watermark_is_idempotent(
        timestamps in prop::collection::vec(0u64..2_000, 0..60),
        watermark in 0u64..2_000,
    ) {
        let mut store = RecordStore::new();
        for (i, ts) in timestamps.iter().enumerate() {
            store.insert_pending(draft(&format!("M{i}"), "2024-05-01", "1"), *ts);
        }

        store.apply_snapshot(Vec::new(), watermark);
        let after_first: Vec<TimestampMs> =
            store.pending().iter().filter_map(|r| r.created_ms()).collect();

        let pruned_again = store.prune_pending_through(watermark);
        let after_second: Vec<TimestampMs> =
            store.pending().iter().filter_map(|r| r.created_ms()).collect();

        prop_assert_eq!(pruned_again, 0);
        prop_assert_eq!(after_first, after_second);
    }
}
