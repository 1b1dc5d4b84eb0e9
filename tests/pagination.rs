use proptest::prelude::*;

use hookstock::{
    engine::page,
    record::{HookRecord, Origin},
};

fn record(n: usize) -> HookRecord {
    HookRecord {
        date: "01/05/2024".to_string(),
        id: format!("M{n}"),
        order: String::new(),
        pants_code: String::new(),
        shirt_code: String::new(),
        color: String::new(),
        group: String::new(),
        quantity: "1".to_string(),
        origin: Origin::Confirmed {
            year: "2024".to_string(),
            row_index: n as u32 + 2,
        },
    }
}

fn records(count: usize) -> Vec<HookRecord> {
    (0..count).map(record).collect()
}

#[test]
fn empty_set_still_reports_one_page() {
    let page = page::paginate(&[], 20, 1);
    assert!(page.records.is_empty());
    assert_eq!(page.page, 1);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.total_records, 0);
}

#[test]
fn exact_multiple_has_no_trailing_empty_page() {
    let all = records(40);
    assert_eq!(page::paginate(&all, 20, 1).total_pages, 2);
    assert_eq!(page::paginate(&all, 20, 2).records.len(), 20);
}

#[test]
fn out_of_range_page_is_clamped() {
    let all = records(45);
    let past_end = page::paginate(&all, 20, 99);
    assert_eq!(past_end.page, 3);
    assert_eq!(past_end.records.len(), 5);

    let below_start = page::paginate(&all, 20, 0);
    assert_eq!(below_start.page, 1);
    assert_eq!(below_start.records[0].id, "M0");
}

proptest! {
    #[test]
    fn page_slices_are_bounded_and_lossless(
        count in 0usize..300,
        page_size in 1usize..50,
    ) {
        let all = records(count);
        let first = page::paginate(&all, page_size, 1);
        let expected_pages = count.div_ceil(page_size).max(1);
        prop_assert_eq!(first.total_pages, expected_pages);
        prop_assert_eq!(first.total_records, count);

        let mut reassembled = Vec::new();
        for p in 1..=expected_pages {
            let slice = page::paginate(&all, page_size, p);
            prop_assert!(slice.records.len() <= page_size);
            prop_assert_eq!(slice.page, p);
            reassembled.extend(slice.records);
        }
        prop_assert_eq!(reassembled, all);
    }

    #[test]
    fn requested_page_is_always_in_range(
        count in 0usize..300,
        page_size in 1usize..50,
        requested in 0usize..400,
    ) {
        let all = records(count);
        let page = page::paginate(&all, page_size, requested);
        prop_assert!(page.page >= 1);
        prop_assert!(page.page <= page.total_pages);
    }
}
