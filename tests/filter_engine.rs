use chrono::NaiveDate;

use hookstock::{
    engine::filter::{self, FilterState},
    record::{self, HookRecord, Origin},
};

fn confirmed(
    id: &str,
    year: &str,
    date: &str,
    pants: &str,
    shirt: &str,
    group: &str,
    quantity: &str,
) -> HookRecord {
    HookRecord {
        date: date.to_string(),
        id: id.to_string(),
        order: "ORD".to_string(),
        pants_code: pants.to_string(),
        shirt_code: shirt.to_string(),
        color: "black".to_string(),
        group: group.to_string(),
        quantity: quantity.to_string(),
        origin: Origin::Confirmed {
            year: year.to_string(),
            row_index: 2,
        },
    }
}

fn pending(id: &str, date: &str, quantity: &str) -> HookRecord {
    HookRecord {
        date: date.to_string(),
        id: id.to_string(),
        order: "ORD".to_string(),
        pants_code: String::new(),
        shirt_code: String::new(),
        color: "black".to_string(),
        group: "team-1".to_string(),
        quantity: quantity.to_string(),
        origin: Origin::Pending { created_ms: 1 },
    }
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn id_query_is_case_insensitive_substring() {
    let records = vec![
        confirmed("MK-1001", "2024", "01/05/2024", "", "", "team-1", "5"),
        confirmed("ZZ-9", "2024", "01/05/2024", "", "", "team-1", "5"),
    ];
    let mut filter = FilterState::for_years(["2024"]);
    filter.id_query = "mk-10".to_string();

    let out = filter::apply(&records, &filter);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].id, "MK-1001");
}

#[test]
fn code_query_matches_either_code_field() {
    let records = vec![
        confirmed("A", "2024", "01/05/2024", "P-77", "", "team-1", "1"),
        confirmed("B", "2024", "01/05/2024", "", "S-77", "team-1", "1"),
        confirmed("C", "2024", "01/05/2024", "P-10", "S-10", "team-1", "1"),
    ];
    let mut filter = FilterState::for_years(["2024"]);
    filter.code_query = "77".to_string();

    let out = filter::apply(&records, &filter);
    let ids: Vec<_> = out.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["A", "B"]);
}

#[test]
fn year_predicate_uses_segment_year_for_confirmed_and_date_for_pending() {
    let records = vec![
        confirmed("A", "2023", "01/05/2023", "", "", "team-1", "1"),
        pending("B", "2024-05-01", "1"),
        pending("C", "01/05/2025", "1"),
    ];

    let out = filter::apply(&records, &FilterState::for_years(["2024", "2025"]));
    let ids: Vec<_> = out.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["B", "C"]);
}

#[test]
fn empty_year_selection_matches_nothing() {
    let records = vec![confirmed("A", "2024", "01/05/2024", "", "", "team-1", "1")];
    let out = filter::apply(&records, &FilterState::default());
    assert!(out.is_empty());
}

#[test]
fn date_range_is_inclusive_on_both_bounds() {
    let records = vec![
        confirmed("early", "2024", "30/04/2024", "", "", "team-1", "1"),
        confirmed("lo", "2024", "01/05/2024", "", "", "team-1", "1"),
        confirmed("mid", "2024", "15/05/2024", "", "", "team-1", "1"),
        confirmed("hi", "2024", "31/05/2024", "", "", "team-1", "1"),
        confirmed("late", "2024", "01/06/2024", "", "", "team-1", "1"),
    ];
    let mut filter = FilterState::for_years(["2024"]);
    filter.start_date = Some(date(2024, 5, 1));
    filter.end_date = Some(date(2024, 5, 31));

    let out = filter::apply(&records, &filter);
    let ids: Vec<_> = out.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["lo", "mid", "hi"]);
}

#[test]
fn range_filter_mixes_both_date_formats() {
    let records = vec![
        pending("iso", "2024-05-10", "1"),
        confirmed("display", "2024", "12/05/2024", "", "", "team-1", "1"),
    ];
    let mut filter = FilterState::for_years(["2024"]);
    filter.start_date = Some(date(2024, 5, 1));
    filter.end_date = Some(date(2024, 5, 31));

    assert_eq!(filter::apply(&records, &filter).len(), 2);
}

#[test]
fn unparseable_date_fails_the_range_but_passes_without_one() {
    let garbled = confirmed("X", "2024", "not a date", "", "", "team-1", "1");
    let no_range = FilterState::for_years(["2024"]);
    assert_eq!(filter::apply(&[garbled.clone()], &no_range).len(), 1);

    let mut ranged = no_range;
    ranged.start_date = Some(date(2024, 1, 1));
    assert!(filter::apply(&[garbled], &ranged).is_empty());
}

#[test]
fn applying_the_same_filter_twice_is_idempotent() {
    let records = vec![
        confirmed("A", "2024", "01/05/2024", "P-1", "", "team-a", "3"),
        confirmed("B", "2024", "02/05/2024", "", "S-2", "team-b", "4"),
        pending("C", "2024-05-03", "5"),
    ];
    let mut filter = FilterState::for_years(["2024"]);
    filter.group_query = "team".to_string();

    let once = filter::apply(&records, &filter);
    let twice = filter::apply(&once, &filter);
    assert_eq!(once, twice);
}

#[test]
fn total_quantity_coerces_malformed_cells_to_zero() {
    let records = vec![
        confirmed("A", "2024", "01/05/2024", "", "", "g", "5"),
        confirmed("B", "2024", "01/05/2024", "", "", "g", "10"),
        confirmed("C", "2024", "01/05/2024", "", "", "g", ""),
        confirmed("D", "2024", "01/05/2024", "", "", "g", "abc"),
    ];
    assert_eq!(filter::total_quantity(&records), 15.0);
    assert_eq!(filter::total_quantity(&[]), 0.0);
}

#[test]
fn quantity_coercion_rules() {
    assert_eq!(record::parse_quantity("7"), 7.0);
    assert_eq!(record::parse_quantity(" 2.5 "), 2.5);
    assert_eq!(record::parse_quantity(""), 0.0);
    assert_eq!(record::parse_quantity("abc"), 0.0);
    assert_eq!(record::parse_quantity("NaN"), 0.0);
    assert_eq!(record::parse_quantity("inf"), 0.0);
}

#[test]
fn flexible_date_parsing_accepts_both_shapes() {
    let expected = date(2024, 5, 1);
    assert_eq!(record::parse_flexible_date("2024-05-01"), Some(expected));
    assert_eq!(
        record::parse_flexible_date("2024-05-01T00:00:00.000Z"),
        Some(expected)
    );
    assert_eq!(record::parse_flexible_date("01/05/2024"), Some(expected));
    assert_eq!(record::parse_flexible_date("'2024-05-01"), Some(expected));
    assert_eq!(record::parse_flexible_date(""), None);
    assert_eq!(record::parse_flexible_date("2024/13/99"), None);
    assert_eq!(record::parse_flexible_date("garbage"), None);
}

#[test]
fn year_derivation_follows_the_date_shape() {
    assert_eq!(record::derive_year("2024-05-01"), Some("2024".to_string()));
    assert_eq!(record::derive_year("01/05/2025"), Some("2025".to_string()));
    assert_eq!(record::derive_year("'2024-05-01"), Some("2024".to_string()));
    assert_eq!(record::derive_year(""), None);
    assert_eq!(record::derive_year("no separators"), None);
}
