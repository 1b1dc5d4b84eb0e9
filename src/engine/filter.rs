use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::record::HookRecord;

/// Independent filter predicates combined by logical AND.
///
/// Substring queries are case-insensitive; an empty query matches all. The
/// selected-years set is normally non-empty (the caller keeps it so); an
/// empty set simply matches nothing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterState {
    /// Substring match against the intake code.
    pub id_query: String,
    /// Substring match against either hook code field.
    pub code_query: String,
    /// Substring match against the receiving group.
    pub group_query: String,
    /// Inclusive lower date bound.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub end_date: Option<NaiveDate>,
    /// Years whose segments are displayed.
    pub years: BTreeSet<String>,
}

impl FilterState {
    /// A filter with no text or date predicates and the given year selection.
    pub fn for_years<I, S>(years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            years: years.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// True when all five predicates accept the record.
    pub fn matches(&self, rec: &HookRecord) -> bool {
        if !substring_match(&self.id_query, &rec.id) {
            return false;
        }

        if !self.code_query.is_empty() {
            let query = self.code_query.to_lowercase();
            let pants = rec.pants_code.to_lowercase();
            let shirt = rec.shirt_code.to_lowercase();
            if !pants.contains(&query) && !shirt.contains(&query) {
                return false;
            }
        }

        if !substring_match(&self.group_query, &rec.group) {
            return false;
        }

        match rec.effective_year() {
            Some(year) if self.years.contains(&year) => {}
            _ => return false,
        }

        if self.start_date.is_some() || self.end_date.is_some() {
            let Some(date) = rec.parsed_date() else {
                // Unparseable dates are excluded from range filtering.
                return false;
            };
            if self.start_date.is_some_and(|start| date < start) {
                return false;
            }
            if self.end_date.is_some_and(|end| date > end) {
                return false;
            }
        }

        true
    }
}

fn substring_match(query: &str, value: &str) -> bool {
    query.is_empty() || value.to_lowercase().contains(&query.to_lowercase())
}

/// Applies the filter over the unified view. Pure: no hidden state, same
/// inputs give the same output.
pub fn apply(records: &[HookRecord], filter: &FilterState) -> Vec<HookRecord> {
    records
        .iter()
        .filter(|rec| filter.matches(rec))
        .cloned()
        .collect()
}

/// Sum of coerced quantities over a (filtered) record set. Malformed
/// quantity text counts as zero; never panics.
pub fn total_quantity(records: &[HookRecord]) -> f64 {
    records.iter().map(HookRecord::quantity_value).sum()
}
