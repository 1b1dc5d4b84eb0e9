//! Transaction records, submission drafts, and date/quantity coercion.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{RowIndex, TimestampMs};

/// Where a record came from and how it is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Origin {
    /// Locally created, not yet observed in a server snapshot.
    Pending {
        /// Wall-clock submission instant, the reconciliation watermark input.
        created_ms: TimestampMs,
    },
    /// Sourced from the latest server snapshot.
    Confirmed {
        /// Year segment holding the row.
        year: String,
        /// Row coordinate inside that segment.
        row_index: RowIndex,
    },
}

/// One hook-intake event.
///
/// `quantity` stays as entered/stored text until coerced; the backend mixes
/// numeric and string cells and malformed values must never fail a render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HookRecord {
    /// Calendar date, ISO (`YYYY-MM-DD`) for local records, display text
    /// (`DD/MM/YYYY`) for fetched ones.
    pub date: String,
    /// Free-text intake code, not unique.
    pub id: String,
    /// Free-text order reference.
    pub order: String,
    /// Optional pants hook code.
    pub pants_code: String,
    /// Optional shirt hook code.
    pub shirt_code: String,
    /// Hook color.
    pub color: String,
    /// Receiving group.
    pub group: String,
    /// Quantity as raw text.
    pub quantity: String,
    /// Pending or confirmed origin tag.
    pub origin: Origin,
}

/// Submission payload used to create a new [`HookRecord`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordDraft {
    /// ISO `YYYY-MM-DD` entry date.
    pub date: String,
    /// Free-text intake code.
    pub id: String,
    /// Free-text order reference.
    pub order: String,
    /// Optional pants hook code.
    pub pants_code: String,
    /// Optional shirt hook code.
    pub shirt_code: String,
    /// Hook color.
    pub color: String,
    /// Receiving group.
    pub group: String,
    /// Quantity as entered.
    pub quantity: String,
}

impl RecordDraft {
    /// Materializes the draft as a pending record created at `created_ms`.
    pub fn into_pending(self, created_ms: TimestampMs) -> HookRecord {
        HookRecord {
            date: self.date,
            id: self.id,
            order: self.order,
            pants_code: self.pants_code,
            shirt_code: self.shirt_code,
            color: self.color,
            group: self.group,
            quantity: self.quantity,
            origin: Origin::Pending { created_ms },
        }
    }
}

impl HookRecord {
    /// Year bucket used by the year filter: the confirmed segment year when
    /// present, otherwise derived from the date text.
    pub fn effective_year(&self) -> Option<String> {
        match &self.origin {
            Origin::Confirmed { year, .. } => Some(year.clone()),
            Origin::Pending { .. } => derive_year(&self.date),
        }
    }

    /// `(year, row_index)` coordinate for confirmed records.
    pub fn coordinate(&self) -> Option<(&str, RowIndex)> {
        match &self.origin {
            Origin::Confirmed { year, row_index } => Some((year.as_str(), *row_index)),
            Origin::Pending { .. } => None,
        }
    }

    /// Submission watermark for pending records.
    pub fn created_ms(&self) -> Option<TimestampMs> {
        match self.origin {
            Origin::Pending { created_ms } => Some(created_ms),
            Origin::Confirmed { .. } => None,
        }
    }

    /// Quantity coerced to a number; malformed or empty text counts as zero.
    pub fn quantity_value(&self) -> f64 {
        parse_quantity(&self.quantity)
    }

    /// Parsed calendar date, accepting both stored representations.
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        parse_flexible_date(&self.date)
    }
}

/// Coerces quantity text to a number, treating unparseable input as zero.
pub fn parse_quantity(raw: &str) -> f64 {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Parses a date in either accepted shape: ISO `YYYY-MM-DD` (an optional
/// `T…` time suffix is ignored) or display `DD/MM/YYYY`. Returns `None` for
/// anything else; range filtering treats that as a non-match.
pub fn parse_flexible_date(raw: &str) -> Option<NaiveDate> {
    let text = raw.trim().trim_start_matches('\'');
    if text.is_empty() {
        return None;
    }

    if text.contains('-') {
        let day_part = text.split('T').next().unwrap_or(text);
        return NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok();
    }

    if text.contains('/') {
        return NaiveDate::parse_from_str(text, "%d/%m/%Y").ok();
    }

    None
}

/// Extracts the year segment from a date text: first `-` segment for ISO
/// dates, third `/` segment for display dates.
pub fn derive_year(raw: &str) -> Option<String> {
    let text = raw.trim().trim_start_matches('\'');
    if text.is_empty() {
        return None;
    }

    if text.contains('-') {
        return text.split('-').next().map(|s| s.to_string());
    }

    if text.contains('/') {
        return text.split('/').nth(2).map(|s| {
            s.split('T').next().unwrap_or(s).to_string()
        });
    }

    None
}
