//! Day aggregation.
//!
//! Groups normalized rows into the nested per-day document handed to sinks, and
//! derives the sample documents used for display.

use chrono::{Locale, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::NormalizedRow;

/// Number of leading characters of `created_at` that form the calendar date.
const DATE_PREFIX_LEN: usize = 10;

/// Nested per-day document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDocument {
    /// `YYYY-MM-DD`
    pub date: String,
    /// Capitalized, localized weekday name for `date`
    pub dia: String,
    /// Sequence number
    pub id: u32,
    /// Rows belonging to this document, in input order
    pub registers: Vec<NormalizedRow>,
}

/// Errors raised while building day documents.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregationError {
    #[error("cannot derive a document date from an empty row set")]
    EmptyInput,
    #[error("created_at prefix '{value}' is not a YYYY-MM-DD date")]
    InvalidDate { value: String },
}

/// Maps calendar dates to weekday names for one locale.
#[derive(Debug, Clone, Copy)]
pub struct WeekdayNamer {
    locale: Locale,
}

impl WeekdayNamer {
    pub fn new(locale: Locale) -> Self {
        Self { locale }
    }

    pub fn locale(&self) -> Locale {
        self.locale
    }

    /// Full weekday name for `date`, capitalized.
    pub fn weekday_name(&self, date: NaiveDate) -> String {
        let midnight = date.and_time(NaiveTime::MIN).and_utc();
        capitalize(&midnight.format_localized("%A", self.locale).to_string())
    }
}

impl Default for WeekdayNamer {
    fn default() -> Self {
        Self::new(Locale::es_ES)
    }
}

/// Upper-case the first character and lower-case the rest.
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Date of the first row: the leading `YYYY-MM-DD` of its `created_at`.
pub fn base_date(rows: &[NormalizedRow]) -> Result<NaiveDate, AggregationError> {
    let first = rows.first().ok_or(AggregationError::EmptyInput)?;
    let prefix: String = first.created_at.chars().take(DATE_PREFIX_LEN).collect();

    NaiveDate::parse_from_str(&prefix, "%Y-%m-%d")
        .map_err(|_| AggregationError::InvalidDate { value: prefix })
}

/// Build the full document (`id` 1) holding every row in order.
pub fn build_day_document(
    rows: Vec<NormalizedRow>,
    namer: &WeekdayNamer,
) -> Result<DayDocument, AggregationError> {
    let date = base_date(&rows)?;

    Ok(DayDocument {
        date: date.format("%Y-%m-%d").to_string(),
        dia: namer.weekday_name(date),
        id: 1,
        registers: rows,
    })
}

/// Split the first `count` rows of `full` into single-row documents numbered from 1.
///
/// Yields fewer documents when `full` has fewer rows. Date and weekday are copied
/// from `full`.
pub fn sample_documents(full: &DayDocument, count: usize) -> Vec<DayDocument> {
    full.registers
        .iter()
        .take(count)
        .zip(1..)
        .map(|(row, id)| DayDocument {
            date: full.date.clone(),
            dia: full.dia.clone(),
            id,
            registers: vec![row.clone()],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(created_at: &str, kind: &str) -> NormalizedRow {
        NormalizedRow {
            created_at: created_at.to_string(),
            kind: kind.to_string(),
            ..Default::default()
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn capitalize_matches_title_case_of_first_letter() {
        assert_eq!(capitalize("jueves"), "Jueves");
        assert_eq!(capitalize("MIÉRCOLES"), "Miércoles");
        assert_eq!(capitalize("sábado"), "Sábado");
        assert_eq!(capitalize(""), "");
    }

    #[test]
    fn spanish_weekday_names() {
        let namer = WeekdayNamer::default();
        assert_eq!(namer.weekday_name(date(2025, 1, 2)), "Jueves");
        assert_eq!(namer.weekday_name(date(2025, 1, 1)), "Miércoles");
        assert_eq!(namer.weekday_name(date(2025, 1, 4)), "Sábado");
    }

    #[test]
    fn english_weekday_names() {
        let namer = WeekdayNamer::new(Locale::en_US);
        assert_eq!(namer.weekday_name(date(2025, 1, 2)), "Thursday");
        assert_eq!(namer.weekday_name(date(2025, 1, 5)), "Sunday");
    }

    #[test]
    fn base_date_uses_first_row_prefix() {
        let rows = vec![
            row("2025-01-02T15:00:00Z", "PushEvent"),
            row("2025-01-03T00:00:00Z", "PushEvent"),
        ];
        assert_eq!(base_date(&rows), Ok(date(2025, 1, 2)));
    }

    #[test]
    fn base_date_rejects_empty_input() {
        assert_eq!(base_date(&[]), Err(AggregationError::EmptyInput));
    }

    #[test]
    fn base_date_rejects_malformed_timestamps() {
        assert_eq!(
            base_date(&[row("yesterday", "PushEvent")]),
            Err(AggregationError::InvalidDate {
                value: "yesterday".to_string()
            })
        );
        assert!(matches!(
            base_date(&[row("2025-13-40T00:00:00Z", "PushEvent")]),
            Err(AggregationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn full_document_keeps_every_row_in_order() {
        let rows = vec![
            row("2025-01-02T15:00:00Z", "PushEvent"),
            row("2025-01-02T15:05:00Z", "IssuesEvent"),
            row("2025-01-02T15:09:00Z", "WatchEvent"),
        ];
        let doc = build_day_document(rows.clone(), &WeekdayNamer::default()).unwrap();

        assert_eq!(doc.date, "2025-01-02");
        assert_eq!(doc.dia, "Jueves");
        assert_eq!(doc.id, 1);
        assert_eq!(doc.registers, rows);
    }

    #[test]
    fn samples_take_first_rows_one_per_document() {
        let rows: Vec<_> = (0..5)
            .map(|i| row(&format!("2025-01-02T15:0{i}:00Z"), "PushEvent"))
            .collect();
        let full = build_day_document(rows.clone(), &WeekdayNamer::default()).unwrap();
        let samples = sample_documents(&full, 2);

        assert_eq!(samples.len(), 2);
        for (i, sample) in samples.iter().enumerate() {
            assert_eq!(sample.id, i as u32 + 1);
            assert_eq!(sample.date, full.date);
            assert_eq!(sample.dia, full.dia);
            assert_eq!(sample.registers, vec![rows[i].clone()]);
        }
    }

    #[test]
    fn samples_shrink_to_available_rows() {
        let full = build_day_document(
            vec![row("2025-01-02T15:00:00Z", "PushEvent")],
            &WeekdayNamer::default(),
        )
        .unwrap();

        assert_eq!(sample_documents(&full, 2).len(), 1);
        assert!(sample_documents(&full, 0).is_empty());
    }

    #[test]
    fn day_document_field_order() {
        let doc = DayDocument {
            date: "2025-01-02".to_string(),
            dia: "Jueves".to_string(),
            id: 1,
            registers: Vec::new(),
        };
        assert_eq!(
            serde_json::to_string(&doc).unwrap(),
            r#"{"date":"2025-01-02","dia":"Jueves","id":1,"registers":[]}"#
        );
    }
}
