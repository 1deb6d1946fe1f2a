use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};

use crate::error::{Error, Result};

/// The most orders the search endpoint will return per page.
pub const MAX_PAGE_LIMIT: u32 = 500;

pub const DEFAULT_PAGE_LIMIT: u32 = 25;

/// A validated closed-at window, start inclusive and end exclusive.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Parses operator-supplied start and end dates.
    ///
    /// Each bound may be a calendar date (`YYYY-MM-DD`) or a full RFC 3339
    /// timestamp. A calendar start date means midnight UTC at the start of
    /// that day; a calendar end date includes the whole of that day.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if either bound is malformed, or if the
    /// end falls before the start.
    pub fn parse(start: &str, end: &str) -> Result<Self> {
        let start_at = parse_bound(start, false)?;
        let end_at = parse_bound(end, true)?;
        if end_at < start_at {
            return Err(Error::Validation(format!(
                "end date {end} cannot be earlier than start date {start}"
            )));
        }
        Ok(Self {
            start: start_at,
            end: end_at,
        })
    }

    #[must_use]
    pub fn start_rfc3339(&self) -> String {
        self.start.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    #[must_use]
    pub fn end_rfc3339(&self) -> String {
        self.end.to_rfc3339_opts(SecondsFormat::Secs, true)
    }
}

fn parse_bound(input: &str, is_end: bool) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let day = if is_end {
            date.succ_opt().ok_or_else(|| {
                Error::Validation(format!("{input}: date is out of range"))
            })?
        } else {
            date
        };
        return Ok(day.and_time(NaiveTime::MIN).and_utc());
    }
    DateTime::parse_from_rfc3339(input)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| {
            Error::Validation(format!(
                "{input}: invalid date or date format (expected YYYY-MM-DD or RFC 3339)"
            ))
        })
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// Selects the orders a report covers.
///
/// Built once per run and passed unchanged to every page request; only the
/// cursor varies between pages.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct OrderFilter {
    pub location_id: String,
    pub closed_at: DateRange,
    pub states: Vec<String>,
    pub source_names: Vec<String>,
    pub sort_field: String,
    pub sort_order: SortOrder,
    pub limit: u32,
}

impl OrderFilter {
    /// Creates a filter for completed orders at `location_id` closed within
    /// `closed_at`, sorted by closing time.
    #[must_use]
    pub fn new(location_id: impl Into<String>, closed_at: DateRange) -> Self {
        Self {
            location_id: location_id.into(),
            closed_at,
            states: vec!["COMPLETED".into()],
            source_names: Vec::new(),
            sort_field: "CLOSED_AT".into(),
            sort_order: SortOrder::default(),
            limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Restricts the search to the given order states. An empty list keeps
    /// the current states.
    #[must_use]
    pub fn with_states(mut self, states: Vec<String>) -> Self {
        if !states.is_empty() {
            self.states = states;
        }
        self
    }

    /// Restricts the search to orders created by the given sources, such
    /// as `SEED_DATA` for synthetic orders.
    #[must_use]
    pub fn with_source_names(mut self, source_names: Vec<String>) -> Self {
        self.source_names = source_names;
        self
    }

    /// Sets the page size, clamped to `1..=MAX_PAGE_LIMIT`.
    #[must_use]
    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = limit.clamp(1, MAX_PAGE_LIMIT);
        self
    }

    #[must_use]
    pub fn with_sort_order(mut self, sort_order: SortOrder) -> Self {
        self.sort_order = sort_order;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fn_expands_calendar_dates_to_whole_days() {
        let range = DateRange::parse("2024-01-01", "2024-01-31").unwrap();
        assert_eq!(range.start_rfc3339(), "2024-01-01T00:00:00Z");
        assert_eq!(range.end_rfc3339(), "2024-02-01T00:00:00Z");
    }

    #[test]
    fn parse_fn_accepts_rfc3339_and_normalizes_to_utc() {
        let range =
            DateRange::parse("2024-03-01T09:30:00-05:00", "2024-03-01T18:00:00Z").unwrap();
        assert_eq!(range.start_rfc3339(), "2024-03-01T14:30:00Z");
        assert_eq!(range.end_rfc3339(), "2024-03-01T18:00:00Z");
    }

    #[test]
    fn parse_fn_allows_single_day_range() {
        let range = DateRange::parse("2024-05-05", "2024-05-05").unwrap();
        assert!(range.start < range.end);
    }

    #[test]
    fn parse_fn_rejects_malformed_dates() {
        for bad in ["2024-13-01", "01/02/2024", "yesterday", ""] {
            let err = DateRange::parse(bad, "2024-01-31").unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{bad:?} accepted");
        }
    }

    #[test]
    fn parse_fn_rejects_end_before_start() {
        let err = DateRange::parse("2024-02-01", "2024-01-01").unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[test]
    fn with_limit_fn_clamps_page_size() {
        let range = DateRange::parse("2024-01-01", "2024-01-02").unwrap();
        let filter = OrderFilter::new("L1", range);
        assert_eq!(filter.clone().with_limit(0).limit, 1);
        assert_eq!(filter.clone().with_limit(10_000).limit, MAX_PAGE_LIMIT);
        assert_eq!(filter.with_limit(100).limit, 100);
    }

    #[test]
    fn with_states_fn_keeps_completed_when_empty() {
        let range = DateRange::parse("2024-01-01", "2024-01-02").unwrap();
        let filter = OrderFilter::new("L1", range).with_states(Vec::new());
        assert_eq!(filter.states, vec!["COMPLETED".to_string()]);
    }
}
