use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use super::validation::is_finished;

/// A catalog record as stored and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<u32>,
    pub read_page: Option<u32>,
    /// Derived: `true` iff both page fields are present and equal.
    pub finished: bool,
    pub reading: Option<bool>,
    #[serde(with = "time::serde::rfc3339")]
    pub inserted_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl Book {
    /// A fresh record; both timestamps are `now`.
    pub fn new(id: String, draft: BookDraft, now: OffsetDateTime) -> Self {
        let finished = draft.finished();
        Self {
            id,
            name: draft.name,
            year: draft.year,
            author: draft.author,
            summary: draft.summary,
            publisher: draft.publisher,
            page_count: draft.page_count,
            read_page: draft.read_page,
            finished,
            reading: draft.reading,
            inserted_at: now,
            updated_at: now,
        }
    }
}

/// Projection used by the collection listing and the name search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

/// Raw request body for create and update. Unknown keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFields {
    pub name: Option<String>,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<u32>,
    pub read_page: Option<u32>,
    pub reading: Option<bool>,
}

/// Fields that passed validation and can be written.
#[derive(Debug, Clone, PartialEq)]
pub struct BookDraft {
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<u32>,
    pub read_page: Option<u32>,
    pub reading: Option<bool>,
}

impl BookDraft {
    pub fn finished(&self) -> bool {
        is_finished(self.page_count, self.read_page)
    }
}

/// Boolean columns that `GET /books` can filter on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookFlag {
    Reading,
    Finished,
}

impl BookFlag {
    pub fn column(self) -> &'static str {
        match self {
            BookFlag::Reading => "reading",
            BookFlag::Finished => "finished",
        }
    }
}

/// Parse a flag value the way a lenient integer parser would: optional
/// leading whitespace and sign, then as many digits as are present.
/// `None` means "not a number" and matches no row.
pub fn parse_flag_value(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude = rest[..digits_len].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Current UTC time at millisecond precision.
pub fn timestamp_now() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    now.replace_nanosecond(now.millisecond() as u32 * 1_000_000)
        .unwrap_or(now)
}

/// Timestamp for rewriting a record last touched at `previous`: the current
/// time, or one millisecond past `previous` when the clock has not moved on.
pub fn next_timestamp(previous: OffsetDateTime) -> OffsetDateTime {
    timestamp_now().max(previous + Duration::milliseconds(1))
}
