//! Due-date parsing, canonicalization, and display.
//!
//! Two textual input forms are accepted (`2024-01-05` and
//! `2024-01-05 02:30PM`); storage and comparison use a single sortable
//! canonical form (`2024-01-05T14:30:00`).

use time::format_description::BorrowedFormatItem;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

/// Bare-date form, also the date-only display form.
const DATE: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// 12-hour form, e.g. `2024-01-05 02:30PM`. Formats the period uppercase and
/// parses it in any case.
const DATE_TIME_12H: &[BorrowedFormatItem<'static>] = format_description!(
    "[year]-[month]-[day] [hour repr:12]:[minute][period case:upper case_sensitive:false]"
);

/// Canonical sortable storage form.
const CANONICAL: &[BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second]");

/// Parse user-supplied due text. Bare dates normalize to midnight. `None`
/// means the text matched neither form; callers leave the field unchanged
/// and warn the user.
pub fn parse_flexible(text: &str) -> Option<PrimitiveDateTime> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Ok(parsed) = PrimitiveDateTime::parse(text, DATE_TIME_12H) {
        return Some(parsed);
    }
    Date::parse(text, DATE).ok().map(Date::midnight)
}

/// Render a timestamp in the canonical storage form.
pub fn canonicalize(timestamp: PrimitiveDateTime) -> String {
    timestamp
        .format(CANONICAL)
        .unwrap_or_else(|_| timestamp.to_string())
}

/// Comparison key for a stored due string. Tries the canonical form first,
/// then the bare-date form for older data. Missing and unparsable values
/// sort after every real timestamp, so undated or corrupt tasks land last
/// for either sort direction.
pub fn sort_key(stored: Option<&str>) -> PrimitiveDateTime {
    let Some(text) = stored else {
        return PrimitiveDateTime::MAX;
    };
    PrimitiveDateTime::parse(text, CANONICAL)
        .ok()
        .or_else(|| Date::parse(text, DATE).ok().map(Date::midnight))
        .unwrap_or(PrimitiveDateTime::MAX)
}

/// Display form for a stored due string: `None` when absent, date-only when
/// the stored time is exactly midnight, otherwise date plus 12-hour time.
/// Stored text that does not parse is shown verbatim rather than failing.
pub fn display(stored: Option<&str>) -> String {
    let Some(text) = stored else {
        return "None".to_string();
    };
    match PrimitiveDateTime::parse(text, CANONICAL) {
        Ok(parsed) if parsed.time() == Time::MIDNIGHT => parsed
            .format(DATE)
            .unwrap_or_else(|_| text.to_string()),
        Ok(parsed) => parsed
            .format(DATE_TIME_12H)
            .unwrap_or_else(|_| text.to_string()),
        Err(_) => text.to_string(),
    }
}

/// Local wall-clock now, dropping the offset; UTC when the local offset
/// cannot be determined.
pub fn local_now() -> PrimitiveDateTime {
    let now = OffsetDateTime::now_local().unwrap_or_else(|_| OffsetDateTime::now_utc());
    PrimitiveDateTime::new(now.date(), now.time())
}

/// Canonical form of the current moment. Also the serde default for records
/// loaded without a creation timestamp.
pub fn now_canonical() -> String {
    canonicalize(local_now())
}
