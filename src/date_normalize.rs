use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime};

use crate::error::DateFormatError;

#[derive(Debug, Clone, Copy)]
enum Grammar {
    /// RFC 2822, optionally followed by a `(ZONE)` comment.
    MailHeader,
    DateTime(&'static str),
    Date(&'static str),
    Rfc3339,
    /// Date-time without a year; a trailing zone abbreviation is ignored.
    YearlessDateTime(&'static str),
    YearlessDate(&'static str),
}

// Order matters: `%m/%d/%y` must precede `%m/%d/%Y`, which would otherwise
// read "08/17/25" as year 25.
const GRAMMARS: [Grammar; 13] = [
    Grammar::MailHeader,
    Grammar::DateTime("%a, %d %b %Y %H:%M:%S %z"),
    Grammar::DateTime("%d %b %Y %H:%M:%S %z"),
    Grammar::Date("%B %d, %Y"),
    Grammar::Date("%A, %B %d, %Y"),
    Grammar::Date("%d %B %Y"),
    Grammar::Date("%B %d %Y"),
    Grammar::Date("%m/%d/%y"),
    Grammar::Date("%m/%d/%Y"),
    Grammar::Date("%Y-%m-%d"),
    Grammar::Rfc3339,
    Grammar::YearlessDateTime("%m/%d %H:%M"),
    Grammar::YearlessDate("%b %d"),
];

/// Parses a free-text date against the accepted grammars, in order.
///
/// Grammars without a year take the current local year. Near a year
/// boundary this can be off by one; callers that know better should use
/// [`normalize_date_in_year`].
pub fn normalize_date(raw: &str) -> Result<NaiveDate, DateFormatError> {
    normalize_date_in_year(raw, Local::now().year())
}

pub fn normalize_date_in_year(raw: &str, year: i32) -> Result<NaiveDate, DateFormatError> {
    let text = raw.trim();
    if !text.is_empty() {
        for grammar in GRAMMARS {
            if let Some(date) = try_grammar(grammar, text, year) {
                return Ok(date);
            }
        }
    }
    Err(DateFormatError {
        input: raw.to_string(),
    })
}

fn try_grammar(grammar: Grammar, text: &str, year: i32) -> Option<NaiveDate> {
    match grammar {
        Grammar::MailHeader => DateTime::parse_from_rfc2822(strip_zone_comment(text))
            .ok()
            .map(|dt| dt.date_naive()),
        Grammar::DateTime(fmt) => DateTime::parse_from_str(strip_zone_comment(text), fmt)
            .ok()
            .map(|dt| dt.date_naive()),
        Grammar::Date(fmt) => NaiveDate::parse_from_str(text, fmt).ok(),
        Grammar::Rfc3339 => DateTime::parse_from_rfc3339(text)
            .ok()
            .map(|dt| dt.date_naive()),
        Grammar::YearlessDateTime(fmt) => {
            let stamped = format!("{year} {}", strip_zone_word(text));
            NaiveDateTime::parse_from_str(&stamped, &format!("%Y {fmt}"))
                .ok()
                .map(|dt| dt.date())
        }
        Grammar::YearlessDate(fmt) => {
            NaiveDate::parse_from_str(&format!("{year} {text}"), &format!("%Y {fmt}")).ok()
        }
    }
}

/// "Sun, 17 Aug 2025 09:50:14 +0000 (UTC)" -> "Sun, 17 Aug 2025 09:50:14 +0000"
fn strip_zone_comment(text: &str) -> &str {
    if text.ends_with(')') {
        if let Some(open) = text.rfind('(') {
            return text[..open].trim_end();
        }
    }
    text
}

/// "08/17 14:30 EDT" -> "08/17 14:30"
fn strip_zone_word(text: &str) -> &str {
    match text.rsplit_once(' ') {
        Some((head, zone))
            if (2..=5).contains(&zone.len()) && zone.chars().all(|c| c.is_ascii_alphabetic()) =>
        {
            head.trim_end()
        }
        _ => text,
    }
}
