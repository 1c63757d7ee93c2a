//! Normalizes the raw "last seen" text scraped off a profile page.
//!
//! The site renders `YYYY-MM-DD HH:MM:SS` in server time (UTC) and may append
//! a role qualifier after the timestamp ("… as Elder Druid"). Profiles can
//! also hide the field entirely, in which case the page shows a sentinel.

use chrono::{DateTime, NaiveDateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;

/// Value the site substitutes when a profile hides its last-seen field.
pub const HIDDEN_SENTINEL: &str = "hidden";

const LAST_SEEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Trailing role qualifier: "<ws>as <anything to end of string>".
static QUALIFIER_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+as\s.*$").expect("static regex compiles"));

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NormalizeError {
    #[error("last-seen value is hidden")]
    Hidden,

    #[error("last-seen value is empty")]
    Empty,

    #[error("unrecognized last-seen timestamp: {raw:?}")]
    Format { raw: String },
}

/// Converts a raw last-seen string into a canonical UTC instant with
/// second precision.
pub fn normalize(raw: &str) -> Result<DateTime<Utc>, NormalizeError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(NormalizeError::Empty);
    }
    if trimmed.eq_ignore_ascii_case(HIDDEN_SENTINEL) {
        return Err(NormalizeError::Hidden);
    }

    let stripped = QUALIFIER_SUFFIX.replace(trimmed, "");
    NaiveDateTime::parse_from_str(stripped.trim_end(), LAST_SEEN_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| NormalizeError::Format {
            raw: trimmed.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn parses_plain_timestamp_as_utc() {
        let instant = normalize("2024-01-01 00:00:00").unwrap();
        assert_eq!(instant.to_rfc3339(), "2024-01-01T00:00:00+00:00");
    }

    #[test]
    fn strips_trailing_role_qualifier() {
        assert_eq!(
            normalize("2024-03-05 17:30:12 as Elder Druid"),
            normalize("2024-03-05 17:30:12")
        );
    }

    #[test]
    fn qualifier_swallows_everything_to_end_of_string() {
        assert_eq!(
            normalize("2024-03-05 17:30:12 as Knight of the Second Order, retired"),
            normalize("2024-03-05 17:30:12")
        );
    }

    #[test]
    fn tolerates_surrounding_whitespace() {
        assert_eq!(
            normalize("  2024-03-05 17:30:12  "),
            normalize("2024-03-05 17:30:12")
        );
    }

    #[test]
    fn output_has_zero_subsecond_precision() {
        let instant = normalize("2024-03-05 17:30:12").unwrap();
        assert_eq!(instant.nanosecond(), 0);
    }

    #[test]
    fn hidden_sentinel_is_rejected() {
        assert_eq!(normalize("hidden"), Err(NormalizeError::Hidden));
        assert_eq!(normalize("Hidden"), Err(NormalizeError::Hidden));
        assert_eq!(normalize("  HIDDEN  "), Err(NormalizeError::Hidden));
    }

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(normalize(""), Err(NormalizeError::Empty));
        assert_eq!(normalize("   "), Err(NormalizeError::Empty));
    }

    #[test]
    fn garbage_is_a_format_error_not_a_panic() {
        for raw in [
            "never",
            "yesterday at noon",
            "2024-13-01 00:00:00",
            "2024-01-01",
            "17:30:12",
            "2024-01-01T00:00:00Z",
        ] {
            assert!(
                matches!(normalize(raw), Err(NormalizeError::Format { .. })),
                "expected format error for {raw:?}"
            );
        }
    }

    #[test]
    fn format_error_carries_the_offending_input() {
        let err = normalize("not a date").unwrap_err();
        assert_eq!(
            err,
            NormalizeError::Format {
                raw: "not a date".to_string()
            }
        );
    }
}
