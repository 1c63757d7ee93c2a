//! Pulls the raw "Last seen" field out of a profile page.
//!
//! The markup is treated as opaque text: one regex pass covers the table
//! layout (`<td>Last seen:</td><td>…</td>`), a second covers inline text.
//! Whatever is captured goes to [`crate::timestamp::normalize`] untouched
//! beyond tag/entity cleanup.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, WatchError};

static TABLE_CELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)last\s+seen:?\s*</t[dh]>\s*<td[^>]*>\s*(.+?)\s*</td>")
        .expect("static regex compiles")
});

static INLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)last\s+seen:?\s*([^<\r\n]+)").expect("static regex compiles"));

static TAGS: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex compiles"));

/// Extracts the raw last-seen text from profile HTML.
///
/// Returns [`WatchError::FieldMissing`] when neither form is present; the
/// caller treats that the same as an unparseable value.
pub fn last_seen_field(html: &str) -> Result<String> {
    let captured = TABLE_CELL
        .captures(html)
        .or_else(|| INLINE.captures(html))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str());

    let raw = captured.ok_or(WatchError::FieldMissing)?;
    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return Err(WatchError::FieldMissing);
    }
    Ok(cleaned)
}

fn clean(raw: &str) -> String {
    let without_tags = TAGS.replace_all(raw, "");
    without_tags
        .replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_from_table_markup() {
        let html = r#"
            <table class="profile">
              <tr><td>Name:</td><td>Durin</td></tr>
              <tr><td>Last seen:</td><td>2024-03-05 17:30:12 as Elder Druid</td></tr>
            </table>
        "#;
        assert_eq!(
            last_seen_field(html).unwrap(),
            "2024-03-05 17:30:12 as Elder Druid"
        );
    }

    #[test]
    fn extracts_from_inline_markup() {
        let html = "<p>Last seen: 2024-03-05 17:30:12</p>";
        assert_eq!(last_seen_field(html).unwrap(), "2024-03-05 17:30:12");
    }

    #[test]
    fn strips_nested_tags_and_entities() {
        let html = "<td>Last seen:</td><td><b>2024-03-05&nbsp;17:30:12</b></td>";
        assert_eq!(last_seen_field(html).unwrap(), "2024-03-05 17:30:12");
    }

    #[test]
    fn extracts_hidden_sentinel_verbatim() {
        let html = "<td>Last seen:</td><td>hidden</td>";
        assert_eq!(last_seen_field(html).unwrap(), "hidden");
    }

    #[test]
    fn case_insensitive_label_match() {
        let html = "<td>LAST SEEN</td><td>2024-03-05 17:30:12</td>";
        assert_eq!(last_seen_field(html).unwrap(), "2024-03-05 17:30:12");
    }

    #[test]
    fn missing_field_is_an_error() {
        let html = "<html><body>No profile here.</body></html>";
        assert!(matches!(
            last_seen_field(html),
            Err(WatchError::FieldMissing)
        ));
    }

    #[test]
    fn empty_cell_is_an_error() {
        let html = "<td>Last seen:</td><td>   </td>";
        assert!(matches!(
            last_seen_field(html),
            Err(WatchError::FieldMissing)
        ));
    }
}
