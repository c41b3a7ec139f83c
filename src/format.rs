// 💲 Formatting & Parsing Helpers
// Money and date rendering shared by the HTML views, timeline and backup summary,
// plus lenient serde adapters for restoring older backups.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer};

/// Canonical date format for storage, forms and attributes
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ============================================================================
// MONEY
// ============================================================================

/// Format a value as whole dollars with thousands separators
///
/// Example: `-250000.4` → `"-$250,000"`
pub fn format_currency(value: f64) -> String {
    let sign = if value < 0.0 && value.abs().round() > 0.0 { "-" } else { "" };
    format!("{}${}", sign, group_thousands(value.abs().round() as u64))
}

/// Format a value with cents (used for bills and appraisal tables)
pub fn format_currency_cents(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}${}.{:02}", sign, group_thousands(cents / 100), cents % 100)
}

fn group_thousands(mut n: u64) -> String {
    if n == 0 {
        return "0".to_string();
    }

    let mut groups = Vec::new();
    while n > 0 {
        groups.push(n % 1000);
        n /= 1000;
    }

    let mut out = groups.pop().map(|g| g.to_string()).unwrap_or_default();
    while let Some(g) = groups.pop() {
        out.push_str(&format!(",{:03}", g));
    }
    out
}

// ============================================================================
// DATES
// ============================================================================

/// Render a date as `YYYY-MM-DD`
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Parse a date, accepting `YYYY-MM-DD` and legacy ISO datetimes
/// (`2024-01-01T00:00:00`, with or without fractional seconds)
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, DATE_FORMAT) {
        return Some(date);
    }

    NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|dt| dt.date())
        .ok()
}

// ============================================================================
// HTML
// ============================================================================

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

// ============================================================================
// SERDE ADAPTERS
// ============================================================================

/// Deserialize a required date leniently (see [`parse_date`])
pub fn de_date<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_date(&raw).ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", raw)))
}

/// Deserialize an optional date leniently; `null` and `""` become `None`
pub fn de_opt_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_date(&s)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid date: {}", s))),
    }
}

/// Treat an explicit JSON `null` as the type's default
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0), "$0");
        assert_eq!(format_currency(999.0), "$999");
        assert_eq!(format_currency(600000.0), "$600,000");
        assert_eq!(format_currency(1234567.6), "$1,234,568");
        assert_eq!(format_currency(-250000.0), "-$250,000");
        assert_eq!(format_currency(-0.2), "$0");
    }

    #[test]
    fn test_format_currency_cents() {
        assert_eq!(format_currency_cents(45.0), "$45.00");
        assert_eq!(format_currency_cents(1234.5), "$1,234.50");
        assert_eq!(format_currency_cents(-13000.0), "-$13,000.00");
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        assert_eq!(parse_date("2024-01-15"), Some(expected));
        assert_eq!(parse_date(" 2024-01-15 "), Some(expected));
        assert_eq!(parse_date("2024-01-15T00:00:00"), Some(expected));
        assert_eq!(parse_date("2024-01-15T10:30:00.123456"), Some(expected));
        assert_eq!(parse_date("01/15/2024"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Tom & Jerry's <b>\"farm\"</b>"), "Tom &amp; Jerry&#39;s &lt;b&gt;&quot;farm&quot;&lt;/b&gt;");
        assert_eq!(escape_html("plain"), "plain");
    }

    #[test]
    fn test_lenient_serde_adapters() {
        #[derive(Deserialize)]
        struct Row {
            #[serde(default, deserialize_with = "de_opt_date")]
            when: Option<NaiveDate>,
            #[serde(default, deserialize_with = "null_as_default")]
            done: bool,
        }

        let row: Row = serde_json::from_str(r#"{"when": "2020-05-15T00:00:00", "done": null}"#).unwrap();
        assert_eq!(row.when, NaiveDate::from_ymd_opt(2020, 5, 15));
        assert!(!row.done);

        let empty: Row = serde_json::from_str(r#"{"when": null}"#).unwrap();
        assert_eq!(empty.when, None);

        let missing: Row = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.when, None);
    }
}
