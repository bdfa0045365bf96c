//! Free-form publish-date parsing into one canonical timestamp form
//!
//! Dates come off listing pages in every shape imaginable. [`DateNormalizer`]
//! turns whatever it can into `YYYY-MM-DD hh:mm AM/PM <TZ>` in a fixed
//! reference zone, and hands back the raw text when it cannot.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Output pattern for canonical timestamps
pub const CANONICAL_FORMAT: &str = "%Y-%m-%d %I:%M %p %Z";

/// Default reference zone for naive timestamps
pub const DEFAULT_TIMEZONE: &str = "Asia/Kolkata";

/// Label prefixes removed before parsing, longest first
const DATE_PREFIXES: &[&str] = &["Last Updated:", "Updated:", "Published:", "Posted:"];

/// Loose English datetime layouts tried before the generic fuzzy parser
const LOOSE_DATETIME_PATTERNS: &[&str] = &[
    "%B %d, %Y %I:%M %p", // March 5, 2024 10:00 AM
    "%B %d, %Y, %I:%M %p", // March 5, 2024, 10:00 AM
    "%B %d, %Y %I:%M%p",  // March 5, 2024 10:00AM
    "%d %B %Y %I:%M %p",  // 5 March 2024 10:00 AM
    "%d %B %Y, %I:%M %p", // 5 March 2024, 10:00 AM
    "%B %d, %Y %H:%M",    // March 5, 2024 22:15
    "%d %B %Y %H:%M",     // 5 March 2024 22:15
    "%d %B %Y, %H:%M",    // 5 March 2024, 22:15
    "%Y-%m-%d %H:%M:%S",  // 2024-03-05 22:15:00
    "%Y-%m-%d %H:%M",     // 2024-03-05 22:15
    "%Y-%m-%dT%H:%M:%S",  // 2024-03-05T22:15:00
    "%d-%m-%Y %H:%M",     // 05-03-2024 22:15
];

/// Loose English date-only layouts, interpreted as local midnight
const LOOSE_DATE_PATTERNS: &[&str] = &[
    "%B %d, %Y", // March 5, 2024
    "%d %B %Y",  // 5 March 2024
    "%d %B, %Y", // 5 March, 2024
    "%Y-%m-%d",  // 2024-03-05
    "%d-%m-%Y",  // 05-03-2024
];

/// Parses publish dates into canonical strings in a reference zone
#[derive(Debug, Clone)]
pub struct DateNormalizer {
    zone: Tz,
}

impl DateNormalizer {
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// Build from an IANA zone name such as `Asia/Kolkata`
    ///
    /// # Errors
    ///
    /// Returns the zone name back if it is not in the timezone database
    pub fn from_name(name: &str) -> Result<Self, String> {
        name.parse::<Tz>()
            .map(Self::new)
            .map_err(|e| format!("unknown timezone {name:?}: {e}"))
    }

    pub fn zone(&self) -> Tz {
        self.zone
    }

    /// Normalize a raw date string
    ///
    /// Returns `None` for empty input, the canonical form when any parse
    /// succeeds, and the prefix-stripped raw text otherwise. Never fails.
    pub fn parse(&self, raw: Option<&str>, explicit_formats: &[String]) -> Option<String> {
        let raw = raw?.trim();
        if raw.is_empty() {
            return None;
        }

        let stripped = strip_date_prefix(raw);
        if stripped.is_empty() {
            return None;
        }

        if let Some(dt) = self.parse_fuzzy(stripped) {
            return Some(self.format(dt));
        }

        if let Some(dt) = self.parse_explicit(stripped, explicit_formats) {
            return Some(self.format(dt));
        }

        tracing::debug!(raw = %stripped, "Keeping unparseable date text verbatim");
        Some(stripped.to_string())
    }

    /// Render a UTC instant in the reference zone
    pub fn format(&self, dt: DateTime<Utc>) -> String {
        dt.with_timezone(&self.zone)
            .format(CANONICAL_FORMAT)
            .to_string()
    }

    /// Offset-aware formats, loose English layouts, then `dateparser`
    fn parse_fuzzy(&self, text: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
            return Some(dt.with_timezone(&Utc));
        }

        if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
            return Some(dt.with_timezone(&Utc));
        }

        // A local time the zone skips (DST gap) falls through to later parsers
        for pattern in LOOSE_DATETIME_PATTERNS {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, pattern) {
                if let Some(dt) = self.localize(naive) {
                    return Some(dt);
                }
            }
        }

        for pattern in LOOSE_DATE_PATTERNS {
            if let Ok(date) = NaiveDate::parse_from_str(text, pattern) {
                if let Some(dt) = date.and_hms_opt(0, 0, 0).and_then(|n| self.localize(n)) {
                    return Some(dt);
                }
            }
        }

        dateparser::parse_with_timezone(text, &self.zone).ok()
    }

    /// Site-specific `chrono` patterns, in order
    fn parse_explicit(&self, text: &str, formats: &[String]) -> Option<DateTime<Utc>> {
        for format in formats {
            if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
                if let Some(dt) = self.localize(naive) {
                    return Some(dt);
                }
            }

            if let Ok(date) = NaiveDate::parse_from_str(text, format) {
                if let Some(dt) = date.and_hms_opt(0, 0, 0).and_then(|n| self.localize(n)) {
                    return Some(dt);
                }
            }
        }

        None
    }

    /// Attach the reference zone to a naive timestamp
    fn localize(&self, naive: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.zone
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

impl Default for DateNormalizer {
    fn default() -> Self {
        Self::new(chrono_tz::Asia::Kolkata)
    }
}

/// Remove a leading "Updated:"-style label and surrounding whitespace
pub fn strip_date_prefix(text: &str) -> &str {
    let text = text.trim();

    DATE_PREFIXES
        .iter()
        .find_map(|prefix| text.strip_prefix(prefix))
        .map_or(text, str::trim)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalizer() -> DateNormalizer {
        DateNormalizer::default()
    }

    #[test]
    fn test_month_name_with_meridiem() {
        let parsed = normalizer().parse(Some("March 5, 2024 10:00 AM"), &[]);
        assert_eq!(parsed.as_deref(), Some("2024-03-05 10:00 AM IST"));
    }

    #[test]
    fn test_unparseable_kept_verbatim() {
        let parsed = normalizer().parse(Some("not a date"), &[]);
        assert_eq!(parsed.as_deref(), Some("not a date"));
    }

    #[test]
    fn test_empty_is_none() {
        assert_eq!(normalizer().parse(None, &[]), None);
        assert_eq!(normalizer().parse(Some("   "), &[]), None);
        assert_eq!(normalizer().parse(Some("Updated:"), &[]), None);
    }

    #[test]
    fn test_prefixes_stripped() {
        assert_eq!(strip_date_prefix("Updated: March 5, 2024"), "March 5, 2024");
        assert_eq!(strip_date_prefix("Last Updated: 5 March 2024"), "5 March 2024");
        assert_eq!(strip_date_prefix("  Posted:  yesterday "), "yesterday");
        // Case-sensitive
        assert_eq!(strip_date_prefix("updated: today"), "updated: today");
    }

    #[test]
    fn test_prefixed_value_parsed() {
        let parsed = normalizer().parse(Some("Published: March 5, 2024 10:00 AM"), &[]);
        assert_eq!(parsed.as_deref(), Some("2024-03-05 10:00 AM IST"));

        let parsed = normalizer().parse(Some("Posted: gibberish"), &[]);
        assert_eq!(parsed.as_deref(), Some("gibberish"));
    }

    #[test]
    fn test_offset_aware_input_converted_to_reference_zone() {
        let parsed = normalizer().parse(Some("2024-03-05T10:00:00Z"), &[]);
        assert_eq!(parsed.as_deref(), Some("2024-03-05 03:30 PM IST"));
    }

    #[test]
    fn test_date_only_is_midnight() {
        let parsed = normalizer().parse(Some("5 March 2024"), &[]);
        assert_eq!(parsed.as_deref(), Some("2024-03-05 12:00 AM IST"));
    }

    #[test]
    fn test_explicit_format_fallback() {
        let formats = vec!["%d|%m|%Y %Hh%M".to_string()];
        let parsed = normalizer().parse(Some("05|03|2024 18h30"), &formats);
        assert_eq!(parsed.as_deref(), Some("2024-03-05 06:30 PM IST"));
    }

    #[test]
    fn test_explicit_date_only_format() {
        let formats = vec!["%d|%m|%Y".to_string()];
        let parsed = normalizer().parse(Some("05|03|2024"), &formats);
        assert_eq!(parsed.as_deref(), Some("2024-03-05 12:00 AM IST"));
    }

    #[test]
    fn test_other_reference_zone() {
        let normalizer = DateNormalizer::from_name("America/New_York").unwrap();
        let parsed = normalizer.parse(Some("2024-07-04 09:15"), &[]);
        assert_eq!(parsed.as_deref(), Some("2024-07-04 09:15 AM EDT"));
    }

    #[test]
    fn test_skipped_local_time_tries_next_format() {
        // 02:30 on 2024-03-10 does not exist in New York
        let normalizer = DateNormalizer::from_name("America/New_York").unwrap();
        let gap = NaiveDate::from_ymd_opt(2024, 3, 10)
            .and_then(|d| d.and_hms_opt(2, 30, 0))
            .unwrap();
        assert_eq!(normalizer.localize(gap), None);

        let formats = vec!["%Y-%m-%d %H:%M".to_string(), "%Y-%d-%m %H:%M".to_string()];
        let parsed = normalizer
            .parse_explicit("2024-03-10 02:30", &formats)
            .map(|dt| normalizer.format(dt));
        assert_eq!(parsed.as_deref(), Some("2024-10-03 02:30 AM EDT"));
    }

    #[test]
    fn test_unknown_zone_rejected() {
        assert!(DateNormalizer::from_name("Mars/Olympus_Mons").is_err());
    }
}
