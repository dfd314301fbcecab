//! Helpers for pulling fields out of recognised document text.

use chrono::NaiveDate;
use regex::Regex;

/// First capture group of the first pattern that matches, trimmed.
pub fn first_capture(patterns: &[Regex], text: &str) -> Option<String> {
    patterns.iter().find_map(|re| {
        re.captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

/// Reads a date written as `2025-2-6` or `2025年2月6日`.
///
/// Patterns passed to [`first_date`] capture year, month and day separately.
pub fn first_date(patterns: &[Regex], text: &str) -> Option<NaiveDate> {
    patterns.iter().find_map(|re| {
        let caps = re.captures(text)?;
        let year = caps.get(1)?.as_str().parse().ok()?;
        let month = caps.get(2)?.as_str().parse().ok()?;
        let day = caps.get(3)?.as_str().parse().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// Message listing the fields a user still has to fill in.
pub fn missing_fields_message(missing: &[&str]) -> String {
    if missing.is_empty() {
        "Recognition complete".to_string()
    } else {
        format!("Recognised; fill in manually: {}", missing.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_capture_tries_patterns_in_order() {
        let patterns = vec![
            Regex::new(r"编号[：:]\s*(\w+)").unwrap(),
            Regex::new(r"NO\.(\d+)").unwrap(),
        ];
        assert_eq!(first_capture(&patterns, "NO.12 编号：AB3"), Some("AB3".to_string()));
        assert_eq!(first_capture(&patterns, "NO.12"), Some("12".to_string()));
        assert_eq!(first_capture(&patterns, "nothing"), None);
    }

    #[test]
    fn test_first_date_rejects_impossible_dates() {
        let patterns = vec![Regex::new(r"(\d{4})[-年](\d{1,2})[-月](\d{1,2})").unwrap()];
        assert_eq!(
            first_date(&patterns, "签订 2025年2月6日"),
            NaiveDate::from_ymd_opt(2025, 2, 6)
        );
        assert_eq!(first_date(&patterns, "2025-13-40"), None);
    }

    #[test]
    fn test_missing_fields_message() {
        assert_eq!(missing_fields_message(&[]), "Recognition complete");
        assert!(missing_fields_message(&["日期", "净重"]).ends_with("日期, 净重"));
    }
}
