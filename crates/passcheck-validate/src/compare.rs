//! Tolerant value comparison.

use std::sync::LazyLock;

use regex::Regex;

use passcheck_model::{parse_float, parse_int};

/// Monetary values match when they differ by less than this.
pub const FLOAT_TOLERANCE: f64 = 0.001;

static UNPADDED_HOUR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d{4}-\d{2}-\d{2}) (\d):(\d{2}):(\d{2})").expect("Invalid date hour regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareMode {
    Exact,
    CaseInsensitive,
    /// Date-times with the hour zero-padded on both sides.
    Date,
    /// Integers; a trailing `%` is tolerated on the expected side.
    Integer,
    /// Numbers within [`FLOAT_TOLERANCE`]; a leading `$` is tolerated.
    Float,
    /// Comma-separated ids, order and whitespace insensitive.
    IdSet,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    Match,
    Mismatch,
    /// One side could not be read in this mode; the check is skipped.
    Unparsable(String),
}

impl CompareMode {
    pub fn compare(self, expected: &str, actual: &str) -> Comparison {
        let matched = match self {
            CompareMode::Exact => expected == actual,
            CompareMode::CaseInsensitive => expected.to_lowercase() == actual.to_lowercase(),
            CompareMode::Date => normalize_date(expected) == normalize_date(actual),
            CompareMode::IdSet => normalize_id_set(expected) == normalize_id_set(actual),
            CompareMode::Integer => {
                let expected = match parse_int(expected.trim().trim_end_matches('%')) {
                    Ok(value) => value,
                    Err(err) => return Comparison::Unparsable(err.to_string()),
                };
                match parse_int(actual) {
                    Ok(actual) => expected == actual,
                    Err(err) => return Comparison::Unparsable(err.to_string()),
                }
            }
            CompareMode::Float => {
                let expected = match parse_money(expected) {
                    Ok(value) => value,
                    Err(err) => return Comparison::Unparsable(err),
                };
                match parse_money(actual) {
                    Ok(actual) => (expected - actual).abs() < FLOAT_TOLERANCE,
                    Err(err) => return Comparison::Unparsable(err),
                }
            }
        };
        if matched {
            Comparison::Match
        } else {
            Comparison::Mismatch
        }
    }
}

fn parse_money(text: &str) -> Result<f64, String> {
    parse_float(text.trim().trim_start_matches('$')).map_err(|err| err.to_string())
}

/// Zero-pad a single-digit hour in `YYYY-MM-DD H:MM:SS`; anything else is
/// returned unchanged.
pub fn normalize_date(text: &str) -> String {
    let trimmed = text.trim();
    match UNPADDED_HOUR.captures(trimmed) {
        Some(caps) => {
            let rest = &trimmed[caps.get(0).map_or(0, |m| m.end())..];
            format!("{} 0{}:{}:{}{rest}", &caps[1], &caps[2], &caps[3], &caps[4])
        }
        None => trimmed.to_string(),
    }
}

/// Split on commas, trim, drop empties and sort.
pub fn normalize_id_set(text: &str) -> Vec<String> {
    let mut ids: Vec<String> = text
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect();
    ids.sort();
    ids
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn date_normalization_pads_single_digit_hours() {
        assert_eq!(normalize_date("2024-01-05 7:00:00"), "2024-01-05 07:00:00");
        assert_eq!(normalize_date("2024-01-05 07:00:00"), "2024-01-05 07:00:00");
        assert_eq!(
            CompareMode::Date.compare("2024-01-05 7:00:00", "2024-01-05 07:00:00"),
            Comparison::Match
        );
        assert_eq!(normalize_date("soon"), "soon");
    }

    #[test]
    fn float_comparison_uses_tolerance() {
        assert_eq!(CompareMode::Float.compare("10.001", "10.0005"), Comparison::Match);
        assert_eq!(CompareMode::Float.compare("10.01", "10.0005"), Comparison::Mismatch);
        assert_eq!(CompareMode::Float.compare("$4.99", "4.99"), Comparison::Match);
        assert!(matches!(
            CompareMode::Float.compare("free", "4.99"),
            Comparison::Unparsable(_)
        ));
    }

    #[test]
    fn integer_comparison_tolerates_percent_on_expected_side() {
        assert_eq!(CompareMode::Integer.compare("30%", "30"), Comparison::Match);
        assert_eq!(CompareMode::Integer.compare(" 5 ", "6"), Comparison::Mismatch);
        assert!(matches!(
            CompareMode::Integer.compare("5", "five"),
            Comparison::Unparsable(_)
        ));
    }

    #[test]
    fn id_sets_ignore_order_and_spacing() {
        assert_eq!(CompareMode::IdSet.compare("3, 1,2", "1,2,3"), Comparison::Match);
        assert_eq!(CompareMode::IdSet.compare("1,2", "1,2,4"), Comparison::Mismatch);
        assert_eq!(CompareMode::IdSet.compare("", ""), Comparison::Match);
    }

    #[test]
    fn case_insensitive_handles_unicode() {
        assert_eq!(
            CompareMode::CaseInsensitive.compare("Предмет", "предмет"),
            Comparison::Match
        );
        assert_eq!(CompareMode::Exact.compare("Item", "item"), Comparison::Mismatch);
    }

    proptest! {
        #[test]
        fn date_normalization_is_idempotent(
            day in 1u32..=28,
            hour in 0u32..=23,
            minute in 0u32..=59,
        ) {
            let raw = format!("2024-03-{day:02} {hour}:{minute:02}:00");
            let once = normalize_date(&raw);
            prop_assert_eq!(normalize_date(&once), once.clone());
            prop_assert_eq!(once, format!("2024-03-{day:02} {hour:02}:{minute:02}:00"));
        }

        #[test]
        fn id_set_is_order_insensitive(mut ids in proptest::collection::vec(0u32..1000, 0..8)) {
            let forward = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(",");
            ids.reverse();
            let backward = ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
            prop_assert_eq!(CompareMode::IdSet.compare(&forward, &backward), Comparison::Match);
        }

        #[test]
        fn float_within_tolerance_matches(base in 0.0f64..10_000.0, offset in -0.0009f64..0.0009) {
            let expected = format!("{base}");
            let actual = format!("{}", base + offset);
            prop_assert_eq!(CompareMode::Float.compare(&expected, &actual), Comparison::Match);
        }
    }
}
