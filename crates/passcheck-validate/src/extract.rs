//! Numbers embedded in aliases and column headers.

use std::sync::LazyLock;

use regex::Regex;

/// First `(digits)` run, e.g. the multiplier in `double points(2)`.
static PARENTHESIZED_INT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d+)\)").expect("Invalid parenthesized integer regex"));

/// `name (id)` headers such as `Award_points(17909)` or `needResources (17886)`.
static COLUMN_PARAMETER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(.*?)\s*\((\d+)\)\s*$").expect("Invalid column parameter regex")
});

pub fn parenthesized_int(text: &str) -> Option<i64> {
    PARENTHESIZED_INT
        .captures(text)
        .and_then(|caps| caps.get(1))
        .and_then(|digits| digits.as_str().parse().ok())
}

/// Split a parameterised column header into its name and numeric id.
pub fn column_parameter(header: &str) -> Option<(&str, i64)> {
    let caps = COLUMN_PARAMETER.captures(header)?;
    let name = caps.get(1)?.as_str();
    let id = caps.get(2)?.as_str().parse().ok()?;
    Some((name, id))
}

/// Columns of a row whose header is `prefix(<id>)`, in header order.
///
/// Headers that start with the prefix but carry no parsable id come back as
/// `Err(header)` so callers can warn about them.
pub fn parameter_columns<'a>(
    columns: impl Iterator<Item = (&'a str, &'a str)>,
    prefix: &str,
) -> Vec<Result<(i64, &'a str, &'a str), &'a str>> {
    columns
        .filter(|(header, _)| header.starts_with(prefix))
        .map(|(header, value)| match column_parameter(header) {
            Some((_, id)) => Ok((id, header, value)),
            None => Err(header),
        })
        .collect()
}
