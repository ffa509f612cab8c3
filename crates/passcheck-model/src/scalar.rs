use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// A loosely-typed JSON leaf.
///
/// Configuration authors write ids and counts as numbers or as strings
/// interchangeably, so leaves are kept as written and coerced on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Scalar {
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Scalar::Int(value) => Some(*value),
            Scalar::Float(value) if value.fract() == 0.0 => Some(*value as i64),
            Scalar::Text(text) => parse_int(text).ok(),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Int(value) => Some(*value as f64),
            Scalar::Float(value) => Some(*value),
            Scalar::Text(text) => parse_float(text).ok(),
            Scalar::Bool(_) => None,
        }
    }

    /// An empty or whitespace-only string counts as "not configured".
    pub fn is_blank(&self) -> bool {
        matches!(self, Scalar::Text(text) if text.trim().is_empty())
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{value}"),
            Scalar::Int(value) => write!(f, "{value}"),
            Scalar::Float(value) => write!(f, "{value}"),
            Scalar::Text(text) => f.write_str(text),
        }
    }
}

impl From<i64> for Scalar {
    fn from(value: i64) -> Self {
        Scalar::Int(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// Parse a trimmed decimal integer.
pub fn parse_int(text: &str) -> Result<i64> {
    text.trim()
        .parse::<i64>()
        .map_err(|_| ModelError::NotInteger {
            value: text.to_string(),
        })
}

/// Parse a trimmed decimal number.
pub fn parse_float(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ModelError::NotNumber {
            value: text.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn numbers_and_strings_deserialize_into_scalars() {
        let values: Vec<Scalar> =
            serde_json::from_str(r#"[17909, "17909", 2.5, true]"#).expect("parse scalars");
        assert_eq!(values[0], Scalar::Int(17909));
        assert_eq!(values[1], Scalar::Text("17909".to_string()));
        assert_eq!(values[2], Scalar::Float(2.5));
        assert_eq!(values[3], Scalar::Bool(true));
    }

    #[test]
    fn integer_coercion_accepts_text_and_whole_floats() {
        assert_eq!(Scalar::from(" 42 ").as_i64(), Some(42));
        assert_eq!(Scalar::Float(3.0).as_i64(), Some(3));
        assert_eq!(Scalar::Float(3.5).as_i64(), None);
        assert_eq!(Scalar::from("abc").as_i64(), None);
    }

    #[test]
    fn parse_errors_keep_the_raw_value() {
        let err = parse_int("12a").expect_err("not an integer");
        assert_eq!(err.to_string(), "'12a' is not an integer");
        assert!(parse_float("inf").is_err());
        assert_eq!(parse_float("4.99").expect("number"), 4.99);
    }

    proptest! {
        #[test]
        fn integers_survive_text_and_padding(value in any::<i64>(), pad in 0usize..3) {
            let text = format!("{}{value}{}", " ".repeat(pad), " ".repeat(pad));
            prop_assert_eq!(Scalar::Text(text.clone()).as_i64(), Some(value));
            prop_assert_eq!(parse_int(&text).ok(), Some(value));
        }
    }
}
