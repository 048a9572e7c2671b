//! Typed coercion of stored values
//!
//! Each function adapts a leaf [`Value`] to one output type following a fixed
//! conversion table; anything outside the table is a type mismatch.

use super::{ConfigError, ConfigResult, Value};

/// Parse a boolean literal
///
/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
pub fn parse_bool(s: &str) -> Result<bool, ParseBoolError> {
    match s {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(ParseBoolError),
    }
}

/// Error returned by [`parse_bool`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseBoolError;

impl std::fmt::Display for ParseBoolError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("invalid syntax")
    }
}

impl std::error::Error for ParseBoolError {}

/// Split a comma-separated list, trimming whitespace around each item
///
/// The empty string yields an empty list.
pub fn split_list(s: &str) -> Vec<String> {
    if s.is_empty() {
        return Vec::new();
    }
    s.split(',').map(|part| part.trim().to_string()).collect()
}

/// Coerce to `String`
pub fn to_string(value: &Value, path: &str) -> ConfigResult<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        other => Err(ConfigError::type_mismatch(path, "string", other.type_name())),
    }
}

/// Coerce to a machine-width signed integer
pub fn to_int(value: &Value, path: &str) -> ConfigResult<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Float(f) => Ok(*f as i64),
        Value::String(s) => s
            .parse::<i64>()
            .map_err(|e| ConfigError::parse_failed(s.as_str(), path, "int", e)),
        other => Err(ConfigError::type_mismatch(path, "int", other.type_name())),
    }
}

/// Coerce to `bool`
pub fn to_bool(value: &Value, path: &str) -> ConfigResult<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::String(s) => {
            parse_bool(s).map_err(|e| ConfigError::parse_failed(s.as_str(), path, "bool", e))
        }
        other => Err(ConfigError::type_mismatch(path, "bool", other.type_name())),
    }
}

/// Coerce to `f64`
pub fn to_float(value: &Value, path: &str) -> ConfigResult<f64> {
    match value {
        Value::Float(f) => Ok(*f),
        Value::Int(i) => Ok(*i as f64),
        Value::String(s) => s
            .parse::<f64>()
            .map_err(|e| ConfigError::parse_failed(s.as_str(), path, "float64", e)),
        other => Err(ConfigError::type_mismatch(path, "float64", other.type_name())),
    }
}

/// Coerce to a list of strings
pub fn to_string_array(value: &Value, path: &str) -> ConfigResult<Vec<String>> {
    match value {
        Value::String(s) => Ok(split_list(s)),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(index, item)| match item {
                Value::String(s) => Ok(s.clone()),
                other => Err(ConfigError::ArrayElementMismatch {
                    index,
                    path: path.to_string(),
                    found: other.type_name(),
                }),
            })
            .collect(),
        other => Err(ConfigError::type_mismatch(
            path,
            "string array",
            other.type_name(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("1", true)]
    #[case("t", true)]
    #[case("T", true)]
    #[case("TRUE", true)]
    #[case("true", true)]
    #[case("True", true)]
    #[case("0", false)]
    #[case("f", false)]
    #[case("F", false)]
    #[case("FALSE", false)]
    #[case("false", false)]
    #[case("False", false)]
    fn parse_bool_accepts_standard_literals(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(parse_bool(input), Ok(expected));
    }

    #[rstest]
    #[case("yes")]
    #[case("tRUE")]
    #[case("")]
    #[case(" true")]
    fn parse_bool_rejects_everything_else(#[case] input: &str) {
        assert_eq!(parse_bool(input), Err(ParseBoolError));
    }

    #[test]
    fn int_truncates_floats_and_parses_strings() {
        assert_eq!(to_int(&Value::Float(3.99), "p").unwrap(), 3);
        assert_eq!(to_int(&Value::Float(-3.99), "p").unwrap(), -3);
        assert_eq!(to_int(&Value::from("5432"), "p").unwrap(), 5432);
    }

    #[test]
    fn int_parse_failure_names_value_and_path() {
        let err = to_int(&Value::from("abc"), "t.string_value").unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("cannot convert value 'abc' at path 't.string_value' to int: "));
    }

    #[test]
    fn int_rejects_unsigned_values() {
        let err = to_int(&Value::Uint(1), "t.u").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot convert value at path 't.u' to int: found type uint"
        );
    }

    #[test]
    fn float_widens_ints() {
        assert_eq!(to_float(&Value::Int(42), "p").unwrap(), 42.0);
        assert_eq!(to_float(&Value::from("0.75"), "p").unwrap(), 0.75);
        let err = to_float(&Value::Bool(true), "t.bool_value").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot convert value at path 't.bool_value' to float64: found type bool"
        );
    }

    #[test]
    fn string_array_splits_and_trims() {
        assert_eq!(
            to_string_array(&Value::from(" one, two ,three"), "p").unwrap(),
            vec!["one", "two", "three"]
        );
        assert!(to_string_array(&Value::from(""), "p").unwrap().is_empty());
    }

    #[test]
    fn string_array_reports_bad_elements() {
        let mixed = Value::Array(vec![Value::from("string"), Value::Int(123), Value::Bool(true)]);
        let err = to_string_array(&mixed, "test_arrays.mixed_array").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot convert item at index 1 in path 'test_arrays.mixed_array' to string: found type int"
        );
    }

    #[test]
    fn string_rejects_non_strings() {
        let err = to_string(&Value::Int(1), "t.int_value").unwrap_err();
        assert_eq!(
            err.to_string(),
            "cannot convert value at path 't.int_value' to string: found type int"
        );
    }
}
