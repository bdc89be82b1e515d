use std::{fmt::Display, str::FromStr};

use thiserror::Error;

/// Errors related to application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An environment variable required by the application is not set.
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    /// A setting was supplied but is not a number.
    #[error("Invalid value for {name}: {value:?} is not a number ({reason})")]
    InvalidNumber {
        name: String,
        value: String,
        reason: String,
    },
}

/// Parses a numeric setting, falling back to `default` when it is absent or blank.
///
/// Only parseability is checked; range rules belong to the caller.
///
/// # Arguments
/// * `name` - Setting name, used in the error message.
/// * `raw` - The raw value, if one was supplied.
/// * `default` - Value used when `raw` is `None` or blank.
pub fn parse_number_or<T>(name: &str, raw: Option<&str>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match raw.map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse::<T>().map_err(|e| ConfigError::InvalidNumber {
            name: name.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_and_blank_use_default() {
        assert_eq!(parse_number_or("lookback", None, 30u32).unwrap(), 30);
        assert_eq!(parse_number_or("lookback", Some("  "), 30u32).unwrap(), 30);
    }

    #[test]
    fn parses_trimmed_numbers() {
        assert_eq!(parse_number_or("region", Some(" 7 "), 2u32).unwrap(), 7);
        let pct: f64 = parse_number_or("threshold", Some("12.5"), 20.0).unwrap();
        assert!((pct - 12.5).abs() < f64::EPSILON);
    }

    #[test]
    fn rejects_non_numeric_values() {
        let err = parse_number_or("region", Some("two"), 2u32).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { ref name, .. } if name == "region"));
        assert!(err.to_string().contains("\"two\""));
    }
}
