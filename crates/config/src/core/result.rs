//! Result type and utilities for configuration operations

use super::error::ConfigError;

/// Standard result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Extension trait for Result types to add configuration-specific utilities
pub trait ConfigResultExt<T> {
    /// Replace "nothing stored here" errors with a fallback value
    ///
    /// Conversion failures still propagate.
    fn or_default_on_missing(self, default: T) -> ConfigResult<T>;

    /// Convert to option, logging error if present
    fn log_error(self) -> Option<T>;
}

impl<T> ConfigResultExt<T> for ConfigResult<T> {
    fn or_default_on_missing(self, default: T) -> ConfigResult<T> {
        match self {
            Err(e) if e.is_missing() => Ok(default),
            other => other,
        }
    }

    fn log_error(self) -> Option<T> {
        match self {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(error = %e, kind = ?e.kind(), "configuration error");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_values_fall_back() {
        let result: ConfigResult<i64> = Err(ConfigError::key_not_found("port", "db.port"));
        assert_eq!(result.or_default_on_missing(5432).unwrap(), 5432);
    }

    #[test]
    fn conversion_errors_do_not_fall_back() {
        let result: ConfigResult<i64> = Err(ConfigError::type_mismatch("db.port", "int", "bool"));
        assert!(result.or_default_on_missing(5432).is_err());
    }

    #[test]
    fn log_error_discards_the_error() {
        let result: ConfigResult<i64> = Err(ConfigError::EnvRequired);
        assert_eq!(result.log_error(), None);
        assert_eq!(Ok::<_, ConfigError>(1).log_error(), Some(1));
    }
}
