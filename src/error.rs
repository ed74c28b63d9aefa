use thiserror::Error;

/// Errors raised at the engine boundary
///
/// Missing optional attributes are never errors: they surface as excluded
/// factors in [`FactorBreakdown`](crate::models::FactorBreakdown).
#[derive(Debug, Error)]
pub enum MatchError {
    /// Malformed ranges, out-of-domain coordinates or unknown enumeration values
    #[error("invalid input for `{field}`: {reason}")]
    InvalidInput { field: String, reason: String },

    /// A weight table or option set that cannot be used for scoring
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Settings could not be loaded or deserialized
    #[error("settings error: {0}")]
    Settings(#[from] config::ConfigError),
}

impl MatchError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn unknown_variant(field: &str, value: &str) -> Self {
        Self::invalid(field, format!("unknown value {value:?}"))
    }

    /// Name of the offending field, if this is an input error
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::InvalidInput { field, .. } => Some(field),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, MatchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_message_names_field() {
        let err = MatchError::invalid("budget", "min 5 exceeds max 3");
        assert_eq!(err.field(), Some("budget"));
        assert_eq!(err.to_string(), "invalid input for `budget`: min 5 exceeds max 3");
    }

    #[test]
    fn test_configuration_error_has_no_field() {
        let err = MatchError::Configuration("weights sum to 0.9".to_string());
        assert!(err.field().is_none());
    }
}
