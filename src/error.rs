//! Error types for AMP conversion operations

use std::fmt;

/// Errors that can occur while rewriting HTML into AMP-HTML
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AmperizeError {
    /// The caller did not supply a result handler
    UsageError(String),
    /// HTML parsing failed
    ParseError(String),
    /// An embed is missing the data its rewrite rule needs
    ExtractionError(String),
    /// Configuration could not be decoded
    InvalidConfig(String),
}

impl AmperizeError {
    /// Short, stable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            AmperizeError::UsageError(_) => "usage",
            AmperizeError::ParseError(_) => "parse",
            AmperizeError::ExtractionError(_) => "extraction",
            AmperizeError::InvalidConfig(_) => "config",
        }
    }
}

impl fmt::Display for AmperizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AmperizeError::UsageError(msg) => write!(f, "Usage error: {}", msg),
            AmperizeError::ParseError(msg) => write!(f, "Parse error: {}", msg),
            AmperizeError::ExtractionError(msg) => write!(f, "Extraction error: {}", msg),
            AmperizeError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for AmperizeError {}

impl From<serde_json::Error> for AmperizeError {
    fn from(err: serde_json::Error) -> Self {
        AmperizeError::InvalidConfig(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_message() {
        let err = AmperizeError::ExtractionError("missing permalink".to_string());
        assert_eq!(err.to_string(), "Extraction error: missing permalink");
        assert_eq!(err.kind(), "extraction");
    }

    #[test]
    fn test_json_error_maps_to_invalid_config() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err: AmperizeError = json_err.into();
        assert!(matches!(err, AmperizeError::InvalidConfig(_)));
    }
}
