//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// Categories are determined by the code range:
/// - 0xxx: General / validation errors
/// - 1xxx: Authentication errors
/// - 2xxx: Configuration errors
/// - 3xxx: Sync delivery errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// General / validation errors (0xxx)
    General,
    /// Authentication errors (1xxx)
    Auth,
    /// Configuration errors (2xxx)
    Configuration,
    /// Sync delivery errors (3xxx)
    Delivery,
    /// System errors (9xxx)
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Configuration,
            3000..4000 => Self::Delivery,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Configuration => "configuration",
            Self::Delivery => "delivery",
            Self::System => "system",
        }
    }

    /// Whether errors of this category may succeed on a later attempt.
    ///
    /// Only delivery errors are retryable, and only through the operator
    /// resync path. Validation and auth errors need a corrected request;
    /// configuration errors need a configuration change first.
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Delivery)
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_code() {
        assert_eq!(ErrorCategory::from_code(0), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(7), ErrorCategory::General);
        assert_eq!(ErrorCategory::from_code(999), ErrorCategory::General);

        assert_eq!(ErrorCategory::from_code(1001), ErrorCategory::Auth);
        assert_eq!(ErrorCategory::from_code(2001), ErrorCategory::Configuration);
        assert_eq!(ErrorCategory::from_code(3001), ErrorCategory::Delivery);
        assert_eq!(ErrorCategory::from_code(9001), ErrorCategory::System);
        assert_eq!(ErrorCategory::from_code(10000), ErrorCategory::System);
    }

    #[test]
    fn test_error_code_category() {
        assert_eq!(ErrorCode::ValidationFailed.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::InvalidApiKey.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::EndpointNotConfigured.category(),
            ErrorCategory::Configuration
        );
        assert_eq!(
            ErrorCode::WebhookTransport.category(),
            ErrorCategory::Delivery
        );
        assert_eq!(ErrorCode::InternalError.category(), ErrorCategory::System);
    }

    #[test]
    fn test_retryable() {
        assert!(ErrorCode::WebhookRejected.category().retryable());
        assert!(ErrorCode::WebhookTransport.category().retryable());
        assert!(!ErrorCode::ValidationFailed.category().retryable());
        assert!(!ErrorCode::EndpointNotConfigured.category().retryable());
        assert!(!ErrorCode::InternalError.category().retryable());
    }

    #[test]
    fn test_category_serialize() {
        let json = serde_json::to_string(&ErrorCategory::Delivery).unwrap();
        assert_eq!(json, "\"delivery\"");
        let category: ErrorCategory = serde_json::from_str("\"configuration\"").unwrap();
        assert_eq!(category, ErrorCategory::Configuration);
    }
}
