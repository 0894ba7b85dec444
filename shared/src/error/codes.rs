//! Unified error codes for the sync bridge
//!
//! Error codes are organized by category:
//! - 0xxx: General / validation errors
//! - 1xxx: Authentication errors
//! - 2xxx: Configuration errors
//! - 3xxx: Sync delivery errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-system compatibility (the CRM consumes these in webhook error
/// reports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Invalid request
    InvalidRequest = 5,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// API key header missing from the request
    MissingApiKey = 1001,
    /// API key does not match the configured key
    InvalidApiKey = 1002,
    /// Server-side API key is not configured
    ApiKeyNotConfigured = 1003,

    // ==================== 2xxx: Configuration ====================
    /// Outbound webhook endpoint URL is not configured
    EndpointNotConfigured = 2001,
    /// Outbound webhook credential is not configured
    CredentialNotConfigured = 2002,

    // ==================== 3xxx: Sync delivery ====================
    /// Remote endpoint returned a non-2xx response
    WebhookRejected = 3001,
    /// Network-level failure (connect, timeout) before any response
    WebhookTransport = 3002,
    /// Order lacks the external identifiers required for sync
    OrderNotSyncable = 3003,
    /// A reconciliation attempt for this order is already in flight
    SyncInFlight = 3004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u16 {
        *self as u16
    }

    /// Get the default message for this error code
    pub fn message(&self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::Unknown => "Unknown error",
            Self::ValidationFailed => "Validation failed",
            Self::NotFound => "Resource not found",
            Self::InvalidRequest => "Invalid request",
            Self::RequiredField => "Required field missing",

            Self::MissingApiKey => "Missing API key header",
            Self::InvalidApiKey => "Invalid API key",
            Self::ApiKeyNotConfigured => "API key not configured on server",

            Self::EndpointNotConfigured => "Webhook endpoint not configured",
            Self::CredentialNotConfigured => "Webhook credential not configured",

            Self::WebhookRejected => "Webhook rejected by remote endpoint",
            Self::WebhookTransport => "Webhook request failed to reach remote endpoint",
            Self::OrderNotSyncable => "Order has no external identifiers",
            Self::SyncInFlight => "Sync attempt already in flight for this order",

            Self::InternalError => "Internal server error",
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> http::StatusCode {
        use http::StatusCode;
        match self {
            Self::Success => StatusCode::OK,
            Self::Unknown => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ValidationFailed | Self::InvalidRequest | Self::RequiredField => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,

            Self::MissingApiKey => StatusCode::UNAUTHORIZED,
            Self::InvalidApiKey => StatusCode::FORBIDDEN,
            Self::ApiKeyNotConfigured => StatusCode::INTERNAL_SERVER_ERROR,

            Self::EndpointNotConfigured | Self::CredentialNotConfigured => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            Self::WebhookRejected | Self::WebhookTransport => StatusCode::BAD_GATEWAY,
            Self::OrderNotSyncable => StatusCode::UNPROCESSABLE_ENTITY,
            Self::SyncInFlight => StatusCode::CONFLICT,

            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> u16 {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into an [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Success),
            1 => Ok(Self::Unknown),
            2 => Ok(Self::ValidationFailed),
            3 => Ok(Self::NotFound),
            5 => Ok(Self::InvalidRequest),
            7 => Ok(Self::RequiredField),
            1001 => Ok(Self::MissingApiKey),
            1002 => Ok(Self::InvalidApiKey),
            1003 => Ok(Self::ApiKeyNotConfigured),
            2001 => Ok(Self::EndpointNotConfigured),
            2002 => Ok(Self::CredentialNotConfigured),
            3001 => Ok(Self::WebhookRejected),
            3002 => Ok(Self::WebhookTransport),
            3003 => Ok(Self::OrderNotSyncable),
            3004 => Ok(Self::SyncInFlight),
            9001 => Ok(Self::InternalError),
            other => Err(InvalidErrorCode(other)),
        }
    }
}
