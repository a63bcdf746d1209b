//! API error types and formatting

use serde::Serialize;
use thiserror::Error;

/// Error codes surfaced by the HTTP API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Input
    NoDataProvided,
    InvalidPayload,

    // Lookup
    FileNotFound,
    RouteNotFound,

    // Storage
    StorageFailure,
    StorageUnavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoDataProvided => "NoDataProvided",
            Self::InvalidPayload => "InvalidPayload",
            Self::FileNotFound => "FileNotFound",
            Self::RouteNotFound => "RouteNotFound",
            Self::StorageFailure => "StorageFailure",
            Self::StorageUnavailable => "StorageUnavailable",
        }
    }

    pub fn http_status(&self) -> u16 {
        match self {
            Self::NoDataProvided | Self::InvalidPayload => 400,
            Self::FileNotFound | Self::RouteNotFound => 404,
            Self::StorageFailure => 500,
            Self::StorageUnavailable => 503,
        }
    }
}

/// Error returned to HTTP clients as `{"error": <message>}`
#[derive(Debug, Error)]
#[error("{}: {message}", .code.as_str())]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn no_data() -> Self {
        Self::new(ErrorCode::NoDataProvided, "No data provided")
    }

    pub fn invalid_payload(reason: impl std::fmt::Display) -> Self {
        Self::new(
            ErrorCode::InvalidPayload,
            format!("Invalid JSON payload: {reason}"),
        )
    }

    pub fn file_not_found() -> Self {
        Self::new(ErrorCode::FileNotFound, "File not found")
    }

    pub fn route_not_found() -> Self {
        Self::new(ErrorCode::RouteNotFound, "Not found")
    }

    /// Any failure talking to the store, carrying the raw message
    pub fn storage(message: impl std::fmt::Display) -> Self {
        Self::new(ErrorCode::StorageFailure, message.to_string())
    }

    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Format as the JSON error envelope
    pub fn to_json(&self) -> String {
        #[derive(Serialize)]
        struct Envelope<'a> {
            error: &'a str,
        }

        serde_json::to_string(&Envelope {
            error: &self.message,
        })
        .unwrap_or_else(|_| r#"{"error":"internal error"}"#.to_string())
    }
}
