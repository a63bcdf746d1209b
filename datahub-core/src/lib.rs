//! Core types for datahub
//!
//! This crate provides the error taxonomy and request identifiers shared by
//! the storage layer and the HTTP service.

pub mod error;
pub mod request_id;

pub use error::{ApiError, ErrorCode};
pub use request_id::{RequestId, REQUEST_ID_HEADER};
