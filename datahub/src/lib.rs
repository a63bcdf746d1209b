//! Data Analytics Hub - S3 data service
//!
//! Accepts JSON documents over HTTP and keeps them as objects in an
//! S3-compatible bucket (Minio in development).

pub mod bucket;
pub mod config;
pub mod handlers;
pub mod router;

pub use config::Config;
pub use router::{create_router, AppState};
