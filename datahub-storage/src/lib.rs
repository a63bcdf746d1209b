//! Object storage backends for datahub
//!
//! The service talks to an S3-compatible store (Minio in development)
//! through the [`ObjectStore`] trait. [`S3Store`] is the production backend;
//! [`EphemeralStore`] keeps everything in memory.

mod ephemeral;
mod s3;
mod traits;


pub use ephemeral::EphemeralStore;
pub use s3::{S3Settings, S3Store};
pub use traits::{ObjectStore, ObjectSummary, StorageError};
