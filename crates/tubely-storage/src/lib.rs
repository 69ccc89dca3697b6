//! Tubely Storage Library
//!
//! Object storage abstraction and its backends: S3 (via `object_store`), the local
//! filesystem and an in-process memory store for development and tests.
//!
//! # Storage key format
//!
//! Every object key is `{prefix}/{64 hex chars}.{ext}`, where the hex part encodes 32
//! bytes from the operating system's CSPRNG. Videos use their aspect classification
//! as prefix (`landscape`, `portrait`, `other`), thumbnails use `thumbnails`. Key
//! generation lives in the `keys` module so all callers agree on the layout.
//!
//! # Signed URLs
//!
//! S3 hands out native presigned GET URLs. The local and memory backends sign
//! `{base_url}/{key}?expires=..&signature=..` with HMAC-SHA256 (see `signing`); the
//! API verifies those on its asset route.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod signing;
pub mod traits;

// Re-export commonly used types
pub use factory::{create_storage, url_signer};
pub use keys::{content_type_for_key, derive_key, KeyError};
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use signing::{SignatureError, UrlSigner};
pub use traits::{ByteStream, Storage, StorageError, StorageResult};
pub use tubely_core::StorageBackend;
