//! Stratus Storage Library
//!
//! This crate provides the storage-provider abstraction and its
//! implementations: the capability-checked `StorageProvider` contract, a
//! mock adapter for development without live credentials, a cloud-drive
//! adapter speaking the provider's HTTP API, and the selector that maps a
//! provider name to a fresh adapter instance.

pub mod cloud_drive;
pub mod mock;
pub mod selector;
pub mod traits;

// Re-export commonly used types
pub use cloud_drive::CloudDriveProvider;
pub use mock::MockProvider;
pub use selector::provider_for;
pub use stratus_core::ProviderKind;
pub use traits::{
    ByteStream, Capability, RemoteFile, StorageError, StorageProvider, StorageResult,
};
