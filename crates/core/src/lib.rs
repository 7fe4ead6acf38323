//! skiff-core: Core library for the skiff object storage client
//!
//! This crate provides the SDK-independent parts of skiff, including:
//! - Settings validation and the TOML defaults file
//! - Shared AWS credential/config file writing and the interactive bootstrap
//! - Object storage operations over the ObjectBackend trait
//! - Terminal detection, styling and transfer progress
//!
//! This crate is designed to be independent of any specific S3 SDK,
//! allowing the operation logic to be tested against a mocked backend.

pub mod config;
pub mod credentials;
pub mod error;
pub mod progress;
pub mod prompt;
pub mod settings;
pub mod storage;
pub mod terminal;
pub mod traits;
pub mod types;

pub use config::{Config, ConfigManager};
pub use credentials::{CredentialFiles, StoredCredentials};
pub use error::{Error, Result};
pub use progress::{ProgressBar, TransferProgress};
pub use prompt::{ConsolePrompt, CredentialPrompt, bootstrap};
pub use settings::Settings;
pub use storage::{AccessDenial, AccessOutcome, ObjectStorage};
pub use traits::ObjectBackend;
pub use types::{CallerIdentity, Delete, Download, List, ListPage, ObjectEntry, Upload, UploadArguments};
