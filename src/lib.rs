pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;

pub use adapters::dropbox::DropboxClient;
pub use config::{toml_config::TomlConfig, AdapterConfig};
pub use core::{adapter::DropboxAdapter, naming::GenerateFilename};
pub use domain::model::{FileDescriptor, Schema, SchemaField, SharedLink, COMPATIBILITY_LEVEL};
pub use domain::ports::{RemoteClient, StorageAdapter};
pub use utils::error::{AdapterError, Result};
