pub mod adapter;
pub mod naming;
pub mod path;

pub use crate::domain::model::{FileDescriptor, Schema, SchemaField, SharedLink};
pub use crate::domain::ports::{RemoteClient, StorageAdapter};
pub use crate::utils::error::Result;
