use crate::domain::model::FileDescriptor;
use crate::domain::remote::{
    DeleteResult, FileMetadata, FolderMetadata, ListFolderResult, ListSharedLinksResult,
    SharedLinkMetadata, Stat,
};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::future::Future;

/// Calls the adapter needs from the remote file host. Paths are absolute.
pub trait RemoteClient: Send + Sync {
    /// Writes `contents` to `path`, replacing whatever is there.
    fn upload(
        &self,
        path: &str,
        contents: Vec<u8>,
    ) -> impl Future<Output = Result<FileMetadata>> + Send;

    fn delete(&self, path: &str) -> impl Future<Output = Result<DeleteResult>> + Send;

    fn list_folder(&self, path: &str) -> impl Future<Output = Result<ListFolderResult>> + Send;

    fn create_folder(&self, path: &str) -> impl Future<Output = Result<FolderMetadata>> + Send;

    /// `None` when nothing exists at `path`.
    fn get_metadata(&self, path: &str) -> impl Future<Output = Result<Option<Stat>>> + Send;

    fn create_shared_link(
        &self,
        path: &str,
    ) -> impl Future<Output = Result<SharedLinkMetadata>> + Send;

    /// Existing links for a path or an `id:` identifier.
    fn list_shared_links(
        &self,
        path_or_id: &str,
    ) -> impl Future<Output = Result<ListSharedLinksResult>> + Send;
}

/// What a host persistence layer calls on a storage adapter.
#[async_trait]
pub trait StorageAdapter: Send + Sync {
    async fn upload_file(&self, file: FileDescriptor) -> Result<FileDescriptor>;

    fn get_file_url(&self, file: &FileDescriptor) -> Option<String>;

    async fn remove_file(&self, file: &FileDescriptor) -> Result<()>;
}
