use crate::adapters::dropbox::DropboxClient;
use crate::config::AdapterConfig;
use crate::core::naming::GenerateFilename;
use crate::core::path::{resolve_remote_path, select_base};
use crate::domain::model::{FileDescriptor, Schema, SharedLink};
use crate::domain::ports::{RemoteClient, StorageAdapter};
use crate::domain::remote::{FolderMetadata, ListFolderResult, Metadata, ResponseHeaders};
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::Validate;
use async_trait::async_trait;
use std::io;
use url::Url;

/// Persists host uploads to Dropbox.
#[derive(Debug)]
pub struct DropboxAdapter<C: RemoteClient = DropboxClient> {
    client: C,
    config: AdapterConfig,
    schema: Schema,
    generate_filename: GenerateFilename,
}

impl DropboxAdapter<DropboxClient> {
    pub fn new(config: AdapterConfig, schema: Schema) -> Result<Self> {
        config.validate()?;
        let client = DropboxClient::new(&config)?;
        Self::with_client(client, config, schema)
    }
}

impl<C: RemoteClient> DropboxAdapter<C> {
    pub fn with_client(client: C, config: AdapterConfig, schema: Schema) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            client,
            config,
            schema,
            generate_filename: GenerateFilename::default(),
        })
    }

    pub fn with_filename_generator(mut self, generate_filename: GenerateFilename) -> Self {
        self.generate_filename = generate_filename;
        self
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Absolute remote path of `file`. Upload, delete and existence checks
    /// all go through here.
    pub fn resolve_filename(&self, file: &FileDescriptor) -> String {
        let base = select_base(file.path.as_deref(), self.config.path.as_deref());
        resolve_remote_path(base, file.remote_name())
    }

    /// Uploads the local file, overwriting any object at the target path,
    /// and attaches the remote name, folder, id and direct-access URL.
    pub async fn upload_file(&self, mut file: FileDescriptor) -> Result<FileDescriptor> {
        let filename = self.generate_filename.generate(&file, 0).await?;

        file.path = Some(select_base(file.path.as_deref(), self.config.path.as_deref()).to_string());
        file.filename = Some(filename);
        let destpath = self.resolve_filename(&file);

        let local_path = file.local_path.clone().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::NotFound,
                format!("upload of {} has no local file", file.originalname),
            )
        })?;
        let data = tokio::fs::read(&local_path).await?;
        if file.size != 0 && data.len() as u64 != file.size {
            tracing::warn!(
                "Size mismatch for {}: descriptor says {} bytes, read {}",
                local_path.display(),
                file.size,
                data.len()
            );
        }
        file.size = data.len() as u64;

        tracing::debug!(
            "Uploading {} ({}, {} bytes) to {}",
            file.originalname,
            file.mimetype,
            file.size,
            destpath
        );
        let uploaded = self.client.upload(&destpath, data).await?;
        let path_display = uploaded.path_display.unwrap_or(destpath);

        let shared = self.share(&path_display, &uploaded.id).await?;

        file.id = Some(shared.id);
        file.path_display = Some(shared.path_display);
        file.url = Some(shared.url);

        tracing::info!("Uploaded {} to {}", file.originalname, path_display);
        Ok(file)
    }

    pub fn get_file_url(&self, file: &FileDescriptor) -> Option<String> {
        file.url.clone()
    }

    pub async fn remove_file(&self, file: &FileDescriptor) -> Result<()> {
        let fullpath = self.resolve_filename(file);
        tracing::debug!("Deleting {}", fullpath);

        self.client.delete(&fullpath).await?;
        tracing::info!("Removed {}", fullpath);
        Ok(())
    }

    /// `Some(headers)` when something exists under `filename` in the base
    /// folder: a file, or a folder with at least one entry.
    pub async fn file_exists(&self, filename: &str) -> Result<Option<ResponseHeaders>> {
        let fullpath = self.resolve_filename(&FileDescriptor::stored(filename, None));

        let stat = match self.client.get_metadata(&fullpath).await? {
            Some(stat) => stat,
            None => return Ok(None),
        };

        match stat.metadata {
            Metadata::File(_) => Ok(Some(stat.headers)),
            Metadata::Folder(_) => {
                let listing = self.client.list_folder(&fullpath).await?;
                if listing.entries.is_empty() {
                    Ok(None)
                } else {
                    Ok(Some(listing.headers))
                }
            }
            Metadata::Deleted(_) => Ok(None),
        }
    }

    pub async fn file_list(&self, path: &str) -> Result<ListFolderResult> {
        self.client.list_folder(path).await
    }

    /// Leaves `/folder_name` existing and empty. Not safe to call
    /// concurrently for the same folder.
    pub async fn update_folder(&self, folder_name: &str) -> Result<FolderMetadata> {
        let path = resolve_remote_path("/", folder_name);
        if path == "/" {
            return Err(AdapterError::InvalidConfigValueError {
                field: "folder_name".to_string(),
                value: folder_name.to_string(),
                reason: "Folder name must not resolve to the root".to_string(),
            });
        }

        if let Some(stat) = self.client.get_metadata(&path).await? {
            tracing::debug!(
                "Clearing existing {} at {}",
                stat.metadata.name(),
                stat.metadata.path_display().unwrap_or(&path)
            );
            self.client.delete(&path).await?;
        }

        let folder = self.client.create_folder(&path).await?;
        tracing::info!("Folder {} is ready", path);
        Ok(folder)
    }

    /// Public direct-download link for an uploaded object, reusing an
    /// existing link when there is one.
    async fn share(&self, path_display: &str, id: &str) -> Result<SharedLink> {
        let existing = self.client.list_shared_links(id).await?;

        let link = match existing.links.into_iter().next() {
            Some(link) => {
                tracing::debug!("Reusing shared link for {}", path_display);
                link
            }
            None => match self.client.create_shared_link(path_display).await {
                Ok(link) => link,
                Err(e) if is_already_shared(&e) => {
                    tracing::debug!("Shared link for {} was created concurrently", path_display);
                    let relisted = self.client.list_shared_links(id).await?;
                    relisted.links.into_iter().next().ok_or(e)?
                }
                Err(e) => return Err(e),
            },
        };

        Ok(SharedLink {
            id: link.id.unwrap_or_else(|| id.to_string()),
            path_display: path_display.to_string(),
            url: direct_download_url(&link.url)?,
        })
    }
}

#[async_trait]
impl<C: RemoteClient> StorageAdapter for DropboxAdapter<C> {
    async fn upload_file(&self, file: FileDescriptor) -> Result<FileDescriptor> {
        DropboxAdapter::upload_file(self, file).await
    }

    fn get_file_url(&self, file: &FileDescriptor) -> Option<String> {
        DropboxAdapter::get_file_url(self, file)
    }

    async fn remove_file(&self, file: &FileDescriptor) -> Result<()> {
        DropboxAdapter::remove_file(self, file).await
    }
}

fn is_already_shared(err: &AdapterError) -> bool {
    err.remote_summary()
        .is_some_and(|summary| summary.starts_with("shared_link_already_exists"))
}

/// Switches a share link from the preview page (`dl=0`) to the raw
/// content (`dl=1`), keeping the other query parameters in order.
pub fn direct_download_url(link: &str) -> Result<String> {
    let mut url = Url::parse(link).map_err(|e| AdapterError::InvalidSharedLink {
        url: link.to_string(),
        reason: e.to_string(),
    })?;

    // Only the dl pair is touched; the rest stays byte-for-byte as Dropbox sent it.
    let mut has_dl = false;
    let mut pairs: Vec<&str> = Vec::new();
    for pair in url.query().unwrap_or_default().split('&') {
        if pair.is_empty() {
            continue;
        }
        if pair.split('=').next() == Some("dl") {
            if !has_dl {
                pairs.push("dl=1");
            }
            has_dl = true;
        } else {
            pairs.push(pair);
        }
    }
    if !has_dl {
        pairs.push("dl=1");
    }

    let query = pairs.join("&");
    url.set_query(Some(&query));
    Ok(url.to_string())
}
