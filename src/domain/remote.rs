// Wire shapes of the Dropbox API v2 responses the adapter consumes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Response headers of a remote call, lowercase names.
pub type ResponseHeaders = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileMetadata {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub rev: Option<String>,
    #[serde(default)]
    pub content_hash: Option<String>,
    #[serde(default)]
    pub client_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub server_modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderMetadata {
    pub name: String,
    pub id: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeletedMetadata {
    pub name: String,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub path_display: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = ".tag", rename_all = "lowercase")]
pub enum Metadata {
    File(FileMetadata),
    Folder(FolderMetadata),
    Deleted(DeletedMetadata),
}

impl Metadata {
    pub fn name(&self) -> &str {
        match self {
            Metadata::File(m) => &m.name,
            Metadata::Folder(m) => &m.name,
            Metadata::Deleted(m) => &m.name,
        }
    }

    pub fn path_display(&self) -> Option<&str> {
        match self {
            Metadata::File(m) => m.path_display.as_deref(),
            Metadata::Folder(m) => m.path_display.as_deref(),
            Metadata::Deleted(m) => m.path_display.as_deref(),
        }
    }
}

/// Metadata lookup result together with the headers it came with.
#[derive(Debug, Clone, PartialEq)]
pub struct Stat {
    pub metadata: Metadata,
    pub headers: ResponseHeaders,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListFolderResult {
    pub entries: Vec<Metadata>,
    #[serde(default)]
    pub cursor: String,
    #[serde(default)]
    pub has_more: bool,
    #[serde(skip)]
    pub headers: ResponseHeaders,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeleteResult {
    pub metadata: Metadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateFolderResult {
    pub metadata: FolderMetadata,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedLinkMetadata {
    pub url: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub path_lower: Option<String>,
    #[serde(default)]
    pub expires: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListSharedLinksResult {
    pub links: Vec<SharedLinkMetadata>,
    #[serde(default)]
    pub has_more: bool,
    #[serde(default)]
    pub cursor: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_folder_entries() {
        let body = serde_json::json!({
            "entries": [
                {
                    ".tag": "file",
                    "name": "a.png",
                    "id": "id:a4ayc_80_OEAAAAAAAAAXw",
                    "path_lower": "/uploads/a.png",
                    "path_display": "/uploads/a.png",
                    "size": 7212,
                    "rev": "a1c10ce0dd78",
                    "server_modified": "2015-05-12T15:50:38Z",
                    "client_modified": "2015-05-12T15:50:38Z",
                    "content_hash": "e3b0c442"
                },
                {
                    ".tag": "folder",
                    "name": "nested",
                    "id": "id:a4ayc_80_OEAAAAAAAAAXz",
                    "path_lower": "/uploads/nested",
                    "path_display": "/uploads/nested"
                }
            ],
            "cursor": "ZtkX9_EHj3x7PMkVuFIhwKYXEpwpLwyxp9vMKomUhllil9q7eWiAu",
            "has_more": false
        });

        let listing: ListFolderResult = serde_json::from_value(body).unwrap();
        assert_eq!(listing.entries.len(), 2);
        assert!(listing.headers.is_empty());

        match &listing.entries[0] {
            Metadata::File(file) => {
                assert_eq!(file.size, 7212);
                assert_eq!(
                    file.server_modified.unwrap().to_rfc3339(),
                    "2015-05-12T15:50:38+00:00"
                );
            }
            other => panic!("expected file, got {:?}", other),
        }
        assert_eq!(listing.entries[1].name(), "nested");
        assert_eq!(listing.entries[1].path_display(), Some("/uploads/nested"));
    }

    #[test]
    fn test_parse_shared_link_ignores_unknown_fields() {
        let body = serde_json::json!({
            ".tag": "file",
            "url": "https://www.dropbox.com/s/2sn712vy1ovegw8/a.png?dl=0",
            "name": "a.png",
            "id": "id:a4ayc_80_OEAAAAAAAAAXw",
            "path_lower": "/uploads/a.png",
            "link_permissions": { "can_revoke": true }
        });

        let link: SharedLinkMetadata = serde_json::from_value(body).unwrap();
        assert_eq!(link.id.as_deref(), Some("id:a4ayc_80_OEAAAAAAAAAXw"));
        assert!(link.expires.is_none());
    }
}
