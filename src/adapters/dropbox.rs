use crate::config::AdapterConfig;
use crate::domain::ports::RemoteClient;
use crate::domain::remote::{
    CreateFolderResult, DeleteResult, FileMetadata, FolderMetadata, ListFolderResult,
    ListSharedLinksResult, Metadata, ResponseHeaders, SharedLinkMetadata, Stat,
};
use crate::utils::error::{AdapterError, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const API_ARG_HEADER: &str = "Dropbox-API-Arg";

/// Dropbox HTTP API v2 client.
#[derive(Debug, Clone)]
pub struct DropboxClient {
    client: Client,
    api_url: String,
    content_url: String,
    access_token: String,
}

#[derive(Serialize)]
struct PathArg<'a> {
    path: &'a str,
}

#[derive(Serialize)]
struct UploadArg<'a> {
    path: &'a str,
    mode: &'static str,
    autorename: bool,
    mute: bool,
}

#[derive(Serialize)]
struct CreateFolderArg<'a> {
    path: &'a str,
    autorename: bool,
}

#[derive(Serialize)]
struct ListSharedLinksArg<'a> {
    path: &'a str,
    direct_only: bool,
}

#[derive(Deserialize)]
struct ApiErrorBody {
    error_summary: String,
}

impl DropboxClient {
    pub fn new(config: &AdapterConfig) -> Result<Self> {
        let mut builder = Client::builder().default_headers(extra_headers(config)?);
        if let Some(timeout) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(timeout));
        }

        Ok(Self {
            client: builder.build()?,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            content_url: config.content_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    async fn rpc<A, R>(&self, endpoint: &str, arg: &A) -> Result<(R, ResponseHeaders)>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}/2/{}", self.api_url, endpoint);
        tracing::debug!("Dropbox RPC: {}", endpoint);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.access_token)
            .json(arg)
            .send()
            .await?;

        Self::decode(endpoint, response).await
    }

    async fn decode<R: DeserializeOwned>(
        endpoint: &str,
        response: Response,
    ) -> Result<(R, ResponseHeaders)> {
        let status = response.status();
        tracing::debug!("Dropbox {} response status: {}", endpoint, status);

        let headers = collect_headers(response.headers());
        let body = response.text().await?;

        if !status.is_success() {
            let summary = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error_summary)
                .unwrap_or(body);
            return Err(AdapterError::RemoteError {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
                summary,
            });
        }

        Ok((serde_json::from_str(&body)?, headers))
    }
}

impl RemoteClient for DropboxClient {
    async fn upload(&self, path: &str, contents: Vec<u8>) -> Result<FileMetadata> {
        let arg = serde_json::to_string(&UploadArg {
            path,
            mode: "overwrite",
            autorename: false,
            mute: false,
        })?;

        tracing::debug!("Uploading {} bytes to {}", contents.len(), path);
        let response = self
            .client
            .post(format!("{}/2/files/upload", self.content_url))
            .bearer_auth(&self.access_token)
            .header(API_ARG_HEADER, http_header_safe(&arg))
            .header(CONTENT_TYPE, "application/octet-stream")
            .body(contents)
            .send()
            .await?;

        let (metadata, _) = Self::decode::<FileMetadata>("files/upload", response).await?;
        Ok(metadata)
    }

    async fn delete(&self, path: &str) -> Result<DeleteResult> {
        let (result, _): (DeleteResult, _) =
            self.rpc("files/delete_v2", &PathArg { path }).await?;
        Ok(result)
    }

    async fn list_folder(&self, path: &str) -> Result<ListFolderResult> {
        let (mut listing, headers): (ListFolderResult, _) = self
            .rpc("files/list_folder", &PathArg { path: api_path(path) })
            .await?;
        listing.headers = headers;
        Ok(listing)
    }

    async fn create_folder(&self, path: &str) -> Result<FolderMetadata> {
        let (result, _): (CreateFolderResult, _) = self
            .rpc(
                "files/create_folder_v2",
                &CreateFolderArg {
                    path,
                    autorename: false,
                },
            )
            .await?;
        Ok(result.metadata)
    }

    async fn get_metadata(&self, path: &str) -> Result<Option<Stat>> {
        // The root has no metadata entry but always exists.
        if api_path(path).is_empty() {
            let listing = self.list_folder(path).await?;
            return Ok(Some(Stat {
                metadata: Metadata::Folder(FolderMetadata {
                    name: String::new(),
                    id: String::new(),
                    path_lower: Some("/".to_string()),
                    path_display: Some("/".to_string()),
                }),
                headers: listing.headers,
            }));
        }

        match self
            .rpc::<_, Metadata>("files/get_metadata", &PathArg { path })
            .await
        {
            Ok((metadata, headers)) => Ok(Some(Stat { metadata, headers })),
            Err(e) if is_not_found(&e) => {
                tracing::debug!("Nothing at {}", path);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    async fn create_shared_link(&self, path: &str) -> Result<SharedLinkMetadata> {
        let (link, _): (SharedLinkMetadata, _) = self
            .rpc("sharing/create_shared_link_with_settings", &PathArg { path })
            .await?;
        Ok(link)
    }

    async fn list_shared_links(&self, path_or_id: &str) -> Result<ListSharedLinksResult> {
        let (links, _): (ListSharedLinksResult, _) = self
            .rpc(
                "sharing/list_shared_links",
                &ListSharedLinksArg {
                    path: path_or_id,
                    direct_only: true,
                },
            )
            .await?;
        Ok(links)
    }
}

/// The API spells the root folder as the empty string.
fn api_path(path: &str) -> &str {
    if path == "/" {
        ""
    } else {
        path
    }
}

fn is_not_found(error: &AdapterError) -> bool {
    match error {
        AdapterError::RemoteError {
            status: 409,
            summary,
            ..
        } => summary.starts_with("path/not_found"),
        _ => false,
    }
}

/// Header values must be ASCII; non-ASCII characters in the JSON argument
/// are sent as `\uXXXX` escapes.
fn http_header_safe(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    for c in json.chars() {
        if c.is_ascii() {
            out.push(c);
        } else {
            let mut buf = [0u16; 2];
            for unit in c.encode_utf16(&mut buf) {
                out.push_str(&format!("\\u{:04x}", unit));
            }
        }
    }
    out
}

fn extra_headers(config: &AdapterConfig) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let header_name =
            HeaderName::from_bytes(name.as_bytes()).map_err(|e| AdapterError::ConfigError {
                message: format!("Invalid header name {:?}: {}", name, e),
            })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| AdapterError::ConfigError {
            message: format!("Invalid value for header {:?}: {}", name, e),
        })?;
        headers.insert(header_name, header_value);
    }
    Ok(headers)
}

fn collect_headers(headers: &HeaderMap) -> ResponseHeaders {
    headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> DropboxClient {
        let config = AdapterConfig::new("test-token")
            .with_api_url(server.base_url())
            .with_content_url(server.base_url())
            .with_header("X-Request-Source", "unit-test");
        DropboxClient::new(&config).unwrap()
    }

    fn file_json(path: &str) -> serde_json::Value {
        json!({
            "name": path.rsplit('/').next().unwrap(),
            "id": "id:a4ayc_80_OEAAAAAAAAAXw",
            "path_lower": path.to_lowercase(),
            "path_display": path,
            "size": 5,
            "rev": "a1c10ce0dd78",
            "server_modified": "2015-05-12T15:50:38Z",
            "client_modified": "2015-05-12T15:50:38Z",
            "content_hash": "599d71"
        })
    }

    #[tokio::test]
    async fn test_upload_sends_arg_header_and_body() {
        let server = MockServer::start();
        let upload_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/2/files/upload")
                .header("Authorization", "Bearer test-token")
                .header("Content-Type", "application/octet-stream")
                .header(
                    "Dropbox-API-Arg",
                    r#"{"path":"/uploads/a.png","mode":"overwrite","autorename":false,"mute":false}"#,
                )
                .header("X-Request-Source", "unit-test")
                .body("hello");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(file_json("/uploads/a.png"));
        });

        let client = client_for(&server);
        let metadata = client
            .upload("/uploads/a.png", b"hello".to_vec())
            .await
            .unwrap();

        upload_mock.assert();
        assert_eq!(metadata.path_display.as_deref(), Some("/uploads/a.png"));
        assert_eq!(metadata.size, 5);
    }

    #[tokio::test]
    async fn test_list_root_sends_empty_path_and_keeps_headers() {
        let server = MockServer::start();
        let list_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/2/files/list_folder")
                .json_body(json!({ "path": "" }));
            then.status(200)
                .header("Content-Type", "application/json")
                .header("X-Dropbox-Request-Id", "req-1")
                .json_body(json!({ "entries": [], "cursor": "c1", "has_more": false }));
        });

        let client = client_for(&server);
        let listing = client.list_folder("/").await.unwrap();

        list_mock.assert();
        assert!(listing.entries.is_empty());
        assert_eq!(
            listing.headers.get("x-dropbox-request-id").map(String::as_str),
            Some("req-1")
        );
    }

    #[tokio::test]
    async fn test_get_metadata_not_found_is_none() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/2/files/get_metadata");
            then.status(409)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "error_summary": "path/not_found/..",
                    "error": { ".tag": "path", "path": { ".tag": "not_found" } }
                }));
        });

        let client = client_for(&server);
        assert!(client.get_metadata("/missing.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remote_error_carries_summary() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/2/files/delete_v2");
            then.status(409)
                .header("Content-Type", "application/json")
                .json_body(json!({
                    "error_summary": "path_lookup/not_found/...",
                    "error": { ".tag": "path_lookup" }
                }));
        });

        let client = client_for(&server);
        let err = client.delete("/uploads/a.png").await.unwrap_err();

        match err {
            AdapterError::RemoteError {
                endpoint,
                status,
                summary,
            } => {
                assert_eq!(endpoint, "files/delete_v2");
                assert_eq!(status, 409);
                assert_eq!(summary, "path_lookup/not_found/...");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_plain_text_error_body_is_kept() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/2/sharing/list_shared_links");
            then.status(401).body("Invalid authorization value");
        });

        let client = client_for(&server);
        let err = client.list_shared_links("id:abc").await.unwrap_err();
        assert_eq!(err.remote_summary(), Some("Invalid authorization value"));
    }

    #[test]
    fn test_header_safe_escapes_non_ascii() {
        assert_eq!(http_header_safe(r#"{"path":"/a.png"}"#), r#"{"path":"/a.png"}"#);
        assert_eq!(http_header_safe("/caf\u{e9}.png"), "/caf\\u00e9.png");
    }

    #[test]
    fn test_invalid_extra_header_is_config_error() {
        let config = AdapterConfig::new("t").with_header("bad header", "x");
        assert!(DropboxClient::new(&config).unwrap_err().is_config_error());
    }
}
