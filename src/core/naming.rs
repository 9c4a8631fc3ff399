use crate::domain::model::FileDescriptor;
use crate::utils::error::{AdapterError, Result};
use std::fmt;
use std::future::Future;
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;

pub type FilenameFuture = Pin<Box<dyn Future<Output = Result<String>> + Send>>;

type GenerateFn = dyn Fn(&FileDescriptor, u32) -> FilenameFuture + Send + Sync;

/// Chooses the remote name of an upload. `attempt` starts at 0.
///
/// Synchronous and asynchronous strategies are wrapped into the same
/// async callable, so the adapter only ever awaits one shape.
#[derive(Clone)]
pub struct GenerateFilename(Arc<GenerateFn>);

impl GenerateFilename {
    pub fn from_sync<F>(f: F) -> Self
    where
        F: Fn(&FileDescriptor, u32) -> Result<String> + Send + Sync + 'static,
    {
        Self(erase(move |file, attempt| {
            let name = f(file, attempt);
            Box::pin(async move { name })
        }))
    }

    pub fn from_async<F, Fut>(f: F) -> Self
    where
        F: Fn(FileDescriptor, u32) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        Self(erase(move |file, attempt| Box::pin(f(file.clone(), attempt))))
    }

    /// 32 random hex characters plus the original extension, lowercased.
    pub fn random() -> Self {
        Self::from_sync(|file, _| Ok(random_filename(&file.originalname)))
    }

    pub fn original() -> Self {
        Self::from_sync(|file, _| {
            if file.originalname.trim().is_empty() {
                return Err(AdapterError::NamingError {
                    message: "file has no original name".to_string(),
                });
            }
            Ok(file.originalname.clone())
        })
    }

    /// Strategy by configuration name.
    pub fn by_name(name: &str) -> Result<Self> {
        match name {
            "random" => Ok(Self::random()),
            "original" => Ok(Self::original()),
            other => Err(AdapterError::InvalidConfigValueError {
                field: "naming.strategy".to_string(),
                value: other.to_string(),
                reason: "Unsupported strategy. Valid strategies: random, original".to_string(),
            }),
        }
    }

    pub async fn generate(&self, file: &FileDescriptor, attempt: u32) -> Result<String> {
        let name = (self.0)(file, attempt).await?;
        if name.is_empty() {
            return Err(AdapterError::NamingError {
                message: format!("empty filename generated for {}", file.originalname),
            });
        }
        Ok(name)
    }
}

impl Default for GenerateFilename {
    fn default() -> Self {
        Self::random()
    }
}

impl fmt::Debug for GenerateFilename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GenerateFilename")
    }
}

fn erase<F>(f: F) -> Arc<GenerateFn>
where
    F: Fn(&FileDescriptor, u32) -> FilenameFuture + Send + Sync + 'static,
{
    Arc::new(f)
}

fn random_filename(originalname: &str) -> String {
    let stem = uuid::Uuid::new_v4().simple().to_string();
    match Path::new(originalname)
        .extension()
        .and_then(|ext| ext.to_str())
    {
        Some(ext) => format!("{}.{}", stem, ext.to_lowercase()),
        None => stem,
    }
}
