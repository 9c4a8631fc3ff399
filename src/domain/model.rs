use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// Version of the host storage contract this adapter implements.
pub const COMPATIBILITY_LEVEL: u32 = 1;

/// One uploaded object, as handed over by the host before upload and
/// returned (augmented) after it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// Temporary location of the upload on the local filesystem.
    #[serde(skip)]
    pub local_path: Option<PathBuf>,
    /// Name the file had on the client machine.
    pub originalname: String,
    /// Name the file is stored under remotely.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    /// Remote folder the file lives in.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path_display: Option<String>,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub mimetype: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

impl FileDescriptor {
    pub fn new(local_path: impl Into<PathBuf>, originalname: impl Into<String>) -> Self {
        Self {
            local_path: Some(local_path.into()),
            originalname: originalname.into(),
            ..Default::default()
        }
    }

    /// Descriptor for an object already stored remotely.
    pub fn stored(filename: impl Into<String>, path: Option<String>) -> Self {
        let filename = filename.into();
        Self {
            originalname: filename.clone(),
            filename: Some(filename),
            path,
            ..Default::default()
        }
    }

    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn with_mimetype(mut self, mimetype: impl Into<String>) -> Self {
        self.mimetype = mimetype.into();
        self
    }

    /// Name used for path resolution; falls back to the original name
    /// until a filename has been generated.
    pub fn remote_name(&self) -> &str {
        self.filename.as_deref().unwrap_or(&self.originalname)
    }
}

/// Public link for an uploaded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SharedLink {
    pub id: String,
    pub path_display: String,
    pub url: String,
}

/// Extra descriptor fields this adapter populates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaField {
    Filename,
    PathDisplay,
    Path,
    Id,
    Url,
    Originalname,
}

impl SchemaField {
    pub const ALL: [SchemaField; 6] = [
        SchemaField::Filename,
        SchemaField::PathDisplay,
        SchemaField::Path,
        SchemaField::Id,
        SchemaField::Url,
        SchemaField::Originalname,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SchemaField::Filename => "filename",
            SchemaField::PathDisplay => "path_display",
            SchemaField::Path => "path",
            SchemaField::Id => "id",
            SchemaField::Url => "url",
            SchemaField::Originalname => "originalname",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == name)
    }

    pub fn persisted_by_default(&self) -> bool {
        true
    }

    fn value(&self, file: &FileDescriptor) -> Option<String> {
        match self {
            SchemaField::Filename => file.filename.clone(),
            SchemaField::PathDisplay => file.path_display.clone(),
            SchemaField::Path => file.path.clone(),
            SchemaField::Id => file.id.clone(),
            SchemaField::Url => file.url.clone(),
            SchemaField::Originalname => Some(file.originalname.clone()),
        }
    }
}

/// Which schema fields the host persists for each file.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: HashMap<SchemaField, bool>,
}

impl Default for Schema {
    fn default() -> Self {
        Self {
            fields: SchemaField::ALL
                .into_iter()
                .map(|f| (f, f.persisted_by_default()))
                .collect(),
        }
    }
}

impl Schema {
    /// Overrides keyed by field name; unknown names are ignored with a warning.
    pub fn from_overrides(overrides: &HashMap<String, bool>) -> Self {
        let mut schema = Self::default();
        for (name, enabled) in overrides {
            match SchemaField::parse(name) {
                Some(field) => schema.set(field, *enabled),
                None => tracing::warn!("Ignoring unknown schema field: {}", name),
            }
        }
        schema
    }

    pub fn set(&mut self, field: SchemaField, persisted: bool) {
        self.fields.insert(field, persisted);
    }

    pub fn is_persisted(&self, field: SchemaField) -> bool {
        self.fields.get(&field).copied().unwrap_or(false)
    }

    /// The persisted fields of `file` as a JSON object, skipping unset ones.
    pub fn persisted(&self, file: &FileDescriptor) -> serde_json::Map<String, serde_json::Value> {
        let mut out = serde_json::Map::new();
        for field in SchemaField::ALL {
            if !self.is_persisted(field) {
                continue;
            }
            if let Some(value) = field.value(file) {
                out.insert(field.as_str().to_string(), serde_json::Value::String(value));
            }
        }
        out
    }
}
