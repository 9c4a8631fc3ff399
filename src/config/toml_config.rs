use crate::config::AdapterConfig;
use crate::core::naming::GenerateFilename;
use crate::domain::model::Schema;
use crate::utils::error::{AdapterError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub dropbox: AdapterConfig,
    pub naming: Option<NamingConfig>,
    /// Field name → persisted.
    pub schema: Option<HashMap<String, bool>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamingConfig {
    pub strategy: String,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(AdapterError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| AdapterError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DROPBOX_ACCESS_TOKEN})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| AdapterError::ConfigError {
            message: format!("Invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn filename_generator(&self) -> Result<GenerateFilename> {
        match &self.naming {
            Some(naming) => GenerateFilename::by_name(&naming.strategy),
            None => Ok(GenerateFilename::default()),
        }
    }

    pub fn schema(&self) -> Schema {
        self.schema
            .as_ref()
            .map(Schema::from_overrides)
            .unwrap_or_default()
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.dropbox.validate()?;
        self.filename_generator()?;
        Ok(())
    }
}
