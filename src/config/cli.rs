use crate::config::toml_config::TomlConfig;
use crate::config::{AdapterConfig, ACCESS_TOKEN_ENV, PATH_ENV};
use crate::core::naming::GenerateFilename;
use crate::domain::model::Schema;
use crate::utils::error::Result;
use crate::utils::validation::{validate_required_field, Validate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "dropbox-adapter")]
#[command(about = "Upload, inspect and remove files in Dropbox the way the CMS storage adapter does")]
pub struct CliConfig {
    #[arg(long, help = "TOML configuration file")]
    pub config: Option<PathBuf>,

    #[arg(long, env = ACCESS_TOKEN_ENV, hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long, env = PATH_ENV, help = "Absolute remote folder for uploads")]
    pub path: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Emit logs as JSON")]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Upload a local file and print the resulting descriptor
    Upload {
        file: PathBuf,
        #[arg(long, default_value = "application/octet-stream")]
        mimetype: String,
        #[arg(long, help = "Name to report as the original filename")]
        name: Option<String>,
    },
    /// Delete a stored file
    Remove {
        filename: String,
        #[arg(long, help = "Remote folder the file is stored in")]
        folder: Option<String>,
    },
    /// Check whether a file exists in the base folder
    Exists { filename: String },
    /// List a remote folder
    List {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Recreate a top-level folder, empty
    UpdateFolder { name: String },
}

impl CliConfig {
    /// Adapter settings from the config file (if any) with flags on top.
    pub fn adapter_settings(&self) -> Result<(AdapterConfig, GenerateFilename, Schema)> {
        let (mut config, generate_filename, schema) = match &self.config {
            Some(file) => {
                let toml = TomlConfig::from_file(file)?;
                let generate_filename = toml.filename_generator()?;
                let schema = toml.schema();
                (toml.dropbox, generate_filename, schema)
            }
            None => {
                let token = validate_required_field("access_token", &self.access_token)?.clone();
                (
                    AdapterConfig::new(token),
                    GenerateFilename::default(),
                    Schema::default(),
                )
            }
        };

        if let Some(token) = &self.access_token {
            config.access_token = token.clone();
        }
        if let Some(path) = &self.path {
            config.path = Some(path.clone());
        }

        config.validate()?;
        Ok((config, generate_filename, schema))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_command() {
        let cli = CliConfig::try_parse_from([
            "dropbox-adapter",
            "--access-token",
            "sl.cli",
            "--path",
            "/uploads",
            "upload",
            "photo.png",
            "--mimetype",
            "image/png",
        ])
        .unwrap();

        match &cli.command {
            Command::Upload { file, mimetype, .. } => {
                assert_eq!(file, &PathBuf::from("photo.png"));
                assert_eq!(mimetype, "image/png");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let (config, _, _) = cli.adapter_settings().unwrap();
        assert_eq!(config.access_token, "sl.cli");
        assert_eq!(config.path.as_deref(), Some("/uploads"));
    }

    #[test]
    fn test_relative_path_flag_is_rejected() {
        let cli = CliConfig::try_parse_from([
            "dropbox-adapter",
            "--access-token",
            "sl.cli",
            "--path",
            "uploads",
            "list",
        ])
        .unwrap();

        assert!(cli.adapter_settings().unwrap_err().is_config_error());
    }
}
