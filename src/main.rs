use clap::Parser;
use dropbox_adapter::config::cli::Command;
use dropbox_adapter::utils::logger::{self, LogFormat};
use dropbox_adapter::{CliConfig, DropboxAdapter, FileDescriptor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    logger::init_logger(LogFormat::from_flag(cli.json_logs), cli.verbose);

    tracing::debug!("CLI config: {:?}", cli.command);

    let (config, generate_filename, schema) = match cli.adapter_settings() {
        Ok(settings) => settings,
        Err(e) => {
            tracing::error!("❌ Configuration validation failed: {}", e);
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    };

    let adapter =
        DropboxAdapter::new(config, schema)?.with_filename_generator(generate_filename);

    match cli.command {
        Command::Upload {
            file,
            mimetype,
            name,
        } => {
            let metadata = tokio::fs::metadata(&file).await?;
            let originalname = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
                    .ok_or_else(|| anyhow::anyhow!("{} has no file name", file.display()))?,
            };

            let descriptor = FileDescriptor::new(file, originalname)
                .with_size(metadata.len())
                .with_mimetype(mimetype);
            let uploaded = adapter.upload_file(descriptor).await?;

            println!(
                "{}",
                serde_json::to_string_pretty(&adapter.schema().persisted(&uploaded))?
            );
        }
        Command::Remove { filename, folder } => {
            adapter
                .remove_file(&FileDescriptor::stored(filename, folder))
                .await?;
            println!("✅ Removed");
        }
        Command::Exists { filename } => match adapter.file_exists(&filename).await? {
            Some(headers) => println!("{}", serde_json::to_string_pretty(&headers)?),
            None => {
                println!("{} does not exist", filename);
                std::process::exit(2);
            }
        },
        Command::List { path } => {
            let listing = adapter.file_list(&path).await?;
            println!("{}", serde_json::to_string_pretty(&listing)?);
        }
        Command::UpdateFolder { name } => {
            let folder = adapter.update_folder(&name).await?;
            println!("{}", serde_json::to_string_pretty(&folder)?);
        }
    }

    Ok(())
}
