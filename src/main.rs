//! Auto-organize command line entry point
//!
//! Library hosts embed [auto_organize::services::FileOrganizationService]
//! with their own library capabilities; the binary covers the parts that need
//! none: parsing, options and the organization log.

mod cli;

use anyhow::Context;

use auto_organize::config::Config;
use auto_organize::db::{JsonResultStore, ResultQuery, ResultStore, file_name_of};
use auto_organize::services::file_utils::get_stream_resolution_from_file_name;
use auto_organize::services::filename_parser::parse_episode;
use auto_organize::services::init_tracing;

use crate::cli::{CliOptions, Command, USAGE};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::from_env()?;
    let cli = CliOptions::from_args();

    init_tracing(cli.log_json.unwrap_or(config.log_json));

    match cli.command {
        Command::Parse(paths) => {
            for path in paths {
                let parsed = parse_episode(&path);
                tracing::debug!(path = %path, success = parsed.success, "Parsed path");
                println!("{}", serde_json::to_string(&parsed)?);
            }
        }
        Command::Resolution(name) => {
            println!("{}", get_stream_resolution_from_file_name(file_name_of(&name)));
        }
        Command::Pattern => {
            let options = config
                .load_options()
                .with_context(|| format!("Failed to load options from {}", config.options_path.display()))?;
            println!("{}", serde_json::to_string_pretty(&options)?);
        }
        Command::Results { limit } => {
            let store = open_store(&config)?;
            let page = store.get_results(&ResultQuery {
                start_index: None,
                limit,
            })?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Command::ClearLog => {
            let store = open_store(&config)?;
            store.delete_all()?;
            tracing::info!(path = %config.results_path.display(), "Cleared organization log");
        }
        Command::Help => {
            println!("{USAGE}");
        }
    }

    Ok(())
}

fn open_store(config: &Config) -> anyhow::Result<JsonResultStore> {
    JsonResultStore::open(&config.results_path).with_context(|| {
        format!(
            "Failed to open organization log at {}",
            config.results_path.display()
        )
    })
}
