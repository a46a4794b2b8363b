//! Logscope - Entry Point

use chrono::{DateTime, Utc};
use clap::Parser;
use logscope::model::{LogType, TabId};
use std::path::PathBuf;
use tracing::info;

/// Logscope - drive the log view state from a JSON fixture and print it
#[derive(Parser, Debug)]
#[command(name = "logscope")]
#[command(version)]
#[command(about = "Reactive state of a log-search view over audit and service logs")]
pub struct Args {
    /// Path to the JSON fixture feeding the in-memory collaborators
    pub fixture: PathBuf,

    /// Log type to show first (service or audit)
    #[arg(short = 't', long)]
    pub log_type: Option<LogType>,

    /// Switch to this tab after startup
    #[arg(long)]
    pub tab: Option<String>,

    /// Start of a custom time range (RFC 3339)
    #[arg(long, requires = "to")]
    pub from: Option<DateTime<Utc>>,

    /// End of a custom time range (RFC 3339)
    #[arg(long, requires = "from")]
    pub to: Option<DateTime<Utc>>,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Print the snapshot on a single line
    #[arg(long)]
    pub compact: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = logscope::config::resolve(args.config.clone(), args.log_type)?;

    logscope::logging::init(&config.log_file_path)?;

    info!(config = ?config, "Configuration loaded and resolved");

    let fixture = logscope::source::Fixture::load(&args.fixture)?;
    let (container, _backend) = logscope::integration::build(&fixture, &config)?;

    if let Some(id) = &args.tab {
        let id = TabId::new(id.as_str())?;
        let tab = container
            .tabs()
            .latest()
            .unwrap_or_default()
            .into_iter()
            .find(|tab| tab.id == id)
            .ok_or(logscope::model::TabError::NotFound(id))?;
        container.switch_tab(&tab)?;
    }

    if let (Some(start), Some(end)) = (args.from, args.to) {
        container.set_custom_time_range(start, end)?;
    }

    println!("{}", container.snapshot().to_json(args.compact)?);
    Ok(())
}
