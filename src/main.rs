use clap::{Parser, builder::styling};
use eyre::Result;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use usage_extractor::{
    cli::{default_registry, extract_records},
    config::Config,
    record::RecordVersion,
    storage::RecordWriter,
    transform::RecordFormatter,
};

// CLI Styling
const STYLES: styling::Styles = styling::Styles::styled()
    .header(styling::AnsiColor::BrightWhite.on_default())
    .usage(styling::AnsiColor::BrightWhite.on_default())
    .literal(styling::AnsiColor::Green.on_default())
    .placeholder(styling::AnsiColor::Cyan.on_default());

/// Usage Extractor: collect cloud usage accounting records for every project since its last run
#[derive(Parser)]
#[command(name = "usage-extractor", version, styles = STYLES)]
struct Cli {
    /// The dotenv file to source backend credentials from
    #[arg(short, long, default_value = ".env")]
    env: String,

    /// More verbose logging
    #[arg(long)]
    debug: bool,

    /// YAML configuration file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Extractor backend to use
    #[arg(long)]
    extractor: Option<String>,

    /// Comma-separated list of projects to extract
    #[arg(short, long, value_delimiter = ',')]
    projects: Vec<String>,

    /// Extract records from this date instead of each project's last run
    #[arg(long)]
    extract_from: Option<String>,

    /// Extract records up to this date (defaults to now)
    #[arg(long)]
    extract_to: Option<String>,

    /// Extract and publish, but do not update the last run files
    #[arg(long)]
    dry_run: bool,

    /// Directory holding the last run files
    #[arg(long)]
    spooldir: Option<PathBuf>,

    /// NDJSON file to append records to (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Accounting record version to publish
    #[arg(long, default_value = "0.4", value_parser = RecordVersion::from_str)]
    record_version: RecordVersion,
}

impl Cli {
    /// Resolve the run configuration: file (or defaults), then flags
    fn resolve_config(&self) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::read(path)?,
            None => Config::default(),
        };

        if let Some(extractor) = &self.extractor {
            config.extractor = extractor.clone();
        }
        if !self.projects.is_empty() {
            config.projects = self.projects.clone();
        }
        if let Some(extract_from) = &self.extract_from {
            config.extract_from = Some(extract_from.clone());
        }
        if let Some(extract_to) = &self.extract_to {
            config.extract_to = Some(extract_to.clone());
        }
        if let Some(spooldir) = &self.spooldir {
            config.spooldir = spooldir.clone();
        }
        config.dry_run |= self.dry_run;

        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if Path::new(&cli.env).exists() {
        dotenvy::from_filename(&cli.env)?;
    }

    let log_level = match cli.debug {
        true => "debug",
        false => "info",
    };
    let env = env_logger::Env::default().filter_or("LOG_LEVEL", log_level);
    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .init();

    let config = cli.resolve_config()?;
    log::info!(
        "Usage extraction with {} for {}",
        config.extractor.cyan(),
        config.projects.join(", ").bright_black()
    );

    let formatter = RecordFormatter::new(cli.record_version);
    let writer = match &cli.output {
        Some(path) => RecordWriter::file(formatter, path),
        None => RecordWriter::stdout(formatter),
    };

    let registry = default_registry();
    extract_records(config, &registry, &writer).await?;

    Ok(())
}
