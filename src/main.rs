use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use research_feed::config::{find_config_file, get_config, load_config, Config, CONFIG_FILE_NAME};
use research_feed::feed::{activate, BatchFetcher};
use research_feed::sources::{InspireSource, LiteratureIndex};
use research_feed::state::{render_visible, CopyOutcome, DisplayState};
use research_feed::typeset::{self, CommandTypesetter, TypesetTrigger, Typesetter};
use research_feed::ui::{self, Status};
use research_feed::utils::{HttpClient, SystemClipboard};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Research Feed - Recent publications of one author from the INSPIRE literature index
#[derive(Parser, Debug)]
#[command(name = "research-feed")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Show an author's most recent publications with abstracts and citation exports", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Plain)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Output format for the listing
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Plain text (human-readable)
    Plain,
    /// JSON format (machine-readable)
    Json,
    /// HTML fragment with MathJax setup
    Html,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch and list the most recent publications
    #[command(alias = "ls")]
    List {
        /// Show every fetched record instead of the default window
        #[arg(long, short)]
        all: bool,

        /// Expand the abstract of these records (by index)
        #[arg(long, short, num_args = 1..)]
        expand: Vec<usize>,

        /// Number of records to request
        #[arg(long, short)]
        limit: Option<usize>,
    },

    /// Print the citation export of a record
    Export {
        /// Record index
        index: usize,
    },

    /// Copy the citation export of a record to the clipboard
    Copy {
        /// Record index
        index: usize,
    },

    /// Write a default configuration file
    InitConfig {
        /// Destination (defaults to the user config directory)
        path: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let config = load_config(config_path.as_deref()).with_context(|| match &config_path {
        Some(path) => format!("Failed to load config from {}", path.display()),
        None => "Failed to load config from environment".to_string(),
    })?;

    init_tracing(&cli, &config);
    if let Some(path) = &config_path {
        tracing::debug!("Using config file: {}", path.display());
    }

    match cli.command {
        Commands::List { all, expand, limit } => {
            let max_items = limit.unwrap_or(config.display.max_publications);
            let mut state = load_state(&config, max_items).await?;
            if all {
                state = state.toggle_show_all();
            }
            for index in expand {
                state = state.toggle_abstract(index);
            }

            let mut trigger = TypesetTrigger::new(typesetter(&config));
            if let Some(handle) = trigger.observe(&state) {
                typeset::wait_for_pass(handle).await;
            }

            let rendered = render_visible(&state);
            let profile_url = config.index.profile_url.as_str();
            match cli.output {
                OutputFormat::Plain => print!("{}", ui::render_plain(&state, &rendered, profile_url)),
                OutputFormat::Json => println!("{}", ui::render_json(&state, &rendered, profile_url)?),
                OutputFormat::Html => print!("{}", ui::render_html(&state, &rendered, profile_url)),
            }

            if state.batch_error().is_some() {
                std::process::exit(1);
            }
        }

        Commands::Export { index } => {
            let state = load_state(&config, config.display.max_publications).await?;
            if let Some(error) = state.batch_error() {
                bail!("{}", error);
            }
            let Some(record) = state.records().get(index) else {
                bail!("No record at index {} ({} fetched)", index, state.records().len());
            };
            match record.export_text() {
                Some(text) => print!("{}", text),
                None => bail!(
                    "No {} export available for {}",
                    config.index.export_format.name(),
                    record.id()
                ),
            }
        }

        Commands::Copy { index } => {
            let state = load_state(&config, config.display.max_publications).await?;
            if let Some(error) = state.batch_error() {
                bail!("{}", error);
            }
            let mut clipboard = SystemClipboard::new();
            let outcome = state.copy_export_text(index, &mut clipboard);
            if !cli.quiet {
                match outcome {
                    CopyOutcome::Copied => {
                        println!("{}", ui::status_line(Status::Success, "Copied to clipboard"))
                    }
                    CopyOutcome::Unavailable => println!(
                        "{}",
                        ui::status_line(Status::Warning, "No export text for this record")
                    ),
                    CopyOutcome::Failed => {
                        println!("{}", ui::status_line(Status::Error, "Failed to copy text"))
                    }
                }
            }
        }

        Commands::InitConfig { path } => {
            let path = path
                .or_else(|| dirs::config_dir().map(|d| d.join("research-feed").join("config.toml")))
                .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));
            if path.exists() {
                bail!("Config file already exists: {}", path.display());
            }
            get_config().save(&path)?;
            if !cli.quiet {
                println!(
                    "{}",
                    ui::status_line(Status::Success, &format!("Wrote {}", path.display()))
                );
            }
        }
    }

    Ok(())
}

/// Initialize tracing from verbosity flags and the logging section
fn init_tracing(cli: &Cli, config: &Config) {
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| format!("research_feed={}", env_filter)),
    );

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format.as_deref() == Some("json") {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Run one activation against the configured index
async fn load_state(config: &Config, max_items: usize) -> Result<DisplayState> {
    let client = HttpClient::with_user_agent(
        &config.index.user_agent,
        Duration::from_secs(config.index.timeout_secs),
    )
    .context("Failed to build HTTP client")?;
    let source = InspireSource::with_base_urls(client, &config.index.api_base, &config.index.site_base)?;
    let index: Arc<dyn LiteratureIndex> = Arc::new(source);
    tracing::debug!("Querying {} for '{}'", index.name(), config.index.query);

    let fetcher = BatchFetcher::with_format(index, &config.index.query, config.index.export_format);
    Ok(activate(&fetcher, DisplayState::new(config.display), max_items).await)
}

fn typesetter(config: &Config) -> Option<Arc<dyn Typesetter>> {
    config.typeset.command.as_ref().map(|program| {
        Arc::new(CommandTypesetter::new(program.clone(), config.typeset.args.clone()))
            as Arc<dyn Typesetter>
    })
}
