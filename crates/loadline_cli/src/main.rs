mod commands;
mod data_source;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use loadline_core::{AgentStateChannel, Reconciler, Route, SortKey, config};
use miette::Result;
use tracing::info;

use crate::{commands::flights::FilterArgs, data_source::DataSource};

#[derive(Parser)]
#[command(name = "loadline")]
#[command(about = "Cargo load planning dashboard for the terminal")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Read flights from a local JSON file instead of the API
    #[arg(long)]
    data_file: Option<PathBuf>,

    /// Logistics API base URL (overrides config)
    #[arg(long)]
    base_url: Option<String>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// List flights matching a filter, with the payload chart
    Flights {
        #[command(flatten)]
        filter: FilterArgs,

        /// utilizationPercent, flightDate, sortTime, flightNumber, currentPounds or currentCubicFeet
        #[arg(long)]
        sort_by: Option<SortKey>,

        /// Sort ascending
        #[arg(long)]
        asc: bool,
    },
    /// Show one flight by its flight number
    Lookup { flight_number: String },
    /// Daily payload history
    History {
        /// Route as "LAX-ORD" or "LAX → ORD"; all routes when omitted
        #[arg(long)]
        route: Option<Route>,
    },
    /// Fleet-wide utilization summary
    Summary,
    /// Vote on mitigation recommendations for a flight
    Feedback {
        flight_number: String,

        /// Recommendation ids to vote up
        #[arg(long)]
        up: Vec<String>,

        /// Recommendation ids to vote down
        #[arg(long)]
        down: Vec<String>,

        #[arg(long)]
        comment: Option<String>,
    },
    /// Replay a JSON-lines agent session against the dashboard
    Replay { file: PathBuf },
    /// Configuration management
    Config {
        #[command(subcommand)]
        cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Save current configuration to file
    Save {
        /// Path to save configuration
        #[arg(default_value = "loadline.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();

    use tracing_subscriber::{EnvFilter, fmt};

    let filter = if cli.debug {
        EnvFilter::new("loadline_core=debug,loadline_api=debug,loadline_cli=debug")
    } else {
        EnvFilter::new("loadline_core=info,loadline_api=info,loadline_cli=info,warn")
    };

    fmt()
        .with_env_filter(filter)
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_timer(tracing_subscriber::fmt::time::LocalTime::rfc_3339())
        .compact()
        .init();

    let mut config = if let Some(config_path) = &cli.config {
        info!("Loading config from: {:?}", config_path);
        config::load_config(config_path).await?
    } else {
        info!("Loading config from standard locations");
        config::load_config_from_standard_locations().await?
    };

    if let Some(base_url) = &cli.base_url {
        info!("Overriding API base URL with: {}", base_url);
        config.data.base_url = base_url.clone();
    }

    // Config commands never touch flight data
    if let Commands::Config { cmd } = &cli.command {
        return match cmd {
            ConfigCommands::Show => commands::config::show(&config).await,
            ConfigCommands::Save { path } => commands::config::save(&config, path).await,
        };
    }

    let source = DataSource::open(&config, cli.data_file.as_deref()).await?;
    tracing::debug!("Using flight data from {}", source.describe());

    match cli.command {
        Commands::Flights {
            filter,
            sort_by,
            asc,
        } => {
            let sort_by = sort_by.unwrap_or(config.dashboard.sort_by);
            let descending = !asc && config.dashboard.descending;
            commands::flights::list(source, &filter, sort_by, descending).await?
        }
        Commands::Lookup { flight_number } => commands::flights::lookup(source, &flight_number).await?,
        Commands::History { route } => commands::flights::history(source, route).await?,
        Commands::Summary => commands::flights::summary(source).await?,
        Commands::Feedback {
            flight_number,
            up,
            down,
            comment,
        } => commands::flights::feedback(source, &flight_number, &up, &down, comment).await?,
        Commands::Replay { file } => {
            let reconciler = Reconciler::new(source, AgentStateChannel::new())
                .with_ordering(config.dashboard.sort_by, config.dashboard.descending);
            commands::replay::run(reconciler, &file).await?
        }
        Commands::Config { .. } => {}
    }

    Ok(())
}
