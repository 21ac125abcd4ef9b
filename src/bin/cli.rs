//! Substitution relay CLI
//!
//! Runs the scrape loop, or single steps of it for debugging.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use substitution_relay::{
    channel::{DiscordChannel, MESSAGE_LIMIT, split_message},
    error::{AppError, Result},
    models::{BotMarker, Config},
    parser::LessonTableParser,
    pipeline::{self, Announcer, Scheduler},
    services::{PortalClient, RoleTable, ScheduleRenderer, extract_lines},
    storage::{LocalArchive, PlanArchive},
    utils::http,
};

/// Substitution Relay - Moodle substitution plan to Discord
#[derive(Parser, Debug)]
#[command(
    name = "relay",
    version,
    about = "Keeps a Discord channel in sync with the school substitution plan"
)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Optional file merged over the configuration
    #[arg(long = "override", default_value = "config.override.toml")]
    overlay: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Scrape and post on a timer until Ctrl-C
    Run,

    /// Run a single cycle
    Once {
        /// Print the announcement instead of posting it
        #[arg(long)]
        dry_run: bool,
    },

    /// Parse a local PDF and print the result
    Parse {
        pdf: PathBuf,

        /// Print the parsed plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate the configuration
    Validate,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load_or_default(&cli.config, &cli.overlay);
    log::info!("Loaded configuration from {}", cli.config.display());

    let roles = RoleTable::new(&config.roles);
    let archive = LocalArchive::new(&config.archive.dir);
    let archive = config
        .archive
        .enabled
        .then_some(&archive as &dyn PlanArchive);

    let looping = matches!(cli.command, Command::Run);

    match cli.command {
        Command::Run | Command::Once { dry_run: false } => {
            config.validate()?;
            config.validate_discord()?;

            let client = http::create_client(&config.http)?;
            let source = PortalClient::new(client.clone(), config.portal.clone());
            let channel = DiscordChannel::connect(client, &config.discord).await?;
            let announcer = Announcer::new(channel, roles);
            let scheduler =
                Scheduler::new(&source, archive, &announcer, config.schedule.interval());

            if looping {
                log::info!(
                    "Checking for a new plan every {}s",
                    config.schedule.interval_secs
                );
                scheduler.run_until(shutdown_signal()).await;
            } else {
                scheduler.run_once().await?;
            }
        }

        Command::Once { dry_run: true } => {
            config.validate()?;

            let client = http::create_client(&config.http)?;
            let source = PortalClient::new(client, config.portal.clone());
            let plan = pipeline::scrape_plan(&source, archive).await?;

            let text = ScheduleRenderer::new(&roles).render(&plan);
            let messages = split_message(&text, MESSAGE_LIMIT);
            for message in &messages {
                println!("{message}\n---");
            }
            let (day, month) = plan.date_key();
            println!("{}", BotMarker::for_plan(day, month, messages.len()));
        }

        Command::Parse { pdf, json } => {
            let bytes = tokio::fs::read(&pdf).await?;
            let lines = tokio::task::spawn_blocking(move || extract_lines(&bytes))
                .await
                .map_err(AppError::parse)??;
            let plan = LessonTableParser::parse(&lines);

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
            } else {
                println!("{}", ScheduleRenderer::new(&roles).render(&plan));
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            if let Err(e) = config.validate() {
                log::error!("Config validation failed: {}", e);
                return Err(e);
            }
            if let Err(e) = config.validate_discord() {
                log::warn!("Discord posting not configured: {}", e);
            }
            log::info!("✓ Config OK ({} role mappings)", roles.len());
        }
    }

    Ok(())
}
