mod commands;
mod shell;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use shopreach_browser::{BrowserConfig, SessionLock, WebDriverSession};
use shopreach_core::AppConfig;
use tracing_subscriber::EnvFilter;

use crate::commands::{CollectArgs, Context, PostArgs};

#[derive(Debug, Parser)]
#[command(name = "shopreach")]
#[command(about = "Collect shop products and post promotions to social-media groups")]
struct Cli {
    /// Take over the session lock left behind by a crashed run
    #[arg(long, global = true)]
    force: bool,

    /// Run the browser without a window
    #[arg(long, global = true)]
    headless: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Send every stored product of a category to the product API
    Push {
        /// Category page number whose store is replayed
        #[arg(long)]
        category: u32,
    },
    #[command(flatten)]
    Browser(BrowserCommand),
}

/// Commands that drive the browser. They share one locked session.
#[derive(Debug, Subcommand)]
enum BrowserCommand {
    /// Collect new products of one shop category into `cat_<n>.json`
    Collect(CollectArgs),
    /// Add the groups listed on a group-search results page to the group store
    DiscoverGroups {
        /// Group-search results URL
        #[arg(long)]
        url: String,
    },
    /// Post the promotion to every eligible group
    Post(PostArgs),
    /// Extract the shop's delivery pricing table into `delivery_rates.json`
    DeliveryRates {
        /// Delivery pricing page URL
        #[arg(long)]
        url: String,
    },
    /// Keep one browser session open and read commands from stdin
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = shopreach_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    match cli.command {
        Commands::Push { category } => commands::push(&config, category).await,
        Commands::Browser(command) => {
            run_in_browser(&config, cli.force, cli.headless, command).await
        }
    }
}

/// Runs a browser-backed command inside a locked session, closing the
/// browser whatever the outcome.
async fn run_in_browser(
    config: &AppConfig,
    force: bool,
    headless: bool,
    command: BrowserCommand,
) -> anyhow::Result<()> {
    let _lock = SessionLock::acquire(&config.session_lock_path(), force)?;
    let browser = WebDriverSession::start(&BrowserConfig {
        webdriver_url: config.webdriver_url.clone(),
        profile_dir: config.profile_dir.clone(),
        profile_name: config.profile_name.clone(),
        headless,
    })
    .await
    .with_context(|| format!("failed to start browser via {}", config.webdriver_url))?;

    let ctx = Context::new(config, &browser);
    let result = match command {
        BrowserCommand::Collect(args) => commands::collect(&ctx, &args).await,
        BrowserCommand::DiscoverGroups { url } => commands::discover_groups(&ctx, Some(&url)).await,
        BrowserCommand::Post(args) => commands::post(&ctx, &args).await,
        BrowserCommand::DeliveryRates { url } => commands::delivery_rates(&ctx, Some(&url)).await,
        BrowserCommand::Shell => shell::run(&ctx).await,
    };

    if let Err(e) = browser.quit().await {
        tracing::warn!(error = %e, "browser did not shut down cleanly");
    }
    result
}
