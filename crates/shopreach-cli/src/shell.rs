//! Interactive shell over one browser session.
//!
//! Lines are split on whitespace and parsed against a fixed command set.
//! A failing command is reported and the session stays open.

use std::io::Write as _;

use clap::{Parser, Subcommand};
use shopreach_browser::PageDriver;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::commands::{self, CollectArgs, Context, PostArgs};

#[derive(Debug, Parser)]
#[command(name = "shopreach", no_binary_name = true, disable_version_flag = true)]
pub(crate) struct ShellLine {
    #[command(subcommand)]
    pub command: ShellCommand,
}

#[derive(Debug, Subcommand)]
pub(crate) enum ShellCommand {
    /// Collect new products of one shop category
    Collect(CollectArgs),
    /// Add the groups on the current (or given) search results page
    Discover { url: Option<String> },
    /// Post the promotion to every eligible group
    Post(PostArgs),
    /// Extract delivery rates from the current (or given) page
    DeliveryRates { url: Option<String> },
    /// Load a page, e.g. to log in by hand
    Open { url: String },
    /// Close the browser and leave
    #[command(alias = "quit")]
    Exit,
}

/// Parses one input line. `Ok(None)` for a blank line.
pub(crate) fn parse_line(line: &str) -> Result<Option<ShellCommand>, clap::Error> {
    let words: Vec<&str> = line.split_whitespace().collect();
    if words.is_empty() {
        return Ok(None);
    }
    ShellLine::try_parse_from(words).map(|parsed| Some(parsed.command))
}

pub(crate) async fn run<D: PageDriver>(ctx: &Context<'_, D>) -> anyhow::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    if let Err(e) = ctx.driver.navigate(&ctx.config.social_base_url).await {
        tracing::warn!(url = %ctx.config.social_base_url, error = %e, "start page did not load");
    }
    println!("type `help` for commands, `exit` to quit");

    loop {
        print!("shopreach> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let command = match parse_line(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                // Covers `help` and `--help` too.
                e.print()?;
                continue;
            }
        };

        let result = match command {
            ShellCommand::Exit => break,
            ShellCommand::Collect(args) => commands::collect(ctx, &args).await,
            ShellCommand::Discover { url } => commands::discover_groups(ctx, url.as_deref()).await,
            ShellCommand::Post(args) => commands::post(ctx, &args).await,
            ShellCommand::DeliveryRates { url } => {
                commands::delivery_rates(ctx, url.as_deref()).await
            }
            ShellCommand::Open { url } => ctx.driver.navigate(&url).await.map_err(Into::into),
        };
        if let Err(e) = result {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e:#}");
        }
    }
    Ok(())
}
