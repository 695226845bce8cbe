//! Command handlers shared by one-shot commands and the interactive shell.
//!
//! Handlers run against any [`PageDriver`]; `main` hands them the live
//! browser session.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context as _;
use clap::Args;
use shopreach_browser::{settle, PageDriver};
use shopreach_core::AppConfig;
use shopreach_poster::{dispatch, DispatchOptions, GroupPostAction, PostContent, PostPacing};
use shopreach_scraper::{
    collect_new_products, discover_groups as discover, extract_delivery_rates, CollectOptions,
    DeliveryRateLocators, GroupSearchLocators, ProductApiClient, RevisitPolicy, ShopCatalog,
};
use shopreach_store::StoreDir;

#[derive(Debug, Args)]
pub(crate) struct CollectArgs {
    /// Category page number, as in `/category/<n>`; also names `cat_<n>.json`
    #[arg(long)]
    pub category: u32,

    /// Value stored in each record's `category` field [default: the page number]
    #[arg(long)]
    pub category_id: Option<String>,

    /// Highest listing page to visit
    #[arg(long, default_value_t = 2)]
    pub pages: u32,

    /// Once a new product is found, take every product on that page and the
    /// following ones without checking the store
    #[arg(long)]
    pub whole_page: bool,

    /// Also send each new product to the product API
    #[arg(long)]
    pub push: bool,
}

#[derive(Debug, Args)]
pub(crate) struct PostArgs {
    /// Image attached to the post
    #[arg(long, default_value = "post_image.png")]
    pub image: PathBuf,

    /// UTF-8 file holding the post text
    #[arg(long, default_value = "post_body.txt")]
    pub text_file: PathBuf,

    /// Seconds between two groups [default: SHOPREACH_DISPATCH_DELAY_SECS]
    #[arg(long)]
    pub delay_secs: Option<u64>,
}

/// What every browser-backed handler needs.
pub(crate) struct Context<'a, D> {
    pub config: &'a AppConfig,
    pub stores: StoreDir,
    pub driver: &'a D,
}

impl<'a, D: PageDriver> Context<'a, D> {
    pub fn new(config: &'a AppConfig, driver: &'a D) -> Self {
        Self {
            config,
            stores: StoreDir::new(&config.data_dir, &config.groups_file),
            driver,
        }
    }

    async fn open(&self, url: Option<&str>) -> anyhow::Result<()> {
        if let Some(url) = url {
            self.driver.navigate(url).await?;
            settle(self.config.page_settle()).await;
        }
        Ok(())
    }
}

fn api_client(config: &AppConfig) -> anyhow::Result<ProductApiClient> {
    ProductApiClient::new(&config.api_base_url, config.api_timeout_secs)
        .context("failed to build product API client")
}

pub(crate) async fn collect<D: PageDriver>(
    ctx: &Context<'_, D>,
    args: &CollectArgs,
) -> anyhow::Result<()> {
    let category_id = args
        .category_id
        .clone()
        .unwrap_or_else(|| args.category.to_string());
    let catalog = ShopCatalog::new(
        ctx.driver,
        &ctx.config.shop_base_url,
        args.category,
        category_id,
    )
    .with_page_settle(ctx.config.page_settle());
    let store = ctx.stores.products(args.category);
    let options = CollectOptions {
        max_pages: args.pages,
        policy: if args.whole_page {
            RevisitPolicy::WholePage
        } else {
            RevisitPolicy::OnlyUnseen
        },
    };
    let client = if args.push {
        Some(api_client(ctx.config)?)
    } else {
        None
    };

    let report = collect_new_products(&catalog, &store, &options, client.as_ref())
        .await
        .with_context(|| format!("collection of category {} halted", args.category))?;

    println!(
        "category {}: {} new product(s) from {} page(s), {} page(s) skipped; store: {}",
        args.category,
        report.appended,
        report.pages_scanned,
        report.pages_skipped,
        store.path().display()
    );
    Ok(())
}

/// Harvests groups from `url`, or from the page already loaded when `url`
/// is `None`.
pub(crate) async fn discover_groups<D: PageDriver>(
    ctx: &Context<'_, D>,
    url: Option<&str>,
) -> anyhow::Result<()> {
    ctx.open(url).await?;
    let report = discover(
        ctx.driver,
        &ctx.stores.groups(),
        &GroupSearchLocators::default(),
        ctx.config.status_settle(),
    )
    .await?;
    println!(
        "{} card(s): {} new group(s), {} already known, {} unreadable",
        report.cards, report.added, report.duplicates, report.skipped
    );
    Ok(())
}

pub(crate) async fn post<D: PageDriver>(
    ctx: &Context<'_, D>,
    args: &PostArgs,
) -> anyhow::Result<()> {
    if !args.image.is_file() {
        anyhow::bail!("post image {} does not exist", args.image.display());
    }
    let body = std::fs::read_to_string(&args.text_file)
        .with_context(|| format!("failed to read post text {}", args.text_file.display()))?;
    let content = PostContent::new(&args.image, body)
        .with_context(|| format!("failed to resolve {}", args.image.display()))?;

    let action = GroupPostAction::new(ctx.driver, content, PostPacing::from_config(ctx.config));
    let options = DispatchOptions {
        delay: args
            .delay_secs
            .map_or_else(|| ctx.config.dispatch_delay(), Duration::from_secs),
    };
    let report = dispatch(&ctx.stores.groups(), &action, &options).await?;

    println!(
        "{} sent, {} blocked, {} skipped",
        report.sent.len(),
        report.blocked.len(),
        report.skipped
    );
    for blocked in &report.blocked {
        println!("  blocked at {}: {}", blocked.step, blocked.url);
    }
    Ok(())
}

/// Extracts delivery rates from `url`, or from the page already loaded. An
/// empty extraction leaves the previous file in place.
pub(crate) async fn delivery_rates<D: PageDriver>(
    ctx: &Context<'_, D>,
    url: Option<&str>,
) -> anyhow::Result<()> {
    ctx.open(url).await?;
    let rates = extract_delivery_rates(ctx.driver, &DeliveryRateLocators::default()).await?;
    let store = ctx.stores.delivery_rates();
    if rates.is_empty() {
        tracing::warn!(
            store = %store.path().display(),
            "no delivery rates found; keeping previous file"
        );
        println!("no delivery rates found");
        return Ok(());
    }
    store.save(&rates)?;
    println!("{} delivery rate(s) written to {}", rates.len(), store.path().display());
    Ok(())
}

/// Replays a whole category store to the product API.
pub(crate) async fn push(config: &AppConfig, category: u32) -> anyhow::Result<()> {
    let store = StoreDir::new(&config.data_dir, &config.groups_file).products(category);
    let records = store.load();
    if records.is_empty() {
        println!("{} holds no products", store.path().display());
        return Ok(());
    }
    let client = api_client(config)?;
    let summary = client.push_all(&records).await;
    println!(
        "{} created, {} rejected, {} failed, {} unreachable (endpoint {})",
        summary.created,
        summary.rejected,
        summary.failed,
        summary.unreachable,
        client.endpoint()
    );
    Ok(())
}

#[cfg(test)]
#[path = "commands_test.rs"]
mod tests;
