//! Incremental collection of a category into its product store.
//!
//! Listing pages are walked from the first one. Leading pages whose items
//! are all stored already are skipped; from the first page carrying an
//! unseen item on, items are fetched and appended one at a time, so an
//! interrupted run keeps everything collected before the interruption.

use std::collections::HashSet;

use shopreach_core::ProductRecord;
use shopreach_store::RecordStore;

use crate::api::ProductApiClient;
use crate::catalog::ListingSource;
use crate::error::ScraperError;
use crate::extract::item_id_from_url;

/// Which items are fetched once the first page with an unseen item is found.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum RevisitPolicy {
    /// Every page is filtered to items whose id is not stored yet. Items
    /// appended earlier in the same run count as stored.
    #[default]
    OnlyUnseen,
    /// Every item on that page and on all later pages is fetched and
    /// appended without checking the store.
    WholePage,
}

#[derive(Debug, Clone, Copy)]
pub struct CollectOptions {
    /// Highest listing page visited.
    pub max_pages: u32,
    pub policy: RevisitPolicy,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            max_pages: 2,
            policy: RevisitPolicy::default(),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CollectReport {
    pub pages_scanned: u32,
    /// Leading pages skipped because every item was already stored.
    pub pages_skipped: u32,
    pub appended: usize,
    /// Ids of the appended records, in append order. Records whose id could
    /// not be extracted are counted in `appended` but not listed.
    pub appended_ids: Vec<String>,
}

/// Walks listing pages `1..=options.max_pages` of `source` and appends new
/// products to `store`. Each appended record is also pushed through `push`
/// when given; push outcomes never affect the run.
///
/// # Errors
///
/// A listing or product page that cannot be loaded, or a store write that
/// fails, halts the run. Records appended before the failure stay stored.
pub async fn collect_new_products<S: ListingSource>(
    source: &S,
    store: &RecordStore<ProductRecord>,
    options: &CollectOptions,
    push: Option<&ProductApiClient>,
) -> Result<CollectReport, ScraperError> {
    let mut known = store.keys();
    let mut found_new = false;
    let mut report = CollectReport::default();

    tracing::info!(
        category = source.category(),
        store = %store.path().display(),
        stored = known.len(),
        max_pages = options.max_pages,
        policy = ?options.policy,
        "collection started"
    );

    for page in 1..=options.max_pages {
        let references = source.page_references(page).await?;
        report.pages_scanned += 1;

        if !found_new {
            if all_stored(&references, &known) {
                tracing::info!(
                    page,
                    items = references.len(),
                    "every item already stored; skipping page"
                );
                report.pages_skipped += 1;
                continue;
            }
            found_new = true;
        }

        for reference in &references {
            let reference_id = item_id_from_url(reference);
            if options.policy == RevisitPolicy::OnlyUnseen
                && reference_id.as_ref().is_some_and(|id| known.contains(id))
            {
                tracing::debug!(page, reference = %reference, "already stored");
                continue;
            }

            let record = source.product_detail(reference).await?;
            store.append(&record)?;
            report.appended += 1;
            tracing::info!(
                page,
                id = record.id.as_deref().unwrap_or("<none>"),
                name = record.name.as_deref().unwrap_or(""),
                "product stored"
            );

            if let Some(id) = &record.id {
                known.insert(id.clone());
                report.appended_ids.push(id.clone());
            }
            if let Some(id) = reference_id {
                known.insert(id);
            }

            if let Some(client) = push {
                client.push_product(&record).await;
            }
        }
    }

    tracing::info!(
        category = source.category(),
        scanned = report.pages_scanned,
        skipped = report.pages_skipped,
        appended = report.appended,
        "collection finished"
    );
    Ok(report)
}

/// A reference whose id cannot be derived counts as unseen.
fn all_stored(references: &[String], known: &HashSet<String>) -> bool {
    references.iter().all(|reference| {
        item_id_from_url(reference).is_some_and(|id| known.contains(&id))
    })
}

#[cfg(test)]
#[path = "collector_test.rs"]
mod tests;
