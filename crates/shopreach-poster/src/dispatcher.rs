//! Status-tracked delivery across the group store.
//!
//! A group moves forward at most once per run and never back:
//!
//! - eligible (`sendable`, `timestamp == 0`) → failed step → `sendable = false`
//! - eligible → delivered → `timestamp` set, `post_status` read back
//!
//! The whole store is rewritten after every attempt, so progress survives an
//! interrupted run.

use std::time::Duration;

use chrono::Utc;
use shopreach_core::{GroupRecord, PostStatus};
use shopreach_store::{RecordStore, StoreError};
use thiserror::Error;

use crate::action::{DeliveryAction, DeliveryStep};

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("cannot persist group progress: {0}")]
    Store(#[from] StoreError),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOptions {
    /// Wait between two consecutive delivery attempts.
    pub delay: Duration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentTarget {
    pub url: String,
    pub post_status: PostStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockedTarget {
    pub url: String,
    pub step: DeliveryStep,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: Vec<SentTarget>,
    pub blocked: Vec<BlockedTarget>,
    /// Records that were not eligible.
    pub skipped: usize,
}

/// Delivers through `action` to every eligible group of `store`, in store
/// order, recording each outcome in the store before moving on.
///
/// # Errors
///
/// [`DispatchError::Store`] if progress cannot be written; the run stops
/// there. Delivery failures are recorded, not returned.
pub async fn dispatch<A: DeliveryAction>(
    store: &RecordStore<GroupRecord>,
    action: &A,
    options: &DispatchOptions,
) -> Result<DispatchReport, DispatchError> {
    let mut records = store.load();
    let mut report = DispatchReport::default();
    let mut attempted = false;

    tracing::info!(
        store = %store.path().display(),
        groups = records.len(),
        eligible = records.iter().filter(|r| r.is_eligible()).count(),
        "dispatch started"
    );

    for index in 0..records.len() {
        if !records[index].is_eligible() {
            tracing::debug!(
                url = %records[index].url,
                sendable = records[index].sendable,
                timestamp = records[index].timestamp,
                "not eligible; skipping"
            );
            report.skipped += 1;
            continue;
        }

        if attempted && !options.delay.is_zero() {
            tokio::time::sleep(options.delay).await;
        }
        attempted = true;

        let target = records[index].clone();
        tracing::info!(url = %target.url, name = %target.name, "delivering");

        match action.deliver(&target).await {
            Err(failure) => {
                tracing::warn!(
                    url = %target.url,
                    step = %failure.step,
                    error = %failure.source,
                    "delivery failed; group blocked"
                );
                records[index].sendable = false;
                store.save(&records)?;
                report.blocked.push(BlockedTarget {
                    url: target.url,
                    step: failure.step,
                });
            }
            Ok(()) => {
                let post_status = match action.read_status(&target).await {
                    Ok(status) => status,
                    Err(e) => {
                        tracing::warn!(url = %target.url, error = %e, "post status unreadable");
                        PostStatus::Error
                    }
                };
                let record = &mut records[index];
                record.timestamp = Utc::now().timestamp();
                record.post_status = post_status;
                store.save(&records)?;
                tracing::info!(url = %target.url, status = %post_status, "delivered");
                report.sent.push(SentTarget {
                    url: target.url,
                    post_status,
                });
            }
        }
    }

    tracing::info!(
        sent = report.sent.len(),
        blocked = report.blocked.len(),
        skipped = report.skipped,
        "dispatch finished"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "dispatcher_test.rs"]
mod tests;
