use std::time::Duration;

use reqwest::{Client, StatusCode};
use shopreach_core::ProductRecord;

use crate::error::ScraperError;

/// What happened to one pushed record. Push failures are reported, never
/// raised, so a dead API cannot interrupt collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// 201.
    Created,
    /// 400, with the response body.
    Rejected { body: String },
    /// Any other status.
    Failed { status: u16 },
    /// No response at all (connection refused, timeout, ...).
    Unreachable { reason: String },
}

/// Tally of a [`ProductApiClient::push_all`] run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PushSummary {
    pub created: usize,
    pub rejected: usize,
    pub failed: usize,
    pub unreachable: usize,
}

impl PushSummary {
    fn record(&mut self, outcome: &PushOutcome) {
        match outcome {
            PushOutcome::Created => self.created += 1,
            PushOutcome::Rejected { .. } => self.rejected += 1,
            PushOutcome::Failed { .. } => self.failed += 1,
            PushOutcome::Unreachable { .. } => self.unreachable += 1,
        }
    }
}

/// Client for the catalog API's product intake endpoint.
pub struct ProductApiClient {
    client: Client,
    endpoint: String,
}

impl ProductApiClient {
    /// Builds a client posting to `{base_url}/api/products`.
    ///
    /// # Errors
    ///
    /// [`ScraperError::InvalidBaseUrl`] if `base_url` is not an absolute
    /// http(s) URL, [`ScraperError::Http`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, ScraperError> {
        let parsed = reqwest::Url::parse(base_url).map_err(|e| ScraperError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ScraperError::InvalidBaseUrl {
                url: base_url.to_owned(),
                reason: format!("unsupported scheme {}", parsed.scheme()),
            });
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/api/products", base_url.trim_end_matches('/')),
        })
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Posts one record as JSON and classifies the response.
    pub async fn push_product(&self, record: &ProductRecord) -> PushOutcome {
        let id = record.id.as_deref().unwrap_or("<no id>");
        let response = match self.client.post(&self.endpoint).json(record).send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(
                    id,
                    endpoint = %self.endpoint,
                    error = %e,
                    "product API unreachable"
                );
                return PushOutcome::Unreachable {
                    reason: e.to_string(),
                };
            }
        };

        let status = response.status();
        match status {
            StatusCode::CREATED => {
                tracing::info!(id, "product pushed");
                PushOutcome::Created
            }
            StatusCode::BAD_REQUEST => {
                let body = response.text().await.unwrap_or_default();
                tracing::warn!(id, body = %body, "product rejected by API");
                PushOutcome::Rejected { body }
            }
            other => {
                tracing::warn!(id, status = other.as_u16(), "product push failed");
                PushOutcome::Failed {
                    status: other.as_u16(),
                }
            }
        }
    }

    /// Pushes every record in order, one request at a time.
    pub async fn push_all(&self, records: &[ProductRecord]) -> PushSummary {
        let mut summary = PushSummary::default();
        for record in records {
            let outcome = self.push_product(record).await;
            summary.record(&outcome);
        }
        tracing::info!(
            created = summary.created,
            rejected = summary.rejected,
            failed = summary.failed,
            unreachable = summary.unreachable,
            "push finished"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_base_without_double_slash() {
        let client = ProductApiClient::new("http://localhost:3000/", 5).unwrap();
        assert_eq!(client.endpoint(), "http://localhost:3000/api/products");
    }

    #[test]
    fn rejects_non_http_base_url() {
        let err = ProductApiClient::new("ftp://localhost", 5).err().unwrap();
        assert!(matches!(err, ScraperError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn rejects_relative_base_url() {
        assert!(ProductApiClient::new("localhost:3000/api", 5).is_err());
    }

    #[test]
    fn summary_counts_each_outcome() {
        let mut summary = PushSummary::default();
        summary.record(&PushOutcome::Created);
        summary.record(&PushOutcome::Created);
        summary.record(&PushOutcome::Rejected { body: String::new() });
        summary.record(&PushOutcome::Failed { status: 500 });
        assert_eq!(
            summary,
            PushSummary {
                created: 2,
                rejected: 1,
                failed: 1,
                unreachable: 0,
            }
        );
    }
}
