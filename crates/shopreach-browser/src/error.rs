use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("no element matches {locator}")]
    NotFound { locator: String },

    #[error("navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("webdriver error: {0}")]
    Backend(String),
}

impl DriverError {
    /// `true` when the failure only means the element is absent from the page.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, DriverError::NotFound { .. })
    }
}
