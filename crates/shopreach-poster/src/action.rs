use std::fmt;

use shopreach_browser::DriverError;
use shopreach_core::{GroupRecord, PostStatus};
use thiserror::Error;

/// The ordered steps of one delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStep {
    Navigate,
    OpenComposer,
    AttachMedia,
    InsertText,
    Submit,
}

impl DeliveryStep {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            DeliveryStep::Navigate => "navigate",
            DeliveryStep::OpenComposer => "open_composer",
            DeliveryStep::AttachMedia => "attach_media",
            DeliveryStep::InsertText => "insert_text",
            DeliveryStep::Submit => "submit",
        }
    }
}

impl fmt::Display for DeliveryStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The first step of a delivery that failed. Later steps were not attempted.
#[derive(Debug, Error)]
#[error("delivery step {step} failed: {source}")]
pub struct StepFailure {
    pub step: DeliveryStep,
    #[source]
    pub source: DriverError,
}

impl StepFailure {
    /// Maps a driver error into a failure of `step`, for use with `map_err`.
    pub fn at(step: DeliveryStep) -> impl FnOnce(DriverError) -> Self {
        move |source| Self { step, source }
    }
}

/// A multi-step delivery to one target.
#[allow(async_fn_in_trait)]
pub trait DeliveryAction {
    /// Runs every step in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// [`StepFailure`] naming the step that failed.
    async fn deliver(&self, target: &GroupRecord) -> Result<(), StepFailure>;

    /// Reads back the status of the post just delivered to `target`.
    ///
    /// # Errors
    ///
    /// Any driver failure while loading or reading the status page.
    async fn read_status(&self, target: &GroupRecord) -> Result<PostStatus, DriverError>;
}
