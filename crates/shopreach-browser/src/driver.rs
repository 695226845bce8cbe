use std::time::Duration;

use crate::error::DriverError;
use crate::locator::Locator;

/// The page-automation primitives the pipelines rely on.
///
/// One driver owns one browser tab; every call acts on the currently loaded
/// page. Implementations are used from a single task, so the futures are not
/// required to be `Send`.
#[allow(async_fn_in_trait)]
pub trait PageDriver {
    /// Handle to an element on the current page.
    type Element: Clone;

    /// Loads `url` in the tab.
    async fn navigate(&self, url: &str) -> Result<(), DriverError>;

    /// URL of the page currently loaded, after any redirects.
    async fn current_url(&self) -> Result<String, DriverError>;

    /// All elements matching `locator`, searched inside `scope` or, when
    /// `scope` is `None`, in the whole document. No match is an empty list.
    async fn find_all(
        &self,
        locator: &Locator,
        scope: Option<&Self::Element>,
    ) -> Result<Vec<Self::Element>, DriverError>;

    /// First element matching `locator`.
    ///
    /// # Errors
    ///
    /// [`DriverError::NotFound`] when nothing matches.
    async fn find(
        &self,
        locator: &Locator,
        scope: Option<&Self::Element>,
    ) -> Result<Self::Element, DriverError> {
        self.find_all(locator, scope)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DriverError::NotFound {
                locator: locator.to_string(),
            })
    }

    /// Visible text of `element`.
    async fn text(&self, element: &Self::Element) -> Result<String, DriverError>;

    /// Value of attribute `name`, `None` if the element does not carry it.
    async fn attr(
        &self,
        element: &Self::Element,
        name: &str,
    ) -> Result<Option<String>, DriverError>;

    async fn click(&self, element: &Self::Element) -> Result<(), DriverError>;

    /// Types `keys` into `element`. On file inputs this selects the file at
    /// that path.
    async fn send_keys(&self, element: &Self::Element, keys: &str) -> Result<(), DriverError>;

    /// Inserts `text` into an editable element the way a clipboard paste
    /// would, so characters outside the basic plane (emoji) survive.
    async fn paste(&self, element: &Self::Element, text: &str) -> Result<(), DriverError>;
}

/// Fixed wait for client-rendered content to appear after a navigation or
/// interaction. A zero duration returns immediately.
pub async fn settle(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
