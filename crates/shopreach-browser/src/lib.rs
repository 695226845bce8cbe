//! Browser automation surface used by the scraping and posting pipelines.
//!
//! Pipelines are written against the [`PageDriver`] trait. The production
//! implementation drives Chrome over the WebDriver protocol; tests use the
//! in-memory driver behind the `fake` feature.

mod driver;
pub mod error;
#[cfg(any(test, feature = "fake"))]
pub mod fake;
mod locator;
pub mod session;
mod webdriver;

pub use driver::{settle, PageDriver};
pub use error::DriverError;
pub use locator::Locator;
pub use session::{SessionError, SessionLock};
pub use webdriver::{BrowserConfig, WebDriverSession};
