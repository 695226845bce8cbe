//! [`PageDriver`] over the WebDriver protocol, backed by `thirtyfour`.
//!
//! Expects a chromedriver (or compatible) server at the configured URL. The
//! browser runs with a persistent user-data directory so logins made by hand
//! in an earlier session carry over.

use std::path::PathBuf;

use thirtyfour::prelude::*;
use thirtyfour::ChromiumLikeCapabilities;

use crate::driver::PageDriver;
use crate::error::DriverError;
use crate::locator::Locator;

/// Inserts text at the caret of a focused editable element.
const INSERT_TEXT_SCRIPT: &str =
    "arguments[0].focus(); document.execCommand('insertText', false, arguments[1]);";

#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub webdriver_url: String,
    /// Chrome `--user-data-dir`.
    pub profile_dir: PathBuf,
    /// Chrome `--profile-directory` inside `profile_dir`.
    pub profile_name: String,
    pub headless: bool,
}

/// A live Chrome session.
pub struct WebDriverSession {
    driver: WebDriver,
}

impl From<WebDriverError> for DriverError {
    fn from(err: WebDriverError) -> Self {
        DriverError::Backend(err.to_string())
    }
}

impl WebDriverSession {
    /// Starts a browser with the configured profile.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Backend`] if the profile directory cannot be
    /// created or the WebDriver server refuses the session.
    pub async fn start(config: &BrowserConfig) -> Result<Self, DriverError> {
        std::fs::create_dir_all(&config.profile_dir).map_err(|e| {
            DriverError::Backend(format!(
                "cannot create profile directory {}: {e}",
                config.profile_dir.display()
            ))
        })?;
        let user_data_dir = std::path::absolute(&config.profile_dir).map_err(|e| {
            DriverError::Backend(format!(
                "cannot resolve profile directory {}: {e}",
                config.profile_dir.display()
            ))
        })?;

        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--disable-gpu")?;
        caps.add_arg("--no-sandbox")?;
        caps.add_arg("--disable-dev-shm-usage")?;
        caps.add_arg(&format!("--user-data-dir={}", user_data_dir.display()))?;
        caps.add_arg(&format!("--profile-directory={}", config.profile_name))?;
        if config.headless {
            caps.add_arg("--headless=new")?;
        }

        let driver = WebDriver::new(&config.webdriver_url, caps).await?;
        tracing::info!(
            webdriver = %config.webdriver_url,
            profile = %config.profile_name,
            "browser session started"
        );
        Ok(Self { driver })
    }

    /// Closes the browser and ends the WebDriver session.
    ///
    /// # Errors
    ///
    /// Returns [`DriverError::Backend`] if the server fails to end the session.
    pub async fn quit(self) -> Result<(), DriverError> {
        self.driver.quit().await?;
        tracing::info!("browser session closed");
        Ok(())
    }
}

fn by(locator: &Locator) -> By {
    match locator {
        Locator::Css(s) => By::Css(s.clone()),
        Locator::XPath(s) => By::XPath(s.clone()),
        Locator::Id(s) => By::Id(s.clone()),
        Locator::ClassName(s) => By::ClassName(s.clone()),
        Locator::Tag(s) => By::Tag(s.clone()),
    }
}

impl PageDriver for WebDriverSession {
    type Element = WebElement;

    async fn navigate(&self, url: &str) -> Result<(), DriverError> {
        self.driver
            .goto(url)
            .await
            .map_err(|e| DriverError::Navigation {
                url: url.to_owned(),
                reason: e.to_string(),
            })
    }

    async fn current_url(&self) -> Result<String, DriverError> {
        Ok(self.driver.current_url().await?.to_string())
    }

    async fn find_all(
        &self,
        locator: &Locator,
        scope: Option<&WebElement>,
    ) -> Result<Vec<WebElement>, DriverError> {
        let found = match scope {
            Some(element) => element.find_all(by(locator)).await?,
            None => self.driver.find_all(by(locator)).await?,
        };
        Ok(found)
    }

    async fn text(&self, element: &WebElement) -> Result<String, DriverError> {
        Ok(element.text().await?)
    }

    async fn attr(&self, element: &WebElement, name: &str) -> Result<Option<String>, DriverError> {
        // Properties resolve relative `href`/`src` values to absolute URLs.
        if let Some(value) = element.prop(name).await? {
            return Ok(Some(value));
        }
        Ok(element.attr(name).await?)
    }

    async fn click(&self, element: &WebElement) -> Result<(), DriverError> {
        Ok(element.click().await?)
    }

    async fn send_keys(&self, element: &WebElement, keys: &str) -> Result<(), DriverError> {
        Ok(element.send_keys(keys).await?)
    }

    async fn paste(&self, element: &WebElement, text: &str) -> Result<(), DriverError> {
        element.click().await?;
        self.driver
            .execute(
                INSERT_TEXT_SCRIPT,
                vec![element.to_json()?, serde_json::Value::from(text)],
            )
            .await?;
        Ok(())
    }
}
