//! Posting an image with a caption into a social-media group.

use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use shopreach_browser::{settle, DriverError, Locator, PageDriver};
use shopreach_core::{AppConfig, GroupRecord, PostStatus};

use crate::action::{DeliveryAction, DeliveryStep, StepFailure};

/// Text of the counter shown next to a post list holding exactly our post.
pub const INDICATOR_TEXT: &str = "1 post";

/// Page listing the member's posts awaiting approval in the group at `url`.
#[must_use]
pub fn status_url(url: &str) -> String {
    format!("{}/my_pending_content", url.trim_end_matches('/'))
}

#[derive(Debug, Clone)]
pub struct PostLocators {
    pub photo_button: Locator,
    pub file_input: Locator,
    pub text_box: Locator,
    pub post_button: Locator,
    /// Counters linking to the pending posts, on the status page.
    pub pending_counter: Locator,
    /// Counters linking to the published posts, on the status page.
    pub posted_counter: Locator,
}

impl Default for PostLocators {
    fn default() -> Self {
        Self {
            photo_button: Locator::xpath(
                "//div[contains(@class, 'x1yztbdb')]//div[contains(@class, 'x1i10hfl') and .//span[text()='Photo/video']]",
            ),
            file_input: Locator::xpath(
                "//div[contains(@class, 'x9f619 x1n2onr6 x1ja2u2z x78zum5 xdt5ytf x2lah0s x193iq5w xurb0ha x1sxyh0 x1gslohp x12nagc xzboxd6 x14l7nz5')]//input[@type='file']",
            ),
            text_box: Locator::xpath(
                "//div[contains(@class, 'x1ed109x')]//div[@role='textbox' and @contenteditable='true' and @aria-label='Create a public post…']",
            ),
            post_button: Locator::xpath(
                ".//div[@aria-label=\"Post\" and @role=\"button\"]//span[text()=\"Post\"]/ancestor::div[@role=\"button\"]",
            ),
            pending_counter: Locator::xpath(
                "//div[contains(@class, \"x1xmf6yo\")]//a[contains(@href, \"my_pending_content\")]//span",
            ),
            posted_counter: Locator::xpath(
                "//div[contains(@class, \"x1xmf6yo\")]//a[contains(@href, \"my_posted_content\")]//span",
            ),
        }
    }
}

/// Waits between the steps of a post.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostPacing {
    /// After loading the group page.
    pub page: Duration,
    /// After opening the composer, attaching the image and pasting the text.
    pub step: Duration,
    /// After submitting.
    pub submit: Duration,
    /// After loading the status page.
    pub status: Duration,
}

impl PostPacing {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            page: config.post_page_settle(),
            step: config.post_step_settle(),
            submit: config.post_page_settle(),
            status: config.status_settle(),
        }
    }
}

/// What gets posted.
#[derive(Debug, Clone)]
pub struct PostContent {
    image_path: PathBuf,
    body: String,
}

impl PostContent {
    /// The image path is made absolute, as file inputs require.
    ///
    /// # Errors
    ///
    /// If the current directory cannot be read to absolutize a relative path.
    pub fn new(image_path: &Path, body: impl Into<String>) -> io::Result<Self> {
        Ok(Self {
            image_path: std::path::absolute(image_path)?,
            body: body.into(),
        })
    }

    #[must_use]
    pub fn image_path(&self) -> &Path {
        &self.image_path
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Posts [`PostContent`] into a group through the group page's composer.
pub struct GroupPostAction<'d, D> {
    driver: &'d D,
    content: PostContent,
    locators: PostLocators,
    pacing: PostPacing,
}

impl<'d, D: PageDriver> GroupPostAction<'d, D> {
    pub fn new(driver: &'d D, content: PostContent, pacing: PostPacing) -> Self {
        Self {
            driver,
            content,
            locators: PostLocators::default(),
            pacing,
        }
    }

    #[must_use]
    pub fn with_locators(mut self, locators: PostLocators) -> Self {
        self.locators = locators;
        self
    }

    async fn counter_shows_post(&self, locator: &Locator) -> Result<bool, DriverError> {
        for counter in self.driver.find_all(locator, None).await? {
            if self.driver.text(&counter).await? == INDICATOR_TEXT {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl<D: PageDriver> DeliveryAction for GroupPostAction<'_, D> {
    async fn deliver(&self, target: &GroupRecord) -> Result<(), StepFailure> {
        let driver = self.driver;
        let l = &self.locators;

        driver
            .navigate(&target.url)
            .await
            .map_err(StepFailure::at(DeliveryStep::Navigate))?;
        settle(self.pacing.page).await;

        let open = StepFailure::at(DeliveryStep::OpenComposer);
        match driver.find(&l.photo_button, None).await {
            Ok(button) => driver.click(&button).await.map_err(open)?,
            Err(e) => return Err(open(e)),
        }
        settle(self.pacing.step).await;

        let attach = StepFailure::at(DeliveryStep::AttachMedia);
        let image = self.content.image_path.to_string_lossy();
        match driver.find(&l.file_input, None).await {
            Ok(input) => driver.send_keys(&input, &image).await.map_err(attach)?,
            Err(e) => return Err(attach(e)),
        }
        settle(self.pacing.step).await;

        let insert = StepFailure::at(DeliveryStep::InsertText);
        match driver.find(&l.text_box, None).await {
            Ok(text_box) => driver.paste(&text_box, &self.content.body).await.map_err(insert)?,
            Err(e) => return Err(insert(e)),
        }
        settle(self.pacing.step).await;

        let submit = StepFailure::at(DeliveryStep::Submit);
        match driver.find(&l.post_button, None).await {
            Ok(button) => driver.click(&button).await.map_err(submit)?,
            Err(e) => return Err(submit(e)),
        }
        settle(self.pacing.submit).await;

        Ok(())
    }

    async fn read_status(&self, target: &GroupRecord) -> Result<PostStatus, DriverError> {
        self.driver.navigate(&status_url(&target.url)).await?;
        settle(self.pacing.status).await;

        if self.counter_shows_post(&self.locators.pending_counter).await? {
            Ok(PostStatus::Pending)
        } else if self.counter_shows_post(&self.locators.posted_counter).await? {
            Ok(PostStatus::Published)
        } else {
            Ok(PostStatus::None)
        }
    }
}

#[cfg(test)]
#[path = "group_post_test.rs"]
mod tests;
