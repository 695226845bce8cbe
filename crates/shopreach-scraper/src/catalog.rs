//! Browser-backed access to the shop's category listings and product pages.

use std::time::Duration;

use shopreach_browser::{settle, Locator, PageDriver};
use shopreach_core::ProductRecord;

use crate::error::ScraperError;
use crate::extract::{item_id_from_url, optional_field, parse_price, ExtractError};

/// Placeholder banner the shop injects into every product description.
pub const DESCRIPTION_PLACEHOLDER_IMAGE: &str =
    "https://ae01.alicdn.com/kf/H5f3e1509dda248af851fa25467aa04bfZ.jpg";

/// Currency marker shown next to prices (Algerian dinar).
pub const DINAR_MARKER: &str = "دج";

/// A paginated listing of products plus their detail pages.
#[allow(async_fn_in_trait)]
pub trait ListingSource {
    /// Opaque category value stamped on every record.
    fn category(&self) -> &str;

    /// Product references (detail URLs) on listing page `page`, in display
    /// order. Pages start at 1.
    ///
    /// # Errors
    ///
    /// Any failure to load the listing is returned and is meant to halt the
    /// run.
    async fn page_references(&self, page: u32) -> Result<Vec<String>, ScraperError>;

    /// Loads the detail page at `reference` and extracts a record. Fields
    /// that cannot be extracted are left out.
    ///
    /// # Errors
    ///
    /// Only a failure to load the page itself is returned.
    async fn product_detail(&self, reference: &str) -> Result<ProductRecord, ScraperError>;
}

/// Where things live on the shop's pages.
#[derive(Debug, Clone)]
pub struct ProductPageLocators {
    /// Product links on a category listing page.
    pub listing_links: Locator,
    pub title: Locator,
    /// Container of the gallery thumbnails.
    pub gallery: Locator,
    /// Container of the customer photo thumbnails.
    pub real_gallery: Locator,
    pub description: Locator,
    pub price: Locator,
    /// Images inside a gallery or the description.
    pub image: Locator,
}

impl Default for ProductPageLocators {
    fn default() -> Self {
        Self {
            listing_links: Locator::xpath(
                "//div[contains(@class, 'grid-cols-2') and contains(@class, 'md:grid-cols-6')]//a",
            ),
            title: Locator::xpath(
                "//div[@class='flex flex-col space-y-2 text-xl']//div[@id='product-title']",
            ),
            gallery: Locator::css(".swiper.thumbsSliderSwiper .swiper-wrapper"),
            real_gallery: Locator::class_name("real_thumbsSliderSwiper"),
            description: Locator::id("product-description"),
            price: Locator::xpath(
                "//div[@class='flex flex-col space-y-2 text-xl']//div[contains(@class,'font-bold') and contains(text(),'دج')]",
            ),
            image: Locator::tag("img"),
        }
    }
}

/// One category of the shop, read through a browser tab.
pub struct ShopCatalog<'d, D> {
    driver: &'d D,
    base_url: String,
    category_page: u32,
    category_id: String,
    locators: ProductPageLocators,
    page_settle: Duration,
}

impl<'d, D: PageDriver> ShopCatalog<'d, D> {
    /// `category_page` is the number in `/category/<n>`; `category_id` is the
    /// value stored in each record's `category`.
    pub fn new(
        driver: &'d D,
        base_url: &str,
        category_page: u32,
        category_id: impl Into<String>,
    ) -> Self {
        Self {
            driver,
            base_url: base_url.trim_end_matches('/').to_owned(),
            category_page,
            category_id: category_id.into(),
            locators: ProductPageLocators::default(),
            page_settle: Duration::ZERO,
        }
    }

    /// Wait applied after each page load.
    #[must_use]
    pub fn with_page_settle(mut self, page_settle: Duration) -> Self {
        self.page_settle = page_settle;
        self
    }

    #[must_use]
    pub fn with_locators(mut self, locators: ProductPageLocators) -> Self {
        self.locators = locators;
        self
    }

    #[must_use]
    pub fn listing_url(&self, page: u32) -> String {
        format!(
            "{}/category/{}?page={page}",
            self.base_url, self.category_page
        )
    }

    async fn image_sources(&self, container: &Locator) -> Result<Vec<String>, ExtractError> {
        let container = self.driver.find(container, None).await?;
        let images = self
            .driver
            .find_all(&self.locators.image, Some(&container))
            .await?;
        let mut sources = Vec::with_capacity(images.len());
        for image in &images {
            if let Some(src) = self.driver.attr(image, "src").await? {
                sources.push(src);
            }
        }
        Ok(sources)
    }

    async fn extract_id(&self) -> Result<String, ExtractError> {
        let url = self.driver.current_url().await?;
        item_id_from_url(&url).ok_or(ExtractError::Parse {
            what: "product id",
            value: url,
        })
    }

    async fn extract_name(&self) -> Result<String, ExtractError> {
        let title = self.driver.find(&self.locators.title, None).await?;
        Ok(self.driver.text(&title).await?.trim().to_owned())
    }

    async fn extract_images(&self) -> Result<Vec<String>, ExtractError> {
        self.image_sources(&self.locators.gallery).await
    }

    async fn extract_real_images(&self) -> Result<Vec<String>, ExtractError> {
        self.image_sources(&self.locators.real_gallery).await
    }

    async fn extract_description_images(&self) -> Result<Vec<String>, ExtractError> {
        let mut sources = self.image_sources(&self.locators.description).await?;
        sources.retain(|src| src != DESCRIPTION_PLACEHOLDER_IMAGE);
        Ok(sources)
    }

    async fn extract_description(&self) -> Result<String, ExtractError> {
        let description = self.driver.find(&self.locators.description, None).await?;
        Ok(self.driver.text(&description).await?)
    }

    async fn extract_price(&self) -> Result<i64, ExtractError> {
        let price = self.driver.find(&self.locators.price, None).await?;
        let text = self.driver.text(&price).await?;
        parse_price(&text, DINAR_MARKER)
    }
}

impl<D: PageDriver> ListingSource for ShopCatalog<'_, D> {
    fn category(&self) -> &str {
        &self.category_id
    }

    async fn page_references(&self, page: u32) -> Result<Vec<String>, ScraperError> {
        let url = self.listing_url(page);
        self.driver.navigate(&url).await?;
        settle(self.page_settle).await;

        let links = self
            .driver
            .find_all(&self.locators.listing_links, None)
            .await?;
        let mut references = Vec::with_capacity(links.len());
        for link in &links {
            match self.driver.attr(link, "href").await? {
                Some(href) if !href.is_empty() => references.push(href),
                _ => tracing::debug!(page, "listing link without href ignored"),
            }
        }
        tracing::info!(page, url = %url, count = references.len(), "listing page loaded");
        Ok(references)
    }

    async fn product_detail(&self, reference: &str) -> Result<ProductRecord, ScraperError> {
        self.driver.navigate(reference).await?;
        settle(self.page_settle).await;

        let mut record = ProductRecord::new(self.category_id.clone());
        record.id = optional_field("id", self.extract_id().await);
        record.name = optional_field("name", self.extract_name().await);
        record.images = optional_field("images", self.extract_images().await);
        record.real_images = optional_field("real_images", self.extract_real_images().await);
        record.description_images = optional_field(
            "description_images",
            self.extract_description_images().await,
        );
        record.description = optional_field("description", self.extract_description().await);
        record.price = optional_field("price", self.extract_price().await);

        tracing::debug!(
            reference,
            fields = record.filled_fields(),
            "product extracted"
        );
        Ok(record)
    }
}

#[cfg(test)]
#[path = "catalog_test.rs"]
mod tests;
