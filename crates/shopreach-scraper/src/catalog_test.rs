use shopreach_browser::fake::{FakeDriver, FakeNode};

use super::*;

const SHOP: &str = "https://shop.test";

fn catalog(driver: &FakeDriver) -> ShopCatalog<'_, FakeDriver> {
    ShopCatalog::new(driver, "https://shop.test/", 26, "jh76f651k30k32z9112c2m9g257am5xa")
}

/// Builds a product page carrying every field.
fn full_product_page(driver: &FakeDriver, url: &str) {
    let l = ProductPageLocators::default();
    let root = driver.page(url);
    driver.add(root, &l.title, FakeNode::text("  ساعة يد رجالية  "));

    let gallery = driver.add(root, &l.gallery, FakeNode::new());
    driver.add(gallery, &l.image, FakeNode::new().with_attr("src", "https://cdn.test/g1.jpg"));
    driver.add(gallery, &l.image, FakeNode::new().with_attr("src", "https://cdn.test/g2.jpg"));

    let real = driver.add(root, &l.real_gallery, FakeNode::new());
    driver.add(real, &l.image, FakeNode::new().with_attr("src", "https://cdn.test/r1.jpg"));

    let description = driver.add(root, &l.description, FakeNode::text("ساعة أنيقة مقاومة للماء"));
    driver.add(
        description,
        &l.image,
        FakeNode::new().with_attr("src", DESCRIPTION_PLACEHOLDER_IMAGE),
    );
    driver.add(description, &l.image, FakeNode::new().with_attr("src", "https://cdn.test/d1.jpg"));
    driver.add(description, &l.image, FakeNode::new());

    driver.add(root, &l.price, FakeNode::text("3,900 دج"));
}

#[test]
fn listing_url_uses_category_page_and_page_number() {
    let driver = FakeDriver::new();
    assert_eq!(
        catalog(&driver).listing_url(3),
        "https://shop.test/category/26?page=3"
    );
}

#[tokio::test]
async fn page_references_returns_hrefs_in_order() {
    let driver = FakeDriver::new();
    let l = ProductPageLocators::default();
    let root = driver.page("https://shop.test/category/26?page=1");
    driver.add(
        root,
        &l.listing_links,
        FakeNode::new().with_attr("href", "https://shop.test/product/a"),
    );
    driver.add(root, &l.listing_links, FakeNode::new());
    driver.add(
        root,
        &l.listing_links,
        FakeNode::new().with_attr("href", "https://shop.test/product/b"),
    );

    let refs = catalog(&driver).page_references(1).await.unwrap();

    assert_eq!(refs, ["https://shop.test/product/a", "https://shop.test/product/b"]);
    assert_eq!(driver.visited(), ["https://shop.test/category/26?page=1"]);
}

#[tokio::test]
async fn page_references_propagates_navigation_failure() {
    let driver = FakeDriver::new();
    driver.break_url("https://shop.test/category/26?page=2");
    let result = catalog(&driver).page_references(2).await;
    assert!(matches!(result, Err(ScraperError::Driver(_))));
}

#[tokio::test]
async fn product_detail_extracts_every_field() {
    let driver = FakeDriver::new();
    let url = format!("{SHOP}/product/k57a1b2");
    full_product_page(&driver, &url);

    let record = catalog(&driver).product_detail(&url).await.unwrap();

    assert_eq!(record.category, "jh76f651k30k32z9112c2m9g257am5xa");
    assert_eq!(record.id.as_deref(), Some("k57a1b2"));
    assert_eq!(record.name.as_deref(), Some("ساعة يد رجالية"));
    assert_eq!(
        record.images.as_deref(),
        Some(&["https://cdn.test/g1.jpg".to_owned(), "https://cdn.test/g2.jpg".to_owned()][..])
    );
    assert_eq!(
        record.real_images.as_deref(),
        Some(&["https://cdn.test/r1.jpg".to_owned()][..])
    );
    assert_eq!(
        record.description_images.as_deref(),
        Some(&["https://cdn.test/d1.jpg".to_owned()][..])
    );
    assert_eq!(record.description.as_deref(), Some("ساعة أنيقة مقاومة للماء"));
    assert_eq!(record.price, Some(3900));
}

#[tokio::test]
async fn product_detail_omits_failed_fields_only() {
    let driver = FakeDriver::new();
    let l = ProductPageLocators::default();
    let url = format!("{SHOP}/product/bare");
    let root = driver.page(&url);
    driver.add(root, &l.title, FakeNode::text("Lamp"));
    driver.add(root, &l.price, FakeNode::text("on request دج"));

    let record = catalog(&driver).product_detail(&url).await.unwrap();

    assert_eq!(record.id.as_deref(), Some("bare"));
    assert_eq!(record.name.as_deref(), Some("Lamp"));
    assert!(record.images.is_none());
    assert!(record.real_images.is_none());
    assert!(record.description_images.is_none());
    assert!(record.description.is_none());
    assert!(record.price.is_none());
}

#[tokio::test]
async fn empty_gallery_is_an_empty_list_not_a_missing_field() {
    let driver = FakeDriver::new();
    let l = ProductPageLocators::default();
    let url = format!("{SHOP}/product/nogallery");
    let root = driver.page(&url);
    driver.add(root, &l.gallery, FakeNode::new());

    let record = catalog(&driver).product_detail(&url).await.unwrap();
    assert_eq!(record.images, Some(Vec::new()));
}

#[tokio::test]
async fn product_id_comes_from_url_after_redirect() {
    let driver = FakeDriver::new();
    driver.redirect("https://shop.test/p/short", "https://shop.test/product/canonical1");
    let record = catalog(&driver)
        .product_detail("https://shop.test/p/short")
        .await
        .unwrap();
    assert_eq!(record.id.as_deref(), Some("canonical1"));
}

#[tokio::test]
async fn product_detail_propagates_navigation_failure() {
    let driver = FakeDriver::new();
    driver.break_url("https://shop.test/product/x");
    let result = catalog(&driver).product_detail("https://shop.test/product/x").await;
    assert!(result.is_err());
}
