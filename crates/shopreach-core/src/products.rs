use serde::{Deserialize, Serialize};

/// A product scraped from one detail page of the shop.
///
/// Only `category` is guaranteed. Every other field is filled by an
/// independent extraction step and is left out of the record (and of its
/// JSON form) when that step fails, so partial records are normal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Opaque category identifier supplied by the caller, e.g. a backend id.
    pub category: String,
    /// Trailing path segment of the product URL. Uniqueness key within a
    /// category store. Older stores wrote this as `product_id`.
    #[serde(default, alias = "product_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Gallery thumbnails, in page order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Customer photo thumbnails, in page order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub real_images: Option<Vec<String>>,
    /// Images embedded in the description body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description_images: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Price in whole currency units.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<i64>,
}

impl ProductRecord {
    /// Creates a record carrying only its category.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            id: None,
            name: None,
            images: None,
            real_images: None,
            description_images: None,
            description: None,
            price: None,
        }
    }

    /// Number of optional fields that were extracted.
    #[must_use]
    pub fn filled_fields(&self) -> usize {
        [
            self.id.is_some(),
            self.name.is_some(),
            self.images.is_some(),
            self.real_images.is_some(),
            self.description_images.is_some(),
            self.description.is_some(),
            self.price.is_some(),
        ]
        .into_iter()
        .filter(|filled| *filled)
        .count()
    }
}
