use shopreach_core::{GroupRecord, ProductRecord};

/// Records that carry a uniqueness key within their store.
pub trait Keyed {
    /// The record's unique key, if it has one. Keyless records never
    /// collide with anything.
    fn key(&self) -> Option<&str>;
}

impl Keyed for ProductRecord {
    fn key(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

impl Keyed for GroupRecord {
    fn key(&self) -> Option<&str> {
        Some(&self.url)
    }
}
