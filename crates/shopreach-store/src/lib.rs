//! Flat JSON record stores.
//!
//! Each store is one UTF-8 JSON array on disk. Every operation reads and
//! rewrites the whole file, which is fine for the tens-to-thousands of
//! records this tool keeps. A single process is assumed to own the data
//! directory at a time.

pub mod error;
mod keyed;
mod store;

pub use error::StoreError;
pub use keyed::Keyed;
pub use store::{MergeReport, RecordStore, StoreDir};
