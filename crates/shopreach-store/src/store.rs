use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use shopreach_core::{DeliveryRate, GroupRecord, ProductRecord};

use crate::error::StoreError;
use crate::keyed::Keyed;

/// Resolves store keys to files inside one data directory.
#[derive(Debug, Clone)]
pub struct StoreDir {
    root: PathBuf,
    groups_file: String,
}

impl StoreDir {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, groups_file: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            groups_file: groups_file.into(),
        }
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Product store of the category listed at `/category/<category_page>`.
    #[must_use]
    pub fn products(&self, category_page: u32) -> RecordStore<ProductRecord> {
        RecordStore::at(self.root.join(format!("cat_{category_page}.json")))
    }

    #[must_use]
    pub fn groups(&self) -> RecordStore<GroupRecord> {
        RecordStore::at(self.root.join(&self.groups_file))
    }

    #[must_use]
    pub fn delivery_rates(&self) -> RecordStore<DeliveryRate> {
        RecordStore::at(self.root.join("delivery_rates.json"))
    }
}

/// Result of [`RecordStore::merge_new`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergeReport {
    pub added: usize,
    /// Candidates dropped because their key was already stored or repeated
    /// earlier in the same batch.
    pub duplicates: usize,
    /// Store size after the merge.
    pub total: usize,
}

/// An ordered list of records persisted as one JSON array.
#[derive(Debug, Clone)]
pub struct RecordStore<T> {
    path: PathBuf,
    _record: PhantomData<fn() -> T>,
}

enum Loaded<T> {
    Records(Vec<T>),
    Missing,
    Unreadable(std::io::Error),
    Malformed(serde_json::Error),
}

impl<T> RecordStore<T>
where
    T: Serialize + DeserializeOwned + Clone,
{
    #[must_use]
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _record: PhantomData,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every stored record.
    ///
    /// A missing, unreadable or malformed file yields an empty list; the
    /// problem is logged, never returned.
    #[must_use]
    pub fn load(&self) -> Vec<T> {
        match self.read() {
            Loaded::Records(records) => records,
            Loaded::Missing => Vec::new(),
            Loaded::Unreadable(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "record store is unreadable; treating it as empty"
                );
                Vec::new()
            }
            Loaded::Malformed(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "record store is malformed; treating it as empty"
                );
                Vec::new()
            }
        }
    }

    /// Loads the store, appends `record` and writes the whole list back.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the existing file cannot be read or the new
    /// list cannot be written.
    pub fn append(&self, record: &T) -> Result<(), StoreError> {
        let mut records = self.load_for_update()?;
        records.push(record.clone());
        self.save(&records)
    }

    /// Replaces the stored list with `records`.
    ///
    /// The new content is written to a sibling temporary file and renamed
    /// over the store, so readers never see a half-written array.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if serialization or any file operation fails.
    pub fn save(&self, records: &[T]) -> Result<(), StoreError> {
        let mut body =
            serde_json::to_string_pretty(records).map_err(|source| StoreError::Serialize {
                path: self.path.clone(),
                source,
            })?;
        body.push('\n');

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| io_error(parent, source))?;
        }

        let tmp = self.sibling("tmp");
        fs::write(&tmp, body).map_err(|source| io_error(&tmp, source))?;
        fs::rename(&tmp, &self.path).map_err(|source| io_error(&self.path, source))
    }

    /// Like [`load`](Self::load), but a file that cannot be read is an error
    /// and a malformed one is moved aside to a fresh `<file>.corrupt[.N]` so
    /// the following write does not destroy it.
    fn load_for_update(&self) -> Result<Vec<T>, StoreError> {
        match self.read() {
            Loaded::Records(records) => Ok(records),
            Loaded::Missing => Ok(Vec::new()),
            Loaded::Unreadable(source) => Err(io_error(&self.path, source)),
            Loaded::Malformed(e) => {
                let aside = self.free_corrupt_path();
                tracing::warn!(
                    path = %self.path.display(),
                    moved_to = %aside.display(),
                    error = %e,
                    "record store is malformed; starting a new one"
                );
                fs::rename(&self.path, &aside).map_err(|source| io_error(&aside, source))?;
                Ok(Vec::new())
            }
        }
    }

    fn read(&self) -> Loaded<T> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Loaded::Missing,
            Err(e) => return Loaded::Unreadable(e),
        };
        match serde_json::from_str::<Vec<T>>(&raw) {
            Ok(records) => Loaded::Records(records),
            Err(e) => Loaded::Malformed(e),
        }
    }

    /// First of `<file>.corrupt`, `<file>.corrupt.1`, `<file>.corrupt.2`, ...
    /// that does not exist yet.
    fn free_corrupt_path(&self) -> PathBuf {
        let first = self.sibling("corrupt");
        if !first.exists() {
            return first;
        }
        (1u32..)
            .map(|n| self.sibling(&format!("corrupt.{n}")))
            .find(|candidate| !candidate.exists())
            .unwrap_or(first)
    }

    fn sibling(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".");
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

fn io_error(path: &Path, source: std::io::Error) -> StoreError {
    StoreError::Io {
        path: path.to_path_buf(),
        source,
    }
}

impl<T> RecordStore<T>
where
    T: Serialize + DeserializeOwned + Clone + Keyed,
{
    /// Appends the candidates whose key is not stored yet, in order, with a
    /// single write. Keyless candidates are always appended.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the existing file cannot be read or the
    /// merged list cannot be written.
    pub fn merge_new(&self, candidates: Vec<T>) -> Result<MergeReport, StoreError> {
        let mut records = self.load_for_update()?;
        let mut seen: HashSet<String> = records
            .iter()
            .filter_map(|r| r.key().map(str::to_owned))
            .collect();

        let mut report = MergeReport::default();
        for candidate in candidates {
            let fresh = match candidate.key() {
                Some(key) => seen.insert(key.to_owned()),
                None => true,
            };
            if fresh {
                records.push(candidate);
                report.added += 1;
            } else {
                report.duplicates += 1;
            }
        }

        if report.added > 0 {
            self.save(&records)?;
        }
        report.total = records.len();
        Ok(report)
    }

    /// Keys of every stored record.
    #[must_use]
    pub fn keys(&self) -> HashSet<String> {
        self.load()
            .iter()
            .filter_map(|r| r.key().map(str::to_owned))
            .collect()
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
