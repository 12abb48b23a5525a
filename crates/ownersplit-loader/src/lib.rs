//! Car ledger snapshot loader.
//!
//! This crate reads the JSON snapshots the admin application exports (one
//! per car and year) into a [`LedgerStore`], together with the workspace
//! [`Options`] and a data-quality report.
//!
//! # Accepted inputs
//!
//! - A single snapshot file: `{ "carId": ..., "year": ..., ... }`
//! - An array of snapshots: `[ {...}, {...} ]`
//! - A bundle: `{ "options": {...}, "ledgers": [ {...} ] }`
//! - A directory of the above, plus an optional `options.json`
//!
//! # Example
//!
//! ```ignore
//! use ownersplit_loader::Loader;
//! use std::path::Path;
//!
//! let result = Loader::new().load(Path::new("snapshots/"))?;
//! for ledger in result.store.iter() {
//!     println!("{} {}", ledger.car_id, ledger.year);
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod check;
mod options;

pub use check::{check_ledger, drop_invalid_rows, Issue, Severity};
pub use options::{OptionWarning, Options, Rounding};

use ownersplit_core::{CarLedger, LedgerKey, LedgerStore};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the workspace options file inside a snapshot directory.
pub const OPTIONS_FILE: &str = "options.json";

/// Errors that can occur during loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// IO error reading a file or directory.
    #[error("failed to read {path}: {source}")]
    Io {
        /// The path that failed to read.
        path: PathBuf,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid JSON, or a snapshot in it could not be decoded.
    #[error("invalid JSON in {path}: {source}")]
    Json {
        /// The file being decoded.
        path: PathBuf,
        /// The underlying decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The document is valid JSON but not a snapshot, array or bundle.
    #[error("unexpected document in {path}: expected {expected}")]
    Shape {
        /// The file being decoded.
        path: PathBuf,
        /// What was expected at the offending position.
        expected: &'static str,
    },

    /// Two snapshots for the same car and year.
    #[error("duplicate snapshot for car {car_id}, year {year} in {path} (first one in {first} is kept)")]
    DuplicateLedger {
        /// The car.
        car_id: String,
        /// The year.
        year: i32,
        /// The file holding the ignored snapshot.
        path: PathBuf,
        /// The file holding the kept snapshot.
        first: PathBuf,
    },
}

/// Result of loading snapshots.
#[derive(Debug, Default)]
pub struct LoadResult {
    /// Every loaded ledger, with invalid-month rows removed.
    pub store: LedgerStore,
    /// Parsed options.
    pub options: Options,
    /// The file each ledger was read from.
    pub origins: BTreeMap<LedgerKey, PathBuf>,
    /// Files that were read, in load order.
    pub sources: Vec<PathBuf>,
    /// Data-quality issues found in the snapshots as read.
    pub issues: Vec<Issue>,
    /// All errors encountered during loading.
    pub errors: Vec<LoadError>,
}

impl LoadResult {
    /// Whether any file or snapshot failed to load.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Snapshot loader.
#[derive(Debug, Default)]
pub struct Loader {
    /// Files that have been loaded (symlinks and repeated paths are read once).
    loaded_files: HashSet<PathBuf>,
    /// Whether to descend into subdirectories.
    recursive: bool,
}

impl Loader {
    /// Create a new loader.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend into subdirectories when loading a directory.
    #[must_use]
    pub const fn with_recursive(mut self, enabled: bool) -> Self {
        self.recursive = enabled;
        self
    }

    /// Load a snapshot file or directory.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Io`] if `path` itself cannot be read. Problems
    /// with individual files or snapshots are collected in
    /// [`LoadResult::errors`] so that the rest of the input still loads.
    pub fn load(&mut self, path: &Path) -> Result<LoadResult, LoadError> {
        let mut result = LoadResult::default();

        let canonical = path.canonicalize().map_err(|e| LoadError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        if canonical.is_dir() {
            self.load_dir(&canonical, &mut result)?;
        } else {
            self.load_file(&canonical, &mut result);
        }

        tracing::debug!(
            ledgers = result.store.len(),
            files = result.sources.len(),
            errors = result.errors.len(),
            "snapshots loaded"
        );
        Ok(result)
    }

    fn load_dir(&mut self, dir: &Path, result: &mut LoadResult) -> Result<(), LoadError> {
        let io_err = |source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        };

        let mut entries = Vec::new();
        for entry in fs::read_dir(dir).map_err(io_err)? {
            entries.push(entry.map_err(io_err)?.path());
        }
        entries.sort();

        let options_path = dir.join(OPTIONS_FILE);
        if entries.contains(&options_path) {
            self.load_options_file(&options_path, result);
        }

        for entry in entries {
            if entry == options_path {
                continue;
            }
            if entry.is_dir() {
                if self.recursive {
                    self.load_dir(&entry, result)?;
                }
            } else if entry.extension().and_then(|e| e.to_str()) == Some("json") {
                self.load_file(&entry, result);
            }
        }
        Ok(())
    }

    fn read_json(&mut self, path: &Path, result: &mut LoadResult) -> Option<Value> {
        let key = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        if !self.loaded_files.insert(key) {
            return None;
        }

        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(source) => {
                result.errors.push(LoadError::Io {
                    path: path.to_path_buf(),
                    source,
                });
                return None;
            }
        };
        result.sources.push(path.to_path_buf());

        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(source) => {
                result.errors.push(LoadError::Json {
                    path: path.to_path_buf(),
                    source,
                });
                None
            }
        }
    }

    fn load_options_file(&mut self, path: &Path, result: &mut LoadResult) {
        if let Some(value) = self.read_json(path, result) {
            apply_options(path, value, result);
        }
    }

    fn load_file(&mut self, path: &Path, result: &mut LoadResult) {
        let Some(value) = self.read_json(path, result) else {
            return;
        };

        match value {
            Value::Array(items) => {
                for item in items {
                    add_ledger(path, item, result);
                }
            }
            Value::Object(mut object) if object.contains_key("ledgers") => {
                if let Some(options) = object.remove("options") {
                    apply_options(path, options, result);
                }
                match object.remove("ledgers") {
                    Some(Value::Array(items)) => {
                        for item in items {
                            add_ledger(path, item, result);
                        }
                    }
                    _ => result.errors.push(LoadError::Shape {
                        path: path.to_path_buf(),
                        expected: "an array under \"ledgers\"",
                    }),
                }
            }
            value @ Value::Object(_) => add_ledger(path, value, result),
            _ => result.errors.push(LoadError::Shape {
                path: path.to_path_buf(),
                expected: "a snapshot object, an array of snapshots or a bundle",
            }),
        }
    }
}

fn apply_options(path: &Path, value: Value, result: &mut LoadResult) {
    match serde_json::from_value::<BTreeMap<String, Value>>(value) {
        Ok(object) => result.options.apply_json(&object),
        Err(_) => result.errors.push(LoadError::Shape {
            path: path.to_path_buf(),
            expected: "an options object",
        }),
    }
}

fn add_ledger(path: &Path, value: Value, result: &mut LoadResult) {
    let mut ledger: CarLedger = match serde_json::from_value(value) {
        Ok(ledger) => ledger,
        Err(source) => {
            result.errors.push(LoadError::Json {
                path: path.to_path_buf(),
                source,
            });
            return;
        }
    };

    let key: LedgerKey = (ledger.car_id.clone(), ledger.year);
    if let Some(first) = result.origins.get(&key) {
        tracing::warn!(car = %key.0, year = key.1, path = %path.display(), "duplicate snapshot ignored");
        result.errors.push(LoadError::DuplicateLedger {
            car_id: key.0,
            year: key.1,
            path: path.to_path_buf(),
            first: first.clone(),
        });
        return;
    }

    result.issues.extend(check_ledger(&ledger));

    let dropped = drop_invalid_rows(&mut ledger);
    if dropped > 0 {
        tracing::warn!(
            car = %ledger.car_id,
            year = ledger.year,
            dropped,
            "rows with an invalid month dropped"
        );
    }

    result.origins.insert(key, path.to_path_buf());
    result.store.insert(ledger);
}

/// Load a snapshot file or directory.
///
/// Convenience wrapper around [`Loader::load`] that does not descend into
/// subdirectories.
///
/// # Errors
///
/// Returns [`LoadError::Io`] if `path` cannot be read.
pub fn load(path: &Path) -> Result<LoadResult, LoadError> {
    Loader::new().load(path)
}
