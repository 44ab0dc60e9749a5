//! On-disk cache of extracted server binaries.
//!
//! Entries live at `{root}/{channel}-{tag}/{binary}`. Presence of the binary
//! file is the sole validity signal: no checksum, no re-validation. Stale
//! entries from old tags persist indefinitely; nothing here ever deletes.

use std::path::{Path, PathBuf};

use tracing::debug;

pub struct AssetCache {
    root: PathBuf,
}

impl AssetCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory for a release identifier such as `nightly-v0.3.0`.
    pub fn release_dir(&self, identifier: &str) -> PathBuf {
        self.root.join(identifier)
    }

    /// Returns the binary path if it already exists in the cache.
    ///
    /// A hit short-circuits installation entirely; a corrupted partial write
    /// from an interrupted prior run would also be treated as valid.
    pub fn cached_binary(&self, identifier: &str, binary_name: &str) -> Option<PathBuf> {
        let path = self.release_dir(identifier).join(binary_name);
        if path.is_file() {
            debug!("cache hit for {} at {:?}", identifier, path);
            Some(path)
        } else {
            None
        }
    }
}
