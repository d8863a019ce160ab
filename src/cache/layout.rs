//! On-disk layout of the image cache.
//!
//! ```text
//! <parent>/
//! └── imgcache/
//!     ├── image_cache.db
//!     ├── Some_Title.jpg
//!     └── ...
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use super::database::MetadataStore;
use super::error::{CacheError, CacheResult};

/// Name of the cache directory created under the parent directory.
pub const CACHE_DIR_NAME: &str = "imgcache";

/// File name of the metadata database inside the cache directory.
pub const DB_FILE_NAME: &str = "image_cache.db";

/// Resolved locations of the cache root and its metadata store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheLayout {
    root: PathBuf,
    db_path: PathBuf,
}

impl CacheLayout {
    /// Compute the layout under `parent` without touching the filesystem.
    ///
    /// Relative parents are resolved against the current directory so that
    /// every stored file path is absolute.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the current directory cannot be read.
    pub fn resolve(parent: &Path) -> CacheResult<Self> {
        let parent = std::path::absolute(parent).map_err(|e| CacheError::io(parent, e))?;
        let root = parent.join(CACHE_DIR_NAME);
        let db_path = root.join(DB_FILE_NAME);
        Ok(Self { root, db_path })
    }

    /// Resolve the layout under `parent`, create the cache directory if it is
    /// missing and make sure the metadata schema exists.
    ///
    /// Calling this repeatedly on the same parent is harmless and keeps all
    /// existing entries.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Io`] if the directory cannot be created and
    /// [`CacheError::Database`] if the store cannot be initialized.
    pub fn init(parent: &Path) -> CacheResult<Self> {
        let layout = Self::resolve(parent)?;

        if layout.root.is_dir() {
            log::debug!("Image cache directory already exists: {}", layout.root.display());
        } else {
            fs::create_dir_all(&layout.root).map_err(|e| CacheError::io(&layout.root, e))?;
            log::info!("Image cache directory created: {}", layout.root.display());
        }

        let existed = layout.db_path.exists();
        layout.store().ensure_schema()?;
        if existed {
            log::debug!("Image cache DB already exists: {}", layout.db_path.display());
        } else {
            log::info!("Image cache DB created: {}", layout.db_path.display());
        }

        Ok(layout)
    }

    /// Directory holding the image files and the database.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the metadata database.
    #[must_use]
    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Store handle bound to this layout's database.
    #[must_use]
    pub fn store(&self) -> MetadataStore {
        MetadataStore::new(&self.db_path)
    }
}
