//! Content-addressed APOD image cache.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bytesize::ByteSize;
use chrono::NaiveDate;

use super::database::{validate_fields, MetadataStore};
use super::entry::{CacheEntry, EntryMetadata, NO_ENTRY};
use super::error::{CacheError, CacheResult};
use super::hasher::digest;
use super::layout::CacheLayout;
use super::naming::derive_path;
use crate::apod::ApodSource;
use crate::progress::{ProgressCallback, PHASE_DOWNLOAD, PHASE_FETCH};

/// Result of [`ImageCache::add_detailed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// The image was new; a file and a row were written.
    Added(i64),
    /// An entry with the same content digest already existed.
    AlreadyCached(i64),
}

impl AddOutcome {
    /// Id of the entry, whether new or existing.
    #[must_use]
    pub fn id(self) -> i64 {
        match self {
            Self::Added(id) | Self::AlreadyCached(id) => id,
        }
    }
}

/// The image cache: fetches APODs and stores each distinct image once.
///
/// Identity is by content. Two dates that serve byte-identical images share
/// one entry, and asking for an already cached date never writes anything.
pub struct ImageCache<S> {
    layout: CacheLayout,
    store: MetadataStore,
    source: S,
    progress: Option<Arc<dyn ProgressCallback>>,
}

impl<S: ApodSource> ImageCache<S> {
    /// Create a cache over an already initialized layout.
    #[must_use]
    pub fn new(layout: CacheLayout, source: S) -> Self {
        let store = layout.store();
        Self {
            layout,
            store,
            source,
            progress: None,
        }
    }

    /// Initialize the cache under `parent` (see [`CacheLayout::init`]) and
    /// create a cache over it.
    ///
    /// # Errors
    ///
    /// Returns any error raised while creating the directory or schema.
    pub fn open(parent: &Path, source: S) -> CacheResult<Self> {
        Ok(Self::new(CacheLayout::init(parent)?, source))
    }

    /// Report fetch and download progress to `progress`.
    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressCallback>) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Layout this cache writes into.
    #[must_use]
    pub fn layout(&self) -> &CacheLayout {
        &self.layout
    }

    /// Add the APOD of `date` to the cache and return its entry id.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Fetch`] if the record or image cannot be
    /// obtained, [`CacheError::Io`] if the image file cannot be written and
    /// [`CacheError::Database`] if the store fails. A record with a blank
    /// title or explanation is rejected with [`CacheError::InvalidEntry`]
    /// before any file is written. No row is ever recorded for an image
    /// whose file was not written.
    pub fn add(&self, date: NaiveDate) -> CacheResult<i64> {
        self.add_detailed(date).map(AddOutcome::id)
    }

    /// Like [`add`](Self::add), but tells whether the entry was new.
    pub fn add_detailed(&self, date: NaiveDate) -> CacheResult<AddOutcome> {
        log::info!("APOD date: {}", date);

        let date_text = date.to_string();
        let record = self.phase(PHASE_FETCH, &date_text, || self.source.fetch_record(date))?;

        let image_url = record.image_url();
        let bytes = self.phase(PHASE_DOWNLOAD, image_url, || {
            let bytes = self.source.download(image_url)?;
            if let Some(progress) = &self.progress {
                progress.on_item_completed(bytes.len() as u64);
            }
            Ok(bytes)
        })?;
        log::info!("Downloaded {} from {}", ByteSize::b(bytes.len() as u64), image_url);

        let digest = digest(&bytes);
        log::info!("APOD SHA-256: {}", digest);

        let existing = self.store.find_id_by_digest(&digest)?;
        if existing != NO_ENTRY {
            log::info!("APOD already exists in cache (id {})", existing);
            return Ok(AddOutcome::AlreadyCached(existing));
        }

        log::info!("APOD does not exist in cache");
        validate_fields(&record.title, &record.explanation)?;
        let path = derive_path(self.layout.root(), &record.title, image_url, &digest);
        write_image(&path, &bytes)?;
        log::info!("Saved image to {}", path.display());

        let id = self
            .store
            .insert(&record.title, &record.explanation, &path, &digest)?;
        Ok(AddOutcome::Added(id))
    }

    fn phase<T>(
        &self,
        phase: &str,
        detail: &str,
        f: impl FnOnce() -> Result<T, crate::apod::FetchError>,
    ) -> CacheResult<T> {
        if let Some(progress) = &self.progress {
            progress.on_phase_start(phase, detail);
        }
        let result = f();
        if let Some(progress) = &self.progress {
            progress.on_phase_end(phase);
        }
        Ok(result?)
    }
}

impl<S> ImageCache<S> {
    /// Title, explanation and file path of entry `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::NotFound`] for an unknown id.
    pub fn get_metadata(&self, id: i64) -> CacheResult<EntryMetadata> {
        self.store.get(id)
    }

    /// Titles of all cached images, in the order they were added.
    pub fn list_titles(&self) -> CacheResult<Vec<String>> {
        self.store.list_all_titles()
    }

    /// All cached entries, in the order they were added.
    pub fn entries(&self) -> CacheResult<Vec<CacheEntry>> {
        self.store.entries()
    }
}

/// Write `bytes` to `path`, replacing any existing file.
///
/// The data goes to a sibling temporary file first and is renamed into place,
/// so a failed write never leaves a truncated image at `path`.
fn write_image(path: &Path, bytes: &[u8]) -> CacheResult<()> {
    let tmp = temp_path_for(path);

    if let Err(e) = fs::write(&tmp, bytes) {
        let _ = fs::remove_file(&tmp);
        return Err(CacheError::io(path, e));
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(CacheError::io(path, e));
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".part");
    path.with_file_name(name)
}
