//! Content-addressed image cache.
//!
//! This module keeps a local, deduplicated store of downloaded APOD images
//! together with their metadata, so that requesting an image that is already
//! cached never downloads into, or writes to, the cache again.
//!
//! # Architecture
//!
//! * [`hasher`]: SHA-256 content digests, the identity of an image.
//! * [`naming`]: Deterministic, filesystem-safe file names for new images.
//! * [`database`]: SQLite metadata store keyed by digest.
//! * [`layout`]: Creation of the cache directory and database.
//! * [`image_cache`]: The orchestrator tying the pieces together.
//!
//! # Identity
//!
//! Entries are identified by the digest of their bytes, never by the date or
//! URL they were requested with. The flow for a new request is:
//!
//! fetch record → download bytes → digest → lookup by digest →
//! (hit: return existing id | miss: name file → write file → insert row)
//!
//! The file is always written before its row, so every row points at a file
//! that exists. Entries are never updated or removed.

pub mod database;
pub mod entry;
pub mod error;
pub mod hasher;
pub mod image_cache;
pub mod layout;
pub mod naming;

pub use database::MetadataStore;
pub use entry::{CacheEntry, EntryMetadata, NO_ENTRY};
pub use error::{CacheError, CacheResult};
pub use image_cache::{AddOutcome, ImageCache};
pub use layout::CacheLayout;
