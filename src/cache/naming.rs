//! File naming for new cache entries.
//!
//! A cached image is stored as `<sanitized title>.<extension>` directly under
//! the cache root. Naming is a pure function of its inputs: it never looks at
//! the filesystem and does not guarantee uniqueness. Two titles that sanitize
//! to the same stem map to the same path, and the later write replaces the
//! earlier file.
//!
//! # Example
//!
//! ```
//! use apodcache::cache::naming::derive_path;
//! use std::path::Path;
//!
//! let path = derive_path(
//!     Path::new("/var/cache/imgcache"),
//!     " NGC #3521: Galaxy in a Bubble ",
//!     "https://apod.nasa.gov/apod/image/2205/NGC3521LRGBHaAPOD-20.jpg",
//!     "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad",
//! );
//! assert!(path.ends_with("NGC_3521_Galaxy_in_a_Bubble.jpg"));
//! ```

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Extension used when the source URL does not end in a usable one.
pub const FALLBACK_EXTENSION: &str = "img";

/// Number of digest characters used as the stem when a title sanitizes to nothing.
pub const FALLBACK_STEM_LEN: usize = 16;

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Turn a human title into a filesystem-safe file stem.
///
/// Leading and trailing whitespace is removed, each inner whitespace run
/// becomes a single `_`, accented letters are folded to their base letter and
/// every remaining character outside `[A-Za-z0-9_]` is dropped.
///
/// # Example
///
/// ```
/// use apodcache::cache::naming::sanitize_title;
///
/// assert_eq!(sanitize_title("  Comet   Lovejoy! "), "Comet_Lovejoy");
/// assert_eq!(sanitize_title("Café Nebula"), "Cafe_Nebula");
/// assert_eq!(sanitize_title("???"), "");
/// ```
#[must_use]
pub fn sanitize_title(title: &str) -> String {
    let underscored = WHITESPACE_RUN.replace_all(title.trim(), "_");

    underscored
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect()
}

/// Extract the file extension from an image URL.
///
/// Query strings and fragments are ignored. Whatever follows the final `.`
/// is used as long as it is a plain alphanumeric token; anything else
/// (no dot at all, a dot only in the host name, an empty suffix) yields
/// [`FALLBACK_EXTENSION`].
///
/// # Example
///
/// ```
/// use apodcache::cache::naming::image_extension;
///
/// assert_eq!(image_extension("https://apod.nasa.gov/image/a.png?x=1"), "png");
/// assert_eq!(image_extension("https://example.com/image/noext"), "img");
/// ```
#[must_use]
pub fn image_extension(source_url: &str) -> &str {
    let end = source_url.find(['?', '#']).unwrap_or(source_url.len());
    let without_query = &source_url[..end];

    match without_query.rsplit_once('.') {
        Some((_, ext)) if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) => ext,
        _ => FALLBACK_EXTENSION,
    }
}

/// Derive the path under `cache_root` at which a new image is stored.
///
/// `digest` is only consulted when `title` sanitizes to an empty string, in
/// which case the first [`FALLBACK_STEM_LEN`] characters of the digest become
/// the file stem.
#[must_use]
pub fn derive_path(cache_root: &Path, title: &str, source_url: &str, digest: &str) -> PathBuf {
    let mut stem = sanitize_title(title);
    if stem.is_empty() {
        stem = digest.chars().take(FALLBACK_STEM_LEN).collect();
    }

    let file_name = format!("{}.{}", stem, image_extension(source_url));
    cache_root.join(file_name)
}
