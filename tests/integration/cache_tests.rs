use apodcache::apod::{ApodRecord, ApodSource, FetchError, MediaKind};
use apodcache::cache::hasher::digest;
use apodcache::cache::{AddOutcome, CacheError, CacheLayout, ImageCache, NO_ENTRY};
use chrono::NaiveDate;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

/// In-memory APOD source keyed by date and URL.
#[derive(Default)]
struct MockSource {
    records: HashMap<NaiveDate, ApodRecord>,
    images: HashMap<String, Vec<u8>>,
    downloads: RefCell<Vec<String>>,
}

impl MockSource {
    fn with_image(mut self, date: &str, title: &str, url: &str, bytes: &[u8]) -> Self {
        let date = ymd(date);
        self.records.insert(
            date,
            ApodRecord {
                date,
                title: title.to_string(),
                explanation: format!("About {title}."),
                media: MediaKind::Image {
                    url: url.to_string(),
                    hd_url: None,
                },
            },
        );
        self.images.insert(url.to_string(), bytes.to_vec());
        self
    }

    fn with_video(mut self, date: &str, title: &str, thumbnail: &str, bytes: &[u8]) -> Self {
        let date = ymd(date);
        self.records.insert(
            date,
            ApodRecord {
                date,
                title: title.to_string(),
                explanation: "A video.".to_string(),
                media: MediaKind::Video {
                    url: "https://www.youtube.com/embed/xyz?rel=0".to_string(),
                    thumbnail_url: thumbnail.to_string(),
                },
            },
        );
        self.images.insert(thumbnail.to_string(), bytes.to_vec());
        self
    }

    fn with_explanation(mut self, date: &str, explanation: &str) -> Self {
        if let Some(record) = self.records.get_mut(&ymd(date)) {
            record.explanation = explanation.to_string();
        }
        self
    }

    fn download_count(&self) -> usize {
        self.downloads.borrow().len()
    }
}

impl ApodSource for MockSource {
    fn fetch_record(&self, date: NaiveDate) -> Result<ApodRecord, FetchError> {
        self.records.get(&date).cloned().ok_or(FetchError::Status {
            url: "mock".to_string(),
            status: 404,
            body: format!("no APOD for {date}"),
        })
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.downloads.borrow_mut().push(url.to_string());
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| FetchError::EmptyBody(url.to_string()))
    }
}

fn ymd(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn image_files(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .filter(|name| name != "image_cache.db" && !name.starts_with("image_cache.db-"))
        .collect();
    names.sort();
    names
}

#[test]
fn test_end_to_end_first_add_and_repeat() {
    let dir = tempdir().unwrap();
    let source = MockSource::default().with_image(
        "2012-09-29",
        "Comet",
        "https://apod.nasa.gov/apod/image/1209/comet.jpg",
        b"abc",
    );
    let cache = ImageCache::open(dir.path(), &source).unwrap();
    let root = cache.layout().root().to_path_buf();

    let id = cache.add(ymd("2012-09-29")).unwrap();
    assert_eq!(id, 1);

    let entries = cache.entries().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(
        entries[0].content_digest,
        "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(entries[0].file_path, root.join("Comet.jpg"));
    assert_eq!(fs::read(root.join("Comet.jpg")).unwrap(), b"abc");

    let again = cache.add(ymd("2012-09-29")).unwrap();
    assert_eq!(again, 1);
    assert_eq!(cache.entries().unwrap().len(), 1);
    assert_eq!(image_files(&root), vec!["Comet.jpg"]);
}

#[test]
fn test_identity_by_content_not_by_date() {
    let dir = tempdir().unwrap();
    let source = MockSource::default()
        .with_image("2020-01-01", "First Name", "https://x.org/a.jpg", b"same bytes")
        .with_image("2020-01-02", "Other Name", "https://x.org/b.png", b"same bytes");
    let cache = ImageCache::open(dir.path(), &source).unwrap();

    let first = cache.add_detailed(ymd("2020-01-01")).unwrap();
    let second = cache.add_detailed(ymd("2020-01-02")).unwrap();

    assert_eq!(first, AddOutcome::Added(1));
    assert_eq!(second, AddOutcome::AlreadyCached(1));
    assert_eq!(cache.list_titles().unwrap(), vec!["First Name"]);
    assert_eq!(image_files(cache.layout().root()), vec!["First_Name.jpg"]);
}

#[test]
fn test_distinct_images_get_distinct_ids() {
    let dir = tempdir().unwrap();
    let source = MockSource::default()
        .with_image("2020-01-01", "Moon", "https://x.org/moon.jpg", b"moon")
        .with_image("2020-01-02", "Sun", "https://x.org/sun.jpg", b"sun");
    let cache = ImageCache::open(dir.path(), &source).unwrap();

    let moon = cache.add(ymd("2020-01-01")).unwrap();
    let sun = cache.add(ymd("2020-01-02")).unwrap();

    assert!(moon != NO_ENTRY && sun != NO_ENTRY);
    assert!(sun > moon);
    assert_eq!(cache.list_titles().unwrap(), vec!["Moon", "Sun"]);
    assert_eq!(cache.get_metadata(sun).unwrap().title, "Sun");
}

#[test]
fn test_name_collision_overwrites_file_but_keeps_both_rows() {
    let dir = tempdir().unwrap();
    let source = MockSource::default()
        .with_image("2020-01-01", "Orion", "https://x.org/1.jpg", b"old")
        .with_image("2020-01-02", "Orion!", "https://x.org/2.jpg", b"new");
    let cache = ImageCache::open(dir.path(), &source).unwrap();

    let a = cache.add(ymd("2020-01-01")).unwrap();
    let b = cache.add(ymd("2020-01-02")).unwrap();

    assert_ne!(a, b);
    let path = cache.get_metadata(a).unwrap().file_path;
    assert_eq!(path, cache.get_metadata(b).unwrap().file_path);
    assert_eq!(fs::read(&path).unwrap(), b"new");
}

#[test]
fn test_video_uses_thumbnail() {
    let dir = tempdir().unwrap();
    let source = MockSource::default().with_video(
        "2021-02-19",
        "Landing on Mars",
        "https://img.youtube.com/vi/xyz/0.jpg",
        b"thumbnail",
    );
    let cache = ImageCache::open(dir.path(), &source).unwrap();

    let id = cache.add(ymd("2021-02-19")).unwrap();
    let meta = cache.get_metadata(id).unwrap();

    assert_eq!(
        source.downloads.borrow().as_slice(),
        ["https://img.youtube.com/vi/xyz/0.jpg"]
    );
    assert!(meta.file_path.ends_with("Landing_on_Mars.jpg"));
    assert_eq!(fs::read(&meta.file_path).unwrap(), b"thumbnail");
}

#[test]
fn test_untitled_image_falls_back_to_digest_name() {
    let dir = tempdir().unwrap();
    let source =
        MockSource::default().with_image("2020-01-01", "???", "https://x.org/noext", b"abc");
    let cache = ImageCache::open(dir.path(), &source).unwrap();

    let id = cache.add(ymd("2020-01-01")).unwrap();
    let meta = cache.get_metadata(id).unwrap();
    let expected = format!("{}.img", &digest(b"abc")[..16]);
    assert!(meta.file_path.ends_with(&expected));
}

#[test]
fn test_fetch_failure_leaves_cache_untouched() {
    let dir = tempdir().unwrap();
    let source = MockSource::default();
    let cache = ImageCache::open(dir.path(), &source).unwrap();

    let result = cache.add(ymd("2020-01-01"));
    assert!(matches!(
        result,
        Err(CacheError::Fetch(FetchError::Status { status: 404, .. }))
    ));
    assert_eq!(source.download_count(), 0);
    assert!(cache.list_titles().unwrap().is_empty());
    assert!(image_files(cache.layout().root()).is_empty());
}

#[test]
fn test_download_failure_leaves_cache_untouched() {
    let dir = tempdir().unwrap();
    let mut source =
        MockSource::default().with_image("2020-01-01", "Comet", "https://x.org/c.jpg", b"abc");
    source.images.clear();
    let cache = ImageCache::open(dir.path(), &source).unwrap();

    assert!(matches!(
        cache.add(ymd("2020-01-01")),
        Err(CacheError::Fetch(FetchError::EmptyBody(_)))
    ));
    assert!(cache.entries().unwrap().is_empty());
    assert!(image_files(cache.layout().root()).is_empty());
}

#[test]
fn test_failed_file_write_records_nothing() {
    let dir = tempdir().unwrap();
    let source =
        MockSource::default().with_image("2020-01-01", "Comet", "https://x.org/c.jpg", b"abc");
    let cache = ImageCache::open(dir.path(), &source).unwrap();

    // A directory occupying the target path makes the final rename fail.
    let blocker = cache.layout().root().join("Comet.jpg");
    fs::create_dir(&blocker).unwrap();
    fs::write(blocker.join("keep"), b"x").unwrap();

    assert!(matches!(
        cache.add(ymd("2020-01-01")),
        Err(CacheError::Io { .. })
    ));
    assert!(cache.entries().unwrap().is_empty());
    assert!(!cache.layout().root().join("Comet.jpg.part").exists());
}

#[test]
fn test_blank_explanation_writes_no_file() {
    let dir = tempdir().unwrap();
    let source = MockSource::default()
        .with_image("2012-09-29", "Comet", "https://x.org/comet.jpg", b"abc")
        .with_explanation("2012-09-29", "  ");
    let cache = ImageCache::open(dir.path(), &source).unwrap();

    assert!(matches!(
        cache.add(ymd("2012-09-29")),
        Err(CacheError::InvalidEntry("explanation"))
    ));
    assert!(cache.entries().unwrap().is_empty());
    assert!(image_files(cache.layout().root()).is_empty());
}

#[test]
fn test_get_metadata_unknown_id() {
    let dir = tempdir().unwrap();
    let source = MockSource::default();
    let cache = ImageCache::open(dir.path(), &source).unwrap();

    assert!(matches!(cache.get_metadata(1), Err(CacheError::NotFound(1))));
}

#[test]
fn test_reopen_keeps_entries() {
    let dir = tempdir().unwrap();
    let source =
        MockSource::default().with_image("2020-01-01", "Comet", "https://x.org/c.jpg", b"abc");

    {
        let cache = ImageCache::open(dir.path(), &source).unwrap();
        cache.add(ymd("2020-01-01")).unwrap();
    }

    let layout = CacheLayout::init(dir.path()).unwrap();
    let cache = ImageCache::new(layout, &source);
    assert_eq!(cache.list_titles().unwrap(), vec!["Comet"]);
    assert_eq!(cache.add(ymd("2020-01-01")).unwrap(), 1);
}
