//! Astronomy Picture of the Day sources.
//!
//! The cache never talks to the network itself. It asks an [`ApodSource`]
//! for the record of a date and for the bytes behind an image URL. The
//! production source is [`client::ApodClient`]; tests plug in their own.
//!
//! # Media kinds
//!
//! Some days publish a video instead of a picture. The API then provides a
//! thumbnail image, and [`ApodRecord::image_url`] hands that out instead, so
//! callers always receive a single URL pointing at image bytes.

pub mod client;
pub mod date;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub use client::ApodClient;
pub use date::{parse_apod_date, validate_apod_date, DateError};

/// What the APOD of a given day is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum MediaKind {
    /// A still image.
    Image {
        /// Standard resolution image URL
        url: String,
        /// High definition image URL, when published
        hd_url: Option<String>,
    },
    /// A video with a still thumbnail.
    Video {
        /// URL of the video itself (never downloaded)
        url: String,
        /// URL of the thumbnail image
        thumbnail_url: String,
    },
}

/// Metadata for one day's APOD.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApodRecord {
    /// Publication date
    pub date: NaiveDate,
    /// Title of the image
    pub title: String,
    /// Explanation text
    pub explanation: String,
    /// Image or video details
    pub media: MediaKind,
}

impl ApodRecord {
    /// URL of the image bytes to download for this record.
    #[must_use]
    pub fn image_url(&self) -> &str {
        match &self.media {
            MediaKind::Image { url, .. } => url,
            MediaKind::Video { thumbnail_url, .. } => thumbnail_url,
        }
    }
}

/// Errors that can occur while obtaining an APOD.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    /// The HTTP request could not be completed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        /// Requested URL, without credentials
        url: String,
        /// HTTP status code
        status: u16,
        /// Response body, possibly truncated
        body: String,
    },

    /// The metadata response could not be decoded.
    #[error("Invalid APOD response: {0}")]
    Decode(#[from] serde_json::Error),

    /// The metadata response lacks a required field.
    #[error("APOD response is missing '{0}'")]
    MissingField(&'static str),

    /// The APOD is of a kind that has no image to download.
    #[error("Unsupported APOD media type: {0}")]
    UnsupportedMedia(String),

    /// The download finished but produced no bytes.
    #[error("Downloaded image from {0} is empty")]
    EmptyBody(String),
}

/// Provider of APOD metadata and image bytes.
pub trait ApodSource {
    /// Fetch the record published on `date`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the record cannot be obtained.
    fn fetch_record(&self, date: NaiveDate) -> Result<ApodRecord, FetchError>;

    /// Download the raw bytes at `url`.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the download fails or yields nothing.
    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError>;
}

impl<T: ApodSource + ?Sized> ApodSource for &T {
    fn fetch_record(&self, date: NaiveDate) -> Result<ApodRecord, FetchError> {
        (**self).fetch_record(date)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).download(url)
    }
}

impl<T: ApodSource + ?Sized> ApodSource for Box<T> {
    fn fetch_record(&self, date: NaiveDate) -> Result<ApodRecord, FetchError> {
        (**self).fetch_record(date)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        (**self).download(url)
    }
}
