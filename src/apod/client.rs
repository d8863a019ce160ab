//! NASA APOD API client.

use std::time::Duration;

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;

use super::{ApodRecord, ApodSource, FetchError, MediaKind};

/// Default endpoint of the APOD API.
pub const DEFAULT_API_URL: &str = "https://api.nasa.gov/planetary/apod";

/// Rate-limited key accepted by api.nasa.gov without registration.
pub const DEMO_API_KEY: &str = "DEMO_KEY";

/// Longest error body kept in a [`FetchError::Status`].
const MAX_ERROR_BODY: usize = 512;

/// Raw shape of an APOD API response.
#[derive(Debug, Deserialize)]
struct ApodResponse {
    date: NaiveDate,
    title: Option<String>,
    explanation: Option<String>,
    media_type: String,
    url: Option<String>,
    hdurl: Option<String>,
    thumbnail_url: Option<String>,
}

impl TryFrom<ApodResponse> for ApodRecord {
    type Error = FetchError;

    fn try_from(raw: ApodResponse) -> Result<Self, Self::Error> {
        let title = non_empty(raw.title).ok_or(FetchError::MissingField("title"))?;
        let explanation =
            non_empty(raw.explanation).ok_or(FetchError::MissingField("explanation"))?;
        let url = non_empty(raw.url);

        let media = match raw.media_type.as_str() {
            "image" => MediaKind::Image {
                url: url.ok_or(FetchError::MissingField("url"))?,
                hd_url: non_empty(raw.hdurl),
            },
            "video" => MediaKind::Video {
                url: url.unwrap_or_default(),
                thumbnail_url: non_empty(raw.thumbnail_url).ok_or_else(|| {
                    FetchError::UnsupportedMedia("video without thumbnail".to_string())
                })?,
            },
            other => return Err(FetchError::UnsupportedMedia(other.to_string())),
        };

        Ok(ApodRecord {
            date: raw.date,
            title,
            explanation,
            media,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Decode an APOD API JSON body into a record.
///
/// # Errors
///
/// Returns [`FetchError::Decode`] for malformed JSON and
/// [`FetchError::MissingField`] for a record without title, explanation or
/// image URL, and [`FetchError::UnsupportedMedia`] for media with no image to
/// download (unknown types, videos without a thumbnail).
pub fn parse_record(body: &str) -> Result<ApodRecord, FetchError> {
    let raw: ApodResponse = serde_json::from_str(body)?;
    ApodRecord::try_from(raw)
}

/// Blocking client for the APOD API.
#[derive(Debug, Clone)]
pub struct ApodClient {
    http: Client,
    api_url: String,
    api_key: String,
}

impl ApodClient {
    /// Build a client for `api_url` authenticating with `api_key`.
    ///
    /// `timeout` bounds each request, including the image download.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::Http`] if the TLS backend cannot be initialized.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
        })
    }

    /// Endpoint this client queries.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl ApodSource for ApodClient {
    fn fetch_record(&self, date: NaiveDate) -> Result<ApodRecord, FetchError> {
        let date = date.format("%Y-%m-%d").to_string();
        log::debug!("Requesting APOD info for {} from {}", date, self.api_url);

        let response = self
            .http
            .get(&self.api_url)
            .query(&[
                ("date", date.as_str()),
                ("thumbs", "True"),
                ("api_key", self.api_key.as_str()),
            ])
            .send()
            .map_err(strip_url)?;

        // The request URL carries the API key, so errors report the bare endpoint.
        let response = check_status(response, &self.api_url)?;
        let body = response.text().map_err(strip_url)?;
        let record = parse_record(&body)?;

        log::debug!("APOD {}: \"{}\"", record.date, record.title);
        Ok(record)
    }

    fn download(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        log::debug!("Downloading image from {}", url);

        let response = self.http.get(url).send()?;
        let response = check_status(response, url)?;
        let bytes = response.bytes()?;

        if bytes.is_empty() {
            return Err(FetchError::EmptyBody(url.to_string()));
        }
        Ok(bytes.to_vec())
    }
}

/// Drop the request URL, and with it the `api_key` query parameter, from a
/// transport error.
fn strip_url(err: reqwest::Error) -> FetchError {
    FetchError::Http(err.without_url())
}

fn check_status(
    response: reqwest::blocking::Response,
    url: &str,
) -> Result<reqwest::blocking::Response, FetchError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let mut body = response.text().unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut end = MAX_ERROR_BODY;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        body.truncate(end);
    }

    Err(FetchError::Status {
        url: url.to_string(),
        status: status.as_u16(),
        body,
    })
}
