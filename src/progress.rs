//! Progress reporting utilities using indicatif.
//!
//! Adding an APOD is dominated by two network round trips. [`Progress`]
//! shows a spinner for each of them and reports the downloaded size once the
//! image has arrived.

use std::sync::Mutex;
use std::time::Duration;

use bytesize::ByteSize;
use indicatif::{ProgressBar, ProgressStyle};

/// Phase name for the metadata request.
pub const PHASE_FETCH: &str = "fetch";
/// Phase name for the image download.
pub const PHASE_DOWNLOAD: &str = "download";

/// Progress callback for the phases of adding an APOD.
pub trait ProgressCallback: Send + Sync {
    /// Called when a phase starts.
    ///
    /// # Arguments
    ///
    /// * `phase` - Name of the phase ([`PHASE_FETCH`] or [`PHASE_DOWNLOAD`])
    /// * `detail` - What the phase is working on (a date or a URL)
    fn on_phase_start(&self, phase: &str, detail: &str);

    /// Called when a download has completed, providing its size.
    fn on_item_completed(&self, _bytes: u64) {}

    /// Called when a phase completes.
    fn on_phase_end(&self, phase: &str);
}

/// Spinner-based progress reporter.
pub struct Progress {
    spinner: Mutex<Option<ProgressBar>>,
    quiet: bool,
}

impl Progress {
    /// Create a new progress reporter.
    ///
    /// # Arguments
    ///
    /// * `quiet` - If true, nothing is displayed.
    ///
    /// # Examples
    ///
    /// ```
    /// use apodcache::progress::Progress;
    ///
    /// let progress = Progress::new(true);
    /// ```
    #[must_use]
    pub fn new(quiet: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::with_template("{spinner:.green} {msg} [{elapsed_precise}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
    }

    fn with_spinner(&self, f: impl FnOnce(&mut Option<ProgressBar>)) {
        if let Ok(mut guard) = self.spinner.lock() {
            f(&mut guard);
        }
    }
}

impl ProgressCallback for Progress {
    fn on_phase_start(&self, phase: &str, detail: &str) {
        if self.quiet {
            return;
        }

        let message = match phase {
            PHASE_FETCH => format!("Fetching APOD info for {}", detail),
            PHASE_DOWNLOAD => format!("Downloading {}", truncate_url(detail, 60)),
            other => format!("{}: {}", other, detail),
        };

        let pb = ProgressBar::new_spinner();
        pb.set_style(Self::spinner_style());
        pb.set_message(message);
        pb.enable_steady_tick(Duration::from_millis(100));

        self.with_spinner(|slot| {
            if let Some(previous) = slot.replace(pb) {
                previous.finish_and_clear();
            }
        });
    }

    fn on_item_completed(&self, bytes: u64) {
        if self.quiet {
            return;
        }
        self.with_spinner(|slot| {
            if let Some(pb) = slot.as_ref() {
                pb.set_message(format!("Downloaded {}", ByteSize::b(bytes)));
            }
        });
    }

    fn on_phase_end(&self, phase: &str) {
        if self.quiet {
            return;
        }
        self.with_spinner(|slot| {
            if let Some(pb) = slot.take() {
                // The download line stays on screen with the final size.
                if phase == PHASE_DOWNLOAD {
                    pb.finish();
                } else {
                    pb.finish_and_clear();
                }
            }
        });
    }
}

/// Shorten a URL for display, keeping its tail.
fn truncate_url(url: &str, max_len: usize) -> String {
    let count = url.chars().count();
    if count <= max_len {
        return url.to_string();
    }

    let tail: String = url.chars().skip(count - max_len.saturating_sub(3)).collect();
    format!("...{}", tail)
}
