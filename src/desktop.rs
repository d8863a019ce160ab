//! Handing a cached image to the desktop.
//!
//! The only value passed on is the cached file's path. How the background is
//! actually changed depends on the desktop environment, so it is delegated to
//! a user-configured command such as `feh --bg-scale {path}` or
//! `gsettings set org.gnome.desktop.background picture-uri file://{path}`.

use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Placeholder replaced by the image path in a command template.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Errors that can occur while setting the desktop background.
#[derive(thiserror::Error, Debug)]
pub enum DesktopError {
    /// The configured command template has no program.
    #[error("Background command is empty")]
    EmptyCommand,

    /// The command could not be started.
    #[error("Failed to run background command '{program}': {source}")]
    Spawn {
        /// Program that failed to start
        program: String,
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The command ran but reported failure.
    #[error("Background command '{program}' exited with {status}")]
    Failed {
        /// Program that failed
        program: String,
        /// Exit status description
        status: String,
    },

    /// Writing the path to the output stream failed.
    #[error("Failed to write image path: {0}")]
    Io(#[from] std::io::Error),
}

/// Something that can make an image the desktop background.
pub trait BackgroundSetter {
    /// Set the image at `path` as background.
    ///
    /// # Errors
    ///
    /// Returns a [`DesktopError`] if the background could not be changed.
    fn set_background(&self, path: &Path) -> Result<(), DesktopError>;
}

/// Runs a command template with `{path}` substituted.
///
/// The template is split on whitespace before substitution, so paths
/// containing spaces stay a single argument. A template without a
/// placeholder gets the path appended as the last argument.
#[derive(Debug, Clone)]
pub struct CommandBackgroundSetter {
    template: String,
}

impl CommandBackgroundSetter {
    /// Create a setter from a command template.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The argument vector that would be executed for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DesktopError::EmptyCommand`] for a blank template.
    pub fn command_line(&self, path: &Path) -> Result<Vec<String>, DesktopError> {
        let path_text = path.to_string_lossy();
        let mut args: Vec<String> = self
            .template
            .split_whitespace()
            .map(|part| part.replace(PATH_PLACEHOLDER, &path_text))
            .collect();

        if args.is_empty() {
            return Err(DesktopError::EmptyCommand);
        }
        if !self.template.contains(PATH_PLACEHOLDER) {
            args.push(path_text.into_owned());
        }
        Ok(args)
    }
}

impl BackgroundSetter for CommandBackgroundSetter {
    fn set_background(&self, path: &Path) -> Result<(), DesktopError> {
        let args = self.command_line(path)?;
        let (program, rest) = args.split_first().ok_or(DesktopError::EmptyCommand)?;

        log::debug!("Running background command: {:?}", args);
        let status = Command::new(program)
            .args(rest)
            .status()
            .map_err(|source| DesktopError::Spawn {
                program: program.clone(),
                source,
            })?;

        if !status.success() {
            return Err(DesktopError::Failed {
                program: program.clone(),
                status: status.to_string(),
            });
        }
        log::info!("Desktop background set to {}", path.display());
        Ok(())
    }
}

/// Prints the image path instead of changing the background.
///
/// Used when no command is configured, so the path can be piped into
/// whatever the user prefers.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintPath;

impl BackgroundSetter for PrintPath {
    fn set_background(&self, path: &Path) -> Result<(), DesktopError> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{}", path.display())?;
        Ok(())
    }
}
