//! Error types.
//!
//! Each concern gets its own `thiserror` enum; [`Error`] collects the ones
//! that can escape the application shell.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Geometry misconfiguration.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// CENTERED only makes sense for a position; a size cannot be centered.
    #[error("centered mode is not supported for a size axis")]
    CenteredSize,

    /// The resolver was asked for a rectangle before it knew its parent size.
    #[error("parent size required for rect calculations")]
    ParentSizeUnset,
}

/// Failures while loading the settings file.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The file exists but could not be read.
    #[error("cannot read settings file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file is not valid TOML.
    #[error("invalid settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Failures of the game-library data source.
#[derive(Error, Debug)]
pub enum LibraryError {
    /// The catalog file could not be read.
    #[error("cannot read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The catalog file is not valid TOML.
    #[error("invalid catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The entry's command could not be started.
    #[error("failed to launch {name}: {source}")]
    Launch {
        name: String,
        #[source]
        source: io::Error,
    },
}

/// Top-level error returned by the application shell.
#[derive(Error, Debug)]
pub enum Error {
    /// Terminal or display failure. Fatal: the engine does not reconnect.
    #[error("platform i/o error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Library(#[from] LibraryError),
}

/// Convenience alias used by the shell and the binary.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_error_messages() {
        assert_eq!(
            LayoutError::CenteredSize.to_string(),
            "centered mode is not supported for a size axis"
        );
        assert_eq!(
            LayoutError::ParentSizeUnset.to_string(),
            "parent size required for rect calculations"
        );
    }

    #[test]
    fn io_error_converts() {
        let err: Error = io::Error::new(io::ErrorKind::BrokenPipe, "gone").into();
        assert!(matches!(err, Error::Io(_)));
        assert!(err.to_string().contains("gone"));
    }
}
