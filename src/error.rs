/// Error types for the tunebook editor
///
/// Every failure is recovered at the action that triggered it and
/// reported to the log panel (and, for renders, an alert dialog).
/// Errors travel inside iced messages, so they must be `Clone`;
/// non-clonable sources are wrapped in `Arc`.

use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error("unable to access \u{201c}{}\u{201d}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("unable to load the contents of \u{201c}{}\u{201d}: the file is not encoded with UTF-8", path.display())]
    NotUtf8 { path: PathBuf },

    #[error("{tool} was not found; install it or set its path in Preferences")]
    ToolNotFound { tool: String },

    #[error("failed to run {tool}: {source}")]
    Spawn {
        tool: String,
        #[source]
        source: Arc<std::io::Error>,
    },

    #[error("{tool} exited with {status}")]
    ToolFailed {
        tool: String,
        status: String,
        output: String,
    },

    #[error("{tool} reported an error")]
    ToolReportedError { tool: String, output: String },

    #[error("could not open \u{201c}{}\u{201d}: {reason}", path.display())]
    Launch { path: PathBuf, reason: String },

    #[error("settings file is invalid: {0}")]
    Settings(Arc<serde_json::Error>),

    #[error("could not determine a cache directory")]
    NoCacheDir,
}

impl Error {
    /// Wrap an I/O error together with the path it concerns
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source: Arc::new(source),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Settings(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_utf8_message() {
        let err = Error::NotUtf8 {
            path: PathBuf::from("latin1.abc"),
        };
        assert!(err.to_string().ends_with("the file is not encoded with UTF-8"));
    }

    #[test]
    fn test_io_message_names_path() {
        let err = Error::io(
            "/tmp/tune.abc",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let message = err.to_string();
        assert!(message.contains("/tmp/tune.abc"));
        assert!(message.contains("gone"));
    }
}
