//! Library-wide error types.
//!
//! Core modules return [`Error`]; the CLI wraps it in `anyhow`. Failures
//! inside a scan are logged and absorbed, except cache persistence and
//! cleanup errors, which are reported through [`crate::scanner::CacheFailure`].

use std::path::PathBuf;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// Cache store query or transaction
    #[error("Cache store failed: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Cache schema migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// Unreadable tags or artwork in one audio file
    #[error("Cannot read metadata of {path}: {message}")]
    Metadata { path: PathBuf, message: String },

    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub fn metadata(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Metadata {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Wrap with a description of what was being done.
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }
}

/// `with_context` for results whose error converts into [`Error`].
pub trait ResultExt<T> {
    fn with_context(self, context: impl Into<String>) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.into().context(context))
    }
}
