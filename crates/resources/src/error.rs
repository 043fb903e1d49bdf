use sift_template::TemplateError;
use sift_traits::BuildError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a resource processing run.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The build context handed over a file that does not live under the
    /// source root it was registered from.
    #[error("'{}' is not under source root '{}'", path.display(), root.display())]
    OutsideSourceRoot { root: PathBuf, path: PathBuf },

    #[error("Unknown encoding: {0}")]
    UnknownEncoding(String),

    #[error("Build context error: {0}")]
    Build(#[from] BuildError),

    #[error("Rendering failed: {0}")]
    Render(#[from] TemplateError),
}

impl ProcessError {
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        ProcessError::Io {
            path: path.into(),
            source,
        }
    }
}
