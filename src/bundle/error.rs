use std::path::{Path, PathBuf};

use thiserror::Error;

/// Everything that can go wrong while resolving and bundling assets.
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("`{reference}` (referenced from `{origin}`) does not name a file")]
    UnresolvableReference { reference: String, origin: PathBuf },

    #[error("no transform matches `{path}`")]
    NoMatchingTransform { path: PathBuf },

    #[error("failed to compile `{path}`: {message}")]
    Compile { path: PathBuf, message: String },

    #[error("`{path}` falls outside the base path `{base}`")]
    OutsideBase { path: PathBuf, base: PathBuf },

    #[error("IO error at `{0}`")]
    Io(PathBuf, #[source] std::io::Error),
}

impl BundleError {
    /// Wraps an IO error together with the path it happened at.
    pub fn io(path: impl AsRef<Path>, err: impl Into<std::io::Error>) -> Self {
        Self::Io(path.as_ref().to_path_buf(), err.into())
    }
}
