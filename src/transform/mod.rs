//! The transform registry. A transform claims files by pattern, maps
//! reference strings onto output names and turns one source file into
//! any number of output artifacts.

pub mod raw;
pub mod sass;
pub mod template;

use std::path::{Path, PathBuf};

use crate::bundle::{BundleError, BundleOptions, Bundler};

/// One file produced by a transform. The path is absolute and must sit
/// under the run's base path for the default writer to place it.
pub struct Artifact {
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// Everything a transform gets to see about the file it was matched to.
pub struct TransformContext<'a> {
    /// Absolute, cleaned path of the source file.
    pub resolved: &'a Path,
    /// Base path of the run.
    pub base: &'a Path,
    /// The reference as written at the call site, suffix already stripped.
    pub reference: &'a str,
    /// Directory the reference was resolved against.
    pub origin: &'a Path,
    /// Parent directory of `resolved`.
    pub dir: &'a Path,
    /// File name of `resolved`.
    pub file_name: &'a str,
    /// The bundler itself, for transforms that discover further
    /// references while processing.
    pub bundler: &'a Bundler,
    pub options: &'a BundleOptions,
}

pub trait Transform {
    /// Short name, used in logs and handed to the write hook.
    fn name(&self) -> &'static str;

    /// Whether this transform claims the file. The first claiming
    /// transform in registration order wins.
    fn matches(&self, path: &Path) -> bool;

    /// Maps a reference string onto the name it has after bundling.
    /// Must be deterministic and must not touch the filesystem, since
    /// it also runs for files that were already bundled or excluded.
    fn rename(&self, reference: &str) -> String;

    /// Produces the output artifacts for one source file.
    fn transform(&self, ctx: &TransformContext<'_>) -> Result<Vec<Artifact>, BundleError>;
}
