use std::fs;
use std::path::{Path, PathBuf};

use crate::bundle::BundleError;

/// One artifact on its way to disk, as seen by a write hook.
pub struct WriteRequest<'a> {
    /// Name of the transform that produced the artifact.
    pub transform: &'a str,
    /// Absolute source-side path of the artifact.
    pub path: &'a Path,
    pub contents: &'a [u8],
}

/// Replacement for the default writer. Returns the path it wrote to,
/// or `None` to let the default writer place the file.
pub type WriteHook = Box<dyn FnMut(&WriteRequest<'_>) -> Option<PathBuf>>;

/// Maps an artifact path onto its place under the output directory,
/// mirroring the layout relative to the base path.
pub(crate) fn default_target(
    base: &Path,
    out_dir: &Path,
    path: &Path,
) -> Result<PathBuf, BundleError> {
    let relative = path.strip_prefix(base).map_err(|_| BundleError::OutsideBase {
        path: path.to_path_buf(),
        base: base.to_path_buf(),
    })?;
    Ok(out_dir.join(relative))
}

pub(crate) fn write_file(target: &Path, contents: &[u8]) -> Result<(), BundleError> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|e| BundleError::io(parent, e))?;
    }
    fs::write(target, contents).map_err(|e| BundleError::io(target, e))
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use crate::bundle::write::default_target;
    use crate::bundle::BundleError;

    #[test]
    fn test_target_mirrors_layout_under_out_dir() {
        let target = default_target(
            Path::new("/site"),
            Path::new("/site/dist"),
            Path::new("/site/img/logo.png"),
        )
        .unwrap();
        assert_eq!(target, Path::new("/site/dist/img/logo.png"));
    }

    #[test]
    fn test_artifact_outside_base_is_rejected() {
        let result = default_target(
            Path::new("/site"),
            Path::new("/site/dist"),
            Path::new("/elsewhere/logo.png"),
        );
        assert!(matches!(result, Err(BundleError::OutsideBase { .. })));
    }
}
