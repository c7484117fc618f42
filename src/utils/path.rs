//! Path and reference-string utilities.
//!
//! Pure functions for path manipulation. No side effects.
//!
//! - `clean_path` / `normalize_path`: lexical filesystem path normalization
//! - `strip_url_suffix`, `is_external_url`, `is_bundleable_reference`:
//!   reference-string handling shared by the scanner and the stylesheet walk

use regex::Regex;
use std::path::{Component, Path, PathBuf};
use std::sync::LazyLock;

/// Non-filesystem URI schemes that never denote a local asset.
static URL_EXCLUDE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^mailto:").unwrap());

/// Fold `.` and `..` components out of a path, without touching the
/// filesystem.
///
/// Unlike `canonicalize()` this never fails and never resolves symlinks,
/// so it works for paths that do not exist yet. `..` at the root is
/// discarded; `..` underflowing a relative path is kept.
///
/// # Example
/// ```ignore
/// assert_eq!(clean_path(Path::new("/a/b/../c")), PathBuf::from("/a/c"));
/// ```
pub fn clean_path(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            _ => parts.push(component),
        }
    }
    parts.iter().collect()
}

/// Normalize a path to clean absolute form.
///
/// Relative paths are resolved against the current directory (kept
/// relative when the current directory is unavailable).
#[inline]
pub fn normalize_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        clean_path(path)
    } else {
        std::env::current_dir().map_or_else(|_| clean_path(path), |cwd| clean_path(&cwd.join(path)))
    }
}

/// Strip a fragment or query suffix from a reference string.
///
/// Cuts at the first `#` or `?`, whichever comes first.
///
/// # Example
/// ```ignore
/// assert_eq!(strip_url_suffix("style.scss?v=2"), "style.scss");
/// assert_eq!(strip_url_suffix("page.html#top"), "page.html");
/// ```
#[inline]
pub fn strip_url_suffix(reference: &str) -> &str {
    match reference.find(['#', '?']) {
        Some(pos) => &reference[..pos],
        None => reference,
    }
}

/// Check if a reference is an external absolute URL (`scheme://...`).
#[inline]
pub fn is_external_url(reference: &str) -> bool {
    reference.contains("://")
}

/// Check if a candidate reference could denote a local asset.
///
/// Rejects empty strings, external URLs and excluded URI schemes.
/// This is the shared filter for scanner candidates and stylesheet URLs;
/// suffix stripping happens after it, on the raw candidate.
#[inline]
pub fn is_bundleable_reference(reference: &str) -> bool {
    !reference.is_empty() && !is_external_url(reference) && !URL_EXCLUDE.is_match(reference)
}
