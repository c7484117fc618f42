//! The bundler core. Resolves reference strings to files, routes each
//! file through the first matching transform exactly once and writes
//! the resulting artifacts under the output directory.

pub mod error;
pub mod options;
pub mod write;


pub use error::BundleError;
pub use options::{BundleOptions, CssStyle, SassOptions, TemplateOptions};
pub use write::{WriteHook, WriteRequest};

use std::cell::{OnceCell, RefCell};
use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use jwalk::WalkDir;
use rustc_hash::FxHashSet;

use crate::transform::raw::RawTransform;
use crate::transform::sass::SassTransform;
use crate::transform::template::TemplateTransform;
use crate::transform::{Artifact, Transform, TransformContext};
use crate::utils::path::{clean_path, normalize_path, strip_url_suffix};
use crate::{debug, log};

/// A single bundling run. Holds the processed set, the lazily fixed
/// base path and the transform registry for the lifetime of the run.
/// Reuse across runs would leak the dedup state, so build a fresh one
/// per run.
pub struct Bundler {
    options: BundleOptions,
    transforms: Vec<Box<dyn Transform>>,
    write_hook: RefCell<Option<WriteHook>>,
    out_dir: PathBuf,
    base_path: OnceCell<PathBuf>,
    processed: RefCell<FxHashSet<PathBuf>>,
}

impl Bundler {
    pub fn new(mut options: BundleOptions) -> Self {
        let mut transforms = mem::take(&mut options.transforms);
        transforms.push(Box::new(TemplateTransform));
        transforms.push(Box::new(SassTransform));
        transforms.push(Box::new(RawTransform));

        let write_hook = RefCell::new(options.write_hook.take());
        let out_dir = normalize_path(&options.out_dir);

        let base_path = match &options.base_path {
            Some(base) => OnceCell::from(normalize_path(base)),
            None => OnceCell::new(),
        };

        // Excluded paths share the identity space of the processed set,
        // so resolution treats them as already bundled.
        let mut processed = FxHashSet::default();
        for path in &options.exclude {
            let path = normalize_path(path);
            if fs::metadata(&path).is_ok_and(|m| m.is_dir()) {
                processed.extend(walk_files(&path));
            } else {
                processed.insert(path);
            }
        }

        Self {
            options,
            transforms,
            write_hook,
            out_dir,
            base_path,
            processed: RefCell::new(processed),
        }
    }

    /// The base path, once something fixed it.
    pub fn base_path(&self) -> Option<&Path> {
        self.base_path.get().map(PathBuf::as_path)
    }

    /// Bundles every configured entry. Directories expand to the files
    /// inside them, in sorted order.
    pub fn run(&self) -> Result<(), BundleError> {
        for entry in self.expand_entries()? {
            let Some(name) = entry.file_name() else {
                continue;
            };
            let Some(parent) = entry.parent() else {
                continue;
            };
            let name = name.to_string_lossy();
            self.resolve_and_rewrite(&name, parent)?;
        }
        Ok(())
    }

    /// Resolves one reference against its origin directory, bundles the
    /// file behind it if it was not bundled before and returns the name
    /// the reference should carry in output.
    ///
    /// The returned name comes from the matched transform's rename and
    /// is produced even when the file itself is skipped as already
    /// processed or excluded, so call sites can always rewrite.
    pub fn resolve_and_rewrite(
        &self,
        reference: &str,
        origin: &Path,
    ) -> Result<String, BundleError> {
        let stripped = strip_url_suffix(reference);
        if stripped.is_empty() {
            return Err(BundleError::UnresolvableReference {
                reference: reference.to_string(),
                origin: origin.to_path_buf(),
            });
        }
        if stripped == "/" {
            return Ok(String::from("/"));
        }

        let base = self
            .base_path
            .get_or_init(|| origin.to_path_buf())
            .as_path();

        let resolved = match stripped.strip_prefix('/') {
            Some(rest) => base.join(rest),
            None => origin.join(stripped),
        };
        let resolved = clean_path(&resolved);

        let transform = self
            .transforms
            .iter()
            .find(|t| t.matches(&resolved))
            .ok_or_else(|| BundleError::NoMatchingTransform {
                path: resolved.clone(),
            })?;
        let renamed = transform.rename(stripped);

        let first_visit = self.processed.borrow_mut().insert(resolved.clone());
        if !first_visit {
            debug!("bundle"; "{} already bundled, skipping", resolved.display());
            return Ok(renamed);
        }

        let metadata = fs::metadata(&resolved).map_err(|e| BundleError::io(&resolved, e))?;
        if !metadata.is_file() {
            return Err(BundleError::UnresolvableReference {
                reference: reference.to_string(),
                origin: origin.to_path_buf(),
            });
        }

        let file_name = resolved
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let context = TransformContext {
            resolved: &resolved,
            base,
            reference: stripped,
            origin,
            dir: resolved.parent().unwrap_or(base),
            file_name: &file_name,
            bundler: self,
            options: &self.options,
        };

        let artifacts = transform.transform(&context)?;
        for artifact in &artifacts {
            let target = self.write_artifact(transform.name(), artifact, base)?;
            log!("bundle"; "{} => {}", resolved.display(), target.display());
        }

        Ok(renamed)
    }

    fn expand_entries(&self) -> Result<Vec<PathBuf>, BundleError> {
        let mut files = Vec::new();
        for entry in &self.options.entries {
            let entry = normalize_path(entry);
            let metadata = fs::metadata(&entry).map_err(|e| BundleError::io(&entry, e))?;
            if metadata.is_dir() {
                files.extend(walk_files(&entry));
            } else {
                files.push(entry);
            }
        }
        Ok(files)
    }

    fn write_artifact(
        &self,
        transform: &str,
        artifact: &Artifact,
        base: &Path,
    ) -> Result<PathBuf, BundleError> {
        if let Some(hook) = self.write_hook.borrow_mut().as_mut() {
            let request = WriteRequest {
                transform,
                path: &artifact.path,
                contents: &artifact.contents,
            };
            if let Some(target) = hook(&request) {
                return Ok(target);
            }
        }

        let target = write::default_target(base, &self.out_dir, &artifact.path)?;
        write::write_file(&target, &artifact.contents)?;
        Ok(target)
    }
}

fn walk_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path())
        .collect();
    files.sort();
    files
}
