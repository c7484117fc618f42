use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::bundle::write::WriteHook;
use crate::scan::ScanTables;
use crate::transform::Transform;

/// Everything a bundler run can be configured with. The `Default` value
/// is a working setup: built-in transforms only, output under `dist`,
/// base path fixed by the first entry.
pub struct BundleOptions {
    /// Directory bundled files are written into.
    pub out_dir: PathBuf,
    /// Root all absolute references resolve against. When unset, the
    /// directory of the first bundled file becomes the base.
    pub base_path: Option<PathBuf>,
    /// Files or directories to bundle. Directories are walked and every
    /// file inside becomes an entry.
    pub entries: Vec<PathBuf>,
    /// Files or directories that must never be bundled, even when
    /// something references them.
    pub exclude: Vec<PathBuf>,
    pub template: TemplateOptions,
    pub sass: SassOptions,
    /// Free-form options for caller-supplied transforms, keyed by
    /// transform name.
    pub extras: FxHashMap<String, Value>,
    /// Which tag/attribute combinations the template scanner treats as
    /// asset references.
    pub tables: ScanTables,
    /// Additional transforms, consulted before the built-in ones.
    pub transforms: Vec<Box<dyn Transform>>,
    /// Replaces the default output writer. Returning `None` for a file
    /// falls back to the default placement under `out_dir`.
    pub write_hook: Option<WriteHook>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("dist"),
            base_path: None,
            entries: Vec::new(),
            exclude: Vec::new(),
            template: TemplateOptions::default(),
            sass: SassOptions::default(),
            extras: FxHashMap::default(),
            tables: ScanTables::default(),
            transforms: Vec::new(),
            write_hook: None,
        }
    }
}

/// Options for the HTML template transform.
#[derive(Debug, Clone, Default)]
pub struct TemplateOptions {
    /// Values available to `{{ ... }}` expressions in scanned documents.
    pub bindings: Map<String, Value>,
}

/// Options for the sass transform.
#[derive(Debug, Clone)]
pub struct SassOptions {
    /// Extra directories `@use` and `@import` may load from.
    pub include_paths: Vec<PathBuf>,
    pub style: CssStyle,
    /// Whether to emit a `.css.map` next to each compiled stylesheet.
    pub source_map: bool,
}

impl Default for SassOptions {
    fn default() -> Self {
        Self {
            include_paths: Vec::new(),
            style: CssStyle::Expanded,
            source_map: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CssStyle {
    #[default]
    Expanded,
    Compressed,
}
