//! Configuration management for `baler.toml`.
//!
//! | Key                  | Purpose                                        |
//! |----------------------|------------------------------------------------|
//! | `out_dir`            | Where bundled files land (default `dist`)      |
//! | `base_path`          | Root for absolute references (default: lazy)   |
//! | `entries`            | Files or directories to bundle                 |
//! | `exclude`            | Paths never pulled into the bundle             |
//! | `[template.bindings]`| Values for `{{ ... }}` in scanned documents    |
//! | `[sass]`             | Stylesheet style, include paths, source maps   |
//!
//! All relative paths in the file resolve against the config file's
//! directory.

pub mod error;

pub use error::ConfigError;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Result, bail};
use serde::Deserialize;
use serde_json::Value;

use crate::bundle::{BundleOptions, CssStyle, SassOptions, TemplateOptions};
use crate::cli::{Cli, Commands};
use crate::utils::path::normalize_path;
use crate::{debug, log};

/// Root configuration structure representing baler.toml
#[derive(Debug, Clone, Deserialize)]
pub struct BundleConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory, parent of the config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    #[serde(default)]
    pub base_path: Option<PathBuf>,

    #[serde(default)]
    pub entries: Vec<PathBuf>,

    #[serde(default)]
    pub exclude: Vec<PathBuf>,

    #[serde(default)]
    pub template: TemplateSection,

    #[serde(default)]
    pub sass: SassSection,
}

fn default_out_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for BundleConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::new(),
            root: PathBuf::new(),
            out_dir: default_out_dir(),
            base_path: None,
            entries: Vec::new(),
            exclude: Vec::new(),
            template: TemplateSection::default(),
            sass: SassSection::default(),
        }
    }
}

/// `[template]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TemplateSection {
    /// Free-form values exposed to `{{ ... }}` expressions.
    #[serde(default)]
    pub bindings: toml::Table,
}

/// `[sass]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SassSection {
    pub include_paths: Vec<PathBuf>,
    pub style: CssStyle,
    pub source_map: bool,
}

impl Default for SassSection {
    fn default() -> Self {
        Self {
            include_paths: Vec::new(),
            style: CssStyle::Expanded,
            source_map: true,
        }
    }
}

impl BundleConfig {
    /// Load configuration from CLI arguments.
    ///
    /// A missing config file is not an error: the CLI can carry a full
    /// run on its own. Relative paths resolve against the config file's
    /// directory, or the working directory when there is no file.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = normalize_path(&cli.config);

        let mut config = if config_path.is_file() {
            Self::from_path(&config_path)?
        } else {
            debug!("config"; "no config file at {}, using defaults", config_path.display());
            Self::default()
        };

        config.root = config_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        config.config_path = config_path;

        config.apply_command_options(cli);
        config.normalize_paths();
        config.validate()?;

        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
            if !Self::prompt_continue()? {
                bail!("Aborted due to unknown config fields");
            }
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        eprintln!();
        log!("warning"; "unknown fields in {}:", display_path);
        log!("warning"; "ignoring:");
        for field in fields {
            eprintln!("- {}", field);
        }
        eprintln!();
    }

    /// Prompt user to continue. Returns true only if user explicitly confirms.
    fn prompt_continue() -> Result<bool> {
        use std::io::{self, Write};

        eprint!("Continue? [y/N] ");
        io::stderr().flush()?;

        let mut input = String::new();
        io::stdin().read_line(&mut input)?;

        let input = input.trim().to_lowercase();
        Ok(input == "y" || input == "yes")
    }

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        let Commands::Build {
            entries,
            out_dir,
            base_path,
            build_args,
        } = &cli.command;

        crate::logger::set_verbose(build_args.verbose);

        // Positional entries replace the configured ones entirely.
        if !entries.is_empty() {
            self.entries = entries.clone();
        }
        Self::update_option(&mut self.out_dir, out_dir.as_ref());
        if let Some(base) = base_path {
            self.base_path = Some(base.clone());
        }

        if build_args.no_source_map {
            self.sass.source_map = false;
        }
        if build_args.minify_css {
            self.sass.style = CssStyle::Compressed;
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    /// Normalize all paths relative to the root directory.
    fn normalize_paths(&mut self) {
        let root = normalize_path(&self.root);
        self.root = root.clone();

        self.out_dir = Self::normalize_entry(&self.out_dir, &root);
        if let Some(base) = self.base_path.take() {
            self.base_path = Some(Self::normalize_entry(&base, &root));
        }
        self.entries = self
            .entries
            .iter()
            .map(|p| Self::normalize_entry(p, &root))
            .collect();
        self.exclude = self
            .exclude
            .iter()
            .map(|p| Self::normalize_entry(p, &root))
            .collect();
        self.sass.include_paths = self
            .sass
            .include_paths
            .iter()
            .map(|p| Self::normalize_entry(p, &root))
            .collect();
    }

    /// Normalize one path with tilde expansion.
    fn normalize_entry(path: &Path, root: &Path) -> PathBuf {
        let expanded = shellexpand::tilde(path.to_str().unwrap_or_default()).into_owned();
        let path = PathBuf::from(expanded);
        let full_path = if path.is_relative() {
            root.join(&path)
        } else {
            path
        };
        normalize_path(&full_path)
    }

    /// Validate configuration before handing it to the bundler.
    pub fn validate(&self) -> Result<()> {
        if self.entries.is_empty() {
            bail!(ConfigError::Validation(
                "no entries to bundle; pass them on the command line or set `entries`".into()
            ));
        }
        for entry in &self.entries {
            if !entry.exists() {
                bail!(ConfigError::Validation(format!(
                    "entry `{}` does not exist",
                    entry.display()
                )));
            }
        }
        if let Some(base) = &self.base_path
            && base.exists()
            && !base.is_dir()
        {
            bail!(ConfigError::Validation(format!(
                "base path `{}` is not a directory",
                base.display()
            )));
        }
        if self.out_dir.is_file() {
            bail!(ConfigError::Validation(format!(
                "out dir `{}` is a file",
                self.out_dir.display()
            )));
        }
        Ok(())
    }

    /// Turn the loaded file into bundler options.
    pub fn into_bundle_options(self) -> BundleOptions {
        let bindings = self
            .template
            .bindings
            .into_iter()
            .map(|(key, value)| (key, toml_to_json(value)))
            .collect();

        BundleOptions {
            out_dir: self.out_dir,
            base_path: self.base_path,
            entries: self.entries,
            exclude: self.exclude,
            template: TemplateOptions { bindings },
            sass: SassOptions {
                include_paths: self.sass.include_paths,
                style: self.sass.style,
                source_map: self.sass.source_map,
            },
            ..Default::default()
        }
    }
}

/// Maps a TOML value onto the JSON model the evaluator works with.
fn toml_to_json(value: toml::Value) -> Value {
    match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(d) => Value::String(d.to_string()),
        toml::Value::Array(items) => Value::Array(items.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(key, value)| (key, toml_to_json(value)))
                .collect(),
        ),
    }
}

// ============================================================================
// tests
// ============================================================================
