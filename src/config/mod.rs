//! Configuration management for `imgref.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── error      # ConfigError
//! ├── output     # [build.output_options] (asset file name pattern)
//! ├── util       # config discovery, URL checks
//! └── mod.rs     # ImgrefConfig (this file)
//! ```
//!
//! # Example
//!
//! ```toml
//! root = "."
//! root_url = "https://example.com"
//!
//! [build]
//! output = "dist"
//! hash_length = 8
//!
//! [build.output_options]
//! asset_file_names = "assets/[name]-[hash][extname]"
//! ```

mod error;
mod output;
mod util;

pub use error::ConfigError;
pub use output::{OutputOptions, OutputTargets};
pub use util::find_config_file;

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::asset::hash::{DEFAULT_HASH_LENGTH, MAX_HASH_LENGTH};
use crate::asset::{NamingError, NamingPattern};
use crate::log;
use util::{is_valid_base_url, normalize_path};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing imgref.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImgrefConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root, also the root of the `~/assets/` alias.
    /// Relative values resolve against the config file's directory.
    #[serde(default)]
    pub root: PathBuf,

    /// Base URL used to make resolved asset paths absolute
    #[serde(default)]
    pub root_url: Option<String>,

    /// Build settings
    #[serde(default)]
    pub build: BuildConfig,
}

/// `[build]` section
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Directory optimized assets and rendered pages are written to
    pub output: PathBuf,

    /// Hex characters used by a bare `[hash]`; clamped to `0..=64`
    pub hash_length: i64,

    /// Bundler-style output options (asset file names)
    pub output_options: OutputTargets,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            output: PathBuf::from("dist"),
            hash_length: DEFAULT_HASH_LENGTH as i64,
            output_options: OutputTargets::default(),
        }
    }
}

impl ImgrefConfig {
    /// Default config rooted at `root`, with output at `<root>/dist`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let mut config = Self {
            root: root.into(),
            ..Self::default()
        };
        config.build.output = config.root.join(&config.build.output);
        config
    }

    /// Set the base URL.
    pub fn with_root_url(mut self, url: impl Into<String>) -> Self {
        self.root_url = Some(url.into());
        self
    }

    /// Replace the output targets.
    pub fn with_output(mut self, targets: OutputTargets) -> Self {
        self.build.output_options = targets;
        self
    }

    /// Use a single output target with the given naming pattern.
    pub fn with_naming(self, pattern: NamingPattern) -> Self {
        self.with_output(OutputTargets::Single(OutputOptions::with_pattern(pattern)))
    }

    /// Load configuration from a file, resolving paths against its directory.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        let base = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        config.config_path = path.to_path_buf();
        config.finalize(base);
        config.validate()?;
        Ok(config)
    }

    /// Parse configuration from TOML string (paths left as written)
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "ignoring unknown fields in {}: {}", display_path, fields.join(", "));
    }

    /// Make root and output absolute.
    pub fn finalize(&mut self, base: &Path) {
        self.root = normalize_path(&self.root, base);
        self.build.output = normalize_path(&self.build.output, &self.root);
    }

    /// Validate the finalized configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.root.is_absolute() {
            return Err(ConfigError::Validation(format!(
                "root `{}` must resolve to an absolute path",
                self.root.display()
            )));
        }
        if let Some(url) = &self.root_url
            && !is_valid_base_url(url)
        {
            return Err(ConfigError::Validation(format!(
                "root_url `{url}` is not an absolute URL (expected e.g. https://example.com)"
            )));
        }
        Ok(())
    }

    /// Length used by a bare `[hash]`, clamped to the digest length.
    pub fn hash_length(&self) -> usize {
        self.build.hash_length.clamp(0, MAX_HASH_LENGTH as i64) as usize
    }

    /// Active naming pattern; fails for array-valued output targets.
    pub fn naming_pattern(&self) -> Result<NamingPattern, NamingError> {
        self.build.output_options.naming_pattern()
    }

    /// Get path relative to the project root
    pub fn root_relative(&self, path: impl AsRef<Path>) -> PathBuf {
        path.as_ref()
            .strip_prefix(&self.root)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| path.as_ref().to_path_buf())
    }
}
