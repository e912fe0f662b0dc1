//! `[build.output_options]` section configuration.
//!
//! Mirrors a bundler's output options. Only a single table is supported;
//! the array form is accepted by the loader so the resolution pass can
//! reject it with a descriptive error instead of a TOML type error.
//!
//! # Example
//!
//! ```toml
//! [build.output_options]
//! asset_file_names = "assets/[name]-[hash:10][extname]"
//! ```

use serde::{Deserialize, Deserializer};

use crate::asset::{NamingError, NamingPattern};

/// Output options of a single build target.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputOptions {
    /// Asset file name pattern. Defaults to `assets/[name]-[hash][extname]`.
    #[serde(deserialize_with = "deserialize_pattern")]
    pub asset_file_names: Option<NamingPattern>,
}

impl OutputOptions {
    pub fn with_pattern(pattern: NamingPattern) -> Self {
        Self {
            asset_file_names: Some(pattern),
        }
    }
}

/// One output table, or an (unsupported) array of them.
///
/// `Multiple` is tried first so an empty array never reads as a table.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OutputTargets {
    Multiple(Vec<OutputOptions>),
    Single(OutputOptions),
}

impl Default for OutputTargets {
    fn default() -> Self {
        Self::Single(OutputOptions::default())
    }
}

impl OutputTargets {
    /// The active naming pattern; fails for array-valued output targets.
    pub fn naming_pattern(&self) -> Result<NamingPattern, NamingError> {
        match self {
            Self::Single(options) => Ok(options.asset_file_names.clone().unwrap_or_default()),
            Self::Multiple(targets) => Err(NamingError::MultipleOutputs {
                count: targets.len(),
            }),
        }
    }
}

fn deserialize_pattern<'de, D>(deserializer: D) -> Result<Option<NamingPattern>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.map(NamingPattern::Template))
}
