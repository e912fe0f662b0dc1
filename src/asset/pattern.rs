//! Asset file name patterns.
//!
//! A pattern is either a template with bracketed placeholders or a callback
//! that owns naming entirely. Templates understand the same placeholders as
//! bundler asset names:
//!
//! | Token       | Value                                     |
//! |-------------|-------------------------------------------|
//! | `[name]`    | base file name without extension          |
//! | `[ext]`     | extension without the leading dot         |
//! | `[extname]` | extension with the leading dot            |
//! | `[hash]`    | content hash, default length              |
//! | `[hash:N]`  | content hash truncated to `N` characters  |
//!
//! ```ignore
//! let pattern = NamingPattern::template("assets/[name]-[hash:4][extname]");
//! let compiled = pattern.compile(8)?;
//! assert_eq!(compiled.render(&descriptor, "abcdef1234"), "assets/photo-abcd.png");
//! ```

use std::fmt;
use std::path::Path;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

/// Default asset naming template.
pub const DEFAULT_ASSET_FILE_NAMES: &str = "assets/[name]-[hash][extname]";

static RE_PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[([^\[\]]*)\]").unwrap());

// ============================================================================
// Errors
// ============================================================================

/// Malformed naming configuration. Fatal for the whole resolution pass.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum NamingError {
    #[error("unknown placeholder `[{token}]` in asset file name pattern `{pattern}`")]
    UnknownPlaceholder { token: String, pattern: String },

    #[error("invalid hash length `{value}` in `[hash:{value}]` of pattern `{pattern}`")]
    InvalidHashLength { value: String, pattern: String },

    #[error(
        "build output is an array of {count} targets; asset file names need a single output table"
    )]
    MultipleOutputs { count: usize },
}

// ============================================================================
// Asset Descriptor
// ============================================================================

/// Kind tag carried by every descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetKind {
    Asset,
}

/// Input of a naming pattern.
#[derive(Debug, Clone, Copy)]
pub struct AssetDescriptor<'a> {
    /// Source path relative to the project root, `/`-separated, no leading slash.
    pub file_name: &'a str,
    /// Raw file content.
    pub content: &'a [u8],
    pub kind: AssetKind,
}

impl<'a> AssetDescriptor<'a> {
    pub fn new(file_name: &'a str, content: &'a [u8]) -> Self {
        Self {
            file_name: file_name.trim_start_matches('/'),
            content,
            kind: AssetKind::Asset,
        }
    }

    /// Base file name without extension.
    pub fn name(&self) -> &'a str {
        Path::new(self.file_name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }

    /// Extension without the leading dot (empty when absent).
    pub fn ext(&self) -> &'a str {
        Path::new(self.file_name)
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
    }
}

// ============================================================================
// Naming Pattern
// ============================================================================

/// Callback pattern: full control over the output file name.
pub type NamingFn = Arc<dyn Fn(&AssetDescriptor<'_>) -> String + Send + Sync>;

/// Asset file name pattern (template or callback).
#[derive(Clone)]
pub enum NamingPattern {
    Template(String),
    Func(NamingFn),
}

impl NamingPattern {
    pub fn template(template: impl Into<String>) -> Self {
        Self::Template(template.into())
    }

    pub fn func(f: impl Fn(&AssetDescriptor<'_>) -> String + Send + Sync + 'static) -> Self {
        Self::Func(Arc::new(f))
    }

    /// Validate and compile the pattern.
    ///
    /// `hash_length` is the length used by a bare `[hash]`.
    pub fn compile(&self, hash_length: usize) -> Result<CompiledPattern, NamingError> {
        match self {
            Self::Template(t) => Template::parse(t, hash_length).map(CompiledPattern::Template),
            Self::Func(f) => Ok(CompiledPattern::Func(Arc::clone(f))),
        }
    }
}

impl Default for NamingPattern {
    fn default() -> Self {
        Self::Template(DEFAULT_ASSET_FILE_NAMES.to_string())
    }
}

impl fmt::Debug for NamingPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Template(t) => f.debug_tuple("Template").field(t).finish(),
            Self::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Validated pattern, ready to render without failing.
#[derive(Clone)]
pub enum CompiledPattern {
    Template(Template),
    Func(NamingFn),
}

impl CompiledPattern {
    /// Render the output file name. `hash` is the full hex digest of the content.
    pub fn render(&self, descriptor: &AssetDescriptor<'_>, hash: &str) -> String {
        match self {
            Self::Template(t) => t.render(descriptor, hash),
            Self::Func(f) => f(descriptor),
        }
    }
}

/// Render `descriptor` with `pattern` in one step.
pub fn render(
    pattern: &NamingPattern,
    descriptor: &AssetDescriptor<'_>,
    hash: &str,
    hash_length: usize,
) -> Result<String, NamingError> {
    Ok(pattern.compile(hash_length)?.render(descriptor, hash))
}

// ============================================================================
// Template
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Name,
    Ext,
    ExtName,
    Hash(usize),
}

/// Parsed template string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    /// Parse a template; any placeholder outside the known set is an error.
    pub fn parse(pattern: &str, hash_length: usize) -> Result<Self, NamingError> {
        let mut segments = Vec::new();
        let mut last = 0;

        for caps in RE_PLACEHOLDER.captures_iter(pattern) {
            let Some(whole) = caps.get(0) else {
                continue;
            };
            if whole.start() > last {
                segments.push(Segment::Literal(pattern[last..whole.start()].to_string()));
            }
            last = whole.end();

            let token = &caps[1];
            let segment = match token {
                "name" => Segment::Name,
                "ext" => Segment::Ext,
                "extname" => Segment::ExtName,
                "hash" => Segment::Hash(hash_length),
                _ => match token.strip_prefix("hash:") {
                    Some(value) => {
                        let len = value.parse::<usize>().map_err(|_| {
                            NamingError::InvalidHashLength {
                                value: value.to_string(),
                                pattern: pattern.to_string(),
                            }
                        })?;
                        Segment::Hash(len)
                    }
                    None => {
                        return Err(NamingError::UnknownPlaceholder {
                            token: token.to_string(),
                            pattern: pattern.to_string(),
                        });
                    }
                },
            };
            segments.push(segment);
        }

        if last < pattern.len() {
            segments.push(Segment::Literal(pattern[last..].to_string()));
        }

        Ok(Self { segments })
    }

    /// Substitute placeholders. `hash` is truncated per placeholder.
    pub fn render(&self, descriptor: &AssetDescriptor<'_>, hash: &str) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(s) => out.push_str(s),
                Segment::Name => out.push_str(descriptor.name()),
                Segment::Ext => out.push_str(descriptor.ext()),
                Segment::ExtName => {
                    let ext = descriptor.ext();
                    if !ext.is_empty() {
                        out.push('.');
                        out.push_str(ext);
                    }
                }
                Segment::Hash(len) => out.push_str(&hash[..(*len).min(hash.len())]),
            }
        }
        out
    }
}
