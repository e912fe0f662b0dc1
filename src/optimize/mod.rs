//! Image optimizer boundary.
//!
//! The resolution pass hands every unique image to an [`ImageOptimizer`]
//! together with its content-addressed output name and uses the returned
//! `src`. What the optimizer does with the bytes is its own business.
//!
//! - [`LocalOptimizer`]: copies bytes to `<output>/<file_name>` and probes dimensions

mod local;
#[cfg(test)]
pub(crate) mod stub;

use std::path::PathBuf;

use anyhow::Result;
use async_trait::async_trait;

pub use local::LocalOptimizer;

/// A source image ready for optimization.
#[derive(Debug, Clone)]
pub struct ImageSource {
    /// Absolute path of the source file
    pub path: PathBuf,
    /// Content-addressed output file name rendered from the naming pattern
    pub file_name: String,
    /// Raw file content
    pub content: Vec<u8>,
}

/// Result of optimizing one image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptimizedImage {
    /// Final `src` to write into the document
    pub src: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Detected format (e.g. "png"), if known
    pub format: Option<String>,
}

impl OptimizedImage {
    pub fn new(src: impl Into<String>) -> Self {
        Self {
            src: src.into(),
            ..Self::default()
        }
    }
}

/// External image-processing service.
#[async_trait]
pub trait ImageOptimizer: Send + Sync {
    /// Produce the final image for `source`. Errors only affect this image.
    async fn optimize(&self, source: ImageSource) -> Result<OptimizedImage>;
}
