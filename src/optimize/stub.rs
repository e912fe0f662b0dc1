//! Test optimizer that records calls and fails on demand.

use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::{ImageOptimizer, ImageSource, OptimizedImage};

#[derive(Default)]
pub struct StubOptimizer {
    calls: AtomicUsize,
    names: Mutex<Vec<String>>,
    /// Reject sources whose path contains this string
    fail_on: Option<&'static str>,
}

impl StubOptimizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(pattern: &'static str) -> Self {
        Self {
            fail_on: Some(pattern),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Output file names received so far, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names = self.names.lock().unwrap().clone();
        names.sort();
        names
    }
}

#[async_trait]
impl ImageOptimizer for StubOptimizer {
    async fn optimize(&self, source: ImageSource) -> Result<OptimizedImage> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.names.lock().unwrap().push(source.file_name.clone());
        tokio::task::yield_now().await;

        if let Some(pattern) = self.fail_on
            && source.path.to_string_lossy().contains(pattern)
        {
            bail!("optimizer rejected {}", source.path.display());
        }
        Ok(OptimizedImage::new(format!("/{}", source.file_name)))
    }
}
