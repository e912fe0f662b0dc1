//! Image resolution pass.
//!
//! Turns the candidate references of one document into a mapping from
//! reference to final `src`:
//!
//! 1. validate the naming configuration (fatal on error)
//! 2. locate every reference, dropping the ones that don't resolve
//! 3. group references by absolute path
//! 4. run one pipeline per unique path (read → hash → name → optimize)
//! 5. settle all pipelines, keep the fulfilled ones
//!
//! Pipelines run concurrently on the caller's task; nothing is spawned.
//! A failing image is logged and left out of the mapping, its siblings
//! are unaffected.

use std::future::Future;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use futures::future::join_all;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::asset::{AssetDescriptor, CompiledPattern, ContentHash, NamingError, locate};
use crate::config::ImgrefConfig;
use crate::optimize::{ImageOptimizer, ImageSource, OptimizedImage};
use crate::{debug, log};

/// Reference (as written in the document) → final src.
pub type ResolutionMap = FxHashMap<String, String>;

// ============================================================================
// Settle-all join
// ============================================================================

/// Outcome of one independently awaited unit of work.
#[derive(Debug)]
pub enum Settled<T> {
    Fulfilled(T),
    Rejected(anyhow::Error),
}

impl<T> From<Result<T>> for Settled<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Self::Fulfilled(value),
            Err(err) => Self::Rejected(err),
        }
    }
}

/// Await every future and collect each outcome, in input order.
///
/// Never short-circuits: a rejection does not cancel the others.
pub async fn settle_all<I, F, T>(futures: I) -> Vec<Settled<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    join_all(
        futures
            .into_iter()
            .map(|fut| async move { Settled::from(fut.await) }),
    )
    .await
}

// ============================================================================
// Resolution
// ============================================================================

/// Resolve a set of references found in `document`.
///
/// Only configuration errors are returned; per-image failures are logged and
/// the reference is omitted from the mapping.
pub async fn resolve_all(
    references: &FxHashSet<String>,
    document: &Path,
    config: &ImgrefConfig,
    optimizer: &dyn ImageOptimizer,
) -> Result<ResolutionMap, NamingError> {
    let mut resolved = ResolutionMap::default();
    if references.is_empty() {
        return Ok(resolved);
    }

    let pattern = config.naming_pattern()?.compile(config.hash_length())?;

    let units = group_by_path(references, document, &config.root).await;
    if units.is_empty() {
        return Ok(resolved);
    }

    let outcomes = settle_all(
        units
            .iter()
            .map(|(path, _)| process_image(path, config, &pattern, optimizer)),
    )
    .await;

    for ((path, refs), outcome) in units.iter().zip(outcomes) {
        match outcome {
            Settled::Fulfilled(image) => {
                debug!("image"; "{} -> {}", config.root_relative(path).display(), image.src);
                for reference in refs {
                    resolved.insert((*reference).to_string(), image.src.clone());
                }
            }
            Settled::Rejected(err) => {
                log!("image"; "skipping {}: {:#}", config.root_relative(path).display(), err);
            }
        }
    }

    Ok(resolved)
}

/// Locate every reference and group the found ones by absolute path.
async fn group_by_path<'a>(
    references: &'a FxHashSet<String>,
    document: &Path,
    alias_root: &Path,
) -> Vec<(PathBuf, Vec<&'a str>)> {
    let located = join_all(references.iter().map(|reference| async move {
        (reference.as_str(), locate(reference, document, alias_root).await)
    }))
    .await;

    let mut units: FxHashMap<PathBuf, Vec<&str>> = FxHashMap::default();
    for (reference, path) in located {
        match path {
            Some(path) => units.entry(path).or_default().push(reference),
            None => debug!("image"; "unresolved reference {} in {}", reference, document.display()),
        }
    }

    let mut units: Vec<_> = units.into_iter().collect();
    units.sort_by(|a, b| a.0.cmp(&b.0));
    units
}

/// Per-image pipeline: read, hash, name, optimize.
async fn process_image(
    path: &Path,
    config: &ImgrefConfig,
    pattern: &CompiledPattern,
    optimizer: &dyn ImageOptimizer,
) -> Result<OptimizedImage> {
    let content = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    let hash = ContentHash::of(&content);
    let source_name = descriptor_name(path, config);
    let file_name = pattern.render(&AssetDescriptor::new(&source_name, &content), &hash.to_hex());

    optimizer
        .optimize(ImageSource {
            path: path.to_path_buf(),
            file_name,
            content,
        })
        .await
}

/// Root-relative `/`-separated name, or the bare file name outside the root.
fn descriptor_name(path: &Path, config: &ImgrefConfig) -> String {
    let relative = config.root_relative(path);
    if relative.is_absolute() {
        return path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
    }

    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}
