//! Apply resolved image paths back to a document.
//!
//! The candidate references are passed in explicitly (usually from
//! [`collect_image_refs`](crate::tree::collect_image_refs)); the document
//! itself carries no side-channel state.

use std::path::Path;

use rustc_hash::FxHashSet;

use crate::asset::NamingError;
use crate::config::ImgrefConfig;
use crate::optimize::ImageOptimizer;
use crate::resolve::{ResolutionMap, resolve_all};
use crate::tree::Document;

/// Resolve `candidates` and rewrite matching `<img src>` attributes.
///
/// References that failed to resolve keep their original `src`. An empty
/// candidate set returns the document untouched without any I/O.
pub async fn rewrite(
    mut doc: Document,
    candidates: &FxHashSet<String>,
    document_path: &Path,
    config: &ImgrefConfig,
    optimizer: &dyn ImageOptimizer,
) -> Result<Document, NamingError> {
    if candidates.is_empty() {
        return Ok(doc);
    }

    let resolved = resolve_all(candidates, document_path, config, optimizer).await?;
    apply(&mut doc, &resolved, config.root_url.as_deref());
    Ok(doc)
}

/// Replace the `src` of every image element found in `resolved`.
///
/// Returns the number of rewritten elements.
pub fn apply(doc: &mut Document, resolved: &ResolutionMap, root_url: Option<&str>) -> usize {
    if resolved.is_empty() {
        return 0;
    }

    let mut rewritten = 0;
    doc.for_each_element_mut(|elem| {
        let Some(mut img) = elem.as_image() else {
            return;
        };
        if let Some(src) = resolved.get(img.src()) {
            img.set_src(absolutize(src, root_url));
            rewritten += 1;
        }
    });
    rewritten
}

/// Make a resolved path absolute against the base URL.
///
/// Without a base URL the path is returned as-is. With one, a path starting
/// with `/` is appended to it verbatim (`{root_url}{path}`) and any other
/// path is joined with a slash (`{root_url}/{path}`). Slashes are not
/// normalized.
pub fn absolutize(path: &str, root_url: Option<&str>) -> String {
    match root_url {
        None => path.to_string(),
        Some(base) if path.starts_with('/') => format!("{base}{path}"),
        Some(base) => format!("{base}/{path}"),
    }
}
