//! Image reference → absolute filesystem path.
//!
//! Resolution is lexical and pure; only [`locate`] touches the filesystem.
//!
//! - `~/assets/logo.png` → `<alias_root>/src/assets/logo.png`
//! - `./img/a.png` in `/proj/src/pages/post.md` → `/proj/src/pages/img/a.png`

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use percent_encoding::percent_decode_str;

use super::reference::{RefKind, strip_suffixes};

/// Directory the alias prefix points into, relative to the alias root.
const ALIAS_DIR: [&str; 2] = ["src", "assets"];

/// Resolve a reference to an absolute path without checking existence.
///
/// Returns `None` for references that never name a local file
/// (external URLs, fragments, site-root paths).
pub fn resolve(reference: &str, document: &Path, alias_root: &Path) -> Option<PathBuf> {
    match RefKind::parse(reference) {
        RefKind::Alias(rest) => {
            let base = ALIAS_DIR
                .iter()
                .fold(alias_root.to_path_buf(), |acc, part| acc.join(part));
            Some(join_relative(&base, &decode(strip_suffixes(rest))))
        }
        RefKind::FileRelative(rel) => {
            let dir = document.parent().unwrap_or(Path::new("/"));
            Some(join_relative(dir, &decode(strip_suffixes(rel))))
        }
        RefKind::External(_) | RefKind::Fragment(_) | RefKind::SiteRoot(_) => None,
    }
}

/// Resolve a reference and verify the target exists.
///
/// A missing file is a skip, not an error: the caller leaves the reference as-is.
pub async fn locate(reference: &str, document: &Path, alias_root: &Path) -> Option<PathBuf> {
    let path = resolve(reference, document, alias_root)?;
    match tokio::fs::metadata(&path).await {
        Ok(meta) if meta.is_file() => Some(path),
        _ => None,
    }
}

/// Join a `/`-separated relative path onto `base`, folding `.` and `..`.
pub fn join_relative(base: &Path, rel: &str) -> PathBuf {
    let mut result = base.to_path_buf();

    for part in rel.split('/') {
        match part {
            "" | "." => {}
            ".." => {
                result.pop();
            }
            _ => result.push(part),
        }
    }

    result
}

/// Percent-decode a reference path (`my%20photo.png` → `my photo.png`).
fn decode(path: &str) -> Cow<'_, str> {
    percent_decode_str(path)
        .decode_utf8()
        .unwrap_or(Cow::Borrowed(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_alias() {
        let path = resolve(
            "~/assets/logo.png",
            Path::new("/proj/src/pages/post.md"),
            Path::new("/proj"),
        );
        assert_eq!(path, Some(PathBuf::from("/proj/src/assets/logo.png")));
    }

    #[test]
    fn test_resolve_relative_to_document() {
        let doc = Path::new("/proj/src/pages/post.md");
        let root = Path::new("/proj");
        assert_eq!(
            resolve("./img/a.png", doc, root),
            Some(PathBuf::from("/proj/src/pages/img/a.png"))
        );
        assert_eq!(
            resolve("img/a.png", doc, root),
            Some(PathBuf::from("/proj/src/pages/img/a.png"))
        );
        assert_eq!(
            resolve("../shared/b.png", doc, root),
            Some(PathBuf::from("/proj/src/shared/b.png"))
        );
    }

    #[test]
    fn test_resolve_is_pure() {
        let doc = Path::new("/proj/content/post.md");
        let root = Path::new("/proj");
        let a = resolve("./x/../y.png", doc, root);
        let b = resolve("./x/../y.png", doc, root);
        assert_eq!(a, b);
        assert_eq!(a, Some(PathBuf::from("/proj/content/y.png")));
    }

    #[test]
    fn test_resolve_strips_query_and_decodes() {
        let doc = Path::new("/proj/post.md");
        let root = Path::new("/proj");
        assert_eq!(
            resolve("./my%20photo.png?w=100", doc, root),
            Some(PathBuf::from("/proj/my photo.png"))
        );
    }

    #[test]
    fn test_resolve_non_local() {
        let doc = Path::new("/proj/post.md");
        let root = Path::new("/proj");
        assert_eq!(resolve("https://example.com/a.png", doc, root), None);
        assert_eq!(resolve("/a.png", doc, root), None);
        assert_eq!(resolve("#top", doc, root), None);
    }

    #[tokio::test]
    async fn test_locate_existing_and_missing() {
        let dir = TempDir::new().unwrap();
        let doc = dir.path().join("post.md");
        fs::write(dir.path().join("a.png"), b"png").unwrap();

        let found = locate("./a.png", &doc, dir.path()).await;
        assert_eq!(found, Some(dir.path().join("a.png")));

        assert_eq!(locate("./missing.png", &doc, dir.path()).await, None);
    }

    #[tokio::test]
    async fn test_locate_alias() {
        let dir = TempDir::new().unwrap();
        let assets = dir.path().join("src/assets");
        fs::create_dir_all(&assets).unwrap();
        fs::write(assets.join("logo.png"), b"png").unwrap();

        let doc = dir.path().join("content/post.md");
        let found = locate("~/assets/logo.png", &doc, dir.path()).await;
        assert_eq!(found, Some(assets.join("logo.png")));
    }

    #[tokio::test]
    async fn test_locate_directory_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("img")).unwrap();
        let doc = dir.path().join("post.md");
        assert_eq!(locate("./img", &doc, dir.path()).await, None);
    }
}
