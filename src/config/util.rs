//! Configuration utility functions.

use std::path::{Path, PathBuf};

/// Check that a base URL parses as an absolute URL with a host
///
/// Uses the `url` crate so `https://example.com:8080/blog` and
/// `http://localhost/` pass while `example.com` or `/blog` fail.
pub fn is_valid_base_url(url_str: &str) -> bool {
    url::Url::parse(url_str).is_ok_and(|url| url.has_host())
}

/// Find config file by searching upward from `start`
///
/// Walks up parent directories until finding `config_name`.
/// Returns the path to the config file if found.
///
/// # Example
/// ```text
/// /home/user/site/content/posts/  ← start
/// /home/user/site/imgref.toml     ← found!
/// ```
pub fn find_config_file(start: &Path, config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let mut current = start;
    loop {
        let candidate = current.join(config_name);
        if candidate.exists() {
            return Some(candidate);
        }

        match current.parent() {
            Some(parent) => current = parent,
            None => return None,
        }
    }
}

/// Normalize a path to absolute form.
///
/// Tries `canonicalize()` first, falls back to joining with `base`.
pub fn normalize_path(path: &Path, base: &Path) -> PathBuf {
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    };
    joined.canonicalize().unwrap_or(joined)
}

// ============================================================================
// tests
// ============================================================================
