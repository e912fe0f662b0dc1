//! Filesystem-backed optimizer: no transcoding, only content-addressed copies.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::ImageReader;

use super::{ImageOptimizer, ImageSource, OptimizedImage};
use crate::log;

/// Formats passed through without probing (the `image` crate can't decode them).
const PASSTHROUGH_EXTS: &[&str] = &["svg", "avif", "ico"];

/// Writes each image to `<output_dir>/<file_name>` and returns `/<file_name>`.
#[derive(Debug, Clone)]
pub struct LocalOptimizer {
    output_dir: PathBuf,
}

impl LocalOptimizer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

#[async_trait]
impl ImageOptimizer for LocalOptimizer {
    async fn optimize(&self, source: ImageSource) -> Result<OptimizedImage> {
        let file_name = source.file_name.trim_start_matches('/');
        let mut image = probe(&source.path, &source.content)?;
        image.src = format!("/{file_name}");

        // Same name normally means same bytes, so an existing file is kept
        let target = self.output_dir.join(file_name);
        if let Ok(meta) = tokio::fs::metadata(&target).await {
            if meta.len() != source.content.len() as u64 {
                log!(
                    "image";
                    "{} already exists with different content, keeping it (naming pattern without [hash]?)",
                    target.display()
                );
            }
        } else {
            if let Some(parent) = target.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            tokio::fs::write(&target, &source.content)
                .await
                .with_context(|| format!("failed to write {}", target.display()))?;
        }

        Ok(image)
    }
}

/// Read format and pixel dimensions from the image header.
fn probe(path: &Path, content: &[u8]) -> Result<OptimizedImage> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    if PASSTHROUGH_EXTS.contains(&ext.as_str()) {
        return Ok(OptimizedImage {
            format: Some(ext),
            ..OptimizedImage::default()
        });
    }

    let reader = ImageReader::new(Cursor::new(content)).with_guessed_format()?;
    let format = reader
        .format()
        .map(|f| f.extensions_str().first().copied().unwrap_or("unknown").to_string());
    let (width, height) = reader
        .into_dimensions()
        .with_context(|| format!("unsupported or corrupt image {}", path.display()))?;

    Ok(OptimizedImage {
        src: String::new(),
        width: Some(width),
        height: Some(height),
        format,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbImage};
    use tempfile::TempDir;

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        RgbImage::new(width, height)
            .write_to(&mut buf, ImageFormat::Png)
            .unwrap();
        buf.into_inner()
    }

    #[tokio::test]
    async fn test_optimize_writes_content_addressed_copy() {
        let dir = TempDir::new().unwrap();
        let optimizer = LocalOptimizer::new(dir.path());
        let content = png_bytes(3, 2);

        let result = optimizer
            .optimize(ImageSource {
                path: PathBuf::from("/src/photo.png"),
                file_name: "assets/photo-1234abcd.png".into(),
                content: content.clone(),
            })
            .await
            .unwrap();

        assert_eq!(result.src, "/assets/photo-1234abcd.png");
        assert_eq!(result.width, Some(3));
        assert_eq!(result.height, Some(2));
        assert_eq!(result.format.as_deref(), Some("png"));
        let written = std::fs::read(dir.path().join("assets/photo-1234abcd.png")).unwrap();
        assert_eq!(written, content);
    }

    #[tokio::test]
    async fn test_optimize_keeps_existing_file_on_name_clash() {
        let dir = TempDir::new().unwrap();
        let optimizer = LocalOptimizer::new(dir.path());
        let first = png_bytes(1, 1);
        let second = png_bytes(4, 4);

        for content in [&first, &second] {
            let result = optimizer
                .optimize(ImageSource {
                    path: PathBuf::from("/src/photo.png"),
                    file_name: "assets/photo.png".into(),
                    content: content.clone(),
                })
                .await
                .unwrap();
            assert_eq!(result.src, "/assets/photo.png");
        }

        let written = std::fs::read(dir.path().join("assets/photo.png")).unwrap();
        assert_eq!(written, first);
    }

    #[tokio::test]
    async fn test_optimize_rejects_garbage() {
        let dir = TempDir::new().unwrap();
        let optimizer = LocalOptimizer::new(dir.path());

        let result = optimizer
            .optimize(ImageSource {
                path: PathBuf::from("/src/broken.png"),
                file_name: "assets/broken.png".into(),
                content: b"not an image".to_vec(),
            })
            .await;

        assert!(result.is_err());
        assert!(!dir.path().join("assets/broken.png").exists());
    }

    #[tokio::test]
    async fn test_optimize_passes_svg_through() {
        let dir = TempDir::new().unwrap();
        let optimizer = LocalOptimizer::new(dir.path());

        let result = optimizer
            .optimize(ImageSource {
                path: PathBuf::from("/src/icon.svg"),
                file_name: "/assets/icon-00ff.svg".into(),
                content: b"<svg xmlns=\"http://www.w3.org/2000/svg\"/>".to_vec(),
            })
            .await
            .unwrap();

        assert_eq!(result.src, "/assets/icon-00ff.svg");
        assert_eq!(result.width, None);
        assert_eq!(result.format.as_deref(), Some("svg"));
        assert!(dir.path().join("assets/icon-00ff.svg").exists());
    }
}
