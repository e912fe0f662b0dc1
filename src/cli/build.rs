//! Page building orchestration.
//!
//! Per page: read → markdown tree → collect candidates → resolve and rewrite
//! → render HTML → write `<output>/<stem>.html` (or print).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::cli::{BuildArgs, Cli, Commands};
use crate::config::{ImgrefConfig, find_config_file};
use crate::optimize::{ImageOptimizer, LocalOptimizer};
use crate::rewrite::rewrite;
use crate::tree::{MarkdownOptions, collect_image_refs, from_markdown, to_html};
use crate::{debug, log};

/// Load `imgref.toml` (searched upward from `cwd`) and apply CLI overrides.
///
/// Without a config file the project root is `cwd`.
pub fn load_config(cli: &Cli, cwd: &Path) -> Result<ImgrefConfig> {
    let mut config = match find_config_file(cwd, &cli.config) {
        Some(path) => {
            debug!("config"; "using {}", path.display());
            ImgrefConfig::load(&path)?
        }
        None => {
            debug!("config"; "no {} found, using defaults", cli.config.display());
            ImgrefConfig::new(cwd)
        }
    };

    let Commands::Build { args } = &cli.command;
    if let Some(url) = &args.root_url {
        config.root_url = Some(url.clone());
    }
    if let Some(output) = &args.output {
        config.build.output = cwd.join(output);
    }
    config.validate()?;
    Ok(config)
}

/// Build every file in `args`, stopping at the first fatal error.
pub async fn build_files(args: &BuildArgs, config: &ImgrefConfig) -> Result<()> {
    let optimizer = LocalOptimizer::new(&config.build.output);

    for file in &args.files {
        let html = build_page(file, config, &optimizer).await?;
        if args.stdout {
            println!("{html}");
            continue;
        }

        let target = page_output_path(file, &config.build.output);
        write_page(&target, &html).await?;
        log!("build"; "{} -> {}", file.display(), target.display());
    }

    log!("done"; "{} page(s)", args.files.len());
    Ok(())
}

/// Convert one markdown file and rewrite its image references.
pub async fn build_page(
    path: &Path,
    config: &ImgrefConfig,
    optimizer: &dyn ImageOptimizer,
) -> Result<String> {
    let source = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;

    // References are resolved relative to the absolute page path
    let path = std::path::absolute(path)
        .with_context(|| format!("failed to resolve {}", path.display()))?;

    let doc = from_markdown(&source, &MarkdownOptions::all());
    let candidates = collect_image_refs(&doc);
    debug!("build"; "{}: {} image reference(s)", path.display(), candidates.len());

    let doc = rewrite(doc, &candidates, &path, config, optimizer)
        .await
        .with_context(|| format!("failed to resolve images in {}", path.display()))?;
    Ok(to_html(&doc))
}

/// `<output>/<stem>.html`
fn page_output_path(file: &Path, output: &Path) -> PathBuf {
    let stem = file
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "index".to_string());
    output.join(format!("{stem}.html"))
}

async fn write_page(target: &Path, html: &str) -> Result<()> {
    if let Some(parent) = target.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    tokio::fs::write(target, html)
        .await
        .with_context(|| format!("failed to write {}", target.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::{ContentHash, NamingPattern};
    use crate::optimize::stub::StubOptimizer;
    use clap::Parser;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_page_output_path() {
        assert_eq!(
            page_output_path(Path::new("posts/hello.md"), Path::new("/out")),
            PathBuf::from("/out/hello.html")
        );
    }

    #[test]
    fn test_load_config_without_file_uses_cwd() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::parse_from(["tola-imgref", "build", "-o", "public", "a.md"]);

        let config = load_config(&cli, dir.path()).unwrap();
        assert_eq!(config.root, dir.path());
        assert_eq!(config.build.output, dir.path().join("public"));
    }

    #[test]
    fn test_load_config_applies_root_url_override() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("imgref.toml"), "root_url = \"https://a.com\"\n").unwrap();
        let cli = Cli::parse_from(["tola-imgref", "build", "-U", "https://b.com", "a.md"]);

        let config = load_config(&cli, dir.path()).unwrap();
        assert_eq!(config.root_url.as_deref(), Some("https://b.com"));
    }

    #[test]
    fn test_load_config_rejects_bad_root_url() {
        let dir = TempDir::new().unwrap();
        let cli = Cli::parse_from(["tola-imgref", "build", "-U", "not a url", "a.md"]);
        assert!(load_config(&cli, dir.path()).is_err());
    }

    #[tokio::test]
    async fn test_build_page_rewrites_images() {
        let dir = TempDir::new().unwrap();
        let pages = dir.path().join("src/pages");
        fs::create_dir_all(&pages).unwrap();
        fs::write(pages.join("a.png"), b"a").unwrap();
        fs::write(pages.join("post.md"), "# Post\n\n![a](./a.png)\n").unwrap();

        let config = ImgrefConfig::new(dir.path())
            .with_naming(NamingPattern::template("[name]-[hash:6][extname]"));
        let html = build_page(&pages.join("post.md"), &config, &StubOptimizer::new())
            .await
            .unwrap();

        let hash = ContentHash::of(b"a").short(6);
        assert!(html.contains(&format!("<img src=\"/a-{hash}.png\"")), "{html}");
    }

    #[tokio::test]
    async fn test_build_page_applies_root_url_with_local_optimizer() {
        let dir = TempDir::new().unwrap();
        let mut png = std::io::Cursor::new(Vec::new());
        image::RgbImage::new(2, 2)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        let png = png.into_inner();
        fs::write(dir.path().join("a.png"), &png).unwrap();
        fs::write(dir.path().join("post.md"), "![a](./a.png)\n").unwrap();

        let config = ImgrefConfig::new(dir.path()).with_root_url("https://cdn.example.com");
        let optimizer = LocalOptimizer::new(&config.build.output);
        let html = build_page(&dir.path().join("post.md"), &config, &optimizer)
            .await
            .unwrap();

        let name = format!("assets/a-{}.png", ContentHash::of(&png).short(8));
        assert!(
            html.contains(&format!("<img src=\"https://cdn.example.com/{name}\"")),
            "{html}"
        );
        assert!(config.build.output.join(&name).exists());
    }

    #[tokio::test]
    async fn test_build_files_writes_pages() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("post.md"), "hello\n").unwrap();
        let config = ImgrefConfig::new(dir.path());
        let args = BuildArgs {
            files: vec![dir.path().join("post.md")],
            root_url: None,
            output: None,
            stdout: false,
        };

        build_files(&args, &config).await.unwrap();

        let html = fs::read_to_string(dir.path().join("dist/post.html")).unwrap();
        assert_eq!(html, "<p>hello</p>");
    }
}
