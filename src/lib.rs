//! tola-imgref - content-addressed image references for markdown pages.
//!
//! A markdown page is parsed into a small document tree, its local image
//! references are resolved against the page (or the `~/assets/` alias),
//! every unique image goes through one read → hash → name → optimize
//! pipeline, and the `src` attributes are rewritten to the resulting
//! file names.
//!
//! - [`asset`]: reference parsing, path resolution, hashing, naming patterns
//! - [`config`]: `imgref.toml`
//! - [`optimize`]: the optimizer seam and the local implementation
//! - [`resolve`]: per-document resolution pass
//! - [`rewrite`]: applies the resolution to the tree
//! - [`tree`]: document model, markdown input, HTML output

pub mod asset;
pub mod cli;
pub mod config;
pub mod logger;
pub mod optimize;
pub mod resolve;
pub mod rewrite;
pub mod tree;
