//! Asset resolution and naming.
//!
//! - [`reference`]: syntactic classification of image references
//! - [`resolve`]: reference → absolute path (alias prefix, document-relative)
//! - [`hash`]: blake3 content hash
//! - [`pattern`]: asset file name templates and callbacks

pub mod hash;
pub mod pattern;
pub mod reference;
pub mod resolve;

pub use hash::{ContentHash, DEFAULT_HASH_LENGTH};
pub use pattern::{
    AssetDescriptor, AssetKind, CompiledPattern, DEFAULT_ASSET_FILE_NAMES, NamingError,
    NamingPattern,
};
pub use reference::RefKind;
pub use resolve::{locate, resolve};
