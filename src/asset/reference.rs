//! Image reference classification.

/// Alias prefix mapped to `<root>/src/assets/`.
pub const ALIAS_PREFIX: &str = "~/assets/";

/// Syntactic classification of an image reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind<'a> {
    /// `~/assets/...`. Value is the remainder after the prefix.
    Alias(&'a str),
    /// External URL with a scheme (https:, data:, ...) or protocol-relative `//host`.
    External(&'a str),
    /// Pure fragment (#section). Value is anchor without `#`.
    Fragment(&'a str),
    /// Site-root-relative path (/images/logo.png).
    SiteRoot(&'a str),
    /// File-relative path (./image.png, ../img/a.png, a.png).
    FileRelative(&'a str),
}

impl<'a> RefKind<'a> {
    /// Parse a reference string into its syntactic kind.
    #[inline]
    pub fn parse(reference: &'a str) -> Self {
        if let Some(rest) = reference.strip_prefix(ALIAS_PREFIX) {
            Self::Alias(rest)
        } else if reference.starts_with("//") || is_external(reference) {
            Self::External(reference)
        } else if let Some(anchor) = reference.strip_prefix('#') {
            Self::Fragment(anchor)
        } else if reference.starts_with('/') {
            Self::SiteRoot(reference)
        } else {
            Self::FileRelative(reference)
        }
    }

    /// Whether the reference can point at a file next to the document or under the alias root.
    #[inline]
    pub const fn is_local(&self) -> bool {
        matches!(self, Self::Alias(_) | Self::FileRelative(_))
    }
}

/// Check whether a reference carries a URL scheme (`https:`, `mailto:`, `data:`).
#[inline]
pub fn is_external(reference: &str) -> bool {
    reference.find(':').is_some_and(|pos| {
        pos > 0
            && reference[..pos]
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
    })
}

/// Strip `?query` and `#fragment` suffixes from a reference path.
#[inline]
pub fn strip_suffixes(reference: &str) -> &str {
    let end = reference.find(['?', '#']).unwrap_or(reference.len());
    &reference[..end]
}
