//! Tree → HTML rendering, plus the escaping helpers it needs.

use std::borrow::Cow;

use super::{AttrValue, Document, Element, Node};

// =============================================================================
// HTML Escaping
// =============================================================================

/// Characters that require HTML escaping.
const ESCAPE_CHARS: [char; 5] = ['<', '>', '&', '"', '\''];

/// Get the HTML entity for a special character.
#[inline]
fn escape_char(c: char) -> Option<&'static str> {
    match c {
        '<' => Some("&lt;"),
        '>' => Some("&gt;"),
        '&' => Some("&amp;"),
        '"' => Some("&quot;"),
        '\'' => Some("&#39;"),
        _ => None,
    }
}

/// Escape HTML special characters.
///
/// Uses `Cow` to avoid allocation when no escaping is needed.
#[inline]
pub fn escape(s: &str) -> Cow<'_, str> {
    if !s.contains(ESCAPE_CHARS) {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    for c in s.chars() {
        match escape_char(c) {
            Some(entity) => result.push_str(entity),
            None => result.push(c),
        }
    }
    Cow::Owned(result)
}

/// Unescape HTML entities back to characters.
///
/// Handles common named entities and numeric character references.
pub fn unescape(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }

    let mut result = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        result.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest[1..]
            .find(';')
            .filter(|end| *end <= 10)
            .and_then(|end| decode_entity(&rest[1..=end]).map(|c| (c, end + 2)));

        match decoded {
            Some((c, len)) => {
                result.push(c);
                rest = &rest[len..];
            }
            None => {
                result.push('&');
                rest = &rest[1..];
            }
        }
    }
    result.push_str(rest);
    Cow::Owned(result)
}

/// Decode the body of an entity (`amp`, `#39`, `#x27`).
fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{00A0}'),
        s => {
            let num = s.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            char::from_u32(code)
        }
    }
}

/// Check if element is a void element (self-closing, no children).
#[inline]
pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

// =============================================================================
// Rendering
// =============================================================================

/// Render a document to an HTML fragment.
pub fn to_html(doc: &Document) -> String {
    let mut out = String::new();
    for node in &doc.children {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Element(elem) => write_element(out, elem),
        Node::Text(text) => out.push_str(&escape(text)),
        Node::Raw(html) => out.push_str(html),
    }
}

fn write_element(out: &mut String, elem: &Element) {
    out.push('<');
    out.push_str(&elem.tag);
    for (name, value) in &elem.attrs {
        match value {
            AttrValue::Str(s) => {
                out.push_str(&format!(" {name}=\"{}\"", escape(s)));
            }
            AttrValue::Bool(true) => {
                out.push(' ');
                out.push_str(name);
            }
            AttrValue::Bool(false) => {}
            AttrValue::List(items) => {
                out.push_str(&format!(" {name}=\"{}\"", escape(&items.join(" "))));
            }
        }
    }
    out.push('>');

    if is_void_element(&elem.tag) {
        return;
    }

    for child in &elem.children {
        write_node(out, child);
    }
    out.push_str("</");
    out.push_str(&elem.tag);
    out.push('>');
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape() {
        assert_eq!(escape("<script>"), "&lt;script&gt;");
        assert_eq!(escape("a & \"b\""), "a &amp; &quot;b&quot;");
        assert!(matches!(escape("hello"), Cow::Borrowed(_)));
    }

    #[test]
    fn test_unescape() {
        assert_eq!(unescape("a&amp;b"), "a&b");
        assert_eq!(unescape("&lt;p&gt;"), "<p>");
        assert_eq!(unescape("&#39;&#x27;"), "''");
        assert_eq!(unescape("AT&T"), "AT&T");
        assert_eq!(unescape("&unknown;"), "&unknown;");
    }

    #[test]
    fn test_render_image() {
        let doc = Document::new(vec![
            Element::new("p")
                .with_children(vec![
                    Node::Text("a < b ".into()),
                    Element::new("img")
                        .with_attr("src", "/assets/a-1234.png")
                        .with_attr("alt", "\"quoted\"")
                        .with_attr("hidden", AttrValue::Bool(false))
                        .into(),
                ])
                .into(),
        ]);
        assert_eq!(
            to_html(&doc),
            "<p>a &lt; b <img src=\"/assets/a-1234.png\" alt=\"&quot;quoted&quot;\"></p>"
        );
    }

    #[test]
    fn test_render_lists_and_raw() {
        let doc = Document::new(vec![
            Element::new("code")
                .with_attr("class", AttrValue::List(vec!["a".into(), "b".into()]))
                .with_attr("data-x", AttrValue::Bool(true))
                .into(),
            Node::Raw("<!-- keep -->".into()),
        ]);
        assert_eq!(to_html(&doc), "<code class=\"a b\" data-x></code><!-- keep -->");
    }
}
