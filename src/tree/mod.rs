//! Document tree.
//!
//! A small HTML-shaped tree produced from markdown and consumed by the
//! rewriter. Node kinds are a closed sum type; image elements are found
//! through a capability check ([`Element::as_image`]) rather than by
//! probing attributes ad hoc.
//!
//! - [`markdown`]: markdown → tree, candidate reference collection
//! - [`html`]: tree → HTML string

pub mod html;
pub mod markdown;

use smallvec::SmallVec;

pub use html::to_html;
pub use markdown::{MarkdownOptions, collect_image_refs, from_markdown};

/// Attribute list; most elements carry only a handful.
pub type Attrs = SmallVec<[(String, AttrValue); 4]>;

/// Attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Str(String),
    /// Boolean attribute (`disabled`); `false` is not rendered.
    Bool(bool),
    /// Space-separated token list (`class`).
    List(Vec<String>),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// Tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Box<Element>),
    Text(String),
    /// Raw HTML passed through verbatim.
    Raw(String),
}

/// Element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub attrs: Attrs,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Attrs::new(),
            children: Vec::new(),
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: &str, value: impl Into<AttrValue>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    #[inline]
    pub fn is_tag(&self, tag: &str) -> bool {
        self.tag.eq_ignore_ascii_case(tag)
    }

    pub fn get_attr(&self, name: &str) -> Option<&AttrValue> {
        self.attrs.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Set or replace an attribute, keeping its position.
    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>) {
        let value = value.into();
        match self.attrs.iter_mut().find(|(k, _)| k == name) {
            Some((_, v)) => *v = value,
            None => self.attrs.push((name.to_string(), value)),
        }
    }

    /// String `src` of an image element, if this is one.
    pub fn image_src(&self) -> Option<&str> {
        if !self.is_tag("img") {
            return None;
        }
        self.get_attr("src").and_then(AttrValue::as_str)
    }

    /// View as an image element: tag `img` with a string-valued `src`.
    pub fn as_image(&mut self) -> Option<ImageElement<'_>> {
        self.image_src()?;
        Some(ImageElement { elem: self })
    }
}

impl From<Element> for Node {
    fn from(elem: Element) -> Self {
        Self::Element(Box::new(elem))
    }
}

/// Mutable view of an element known to be `<img src="...">`.
pub struct ImageElement<'a> {
    elem: &'a mut Element,
}

impl ImageElement<'_> {
    pub fn src(&self) -> &str {
        self.elem.image_src().unwrap_or_default()
    }

    /// Replace `src`; no other attribute is touched.
    pub fn set_src(&mut self, src: impl Into<String>) {
        self.elem.set_attr("src", AttrValue::Str(src.into()));
    }
}

/// A parsed document: a list of top-level nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    /// Visit every element depth-first, parents before children.
    pub fn for_each_element(&self, mut f: impl FnMut(&Element)) {
        fn walk(nodes: &[Node], f: &mut impl FnMut(&Element)) {
            for node in nodes {
                if let Node::Element(elem) = node {
                    f(elem);
                    walk(&elem.children, f);
                }
            }
        }
        walk(&self.children, &mut f);
    }

    /// Mutable variant of [`Document::for_each_element`].
    pub fn for_each_element_mut(&mut self, mut f: impl FnMut(&mut Element)) {
        fn walk(nodes: &mut [Node], f: &mut impl FnMut(&mut Element)) {
            for node in nodes {
                if let Node::Element(elem) = node {
                    f(elem);
                    walk(&mut elem.children, f);
                }
            }
        }
        walk(&mut self.children, &mut f);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_as_image_requires_img_and_string_src() {
        let mut img = Element::new("img").with_attr("src", "./a.png");
        assert_eq!(img.as_image().map(|i| i.src().to_string()), Some("./a.png".into()));

        let mut no_src = Element::new("img").with_attr("alt", "x");
        assert!(no_src.as_image().is_none());

        let mut bool_src = Element::new("img").with_attr("src", AttrValue::Bool(true));
        assert!(bool_src.as_image().is_none());

        let mut video = Element::new("video").with_attr("src", "./a.mp4");
        assert!(video.as_image().is_none());
    }

    #[test]
    fn test_set_src_only_touches_src() {
        let mut img = Element::new("img")
            .with_attr("alt", "photo")
            .with_attr("src", "./a.png")
            .with_attr("title", "t");
        img.as_image().unwrap().set_src("/assets/a-1234.png");

        assert_eq!(
            img.attrs.as_slice(),
            &[
                ("alt".to_string(), AttrValue::from("photo")),
                ("src".to_string(), AttrValue::from("/assets/a-1234.png")),
                ("title".to_string(), AttrValue::from("t")),
            ]
        );
    }

    #[test]
    fn test_walk_visits_nested_elements() {
        let mut doc = Document::new(vec![
            Element::new("p")
                .with_children(vec![
                    Node::Text("hi".into()),
                    Element::new("img").with_attr("src", "a.png").into(),
                ])
                .into(),
            Node::Raw("<hr>".into()),
            Element::new("img").with_attr("src", "b.png").into(),
        ]);

        let mut tags = Vec::new();
        doc.for_each_element(|e| tags.push(e.tag.clone()));
        assert_eq!(tags, ["p", "img", "img"]);

        let mut count = 0;
        doc.for_each_element_mut(|e| {
            if let Some(mut img) = e.as_image() {
                img.set_src("x.png");
                count += 1;
            }
        });
        assert_eq!(count, 2);
    }
}
