//! Markdown to tree conversion using pulldown-cmark.
//!
//! This is also where candidate image references are collected: the
//! rewriter only ever looks at references returned by [`collect_image_refs`].

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use rustc_hash::FxHashSet;

use super::html::unescape;
use super::{AttrValue, Document, Element, Node};
use crate::asset::RefKind;

/// Options for markdown conversion
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Enable tables extension
    pub tables: bool,
    /// Enable footnotes extension
    pub footnotes: bool,
    /// Enable strikethrough extension
    pub strikethrough: bool,
    /// Enable task lists extension
    pub task_lists: bool,
    /// Enable heading attributes extension (e.g., `# Heading {#custom-id}`)
    pub heading_attributes: bool,
}

impl MarkdownOptions {
    /// Create options with all extensions enabled
    pub fn all() -> Self {
        Self {
            tables: true,
            footnotes: true,
            strikethrough: true,
            task_lists: true,
            heading_attributes: true,
        }
    }

    /// Convert to pulldown-cmark Options
    fn to_pulldown_options(&self) -> Options {
        let mut opts = Options::empty();
        if self.tables {
            opts.insert(Options::ENABLE_TABLES);
        }
        if self.footnotes {
            opts.insert(Options::ENABLE_FOOTNOTES);
        }
        if self.strikethrough {
            opts.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.task_lists {
            opts.insert(Options::ENABLE_TASKLISTS);
        }
        if self.heading_attributes {
            opts.insert(Options::ENABLE_HEADING_ATTRIBUTES);
        }
        opts
    }
}

/// Markdown to tree converter
struct MarkdownConverter {
    /// Stack of open elements (for nested structures)
    stack: Vec<Element>,
    /// Root children (collected when stack is empty)
    root_children: Vec<Node>,
    /// Inside `<thead>`: cells become `<th>`
    in_table_head: bool,
    /// Lines of the HTML block being read; parsed as a whole on close
    html_block: Option<String>,
}

impl MarkdownConverter {
    fn new() -> Self {
        Self {
            stack: Vec::new(),
            root_children: Vec::new(),
            in_table_head: false,
            html_block: None,
        }
    }

    fn convert(mut self, markdown: &str, options: &MarkdownOptions) -> Document {
        let parser = Parser::new_ext(markdown, options.to_pulldown_options());

        for event in parser {
            self.handle_event(event);
        }

        // Close anything left open by malformed input
        while !self.stack.is_empty() {
            self.pop();
        }
        Document::new(self.root_children)
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => self.add_text(text.as_ref()),
            Event::Code(code) => {
                let code = Element::new("code").with_children(vec![Node::Text(code.to_string())]);
                self.add_node(code.into());
            }
            Event::Html(html) => match &mut self.html_block {
                Some(block) => block.push_str(&html),
                None => self.add_raw_html(html.as_ref()),
            },
            Event::InlineHtml(html) => self.add_raw_html(html.as_ref()),
            Event::SoftBreak => self.add_text("\n"),
            Event::HardBreak => self.add_node(Element::new("br").into()),
            Event::Rule => self.add_node(Element::new("hr").into()),
            Event::FootnoteReference(name) => self.add_footnote_ref(name.as_ref()),
            Event::TaskListMarker(checked) => {
                let input = Element::new("input")
                    .with_attr("type", "checkbox")
                    .with_attr("disabled", AttrValue::Bool(true))
                    .with_attr("checked", AttrValue::Bool(checked));
                self.add_node(input.into());
            }
            Event::InlineMath(math) | Event::DisplayMath(math) => self.add_text(math.as_ref()),
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::CodeBlock(kind) => {
                // <pre><code class="language-x">
                let mut code = Element::new("code");
                if let CodeBlockKind::Fenced(lang) = kind
                    && !lang.is_empty()
                {
                    code.set_attr("class", AttrValue::List(vec![format!("language-{lang}")]));
                }
                self.stack.push(Element::new("pre"));
                self.stack.push(code);
            }
            Tag::TableHead => {
                self.in_table_head = true;
                self.stack.push(Element::new("thead"));
                self.stack.push(Element::new("tr"));
            }
            Tag::TableCell if self.in_table_head => self.stack.push(Element::new("th")),
            Tag::HtmlBlock => self.html_block = Some(String::new()),
            other => self.stack.push(tag_to_element(&other)),
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::CodeBlock => {
                self.pop();
                self.pop();
            }
            TagEnd::TableHead => {
                self.in_table_head = false;
                self.pop();
                self.pop();
            }
            TagEnd::HtmlBlock => {
                // An element may open on one line and close several lines later
                if let Some(block) = self.html_block.take() {
                    self.add_raw_html(&block);
                }
            }
            TagEnd::Image => {
                // Alt text arrives as children; fold it into `alt`
                if let Some(mut img) = self.stack.pop() {
                    let alt = plain_text(&img.children);
                    img.children.clear();
                    img.set_attr("alt", alt);
                    self.add_node(img.into());
                }
            }
            _ => self.pop(),
        }
    }

    fn pop(&mut self) {
        if let Some(elem) = self.stack.pop() {
            // Unwrap pseudo-elements (metadata)
            if elem.tag.starts_with("__") {
                for child in elem.children {
                    self.add_node(child);
                }
            } else {
                self.add_node(elem.into());
            }
        }
    }

    fn add_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.add_node(Node::Text(text.to_string()));
    }

    /// Raw HTML containing `<img>` is parsed so its `src` can be rewritten;
    /// everything else passes through verbatim.
    fn add_raw_html(&mut self, html: &str) {
        if !html.to_ascii_lowercase().contains("<img") {
            self.add_node(Node::Raw(html.to_string()));
            return;
        }

        let Ok(dom) = tl::parse(html, tl::ParserOptions::default()) else {
            self.add_node(Node::Raw(html.to_string()));
            return;
        };

        let parser = dom.parser();
        for handle in dom.children() {
            if let Some(node) = tl_node_to_tree(*handle, parser) {
                self.add_node(node);
            }
        }
    }

    fn add_footnote_ref(&mut self, name: &str) {
        let link = Element::new("a")
            .with_attr("href", format!("#fn-{name}"))
            .with_attr("id", format!("fnref-{name}"))
            .with_children(vec![Node::Text(format!("[{name}]"))]);
        let sup = Element::new("sup")
            .with_attr("class", AttrValue::List(vec!["footnote-ref".into()]))
            .with_children(vec![link.into()]);
        self.add_node(sup.into());
    }

    /// Add a node to current context (top of stack or root)
    fn add_node(&mut self, node: Node) {
        if let Some(top) = self.stack.last_mut() {
            top.children.push(node);
        } else {
            self.root_children.push(node);
        }
    }
}

/// Convert a tl node handle to a tree node
fn tl_node_to_tree(handle: tl::NodeHandle, parser: &tl::Parser) -> Option<Node> {
    match handle.get(parser)? {
        tl::Node::Tag(tag) => {
            let mut elem = Element::new(tag.name().as_utf8_str().to_lowercase());
            for (key, value) in tag.attributes().iter() {
                let value = match value {
                    Some(v) => AttrValue::Str(unescape(&v).into_owned()),
                    None => AttrValue::Bool(true),
                };
                elem.set_attr(&key, value);
            }
            elem.children = tag
                .children()
                .top()
                .iter()
                .filter_map(|child| tl_node_to_tree(*child, parser))
                .collect();
            Some(elem.into())
        }
        tl::Node::Raw(bytes) => {
            let text = bytes.as_utf8_str();
            (!text.is_empty()).then(|| Node::Raw(text.to_string()))
        }
        tl::Node::Comment(_) => None,
    }
}

/// Convert pulldown-cmark Tag to an (empty) element
fn tag_to_element(tag: &Tag) -> Element {
    match tag {
        // Block elements
        Tag::Paragraph => Element::new("p"),
        Tag::Heading {
            level, id, classes, ..
        } => {
            let mut elem = Element::new(heading_level_to_tag(*level));
            if let Some(id) = id {
                elem.set_attr("id", id.to_string());
            }
            if !classes.is_empty() {
                let classes = classes.iter().map(|c| c.to_string()).collect();
                elem.set_attr("class", AttrValue::List(classes));
            }
            elem
        }
        Tag::BlockQuote(_) => Element::new("blockquote"),
        Tag::List(Some(start)) if *start != 1 => {
            Element::new("ol").with_attr("start", start.to_string())
        }
        Tag::List(Some(_)) => Element::new("ol"),
        Tag::List(None) => Element::new("ul"),
        Tag::Item => Element::new("li"),
        Tag::FootnoteDefinition(name) => Element::new("div")
            .with_attr("class", AttrValue::List(vec!["footnote".into()]))
            .with_attr("id", format!("fn-{name}")),

        // Table elements
        Tag::Table(_) => Element::new("table"),
        Tag::TableHead => Element::new("thead"),
        Tag::TableRow => Element::new("tr"),
        Tag::TableCell => Element::new("td"),

        // Inline elements
        Tag::Emphasis => Element::new("em"),
        Tag::Strong => Element::new("strong"),
        Tag::Strikethrough => Element::new("del"),
        Tag::Superscript => Element::new("sup"),
        Tag::Subscript => Element::new("sub"),
        Tag::Link {
            dest_url, title, ..
        } => {
            let mut elem = Element::new("a").with_attr("href", dest_url.to_string());
            if !title.is_empty() {
                elem.set_attr("title", title.to_string());
            }
            elem
        }
        Tag::Image {
            dest_url, title, ..
        } => {
            let mut elem = Element::new("img").with_attr("src", dest_url.to_string());
            if !title.is_empty() {
                elem.set_attr("title", title.to_string());
            }
            elem
        }

        // Definition list (extended syntax)
        Tag::DefinitionList => Element::new("dl"),
        Tag::DefinitionListTitle => Element::new("dt"),
        Tag::DefinitionListDefinition => Element::new("dd"),

        // Unwrapped on close
        Tag::CodeBlock(_) => Element::new("pre"),
        Tag::HtmlBlock => Element::new("__html_block"),
        Tag::MetadataBlock(_) => Element::new("__metadata"),
    }
}

fn heading_level_to_tag(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "h1",
        HeadingLevel::H2 => "h2",
        HeadingLevel::H3 => "h3",
        HeadingLevel::H4 => "h4",
        HeadingLevel::H5 => "h5",
        HeadingLevel::H6 => "h6",
    }
}

/// Concatenated text content of a node list.
fn plain_text(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => out.push_str(&plain_text(&e.children)),
            Node::Raw(_) => {}
        }
    }
    out
}

/// Convert markdown string to a document
pub fn from_markdown(markdown: &str, options: &MarkdownOptions) -> Document {
    MarkdownConverter::new().convert(markdown, options)
}

/// Collect the distinct local image references of a document.
///
/// External URLs, `data:` URIs and site-root paths are not candidates.
pub fn collect_image_refs(doc: &Document) -> FxHashSet<String> {
    let mut refs = FxHashSet::default();
    doc.for_each_element(|elem| {
        if let Some(src) = elem.image_src()
            && RefKind::parse(src).is_local()
        {
            refs.insert(src.to_string());
        }
    });
    refs
}
