//! Owned markup tree produced from Matrix `formatted_body` HTML.
//!
//! The html5ever DOM is reference counted and interior mutable; the walker
//! only needs to read it, so the parser copies it into this plain tree.

/// Tags the Matrix walker handles specifically. Everything else is
/// [`Tag::Other`] and walked transparently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Emphasis,
    Strong,
    Strike,
    Code,
    Pre,
    Anchor,
    Image,
    LineBreak,
    Blockquote,
    UnorderedList,
    OrderedList,
    ListItem,
    Heading(u8),
    Span,
    Reply,
    Rule,
    Other,
}

impl Tag {
    pub fn from_name(name: &str) -> Tag {
        match name.to_ascii_lowercase().as_str() {
            "em" | "i" => Tag::Emphasis,
            "strong" | "b" => Tag::Strong,
            "del" | "s" | "strike" => Tag::Strike,
            "code" => Tag::Code,
            "pre" => Tag::Pre,
            "a" => Tag::Anchor,
            "img" => Tag::Image,
            "br" => Tag::LineBreak,
            "blockquote" => Tag::Blockquote,
            "ul" => Tag::UnorderedList,
            "ol" => Tag::OrderedList,
            "li" => Tag::ListItem,
            "h1" => Tag::Heading(1),
            "h2" => Tag::Heading(2),
            "h3" => Tag::Heading(3),
            "h4" => Tag::Heading(4),
            "h5" => Tag::Heading(5),
            "h6" => Tag::Heading(6),
            "span" => Tag::Span,
            "mx-reply" => Tag::Reply,
            "hr" => Tag::Rule,
            _ => Tag::Other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormattedNode {
    Text(String),
    Element(Element),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<FormattedNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            tag: Tag::from_name(&name),
            name,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attr(key).is_some()
    }

    pub fn text_content(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            child.collect_text(&mut out);
        }
        out
    }

    /// Child elements, skipping text nodes.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(FormattedNode::as_element)
    }
}

impl FormattedNode {
    /// Concatenated text of this node and all of its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            FormattedNode::Text(text) => out.push_str(text),
            FormattedNode::Element(element) => out.push_str(&element.text_content()),
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            FormattedNode::Element(element) => Some(element),
            FormattedNode::Text(_) => None,
        }
    }
}
