//! HTML parsing (Matrix `formatted_body` → markup tree)
//!
//! html5ever always builds a full document, so the fragment is wrapped in a
//! `<div>` and the children of `<body>` are copied out into an owned
//! [`FormattedNode`] tree.

use crate::error::{ConvertError, Result};
use crate::ir::markup::{Element, FormattedNode};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Parse an HTML fragment into a synthetic root element holding its nodes.
pub fn parse_fragment(html: &str) -> Result<FormattedNode> {
    let wrapped = format!("<div>{html}</div>");
    let dom = parse_document(RcDom::default(), Default::default()).one(wrapped.as_str());

    let body = find_element(&dom.document, "body")
        .ok_or_else(|| ConvertError::Parse("HTML document has no <body>".to_string()))?;

    let mut root = Element::new("body");
    root.children = convert_children(&body);
    Ok(FormattedNode::Element(root))
}

fn find_element(handle: &Handle, tag: &str) -> Option<Handle> {
    if let NodeData::Element { name, .. } = &handle.data {
        if &*name.local == tag {
            return Some(handle.clone());
        }
    }
    handle
        .children
        .borrow()
        .iter()
        .find_map(|child| find_element(child, tag))
}

fn convert_children(handle: &Handle) -> Vec<FormattedNode> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_node)
        .collect()
}

fn convert_node(handle: &Handle) -> Option<FormattedNode> {
    match &handle.data {
        NodeData::Text { contents } => Some(FormattedNode::Text(contents.borrow().to_string())),
        NodeData::Element { name, attrs, .. } => {
            let mut element = Element::new(&*name.local);
            element.attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            element.children = convert_children(handle);
            Some(FormattedNode::Element(element))
        }
        // Comments, doctypes and processing instructions carry no content.
        _ => None,
    }
}
