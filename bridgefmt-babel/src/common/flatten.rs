//! Renders a block tree back into mrkdwn text.
//!
//! # The High-Level Concept
//!
//! The Matrix walker produces text and blocks side by side. Rendering the
//! blocks on their own must give back the walker's text, so this module is
//! both a plain-text renderer for block payloads and the reference the
//! walker is tested against.
//!
//! # The Algorithm
//!
//! 1. **Style runs:**
//!    - Keep a stack of open style markers for the current sequence
//!    - Before each inline leaf, close markers down to the first style the
//!      leaf does not carry, then open the missing ones in canonical order
//!      (bold, italic, strike, code)
//!    - Block-level items and the end of the sequence close everything
//!    - Empty text leaves are skipped, so no marker pair ever wraps nothing
//!
//! 2. **Leaves:**
//!    - Text is escaped unless it is code; mentions become `<@id>` / `<#id>`
//!    - A link with a label becomes `<url|label>`, without one the bare url
//!
//! 3. **Containers:**
//!    - Sections render their children as a sequence
//!    - Preformatted content is fenced with three backticks
//!    - Quotes prefix every line with `> `
//!    - Lists render one marker line per element, framed by blank lines

use super::escape::escape_reserved;
use crate::ir::nodes::{ContentBlock, ListStyle, Style, StyleFlag};
use crate::options::InboundOptions;

/// Renders `blocks` as one sequence.
pub fn flatten(blocks: &[ContentBlock], options: &InboundOptions) -> String {
    let mut out = String::new();
    render_sequence(blocks, options, &mut out);
    out
}

/// Prefixes every line of `text` with `> `.
pub fn quote_lines(text: &str) -> String {
    text.split('\n')
        .map(|line| format!("> {line}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Drops a single trailing newline, if any.
pub fn strip_one_newline(text: &str) -> &str {
    text.strip_suffix('\n').unwrap_or(text)
}

/// Marker for the `position`-th item (zero-based) of a list.
pub fn list_marker(
    style: ListStyle,
    index: Option<u32>,
    position: usize,
    depth: usize,
    options: &InboundOptions,
) -> String {
    match style {
        ListStyle::Bullet => options.bullet(depth).to_string(),
        ListStyle::Ordered => format!("{}.", index.unwrap_or(0) as usize + 1 + position),
    }
}

/// Incremental mrkdwn writer behind [`flatten`], also driven leaf by leaf
/// by the Matrix walker.
///
/// Every inline leaf goes through one style-run state machine: markers open
/// in canonical order whatever the nesting of the source, and a style
/// carried by consecutive leaves stays one run.
#[derive(Debug, Default)]
pub struct FlatWriter {
    out: String,
    open: Vec<StyleFlag>,
}

impl FlatWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an inline leaf. Empty text leaves are skipped, as are blocks
    /// that are not inline.
    pub fn push_leaf(&mut self, block: &ContentBlock) {
        let Some(style) = block.inline_style() else {
            return;
        };
        if matches!(block, ContentBlock::Text { text, .. } if text.is_empty()) {
            return;
        }
        transition(&mut self.open, style, &mut self.out);
        render_leaf(block, style, &mut self.out);
    }

    /// Closes every open style, then appends `text` as is.
    pub fn push_raw(&mut self, text: &str) {
        close_all(&mut self.open, &mut self.out);
        self.out.push_str(text);
    }

    pub fn finish(mut self) -> String {
        close_all(&mut self.open, &mut self.out);
        self.out
    }
}

fn render_sequence(blocks: &[ContentBlock], options: &InboundOptions, out: &mut String) {
    let mut writer = FlatWriter::new();
    for block in blocks {
        if block.inline_style().is_some() {
            writer.push_leaf(block);
        } else {
            let mut rendered = String::new();
            render_block(block, options, &mut rendered);
            writer.push_raw(&rendered);
        }
    }
    out.push_str(&writer.finish());
}

fn render_leaf(block: &ContentBlock, style: Style, out: &mut String) {
    match block {
        ContentBlock::Text { text, .. } => {
            if style.code {
                out.push_str(text);
            } else {
                out.push_str(&escape_reserved(text));
            }
        }
        ContentBlock::Link { url, text, .. } => match text {
            Some(label) if !label.is_empty() => {
                out.push('<');
                out.push_str(url);
                out.push('|');
                out.push_str(&escape_reserved(label));
                out.push('>');
            }
            _ => out.push_str(url),
        },
        ContentBlock::User { user_id, .. } => out.push_str(&format!("<@{user_id}>")),
        ContentBlock::Channel { channel_id, .. } => out.push_str(&format!("<#{channel_id}>")),
        ContentBlock::Usergroup { usergroup_id, .. } => {
            out.push_str(&format!("<!subteam^{usergroup_id}>"))
        }
        ContentBlock::Team { team_id, .. } => out.push_str(&format!("<!team^{team_id}>")),
        ContentBlock::Broadcast { range, .. } => out.push_str(&format!("<!{}>", range.as_str())),
        ContentBlock::Emoji { name, .. } => out.push_str(&format!(":{name}:")),
        ContentBlock::Date { fallback, .. } => {
            out.push_str(&escape_reserved(fallback.as_deref().unwrap_or_default()))
        }
        ContentBlock::Color { value } => out.push_str(value),
        _ => {}
    }
}

fn render_block(block: &ContentBlock, options: &InboundOptions, out: &mut String) {
    match block {
        ContentBlock::RichText { elements } | ContentBlock::Section { elements } => {
            render_sequence(elements, options, out)
        }
        ContentBlock::Preformatted { elements } => {
            out.push_str("```");
            for element in elements {
                if let ContentBlock::Text { text, .. } = element {
                    out.push_str(text);
                } else {
                    render_sequence(std::slice::from_ref(element), options, out);
                }
            }
            out.push_str("```\n");
        }
        ContentBlock::Quote { elements } => {
            out.push_str(&quote_lines(&flatten(elements, options)));
            out.push('\n');
        }
        ContentBlock::List {
            elements,
            style,
            index,
            ..
        } => {
            let items: Vec<String> = elements
                .iter()
                .enumerate()
                .map(|(position, element)| {
                    let marker = list_marker(*style, *index, position, 0, options);
                    let text = flatten(std::slice::from_ref(element), options);
                    format!("{} {}", escape_reserved(&marker), strip_one_newline(&text))
                })
                .collect();
            out.push('\n');
            out.push_str(&items.join("\n"));
            out.push_str("\n\n");
        }
        ContentBlock::Divider => {
            out.push('\n');
            out.push_str(&options.divider);
            out.push('\n');
        }
        _ => {}
    }
}
