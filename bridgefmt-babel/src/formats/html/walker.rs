//! Matrix HTML → mrkdwn text + Slack blocks.
//!
//! # The High-Level Concept
//!
//! Every node of the markup tree emits its blocks into a [`WalkOutput`].
//! The output renders each block into mrkdwn as it arrives, through the same
//! [`FlatWriter`] that `common::flatten` uses, so both renditions are built
//! in one pass and flattening the blocks gives back the text.
//!
//! # The Algorithm
//!
//! 1. **Context:**
//!    - A [`WalkContext`] is passed by value into each recursive call
//!    - Entering a style tag bumps that style's counter for the subtree only
//!    - Entering a list bumps the list depth for the subtree only
//!
//! 2. **Leaves:**
//!    - Text goes through the escape/highlight step and is tagged with the
//!      style active at that point
//!    - Mentions, links and images resolve through [`InboundResolver`]
//!    - Style markers are placed by the writer from the leaf styles, never by
//!      the style tags themselves
//!
//! 3. **Containers:**
//!    - Quotes and list items are walked into an output of their own; the
//!      finished text is prefixed or marked and emitted with the container
//!    - Code blocks and rules are emitted directly
//!
//! 4. **Lists:**
//!    - Only direct `<li>` children are walked
//!    - A top-level list becomes one `rich_text_list` block, one section
//!      per item
//!    - A nested list becomes marker and newline text blocks spliced into
//!      the parent item; there is no nested list block

use crate::common::cleanup::{clean_blocks, merge_text_blocks};
use crate::common::escape::escape_reserved;
use crate::common::flatten::{list_marker, quote_lines, strip_one_newline, FlatWriter};
use crate::error::Result;
use crate::ir::markup::{Element, FormattedNode, Tag};
use crate::ir::nodes::{ContentBlock, ListStyle, Style, StyleFlag, WalkResult};
use crate::lookup::InboundResolver;
use crate::options::InboundOptions;
use futures::future::BoxFuture;
use tracing::{debug, trace};

const SPOILER_ATTR: &str = "data-mx-spoiler";

/// Nesting depth of each inline style at the current point of the walk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleState {
    pub bold: u32,
    pub italic: u32,
    pub strike: u32,
    pub code: u32,
}

impl StyleState {
    /// Copy of this state with `flag` nested one level deeper.
    pub fn with(mut self, flag: StyleFlag) -> Self {
        match flag {
            StyleFlag::Bold => self.bold += 1,
            StyleFlag::Italic => self.italic += 1,
            StyleFlag::Strike => self.strike += 1,
            StyleFlag::Code => self.code += 1,
        }
        self
    }

    /// Style flags for a leaf emitted in this state; `None` when unstyled.
    pub fn to_style(&self) -> Option<Style> {
        Style::normalized(Some(Style {
            bold: self.bold > 0,
            italic: self.italic > 0,
            strike: self.strike > 0,
            code: self.code > 0,
        }))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkContext {
    pub style: StyleState,
    pub list_depth: usize,
}

impl WalkContext {
    fn styled(self, flag: StyleFlag) -> Self {
        Self {
            style: self.style.with(flag),
            ..self
        }
    }

    fn nested_list(self) -> Self {
        Self {
            list_depth: self.list_depth + 1,
            ..self
        }
    }
}

/// Blocks of the subtree being walked, with their mrkdwn rendering kept up
/// to date block by block.
#[derive(Debug, Default)]
pub struct WalkOutput {
    text: FlatWriter,
    blocks: Vec<ContentBlock>,
}

impl WalkOutput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits an inline leaf.
    pub fn inline(&mut self, block: ContentBlock) {
        self.text.push_leaf(&block);
        self.blocks.push(block);
    }

    /// Emits a block-level item rendered as `text`. Open style runs close
    /// before it.
    pub fn block(&mut self, text: &str, block: ContentBlock) {
        self.text.push_raw(text);
        self.blocks.push(block);
    }

    pub fn finish(self) -> WalkResult {
        WalkResult::new(self.text.finish(), self.blocks)
    }
}

/// Walks a markup tree on behalf of one conversion.
pub struct MatrixWalker<'a> {
    pub(super) resolver: &'a dyn InboundResolver,
    pub(super) options: &'a InboundOptions,
}

impl<'a> MatrixWalker<'a> {
    pub fn new(resolver: &'a dyn InboundResolver, options: &'a InboundOptions) -> Self {
        Self { resolver, options }
    }

    /// Walk `node` from the top: no style active, outside any list.
    pub async fn walk(&self, node: &FormattedNode) -> Result<WalkResult> {
        let mut out = WalkOutput::new();
        self.walk_node(node, WalkContext::default(), &mut out).await?;
        Ok(out.finish())
    }

    fn walk_node<'b>(
        &'b self,
        node: &'b FormattedNode,
        ctx: WalkContext,
        out: &'b mut WalkOutput,
    ) -> BoxFuture<'b, Result<()>> {
        Box::pin(async move {
            match node {
                // Inter-element newlines carry no content.
                FormattedNode::Text(text) if text == "\n" => Ok(()),
                FormattedNode::Text(text) => {
                    self.escape_text(text, ctx.style.to_style(), out).await
                }
                FormattedNode::Element(element) => self.walk_element(element, ctx, out).await,
            }
        })
    }

    async fn walk_children(
        &self,
        element: &Element,
        ctx: WalkContext,
        out: &mut WalkOutput,
    ) -> Result<()> {
        for child in &element.children {
            self.walk_node(child, ctx, out).await?;
        }
        Ok(())
    }

    /// Walks the children of `element` into an output of their own.
    async fn walk_apart(&self, element: &Element, ctx: WalkContext) -> Result<WalkResult> {
        let mut out = WalkOutput::new();
        self.walk_children(element, ctx, &mut out).await?;
        Ok(out.finish())
    }

    async fn walk_element(
        &self,
        element: &Element,
        ctx: WalkContext,
        out: &mut WalkOutput,
    ) -> Result<()> {
        trace!(tag = %element.name, depth = ctx.list_depth, "walking element");
        match element.tag {
            Tag::Emphasis => self.walk_styled(element, ctx, StyleFlag::Italic, out).await,
            Tag::Strong => self.walk_styled(element, ctx, StyleFlag::Bold, out).await,
            Tag::Strike => self.walk_styled(element, ctx, StyleFlag::Strike, out).await,
            Tag::Code => {
                walk_code(element, ctx, out);
                Ok(())
            }
            Tag::Pre => {
                walk_pre(element, out);
                Ok(())
            }
            Tag::Anchor => self.walk_anchor(element, ctx, out).await,
            Tag::Image => {
                self.walk_image(element, ctx, out);
                Ok(())
            }
            Tag::LineBreak => {
                out.inline(ContentBlock::text("\n", ctx.style.to_style()));
                Ok(())
            }
            Tag::Blockquote => self.walk_blockquote(element, ctx, out).await,
            Tag::UnorderedList => self.walk_list(element, ctx, ListStyle::Bullet, out).await,
            Tag::OrderedList => self.walk_list(element, ctx, ListStyle::Ordered, out).await,
            Tag::Heading(level) => self.walk_heading(element, ctx, level, out).await,
            Tag::Span if element.has_attr(SPOILER_ATTR) => {
                self.walk_spoiler(element, ctx, out).await
            }
            Tag::Reply => Ok(()),
            Tag::Rule => {
                out.block(
                    &format!("\n{}\n", self.options.divider),
                    ContentBlock::Divider,
                );
                Ok(())
            }
            Tag::Span | Tag::ListItem | Tag::Other => self.walk_children(element, ctx, out).await,
        }
    }

    /// Style tags only change the context; the writer places the markers.
    async fn walk_styled(
        &self,
        element: &Element,
        ctx: WalkContext,
        flag: StyleFlag,
        out: &mut WalkOutput,
    ) -> Result<()> {
        self.walk_children(element, ctx.styled(flag), out).await
    }

    async fn walk_anchor(
        &self,
        element: &Element,
        ctx: WalkContext,
        out: &mut WalkOutput,
    ) -> Result<()> {
        let Some(href) = element.attr("href") else {
            return self.walk_children(element, ctx, out).await;
        };
        let style = ctx.style.to_style();

        if let Some(pill) = href.strip_prefix(self.options.mention_prefix.as_str()) {
            if pill.starts_with('@') {
                if let Some(user) = self.resolver.resolve_user(pill).await? {
                    out.inline(ContentBlock::User {
                        user_id: user.id,
                        style,
                    });
                    return Ok(());
                }
                debug!(pill, "user pill did not resolve, rendering as link");
            } else if pill.starts_with('#') {
                if let Some(channel) = self.resolver.resolve_channel(pill).await? {
                    out.inline(ContentBlock::Channel {
                        channel_id: channel.id,
                        style,
                    });
                    return Ok(());
                }
                debug!(pill, "room pill did not resolve, rendering as link");
            }
        }

        let content = element.text_content();
        if content == href {
            return self.escape_text(&content, style, out).await;
        }
        out.inline(ContentBlock::Link {
            url: href.to_string(),
            text: Some(content).filter(|label| !label.is_empty()),
            style,
        });
        Ok(())
    }

    fn walk_image(&self, element: &Element, ctx: WalkContext, out: &mut WalkOutput) {
        let name = element
            .attr("alt")
            .filter(|alt| !alt.is_empty())
            .or_else(|| element.attr("title"))
            .unwrap_or_default();
        let style = ctx.style.to_style();

        match element.attr("src") {
            Some(src) => out.inline(ContentBlock::Link {
                url: self.resolver.media_to_remote_url(src),
                text: Some(name.to_string()).filter(|label| !label.is_empty()),
                style,
            }),
            None if !name.is_empty() => out.inline(ContentBlock::text(name, style)),
            None => {}
        }
    }

    async fn walk_blockquote(
        &self,
        element: &Element,
        ctx: WalkContext,
        out: &mut WalkOutput,
    ) -> Result<()> {
        let inner = self.walk_apart(element, ctx).await?;
        out.block(
            &format!("{}\n", quote_lines(&inner.text)),
            ContentBlock::Quote {
                elements: merge_text_blocks(inner.blocks),
            },
        );
        Ok(())
    }

    async fn walk_list(
        &self,
        element: &Element,
        ctx: WalkContext,
        style: ListStyle,
        out: &mut WalkOutput,
    ) -> Result<()> {
        let depth = ctx.list_depth;
        let item_ctx = ctx.nested_list();
        let index = match style {
            ListStyle::Ordered => start_index(element),
            ListStyle::Bullet => None,
        };
        let items: Vec<&Element> = element
            .child_elements()
            .filter(|item| item.tag == Tag::ListItem)
            .collect();

        if depth == 0 {
            let mut lines = Vec::with_capacity(items.len());
            let mut elements = Vec::with_capacity(items.len());
            for (position, item) in items.into_iter().enumerate() {
                let walked = self.walk_apart(item, item_ctx).await?;
                let marker = list_marker(style, index, position, depth, self.options);
                lines.push(format!(
                    "{} {}",
                    escape_reserved(&marker),
                    strip_one_newline(&walked.text)
                ));
                elements.push(list_element(walked.blocks));
            }
            out.block(
                &format!("\n{}\n\n", lines.join("\n")),
                ContentBlock::List {
                    elements,
                    style,
                    indent: 0,
                    index,
                },
            );
            return Ok(());
        }

        let indent = self.options.indent.repeat(depth);
        let line_style = ctx.style.to_style();
        for (position, item) in items.into_iter().enumerate() {
            let prefix = format!(
                "{indent}{} ",
                list_marker(style, index, position, depth, self.options)
            );
            out.inline(ContentBlock::text(prefix, line_style));
            self.walk_children(item, item_ctx, out).await?;
            out.inline(ContentBlock::text("\n", line_style));
        }
        Ok(())
    }

    async fn walk_heading(
        &self,
        element: &Element,
        ctx: WalkContext,
        level: u8,
        out: &mut WalkOutput,
    ) -> Result<()> {
        let inner = ctx.styled(StyleFlag::Bold);
        let marker = format!("{} ", "#".repeat(level as usize));
        out.inline(ContentBlock::text(marker, inner.style.to_style()));
        self.walk_children(element, inner, out).await?;
        out.inline(ContentBlock::text("\n", ctx.style.to_style()));
        Ok(())
    }

    async fn walk_spoiler(
        &self,
        element: &Element,
        ctx: WalkContext,
        out: &mut WalkOutput,
    ) -> Result<()> {
        let opening = match element.attr(SPOILER_ATTR).filter(|r| !r.is_empty()) {
            Some(reason) => format!("(Spoiler for {reason}: "),
            None => "(Spoiler: ".to_string(),
        };
        let style = ctx.style.to_style();
        out.inline(ContentBlock::text(opening, style));
        self.walk_children(element, ctx, out).await?;
        out.inline(ContentBlock::text(")", style));
        Ok(())
    }
}

fn walk_code(element: &Element, ctx: WalkContext, out: &mut WalkOutput) {
    let code = element.text_content();
    if !code.is_empty() {
        out.inline(ContentBlock::text(
            code,
            ctx.style.with(StyleFlag::Code).to_style(),
        ));
    }
}

fn walk_pre(element: &Element, out: &mut WalkOutput) {
    let content = pre_content(element);
    let text = format!("```{content}```\n");
    let elements = if content.is_empty() {
        Vec::new()
    } else {
        vec![ContentBlock::text(content, None)]
    };
    out.block(&text, ContentBlock::Preformatted { elements });
}

/// Raw text of a `<pre>`, looking through a lone `<code>` child and
/// trimming one newline on either side.
fn pre_content(element: &Element) -> String {
    let mut significant = element.children.iter().filter(|child| match child {
        FormattedNode::Text(text) => !text.trim().is_empty(),
        FormattedNode::Element(_) => true,
    });
    let content = match (significant.next(), significant.next()) {
        (Some(FormattedNode::Element(code)), None) if code.tag == Tag::Code => code.text_content(),
        _ => element.text_content(),
    };
    let content = content.strip_prefix('\n').unwrap_or(&content);
    strip_one_newline(content).to_string()
}

/// Zero-based offset from an `<ol start="N">` attribute.
fn start_index(element: &Element) -> Option<u32> {
    let raw = element.attr("start")?;
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        debug!(start = raw, "ignoring malformed list start");
        return None;
    }
    match raw.parse::<u32>() {
        Ok(start) if start > 1 => Some(start - 1),
        Ok(_) => None,
        Err(_) => {
            debug!(start = raw, "ignoring out of range list start");
            None
        }
    }
}

/// One element of a top-level list: the item's blocks as a single section.
fn list_element(blocks: Vec<ContentBlock>) -> ContentBlock {
    let mut cleaned = clean_blocks(blocks, true);
    if cleaned.len() == 1 && matches!(cleaned[0], ContentBlock::Section { .. }) {
        return cleaned.remove(0);
    }
    ContentBlock::section(cleaned)
}
