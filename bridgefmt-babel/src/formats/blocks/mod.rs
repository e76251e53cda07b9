//! Slack block tree → Matrix HTML
//!
//! # Element Mapping Table
//!
//! | Block                     | HTML                                                    |
//! |---------------------------|---------------------------------------------------------|
//! | `rich_text`               | children                                                |
//! | `rich_text_section`       | `<p>` at top level, bare inside a list item             |
//! | `rich_text_preformatted`  | `<pre><code>`                                           |
//! | `rich_text_quote`         | `<blockquote>`                                          |
//! | `rich_text_list`          | `<ul>` / `<ol start>`, each element in `<li>`           |
//! | `text`                    | escaped, `\n` → `<br>`, wrapped in strong/em/del/code   |
//! | `link`                    | `<a href>`                                              |
//! | `user`, `channel`, `team` | pill link, or the literal Slack token                   |
//! | `usergroup`               | pill link, name, or the literal Slack token             |
//! | `broadcast`               | room mention keyword                                    |
//! | `emoji`                   | glyph, or `:name:`                                      |
//! | `date`                    | fallback text                                           |
//! | `color`                   | value and a coloured square                             |
//! | `divider`                 | `<hr>`                                                  |
//! | `section` (layout)        | `<p>` text, fields in a two-column table                |
//! | `context`                 | `<p>` with space separated elements                     |
//! | `image`                   | `<p>` title and link to the image                       |
//!
//! The "inside a block" flag is passed by value: list items set it, quotes
//! and code blocks pass on whatever they received.

use crate::common::escape::{escape_attr, escape_html};
use crate::error::Result;
use crate::formats::mrkdwn::compiler::MrkdwnMode;
use crate::formats::mrkdwn::SlackMarkdownParser;
use crate::ir::nodes::{ContentBlock, LayoutElement, ListStyle, Style};
use crate::lookup::EntityReference;
use futures::future::BoxFuture;
use tracing::debug;

pub struct SlackBlocksParser<'a> {
    markdown: &'a SlackMarkdownParser<'a>,
}

impl<'a> SlackBlocksParser<'a> {
    pub fn new(markdown: &'a SlackMarkdownParser<'a>) -> Self {
        Self { markdown }
    }

    pub async fn parse_blocks(&self, blocks: &[ContentBlock]) -> Result<String> {
        self.render_blocks(blocks, false).await
    }

    fn render_blocks<'b>(
        &'b self,
        blocks: &'b [ContentBlock],
        in_block: bool,
    ) -> BoxFuture<'b, Result<String>> {
        Box::pin(async move {
            let mut out = String::new();
            for block in blocks {
                out.push_str(&self.render_block(block, in_block).await?);
            }
            Ok(out)
        })
    }

    async fn render_block(&self, block: &ContentBlock, in_block: bool) -> Result<String> {
        let resolver = self.markdown.resolver();
        let options = self.markdown.options();

        Ok(match block {
            ContentBlock::RichText { elements } => self.render_blocks(elements, in_block).await?,
            ContentBlock::Section { elements } => {
                let content = self.render_blocks(elements, true).await?;
                if in_block {
                    content
                } else {
                    format!("<p>{content}</p>")
                }
            }
            ContentBlock::Preformatted { elements } => format!(
                "<pre><code>{}</code></pre>",
                self.render_blocks(elements, in_block).await?
            ),
            ContentBlock::Quote { elements } => format!(
                "<blockquote>{}</blockquote>",
                self.render_blocks(elements, in_block).await?
            ),
            ContentBlock::List {
                elements,
                style,
                index,
                ..
            } => {
                let mut items = String::new();
                for element in elements {
                    items.push_str("<li>");
                    items.push_str(
                        &self
                            .render_blocks(std::slice::from_ref(element), true)
                            .await?,
                    );
                    items.push_str("</li>");
                }
                match style {
                    ListStyle::Ordered => {
                        format!("<ol start=\"{}\">{items}</ol>", index.unwrap_or(0) + 1)
                    }
                    ListStyle::Bullet => format!("<ul>{items}</ul>"),
                }
            }
            ContentBlock::Text { text, style } => render_text(text, *style),
            ContentBlock::Link { url, text, .. } => {
                let label = text.as_deref().filter(|t| !t.is_empty()).unwrap_or(url);
                format!(
                    "<a href=\"{}\">{}</a>",
                    escape_attr(url),
                    escape_html(label)
                )
            }
            ContentBlock::User { user_id, .. } => {
                let entity = resolver.resolve_user(user_id).await?;
                self.entity_or(entity, format!("<@{user_id}>"))
            }
            ContentBlock::Channel { channel_id, .. } => {
                let entity = resolver.resolve_channel(channel_id).await?;
                self.entity_or(entity, format!("<#{channel_id}>"))
            }
            ContentBlock::Usergroup { usergroup_id, .. } => {
                let entity = resolver.resolve_usergroup(usergroup_id).await?;
                self.entity_or(entity, format!("<!subteam^{usergroup_id}>"))
            }
            ContentBlock::Team { team_id, .. } => {
                let entity = resolver.resolve_team(team_id).await?;
                self.entity_or(entity, format!("<!team^{team_id}>"))
            }
            ContentBlock::Broadcast { .. } => escape_html(&options.room_mention).into_owned(),
            ContentBlock::Emoji { name, .. } => {
                let glyph = resolver
                    .emoji_glyph(name)
                    .or_else(|| resolver.emoji_glyph(&format!("{name}{}", options.emoji_suffix)))
                    .unwrap_or_else(|| format!(":{name}:"));
                escape_html(&glyph).into_owned()
            }
            ContentBlock::Date { fallback, .. } => {
                escape_html(fallback.as_deref().unwrap_or_default()).into_owned()
            }
            ContentBlock::Color { value } => {
                let value = escape_attr(value);
                format!("{value}<font color=\"{value}\">\u{25A0}</font>")
            }
            ContentBlock::Divider => "<hr>".to_string(),
            ContentBlock::LayoutSection { text, fields } => {
                let mut out = String::new();
                if let Some(text) = text {
                    out.push_str(&format!("<p>{}</p>", self.render_element(text).await?));
                }
                if let Some(fields) = fields.as_ref().filter(|f| !f.is_empty()) {
                    out.push_str("<table><tr>");
                    for (i, field) in fields.iter().enumerate() {
                        out.push_str(&format!("<td>{}</td>", self.render_element(field).await?));
                        if i % 2 == 1 && i < fields.len() - 1 {
                            out.push_str("</tr><tr>");
                        }
                    }
                    out.push_str("</tr></table>");
                }
                out
            }
            ContentBlock::Context { elements } => {
                let mut out = String::from("<p>");
                for element in elements {
                    out.push_str(&self.render_element(element).await?);
                    out.push(' ');
                }
                out.push_str("</p>");
                out
            }
            ContentBlock::Image {
                image_url, title, ..
            } => {
                let mut out = String::from("<p>");
                if let Some(title) = title {
                    out.push_str(&self.render_element(title).await?);
                    out.push_str("<br>");
                }
                out.push_str(&format!(
                    "Image: <a href=\"{}\">{}</a></p>",
                    escape_attr(image_url),
                    escape_html(image_url)
                ));
                out
            }
            ContentBlock::Unsupported { kind } => {
                debug!(kind = %kind, "rendering unsupported block placeholder");
                format!("Unsupported block of type {}", escape_html(kind))
            }
        })
    }

    /// Layout text objects and image elements.
    async fn render_element(&self, element: &LayoutElement) -> Result<String> {
        Ok(match element {
            LayoutElement::PlainText { text, .. } => escape_html(text).into_owned(),
            LayoutElement::Mrkdwn { text, .. } => {
                self.markdown
                    .parse_markdown(text, MrkdwnMode::Markup)
                    .await?
            }
            LayoutElement::Image {
                image_url,
                alt_text,
            } => {
                let alt = escape_attr(alt_text);
                match self.markdown.resolver().media_to_locator(image_url).await? {
                    Some(locator) => format!(
                        "<img alt=\"{alt}\" title=\"{alt}\" height=\"{}\" src=\"{}\" />",
                        self.markdown.options().emoji_size,
                        escape_attr(&locator)
                    ),
                    None => format!(
                        "<a href=\"{}\">{}</a>",
                        escape_attr(image_url),
                        escape_html(alt_text)
                    ),
                }
            }
            LayoutElement::Unsupported => String::new(),
        })
    }

    fn entity_or(&self, entity: Option<EntityReference>, literal: String) -> String {
        match entity {
            Some(entity) if !entity.id.is_empty() => self.markdown.pill_link(&entity),
            Some(entity) => escape_html(&entity.display_name).into_owned(),
            None => {
                debug!(literal = %literal, "block mention did not resolve");
                escape_html(&literal).into_owned()
            }
        }
    }
}

/// Escaped text in style tags, opened bold → italic → strike → code.
pub fn render_text(text: &str, style: Option<Style>) -> String {
    let content = escape_html(text).replace('\n', "<br>");
    let style = style.unwrap_or_default();
    let tags: Vec<&str> = [
        (style.bold, "strong"),
        (style.italic, "em"),
        (style.strike, "del"),
        (style.code, "code"),
    ]
    .into_iter()
    .filter_map(|(on, tag)| on.then_some(tag))
    .collect();

    let mut out = String::new();
    for tag in &tags {
        out.push_str(&format!("<{tag}>"));
    }
    out.push_str(&content);
    for tag in tags.iter().rev() {
        out.push_str(&format!("</{tag}>"));
    }
    out
}
