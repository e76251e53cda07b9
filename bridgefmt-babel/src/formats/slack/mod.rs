//! Slack message → Matrix message
//!
//! The plain `body` always comes from the message text. The HTML
//! `formatted_body` comes from the block tree when there is one, since
//! blocks carry resolved structure the text only approximates, and from the
//! text otherwise. Attachments are appended to both.

pub mod attachments;

use crate::common::escape::unescape_entities;
use crate::error::Result;
use crate::formats::blocks::SlackBlocksParser;
use crate::formats::mrkdwn::compiler::MrkdwnMode;
use crate::formats::mrkdwn::SlackMarkdownParser;
use crate::ir::message::{MatrixMessage, SlackMessage, HTML_FORMAT, MSGTYPE_TEXT};
use crate::lookup::OutboundResolver;
use crate::options::OutboundOptions;
use attachments::{AttachmentRenderer, DualOutput};
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct SlackMessageParser {
    options: OutboundOptions,
}

impl SlackMessageParser {
    pub fn new(options: OutboundOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &OutboundOptions {
        &self.options
    }

    /// Shorthand for a message that only has text.
    pub async fn format_text(
        &self,
        resolver: &dyn OutboundResolver,
        text: &str,
    ) -> Result<MatrixMessage> {
        self.format_message(resolver, &SlackMessage::from_text(text))
            .await
    }

    pub async fn format_message(
        &self,
        resolver: &dyn OutboundResolver,
        message: &SlackMessage,
    ) -> Result<MatrixMessage> {
        let markdown = SlackMarkdownParser::new(resolver, &self.options);
        let text = unescape_entities(&message.text);

        let mut out = DualOutput {
            body: markdown.parse_markdown(&text, MrkdwnMode::Plain).await?,
            html: String::new(),
        };
        out.html = match message.blocks.as_deref() {
            Some(blocks) if !blocks.is_empty() => {
                debug!(blocks = blocks.len(), "rendering block tree");
                SlackBlocksParser::new(&markdown).parse_blocks(blocks).await?
            }
            _ => markdown.parse_markdown(&text, MrkdwnMode::Markup).await?,
        };

        if let Some(attachments) = message.attachments.as_deref() {
            AttachmentRenderer::new(&markdown)
                .render_all(attachments, &mut out)
                .await?;
        }

        Ok(MatrixMessage {
            msgtype: MSGTYPE_TEXT.to_string(),
            body: out.body,
            format: Some(HTML_FORMAT.to_string()),
            formatted_body: Some(out.html),
        })
    }
}
