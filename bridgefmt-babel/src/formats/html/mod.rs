//! Matrix HTML → Slack conversion
//!
//! # Library Choice
//!
//! `formatted_body` is parsed with `html5ever` into a `markup5ever_rcdom`
//! tree, the same browser-grade parser used for any HTML coming from Matrix
//! clients. It copes with the unbalanced and loosely nested markup clients
//! actually send.
//!
//! # Element Mapping Table
//!
//! | Matrix HTML                      | mrkdwn text                 | Blocks                                 |
//! |----------------------------------|-----------------------------|----------------------------------------|
//! | `<strong>`, `<b>`                | `*x*`                       | leaves styled bold                     |
//! | `<em>`, `<i>`                    | `_x_`                       | leaves styled italic                   |
//! | `<del>`, `<s>`, `<strike>`       | `~x~`                       | leaves styled strike                   |
//! | `<code>`                         | `` `x` `` (raw)             | text styled code                       |
//! | `<pre>`                          | ```` ```x``` ````           | `rich_text_preformatted`               |
//! | `<a href=matrix.to/#/@u>`        | `<@U>`                      | `user`                                 |
//! | `<a href=matrix.to/#/#r>`        | `<#C>`                      | `channel`                              |
//! | `<a href=url>label</a>`          | `<url\|label>`              | `link`                                 |
//! | `<img src alt>`                  | `<http-url\|alt>`           | `link`                                 |
//! | `<br>`                           | newline                     | text `"\n"`                            |
//! | `<blockquote>`                   | `> ` per line               | `rich_text_quote`                      |
//! | `<ul>`, `<ol>` (top level)       | marker lines, blank framed  | `rich_text_list`                       |
//! | `<ul>`, `<ol>` (nested)          | indented marker lines       | marker text blocks in the parent item  |
//! | `<h1>`..`<h6>`                   | `*# x*`                     | bold marker + children + newline       |
//! | `<span data-mx-spoiler>`         | `(Spoiler: x)`              | text around children                   |
//! | `<mx-reply>`                     | dropped                     | dropped                                |
//! | `<hr>`                           | divider line                | `divider`                              |
//! | anything else                    | children                    | children                               |

pub mod highlight;
pub mod parser;
pub mod walker;

use crate::common::cleanup::clean_blocks;
use crate::common::escape::unescape_entities;
use crate::error::Result;
use crate::ir::message::{MatrixMessage, SlackMessage};
use crate::ir::nodes::{ContentBlock, WalkResult};
use crate::lookup::InboundResolver;
use crate::options::InboundOptions;
use tracing::debug;
use walker::{MatrixWalker, WalkOutput};

/// Converts Matrix message content into Slack messages.
#[derive(Debug, Clone, Default)]
pub struct MatrixMessageParser {
    options: InboundOptions,
}

impl MatrixMessageParser {
    pub fn new(options: InboundOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &InboundOptions {
        &self.options
    }

    /// Convert one message. Any lookup failure aborts the conversion.
    pub async fn format_message(
        &self,
        resolver: &dyn InboundResolver,
        message: &MatrixMessage,
    ) -> Result<SlackMessage> {
        let walked = match message.formatted_body.as_deref() {
            Some(html) if !html.is_empty() => self.format_html(resolver, html).await?,
            _ => {
                debug!("no formatted body, escaping plain body");
                self.format_plain(resolver, &message.body).await?
            }
        };

        let mut slack = SlackMessage::from_text(walked.text);
        slack.blocks = Some(vec![ContentBlock::RichText {
            elements: clean_blocks(walked.blocks, true),
        }]);
        Ok(slack)
    }

    /// Walk a `formatted_body` fragment. Trailing whitespace is trimmed from
    /// the text; blocks are returned uncleaned.
    pub async fn format_html(
        &self,
        resolver: &dyn InboundResolver,
        html: &str,
    ) -> Result<WalkResult> {
        let root = parser::parse_fragment(html)?;
        let walker = MatrixWalker::new(resolver, &self.options);
        let mut walked = walker.walk(&root).await?;
        walked.text.truncate(walked.text.trim_end().len());
        Ok(walked)
    }

    /// Escape a plain `body`.
    pub async fn format_plain(
        &self,
        resolver: &dyn InboundResolver,
        body: &str,
    ) -> Result<WalkResult> {
        let walker = MatrixWalker::new(resolver, &self.options);
        let mut out = WalkOutput::new();
        walker
            .escape_text(&unescape_entities(body), None, &mut out)
            .await?;
        Ok(out.finish())
    }
}
