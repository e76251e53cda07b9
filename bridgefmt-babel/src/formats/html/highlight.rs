//! Escape and highlight step for raw text.
//!
//! Text is processed word by word, with whitespace runs copied through
//! verbatim:
//!
//! - text is emitted as text blocks; the walk output fences reserved mrkdwn
//!   characters when it renders them
//! - a word containing `http://` or `https://` is cut at the scheme; the tail
//!   becomes an unescaped `link` block
//! - a standalone room keyword becomes `<!channel>` and a `broadcast` block,
//!   but only if the sender may notify the room

use super::walker::{MatrixWalker, WalkOutput};
use crate::common::escape::{keyword_positions, split_words, Piece, URL_START};
use crate::error::Result;
use crate::ir::nodes::{BroadcastRange, ContentBlock, Style};
use tracing::debug;

impl MatrixWalker<'_> {
    pub(crate) async fn escape_text(
        &self,
        raw: &str,
        style: Option<Style>,
        out: &mut WalkOutput,
    ) -> Result<()> {
        let mut run = String::new();
        let mut may_broadcast = None;

        for piece in split_words(raw) {
            let word = match piece {
                Piece::Space(space) => {
                    run.push_str(space);
                    continue;
                }
                Piece::Word(word) => word,
            };

            let (head, url) = match URL_START.find(word) {
                Some(found) => (&word[..found.start()], Some(&word[found.start()..])),
                None => (word, None),
            };
            self.highlight_word(head, style, &mut may_broadcast, &mut run, out)
                .await?;

            if let Some(url) = url {
                flush_run(&mut run, style, out);
                out.inline(ContentBlock::Link {
                    url: url.to_string(),
                    text: None,
                    style,
                });
            }
        }

        flush_run(&mut run, style, out);
        Ok(())
    }

    async fn highlight_word(
        &self,
        word: &str,
        style: Option<Style>,
        may_broadcast: &mut Option<bool>,
        run: &mut String,
        out: &mut WalkOutput,
    ) -> Result<()> {
        let keyword = self.options.room_keyword.as_str();
        let mut consumed = 0;

        for position in keyword_positions(word, keyword) {
            if !self.may_broadcast(may_broadcast).await? {
                debug!("room notification not permitted, keeping keyword as text");
                break;
            }
            run.push_str(&word[consumed..position]);
            flush_run(run, style, out);
            out.inline(ContentBlock::Broadcast {
                range: BroadcastRange::Channel,
                style,
            });
            consumed = position + keyword.len();
        }

        run.push_str(&word[consumed..]);
        Ok(())
    }

    /// Asks the resolver once per text span.
    async fn may_broadcast(&self, cached: &mut Option<bool>) -> Result<bool> {
        if let Some(allowed) = *cached {
            return Ok(allowed);
        }
        let allowed = self.resolver.can_broadcast_to_room().await?;
        *cached = Some(allowed);
        Ok(allowed)
    }
}

/// Emits the pending text run as a text block, if it holds anything.
fn flush_run(run: &mut String, style: Option<Style>, out: &mut WalkOutput) {
    if !run.is_empty() {
        out.inline(ContentBlock::text(std::mem::take(run), style));
    }
}
