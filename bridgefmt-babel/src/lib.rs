//! Rich text conversion between Matrix and Slack messages
//!
//!     This crate converts message content for a Matrix ↔ Slack bridge. Matrix carries HTML
//!     (`formatted_body`), Slack carries two parallel renditions: mrkdwn text and a tree of rich
//!     text blocks. Both directions are covered:
//!
//!         - Inbound (Matrix → Slack): HTML is walked once, producing the mrkdwn text and the block
//!           tree together, see ./formats/html/mod.rs.
//!         - Outbound (Slack → Matrix): the block tree (or the mrkdwn text when there are no blocks)
//!           is rendered to HTML, the text to a plain body, see ./formats/slack/mod.rs.
//!
//!     This is a pure lib, that is, it powers the bridgefmt cli but is shell agnostic: no code
//!     should be written that supposes a shell environment, be it std print, env vars etc.
//!
//! Architecture
//!
//!     Mentions, room notifications and media all need answers only the host knows (which Slack
//!     user puppets a Matrix user, whether the sender may ping the room). These come in through
//!     the async resolver traits in ./lookup.rs; the converters never store anything.
//!
//!     The file structure :
//!     .
//!     ├── error.rs
//!     ├── lookup.rs               # Resolver traits the host implements
//!     ├── options.rs              # Knobs for both directions
//!     ├── formats
//!     │   ├── html                # Matrix HTML → mrkdwn + blocks
//!     │   ├── mrkdwn              # mrkdwn → HTML / plain text
//!     │   ├── blocks              # block tree → HTML
//!     │   └── slack               # Slack message → Matrix message
//!     ├── ir                      # Block tree, HTML view, envelopes
//!     └── common                  # Escaping, block cleanup, flattening
//!
//! Testing
//!     tests
//!     ├── matrix                  # inbound
//!     └── slack                   # outbound
//!
//!     Note that rust does not by default discover tests in subdirectories, so we need to include these
//!     in the mod.
//!
//! Core Algorithms
//!
//!     The hard part is inbound: one recursive walk has to emit two outputs that say the same
//!     thing. The text is what older Slack clients and notifications show; the blocks are what
//!     modern clients render. The walker never writes style markers itself: every block it emits is
//!     rendered by the same writer that ./common/flatten.rs uses to turn blocks back into text,
//!     so the two cannot drift apart.
//!
//!     Walk output is noisy (one text block per span), so ./common/cleanup.rs merges adjacent
//!     text and regroups inline runs into sections before the blocks leave the crate.
//!
//! Library Choices
//!
//!     HTML is parsed with html5ever, entities are handled by html-escape. No crate parses Slack
//!     mrkdwn, so a small compiler lives in ./formats/mrkdwn/compiler.rs.
//!
pub mod error;
pub mod formats;
pub mod lookup;
pub mod options;

pub mod common;
pub mod ir;

pub use error::{ConvertError, LookupError, LookupResult, Result};
pub use formats::{MatrixMessageParser, SlackBlocksParser, SlackMarkdownParser, SlackMessageParser};
pub use ir::message::{MatrixMessage, SlackMessage};
pub use ir::nodes::{ContentBlock, Style};
pub use lookup::{standard_emoji, EntityReference, InboundResolver, OutboundResolver};
pub use options::{InboundOptions, OutboundOptions};

/// Renders a block tree back to mrkdwn text.
///
/// For blocks produced by [`MatrixMessageParser`] this reproduces the text
/// produced alongside them, up to trailing whitespace.
pub fn flatten_blocks(blocks: &[ContentBlock], options: &InboundOptions) -> String {
    common::flatten::flatten(blocks, options)
}
