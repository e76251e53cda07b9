//! Format implementations
//!
//! One module per source format. Inbound conversion lives in [`html`];
//! outbound conversion is split between [`mrkdwn`] (text), [`blocks`]
//! (block trees) and [`slack`], which assembles whole messages.

pub mod blocks;
pub mod html;
pub mod mrkdwn;
pub mod slack;

pub use blocks::SlackBlocksParser;
pub use html::MatrixMessageParser;
pub use mrkdwn::SlackMarkdownParser;
pub use slack::SlackMessageParser;
