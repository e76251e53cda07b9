//! Matrix → Slack conversion tests.

mod blocks;
mod inline;
