//! Intermediate representations shared by both conversion directions.
//!
//! - [`nodes`]: the Slack block tree, which is also the wire format.
//! - [`markup`]: an owned view of Matrix HTML, ready to be walked.
//! - [`message`]: the message envelopes on each side.

pub mod markup;
pub mod message;
pub mod nodes;
