//! Entity lookups supplied by the host application.
//!
//! Conversion needs to answer questions the message itself cannot: which
//! Slack user a Matrix ID is puppeted as, whether the sender may ping a whole
//! room, where an `mxc://` upload lives over HTTP. The converters only see
//! these two traits; how the answers are found (database, API call, static
//! table) is the host's business.
//!
//! A lookup returning `Ok(None)` means "not found" and the converters fall
//! back to a literal rendering. A lookup returning `Err` aborts the whole
//! conversion.

use crate::error::LookupResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A resolved entity: the identifier on the *other* platform plus a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityReference {
    pub id: String,
    pub display_name: String,
}

impl EntityReference {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

/// Glyph for a standard (gemoji) shortcode.
pub fn standard_emoji(name: &str) -> Option<String> {
    emojis::get_by_shortcode(name).map(|emoji| emoji.as_str().to_string())
}

/// Lookups used when converting Matrix messages into Slack messages.
#[async_trait]
pub trait InboundResolver: Send + Sync {
    /// Whether the sender may notify the whole room (`@room` becomes `<!channel>`).
    async fn can_broadcast_to_room(&self) -> LookupResult<bool>;

    /// Map a Matrix user ID (`@alice:example.org`) to a Slack user.
    async fn resolve_user(&self, matrix_id: &str) -> LookupResult<Option<EntityReference>>;

    /// Map a Matrix room alias or ID (`#room:example.org`) to a Slack channel.
    async fn resolve_channel(&self, matrix_id: &str) -> LookupResult<Option<EntityReference>>;

    /// Turn a media locator (`mxc://server/id`) into a URL Slack clients can open.
    fn media_to_remote_url(&self, locator: &str) -> String;
}

/// Lookups used when converting Slack messages into Matrix messages.
///
/// The returned [`EntityReference::id`] is the Matrix identifier to link to.
/// An empty id means "known, but nothing to link": only the name is rendered.
#[async_trait]
pub trait OutboundResolver: Send + Sync {
    async fn resolve_user(&self, slack_id: &str) -> LookupResult<Option<EntityReference>>;

    async fn resolve_channel(&self, slack_id: &str) -> LookupResult<Option<EntityReference>>;

    async fn resolve_usergroup(&self, slack_id: &str) -> LookupResult<Option<EntityReference>>;

    async fn resolve_team(&self, slack_id: &str) -> LookupResult<Option<EntityReference>>;

    /// Map a Slack-hosted image URL to a Matrix media locator.
    async fn media_to_locator(&self, url: &str) -> LookupResult<Option<String>>;

    /// Glyph for a Slack emoji short name (`thumbsup` -> `👍`), if known.
    ///
    /// Defaults to the standard shortcode table. Hosts with custom workspace
    /// emoji override this and fall back to [`standard_emoji`].
    fn emoji_glyph(&self, name: &str) -> Option<String> {
        standard_emoji(name)
    }
}
