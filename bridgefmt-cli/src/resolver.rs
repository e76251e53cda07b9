//! Resolver backed by the `[lookup]` tables of the configuration.
//!
//! A bridge answers lookups from its own store. The command line has no
//! store, so both directions are served from the same static lists.

use async_trait::async_trait;
use bridgefmt_babel::{
    standard_emoji, EntityReference, InboundResolver, LookupResult, OutboundResolver,
};
use bridgefmt_config::{EntityEntry, LookupConfig};
use tracing::trace;

const MXC_SCHEME: &str = "mxc://";

#[derive(Debug, Clone, Default)]
pub struct StaticResolver {
    lookup: LookupConfig,
}

impl StaticResolver {
    pub fn new(lookup: LookupConfig) -> Self {
        Self { lookup }
    }
}

/// Matrix id → Slack id.
fn by_matrix_id(entries: &[EntityEntry], matrix_id: &str) -> Option<EntityReference> {
    entries
        .iter()
        .find(|e| !e.matrix_id.is_empty() && e.matrix_id == matrix_id)
        .map(|e| EntityReference::new(&e.slack_id, &e.name))
}

/// Slack id → Matrix id.
fn by_slack_id(entries: &[EntityEntry], slack_id: &str) -> Option<EntityReference> {
    entries
        .iter()
        .find(|e| e.slack_id == slack_id)
        .map(|e| EntityReference::new(&e.matrix_id, &e.name))
}

#[async_trait]
impl InboundResolver for StaticResolver {
    async fn can_broadcast_to_room(&self) -> LookupResult<bool> {
        Ok(self.lookup.can_notify_room)
    }

    async fn resolve_user(&self, matrix_id: &str) -> LookupResult<Option<EntityReference>> {
        trace!(matrix_id, "inbound user lookup");
        Ok(by_matrix_id(&self.lookup.users, matrix_id))
    }

    async fn resolve_channel(&self, matrix_id: &str) -> LookupResult<Option<EntityReference>> {
        trace!(matrix_id, "inbound room lookup");
        Ok(by_matrix_id(&self.lookup.rooms, matrix_id))
    }

    fn media_to_remote_url(&self, locator: &str) -> String {
        match locator.strip_prefix(MXC_SCHEME) {
            Some(rest) if !self.lookup.media_base.is_empty() => {
                format!("{}{rest}", self.lookup.media_base)
            }
            _ => locator.to_string(),
        }
    }
}

#[async_trait]
impl OutboundResolver for StaticResolver {
    async fn resolve_user(&self, slack_id: &str) -> LookupResult<Option<EntityReference>> {
        Ok(by_slack_id(&self.lookup.users, slack_id))
    }

    async fn resolve_channel(&self, slack_id: &str) -> LookupResult<Option<EntityReference>> {
        Ok(by_slack_id(&self.lookup.rooms, slack_id))
    }

    async fn resolve_usergroup(&self, slack_id: &str) -> LookupResult<Option<EntityReference>> {
        Ok(by_slack_id(&self.lookup.usergroups, slack_id))
    }

    async fn resolve_team(&self, slack_id: &str) -> LookupResult<Option<EntityReference>> {
        Ok(by_slack_id(&self.lookup.teams, slack_id))
    }

    async fn media_to_locator(&self, url: &str) -> LookupResult<Option<String>> {
        Ok(self
            .lookup
            .media
            .iter()
            .find(|m| m.url == url)
            .map(|m| m.mxc.clone()))
    }

    fn emoji_glyph(&self, name: &str) -> Option<String> {
        self.lookup
            .emoji
            .iter()
            .find(|e| e.name == name)
            .map(|e| e.glyph.clone())
            .or_else(|| standard_emoji(name))
    }
}
