//! Shared configuration loader for the bridgefmt toolchain.
//!
//! `defaults/bridgefmt.default.toml` is embedded into every binary so that docs
//! and runtime behavior stay in sync. Applications layer user-specific files on
//! top of those defaults via [`Loader`] before deserializing into [`BridgeConfig`].

use bridgefmt_babel::options::{InboundOptions, OutboundOptions};
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::Path;

const DEFAULT_TOML: &str = include_str!("../defaults/bridgefmt.default.toml");

/// Top-level configuration consumed by bridgefmt applications.
#[derive(Debug, Clone, Deserialize)]
pub struct BridgeConfig {
    pub inbound: InboundConfig,
    pub outbound: OutboundConfig,
    pub lookup: LookupConfig,
}

/// Matrix → Slack knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct InboundConfig {
    pub mention_prefix: String,
    pub room_keyword: String,
    pub bullets: Vec<String>,
    pub divider: String,
    pub indent: String,
}

impl From<InboundConfig> for InboundOptions {
    fn from(config: InboundConfig) -> Self {
        InboundOptions {
            mention_prefix: config.mention_prefix,
            room_keyword: config.room_keyword,
            bullets: config.bullets,
            divider: config.divider,
            indent: config.indent,
        }
    }
}

/// Slack → Matrix knobs.
#[derive(Debug, Clone, Deserialize)]
pub struct OutboundConfig {
    pub mention_prefix: String,
    pub room_mention: String,
    pub emoji_size: u32,
    pub emoji_suffix: String,
}

impl From<OutboundConfig> for OutboundOptions {
    fn from(config: OutboundConfig) -> Self {
        OutboundOptions {
            mention_prefix: config.mention_prefix,
            room_mention: config.room_mention,
            emoji_size: config.emoji_size,
            emoji_suffix: config.emoji_suffix,
        }
    }
}

/// Static lookup tables.
///
/// Tables are lists rather than maps so that Slack's upper case IDs survive
/// key normalization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LookupConfig {
    #[serde(default)]
    pub can_notify_room: bool,
    #[serde(default)]
    pub media_base: String,
    #[serde(default)]
    pub users: Vec<EntityEntry>,
    #[serde(default)]
    pub rooms: Vec<EntityEntry>,
    #[serde(default)]
    pub usergroups: Vec<EntityEntry>,
    #[serde(default)]
    pub teams: Vec<EntityEntry>,
    #[serde(default)]
    pub media: Vec<MediaEntry>,
    #[serde(default)]
    pub emoji: Vec<EmojiEntry>,
}

/// One entity known on both sides. An empty `matrix_id` renders as a name
/// without a link.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityEntry {
    pub slack_id: String,
    #[serde(default)]
    pub matrix_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MediaEntry {
    pub url: String,
    pub mxc: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EmojiEntry {
    pub name: String,
    pub glyph: String,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<BridgeConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<BridgeConfig, ConfigError> {
    Loader::new().build()
}
