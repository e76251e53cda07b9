//! Knobs for both conversion directions.
//!
//! Defaults mirror `bridgefmt-config/defaults/bridgefmt.default.toml`; the
//! config crate converts its sections into these structs.

pub const MATRIX_TO_PREFIX: &str = "https://matrix.to/#/";

/// Options for Matrix → Slack conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundOptions {
    /// Link prefix identifying mention pills (`<a href="{prefix}@user:hs">`).
    pub mention_prefix: String,
    /// Keyword that notifies the whole room when the sender is allowed to.
    pub room_keyword: String,
    /// Bullet glyphs, cycled by list nesting depth.
    pub bullets: Vec<String>,
    /// Text line rendered for `<hr>`.
    pub divider: String,
    /// Indentation unit for nested list items.
    pub indent: String,
}

impl InboundOptions {
    pub fn bullet(&self, depth: usize) -> &str {
        if self.bullets.is_empty() {
            return "-";
        }
        &self.bullets[depth % self.bullets.len()]
    }
}

impl Default for InboundOptions {
    fn default() -> Self {
        Self {
            mention_prefix: MATRIX_TO_PREFIX.to_string(),
            room_keyword: "@room".to_string(),
            bullets: ["●", "○", "■", "‣"].iter().map(|s| s.to_string()).collect(),
            divider: "----------".to_string(),
            indent: "    ".to_string(),
        }
    }
}

/// Options for Slack → Matrix conversion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundOptions {
    /// Prefix prepended to Matrix IDs when building pill links.
    pub mention_prefix: String,
    /// Replacement for `<!here>`, `<!channel>` and `<!everyone>`.
    pub room_mention: String,
    /// Height of inline images (emoji-sized context images, author icons).
    pub emoji_size: u32,
    /// Second-chance suffix tried when an emoji name is unknown.
    pub emoji_suffix: String,
}

impl Default for OutboundOptions {
    fn default() -> Self {
        Self {
            mention_prefix: MATRIX_TO_PREFIX.to_string(),
            room_mention: "@room".to_string(),
            emoji_size: 32,
            emoji_suffix: "_face".to_string(),
        }
    }
}
