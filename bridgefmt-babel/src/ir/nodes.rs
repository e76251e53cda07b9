//! Core data structures for the Slack block model.
//!
//! Serde names follow the Slack wire format (`"type": "rich_text_section"` and
//! so on), so a [`ContentBlock`] tree deserializes straight out of an event
//! payload and serializes back into something Slack accepts.

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

fn is_false(value: &bool) -> bool {
    !*value
}

/// Inline style flags carried by leaf blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    #[serde(default, skip_serializing_if = "is_false")]
    pub bold: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub italic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub strike: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub code: bool,
}

impl Style {
    pub const BOLD: Style = Style {
        bold: true,
        italic: false,
        strike: false,
        code: false,
    };

    pub fn is_plain(&self) -> bool {
        !(self.bold || self.italic || self.strike || self.code)
    }

    /// `None` for a plain style, so that unstyled blocks compare equal
    /// whether or not the style key was present on the wire.
    pub fn normalized(style: Option<Style>) -> Option<Style> {
        style.filter(|s| !s.is_plain())
    }

    pub fn has(&self, flag: StyleFlag) -> bool {
        match flag {
            StyleFlag::Bold => self.bold,
            StyleFlag::Italic => self.italic,
            StyleFlag::Strike => self.strike,
            StyleFlag::Code => self.code,
        }
    }
}

/// One inline style, in the canonical opening order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleFlag {
    Bold,
    Italic,
    Strike,
    Code,
}

impl StyleFlag {
    pub const ALL: [StyleFlag; 4] = [
        StyleFlag::Bold,
        StyleFlag::Italic,
        StyleFlag::Strike,
        StyleFlag::Code,
    ];

    /// mrkdwn delimiter for this style.
    pub fn marker(self) -> char {
        match self {
            StyleFlag::Bold => '*',
            StyleFlag::Italic => '_',
            StyleFlag::Strike => '~',
            StyleFlag::Code => '`',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListStyle {
    Bullet,
    Ordered,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BroadcastRange {
    Here,
    Channel,
    Everyone,
}

impl BroadcastRange {
    pub fn as_str(self) -> &'static str {
        match self {
            BroadcastRange::Here => "here",
            BroadcastRange::Channel => "channel",
            BroadcastRange::Everyone => "everyone",
        }
    }
}

/// Text object used by layout blocks (`section` text and fields, `context`
/// elements, image titles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutElement {
    PlainText {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        emoji: Option<bool>,
    },
    Mrkdwn {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        verbatim: Option<bool>,
    },
    Image {
        image_url: String,
        #[serde(default)]
        alt_text: String,
    },
    #[serde(other)]
    Unsupported,
}

/// Wire names of the block kinds [`ContentBlock`] models.
const KNOWN_KINDS: [&str; 19] = [
    "rich_text",
    "rich_text_section",
    "rich_text_preformatted",
    "rich_text_quote",
    "rich_text_list",
    "text",
    "link",
    "user",
    "channel",
    "usergroup",
    "team",
    "broadcast",
    "emoji",
    "date",
    "color",
    "divider",
    "section",
    "context",
    "image",
];

/// A node of the Slack block tree.
///
/// Containers (`RichText`, `Section`, `Preformatted`, `Quote`, `List`) hold
/// further blocks; everything else is a leaf. Inline leaves carry an optional
/// [`Style`].
///
/// The derived serde code is generated as inherent functions
/// (`remote = "Self"`); the trait impls below wrap it so that unknown kinds
/// keep their wire name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(remote = "Self", tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    RichText {
        #[serde(default)]
        elements: Vec<ContentBlock>,
    },
    #[serde(rename = "rich_text_section")]
    Section {
        #[serde(default)]
        elements: Vec<ContentBlock>,
    },
    #[serde(rename = "rich_text_preformatted")]
    Preformatted {
        #[serde(default)]
        elements: Vec<ContentBlock>,
    },
    #[serde(rename = "rich_text_quote")]
    Quote {
        #[serde(default)]
        elements: Vec<ContentBlock>,
    },
    #[serde(rename = "rich_text_list")]
    List {
        #[serde(default)]
        elements: Vec<ContentBlock>,
        style: ListStyle,
        #[serde(default)]
        indent: u32,
        /// Zero-based offset of the first item of an ordered list.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<u32>,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
    },
    Link {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
    },
    User {
        user_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
    },
    Channel {
        channel_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
    },
    Usergroup {
        usergroup_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
    },
    Team {
        team_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
    },
    Broadcast {
        range: BroadcastRange,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
    },
    Emoji {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        skin_tone: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        style: Option<Style>,
    },
    Date {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallback: Option<String>,
    },
    Color {
        value: String,
    },
    Divider,
    /// Layout `section` block with mrkdwn/plain text and optional fields.
    #[serde(rename = "section")]
    LayoutSection {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<LayoutElement>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fields: Option<Vec<LayoutElement>>,
    },
    Context {
        #[serde(default)]
        elements: Vec<LayoutElement>,
    },
    Image {
        image_url: String,
        #[serde(default)]
        alt_text: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        title: Option<LayoutElement>,
    },
    /// Any block kind this crate does not know about, by its wire name.
    #[serde(skip)]
    Unsupported { kind: String },
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        match value.get("type").and_then(Value::as_str) {
            Some(kind) if !KNOWN_KINDS.contains(&kind) => Ok(ContentBlock::Unsupported {
                kind: kind.to_string(),
            }),
            _ => ContentBlock::deserialize(value).map_err(D::Error::custom),
        }
    }
}

impl Serialize for ContentBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ContentBlock::Unsupported { kind } => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("type", kind)?;
                map.end()
            }
            block => ContentBlock::serialize(block, serializer),
        }
    }
}

impl ContentBlock {
    pub fn text(text: impl Into<String>, style: Option<Style>) -> Self {
        ContentBlock::Text {
            text: text.into(),
            style: Style::normalized(style),
        }
    }

    pub fn section(elements: Vec<ContentBlock>) -> Self {
        ContentBlock::Section { elements }
    }

    /// Containers are the block kinds that may appear directly inside a
    /// `rich_text` block and hold inline content.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            ContentBlock::Section { .. }
                | ContentBlock::Preformatted { .. }
                | ContentBlock::Quote { .. }
                | ContentBlock::List { .. }
        )
    }

    /// Style of an inline leaf. `None` for containers and block-level leaves
    /// (divider, layout blocks), which never sit inside a style run.
    pub fn inline_style(&self) -> Option<Style> {
        match self {
            ContentBlock::Text { style, .. }
            | ContentBlock::Link { style, .. }
            | ContentBlock::User { style, .. }
            | ContentBlock::Channel { style, .. }
            | ContentBlock::Usergroup { style, .. }
            | ContentBlock::Team { style, .. }
            | ContentBlock::Broadcast { style, .. }
            | ContentBlock::Emoji { style, .. } => Some(style.unwrap_or_default()),
            ContentBlock::Date { .. } | ContentBlock::Color { .. } => Some(Style::default()),
            _ => None,
        }
    }
}

/// Output of the Matrix HTML walker: the mrkdwn rendering and the block
/// rendering of the same subtree, built in lockstep.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalkResult {
    pub text: String,
    pub blocks: Vec<ContentBlock>,
}

impl WalkResult {
    pub fn new(text: impl Into<String>, blocks: Vec<ContentBlock>) -> Self {
        Self {
            text: text.into(),
            blocks,
        }
    }
}
