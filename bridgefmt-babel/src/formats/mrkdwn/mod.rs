//! Slack mrkdwn → Matrix HTML / plain text
//!
//! Mentions need async lookups but the compiler is synchronous, so
//! conversion runs in two phases:
//!
//! 1. Compile with callbacks that emit a placeholder per mention:
//!    `\x01user\x01U123\x01fallback name\x01` (also `chan`, `usergroup`).
//! 2. For each kind in turn, repeatedly take the first placeholder, resolve
//!    it and replace that exact literal until none is left. Replacements
//!    never contain `\x01`, so every round removes one placeholder.

pub mod compiler;

use crate::common::escape::{escape_attr, escape_html};
use crate::error::Result;
use crate::ir::nodes::BroadcastRange;
use crate::lookup::{EntityReference, OutboundResolver};
use crate::options::OutboundOptions;
use compiler::{compile, MrkdwnCallbacks, MrkdwnMode, PLACEHOLDER_FLAG};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static USER_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| placeholder_pattern("user"));
static CHANNEL_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| placeholder_pattern("chan"));
static USERGROUP_PLACEHOLDER: Lazy<Regex> = Lazy::new(|| placeholder_pattern("usergroup"));

fn placeholder_pattern(kind: &str) -> Regex {
    Regex::new(&format!(r"\x01{kind}\x01([a-zA-Z0-9]*)\x01([^\x01]*)\x01"))
        .expect("placeholder pattern is valid")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PillKind {
    User,
    Channel,
    Usergroup,
}

impl PillKind {
    fn pattern(self) -> &'static Regex {
        match self {
            PillKind::User => &USER_PLACEHOLDER,
            PillKind::Channel => &CHANNEL_PLACEHOLDER,
            PillKind::Usergroup => &USERGROUP_PLACEHOLDER,
        }
    }

    fn tag(self) -> &'static str {
        match self {
            PillKind::User => "user",
            PillKind::Channel => "chan",
            PillKind::Usergroup => "usergroup",
        }
    }

    /// First placeholder of this kind: the whole token, the id, the name.
    fn next_placeholder(self, content: &str) -> Option<(String, String, String)> {
        let captures = self.pattern().captures(content)?;
        Some((
            captures[0].to_string(),
            captures[1].to_string(),
            captures[2].to_string(),
        ))
    }

    /// The mention as Slack wrote it, for when nothing better is known.
    fn literal(self, id: &str) -> String {
        match self {
            PillKind::User => format!("<@{id}>"),
            PillKind::Channel => format!("<#{id}>"),
            PillKind::Usergroup => format!("<!subteam^{id}>"),
        }
    }
}

struct PlaceholderCallbacks<'a> {
    mode: MrkdwnMode,
    room_mention: &'a str,
}

impl PlaceholderCallbacks<'_> {
    fn placeholder(&self, kind: PillKind, id: &str, name: Option<&str>) -> String {
        let f = PLACEHOLDER_FLAG;
        format!(
            "{f}{}{f}{id}{f}{}{f}",
            kind.tag(),
            name.unwrap_or_default()
        )
    }

    fn text(&self, text: &str) -> String {
        match self.mode {
            MrkdwnMode::Markup => escape_html(text).into_owned(),
            MrkdwnMode::Plain => text.to_string(),
        }
    }
}

impl MrkdwnCallbacks for PlaceholderCallbacks<'_> {
    fn user(&self, id: &str, name: Option<&str>) -> String {
        self.placeholder(PillKind::User, id, name)
    }

    fn channel(&self, id: &str, name: Option<&str>) -> String {
        self.placeholder(PillKind::Channel, id, name)
    }

    fn usergroup(&self, id: &str, name: Option<&str>) -> String {
        self.placeholder(PillKind::Usergroup, id, name)
    }

    fn broadcast(&self, _range: BroadcastRange) -> String {
        self.text(self.room_mention)
    }

    fn date(&self, fallback: &str) -> String {
        self.text(fallback)
    }
}

/// Turns mrkdwn into Matrix HTML or plain text, resolving mentions.
pub struct SlackMarkdownParser<'a> {
    resolver: &'a dyn OutboundResolver,
    options: &'a OutboundOptions,
}

impl<'a> SlackMarkdownParser<'a> {
    pub fn new(resolver: &'a dyn OutboundResolver, options: &'a OutboundOptions) -> Self {
        Self { resolver, options }
    }

    pub fn resolver(&self) -> &'a dyn OutboundResolver {
        self.resolver
    }

    pub fn options(&self) -> &'a OutboundOptions {
        self.options
    }

    pub async fn parse_markdown(&self, text: &str, mode: MrkdwnMode) -> Result<String> {
        let callbacks = PlaceholderCallbacks {
            mode,
            room_mention: &self.options.room_mention,
        };
        let mut content = compile(text, mode, &callbacks);
        for kind in [PillKind::User, PillKind::Channel, PillKind::Usergroup] {
            content = self.insert_pills(content, kind, mode).await?;
        }
        Ok(content)
    }

    async fn insert_pills(
        &self,
        mut content: String,
        kind: PillKind,
        mode: MrkdwnMode,
    ) -> Result<String> {
        while let Some((matched, id, name)) = kind.next_placeholder(&content) {
            let replacement = self.render_pill(kind, &id, &name, mode).await?;
            let replacement: String = replacement
                .chars()
                .filter(|c| *c != PLACEHOLDER_FLAG)
                .collect();
            content = content.replacen(&matched, &replacement, 1);
        }
        Ok(content)
    }

    async fn render_pill(
        &self,
        kind: PillKind,
        id: &str,
        name: &str,
        mode: MrkdwnMode,
    ) -> Result<String> {
        let entity = match kind {
            PillKind::User => self.resolver.resolve_user(id).await?,
            PillKind::Channel => self.resolver.resolve_channel(id).await?,
            PillKind::Usergroup => self.resolver.resolve_usergroup(id).await?,
        };
        let markup = mode == MrkdwnMode::Markup;

        if let Some(entity) = entity {
            return Ok(self.render_entity(kind, &entity, markup));
        }
        debug!(kind = kind.tag(), id, "mention did not resolve");

        if !name.is_empty() {
            let name = if markup {
                escape_html(name).into_owned()
            } else {
                name.to_string()
            };
            return Ok(match kind {
                PillKind::Channel => format!("#{name}"),
                _ => name,
            });
        }
        let literal = kind.literal(id);
        Ok(if markup {
            escape_html(&literal).into_owned()
        } else {
            literal
        })
    }

    fn render_entity(&self, kind: PillKind, entity: &EntityReference, markup: bool) -> String {
        let linkable = !entity.id.is_empty();
        match (markup, linkable) {
            (true, true) => self.pill_link(entity),
            (true, false) => escape_html(&entity.display_name).into_owned(),
            (false, _) if kind == PillKind::Channel => format!("#{}", entity.display_name),
            (false, _) => entity.display_name.clone(),
        }
    }

    /// `<a href="{prefix}{id}">{name}</a>`
    pub fn pill_link(&self, entity: &EntityReference) -> String {
        format!(
            "<a href=\"{}{}\">{}</a>",
            self.options.mention_prefix,
            escape_attr(&entity.id),
            escape_html(&entity.display_name)
        )
    }
}
