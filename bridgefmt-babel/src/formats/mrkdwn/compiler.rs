//! A compact Slack mrkdwn compiler.
//!
//! # Markup mode
//!
//! - fenced code (```` ``` ````) becomes `<pre><code>`
//! - lines starting with `>` are grouped into one `<blockquote>`
//! - `` `code` ``, `*bold*`, `_italic_` and `~strike~` become inline tags
//! - remaining lines are joined with `<br>`; all text is HTML escaped
//!
//! # Plain mode
//!
//! Formatting characters and newlines are left untouched and nothing is
//! escaped; only angle tokens are resolved.
//!
//! In both modes angle tokens (`<@U1|name>`, `<#C1>`, `<!here>`,
//! `<!subteam^S1>`, `<!date^...|fallback>`, `<url|label>`) are handed to
//! [`MrkdwnCallbacks`], whose output is inserted verbatim. Tokens that are
//! none of these stay literal text.

use crate::common::escape::{escape_attr, escape_html};
use crate::ir::nodes::BroadcastRange;

/// Separator used by deferred mention placeholders; stripped from input.
pub const PLACEHOLDER_FLAG: char = '\u{1}';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MrkdwnMode {
    /// HTML output.
    Markup,
    /// Plain text output, formatting left as typed.
    Plain,
}

/// Substitution hooks for special angle tokens. `name` is the label after
/// `|`, if the token had one.
pub trait MrkdwnCallbacks {
    fn user(&self, id: &str, name: Option<&str>) -> String;
    fn channel(&self, id: &str, name: Option<&str>) -> String;
    fn usergroup(&self, id: &str, name: Option<&str>) -> String;
    fn broadcast(&self, range: BroadcastRange) -> String;
    fn date(&self, fallback: &str) -> String;
}

/// Compile `source` in the given mode.
pub fn compile(source: &str, mode: MrkdwnMode, callbacks: &dyn MrkdwnCallbacks) -> String {
    let source: String = source.chars().filter(|c| *c != PLACEHOLDER_FLAG).collect();
    match mode {
        MrkdwnMode::Plain => render_inline(&source, mode, callbacks),
        MrkdwnMode::Markup => compile_markup(&source, callbacks),
    }
}

enum Part {
    Line(String),
    Block(String),
}

fn compile_markup(source: &str, callbacks: &dyn MrkdwnCallbacks) -> String {
    let mut parts = Vec::new();
    let mut rest = source;

    loop {
        let fence = rest
            .find("```")
            .and_then(|open| rest[open + 3..].find("```").map(|len| (open, open + 3 + len)));
        let Some((open, close)) = fence else {
            push_lines(rest, callbacks, &mut parts);
            break;
        };

        let before = &rest[..open];
        push_lines(before.strip_suffix('\n').unwrap_or(before), callbacks, &mut parts);
        let code = &rest[open + 3..close];
        parts.push(Part::Block(format!("<pre><code>{}</code></pre>", escape_html(code))));
        let after = &rest[close + 3..];
        rest = after.strip_prefix('\n').unwrap_or(after);
    }

    let mut out = String::new();
    let mut previous_line = false;
    for part in parts {
        match part {
            Part::Line(line) => {
                if previous_line {
                    out.push_str("<br>");
                }
                out.push_str(&line);
                previous_line = true;
            }
            Part::Block(block) => {
                out.push_str(&block);
                previous_line = false;
            }
        }
    }
    out
}

fn push_lines(text: &str, callbacks: &dyn MrkdwnCallbacks, parts: &mut Vec<Part>) {
    if text.is_empty() {
        return;
    }
    let mut quoted: Vec<String> = Vec::new();
    for line in text.split('\n') {
        if let Some(inner) = quote_body(line) {
            quoted.push(render_inline(inner, MrkdwnMode::Markup, callbacks));
            continue;
        }
        flush_quote(&mut quoted, parts);
        parts.push(Part::Line(render_inline(line, MrkdwnMode::Markup, callbacks)));
    }
    flush_quote(&mut quoted, parts);
}

fn flush_quote(quoted: &mut Vec<String>, parts: &mut Vec<Part>) {
    if !quoted.is_empty() {
        let body = std::mem::take(quoted).join("<br>");
        parts.push(Part::Block(format!("<blockquote>{body}</blockquote>")));
    }
}

fn quote_body(line: &str) -> Option<&str> {
    let rest = line
        .strip_prefix("&gt;")
        .or_else(|| line.strip_prefix('>'))?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

fn render_inline(text: &str, mode: MrkdwnMode, callbacks: &dyn MrkdwnCallbacks) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '<' {
            if let Some(end) = find_from(&chars, i + 1, '>') {
                let token: String = chars[i + 1..end].iter().collect();
                if let Some(rendered) = render_token(&token, mode, callbacks) {
                    out.push_str(&rendered);
                    i = end + 1;
                    continue;
                }
            }
        }
        if mode == MrkdwnMode::Markup {
            if c == '`' {
                if let Some(end) = find_from(&chars, i + 1, '`').filter(|end| *end > i + 1) {
                    let code: String = chars[i + 1..end].iter().collect();
                    out.push_str("<code>");
                    out.push_str(&escape_html(&code));
                    out.push_str("</code>");
                    i = end + 1;
                    continue;
                }
            }
            if let Some(tag) = style_tag(c) {
                if let Some(end) = find_closing(&chars, i) {
                    let inner: String = chars[i + 1..end].iter().collect();
                    out.push_str(&format!(
                        "<{tag}>{}</{tag}>",
                        render_inline(&inner, mode, callbacks)
                    ));
                    i = end + 1;
                    continue;
                }
            }
            let mut buf = [0u8; 4];
            out.push_str(&escape_html(c.encode_utf8(&mut buf)));
        } else {
            out.push(c);
        }
        i += 1;
    }
    out
}

fn style_tag(c: char) -> Option<&'static str> {
    match c {
        '*' => Some("strong"),
        '_' => Some("em"),
        '~' => Some("del"),
        _ => None,
    }
}

fn find_from(chars: &[char], start: usize, needle: char) -> Option<usize> {
    chars
        .get(start..)?
        .iter()
        .position(|c| *c == needle)
        .map(|offset| start + offset)
}

/// Closing delimiter for the style marker at `open`, following Slack's
/// rules: the opener is not glued to a preceding word, content does not
/// start or end with whitespace, the closer is not glued to a following word.
fn find_closing(chars: &[char], open: usize) -> Option<usize> {
    let marker = chars[open];
    if open > 0 && chars[open - 1].is_alphanumeric() {
        return None;
    }
    if chars.get(open + 1).map_or(true, |c| c.is_whitespace() || *c == marker) {
        return None;
    }
    (open + 2..chars.len()).find(|&j| {
        chars[j] == marker
            && !chars[j - 1].is_whitespace()
            && chars.get(j + 1).map_or(true, |c| !c.is_alphanumeric())
    })
}

fn render_token(token: &str, mode: MrkdwnMode, callbacks: &dyn MrkdwnCallbacks) -> Option<String> {
    let (target, label) = match token.split_once('|') {
        Some((target, label)) => (target, Some(label)),
        None => (token, None),
    };

    if let Some(id) = target.strip_prefix('@') {
        return is_entity_id(id).then(|| callbacks.user(id, label));
    }
    if let Some(id) = target.strip_prefix('#') {
        return is_entity_id(id).then(|| callbacks.channel(id, label));
    }
    if let Some(command) = target.strip_prefix('!') {
        return match command {
            "here" => Some(callbacks.broadcast(BroadcastRange::Here)),
            "channel" => Some(callbacks.broadcast(BroadcastRange::Channel)),
            "everyone" => Some(callbacks.broadcast(BroadcastRange::Everyone)),
            _ => {
                if let Some(id) = command.strip_prefix("subteam^") {
                    is_entity_id(id).then(|| callbacks.usergroup(id, label))
                } else if command.starts_with("date^") {
                    Some(callbacks.date(label.unwrap_or_default()))
                } else {
                    None
                }
            }
        };
    }
    if is_url(target) {
        return Some(render_link(target, label, mode));
    }
    None
}

fn render_link(url: &str, label: Option<&str>, mode: MrkdwnMode) -> String {
    let label = label.filter(|l| !l.is_empty());
    match mode {
        MrkdwnMode::Markup => format!(
            "<a href=\"{}\">{}</a>",
            escape_attr(url),
            escape_html(label.unwrap_or(url))
        ),
        MrkdwnMode::Plain => match label {
            Some(label) if label != url => format!("{label} ({url})"),
            _ => url.to_string(),
        },
    }
}

fn is_entity_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

fn is_url(target: &str) -> bool {
    target.contains("://") || target.starts_with("mailto:")
}
