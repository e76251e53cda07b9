//! Legacy attachments, appended below the message body.
//!
//! Each attachment is rendered twice, once per output, with the same
//! field order: pretext, author, title, text, fields, image, footer.

use crate::common::escape::{escape_attr, escape_html};
use crate::error::Result;
use crate::formats::mrkdwn::compiler::MrkdwnMode;
use crate::formats::mrkdwn::SlackMarkdownParser;
use crate::ir::message::{Attachment, AttachmentField, Timestamp};
use chrono::{DateTime, Datelike, Utc};

pub const PLAIN_SEPARATOR: &str = "---------------------\n";
pub const HTML_SEPARATOR: &str = "<hr>";

/// The plain body and the HTML body being built side by side.
#[derive(Debug, Default)]
pub(crate) struct DualOutput {
    pub body: String,
    pub html: String,
}

impl DualOutput {
    fn push(&mut self, body: &str, html: &str) {
        self.body.push_str(body);
        self.html.push_str(html);
    }
}

pub(crate) struct AttachmentRenderer<'a> {
    markdown: &'a SlackMarkdownParser<'a>,
}

impl<'a> AttachmentRenderer<'a> {
    pub fn new(markdown: &'a SlackMarkdownParser<'a>) -> Self {
        Self { markdown }
    }

    pub async fn render_all(&self, attachments: &[Attachment], out: &mut DualOutput) -> Result<()> {
        if attachments.is_empty() {
            return Ok(());
        }
        if !out.body.is_empty() {
            out.push("\n", "<br>");
        }
        for attachment in attachments {
            if !out.body.is_empty() {
                out.push(PLAIN_SEPARATOR, HTML_SEPARATOR);
            }
            self.render(attachment, out).await?;
        }
        Ok(())
    }

    async fn render(&self, attachment: &Attachment, out: &mut DualOutput) -> Result<()> {
        out.html.push_str("<p>");

        if let Some(pretext) = non_empty(&attachment.pretext) {
            let (plain, html) = self.both(pretext).await?;
            out.push(&format!("{plain}\n"), &format!("{html}<br>"));
        }
        if non_empty(&attachment.author_name).is_some() {
            self.render_author(attachment, out).await?;
        }
        if let Some(title) = non_empty(&attachment.title) {
            match non_empty(&attachment.title_link) {
                Some(link) => out.push(
                    &format!("## [{title}]({link})\n"),
                    &format!(
                        "<strong><a href=\"{}\">{}</a></strong>",
                        escape_attr(link),
                        escape_html(title)
                    ),
                ),
                None => out.push(
                    &format!("## {title}\n"),
                    &format!("<strong>{}</strong>", escape_html(title)),
                ),
            }
        }
        if let Some(text) = non_empty(&attachment.text) {
            let (plain, html) = self.both(text).await?;
            out.push(&format!("{plain}\n"), &format!("{html}<br>"));
        }
        if !attachment.fields.is_empty() {
            self.render_fields(&attachment.fields, out).await?;
        }
        if let Some(url) = non_empty(&attachment.image_url) {
            out.push(
                &format!("Image: {url}\n"),
                &format!(
                    "Image: <a href=\"{}\">{}</a><br>",
                    escape_attr(url),
                    escape_html(url)
                ),
            );
        }
        self.render_footer(attachment, out).await?;

        out.html.push_str("</p>");
        Ok(())
    }

    async fn render_author(&self, attachment: &Attachment, out: &mut DualOutput) -> Result<()> {
        let resolver = self.markdown.resolver();
        let options = self.markdown.options();

        if let Some(icon) = non_empty(&attachment.author_icon) {
            if let Some(locator) = resolver.media_to_locator(icon).await? {
                out.html.push_str(&format!(
                    "<img height=\"{}\" src=\"{}\" /> ",
                    options.emoji_size,
                    escape_attr(&locator)
                ));
            }
        }

        let mut name = attachment.author_name.clone().unwrap_or_default();
        let mut link = non_empty(&attachment.author_link).map(str::to_string);
        if let Some(author_id) = non_empty(&attachment.author_id) {
            if let Some(author) = resolver.resolve_user(author_id).await? {
                name = author.display_name;
                if !author.id.is_empty() {
                    link = Some(format!("{}{}", options.mention_prefix, author.id));
                }
            }
        }

        match link {
            Some(link) => out.push(
                &format!("[{name}]({link})\n"),
                &format!(
                    "<a href=\"{}\">{}</a><br>",
                    escape_attr(&link),
                    escape_html(&name)
                ),
            ),
            None => out.push(&format!("{name}\n"), &format!("{}<br>", escape_html(&name))),
        }
        Ok(())
    }

    async fn render_fields(&self, fields: &[AttachmentField], out: &mut DualOutput) -> Result<()> {
        out.html.push_str("<table><tr>");
        for (i, field) in fields.iter().enumerate() {
            let (title_plain, title_html) = self.both(&field.title).await?;
            let (value_plain, value_html) = self.both(&field.value).await?;
            out.push(
                &format!("*{title_plain}*\n{value_plain}\n"),
                &format!("<td><strong>{title_html}</strong><br>{value_html}</td>"),
            );
            if i % 2 == 1 && i < fields.len() - 1 {
                out.html.push_str("</tr><tr>");
            }
        }
        out.html.push_str("</tr></table>");
        Ok(())
    }

    async fn render_footer(&self, attachment: &Attachment, out: &mut DualOutput) -> Result<()> {
        let mut plain_parts = Vec::new();
        let mut html_parts = Vec::new();

        if let Some(footer) = non_empty(&attachment.footer) {
            let (plain, html) = self.both(footer).await?;
            plain_parts.push(plain);
            html_parts.push(html);
        }
        if let Some(date) = attachment.ts.as_ref().and_then(format_timestamp) {
            html_parts.push(escape_html(&date).into_owned());
            plain_parts.push(date);
        }

        if !plain_parts.is_empty() {
            out.push(
                &format!("{}\n", plain_parts.join(" | ")),
                &format!("<sup>{}</sup><br>", html_parts.join(" | ")),
            );
        }
        Ok(())
    }

    async fn both(&self, text: &str) -> Result<(String, String)> {
        let plain = self.markdown.parse_markdown(text, MrkdwnMode::Plain).await?;
        let html = self.markdown.parse_markdown(text, MrkdwnMode::Markup).await?;
        Ok((plain, html))
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// `1st Jan 2020 at 13:05 UTC`
pub fn format_timestamp(ts: &Timestamp) -> Option<String> {
    let seconds = ts.as_seconds()?;
    if !seconds.is_finite() {
        return None;
    }
    let whole = seconds.floor();
    let nanos = ((seconds - whole) * 1e9) as u32;
    let date: DateTime<Utc> = DateTime::from_timestamp(whole as i64, nanos)?;
    Some(format!(
        "{}{} {}",
        date.day(),
        ordinal_suffix(date.day()),
        date.format("%b %Y at %-H:%M UTC")
    ))
}

fn ordinal_suffix(day: u32) -> &'static str {
    match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    }
}
