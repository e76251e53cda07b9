//! Text, styles, links and images.

use crate::common::{assert_consistent, body_to_slack, html_to_slack, rich_text, text, FakeResolver};
use bridgefmt_babel::{ContentBlock, Style};
use insta::assert_snapshot;

fn styled(value: &str, style: Style) -> ContentBlock {
    ContentBlock::text(value, Some(style))
}

fn section(elements: Vec<ContentBlock>) -> Vec<ContentBlock> {
    vec![ContentBlock::section(elements)]
}

const ITALIC: Style = Style {
    bold: false,
    italic: true,
    strike: false,
    code: false,
};

const CODE: Style = Style {
    bold: false,
    italic: false,
    strike: false,
    code: true,
};

const STRIKE: Style = Style {
    bold: false,
    italic: false,
    strike: true,
    code: false,
};

#[tokio::test]
async fn test_plain_body() {
    let ret = body_to_slack(&FakeResolver::new(), "Hello World!").await;
    assert_eq!(ret.text, "Hello World!");
    assert_eq!(rich_text(&ret), section(vec![text("Hello World!")]));
}

#[tokio::test]
async fn test_plain_body_escapes_mrkdwn() {
    let ret = body_to_slack(&FakeResolver::new(), "*hello* _world_ `how` ~are~ you?").await;
    assert_eq!(
        ret.text,
        "\u{FFF1}*\u{FFF1}hello\u{FFF1}*\u{FFF1} \u{FFF1}_\u{FFF1}world\u{FFF1}_\u{FFF1} \
         \u{FFF1}`\u{FFF1}how\u{FFF1}`\u{FFF1} \u{FFF1}~\u{FFF1}are\u{FFF1}~\u{FFF1} you?"
    );
    assert_eq!(
        rich_text(&ret),
        section(vec![text("*hello* _world_ `how` ~are~ you?")])
    );
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_plain_body_decodes_entities() {
    let ret = body_to_slack(&FakeResolver::new(), "fish &amp; chips &lt;3").await;
    assert_snapshot!(ret.text, @"fish & chips <3");
}

#[tokio::test]
async fn test_simple_html_styles() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<b>hello</b> <i>world</i> <code>how</code> <del>are</del> you?",
    )
    .await;
    assert_eq!(ret.text, "*hello* _world_ `how` ~are~ you?");
    assert_eq!(
        rich_text(&ret),
        section(vec![
            styled("hello", Style::BOLD),
            text(" "),
            styled("world", ITALIC),
            text(" "),
            styled("how", CODE),
            text(" "),
            styled("are", STRIKE),
            text(" you?"),
        ])
    );
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_style_aliases() {
    let ret = html_to_slack(&FakeResolver::new(), "<strong>a</strong> <em>b</em> <s>c</s>").await;
    assert_eq!(ret.text, "*a* _b_ ~c~");
}

#[tokio::test]
async fn test_nested_styles() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "Foxies are <strong><em>awesome</em></strong>",
    )
    .await;
    assert_eq!(ret.text, "Foxies are *_awesome_*");
    assert_eq!(
        rich_text(&ret),
        section(vec![
            text("Foxies are "),
            styled(
                "awesome",
                Style {
                    bold: true,
                    italic: true,
                    ..Style::default()
                }
            ),
        ])
    );
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_repeated_style_is_not_doubled() {
    let ret = html_to_slack(&FakeResolver::new(), "<b>a <strong>b</strong></b>").await;
    assert_eq!(ret.text, "*a b*");
    assert_eq!(rich_text(&ret), section(vec![styled("a b", Style::BOLD)]));
}

#[tokio::test]
async fn test_empty_style_emits_nothing() {
    let ret = html_to_slack(&FakeResolver::new(), "a<b></b>b").await;
    assert_eq!(ret.text, "ab");
}

#[tokio::test]
async fn test_unhandled_tags_keep_children() {
    let ret = html_to_slack(&FakeResolver::new(), "Where did the <u>fox</u> go?").await;
    assert_eq!(ret.text, "Where did the fox go?");
    assert_eq!(rich_text(&ret), section(vec![text("Where did the fox go?")]));
}

#[tokio::test]
async fn test_reserved_characters_in_html_are_fenced() {
    let ret = html_to_slack(&FakeResolver::new(), "snake_case <code>not_escaped</code>").await;
    assert_eq!(ret.text, "snake\u{FFF1}_\u{FFF1}case `not_escaped`");
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_linkify_bare_urls() {
    let ret = body_to_slack(&FakeResolver::new(), "Hey, did you hear of https://example.org").await;
    assert_eq!(ret.text, "Hey, did you hear of https://example.org");
    assert_eq!(
        rich_text(&ret),
        section(vec![
            text("Hey, did you hear of "),
            ContentBlock::Link {
                url: "https://example.org".into(),
                text: None,
                style: None,
            },
        ])
    );
}

#[tokio::test]
async fn test_link_only_message() {
    let ret = body_to_slack(&FakeResolver::new(), "https://example.org").await;
    assert_eq!(ret.text, "https://example.org");
    assert_eq!(
        rich_text(&ret),
        section(vec![ContentBlock::Link {
            url: "https://example.org".into(),
            text: None,
            style: None,
        }])
    );
}

#[tokio::test]
async fn test_url_glued_to_punctuation() {
    let ret = body_to_slack(&FakeResolver::new(), "(https://example.org/a_b)").await;
    assert_eq!(ret.text, "(https://example.org/a_b)");
    assert_eq!(
        rich_text(&ret),
        section(vec![
            text("("),
            ContentBlock::Link {
                url: "https://example.org/a_b)".into(),
                text: None,
                style: None,
            },
        ])
    );
}

#[tokio::test]
async fn test_labelled_link() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<a href=\"https://example.org\">link</a>",
    )
    .await;
    assert_eq!(ret.text, "<https://example.org|link>");
    assert_eq!(
        rich_text(&ret),
        section(vec![ContentBlock::Link {
            url: "https://example.org".into(),
            text: Some("link".into()),
            style: None,
        }])
    );
}

#[tokio::test]
async fn test_link_labelled_with_its_url() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<a href=\"https://example.org\">https://example.org</a>",
    )
    .await;
    assert_eq!(ret.text, "https://example.org");
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_anchor_without_href() {
    let ret = html_to_slack(&FakeResolver::new(), "<a name=\"top\">here</a>").await;
    assert_eq!(ret.text, "here");
}

#[tokio::test]
async fn test_images() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<img src=\"https://example.org/fox.png\" alt=\"fox\" />",
    )
    .await;
    assert_eq!(ret.text, "<https://example.org/fox.png|fox>");
    assert_eq!(
        rich_text(&ret),
        section(vec![ContentBlock::Link {
            url: "https://example.org/fox.png".into(),
            text: Some("fox".into()),
            style: None,
        }])
    );
}

#[tokio::test]
async fn test_images_without_alt_text() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<img src=\"https://example.org/fox.png\" />",
    )
    .await;
    assert_eq!(ret.text, "https://example.org/fox.png");
    assert_eq!(
        rich_text(&ret),
        section(vec![ContentBlock::Link {
            url: "https://example.org/fox.png".into(),
            text: None,
            style: None,
        }])
    );
}

#[tokio::test]
async fn test_media_locators_are_mapped() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<img src=\"mxc://example.org/abc\" title=\"cat\" />",
    )
    .await;
    assert_snapshot!(ret.text, @"<https://media.example.org/example.org/abc|cat>");
}

#[tokio::test]
async fn test_line_breaks() {
    let ret = html_to_slack(&FakeResolver::new(), "fox<br>break").await;
    assert_eq!(ret.text, "fox\nbreak");
    assert_eq!(rich_text(&ret), section(vec![text("fox\nbreak")]));
}

#[tokio::test]
async fn test_headings() {
    for level in 1..=6 {
        let ret = html_to_slack(&FakeResolver::new(), &format!("<h{level}>fox</h{level}>")).await;
        let marker = "#".repeat(level);
        assert_eq!(ret.text, format!("*{marker} fox*"));
        assert_eq!(
            rich_text(&ret),
            section(vec![
                styled(&format!("{marker} fox"), Style::BOLD),
                text("\n"),
            ])
        );
        assert_consistent(&ret);
    }
}

#[tokio::test]
async fn test_spoilers() {
    let ret = html_to_slack(&FakeResolver::new(), "<span data-mx-spoiler>fox</span>").await;
    assert_eq!(ret.text, "(Spoiler: fox)");
    assert_eq!(rich_text(&ret), section(vec![text("(Spoiler: fox)")]));

    let ret = html_to_slack(
        &FakeResolver::new(),
        "<span data-mx-spoiler=\"floof\">fox</span>",
    )
    .await;
    assert_eq!(ret.text, "(Spoiler for floof: fox)");
    assert_eq!(rich_text(&ret), section(vec![text("(Spoiler for floof: fox)")]));
}

#[tokio::test]
async fn test_plain_span_is_transparent() {
    let ret = html_to_slack(&FakeResolver::new(), "<span data-mx-color=\"#fff\">fox</span>").await;
    assert_eq!(ret.text, "fox");
}

#[tokio::test]
async fn test_reply_fallback_is_stripped() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<mx-reply>Original content</mx-reply>fox?",
    )
    .await;
    assert_eq!(ret.text, "fox?");
    assert_eq!(rich_text(&ret), section(vec![text("fox?")]));
}

#[tokio::test]
async fn test_trailing_whitespace_is_trimmed() {
    let ret = html_to_slack(&FakeResolver::new(), "fox<br><br>").await;
    assert_eq!(ret.text, "fox");
}

#[tokio::test]
async fn test_empty_formatted_body_uses_plain_body() {
    let message = bridgefmt_babel::MatrixMessage::html("*plain*", "");
    let ret = bridgefmt_babel::MatrixMessageParser::default()
        .format_message(&FakeResolver::new(), &message)
        .await
        .unwrap();
    assert_eq!(ret.text, "\u{FFF1}*\u{FFF1}plain\u{FFF1}*\u{FFF1}");
}
