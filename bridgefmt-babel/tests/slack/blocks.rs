//! Block trees to HTML.

use crate::common::FakeResolver;
use bridgefmt_babel::ir::nodes::{BroadcastRange, LayoutElement, ListStyle};
use bridgefmt_babel::{
    ContentBlock, ConvertError, OutboundOptions, SlackBlocksParser, SlackMarkdownParser, Style,
};
use serde_json::json;

async fn try_render(
    resolver: &FakeResolver,
    blocks: &[ContentBlock],
) -> Result<String, ConvertError> {
    let options = OutboundOptions::default();
    let markdown = SlackMarkdownParser::new(resolver, &options);
    SlackBlocksParser::new(&markdown).parse_blocks(blocks).await
}

async fn render(resolver: &FakeResolver, blocks: Vec<ContentBlock>) -> String {
    try_render(resolver, &blocks)
        .await
        .expect("conversion to succeed")
}

fn rich(elements: Vec<ContentBlock>) -> Vec<ContentBlock> {
    vec![ContentBlock::RichText { elements }]
}

fn text(value: &str) -> ContentBlock {
    ContentBlock::text(value, None)
}

fn section(value: &str) -> ContentBlock {
    ContentBlock::section(vec![text(value)])
}

fn user(id: &str) -> ContentBlock {
    ContentBlock::User {
        user_id: id.into(),
        style: None,
    }
}

fn emoji(name: &str) -> ContentBlock {
    ContentBlock::Emoji {
        name: name.into(),
        skin_tone: None,
        style: None,
    }
}

fn plain_text(value: &str) -> LayoutElement {
    LayoutElement::PlainText {
        text: value.into(),
        emoji: None,
    }
}

#[tokio::test]
async fn test_sections_become_paragraphs() {
    let ret = render(
        &FakeResolver::new(),
        rich(vec![
            ContentBlock::section(vec![
                text("Hello "),
                ContentBlock::text("world", Some(Style::BOLD)),
            ]),
            section("line\nbreak"),
        ]),
    )
    .await;
    assert_eq!(ret, "<p>Hello <strong>world</strong></p><p>line<br>break</p>");
}

#[tokio::test]
async fn test_text_is_escaped() {
    let ret = render(&FakeResolver::new(), rich(vec![section("a <b> & c")])).await;
    assert_eq!(ret, "<p>a &lt;b&gt; &amp; c</p>");
}

#[tokio::test]
async fn test_lists() {
    let bullets = ContentBlock::List {
        elements: vec![section("a"), section("b")],
        style: ListStyle::Bullet,
        indent: 0,
        index: None,
    };
    let ordered = ContentBlock::List {
        elements: vec![section("c")],
        style: ListStyle::Ordered,
        indent: 0,
        index: Some(2),
    };
    let ret = render(&FakeResolver::new(), rich(vec![bullets, ordered])).await;
    assert_eq!(
        ret,
        "<ul><li>a</li><li>b</li></ul><ol start=\"3\"><li>c</li></ol>"
    );
}

#[tokio::test]
async fn test_ordered_list_starts_at_one() {
    let list = ContentBlock::List {
        elements: vec![section("a")],
        style: ListStyle::Ordered,
        indent: 0,
        index: None,
    };
    let ret = render(&FakeResolver::new(), rich(vec![list])).await;
    assert_eq!(ret, "<ol start=\"1\"><li>a</li></ol>");
}

#[tokio::test]
async fn test_quotes_and_code() {
    let ret = render(
        &FakeResolver::new(),
        rich(vec![
            ContentBlock::Quote {
                elements: vec![text("wise words")],
            },
            ContentBlock::Preformatted {
                elements: vec![text("if a < b {}")],
            },
        ]),
    )
    .await;
    assert_eq!(
        ret,
        "<blockquote>wise words</blockquote><pre><code>if a &lt; b {}</code></pre>"
    );
}

#[tokio::test]
async fn test_quote_passes_block_context_through() {
    let quote = ContentBlock::Quote {
        elements: vec![section("q")],
    };
    let ret = render(&FakeResolver::new(), rich(vec![quote.clone()])).await;
    assert_eq!(ret, "<blockquote><p>q</p></blockquote>");

    let list = ContentBlock::List {
        elements: vec![quote],
        style: ListStyle::Bullet,
        indent: 0,
        index: None,
    };
    let ret = render(&FakeResolver::new(), rich(vec![list])).await;
    assert_eq!(ret, "<ul><li><blockquote>q</blockquote></li></ul>");
}

#[tokio::test]
async fn test_styles_nest_in_fixed_order() {
    let style = Style {
        italic: true,
        strike: true,
        ..Style::default()
    };
    let ret = render(
        &FakeResolver::new(),
        rich(vec![ContentBlock::section(vec![ContentBlock::text("x", Some(style))])]),
    )
    .await;
    assert_eq!(ret, "<p><em><del>x</del></em></p>");
}

#[tokio::test]
async fn test_links() {
    let ret = render(
        &FakeResolver::new(),
        rich(vec![ContentBlock::section(vec![
            ContentBlock::Link {
                url: "https://example.org/?a=1&b=2".into(),
                text: Some("site".into()),
                style: None,
            },
            text(" "),
            ContentBlock::Link {
                url: "https://example.org".into(),
                text: None,
                style: None,
            },
        ])]),
    )
    .await;
    assert_eq!(
        ret,
        "<p><a href=\"https://example.org/?a=1&amp;b=2\">site</a> \
         <a href=\"https://example.org\">https://example.org</a></p>"
    );
}

#[tokio::test]
async fn test_mention_pills() {
    let ret = render(
        &FakeResolver::new(),
        rich(vec![ContentBlock::section(vec![
            user("blah"),
            text(" "),
            ContentBlock::Channel {
                channel_id: "C1".into(),
                style: None,
            },
            text(" "),
            ContentBlock::Usergroup {
                usergroup_id: "S1".into(),
                style: None,
            },
        ])]),
    )
    .await;
    assert_eq!(
        ret,
        "<p><a href=\"https://matrix.to/#/@_slack_blah:example.org\">Ghostblah</a> \
         <a href=\"https://matrix.to/#/#_slack_C1:example.org\">ChanC1</a> \
         <a href=\"https://matrix.to/#/+_slack_S1:example.org\">GroupS1</a></p>"
    );
}

#[tokio::test]
async fn test_unresolved_mentions_stay_literal() {
    let team = ContentBlock::Team {
        team_id: "T1".into(),
        style: None,
    };
    let ret = render(
        &FakeResolver::unknown(),
        rich(vec![ContentBlock::section(vec![user("blah"), team.clone()])]),
    )
    .await;
    assert_eq!(ret, "<p>&lt;@blah&gt;&lt;!team^T1&gt;</p>");

    let ret = render(
        &FakeResolver::new(),
        rich(vec![ContentBlock::section(vec![team])]),
    )
    .await;
    assert_eq!(ret, "<p>TeamT1</p>");
}

#[tokio::test]
async fn test_blank_ids_render_names() {
    let ret = render(
        &FakeResolver::new().with_blank_ids(),
        rich(vec![ContentBlock::section(vec![user("blah")])]),
    )
    .await;
    assert_eq!(ret, "<p>Ghostblah</p>");
}

#[tokio::test]
async fn test_broadcasts_dates_and_colors() {
    let ret = render(
        &FakeResolver::new(),
        rich(vec![ContentBlock::section(vec![
            ContentBlock::Broadcast {
                range: BroadcastRange::Here,
                style: None,
            },
            text(" "),
            ContentBlock::Date {
                timestamp: Some(1392734382),
                format: Some("{date_num}".into()),
                fallback: Some("2014-02-18".into()),
            },
            text(" "),
            ContentBlock::Color {
                value: "#ff0000".into(),
            },
        ])]),
    )
    .await;
    assert_eq!(
        ret,
        "<p>@room 2014-02-18 #ff0000<font color=\"#ff0000\">\u{25A0}</font></p>"
    );
}

#[tokio::test]
async fn test_emoji() {
    let resolver = FakeResolver::new()
        .with_emoji("thumbsup", "👍")
        .with_emoji("smile_face", "😄");
    let ret = render(
        &resolver,
        rich(vec![ContentBlock::section(vec![
            emoji("thumbsup"),
            emoji("smile"),
            emoji("party"),
        ])]),
    )
    .await;
    assert_eq!(ret, "<p>👍😄:party:</p>");
}

#[tokio::test]
async fn test_divider() {
    let ret = render(&FakeResolver::new(), vec![section("a"), ContentBlock::Divider]).await;
    assert_eq!(ret, "<p>a</p><hr>");
}

#[tokio::test]
async fn test_layout_section_with_fields() {
    let block = ContentBlock::LayoutSection {
        text: Some(LayoutElement::Mrkdwn {
            text: "*Deploy* finished".into(),
            verbatim: None,
        }),
        fields: Some(vec![plain_text("a"), plain_text("b"), plain_text("c")]),
    };
    let ret = render(&FakeResolver::new(), vec![block]).await;
    assert_eq!(
        ret,
        "<p><strong>Deploy</strong> finished</p>\
         <table><tr><td>a</td><td>b</td></tr><tr><td>c</td></tr></table>"
    );
}

#[tokio::test]
async fn test_layout_section_with_even_fields() {
    let block = ContentBlock::LayoutSection {
        text: None,
        fields: Some(vec![plain_text("a"), plain_text("b")]),
    };
    let ret = render(&FakeResolver::new(), vec![block]).await;
    assert_eq!(ret, "<table><tr><td>a</td><td>b</td></tr></table>");
}

#[tokio::test]
async fn test_context_block() {
    let block = ContentBlock::Context {
        elements: vec![
            LayoutElement::Image {
                image_url: "https://files.slack.com/avatar.png".into(),
                alt_text: "avatar".into(),
            },
            plain_text("by bob"),
        ],
    };
    let resolver =
        FakeResolver::new().with_media("https://files.slack.com/avatar.png", "mxc://example.org/av");
    let ret = render(&resolver, vec![block.clone()]).await;
    assert_eq!(
        ret,
        "<p><img alt=\"avatar\" title=\"avatar\" height=\"32\" src=\"mxc://example.org/av\" /> by bob </p>"
    );

    let ret = render(&FakeResolver::new(), vec![block]).await;
    assert_eq!(
        ret,
        "<p><a href=\"https://files.slack.com/avatar.png\">avatar</a> by bob </p>"
    );
}

#[tokio::test]
async fn test_image_block() {
    let block = ContentBlock::Image {
        image_url: "https://example.org/cat.png".into(),
        alt_text: "cat".into(),
        title: Some(plain_text("Cat <3")),
    };
    let ret = render(&FakeResolver::new(), vec![block]).await;
    assert_eq!(
        ret,
        "<p>Cat &lt;3<br>Image: <a href=\"https://example.org/cat.png\">https://example.org/cat.png</a></p>"
    );
}

#[tokio::test]
async fn test_unsupported_blocks() {
    let block = ContentBlock::Unsupported {
        kind: "call".into(),
    };
    let ret = render(&FakeResolver::new(), vec![block]).await;
    assert_eq!(ret, "Unsupported block of type call");
}

#[tokio::test]
async fn test_lookup_failure() {
    let err = try_render(
        &FakeResolver::failing(),
        &rich(vec![ContentBlock::section(vec![user("blah")])]),
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ConvertError::Lookup(_)));
}

#[tokio::test]
async fn test_wire_payload() {
    let blocks: Vec<ContentBlock> = serde_json::from_value(json!([
        {
            "type": "rich_text",
            "block_id": "Vrzsu",
            "elements": [
                {
                    "type": "rich_text_section",
                    "elements": [
                        {"type": "text", "text": "Hi "},
                        {"type": "user", "user_id": "U1"},
                        {"type": "text", "text": ", see ", "style": {"italic": true}},
                        {"type": "link", "url": "https://example.org", "text": "this"},
                        {"type": "emoji", "name": "wave", "unicode": "1f44b"}
                    ]
                },
                {
                    "type": "rich_text_list",
                    "style": "bullet",
                    "indent": 0,
                    "elements": [
                        {"type": "rich_text_section", "elements": [{"type": "text", "text": "one"}]}
                    ]
                }
            ]
        },
        {"type": "actions", "elements": []}
    ]))
    .unwrap();

    let ret = try_render(&FakeResolver::new().with_emoji("wave", "👋"), &blocks)
        .await
        .unwrap();
    assert_eq!(
        ret,
        "<p>Hi <a href=\"https://matrix.to/#/@_slack_U1:example.org\">GhostU1</a>\
         <em>, see </em><a href=\"https://example.org\">this</a>👋</p>\
         <ul><li>one</li></ul>Unsupported block of type actions"
    );
}
