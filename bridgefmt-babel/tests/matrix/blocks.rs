//! Code blocks, quotes, lists and rules.

use crate::common::{assert_consistent, html_to_slack, rich_text, text, FakeResolver};
use bridgefmt_babel::ir::nodes::ListStyle;
use bridgefmt_babel::{ContentBlock, Style};

fn list(style: ListStyle, index: Option<u32>, items: &[&str]) -> ContentBlock {
    ContentBlock::List {
        elements: items
            .iter()
            .map(|item| ContentBlock::section(vec![text(item)]))
            .collect(),
        style,
        indent: 0,
        index,
    }
}

#[tokio::test]
async fn test_code_blocks() {
    let ret = html_to_slack(&FakeResolver::new(), "<pre><code>foxies</code></pre>").await;
    assert_eq!(ret.text, "```foxies```");
    assert_eq!(
        rich_text(&ret),
        vec![ContentBlock::Preformatted {
            elements: vec![text("foxies")],
        }]
    );
}

#[tokio::test]
async fn test_code_blocks_without_code_tag() {
    let ret = html_to_slack(&FakeResolver::new(), "<pre>foxies</pre>").await;
    assert_eq!(ret.text, "```foxies```");
    assert_eq!(
        rich_text(&ret),
        vec![ContentBlock::Preformatted {
            elements: vec![text("foxies")],
        }]
    );
}

#[tokio::test]
async fn test_code_block_content_is_raw() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<pre><code class=\"language-rust\">let *x* = a_b;\nx\n</code></pre>",
    )
    .await;
    assert_eq!(ret.text, "```let *x* = a_b;\nx```");
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_blockquotes() {
    let ret = html_to_slack(&FakeResolver::new(), "<blockquote>foxies</blockquote>").await;
    assert_eq!(ret.text, "> foxies");
    assert_eq!(
        rich_text(&ret),
        vec![ContentBlock::Quote {
            elements: vec![text("foxies")],
        }]
    );
}

#[tokio::test]
async fn test_multiline_styled_blockquote() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<blockquote><b>fox</b> says<br>hi</blockquote>after",
    )
    .await;
    assert_eq!(ret.text, "> *fox* says\n> hi\nafter");
    assert_eq!(
        rich_text(&ret),
        vec![
            ContentBlock::Quote {
                elements: vec![
                    ContentBlock::text("fox", Some(Style::BOLD)),
                    text(" says\nhi"),
                ],
            },
            ContentBlock::section(vec![text("after")]),
        ]
    );
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_unordered_list() {
    let ret = html_to_slack(&FakeResolver::new(), "<ul><li>fox</li><li>bunny</li></ul>").await;
    assert_eq!(ret.text, "\n● fox\n● bunny");
    assert_eq!(
        rich_text(&ret),
        vec![list(ListStyle::Bullet, None, &["fox", "bunny"])]
    );
}

#[tokio::test]
async fn test_ordered_list() {
    let ret = html_to_slack(&FakeResolver::new(), "<ol><li>fox</li><li>bunny</li></ol>").await;
    assert_eq!(ret.text, "\n1. fox\n2. bunny");
    assert_eq!(
        rich_text(&ret),
        vec![list(ListStyle::Ordered, None, &["fox", "bunny"])]
    );
}

#[tokio::test]
async fn test_ordered_list_start() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<ol start=\"3\"><li>fox</li><li>bunny</li></ol>",
    )
    .await;
    assert_eq!(ret.text, "\n3. fox\n4. bunny");
    assert_eq!(
        rich_text(&ret),
        vec![list(ListStyle::Ordered, Some(2), &["fox", "bunny"])]
    );
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_ordered_list_with_bad_start() {
    let ret = html_to_slack(&FakeResolver::new(), "<ol start=\"x\"><li>fox</li></ol>").await;
    assert_eq!(ret.text, "\n1. fox");
}

#[tokio::test]
async fn test_list_ignores_stray_children() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<ul>\n<li>fox</li>\n<li>bunny</li>\n</ul>",
    )
    .await;
    assert_eq!(ret.text, "\n● fox\n● bunny");
}

#[tokio::test]
async fn test_nested_lists_become_marker_text() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<ul><li>fox</li><li><ul><li>tail</li><li>snout</li></ul></li><li>bunny</li></ul>",
    )
    .await;
    assert_eq!(ret.text, "\n● fox\n●     ○ tail\n    ○ snout\n● bunny");
    assert_eq!(
        rich_text(&ret),
        vec![list(
            ListStyle::Bullet,
            None,
            &["fox", "    ○ tail\n    ○ snout\n", "bunny"]
        )]
    );
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_deeply_nested_ordered_list() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<ol><li><ol><li><ul><li>deep</li></ul></li></ol></li></ol>",
    )
    .await;
    assert_eq!(ret.text, "\n1.     1.         ■ deep");
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_styled_list_items() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "<ul><li><b>fox</b> and <a href=\"https://example.org\">friends</a></li></ul>",
    )
    .await;
    assert_eq!(ret.text, "\n● *fox* and <https://example.org|friends>");
    assert_eq!(
        rich_text(&ret),
        vec![ContentBlock::List {
            elements: vec![ContentBlock::section(vec![
                ContentBlock::text("fox", Some(Style::BOLD)),
                text(" and "),
                ContentBlock::Link {
                    url: "https://example.org".into(),
                    text: Some("friends".into()),
                    style: None,
                },
            ])],
            style: ListStyle::Bullet,
            indent: 0,
            index: None,
        }]
    );
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_list_between_paragraphs() {
    let ret = html_to_slack(&FakeResolver::new(), "intro<ul><li>fox</li></ul>outro").await;
    assert_eq!(ret.text, "intro\n● fox\n\noutro");
    assert_eq!(
        rich_text(&ret),
        vec![
            ContentBlock::section(vec![text("intro")]),
            list(ListStyle::Bullet, None, &["fox"]),
            ContentBlock::section(vec![text("outro")]),
        ]
    );
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_mix_of_blocks() {
    let ret = html_to_slack(
        &FakeResolver::new(),
        "text\n<pre><code>code</code></pre>more text\n<blockquote>quote</blockquote>",
    )
    .await;
    assert_eq!(ret.text, "text\n```code```\nmore text\n> quote");
    assert_eq!(
        rich_text(&ret),
        vec![
            ContentBlock::section(vec![text("text\n")]),
            ContentBlock::Preformatted {
                elements: vec![text("code")],
            },
            ContentBlock::section(vec![text("more text\n")]),
            ContentBlock::Quote {
                elements: vec![text("quote")],
            },
        ]
    );
    assert_consistent(&ret);
}

#[tokio::test]
async fn test_horizontal_rule() {
    let ret = html_to_slack(&FakeResolver::new(), "fox<hr>break").await;
    assert_eq!(ret.text, "fox\n----------\nbreak");
    assert_eq!(
        rich_text(&ret),
        vec![ContentBlock::section(vec![
            text("fox"),
            ContentBlock::Divider,
            text("break"),
        ])]
    );
    assert_consistent(&ret);
}
