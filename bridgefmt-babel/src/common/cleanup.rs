//! Normalizes walker output into a valid `rich_text` element list.
//!
//! # The High-Level Concept
//!
//! The walker emits one text block per text node it visits, so a single
//! sentence with a bold word arrives as five or six fragments. Slack wants
//! maximal runs, and it wants inline content wrapped in sections when it
//! shares a level with quotes, lists or code blocks.
//!
//! # The Algorithm
//!
//! 1. **Merge:**
//!    - Walk the sequence keeping one pending text run
//!    - A text block with the same style as the pending run is appended to it
//!    - Anything else flushes the run; runs that concatenate to `""` are dropped
//!
//! 2. **Regroup:**
//!    - Containers (section, preformatted, quote, list) pass through as-is
//!    - Maximal runs of non-container blocks are wrapped in one section
//!    - Without `force`, a sequence with no containers is returned untouched

use crate::ir::nodes::{ContentBlock, Style};

/// Merge, then regroup.
pub fn clean_blocks(blocks: Vec<ContentBlock>, force: bool) -> Vec<ContentBlock> {
    regroup_sections(merge_text_blocks(blocks), force)
}

/// Concatenates adjacent text blocks sharing a style.
pub fn merge_text_blocks(blocks: Vec<ContentBlock>) -> Vec<ContentBlock> {
    let mut merged = Vec::with_capacity(blocks.len());
    let mut pending: Option<(String, Option<Style>)> = None;

    for block in blocks {
        match block {
            ContentBlock::Text { text, style } => {
                let style = Style::normalized(style);
                match pending.as_mut() {
                    Some((run, run_style)) if *run_style == style => {
                        run.push_str(&text);
                        continue;
                    }
                    _ => {}
                }
                flush(&mut pending, &mut merged);
                pending = Some((text, style));
            }
            other => {
                flush(&mut pending, &mut merged);
                merged.push(other);
            }
        }
    }
    flush(&mut pending, &mut merged);
    merged
}

fn flush(pending: &mut Option<(String, Option<Style>)>, out: &mut Vec<ContentBlock>) {
    if let Some((text, style)) = pending.take() {
        if !text.is_empty() {
            out.push(ContentBlock::Text { text, style });
        }
    }
}

/// Wraps runs of inline blocks in sections.
pub fn regroup_sections(blocks: Vec<ContentBlock>, force: bool) -> Vec<ContentBlock> {
    if !force && !blocks.iter().any(ContentBlock::is_container) {
        return blocks;
    }

    let mut grouped = Vec::new();
    let mut run = Vec::new();
    for block in blocks {
        if block.is_container() {
            if !run.is_empty() {
                grouped.push(ContentBlock::section(std::mem::take(&mut run)));
            }
            grouped.push(block);
        } else {
            run.push(block);
        }
    }
    if !run.is_empty() {
        grouped.push(ContentBlock::section(run));
    }
    grouped
}
