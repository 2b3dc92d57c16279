//! HTML fragment renderer.
//!
//! Emits a fixed element vocabulary: `h1`-`h6`, `p`, `ul`, `ol`, `li`,
//! `blockquote`, `hr`, `pre > code`, plus the inline elements produced by
//! [`format_inline`]. Fenced code is escaped and never formatted; every
//! other text field passes through the inline formatter, which escapes it
//! first.

use crate::inline::format_inline;
use crate::types::Block;

/// Render a sequence of blocks as an HTML fragment, one block per line.
pub fn to_html(blocks: &[Block]) -> String {
    blocks
        .iter()
        .map(render_block)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Escape HTML special characters. Total over any input.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn render_block(block: &Block) -> String {
    match block {
        Block::Heading { level, text, .. } => {
            format!("<h{level}>{}</h{level}>", format_inline(text))
        }

        Block::Paragraph { text, .. } => format!("<p>{}</p>", format_inline(text)),

        Block::List {
            list_kind, items, ..
        } => {
            let tag = list_kind.tag();
            let items: String = items
                .iter()
                .map(|item| format!("<li>{}</li>", format_inline(item)))
                .collect();
            format!("<{tag}>{items}</{tag}>")
        }

        Block::Blockquote { lines, .. } => {
            let inner = lines
                .iter()
                .map(|line| format_inline(line))
                .collect::<Vec<_>>()
                .join("<br>");
            format!("<blockquote><p>{inner}</p></blockquote>")
        }

        Block::Code { lang, content, .. } => format!(
            "<pre><code class=\"language-{}\">{}</code></pre>",
            escape_html(lang),
            escape_html(content)
        ),

        Block::Rule { .. } => "<hr>".to_string(),
    }
}
