//! Block renderer.
//!
//! A line-driven state machine. Each [`ParserState`] has its own transition
//! function that consumes one line and returns the next state, at most one
//! finished block, and whether the same line must be dispatched again
//! against the new state. Only closing a list or a blockquote re-dispatches,
//! and it always lands in `Normal`, so every line is dispatched at most twice.

use crate::normalise_newlines;
use crate::render_html::to_html;
use crate::types::{Block, ListKind, Span};

const FENCE: &str = "```";
const DEFAULT_LANG: &str = "text";

/// Parse a document body into blocks.
pub fn parse_blocks(body: &str) -> Vec<Block> {
    let normalised = normalise_newlines(body);
    let mut blocks = Vec::new();
    let mut state = ParserState::Normal;
    let mut last_line = 0;

    for (idx, line) in normalised.split('\n').enumerate() {
        let line_no = idx + 1;
        last_line = line_no;
        loop {
            let transition = state.step(line, line_no);
            blocks.extend(transition.emit);
            state = transition.next;
            if !transition.reprocess {
                break;
            }
        }
    }

    blocks.extend(state.finish(last_line));
    blocks
}

/// Parse a document body and render it as an HTML fragment.
pub fn render_body(body: &str) -> String {
    to_html(&parse_blocks(body))
}

#[derive(Debug)]
enum ParserState {
    Normal,
    InCodeBlock {
        lang: String,
        lines: Vec<String>,
        start_line: usize,
    },
    InList {
        list_kind: ListKind,
        items: Vec<String>,
        start_line: usize,
    },
    InBlockquote {
        lines: Vec<String>,
        start_line: usize,
    },
}

#[derive(Debug)]
struct Transition {
    next: ParserState,
    emit: Option<Block>,
    reprocess: bool,
}

impl Transition {
    fn to(next: ParserState) -> Self {
        Self {
            next,
            emit: None,
            reprocess: false,
        }
    }

    fn emit(block: Block) -> Self {
        Self {
            next: ParserState::Normal,
            emit: Some(block),
            reprocess: false,
        }
    }

    /// Emit `block`, return to `Normal` and hand the current line back.
    fn close_and_reprocess(block: Block) -> Self {
        Self {
            next: ParserState::Normal,
            emit: Some(block),
            reprocess: true,
        }
    }
}

impl ParserState {
    fn step(self, line: &str, line_no: usize) -> Transition {
        match self {
            ParserState::Normal => step_normal(line, line_no),
            ParserState::InCodeBlock {
                lang,
                lines,
                start_line,
            } => step_code(lang, lines, start_line, line, line_no),
            ParserState::InList {
                list_kind,
                items,
                start_line,
            } => step_list(list_kind, items, start_line, line, line_no),
            ParserState::InBlockquote { lines, start_line } => {
                step_blockquote(lines, start_line, line, line_no)
            }
        }
    }

    /// Close whatever is still open at end of input.
    fn finish(self, last_line: usize) -> Option<Block> {
        match self {
            ParserState::Normal => None,
            ParserState::InCodeBlock {
                lang,
                lines,
                start_line,
            } => {
                tracing::debug!(
                    line = start_line,
                    lang = %lang,
                    "code fence never closed, keeping buffered content"
                );
                Some(Block::Code {
                    lang,
                    content: lines.join("\n"),
                    terminated: false,
                    span: Span {
                        start_line,
                        end_line: last_line,
                    },
                })
            }
            ParserState::InList {
                list_kind,
                items,
                start_line,
            } => Some(Block::List {
                list_kind,
                items,
                span: Span {
                    start_line,
                    end_line: last_line,
                },
            }),
            ParserState::InBlockquote { lines, start_line } => Some(Block::Blockquote {
                lines,
                span: Span {
                    start_line,
                    end_line: last_line,
                },
            }),
        }
    }
}

fn step_normal(line: &str, line_no: usize) -> Transition {
    let trimmed = line.trim();

    if let Some(lang) = fence_language(trimmed) {
        return Transition::to(ParserState::InCodeBlock {
            lang: lang.to_string(),
            lines: Vec::new(),
            start_line: line_no,
        });
    }

    if let Some(rest) = trimmed.strip_prefix('>') {
        return Transition::to(ParserState::InBlockquote {
            lines: vec![rest.trim().to_string()],
            start_line: line_no,
        });
    }

    let span = Span::line(line_no);

    if is_rule(trimmed) {
        return Transition::emit(Block::Rule { span });
    }

    if let Some((level, text)) = heading(trimmed) {
        return Transition::emit(Block::Heading {
            level,
            text: text.to_string(),
            span,
        });
    }

    if let Some((list_kind, text)) = list_item(trimmed) {
        return Transition::to(ParserState::InList {
            list_kind,
            items: vec![text.to_string()],
            start_line: line_no,
        });
    }

    if trimmed.is_empty() {
        return Transition::to(ParserState::Normal);
    }

    Transition::emit(Block::Paragraph {
        text: trimmed.to_string(),
        span,
    })
}

fn step_code(
    lang: String,
    mut lines: Vec<String>,
    start_line: usize,
    line: &str,
    line_no: usize,
) -> Transition {
    if line.trim().starts_with(FENCE) {
        return Transition::emit(Block::Code {
            lang,
            content: lines.join("\n"),
            terminated: true,
            span: Span {
                start_line,
                end_line: line_no,
            },
        });
    }

    lines.push(line.to_string());
    Transition::to(ParserState::InCodeBlock {
        lang,
        lines,
        start_line,
    })
}

fn step_list(
    list_kind: ListKind,
    mut items: Vec<String>,
    start_line: usize,
    line: &str,
    line_no: usize,
) -> Transition {
    // The kind of an open list is fixed by its first item.
    if let Some((_, text)) = list_item(line.trim()) {
        items.push(text.to_string());
        return Transition::to(ParserState::InList {
            list_kind,
            items,
            start_line,
        });
    }

    Transition::close_and_reprocess(Block::List {
        list_kind,
        items,
        span: Span {
            start_line,
            end_line: line_no - 1,
        },
    })
}

fn step_blockquote(
    mut lines: Vec<String>,
    start_line: usize,
    line: &str,
    line_no: usize,
) -> Transition {
    if let Some(rest) = line.trim().strip_prefix('>') {
        lines.push(rest.trim().to_string());
        return Transition::to(ParserState::InBlockquote { lines, start_line });
    }

    Transition::close_and_reprocess(Block::Blockquote {
        lines,
        span: Span {
            start_line,
            end_line: line_no - 1,
        },
    })
}

// ------------------------------------------------------------------
// Line classification helpers
// ------------------------------------------------------------------

/// If the line opens a fence, return its language tag.
fn fence_language(trimmed: &str) -> Option<&str> {
    let rest = trimmed.strip_prefix(FENCE)?;
    Some(rest.split_whitespace().next().unwrap_or(DEFAULT_LANG))
}

fn is_rule(trimmed: &str) -> bool {
    matches!(trimmed, "---" | "***" | "___")
}

/// `#` to `######`, at least one whitespace character, then text.
fn heading(trimmed: &str) -> Option<(u8, &str)> {
    let level = trimmed.chars().take_while(|&c| c == '#').count();
    if !(1..=6).contains(&level) {
        return None;
    }
    let rest = &trimmed[level..];
    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim_start();
    if text.is_empty() {
        return None;
    }
    u8::try_from(level).ok().map(|level| (level, text))
}

/// `-`, `*` or `+` followed by whitespace, or digits, `.` and whitespace.
fn list_item(trimmed: &str) -> Option<(ListKind, &str)> {
    let (list_kind, rest) = if let Some(rest) = trimmed.strip_prefix(['-', '*', '+']) {
        (ListKind::Unordered, rest)
    } else {
        let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
        if digits == 0 {
            return None;
        }
        (ListKind::Ordered, trimmed[digits..].strip_prefix('.')?)
    };

    if !rest.starts_with(char::is_whitespace) {
        return None;
    }
    let text = rest.trim_start();
    if text.is_empty() {
        return None;
    }
    Some((list_kind, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn heading_and_paragraph() {
        let html = render_body("# Hi\n\nSome **bold** text.");
        assert_eq!(html, "<h1>Hi</h1>\n<p>Some <strong>bold</strong> text.</p>");
    }

    #[test]
    fn fenced_code_is_raw() {
        let blocks = parse_blocks("```js\nconsole.log(1)\n```");
        assert_eq!(
            blocks,
            vec![Block::Code {
                lang: "js".into(),
                content: "console.log(1)".into(),
                terminated: true,
                span: Span {
                    start_line: 1,
                    end_line: 3
                },
            }]
        );
        assert_eq!(
            render_body("```js\nlet x = a ** b; // *not em*\n```"),
            "<pre><code class=\"language-js\">let x = a ** b; // *not em*</code></pre>"
        );
    }

    #[test]
    fn fence_without_language_defaults_to_text() {
        assert_eq!(
            render_body("```\nplain\n```"),
            "<pre><code class=\"language-text\">plain</code></pre>"
        );
    }

    #[test]
    fn fence_language_is_first_token() {
        let blocks = parse_blocks("``` rust title=main.rs\nfn main() {}\n```");
        assert!(matches!(&blocks[0], Block::Code { lang, .. } if lang == "rust"));
    }

    #[test]
    fn code_keeps_indentation_and_blank_lines() {
        let blocks = parse_blocks("```py\ndef f():\n\n    return 1\n```");
        match &blocks[0] {
            Block::Code { content, .. } => assert_eq!(content, "def f():\n\n    return 1"),
            other => panic!("Expected Code, got {other:?}"),
        }
    }

    #[test]
    fn markup_inside_fence_is_not_interpreted() {
        let blocks = parse_blocks("```\n# not a heading\n- not a list\n> not a quote\n```");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn unterminated_fence_keeps_content() {
        let blocks = parse_blocks("intro\n```sh\necho hi\necho bye");
        assert_eq!(blocks.len(), 2);
        match &blocks[1] {
            Block::Code {
                lang,
                content,
                terminated,
                span,
            } => {
                assert_eq!(lang, "sh");
                assert_eq!(content, "echo hi\necho bye");
                assert!(!terminated);
                assert_eq!(span.end_line, 4);
            }
            other => panic!("Expected Code, got {other:?}"),
        }
    }

    #[test]
    fn three_items_then_blank() {
        let blocks = parse_blocks("- one\n- two\n- three\n");
        assert_eq!(
            blocks,
            vec![Block::List {
                list_kind: ListKind::Unordered,
                items: vec!["one".into(), "two".into(), "three".into()],
                span: Span {
                    start_line: 1,
                    end_line: 3
                },
            }]
        );
    }

    #[test]
    fn list_kind_fixed_by_first_item() {
        let html = render_body("1. first\n- second\n* third");
        assert_eq!(html, "<ol><li>first</li><li>second</li><li>third</li></ol>");
    }

    #[test]
    fn list_markers() {
        assert_eq!(render_body("+ plus"), "<ul><li>plus</li></ul>");
        assert_eq!(render_body("42. answer"), "<ol><li>answer</li></ol>");
        assert_eq!(render_body("-nospace"), "<p>-nospace</p>");
        assert_eq!(render_body("1.5 apples"), "<p>1.5 apples</p>");
    }

    #[test]
    fn list_closed_by_paragraph_line() {
        let html = render_body("- a\n- b\nafter");
        assert_eq!(html, "<ul><li>a</li><li>b</li></ul>\n<p>after</p>");
    }

    #[test]
    fn list_items_are_formatted() {
        let html = render_body("- **bold** item\n- `code`");
        assert_eq!(
            html,
            "<ul><li><strong>bold</strong> item</li><li><code>code</code></li></ul>"
        );
    }

    #[test]
    fn bold_line_is_not_a_list() {
        assert_eq!(render_body("**Note** this"), "<p><strong>Note</strong> this</p>");
    }

    #[test]
    fn blockquote_lines_join() {
        let html = render_body("> first\n>second\n> *third*");
        assert_eq!(
            html,
            "<blockquote><p>first<br>second<br><em>third</em></p></blockquote>"
        );
    }

    #[test]
    fn line_after_blockquote_is_reprocessed() {
        let html = render_body("> quoted\n## Next");
        assert_eq!(html, "<blockquote><p>quoted</p></blockquote>\n<h2>Next</h2>");
    }

    #[test]
    fn list_after_blockquote_is_reprocessed() {
        let blocks = parse_blocks("> q\n- item");
        assert!(matches!(&blocks[0], Block::Blockquote { .. }));
        assert!(matches!(&blocks[1], Block::List { .. }));
    }

    #[test]
    fn fence_closes_open_list_first() {
        let blocks = parse_blocks("- item\n```\ncode\n```\nafter");
        assert_eq!(blocks.len(), 3);
        assert!(matches!(&blocks[0], Block::List { .. }));
        assert!(matches!(&blocks[1], Block::Code { .. }));
        assert!(matches!(&blocks[2], Block::Paragraph { .. }));
    }

    #[test]
    fn fence_closes_open_blockquote_first() {
        let blocks = parse_blocks("> quote\n```\ncode\n```");
        assert!(matches!(&blocks[0], Block::Blockquote { .. }));
        assert!(matches!(&blocks[1], Block::Code { .. }));
    }

    #[test]
    fn blockquote_inside_list_closes_list() {
        let blocks = parse_blocks("- a\n> b");
        assert!(matches!(&blocks[0], Block::List { .. }));
        assert!(matches!(&blocks[1], Block::Blockquote { .. }));
    }

    #[test]
    fn open_states_flushed_at_end() {
        let blocks = parse_blocks("- a\n- b");
        assert_eq!(blocks.len(), 1);
        let blocks = parse_blocks("> a");
        assert_eq!(blocks.len(), 1);
    }

    #[test]
    fn rules() {
        assert_eq!(render_body("---\n***\n___"), "<hr>\n<hr>\n<hr>");
        assert_eq!(render_body("----"), "<p>----</p>");
    }

    #[test]
    fn heading_rules() {
        assert_eq!(render_body("###### six"), "<h6>six</h6>");
        assert_eq!(render_body("####### seven"), "<p>####### seven</p>");
        assert_eq!(render_body("#tag"), "<p>#tag</p>");
        assert_eq!(render_body("#"), "<p>#</p>");
        assert_eq!(render_body("  ## Indented  "), "<h2>Indented</h2>");
    }

    #[test]
    fn blank_lines_emit_nothing() {
        assert_eq!(render_body("\n\n\n"), "");
        assert_eq!(render_body("a\n\n\nb"), "<p>a</p>\n<p>b</p>");
    }

    #[test]
    fn carriage_returns_normalised() {
        assert_eq!(render_body("a\r\nb\rc"), "<p>a</p>\n<p>b</p>\n<p>c</p>");
    }

    #[test]
    fn raw_html_is_escaped_in_paragraphs() {
        assert_eq!(
            render_body("<script>alert(1)</script>"),
            "<p>&lt;script&gt;alert(1)&lt;/script&gt;</p>"
        );
    }

    #[test]
    fn block_spans() {
        let blocks = parse_blocks("# Title\n\n- a\n- b\n\ntext");
        assert_eq!(blocks[0].span(), Span::line(1));
        assert_eq!(
            blocks[1].span(),
            Span {
                start_line: 3,
                end_line: 4
            }
        );
        assert_eq!(blocks[2].span(), Span::line(6));
    }
}
