//! Inline formatter.
//!
//! Applies, in this order, code spans, links, bold and italic to one line of
//! author text. The text is HTML-escaped before any rule runs, so the only
//! markup in the result is the markup these rules insert.
//!
//! Markup inserted by a rule is frozen behind a placeholder
//! (`U+E000 index U+E001`) until the end, which keeps later rules from
//! reading into code-span bodies or link targets, and keeps every rule from
//! rescanning its own output.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::render_html::escape_html;

const PLACEHOLDER_OPEN: char = '\u{E000}';
const PLACEHOLDER_CLOSE: char = '\u{E001}';

static CODE_SPAN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`([^`]+)`").unwrap());
static LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[([^\]]*)\]\(([^)]*)\)").unwrap());
static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.+?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.+?)\*").unwrap());
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new("\u{E000}([0-9]+)\u{E001}").unwrap());

/// URL schemes that are never emitted as link targets.
const BLOCKED_SCHEMES: &[&str] = &["javascript", "vbscript", "data"];

/// Format one line of author text into inline markup.
pub fn format_inline(text: &str) -> String {
    let mut frozen = Frozen::default();

    let escaped = escape_html(text)
        .replace(PLACEHOLDER_OPEN, "&#xE000;")
        .replace(PLACEHOLDER_CLOSE, "&#xE001;");

    let text = CODE_SPAN.replace_all(&escaped, |caps: &Captures| {
        frozen.freeze(Token::Atom(format!("<code>{}</code>", &caps[1])))
    });

    let text = LINK.replace_all(&text, |caps: &Captures| {
        let (label, url) = (&caps[1], &caps[2]);
        if url.contains(PLACEHOLDER_OPEN) || !frozen.is_balanced(label) {
            return caps[0].to_string();
        }
        let open = frozen.freeze(Token::Open(
            "a",
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
                safe_href(url)
            ),
        ));
        let close = frozen.freeze(Token::Close("a"));
        format!("{open}{label}{close}")
    });

    let text = BOLD.replace_all(&text, |caps: &Captures| wrap(&mut frozen, "strong", caps));
    let text = ITALIC.replace_all(&text, |caps: &Captures| wrap(&mut frozen, "em", caps));

    frozen.thaw(&text)
}

/// Wrap the first capture group in `tag`, unless that would interleave with
/// markup already inserted by an earlier rule.
fn wrap(frozen: &mut Frozen, tag: &'static str, caps: &Captures) -> String {
    let body = &caps[1];
    if !frozen.is_balanced(body) {
        return caps[0].to_string();
    }
    let open = frozen.freeze(Token::Open(tag, format!("<{tag}>")));
    let close = frozen.freeze(Token::Close(tag));
    format!("{open}{body}{close}")
}

/// Neutralise script-bearing link targets.
fn safe_href(url: &str) -> &str {
    let url = url.trim();
    let Some((scheme, _)) = url.split_once(':') else {
        return url;
    };
    let scheme: String = scheme
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_ascii_lowercase();
    if BLOCKED_SCHEMES.contains(&scheme.as_str()) {
        "#"
    } else {
        url
    }
}

#[derive(Debug)]
enum Token {
    Atom(String),
    Open(&'static str, String),
    Close(&'static str),
}

impl Token {
    fn html(&self) -> String {
        match self {
            Token::Atom(html) | Token::Open(_, html) => html.clone(),
            Token::Close(tag) => format!("</{tag}>"),
        }
    }
}

/// Markup produced so far, addressed by placeholder index.
#[derive(Debug, Default)]
struct Frozen {
    tokens: Vec<Token>,
}

impl Frozen {
    fn freeze(&mut self, token: Token) -> String {
        let idx = self.tokens.len();
        self.tokens.push(token);
        format!("{PLACEHOLDER_OPEN}{idx}{PLACEHOLDER_CLOSE}")
    }

    fn lookup(&self, caps: &Captures) -> Option<&Token> {
        caps[1].parse::<usize>().ok().and_then(|idx| self.tokens.get(idx))
    }

    /// Whether the open/close tokens inside `text` nest properly.
    fn is_balanced(&self, text: &str) -> bool {
        let mut stack = Vec::new();
        for caps in PLACEHOLDER.captures_iter(text) {
            match self.lookup(&caps) {
                Some(Token::Open(tag, _)) => stack.push(*tag),
                Some(Token::Close(tag)) => {
                    if stack.pop() != Some(*tag) {
                        return false;
                    }
                }
                Some(Token::Atom(_)) | None => {}
            }
        }
        stack.is_empty()
    }

    fn thaw(&self, text: &str) -> String {
        PLACEHOLDER
            .replace_all(text, |caps: &Captures| {
                self.lookup(caps).map(Token::html).unwrap_or_default()
            })
            .into_owned()
    }
}
