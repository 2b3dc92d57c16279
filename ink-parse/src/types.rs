use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ErrorKind;

/// A document as handed over by the retrieval layer: an identifier (source
/// path or slug) plus the full unparsed text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawDocument {
    pub id: String,
    pub source: String,
}

impl RawDocument {
    pub fn new(id: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            source: source.into(),
        }
    }
}

/// Front matter fields, all kept as the raw strings the author wrote.
///
/// `title`, `date`, `category` and `description` have typed accessors; any
/// other key is preserved and reachable through [`Metadata::get`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    fields: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`. A repeated key overwrites the earlier value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get("title")
    }

    /// The date exactly as written; conversion is left to the consumer.
    pub fn date(&self) -> Option<&str> {
        self.get("date")
    }

    pub fn category(&self) -> Option<&str> {
        self.get("category")
    }

    pub fn description(&self) -> Option<&str> {
        self.get("description")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut metadata = Metadata::new();
        for (k, v) in iter {
            metadata.insert(k, v);
        }
        metadata
    }
}

/// Ordered or unordered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    Ordered,
    Unordered,
}

impl ListKind {
    /// The HTML tag name for this list kind.
    pub fn tag(self) -> &'static str {
        match self {
            ListKind::Ordered => "ol",
            ListKind::Unordered => "ul",
        }
    }
}

/// A block-level element of a post body.
///
/// Text fields hold the author's source text; escaping and inline
/// formatting happen when the block is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum Block {
    Heading {
        level: u8,
        text: String,
        span: Span,
    },
    Paragraph {
        text: String,
        span: Span,
    },
    List {
        list_kind: ListKind,
        items: Vec<String>,
        span: Span,
    },
    Blockquote {
        lines: Vec<String>,
        span: Span,
    },
    /// Fenced code. `content` is the raw buffered source; `terminated` is
    /// false when the input ended before a closing fence.
    Code {
        lang: String,
        content: String,
        terminated: bool,
        span: Span,
    },
    Rule {
        span: Span,
    },
}

impl Block {
    pub fn span(&self) -> Span {
        match self {
            Block::Heading { span, .. }
            | Block::Paragraph { span, .. }
            | Block::List { span, .. }
            | Block::Blockquote { span, .. }
            | Block::Code { span, .. }
            | Block::Rule { span } => *span,
        }
    }
}

/// Source location of a block within the document body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    /// 1-based starting line number.
    pub start_line: usize,
    /// 1-based ending line number (inclusive).
    pub end_line: usize,
}

impl Span {
    pub fn line(line: usize) -> Self {
        Self {
            start_line: line,
            end_line: line,
        }
    }
}

/// A render-ready post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub link: String,
    /// Raw date string from the front matter.
    pub date: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    /// Rendered body markup.
    pub content: String,
}

/// A document that was dropped from the batch, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedDocument {
    pub id: String,
    pub kind: ErrorKind,
    pub message: String,
}

/// The outcome of building a batch: posts ordered newest first, plus the
/// documents that failed to parse.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostSet {
    pub posts: Vec<Post>,
    pub skipped: Vec<SkippedDocument>,
}
