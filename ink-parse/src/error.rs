use serde::{Deserialize, Serialize};

/// Errors that can occur while turning a raw document into a post.
///
/// Only the front matter can fail: block and inline rendering are
/// best-effort and fall back to paragraphs for anything they do not
/// recognise.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Invalid front matter: {message}")]
    Format { message: String },
}

impl ParseError {
    pub(crate) fn format(message: impl Into<String>) -> Self {
        ParseError::Format {
            message: message.into(),
        }
    }

    /// The machine-readable failure kind, used in skip reports.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ParseError::Format { .. } => ErrorKind::Format,
        }
    }
}

/// Failure kind reported alongside a skipped document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// The front matter header is missing or never closed.
    Format,
    /// Another document in the batch already produced the same slug.
    DuplicateSlug,
    /// The source could not be read as text. Raised by callers that load
    /// documents from disk; the parser itself never sees these.
    Unreadable,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Format => f.write_str("format"),
            ErrorKind::DuplicateSlug => f.write_str("duplicate-slug"),
            ErrorKind::Unreadable => f.write_str("unreadable"),
        }
    }
}
