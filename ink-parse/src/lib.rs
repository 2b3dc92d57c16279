//! `ink-parse` - front matter, block and inline rendering for blog posts.
//!
//! A post source is a `---`-delimited `key: value` header followed by a body
//! in a small markdown subset. This crate splits the header from the body,
//! renders the body to sanitized HTML, and assembles batches of documents
//! into post records ordered newest first.
//!
//! # Quick start
//!
//! ```
//! let (meta, body) = ink_parse::parse_front_matter(
//!     "---\ntitle: Hello\ndate: 2024-01-01\n---\n# Hi\n\nSome **bold** text.",
//! )
//! .unwrap();
//! assert_eq!(meta.title(), Some("Hello"));
//! assert_eq!(
//!     ink_parse::render_body(&body),
//!     "<h1>Hi</h1>\n<p>Some <strong>bold</strong> text.</p>"
//! );
//! ```

pub mod block;
pub mod dates;
pub mod error;
pub mod front_matter;
pub mod inline;
pub mod post;
pub mod render_html;
pub mod types;

pub use block::{parse_blocks, render_body};
pub use error::*;
pub use front_matter::parse_front_matter;
pub use inline::format_inline;
pub use post::{AssembleOptions, RenderedDocument, assemble, build_posts, render_document};
pub use render_html::escape_html;
pub use types::*;

/// Drop a leading byte order mark and turn `\r\n` and lone `\r` into `\n`.
pub(crate) fn normalise_newlines(input: &str) -> String {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    input.replace("\r\n", "\n").replace('\r', "\n")
}
