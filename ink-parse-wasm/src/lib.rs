//! WASM bindings for `ink-parse`.
//!
//! Exposes the post pipeline to JavaScript via wasm-bindgen so a listing or
//! detail view can render posts in the browser. Call `render_body()` for a
//! single body, or `build_posts()` with an array of `{ id, source }` objects
//! for an ordered post list.

use ink_parse::{AssembleOptions, RawDocument};
use serde::Serialize;
use wasm_bindgen::prelude::*;

#[derive(Serialize)]
struct Parsed<'a> {
    metadata: &'a ink_parse::Metadata,
    body: &'a str,
}

/// Split a document into its front matter and body.
///
/// Returns a JSON object `{ metadata, body }`, or throws when the header
/// delimiters are missing.
#[wasm_bindgen(js_name = parseFrontMatter)]
pub fn parse_front_matter(input: &str) -> Result<String, JsError> {
    let (metadata, body) = ink_parse::parse_front_matter(input)?;
    serde_json::to_string(&Parsed {
        metadata: &metadata,
        body: &body,
    })
    .map_err(|e| JsError::new(&e.to_string()))
}

/// Render a post body (no front matter) to an HTML fragment.
#[wasm_bindgen(js_name = renderBody)]
pub fn render_body(body: &str) -> String {
    ink_parse::render_body(body)
}

/// Render one complete document into a post, returned as JSON.
#[wasm_bindgen(js_name = renderPost)]
pub fn render_post(id: &str, source: &str, link_prefix: Option<String>) -> Result<String, JsError> {
    let options = options(link_prefix, None);
    let rendered = ink_parse::render_document(&RawDocument::new(id, source))?;
    let post = ink_parse::post::to_post(rendered, &options);
    serde_json::to_string(&post).map_err(|e| JsError::new(&e.to_string()))
}

/// Build an ordered post list from an array of `{ id, source }` objects.
///
/// Returns `{ posts, skipped }`; documents that fail to parse are listed in
/// `skipped` with their reason rather than failing the call.
#[wasm_bindgen(js_name = buildPosts)]
pub fn build_posts(
    documents: JsValue,
    link_prefix: Option<String>,
    default_category: Option<String>,
) -> Result<JsValue, JsError> {
    let docs: Vec<RawDocument> =
        serde_wasm_bindgen::from_value(documents).map_err(|e| JsError::new(&e.to_string()))?;
    let set = ink_parse::build_posts(docs, &options(link_prefix, default_category));
    serde_wasm_bindgen::to_value(&set).map_err(|e| JsError::new(&e.to_string()))
}

fn options(link_prefix: Option<String>, default_category: Option<String>) -> AssembleOptions {
    let defaults = AssembleOptions::default();
    AssembleOptions {
        link_prefix: link_prefix.unwrap_or(defaults.link_prefix),
        default_category: default_category.or(defaults.default_category),
    }
}
