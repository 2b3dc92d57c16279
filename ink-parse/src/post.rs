//! Post assembly.
//!
//! Each document runs through front matter extraction and block rendering on
//! its own; documents are independent, so a batch is spread across the rayon
//! pool. Assembly waits for every document, drops the ones that failed, and
//! orders the rest newest first.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::path::Path;

use chrono::NaiveDateTime;
use rayon::prelude::*;

use crate::block::render_body;
use crate::dates::parse_date;
use crate::error::{ErrorKind, ParseError};
use crate::front_matter::parse_front_matter;
use crate::types::{Metadata, Post, PostSet, RawDocument, SkippedDocument};

/// Policy for turning metadata into posts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Prepended to the slug to form `Post::link`.
    pub link_prefix: String,
    /// Category for documents that do not declare one.
    pub default_category: Option<String>,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            link_prefix: "#/blog/".to_string(),
            default_category: None,
        }
    }
}

/// One document after parsing and rendering, before assembly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedDocument {
    pub id: String,
    pub metadata: Metadata,
    pub content: String,
}

/// Run one document through front matter extraction and block rendering.
pub fn render_document(doc: &RawDocument) -> Result<RenderedDocument, ParseError> {
    let (metadata, body) = parse_front_matter(&doc.source)?;
    Ok(RenderedDocument {
        id: doc.id.clone(),
        metadata,
        content: render_body(&body),
    })
}

/// Build a post record from a rendered document.
pub fn to_post(doc: RenderedDocument, options: &AssembleOptions) -> Post {
    let RenderedDocument {
        id,
        metadata,
        content,
    } = doc;
    let slug = slug_for(&id);

    Post {
        title: metadata.title().unwrap_or(slug.as_str()).to_string(),
        link: format!("{}{}", options.link_prefix, slug),
        date: metadata.date().unwrap_or_default().to_string(),
        description: metadata.description().unwrap_or_default().to_string(),
        category: metadata
            .category()
            .map(str::to_string)
            .or_else(|| options.default_category.clone()),
        content,
        slug,
    }
}

/// Turn rendered documents into posts ordered by date, newest first.
///
/// Documents with an unparseable or missing date sort after every dated
/// one. Equal dates keep their input order.
pub fn assemble(docs: Vec<RenderedDocument>, options: &AssembleOptions) -> Vec<Post> {
    ordered(docs, options).into_iter().map(|(_, post)| post).collect()
}

/// Posts paired with the identifier of the document they came from, in
/// listing order.
fn ordered(docs: Vec<RenderedDocument>, options: &AssembleOptions) -> Vec<(String, Post)> {
    let mut keyed: Vec<(Option<NaiveDateTime>, String, Post)> = docs
        .into_iter()
        .map(|doc| {
            let id = doc.id.clone();
            let post = to_post(doc, options);
            (parse_date(&post.date), id, post)
        })
        .collect();

    keyed.sort_by(|(a, ..), (b, ..)| newest_first(a, b));
    keyed.into_iter().map(|(_, id, post)| (id, post)).collect()
}

fn newest_first(a: &Option<NaiveDateTime>, b: &Option<NaiveDateTime>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Parse, render and assemble a batch of documents.
///
/// Failing documents are reported in `PostSet::skipped` and never abort the
/// batch. Slugs in the result are unique: when two documents share one, the
/// newer post keeps it and the other is skipped as a duplicate.
pub fn build_posts(docs: Vec<RawDocument>, options: &AssembleOptions) -> PostSet {
    let results: Vec<(String, Result<RenderedDocument, ParseError>)> = docs
        .into_par_iter()
        .map(|doc| {
            let result = render_document(&doc);
            (doc.id, result)
        })
        .collect();

    let mut rendered = Vec::with_capacity(results.len());
    let mut skipped = Vec::new();

    for (id, result) in results {
        match result {
            Ok(doc) => rendered.push(doc),
            Err(e) => {
                tracing::warn!(document = %id, kind = %e.kind(), "skipping document: {e}");
                skipped.push(SkippedDocument {
                    id,
                    kind: e.kind(),
                    message: e.to_string(),
                });
            }
        }
    }

    let mut owners: HashMap<String, String> = HashMap::new();
    let mut posts = Vec::with_capacity(rendered.len());

    for (id, post) in ordered(rendered, options) {
        if let Some(owner) = owners.get(&post.slug) {
            let message = format!("slug `{}` is already used by {owner}", post.slug);
            tracing::warn!(document = %id, kind = %ErrorKind::DuplicateSlug, "skipping document: {message}");
            skipped.push(SkippedDocument {
                id,
                kind: ErrorKind::DuplicateSlug,
                message,
            });
            continue;
        }
        owners.insert(post.slug.clone(), id);
        posts.push(post);
    }

    tracing::debug!(
        posts = posts.len(),
        skipped = skipped.len(),
        "assembled post batch"
    );

    PostSet { posts, skipped }
}

/// The slug for a document identifier: the last path segment without its
/// extension.
pub fn slug_for(id: &str) -> String {
    let path = Path::new(id);
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| id.to_string())
}

impl Post {
    /// The post date as a timestamp, when it is in a supported format.
    pub fn published(&self) -> Option<NaiveDateTime> {
        parse_date(&self.date)
    }
}

impl PostSet {
    /// Look up a post by slug for a detail view.
    pub fn find_by_slug(&self, slug: &str) -> Option<&Post> {
        self.posts.iter().find(|post| post.slug == slug)
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }
}
