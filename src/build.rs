//! `ink build` - render the posts directory into a listing plus one HTML
//! fragment per post.
//!
//! Output layout:
//! - `posts.json`: every post without its content, newest first, plus the
//!   documents that were skipped.
//! - `<slug>.html`: the rendered body of each post.
//!
//! Files whose SHA-256 matches what would be written are left untouched so
//! downstream watchers only see real changes.

use anyhow::{Context, Result};
use colored::Colorize;
use ink_parse::{Post, SkippedDocument};
use notify::{EventKind, RecursiveMode, Watcher};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::collect::load_posts;
use crate::config::InkConfig;

pub const LISTING_FILE: &str = "posts.json";

/// One row of the listing file.
#[derive(Debug, Serialize)]
struct ListingEntry<'a> {
    slug: &'a str,
    title: &'a str,
    link: &'a str,
    date: &'a str,
    description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<&'a str>,
}

impl<'a> From<&'a Post> for ListingEntry<'a> {
    fn from(post: &'a Post) -> Self {
        Self {
            slug: &post.slug,
            title: &post.title,
            link: &post.link,
            date: &post.date,
            description: &post.description,
            category: post.category.as_deref(),
        }
    }
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    posts: Vec<ListingEntry<'a>>,
    skipped: &'a [SkippedDocument],
}

/// What a build did.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub written: Vec<PathBuf>,
    pub unchanged: usize,
    pub skipped: Vec<SkippedDocument>,
}

impl BuildReport {
    pub fn print_summary(&self, out_dir: &Path) {
        println!(
            "{} {} ({} written, {} unchanged, {} skipped)",
            "Built".green().bold(),
            out_dir.display(),
            self.written.len(),
            self.unchanged,
            self.skipped.len(),
        );
        for skip in &self.skipped {
            println!("  {} {}: {}", "skipped".yellow(), skip.id, skip.message);
        }
    }
}

/// Where a build reads from and writes to.
#[derive(Debug, Clone)]
pub struct BuildPaths {
    pub posts_dir: PathBuf,
    pub out_dir: PathBuf,
}

pub fn handle_build(paths: &BuildPaths, config: &InkConfig, quiet: bool) -> Result<BuildReport> {
    let report = build_once(paths, config)?;
    if !quiet {
        for path in &report.written {
            println!("  {} {}", "wrote".dimmed(), path.display());
        }
        report.print_summary(&paths.out_dir);
    }
    Ok(report)
}

fn build_once(paths: &BuildPaths, config: &InkConfig) -> Result<BuildReport> {
    let set = load_posts(&paths.posts_dir, config)?;

    std::fs::create_dir_all(&paths.out_dir)
        .with_context(|| format!("Failed to create '{}'", paths.out_dir.display()))?;

    let mut report = BuildReport {
        skipped: set.skipped.clone(),
        ..Default::default()
    };

    for post in &set.posts {
        let path = paths.out_dir.join(format!("{}.html", post.slug));
        record(&mut report, &path, write_if_changed(&path, &post.content)?);
    }

    let listing = Listing {
        posts: set.posts.iter().map(ListingEntry::from).collect(),
        skipped: &set.skipped,
    };
    let json = serde_json::to_string_pretty(&listing)?;
    let path = paths.out_dir.join(LISTING_FILE);
    record(&mut report, &path, write_if_changed(&path, &json)?);

    tracing::info!(
        written = report.written.len(),
        unchanged = report.unchanged,
        skipped = report.skipped.len(),
        "build finished"
    );
    Ok(report)
}

fn record(report: &mut BuildReport, path: &Path, written: bool) {
    if written {
        report.written.push(path.to_path_buf());
    } else {
        report.unchanged += 1;
    }
}

fn content_hash(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}

/// Write `content` to `path` unless the file already holds exactly that.
/// Returns whether a write happened.
fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if let Ok(existing) = std::fs::read(path) {
        if content_hash(&existing) == content_hash(content.as_bytes()) {
            return Ok(false);
        }
    }
    std::fs::write(path, content).with_context(|| format!("Failed to write '{}'", path.display()))?;
    Ok(true)
}

/// Watch the posts directory and rebuild whenever a document changes.
///
/// Events arriving within 200ms of the last rebuild are dropped, so a save
/// landing in that window waits for the next change. Ctrl+C exits.
pub fn watch_and_rebuild(paths: &BuildPaths, config: &InkConfig, quiet: bool) -> Result<()> {
    let watch_dir = std::fs::canonicalize(&paths.posts_dir)
        .with_context(|| format!("Cannot resolve path '{}'", paths.posts_dir.display()))?;

    println!(
        "{} {} for changes (Ctrl+C to stop)",
        "Watching".cyan().bold(),
        paths.posts_dir.display()
    );

    let (tx, rx) = mpsc::channel();
    let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
        if let Ok(event) = res {
            let _ = tx.send(event);
        }
    })?;

    watcher.watch(&watch_dir, RecursiveMode::Recursive)?;

    let mut last_rebuild = Instant::now();
    let debounce = Duration::from_millis(200);

    loop {
        match rx.recv_timeout(Duration::from_secs(1)) {
            Ok(event) => {
                let relevant_kind = matches!(
                    event.kind,
                    EventKind::Modify(_) | EventKind::Create(_) | EventKind::Remove(_)
                );
                let touches_document = event.paths.iter().any(|p| config.is_document(p));

                if relevant_kind && touches_document && last_rebuild.elapsed() > debounce {
                    // let the editor finish writing
                    std::thread::sleep(Duration::from_millis(50));

                    match handle_build(paths, config, quiet) {
                        Ok(_) => last_rebuild = Instant::now(),
                        Err(e) => eprintln!("{} {:#}", "Build error:".red().bold(), e),
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }

    Ok(())
}
