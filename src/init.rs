use anyhow::{Context, Result};
use colored::Colorize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::{CONFIG_FILE, InkConfig};

const SAMPLE_POST: &str = "---
title: Hello, world
date: {date}
category: general
description: \"A first post to check the pipeline end to end\"
---
# Hello, world

This is a **sample** post. Edit it, then run `ink build`.

- Front matter sits between the `---` lines
- The body uses a small *markdown* subset

> Quotes, [links](https://example.com) and code fences work too.
";

/// Scaffold a posts project at `path` (default: current directory).
///
/// Existing files are left alone.
pub fn init_project(path: Option<&str>, quiet: bool) -> Result<()> {
    let target = match path {
        Some(p) => PathBuf::from(p),
        None => std::env::current_dir()?,
    };

    if !quiet {
        println!("{} {}", "Initializing".green().bold(), target.display());
    }

    let config = InkConfig::default();
    let posts_dir = target.join(&config.posts_dir);
    fs::create_dir_all(&posts_dir)
        .with_context(|| format!("Failed to create '{}'", posts_dir.display()))?;

    let config_json = serde_json::to_string_pretty(&config)? + "\n";
    write_new(&target.join(CONFIG_FILE), &config_json, CONFIG_FILE, quiet)?;

    let post = SAMPLE_POST.replace("{date}", "2024-01-01");
    let post_label = format!("{}/hello-world.md", config.posts_dir);
    write_new(&posts_dir.join("hello-world.md"), &post, &post_label, quiet)?;

    if !quiet {
        println!();
        println!("{}", "Done! Next steps:".bold());
        println!("  1. Add posts under {}/", config.posts_dir);
        println!("  2. Run `ink build` to render them into {}/", config.out_dir);
    }

    Ok(())
}

fn write_new(path: &Path, content: &str, label: &str, quiet: bool) -> Result<()> {
    if path.exists() {
        if !quiet {
            println!("  {} {}", "exists".dimmed(), label);
        }
        return Ok(());
    }
    fs::write(path, content).with_context(|| format!("Failed to write '{}'", path.display()))?;
    if !quiet {
        println!("  {} {}", "Created".green(), label);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ink_parse::{RawDocument, render_document};
    use pretty_assertions::assert_eq;

    fn temp_target(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("ink-init-test").join(name);
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn scaffolds_config_and_sample_post() {
        let target = temp_target("fresh");
        init_project(target.to_str(), true).unwrap();

        let config: InkConfig =
            serde_json::from_str(&fs::read_to_string(target.join(CONFIG_FILE)).unwrap()).unwrap();
        assert_eq!(config, InkConfig::default());

        let source = fs::read_to_string(target.join("posts/hello-world.md")).unwrap();
        let rendered = render_document(&RawDocument::new("hello-world.md", source)).unwrap();
        assert_eq!(rendered.metadata.title(), Some("Hello, world"));
        assert_eq!(rendered.metadata.date(), Some("2024-01-01"));
        assert!(rendered.content.starts_with("<h1>Hello, world</h1>"));
        assert!(rendered.content.contains("<strong>sample</strong>"));
    }

    #[test]
    fn keeps_existing_files() {
        let target = temp_target("existing");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join(CONFIG_FILE), "{\"outDir\": \"site\"}").unwrap();

        init_project(target.to_str(), true).unwrap();

        let raw = fs::read_to_string(target.join(CONFIG_FILE)).unwrap();
        assert_eq!(raw, "{\"outDir\": \"site\"}");
        assert!(target.join("posts/hello-world.md").exists());
    }
}
