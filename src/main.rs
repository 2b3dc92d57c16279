use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use ink_parse::{Block, RawDocument};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

mod build;
mod collect;
mod config;
mod init;

use config::Project;

#[derive(Parser)]
#[command(name = "ink", version, about = "Render front-matter markdown posts into sanitized HTML")]
struct Cli {
    /// Suppress non-essential output
    #[arg(long, global = true)]
    quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    verbose: bool,

    /// Path to inkpost.json (default: ./inkpost.json if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render one post to an HTML fragment
    Render {
        /// Path to the markdown file
        file: String,

        /// Print the full post record as JSON instead of the body HTML
        #[arg(long)]
        json: bool,
    },

    /// Check post file(s) for front matter problems
    Check {
        /// Path to the markdown file(s)
        files: Vec<String>,
    },

    /// Print the ordered post list as JSON
    Posts {
        /// Posts directory (default: postsDir from config)
        dir: Option<String>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Write the post listing and one HTML fragment per post
    Build {
        /// Posts directory (default: postsDir from config)
        #[arg(long)]
        posts: Option<String>,

        /// Output directory (default: outDir from config)
        #[arg(long)]
        out: Option<String>,

        /// Watch the posts directory and rebuild on changes
        #[arg(long)]
        watch: bool,
    },

    /// Scaffold inkpost.json and a sample post
    Init {
        /// Directory to initialize (default: current directory)
        path: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    let load = || config::load_project(cli.config.as_deref());

    match cli.command {
        Commands::Render { file, json } => {
            handle_render(&file, json, &load()?)?;
        }
        Commands::Check { files } => {
            handle_check(&files)?;
        }
        Commands::Posts { dir, pretty } => {
            let project = load()?;
            let dir = dir.map(PathBuf::from).unwrap_or_else(|| project.posts_dir());
            handle_posts(&dir, pretty, &project)?;
        }
        Commands::Build { posts, out, watch } => {
            let project = load()?;
            let paths = build::BuildPaths {
                posts_dir: posts.map(PathBuf::from).unwrap_or_else(|| project.posts_dir()),
                out_dir: out.map(PathBuf::from).unwrap_or_else(|| project.out_dir()),
            };
            build::handle_build(&paths, &project.config, cli.quiet)?;
            if watch {
                build::watch_and_rebuild(&paths, &project.config, cli.quiet)?;
            }
        }
        Commands::Init { path } => {
            init::init_project(path.as_deref(), cli.quiet)?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool, quiet: bool) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if quiet {
        EnvFilter::new("warn")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_document(file: &str) -> Result<RawDocument> {
    let source =
        std::fs::read_to_string(file).with_context(|| format!("Failed to read '{file}'"))?;
    let id = Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string());
    Ok(RawDocument::new(id, source))
}

fn handle_render(file: &str, json: bool, project: &Project) -> Result<()> {
    let doc = read_document(file)?;
    let rendered = ink_parse::render_document(&doc).with_context(|| file.to_string())?;

    if json {
        let post = ink_parse::post::to_post(rendered, &project.config.assemble_options());
        println!("{}", serde_json::to_string_pretty(&post)?);
    } else {
        println!("{}", rendered.content);
    }
    Ok(())
}

fn handle_check(files: &[String]) -> Result<()> {
    let mut has_errors = false;

    for file in files {
        let doc = match read_document(file) {
            Ok(doc) => doc,
            Err(e) => {
                has_errors = true;
                println!("{file}: {}: {e:#}", "error".red().bold());
                continue;
            }
        };

        let (metadata, body) = match ink_parse::parse_front_matter(&doc.source) {
            Ok(parsed) => parsed,
            Err(e) => {
                has_errors = true;
                println!("{file}: {}: [{}] {e}", "error".red().bold(), e.kind());
                continue;
            }
        };

        let mut warnings = Vec::new();
        if metadata.title().is_none() {
            warnings.push("no `title`; the file name is used instead".to_string());
        }
        match metadata.date() {
            None => warnings.push("no `date`; the post sorts after dated posts".to_string()),
            Some(date) if ink_parse::dates::parse_date(date).is_none() => warnings.push(format!(
                "`date: {date}` is not a recognised date; the post sorts after dated posts"
            )),
            Some(_) => {}
        }
        for block in ink_parse::parse_blocks(&body) {
            if let Block::Code {
                terminated: false,
                span,
                ..
            } = block
            {
                warnings.push(format!(
                    "code fence opened at body line {} is never closed",
                    span.start_line
                ));
            }
        }

        if warnings.is_empty() {
            println!("{}: {}", file, "OK".green());
        } else {
            for warning in &warnings {
                println!("{file}: {}: {warning}", "warning".yellow().bold());
            }
        }
    }

    if has_errors {
        std::process::exit(1);
    }

    Ok(())
}

fn handle_posts(dir: &Path, pretty: bool, project: &Project) -> Result<()> {
    let set = collect::load_posts(dir, &project.config)?;

    let json = if pretty {
        serde_json::to_string_pretty(&set)?
    } else {
        serde_json::to_string(&set)?
    };
    println!("{json}");
    Ok(())
}
