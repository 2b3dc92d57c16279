//! End-to-end tests for the `ink` binary.

use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn ink_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_ink"))
}

fn posts_fixture() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/posts")
}

fn fixture(name: &str) -> String {
    posts_fixture().join(name).to_string_lossy().into_owned()
}

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join("ink-cli-test").join(name);
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

fn ink(args: &[&str]) -> Output {
    Command::new(ink_bin())
        .args(args)
        .env("NO_COLOR", "1")
        .current_dir(std::env::temp_dir())
        .output()
        .expect("failed to run ink")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn render_prints_body_html() {
    let output = ink(&["render", &fixture("hello-world.md")]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output).trim_end(),
        "<h1>Hi</h1>\n<p>Some <strong>bold</strong> text.</p>"
    );
}

#[test]
fn render_json_prints_post_record() {
    let output = ink(&["render", "--json", &fixture("hello-world.md")]);
    assert!(output.status.success());

    let post: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(post["slug"], "hello-world");
    assert_eq!(post["title"], "Hello");
    assert_eq!(post["link"], "#/blog/hello-world");
    assert_eq!(post["description"], "First post: an introduction");
    assert_eq!(post["category"], "general");
}

#[test]
fn render_fails_without_front_matter() {
    let output = ink(&["render", &fixture("broken.md")]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Invalid front matter"), "stderr: {stderr}");
}

#[test]
fn check_reports_each_file() {
    let output = ink(&["check", &fixture("hello-world.md"), &fixture("broken.md")]);
    assert_eq!(output.status.code(), Some(1));

    let out = stdout(&output);
    assert!(out.contains("hello-world.md: OK"), "stdout: {out}");
    assert!(out.contains("broken.md: error"), "stdout: {out}");
    assert!(out.contains("[format]"), "stdout: {out}");
}

#[test]
fn check_warns_on_unclosed_fence() {
    let output = ink(&["check", &fixture("draft-ideas.md")]);
    assert!(output.status.success());
    let out = stdout(&output);
    assert!(out.contains("never closed"), "stdout: {out}");
}

#[test]
fn posts_prints_ordered_json() {
    let dir = posts_fixture();
    let output = ink(&["posts", dir.to_str().unwrap(), "--quiet"]);
    assert!(output.status.success());

    let set: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let slugs: Vec<&str> = set["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["slug"].as_str().unwrap())
        .collect();
    assert_eq!(slugs, vec!["rust-notes", "hello-world", "draft-ideas"]);
    assert_eq!(set["skipped"][0]["id"], "broken.md");
}

#[test]
fn build_writes_listing_and_skips_unchanged() {
    let out = temp_dir("build");
    let posts = posts_fixture();
    let args = [
        "build",
        "--posts",
        posts.to_str().unwrap(),
        "--out",
        out.to_str().unwrap(),
    ];

    let first = ink(&args);
    assert!(first.status.success());
    assert!(stdout(&first).contains("4 written, 0 unchanged, 1 skipped"), "{}", stdout(&first));

    assert!(out.join("posts.json").exists());
    assert!(out.join("hello-world.html").exists());
    assert!(out.join("rust-notes.html").exists());
    assert!(!out.join("broken.html").exists());

    let fragment = fs::read_to_string(out.join("draft-ideas.html")).unwrap();
    assert!(!fragment.contains("<script"));

    let second = ink(&args);
    assert!(second.status.success());
    assert!(stdout(&second).contains("0 written, 4 unchanged, 1 skipped"), "{}", stdout(&second));
}

#[test]
fn init_then_build_with_config() {
    let target = temp_dir("init");
    let status = Command::new(ink_bin())
        .args(["init", target.to_str().unwrap(), "--quiet"])
        .status()
        .expect("failed to run ink init");
    assert!(status.success());
    assert!(target.join("inkpost.json").exists());
    assert!(target.join("posts/hello-world.md").exists());

    let config = target.join("inkpost.json");
    let output = ink(&["build", "--config", config.to_str().unwrap(), "--quiet"]);
    assert!(output.status.success());

    let listing: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(target.join("dist/posts.json")).unwrap()).unwrap();
    assert_eq!(listing["posts"][0]["title"], "Hello, world");
    assert_eq!(listing["posts"][0]["link"], "#/blog/hello-world");
}
