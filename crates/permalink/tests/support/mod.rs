//! Throwaway repositories built with the `git` CLI.
#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

pub const PUBLISHED: &str = "\
pub fn parse(input: &str) -> Vec<&str> {
    input.split(',').map(str::trim).collect()
}

pub fn render(items: &[&str]) -> String {
    items.join(\", \")
}
";

/// Lines prepended to the working copy and committed without pushing.
pub const LOCAL_HEADER: &str = "//! Local notes.\n//! Not pushed yet.\n\n";

pub struct Fixture {
    pub temp: TempDir,
    /// Bare repository the checkout was cloned from.
    pub remote: PathBuf,
    /// Working copy cloned from the bare remote.
    pub checkout: PathBuf,
    /// Commit at the tip of `origin/main`.
    pub published: String,
}

impl Fixture {
    /// A clone of a one-commit remote whose `origin` URL points at GitHub, with one local
    /// unpushed commit shifting `src/lib.rs` down by three lines.
    pub fn new() -> Self {
        let temp = tempfile::tempdir().expect("temp dir");
        let base = fs::canonicalize(temp.path()).expect("canonical temp dir");

        let seed = base.join("seed");
        fs::create_dir_all(seed.join("src")).expect("seed dir");
        git(&seed, &["init", "-q", "-b", "main"]);
        fs::write(seed.join("src/lib.rs"), PUBLISHED).expect("write lib.rs");
        git(&seed, &["add", "."]);
        git(&seed, &["commit", "-q", "-m", "Initial commit"]);

        git(&base, &["clone", "-q", "--bare", "seed", "remote.git"]);
        git(&base, &["clone", "-q", "remote.git", "checkout"]);

        let checkout = base.join("checkout");
        git(
            &checkout,
            &["remote", "set-url", "origin", "git@github.com:acme/widgets.git"],
        );
        let published = git(&checkout, &["rev-parse", "refs/remotes/origin/main"]);

        fs::write(
            checkout.join("src/lib.rs"),
            format!("{LOCAL_HEADER}{PUBLISHED}"),
        )
        .expect("edit lib.rs");
        git(&checkout, &["commit", "-q", "-am", "Local notes"]);

        Self {
            temp,
            remote: base.join("remote.git"),
            checkout,
            published,
        }
    }

    pub fn file(&self) -> PathBuf {
        self.checkout.join("src/lib.rs")
    }

    /// Directory used as the user config home so personal settings do not leak in.
    pub fn config_home(&self) -> &Path {
        self.temp.path()
    }
}

/// Run git in `dir` with personal and system configuration disabled, returning trimmed stdout.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_CONFIG_GLOBAL", "/dev/null")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .env("GIT_AUTHOR_NAME", "Test Author")
        .env("GIT_AUTHOR_EMAIL", "author@example.com")
        .env("GIT_COMMITTER_NAME", "Test Author")
        .env("GIT_COMMITTER_EMAIL", "author@example.com")
        .output()
        .expect("git is installed");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
