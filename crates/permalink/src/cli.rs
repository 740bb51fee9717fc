//! Command-line front end.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;

use crate::app::link::{Delivery, DeliveryReport, deliver};
use crate::app::permalink::{LinkOutcome, LinkRequest, LinkService};
use crate::app::workspace::RepositoryCatalog;
use crate::domain::model::LineRange;
use crate::infra::config::Config;
use crate::infra::desktop::SystemSink;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Link a selection in your working copy to the same lines on GitHub",
    long_about = None
)]
pub struct Cli {
    /// File in the working copy
    pub file: PathBuf,

    /// Selected lines, 1-based and inclusive: `N`, `N-M`, `N:M` or `LN-LM`
    #[arg(short, long, value_name = "RANGE")]
    pub lines: Option<LineRange>,

    /// Exact selected text; defaults to the selected lines of FILE
    #[arg(long, requires = "lines")]
    pub text: Option<String>,

    /// Repository root known to the host (repeatable); defaults to the repository containing FILE
    #[arg(long = "root", value_name = "DIR")]
    pub roots: Vec<PathBuf>,

    /// Link against this remote instead of ranking remotes
    #[arg(long, value_name = "NAME")]
    pub remote: Option<String>,

    /// Open the link in the default browser
    #[arg(long)]
    pub open: bool,

    /// Do not copy the link to the clipboard
    #[arg(long)]
    pub no_copy: bool,

    /// Do not contact the remote to learn its default branch
    #[arg(long)]
    pub no_query_remote: bool,

    /// Print the full result as JSON
    #[arg(long)]
    pub json: bool,

    /// Log fallback decisions to stderr
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(Serialize)]
struct JsonReport<'a> {
    #[serde(flatten)]
    outcome: &'a LinkOutcome,
    verified: bool,
    delivery: DeliveryReport,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let file = fs::canonicalize(&self.file)
            .with_context(|| format!("cannot access {}", self.file.display()))?;
        let catalog = if self.roots.is_empty() {
            RepositoryCatalog::for_file(&file)?
        } else {
            RepositoryCatalog::discover(&self.repository_roots()?)?
        };

        let mut config = Config::load(catalog.root_for(&file))?;
        self.apply_overrides(&mut config);

        let mut request = LinkRequest::new(&file, self.lines);
        if let Some(text) = &self.text {
            request = request.with_text(text.as_str());
        }
        let outcome = LinkService::new(&catalog, &config).produce(&request)?;

        if !outcome.is_verified() {
            eprintln!(
                "warning: selection not found at {}; using working-copy line numbers",
                short_commit(&outcome.revision.commit)
            );
        }
        if self.verbose {
            for message in &outcome.revision.diagnostics {
                eprintln!("note: {message}");
            }
        }

        let delivery = Delivery {
            copy: config.link.copy() && !self.no_copy,
            open: config.link.open() || self.open,
        };
        let report = if delivery.copy || delivery.open {
            deliver(&outcome.url, delivery, &mut SystemSink::new())
        } else {
            DeliveryReport::default()
        };

        if self.json {
            let json = JsonReport {
                outcome: &outcome,
                verified: outcome.is_verified(),
                delivery: report,
            };
            println!(
                "{}",
                serde_json::to_string_pretty(&json).context("failed to serialize link")?
            );
        } else {
            println!("{}", outcome.url);
            if report.copied {
                eprintln!("copied to clipboard");
            }
        }
        Ok(())
    }

    fn repository_roots(&self) -> Result<Vec<PathBuf>> {
        self.roots
            .iter()
            .map(|root| {
                fs::canonicalize(root)
                    .with_context(|| format!("cannot access root {}", root.display()))
            })
            .collect()
    }

    fn apply_overrides(&self, config: &mut Config) {
        if let Some(remote) = &self.remote {
            config.remotes.set_pinned(remote.as_str());
        }
        if self.no_query_remote {
            config.branches.set_query_remote(false);
        }
    }
}

fn short_commit(commit: &str) -> &str {
    commit.get(..12).unwrap_or(commit)
}
