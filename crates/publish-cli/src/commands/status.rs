//! Status command implementation

use std::path::Path;

use colored::Colorize;
use publish_core::{PublishConfig, RepositoryStatus, browse_url, inspect_folder};

use crate::error::Result;

/// Number of paths listed per category before eliding
const MAX_LISTED: usize = 10;

/// Run the status command
pub fn run_status(folder: &Path, json: bool, config: PublishConfig) -> Result<()> {
    let status = inspect_folder(folder, &config)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}:   {}", "Path".dimmed(), folder.display());
    print_status(&status);
    Ok(())
}

/// Print a status block.
pub fn print_status(status: &RepositoryStatus) {
    if !status.is_version_controlled {
        println!("{}", "Not a git repository".yellow().bold());
        return;
    }

    let branch = match (&status.branch, status.has_commits) {
        (Some(branch), _) => branch.cyan().to_string(),
        (None, false) => "(no commits yet)".dimmed().to_string(),
        (None, true) => "(detached HEAD)".red().to_string(),
    };
    println!("{}: {}", "Branch".dimmed(), branch);

    if let Some(commit) = &status.last_commit {
        println!(
            "{}: {} {} ({})",
            "Commit".dimmed(),
            commit.short_id().yellow(),
            commit.subject,
            commit.committed_at.format("%Y-%m-%d %H:%M UTC")
        );
    }

    match &status.remote_url {
        Some(url) => {
            let shown = browse_url(url).unwrap_or_else(|| url.clone());
            println!("{}: {}", "Remote".dimmed(), shown.yellow());
        }
        None => println!("{}: {}", "Remote".dimmed(), "none".dimmed()),
    }

    match &status.upstream {
        Some(upstream) => println!(
            "{}:  {} (ahead {}, behind {})",
            "Track".dimmed(),
            upstream,
            status.ahead,
            status.behind
        ),
        None => println!("{}:  {}", "Track".dimmed(), "not pushed yet".dimmed()),
    }

    if status.is_clean() {
        println!("{}", "Working tree clean".green());
        return;
    }

    print_paths("Conflicted", &status.conflicted, "!");
    print_paths("Staged", &status.staged, "+");
    print_paths("Modified", &status.modified, "~");
    print_paths("Untracked", &status.untracked, "?");
}

fn print_paths(label: &str, paths: &[String], marker: &str) {
    if paths.is_empty() {
        return;
    }
    println!("{} ({}):", label.bold(), paths.len());
    for path in paths.iter().take(MAX_LISTED) {
        println!("  {} {}", marker.yellow(), path);
    }
    if paths.len() > MAX_LISTED {
        println!("  {}", format!("... and {} more", paths.len() - MAX_LISTED).dimmed());
    }
}
