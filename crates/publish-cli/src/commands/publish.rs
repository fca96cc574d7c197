//! Publish command implementation

use colored::Colorize;
use publish_core::{
    Identity, PublishConfig, RepoSetupRequest, SetupOutcome, Visibility, run_setup_workflow,
};

use crate::cli::PublishArgs;
use crate::commands::status::print_status;
use crate::error::{CliError, Result};

/// Run the publish command
pub fn run_publish(args: PublishArgs, config: PublishConfig) -> Result<()> {
    let json = args.json;
    let request = build_request(args);

    if !json {
        println!(
            "{} Publishing {}...",
            "=>".blue().bold(),
            request.folder.display().to_string().cyan()
        );
    }

    let outcome = run_setup_workflow(&request, config);

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_outcome(&outcome);
    }

    match outcome.exit_code() {
        0 => Ok(()),
        code => Err(CliError::Reported { code }),
    }
}

fn build_request(args: PublishArgs) -> RepoSetupRequest {
    let PublishArgs {
        folder,
        private,
        description,
        no_push,
        name,
        message,
        author_name,
        author_email,
        token,
        json: _,
    } = args;

    let visibility = if private {
        Visibility::Private
    } else {
        Visibility::Public
    };
    let mut request = RepoSetupRequest::new(folder)
        .with_visibility(visibility)
        .with_push(!no_push);
    request.description = description;
    request.name = name;
    request.commit_message = message;
    request.access_token = token.filter(|t| !t.is_empty());
    if let (Some(name), Some(email)) = (author_name, author_email) {
        request.identity = Some(Identity::new(name, email));
    }
    request
}

fn print_outcome(outcome: &SetupOutcome) {
    for record in &outcome.steps {
        let marker = if record.success {
            "OK".green().bold()
        } else {
            "FAILED".red().bold()
        };
        println!("{} {:<13} {}", marker, record.step.as_str().cyan(), record.message);
    }

    if outcome.steps.iter().all(|r| !r.step.is_mutating()) && outcome.is_success() {
        println!("{} Already up to date", "OK".green().bold());
    }

    println!();
    print_status(&outcome.final_status);

    if let Some(url) = outcome.browse_url().or_else(|| outcome.remote_url.clone()) {
        println!();
        println!("{}: {}", "Repository".bold(), url.yellow());
    }

    if outcome.cancelled {
        println!();
        println!("{} Cancelled; completed steps are listed above", "!!".yellow().bold());
    }

    if let Some(error) = &outcome.error {
        eprintln!();
        let step = error
            .step
            .map(|s| format!(" during {s}"))
            .unwrap_or_default();
        eprintln!(
            "{} [{}]{}: {}",
            "error".red().bold(),
            error.kind,
            step,
            error.message
        );
        if let Some(hint) = &error.hint {
            eprintln!("{}: {}", "hint".yellow().bold(), hint);
        }
    }
}
