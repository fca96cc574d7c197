//! Doctor command implementation

use std::path::Path;

use colored::Colorize;
use publish_core::PublishConfig;
use publish_exec::{CommandRunner, Invocation, ProcessRunner};
use publish_github::{GhProvisioner, RemoteProvisioner};

use crate::error::{CliError, Result};

/// Run the doctor command
pub fn run_doctor(config: &PublishConfig) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let runner = ProcessRunner::new(config.network_timeout());

    println!("{} Checking tools...", "=>".blue().bold());

    let mut healthy = check_tool(&runner, &cwd, &config.git_program);
    let gh_found = check_tool(&runner, &cwd, &config.gh_program);
    healthy &= gh_found;

    if gh_found {
        let gh = GhProvisioner::new(&runner, config.gh_program.as_str());
        match gh.ensure_authenticated(&cwd, None) {
            Ok(()) => println!("{} {} is authenticated", "OK".green().bold(), config.gh_program.cyan()),
            Err(e) => {
                healthy = false;
                println!("{} {}", "FAILED".red().bold(), e);
                println!("   run {} or set {}", "gh auth login".cyan(), "GH_TOKEN".cyan());
            }
        }
    }

    if healthy {
        Ok(())
    } else {
        Err(CliError::Reported { code: 1 })
    }
}

fn check_tool(runner: &ProcessRunner, cwd: &Path, program: &str) -> bool {
    let path = match ProcessRunner::resolve(program) {
        Ok(path) => path,
        Err(e) => {
            println!("{} {}", "MISSING".red().bold(), e);
            return false;
        }
    };

    let version = runner
        .run(&Invocation::new(program, cwd).arg("--version"))
        .ok()
        .filter(|output| output.success())
        .and_then(|output| output.stdout.lines().next().map(str::to_string))
        .unwrap_or_else(|| "unknown version".to_string());

    println!(
        "{} {} ({})",
        "OK".green().bold(),
        version,
        path.display().to_string().dimmed()
    );
    true
}
