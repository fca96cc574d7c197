//! Description of a single external command and its captured result

use std::fmt;
use std::path::{Path, PathBuf};

/// Whether a command stays on the local machine or talks to a remote host.
///
/// Only [`Reach::Network`] commands are subject to the runner's timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reach {
    #[default]
    Local,
    Network,
}

/// A command to run: program, arguments, working directory and extra
/// environment.
#[derive(Clone, PartialEq, Eq)]
pub struct Invocation {
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
    env: Vec<(String, String)>,
    reach: Reach,
}

impl Invocation {
    /// Create an invocation of `program` inside `working_dir`.
    pub fn new(program: impl Into<String>, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            working_dir: working_dir.into(),
            env: Vec::new(),
            reach: Reach::Local,
        }
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add an environment variable for the child only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Mark this invocation as network-bound.
    pub fn network(mut self) -> Self {
        self.reach = Reach::Network;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args_slice(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn env_vars(&self) -> &[(String, String)] {
        &self.env
    }

    pub fn reach(&self) -> Reach {
        self.reach
    }

    pub fn is_network(&self) -> bool {
        self.reach == Reach::Network
    }

    /// `true` if the first non-option argument equals `subcommand`.
    ///
    /// Skips leading `-c key=value` pairs so `git -c user.name=x commit`
    /// reports `commit`.
    pub fn subcommand_is(&self, subcommand: &str) -> bool {
        let mut iter = self.args.iter();
        while let Some(arg) = iter.next() {
            if arg == "-c" {
                iter.next();
                continue;
            }
            if arg.starts_with('-') {
                continue;
            }
            return arg == subcommand;
        }
        false
    }
}

impl fmt::Display for Invocation {
    /// Program and arguments, space separated. Environment values are not
    /// shown because they may carry credentials.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_keys: Vec<&str> = self.env.iter().map(|(k, _)| k.as_str()).collect();
        f.debug_struct("Invocation")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("working_dir", &self.working_dir)
            .field("env", &env_keys)
            .field("reach", &self.reach)
            .finish()
    }
}

/// Captured result of a finished process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code, or -1 if the process was terminated by a signal
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Stderr followed by stdout, for matching diagnostics that tools print
    /// to either stream.
    pub fn combined(&self) -> String {
        let mut text = self.stderr.clone();
        if !self.stdout.is_empty() {
            if !text.is_empty() && !text.ends_with('\n') {
                text.push('\n');
            }
            text.push_str(&self.stdout);
        }
        text
    }

    /// The most useful one-paragraph diagnostic: trimmed stderr, or trimmed
    /// stdout when stderr is empty.
    pub fn diagnostic(&self) -> String {
        let stderr = self.stderr.trim();
        if stderr.is_empty() {
            self.stdout.trim().to_string()
        } else {
            stderr.to_string()
        }
    }
}
