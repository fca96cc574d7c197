//! Step records and the workflow outcome

use std::fmt;

use chrono::{DateTime, Utc};
use publish_git::RepositoryStatus;
use serde::{Deserialize, Serialize};

use crate::error::ErrorDetail;

/// One action the engine may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Step {
    Init,
    Stage,
    Commit,
    CreateRemote,
    AttachRemote,
    Fetch,
    Pull,
    Push,
}

impl Step {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Stage => "stage",
            Self::Commit => "commit",
            Self::CreateRemote => "create-remote",
            Self::AttachRemote => "attach-remote",
            Self::Fetch => "fetch",
            Self::Pull => "pull",
            Self::Push => "push",
        }
    }

    /// Whether the step changes the folder or the remote. Fetch only
    /// refreshes remote-tracking refs.
    pub fn is_mutating(self) -> bool {
        !matches!(self, Self::Fetch)
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attempted step, successful or not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepRecord {
    pub step: Step,
    pub success: bool,
    pub message: String,
}

/// Everything a front end needs to report a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetupOutcome {
    /// Attempted steps in execution order
    pub steps: Vec<StepRecord>,
    pub remote_url: Option<String>,
    pub final_status: RepositoryStatus,
    pub error: Option<ErrorDetail>,
    /// Stopped between steps at the caller's request
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl SetupOutcome {
    /// Steps that changed the folder or the remote, in order.
    pub fn mutating_steps(&self) -> Vec<Step> {
        self.steps
            .iter()
            .map(|r| r.step)
            .filter(|s| s.is_mutating())
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none() && !self.cancelled
    }

    /// Web page of the remote, when it is a hosted repository.
    pub fn browse_url(&self) -> Option<String> {
        self.remote_url.as_deref().and_then(publish_github::browse_url)
    }

    /// Process exit code for a command-line front end.
    pub fn exit_code(&self) -> i32 {
        match &self.error {
            None => 0,
            Some(detail) => detail.kind.exit_code(),
        }
    }
}

/// Accumulates step records for one run and packages the outcome.
#[derive(Debug)]
pub struct OutcomeRecorder {
    steps: Vec<StepRecord>,
    started_at: DateTime<Utc>,
}

impl Default for OutcomeRecorder {
    fn default() -> Self {
        Self::start()
    }
}

impl OutcomeRecorder {
    pub fn start() -> Self {
        Self {
            steps: Vec::new(),
            started_at: Utc::now(),
        }
    }

    pub fn record(&mut self, step: Step, success: bool, message: impl Into<String>) {
        self.steps.push(StepRecord {
            step,
            success,
            message: message.into(),
        });
    }

    pub fn steps(&self) -> &[StepRecord] {
        &self.steps
    }

    pub fn finish(
        self,
        final_status: RepositoryStatus,
        remote_url: Option<String>,
        error: Option<ErrorDetail>,
        cancelled: bool,
    ) -> SetupOutcome {
        SetupOutcome {
            steps: self.steps,
            remote_url,
            final_status,
            error,
            cancelled,
            started_at: self.started_at,
            finished_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_recorder_keeps_order_and_failures() {
        let mut recorder = OutcomeRecorder::start();
        recorder.record(Step::Stage, true, "Staged 2 path(s)");
        recorder.record(Step::Fetch, true, "Fetched origin");
        recorder.record(Step::Pull, false, "Merge conflict");

        let outcome = recorder.finish(
            RepositoryStatus::default(),
            None,
            Some(ErrorDetail {
                kind: ErrorKind::MergeConflict,
                step: Some(Step::Pull),
                message: "Merge conflict".into(),
                hint: None,
            }),
            false,
        );

        assert_eq!(outcome.mutating_steps(), vec![Step::Stage, Step::Pull]);
        assert!(!outcome.steps[2].success);
        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code(), 1);
        assert!(outcome.finished_at >= outcome.started_at);
    }

    #[test]
    fn test_cancelled_outcome_is_not_success() {
        let outcome = OutcomeRecorder::start().finish(RepositoryStatus::default(), None, None, true);
        assert!(!outcome.is_success());
        assert_eq!(outcome.exit_code(), 0);
    }

    #[test]
    fn test_browse_url_from_remote() {
        let outcome = OutcomeRecorder::start().finish(
            RepositoryStatus::default(),
            Some("git@github.com:octo/demo.git".into()),
            None,
            false,
        );
        assert_eq!(outcome.browse_url().as_deref(), Some("https://github.com/octo/demo"));
    }

    #[test]
    fn test_step_serializes_kebab_case() {
        let json = serde_json::to_string(&Step::CreateRemote).unwrap();
        assert_eq!(json, "\"create-remote\"");
    }
}
