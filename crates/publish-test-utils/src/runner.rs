//! [`RecordingRunner`]: a runner decorator that logs invocations.

use std::cell::RefCell;

use publish_exec::{CommandOutput, CommandRunner, Invocation, ProcessRunner, Result};

/// Delegates to an inner runner and keeps every invocation it saw.
pub struct RecordingRunner<R = ProcessRunner> {
    inner: R,
    seen: RefCell<Vec<Invocation>>,
}

impl Default for RecordingRunner<ProcessRunner> {
    fn default() -> Self {
        Self::new(ProcessRunner::default())
    }
}

impl<R: CommandRunner> RecordingRunner<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            seen: RefCell::new(Vec::new()),
        }
    }

    /// Every invocation in order.
    pub fn invocations(&self) -> Vec<Invocation> {
        self.seen.borrow().clone()
    }

    /// Number of invocations whose subcommand is `subcommand`.
    pub fn count(&self, subcommand: &str) -> usize {
        self.seen
            .borrow()
            .iter()
            .filter(|inv| inv.subcommand_is(subcommand))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.borrow().is_empty()
    }
}

impl<R: CommandRunner> CommandRunner for RecordingRunner<R> {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        self.seen.borrow_mut().push(invocation.clone());
        self.inner.run(invocation)
    }
}
