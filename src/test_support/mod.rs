//! Test utilities and mocks for freight unit tests.
//!
//! [`MockRunner`] stands in for [`SystemRunner`](crate::util::SystemRunner)
//! so backend lifecycles can be exercised without `rpmbuild` or a package
//! manager installed.
//!
//! # Example
//!
//! ```rust,ignore
//! use freight::test_support::{sample_manifest, MockRunner};
//!
//! let mut runner = MockRunner::new();
//! runner.respond("check-update", CommandResult::exited(100));
//!
//! let mut backend = RpmBackend::with_runner(BackendId::Yum, tmp.path(), runner);
//! // ...
//! assert_eq!(backend.runner().calls().len(), 2);
//! ```

pub mod fixtures;

use crate::util::errors::Result;
use crate::util::process::{CommandResult, CommandRunner, ProcessBuilder};

// Re-export fixtures for convenience
pub use fixtures::*;

/// Pattern for matching commands in MockRunner.
#[derive(Debug, Clone)]
pub enum CommandPattern {
    /// Exact match on full command string.
    Exact(String),
    /// Match if command starts with prefix.
    StartsWith(String),
    /// Match if command contains substring.
    Contains(String),
}

impl CommandPattern {
    /// Check if this pattern matches the given command.
    pub fn matches(&self, cmd: &str) -> bool {
        match self {
            CommandPattern::Exact(s) => cmd == s,
            CommandPattern::StartsWith(s) => cmd.starts_with(s),
            CommandPattern::Contains(s) => cmd.contains(s),
        }
    }
}

/// Mock command runner.
///
/// Records every rendered command line. Commands matching a scripted
/// response get that result; everything else exits with status 0.
#[derive(Debug, Default)]
pub struct MockRunner {
    responses: Vec<(CommandPattern, CommandResult)>,
    calls: Vec<String>,
    echoed: Vec<bool>,
}

impl MockRunner {
    /// Create a runner where every command succeeds.
    pub fn new() -> Self {
        MockRunner::default()
    }

    /// Return `result` for commands containing `substring`.
    pub fn respond(&mut self, substring: &str, result: CommandResult) -> &mut Self {
        self.respond_pattern(CommandPattern::Contains(substring.to_string()), result)
    }

    /// Return `result` for commands matching `pattern`.
    pub fn respond_pattern(&mut self, pattern: CommandPattern, result: CommandResult) -> &mut Self {
        self.responses.push((pattern, result));
        self
    }

    /// Get all commands that were run, in order.
    pub fn calls(&self) -> &[String] {
        &self.calls
    }

    /// Whether each recorded command was run with output echoing.
    pub fn echoed(&self) -> &[bool] {
        &self.echoed
    }
}

impl CommandRunner for MockRunner {
    fn run(&mut self, cmd: &ProcessBuilder, echo: bool) -> Result<CommandResult> {
        let full_cmd = cmd.display_command();
        let result = self
            .responses
            .iter()
            .find(|(pattern, _)| pattern.matches(&full_cmd))
            .map(|(_, result)| *result)
            .unwrap_or(CommandResult::exited(0));

        self.calls.push(full_cmd);
        self.echoed.push(echo);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_runner_records_calls() {
        let mut runner = MockRunner::new();
        runner.respond_pattern(
            CommandPattern::StartsWith("yum".to_string()),
            CommandResult::exited(100),
        );

        let yum = ProcessBuilder::new("yum").arg("check-update");
        let tar = ProcessBuilder::new("tar").arg("-jcf");

        assert_eq!(runner.run(&yum, true).unwrap().code, Some(100));
        assert!(runner.run(&tar, false).unwrap().success());
        assert_eq!(runner.calls(), ["yum check-update", "tar -jcf"]);
        assert_eq!(runner.echoed(), [true, false]);
    }

    #[test]
    fn test_first_matching_response_wins() {
        let mut runner = MockRunner::new();
        runner
            .respond_pattern(
                CommandPattern::Exact("rpmbuild -bs a.spec".to_string()),
                CommandResult::exited(1),
            )
            .respond("rpmbuild", CommandResult::exited(2));

        let exact = ProcessBuilder::new("rpmbuild").args(["-bs", "a.spec"]);
        let other = ProcessBuilder::new("rpmbuild").arg("--rebuild");

        assert_eq!(runner.run(&exact, false).unwrap().code, Some(1));
        assert_eq!(runner.run(&other, false).unwrap().code, Some(2));
    }
}
