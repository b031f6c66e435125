//! CI platform primitives: inputs, persisted state, and grouped logging.
//!
//! Workflows only talk to the platform through [`Runner`], so the same setup
//! and cleanup code runs under GitHub Actions, from a developer's shell, and
//! against the in-memory runner used by tests.

mod github;
mod local;

pub use github::GithubRunner;
pub use local::LocalRunner;

use std::collections::HashMap;

use crate::{Result, SsmSshError};

/// Environment variable GitHub sets on every hosted and self-hosted runner.
const GITHUB_ACTIONS_ENV: &str = "GITHUB_ACTIONS";

pub trait Runner {
    /// Raw input value, trimmed. Empty when the input was not supplied.
    fn get_input(&self, name: &str) -> String;

    fn save_state(&self, name: &str, value: &str) -> Result<()>;

    /// Value saved by an earlier invocation, or empty.
    fn get_state(&self, name: &str) -> String;

    fn info(&self, message: &str);
    fn warning(&self, message: &str);
    fn debug(&self, message: &str);

    fn start_group(&self, name: &str);
    fn end_group(&self);

    /// Record an error and make the process exit non-zero.
    fn set_failed(&self, message: &str);
    fn has_failed(&self) -> bool;

    fn is_debug(&self) -> bool;

    /// Environment lookup; empty values count as unset.
    fn env(&self, name: &str) -> Option<String> {
        std::env::var(name).ok().filter(|v| !v.is_empty())
    }

    fn get_required_input(&self, name: &str) -> Result<String> {
        let value = self.get_input(name);
        if value.is_empty() {
            return Err(SsmSshError::MissingInput(name.to_string()));
        }
        Ok(value)
    }
}

/// Pick the runner for the current process.
///
/// `overrides` holds inputs given on the command line; they win over anything
/// the platform provides.
pub fn detect(overrides: HashMap<String, String>, verbose: bool) -> Box<dyn Runner> {
    let on_github = std::env::var(GITHUB_ACTIONS_ENV)
        .map(|v| v == "true")
        .unwrap_or(false);

    if on_github {
        Box::new(GithubRunner::new(overrides))
    } else {
        Box::new(LocalRunner::new(overrides, verbose))
    }
}
