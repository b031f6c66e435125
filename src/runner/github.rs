use std::collections::HashMap;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use super::Runner;
use crate::{Result, SsmSshError};

/// File GitHub reads `save-state` file commands from
const GITHUB_STATE_ENV: &str = "GITHUB_STATE";

/// Set to `1` when the workflow is re-run with debug logging
const RUNNER_DEBUG_ENV: &str = "RUNNER_DEBUG";

/// Runner that speaks GitHub Actions workflow commands on stdout.
pub struct GithubRunner {
    overrides: HashMap<String, String>,
    failed: AtomicBool,
}

impl GithubRunner {
    pub fn new(overrides: HashMap<String, String>) -> Self {
        Self {
            overrides,
            failed: AtomicBool::new(false),
        }
    }
}

impl Runner for GithubRunner {
    fn get_input(&self, name: &str) -> String {
        if let Some(value) = self.overrides.get(name) {
            return value.trim().to_string();
        }
        std::env::var(input_env_name(name))
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn save_state(&self, name: &str, value: &str) -> Result<()> {
        match self.env(GITHUB_STATE_ENV) {
            Some(path) => {
                let delimiter = format!("ghadelimiter_{}", uuid::Uuid::new_v4());
                let message = file_command(name, value, &delimiter)?;
                append_file_command(Path::new(&path), &message)
            }
            None => {
                // Older runners without file commands
                println!(
                    "::save-state name={}::{}",
                    escape_property(name),
                    escape_data(value)
                );
                Ok(())
            }
        }
    }

    fn get_state(&self, name: &str) -> String {
        std::env::var(format!("STATE_{}", name)).unwrap_or_default()
    }

    fn info(&self, message: &str) {
        println!("{}", message);
    }

    fn warning(&self, message: &str) {
        println!("::warning::{}", escape_data(message));
    }

    fn debug(&self, message: &str) {
        println!("::debug::{}", escape_data(message));
    }

    fn start_group(&self, name: &str) {
        println!("::group::{}", escape_data(name));
    }

    fn end_group(&self) {
        println!("::endgroup::");
    }

    fn set_failed(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        println!("::error::{}", escape_data(message));
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn is_debug(&self) -> bool {
        std::env::var(RUNNER_DEBUG_ENV).map(|v| v == "1").unwrap_or(false)
    }
}

/// Environment variable carrying an action input: `ec2-instance-id` becomes
/// `INPUT_EC2-INSTANCE-ID`. Hyphens are kept, spaces become underscores.
pub fn input_env_name(name: &str) -> String {
    format!("INPUT_{}", name.replace(' ', "_").to_uppercase())
}

/// Escape message data for a workflow command.
pub fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escape a workflow command property value.
pub fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Heredoc-style key/value message for a file command.
fn file_command(name: &str, value: &str, delimiter: &str) -> Result<String> {
    if name.contains(delimiter) || value.contains(delimiter) {
        return Err(SsmSshError::StateStore(format!(
            "state '{}' contains the file command delimiter",
            name
        )));
    }
    Ok(format!("{name}<<{delimiter}\n{value}\n{delimiter}"))
}

fn append_file_command(path: &Path, message: &str) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| {
            SsmSshError::StateStore(format!("cannot open {}: {}", path.display(), e))
        })?;
    writeln!(file, "{}", message)?;
    Ok(())
}
