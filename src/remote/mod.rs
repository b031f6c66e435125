pub mod command;

use crate::aws::CallerIdentity;
use crate::Result;

/// SSM document that runs a list of shell commands on Linux instances
pub const RUN_SHELL_SCRIPT_DOCUMENT: &str = "AWS-RunShellScript";

/// Execution budget for remote scripts, enforced by the SSM agent
pub const SCRIPT_TIMEOUT_SECONDS: i32 = 300;

/// A shell command to run on one instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellCommand {
    pub instance_id: String,
    pub script: String,
    /// Human-readable note shown in the SSM console
    pub comment: String,
}

/// Dispatches shell commands to instances.
///
/// Dispatch only: implementations return once the command is accepted and
/// never wait for it to run.
pub trait RemoteShell {
    fn identity(&self) -> &CallerIdentity;

    /// Returns the command id, when the service reports one.
    async fn send_shell_command(&self, command: &ShellCommand) -> Result<Option<String>>;
}
