use std::future::Future;
use std::path::Path;

use crate::aws::{AwsConnector, SdkConnector};
use crate::config::ActionInputs;
use crate::remote::command::{revoke_key_script, run_as_user};
use crate::remote::{RemoteShell, ShellCommand};
use crate::runner::Runner;
use crate::ssh::{public_key_path, remove_keypair};
use crate::state::RecoveredState;
use crate::Result;

pub async fn execute(runner: &dyn Runner) {
    run(runner, &SdkConnector).await
}

/// Undo setup as far as possible. Never fails: problems become warnings.
pub async fn run<C: AwsConnector>(runner: &dyn Runner, connector: &C) {
    runner.info("Starting SSH via SSM cleanup process...");

    let recovered = RecoveredState::read(runner);

    if recovered.is_empty() {
        runner.warning(
            "Setup may not have completed successfully or no state was saved. Cleanup may be skipped or partial.",
        );
    }

    runner.info(&format!(
        "Retrieved state: setupComplete={}, keyIdentifier={}, privateKeyPath={}",
        recovered.setup_complete,
        recovered.key_identifier.as_deref().unwrap_or("N/A"),
        recovered
            .private_key_path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "N/A".to_string()),
    ));

    run_cleanup_step(
        runner,
        "Remove Public Key from EC2",
        remove_public_key(runner, connector, recovered.key_identifier.as_deref()),
    )
    .await;

    run_cleanup_step(
        runner,
        "Delete Local SSH Keys",
        delete_local_keys(runner, recovered.private_key_path.as_deref()),
    )
    .await;

    runner.info("SSH via SSM cleanup process finished.");
}

/// Run one step inside its own log group, downgrading failure to a warning.
async fn run_cleanup_step<F>(runner: &dyn Runner, name: &str, step: F)
where
    F: Future<Output = Result<()>>,
{
    runner.start_group(&format!("Cleanup Step: {}", name));

    match step.await {
        Ok(()) => runner.info(&format!("Cleanup step '{}' completed.", name)),
        Err(e) => {
            runner.warning(&format!("Cleanup step '{}' failed: {}", name, e));
            if runner.is_debug() {
                runner.debug(&format!("{:?}", e));
            }
        }
    }

    runner.end_group();
}

async fn remove_public_key<C: AwsConnector>(
    runner: &dyn Runner,
    connector: &C,
    key_identifier: Option<&str>,
) -> Result<()> {
    let Some(key_identifier) = key_identifier else {
        runner.info("Skipping public key removal: Missing required identifiers.");
        return Ok(());
    };

    let inputs = ActionInputs::from_runner(runner)?;

    runner.info(&format!(
        "Removing public key ('{}') from EC2 instance {}...",
        key_identifier, inputs.ec2_instance_id
    ));

    let shell = connector.connect(&inputs.aws_region).await?;
    let command = ShellCommand {
        instance_id: inputs.ec2_instance_id.clone(),
        script: run_as_user(&inputs.remote_user, &revoke_key_script(key_identifier)),
        comment: format!("Remove temporary SSH key: {}", key_identifier),
    };
    let command_id = shell.send_shell_command(&command).await?;

    runner.debug(&format!(
        "SSM SendCommand (Remove Key) result: {}",
        command_id.as_deref().unwrap_or("N/A")
    ));
    runner.info("Command to remove public key sent.");
    Ok(())
}

async fn delete_local_keys(runner: &dyn Runner, private_key_path: Option<&Path>) -> Result<()> {
    let Some(private_key_path) = private_key_path else {
        runner.info("Skipping local key deletion: Private key path not found.");
        return Ok(());
    };

    runner.info(&format!(
        "Deleting local SSH keys: {} and {}...",
        private_key_path.display(),
        public_key_path(private_key_path).display()
    ));
    remove_keypair(private_key_path).await?;
    runner.info("Local SSH keys deleted.");
    Ok(())
}
