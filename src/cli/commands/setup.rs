use crate::aws::{AwsConnector, SdkConnector};
use crate::config::ActionInputs;
use crate::remote::command::{authorize_key_script, run_as_user};
use crate::remote::{RemoteShell, ShellCommand};
use crate::runner::Runner;
use crate::session::{home_dir, Session};
use crate::ssh::{
    append_host_entry, read_public_key, remove_keypair, restrict_permissions, HostEntry,
    KeyGenerator, SshKeygen,
};
use crate::{state, Result};

/// Set to `true` to get the error back in `main` after marking the run failed
const SHOW_STACK_TRACE_ENV: &str = "SHOW_STACK_TRACE";

pub async fn execute(runner: &dyn Runner) -> Result<()> {
    let home = match home_dir() {
        Ok(home) => home,
        Err(e) => {
            runner.set_failed(&e.to_string());
            return Ok(());
        }
    };
    let session = Session::generate(&home, runner.env("GITHUB_RUN_ID").as_deref());

    run(runner, &SdkConnector, &SshKeygen, &session).await
}

/// Provision access for `session`.
///
/// Any failure is recorded on the runner instead of returned, after saving
/// enough state for cleanup to undo what was already created. The error is
/// only returned when `SHOW_STACK_TRACE=true`.
pub async fn run<C, K>(runner: &dyn Runner, connector: &C, keygen: &K, session: &Session) -> Result<()>
where
    C: AwsConnector,
    K: KeyGenerator,
{
    let Err(e) = provision(runner, connector, keygen, session).await else {
        return Ok(());
    };

    if let Err(state_err) = state::record_identifiers(runner, session) {
        runner.warning(&format!("Failed to save cleanup state: {}", state_err));
    }
    runner.set_failed(&e.to_string());

    if runner.env(SHOW_STACK_TRACE_ENV).as_deref() == Some("true") {
        return Err(e);
    }
    Ok(())
}

async fn provision<C, K>(runner: &dyn Runner, connector: &C, keygen: &K, session: &Session) -> Result<()>
where
    C: AwsConnector,
    K: KeyGenerator,
{
    runner.start_group("Setup SSH via SSM: Initializing");
    runner.debug(&format!("Session alias: {}", session.alias));

    let inputs = ActionInputs::from_runner(runner)?;

    runner.info("Determining AWS caller identity...");
    let shell = connector.connect(&inputs.aws_region).await?;
    let identity = shell.identity();
    runner.info(&format!(
        "Using AWS account {} ({}) in {}",
        identity.account_id, identity.arn, inputs.aws_region
    ));

    runner.end_group();

    runner.start_group("Setup SSH via SSM: Generating SSH Keys");

    tokio::fs::create_dir_all(&session.ssh_dir).await?;
    runner.info(&format!(
        "Generating SSH key pair at {}...",
        session.private_key_path.display()
    ));

    // Leftovers from an earlier run would make ssh-keygen prompt
    remove_keypair(&session.private_key_path).await?;

    keygen.generate(&session.private_key_path, &session.key_identifier)?;
    restrict_permissions(&session.private_key_path)?;

    let public_key = read_public_key(&session.public_key_path(), &session.key_identifier)?;

    runner.info(&format!(
        "SSH key generated. Public key identifier: {}",
        session.key_identifier
    ));
    runner.end_group();

    runner.start_group("Setup SSH via SSM: Configuring EC2 Instance");

    runner.info(&format!(
        "Adding public key ({}) to EC2 instance {}...",
        session.key_identifier, inputs.ec2_instance_id
    ));

    let command = ShellCommand {
        instance_id: inputs.ec2_instance_id.clone(),
        script: run_as_user(&inputs.remote_user, &authorize_key_script(&public_key)),
        comment: format!("Add temporary SSH key: {}", session.key_identifier),
    };
    let command_id = shell.send_shell_command(&command).await?;

    runner.debug(&format!(
        "SSM SendCommand (Add Key) result: {}",
        command_id.as_deref().unwrap_or("N/A")
    ));
    runner.info(
        "Command to add public key sent to EC2 instance. It may take a few seconds to apply.",
    );

    runner.end_group();

    runner.start_group("Setup SSH via SSM: Configuring Local SSH Client");

    let config_path = session.ssh_config_path();
    runner.info(&format!(
        "Configuring SSH host '{}' in {}...",
        inputs.ec2_instance_id,
        config_path.display()
    ));

    append_host_entry(
        &config_path,
        &HostEntry {
            instance_id: &inputs.ec2_instance_id,
            user: &inputs.remote_user,
            identity_file: &session.private_key_path,
            region: &inputs.aws_region,
        },
    )?;
    runner.info(&format!(
        "SSH config for host '{}' added.",
        inputs.ec2_instance_id
    ));

    runner.end_group();

    runner.start_group("Setup SSH via SSM: Finalizing");

    state::record_identifiers(runner, session)?;
    state::record_complete(runner)?;

    runner.info(&format!(
        "SSH setup via SSM complete. Connect with 'ssh {}'.",
        inputs.ec2_instance_id
    ));
    runner.end_group();

    Ok(())
}
