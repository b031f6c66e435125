use aws_config::BehaviorVersion;
use aws_sdk_ssm::Client as SsmClient;
use aws_sdk_sts::Client as StsClient;

use super::{AwsConnector, CallerIdentity};
use crate::remote::{RemoteShell, ShellCommand, RUN_SHELL_SCRIPT_DOCUMENT, SCRIPT_TIMEOUT_SECONDS};
use crate::{Result, SsmSshError};

/// AWS client wrapper holding the service clients for one region
#[derive(Clone)]
pub struct AwsClients {
    pub ssm: SsmClient,
    pub identity: CallerIdentity,
}

impl AwsClients {
    /// Create clients bound to `region` and verify the credentials.
    pub async fn with_region(region: &str) -> Result<Self> {
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(aws_config::Region::new(region.to_string()))
            .load()
            .await;

        let ssm = SsmClient::new(&config);
        let sts = StsClient::new(&config);

        let identity = sts
            .get_caller_identity()
            .send()
            .await
            .map_err(SsmSshError::sts)?;

        let account_id = identity
            .account()
            .ok_or_else(|| {
                SsmSshError::AwsCredentials("caller identity has no account".to_string())
            })?
            .to_string();

        tracing::debug!(region, account_id = %account_id, "AWS clients ready");

        Ok(Self {
            ssm,
            identity: CallerIdentity {
                account_id,
                arn: identity.arn().unwrap_or_default().to_string(),
            },
        })
    }
}

impl RemoteShell for AwsClients {
    fn identity(&self) -> &CallerIdentity {
        &self.identity
    }

    async fn send_shell_command(&self, command: &ShellCommand) -> Result<Option<String>> {
        let output = self
            .ssm
            .send_command()
            .instance_ids(&command.instance_id)
            .document_name(RUN_SHELL_SCRIPT_DOCUMENT)
            .parameters("commands", vec![command.script.clone()])
            .comment(&command.comment)
            .timeout_seconds(SCRIPT_TIMEOUT_SECONDS)
            .send()
            .await
            .map_err(SsmSshError::ssm)?;

        Ok(output
            .command()
            .and_then(|c| c.command_id())
            .map(String::from))
    }
}

/// Connects through the AWS SDK default credential chain
pub struct SdkConnector;

impl AwsConnector for SdkConnector {
    type Shell = AwsClients;

    async fn connect(&self, region: &str) -> Result<AwsClients> {
        AwsClients::with_region(region).await
    }
}
