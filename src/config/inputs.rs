use crate::runner::Runner;
use crate::{Result, SsmSshError};

pub const EC2_INSTANCE_ID: &str = "ec2-instance-id";
pub const REMOTE_USER: &str = "remote-user";
pub const AWS_REGION: &str = "aws-region";

/// Region fallbacks, in order
const REGION_ENV_VARS: &[&str] = &["AWS_REGION", "AWS_DEFAULT_REGION"];

/// Inputs both workflows need
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionInputs {
    pub ec2_instance_id: String,
    pub remote_user: String,
    pub aws_region: String,
}

impl ActionInputs {
    pub fn from_runner(runner: &dyn Runner) -> Result<Self> {
        let ec2_instance_id = runner.get_required_input(EC2_INSTANCE_ID)?;
        let remote_user = runner.get_required_input(REMOTE_USER)?;

        let fallbacks = REGION_ENV_VARS.iter().map(|name| runner.env(name));
        let aws_region = resolve_region(&runner.get_input(AWS_REGION), fallbacks)?;

        Self::validate_token(EC2_INSTANCE_ID, &ec2_instance_id)?;
        Self::validate_token(REMOTE_USER, &remote_user)?;
        Self::validate_token(AWS_REGION, &aws_region)?;

        Ok(Self {
            ec2_instance_id,
            remote_user,
            aws_region,
        })
    }

    /// Values end up as single words in the SSH config; reject anything that
    /// could start a new directive.
    pub fn validate_token(name: &str, value: &str) -> Result<()> {
        if value.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(SsmSshError::Config(format!(
                "Input '{}' must not contain whitespace or control characters",
                name
            )));
        }
        Ok(())
    }
}

/// First non-empty of the explicit input and the environment fallbacks.
pub fn resolve_region<I>(input: &str, fallbacks: I) -> Result<String>
where
    I: IntoIterator<Item = Option<String>>,
{
    let input = input.trim();
    if !input.is_empty() {
        return Ok(input.to_string());
    }

    fallbacks
        .into_iter()
        .flatten()
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .ok_or(SsmSshError::RegionNotSpecified)
}
