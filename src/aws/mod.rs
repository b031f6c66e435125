pub mod client;

pub use client::{AwsClients, SdkConnector};

use crate::remote::RemoteShell;
use crate::Result;

/// Who the configured credentials belong to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallerIdentity {
    pub account_id: String,
    pub arn: String,
}

/// Builds region-bound clients that can run commands on instances.
pub trait AwsConnector {
    type Shell: RemoteShell;

    async fn connect(&self, region: &str) -> Result<Self::Shell>;
}
