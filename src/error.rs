use thiserror::Error;

#[derive(Error, Debug)]
pub enum SsmSshError {
    // AWS Errors
    #[error("AWS SSM error: {0}")]
    Ssm(String),

    #[error("AWS STS error: {0}")]
    Sts(String),

    #[error("AWS credentials not found or invalid: {0}")]
    AwsCredentials(String),

    // Input / Config Errors
    #[error("Input required and not supplied: {0}")]
    MissingInput(String),

    #[error(
        "AWS region not specified. Please set the \"aws-region\" input or AWS_REGION/AWS_DEFAULT_REGION environment variable."
    )]
    RegionNotSpecified,

    #[error("Configuration error: {0}")]
    Config(String),

    // SSH Key Errors
    #[error("ssh-keygen failed: {0}")]
    KeyGeneration(String),

    #[error("Invalid SSH public key: {0}")]
    SshKeyInvalid(String),

    #[error("Cannot determine home directory")]
    HomeDirNotFound,

    // State Errors
    #[error("State store error: {0}")]
    StateStore(String),

    #[error("State file corrupted: {0}")]
    StateCorrupted(String),

    // File/IO Errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

macro_rules! format_sdk_error {
    ($sdk:ident, $err:expr) => {{
        use $sdk::error::SdkError;
        match &$err {
            SdkError::ServiceError(service_err) => format!("{:?}", service_err.err()),
            SdkError::TimeoutError(_) => "Request timed out".to_string(),
            SdkError::DispatchFailure(dispatch) => {
                if dispatch.is_io() {
                    "Network error - please check your connection".to_string()
                } else if dispatch.is_timeout() {
                    "Connection timed out".to_string()
                } else {
                    format!("Connection error: {:?}", dispatch)
                }
            }
            SdkError::ConstructionFailure(_) => "Failed to construct request".to_string(),
            SdkError::ResponseError(resp) => format!("Response error: {:?}", resp),
            _ => $err.to_string(),
        }
    }};
}

impl SsmSshError {
    pub fn ssm<E, R>(err: aws_sdk_ssm::error::SdkError<E, R>) -> Self
    where
        E: std::fmt::Debug,
        R: std::fmt::Debug,
    {
        SsmSshError::Ssm(format_sdk_error!(aws_sdk_ssm, err))
    }

    pub fn sts<E, R>(err: aws_sdk_sts::error::SdkError<E, R>) -> Self
    where
        E: std::fmt::Debug,
        R: std::fmt::Debug,
    {
        SsmSshError::Sts(format_sdk_error!(aws_sdk_sts, err))
    }

    /// Whether best-effort removal may swallow this error. Only a missing
    /// file qualifies.
    pub fn is_ignorable(&self) -> bool {
        matches!(self, SsmSshError::Io(e) if e.kind() == std::io::ErrorKind::NotFound)
    }
}

pub type Result<T> = std::result::Result<T, SsmSshError>;
