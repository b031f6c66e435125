mod inputs;

pub use inputs::{ActionInputs, AWS_REGION, EC2_INSTANCE_ID, REMOTE_USER};
