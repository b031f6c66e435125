mod config;
mod key_loader;
mod keygen;

pub use config::{append_host_entry, HostEntry};
pub use key_loader::read_public_key;
pub use keygen::{
    public_key_path, remove_keypair, restrict_permissions, KeyGenerator, SshKeygen,
};

/// Session Manager command the ProxyCommand runs for each connection
pub fn start_session_command(region: &str) -> String {
    format!(
        "aws ssm start-session --target %h --document-name AWS-StartSSHSession --parameters 'portNumber=%p' --region {}",
        region
    )
}
