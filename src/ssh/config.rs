use std::io::Write;
use std::path::Path;

use crate::Result;

/// Shell wrapper for the ProxyCommand on Windows runners
pub const WINDOWS_PROXY_RUNNER: &str =
    "C:\\Windows\\System32\\WindowsPowerShell\\v1.0\\powershell.exe";

/// Shell wrapper for the ProxyCommand everywhere else
pub const POSIX_PROXY_RUNNER: &str = "sh -c";

/// Connect timeout written into each host entry (seconds)
pub const CONNECT_TIMEOUT_SECS: u32 = 20;

/// Shell wrapper for the current platform
pub fn proxy_runner() -> &'static str {
    if cfg!(windows) {
        WINDOWS_PROXY_RUNNER
    } else {
        POSIX_PROXY_RUNNER
    }
}

/// One `Host` block routing an instance id through Session Manager
#[derive(Debug, Clone)]
pub struct HostEntry<'a> {
    pub instance_id: &'a str,
    pub user: &'a str,
    pub identity_file: &'a Path,
    pub region: &'a str,
}

impl HostEntry<'_> {
    pub fn render(&self, proxy_runner: &str) -> String {
        let identity_file = self.identity_file.display().to_string();
        let identity_file = if identity_file.contains(char::is_whitespace) {
            format!("\"{}\"", identity_file)
        } else {
            identity_file
        };

        format!(
            r#"
# SSH config for SSM session
Host {instance_id}
  ProxyCommand {proxy_runner} "{start_session}"
  User {user}
  IdentityFile {identity_file}
  StrictHostKeyChecking no
  UserKnownHostsFile /dev/null
  ConnectTimeout {timeout}
  LogLevel ERROR
"#,
            instance_id = self.instance_id,
            start_session = super::start_session_command(self.region),
            user = self.user,
            timeout = CONNECT_TIMEOUT_SECS,
        )
    }
}

/// Append a host entry to an SSH client config, creating it if needed, and
/// reset the file to 0600.
pub fn append_host_entry(config_path: &Path, entry: &HostEntry<'_>) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .append(true)
        .create(true)
        .open(config_path)?;
    file.write_all(entry.render(proxy_runner()).as_bytes())?;
    drop(file);

    super::restrict_permissions(config_path)?;
    Ok(())
}
