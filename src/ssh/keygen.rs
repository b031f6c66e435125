use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::{Result, SsmSshError};

/// Creates a passphrase-less keypair at a path.
pub trait KeyGenerator {
    /// Writes `private_key_path` and `<private_key_path>.pub`, with `comment`
    /// as the public key comment.
    fn generate(&self, private_key_path: &Path, comment: &str) -> Result<()>;
}

/// ECDSA-256 keys via the system `ssh-keygen`.
pub struct SshKeygen;

impl KeyGenerator for SshKeygen {
    fn generate(&self, private_key_path: &Path, comment: &str) -> Result<()> {
        tracing::debug!(path = %private_key_path.display(), "running ssh-keygen");

        let output = Command::new("ssh-keygen")
            .args(["-t", "ecdsa", "-b", "256", "-N", "", "-f"])
            .arg(private_key_path)
            .args(["-C", comment])
            .stdin(Stdio::null())
            .output()
            .map_err(|e| SsmSshError::KeyGeneration(format!("cannot run ssh-keygen: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(SsmSshError::KeyGeneration(format!(
                "exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

/// `<private>.pub`
pub fn public_key_path(private_key_path: &Path) -> PathBuf {
    let mut path = OsString::from(private_key_path.as_os_str());
    path.push(".pub");
    PathBuf::from(path)
}

/// Owner read/write only (0600).
pub fn restrict_permissions(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }

    #[cfg(not(unix))]
    {
        let _ = path;
    }

    Ok(())
}

/// Remove a keypair's two files concurrently.
///
/// Files that do not exist are skipped. Each removal runs to completion even
/// if the other fails; the first real failure is returned.
pub async fn remove_keypair(private_key_path: &Path) -> Result<()> {
    let public = public_key_path(private_key_path);
    let (private_result, public_result) = tokio::join!(
        remove_if_exists(private_key_path),
        remove_if_exists(&public)
    );
    private_result?;
    public_result
}

async fn remove_if_exists(path: &Path) -> Result<()> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) => {
            let err = SsmSshError::from(e);
            if err.is_ignorable() {
                Ok(())
            } else {
                Err(err)
            }
        }
    }
}
