use std::path::Path;

use crate::{Result, SsmSshError};

/// Read a freshly generated public key and check it is safe to append to
/// `authorized_keys`.
///
/// Returns the trimmed key line. The comment must be `key_identifier`, since
/// cleanup finds the remote entry by it.
pub fn read_public_key(path: &Path, key_identifier: &str) -> Result<String> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        SsmSshError::SshKeyInvalid(format!("Cannot read SSH key from {}: {}", path.display(), e))
    })?;

    let key = content.trim().to_string();
    validate_ssh_key_format(&key)?;

    let comment = key.split_whitespace().nth(2).unwrap_or_default();
    if comment != key_identifier {
        return Err(SsmSshError::SshKeyInvalid(format!(
            "expected key comment '{}', found '{}'",
            key_identifier, comment
        )));
    }

    Ok(key)
}

/// Validate that a string is a valid single-line OpenSSH public key.
fn validate_ssh_key_format(key: &str) -> Result<()> {
    let key = key.trim();

    if key.is_empty() {
        return Err(SsmSshError::SshKeyInvalid("SSH key is empty".to_string()));
    }

    // Reject multi-line keys (prevents authorized_keys injection)
    if key.contains('\n') || key.contains('\r') {
        return Err(SsmSshError::SshKeyInvalid(
            "SSH key contains multiple lines. Only single-line keys are supported.".to_string(),
        ));
    }

    let valid_prefixes = ["ssh-rsa ", "ssh-ed25519 ", "ecdsa-sha2-nistp"];

    let is_valid_prefix = valid_prefixes.iter().any(|prefix| key.starts_with(prefix));
    if !is_valid_prefix {
        return Err(SsmSshError::SshKeyInvalid(format!(
            "Invalid SSH public key format. Must start with 'ssh-rsa', 'ssh-ed25519', or 'ecdsa-sha2-nistp*'. Got: {}...",
            key.chars().take(30).collect::<String>()
        )));
    }

    // type, base64-encoded key material, optional comment
    let parts: Vec<&str> = key.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(SsmSshError::SshKeyInvalid(
            "SSH key appears malformed (missing key data)".to_string(),
        ));
    }

    let key_material = parts[1];
    if !key_material
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '+' || c == '/' || c == '=')
    {
        return Err(SsmSshError::SshKeyInvalid(
            "SSH key material contains invalid characters (expected base64)".to_string(),
        ));
    }

    if key_material.len() < 50 {
        return Err(SsmSshError::SshKeyInvalid(
            "SSH key material too short (expected at least 50 characters)".to_string(),
        ));
    }

    Ok(())
}
