use std::path::{Path, PathBuf};

use directories::BaseDirs;

use crate::ssh::public_key_path;
use crate::{Result, SsmSshError};

/// Prefix of every session alias
pub const ALIAS_PREFIX: &str = "gh-actions-ssm-host-";

/// Run id used outside CI
const LOCAL_RUN_ID: &str = "local";

/// Names and paths for one setup/cleanup pairing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// `gh-actions-ssm-host-<uuid>`
    pub alias: String,
    /// Public key comment, and the pattern cleanup matches on
    pub key_identifier: String,
    pub ssh_dir: PathBuf,
    pub private_key_path: PathBuf,
}

impl Session {
    pub fn new(ssh_dir: PathBuf, alias: String, run_id: Option<&str>) -> Self {
        let key_identifier = format!("{}-{}", alias, run_id.unwrap_or(LOCAL_RUN_ID));
        let private_key_path = ssh_dir.join(format!("{}-key", alias));

        Self {
            alias,
            key_identifier,
            ssh_dir,
            private_key_path,
        }
    }

    /// Fresh session with a random alias under `<home>/.ssh`.
    pub fn generate(home: &Path, run_id: Option<&str>) -> Self {
        let alias = format!("{}{}", ALIAS_PREFIX, uuid::Uuid::new_v4());
        Self::new(home.join(".ssh"), alias, run_id)
    }

    pub fn public_key_path(&self) -> PathBuf {
        public_key_path(&self.private_key_path)
    }

    pub fn ssh_config_path(&self) -> PathBuf {
        self.ssh_dir.join("config")
    }
}

/// Get the user's home directory.
pub fn home_dir() -> Result<PathBuf> {
    BaseDirs::new()
        .map(|dirs| dirs.home_dir().to_path_buf())
        .ok_or(SsmSshError::HomeDirNotFound)
}
