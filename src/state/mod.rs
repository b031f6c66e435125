//! Handoff between the setup and cleanup invocations.

mod local;

pub use local::LocalStateStore;

use std::path::PathBuf;

use crate::runner::Runner;
use crate::session::Session;
use crate::Result;

pub const SETUP_COMPLETE: &str = "setupComplete";
pub const KEY_IDENTIFIER: &str = "keyIdentifier";
pub const PRIVATE_KEY_PATH: &str = "privateKeyPath";

/// Save what cleanup needs to find the session's artifacts.
pub fn record_identifiers(runner: &dyn Runner, session: &Session) -> Result<()> {
    runner.save_state(KEY_IDENTIFIER, &session.key_identifier)?;
    runner.save_state(
        PRIVATE_KEY_PATH,
        &session.private_key_path.display().to_string(),
    )?;
    Ok(())
}

pub fn record_complete(runner: &dyn Runner) -> Result<()> {
    runner.save_state(SETUP_COMPLETE, "true")
}

/// State as read back by cleanup
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveredState {
    pub setup_complete: bool,
    pub key_identifier: Option<String>,
    pub private_key_path: Option<PathBuf>,
}

impl RecoveredState {
    pub fn read(runner: &dyn Runner) -> Self {
        let non_empty = |v: String| if v.is_empty() { None } else { Some(v) };

        Self {
            setup_complete: runner.get_state(SETUP_COMPLETE) == "true",
            key_identifier: non_empty(runner.get_state(KEY_IDENTIFIER)),
            private_key_path: non_empty(runner.get_state(PRIVATE_KEY_PATH)).map(PathBuf::from),
        }
    }

    /// Nothing at all was handed over by setup.
    pub fn is_empty(&self) -> bool {
        !self.setup_complete && self.key_identifier.is_none() && self.private_key_path.is_none()
    }
}
