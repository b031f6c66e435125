use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use indicatif::ProgressBar;

use super::Runner;
use crate::state::LocalStateStore;
use crate::ui::{finish_group, group_spinner};
use crate::Result;

/// Runner for invocations from a terminal or an unrecognised CI system.
///
/// Inputs come from command-line flags, state lives in a JSON file, and each
/// log group is shown as a spinner.
pub struct LocalRunner {
    inputs: HashMap<String, String>,
    store: LocalStateStore,
    verbose: bool,
    group: Mutex<Option<(String, ProgressBar)>>,
    failed: AtomicBool,
}

impl LocalRunner {
    pub fn new(inputs: HashMap<String, String>, verbose: bool) -> Self {
        Self::with_store(inputs, verbose, LocalStateStore::at_default_path())
    }

    pub fn with_store(inputs: HashMap<String, String>, verbose: bool, store: LocalStateStore) -> Self {
        Self {
            inputs,
            store,
            verbose,
            group: Mutex::new(None),
            failed: AtomicBool::new(false),
        }
    }

    /// Print a line without tearing the active spinner.
    fn emit(&self, line: &str) {
        let group = self.group.lock().unwrap_or_else(|e| e.into_inner());
        match group.as_ref() {
            Some((_, spinner)) if !spinner.is_hidden() => spinner.println(line),
            _ => println!("{}", line),
        }
    }
}

impl Runner for LocalRunner {
    fn get_input(&self, name: &str) -> String {
        self.inputs
            .get(name)
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    }

    fn save_state(&self, name: &str, value: &str) -> Result<()> {
        self.store.save_state(name, value)
    }

    fn get_state(&self, name: &str) -> String {
        match self.store.get_state(name) {
            Ok(value) => value.unwrap_or_default(),
            Err(e) => {
                self.warning(&format!("Cannot read state '{}': {}", name, e));
                String::new()
            }
        }
    }

    fn info(&self, message: &str) {
        self.emit(message);
    }

    fn warning(&self, message: &str) {
        self.emit(&format!("Warning: {}", message));
    }

    fn debug(&self, message: &str) {
        if self.verbose {
            self.emit(&format!("debug: {}", message));
        }
    }

    fn start_group(&self, name: &str) {
        let mut group = self.group.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, previous)) = group.take() {
            previous.finish_and_clear();
        }
        *group = Some((name.to_string(), group_spinner(name)));
    }

    fn end_group(&self) {
        let mut group = self.group.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((name, spinner)) = group.take() {
            finish_group(spinner, &name);
        }
    }

    fn set_failed(&self, message: &str) {
        self.failed.store(true, Ordering::SeqCst);
        let mut group = self.group.lock().unwrap_or_else(|e| e.into_inner());
        if let Some((_, spinner)) = group.take() {
            spinner.abandon();
        }
        eprintln!("Error: {}", message);
    }

    fn has_failed(&self) -> bool {
        self.failed.load(Ordering::SeqCst)
    }

    fn is_debug(&self) -> bool {
        self.verbose
    }
}
