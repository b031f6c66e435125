use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// Spinner shown while a log group is open
pub fn group_spinner(name: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg} [{elapsed}]")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(name.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Close a group's spinner, or print a line when output is not a terminal.
pub fn finish_group(spinner: ProgressBar, name: &str) {
    if spinner.is_hidden() {
        println!("{} ... done", name);
    } else {
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("✔ {msg} [{elapsed}]")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.finish_with_message(name.to_string());
    }
}
