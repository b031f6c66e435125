mod spinner;

pub use spinner::{finish_group, group_spinner};
