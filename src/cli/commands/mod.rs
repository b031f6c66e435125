pub mod cleanup;
pub mod setup;
