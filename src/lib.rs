// laralog - lib.rs
//
// Library entry point, exposing all modules for the CLI binary, integration
// testing, and programmatic use.

pub mod app;
pub mod core;
pub mod platform;
pub mod util;
