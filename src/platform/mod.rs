// laralog - platform/mod.rs
//
// Platform abstraction layer.
// Dependencies: util, core (to implement its seams and build its configs),
// directories crate.
// Must NOT depend on: app.

pub mod config;
pub mod fs;
