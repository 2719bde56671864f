// laralog - app/mod.rs
//
// Application layer: session orchestration over discovery, search, and load.
// Dependencies: core layer, platform (config and the filesystem opener).

pub mod session;
