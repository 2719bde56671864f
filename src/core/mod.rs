// laralog - core/mod.rs
//
// Core business logic layer.
// Dependencies: util only.
// Must NOT depend on: platform or app. File contents are read only through
// the `parser::LogOpener` seam.

pub mod cache;
pub mod discovery;
pub mod export;
pub mod filter;
pub mod model;
pub mod parser;
pub mod query;
pub mod search;
pub mod stack_trace;
