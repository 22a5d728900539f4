//! stackwatch library: replay scripts, CLI configuration and wiring of the
//! progress renderer.

pub mod app;
pub mod config;
pub mod errors;
pub mod script;
