// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod host;
pub mod logging;
pub mod passage;
pub mod runtime;
pub mod score;
pub mod session;
pub mod source;
pub mod ui;
pub mod window;
