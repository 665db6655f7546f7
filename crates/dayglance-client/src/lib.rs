//! CLI, configuration, rendering and the refresh loop
//!
//! This crate provides the `dayglance` command-line interface.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod render;
pub mod watch;

pub use cli::Cli;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use render::Renderer;
