//! Infrastructure adapters for git, config, and the desktop.

pub mod config;
pub mod desktop;
pub mod git;
