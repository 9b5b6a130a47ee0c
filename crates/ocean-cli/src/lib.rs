//! # ocean-cli
//!
//! `oceanctl`, a command-line client for droplets, snapshots and app
//! platform apps.
//!
//! Provides commands for:
//! - Creating, listing and deleting droplets
//! - Listing and deleting droplet and volume snapshots
//! - Creating, updating and deploying apps from JSON/YAML specs
//! - Streaming app logs and opening interactive consoles
//!
//! # Architecture
//!
//! Commands are thin structs generic over the `ocean-api` service traits.
//! Every output goes through an `impl Write`, so tests drive commands with
//! in-memory buffers and fake services.
//!
//! ```text
//! ┌──────────┐   DropletsService / AppsService / ...   ┌───────────┐
//! │ commands │────────────────────────────────────────►│ ApiClient │
//! └────┬─────┘                                          └───────────┘
//!      │ logs -f, console
//!      ▼
//! ┌──────────┐     websocket     ┌──────────────┐
//! │ listen   │◄─────────────────►│ stream proxy │
//! └──────────┘                   └──────────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod confirm;
pub mod displayers;
pub mod error;
pub mod glob;
pub mod listen;
pub mod output;
pub mod spec_file;
pub mod terminal;
pub mod wait;

#[cfg(test)]
mod testing;

pub use cli::{AppsCommands, Cli, Commands, ComputeCommands, DropletCommands, Format, SnapshotCommands};
pub use config::{ConfigFile, Settings};
pub use error::CliError;
pub use output::OutputFormat;
