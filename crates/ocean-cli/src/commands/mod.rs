//! CLI command implementations.
//!
//! Each submodule implements one command group:
//! - [`droplet`] - Droplet create, get, list and delete
//! - [`snapshot`] - Snapshot list, get and delete
//! - [`apps`] - App platform apps, deployments, logs and consoles
//! - [`dev_config`] - Local per-project app settings

pub mod apps;
pub mod dev_config;
pub mod droplet;
pub mod snapshot;

pub use apps::AppsCommand;
pub use dev_config::DevConfigCommand;
pub use droplet::DropletCommand;
pub use snapshot::SnapshotCommand;
