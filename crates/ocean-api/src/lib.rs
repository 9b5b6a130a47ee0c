//! # ocean-api
//!
//! Typed client for the cloud provider's public `/v2` REST API.
//!
//! Covers the resources `oceanctl` works with:
//! - Droplets (virtual machines) and their create actions
//! - Droplet and volume snapshots
//! - Projects (resource assignment)
//! - App platform apps, deployments, logs and console sessions
//!
//! # Architecture
//!
//! Each resource module exposes a service trait (`DropletsService`,
//! `AppsService`, ...) implemented by [`ApiClient`]. Commands are written
//! against the traits so tests can swap in fakes.
//!
//! ```text
//! ┌────────────┐   service traits   ┌───────────┐   HTTPS + JSON   ┌──────────┐
//! │ ocean-cli  │───────────────────►│ ApiClient │─────────────────►│ /v2 API  │
//! └────────────┘                    └───────────┘                  └──────────┘
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod actions;
pub mod apps;
pub mod client;
pub mod droplets;
pub mod error;
pub mod projects;
pub mod snapshots;

pub use actions::{Action, ActionLink, ActionsService};
pub use apps::AppsService;
pub use client::{ApiClient, ClientConfig, DEFAULT_API_URL};
pub use droplets::{CreatedDroplets, Droplet, DropletCreateRequest, DropletsService};
pub use error::ApiError;
pub use projects::{Project, ProjectResource, ProjectsService};
pub use snapshots::{Snapshot, SnapshotsService};
