//! Snapshot command implementation.

use std::io::Write;

use ocean_api::{Snapshot, SnapshotsService};

use crate::cli::{SnapshotCommands, SnapshotResource};
use crate::confirm::{Confirm, ask_for_confirm_delete};
use crate::displayers::Snapshots;
use crate::error::CliError;
use crate::glob::{compile_all, matches_any};
use crate::output::OutputFormat;

/// Snapshot command executor.
pub struct SnapshotCommand<'a, S> {
    client: &'a S,
    confirm: &'a dyn Confirm,
}

impl<'a, S: SnapshotsService> SnapshotCommand<'a, S> {
    /// Create a new snapshot command.
    #[must_use]
    pub fn new(client: &'a S, confirm: &'a dyn Confirm) -> Self {
        Self { client, confirm }
    }

    /// Execute a snapshot subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if arguments are missing or an API call fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: &SnapshotCommands,
    ) -> Result<(), CliError> {
        match command {
            SnapshotCommands::List {
                globs,
                resource,
                region,
                display,
            } => {
                let snapshots = self.list(globs, *resource, region.as_deref()).await?;
                format.with_display(display).write(writer, &Snapshots(snapshots))?;
            }
            SnapshotCommands::Get { ids, display } => {
                if ids.is_empty() {
                    return Err(CliError::missing_args("snapshot.get"));
                }
                let mut snapshots = Vec::with_capacity(ids.len());
                for id in ids {
                    snapshots.push(self.client.get_snapshot(id).await?);
                }
                format.with_display(display).write(writer, &Snapshots(snapshots))?;
            }
            SnapshotCommands::Delete { ids, force } => {
                if ids.is_empty() {
                    return Err(CliError::missing_args("snapshot.delete"));
                }
                if !force {
                    ask_for_confirm_delete(self.confirm, "snapshot", ids.len())?;
                }
                for id in ids {
                    self.client.delete_snapshot(id).await?;
                }
            }
        }
        Ok(())
    }

    /// List snapshots matching the globs and region.
    ///
    /// A snapshot without regions passes any region filter.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob is invalid or the API call fails.
    pub async fn list(
        &self,
        globs: &[String],
        resource: Option<SnapshotResource>,
        region: Option<&str>,
    ) -> Result<Vec<Snapshot>, CliError> {
        let globs = compile_all(globs)?;
        let snapshots = match (resource, region) {
            (Some(SnapshotResource::Droplet), _) => self.client.list_droplet_snapshots().await?,
            (Some(SnapshotResource::Volume), Some(region)) => {
                self.client.list_volume_snapshots_by_region(region).await?
            }
            (Some(SnapshotResource::Volume), None) => self.client.list_volume_snapshots().await?,
            (None, _) => self.client.list_snapshots().await?,
        };
        Ok(snapshots
            .into_iter()
            .filter(|s| matches_any(&globs, &[s.id.as_str(), s.name.as_str()]))
            .filter(|s| region.is_none_or(|r| s.regions.is_empty() || s.regions.iter().any(|x| x == r)))
            .collect())
    }
}
