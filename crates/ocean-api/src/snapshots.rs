//! Droplet and volume snapshots.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiError;

/// A snapshot of a droplet or block storage volume.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Snapshot {
    /// Snapshot ID. Droplet snapshots use numeric IDs, volume snapshots UUIDs.
    pub id: String,
    /// Snapshot name.
    pub name: String,
    /// Creation time as reported by the API.
    pub created_at: String,
    /// Regions the snapshot is available in.
    pub regions: Vec<String>,
    /// ID of the source resource.
    pub resource_id: String,
    /// `droplet` or `volume`.
    pub resource_type: String,
    /// Minimum disk size in GB needed to restore.
    pub min_disk_size: u64,
    /// Billable size in GiB.
    pub size_gigabytes: f64,
    /// Tags.
    pub tags: Vec<String>,
}

/// Snapshot operations.
pub trait SnapshotsService: Send + Sync {
    /// List every snapshot.
    fn list_snapshots(&self) -> impl Future<Output = Result<Vec<Snapshot>, ApiError>> + Send;

    /// List droplet snapshots.
    fn list_droplet_snapshots(&self) -> impl Future<Output = Result<Vec<Snapshot>, ApiError>> + Send;

    /// List volume snapshots.
    fn list_volume_snapshots(&self) -> impl Future<Output = Result<Vec<Snapshot>, ApiError>> + Send;

    /// List volume snapshots available in `region`.
    fn list_volume_snapshots_by_region(
        &self,
        region: &str,
    ) -> impl Future<Output = Result<Vec<Snapshot>, ApiError>> + Send;

    /// Fetch one snapshot.
    fn get_snapshot(&self, id: &str) -> impl Future<Output = Result<Snapshot, ApiError>> + Send;

    /// Delete one snapshot.
    fn delete_snapshot(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl SnapshotsService for ApiClient {
    async fn list_snapshots(&self) -> Result<Vec<Snapshot>, ApiError> {
        self.list_all("v2/snapshots", &[], "snapshots").await
    }

    async fn list_droplet_snapshots(&self) -> Result<Vec<Snapshot>, ApiError> {
        self.list_all("v2/snapshots", &[("resource_type", "droplet")], "snapshots")
            .await
    }

    async fn list_volume_snapshots(&self) -> Result<Vec<Snapshot>, ApiError> {
        self.list_all("v2/snapshots", &[("resource_type", "volume")], "snapshots")
            .await
    }

    async fn list_volume_snapshots_by_region(&self, region: &str) -> Result<Vec<Snapshot>, ApiError> {
        let snapshots = self.list_volume_snapshots().await?;
        Ok(in_region(snapshots, region))
    }

    async fn get_snapshot(&self, id: &str) -> Result<Snapshot, ApiError> {
        self.get_key(&format!("v2/snapshots/{id}"), "snapshot").await
    }

    async fn delete_snapshot(&self, id: &str) -> Result<(), ApiError> {
        self.delete_path(&format!("v2/snapshots/{id}")).await
    }
}

fn in_region(snapshots: Vec<Snapshot>, region: &str) -> Vec<Snapshot> {
    snapshots
        .into_iter()
        .filter(|s| s.regions.iter().any(|r| r == region))
        .collect()
}
