//! Actions: asynchronous operations started by mutating calls.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiError;

/// Action is still running.
pub const ACTION_IN_PROGRESS: &str = "in-progress";
/// Action finished successfully.
pub const ACTION_COMPLETED: &str = "completed";
/// Action failed.
pub const ACTION_ERRORED: &str = "errored";

/// An action record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Action {
    /// Action ID.
    pub id: u64,
    /// `in-progress`, `completed` or `errored`.
    pub status: String,
    /// Action type, e.g. `create`.
    #[serde(rename = "type")]
    pub kind: String,
    /// When the action started.
    pub started_at: Option<DateTime<Utc>>,
    /// When the action finished.
    pub completed_at: Option<DateTime<Utc>>,
    /// ID of the resource acted upon.
    pub resource_id: u64,
    /// Type of the resource acted upon.
    pub resource_type: String,
    /// Region the action ran in.
    pub region_slug: String,
}

/// Link to an action returned alongside a mutating response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionLink {
    /// Action ID.
    pub id: u64,
    /// Relation, e.g. `create`.
    pub rel: String,
    /// Poll location, absolute or relative to the API base.
    pub href: String,
}

/// Action lookups.
pub trait ActionsService: Send + Sync {
    /// Fetch an action by ID.
    fn get_action(&self, id: u64) -> impl Future<Output = Result<Action, ApiError>> + Send;

    /// Fetch an action from the `href` of an [`ActionLink`].
    fn get_action_by_uri(&self, href: &str) -> impl Future<Output = Result<Action, ApiError>> + Send;
}

impl ActionsService for ApiClient {
    async fn get_action(&self, id: u64) -> Result<Action, ApiError> {
        self.get_key(&format!("v2/actions/{id}"), "action").await
    }

    async fn get_action_by_uri(&self, href: &str) -> Result<Action, ApiError> {
        self.get_key(href, "action").await
    }
}
