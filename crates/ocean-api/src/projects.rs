//! Projects. Only lookup and resource assignment are exposed.

use std::future::Future;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::error::ApiError;

/// A project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Project {
    /// Project ID.
    pub id: String,
    /// Owner UUID.
    pub owner_uuid: String,
    /// Project name.
    pub name: String,
    /// Description.
    pub description: String,
    /// Purpose.
    pub purpose: String,
    /// Environment, e.g. `Production`.
    pub environment: String,
    /// Whether this is the account's default project.
    pub is_default: bool,
    /// Creation time.
    pub created_at: String,
    /// Last update time.
    pub updated_at: String,
}

/// A resource assigned to a project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectResource {
    /// Resource URN, e.g. `do:droplet:1111`.
    pub urn: String,
    /// Assignment time.
    pub assigned_at: String,
    /// Assignment status.
    pub status: String,
}

#[derive(Debug, Serialize)]
struct AssignRequest<'a> {
    resources: &'a [String],
}

/// Project operations.
pub trait ProjectsService: Send + Sync {
    /// Fetch a project.
    fn get_project(&self, id: &str) -> impl Future<Output = Result<Project, ApiError>> + Send;

    /// Assign resources, identified by URN, to a project.
    fn assign_resources(
        &self,
        id: &str,
        urns: &[String],
    ) -> impl Future<Output = Result<Vec<ProjectResource>, ApiError>> + Send;
}

impl ProjectsService for ApiClient {
    async fn get_project(&self, id: &str) -> Result<Project, ApiError> {
        self.get_key(&format!("v2/projects/{id}"), "project").await
    }

    async fn assign_resources(&self, id: &str, urns: &[String]) -> Result<Vec<ProjectResource>, ApiError> {
        self.send_key(
            Method::POST,
            &format!("v2/projects/{id}/resources"),
            &AssignRequest { resources: urns },
            "resources",
        )
        .await
    }
}
