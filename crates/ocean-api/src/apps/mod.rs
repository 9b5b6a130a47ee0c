//! App platform: apps, deployments, logs, console sessions, tiers, alerts
//! and buildpacks.

pub mod spec;
pub mod types;

use std::future::Future;

use reqwest::Method;
use serde::Serialize;

use crate::client::ApiClient;
use crate::error::ApiError;

pub use spec::AppSpec;
pub use types::{
    AlertDestinationUpdateRequest, App, AppAlert, AppCreateRequest, AppExec, AppInstanceSize, AppLogType, AppLogs,
    AppProposeRequest, AppProposeResponse, AppRegion, AppTier, AppUpdateRequest, Buildpack, Deployment,
    DeploymentPhase, DeploymentProgress, UpgradeBuildpackOptions, UpgradeBuildpackResponse,
};

const APPS_PATH: &str = "v2/apps";

/// Log request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogsRequest<'a> {
    /// App ID.
    pub app_id: &'a str,
    /// Deployment ID, empty for the active deployment.
    pub deployment_id: &'a str,
    /// Component name, empty for every component.
    pub component: &'a str,
    /// Log kind.
    pub log_type: AppLogType,
    /// Return a live stream URL.
    pub follow: bool,
    /// Number of trailing lines.
    pub tail_lines: i64,
}

#[derive(Debug, Serialize)]
struct DeploymentCreateRequest {
    force_build: bool,
}

#[derive(Debug, Serialize)]
struct RestartRequest<'a> {
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    components: &'a [String],
}

/// App platform operations.
pub trait AppsService: Send + Sync {
    /// Create an app.
    fn create(&self, req: &AppCreateRequest) -> impl Future<Output = Result<App, ApiError>> + Send;

    /// Fetch an app by ID.
    fn get(&self, app_id: &str) -> impl Future<Output = Result<App, ApiError>> + Send;

    /// Find an app by spec name (or ID) among all apps.
    fn find(&self, name: &str) -> impl Future<Output = Result<App, ApiError>> + Send;

    /// List apps.
    fn list(&self, with_projects: bool) -> impl Future<Output = Result<Vec<App>, ApiError>> + Send;

    /// Replace an app's spec.
    fn update(&self, app_id: &str, req: &AppUpdateRequest) -> impl Future<Output = Result<App, ApiError>> + Send;

    /// Delete an app.
    fn delete(&self, app_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Validate a spec and estimate its cost.
    fn propose(&self, req: &AppProposeRequest) -> impl Future<Output = Result<AppProposeResponse, ApiError>> + Send;

    /// Start a deployment.
    fn create_deployment(
        &self,
        app_id: &str,
        force_rebuild: bool,
    ) -> impl Future<Output = Result<Deployment, ApiError>> + Send;

    /// Fetch a deployment.
    fn get_deployment(
        &self,
        app_id: &str,
        deployment_id: &str,
    ) -> impl Future<Output = Result<Deployment, ApiError>> + Send;

    /// List an app's deployments.
    fn list_deployments(&self, app_id: &str) -> impl Future<Output = Result<Vec<Deployment>, ApiError>> + Send;

    /// Restart components, or the whole app when `components` is empty.
    fn restart(
        &self,
        app_id: &str,
        components: &[String],
    ) -> impl Future<Output = Result<Deployment, ApiError>> + Send;

    /// Locate logs.
    fn get_logs(&self, req: &LogsRequest<'_>) -> impl Future<Output = Result<AppLogs, ApiError>> + Send;

    /// Download one historic log archive.
    fn download_logs(&self, url: &str) -> impl Future<Output = Result<String, ApiError>> + Send;

    /// Open a console session on a component.
    fn get_exec(
        &self,
        app_id: &str,
        deployment_id: &str,
        component: &str,
    ) -> impl Future<Output = Result<AppExec, ApiError>> + Send;

    /// List regions.
    fn list_regions(&self) -> impl Future<Output = Result<Vec<AppRegion>, ApiError>> + Send;

    /// List tiers.
    fn list_tiers(&self) -> impl Future<Output = Result<Vec<AppTier>, ApiError>> + Send;

    /// Fetch a tier.
    fn get_tier(&self, slug: &str) -> impl Future<Output = Result<AppTier, ApiError>> + Send;

    /// List instance sizes.
    fn list_instance_sizes(&self) -> impl Future<Output = Result<Vec<AppInstanceSize>, ApiError>> + Send;

    /// Fetch an instance size.
    fn get_instance_size(&self, slug: &str) -> impl Future<Output = Result<AppInstanceSize, ApiError>> + Send;

    /// List an app's alerts.
    fn list_alerts(&self, app_id: &str) -> impl Future<Output = Result<Vec<AppAlert>, ApiError>> + Send;

    /// Replace the destinations of an alert.
    fn update_alert_destinations(
        &self,
        app_id: &str,
        alert_id: &str,
        req: &AlertDestinationUpdateRequest,
    ) -> impl Future<Output = Result<AppAlert, ApiError>> + Send;

    /// List available buildpacks.
    fn list_buildpacks(&self) -> impl Future<Output = Result<Vec<Buildpack>, ApiError>> + Send;

    /// Upgrade a buildpack across an app's components.
    fn upgrade_buildpack(
        &self,
        app_id: &str,
        opts: &UpgradeBuildpackOptions,
    ) -> impl Future<Output = Result<UpgradeBuildpackResponse, ApiError>> + Send;
}

impl AppsService for ApiClient {
    async fn create(&self, req: &AppCreateRequest) -> Result<App, ApiError> {
        self.send_key(Method::POST, APPS_PATH, req, "app").await
    }

    async fn get(&self, app_id: &str) -> Result<App, ApiError> {
        self.get_key(&format!("{APPS_PATH}/{app_id}"), "app").await
    }

    async fn find(&self, name: &str) -> Result<App, ApiError> {
        let apps = AppsService::list(self, false).await?;
        apps.into_iter()
            .find(|app| app.name() == name || app.id == name)
            .ok_or_else(|| ApiError::NotFound(format!("app \"{name}\"")))
    }

    async fn list(&self, with_projects: bool) -> Result<Vec<App>, ApiError> {
        if with_projects {
            self.list_all(APPS_PATH, &[("with_projects", "true")], "apps").await
        } else {
            self.list_all(APPS_PATH, &[], "apps").await
        }
    }

    async fn update(&self, app_id: &str, req: &AppUpdateRequest) -> Result<App, ApiError> {
        self.send_key(Method::PUT, &format!("{APPS_PATH}/{app_id}"), req, "app")
            .await
    }

    async fn delete(&self, app_id: &str) -> Result<(), ApiError> {
        self.delete_path(&format!("{APPS_PATH}/{app_id}")).await
    }

    async fn propose(&self, req: &AppProposeRequest) -> Result<AppProposeResponse, ApiError> {
        self.send_body(Method::POST, &format!("{APPS_PATH}/propose"), req).await
    }

    async fn create_deployment(&self, app_id: &str, force_rebuild: bool) -> Result<Deployment, ApiError> {
        self.send_key(
            Method::POST,
            &format!("{APPS_PATH}/{app_id}/deployments"),
            &DeploymentCreateRequest {
                force_build: force_rebuild,
            },
            "deployment",
        )
        .await
    }

    async fn get_deployment(&self, app_id: &str, deployment_id: &str) -> Result<Deployment, ApiError> {
        self.get_key(
            &format!("{APPS_PATH}/{app_id}/deployments/{deployment_id}"),
            "deployment",
        )
        .await
    }

    async fn list_deployments(&self, app_id: &str) -> Result<Vec<Deployment>, ApiError> {
        self.list_all(&format!("{APPS_PATH}/{app_id}/deployments"), &[], "deployments")
            .await
    }

    async fn restart(&self, app_id: &str, components: &[String]) -> Result<Deployment, ApiError> {
        self.send_key(
            Method::POST,
            &format!("{APPS_PATH}/{app_id}/restart"),
            &RestartRequest { components },
            "deployment",
        )
        .await
    }

    async fn get_logs(&self, req: &LogsRequest<'_>) -> Result<AppLogs, ApiError> {
        let url = self.resolve(&logs_path(req))?;
        self.get_body(url).await
    }

    async fn download_logs(&self, url: &str) -> Result<String, ApiError> {
        self.download(url).await
    }

    async fn get_exec(&self, app_id: &str, deployment_id: &str, component: &str) -> Result<AppExec, ApiError> {
        let path = if deployment_id.is_empty() {
            format!("{APPS_PATH}/{app_id}/components/{component}/exec")
        } else {
            format!("{APPS_PATH}/{app_id}/deployments/{deployment_id}/components/{component}/exec")
        };
        let url = self.resolve(&path)?;
        self.get_body(url).await
    }

    async fn list_regions(&self) -> Result<Vec<AppRegion>, ApiError> {
        self.get_key(&format!("{APPS_PATH}/regions"), "regions").await
    }

    async fn list_tiers(&self) -> Result<Vec<AppTier>, ApiError> {
        self.get_key(&format!("{APPS_PATH}/tiers"), "tiers").await
    }

    async fn get_tier(&self, slug: &str) -> Result<AppTier, ApiError> {
        self.get_key(&format!("{APPS_PATH}/tiers/{slug}"), "tier").await
    }

    async fn list_instance_sizes(&self) -> Result<Vec<AppInstanceSize>, ApiError> {
        self.get_key(&format!("{APPS_PATH}/tiers/instance_sizes"), "instance_sizes")
            .await
    }

    async fn get_instance_size(&self, slug: &str) -> Result<AppInstanceSize, ApiError> {
        self.get_key(&format!("{APPS_PATH}/tiers/instance_sizes/{slug}"), "instance_size")
            .await
    }

    async fn list_alerts(&self, app_id: &str) -> Result<Vec<AppAlert>, ApiError> {
        self.get_key(&format!("{APPS_PATH}/{app_id}/alerts"), "alerts").await
    }

    async fn update_alert_destinations(
        &self,
        app_id: &str,
        alert_id: &str,
        req: &AlertDestinationUpdateRequest,
    ) -> Result<AppAlert, ApiError> {
        self.send_key(
            Method::POST,
            &format!("{APPS_PATH}/{app_id}/alerts/{alert_id}/destinations"),
            req,
            "alert",
        )
        .await
    }

    async fn list_buildpacks(&self) -> Result<Vec<Buildpack>, ApiError> {
        self.get_key(&format!("{APPS_PATH}/buildpacks"), "buildpacks").await
    }

    async fn upgrade_buildpack(
        &self,
        app_id: &str,
        opts: &UpgradeBuildpackOptions,
    ) -> Result<UpgradeBuildpackResponse, ApiError> {
        self.send_body(Method::POST, &format!("{APPS_PATH}/{app_id}/upgrade_buildpack"), opts)
            .await
    }
}

/// Path and query of a logs request.
fn logs_path(req: &LogsRequest<'_>) -> String {
    let base = if req.deployment_id.is_empty() {
        format!("{APPS_PATH}/{}/logs", req.app_id)
    } else {
        format!("{APPS_PATH}/{}/deployments/{}/logs", req.app_id, req.deployment_id)
    };
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    query
        .append_pair("type", &req.log_type.to_string())
        .append_pair("follow", &req.follow.to_string())
        .append_pair("tail_lines", &req.tail_lines.to_string());
    if !req.component.is_empty() {
        query.append_pair("component_name", req.component);
    }
    format!("{base}?{}", query.finish())
}
