//! App platform resources other than the spec itself.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::spec::{AppAlertSpec, AppSpec};

/// An app.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct App {
    /// App ID.
    pub id: String,
    /// Owner UUID.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub owner_uuid: String,
    /// Current spec.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<AppSpec>,
    /// Default ingress URL.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub default_ingress: String,
    /// Live URL.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub live_url: String,
    /// Region.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<AppRegion>,
    /// Tier slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tier_slug: String,
    /// Deployment currently serving traffic.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_deployment: Option<Deployment>,
    /// Deployment being rolled out.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_progress_deployment: Option<Deployment>,
    /// Deployment waiting to start.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_deployment: Option<Deployment>,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    /// Owning project.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_id: String,
}

impl App {
    /// Name from the spec, empty when the spec is missing.
    pub fn name(&self) -> &str {
        self.spec.as_ref().map_or("", |s| s.name.as_str())
    }
}

/// Deployment phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeploymentPhase {
    /// Waiting to build.
    PendingBuild,
    /// Building.
    Building,
    /// Waiting to deploy.
    PendingDeploy,
    /// Deploying.
    Deploying,
    /// Serving traffic.
    Active,
    /// Replaced by a newer deployment.
    Superseded,
    /// Failed.
    Error,
    /// Canceled.
    Canceled,
    /// Unknown or unrecognized phase.
    #[default]
    #[serde(other)]
    Unknown,
}

impl DeploymentPhase {
    /// Wire name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "UNKNOWN",
            Self::PendingBuild => "PENDING_BUILD",
            Self::Building => "BUILDING",
            Self::PendingDeploy => "PENDING_DEPLOY",
            Self::Deploying => "DEPLOYING",
            Self::Active => "ACTIVE",
            Self::Superseded => "SUPERSEDED",
            Self::Error => "ERROR",
            Self::Canceled => "CANCELED",
        }
    }
}

impl fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One deployment of an app spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Deployment {
    /// Deployment ID.
    pub id: String,
    /// Spec deployed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<AppSpec>,
    /// Per-service source revisions.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<DeploymentService>,
    /// What triggered the deployment.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cause: String,
    /// Current phase.
    pub phase: DeploymentPhase,
    /// Step counters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<DeploymentProgress>,
    /// Creation time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// Source revision of one service in a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentService {
    /// Service name.
    pub name: String,
    /// Commit deployed.
    pub source_commit_hash: String,
}

/// Step counters of a deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentProgress {
    /// Steps not started.
    pub pending_steps: u32,
    /// Steps running.
    pub running_steps: u32,
    /// Steps finished.
    pub success_steps: u32,
    /// Steps failed.
    pub error_steps: u32,
    /// All steps.
    pub total_steps: u32,
    /// Step details.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<DeploymentProgressStep>,
}

/// One deployment step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentProgressStep {
    /// Step name.
    pub name: String,
    /// Step status.
    pub status: String,
    /// Start time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    /// End time.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ended_at: Option<DateTime<Utc>>,
}

/// Region apps can run in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppRegion {
    /// Slug, e.g. `ams`.
    pub slug: String,
    /// Display label.
    pub label: String,
    /// Flag name.
    pub flag: String,
    /// Continent.
    pub continent: String,
    /// Region is not accepting new apps.
    pub disabled: bool,
    /// Datacenters backing the region.
    pub data_centers: Vec<String>,
    /// Why the region is disabled.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub reason: String,
    /// Default region for new apps.
    pub default: bool,
}

/// Pricing tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppTier {
    /// Display name.
    pub name: String,
    /// Slug.
    pub slug: String,
    /// Included egress in bytes.
    pub egress_bandwidth_bytes: String,
    /// Included build time in seconds.
    pub build_seconds: String,
}

/// Instance size.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppInstanceSize {
    /// Display name.
    pub name: String,
    /// Slug.
    pub slug: String,
    /// `SHARED` or `DEDICATED`.
    pub cpu_type: String,
    /// CPU count.
    pub cpus: String,
    /// Memory in bytes.
    pub memory_bytes: String,
    /// Monthly price in USD.
    pub usd_per_month: String,
    /// Per-second price in USD.
    pub usd_per_second: String,
    /// Tier the size belongs to.
    pub tier_slug: String,
    /// Next size up.
    pub tier_upgrade_to: String,
    /// Next size down.
    pub tier_downgrade_to: String,
}

/// Alert with its destinations.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppAlert {
    /// Alert ID.
    pub id: String,
    /// Component the alert belongs to, empty for app-level alerts.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub component_name: String,
    /// Rule.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<AppAlertSpec>,
    /// Email destinations.
    pub emails: Vec<String>,
    /// Slack destinations.
    pub slack_webhooks: Vec<AppAlertSlackWebhook>,
    /// Configuration phase.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub phase: String,
}

/// Slack destination.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppAlertSlackWebhook {
    /// Incoming webhook URL.
    pub url: String,
    /// Channel name.
    pub channel: String,
}

/// Body of the alert destinations update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlertDestinationUpdateRequest {
    /// Email destinations.
    pub emails: Vec<String>,
    /// Slack destinations.
    pub slack_webhooks: Vec<AppAlertSlackWebhook>,
}

/// Buildpack available to apps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Buildpack {
    /// Buildpack ID, e.g. `digitalocean/go`.
    pub id: String,
    /// Full version.
    pub version: String,
    /// Major version.
    pub major_version: u32,
    /// Latest release of its major version.
    pub latest: bool,
    /// Display name.
    pub name: String,
    /// Description lines.
    pub description: Vec<String>,
    /// Documentation link.
    pub docs_link: String,
}

/// Parameters of a buildpack upgrade.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpgradeBuildpackOptions {
    /// Buildpack to upgrade.
    pub buildpack_id: String,
    /// Target major version, 0 for the latest.
    pub major_version: u32,
    /// Start a deployment once the spec is updated.
    pub trigger_deployment: bool,
}

/// Result of a buildpack upgrade.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpgradeBuildpackResponse {
    /// Components whose spec changed.
    pub affected_components: Vec<String>,
    /// Deployment started, if requested.
    pub deployment: Option<Deployment>,
}

/// Body of a propose call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppProposeRequest {
    /// Spec to validate.
    pub spec: AppSpec,
    /// Existing app the spec would update.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub app_id: String,
}

/// Result of a propose call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppProposeResponse {
    /// The app only has static components.
    pub app_is_static: bool,
    /// The name is free.
    pub app_name_available: bool,
    /// Alternative name if taken.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub app_name_suggestion: String,
    /// Existing static apps on the account.
    pub existing_static_apps: String,
    /// Free static apps allowed.
    pub max_free_static_apps: String,
    /// Server-validated spec with defaults applied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<AppSpec>,
    /// Monthly cost in USD.
    pub app_cost: f64,
    /// Monthly cost after a tier upgrade.
    pub app_tier_upgrade_cost: f64,
    /// Monthly cost after a tier downgrade.
    pub app_tier_downgrade_cost: f64,
}

/// Log locations for a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppLogs {
    /// Live stream URL.
    pub live_url: String,
    /// Presigned archive URLs.
    pub historic_urls: Vec<String>,
}

/// Console session location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppExec {
    /// Websocket URL carrying the session token.
    pub url: String,
}

/// Kind of log to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppLogType {
    /// Build output.
    Build,
    /// Deploy output.
    Deploy,
    /// Runtime output.
    Run,
    /// Runtime output of the previous, restarted container.
    RunRestarted,
}

impl AppLogType {
    /// Query value.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Build => "BUILD",
            Self::Deploy => "DEPLOY",
            Self::Run => "RUN",
            Self::RunRestarted => "RUN_RESTARTED",
        }
    }
}

impl fmt::Display for AppLogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of an app create.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppCreateRequest {
    /// Spec.
    pub spec: AppSpec,
    /// Project to place the app in.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub project_id: String,
}

/// Body of an app update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppUpdateRequest {
    /// New spec.
    pub spec: AppSpec,
    /// Pull the latest commits of every git source.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub update_all_source_versions: bool,
}
