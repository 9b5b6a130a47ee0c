//! App spec: the declarative document describing an app's components.
//!
//! Field order follows the API schema so JSON output reads the way the
//! schema documents it. Empty values are omitted on output.

use serde::{Deserialize, Serialize};

/// Top-level app spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSpec {
    /// App name, unique per account.
    pub name: String,
    /// Region slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub region: String,
    /// Custom domains.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub domains: Vec<AppDomainSpec>,
    /// Long-running HTTP services.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<AppServiceSpec>,
    /// Static sites.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub static_sites: Vec<AppStaticSiteSpec>,
    /// Background workers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub workers: Vec<AppWorkerSpec>,
    /// Jobs run around deployments.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub jobs: Vec<AppJobSpec>,
    /// Databases.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub databases: Vec<AppDatabaseSpec>,
    /// App-wide environment variables.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<AppVariableDefinition>,
    /// App-level alert rules.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub alerts: Vec<AppAlertSpec>,
}

impl AppSpec {
    /// Names of every component, in spec order.
    pub fn component_names(&self) -> Vec<&str> {
        self.services
            .iter()
            .map(|c| c.name.as_str())
            .chain(self.static_sites.iter().map(|c| c.name.as_str()))
            .chain(self.workers.iter().map(|c| c.name.as_str()))
            .chain(self.jobs.iter().map(|c| c.name.as_str()))
            .chain(self.databases.iter().map(|c| c.name.as_str()))
            .collect()
    }
}

/// Custom domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppDomainSpec {
    /// Hostname.
    pub domain: String,
    /// `DEFAULT`, `PRIMARY` or `ALIAS`.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
    /// Also serve subdomains.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub wildcard: bool,
    /// DNS zone managed by the provider.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub zone: String,
}

/// Plain git source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitSourceSpec {
    /// Clone URL.
    pub repo_clone_url: String,
    /// Branch.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub branch: String,
}

/// GitHub source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitHubSourceSpec {
    /// `owner/repo`.
    pub repo: String,
    /// Branch.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub branch: String,
    /// Redeploy on push to the branch.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deploy_on_push: bool,
}

/// GitLab source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GitLabSourceSpec {
    /// `owner/repo`.
    pub repo: String,
    /// Branch.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub branch: String,
    /// Redeploy on push to the branch.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deploy_on_push: bool,
}

/// Container image source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageSourceSpec {
    /// `DOCR`, `DOCKER_HUB` or `GHCR`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub registry_type: String,
    /// Registry name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub registry: String,
    /// Repository.
    pub repository: String,
    /// Tag.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub tag: String,
}

/// Environment variable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppVariableDefinition {
    /// Variable name.
    pub key: String,
    /// Value, or ciphertext for secrets.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub value: String,
    /// `RUN_TIME`, `BUILD_TIME` or `RUN_AND_BUILD_TIME`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub scope: String,
    /// `GENERAL` or `SECRET`.
    #[serde(rename = "type", skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

/// HTTP route to a component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppRouteSpec {
    /// Path prefix.
    pub path: String,
    /// Forward the prefix to the component.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub preserve_path_prefix: bool,
}

/// HTTP service component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppServiceSpec {
    /// Component name.
    pub name: String,
    /// Git source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSourceSpec>,
    /// GitHub source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubSourceSpec>,
    /// GitLab source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<GitLabSourceSpec>,
    /// Image source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSourceSpec>,
    /// Dockerfile path.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dockerfile_path: String,
    /// Build command.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build_command: String,
    /// Run command.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub run_command: String,
    /// Source directory within the repository.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_dir: String,
    /// Buildpack environment slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub environment_slug: String,
    /// Component environment variables.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<AppVariableDefinition>,
    /// Instance size slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance_size_slug: String,
    /// Instance count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_count: Option<u64>,
    /// Listening port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub http_port: Option<u64>,
    /// Routes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<AppRouteSpec>,
}

/// Static site component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppStaticSiteSpec {
    /// Component name.
    pub name: String,
    /// Git source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSourceSpec>,
    /// GitHub source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubSourceSpec>,
    /// GitLab source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<GitLabSourceSpec>,
    /// Dockerfile path.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dockerfile_path: String,
    /// Build command.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build_command: String,
    /// Source directory within the repository.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_dir: String,
    /// Buildpack environment slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub environment_slug: String,
    /// Build output directory.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub output_dir: String,
    /// Index document.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub index_document: String,
    /// Error document.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub error_document: String,
    /// Component environment variables.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<AppVariableDefinition>,
    /// Routes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub routes: Vec<AppRouteSpec>,
}

/// Background worker component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppWorkerSpec {
    /// Component name.
    pub name: String,
    /// Git source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSourceSpec>,
    /// GitHub source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubSourceSpec>,
    /// GitLab source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<GitLabSourceSpec>,
    /// Image source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSourceSpec>,
    /// Dockerfile path.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dockerfile_path: String,
    /// Build command.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build_command: String,
    /// Run command.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub run_command: String,
    /// Source directory within the repository.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_dir: String,
    /// Buildpack environment slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub environment_slug: String,
    /// Component environment variables.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<AppVariableDefinition>,
    /// Instance size slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance_size_slug: String,
    /// Instance count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_count: Option<u64>,
}

/// Job component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppJobSpec {
    /// Component name.
    pub name: String,
    /// Git source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git: Option<GitSourceSpec>,
    /// GitHub source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub github: Option<GitHubSourceSpec>,
    /// GitLab source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gitlab: Option<GitLabSourceSpec>,
    /// Image source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSourceSpec>,
    /// Dockerfile path.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub dockerfile_path: String,
    /// Build command.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub build_command: String,
    /// Run command.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub run_command: String,
    /// Source directory within the repository.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub source_dir: String,
    /// Buildpack environment slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub environment_slug: String,
    /// Component environment variables.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub envs: Vec<AppVariableDefinition>,
    /// Instance size slug.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub instance_size_slug: String,
    /// Instance count.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_count: Option<u64>,
    /// `PRE_DEPLOY`, `POST_DEPLOY` or `FAILED_DEPLOY`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub kind: String,
}

/// Database component.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppDatabaseSpec {
    /// Component name.
    pub name: String,
    /// `PG`, `MYSQL`, `REDIS` ...
    #[serde(skip_serializing_if = "String::is_empty")]
    pub engine: String,
    /// Engine version.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub version: String,
    /// Use a managed production cluster.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub production: bool,
    /// Managed cluster name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub cluster_name: String,
    /// Database name.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub db_name: String,
    /// Database user.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub db_user: String,
}

/// Alert rule.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppAlertSpec {
    /// Rule, e.g. `DEPLOYMENT_FAILED`.
    pub rule: String,
    /// Rule is disabled.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub disabled: bool,
    /// `GREATER_THAN` or `LESS_THAN`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub operator: String,
    /// Threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<f64>,
    /// Evaluation window, e.g. `FIVE_MINUTES`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub window: String,
}
