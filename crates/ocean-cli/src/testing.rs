//! In-memory fakes for command tests.

use std::collections::{BTreeMap, VecDeque};
use std::io::Write;
use std::sync::{Arc, Mutex};

use ocean_api::apps::{
    AlertDestinationUpdateRequest, App, AppAlert, AppCreateRequest, AppExec, AppInstanceSize, AppLogs,
    AppProposeRequest, AppProposeResponse, AppRegion, AppSpec, AppTier, AppUpdateRequest, AppsService, Buildpack,
    Deployment, DeploymentProgress, UpgradeBuildpackOptions, UpgradeBuildpackResponse,
};
use ocean_api::apps::LogsRequest;
use ocean_api::projects::{Project, ProjectResource};
use ocean_api::{
    Action, ActionLink, ActionsService, ApiError, CreatedDroplets, Droplet, DropletCreateRequest, DropletsService,
    ProjectsService, Snapshot, SnapshotsService,
};
use tokio::sync::mpsc;
use url::Url;

use crate::confirm::Confirm;
use crate::error::CliError;
use crate::listen::{Decoder, Listener};
use crate::terminal::{RawModeGuard, Terminal, TerminalSize};

/// Action with a status.
pub fn action(id: u64, status: &str) -> Action {
    Action {
        id,
        status: status.into(),
        ..Action::default()
    }
}

/// Deployment with step counters.
pub fn deployment(id: &str, success: u32, errors: u32, total: u32) -> Deployment {
    Deployment {
        id: id.into(),
        progress: Some(DeploymentProgress {
            success_steps: success,
            error_steps: errors,
            total_steps: total,
            ..DeploymentProgress::default()
        }),
        ..Deployment::default()
    }
}

/// App with a spec name.
pub fn app(id: &str, name: &str) -> App {
    App {
        id: id.into(),
        spec: Some(AppSpec {
            name: name.into(),
            ..AppSpec::default()
        }),
        ..App::default()
    }
}

/// Droplet with a name.
pub fn droplet(id: u64, name: &str) -> Droplet {
    Droplet {
        id,
        name: name.into(),
        status: "active".into(),
        ..Droplet::default()
    }
}

/// Snapshot available in `regions`.
pub fn snapshot(id: &str, name: &str, resource_type: &str, regions: &[&str]) -> Snapshot {
    Snapshot {
        id: id.into(),
        name: name.into(),
        resource_type: resource_type.into(),
        regions: regions.iter().map(ToString::to_string).collect(),
        ..Snapshot::default()
    }
}

#[derive(Default)]
struct State {
    calls: Vec<String>,
    bodies: Vec<serde_json::Value>,
    droplets: Vec<Droplet>,
    next_droplet_id: u64,
    snapshots: Vec<Snapshot>,
    projects: Vec<Project>,
    actions: VecDeque<Result<Action, ApiError>>,
    apps: Vec<App>,
    deployments: VecDeque<Deployment>,
    create_conflict: bool,
    logs: AppLogs,
    downloads: BTreeMap<String, String>,
    exec: AppExec,
    proposal: AppProposeResponse,
    alerts: Vec<AppAlert>,
}

impl State {
    fn record(&mut self, call: impl Into<String>) {
        self.calls.push(call.into());
    }

    fn body<T: serde::Serialize>(&mut self, body: &T) {
        self.bodies.push(serde_json::to_value(body).expect("encode body"));
    }

    /// The last queued deployment repeats.
    fn next_deployment(&mut self) -> Result<Deployment, ApiError> {
        if self.deployments.len() > 1 {
            self.deployments.pop_front().ok_or_else(|| ApiError::NotFound("deployment".into()))
        } else {
            self.deployments
                .front()
                .cloned()
                .ok_or_else(|| ApiError::NotFound("deployment".into()))
        }
    }
}

/// Fake API implementing every service trait.
#[derive(Default)]
pub struct FakeApi {
    state: Mutex<State>,
}

impl FakeApi {
    fn state(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().expect("lock")
    }

    /// Calls made so far.
    pub fn calls(&self) -> Vec<String> {
        self.state().calls.clone()
    }

    /// Request bodies sent so far.
    pub fn bodies(&self) -> Vec<serde_json::Value> {
        self.state().bodies.clone()
    }

    pub fn add_droplet(&self, droplet: Droplet) {
        self.state().droplets.push(droplet);
    }

    pub fn add_snapshot(&self, snapshot: Snapshot) {
        self.state().snapshots.push(snapshot);
    }

    pub fn add_project(&self, id: &str) {
        self.state().projects.push(Project {
            id: id.into(),
            ..Project::default()
        });
    }

    pub fn push_action(&self, action: Result<Action, ApiError>) {
        self.state().actions.push_back(action);
    }

    pub fn add_app(&self, app: App) {
        self.state().apps.push(app);
    }

    pub fn push_deployment(&self, deployment: Deployment) {
        self.state().deployments.push_back(deployment);
    }

    pub fn fail_create_with_conflict(&self) {
        self.state().create_conflict = true;
    }

    pub fn set_logs(&self, logs: AppLogs) {
        self.state().logs = logs;
    }

    pub fn add_download(&self, url: &str, content: &str) {
        self.state().downloads.insert(url.into(), content.into());
    }

    pub fn set_exec(&self, url: &str) {
        self.state().exec = AppExec { url: url.into() };
    }

    pub fn set_proposal(&self, proposal: AppProposeResponse) {
        self.state().proposal = proposal;
    }

    pub fn add_alert(&self, alert: AppAlert) {
        self.state().alerts.push(alert);
    }

    fn create(&self, names: &[String], req: &DropletCreateRequest) -> CreatedDroplets {
        let mut state = self.state();
        state.body(req);
        let mut created = CreatedDroplets::default();
        for name in names {
            state.next_droplet_id += 1;
            let id = 1000 + state.next_droplet_id;
            let mut droplet = droplet(id, name);
            droplet.status = "new".into();
            state.droplets.push(droplet.clone());
            created.droplets.push(droplet);
            created.actions.push(ActionLink {
                id,
                rel: "create".into(),
                href: format!("actions/{id}"),
            });
        }
        created
    }
}

impl DropletsService for FakeApi {
    async fn create_droplet(&self, req: &DropletCreateRequest) -> Result<CreatedDroplets, ApiError> {
        self.state().record("create_droplet");
        let names = vec![req.name.clone().unwrap_or_default()];
        Ok(self.create(&names, req))
    }

    async fn create_droplets(&self, req: &DropletCreateRequest) -> Result<CreatedDroplets, ApiError> {
        self.state().record("create_droplets");
        Ok(self.create(&req.names, req))
    }

    async fn get_droplet(&self, id: u64) -> Result<Droplet, ApiError> {
        let mut state = self.state();
        state.record(format!("get_droplet {id}"));
        let droplet = state
            .droplets
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("droplet {id}")))?;
        Ok(Droplet {
            status: "active".into(),
            ..droplet
        })
    }

    async fn list_droplets(&self) -> Result<Vec<Droplet>, ApiError> {
        let mut state = self.state();
        state.record("list_droplets");
        Ok(state.droplets.clone())
    }

    async fn list_droplets_by_tag(&self, tag: &str) -> Result<Vec<Droplet>, ApiError> {
        let mut state = self.state();
        state.record(format!("list_droplets_by_tag {tag}"));
        Ok(state.droplets.iter().filter(|d| d.tags.iter().any(|t| t == tag)).cloned().collect())
    }

    async fn delete_droplet(&self, id: u64) -> Result<(), ApiError> {
        self.state().record(format!("delete_droplet {id}"));
        Ok(())
    }

    async fn delete_droplets_by_tag(&self, tag: &str) -> Result<(), ApiError> {
        self.state().record(format!("delete_droplets_by_tag {tag}"));
        Ok(())
    }
}

impl ActionsService for FakeApi {
    async fn get_action(&self, id: u64) -> Result<Action, ApiError> {
        self.state().record(format!("get_action {id}"));
        Ok(action(id, "completed"))
    }

    /// Queued results first, then `completed`.
    async fn get_action_by_uri(&self, href: &str) -> Result<Action, ApiError> {
        let mut state = self.state();
        state.record(format!("get_action_by_uri {href}"));
        state.actions.pop_front().unwrap_or_else(|| Ok(action(1, "completed")))
    }
}

impl ProjectsService for FakeApi {
    async fn get_project(&self, id: &str) -> Result<Project, ApiError> {
        let mut state = self.state();
        state.record(format!("get_project {id}"));
        state
            .projects
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("project \"{id}\"")))
    }

    async fn assign_resources(&self, id: &str, urns: &[String]) -> Result<Vec<ProjectResource>, ApiError> {
        self.state().record(format!("assign_resources {id} {}", urns.join(",")));
        Ok(urns
            .iter()
            .map(|urn| ProjectResource {
                urn: urn.clone(),
                ..ProjectResource::default()
            })
            .collect())
    }
}

impl SnapshotsService for FakeApi {
    async fn list_snapshots(&self) -> Result<Vec<Snapshot>, ApiError> {
        let mut state = self.state();
        state.record("list_snapshots");
        Ok(state.snapshots.clone())
    }

    async fn list_droplet_snapshots(&self) -> Result<Vec<Snapshot>, ApiError> {
        let mut state = self.state();
        state.record("list_droplet_snapshots");
        Ok(state.snapshots.iter().filter(|s| s.resource_type == "droplet").cloned().collect())
    }

    async fn list_volume_snapshots(&self) -> Result<Vec<Snapshot>, ApiError> {
        let mut state = self.state();
        state.record("list_volume_snapshots");
        Ok(state.snapshots.iter().filter(|s| s.resource_type == "volume").cloned().collect())
    }

    async fn list_volume_snapshots_by_region(&self, region: &str) -> Result<Vec<Snapshot>, ApiError> {
        let mut state = self.state();
        state.record(format!("list_volume_snapshots_by_region {region}"));
        Ok(state
            .snapshots
            .iter()
            .filter(|s| s.resource_type == "volume" && s.regions.iter().any(|r| r == region))
            .cloned()
            .collect())
    }

    async fn get_snapshot(&self, id: &str) -> Result<Snapshot, ApiError> {
        let mut state = self.state();
        state.record(format!("get_snapshot {id}"));
        state
            .snapshots
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("snapshot {id}")))
    }

    async fn delete_snapshot(&self, id: &str) -> Result<(), ApiError> {
        self.state().record(format!("delete_snapshot {id}"));
        Ok(())
    }
}

impl AppsService for FakeApi {
    async fn create(&self, req: &AppCreateRequest) -> Result<App, ApiError> {
        let mut state = self.state();
        state.record("create");
        state.body(req);
        if state.create_conflict {
            return Err(ApiError::Api {
                method: "POST".into(),
                url: "http://fake/v2/apps".into(),
                status: 409,
                request_id: None,
                message: "app name already in use".into(),
            });
        }
        Ok(App {
            id: "new-app".into(),
            spec: Some(req.spec.clone()),
            pending_deployment: Some(Deployment {
                id: "pending-dep".into(),
                ..Deployment::default()
            }),
            ..App::default()
        })
    }

    async fn get(&self, app_id: &str) -> Result<App, ApiError> {
        let mut state = self.state();
        state.record(format!("get {app_id}"));
        state
            .apps
            .iter()
            .find(|a| a.id == app_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("app {app_id}")))
    }

    async fn find(&self, name: &str) -> Result<App, ApiError> {
        let mut state = self.state();
        state.record(format!("find {name}"));
        state
            .apps
            .iter()
            .find(|a| a.name() == name || a.id == name)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(format!("app \"{name}\"")))
    }

    async fn list(&self, with_projects: bool) -> Result<Vec<App>, ApiError> {
        let mut state = self.state();
        state.record(format!("list {with_projects}"));
        Ok(state.apps.clone())
    }

    async fn update(&self, app_id: &str, req: &AppUpdateRequest) -> Result<App, ApiError> {
        let mut state = self.state();
        state.record(format!("update {app_id}"));
        state.body(req);
        Ok(App {
            id: app_id.into(),
            spec: Some(req.spec.clone()),
            ..App::default()
        })
    }

    async fn delete(&self, app_id: &str) -> Result<(), ApiError> {
        self.state().record(format!("delete {app_id}"));
        Ok(())
    }

    async fn propose(&self, req: &AppProposeRequest) -> Result<AppProposeResponse, ApiError> {
        let mut state = self.state();
        state.record("propose");
        state.body(req);
        Ok(state.proposal.clone())
    }

    async fn create_deployment(&self, app_id: &str, force_rebuild: bool) -> Result<Deployment, ApiError> {
        let mut state = self.state();
        state.record(format!("create_deployment {app_id} {force_rebuild}"));
        state.next_deployment()
    }

    async fn get_deployment(&self, app_id: &str, deployment_id: &str) -> Result<Deployment, ApiError> {
        let mut state = self.state();
        state.record(format!("get_deployment {app_id} {deployment_id}"));
        state.next_deployment()
    }

    async fn list_deployments(&self, app_id: &str) -> Result<Vec<Deployment>, ApiError> {
        let mut state = self.state();
        state.record(format!("list_deployments {app_id}"));
        Ok(state.deployments.iter().cloned().collect())
    }

    async fn restart(&self, app_id: &str, components: &[String]) -> Result<Deployment, ApiError> {
        let mut state = self.state();
        state.record(format!("restart {app_id} {}", components.join(",")));
        state.next_deployment()
    }

    async fn get_logs(&self, req: &LogsRequest<'_>) -> Result<AppLogs, ApiError> {
        let mut state = self.state();
        state.record(format!(
            "get_logs {} {} {} {} {} {}",
            req.app_id, req.deployment_id, req.component, req.log_type, req.follow, req.tail_lines
        ));
        Ok(state.logs.clone())
    }

    async fn download_logs(&self, url: &str) -> Result<String, ApiError> {
        let mut state = self.state();
        state.record(format!("download_logs {url}"));
        state
            .downloads
            .get(url)
            .cloned()
            .ok_or_else(|| ApiError::NotFound(url.to_string()))
    }

    async fn get_exec(&self, app_id: &str, deployment_id: &str, component: &str) -> Result<AppExec, ApiError> {
        let mut state = self.state();
        state.record(format!("get_exec {app_id} {deployment_id} {component}"));
        Ok(state.exec.clone())
    }

    async fn list_regions(&self) -> Result<Vec<AppRegion>, ApiError> {
        self.state().record("list_regions");
        Ok(vec![AppRegion {
            slug: "ams".into(),
            label: "Amsterdam".into(),
            continent: "Europe".into(),
            data_centers: vec!["ams3".into()],
            ..AppRegion::default()
        }])
    }

    async fn list_tiers(&self) -> Result<Vec<AppTier>, ApiError> {
        self.state().record("list_tiers");
        Ok(vec![AppTier {
            name: "Basic".into(),
            slug: "basic".into(),
            egress_bandwidth_bytes: "42949672960".into(),
            build_seconds: "6000".into(),
        }])
    }

    async fn get_tier(&self, slug: &str) -> Result<AppTier, ApiError> {
        self.state().record(format!("get_tier {slug}"));
        Ok(AppTier {
            slug: slug.into(),
            ..AppTier::default()
        })
    }

    async fn list_instance_sizes(&self) -> Result<Vec<AppInstanceSize>, ApiError> {
        self.state().record("list_instance_sizes");
        Ok(vec![])
    }

    async fn get_instance_size(&self, slug: &str) -> Result<AppInstanceSize, ApiError> {
        self.state().record(format!("get_instance_size {slug}"));
        Ok(AppInstanceSize {
            slug: slug.into(),
            ..AppInstanceSize::default()
        })
    }

    async fn list_alerts(&self, app_id: &str) -> Result<Vec<AppAlert>, ApiError> {
        let mut state = self.state();
        state.record(format!("list_alerts {app_id}"));
        Ok(state.alerts.clone())
    }

    async fn update_alert_destinations(
        &self,
        app_id: &str,
        alert_id: &str,
        req: &AlertDestinationUpdateRequest,
    ) -> Result<AppAlert, ApiError> {
        let mut state = self.state();
        state.record(format!("update_alert_destinations {app_id} {alert_id}"));
        state.body(req);
        Ok(AppAlert {
            id: alert_id.into(),
            emails: req.emails.clone(),
            slack_webhooks: req.slack_webhooks.clone(),
            ..AppAlert::default()
        })
    }

    async fn list_buildpacks(&self) -> Result<Vec<Buildpack>, ApiError> {
        self.state().record("list_buildpacks");
        Ok(vec![])
    }

    async fn upgrade_buildpack(
        &self,
        app_id: &str,
        opts: &UpgradeBuildpackOptions,
    ) -> Result<UpgradeBuildpackResponse, ApiError> {
        let mut state = self.state();
        state.record(format!("upgrade_buildpack {app_id}"));
        state.body(opts);
        Ok(UpgradeBuildpackResponse {
            affected_components: vec!["web".into()],
            deployment: opts.trigger_deployment.then(|| Deployment {
                id: "upgrade-dep".into(),
                ..Deployment::default()
            }),
        })
    }
}

/// Scripted confirmation answers.
pub struct FakeConfirm {
    answer: bool,
    prompts: Mutex<Vec<String>>,
}

impl FakeConfirm {
    pub fn new(answer: bool) -> Self {
        Self {
            answer,
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("lock").clone()
    }
}

impl Confirm for FakeConfirm {
    fn confirm(&self, message: &str) -> Result<bool, CliError> {
        self.prompts.lock().expect("lock").push(message.to_string());
        Ok(self.answer)
    }
}

/// Listener that replays canned frames and records where it connected.
#[derive(Clone, Default)]
pub struct FakeListener {
    frames: Vec<String>,
    connections: Arc<Mutex<Vec<(String, String)>>>,
}

impl FakeListener {
    pub fn with_frames(frames: &[&str]) -> Self {
        Self {
            frames: frames.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }

    /// `(url, token)` pairs.
    pub fn connections(&self) -> Vec<(String, String)> {
        self.connections.lock().expect("lock").clone()
    }
}

impl Listener for FakeListener {
    async fn listen<W: Write>(
        &self,
        url: &Url,
        token: &str,
        decode: Decoder,
        out: &mut W,
        input: Option<mpsc::Receiver<String>>,
    ) -> Result<(), CliError> {
        self.connections
            .lock()
            .expect("lock")
            .push((url.to_string(), token.to_string()));
        for frame in &self.frames {
            out.write_all(&decode(frame.as_bytes())?)?;
        }
        drop(input);
        Ok(())
    }
}

/// Terminal that records calls and sends nothing.
#[derive(Clone, Default)]
pub struct FakeTerminal {
    calls: Arc<Mutex<Vec<&'static str>>>,
}

impl FakeTerminal {
    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().expect("lock").clone()
    }
}

impl Terminal for FakeTerminal {
    fn read_raw_stdin(&self, tx: mpsc::Sender<String>) -> Result<RawModeGuard, CliError> {
        self.calls.lock().expect("lock").push("read_raw_stdin");
        drop(tx);
        Ok(RawModeGuard::noop())
    }

    fn monitor_resize_events(&self, tx: mpsc::Sender<TerminalSize>) -> Result<(), CliError> {
        self.calls.lock().expect("lock").push("monitor_resize_events");
        drop(tx);
        Ok(())
    }
}
