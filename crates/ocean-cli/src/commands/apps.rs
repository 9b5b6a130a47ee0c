//! App platform command implementation.

use std::fs;
use std::io::Write;

use ocean_api::apps::{
    AlertDestinationUpdateRequest, App, AppCreateRequest, AppProposeRequest, AppUpdateRequest, AppsService,
    Deployment, LogsRequest, UpgradeBuildpackOptions,
};
use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;
use uuid::Uuid;

use crate::cli::{
    AppsCommands, DevCommands, InstanceSizeCommands, LogsArgs, SpecCommands, SpecFormat, TierCommands,
};
use crate::commands::DevConfigCommand;
use crate::confirm::{Confirm, ask_for_confirm_delete};
use crate::displayers::{
    AppAlerts, AppInstanceSizes, AppProposal, AppRegions, AppTiers, Apps, Buildpacks, Deployments,
};
use crate::error::CliError;
use crate::listen::{Decoder, Listener, WsListener, decode_data, decode_data_no_prefix, stream_url, strip_prefix};
use crate::output::{OutputFormat, notice, write_json, write_yaml};
use crate::spec_file::{load_app_spec, parse_strict};
use crate::terminal::{CrosstermTerminal, Terminal, TerminalSize};
use crate::wait::{Poller, wait_for_deployment};

/// Apps command executor.
///
/// Generic over the stream listener and terminal so `logs --follow` and
/// `console` can run against fakes.
pub struct AppsCommand<'a, A, L = WsListener, T = CrosstermTerminal> {
    client: &'a A,
    confirm: &'a dyn Confirm,
    listener: L,
    terminal: T,
    poller: Poller,
}

impl<'a, A: AppsService> AppsCommand<'a, A> {
    /// Create a new apps command with the websocket listener and the real
    /// terminal.
    #[must_use]
    pub fn new(client: &'a A, confirm: &'a dyn Confirm) -> Self {
        Self {
            client,
            confirm,
            listener: WsListener,
            terminal: CrosstermTerminal::default(),
            poller: Poller::deployments(),
        }
    }
}

impl<'a, A, L, T> AppsCommand<'a, A, L, T>
where
    A: AppsService,
    L: Listener,
    T: Terminal,
{
    /// Swap the stream listener and terminal.
    #[must_use]
    pub fn with_stream<L2: Listener, T2: Terminal>(self, listener: L2, terminal: T2) -> AppsCommand<'a, A, L2, T2> {
        AppsCommand {
            client: self.client,
            confirm: self.confirm,
            listener,
            terminal,
            poller: self.poller,
        }
    }

    /// Replace the poller used by `--wait`.
    #[must_use]
    pub fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    /// Execute an apps subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if arguments are missing, a spec does not parse, or
    /// an API call fails.
    #[allow(clippy::too_many_lines)]
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: &AppsCommands,
    ) -> Result<(), CliError> {
        match command {
            AppsCommands::Console {
                app,
                component,
                deployment,
            } => {
                let (Some(app), Some(component)) = (app, component) else {
                    return Err(CliError::missing_args("apps.console"));
                };
                self.console(writer, app, component, deployment.as_deref()).await?;
            }
            AppsCommands::Create {
                spec,
                upsert,
                wait,
                project_id,
                display,
            } => {
                let path = spec.as_deref().ok_or_else(|| CliError::missing_args("apps.create.spec"))?;
                let app = self
                    .create(path, *upsert, project_id.clone().unwrap_or_default())
                    .await?;
                let app = if *wait { self.wait_for_app(app).await? } else { app };
                format.with_display(display).write(writer, &Apps(vec![app]))?;
            }
            AppsCommands::Get { app, display } => {
                let app = app.as_deref().ok_or_else(|| CliError::missing_args("apps.get"))?;
                let app = self.lookup(app).await?;
                format.with_display(display).write(writer, &Apps(vec![app]))?;
            }
            AppsCommands::List { with_projects, display } => {
                let apps = self.client.list(*with_projects).await?;
                format.with_display(display).write(writer, &Apps(apps))?;
            }
            AppsCommands::Update {
                app,
                spec,
                update_sources,
                wait,
                display,
            } => {
                let app_id = app.as_deref().ok_or_else(|| CliError::missing_args("apps.update"))?;
                let path = spec.as_deref().ok_or_else(|| CliError::missing_args("apps.update.spec"))?;
                let req = AppUpdateRequest {
                    spec: load_app_spec(path)?,
                    update_all_source_versions: *update_sources,
                };
                let app = self.client.update(app_id, &req).await?;
                let app = if *wait { self.wait_for_app(app).await? } else { app };
                format.with_display(display).write(writer, &Apps(vec![app]))?;
            }
            AppsCommands::Delete { apps, force } => {
                if apps.is_empty() {
                    return Err(CliError::missing_args("apps.delete"));
                }
                if !force {
                    ask_for_confirm_delete(self.confirm, "app", apps.len())?;
                }
                for app in apps {
                    self.client.delete(app).await?;
                    debug!(app, "app deleted");
                }
            }
            AppsCommands::Dev {
                command: DevCommands::Config { dev_config, command },
            } => DevConfigCommand::new(dev_config.clone()).execute(writer, command)?,
            AppsCommands::CreateDeployment {
                app,
                force_rebuild,
                wait,
                display,
            } => {
                let app = app
                    .as_deref()
                    .ok_or_else(|| CliError::missing_args("apps.create-deployment"))?;
                let deployment = self.client.create_deployment(app, *force_rebuild).await?;
                let deployment = self.settle(app, deployment, *wait).await?;
                format.with_display(display).write(writer, &Deployments(vec![deployment]))?;
            }
            AppsCommands::GetDeployment {
                app,
                deployment,
                display,
            } => {
                let (Some(app), Some(deployment)) = (app, deployment) else {
                    return Err(CliError::missing_args("apps.get-deployment"));
                };
                let deployment = self.client.get_deployment(app, deployment).await?;
                format.with_display(display).write(writer, &Deployments(vec![deployment]))?;
            }
            AppsCommands::ListDeployments { app, display } => {
                let app = app
                    .as_deref()
                    .ok_or_else(|| CliError::missing_args("apps.list-deployments"))?;
                let deployments = self.client.list_deployments(app).await?;
                format.with_display(display).write(writer, &Deployments(deployments))?;
            }
            AppsCommands::ListRegions { display } => {
                let regions = self.client.list_regions().await?;
                format.with_display(display).write(writer, &AppRegions(regions))?;
            }
            AppsCommands::Logs(args) => self.logs(writer, args).await?,
            AppsCommands::Propose { spec, app, display } => {
                let path = spec.as_deref().ok_or_else(|| CliError::missing_args("apps.propose.spec"))?;
                let req = AppProposeRequest {
                    spec: load_app_spec(path)?,
                    app_id: app.clone().unwrap_or_default(),
                };
                let proposal = self.client.propose(&req).await?;
                format.with_display(display).write(writer, &AppProposal(proposal))?;
            }
            AppsCommands::Restart {
                app,
                components,
                wait,
                display,
            } => {
                let app = app.as_deref().ok_or_else(|| CliError::missing_args("apps.restart"))?;
                let deployment = self.client.restart(app, components).await?;
                let deployment = self.settle(app, deployment, *wait).await?;
                format.with_display(display).write(writer, &Deployments(vec![deployment]))?;
            }
            AppsCommands::Spec { command } => self.spec(writer, command).await?,
            AppsCommands::Tier { command } => self.tier(writer, format, command).await?,
            AppsCommands::ListAlerts { app, display } => {
                let app = app.as_deref().ok_or_else(|| CliError::missing_args("apps.list-alerts"))?;
                let alerts = self.client.list_alerts(app).await?;
                format.with_display(display).write(writer, &AppAlerts(alerts))?;
            }
            AppsCommands::UpdateAlertDestinations {
                app,
                alert,
                app_alert_destinations,
                display,
            } => {
                let (Some(app), Some(alert), Some(path)) = (app, alert, app_alert_destinations) else {
                    return Err(CliError::missing_args("apps.update-alert-destinations"));
                };
                let bytes = fs::read(path)?;
                let req: AlertDestinationUpdateRequest = parse_strict(&bytes)
                    .map_err(|e| CliError::InvalidArgument(format!("parsing alert destinations: {e}")))?;
                let updated = self.client.update_alert_destinations(app, alert, &req).await?;
                format.with_display(display).write(writer, &AppAlerts(vec![updated]))?;
            }
            AppsCommands::ListBuildpacks { display } => {
                let buildpacks = self.client.list_buildpacks().await?;
                format.with_display(display).write(writer, &Buildpacks(buildpacks))?;
            }
            AppsCommands::UpgradeBuildpack {
                app,
                buildpack,
                major_version,
                trigger_deployment,
                display,
            } => {
                let (Some(app), Some(buildpack)) = (app, buildpack) else {
                    return Err(CliError::missing_args("apps.upgrade-buildpack"));
                };
                let opts = UpgradeBuildpackOptions {
                    buildpack_id: buildpack.clone(),
                    major_version: *major_version,
                    trigger_deployment: *trigger_deployment,
                };
                let upgraded = self.client.upgrade_buildpack(app, &opts).await?;
                notice(format!(
                    "upgraded buildpack {buildpack}. {} components were affected: {}",
                    upgraded.affected_components.len(),
                    upgraded.affected_components.join(", ")
                ));
                if let Some(deployment) = upgraded.deployment {
                    notice("triggered a new deployment to apply the upgrade");
                    format.with_display(display).write(writer, &Deployments(vec![deployment]))?;
                }
            }
        }
        Ok(())
    }

    /// Create an app. With `upsert`, a name conflict updates the existing
    /// app instead.
    async fn create(&self, path: &str, upsert: bool, project_id: String) -> Result<App, CliError> {
        let spec = load_app_spec(path)?;
        let req = AppCreateRequest {
            spec: spec.clone(),
            project_id,
        };
        match self.client.create(&req).await {
            Ok(app) => {
                notice("App created");
                Ok(app)
            }
            Err(err) if upsert && err.is_conflict() => {
                notice("App already exists, updating");
                let existing = self.client.find(&spec.name).await?;
                let req = AppUpdateRequest {
                    spec,
                    update_all_source_versions: false,
                };
                Ok(self.client.update(&existing.id, &req).await?)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Wait for the app's pending or in-progress deployment, then re-fetch
    /// the app.
    async fn wait_for_app(&self, app: App) -> Result<App, CliError> {
        let deployment = app
            .pending_deployment
            .as_ref()
            .or(app.in_progress_deployment.as_ref());
        if let Some(deployment) = deployment {
            wait_for_deployment(self.client, &self.poller, &app.id, &deployment.id).await?;
        }
        Ok(self.client.get(&app.id).await?)
    }

    async fn settle(&self, app_id: &str, deployment: Deployment, wait: bool) -> Result<Deployment, CliError> {
        if !wait {
            return Ok(deployment);
        }
        wait_for_deployment(self.client, &self.poller, app_id, &deployment.id).await?;
        Ok(self.client.get_deployment(app_id, &deployment.id).await?)
    }

    /// Fetch by ID when the argument is a UUID, by name otherwise.
    async fn lookup(&self, app: &str) -> Result<App, CliError> {
        if Uuid::parse_str(app).is_ok() {
            Ok(self.client.get(app).await?)
        } else {
            Ok(self.client.find(app).await?)
        }
    }

    /// App ID and deployment for a streaming command. A name is resolved
    /// with `find`, and then an empty deployment means the active one.
    async fn resolve_target(&self, app: &str, deployment: Option<&str>) -> Result<(String, String), CliError> {
        let deployment = deployment.unwrap_or_default().to_string();
        if Uuid::parse_str(app).is_ok() {
            return Ok((app.to_string(), deployment));
        }
        let found = self.client.find(app).await?;
        let deployment = if deployment.is_empty() {
            found
                .active_deployment
                .as_ref()
                .map(|d| d.id.clone())
                .unwrap_or_default()
        } else {
            deployment
        };
        Ok((found.id, deployment))
    }

    async fn logs<W: Write>(&self, writer: &mut W, args: &LogsArgs) -> Result<(), CliError> {
        let app = args.app.as_deref().ok_or_else(|| CliError::missing_args("apps.logs"))?;
        let (app_id, deployment_id) = self.resolve_target(app, args.deployment.as_deref()).await?;
        let req = LogsRequest {
            app_id: &app_id,
            deployment_id: &deployment_id,
            component: args.component.as_deref().unwrap_or_default(),
            log_type: args.log_type.into(),
            follow: args.follow,
            tail_lines: args.tail,
        };
        let logs = self.client.get_logs(&req).await?;

        if !logs.live_url.is_empty() && (args.follow || logs.historic_urls.is_empty()) {
            let (url, token) = stream_url(&logs.live_url)?;
            let decode: Decoder = if args.no_prefix {
                decode_data_no_prefix
            } else {
                decode_data
            };
            return self.listener.listen(&url, &token, decode, writer, None).await;
        }
        if logs.historic_urls.is_empty() {
            notice("No logs found for app component");
            return Ok(());
        }
        for url in &logs.historic_urls {
            let body = self.client.download_logs(url).await?;
            let body = if args.no_prefix { strip_prefix(&body) } else { body };
            writer.write_all(body.as_bytes())?;
        }
        Ok(())
    }

    async fn console<W: Write>(
        &self,
        writer: &mut W,
        app: &str,
        component: &str,
        deployment: Option<&str>,
    ) -> Result<(), CliError> {
        let (app_id, deployment_id) = self.resolve_target(app, deployment).await?;
        let exec = self.client.get_exec(&app_id, &deployment_id, component).await?;
        let (url, token) = stream_url(&exec.url)?;

        let (input_tx, input_rx) = mpsc::channel(64);
        let (stdin_tx, stdin_rx) = mpsc::channel(64);
        let (resize_tx, resize_rx) = mpsc::channel(8);
        let _raw = self.terminal.read_raw_stdin(stdin_tx)?;
        self.terminal.monitor_resize_events(resize_tx)?;

        let (listened, forwarded) = tokio::join!(
            self.listener.listen(&url, &token, decode_data, writer, Some(input_rx)),
            forward_console_input(stdin_rx, resize_rx, input_tx),
        );
        listened?;
        forwarded
    }

    async fn spec<W: Write>(&self, writer: &mut W, command: &SpecCommands) -> Result<(), CliError> {
        match command {
            SpecCommands::Get {
                app,
                deployment,
                format,
            } => {
                let app = app.as_deref().ok_or_else(|| CliError::missing_args("apps.spec.get"))?;
                let spec = match deployment {
                    Some(deployment) => self.client.get_deployment(app, deployment).await?.spec,
                    None => self.client.get(app).await?.spec,
                };
                let spec = spec.ok_or_else(|| CliError::Failed(format!("app {app} has no spec")))?;
                match format {
                    SpecFormat::Yaml => write_yaml(writer, &spec)?,
                    SpecFormat::Json => write_json(writer, &spec)?,
                }
            }
            SpecCommands::Validate { spec, schema_only } => {
                let path = spec.as_deref().ok_or_else(|| CliError::missing_args("apps.spec.validate"))?;
                let spec = load_app_spec(path)?;
                if *schema_only {
                    return write_yaml(writer, &spec);
                }
                let req = AppProposeRequest {
                    spec,
                    app_id: String::new(),
                };
                let proposal = self.client.propose(&req).await?;
                write_yaml(writer, &proposal.spec.unwrap_or(req.spec))?;
            }
        }
        Ok(())
    }

    async fn tier<W: Write>(&self, writer: &mut W, format: &OutputFormat, command: &TierCommands) -> Result<(), CliError> {
        match command {
            TierCommands::List { display } => {
                let tiers = self.client.list_tiers().await?;
                format.with_display(display).write(writer, &AppTiers(tiers))?;
            }
            TierCommands::Get { slug, display } => {
                let slug = slug.as_deref().ok_or_else(|| CliError::missing_args("apps.tier.get"))?;
                let tier = self.client.get_tier(slug).await?;
                format.with_display(display).write(writer, &AppTiers(vec![tier]))?;
            }
            TierCommands::InstanceSize {
                command: InstanceSizeCommands::List { display },
            } => {
                let sizes = self.client.list_instance_sizes().await?;
                format.with_display(display).write(writer, &AppInstanceSizes(sizes))?;
            }
            TierCommands::InstanceSize {
                command: InstanceSizeCommands::Get { slug, display },
            } => {
                let slug = slug
                    .as_deref()
                    .ok_or_else(|| CliError::missing_args("apps.tier.instance-size.get"))?;
                let size = self.client.get_instance_size(slug).await?;
                format.with_display(display).write(writer, &AppInstanceSizes(vec![size]))?;
            }
        }
        Ok(())
    }
}

/// Console input frame.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
enum ConsoleFrame {
    Stdin { data: String },
    Resize { width: u16, height: u16 },
}

/// Turn keystrokes and resizes into console frames until stdin closes or
/// the relay stops reading.
async fn forward_console_input(
    mut stdin: mpsc::Receiver<String>,
    mut resize: mpsc::Receiver<TerminalSize>,
    input: mpsc::Sender<String>,
) -> Result<(), CliError> {
    let mut resize_open = true;
    loop {
        // Resizes first so the initial size lands before any keystroke.
        let frame = tokio::select! {
            biased;
            size = resize.recv(), if resize_open => match size {
                Some(TerminalSize { width, height }) => ConsoleFrame::Resize { width, height },
                None => {
                    resize_open = false;
                    continue;
                }
            },
            data = stdin.recv() => match data {
                Some(data) => ConsoleFrame::Stdin { data },
                None => break,
            },
            () = input.closed() => break,
        };
        if input.send(serde_json::to_string(&frame)?).await.is_err() {
            break;
        }
    }
    Ok(())
}
