//! Droplet command implementation.

use std::fs;
use std::io::Write;

use ocean_api::droplets::{DropletBackupPolicy, DropletCreateImage, DropletCreateSshKey, DropletCreateVolume};
use ocean_api::{ActionsService, ApiError, Droplet, DropletCreateRequest, DropletsService, ProjectsService};
use tracing::{debug, warn};

use crate::cli::{DropletCommands, DropletCreateArgs};
use crate::confirm::{Confirm, ask_for_confirm_delete};
use crate::displayers::Droplets;
use crate::error::CliError;
use crate::glob::{compile_all, matches_any};
use crate::output::OutputFormat;
use crate::wait::{Poller, wait_for_action};

/// Droplet command executor.
pub struct DropletCommand<'a, C> {
    client: &'a C,
    confirm: &'a dyn Confirm,
    poller: Poller,
}

impl<'a, C> DropletCommand<'a, C>
where
    C: DropletsService + ActionsService + ProjectsService,
{
    /// Create a new droplet command.
    #[must_use]
    pub fn new(client: &'a C, confirm: &'a dyn Confirm) -> Self {
        Self {
            client,
            confirm,
            poller: Poller::actions(),
        }
    }

    /// Replace the poller used by `--wait`.
    #[must_use]
    pub const fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    /// Execute a droplet subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if arguments are invalid or an API call fails.
    pub async fn execute<W: Write>(
        &self,
        writer: &mut W,
        format: &OutputFormat,
        command: &DropletCommands,
    ) -> Result<(), CliError> {
        match command {
            DropletCommands::Create(args) => {
                let droplets = self.create(args).await?;
                format.with_display(&args.display).write(writer, &Droplets(droplets))?;
            }
            DropletCommands::Get { ids, display } => {
                if ids.is_empty() {
                    return Err(CliError::missing_args("droplet.get"));
                }
                let mut droplets = Vec::with_capacity(ids.len());
                for id in ids {
                    droplets.push(self.client.get_droplet(parse_id(id)?).await?);
                }
                format.with_display(display).write(writer, &Droplets(droplets))?;
            }
            DropletCommands::List {
                globs,
                region,
                tag_name,
                display,
            } => {
                let droplets = self.list(globs, region.as_deref(), tag_name.as_deref()).await?;
                format.with_display(display).write(writer, &Droplets(droplets))?;
            }
            DropletCommands::Delete {
                droplets,
                force,
                tag_name,
            } => self.delete(droplets, *force, tag_name.as_deref()).await?,
        }
        Ok(())
    }

    /// Create one or more droplets.
    ///
    /// # Errors
    ///
    /// Returns an error if required arguments are missing, the project does
    /// not exist, or creating, waiting or assigning fails.
    pub async fn create(&self, args: &DropletCreateArgs) -> Result<Vec<Droplet>, CliError> {
        if args.names.is_empty() {
            return Err(CliError::missing_args("droplet.create"));
        }
        let size = args
            .size
            .as_deref()
            .ok_or_else(|| CliError::missing_args("droplet.create.size"))?;
        let image = args
            .image
            .as_deref()
            .ok_or_else(|| CliError::missing_args("droplet.create.image"))?;

        let mut req = DropletCreateRequest::new(
            args.region.clone().unwrap_or_default(),
            size,
            DropletCreateImage::parse(image),
        );
        req.user_data = user_data(args)?;
        req.ssh_keys = args.ssh_keys.iter().map(|k| DropletCreateSshKey::parse(k)).collect();
        req.backups = args.enable_backups;
        req.backup_policy = backup_policy(args);
        req.ipv6 = args.enable_ipv6;
        req.private_networking = args.enable_private_networking;
        req.monitoring = args.enable_monitoring;
        req.with_droplet_agent = args.droplet_agent;
        req.tags = args.tag_name.iter().chain(&args.tag_names).cloned().collect();
        req.vpc_uuid = args.vpc_uuid.clone().unwrap_or_default();
        req.volumes = args
            .volumes
            .iter()
            .map(|id| DropletCreateVolume { id: id.clone() })
            .collect();

        if let Some(project_id) = &args.project_id {
            self.client.get_project(project_id).await?;
        }

        let created = if let [name] = args.names.as_slice() {
            req.name = Some(name.clone());
            self.client.create_droplet(&req).await?
        } else {
            req.names.clone_from(&args.names);
            self.client.create_droplets(&req).await?
        };
        debug!(count = created.droplets.len(), "droplets created");

        let droplets = if args.wait {
            let mut active = Vec::with_capacity(created.droplets.len());
            for (i, droplet) in created.droplets.iter().enumerate() {
                if let Some(href) = created.create_action_href(i) {
                    if let Err(err) = wait_for_action(self.client, &self.poller, href).await {
                        warn!(droplet = droplet.id, error = %err, "waiting for droplet create action failed");
                    }
                }
                active.push(self.client.get_droplet(droplet.id).await?);
            }
            active
        } else {
            created.droplets
        };

        if let Some(project_id) = &args.project_id {
            let urns: Vec<String> = droplets.iter().map(Droplet::urn).collect();
            self.client.assign_resources(project_id, &urns).await?;
        }
        Ok(droplets)
    }

    /// List droplets, optionally by tag, filtered by globs and region.
    ///
    /// # Errors
    ///
    /// Returns an error if a glob is invalid or the API call fails.
    pub async fn list(
        &self,
        globs: &[String],
        region: Option<&str>,
        tag: Option<&str>,
    ) -> Result<Vec<Droplet>, CliError> {
        let globs = compile_all(globs)?;
        let droplets = match tag {
            Some(tag) => self.client.list_droplets_by_tag(tag).await?,
            None => self.client.list_droplets().await?,
        };
        Ok(droplets
            .into_iter()
            .filter(|d| matches_any(&globs, &[d.id.to_string().as_str(), d.name.as_str()]))
            .filter(|d| region.is_none_or(|r| d.region.slug == r))
            .collect())
    }

    async fn delete(&self, targets: &[String], force: bool, tag: Option<&str>) -> Result<(), CliError> {
        if let Some(tag) = tag {
            if !targets.is_empty() {
                return Err(CliError::InvalidArgument(
                    "droplet IDs or names cannot be combined with --tag-name".into(),
                ));
            }
            if !force {
                let message = format!("Are you sure you want to delete all droplets tagged \"{tag}\"?");
                if !self.confirm.confirm(&message)? {
                    return Err(CliError::Aborted);
                }
            }
            self.client.delete_droplets_by_tag(tag).await?;
            return Ok(());
        }

        if targets.is_empty() {
            return Err(CliError::missing_args("droplet.delete"));
        }
        if !force {
            ask_for_confirm_delete(self.confirm, "droplet", targets.len())?;
        }
        let ids = self.resolve_ids(targets).await?;
        for id in ids {
            self.client.delete_droplet(id).await?;
        }
        Ok(())
    }

    /// Numeric arguments are IDs; names are looked up and must be unique.
    async fn resolve_ids(&self, targets: &[String]) -> Result<Vec<u64>, CliError> {
        if targets.iter().all(|t| t.parse::<u64>().is_ok()) {
            return targets.iter().map(|t| parse_id(t)).collect();
        }
        let all = self.client.list_droplets().await?;
        targets
            .iter()
            .map(|target| {
                if let Ok(id) = target.parse::<u64>() {
                    return Ok(id);
                }
                let mut matches = all.iter().filter(|d| &d.name == target);
                match (matches.next(), matches.next()) {
                    (Some(droplet), None) => Ok(droplet.id),
                    (Some(_), Some(_)) => Err(CliError::InvalidArgument(format!(
                        "there are multiple droplets named \"{target}\", delete them by ID"
                    ))),
                    (None, _) => Err(ApiError::NotFound(format!("droplet \"{target}\"")).into()),
                }
            })
            .collect()
    }
}

fn parse_id(raw: &str) -> Result<u64, CliError> {
    raw.parse()
        .map_err(|_| CliError::InvalidArgument(format!("droplet ID \"{raw}\" is not a number")))
}

fn user_data(args: &DropletCreateArgs) -> Result<String, CliError> {
    match (&args.user_data, &args.user_data_file) {
        (Some(_), Some(_)) => Err(CliError::InvalidArgument(
            "only one of --user-data and --user-data-file can be set".into(),
        )),
        (Some(data), None) => Ok(data.clone()),
        (None, Some(path)) => Ok(fs::read_to_string(path)?),
        (None, None) => Ok(String::new()),
    }
}

fn backup_policy(args: &DropletCreateArgs) -> Option<DropletBackupPolicy> {
    if !args.enable_backups {
        return None;
    }
    let policy = DropletBackupPolicy {
        plan: args.backup_policy_plan.clone().unwrap_or_default(),
        weekday: args.backup_policy_weekday.clone().unwrap_or_default(),
        hour: args.backup_policy_hour,
    };
    (policy != DropletBackupPolicy::default()).then_some(policy)
}
