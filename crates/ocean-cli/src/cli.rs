//! Command-line argument parsing with clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use ocean_api::apps::AppLogType;
use serde::{Deserialize, Serialize};

/// oceanctl - manage droplets, snapshots and app platform apps.
#[derive(Parser, Debug, Clone)]
#[command(name = "oceanctl")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// API access token.
    #[arg(short = 't', long, env = "DIGITALOCEAN_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    /// Override the API endpoint.
    #[arg(short = 'u', long, env = "DIGITALOCEAN_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Config file path.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Authentication context from the config file.
    #[arg(long, env = "DIGITALOCEAN_CONTEXT", global = true)]
    pub context: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<Format>,

    /// Log every API request.
    #[arg(long, global = true)]
    pub trace: bool,

    /// Enable debug logging.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Aligned columns.
    #[default]
    Text,
    /// JSON output for scripting.
    Json,
    /// YAML output.
    Yaml,
}

/// Column selection shared by display commands.
#[derive(Args, Debug, Clone, Default)]
pub struct DisplayArgs {
    /// Columns to display, e.g. `ID,Name`.
    #[arg(long, value_delimiter = ',')]
    pub format: Vec<String>,

    /// Omit the header row.
    #[arg(long)]
    pub no_header: bool,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Compute resources.
    Compute {
        /// Compute subcommand to execute.
        #[command(subcommand)]
        command: ComputeCommands,
    },

    /// App platform apps.
    #[command(visible_aliases = ["app", "a"])]
    Apps {
        /// Apps subcommand to execute.
        #[command(subcommand)]
        command: AppsCommands,
    },
}

/// Compute subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum ComputeCommands {
    /// Manage droplets.
    #[command(visible_alias = "d")]
    Droplet {
        /// Droplet subcommand to execute.
        #[command(subcommand)]
        command: DropletCommands,
    },

    /// Manage snapshots.
    #[command(visible_alias = "s")]
    Snapshot {
        /// Snapshot subcommand to execute.
        #[command(subcommand)]
        command: SnapshotCommands,
    },
}

/// Snapshot resource filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SnapshotResource {
    /// Droplet snapshots.
    Droplet,
    /// Volume snapshots.
    Volume,
}

/// Snapshot subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SnapshotCommands {
    /// List snapshots.
    #[command(visible_alias = "ls")]
    List {
        /// Glob patterns matched against ID or name.
        globs: Vec<String>,

        /// Only snapshots of this resource type.
        #[arg(long)]
        resource: Option<SnapshotResource>,

        /// Only snapshots available in this region.
        #[arg(long)]
        region: Option<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Get snapshots by ID.
    #[command(visible_alias = "g")]
    Get {
        /// Snapshot IDs.
        ids: Vec<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Delete snapshots.
    #[command(visible_aliases = ["d", "rm"])]
    Delete {
        /// Snapshot IDs.
        ids: Vec<String>,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },
}

/// Droplet subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DropletCommands {
    /// Create droplets.
    #[command(visible_alias = "c")]
    Create(DropletCreateArgs),

    /// Get droplets by ID.
    #[command(visible_alias = "g")]
    Get {
        /// Droplet IDs.
        ids: Vec<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// List droplets.
    #[command(visible_alias = "ls")]
    List {
        /// Glob patterns matched against ID or name.
        globs: Vec<String>,

        /// Only droplets in this region.
        #[arg(long)]
        region: Option<String>,

        /// Only droplets with this tag.
        #[arg(long)]
        tag_name: Option<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Delete droplets by ID or name, or every droplet with a tag.
    #[command(visible_aliases = ["d", "rm"])]
    Delete {
        /// Droplet IDs or names.
        droplets: Vec<String>,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,

        /// Delete every droplet with this tag.
        #[arg(long)]
        tag_name: Option<String>,
    },
}

/// Arguments for `droplet create`.
#[derive(Args, Debug, Clone, Default)]
pub struct DropletCreateArgs {
    /// Droplet names.
    pub names: Vec<String>,

    /// Region slug.
    #[arg(long)]
    pub region: Option<String>,

    /// Size slug.
    #[arg(long)]
    pub size: Option<String>,

    /// Image ID or slug.
    #[arg(long)]
    pub image: Option<String>,

    /// SSH key IDs or fingerprints.
    #[arg(long, value_delimiter = ',')]
    pub ssh_keys: Vec<String>,

    /// Cloud-init user data.
    #[arg(long)]
    pub user_data: Option<String>,

    /// Read user data from a file.
    #[arg(long)]
    pub user_data_file: Option<PathBuf>,

    /// Enable backups.
    #[arg(long)]
    pub enable_backups: bool,

    /// Backup plan, `daily` or `weekly`.
    #[arg(long)]
    pub backup_policy_plan: Option<String>,

    /// Backup weekday for weekly plans.
    #[arg(long)]
    pub backup_policy_weekday: Option<String>,

    /// Backup window start hour.
    #[arg(long)]
    pub backup_policy_hour: Option<u32>,

    /// Enable IPv6.
    #[arg(long)]
    pub enable_ipv6: bool,

    /// Enable private networking.
    #[arg(long)]
    pub enable_private_networking: bool,

    /// Enable monitoring.
    #[arg(long)]
    pub enable_monitoring: bool,

    /// Install the droplet agent.
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub droplet_agent: Option<bool>,

    /// Tag to apply.
    #[arg(long)]
    pub tag_name: Option<String>,

    /// Tags to apply.
    #[arg(long, value_delimiter = ',')]
    pub tag_names: Vec<String>,

    /// VPC to place the droplets in.
    #[arg(long)]
    pub vpc_uuid: Option<String>,

    /// Volume IDs to attach.
    #[arg(long, value_delimiter = ',')]
    pub volumes: Vec<String>,

    /// Wait for the droplets to become active.
    #[arg(long)]
    pub wait: bool,

    /// Project to assign the droplets to.
    #[arg(long)]
    pub project_id: Option<String>,

    /// Display options.
    #[command(flatten)]
    pub display: DisplayArgs,
}

/// Log type flag values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogTypeArg {
    /// Build logs.
    Build,
    /// Deploy logs.
    Deploy,
    /// Runtime logs.
    #[default]
    Run,
    /// Runtime logs of the previous container.
    #[value(name = "run_restarted")]
    RunRestarted,
}

impl From<LogTypeArg> for AppLogType {
    fn from(arg: LogTypeArg) -> Self {
        match arg {
            LogTypeArg::Build => Self::Build,
            LogTypeArg::Deploy => Self::Deploy,
            LogTypeArg::Run => Self::Run,
            LogTypeArg::RunRestarted => Self::RunRestarted,
        }
    }
}

/// Spec output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum SpecFormat {
    /// YAML with sorted keys.
    #[default]
    Yaml,
    /// Pretty JSON.
    Json,
}

/// Apps subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum AppsCommands {
    /// Open a console session on a component.
    Console {
        /// App ID or name.
        app: Option<String>,

        /// Component name.
        component: Option<String>,

        /// Deployment ID, defaults to the active deployment.
        #[arg(long)]
        deployment: Option<String>,
    },

    /// Create an app from a spec.
    #[command(visible_alias = "c")]
    Create {
        /// Spec file, or `-` for stdin.
        #[arg(long)]
        spec: Option<String>,

        /// Update the app if one with the same name exists.
        #[arg(long)]
        upsert: bool,

        /// Wait for the first deployment.
        #[arg(long)]
        wait: bool,

        /// Project to create the app in.
        #[arg(long)]
        project_id: Option<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Get an app by ID or name.
    #[command(visible_alias = "g")]
    Get {
        /// App ID or name.
        app: Option<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// List apps.
    #[command(visible_alias = "ls")]
    List {
        /// Include project IDs.
        #[arg(long)]
        with_projects: bool,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Replace an app's spec.
    #[command(visible_alias = "u")]
    Update {
        /// App ID.
        app: Option<String>,

        /// Spec file, or `-` for stdin.
        #[arg(long)]
        spec: Option<String>,

        /// Deploy the latest commits of every git source.
        #[arg(long)]
        update_sources: bool,

        /// Wait for the resulting deployment.
        #[arg(long)]
        wait: bool,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Delete apps.
    #[command(visible_aliases = ["d", "rm"])]
    Delete {
        /// App IDs.
        apps: Vec<String>,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },

    /// Local development settings.
    Dev {
        /// Dev subcommand to execute.
        #[command(subcommand)]
        command: DevCommands,
    },

    /// Start a deployment.
    #[command(visible_alias = "cd")]
    CreateDeployment {
        /// App ID.
        app: Option<String>,

        /// Rebuild even if the source did not change.
        #[arg(long)]
        force_rebuild: bool,

        /// Wait for the deployment to finish.
        #[arg(long)]
        wait: bool,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Get a deployment.
    #[command(visible_alias = "gd")]
    GetDeployment {
        /// App ID.
        app: Option<String>,

        /// Deployment ID.
        deployment: Option<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// List an app's deployments.
    #[command(visible_alias = "lsd")]
    ListDeployments {
        /// App ID.
        app: Option<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// List regions apps can run in.
    ListRegions {
        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Print or stream component logs.
    #[command(visible_alias = "l")]
    Logs(LogsArgs),

    /// Validate a spec and show its cost.
    Propose {
        /// Spec file, or `-` for stdin.
        #[arg(long)]
        spec: Option<String>,

        /// Existing app the spec would update.
        #[arg(long)]
        app: Option<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Restart components.
    Restart {
        /// App ID.
        app: Option<String>,

        /// Components to restart, all when empty.
        #[arg(long, value_delimiter = ',')]
        components: Vec<String>,

        /// Wait for the restart to finish.
        #[arg(long)]
        wait: bool,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// App spec helpers.
    Spec {
        /// Spec subcommand to execute.
        #[command(subcommand)]
        command: SpecCommands,
    },

    /// Pricing tiers.
    Tier {
        /// Tier subcommand to execute.
        #[command(subcommand)]
        command: TierCommands,
    },

    /// List an app's alerts.
    ListAlerts {
        /// App ID.
        app: Option<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Replace the destinations of an alert.
    UpdateAlertDestinations {
        /// App ID.
        app: Option<String>,

        /// Alert ID.
        alert: Option<String>,

        /// File with `emails` and `slack_webhooks`.
        #[arg(long)]
        app_alert_destinations: Option<PathBuf>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// List available buildpacks.
    ListBuildpacks {
        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Upgrade a buildpack across an app's components.
    UpgradeBuildpack {
        /// App ID.
        app: Option<String>,

        /// Buildpack ID.
        #[arg(long)]
        buildpack: Option<String>,

        /// Target major version, 0 for the latest.
        #[arg(long, default_value_t = 0)]
        major_version: u32,

        /// Start a deployment after upgrading.
        #[arg(long)]
        trigger_deployment: bool,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },
}

/// Arguments for `apps logs`.
#[derive(Args, Debug, Clone, Default)]
pub struct LogsArgs {
    /// App ID or name.
    pub app: Option<String>,

    /// Component name, all components when omitted.
    pub component: Option<String>,

    /// Deployment ID.
    #[arg(long)]
    pub deployment: Option<String>,

    /// Log type.
    #[arg(long = "type", value_enum, default_value_t = LogTypeArg::Run)]
    pub log_type: LogTypeArg,

    /// Stream new lines as they arrive.
    #[arg(short, long)]
    pub follow: bool,

    /// Number of trailing lines, -1 for all.
    #[arg(short = 'n', long, default_value_t = -1, allow_negative_numbers = true)]
    pub tail: i64,

    /// Strip the component prefix from each line.
    #[arg(long)]
    pub no_prefix: bool,
}

/// `apps spec` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum SpecCommands {
    /// Print an app's spec.
    Get {
        /// App ID.
        app: Option<String>,

        /// Deployment to read the spec from.
        #[arg(long)]
        deployment: Option<String>,

        /// Spec format.
        #[arg(long, value_enum, default_value_t = SpecFormat::Yaml)]
        format: SpecFormat,
    },

    /// Check a spec file.
    Validate {
        /// Spec file, or `-` for stdin.
        spec: Option<String>,

        /// Only check the schema locally.
        #[arg(long)]
        schema_only: bool,
    },
}

/// `apps tier` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum TierCommands {
    /// List tiers.
    List {
        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Get a tier.
    Get {
        /// Tier slug.
        slug: Option<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Instance sizes.
    InstanceSize {
        /// Instance size subcommand to execute.
        #[command(subcommand)]
        command: InstanceSizeCommands,
    },
}

/// `apps tier instance-size` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum InstanceSizeCommands {
    /// List instance sizes.
    List {
        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },

    /// Get an instance size.
    Get {
        /// Instance size slug.
        slug: Option<String>,

        /// Display options.
        #[command(flatten)]
        display: DisplayArgs,
    },
}

/// `apps dev` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DevCommands {
    /// Per-project dev settings.
    Config {
        /// Settings file, defaults to `.do/dev-config.yaml`.
        #[arg(long, global = true)]
        dev_config: Option<PathBuf>,

        /// Config subcommand to execute.
        #[command(subcommand)]
        command: DevConfigCommands,
    },
}

/// `apps dev config` subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum DevConfigCommands {
    /// Set `KEY=VALUE` pairs.
    Set {
        /// Pairs to set.
        pairs: Vec<String>,
    },

    /// Remove keys.
    Unset {
        /// Keys to remove.
        keys: Vec<String>,
    },

    /// Print the settings.
    Get,
}
