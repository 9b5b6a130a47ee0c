//! Table layouts for API resources.
//!
//! Each wrapper serializes as the underlying item list, so JSON and YAML
//! output match the API representation.

use chrono::{DateTime, Utc};
use ocean_api::apps::spec::AppAlertSpec;
use ocean_api::apps::{
    App, AppAlert, AppInstanceSize, AppProposeResponse, AppRegion, AppTier, Buildpack, Deployment,
};
use ocean_api::{Droplet, Snapshot};
use serde::Serialize;

use crate::output::{TableDisplay, join};

fn timestamp(value: Option<&DateTime<Utc>>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// Droplets.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Droplets(pub Vec<Droplet>);

impl TableDisplay for Droplets {
    fn columns(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("ID", "ID"),
            ("Name", "Name"),
            ("PublicIPv4", "Public IPv4"),
            ("PrivateIPv4", "Private IPv4"),
            ("PublicIPv6", "Public IPv6"),
            ("Memory", "Memory"),
            ("VCPUs", "VCPUs"),
            ("Disk", "Disk"),
            ("Region", "Region"),
            ("Image", "Image"),
            ("VPCUUID", "VPC UUID"),
            ("Status", "Status"),
            ("Tags", "Tags"),
            ("Features", "Features"),
            ("Volumes", "Volumes"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|d| {
                vec![
                    d.id.to_string(),
                    d.name.clone(),
                    d.public_ipv4().unwrap_or_default().to_string(),
                    d.private_ipv4().unwrap_or_default().to_string(),
                    d.public_ipv6().unwrap_or_default().to_string(),
                    d.memory.to_string(),
                    d.vcpus.to_string(),
                    d.disk.to_string(),
                    d.region.slug.clone(),
                    format!("{} {}", d.image.distribution, d.image.name),
                    d.vpc_uuid.clone(),
                    d.status.clone(),
                    join(&d.tags),
                    join(&d.features),
                    join(&d.volume_ids),
                ]
            })
            .collect()
    }
}

/// Snapshots.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Snapshots(pub Vec<Snapshot>);

impl TableDisplay for Snapshots {
    fn columns(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("ID", "ID"),
            ("Name", "Name"),
            ("CreatedAt", "Created at"),
            ("Regions", "Regions"),
            ("ResourceId", "Resource ID"),
            ("ResourceType", "Resource Type"),
            ("MinDiskSize", "Min Disk Size"),
            ("Size", "Size"),
            ("Tags", "Tags"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|s| {
                vec![
                    s.id.clone(),
                    s.name.clone(),
                    s.created_at.clone(),
                    format!("[{}]", s.regions.join(" ")),
                    s.resource_id.clone(),
                    s.resource_type.clone(),
                    format!("{} GiB", s.min_disk_size),
                    format!("{:.2} GiB", s.size_gigabytes),
                    format!("[{}]", s.tags.join(" ")),
                ]
            })
            .collect()
    }
}

/// Apps.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Apps(pub Vec<App>);

impl TableDisplay for Apps {
    fn columns(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("ID", "ID"),
            ("Spec.Name", "Spec Name"),
            ("DefaultIngress", "Default Ingress"),
            ("ActiveDeployment.ID", "Active Deployment ID"),
            ("InProgressDeployment.ID", "In Progress Deployment ID"),
            ("Created", "Created At"),
            ("Updated", "Updated At"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|app| {
                vec![
                    app.id.clone(),
                    app.name().to_string(),
                    app.default_ingress.clone(),
                    app.active_deployment.as_ref().map(|d| d.id.clone()).unwrap_or_default(),
                    app.in_progress_deployment
                        .as_ref()
                        .map(|d| d.id.clone())
                        .unwrap_or_default(),
                    timestamp(app.created_at.as_ref()),
                    timestamp(app.updated_at.as_ref()),
                ]
            })
            .collect()
    }
}

/// Deployments.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Deployments(pub Vec<Deployment>);

impl TableDisplay for Deployments {
    fn columns(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("ID", "ID"),
            ("Cause", "Cause"),
            ("Progress", "Progress"),
            ("Phase", "Phase"),
            ("Created", "Created At"),
            ("Updated", "Updated At"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|d| {
                let progress = d
                    .progress
                    .as_ref()
                    .map(|p| format!("{}/{}", p.success_steps, p.total_steps))
                    .unwrap_or_default();
                vec![
                    d.id.clone(),
                    d.cause.clone(),
                    progress,
                    d.phase.to_string(),
                    timestamp(d.created_at.as_ref()),
                    timestamp(d.updated_at.as_ref()),
                ]
            })
            .collect()
    }
}

/// App regions.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AppRegions(pub Vec<AppRegion>);

impl TableDisplay for AppRegions {
    fn columns(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("Slug", "Region Slug"),
            ("Label", "Label"),
            ("Continent", "Continent"),
            ("DataCenters", "Data Centers"),
            ("Disabled", "Is Disabled?"),
            ("Reason", "Reason (if disabled)"),
            ("Default", "Is Default?"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|r| {
                vec![
                    r.slug.clone(),
                    r.label.clone(),
                    r.continent.clone(),
                    format!("[{}]", r.data_centers.join(" ")),
                    r.disabled.to_string(),
                    r.reason.clone(),
                    r.default.to_string(),
                ]
            })
            .collect()
    }
}

/// App tiers.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AppTiers(pub Vec<AppTier>);

impl TableDisplay for AppTiers {
    fn columns(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("Name", "Name"),
            ("Slug", "Slug"),
            ("EgressBandwidthBytes", "Egress Bandwidth"),
            ("BuildSeconds", "Build Seconds"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|t| {
                vec![
                    t.name.clone(),
                    t.slug.clone(),
                    bytes_to_human(&t.egress_bandwidth_bytes),
                    t.build_seconds.clone(),
                ]
            })
            .collect()
    }
}

/// App instance sizes.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AppInstanceSizes(pub Vec<AppInstanceSize>);

impl TableDisplay for AppInstanceSizes {
    fn columns(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("Name", "Name"),
            ("Slug", "Slug"),
            ("CPUs", "vCPUs"),
            ("Memory", "Memory"),
            ("USDPerMonth", "$/month"),
            ("USDPerSecond", "$/second"),
            ("TierSlug", "Tier"),
            ("TierUpgradeDowngradePath", "Tier Downgrade/Upgrade Path"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|s| {
                let path = [s.tier_downgrade_to.as_str(), s.slug.as_str(), s.tier_upgrade_to.as_str()]
                    .into_iter()
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
                    .join(" <-> ");
                vec![
                    s.name.clone(),
                    s.slug.clone(),
                    format!("{} {}", s.cpus, s.cpu_type.to_lowercase()).trim().to_string(),
                    bytes_to_human(&s.memory_bytes),
                    s.usd_per_month.clone(),
                    s.usd_per_second.clone(),
                    s.tier_slug.clone(),
                    path,
                ]
            })
            .collect()
    }
}

/// App alerts.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AppAlerts(pub Vec<AppAlert>);

impl TableDisplay for AppAlerts {
    fn columns(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("ID", "ID"),
            ("Spec.Rule", "Spec.Rule"),
            ("Trigger", "Trigger"),
            ("ComponentName", "Component Name"),
            ("Emails", "Number Of Emails"),
            ("SlackWebhooks", "Number Of Slack Webhooks"),
            ("Spec.Disabled", "Spec.Disabled"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|a| {
                let (rule, disabled, trigger) = a.spec.as_ref().map_or_else(
                    || (String::new(), String::new(), String::new()),
                    |s| (s.rule.clone(), s.disabled.to_string(), alert_trigger(s)),
                );
                vec![
                    a.id.clone(),
                    rule,
                    trigger,
                    a.component_name.clone(),
                    a.emails.len().to_string(),
                    a.slack_webhooks.len().to_string(),
                    disabled,
                ]
            })
            .collect()
    }
}

fn alert_trigger(spec: &AppAlertSpec) -> String {
    let subject = match spec.rule.as_str() {
        "DEPLOYMENT_FAILED" => return "Deployment failed".into(),
        "DEPLOYMENT_LIVE" => return "Deployment live".into(),
        "DEPLOYMENT_STARTED" => return "Deployment started".into(),
        "DEPLOYMENT_CANCELED" => return "Deployment canceled".into(),
        "DOMAIN_FAILED" => return "Domain failed".into(),
        "DOMAIN_LIVE" => return "Domain live".into(),
        "CPU_UTILIZATION" => "CPU Utilization",
        "MEM_UTILIZATION" => "Memory Utilization",
        "RESTART_COUNT" => "Restart Count",
        other => other,
    };
    let operator = match spec.operator.as_str() {
        "GREATER_THAN" => ">",
        "LESS_THAN" => "<",
        other => other,
    };
    let value = spec.value.unwrap_or_default();
    let value = if spec.rule.ends_with("_UTILIZATION") {
        format!("{value:.2}%")
    } else {
        format!("{value:.0}")
    };
    let window = match spec.window.as_str() {
        "FIVE_MINUTES" => "5m",
        "TEN_MINUTES" => "10m",
        "THIRTY_MINUTES" => "30m",
        "ONE_HOUR" => "1h",
        other => other,
    };
    format!("{subject} {operator} {value} for {window}")
}

/// Buildpacks.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct Buildpacks(pub Vec<Buildpack>);

impl TableDisplay for Buildpacks {
    fn columns(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("Name", "Name"),
            ("ID", "ID"),
            ("Version", "Version"),
            ("Documentation", "Documentation"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        self.0
            .iter()
            .map(|b| vec![b.name.clone(), b.id.clone(), b.version.clone(), b.docs_link.clone()])
            .collect()
    }
}

/// Propose result.
#[derive(Debug, Clone, Serialize)]
#[serde(transparent)]
pub struct AppProposal(pub AppProposeResponse);

impl TableDisplay for AppProposal {
    fn columns(&self) -> &'static [(&'static str, &'static str)] {
        &[
            ("AppNameAvailable", "App Name Available?"),
            ("AppNameSuggestion", "Suggested App Name"),
            ("AppIsStatic", "Is Static?"),
            ("StaticApps", "Static App Usage"),
            ("AppCost", "$/month"),
            ("AppTierUpgradeCost", "$/month on higher tier"),
            ("AppTierDowngradeCost", "$/month on lower tier"),
        ]
    }

    fn rows(&self) -> Vec<Vec<String>> {
        let p = &self.0;
        let static_apps = if p.app_is_static {
            format!("{} of {} free", p.existing_static_apps, p.max_free_static_apps)
        } else {
            String::new()
        };
        let cost = |c: f64| if c > 0.0 { format!("{c:.2}") } else { String::new() };
        vec![vec![
            p.app_name_available.to_string(),
            p.app_name_suggestion.clone(),
            p.app_is_static.to_string(),
            static_apps,
            format!("{:.2}", p.app_cost),
            cost(p.app_tier_upgrade_cost),
            cost(p.app_tier_downgrade_cost),
        ]]
    }
}

/// Render a byte count string with binary units, e.g. `512.00 MiB`.
fn bytes_to_human(raw: &str) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let Ok(bytes) = raw.parse::<u64>() else {
        return raw.to_string();
    };
    #[allow(clippy::cast_precision_loss)]
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.2} {}", UNITS[unit])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Format;
    use crate::output::OutputFormat;
    use ocean_api::droplets::{Image, NetworkV4, Networks, Region};

    fn droplet() -> Droplet {
        Droplet {
            id: 1111,
            name: "some-droplet-name".into(),
            memory: 12,
            vcpus: 13,
            disk: 15,
            status: "active".into(),
            region: Region {
                slug: "some-region-slug".into(),
                ..Region::default()
            },
            image: Image {
                name: "some-image-name".into(),
                distribution: "some-distro".into(),
                ..Image::default()
            },
            networks: Networks {
                v4: vec![
                    NetworkV4 {
                        ip_address: "1.2.3.4".into(),
                        kind: "public".into(),
                        ..NetworkV4::default()
                    },
                    NetworkV4 {
                        ip_address: "7.7.7.7".into(),
                        kind: "private".into(),
                        ..NetworkV4::default()
                    },
                ],
                v6: vec![],
            },
            tags: vec!["yes".into()],
            features: vec!["remotes".into()],
            volume_ids: vec!["some-volume-id".into()],
            vpc_uuid: "00000000-0000-4000-8000-000000000000".into(),
            ..Droplet::default()
        }
    }

    #[test]
    fn test_droplet_table() {
        let out = OutputFormat::new(Format::Text)
            .to_string(&Droplets(vec![droplet()]))
            .expect("render");
        let expected = "\
ID      Name                 Public IPv4    Private IPv4    Public IPv6    Memory    VCPUs    Disk    Region              Image                          VPC UUID                                Status    Tags    Features    Volumes
1111    some-droplet-name    1.2.3.4        7.7.7.7                        12        13       15      some-region-slug    some-distro some-image-name    00000000-0000-4000-8000-000000000000    active    yes     remotes     some-volume-id
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_snapshot_sizes() {
        let snapshot = Snapshot {
            id: "53344211".into(),
            name: "stack-01".into(),
            regions: vec!["nyc1".into(), "sfo2".into()],
            min_disk_size: 20,
            size_gigabytes: 1.5,
            ..Snapshot::default()
        };
        let rows = Snapshots(vec![snapshot]).rows();
        assert_eq!(rows[0][3], "[nyc1 sfo2]");
        assert_eq!(rows[0][6], "20 GiB");
        assert_eq!(rows[0][7], "1.50 GiB");
    }

    #[test]
    fn test_bytes_to_human() {
        assert_eq!(bytes_to_human("536870912"), "512.00 MiB");
        assert_eq!(bytes_to_human("100"), "100 B");
        assert_eq!(bytes_to_human("n/a"), "n/a");
    }

    #[test]
    fn test_deployment_progress_column() {
        let deployment = Deployment {
            id: "dep-1".into(),
            progress: Some(ocean_api::apps::DeploymentProgress {
                success_steps: 2,
                total_steps: 5,
                ..Default::default()
            }),
            ..Deployment::default()
        };
        let rows = Deployments(vec![deployment]).rows();
        assert_eq!(rows[0][2], "2/5");
        assert_eq!(rows[0][3], "UNKNOWN");
    }

    #[test]
    fn test_alert_trigger() {
        let spec = AppAlertSpec {
            rule: "CPU_UTILIZATION".into(),
            operator: "GREATER_THAN".into(),
            value: Some(80.0),
            window: "FIVE_MINUTES".into(),
            ..Default::default()
        };
        assert_eq!(alert_trigger(&spec), "CPU Utilization > 80.00% for 5m");
        let spec = AppAlertSpec {
            rule: "DEPLOYMENT_FAILED".into(),
            ..Default::default()
        };
        assert_eq!(alert_trigger(&spec), "Deployment failed");
    }
}
