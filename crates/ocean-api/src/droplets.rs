//! Droplets (virtual machines).

use std::future::Future;

use reqwest::Method;
use serde::{Deserialize, Serialize};

use crate::actions::ActionLink;
use crate::client::ApiClient;
use crate::error::ApiError;

/// A droplet as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Droplet {
    /// Droplet ID.
    pub id: u64,
    /// Droplet name.
    pub name: String,
    /// Memory in MB.
    pub memory: u64,
    /// Virtual CPUs.
    pub vcpus: u64,
    /// Disk size in GB.
    pub disk: u64,
    /// `new`, `active`, `off` or `archive`.
    pub status: String,
    /// Region the droplet runs in.
    pub region: Region,
    /// Base image.
    pub image: Image,
    /// Size slug.
    pub size_slug: String,
    /// Network interfaces.
    pub networks: Networks,
    /// Tags.
    pub tags: Vec<String>,
    /// Enabled features, e.g. `backups`, `ipv6`.
    pub features: Vec<String>,
    /// Attached block storage volume IDs.
    pub volume_ids: Vec<String>,
    /// VPC the droplet belongs to.
    pub vpc_uuid: String,
    /// Creation time as reported by the API.
    pub created_at: String,
}

/// Region summary embedded in other resources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Region {
    /// Region slug, e.g. `nyc3`.
    pub slug: String,
    /// Display name.
    pub name: String,
}

/// Image summary embedded in a droplet.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Image {
    /// Image ID.
    pub id: u64,
    /// Image name.
    pub name: String,
    /// Distribution name.
    pub distribution: String,
    /// Image slug, if public.
    pub slug: String,
}

/// Droplet networks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Networks {
    /// IPv4 interfaces.
    pub v4: Vec<NetworkV4>,
    /// IPv6 interfaces.
    pub v6: Vec<NetworkV6>,
}

/// One IPv4 interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkV4 {
    /// Address.
    pub ip_address: String,
    /// `public` or `private`.
    #[serde(rename = "type")]
    pub kind: String,
}

/// One IPv6 interface.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkV6 {
    /// Address.
    pub ip_address: String,
    /// `public`.
    #[serde(rename = "type")]
    pub kind: String,
}

impl Droplet {
    /// First public IPv4 address.
    pub fn public_ipv4(&self) -> Option<&str> {
        self.networks
            .v4
            .iter()
            .find(|n| n.kind == "public")
            .map(|n| n.ip_address.as_str())
    }

    /// First private IPv4 address.
    pub fn private_ipv4(&self) -> Option<&str> {
        self.networks
            .v4
            .iter()
            .find(|n| n.kind == "private")
            .map(|n| n.ip_address.as_str())
    }

    /// First public IPv6 address.
    pub fn public_ipv6(&self) -> Option<&str> {
        self.networks
            .v6
            .iter()
            .find(|n| n.kind == "public")
            .map(|n| n.ip_address.as_str())
    }

    /// Resource name used for project assignment.
    pub fn urn(&self) -> String {
        format!("do:droplet:{}", self.id)
    }
}

/// Image reference in a create request: numeric ID or slug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DropletCreateImage {
    /// Image ID.
    Id(u64),
    /// Public image slug.
    Slug(String),
}

impl DropletCreateImage {
    /// Numeric arguments are IDs, anything else is a slug.
    pub fn parse(value: &str) -> Self {
        value
            .parse::<u64>()
            .map_or_else(|_| Self::Slug(value.to_string()), Self::Id)
    }
}

/// SSH key reference in a create request: numeric ID or fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DropletCreateSshKey {
    /// Key ID.
    Id(u64),
    /// Key fingerprint.
    Fingerprint(String),
}

impl DropletCreateSshKey {
    /// Numeric arguments are IDs, anything else is a fingerprint.
    pub fn parse(value: &str) -> Self {
        value
            .parse::<u64>()
            .map_or_else(|_| Self::Fingerprint(value.to_string()), Self::Id)
    }
}

/// Volume to attach at creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DropletCreateVolume {
    /// Volume ID.
    pub id: String,
}

/// Backup schedule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DropletBackupPolicy {
    /// `daily` or `weekly`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub plan: String,
    /// Day of the week for weekly backups, e.g. `MON`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub weekday: String,
    /// Start hour of the backup window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hour: Option<u32>,
}

/// Body of `POST /v2/droplets`.
///
/// Set `name` for a single droplet or `names` for several.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropletCreateRequest {
    /// Single droplet name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Names when creating several droplets.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    /// Region slug.
    pub region: String,
    /// Size slug.
    pub size: String,
    /// Base image.
    pub image: DropletCreateImage,
    /// SSH keys to embed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ssh_keys: Vec<DropletCreateSshKey>,
    /// Enable backups.
    pub backups: bool,
    /// Backup schedule, only with `backups`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_policy: Option<DropletBackupPolicy>,
    /// Enable IPv6.
    pub ipv6: bool,
    /// Enable private networking.
    pub private_networking: bool,
    /// Install the monitoring agent.
    pub monitoring: bool,
    /// Cloud-init user data.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub user_data: String,
    /// Volumes to attach.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub volumes: Vec<DropletCreateVolume>,
    /// Tags.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    /// VPC to place the droplet in.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub vpc_uuid: String,
    /// Install the droplet agent. Unset leaves the API default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_droplet_agent: Option<bool>,
}

impl DropletCreateRequest {
    /// Request with the required fields set.
    pub fn new(region: impl Into<String>, size: impl Into<String>, image: DropletCreateImage) -> Self {
        Self {
            name: None,
            names: Vec::new(),
            region: region.into(),
            size: size.into(),
            image,
            ssh_keys: Vec::new(),
            backups: false,
            backup_policy: None,
            ipv6: false,
            private_networking: false,
            monitoring: false,
            user_data: String::new(),
            volumes: Vec::new(),
            tags: Vec::new(),
            vpc_uuid: String::new(),
            with_droplet_agent: None,
        }
    }
}

/// Droplets returned by a create call with their action links.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreatedDroplets {
    /// Created droplets, in request order.
    pub droplets: Vec<Droplet>,
    /// Action links, `rel == "create"` for the create actions.
    pub actions: Vec<ActionLink>,
}

impl CreatedDroplets {
    /// `href` of the create action for `droplet_index`.
    ///
    /// A single-droplet response carries one create link; a multi-create
    /// response carries one per droplet in order.
    pub fn create_action_href(&self, droplet_index: usize) -> Option<&str> {
        self.actions
            .iter()
            .filter(|a| a.rel == "create")
            .nth(droplet_index)
            .map(|a| a.href.as_str())
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateResponse {
    droplet: Option<Droplet>,
    droplets: Vec<Droplet>,
    links: CreateLinks,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CreateLinks {
    actions: Vec<ActionLink>,
}

impl From<CreateResponse> for CreatedDroplets {
    fn from(resp: CreateResponse) -> Self {
        let mut droplets = resp.droplets;
        if let Some(droplet) = resp.droplet {
            droplets.insert(0, droplet);
        }
        Self {
            droplets,
            actions: resp.links.actions,
        }
    }
}

/// Droplet operations.
pub trait DropletsService: Send + Sync {
    /// Create one droplet.
    fn create_droplet(
        &self,
        req: &DropletCreateRequest,
    ) -> impl Future<Output = Result<CreatedDroplets, ApiError>> + Send;

    /// Create several droplets from `req.names`.
    fn create_droplets(
        &self,
        req: &DropletCreateRequest,
    ) -> impl Future<Output = Result<CreatedDroplets, ApiError>> + Send;

    /// Fetch a droplet.
    fn get_droplet(&self, id: u64) -> impl Future<Output = Result<Droplet, ApiError>> + Send;

    /// List all droplets.
    fn list_droplets(&self) -> impl Future<Output = Result<Vec<Droplet>, ApiError>> + Send;

    /// List droplets carrying `tag`.
    fn list_droplets_by_tag(&self, tag: &str) -> impl Future<Output = Result<Vec<Droplet>, ApiError>> + Send;

    /// Delete a droplet.
    fn delete_droplet(&self, id: u64) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// Delete every droplet carrying `tag`.
    fn delete_droplets_by_tag(&self, tag: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

impl ApiClient {
    /// One endpoint serves both shapes; `name` or `names` in the body decides.
    async fn post_droplets(&self, req: &DropletCreateRequest) -> Result<CreatedDroplets, ApiError> {
        let resp: CreateResponse = self.send_body(Method::POST, "v2/droplets", req).await?;
        Ok(resp.into())
    }
}

impl DropletsService for ApiClient {
    async fn create_droplet(&self, req: &DropletCreateRequest) -> Result<CreatedDroplets, ApiError> {
        self.post_droplets(req).await
    }

    async fn create_droplets(&self, req: &DropletCreateRequest) -> Result<CreatedDroplets, ApiError> {
        self.post_droplets(req).await
    }

    async fn get_droplet(&self, id: u64) -> Result<Droplet, ApiError> {
        self.get_key(&format!("v2/droplets/{id}"), "droplet").await
    }

    async fn list_droplets(&self) -> Result<Vec<Droplet>, ApiError> {
        self.list_all("v2/droplets", &[], "droplets").await
    }

    async fn list_droplets_by_tag(&self, tag: &str) -> Result<Vec<Droplet>, ApiError> {
        self.list_all("v2/droplets", &[("tag_name", tag)], "droplets").await
    }

    async fn delete_droplet(&self, id: u64) -> Result<(), ApiError> {
        self.delete_path(&format!("v2/droplets/{id}")).await
    }

    async fn delete_droplets_by_tag(&self, tag: &str) -> Result<(), ApiError> {
        let mut url = self.resolve("v2/droplets")?;
        url.query_pairs_mut().append_pair("tag_name", tag);
        self.delete_path(url.as_str()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DROPLET_JSON: &str = r#"{
        "id": 1111, "memory": 12, "vcpus": 13, "disk": 15, "name": "some-droplet-name",
        "networks": {"v4": [{"type": "public", "ip_address": "1.2.3.4"},
                            {"type": "private", "ip_address": "7.7.7.7"}]},
        "image": {"distribution": "some-distro", "name": "some-image-name"},
        "region": {"slug": "some-region-slug"},
        "status": "active", "vpc_uuid": "00000000-0000-4000-8000-000000000000",
        "tags": ["yes"], "features": ["remotes"], "volume_ids": ["some-volume-id"]
    }"#;

    #[test]
    fn test_droplet_accessors() {
        let droplet: Droplet = serde_json::from_str(DROPLET_JSON).expect("decode");
        assert_eq!(droplet.public_ipv4(), Some("1.2.3.4"));
        assert_eq!(droplet.private_ipv4(), Some("7.7.7.7"));
        assert_eq!(droplet.public_ipv6(), None);
        assert_eq!(droplet.urn(), "do:droplet:1111");
        assert_eq!(droplet.region.slug, "some-region-slug");
    }

    #[test]
    fn test_image_parse() {
        assert_eq!(DropletCreateImage::parse("12345"), DropletCreateImage::Id(12345));
        assert_eq!(
            DropletCreateImage::parse("ubuntu-24-04-x64"),
            DropletCreateImage::Slug("ubuntu-24-04-x64".into())
        );
    }

    #[test]
    fn test_create_request_body() {
        let mut req = DropletCreateRequest::new("nyc3", "s-1vcpu-1gb", DropletCreateImage::parse("a-test-image"));
        req.name = Some("web".into());
        req.ssh_keys = vec![DropletCreateSshKey::parse("42"), DropletCreateSshKey::parse("aa:bb")];
        req.backups = true;
        req.backup_policy = Some(DropletBackupPolicy {
            plan: "weekly".into(),
            weekday: "MON".into(),
            hour: Some(4),
        });

        let body = serde_json::to_value(&req).expect("encode");
        assert_eq!(body["name"], "web");
        assert_eq!(body["image"], "a-test-image");
        assert_eq!(body["ssh_keys"], serde_json::json!([42, "aa:bb"]));
        assert_eq!(
            body["backup_policy"],
            serde_json::json!({"plan": "weekly", "weekday": "MON", "hour": 4})
        );
        assert!(body.get("names").is_none());
        assert!(body.get("vpc_uuid").is_none());
        assert!(body.get("with_droplet_agent").is_none());
    }

    #[test]
    fn test_created_droplets_from_single_response() {
        let resp: CreateResponse = serde_json::from_str(
            r#"{"droplet": {"id": 777}, "links": {"actions": [{"id":1, "rel":"create", "href":"poll-for-droplet"}]}}"#,
        )
        .expect("decode");
        let created = CreatedDroplets::from(resp);
        assert_eq!(created.droplets.len(), 1);
        assert_eq!(created.droplets[0].id, 777);
        assert_eq!(created.create_action_href(0), Some("poll-for-droplet"));
        assert_eq!(created.create_action_href(1), None);
    }

    #[test]
    fn test_created_droplets_without_links() {
        let resp: CreateResponse = serde_json::from_str(&format!(r#"{{"droplet": {DROPLET_JSON}}}"#)).expect("decode");
        let created = CreatedDroplets::from(resp);
        assert_eq!(created.droplets[0].name, "some-droplet-name");
        assert!(created.actions.is_empty());
    }
}
