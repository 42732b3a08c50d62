//! VR-003: Request, namespace, and classification types.
//!
//! Two request shapes (VM and scale set) feed one `Namespace`, which each
//! resolver consumes and returns. All types derive Serialize for YAML/JSON
//! hand-off to the template builder.

use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

// ============================================================================
// Classification enums
// ============================================================================

/// Which pipeline the namespace was created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Flow {
    Vm,
    Vmss,
}

impl fmt::Display for Flow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vm => write!(f, "vm"),
            Self::Vmss => write!(f, "vmss"),
        }
    }
}

/// Guest operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OsType {
    #[serde(alias = "Windows", alias = "WINDOWS")]
    Windows,
    #[serde(alias = "Linux", alias = "LINUX")]
    Linux,
}

impl fmt::Display for OsType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Windows => write!(f, "windows"),
            Self::Linux => write!(f, "linux"),
        }
    }
}

/// Credential scheme for the admin account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AuthenticationType {
    Password,
    Ssh,
}

impl fmt::Display for AuthenticationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Password => write!(f, "password"),
            Self::Ssh => write!(f, "ssh"),
        }
    }
}

/// How the OS disk is sourced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum StorageProfile {
    /// Native disk from a user-supplied VHD blob.
    CustomImageFromVhd,
    /// Native disk from a marketplace image.
    PlatformImage,
}

impl fmt::Display for StorageProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CustomImageFromVhd => write!(f, "custom_image_from_vhd"),
            Self::PlatformImage => write!(f, "platform_image"),
        }
    }
}

/// Existing-vs-new classification for required resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Presence {
    Existing,
    New,
}

impl fmt::Display for Presence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing => write!(f, "existing"),
            Self::New => write!(f, "new"),
        }
    }
}

impl From<bool> for Presence {
    fn from(exists: bool) -> Self {
        if exists {
            Self::Existing
        } else {
            Self::New
        }
    }
}

/// Existing/new/none classification for optional peripherals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PeripheralType {
    Existing,
    New,
    /// Deliberately omitted by the caller.
    #[serde(rename = "none")]
    Omitted,
}

impl fmt::Display for PeripheralType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Existing => write!(f, "existing"),
            Self::New => write!(f, "new"),
            Self::Omitted => write!(f, "none"),
        }
    }
}

impl From<Presence> for PeripheralType {
    fn from(p: Presence) -> Self {
        match p {
            Presence::Existing => Self::Existing,
            Presence::New => Self::New,
        }
    }
}

// ============================================================================
// Tri-state peripheral argument
// ============================================================================

/// A peripheral reference as supplied by the caller.
///
/// `Unset` means no opinion (a default is synthesized), `Omit` is the
/// explicit empty-string opt-out, `Named` is a reference to look up.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PeripheralArg {
    #[default]
    Unset,
    Omit,
    Named(String),
}

impl PeripheralArg {
    pub fn named(s: &str) -> Self {
        Self::Named(s.to_string())
    }

    pub fn as_option(&self) -> Option<&str> {
        match self {
            Self::Unset => None,
            Self::Omit => Some(""),
            Self::Named(s) => Some(s),
        }
    }
}

impl From<Option<String>> for PeripheralArg {
    fn from(v: Option<String>) -> Self {
        match v {
            None => Self::Unset,
            Some(s) if s.is_empty() => Self::Omit,
            Some(s) => Self::Named(s),
        }
    }
}

impl Serialize for PeripheralArg {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PeripheralArg {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<String>::deserialize(deserializer).map(Self::from)
    }
}

impl JsonSchema for PeripheralArg {
    fn schema_name() -> String {
        "PeripheralArg".to_string()
    }

    fn json_schema(gen: &mut schemars::gen::SchemaGenerator) -> schemars::schema::Schema {
        <Option<String>>::json_schema(gen)
    }
}

// ============================================================================
// NICs
// ============================================================================

/// NIC references as supplied: a single name/id or an ordered list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum NicArgs {
    Single(String),
    Multiple(Vec<String>),
}

impl Default for NicArgs {
    fn default() -> Self {
        Self::Multiple(Vec::new())
    }
}

impl NicArgs {
    /// Expand to an ordered list.
    pub fn to_vec(&self) -> Vec<String> {
        match self {
            Self::Single(s) if s.is_empty() => Vec::new(),
            Self::Single(s) => vec![s.clone()],
            Self::Multiple(v) => v.clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Single(s) => s.is_empty(),
            Self::Multiple(v) => v.is_empty(),
        }
    }
}

/// A normalized NIC attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct NicEntry {
    /// Fully-qualified NIC reference.
    pub id: String,
    pub primary: bool,
}

/// Marketplace image coordinates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageUrn {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

impl fmt::Display for ImageUrn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}:{}", self.publisher, self.offer, self.sku, self.version)
    }
}

// ============================================================================
// Requests
// ============================================================================

/// Arguments shared by VM and scale-set creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommonArgs {
    pub resource_group: String,

    pub image: String,

    #[serde(default)]
    pub location: Option<String>,

    #[serde(default)]
    pub os_type: Option<OsType>,

    #[serde(default)]
    pub vnet_name: Option<String>,

    /// Subnet name (with `vnet_name`) or full subnet reference.
    #[serde(default)]
    pub subnet: Option<String>,

    #[serde(default)]
    pub public_ip_address: PeripheralArg,

    #[serde(default)]
    pub authentication_type: Option<AuthenticationType>,

    #[serde(default = "default_admin_username")]
    pub admin_username: String,

    #[serde(default)]
    pub admin_password: Option<String>,

    /// Public key literal or path to a public key file.
    #[serde(default)]
    pub ssh_key_value: Option<String>,

    #[serde(default)]
    pub ssh_dest_key_path: Option<String>,

    #[serde(default)]
    pub generate_ssh_keys: bool,
}

impl CommonArgs {
    pub fn new(resource_group: &str, image: &str) -> Self {
        Self {
            resource_group: resource_group.to_string(),
            image: image.to_string(),
            location: None,
            os_type: None,
            vnet_name: None,
            subnet: None,
            public_ip_address: PeripheralArg::Unset,
            authentication_type: None,
            admin_username: default_admin_username(),
            admin_password: None,
            ssh_key_value: None,
            ssh_dest_key_path: None,
            generate_ssh_keys: false,
        }
    }
}

fn default_admin_username() -> String {
    std::env::var("USER")
        .ok()
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| "azureuser".to_string())
}

fn default_storage_sku() -> String {
    "Premium_LRS".to_string()
}

/// `vm create` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmCreateRequest {
    #[serde(flatten)]
    pub common: CommonArgs,

    #[serde(default)]
    pub storage_account: Option<String>,

    #[serde(default = "default_storage_sku")]
    pub storage_sku: String,

    #[serde(default)]
    pub availability_set: Option<String>,

    #[serde(default)]
    pub nsg: PeripheralArg,

    #[serde(default)]
    pub nics: NicArgs,
}

impl VmCreateRequest {
    pub fn new(resource_group: &str, image: &str) -> Self {
        Self {
            common: CommonArgs::new(resource_group, image),
            storage_account: None,
            storage_sku: default_storage_sku(),
            availability_set: None,
            nsg: PeripheralArg::Unset,
            nics: NicArgs::default(),
        }
    }
}

/// `vmss create` request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VmssCreateRequest {
    #[serde(flatten)]
    pub common: CommonArgs,

    #[serde(default)]
    pub load_balancer: PeripheralArg,
}

impl VmssCreateRequest {
    pub fn new(resource_group: &str, image: &str) -> Self {
        Self {
            common: CommonArgs::new(resource_group, image),
            load_balancer: PeripheralArg::Unset,
        }
    }
}

// ============================================================================
// Namespace
// ============================================================================

/// Resolved intent threaded through the pipeline.
///
/// Created once per request, moved through every resolver in order, then
/// handed whole to the template builder. Fields a flow never resolves stay
/// `None`.
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct Namespace {
    pub flow: Flow,
    pub resource_group: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub image: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_type: Option<OsType>,

    /// Marketplace coordinates, absent for VHD images.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os_image: Option<ImageUrn>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_profile: Option<StorageProfile>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_account: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_sku: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_account_type: Option<Presence>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_set: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnet_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub vnet_type: Option<Presence>,

    pub nsg: PeripheralArg,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsg_type: Option<PeripheralType>,

    pub public_ip_address: PeripheralArg,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_ip_type: Option<PeripheralType>,

    pub load_balancer: PeripheralArg,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub load_balancer_type: Option<PeripheralType>,

    /// NIC references as supplied.
    #[serde(skip)]
    pub nic_args: NicArgs,

    /// Normalized NIC list; empty when a default NIC is synthesized.
    pub nics: Vec<NicEntry>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub nic_type: Option<Presence>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub authentication_type: Option<AuthenticationType>,

    pub admin_username: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_key_value: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ssh_dest_key_path: Option<String>,

    pub generate_ssh_keys: bool,
}

impl Namespace {
    fn from_common(flow: Flow, c: CommonArgs) -> Self {
        Self {
            flow,
            resource_group: c.resource_group,
            location: c.location,
            image: c.image,
            os_type: c.os_type,
            os_image: None,
            storage_profile: None,
            storage_account: None,
            storage_sku: None,
            storage_account_type: None,
            availability_set: None,
            vnet_name: c.vnet_name,
            subnet: c.subnet,
            vnet_type: None,
            nsg: PeripheralArg::Unset,
            nsg_type: None,
            public_ip_address: c.public_ip_address,
            public_ip_type: None,
            load_balancer: PeripheralArg::Unset,
            load_balancer_type: None,
            nic_args: NicArgs::default(),
            nics: Vec::new(),
            nic_type: None,
            authentication_type: c.authentication_type,
            admin_username: c.admin_username,
            admin_password: c.admin_password,
            ssh_key_value: c.ssh_key_value,
            ssh_dest_key_path: c.ssh_dest_key_path,
            generate_ssh_keys: c.generate_ssh_keys,
        }
    }

    /// Copy with the admin password masked, for display.
    pub fn redacted(&self) -> Self {
        let mut ns = self.clone();
        if ns.admin_password.is_some() {
            ns.admin_password = Some("********".to_string());
        }
        ns
    }
}

impl From<VmCreateRequest> for Namespace {
    fn from(req: VmCreateRequest) -> Self {
        let mut ns = Self::from_common(Flow::Vm, req.common);
        ns.storage_account = req.storage_account;
        ns.storage_sku = Some(req.storage_sku);
        ns.availability_set = req.availability_set;
        ns.nsg = req.nsg;
        ns.nic_args = req.nics;
        ns
    }
}

impl From<VmssCreateRequest> for Namespace {
    fn from(req: VmssCreateRequest) -> Self {
        let mut ns = Self::from_common(Flow::Vmss, req.common);
        ns.load_balancer = req.load_balancer;
        ns
    }
}

// ============================================================================
// Tests
// ============================================================================
