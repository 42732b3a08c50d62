//! VR-010: Resource query abstraction for existence checks and enumeration.
//!
//! Resolvers only see the `ResourceQuery` trait. Two backends ship:
//! an inventory snapshot loaded from YAML, and the `az` CLI.

pub mod azcli;
pub mod inventory;
pub mod local;

use std::fmt;
use thiserror::Error;

/// The resource service call failed. Propagated verbatim, never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
}

impl TransportError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Resource kinds the resolvers ask about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    StorageAccount,
    AvailabilitySet,
    VirtualNetwork,
    Subnet,
    NetworkSecurityGroup,
    PublicIpAddress,
    LoadBalancer,
    NetworkInterface,
}

impl ResourceKind {
    /// Provider namespace.
    pub fn namespace(self) -> &'static str {
        match self {
            Self::StorageAccount => "Microsoft.Storage",
            Self::AvailabilitySet => "Microsoft.Compute",
            _ => "Microsoft.Network",
        }
    }

    /// Resource type segment.
    pub fn resource_type(self) -> &'static str {
        match self {
            Self::StorageAccount => "storageAccounts",
            Self::AvailabilitySet => "availabilitySets",
            Self::VirtualNetwork => "virtualNetworks",
            Self::Subnet => "subnets",
            Self::NetworkSecurityGroup => "networkSecurityGroups",
            Self::PublicIpAddress => "publicIPAddresses",
            Self::LoadBalancer => "loadBalancers",
            Self::NetworkInterface => "networkInterfaces",
        }
    }

    /// `namespace/type`, as used by list filters.
    pub fn full_type(self) -> String {
        format!("{}/{}", self.namespace(), self.resource_type())
    }

    /// Build an existence query for `name` in `resource_group`.
    pub fn existence(self, name: &str, resource_group: &str) -> ExistenceQuery {
        ExistenceQuery {
            name: name.to_string(),
            resource_group: resource_group.to_string(),
            namespace: self.namespace().to_string(),
            resource_type: self.resource_type().to_string(),
            parent: None,
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.full_type())
    }
}

/// Parent segment for nested resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentResource {
    pub name: String,
    pub resource_type: String,
}

/// "Does X exist?" by name, scope and type, plus an optional parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExistenceQuery {
    pub name: String,
    pub resource_group: String,
    pub namespace: String,
    pub resource_type: String,
    pub parent: Option<ParentResource>,
}

impl ExistenceQuery {
    /// Nest under a parent resource (`subnets` under `virtualNetworks`).
    pub fn under(mut self, parent_name: &str, parent_type: &str) -> Self {
        self.parent = Some(ParentResource {
            name: parent_name.to_string(),
            resource_type: parent_type.to_string(),
        });
        self
    }
}

/// One row of an enumeration result.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResourceSummary {
    pub name: String,
    pub location: String,
    /// SKU tier (`Standard`/`Premium`) where the type has one.
    pub sku_tier: Option<String>,
    /// Child subnet names, for virtual networks.
    pub subnets: Vec<String>,
}

/// Resource group metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceGroupInfo {
    pub name: String,
    pub location: String,
}

/// Synchronous view of the resource management service.
pub trait ResourceQuery {
    fn exists(&self, query: &ExistenceQuery) -> Result<bool, TransportError>;

    /// Resources of `kind` in `resource_group`, in service order.
    fn list_by_resource_group(
        &self,
        resource_group: &str,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceSummary>, TransportError>;

    fn get_resource_group(&self, name: &str) -> Result<ResourceGroupInfo, TransportError>;
}
