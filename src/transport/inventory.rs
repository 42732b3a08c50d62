//! VR-012: Inventory snapshot backend.
//!
//! A YAML description of what already exists, answering `ResourceQuery`
//! without touching the network. Used for offline planning and tests.

use super::{
    ExistenceQuery, ResourceGroupInfo, ResourceKind, ResourceQuery, ResourceSummary,
    TransportError,
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::path::Path;

/// Root of an inventory file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Inventory {
    /// Subscription the snapshot was taken from.
    #[serde(default)]
    pub subscription: Option<String>,

    /// Resource groups (order-preserving).
    #[serde(default)]
    pub resource_groups: IndexMap<String, InventoryGroup>,

    #[serde(skip)]
    calls: Cell<usize>,
}

/// One resource group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryGroup {
    pub location: String,

    #[serde(default)]
    pub resources: Vec<InventoryResource>,
}

/// One existing resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryResource {
    /// `Namespace/type`, e.g. `Microsoft.Network/virtualNetworks`
    #[serde(rename = "type")]
    pub resource_type: String,

    pub name: String,

    pub location: String,

    #[serde(default)]
    pub sku_tier: Option<String>,

    /// Subnet names, virtual networks only.
    #[serde(default)]
    pub subnets: Vec<String>,
}

impl InventoryResource {
    pub fn new(kind: ResourceKind, name: &str, location: &str) -> Self {
        Self {
            resource_type: kind.full_type(),
            name: name.to_string(),
            location: location.to_string(),
            sku_tier: None,
            subnets: Vec::new(),
        }
    }

    pub fn with_sku_tier(mut self, tier: &str) -> Self {
        self.sku_tier = Some(tier.to_string());
        self
    }

    pub fn with_subnets(mut self, subnets: &[&str]) -> Self {
        self.subnets = subnets.iter().map(|s| s.to_string()).collect();
        self
    }

    fn is_type(&self, namespace: &str, resource_type: &str) -> bool {
        self.resource_type
            .eq_ignore_ascii_case(&format!("{}/{}", namespace, resource_type))
    }
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse an inventory from YAML.
    pub fn parse(yaml: &str) -> Result<Self, String> {
        serde_yaml_ng::from_str(yaml).map_err(|e| format!("inventory parse error: {}", e))
    }

    /// Load an inventory file from disk.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    pub fn with_group(mut self, name: &str, location: &str) -> Self {
        self.resource_groups.insert(
            name.to_string(),
            InventoryGroup {
                location: location.to_string(),
                resources: Vec::new(),
            },
        );
        self
    }

    /// Add a resource to an existing group. Unknown groups are ignored.
    pub fn with_resource(mut self, group: &str, resource: InventoryResource) -> Self {
        if let Some(g) = self.resource_groups.get_mut(group) {
            g.resources.push(resource);
        }
        self
    }

    /// Number of queries answered so far.
    pub fn calls(&self) -> usize {
        self.calls.get()
    }

    fn group(&self, name: &str) -> Option<&InventoryGroup> {
        self.resource_groups
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, g)| g)
    }

    fn tick(&self) {
        self.calls.set(self.calls.get() + 1);
    }
}

impl ResourceQuery for Inventory {
    fn exists(&self, query: &ExistenceQuery) -> Result<bool, TransportError> {
        self.tick();
        let Some(group) = self.group(&query.resource_group) else {
            return Ok(false);
        };

        let found = match query.parent {
            Some(ref parent) => group.resources.iter().any(|r| {
                r.is_type(&query.namespace, &parent.resource_type)
                    && r.name.eq_ignore_ascii_case(&parent.name)
                    && r.subnets.iter().any(|s| s.eq_ignore_ascii_case(&query.name))
            }),
            None => group.resources.iter().any(|r| {
                r.is_type(&query.namespace, &query.resource_type)
                    && r.name.eq_ignore_ascii_case(&query.name)
            }),
        };
        Ok(found)
    }

    fn list_by_resource_group(
        &self,
        resource_group: &str,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceSummary>, TransportError> {
        self.tick();
        let group = self.group(resource_group).ok_or_else(|| {
            TransportError::new(format!("Resource group '{}' could not be found.", resource_group))
        })?;

        Ok(group
            .resources
            .iter()
            .filter(|r| r.is_type(kind.namespace(), kind.resource_type()))
            .map(|r| ResourceSummary {
                name: r.name.clone(),
                location: r.location.clone(),
                sku_tier: r.sku_tier.clone(),
                subnets: r.subnets.clone(),
            })
            .collect())
    }

    fn get_resource_group(&self, name: &str) -> Result<ResourceGroupInfo, TransportError> {
        self.tick();
        let group = self.group(name).ok_or_else(|| {
            TransportError::new(format!("Resource group '{}' could not be found.", name))
        })?;
        Ok(ResourceGroupInfo {
            name: name.to_string(),
            location: group.location.clone(),
        })
    }
}
