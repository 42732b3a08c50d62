//! VR-007: Image alias catalog.
//!
//! Maps short names (`UbuntuLTS`) to marketplace URN components. Loaded
//! from a YAML/JSON list, or the built-in table when none is supplied.

use super::types::ImageUrn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One alias catalog record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ImageAlias {
    #[serde(rename = "urnAlias")]
    pub urn_alias: String,
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
}

impl ImageAlias {
    pub fn urn(&self) -> ImageUrn {
        ImageUrn {
            publisher: self.publisher.clone(),
            offer: self.offer.clone(),
            sku: self.sku.clone(),
            version: self.version.clone(),
        }
    }
}

/// Ordered alias table.
#[derive(Debug, Clone, Default)]
pub struct ImageCatalog {
    aliases: Vec<ImageAlias>,
}

const BUILTIN: &[(&str, &str, &str, &str)] = &[
    ("CentOS", "OpenLogic", "CentOS", "7.2"),
    ("CoreOS", "CoreOS", "CoreOS", "Stable"),
    ("Debian", "credativ", "Debian", "8"),
    ("openSUSE", "SUSE", "openSUSE", "13.2"),
    ("RHEL", "RedHat", "RHEL", "7.2"),
    ("SLES", "SUSE", "SLES", "12-SP1"),
    ("UbuntuLTS", "Canonical", "UbuntuServer", "16.04-LTS"),
    ("Win2012R2Datacenter", "MicrosoftWindowsServer", "WindowsServer", "2012-R2-Datacenter"),
    ("Win2012Datacenter", "MicrosoftWindowsServer", "WindowsServer", "2012-Datacenter"),
    ("Win2008R2SP1", "MicrosoftWindowsServer", "WindowsServer", "2008-R2-SP1"),
];

impl ImageCatalog {
    pub fn new(aliases: Vec<ImageAlias>) -> Self {
        Self { aliases }
    }

    /// The catalog shipped with the binary.
    pub fn builtin() -> Self {
        Self::new(
            BUILTIN
                .iter()
                .map(|(alias, publisher, offer, sku)| ImageAlias {
                    urn_alias: alias.to_string(),
                    publisher: publisher.to_string(),
                    offer: offer.to_string(),
                    sku: sku.to_string(),
                    version: "latest".to_string(),
                })
                .collect(),
        )
    }

    /// Parse a catalog from YAML or JSON text.
    pub fn parse(text: &str) -> Result<Self, String> {
        let aliases: Vec<ImageAlias> =
            serde_yaml_ng::from_str(text).map_err(|e| format!("alias catalog parse error: {}", e))?;
        Ok(Self::new(aliases))
    }

    /// Load a catalog file from disk.
    pub fn load(path: &Path) -> Result<Self, String> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
        Self::parse(&content)
    }

    /// Case-insensitive alias lookup. First match wins.
    pub fn find(&self, alias: &str) -> Option<&ImageAlias> {
        let wanted = alias.to_lowercase();
        self.aliases
            .iter()
            .find(|a| a.urn_alias.to_lowercase() == wanted)
    }

    /// Alias names in catalog order.
    pub fn alias_names(&self) -> Vec<String> {
        self.aliases.iter().map(|a| a.urn_alias.clone()).collect()
    }

    pub fn aliases(&self) -> &[ImageAlias] {
        &self.aliases
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}
