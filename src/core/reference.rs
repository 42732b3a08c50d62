//! VR-001: Resource references: canonical id construction and parsing.
//!
//! Grammar:
//!
//! ```text
//! /subscriptions/{sub}/resourceGroups/{rg}/providers/{namespace}/{type}/{name}[/{child_type}/{child_name}]
//! ```
//!
//! A string is fully qualified iff it contains a path separator. Anything
//! else is a bare name that needs an ambient resource group.

use super::error::FormatError;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between reference segments.
pub const PATH_SEPARATOR: char = '/';

/// True if `s` is a fully-qualified reference rather than a bare name.
pub fn is_fully_qualified(s: &str) -> bool {
    s.contains(PATH_SEPARATOR)
}

/// Nested resource segment, e.g. a subnet under a virtual network.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ChildSegment {
    pub resource_type: String,
    pub name: String,
}

/// Structured resource identifier.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ResourceReference {
    pub subscription: String,
    pub resource_group: String,
    pub namespace: String,
    pub resource_type: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child: Option<ChildSegment>,
}

impl ResourceReference {
    pub fn new(
        subscription: &str,
        resource_group: &str,
        namespace: &str,
        resource_type: &str,
        name: &str,
    ) -> Self {
        Self {
            subscription: subscription.to_string(),
            resource_group: resource_group.to_string(),
            namespace: namespace.to_string(),
            resource_type: resource_type.to_string(),
            name: name.to_string(),
            child: None,
        }
    }

    /// Attach a nested segment (`virtualNetworks/v` + `subnets/s`).
    pub fn with_child(mut self, resource_type: &str, name: &str) -> Self {
        self.child = Some(ChildSegment {
            resource_type: resource_type.to_string(),
            name: name.to_string(),
        });
        self
    }

    /// Name of the innermost resource (the child if present).
    pub fn leaf_name(&self) -> &str {
        self.child.as_ref().map_or(self.name.as_str(), |c| c.name.as_str())
    }
}

impl fmt::Display for ResourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "/subscriptions/{}/resourceGroups/{}/providers/{}/{}/{}",
            self.subscription, self.resource_group, self.namespace, self.resource_type, self.name
        )?;
        if let Some(ref child) = self.child {
            write!(f, "/{}/{}", child.resource_type, child.name)?;
        }
        Ok(())
    }
}

// ARM identifiers compare case-insensitively in every segment.
impl PartialEq for ResourceReference {
    fn eq(&self, other: &Self) -> bool {
        let child_eq = match (&self.child, &other.child) {
            (None, None) => true,
            (Some(a), Some(b)) => {
                a.resource_type.eq_ignore_ascii_case(&b.resource_type)
                    && a.name.eq_ignore_ascii_case(&b.name)
            }
            _ => false,
        };
        child_eq
            && self.subscription.eq_ignore_ascii_case(&other.subscription)
            && self.resource_group.eq_ignore_ascii_case(&other.resource_group)
            && self.namespace.eq_ignore_ascii_case(&other.namespace)
            && self.resource_type.eq_ignore_ascii_case(&other.resource_type)
            && self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl Eq for ResourceReference {}

/// Result of parsing user input that may be either form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedReference {
    Bare(String),
    Full(ResourceReference),
}

impl ParsedReference {
    /// Innermost resource name.
    pub fn name(&self) -> &str {
        match self {
            Self::Bare(name) => name,
            Self::Full(r) => r.leaf_name(),
        }
    }

    /// Resource group carried by the reference, if any.
    pub fn resource_group(&self) -> Option<&str> {
        match self {
            Self::Bare(_) => None,
            Self::Full(r) => Some(&r.resource_group),
        }
    }

    /// Resource group carried by the reference, else `ambient`.
    pub fn resource_group_or<'a>(&'a self, ambient: &'a str) -> &'a str {
        self.resource_group().unwrap_or(ambient)
    }
}

/// Build a canonical reference string.
pub fn build_reference(
    subscription: &str,
    resource_group: &str,
    namespace: &str,
    resource_type: &str,
    name: &str,
) -> String {
    ResourceReference::new(subscription, resource_group, namespace, resource_type, name).to_string()
}

/// Parse a bare name or a fully-qualified reference.
pub fn parse_reference(s: &str) -> Result<ParsedReference, FormatError> {
    if s.is_empty() {
        return Err(FormatError::new(s, "empty reference"));
    }
    if !is_fully_qualified(s) {
        return Ok(ParsedReference::Bare(s.to_string()));
    }
    parse_full(s).map(ParsedReference::Full)
}

fn parse_full(s: &str) -> Result<ResourceReference, FormatError> {
    let trimmed = s.strip_prefix(PATH_SEPARATOR).unwrap_or(s);
    let trimmed = trimmed.strip_suffix(PATH_SEPARATOR).unwrap_or(trimmed);
    let segments: Vec<&str> = trimmed.split(PATH_SEPARATOR).collect();

    if segments.iter().any(|seg| seg.is_empty()) {
        return Err(FormatError::new(s, "empty path segment"));
    }
    if segments.len() != 8 && segments.len() != 10 {
        return Err(FormatError::new(
            s,
            format!("expected 8 or 10 path segments, got {}", segments.len()),
        ));
    }

    expect_keyword(s, segments[0], "subscriptions")?;
    expect_keyword(s, segments[2], "resourceGroups")?;
    expect_keyword(s, segments[4], "providers")?;

    let mut reference = ResourceReference::new(
        segments[1],
        segments[3],
        segments[5],
        segments[6],
        segments[7],
    );
    if segments.len() == 10 {
        reference = reference.with_child(segments[8], segments[9]);
    }
    Ok(reference)
}

fn expect_keyword(s: &str, got: &str, want: &str) -> Result<(), FormatError> {
    if got.eq_ignore_ascii_case(want) {
        Ok(())
    } else {
        Err(FormatError::new(
            s,
            format!("expected '{}' segment, got '{}'", want, got),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NIC_ID: &str =
        "/subscriptions/sub-1/resourceGroups/rg1/providers/Microsoft.Network/networkInterfaces/nic1";

    #[test]
    fn test_vr001_fully_qualified_detection() {
        assert!(is_fully_qualified(NIC_ID));
        assert!(is_fully_qualified("a/b"));
        assert!(!is_fully_qualified("nic1"));
    }

    #[test]
    fn test_vr001_build_canonical() {
        let id = build_reference("sub-1", "rg1", "Microsoft.Network", "networkInterfaces", "nic1");
        assert_eq!(id, NIC_ID);
    }

    #[test]
    fn test_vr001_parse_full() {
        let parsed = parse_reference(NIC_ID).unwrap();
        assert_eq!(parsed.name(), "nic1");
        assert_eq!(parsed.resource_group(), Some("rg1"));
        match parsed {
            ParsedReference::Full(r) => {
                assert_eq!(r.subscription, "sub-1");
                assert_eq!(r.namespace, "Microsoft.Network");
                assert_eq!(r.resource_type, "networkInterfaces");
                assert!(r.child.is_none());
                assert_eq!(r.to_string(), NIC_ID);
            }
            ParsedReference::Bare(_) => panic!("expected full reference"),
        }
    }

    #[test]
    fn test_vr001_parse_bare() {
        let parsed = parse_reference("mystorage").unwrap();
        assert_eq!(parsed, ParsedReference::Bare("mystorage".to_string()));
        assert_eq!(parsed.resource_group_or("ambient"), "ambient");
    }

    #[test]
    fn test_vr001_parse_subnet_child() {
        let id = "/subscriptions/s/resourceGroups/net-rg/providers/Microsoft.Network/virtualNetworks/vnet1/subnets/default";
        let parsed = parse_reference(id).unwrap();
        assert_eq!(parsed.name(), "default");
        assert_eq!(parsed.resource_group_or("other"), "net-rg");
        if let ParsedReference::Full(r) = parsed {
            assert_eq!(r.name, "vnet1");
            assert_eq!(r.child.as_ref().unwrap().resource_type, "subnets");
            assert_eq!(r.to_string(), id);
        } else {
            panic!("expected full reference");
        }
    }

    #[test]
    fn test_vr001_parse_keywords_case_insensitive() {
        let id = "/SUBSCRIPTIONS/s/resourcegroups/rg/PROVIDERS/Microsoft.Storage/storageAccounts/sa";
        assert_eq!(parse_reference(id).unwrap().name(), "sa");
    }

    #[test]
    fn test_vr001_parse_malformed() {
        assert!(parse_reference("").is_err());
        assert!(parse_reference("/subscriptions/s/resourceGroups/rg").is_err());
        assert!(parse_reference("a/b").is_err());
        assert!(parse_reference("/subscriptions//resourceGroups/rg/providers/n/t/x").is_err());
        let err = parse_reference("/tenants/s/resourceGroups/rg/providers/n/t/x").unwrap_err();
        assert!(err.reason.contains("subscriptions"));
    }

    #[test]
    fn test_vr001_equality_case_insensitive() {
        let a = ResourceReference::new("SUB", "RG1", "microsoft.network", "NetworkInterfaces", "Nic1");
        let b = ResourceReference::new("sub", "rg1", "Microsoft.Network", "networkInterfaces", "nic1");
        assert_eq!(a, b);
        let c = b.clone().with_child("subnets", "x");
        assert_ne!(b, c);
        let d = ResourceReference::new("sub", "rg2", "Microsoft.Network", "networkInterfaces", "nic1");
        assert_ne!(b, d);
    }
}
