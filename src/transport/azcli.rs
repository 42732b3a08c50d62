//! VR-013: `az` CLI backend.
//!
//! Shells out to the Azure CLI (already authenticated by the user) and
//! parses its JSON output. No retries, no timeouts of our own.

use super::local::{exec_program, ExecOutput};
use super::{
    ExistenceQuery, ResourceGroupInfo, ResourceKind, ResourceQuery, ResourceSummary,
    TransportError,
};
use serde::Deserialize;
use tracing::debug;

/// Markers in `az` stderr that mean "does not exist" rather than failure.
const NOT_FOUND_MARKERS: &[&str] = &[
    "ResourceNotFound",
    "ResourceGroupNotFound",
    "ParentResourceNotFound",
    "NotFound",
    "could not be found",
    "was not found",
];

/// `ResourceQuery` backed by the `az` binary.
#[derive(Debug, Clone)]
pub struct AzCliQuery {
    program: String,
    subscription: Option<String>,
}

impl Default for AzCliQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl AzCliQuery {
    pub fn new() -> Self {
        Self {
            program: "az".to_string(),
            subscription: None,
        }
    }

    /// Pin every call to a subscription.
    pub fn with_subscription(mut self, subscription: &str) -> Self {
        self.subscription = Some(subscription.to_string());
        self
    }

    /// Use a different `az` executable.
    pub fn with_program(mut self, program: &str) -> Self {
        self.program = program.to_string();
        self
    }

    /// Subscription id of the logged-in account.
    pub fn current_subscription(&self) -> Result<String, TransportError> {
        let out = self.run(&["account", "show", "--query", "id", "-o", "tsv"])?;
        if !out.success() {
            return Err(az_failure(&out));
        }
        Ok(out.stdout.trim().to_string())
    }

    fn run(&self, args: &[&str]) -> Result<ExecOutput, TransportError> {
        let mut full: Vec<&str> = args.to_vec();
        if let Some(ref sub) = self.subscription {
            full.push("--subscription");
            full.push(sub.as_str());
        }
        debug!(program = %self.program, args = ?full, "az call");
        exec_program(&self.program, &full).map_err(TransportError::new)
    }
}

impl ResourceQuery for AzCliQuery {
    fn exists(&self, query: &ExistenceQuery) -> Result<bool, TransportError> {
        let parent = query
            .parent
            .as_ref()
            .map(|p| format!("{}/{}", p.resource_type, p.name));
        let mut args = vec![
            "resource",
            "show",
            "-g",
            query.resource_group.as_str(),
            "-n",
            query.name.as_str(),
            "--namespace",
            query.namespace.as_str(),
            "--resource-type",
            query.resource_type.as_str(),
        ];
        if let Some(ref p) = parent {
            args.push("--parent");
            args.push(p.as_str());
        }
        args.extend(["-o", "none"]);

        let out = self.run(&args)?;
        classify_show(&out)
    }

    fn list_by_resource_group(
        &self,
        resource_group: &str,
        kind: ResourceKind,
    ) -> Result<Vec<ResourceSummary>, TransportError> {
        let full_type = kind.full_type();
        let args: Vec<&str> = match kind {
            ResourceKind::VirtualNetwork => {
                vec!["network", "vnet", "list", "-g", resource_group, "-o", "json"]
            }
            ResourceKind::StorageAccount => {
                vec!["storage", "account", "list", "-g", resource_group, "-o", "json"]
            }
            _ => vec![
                "resource",
                "list",
                "-g",
                resource_group,
                "--resource-type",
                full_type.as_str(),
                "-o",
                "json",
            ],
        };
        let out = self.run(&args)?;
        if !out.success() {
            return Err(az_failure(&out));
        }
        parse_summaries(&out.stdout)
    }

    fn get_resource_group(&self, name: &str) -> Result<ResourceGroupInfo, TransportError> {
        let out = self.run(&["group", "show", "-n", name, "-o", "json"])?;
        if !out.success() {
            return Err(az_failure(&out));
        }
        parse_group(&out.stdout)
    }
}

fn az_failure(out: &ExecOutput) -> TransportError {
    let msg = out.stderr.trim();
    if msg.is_empty() {
        TransportError::new(format!("az exited with code {}", out.exit_code))
    } else {
        TransportError::new(msg)
    }
}

/// Map `az resource show` output to existence.
fn classify_show(out: &ExecOutput) -> Result<bool, TransportError> {
    if out.success() {
        return Ok(true);
    }
    if NOT_FOUND_MARKERS.iter().any(|m| out.stderr.contains(m)) {
        return Ok(false);
    }
    Err(az_failure(out))
}

#[derive(Deserialize)]
struct AzResource {
    name: String,
    #[serde(default)]
    location: String,
    #[serde(default)]
    sku: Option<AzSku>,
    #[serde(default)]
    subnets: Option<Vec<AzSubnet>>,
}

#[derive(Deserialize)]
struct AzSku {
    #[serde(default)]
    tier: Option<String>,
}

#[derive(Deserialize)]
struct AzSubnet {
    name: String,
}

#[derive(Deserialize)]
struct AzGroup {
    name: String,
    location: String,
}

fn parse_summaries(json: &str) -> Result<Vec<ResourceSummary>, TransportError> {
    let rows: Vec<AzResource> = serde_json::from_str(json)
        .map_err(|e| TransportError::new(format!("unexpected az output: {}", e)))?;
    Ok(rows
        .into_iter()
        .map(|r| ResourceSummary {
            name: r.name,
            location: r.location,
            sku_tier: r.sku.and_then(|s| s.tier),
            subnets: r
                .subnets
                .unwrap_or_default()
                .into_iter()
                .map(|s| s.name)
                .collect(),
        })
        .collect())
}

fn parse_group(json: &str) -> Result<ResourceGroupInfo, TransportError> {
    let g: AzGroup = serde_json::from_str(json)
        .map_err(|e| TransportError::new(format!("unexpected az output: {}", e)))?;
    Ok(ResourceGroupInfo {
        name: g.name,
        location: g.location,
    })
}
