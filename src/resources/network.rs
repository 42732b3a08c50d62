//! VR-033: Virtual network / subnet resolver.
//!
//! Order: auto-discovery (nothing network-related supplied), then an
//! explicit subnet, then fall back to a new vnet/subnet.

use super::non_empty;
use crate::core::error::{FormatError, ResolveError};
use crate::core::pipeline::ResolveContext;
use crate::core::reference::{parse_reference, ParsedReference};
use crate::core::types::{Namespace, Presence};
use crate::transport::{ResourceKind, ResourceSummary};
use tracing::debug;

/// Reserved subnet name that can never host VMs.
pub const GATEWAY_SUBNET: &str = "GatewaySubnet";

const SUBNET_USAGE: &str =
    "incorrect '--subnet' usage: --subnet SUBNET_ID | --subnet SUBNET_NAME --vnet-name VNET_NAME";

/// First subnet of the first vnet in `location` that is not the gateway subnet.
pub fn pick_subnet<'a>(
    vnets: &'a [ResourceSummary],
    location: &str,
) -> Option<(&'a str, &'a str)> {
    vnets
        .iter()
        .filter(|v| v.location == location && !v.subnets.is_empty())
        .find_map(|v| {
            v.subnets
                .iter()
                .find(|s| !s.eq_ignore_ascii_case(GATEWAY_SUBNET))
                .map(|s| (v.name.as_str(), s.as_str()))
        })
}

pub fn resolve_network(
    mut ns: Namespace,
    ctx: &ResolveContext<'_>,
) -> Result<Namespace, ResolveError> {
    let vnet = non_empty(&ns.vnet_name).map(str::to_string);
    let subnet = non_empty(&ns.subnet).map(str::to_string);

    if vnet.is_none() && subnet.is_none() && ns.nic_args.is_empty() {
        let vnets = ctx
            .query
            .list_by_resource_group(&ns.resource_group, ResourceKind::VirtualNetwork)?;
        let location = ns.location.as_deref().unwrap_or_default();
        if let Some((vnet_name, subnet_name)) = pick_subnet(&vnets, location) {
            debug!(vnet = vnet_name, subnet = subnet_name, "discovered subnet");
            ns.vnet_name = Some(vnet_name.to_string());
            ns.subnet = Some(subnet_name.to_string());
            ns.vnet_type = Some(Presence::Existing);
            return Ok(ns);
        }
    }

    if let Some(subnet) = subnet {
        let parsed = parse_reference(&subnet)?;
        let is_ref = matches!(parsed, ParsedReference::Full(_));
        if is_ref == vnet.is_some() {
            return Err(ResolveError::usage(SUBNET_USAGE));
        }

        let (rg, vnet_name, subnet_name) = match parsed {
            ParsedReference::Full(r) => {
                let child = r.child.as_ref().ok_or_else(|| {
                    FormatError::new(&subnet, "subnet reference has no child segment")
                })?;
                (r.resource_group.clone(), r.name.clone(), child.name.clone())
            }
            ParsedReference::Bare(name) => {
                (ns.resource_group.clone(), vnet.clone().unwrap_or_default(), name)
            }
        };

        let query = ResourceKind::Subnet
            .existence(&subnet_name, &rg)
            .under(&vnet_name, ResourceKind::VirtualNetwork.resource_type());
        let exists = ctx.query.exists(&query)?;
        if is_ref && !exists {
            return Err(ResolveError::not_found(format!(
                "Subnet '{}' does not exist.",
                subnet
            )));
        }
        if exists {
            ns.vnet_type = Some(Presence::Existing);
            return Ok(ns);
        }
    }

    ns.vnet_type = Some(Presence::New);
    Ok(ns)
}
