//! VR-034: Optional peripherals: NSG, public IP, load balancer.
//!
//! | argument      | classification        |
//! |---------------|-----------------------|
//! | unset         | new                   |
//! | `""`          | none (omitted)        |
//! | name or id    | existing / new        |

use crate::core::error::ResolveError;
use crate::core::pipeline::ResolveContext;
use crate::core::reference::parse_reference;
use crate::core::types::{Namespace, PeripheralArg, PeripheralType, Presence};
use crate::transport::{ResourceKind, ResourceQuery};

/// Classify one peripheral argument. Only `Named` touches the service.
pub fn classify_peripheral(
    arg: &PeripheralArg,
    resource_group: &str,
    kind: ResourceKind,
    query: &dyn ResourceQuery,
) -> Result<PeripheralType, ResolveError> {
    match arg {
        PeripheralArg::Unset => Ok(PeripheralType::New),
        PeripheralArg::Omit => Ok(PeripheralType::Omitted),
        PeripheralArg::Named(raw) => {
            let parsed = parse_reference(raw)?;
            let rg = parsed.resource_group_or(resource_group);
            let exists = query.exists(&kind.existence(parsed.name(), rg))?;
            Ok(Presence::from(exists).into())
        }
    }
}

pub fn resolve_nsg(mut ns: Namespace, ctx: &ResolveContext<'_>) -> Result<Namespace, ResolveError> {
    ns.nsg_type = Some(classify_peripheral(
        &ns.nsg,
        &ns.resource_group,
        ResourceKind::NetworkSecurityGroup,
        ctx.query,
    )?);
    Ok(ns)
}

pub fn resolve_public_ip(
    mut ns: Namespace,
    ctx: &ResolveContext<'_>,
) -> Result<Namespace, ResolveError> {
    ns.public_ip_type = Some(classify_peripheral(
        &ns.public_ip_address,
        &ns.resource_group,
        ResourceKind::PublicIpAddress,
        ctx.query,
    )?);
    Ok(ns)
}

pub fn resolve_load_balancer(
    mut ns: Namespace,
    ctx: &ResolveContext<'_>,
) -> Result<Namespace, ResolveError> {
    ns.load_balancer_type = Some(classify_peripheral(
        &ns.load_balancer,
        &ns.resource_group,
        ResourceKind::LoadBalancer,
        ctx.query,
    )?);
    Ok(ns)
}
