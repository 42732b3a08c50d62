//! VR-035: NIC resolver.

use crate::core::error::ResolveError;
use crate::core::pipeline::ResolveContext;
use crate::core::reference::{build_reference, is_fully_qualified};
use crate::core::types::{Namespace, NicEntry, PeripheralType, Presence};
use crate::transport::ResourceKind;

/// Qualify bare NIC names under `resource_group`. Only the first entry is primary.
pub fn normalize_nics(refs: &[String], resource_group: &str, subscription: &str) -> Vec<NicEntry> {
    let kind = ResourceKind::NetworkInterface;
    refs.iter()
        .enumerate()
        .map(|(i, r)| NicEntry {
            id: if is_fully_qualified(r) {
                r.clone()
            } else {
                build_reference(
                    subscription,
                    resource_group,
                    kind.namespace(),
                    kind.resource_type(),
                    r,
                )
            },
            primary: i == 0,
        })
        .collect()
}

/// Explicit NICs are attached as-is and suppress the default public IP.
pub fn resolve_nics(mut ns: Namespace, ctx: &ResolveContext<'_>) -> Result<Namespace, ResolveError> {
    let refs = ns.nic_args.to_vec();
    if refs.is_empty() {
        ns.nic_type = Some(Presence::New);
        return Ok(ns);
    }

    ns.nics = normalize_nics(&refs, &ns.resource_group, &ctx.subscription);
    ns.nic_type = Some(Presence::Existing);
    ns.public_ip_type = Some(PeripheralType::Omitted);
    Ok(ns)
}
