//! VR-030: Location resolver. Defaults the region from the resource group.

use super::non_empty;
use crate::core::error::ResolveError;
use crate::core::pipeline::ResolveContext;
use crate::core::types::Namespace;

/// Fill in `location` from the resource group when unset. No-op otherwise.
pub fn resolve_location(
    mut ns: Namespace,
    ctx: &ResolveContext<'_>,
) -> Result<Namespace, ResolveError> {
    if non_empty(&ns.location).is_none() {
        let group = ctx.query.get_resource_group(&ns.resource_group)?;
        ns.location = Some(group.location);
    }
    Ok(ns)
}
