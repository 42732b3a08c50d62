//! VR-032: Storage account and availability set resolvers.

use super::non_empty;
use crate::core::error::ResolveError;
use crate::core::pipeline::ResolveContext;
use crate::core::reference::{build_reference, parse_reference};
use crate::core::types::{Namespace, Presence};
use crate::transport::ResourceKind;

/// "Premium" when the SKU name mentions it, else "Standard".
pub fn required_sku_tier(storage_sku: &str) -> &'static str {
    if storage_sku.contains("Premium") {
        "Premium"
    } else {
        "Standard"
    }
}

/// Pick or validate the storage account.
///
/// An explicit account is only checked for existence. Without one, the
/// first account in the resource group matching both the deployment
/// location and the SKU tier is reused; otherwise a new one is requested.
pub fn resolve_storage_account(
    mut ns: Namespace,
    ctx: &ResolveContext<'_>,
) -> Result<Namespace, ResolveError> {
    if let Some(account) = non_empty(&ns.storage_account) {
        let parsed = parse_reference(account)?;
        let rg = parsed.resource_group_or(&ns.resource_group);
        let exists = ctx
            .query
            .exists(&ResourceKind::StorageAccount.existence(parsed.name(), rg))?;
        ns.storage_account_type = Some(Presence::from(exists));
        return Ok(ns);
    }

    let tier = required_sku_tier(ns.storage_sku.as_deref().unwrap_or_default());
    let location = ns.location.as_deref().unwrap_or_default();
    let candidate = ctx
        .query
        .list_by_resource_group(&ns.resource_group, ResourceKind::StorageAccount)?
        .into_iter()
        .find(|a| a.sku_tier.as_deref() == Some(tier) && a.location == location);

    match candidate {
        Some(account) => {
            ns.storage_account = Some(account.name);
            ns.storage_account_type = Some(Presence::Existing);
        }
        None => ns.storage_account_type = Some(Presence::New),
    }
    Ok(ns)
}

/// Require a supplied availability set to exist and store its full reference.
pub fn resolve_availability_set(
    mut ns: Namespace,
    ctx: &ResolveContext<'_>,
) -> Result<Namespace, ResolveError> {
    let Some(raw) = non_empty(&ns.availability_set) else {
        return Ok(ns);
    };
    let parsed = parse_reference(raw)?;
    let name = parsed.name().to_string();
    let rg = parsed.resource_group_or(&ns.resource_group).to_string();

    let kind = ResourceKind::AvailabilitySet;
    if !ctx.query.exists(&kind.existence(&name, &rg))? {
        return Err(ResolveError::not_found(format!(
            "Availability set '{}' does not exist.",
            name
        )));
    }

    ns.availability_set = Some(build_reference(
        &ctx.subscription,
        &rg,
        kind.namespace(),
        kind.resource_type(),
        &name,
    ));
    Ok(ns)
}
