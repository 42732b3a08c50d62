//! VR-005: Pipeline orchestrator with fixed-order resolver composition.
//!
//! Each step is `fn(Namespace, &ResolveContext) -> Result<Namespace, _>`.
//! Steps run strictly in order; the first error aborts the rest.
//!
//! VM:   location → image → storage account → availability set → network
//!       → nsg → public ip → nics → auth
//! VMSS: location → image → load balancer → network → public ip → auth

use super::catalog::ImageCatalog;
use super::error::ResolveError;
use super::types::{Namespace, VmCreateRequest, VmssCreateRequest};
use crate::credentials::{KeyMaterialSource, Prompter};
use crate::resources::{auth, image, location, network, nic, peripheral, storage};
use crate::transport::ResourceQuery;
use tracing::debug;

/// Collaborators shared by every resolver for one invocation.
pub struct ResolveContext<'a> {
    /// Subscription used to qualify bare names.
    pub subscription: String,
    pub query: &'a dyn ResourceQuery,
    pub catalog: &'a ImageCatalog,
    pub keys: &'a dyn KeyMaterialSource,
    pub prompter: &'a dyn Prompter,
}

/// One resolver.
pub type Step = fn(Namespace, &ResolveContext<'_>) -> Result<Namespace, ResolveError>;

/// VM resolution order.
pub const VM_STEPS: &[(&str, Step)] = &[
    ("location", location::resolve_location),
    ("image", image::resolve_image),
    ("storage_account", storage::resolve_storage_account),
    ("availability_set", storage::resolve_availability_set),
    ("network", network::resolve_network),
    ("nsg", peripheral::resolve_nsg),
    ("public_ip", peripheral::resolve_public_ip),
    ("nics", nic::resolve_nics),
    ("auth", auth::resolve_auth),
];

/// Scale-set resolution order.
pub const VMSS_STEPS: &[(&str, Step)] = &[
    ("location", location::resolve_location),
    ("image", image::resolve_image),
    ("load_balancer", peripheral::resolve_load_balancer),
    ("network", network::resolve_network),
    ("public_ip", peripheral::resolve_public_ip),
    ("auth", auth::resolve_auth),
];

/// Thread `ns` through `steps`, stopping at the first error.
pub fn run_steps(
    ns: Namespace,
    steps: &[(&str, Step)],
    ctx: &ResolveContext<'_>,
) -> Result<Namespace, ResolveError> {
    steps.iter().try_fold(ns, |ns, (name, step)| {
        debug!(step = name, resource_group = %ns.resource_group, "resolving");
        step(ns, ctx)
    })
}

/// Resolve a `vm create` request.
pub fn process_vm_create(
    req: VmCreateRequest,
    ctx: &ResolveContext<'_>,
) -> Result<Namespace, ResolveError> {
    run_steps(Namespace::from(req), VM_STEPS, ctx)
}

/// Resolve a `vmss create` request.
pub fn process_vmss_create(
    req: VmssCreateRequest,
    ctx: &ResolveContext<'_>,
) -> Result<Namespace, ResolveError> {
    run_steps(Namespace::from(req), VMSS_STEPS, ctx)
}
