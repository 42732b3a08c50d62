//! vmresolve: parameter resolution for VM and scale-set provisioning.
//!
//! Takes a partial create request, checks it against live (or snapshotted)
//! infrastructure, and decides for each dependent resource whether it is
//! reused or has to be created. Nothing is provisioned here.

pub mod cli;
pub mod core;
pub mod credentials;
pub mod resources;
pub mod transport;
