//! VR-036: Authentication resolver.
//!
//! Picks password vs SSH, rejects mixed schemes, and fills in the secret
//! for the chosen one: a prompted password, or SSH public key material.

use super::non_empty;
use crate::core::error::ResolveError;
use crate::core::pipeline::ResolveContext;
use crate::core::types::{AuthenticationType, Namespace, OsType};
use crate::credentials::{KeyRequest, PromptError};

const PASSWORD_USAGE: &str = "incorrect usage for authentication-type 'password': \
     [--admin-username USERNAME] --admin-password PASSWORD";

/// Where the public key lands on the VM for `admin_username`.
pub fn default_ssh_dest_key_path(admin_username: &str) -> String {
    format!("/home/{}/.ssh/authorized_keys", admin_username)
}

pub fn resolve_auth(mut ns: Namespace, ctx: &ResolveContext<'_>) -> Result<Namespace, ResolveError> {
    let os_type = ns.os_type.ok_or_else(|| {
        ResolveError::usage("Unable to resolve OS type. Specify '--os-type' argument.")
    })?;

    let auth = ns.authentication_type.unwrap_or(match os_type {
        OsType::Windows => AuthenticationType::Password,
        OsType::Linux => AuthenticationType::Ssh,
    });
    ns.authentication_type = Some(auth);

    match (os_type, auth) {
        (OsType::Windows, AuthenticationType::Ssh) => {
            Err(ResolveError::Unsupported("SSH not supported for Windows VMs.".to_string()))
        }
        (_, AuthenticationType::Password) => resolve_password(ns, ctx),
        (_, AuthenticationType::Ssh) => resolve_ssh(ns, ctx),
    }
}

fn resolve_password(mut ns: Namespace, ctx: &ResolveContext<'_>) -> Result<Namespace, ResolveError> {
    if non_empty(&ns.ssh_key_value).is_some() || non_empty(&ns.ssh_dest_key_path).is_some() {
        return Err(ResolveError::usage(PASSWORD_USAGE));
    }
    if non_empty(&ns.admin_password).is_none() {
        let password = ctx
            .prompter
            .prompt_password("Admin Password: ", true)
            .map_err(|e| match e {
                PromptError::NoInteractivity => ResolveError::usage(
                    "Please specify both username and password in non-interactive mode.",
                ),
                other => other.into(),
            })?;
        ns.admin_password = Some(password);
    }
    Ok(ns)
}

fn resolve_ssh(mut ns: Namespace, ctx: &ResolveContext<'_>) -> Result<Namespace, ResolveError> {
    if non_empty(&ns.admin_password).is_some() {
        return Err(ResolveError::usage(
            "Admin password cannot be used with SSH authentication type",
        ));
    }

    let request = KeyRequest {
        value: non_empty(&ns.ssh_key_value).map(str::to_string),
        generate: ns.generate_ssh_keys,
    };
    ns.ssh_key_value = Some(ctx.keys.public_key(&request)?);

    if non_empty(&ns.ssh_dest_key_path).is_none() {
        ns.ssh_dest_key_path = Some(default_ssh_dest_key_path(&ns.admin_username));
    }
    Ok(ns)
}
