//! VR-004: Request file parsing and validation.
//!
//! Parses `vm`/`vmss` request YAML and validates structural constraints:
//! - resource_group and image must be non-empty
//! - keys must belong to the request's flow (no `nsg` on a scale set)
//! - NIC lists must not contain empty entries
//! - fully-qualified references must follow the identifier grammar

use super::reference::{is_fully_qualified, parse_reference};
use super::types::*;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

const COMMON_FIELDS: &[&str] = &[
    "resource_group",
    "image",
    "location",
    "os_type",
    "vnet_name",
    "subnet",
    "public_ip_address",
    "authentication_type",
    "admin_username",
    "admin_password",
    "ssh_key_value",
    "ssh_dest_key_path",
    "generate_ssh_keys",
];

const VM_FIELDS: &[&str] = &["storage_account", "storage_sku", "availability_set", "nsg", "nics"];

const VMSS_FIELDS: &[&str] = &["load_balancer"];

/// Keys accepted in a request file for `flow`.
pub fn known_fields(flow: Flow) -> impl Iterator<Item = &'static str> {
    let extra = match flow {
        Flow::Vm => VM_FIELDS,
        Flow::Vmss => VMSS_FIELDS,
    };
    COMMON_FIELDS.iter().chain(extra.iter()).copied()
}

fn read(path: &Path) -> Result<String, String> {
    std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))
}

/// Parse a `vm create` request from a string.
pub fn parse_vm_request(yaml: &str) -> Result<VmCreateRequest, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Parse a `vmss create` request from a string.
pub fn parse_vmss_request(yaml: &str) -> Result<VmssCreateRequest, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

pub fn parse_vm_request_file(path: &Path) -> Result<VmCreateRequest, String> {
    parse_vm_request(&read(path)?)
}

pub fn parse_vmss_request_file(path: &Path) -> Result<VmssCreateRequest, String> {
    parse_vmss_request(&read(path)?)
}

/// Keys in `yaml` that `flow` does not accept.
pub fn unknown_fields(yaml: &str, flow: Flow) -> Result<Vec<String>, String> {
    let value: serde_yaml_ng::Value =
        serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))?;
    let Some(map) = value.as_mapping() else {
        return Err("request must be a YAML mapping".to_string());
    };
    let known: Vec<&str> = known_fields(flow).collect();
    Ok(map
        .keys()
        .filter_map(|k| k.as_str())
        .filter(|k| !known.contains(k))
        .map(str::to_string)
        .collect())
}

fn validate_common(c: &CommonArgs, errors: &mut Vec<ValidationError>) {
    if c.resource_group.is_empty() {
        errors.push(ValidationError {
            message: "resource_group must not be empty".to_string(),
        });
    }
    if c.image.is_empty() {
        errors.push(ValidationError {
            message: "image must not be empty".to_string(),
        });
    }
    if c.admin_username.is_empty() {
        errors.push(ValidationError {
            message: "admin_username must not be empty".to_string(),
        });
    }
    check_reference("subnet", c.subnet.as_deref(), errors);
    check_reference("public_ip_address", c.public_ip_address.as_option(), errors);
}

/// Fully-qualified values must parse; bare names are always accepted here.
fn check_reference(field: &str, value: Option<&str>, errors: &mut Vec<ValidationError>) {
    let Some(v) = value.filter(|v| is_fully_qualified(v)) else {
        return;
    };
    if let Err(e) = parse_reference(v) {
        errors.push(ValidationError {
            message: format!("{}: {}", field, e),
        });
    }
}

/// Validate a parsed VM request. Returns a list of errors (empty = valid).
pub fn validate_vm_request(req: &VmCreateRequest) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_common(&req.common, &mut errors);

    if req.storage_sku.is_empty() {
        errors.push(ValidationError {
            message: "storage_sku must not be empty".to_string(),
        });
    }
    if let NicArgs::Multiple(ref nics) = req.nics {
        for (i, nic) in nics.iter().enumerate() {
            if nic.is_empty() {
                errors.push(ValidationError {
                    message: format!("nics[{}] must not be empty", i),
                });
            }
        }
    }
    for nic in req.nics.to_vec() {
        check_reference("nics", Some(nic.as_str()), &mut errors);
    }
    check_reference("storage_account", req.storage_account.as_deref(), &mut errors);
    check_reference("availability_set", req.availability_set.as_deref(), &mut errors);
    check_reference("nsg", req.nsg.as_option(), &mut errors);
    errors
}

/// Validate a parsed scale-set request.
pub fn validate_vmss_request(req: &VmssCreateRequest) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    validate_common(&req.common, &mut errors);
    check_reference("load_balancer", req.load_balancer.as_option(), &mut errors);
    errors
}

/// Parse and validate a request document for `flow`, including key checks.
pub fn validate_request(yaml: &str, flow: Flow) -> Result<Vec<ValidationError>, String> {
    let mut errors: Vec<ValidationError> = unknown_fields(yaml, flow)?
        .into_iter()
        .map(|k| ValidationError {
            message: format!("unknown field '{}' for {} request", k, flow),
        })
        .collect();

    match flow {
        Flow::Vm => errors.extend(validate_vm_request(&parse_vm_request(yaml)?)),
        Flow::Vmss => errors.extend(validate_vmss_request(&parse_vmss_request(yaml)?)),
    }
    Ok(errors)
}

pub fn validate_request_file(path: &Path, flow: Flow) -> Result<Vec<ValidationError>, String> {
    validate_request(&read(path)?, flow)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vr004_parse_vm() {
        let req = parse_vm_request(
            r#"
resource_group: web
image: UbuntuLTS
vnet_name: vnet1
subnet: apps
nsg: ""
"#,
        )
        .unwrap();
        assert_eq!(req.common.resource_group, "web");
        assert_eq!(req.nsg, PeripheralArg::Omit);
        assert!(validate_vm_request(&req).is_empty());
    }

    #[test]
    fn test_vr004_parse_error() {
        let err = parse_vm_request("resource_group: [unterminated").unwrap_err();
        assert!(err.contains("YAML parse error"));
        // image is required
        assert!(parse_vmss_request("resource_group: rg\n").is_err());
    }

    #[test]
    fn test_vr004_empty_required_fields() {
        let req = VmCreateRequest::new("", "");
        let errors = validate_vm_request(&req);
        assert!(errors.iter().any(|e| e.message.contains("resource_group")));
        assert!(errors.iter().any(|e| e.message.contains("image")));
    }

    #[test]
    fn test_vr004_empty_nic_entry() {
        let mut req = VmCreateRequest::new("rg", "UbuntuLTS");
        req.nics = NicArgs::Multiple(vec!["a".into(), String::new()]);
        let errors = validate_vm_request(&req);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("nics[1]"));
    }

    #[test]
    fn test_vr004_malformed_references() {
        let mut req = VmCreateRequest::new("rg", "UbuntuLTS");
        req.nsg = PeripheralArg::named("/subscriptions/s/resourceGroups/rg");
        req.availability_set = Some("bare-name-is-fine".into());
        let errors = validate_vm_request(&req);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.starts_with("nsg:"));

        let mut req = VmssCreateRequest::new("rg", "UbuntuLTS");
        req.load_balancer = PeripheralArg::named("a/b");
        assert_eq!(validate_vmss_request(&req).len(), 1);
    }

    #[test]
    fn test_vr004_flow_specific_fields() {
        let yaml = "resource_group: rg\nimage: UbuntuLTS\nnsg: web\nload_balancer: lb\n";
        let vm = validate_request(yaml, Flow::Vm).unwrap();
        assert_eq!(vm.len(), 1);
        assert!(vm[0].message.contains("'load_balancer'"));

        let vmss = validate_request(yaml, Flow::Vmss).unwrap();
        assert_eq!(vmss.len(), 1);
        assert!(vmss[0].message.contains("'nsg'"));
    }

    #[test]
    fn test_vr004_not_a_mapping() {
        assert!(unknown_fields("- a\n- b\n", Flow::Vm).is_err());
    }

    #[test]
    fn test_vr004_parse_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vmss.yaml");
        std::fs::write(&path, "resource_group: rg\nimage: UbuntuLTS\nload_balancer: \"\"\n").unwrap();
        let req = parse_vmss_request_file(&path).unwrap();
        assert_eq!(req.load_balancer, PeripheralArg::Omit);
        assert!(validate_request_file(&path, Flow::Vmss).unwrap().is_empty());
        assert!(parse_vm_request_file(&dir.path().join("missing.yaml")).is_err());
    }
}
