//! VR-031: Image resolver (VHD, URN or alias).
//!
//! 1. `*.vhd` → custom image from VHD; `os_type` must be supplied.
//! 2. `publisher:offer:sku:version` → used verbatim.
//! 3. Otherwise a case-insensitive alias catalog lookup.
//!
//! For 2 and 3, `os_type` is inferred from the offer and overwrites any
//! caller-supplied value.

use crate::core::error::ResolveError;
use crate::core::pipeline::ResolveContext;
use crate::core::types::{ImageUrn, Namespace, OsType, StorageProfile};
use regex::Regex;
use std::sync::LazyLock;

const VHD_SUFFIX: &str = ".vhd";

static URN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^:]*):([^:]*):([^:]*):([^:]*)$").expect("static URN pattern")
});

/// True for VHD blob URIs/paths (case-insensitive suffix).
pub fn is_vhd(image: &str) -> bool {
    image.to_lowercase().ends_with(VHD_SUFFIX)
}

/// Split a four-part colon-delimited URN.
pub fn parse_urn(image: &str) -> Option<ImageUrn> {
    let caps = URN_RE.captures(image)?;
    Some(ImageUrn {
        publisher: caps[1].to_string(),
        offer: caps[2].to_string(),
        sku: caps[3].to_string(),
        version: caps[4].to_string(),
    })
}

/// Windows iff the offer mentions "windows".
pub fn infer_os_type(offer: &str) -> OsType {
    if offer.to_lowercase().contains("windows") {
        OsType::Windows
    } else {
        OsType::Linux
    }
}

fn invalid_image_message(image: &str) -> String {
    if image.split(':').count() > 4 {
        format!(
            "Invalid image \"{}\": a URN has exactly four parts (publisher:offer:sku:version).",
            image
        )
    } else {
        format!("Invalid image \"{}\".", image)
    }
}

pub fn resolve_image(
    mut ns: Namespace,
    ctx: &ResolveContext<'_>,
) -> Result<Namespace, ResolveError> {
    if is_vhd(&ns.image) {
        ns.storage_profile = Some(StorageProfile::CustomImageFromVhd);
        if ns.os_type.is_none() {
            return Err(ResolveError::usage(
                "--os-type TYPE is required for a native OS VHD disk.",
            ));
        }
        return Ok(ns);
    }

    let urn = match parse_urn(&ns.image) {
        Some(urn) => urn,
        None => ctx
            .catalog
            .find(&ns.image)
            .map(|alias| alias.urn())
            .ok_or_else(|| ResolveError::InvalidInput {
                message: invalid_image_message(&ns.image),
                choices: ctx.catalog.alias_names(),
            })?,
    };

    ns.os_type = Some(infer_os_type(&urn.offer));
    ns.os_image = Some(urn);
    ns.storage_profile = Some(StorageProfile::PlatformImage);
    Ok(ns)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::{ImageAlias, ImageCatalog};
    use crate::core::pipeline::fixtures::Harness;
    use crate::core::types::VmCreateRequest;
    use proptest::prelude::*;

    fn ns_for(image: &str) -> Namespace {
        let mut ns = Namespace::from(VmCreateRequest::new("rg", image));
        ns.location = Some("westus".to_string());
        ns
    }

    #[test]
    fn test_vr031_vhd_requires_os_type() {
        let h = Harness::empty();
        let err = resolve_image(ns_for("https://sa.blob.core.windows.net/vhds/OS.VHD"), &h.ctx())
            .unwrap_err();
        assert!(matches!(err, ResolveError::Usage(ref m) if m.contains("--os-type")));
    }

    #[test]
    fn test_vr031_vhd_with_os_type() {
        let h = Harness::empty();
        let mut ns = ns_for("https://sa.blob.core.windows.net/vhds/os.vhd");
        ns.os_type = Some(OsType::Linux);
        let ns = resolve_image(ns, &h.ctx()).unwrap();
        assert_eq!(ns.storage_profile, Some(StorageProfile::CustomImageFromVhd));
        assert_eq!(ns.os_type, Some(OsType::Linux));
        assert!(ns.os_image.is_none());
    }

    #[test]
    fn test_vr031_urn() {
        let h = Harness::empty();
        let ns = resolve_image(ns_for("Canonical:UbuntuServer:16.04-LTS:latest"), &h.ctx()).unwrap();
        let urn = ns.os_image.unwrap();
        assert_eq!(urn.publisher, "Canonical");
        assert_eq!(urn.offer, "UbuntuServer");
        assert_eq!(urn.sku, "16.04-LTS");
        assert_eq!(urn.version, "latest");
        assert_eq!(ns.os_type, Some(OsType::Linux));
        assert_eq!(ns.storage_profile, Some(StorageProfile::PlatformImage));
    }

    #[test]
    fn test_vr031_urn_wins_over_alias() {
        let mut h = Harness::empty();
        h.catalog = ImageCatalog::new(vec![ImageAlias {
            urn_alias: "a:b:c:d".to_string(),
            publisher: "x".to_string(),
            offer: "y".to_string(),
            sku: "z".to_string(),
            version: "w".to_string(),
        }]);
        let ns = resolve_image(ns_for("a:b:c:d"), &h.ctx()).unwrap();
        assert_eq!(ns.os_image.unwrap().to_string(), "a:b:c:d");
    }

    #[test]
    fn test_vr031_alias_overwrites_os_type() {
        let h = Harness::empty();
        let mut ns = ns_for("win2012r2datacenter");
        ns.os_type = Some(OsType::Linux);
        let ns = resolve_image(ns, &h.ctx()).unwrap();
        assert_eq!(ns.os_type, Some(OsType::Windows));
        assert_eq!(ns.os_image.unwrap().publisher, "MicrosoftWindowsServer");
    }

    #[test]
    fn test_vr031_unknown_alias() {
        let h = Harness::empty();
        let err = resolve_image(ns_for("myimage"), &h.ctx()).unwrap_err();
        match err {
            ResolveError::InvalidInput { message, choices } => {
                assert!(message.contains("myimage"));
                assert_eq!(choices, ImageCatalog::builtin().alias_names());
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
    }

    #[test]
    fn test_vr031_five_parts_is_not_a_urn() {
        assert!(parse_urn("a:b:c:d:e").is_none());
        assert!(parse_urn("a:b:c").is_none());
        assert!(parse_urn("::::").is_none());
        assert_eq!(parse_urn(":::").unwrap().publisher, "");
    }

    #[test]
    fn test_vr031_extra_urn_parts_rejected() {
        let h = Harness::empty();
        let err = resolve_image(ns_for("Canonical:UbuntuServer:16.04-LTS:latest:extra"), &h.ctx())
            .unwrap_err();
        match err {
            ResolveError::InvalidInput { message, .. } => {
                assert!(message.contains("exactly four parts"), "{}", message);
            }
            other => panic!("expected InvalidInput, got {:?}", other),
        }
        let err = resolve_image(ns_for("myimage"), &h.ctx()).unwrap_err();
        assert!(!err.to_string().contains("four parts"));
    }

    #[test]
    fn test_vr031_infer_os_type_idempotent() {
        let h = Harness::empty();
        let once = resolve_image(ns_for("MicrosoftWindowsServer:WindowsServer:2016-Datacenter:latest"), &h.ctx()).unwrap();
        let twice = resolve_image(once.clone(), &h.ctx()).unwrap();
        assert_eq!(once.os_type, Some(OsType::Windows));
        assert_eq!(once.os_type, twice.os_type);
    }

    proptest! {
        #[test]
        fn prop_vr031_urn_parts_in_order(
            p in "[^:]{0,12}", o in "[^:]{0,12}", s in "[^:]{0,12}", v in "[^:]{0,12}"
        ) {
            let image = format!("{}:{}:{}:{}", p, o, s, v);
            prop_assume!(!is_vhd(&image));
            let urn = parse_urn(&image).unwrap();
            prop_assert_eq!(urn.publisher, p);
            prop_assert_eq!(urn.offer, o.clone());
            prop_assert_eq!(urn.sku, s);
            prop_assert_eq!(urn.version, v);
            prop_assert_eq!(infer_os_type(&o), infer_os_type(&o));
        }
    }
}
