//! Resolvers, one per concern. Each is `(Namespace, &ResolveContext) -> Result<Namespace>`.
//!
//! Each resolver reads only fields set by the user or by earlier steps and
//! writes its own derived fields. Classifications, once written, are final.

pub mod auth;
pub mod image;
pub mod location;
pub mod network;
pub mod nic;
pub mod peripheral;
pub mod storage;

/// `Some(s)` only when `s` is non-empty.
pub(crate) fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vr006_non_empty() {
        assert_eq!(non_empty(&None), None);
        assert_eq!(non_empty(&Some(String::new())), None);
        assert_eq!(non_empty(&Some("x".to_string())), Some("x"));
    }
}
