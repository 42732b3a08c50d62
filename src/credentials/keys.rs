//! VR-021: SSH public key material from a literal, a file, or `ssh-keygen`.

use super::{KeyMaterialSource, KeyRequest};
use crate::core::error::ResolveError;
use crate::transport::local::exec_program;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

const MISSING_KEY: &str = "An RSA key file or key value must be supplied to SSH Key Value. \
     You can use --generate-ssh-keys to let CLI generate one for you";

/// Resolves keys against the local filesystem.
#[derive(Debug, Clone)]
pub struct LocalKeyMaterial {
    home: Option<PathBuf>,
}

impl Default for LocalKeyMaterial {
    fn default() -> Self {
        Self {
            home: dirs::home_dir(),
        }
    }
}

impl LocalKeyMaterial {
    /// Resolve `~` against `home` instead of the user's real home.
    pub fn with_home(home: &Path) -> Self {
        Self {
            home: Some(home.to_path_buf()),
        }
    }

    /// `~/.ssh/id_rsa.pub`
    pub fn default_public_key_path(&self) -> Option<PathBuf> {
        self.home.as_ref().map(|h| h.join(".ssh").join("id_rsa.pub"))
    }
}

impl KeyMaterialSource for LocalKeyMaterial {
    fn public_key(&self, request: &KeyRequest) -> Result<String, ResolveError> {
        let candidate = match request.value {
            Some(ref v) if !v.is_empty() => v.clone(),
            _ => self
                .default_public_key_path()
                .map(|p| p.to_string_lossy().to_string())
                .ok_or_else(|| ResolveError::not_found(MISSING_KEY))?,
        };

        let path = Path::new(&candidate);
        if path.is_file() {
            info!("Use existing SSH public key file: {}", candidate);
            let content = std::fs::read_to_string(path).map_err(|e| {
                ResolveError::KeyMaterial(format!("cannot read {}: {}", candidate, e))
            })?;
            return Ok(content.trim().to_string());
        }

        if is_valid_ssh_rsa_public_key(&candidate) {
            return Ok(candidate);
        }

        if !request.generate {
            return Err(ResolveError::not_found(MISSING_KEY));
        }

        let public_path = PathBuf::from(&candidate);
        let private_path = private_key_path_for(&public_path);
        let content = generate_ssh_keys(&private_path, &public_path)?;
        warn!(
            "Created SSH key files: {},{}",
            private_path.display(),
            public_path.display()
        );
        Ok(content)
    }
}

/// `id_rsa.pub` → `id_rsa`; anything else gets a `.private` suffix.
pub fn private_key_path_for(public: &Path) -> PathBuf {
    let s = public.to_string_lossy();
    let cut = s.len().saturating_sub(4);
    match s.get(cut..) {
        Some(ext) if s.len() >= 4 && ext.eq_ignore_ascii_case(".pub") => PathBuf::from(&s[..cut]),
        _ => PathBuf::from(format!("{}.private", s)),
    }
}

/// Header check for an OpenSSH public key: the base64 blob must begin with
/// a big-endian length-prefixed copy of the key type.
pub fn is_valid_ssh_rsa_public_key(openssh_pubkey: &str) -> bool {
    let parts: Vec<&str> = openssh_pubkey.split_whitespace().collect();
    if parts.len() < 2 {
        return false;
    }
    let key_type = parts[0];
    let Ok(data) = STANDARD.decode(parts[1]) else {
        return false;
    };
    let Some(len_bytes) = data.get(..4) else {
        return false;
    };
    let mut len_buf = [0u8; 4];
    len_buf.copy_from_slice(len_bytes);
    let str_len = u32::from_be_bytes(len_buf) as usize;
    data.get(4..4 + str_len) == Some(key_type.as_bytes())
}

/// Generate a 2048-bit RSA pair with `ssh-keygen`, returning the public key.
fn generate_ssh_keys(private_path: &Path, public_path: &Path) -> Result<String, ResolveError> {
    if let Some(dir) = private_path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if !dir.exists() {
            std::fs::create_dir_all(dir).map_err(|e| {
                ResolveError::KeyMaterial(format!("cannot create {}: {}", dir.display(), e))
            })?;
            set_mode(dir, 0o700)?;
        }
    }

    let private = private_path.to_string_lossy().to_string();
    let out = exec_program(
        "ssh-keygen",
        &["-q", "-t", "rsa", "-b", "2048", "-N", "", "-C", "", "-f", private.as_str()],
    )
    .map_err(ResolveError::KeyMaterial)?;
    if !out.success() {
        return Err(ResolveError::KeyMaterial(format!(
            "ssh-keygen failed: {}",
            out.stderr.trim()
        )));
    }
    set_mode(private_path, 0o600)?;

    let generated_pub = PathBuf::from(format!("{}.pub", private));
    let content = std::fs::read_to_string(&generated_pub)
        .map_err(|e| {
            ResolveError::KeyMaterial(format!("cannot read {}: {}", generated_pub.display(), e))
        })?
        .trim()
        .to_string();

    if generated_pub != public_path {
        std::fs::write(public_path, &content).map_err(|e| {
            ResolveError::KeyMaterial(format!("cannot write {}: {}", public_path.display(), e))
        })?;
        let _ = std::fs::remove_file(&generated_pub);
    }
    set_mode(public_path, 0o644)?;

    Ok(content)
}

#[cfg(unix)]
fn set_mode(path: &Path, mode: u32) -> Result<(), ResolveError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).map_err(|e| {
        ResolveError::KeyMaterial(format!("cannot chmod {}: {}", path.display(), e))
    })
}

#[cfg(not(unix))]
fn set_mode(_path: &Path, _mode: u32) -> Result<(), ResolveError> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_rsa_key() -> String {
        let mut blob = Vec::new();
        blob.extend_from_slice(&7u32.to_be_bytes());
        blob.extend_from_slice(b"ssh-rsa");
        blob.extend_from_slice(&[0, 0, 0, 3, 1, 0, 1]);
        format!("ssh-rsa {} user@host", STANDARD.encode(blob))
    }

    #[test]
    fn test_vr021_valid_key_header() {
        assert!(is_valid_ssh_rsa_public_key(&fake_rsa_key()));
    }

    #[test]
    fn test_vr021_invalid_keys() {
        assert!(!is_valid_ssh_rsa_public_key(""));
        assert!(!is_valid_ssh_rsa_public_key("ssh-rsa"));
        assert!(!is_valid_ssh_rsa_public_key("ssh-rsa !!!notbase64!!!"));
        assert!(!is_valid_ssh_rsa_public_key("ssh-rsa AAAA"));
        // header says ssh-rsa but the prefix is ssh-ed25519
        let key = fake_rsa_key().replacen("ssh-rsa", "ssh-ed25519", 1);
        assert!(!is_valid_ssh_rsa_public_key(&key));
    }

    #[test]
    fn test_vr021_private_key_path() {
        assert_eq!(
            private_key_path_for(Path::new("/h/.ssh/id_rsa.pub")),
            PathBuf::from("/h/.ssh/id_rsa")
        );
        assert_eq!(
            private_key_path_for(Path::new("/h/.ssh/ID.PUB")),
            PathBuf::from("/h/.ssh/ID")
        );
        assert_eq!(
            private_key_path_for(Path::new("/h/mykey")),
            PathBuf::from("/h/mykey.private")
        );
    }

    #[test]
    fn test_vr021_literal_value() {
        let src = LocalKeyMaterial::with_home(Path::new("/nonexistent-home"));
        let key = fake_rsa_key();
        let req = KeyRequest { value: Some(key.clone()), generate: false };
        assert_eq!(src.public_key(&req).unwrap(), key);
    }

    #[test]
    fn test_vr021_reads_default_file() {
        let home = tempfile::tempdir().unwrap();
        let ssh = home.path().join(".ssh");
        std::fs::create_dir_all(&ssh).unwrap();
        std::fs::write(ssh.join("id_rsa.pub"), format!("{}\n", fake_rsa_key())).unwrap();
        let src = LocalKeyMaterial::with_home(home.path());
        assert_eq!(src.public_key(&KeyRequest::default()).unwrap(), fake_rsa_key());
    }

    #[test]
    fn test_vr021_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deploy.pub");
        std::fs::write(&path, "ssh-rsa AAAAB3 from-file").unwrap();
        let src = LocalKeyMaterial::with_home(dir.path());
        let req = KeyRequest {
            value: Some(path.to_string_lossy().to_string()),
            generate: false,
        };
        assert_eq!(src.public_key(&req).unwrap(), "ssh-rsa AAAAB3 from-file");
    }

    #[test]
    fn test_vr021_missing_without_generate() {
        let home = tempfile::tempdir().unwrap();
        let src = LocalKeyMaterial::with_home(home.path());
        let err = src.public_key(&KeyRequest::default()).unwrap_err();
        assert!(matches!(err, ResolveError::NotFound(_)));
        assert!(err.to_string().contains("--generate-ssh-keys"));
    }
}
