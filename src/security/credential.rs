use crate::error::CredentialError;
use crate::storage::{CREDENTIAL_KEY, KvStore};
use chacha20poly1305::{
    ChaCha20Poly1305, KeyInit, Nonce,
    aead::{Aead, OsRng, rand_core::RngCore},
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use zeroize::Zeroize;

const KEY_FILE: &str = ".secret_key";
const ENC_PREFIX: &str = "ENC:";
const NONCE_LEN: usize = 12;

/// At-rest encryption for the stored API credential.
///
/// Values are sealed with ChaCha20-Poly1305 under a key kept in a `0600`
/// file next to the data directory, and marked with an `ENC:` prefix so
/// plaintext values written before encryption was enabled still load.
pub struct SecretVault {
    root: PathBuf,
    encrypt: bool,
}

impl SecretVault {
    pub fn new(root: &Path, encrypt: bool) -> Self {
        Self {
            root: root.to_path_buf(),
            encrypt,
        }
    }

    #[must_use]
    pub fn is_sealed(value: &str) -> bool {
        value.starts_with(ENC_PREFIX)
    }

    pub fn seal(&self, plaintext: &str) -> Result<String, CredentialError> {
        if !self.encrypt || plaintext.is_empty() || Self::is_sealed(plaintext) {
            return Ok(plaintext.to_string());
        }

        let mut key_bytes = self.load_or_create_key()?;
        let cipher = ChaCha20Poly1305::new_from_slice(&key_bytes)
            .map_err(|_| CredentialError::Vault("invalid key length".into()))?;
        key_bytes.zeroize();

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let nonce = Nonce::from_slice(&nonce_bytes);

        let ciphertext = cipher
            .encrypt(nonce, plaintext.as_bytes())
            .map_err(|e| CredentialError::Vault(format!("encryption failed: {e}")))?;

        let mut combined = nonce_bytes.to_vec();
        combined.extend_from_slice(&ciphertext);
        Ok(format!("{ENC_PREFIX}{}", hex::encode(combined)))
    }

    pub fn open(&self, value: &str) -> Result<String, CredentialError> {
        if !Self::is_sealed(value) {
            return Ok(value.to_string());
        }

        let combined = hex::decode(&value[ENC_PREFIX.len()..])
            .map_err(|_| CredentialError::Vault("invalid hex in sealed value".into()))?;
        if combined.len() < NONCE_LEN {
            return Err(CredentialError::Vault("sealed value too short".into()));
        }

        let (nonce_bytes, ciphertext) = combined.split_at(NONCE_LEN);
        let nonce = Nonce::from_slice(nonce_bytes);

        let mut key_bytes = self.load_or_create_key()?;
        let cipher = ChaCha20Poly1305::new_from_slice(&key_bytes)
            .map_err(|_| CredentialError::Vault("invalid key length".into()))?;
        key_bytes.zeroize();

        let plaintext = cipher
            .decrypt(nonce, ciphertext)
            .map_err(|e| CredentialError::Vault(format!("decryption failed: {e}")))?;

        String::from_utf8(plaintext).map_err(|_| CredentialError::Encoding)
    }

    fn key_path(&self) -> PathBuf {
        self.root.join(KEY_FILE)
    }

    fn read_key_file(path: &Path) -> Result<Vec<u8>, CredentialError> {
        let hex_key = fs::read_to_string(path)
            .map_err(|e| CredentialError::Vault(format!("failed to read key file: {e}")))?;
        let key = hex::decode(hex_key.trim())
            .map_err(|_| CredentialError::Vault("invalid hex in key file".into()))?;
        if key.len() != 32 {
            return Err(CredentialError::Vault(
                "key file has invalid length (expected 32 bytes)".into(),
            ));
        }
        Ok(key)
    }

    fn write_new_key_file(path: &Path, key: &[u8]) -> Result<(), CredentialError> {
        let write = || -> std::io::Result<()> {
            #[cfg(unix)]
            {
                use std::os::unix::fs::OpenOptionsExt;

                let mut file = fs::OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .mode(0o600)
                    .open(path)?;
                file.write_all(hex::encode(key).as_bytes())?;
                file.sync_all()?;
            }

            #[cfg(not(unix))]
            {
                fs::write(path, hex::encode(key))?;
            }
            Ok(())
        };
        write().map_err(|e| CredentialError::Vault(format!("failed to create key file: {e}")))?;
        Self::enforce_key_permissions(path)
    }

    fn enforce_key_permissions(path: &Path) -> Result<(), CredentialError> {
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;

            fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| {
                CredentialError::Vault(format!("failed to set key file permissions: {e}"))
            })?;
        }
        #[cfg(not(unix))]
        let _ = path;
        Ok(())
    }

    fn load_or_create_key(&self) -> Result<Vec<u8>, CredentialError> {
        let path = self.key_path();
        if path.exists() {
            Self::enforce_key_permissions(&path)?;
            return Self::read_key_file(&path);
        }

        let mut key = vec![0u8; 32];
        OsRng.fill_bytes(&mut key);
        match Self::write_new_key_file(&path, &key) {
            Ok(()) => Ok(key),
            // Lost the creation race: another process wrote it first.
            Err(_) if path.exists() => {
                key.zeroize();
                Self::enforce_key_permissions(&path)?;
                Self::read_key_file(&path)
            }
            Err(e) => Err(e),
        }
    }
}

/// The single API credential, persisted under the `gemini_api_key` storage
/// key. Absent until the user supplies one through the setup flow;
/// removable by explicit user action; only ever sent to the generation and
/// classification services.
pub struct CredentialStore {
    kv: Arc<dyn KvStore>,
    vault: SecretVault,
}

impl CredentialStore {
    pub fn new(kv: Arc<dyn KvStore>, vault: SecretVault) -> Self {
        Self { kv, vault }
    }

    pub fn set(&self, credential: &str) -> Result<(), CredentialError> {
        let sealed = self.vault.seal(credential.trim())?;
        self.kv.save(CREDENTIAL_KEY, sealed.as_bytes())?;
        Ok(())
    }

    pub fn get(&self) -> Result<Option<String>, CredentialError> {
        let Some(bytes) = self.kv.load(CREDENTIAL_KEY)? else {
            return Ok(None);
        };
        let stored = String::from_utf8(bytes).map_err(|_| CredentialError::Encoding)?;
        if stored.is_empty() {
            return Ok(None);
        }
        self.vault.open(&stored).map(Some)
    }

    pub fn is_present(&self) -> Result<bool, CredentialError> {
        Ok(self.get()?.is_some())
    }

    pub fn clear(&self) -> Result<(), CredentialError> {
        self.kv.remove(CREDENTIAL_KEY)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use tempfile::TempDir;

    fn store_with_encryption(dir: &TempDir, encrypt: bool) -> CredentialStore {
        CredentialStore::new(
            Arc::new(MemoryStore::new()),
            SecretVault::new(dir.path(), encrypt),
        )
    }

    #[test]
    fn set_get_roundtrip_encrypted() {
        let dir = TempDir::new().unwrap();
        let store = store_with_encryption(&dir, true);

        store.set("AIzaSy-test-credential").unwrap();
        assert_eq!(store.get().unwrap().as_deref(), Some("AIzaSy-test-credential"));
    }

    #[test]
    fn sealed_value_does_not_contain_plaintext() {
        let dir = TempDir::new().unwrap();
        let vault = SecretVault::new(dir.path(), true);

        let sealed = vault.seal("AIzaSy-test-credential").unwrap();
        assert!(SecretVault::is_sealed(&sealed));
        assert!(!sealed.contains("AIzaSy-test-credential"));
        assert_eq!(vault.open(&sealed).unwrap(), "AIzaSy-test-credential");
    }

    #[test]
    fn plaintext_passthrough_when_encryption_disabled() {
        let dir = TempDir::new().unwrap();
        let vault = SecretVault::new(dir.path(), false);
        assert_eq!(vault.seal("plain-key").unwrap(), "plain-key");
    }

    #[test]
    fn opening_plaintext_value_returns_it_unchanged() {
        let dir = TempDir::new().unwrap();
        let vault = SecretVault::new(dir.path(), true);
        assert_eq!(vault.open("legacy-plaintext-key").unwrap(), "legacy-plaintext-key");
    }

    #[test]
    fn absent_credential_reads_as_none() {
        let dir = TempDir::new().unwrap();
        let store = store_with_encryption(&dir, true);
        assert_eq!(store.get().unwrap(), None);
        assert!(!store.is_present().unwrap());
    }

    #[test]
    fn clear_removes_credential() {
        let dir = TempDir::new().unwrap();
        let store = store_with_encryption(&dir, false);

        store.set("key").unwrap();
        assert!(store.is_present().unwrap());
        store.clear().unwrap();
        assert!(!store.is_present().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn key_file_permissions_are_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let vault = SecretVault::new(dir.path(), true);
        let _ = vault.seal("secret").unwrap();

        let metadata = std::fs::metadata(dir.path().join(KEY_FILE)).unwrap();
        assert_eq!(metadata.permissions().mode() & 0o777, 0o600);
    }
}
