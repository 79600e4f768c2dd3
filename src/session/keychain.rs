use std::path::Path;

use keyring::Entry;
use tracing::{info, warn};

use super::store::{FileSessionStore, SessionStore};
use super::types::Session;
use crate::error::StorageError;

const KEYCHAIN_SERVICE: &str = "fraudfinder-api";
const KEYCHAIN_ACCOUNT: &str = "fraudfinder";

/// Single secret slot holding the bearer token.
pub trait TokenVault: Send + Sync {
    fn get(&self) -> Result<Option<String>, StorageError>;
    fn set(&self, token: &str) -> Result<(), StorageError>;
    fn delete(&self) -> Result<(), StorageError>;
}

/// The OS keychain entry for this app.
pub struct KeyringVault {
    service: String,
    account: String,
}

impl Default for KeyringVault {
    fn default() -> Self {
        Self {
            service: KEYCHAIN_SERVICE.to_string(),
            account: KEYCHAIN_ACCOUNT.to_string(),
        }
    }
}

impl KeyringVault {
    fn entry(&self) -> Result<Entry, StorageError> {
        Entry::new(&self.service, &self.account).map_err(|e| {
            warn!("Failed to create keyring entry for {}: {}", self.service, e);
            StorageError::Keychain(e.to_string())
        })
    }
}

impl TokenVault for KeyringVault {
    fn get(&self) -> Result<Option<String>, StorageError> {
        match self.entry()?.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => {
                info!("No token in keychain for {}", self.service);
                Ok(None)
            }
            Err(e) => {
                warn!("Failed to read token for {}: {}", self.service, e);
                Err(StorageError::Keychain(e.to_string()))
            }
        }
    }

    fn set(&self, token: &str) -> Result<(), StorageError> {
        self.entry()?.set_password(token).map_err(|e| {
            warn!("Failed to store token for {}: {}", self.service, e);
            StorageError::Keychain(e.to_string())
        })
    }

    fn delete(&self) -> Result<(), StorageError> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => {
                warn!("Failed to delete credential for {}: {}", self.service, e);
                Err(StorageError::Keychain(e.to_string()))
            }
        }
    }
}

/// Keeps the bearer token in the OS keychain and the user profile in a JSON
/// file beside the config. A save changes both or neither.
pub struct KeyringSessionStore {
    vault: Box<dyn TokenVault>,
    profile: FileSessionStore,
}

impl KeyringSessionStore {
    pub fn new(profile_dir: &Path) -> Self {
        Self::with_vault(KeyringVault::default(), profile_dir)
    }

    pub fn with_vault<V: TokenVault + 'static>(vault: V, profile_dir: &Path) -> Self {
        Self {
            vault: Box::new(vault),
            profile: FileSessionStore::new(profile_dir.join("profile.json")),
        }
    }

    fn put_token(&self, token: Option<&str>) -> Result<(), StorageError> {
        match token {
            Some(token) => self.vault.set(token),
            None => self.vault.delete(),
        }
    }
}

impl SessionStore for KeyringSessionStore {
    fn load(&self) -> Result<Session, StorageError> {
        let token = self.vault.get()?;
        let user = self.profile.load()?.user;
        Ok(Session { token, user })
    }

    fn save(&self, session: &Session) -> Result<(), StorageError> {
        let previous = self.vault.get()?;
        self.put_token(session.token.as_deref())?;

        let profile = Session {
            token: None,
            user: session.user.clone(),
        };
        if let Err(e) = self.profile.save(&profile) {
            warn!("Profile write failed, restoring previous keychain token: {}", e);
            if let Err(rollback) = self.put_token(previous.as_deref()) {
                warn!("Failed to restore previous keychain token: {}", rollback);
            }
            return Err(e);
        }
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        // Attempt both halves even if the keychain refuses.
        let token_result = self.vault.delete();
        let profile_result = self.profile.clear();
        token_result.and(profile_result)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use tempfile::TempDir;

    use super::*;
    use crate::session::types::User;

    #[derive(Clone, Default)]
    struct MemoryVault {
        slot: Arc<Mutex<Option<String>>>,
    }

    impl MemoryVault {
        fn holding(token: &str) -> Self {
            let vault = Self::default();
            *vault.slot.lock().unwrap() = Some(token.to_string());
            vault
        }

        fn current(&self) -> Option<String> {
            self.slot.lock().unwrap().clone()
        }
    }

    impl TokenVault for MemoryVault {
        fn get(&self) -> Result<Option<String>, StorageError> {
            Ok(self.current())
        }

        fn set(&self, token: &str) -> Result<(), StorageError> {
            *self.slot.lock().unwrap() = Some(token.to_string());
            Ok(())
        }

        fn delete(&self) -> Result<(), StorageError> {
            *self.slot.lock().unwrap() = None;
            Ok(())
        }
    }

    fn session(token: &str, email: &str, name: &str) -> Session {
        Session::authenticated(
            token.to_string(),
            User {
                email: email.to_string(),
                name: name.to_string(),
            },
        )
    }

    #[test]
    fn test_save_load_clear() {
        let tmp = TempDir::new().unwrap();
        let vault = MemoryVault::default();
        let store = KeyringSessionStore::with_vault(vault.clone(), tmp.path());

        let ana = session("tok-a", "ana@example.com", "Ana");
        store.save(&ana).unwrap();
        assert_eq!(vault.current().as_deref(), Some("tok-a"));
        assert_eq!(store.load().unwrap(), ana);

        // The profile file never carries the token
        let raw = std::fs::read_to_string(tmp.path().join("profile.json")).unwrap();
        assert!(!raw.contains("tok-a"));

        store.clear().unwrap();
        assert!(vault.current().is_none());
        assert_eq!(store.load().unwrap(), Session::default());
    }

    #[test]
    fn test_failed_profile_write_restores_previous_token() {
        let tmp = TempDir::new().unwrap();
        // A plain file where the profile directory should be
        let not_a_dir = tmp.path().join("profile-dir");
        std::fs::write(&not_a_dir, "").unwrap();
        let vault = MemoryVault::holding("tok-a");
        let store = KeyringSessionStore::with_vault(vault.clone(), &not_a_dir);

        let err = store
            .save(&session("tok-b", "bruno@example.com", "Bruno"))
            .unwrap_err();

        assert!(matches!(err, StorageError::Io(_)));
        assert_eq!(vault.current().as_deref(), Some("tok-a"));
    }

    #[test]
    fn test_failed_first_save_leaves_no_token_behind() {
        let tmp = TempDir::new().unwrap();
        let not_a_dir = tmp.path().join("profile-dir");
        std::fs::write(&not_a_dir, "").unwrap();
        let vault = MemoryVault::default();
        let store = KeyringSessionStore::with_vault(vault.clone(), &not_a_dir);

        assert!(store
            .save(&session("tok-b", "bruno@example.com", "Bruno"))
            .is_err());
        assert!(vault.current().is_none());
    }
}
