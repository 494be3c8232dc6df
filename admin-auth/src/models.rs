use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock};
use zeroize::Zeroizing;

/// Body of `POST /admin/login`
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub password: &'a str,
}

/// Admin password retained after a successful login.
///
/// The transport has no reliable session cookie on every deployment, so the
/// password itself is sent as `adminKey` on privileged requests. The buffer
/// is wiped on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct AdminCredential(Zeroizing<String>);

impl AdminCredential {
    pub fn new(password: impl Into<String>) -> Self {
        Self(Zeroizing::new(password.into()))
    }

    /// Raw key for the `adminKey` query parameter
    pub fn expose(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Debug for AdminCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AdminCredential(***)")
    }
}

/// Shared, in-memory holder of the current admin credential.
///
/// Clones share the same slot. Privileged requests call [`CredentialSlot::current`]
/// each time instead of caching the key.
#[derive(Debug, Clone, Default)]
pub struct CredentialSlot {
    inner: Arc<RwLock<Option<AdminCredential>>>,
}

impl CredentialSlot {
    pub fn set(&self, credential: AdminCredential) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Some(credential);
    }

    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = None;
    }

    pub fn current(&self) -> Option<AdminCredential> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credential_debug_is_redacted() {
        let cred = AdminCredential::new("hunter2");
        assert_eq!(format!("{:?}", cred), "AdminCredential(***)");
        assert_eq!(cred.expose(), "hunter2");
    }

    #[test]
    fn test_slot_clones_share_state() {
        let slot = CredentialSlot::default();
        let other = slot.clone();
        assert!(!other.is_set());

        slot.set(AdminCredential::new("key"));
        assert_eq!(other.current().map(|c| c.expose().to_string()), Some("key".to_string()));

        other.clear();
        assert!(!slot.is_set());
    }
}
