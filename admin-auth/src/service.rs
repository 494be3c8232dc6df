use crate::models::{AdminCredential, CredentialSlot, LoginRequest};
use std::sync::atomic::{AtomicBool, Ordering};

/// Error type for authentication operations
#[derive(Debug)]
pub enum AuthError {
    NetworkError(String),
    ServerError(String),
    EmptyPassword,
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            AuthError::ServerError(msg) => write!(f, "Server error: {}", msg),
            AuthError::EmptyPassword => write!(f, "Password must not be empty"),
        }
    }
}

impl std::error::Error for AuthError {}

/// Remote side of the admin password exchange
#[allow(async_fn_in_trait)]
pub trait AuthBackend {
    /// Returns `Ok(true)` if the password was accepted, `Ok(false)` if rejected
    async fn login(&self, password: &str) -> Result<bool, AuthError>;

    /// Invalidates the server-side session, if any
    async fn logout(&self) -> Result<(), AuthError>;
}

/// HTTP backend talking to `/admin/login` and `/admin/logout`
pub struct HttpAuthBackend {
    base_url: String,
    client: reqwest::Client,
}

impl HttpAuthBackend {
    /// Create a backend sharing `client` (and its cookie store) with other services
    pub fn new(base_url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

impl AuthBackend for HttpAuthBackend {
    async fn login(&self, password: &str) -> Result<bool, AuthError> {
        let response = self
            .client
            .post(self.endpoint("admin/login"))
            .header("Accept", "application/json")
            .json(&LoginRequest { password })
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Login request failed: {}", e)))?;

        match response.status().as_u16() {
            200..=299 => Ok(true),
            401 | 403 => {
                log::debug!("Login rejected with status {}", response.status());
                Ok(false)
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(AuthError::ServerError(format!(
                    "Unexpected status code {}: {}",
                    status, body
                )))
            }
        }
    }

    async fn logout(&self) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.endpoint("admin/logout"))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(format!("Logout request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(AuthError::ServerError(format!(
                "Server returned status: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

/// Volatile privilege flag gating admin operations.
///
/// A new gate is never privileged. Only a successful [`AuthGate::login`]
/// raises the flag, and [`AuthGate::logout`] lowers it whatever the network does.
pub struct AuthGate<B: AuthBackend> {
    backend: B,
    slot: CredentialSlot,
    privileged: AtomicBool,
}

impl<B: AuthBackend> AuthGate<B> {
    pub fn new(backend: B, slot: CredentialSlot) -> Self {
        // Anything left in the slot belongs to a previous gate.
        slot.clear();
        Self {
            backend,
            slot,
            privileged: AtomicBool::new(false),
        }
    }

    pub fn is_privileged(&self) -> bool {
        self.privileged.load(Ordering::SeqCst)
    }

    /// The slot privileged requests read their key from
    pub fn credentials(&self) -> &CredentialSlot {
        &self.slot
    }

    /// Exchange `password` for privileged access
    pub async fn login(&self, password: &str) -> Result<bool, AuthError> {
        if password.is_empty() {
            self.revoke();
            return Err(AuthError::EmptyPassword);
        }

        match self.backend.login(password).await {
            Ok(true) => {
                self.slot.set(AdminCredential::new(password));
                self.privileged.store(true, Ordering::SeqCst);
                log::info!("Admin login successful");
                Ok(true)
            }
            Ok(false) => {
                log::warn!("Admin login rejected");
                self.revoke();
                Ok(false)
            }
            Err(e) => {
                log::error!("Admin login failed: {}", e);
                self.revoke();
                Err(e)
            }
        }
    }

    /// Best-effort remote logout, then unconditional local lockout
    pub async fn logout(&self) {
        if let Err(e) = self.backend.logout().await {
            log::warn!("Remote logout failed, clearing local state anyway: {}", e);
        }
        self.revoke();
        log::info!("Admin logged out");
    }

    fn revoke(&self) {
        self.slot.clear();
        self.privileged.store(false, Ordering::SeqCst);
    }
}
