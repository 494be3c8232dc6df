//! # Admin Auth
//!
//! Administrator login for the event gallery.
//!
//! This crate provides:
//! - The password exchange against `/admin/login` and `/admin/logout`
//! - A volatile privilege flag that always starts out `false`
//! - A shared credential slot that privileged requests read on every call
//!
//! ## Separation of Concerns
//!
//! This crate does **not**:
//! - Persist credentials (a restarted process is never privileged)
//! - Perform the privileged requests themselves (handled by `photo-service`)
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use admin_auth::{AuthGate, CredentialSlot, HttpAuthBackend};
//!
//! let slot = CredentialSlot::default();
//! let backend = HttpAuthBackend::new("https://gallery.example.com/api", client);
//! let gate = AuthGate::new(backend, slot.clone());
//!
//! if gate.login("secret").await? {
//!     // slot now carries the admin key for privileged calls
//! }
//! gate.logout().await;
//! ```

pub mod models;
pub mod service;

pub use models::{AdminCredential, CredentialSlot, LoginRequest};
pub use service::{AuthBackend, AuthError, AuthGate, HttpAuthBackend};
