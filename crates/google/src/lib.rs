//! Google Drive and Sheets clients for the intake service.
//!
//! Authenticates as a service account (JWT bearer grant), wraps the handful
//! of Drive v3 and Sheets v4 REST endpoints the workflow needs, and exposes
//! them through the `tarannum-core` remote traits via [`GoogleWorkspace`].

pub mod auth;
pub mod credentials;
pub mod drive;
pub mod error;
mod http;
pub mod sheets;
pub mod workspace;

pub use credentials::{CredentialSource, ServiceAccountKey};
pub use error::GoogleApiError;
pub use workspace::{GoogleSettings, GoogleWorkspace};
