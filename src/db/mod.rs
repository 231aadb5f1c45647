//! Credential store for Chirpy.
//!
//! Users, chirps and refresh tokens live behind the [`CredentialStore`]
//! trait. `PgStore` is the production backend; `MemoryStore` backs tests.

pub mod memory;
pub mod models;
pub mod operations;
pub mod store;

pub use memory::MemoryStore;
pub use models::{Chirp, RefreshToken, RefreshTokenStatus, User};
pub use operations::PgStore;
pub use store::CredentialStore;
