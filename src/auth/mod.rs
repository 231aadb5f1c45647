//! Authentication for Chirpy.
//!
//! Password hashing, access-token (JWT) issuance and validation, refresh-token
//! lifecycle, and extraction of bearer tokens and API keys from requests.

pub mod handlers;
mod headers;
mod jwt;
mod password;
mod refresh;
mod service;

pub use headers::{get_api_key, get_bearer_token, AuthenticatedUser};
pub use jwt::{make_jwt, validate_jwt, Claims, TOKEN_ISSUER};
pub use password::{
    check_password_hash, hash_password, spawn_check_password_hash, spawn_hash_password,
};
pub use refresh::make_refresh_token;
pub use service::{AuthService, LoginOutcome};
