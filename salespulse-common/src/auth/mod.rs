//! Credentials and bearer tokens
//!
//! Pure functions only; the HTTP service wraps these in its middleware.

pub mod password;
pub mod token;

pub use password::{hash_password, verify_password};
pub use token::{bearer_token, Claims, TokenSigner};
