//! Authentication module for LoanFlow
//!
//! - bcrypt password hashing
//! - JWT session tokens backed by revocable server-side sessions

mod jwt;
mod password;
mod service;

pub use jwt::{generate_session_token, verify_token, Claims, JwtError};
pub use password::{hash_password, verify_password, PasswordError};
pub use service::{AuthError, AuthService};
