//! Middleware for the LoanFlow API
//!
//! Request tracing, rate limiting, security headers, authentication
//! extractors and validated request bodies.

pub mod auth;
mod rate_limiter;
mod security;
mod tracing;
mod validation;

pub use auth::{AdminUser, AuthenticatedUser, OptionalUser, SESSION_COOKIE};
pub use rate_limiter::{client_ip, rate_limit, RateLimiter};
pub use security::security_headers;
pub use self::tracing::request_tracing;
pub use validation::ValidatedJson;
