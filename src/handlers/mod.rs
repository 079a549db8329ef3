//! API handlers for the LoanFlow backend

pub mod admin;
pub mod applications;
pub mod auth;
pub mod calculator;
pub mod health;

// Re-export the extractors handlers rely on
pub use crate::middleware::auth::{AdminUser, AuthenticatedUser, OptionalUser};
