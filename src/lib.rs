//! LoanFlow Backend Library
//!
//! Loan application intake and tracking: repayment and fee calculators,
//! the seven-step fulfillment pipeline, and the HTTP API around them.

pub mod application;
pub mod auth;
pub mod calculator;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
