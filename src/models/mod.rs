//! Data models for the service desk backend.
//!
//! Tickets, departments and ML records are passed through as raw JSON;
//! the backend owns their shape. The types here cover what the client
//! itself constructs: request payloads, list filters and query strings,
//! plus the login response it reads the token from.

mod auth;
mod common;
mod ml;
mod ticket;

pub use auth::*;
pub use common::*;
pub use ml::*;
pub use ticket::*;
