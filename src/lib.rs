//! # desklink
//!
//! desklink is the API client for the service desk backend: login and
//! session handling, tickets, departments, ML prediction logs and model
//! training. A binary hosts the client behind an MCP (Model Context
//! Protocol) server so assistants can work the desk through tools.
//!
//! ## Architecture
//!
//! - [`config`] - Base address resolution from the hosting page origin
//! - [`session`] - Bearer token storage over a durable key-value store
//! - [`error`] - The single error type every operation reports through
//! - [`desk_client`] - Request pipeline and the typed resource operations
//! - [`models`] - Payloads, filters and query builders
//! - [`server`] - MCP server exposing the operations as tools
//! - [`tools`] - Tool input parameter structs
//!
//! ## Base address
//!
//! The client is built with a [`config::Config`] resolved once from an
//! [`config::OriginSource`]. An `http`/`https` page origin is used as-is;
//! otherwise the client talks to `http://127.0.0.1:8000`.
//!
//! ## Security Considerations
//!
//! The bearer token is treated as opaque and is:
//! - Never logged at any log level
//! - Never decoded or inspected
//! - Not included in any tool responses
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use desklink::config::{Config, NoPage};
//! use desklink::desk_client::DeskClient;
//! use desklink::models::TicketFilters;
//! use desklink::session::MemoryStorage;
//!
//! async fn example() -> Result<(), desklink::error::DeskError> {
//!     let client = DeskClient::new(&Config::resolve(&NoPage), Arc::new(MemoryStorage::new()))?;
//!     client.login("lead@desk.io", "secret").await?;
//!
//!     let waiting = client
//!         .get_tickets(&TicketFilters::new().with_triage_required(true))
//!         .await?;
//!     println!("{}", waiting);
//!
//!     client.resolve_triage(42, "P1", "Network", Some("whole floor offline")).await?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod config;
pub mod desk_client;
pub mod error;
pub mod models;
pub mod server;
pub mod session;
pub mod tools;
