//! MCP tool inputs for desklink.
//!
//! This module contains the input types for the MCP tools that expose
//! the desk client's operations.

mod inputs;

pub use inputs::*;
