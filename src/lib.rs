//! revit-mcp: AI-assisted wall creation in Revit documents
//!
//! The crate covers both halves of one round trip:
//!
//! - **Tool adapter** ([`tools`], served over MCP by [`mcp`]): shapes tool
//!   arguments into a JSON payload, POSTs it to the host and formats the reply
//! - **Host adapter** ([`routes`] over a [`host::HostDocument`]): validates
//!   the payload, resolves the level and wall type by name, and creates the
//!   wall inside a transaction
//!
//! # Modules
//!
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Configuration error types
//! - [`geometry`] - Points and bound lines
//! - [`host`] - Host document trait, transactions, in-memory document
//! - [`mcp`] - MCP protocol implementation
//! - [`routes`] - HTTP routes run inside the host
//! - [`tools`] - Tool adapters and the host HTTP client

pub mod config;
pub mod error;
pub mod geometry;
pub mod host;
pub mod mcp;
pub mod routes;
pub mod tools;
