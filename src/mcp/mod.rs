//! Model Context Protocol (MCP) server.
//!
//! Exposes the host tools to AI assistants over stdio using JSON-RPC 2.0.
//!
//! ```text
//! ┌────────────┐    ┌────────────┐    ┌────────────┐   HTTP   ┌────────────┐
//! │ Transport  │───▶│   Server   │───▶│   Tools    │─────────▶│ Host route │
//! │  (stdio)   │    │ (lifecycle)│    │ (adapters) │          │  (in host) │
//! └────────────┘    └────────────┘    └────────────┘          └────────────┘
//! ```
//!
//! Targets MCP protocol version 2024-11-05.

pub mod protocol;
pub mod server;
pub mod transport;

pub use protocol::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, MCP_PROTOCOL_VERSION};
pub use server::McpServer;
pub use transport::StdioTransport;
