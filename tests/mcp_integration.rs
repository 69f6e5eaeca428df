//! Integration tests for MCP protocol handling.
//!
//! These tests verify the JSON-RPC 2.0 parsing, error responses and the
//! tools advertised by the server.

use serde_json::json;

use revit_mcp::config::HostConfig;
use revit_mcp::mcp::protocol::{parse_message, ErrorCode, IncomingMessage, RequestId};
use revit_mcp::mcp::server::McpServer;
use revit_mcp::tools::HostClient;

// =============================================================================
// Protocol Parsing Tests
// =============================================================================

#[test]
fn test_parse_initialize_request() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": 1,
        "method": "initialize",
        "params": {
            "protocolVersion": "2024-11-05",
            "capabilities": {},
            "clientInfo": {
                "name": "test-client",
                "version": "1.0.0"
            }
        }
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Request(req) = result.unwrap() {
        assert_eq!(req.method, "initialize");
        assert_eq!(req.id, RequestId::Number(1));
    } else {
        panic!("Expected Request");
    }
}

#[test]
fn test_parse_tools_call_with_string_id() {
    let json = r#"{
        "jsonrpc": "2.0",
        "id": "call-1",
        "method": "tools/call",
        "params": {
            "name": "create_line_based_element",
            "arguments": {"level_name": "Ebene 0"}
        }
    }"#;

    let IncomingMessage::Request(req) = parse_message(json).unwrap() else {
        panic!("Expected Request");
    };
    assert_eq!(req.id, RequestId::String("call-1".to_string()));
    assert_eq!(req.params.unwrap()["name"], "create_line_based_element");
}

#[test]
fn test_parse_notification() {
    let json = r#"{
        "jsonrpc": "2.0",
        "method": "notifications/initialized"
    }"#;

    let result = parse_message(json);
    assert!(result.is_ok());

    if let IncomingMessage::Notification(notif) = result.unwrap() {
        assert_eq!(notif.method, "notifications/initialized");
    } else {
        panic!("Expected Notification");
    }
}

#[test]
fn test_parse_invalid_json() {
    let error = parse_message("not valid json").unwrap_err();
    assert_eq!(error.error.code, ErrorCode::ParseError.code());
}

#[test]
fn test_parse_missing_jsonrpc_version() {
    let json = r#"{
        "id": 1,
        "method": "test"
    }"#;

    let error = parse_message(json).unwrap_err();
    assert_eq!(error.error.code, ErrorCode::InvalidRequest.code());
}

// =============================================================================
// Tool Listing
// =============================================================================

#[tokio::test]
async fn test_tools_list_advertises_wall_tool() {
    let client = HostClient::new(&HostConfig::default()).unwrap();
    let mut server = McpServer::new(client);

    for line in [
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{"protocolVersion":"2024-11-05"}}"#,
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
    ] {
        let _ = server.handle_message(parse_message(line).unwrap()).await;
    }

    let reply = server
        .handle_message(parse_message(r#"{"jsonrpc":"2.0","id":2,"method":"tools/list"}"#).unwrap())
        .await;
    let Some(Ok(response)) = reply else {
        panic!("Expected success reply");
    };

    let tools = response.result["tools"].as_array().unwrap();
    assert_eq!(tools.len(), 1);
    assert_eq!(tools[0]["name"], "create_line_based_element");

    let schema = &tools[0]["inputSchema"];
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["required"], json!(["start", "end", "level_name"]));
    assert_eq!(
        schema["properties"]["wall_type"]["default"],
        "Generic - 200mm"
    );
}
