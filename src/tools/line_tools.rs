//! Tools for line-based elements.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::{format_response, HostClient};
use crate::mcp::server::ToolDefinition;
use crate::routes::line_elements::{DEFAULT_WALL_TYPE, WALLS_CATEGORY};

/// Tool name exposed to callers.
pub const CREATE_LINE_BASED_ELEMENT: &str = "create_line_based_element";

/// Host route the tool posts to.
pub const CREATE_LINE_BASED_ELEMENT_PATH: &str = "/create_line_based_element/";

/// Arguments of `create_line_based_element`.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateLineBasedElementArgs {
    /// `{"x": .., "y": .., "z": ..}`
    pub start: Value,
    /// `{"x": .., "y": .., "z": ..}`
    pub end: Value,
    /// Level name.
    pub level_name: String,
    /// Wall type name.
    #[serde(default = "default_wall_type")]
    pub wall_type: String,
}

fn default_wall_type() -> String {
    DEFAULT_WALL_TYPE.to_string()
}

/// Payload POSTed to the host route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreateLineBasedElementPayload {
    /// Always [`WALLS_CATEGORY`].
    pub category: String,
    /// Start point, forwarded as given.
    pub start: Value,
    /// End point, forwarded as given.
    pub end: Value,
    /// Level name.
    pub level_name: String,
    /// Element properties.
    pub properties: PayloadProperties,
}

/// `properties` object of the payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PayloadProperties {
    /// Wall type name.
    pub wall_type: String,
}

impl From<CreateLineBasedElementArgs> for CreateLineBasedElementPayload {
    fn from(args: CreateLineBasedElementArgs) -> Self {
        Self {
            category: WALLS_CATEGORY.to_string(),
            start: args.start,
            end: args.end,
            level_name: args.level_name,
            properties: PayloadProperties {
                wall_type: args.wall_type,
            },
        }
    }
}

/// Creates a wall between two points and returns the formatted host reply.
pub async fn create_line_based_element(
    client: &HostClient,
    args: CreateLineBasedElementArgs,
) -> String {
    let payload = CreateLineBasedElementPayload::from(args);
    let result = client.post(CREATE_LINE_BASED_ELEMENT_PATH, &payload).await;
    format_response(&result)
}

/// Tool definitions for line-based elements.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    let point = json!({
        "type": "object",
        "properties": {
            "x": { "type": "number" },
            "y": { "type": "number" },
            "z": { "type": "number" }
        },
        "required": ["x", "y", "z"]
    });

    vec![ToolDefinition {
        name: CREATE_LINE_BASED_ELEMENT.to_string(),
        description: Some(
            "Creates a wall between two points on a named level. \
             Coordinates are in document units. The wall is 3000 units high \
             with no base offset."
                .to_string(),
        ),
        input_schema: json!({
            "type": "object",
            "properties": {
                "start": {
                    "description": "Start point {\"x\":..., \"y\":..., \"z\":...}",
                    "allOf": [point.clone()]
                },
                "end": {
                    "description": "End point {\"x\":..., \"y\":..., \"z\":...}",
                    "allOf": [point]
                },
                "level_name": {
                    "type": "string",
                    "description": "Name of the Revit level"
                },
                "wall_type": {
                    "type": "string",
                    "description": "Name of the wall type",
                    "default": DEFAULT_WALL_TYPE
                }
            },
            "required": ["start", "end", "level_name"]
        }),
    }]
}
