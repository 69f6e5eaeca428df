//! `POST /create_line_based_element/`
//!
//! Creates a wall between two points on a named level using a named wall
//! type. The body is:
//!
//! ```json
//! {
//!   "category": "Walls",
//!   "start": {"x": 0, "y": 0, "z": 0},
//!   "end": {"x": 5000, "y": 0, "z": 0},
//!   "level_name": "Ebene 0",
//!   "properties": {"wall_type": "Basic Wall: Generic - 200mm"}
//! }
//! ```
//!
//! Missing parameters and unknown names are client errors (400). Everything
//! else, including coordinates that are not numbers, is a 500 carrying the
//! raw error message.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::geometry::{GeometryError, Line, Point3D};
use crate::host::{
    find_by_name, ElementClass, ElementId, HostDocument, HostError, NamedElement, Transaction,
    WallPlacement,
};

/// Wall type used when the request does not name one.
pub const DEFAULT_WALL_TYPE: &str = "Generic - 200mm";

/// Category sent by the tool adapter.
pub const WALLS_CATEGORY: &str = "Walls";

/// Name of the transaction wrapping the create call.
pub const TRANSACTION_NAME: &str = "Create Line-Based Element";

/// Unconnected height of created walls, in document units.
pub const WALL_HEIGHT: f64 = 3000.0;

/// Base offset of created walls, in document units.
pub const WALL_BASE_OFFSET: f64 = 0.0;

/// Incoming request body.
///
/// Fields are kept as raw JSON so that absent, empty or zero values can be
/// reported as missing parameters and names of any JSON type as lookup
/// misses, rather than as parse failures.
#[derive(Debug, Default, Deserialize)]
pub struct CreateLineElementRequest {
    /// Element category, e.g. `"Walls"`.
    #[serde(default)]
    pub category: Option<Value>,
    /// Start point object.
    #[serde(default)]
    pub start: Option<Value>,
    /// End point object.
    #[serde(default)]
    pub end: Option<Value>,
    /// Level name.
    #[serde(default)]
    pub level_name: Option<Value>,
    /// Element properties.
    #[serde(default)]
    pub properties: Option<LineElementProperties>,
}

/// Optional element properties.
#[derive(Debug, Default, Deserialize)]
pub struct LineElementProperties {
    /// Wall type name.
    #[serde(default)]
    pub wall_type: Option<Value>,
}

/// A request with every required field present.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// Element category.
    pub category: Value,
    /// Start point object, not yet coerced.
    pub start: Value,
    /// End point object, not yet coerced.
    pub end: Value,
    /// Level name. Only a string can match a level.
    pub level_name: Value,
    /// Wall type name, defaulted if absent. Only a string can match.
    pub wall_type: Value,
}

impl CreateLineElementRequest {
    /// Checks required fields and applies defaults.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::MissingParameters`] if `category`, `start`, `end`
    /// or `level_name` is absent, null, empty, zero or `false`.
    pub fn validate(self) -> Result<ValidatedRequest, RouteError> {
        let (Some(category), Some(start), Some(end), Some(level_name)) = (
            self.category.filter(is_present),
            self.start.filter(is_present),
            self.end.filter(is_present),
            self.level_name.filter(is_present),
        ) else {
            return Err(RouteError::MissingParameters);
        };

        let wall_type = self
            .properties
            .and_then(|p| p.wall_type)
            .unwrap_or_else(|| Value::from(DEFAULT_WALL_TYPE));

        Ok(ValidatedRequest {
            category,
            start,
            end,
            level_name,
            wall_type,
        })
    }
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f.abs() > 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Array(a) => !a.is_empty(),
    }
}

/// Renders a queried name for an error message. Strings appear verbatim.
fn display_name(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        other => other.to_string(),
    }
}

/// Looks up a named element; non-string names never match.
fn lookup<D: HostDocument + ?Sized>(
    doc: &D,
    class: ElementClass,
    name: &Value,
) -> Option<NamedElement> {
    name.as_str().and_then(|name| find_by_name(doc, class, name))
}

/// Success body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateLineElementResponse {
    /// Always `"success"`.
    pub status: String,
    /// Id of the new element.
    pub element_id: ElementId,
}

impl CreateLineElementResponse {
    /// Creates a success body for `element_id`.
    #[must_use]
    pub fn success(element_id: ElementId) -> Self {
        Self {
            status: "success".to_string(),
            element_id,
        }
    }
}

/// Error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable error.
    pub error: String,
}

/// Failures of the create route.
#[derive(Debug, Error)]
pub enum RouteError {
    /// A required field is absent.
    #[error("Missing required parameters")]
    MissingParameters,

    /// No level has the requested name.
    #[error("Level not found: {name}")]
    LevelNotFound {
        /// Queried level name.
        name: String,
    },

    /// No wall type has the requested name.
    #[error("WallType not found: {name}")]
    WallTypeNotFound {
        /// Queried wall type name.
        name: String,
    },

    /// The body is not valid JSON or has fields of the wrong type.
    #[error(transparent)]
    InvalidBody(#[from] serde_json::Error),

    /// Coordinates could not be turned into a line.
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    /// The host failed during the transaction.
    #[error(transparent)]
    Host(#[from] HostError),
}

impl RouteError {
    /// HTTP status for this error.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::MissingParameters | Self::LevelNotFound { .. } | Self::WallTypeNotFound { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::InvalidBody(_) | Self::Geometry(_) | Self::Host(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for RouteError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

/// Creates a wall in `doc` from a raw request body.
///
/// Lookups and coordinate coercion happen before the transaction opens, so a
/// failure there leaves the document untouched. The create call runs inside
/// a [`Transaction`] that is committed on success and rolled back otherwise;
/// a failed commit is rolled back when the guard drops.
///
/// # Errors
///
/// Returns a [`RouteError`] describing the first step that failed.
pub fn create_line_based_element<D: HostDocument + ?Sized>(
    doc: &mut D,
    body: &[u8],
) -> Result<ElementId, RouteError> {
    let request: CreateLineElementRequest = serde_json::from_slice(body)?;
    let request = request.validate()?;
    debug!(
        category = %request.category,
        level = %request.level_name,
        wall_type = %request.wall_type,
        "Creating line-based element"
    );

    let level = lookup(&*doc, ElementClass::Level, &request.level_name).ok_or_else(|| {
        RouteError::LevelNotFound {
            name: display_name(&request.level_name),
        }
    })?;

    let wall_type = lookup(&*doc, ElementClass::WallType, &request.wall_type).ok_or_else(|| {
        RouteError::WallTypeNotFound {
            name: display_name(&request.wall_type),
        }
    })?;

    let start = Point3D::from_json(&request.start)?;
    let end = Point3D::from_json(&request.end)?;
    let line = Line::create_bound(start, end)?;

    let placement = WallPlacement {
        line,
        wall_type_id: wall_type.id,
        level_id: level.id,
        height: WALL_HEIGHT,
        base_offset: WALL_BASE_OFFSET,
        flip: false,
        structural: false,
    };

    let mut tx = Transaction::start(doc, TRANSACTION_NAME)?;
    let created = tx.document().create_wall(&placement);
    let id = match created {
        Ok(id) => id,
        Err(e) => {
            if let Err(rollback) = tx.rollback() {
                warn!(error = %rollback, "Rollback after failed create also failed");
            }
            return Err(e.into());
        }
    };
    tx.commit()?;

    info!(
        element_id = %id,
        level = %level.name,
        wall_type = %wall_type.name,
        "Wall created"
    );
    Ok(id)
}

/// Axum handler for the create route.
pub async fn handle_create_line_based_element<D: HostDocument + 'static>(
    State(doc): State<Arc<Mutex<D>>>,
    body: Bytes,
) -> Response {
    let result = {
        let mut doc = doc.lock().await;
        create_line_based_element(&mut *doc, &body)
    };

    match result {
        Ok(id) => Json(CreateLineElementResponse::success(id)).into_response(),
        Err(e) => {
            if e.status().is_server_error() {
                error!(error = %e, "Wall creation failed");
            } else {
                debug!(error = %e, "Rejected wall creation request");
            }
            e.into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MemoryDocument;
    use serde_json::json;

    fn document() -> MemoryDocument {
        MemoryDocument::new("Test")
            .with_level("Ebene 0")
            .with_wall_type("Basic Wall: Generic - 200mm")
    }

    fn body(value: &Value) -> Vec<u8> {
        serde_json::to_vec(value).unwrap()
    }

    fn valid_request() -> Value {
        json!({
            "category": "Walls",
            "start": {"x": 0, "y": 0, "z": 0},
            "end": {"x": 5000, "y": 0, "z": 0},
            "level_name": "Ebene 0",
            "properties": {"wall_type": "Basic Wall: Generic - 200mm"}
        })
    }

    #[test]
    fn validate_applies_default_wall_type() {
        let request: CreateLineElementRequest = serde_json::from_value(json!({
            "category": "Walls",
            "start": {"x": 0, "y": 0, "z": 0},
            "end": {"x": 1, "y": 0, "z": 0},
            "level_name": "L1"
        }))
        .unwrap();
        let validated = request.validate().unwrap();
        assert_eq!(validated.wall_type, DEFAULT_WALL_TYPE);
    }

    #[test]
    fn validate_treats_empty_values_as_missing() {
        for field in ["category", "start", "end", "level_name"] {
            for empty in [json!(null), json!(""), json!({}), json!([]), json!(0), json!(0.0), json!(false)] {
                let mut value = valid_request();
                value[field] = empty.clone();
                let request: CreateLineElementRequest = serde_json::from_value(value).unwrap();
                assert!(
                    matches!(request.validate(), Err(RouteError::MissingParameters)),
                    "{field} = {empty} should count as missing"
                );
            }
        }
    }

    #[test]
    fn non_string_names_are_lookup_misses() {
        let mut doc = document();
        let mut request = valid_request();
        request["level_name"] = json!(5);
        let err = create_line_based_element(&mut doc, &body(&request)).unwrap_err();
        assert_eq!(err.to_string(), "Level not found: 5");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let mut request = valid_request();
        request["properties"]["wall_type"] = json!(true);
        let err = create_line_based_element(&mut doc, &body(&request)).unwrap_err();
        assert_eq!(err.to_string(), "WallType not found: True");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn creates_wall_with_fixed_parameters() {
        let mut doc = document();
        let id = create_line_based_element(&mut doc, &body(&valid_request())).unwrap();

        let walls = doc.walls();
        assert_eq!(walls.len(), 1);
        assert_eq!(walls[0].id, id);
        assert!((walls[0].height - WALL_HEIGHT).abs() < f64::EPSILON);
        assert!((walls[0].base_offset - WALL_BASE_OFFSET).abs() < f64::EPSILON);
        assert!(!walls[0].flipped);
        assert!(!walls[0].structural);
        assert!((walls[0].line.length() - 5000.0).abs() < f64::EPSILON);
    }

    #[test]
    fn lookup_errors_take_precedence_over_coordinates() {
        let mut doc = document();
        let mut request = valid_request();
        request["start"] = json!({"x": "abc", "y": 0, "z": 0});
        request["level_name"] = json!("Missing");

        let err = create_line_based_element(&mut doc, &body(&request)).unwrap_err();
        assert!(matches!(err, RouteError::LevelNotFound { .. }));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn non_numeric_coordinate_is_server_error() {
        let mut doc = document();
        let mut request = valid_request();
        request["end"] = json!({"x": "far", "y": 0, "z": 0});

        let err = create_line_based_element(&mut doc, &body(&request)).unwrap_err();
        assert!(matches!(err, RouteError::Geometry(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(doc.walls().is_empty());
    }

    #[test]
    fn invalid_json_is_server_error() {
        let mut doc = document();
        let err = create_line_based_element(&mut doc, b"{not json").unwrap_err();
        assert!(matches!(err, RouteError::InvalidBody(_)));
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn host_failure_rolls_back() {
        let mut doc = document();
        doc.fail_next_wall_creation("Wall is outside of the model extents");

        let err = create_line_based_element(&mut doc, &body(&valid_request())).unwrap_err();
        assert_eq!(err.to_string(), "Wall is outside of the model extents");
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(doc.walls().is_empty());
        assert!(!doc.has_open_transaction());
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            RouteError::MissingParameters.to_string(),
            "Missing required parameters"
        );
        assert_eq!(
            RouteError::WallTypeNotFound {
                name: "Generic - 200mm".to_string()
            }
            .to_string(),
            "WallType not found: Generic - 200mm"
        );
    }
}
