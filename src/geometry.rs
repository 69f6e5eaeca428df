//! Points and bound line segments in document units.
//!
//! Coordinates arrive from tool callers as loosely-typed JSON. They are
//! coerced to `f64` here, accepting JSON numbers and numeric strings, the same
//! way the host would when constructing its own geometry.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Shortest curve the host accepts, in document units.
///
/// `Line::create_bound` refuses segments shorter than this.
pub const SHORT_CURVE_TOLERANCE: f64 = 0.002_56;

/// Errors raised while building geometry from request data.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    /// The point is not a JSON object.
    #[error("point must be an object with x, y and z, got: {value}")]
    NotAnObject {
        /// The offending JSON value.
        value: String,
    },

    /// A coordinate key is absent.
    #[error("missing coordinate '{axis}'")]
    MissingCoordinate {
        /// Axis name.
        axis: &'static str,
    },

    /// A coordinate could not be converted to a finite float.
    #[error("could not convert coordinate '{axis}' to float: {value}")]
    InvalidCoordinate {
        /// Axis name.
        axis: &'static str,
        /// The offending JSON value.
        value: String,
    },

    /// The two endpoints are too close to form a curve.
    #[error("curve length is too small: {length} (minimum {SHORT_CURVE_TOLERANCE})")]
    CurveTooShort {
        /// Distance between the endpoints.
        length: f64,
    },
}

/// A point in 3D document space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point3D {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point3D {
    /// Creates a point from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Coerces a JSON object `{"x": .., "y": .., "z": ..}` into a point.
    ///
    /// Each coordinate may be a JSON number or a string holding a number.
    /// Extra keys are ignored. Strings such as `"inf"` or `"NaN"` parse as
    /// floats but are rejected, since the host cannot place such a point.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` is not an object, a coordinate is missing,
    /// or a coordinate is not a finite number.
    pub fn from_json(value: &Value) -> Result<Self, GeometryError> {
        let Some(obj) = value.as_object() else {
            return Err(GeometryError::NotAnObject {
                value: value.to_string(),
            });
        };

        let coord = |axis: &'static str| -> Result<f64, GeometryError> {
            let raw = obj
                .get(axis)
                .ok_or(GeometryError::MissingCoordinate { axis })?;
            coerce_f64(raw).ok_or_else(|| GeometryError::InvalidCoordinate {
                axis,
                value: raw.to_string(),
            })
        };

        Ok(Self::new(coord("x")?, coord("y")?, coord("z")?))
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance_to(&self, other: &Self) -> f64 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        let dz = other.z - self.z;
        dz.mul_add(dz, dx.mul_add(dx, dy * dy)).sqrt()
    }
}

fn coerce_f64(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    number.is_finite().then_some(number)
}

/// A bounded straight segment between two points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Line {
    start: Point3D,
    end: Point3D,
}

impl Line {
    /// Builds a bound line from `start` to `end`.
    ///
    /// # Errors
    ///
    /// Returns [`GeometryError::CurveTooShort`] if the endpoints are closer
    /// than [`SHORT_CURVE_TOLERANCE`].
    pub fn create_bound(start: Point3D, end: Point3D) -> Result<Self, GeometryError> {
        let length = start.distance_to(&end);
        if length < SHORT_CURVE_TOLERANCE {
            return Err(GeometryError::CurveTooShort { length });
        }
        Ok(Self { start, end })
    }

    /// Start point.
    #[must_use]
    pub const fn start(&self) -> Point3D {
        self.start
    }

    /// End point.
    #[must_use]
    pub const fn end(&self) -> Point3D {
        self.end
    }

    /// Length of the segment.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.start.distance_to(&self.end)
    }
}
