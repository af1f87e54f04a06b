//! Parameter value representation.

use std::collections::HashMap;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{DiError, DiResult};

/// A configuration parameter value.
///
/// Parameters carry loosely-typed configuration data — the values referenced
/// by `%name%` markers in service definitions and retrieved through
/// [`Container::get_parameter`](crate::Container::get_parameter). Values
/// nest: arrays and objects may contain further values, and any string of
/// the form `%other%` is resolved transitively at lookup time.
///
/// # Examples
///
/// ```rust
/// use cinder_di::ParamValue;
///
/// let value = ParamValue::from("localhost");
/// assert_eq!(value.as_str().unwrap(), "localhost");
///
/// let port = ParamValue::from(5432);
/// assert_eq!(port.as_i64().unwrap(), 5432);
/// assert!(port.as_str().is_err());
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(untagged))]
pub enum ParamValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Array(Vec<ParamValue>),
    Object(HashMap<String, ParamValue>),
}

impl ParamValue {
    /// Try to view as a string
    pub fn as_str(&self) -> DiResult<&str> {
        match self {
            ParamValue::String(s) => Ok(s),
            _ => Err(DiError::TypeMismatch("parameter value is not a string")),
        }
    }

    /// Try to convert to an integer
    pub fn as_i64(&self) -> DiResult<i64> {
        match self {
            ParamValue::Integer(i) => Ok(*i),
            _ => Err(DiError::TypeMismatch("parameter value is not an integer")),
        }
    }

    /// Try to convert to a float
    pub fn as_f64(&self) -> DiResult<f64> {
        match self {
            ParamValue::Float(v) => Ok(*v),
            ParamValue::Integer(i) => Ok(*i as f64),
            _ => Err(DiError::TypeMismatch("parameter value is not a number")),
        }
    }

    /// Try to convert to a boolean
    pub fn as_bool(&self) -> DiResult<bool> {
        match self {
            ParamValue::Boolean(b) => Ok(*b),
            _ => Err(DiError::TypeMismatch("parameter value is not a boolean")),
        }
    }

    /// Try to view as an array
    pub fn as_array(&self) -> DiResult<&[ParamValue]> {
        match self {
            ParamValue::Array(items) => Ok(items),
            _ => Err(DiError::TypeMismatch("parameter value is not an array")),
        }
    }

    /// Try to view as an object
    pub fn as_object(&self) -> DiResult<&HashMap<String, ParamValue>> {
        match self {
            ParamValue::Object(map) => Ok(map),
            _ => Err(DiError::TypeMismatch("parameter value is not an object")),
        }
    }

    /// Whether this value is `Null`
    pub fn is_null(&self) -> bool {
        matches!(self, ParamValue::Null)
    }
}

impl From<&str> for ParamValue {
    fn from(s: &str) -> Self {
        ParamValue::String(s.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(s: String) -> Self {
        ParamValue::String(s)
    }
}

impl From<i64> for ParamValue {
    fn from(i: i64) -> Self {
        ParamValue::Integer(i)
    }
}

impl From<i32> for ParamValue {
    fn from(i: i32) -> Self {
        ParamValue::Integer(i64::from(i))
    }
}

impl From<u16> for ParamValue {
    fn from(i: u16) -> Self {
        ParamValue::Integer(i64::from(i))
    }
}

impl From<f64> for ParamValue {
    fn from(v: f64) -> Self {
        ParamValue::Float(v)
    }
}

impl From<bool> for ParamValue {
    fn from(b: bool) -> Self {
        ParamValue::Boolean(b)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(items: Vec<ParamValue>) -> Self {
        ParamValue::Array(items)
    }
}

impl From<HashMap<String, ParamValue>> for ParamValue {
    fn from(map: HashMap<String, ParamValue>) -> Self {
        ParamValue::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversions() {
        assert_eq!(ParamValue::from("x").as_str().unwrap(), "x");
        assert_eq!(ParamValue::from(7).as_i64().unwrap(), 7);
        assert_eq!(ParamValue::from(7).as_f64().unwrap(), 7.0);
        assert!(ParamValue::from(true).as_bool().unwrap());
        assert!(ParamValue::Null.is_null());
    }

    #[test]
    fn mismatches() {
        assert!(ParamValue::from("x").as_i64().is_err());
        assert!(ParamValue::from(1).as_str().is_err());
        assert!(ParamValue::from(true).as_array().is_err());
    }
}
