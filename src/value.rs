//! Dynamic cell values and records.
//!
//! A `Record` is one row of the dataset: an opaque, externally owned
//! property bag. The pipeline never mutates records; it only re-emits
//! arrays of shared handles, so `Record` is an `Rc` around the bag and a
//! "shallow copy" of a row set is a `Vec` clone.
//!
//! `CellValue` carries the loosely typed values a grid cell can hold. The
//! filters and the default comparator all lean on the same emptiness rule:
//! a value is empty iff it is falsy and not the number zero. That makes `0`
//! a real value while `""`, `false`, null and NaN count as empty.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::rc::Rc;

/// One row of the dataset.
pub type Record = Rc<HashMap<String, CellValue>>;

/// Loosely typed cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            CellValue::Int(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Int(v) => Some(*v as f64),
            CellValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::String(v) => Some(v),
            _ => None,
        }
    }

    /// The canonical emptiness test: falsy and not the number 0.
    pub fn is_empty(&self) -> bool {
        match self {
            CellValue::Null => true,
            CellValue::Bool(b) => !b,
            CellValue::Int(_) => false,
            CellValue::Float(f) => f.is_nan(),
            CellValue::String(s) => s.is_empty(),
        }
    }

    /// Truthiness as a dynamic language would see it; zero is falsy here,
    /// unlike in `is_empty`.
    pub fn is_truthy(&self) -> bool {
        match self {
            CellValue::Null => false,
            CellValue::Bool(b) => *b,
            CellValue::Int(v) => *v != 0,
            CellValue::Float(f) => *f != 0.0 && !f.is_nan(),
            CellValue::String(s) => !s.is_empty(),
        }
    }

    /// Numeric coercion. Unparseable strings coerce to NaN, which then
    /// fails every comparison, so a number filter quietly rejects such
    /// records instead of erroring.
    pub fn to_number(&self) -> f64 {
        match self {
            CellValue::Null => 0.0,
            CellValue::Bool(b) => {
                if *b {
                    1.0
                } else {
                    0.0
                }
            }
            CellValue::Int(v) => *v as f64,
            CellValue::Float(f) => *f,
            CellValue::String(s) => {
                let trimmed = s.trim();
                if trimmed.is_empty() {
                    0.0
                } else {
                    trimmed.parse::<f64>().unwrap_or(f64::NAN)
                }
            }
        }
    }

    /// Display form used by the non-strict filter when matching substrings.
    pub fn display_string(&self) -> String {
        match self {
            CellValue::Null => String::new(),
            CellValue::Bool(b) => b.to_string(),
            CellValue::Int(v) => v.to_string(),
            CellValue::Float(f) => f.to_string(),
            CellValue::String(s) => s.clone(),
        }
    }

    /// Identity comparison without coercion, except that integer and float
    /// values of the same magnitude are the same number. NaN never equals
    /// anything, including itself.
    pub fn strict_eq(&self, other: &CellValue) -> bool {
        match (self, other) {
            (CellValue::Null, CellValue::Null) => true,
            (CellValue::Bool(a), CellValue::Bool(b)) => a == b,
            (CellValue::String(a), CellValue::String(b)) => a == b,
            (a, b) => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => x == y,
                _ => false,
            },
        }
    }
}

impl From<bool> for CellValue {
    fn from(v: bool) -> Self {
        CellValue::Bool(v)
    }
}

impl From<i64> for CellValue {
    fn from(v: i64) -> Self {
        CellValue::Int(v)
    }
}

impl From<f64> for CellValue {
    fn from(v: f64) -> Self {
        CellValue::Float(v)
    }
}

impl From<&str> for CellValue {
    fn from(v: &str) -> Self {
        CellValue::String(v.to_string())
    }
}

impl From<String> for CellValue {
    fn from(v: String) -> Self {
        CellValue::String(v)
    }
}

impl From<&serde_json::Value> for CellValue {
    fn from(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => CellValue::Null,
            serde_json::Value::Bool(b) => CellValue::Bool(*b),
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    CellValue::Int(i)
                } else {
                    CellValue::Float(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            serde_json::Value::String(s) => CellValue::String(s.clone()),
            // Nested structures are flattened to their JSON text; the grid
            // treats them as opaque display values.
            other => CellValue::String(other.to_string()),
        }
    }
}

/// Builds a record from a JSON object.
pub fn record_from_json(value: &serde_json::Value) -> Result<Record, String> {
    let object = value
        .as_object()
        .ok_or_else(|| format!("expected a JSON object, got: {}", value))?;
    let fields: HashMap<String, CellValue> = object
        .iter()
        .map(|(key, v)| (key.clone(), CellValue::from(v)))
        .collect();
    Ok(Rc::new(fields))
}

/// Builds a record from key/value pairs.
pub fn record<I, K, V>(fields: I) -> Record
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<CellValue>,
{
    Rc::new(
        fields
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect(),
    )
}
