//! Cache Value Module
//!
//! Tagged payload stored in each cache item, with counter arithmetic for
//! the numeric kinds.

use serde::{Deserialize, Serialize};

// == Value ==
/// A cached payload.
///
/// Serialized with an explicit `kind` tag so the numeric type survives a
/// trip through disk unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    /// Raw bytes
    Bytes(Vec<u8>),
    /// Signed integer counter
    Int(i64),
    /// Unsigned integer counter
    #[serde(rename = "uint")]
    UInt(u64),
    /// Floating point counter
    Float(f64),
    /// UTF-8 text
    String(String),
    /// Arbitrary JSON document
    Structured(serde_json::Value),
}

impl Value {
    // == Kind ==
    /// Returns the tag name used on disk.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Bytes(_) => "bytes",
            Value::Int(_) => "int",
            Value::UInt(_) => "uint",
            Value::Float(_) => "float",
            Value::String(_) => "string",
            Value::Structured(_) => "structured",
        }
    }

    // == Increment ==
    /// Adds `steps` to a numeric value, wrapping on integer overflow.
    ///
    /// Returns `None` for non-numeric kinds.
    pub fn increment(&self, steps: u64) -> Option<Value> {
        match self {
            Value::Int(n) => Some(Value::Int(n.wrapping_add(steps as i64))),
            Value::UInt(n) => Some(Value::UInt(n.wrapping_add(steps))),
            Value::Float(n) => Some(Value::Float(n + steps as f64)),
            _ => None,
        }
    }

    // == Decrement ==
    /// Subtracts `steps` from a numeric value, wrapping on integer overflow.
    ///
    /// Returns `None` for non-numeric kinds.
    pub fn decrement(&self, steps: u64) -> Option<Value> {
        match self {
            Value::Int(n) => Some(Value::Int(n.wrapping_sub(steps as i64))),
            Value::UInt(n) => Some(Value::UInt(n.wrapping_sub(steps))),
            Value::Float(n) => Some(Value::Float(n - steps as f64)),
            _ => None,
        }
    }

    // == JSON View ==
    /// Renders the payload as plain JSON (without the kind tag).
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Bytes(b) => serde_json::Value::from(b.clone()),
            Value::Int(n) => serde_json::Value::from(*n),
            Value::UInt(n) => serde_json::Value::from(*n),
            Value::Float(n) => serde_json::Value::from(*n),
            Value::String(s) => serde_json::Value::from(s.as_str()),
            Value::Structured(v) => v.clone(),
        }
    }
}

// == Conversions ==
impl From<serde_json::Value> for Value {
    /// Maps plain JSON onto the narrowest matching kind.
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    Value::Int(i)
                } else if let Some(u) = n.as_u64() {
                    Value::UInt(u)
                } else {
                    Value::Float(n.as_f64().unwrap_or_default())
                }
            }
            serde_json::Value::String(s) => Value::String(s),
            other => Value::Structured(other),
        }
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Int(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::UInt(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Value::Bytes(b)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_int_arithmetic() {
        let v = Value::Int(5);
        assert_eq!(v.increment(3), Some(Value::Int(8)));
        assert_eq!(Value::Int(8).decrement(10), Some(Value::Int(-2)));
    }

    #[test]
    fn test_int_wraps() {
        assert_eq!(Value::Int(i64::MAX).increment(1), Some(Value::Int(i64::MIN)));
    }

    #[test]
    fn test_uint_wraps_below_zero() {
        assert_eq!(Value::UInt(1).decrement(2), Some(Value::UInt(u64::MAX)));
    }

    #[test]
    fn test_float_arithmetic() {
        assert_eq!(Value::Float(1.5).increment(2), Some(Value::Float(3.5)));
        assert_eq!(Value::Float(1.5).decrement(2), Some(Value::Float(-0.5)));
    }

    #[test]
    fn test_non_numeric_rejected() {
        assert_eq!(Value::from("hello").increment(1), None);
        assert_eq!(Value::Bytes(vec![1, 2]).decrement(1), None);
        assert_eq!(Value::Structured(json!({"a": 1})).increment(1), None);
    }

    #[test]
    fn test_tagged_encoding() {
        let json = serde_json::to_string(&Value::Int(7)).unwrap();
        assert_eq!(json, r#"{"kind":"int","value":7}"#);

        let json = serde_json::to_string(&Value::UInt(7)).unwrap();
        assert_eq!(json, r#"{"kind":"uint","value":7}"#);
    }

    #[test]
    fn test_float_keeps_kind() {
        let json = serde_json::to_string(&Value::Float(2.0)).unwrap();
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Value::Float(2.0));
    }

    #[test]
    fn test_from_json() {
        assert_eq!(Value::from(json!(5)), Value::Int(5));
        assert_eq!(Value::from(json!(u64::MAX)), Value::UInt(u64::MAX));
        assert_eq!(Value::from(json!(1.25)), Value::Float(1.25));
        assert_eq!(Value::from(json!("hi")), Value::String("hi".to_string()));
        assert_eq!(
            Value::from(json!([1, 2])),
            Value::Structured(json!([1, 2]))
        );
    }

    #[test]
    fn test_to_json() {
        assert_eq!(Value::Int(-2).to_json(), json!(-2));
        assert_eq!(Value::from("x").to_json(), json!("x"));
        assert_eq!(Value::Bytes(vec![1, 2]).to_json(), json!([1, 2]));
    }
}
