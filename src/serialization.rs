use crate::ast::AstNode;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A fully parsed value.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Value {
    Null,
    Boolean(bool),
    Number(f64),
    String(String),
    Array(Vec<Value>),
    /// Unique elements. Serialized as a sequence; compared without regard to order.
    Set(Vec<Value>),
    Object(BTreeMap<String, Value>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_set(&self) -> Option<&Vec<Value>> {
        match self {
            Value::Set(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, Value>> {
        match self {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up `key` if this is an object.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_object()?.get(key)
    }

    /// Deep equality used for set membership: like `==`, except that `NaN`
    /// is the same value as `NaN`.
    pub fn same_value(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Value::Array(a), Value::Array(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_value(y))
            }
            (Value::Set(a), Value::Set(b)) => {
                a.len() == b.len() && a.iter().all(|x| b.iter().any(|y| x.same_value(y)))
            }
            (Value::Object(a), Value::Object(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b)
                        .all(|((ka, va), (kb, vb))| ka == kb && va.same_value(vb))
            }
            _ => self == other,
        }
    }

    /// Serializes into a pretty-printed JSON string. Sets become arrays.
    ///
    /// # Errors
    /// Returns a `serde_json::Error` if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Serializes into a YAML string.
    ///
    /// # Errors
    /// Returns a `serde_yaml::Error` if serialization fails.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Set(a), Value::Set(b)) => a.len() == b.len() && a.iter().all(|x| b.contains(x)),
            (Value::Object(a), Value::Object(b)) => a == b,
            _ => false,
        }
    }
}

/// Formats a number the way JavaScript prints it: no trailing `.0`, and
/// `NaN`/`Infinity` spelled out.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        (if n > 0.0 { "Infinity" } else { "-Infinity" }).to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        format!("{n}")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{s:?}"),
            Value::Array(items) => write_list(f, "[", items.iter(), "]"),
            Value::Set(items) => write_list(f, "(", items.iter(), ")"),
            Value::Object(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_list<'a>(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    items: impl Iterator<Item = &'a Value>,
    close: &str,
) -> fmt::Result {
    write!(f, "{open}")?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    write!(f, "{close}")
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Boolean(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or_default()),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => Value::Object(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}

/// Converts a finished tree into a plain value.
pub fn to_native(node: AstNode) -> Value {
    match node {
        AstNode::Object(object) => Value::Object(
            object
                .edges
                .into_iter()
                .map(|(key, value)| (key, to_native(value)))
                .collect(),
        ),
        AstNode::Array(array) => Value::Array(array.edges.into_iter().map(to_native).collect()),
        AstNode::Set(set) => {
            let mut items: Vec<Value> = Vec::with_capacity(set.edges.len());
            for edge in set.edges {
                let value = to_native(edge);
                if !items.iter().any(|existing| existing.same_value(&value)) {
                    items.push(value);
                }
            }
            Value::Set(items)
        }
        AstNode::Scalar(value) => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ArrayNode, ObjectNode, SetNode};

    fn num(n: f64) -> AstNode {
        AstNode::Scalar(Value::Number(n))
    }

    #[test]
    fn test_object_and_array_conversion() {
        let mut object = ObjectNode::default();
        object.bind("list".into(), AstNode::Array(ArrayNode { edges: vec![num(1.0), num(2.0)] }));
        object.bind("none".into(), AstNode::Scalar(Value::Null));

        let value = to_native(AstNode::Object(object));
        let expected: Value = serde_json::json!({ "list": [1.0, 2.0], "none": null }).into();
        assert_eq!(value, expected);
    }

    #[test]
    fn test_set_deduplicates_containers_deeply() {
        let pair = || AstNode::Array(ArrayNode { edges: vec![num(1.0), num(2.0)] });
        let set = AstNode::Set(SetNode { edges: vec![pair(), pair(), num(f64::NAN), num(f64::NAN)] });
        let value = to_native(set);
        assert_eq!(value.as_set().map(Vec::len), Some(2));
    }

    #[test]
    fn test_set_equality_ignores_order() {
        let a = Value::Set(vec![Value::Number(1.0), Value::String("x".into())]);
        let b = Value::Set(vec![Value::String("x".into()), Value::Number(1.0)]);
        assert_eq!(a, b);
        assert_ne!(a, Value::Array(vec![Value::Number(1.0), Value::String("x".into())]));
    }

    #[test]
    fn test_display() {
        let value: Value = serde_json::json!({ "a": [1, 2.5, "x"], "b": true }).into();
        assert_eq!(value.to_string(), r#"{"a": [1, 2.5, "x"], "b": true}"#);
        assert_eq!(Value::Set(vec![Value::Null]).to_string(), "(null)");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(f64::INFINITY), "Infinity");
    }

    #[test]
    fn test_set_serializes_as_sequence() {
        let value = Value::Set(vec![Value::Number(1.0), Value::Number(2.0)]);
        let json: serde_json::Value = serde_json::from_str(&value.to_json().unwrap()).unwrap();
        assert_eq!(json, serde_json::json!([1.0, 2.0]));
    }

    #[test]
    fn test_to_yaml() {
        let value: Value = serde_json::json!({ "name": "app", "enabled": true }).into();
        assert_eq!(value.to_yaml().unwrap(), "enabled: true\nname: app\n");
    }
}
