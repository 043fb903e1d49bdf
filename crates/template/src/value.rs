//! Property values that templates are rendered against.

use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Display};
use std::path::PathBuf;
use std::sync::Arc;

/// A key-value mapping of properties. Keys are matched by exact string identity,
/// so a key may itself contain dots (`project.version`).
pub type PropertyMap = BTreeMap<String, Value>;

/// An object exposing named properties without being a mapping.
///
/// Objects are only reachable through nested-path resolution: unlike a
/// [`PropertyMap`], an object is never searched for a full dotted name.
pub trait PropertyObject: Debug + Display + Send + Sync {
    /// Returns the value of the named property, if the object has it.
    fn property(&self, name: &str) -> Option<Value>;
}

/// A property value.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// A file-system path. Rendered with `/` separators on every platform.
    Path(PathBuf),
    List(Vec<Value>),
    Map(PropertyMap),
    Object(Arc<dyn PropertyObject>),
}

impl Value {
    /// Builds a map value from key/value pairs.
    pub fn map<I, K, V>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn as_map(&self) -> Option<&PropertyMap> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Mustache truthiness: null, `false`, empty strings and empty lists are falsy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::String(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            _ => true,
        }
    }

    /// Looks up one path segment inside this value.
    ///
    /// Maps are indexed by key, objects by property name and lists by a
    /// decimal index. Scalars have no children.
    pub fn child(&self, segment: &str) -> Option<Value> {
        match self {
            Value::Map(map) => map.get(segment).cloned(),
            Value::Object(object) => object.property(segment),
            Value::List(items) => segment
                .parse::<usize>()
                .ok()
                .and_then(|index| items.get(index).cloned()),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Path(a), Value::Path(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl Display for Value {
    /// The natural text form. Paths use the platform's native separators here;
    /// portable rendering is the stringifier's job.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::String(s) => f.write_str(s),
            Value::Path(p) => write!(f, "{}", p.display()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}={}", key, value)?;
                }
                f.write_str("}")
            }
            Value::Object(object) => write!(f, "{}", object),
        }
    }
}

impl From<serde_json::Value> for Value {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Integer(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Map(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        serde_json::Value::deserialize(deserializer).map(Value::from)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<PathBuf> for Value {
    fn from(p: PathBuf) -> Self {
        Value::Path(p)
    }
}

impl From<PropertyMap> for Value {
    fn from(map: PropertyMap) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct Project;

    impl Display for Project {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("Project")
        }
    }

    impl PropertyObject for Project {
        fn property(&self, name: &str) -> Option<Value> {
            (name == "version").then(|| Value::from("2.0"))
        }
    }

    #[test]
    fn test_from_json() {
        let value = Value::from(json!({
            "name": "demo",
            "count": 3,
            "ratio": 0.5,
            "flags": [true, null]
        }));
        let map = value.as_map().unwrap();
        assert_eq!(map["name"], Value::from("demo"));
        assert_eq!(map["count"], Value::Integer(3));
        assert_eq!(map["ratio"], Value::Float(0.5));
        assert_eq!(map["flags"], Value::List(vec![Value::Bool(true), Value::Null]));
    }

    #[test]
    fn test_deserialize_from_json_text() {
        let value: Value = serde_json::from_str(r#"{"project.version": "1.2.3"}"#).unwrap();
        assert_eq!(
            value.as_map().unwrap().get("project.version"),
            Some(&Value::from("1.2.3"))
        );
    }

    #[test]
    fn test_truthiness() {
        assert!(!Value::Null.is_truthy());
        assert!(!Value::Bool(false).is_truthy());
        assert!(!Value::from("").is_truthy());
        assert!(!Value::List(vec![]).is_truthy());
        assert!(Value::Integer(0).is_truthy());
        assert!(Value::map([("a", 1)]).is_truthy());
    }

    #[test]
    fn test_child_lookup() {
        let value = Value::from(json!({ "items": ["x", "y"], "nested": { "k": "v" } }));
        assert_eq!(value.child("nested").unwrap().child("k"), Some(Value::from("v")));
        assert_eq!(value.child("items").unwrap().child("1"), Some(Value::from("y")));
        assert_eq!(value.child("items").unwrap().child("two"), None);
        assert_eq!(Value::from("scalar").child("len"), None);

        let object = Value::Object(Arc::new(Project));
        assert_eq!(object.child("version"), Some(Value::from("2.0")));
        assert_eq!(object.child("name"), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
        assert_eq!(Value::from(vec!["a", "b"]).to_string(), "[a, b]");
        assert_eq!(Value::map([("k", "v"), ("n", "m")]).to_string(), "{k=v, n=m}");
        assert_eq!(Value::Object(Arc::new(Project)).to_string(), "Project");
    }

    #[test]
    fn test_object_equality_is_identity() {
        let shared: Arc<dyn PropertyObject> = Arc::new(Project);
        assert_eq!(Value::Object(Arc::clone(&shared)), Value::Object(shared));
        assert_ne!(Value::Object(Arc::new(Project)), Value::Object(Arc::new(Project)));
    }
}
