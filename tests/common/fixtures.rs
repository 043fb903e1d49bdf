//! Shared resource contents and property sets.

use serde_json::json;
use sift::{PropertyMap, Value};
use std::path::PathBuf;

/// Bytes that are not valid UTF-8 and contain something that looks like a placeholder.
pub const BINARY_RESOURCE: &[u8] = &[0x89, b'P', b'N', b'G', 0x00, b'$', b'{', b'x', b'}', 0xFF];

pub const APP_PROPERTIES: &str = "\
app.name=${app.name}
app.version=${project.version}
build.dir=${build.dir}
";

/// Build properties with a dotted key, a nested map and a path value.
pub fn build_properties() -> Value {
    let mut properties = PropertyMap::new();
    properties.insert("project.version".to_string(), Value::from("1.2.3"));
    properties.insert("app".to_string(), Value::from(json!({ "name": "sift-demo" })));
    properties.insert(
        "build".to_string(),
        Value::map([("dir", Value::Path(PathBuf::from(r"C:\work\target")))]),
    );
    Value::Map(properties)
}
