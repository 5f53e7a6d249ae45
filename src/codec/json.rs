//! JSON file codec backed by serde_json.
//!
//! Output is serialized compact and reflowed through the [`pretty`]
//! printer, so the written file carries deterministic two-space
//! indentation. JSON has no comment syntax, so no banner is emitted.
//!
//! [`pretty`]: super::pretty

use serde_json::Value as JsonValue;

use super::{FileCodec, pretty};
use crate::error::ParseError;
use crate::tree::{ParameterMap, ParameterNode};

/// Codec for `.json` parameter files.
#[derive(Debug, Default)]
pub struct JsonCodec;

impl FileCodec for JsonCodec {
    fn name(&self) -> &'static str {
        "JSON"
    }

    fn parse(&self, source: &str) -> Result<ParameterNode, ParseError> {
        let value: JsonValue = serde_json::from_str(source)
            .map_err(|e| ParseError::new(self.name(), e.to_string()))?;
        Ok(from_json(&value))
    }

    fn dump(&self, doc: &ParameterNode) -> Result<String, ParseError> {
        let compact = serde_json::to_string(&to_json(doc))
            .map_err(|e| ParseError::new(self.name(), e.to_string()))?;
        Ok(pretty::format(&compact))
    }

    fn supports(&self, extension: &str) -> bool {
        extension == "json"
    }
}

/// Converts a serde_json value into a parameter node.
///
/// Empty arrays load as empty maps by convention.
fn from_json(value: &JsonValue) -> ParameterNode {
    match value {
        JsonValue::Null => ParameterNode::Null,
        JsonValue::Bool(b) => ParameterNode::Bool(*b),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                ParameterNode::Int(i)
            } else {
                ParameterNode::Float(n.as_f64().unwrap_or(f64::NAN))
            }
        }
        JsonValue::String(s) => ParameterNode::Str(s.clone()),
        JsonValue::Array(items) => {
            if items.is_empty() {
                ParameterNode::empty_map()
            } else {
                ParameterNode::List(items.iter().map(from_json).collect())
            }
        }
        JsonValue::Object(obj) => {
            let mut map = ParameterMap::new();
            for (key, item) in obj {
                map.insert(key.clone(), from_json(item));
            }
            ParameterNode::Map(map)
        }
    }
}

/// Converts a parameter node into a serde_json value.
fn to_json(node: &ParameterNode) -> JsonValue {
    match node {
        ParameterNode::Null => JsonValue::Null,
        ParameterNode::Bool(b) => JsonValue::Bool(*b),
        ParameterNode::Int(i) => JsonValue::Number((*i).into()),
        ParameterNode::Float(f) => serde_json::Number::from_f64(*f)
            .map_or(JsonValue::Null, JsonValue::Number),
        ParameterNode::Str(s) => JsonValue::String(s.clone()),
        ParameterNode::List(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        ParameterNode::Map(map) => {
            let mut obj = serde_json::Map::with_capacity(map.len());
            for (key, item) in map {
                obj.insert(key.clone(), to_json(item));
            }
            JsonValue::Object(obj)
        }
    }
}
