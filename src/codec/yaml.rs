//! YAML file codec backed by serde_yaml.

use serde_yaml::Number as YamlNumber;
use serde_yaml::Value as YamlValue;

use super::{AUTO_GENERATION_BANNER, FileCodec};
use crate::error::ParseError;
use crate::tree::{ParameterMap, ParameterNode};

/// Codec for `.yml` / `.yaml` parameter files.
#[derive(Debug, Default)]
pub struct YamlCodec;

impl FileCodec for YamlCodec {
    fn name(&self) -> &'static str {
        "YAML"
    }

    fn parse(&self, source: &str) -> Result<ParameterNode, ParseError> {
        let value: YamlValue = serde_yaml::from_str(source)
            .map_err(|e| ParseError::new(self.name(), e.to_string()))?;
        from_yaml(&value)
    }

    fn dump(&self, doc: &ParameterNode) -> Result<String, ParseError> {
        let yaml = serde_yaml::to_string(&to_yaml(doc))
            .map_err(|e| ParseError::new(self.name(), e.to_string()))?;
        Ok(format!("{AUTO_GENERATION_BANNER}\n{yaml}"))
    }

    fn supports(&self, extension: &str) -> bool {
        extension == "yml" || extension == "yaml"
    }
}

/// Converts a serde_yaml value into a parameter node.
///
/// Empty sequences load as empty maps by convention; non-string mapping
/// keys are rendered to their scalar text.
fn from_yaml(value: &YamlValue) -> Result<ParameterNode, ParseError> {
    Ok(match value {
        YamlValue::Null => ParameterNode::Null,
        YamlValue::Bool(b) => ParameterNode::Bool(*b),
        YamlValue::Number(n) => from_yaml_number(n),
        YamlValue::String(s) => ParameterNode::Str(s.clone()),
        YamlValue::Sequence(seq) => {
            if seq.is_empty() {
                ParameterNode::empty_map()
            } else {
                let items: Result<Vec<_>, _> = seq.iter().map(from_yaml).collect();
                ParameterNode::List(items?)
            }
        }
        YamlValue::Mapping(mapping) => {
            let mut map = ParameterMap::new();
            for (key, item) in mapping {
                map.insert(yaml_key(key)?, from_yaml(item)?);
            }
            ParameterNode::Map(map)
        }
        YamlValue::Tagged(tagged) => from_yaml(&tagged.value)?,
    })
}

/// Converts a YAML number, keeping the integer/float distinction.
fn from_yaml_number(n: &YamlNumber) -> ParameterNode {
    if let Some(i) = n.as_i64() {
        ParameterNode::Int(i)
    } else if let Some(u) = n.as_u64() {
        // Out of i64 range; degrade to a float rather than lose the value.
        #[allow(clippy::cast_precision_loss)]
        ParameterNode::Float(u as f64)
    } else {
        ParameterNode::Float(n.as_f64().unwrap_or(f64::NAN))
    }
}

/// Renders a YAML mapping key as a string.
fn yaml_key(key: &YamlValue) -> Result<String, ParseError> {
    match key {
        YamlValue::String(s) => Ok(s.clone()),
        YamlValue::Bool(b) => Ok(b.to_string()),
        YamlValue::Number(n) => Ok(n.to_string()),
        _ => Err(ParseError::new(
            "YAML",
            "mapping keys must be scalar values",
        )),
    }
}

/// Converts a parameter node into a serde_yaml value.
fn to_yaml(node: &ParameterNode) -> YamlValue {
    match node {
        ParameterNode::Null => YamlValue::Null,
        ParameterNode::Bool(b) => YamlValue::Bool(*b),
        ParameterNode::Int(i) => YamlValue::Number((*i).into()),
        ParameterNode::Float(f) => YamlValue::Number((*f).into()),
        ParameterNode::Str(s) => YamlValue::String(s.clone()),
        ParameterNode::List(items) => {
            YamlValue::Sequence(items.iter().map(to_yaml).collect())
        }
        ParameterNode::Map(map) => {
            let mut mapping = serde_yaml::Mapping::with_capacity(map.len());
            for (key, item) in map {
                mapping.insert(YamlValue::String(key.clone()), to_yaml(item));
            }
            YamlValue::Mapping(mapping)
        }
    }
}
