//! Line-oriented `KEY=value` file codec.
//!
//! Dotenv files carry no nesting and no typed values: everything parses
//! as a raw string and dumps as the value's plain text. Comment lines and
//! lines without a `=` are ignored on read.

use super::{AUTO_GENERATION_BANNER, FileCodec};
use crate::error::ParseError;
use crate::tree::{ParameterMap, ParameterNode};

/// Codec for `.env` parameter files.
#[derive(Debug, Default)]
pub struct DotenvCodec;

impl FileCodec for DotenvCodec {
    fn name(&self) -> &'static str {
        "dotenv"
    }

    fn parse(&self, source: &str) -> Result<ParameterNode, ParseError> {
        let mut map = ParameterMap::new();
        for line in source.lines() {
            if line.trim_start().starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                map.insert(key.to_string(), ParameterNode::Str(value.to_string()));
            }
        }
        Ok(ParameterNode::Map(map))
    }

    fn dump(&self, doc: &ParameterNode) -> Result<String, ParseError> {
        let Some(map) = doc.as_map() else {
            return Err(ParseError::new(
                self.name(),
                "only a flat mapping can be written as a dotenv file",
            ));
        };

        let mut out = String::from(AUTO_GENERATION_BANNER);
        out.push('\n');
        for (key, value) in map {
            out.push_str(key);
            out.push('=');
            out.push_str(&raw_value(key, value)?);
            out.push('\n');
        }
        Ok(out)
    }

    fn supports(&self, extension: &str) -> bool {
        extension == "env"
    }
}

/// Renders a leaf value as raw text. Nested values cannot be represented.
fn raw_value(key: &str, value: &ParameterNode) -> Result<String, ParseError> {
    match value {
        ParameterNode::Null => Ok(String::new()),
        ParameterNode::Bool(b) => Ok(b.to_string()),
        ParameterNode::Int(i) => Ok(i.to_string()),
        ParameterNode::Float(f) => Ok(format!("{f:?}")),
        ParameterNode::Str(s) => Ok(s.clone()),
        ParameterNode::List(_) | ParameterNode::Map(_) => Err(ParseError::new(
            "dotenv",
            format!("the value of \"{key}\" cannot be written to a flat dotenv file"),
        )),
    }
}
