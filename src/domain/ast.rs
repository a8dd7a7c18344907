// Raw AST as emitted by the external JavaScript parser.
// Esprima's `parse(src, {range: true, tokens: true, comment: true})` output, validated for shape.

use std::ops::Deref;

use serde::Deserialize;
use serde_json::Value;

use crate::domain::builder::TreeBuilder;
use crate::domain::node::NodeTree;
use crate::error::Result;

/// Top-level parser output for one file.
///
/// Every key but `leadingComments` is required; a document missing one is rejected at
/// deserialization time.
#[derive(Debug, Deserialize)]
pub struct RawAstDescriptor {
    #[serde(rename = "type")]
    pub kind: String,
    pub body: AstBody,
    #[serde(rename = "sourceType")]
    pub source_type: String,
    pub range: (u64, u64),
    pub tokens: Vec<Value>,
    pub comments: Vec<Value>,
    #[serde(rename = "leadingComments", default)]
    pub leading_comments: Vec<Value>,
}

impl RawAstDescriptor {
    /// Parse and validate one JSON document.
    ///
    /// Esprima trees for long concatenation chains nest far deeper than serde_json's default
    /// limit, so the limit is lifted and decoding grows its stack on the heap as it descends.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        let mut de = serde_json::Deserializer::from_str(text);
        de.disable_recursion_limit();
        let descriptor = Self::deserialize(serde_stacker::Deserializer::new(&mut de))?;
        de.end()?;
        Ok(descriptor)
    }

    /// Build a fresh node tree for this file.
    pub fn to_tree(&self) -> Result<NodeTree> {
        TreeBuilder::build_program(NodeTree::new(self.kind.clone()), &self.body)
    }
}

/// Top-level statements of a program.
///
/// Released iteratively on drop: a statement may nest deeper than the stack allows.
#[derive(Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct AstBody(Vec<Value>);

impl Deref for AstBody {
    type Target = [Value];

    fn deref(&self) -> &[Value] {
        &self.0
    }
}

impl Drop for AstBody {
    fn drop(&mut self) {
        release_values(std::mem::take(&mut self.0));
    }
}

/// Drop JSON values one level at a time instead of recursing once per nesting level.
pub fn release_values(values: Vec<Value>) {
    let mut stack = values;
    while let Some(value) = stack.pop() {
        match value {
            Value::Object(fields) => stack.extend(fields.into_iter().map(|(_, v)| v)),
            Value::Array(items) => stack.extend(items),
            _ => {}
        }
    }
}
