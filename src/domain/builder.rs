//! Tree Builder
//!
//! Expands a parser AST (a JSON object per node) into a [`NodeTree`]. Nested objects that carry
//! a `type` become children tagged with their field name; scalars, `range` and `regex` become
//! attributes of the node that holds them.

use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::domain::node::{Attribute, NodeId, NodeTree};
use crate::error::{JastError, Result};

/// Scalar fields the parser is known to emit, plus list fields that may be empty.
const KNOWN_ATTRIBUTE_FIELDS: &[&str] = &[
    "name", "value", "raw", "regex", "range", "operator", "prefix", "computed", "kind",
    "static", "method", "shorthand", "async", "generator", "expression", "sourceType",
    "delegate", "directive", "tail", "optional", "meta", "params", "body", "arguments",
    "elements", "properties", "declarations", "expressions", "quasis", "specifiers", "cases",
    "consequent", "handlers", "guardedHandlers", "defaults", "leadingComments",
    "trailingComments", "innerComments", "comments", "tokens",
];

pub struct TreeBuilder;

impl TreeBuilder {
    /// Expand `ast` into `tree`, whose root stands for `ast` itself.
    ///
    /// The tree is taken by value and handed back sealed. A tree that has already been built
    /// (or grown by hand) is rejected, so every file gets its own root and id sequence.
    pub fn build(tree: NodeTree, ast: &Map<String, Value>) -> Result<NodeTree> {
        Self::expand(tree, |tree| Frame::object(tree.root_id(), ast))
    }

    /// Expand a program given only its top-level statements, as if they were the `body` field
    /// of the root.
    pub fn build_program(tree: NodeTree, body: &[Value]) -> Result<NodeTree> {
        Self::expand(tree, |tree| {
            let root = tree.root_id();
            if body.is_empty() {
                tree.set_attribute(root, "body", Attribute::EmptyList);
            }
            Frame::list(root, "body", body)
        })
    }

    fn expand<'a>(
        mut tree: NodeTree,
        start: impl FnOnce(&mut NodeTree) -> Frame<'a>,
    ) -> Result<NodeTree> {
        if tree.is_built() || tree.len() > 1 {
            return Err(JastError::SharedRootReuse(tree.root().kind.clone()));
        }

        // Depth-first with an explicit stack: a child's fields are finished before the parent
        // moves on, so ids still follow pre-order however deep the AST nests.
        let mut stack = vec![start(&mut tree)];
        while let Some(frame) = stack.last_mut() {
            match frame.advance(&mut tree) {
                Step::Descend(child, obj) => stack.push(Frame::object(child, obj)),
                Step::Continue => {}
                Step::Done => {
                    stack.pop();
                }
            }
        }
        tree.seal();

        debug!("Built tree rooted at {} with {} nodes", tree.root().kind, tree.len());
        Ok(tree)
    }
}

enum Step<'a> {
    Descend(NodeId, &'a Map<String, Value>),
    Continue,
    Done,
}

/// Expansion state of one node: its remaining fields, and the list field being walked.
struct Frame<'a> {
    id: NodeId,
    fields: Option<serde_json::map::Iter<'a>>,
    list: Option<(&'a str, std::slice::Iter<'a, Value>)>,
}

impl<'a> Frame<'a> {
    fn object(id: NodeId, fields: &'a Map<String, Value>) -> Self {
        Self {
            id,
            fields: Some(fields.iter()),
            list: None,
        }
    }

    fn list(id: NodeId, key: &'a str, items: &'a [Value]) -> Self {
        Self {
            id,
            fields: None,
            list: Some((key, items.iter())),
        }
    }

    fn advance(&mut self, tree: &mut NodeTree) -> Step<'a> {
        if let Some((key, items)) = self.list.as_mut() {
            let key = *key;
            for item in items.by_ref() {
                let Value::Object(obj) = item else { continue };
                match node_kind(obj) {
                    Some(kind) => {
                        let child = tree.add_child(self.id, kind.to_string(), key, true);
                        return Step::Descend(child, obj);
                    }
                    None => {
                        trace!("Skipping untyped element in field `{}` of node {}", key, self.id)
                    }
                }
            }
            self.list = None;
        }

        let Some((key, value)) = self.fields.as_mut().and_then(Iterator::next) else {
            return Step::Done;
        };
        let id = self.id;

        match key.as_str() {
            "type" => return Step::Continue,
            "range" => {
                match positional_range(value) {
                    Some(attr) => tree.set_attribute(id, key, attr),
                    None => debug!("Ignoring malformed range on node {}: {}", id, value),
                }
                return Step::Continue;
            }
            "regex" => {
                tree.set_attribute(id, key, regex_attribute(value));
                return Step::Continue;
            }
            _ => {}
        }

        match value {
            Value::Object(obj) => match node_kind(obj) {
                Some(kind) => {
                    let child = tree.add_child(id, kind.to_string(), key, false);
                    return Step::Descend(child, obj);
                }
                None => trace!("Skipping untyped object in field `{}` of node {}", key, id),
            },
            Value::Array(items) if items.is_empty() => {
                check_field(key);
                tree.set_attribute(id, key, Attribute::EmptyList);
            }
            Value::Array(items) => self.list = Some((key.as_str(), items.iter())),
            scalar => {
                check_field(key);
                tree.set_attribute(id, key, scalar_attribute(scalar));
            }
        }
        Step::Continue
    }
}

fn node_kind(obj: &Map<String, Value>) -> Option<&str> {
    obj.get("type").and_then(Value::as_str)
}

fn check_field(key: &str) {
    if !KNOWN_ATTRIBUTE_FIELDS.contains(&key) {
        debug!("Storing attribute with unrecognised field name `{}`", key);
    }
}

/// Convert a JSON scalar. Only called on non-container values.
fn scalar_attribute(value: &Value) -> Attribute {
    match value {
        Value::String(s) => Attribute::Str(s.clone()),
        Value::Bool(b) => Attribute::Bool(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Attribute::Int(i),
            None => Attribute::Float(n.as_f64().unwrap_or(f64::NAN)),
        },
        _ => Attribute::Null,
    }
}

/// `[start, end]` on nodes, `{"0": start, "1": end}` on comment ranges.
fn positional_range(value: &Value) -> Option<Attribute> {
    let (start, end) = match value {
        Value::Array(bounds) if bounds.len() == 2 => (&bounds[0], &bounds[1]),
        Value::Object(bounds) => (bounds.get("0")?, bounds.get("1")?),
        _ => return None,
    };
    Some(Attribute::Range(start.as_u64()?, end.as_u64()?))
}

fn regex_attribute(value: &Value) -> Attribute {
    match value {
        Value::Object(obj) => Attribute::Regex {
            pattern: obj.get("pattern").and_then(Value::as_str).unwrap_or_default().to_string(),
            flags: obj.get("flags").and_then(Value::as_str).unwrap_or_default().to_string(),
        },
        other => scalar_attribute(other),
    }
}
