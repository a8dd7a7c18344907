//! Feature Extractor
//!
//! Walks a built [`NodeTree`] in pre-order and emits `(context, value)` tuples: the category
//! of an informative node paired with the first identifier below it, or a literal's sub-type
//! paired with its value.

use std::fmt;
use std::hash::{Hash, Hasher};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::node::{Attribute, Node, NodeTree};
use crate::domain::units::{category, Category, Unit};
use crate::error::{JastError, Result};

const EXPRESSION_STATEMENT: &str = "ExpressionStatement";
const MEMBER_EXPRESSION: &str = "MemberExpression";
const THIS_EXPRESSION: &str = "ThisExpression";
const IDENTIFIER: &str = "Identifier";

/// Value half of a feature tuple.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FeatureValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Null,
}

// Floats compare by bit pattern so tuples can key a map.
impl PartialEq for FeatureValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (FeatureValue::Str(a), FeatureValue::Str(b)) => a == b,
            (FeatureValue::Int(a), FeatureValue::Int(b)) => a == b,
            (FeatureValue::Float(a), FeatureValue::Float(b)) => a.to_bits() == b.to_bits(),
            (FeatureValue::Bool(a), FeatureValue::Bool(b)) => a == b,
            (FeatureValue::Null, FeatureValue::Null) => true,
            _ => false,
        }
    }
}

impl Eq for FeatureValue {}

impl Hash for FeatureValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            FeatureValue::Str(s) => s.hash(state),
            FeatureValue::Int(i) => i.hash(state),
            FeatureValue::Float(f) => f.to_bits().hash(state),
            FeatureValue::Bool(b) => b.hash(state),
            FeatureValue::Null => {}
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeatureValue::Str(s) => write!(f, "{}", s),
            FeatureValue::Int(i) => write!(f, "{}", i),
            FeatureValue::Float(x) => write!(f, "{}", x),
            FeatureValue::Bool(b) => write!(f, "{}", b),
            FeatureValue::Null => write!(f, "null"),
        }
    }
}

/// One unit of syntactic/lexical signal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeatureTuple {
    pub context: String,
    pub value: FeatureValue,
}

impl FeatureTuple {
    pub fn new(context: impl Into<String>, value: FeatureValue) -> Self {
        Self {
            context: context.into(),
            value,
        }
    }
}

impl fmt::Display for FeatureTuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.context, self.value)
    }
}

/// Sub-type of a `Literal` node, used as the tuple context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    String,
    Int,
    Numeric,
    Bool,
    Null,
    RegExp,
}

impl LiteralKind {
    pub fn label(&self) -> &'static str {
        match self {
            LiteralKind::String => "String",
            LiteralKind::Int => "Int",
            LiteralKind::Numeric => "Numeric",
            LiteralKind::Bool => "Bool",
            LiteralKind::Null => "Null",
            LiteralKind::RegExp => "RegExp",
        }
    }
}

/// Sub-type and value of a literal node, from its `value` or `regex` attribute.
pub fn literal_feature(node: &Node) -> Result<(LiteralKind, FeatureValue)> {
    let typed = match node.attribute("value") {
        Some(Attribute::Str(s)) => Some((LiteralKind::String, FeatureValue::Str(s.clone()))),
        Some(Attribute::Int(i)) => Some((LiteralKind::Int, FeatureValue::Int(*i))),
        Some(Attribute::Float(x)) => Some((LiteralKind::Numeric, FeatureValue::Float(*x))),
        Some(Attribute::Bool(b)) => Some((LiteralKind::Bool, FeatureValue::Bool(*b))),
        Some(Attribute::Null) => Some((LiteralKind::Null, FeatureValue::Null)),
        _ => None,
    };
    if let Some(found) = typed {
        return Ok(found);
    }

    if let Some(Attribute::Regex { pattern, .. }) = node.attribute("regex") {
        return Ok((LiteralKind::RegExp, FeatureValue::Str(pattern.clone())));
    }

    let raw = node
        .attribute("raw")
        .and_then(Attribute::as_str)
        .unwrap_or(node.kind.as_str());
    Err(JastError::UnknownLiteralType { raw: raw.to_string() })
}

/// Ordered tuples emitted for one tree, duplicates retained.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    pub tuples: Vec<FeatureTuple>,
}

impl FeatureSet {
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    pub fn frequencies(&self) -> FeatureMap {
        FeatureMap::from_tuples(&self.tuples)
    }
}

/// Occurrence count per distinct tuple, in first-emission order, plus the total tuple count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureMap {
    counts: IndexMap<FeatureTuple, usize>,
    total: usize,
}

impl FeatureMap {
    pub fn from_tuples(tuples: &[FeatureTuple]) -> Self {
        let mut counts: IndexMap<FeatureTuple, usize> = IndexMap::new();
        for tuple in tuples {
            *counts.entry(tuple.clone()).or_insert(0) += 1;
        }
        Self {
            counts,
            total: tuples.len(),
        }
    }

    /// Number of tuples emitted, duplicates included.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of distinct tuples.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn count(&self, tuple: &FeatureTuple) -> usize {
        self.counts.get(tuple).copied().unwrap_or(0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FeatureTuple, usize)> {
        self.counts.iter().map(|(t, c)| (t, *c))
    }

    pub fn tuples(&self) -> impl Iterator<Item = &FeatureTuple> {
        self.counts.keys()
    }
}

pub struct FeatureExtractor;

impl FeatureExtractor {
    /// Emit the feature tuples of `tree` in pre-order.
    ///
    /// Fails only when a node kind is missing from the unit table; the whole file is then
    /// abandoned rather than silently under-counted.
    pub fn extract(tree: &NodeTree) -> Result<FeatureSet> {
        let mut tuples = Vec::new();
        let first_identifier = tree.first_descendants(IDENTIFIER);

        for node in tree.preorder(tree.root_id()) {
            let cat = match category(&node.kind)? {
                Unit::NonInformative => continue,
                Unit::Informative(cat) => cat,
            };

            if cat == Category::Literal {
                match literal_feature(node) {
                    Ok((kind, value)) => tuples.push(FeatureTuple::new(kind.label(), value)),
                    Err(e) => warn!("{}", e),
                }
                continue;
            }

            if Self::is_suppressed(tree, node)? {
                continue;
            }

            let Some(ident) = first_identifier[node.id.0].map(|id| tree.node(id)) else {
                continue;
            };
            let Some(name) = ident.attribute("name").and_then(Attribute::as_str) else {
                debug!("Identifier {} has no name", ident.id);
                continue;
            };

            let context = if Self::is_this_access(tree, node) {
                Category::This.label()
            } else {
                cat.label()
            };
            tuples.push(FeatureTuple::new(context, FeatureValue::Str(name.to_string())));
        }

        Ok(FeatureSet { tuples })
    }

    /// Convenience wrapper: extract and count in one go.
    pub fn frequencies(tree: &NodeTree) -> Result<FeatureMap> {
        Ok(Self::extract(tree)?.frequencies())
    }

    /// An expression statement defers to its informative expression.
    fn is_suppressed(tree: &NodeTree, node: &Node) -> Result<bool> {
        if node.kind != EXPRESSION_STATEMENT {
            return Ok(false);
        }
        match tree.first_child(node.id) {
            Some(child) => Ok(category(&child.kind)?.is_informative()),
            None => Ok(false),
        }
    }

    /// `this.x` rather than a generic member access.
    fn is_this_access(tree: &NodeTree, node: &Node) -> bool {
        node.kind == MEMBER_EXPRESSION
            && tree
                .first_child(node.id)
                .map_or(false, |child| child.kind == THIS_EXPRESSION)
    }
}
