//! Unit Classifier
//!
//! Static table from Esprima node kinds to feature categories.

use crate::error::{JastError, Result};

/// Feature category attached to an informative node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Array,
    Assign,
    Await,
    Call,
    Catch,
    Class,
    Comment,
    Debug,
    Expression,
    ExpressionStatement,
    For,
    Function,
    If,
    Import,
    Label,
    /// Sentinel: the context is the literal's sub-type, not this label.
    Literal,
    New,
    Object,
    Property,
    Return,
    Super,
    Switch,
    SwitchCase,
    This,
    Throw,
    Try,
    Variable,
    While,
    With,
    Yield,
}

impl Category {
    /// Context label used in emitted feature tuples.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Array => "Array",
            Category::Assign => "Assign",
            Category::Await => "Await",
            Category::Call => "Call",
            Category::Catch => "Catch",
            Category::Class => "Class",
            Category::Comment => "Comment",
            Category::Debug => "Debug",
            Category::Expression => "Expression",
            Category::ExpressionStatement => "ExpressionStatement",
            Category::For => "For",
            Category::Function => "Function",
            Category::If => "If",
            Category::Import => "Import",
            Category::Label => "Label",
            Category::Literal => "Literal",
            Category::New => "New",
            Category::Object => "Object",
            Category::Property => "Property",
            Category::Return => "Return",
            Category::Super => "Super",
            Category::Switch => "Switch",
            Category::SwitchCase => "SwitchCase",
            Category::This => "This",
            Category::Throw => "Throw",
            Category::Try => "Try",
            Category::Variable => "Variable",
            Category::While => "While",
            Category::With => "With",
            Category::Yield => "Yield",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Classification of a node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    /// Structural wrapper: emits nothing, but is still descended into.
    NonInformative,
    Informative(Category),
}

impl Unit {
    pub fn is_informative(&self) -> bool {
        matches!(self, Unit::Informative(_))
    }
}

/// Every node kind the upstream parser can produce.
pub const KNOWN_KINDS: &[&str] = &[
    "ArrayExpression", "ArrayPattern", "ArrowFunctionExpression", "AssignmentExpression",
    "AssignmentPattern", "AwaitExpression", "BinaryExpression", "Block", "BlockStatement",
    "BreakStatement", "CallExpression", "CatchClause", "ClassBody", "ClassDeclaration",
    "ClassExpression", "ConditionalExpression", "ContinueStatement", "DebuggerStatement",
    "DoWhileStatement", "EmptyStatement", "ExportAllDeclaration", "ExportDefaultDeclaration",
    "ExportNamedDeclaration", "ExportSpecifier", "ExpressionStatement", "ForInStatement",
    "ForOfStatement", "ForStatement", "FunctionDeclaration", "FunctionExpression", "Identifier",
    "IfStatement", "Import", "ImportDeclaration", "ImportDefaultSpecifier",
    "ImportNamespaceSpecifier", "ImportSpecifier", "LabeledStatement", "Line", "Literal",
    "LogicalExpression", "MemberExpression", "MetaProperty", "MethodDefinition", "NewExpression",
    "ObjectExpression", "ObjectPattern", "Program", "Property", "RestElement", "ReturnStatement",
    "SequenceExpression", "SpreadElement", "Super", "SwitchCase", "SwitchStatement",
    "TaggedTemplateExpression", "TemplateElement", "TemplateLiteral", "ThisExpression",
    "ThrowStatement", "TryStatement", "UnaryExpression", "UpdateExpression",
    "VariableDeclaration", "VariableDeclarator", "WhileStatement", "WithStatement",
    "YieldExpression",
];

/// Look up the category of a node kind.
///
/// An unmapped kind is a defect in this table, never a soft failure: callers must abort
/// the file instead of defaulting to [`Unit::NonInformative`].
pub fn category(kind: &str) -> Result<Unit> {
    use Category::*;
    let unit = match kind {
        "ArrayExpression" | "ArrayPattern" => Unit::Informative(Array),
        "ArrowFunctionExpression"
        | "BinaryExpression"
        | "ClassExpression"
        | "LogicalExpression"
        | "SequenceExpression"
        | "TaggedTemplateExpression"
        | "UnaryExpression"
        | "UpdateExpression" => Unit::Informative(Expression),
        "AssignmentExpression" | "AssignmentPattern" => Unit::Informative(Assign),
        "AwaitExpression" => Unit::Informative(Await),
        "Block" | "Line" => Unit::Informative(Comment),
        "CallExpression" => Unit::Informative(Call),
        "CatchClause" => Unit::Informative(Catch),
        "ClassDeclaration" => Unit::Informative(Class),
        "ConditionalExpression" | "IfStatement" => Unit::Informative(If),
        "DebuggerStatement" => Unit::Informative(Debug),
        "DoWhileStatement" | "WhileStatement" => Unit::Informative(While),
        "ExpressionStatement" => Unit::Informative(ExpressionStatement),
        "ForInStatement" | "ForOfStatement" | "ForStatement" => Unit::Informative(For),
        "FunctionDeclaration" | "FunctionExpression" => Unit::Informative(Function),
        "Import" | "ImportDeclaration" => Unit::Informative(Import),
        "LabeledStatement" => Unit::Informative(Label),
        "Literal" => Unit::Informative(Literal),
        "MemberExpression" | "ObjectExpression" | "ObjectPattern" => Unit::Informative(Object),
        "NewExpression" => Unit::Informative(New),
        "Property" => Unit::Informative(Property),
        "ReturnStatement" => Unit::Informative(Return),
        "Super" => Unit::Informative(Super),
        "SwitchCase" => Unit::Informative(SwitchCase),
        "SwitchStatement" => Unit::Informative(Switch),
        "ThisExpression" => Unit::Informative(This),
        "ThrowStatement" => Unit::Informative(Throw),
        "TryStatement" => Unit::Informative(Try),
        "VariableDeclaration" => Unit::Informative(Variable),
        "WithStatement" => Unit::Informative(With),
        "YieldExpression" => Unit::Informative(Yield),
        "BlockStatement"
        | "BreakStatement"
        | "ClassBody"
        | "ContinueStatement"
        | "EmptyStatement"
        | "ExportAllDeclaration"
        | "ExportDefaultDeclaration"
        | "ExportNamedDeclaration"
        | "ExportSpecifier"
        | "Identifier"
        | "ImportDefaultSpecifier"
        | "ImportNamespaceSpecifier"
        | "ImportSpecifier"
        | "MetaProperty"
        | "MethodDefinition"
        | "Program"
        | "RestElement"
        | "SpreadElement"
        | "TemplateElement"
        | "TemplateLiteral"
        | "VariableDeclarator" => Unit::NonInformative,
        other => return Err(JastError::MissingCategoryMapping(other.to_string())),
    };
    Ok(unit)
}
