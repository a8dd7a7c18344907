//! End-to-end extraction over an Esprima AST fixture.
//! Covers tree shape, emission rules and frequency counting without the external parser.

use jast::application::{features_from_descriptor, FeatureUsecase};
use jast::domain::ast::RawAstDescriptor;
use jast::domain::builder::TreeBuilder;
use jast::domain::features::{FeatureExtractor, FeatureTuple, FeatureValue};
use jast::domain::node::{Attribute, NodeTree};
use jast::ports::AstProvider;
use jast::JastError;
use std::fs;
use std::path::{Path, PathBuf};

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures").join(name)
}

fn sample_ast() -> RawAstDescriptor {
    let text = fs::read_to_string(fixture("sample.json")).unwrap();
    RawAstDescriptor::from_json(&text).unwrap()
}

fn str_tuple(context: &str, value: &str) -> FeatureTuple {
    FeatureTuple::new(context, FeatureValue::Str(value.to_string()))
}

#[test]
fn test_descriptor_fields() {
    let ast = sample_ast();
    assert_eq!(ast.kind, "Program");
    assert_eq!(ast.source_type, "script");
    assert_eq!(ast.body.len(), 7);
    assert_eq!(ast.comments.len(), 1);
    assert!(ast.leading_comments.is_empty());
}

#[test]
fn test_ids_are_unique_and_increasing() {
    let tree = sample_ast().to_tree().unwrap();
    let ids: Vec<usize> = tree.iter().map(|n| n.id.0).collect();
    assert!(ids.windows(2).all(|w| w[0] < w[1]));
    // construction is depth-first, so pre-order visits ids in order as well
    let preorder: Vec<usize> = tree.preorder(tree.root_id()).map(|n| n.id.0).collect();
    assert_eq!(preorder, ids);
}

#[test]
fn test_structural_fidelity() {
    let tree = sample_ast().to_tree().unwrap();
    let root = tree.root();
    assert_eq!(root.children().len(), 7);
    assert!(tree.children(root.id).all(|c| c.from_list && c.field_tag.as_deref() == Some("body")));

    let declaration = tree.node(root.children()[2]);
    assert_eq!(declaration.kind, "VariableDeclaration");
    assert_eq!(declaration.attribute("kind"), Some(&Attribute::Str("var".into())));
    assert_eq!(declaration.attribute("range"), Some(&Attribute::Range(26, 38)));

    let declarator = tree.first_child(declaration.id).unwrap();
    assert!(declarator.from_list);
    let tags: Vec<_> = tree
        .children(declarator.id)
        .map(|c| (c.field_tag.clone().unwrap(), c.from_list))
        .collect();
    assert_eq!(tags, vec![("id".to_string(), false), ("init".to_string(), false)]);

    let first_call = tree.first_child(root.children()[0]).unwrap();
    assert_eq!(first_call.attribute("arguments"), Some(&Attribute::EmptyList));
}

#[test]
fn test_sample_tuples() {
    let tree = sample_ast().to_tree().unwrap();
    let features = FeatureExtractor::extract(&tree).unwrap();

    assert_eq!(
        features.tuples,
        vec![
            str_tuple("Call", "foo"),
            str_tuple("This", "bar"),
            str_tuple("Variable", "s"),
            str_tuple("String", "s"),
            str_tuple("Assign", "x"),
            FeatureTuple::new("Int", FeatureValue::Int(42)),
            str_tuple("RegExp", "ab"),
            FeatureTuple::new("Null", FeatureValue::Null),
            str_tuple("Call", "foo"),
            FeatureTuple::new("Numeric", FeatureValue::Float(1.5)),
        ]
    );
    assert!(features.tuples.iter().all(|t| t.context != "ExpressionStatement"));
    assert!(features.tuples.iter().all(|t| t.context != "Object"));
}

#[test]
fn test_frequency_map() {
    let map = features_from_descriptor(&sample_ast()).unwrap();
    assert_eq!(map.total(), 10);
    assert_eq!(map.len(), 9);
    assert_eq!(map.count(&str_tuple("Call", "foo")), 2);
    assert_eq!(map.iter().map(|(_, c)| c).sum::<usize>(), map.total());
}

#[test]
fn test_extraction_is_deterministic() {
    let tree = sample_ast().to_tree().unwrap();
    let first = FeatureExtractor::extract(&tree).unwrap();
    let second = FeatureExtractor::extract(&tree).unwrap();
    assert_eq!(first, second);
    assert_eq!(first.frequencies(), second.frequencies());
}

#[test]
fn test_each_file_needs_its_own_root() {
    let ast = sample_ast();
    let tree = TreeBuilder::build_program(NodeTree::new("Program"), &ast.body).unwrap();
    let again = TreeBuilder::build_program(tree, &ast.body);
    assert!(matches!(again, Err(JastError::SharedRootReuse(_))));

    // two fresh builds are independent and number their nodes identically
    let a = ast.to_tree().unwrap();
    let b = ast.to_tree().unwrap();
    assert_eq!(a.len(), b.len());
    assert_eq!(a.root().id, b.root().id);
}

#[test]
fn test_built_tree_is_shareable_across_threads() {
    let tree = sample_ast().to_tree().unwrap();
    let expected = FeatureExtractor::extract(&tree).unwrap();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..4)
            .map(|_| s.spawn(|| FeatureExtractor::extract(&tree).unwrap()))
            .collect();
        for handle in handles {
            assert_eq!(handle.join().unwrap(), expected);
        }
    });
}

struct FixtureProvider;

impl AstProvider for FixtureProvider {
    fn provide(&self, path: &Path) -> jast::Result<RawAstDescriptor> {
        if path.ends_with("sample.js") {
            Ok(sample_ast())
        } else {
            Err(JastError::parse_failure(path, "exit status: 1"))
        }
    }
}

#[test]
fn test_failed_parse_yields_no_features() {
    let usecase = FeatureUsecase { provider: &FixtureProvider };
    assert!(usecase.extract_file(&fixture("missing.js")).is_none());

    let features = usecase.extract_file(&fixture("sample.js")).unwrap();
    assert_eq!(features.total(), 10);
}
