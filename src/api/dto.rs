use serde::{Serialize, Deserialize};
use serde_json::Value;
use std::path::Path;
use crate::domain::features::{FeatureMap, FeatureTuple, FeatureValue};

/// Features of one file, in first-emission order.
#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureReportDto {
    pub file: String,
    pub total: usize,
    pub features: Vec<FeatureCountDto>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FeatureCountDto {
    pub context: String,
    pub value: Value,
    pub count: u64,
}

/// Document frequencies of one labelled corpus.
#[derive(Debug, Serialize, Deserialize)]
pub struct CorpusReportDto {
    pub label: String,
    pub files: usize,
    pub failed: usize,
    pub features: Vec<FeatureCountDto>,
}

impl FeatureCountDto {
    pub fn new(tuple: &FeatureTuple, count: u64) -> Self {
        Self {
            context: tuple.context.clone(),
            value: value_to_json(&tuple.value),
            count,
        }
    }
}

impl FeatureReportDto {
    pub fn new(file: &Path, map: &FeatureMap) -> Self {
        let features = map
            .iter()
            .map(|(tuple, count)| FeatureCountDto::new(tuple, count as u64))
            .collect();

        FeatureReportDto {
            file: file.display().to_string(),
            total: map.total(),
            features,
        }
    }
}

/// Feature values as plain JSON scalars; non-finite floats become null.
pub fn value_to_json(value: &FeatureValue) -> Value {
    match value {
        FeatureValue::Str(s) => Value::String(s.clone()),
        FeatureValue::Int(i) => Value::from(*i),
        FeatureValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        FeatureValue::Bool(b) => Value::Bool(*b),
        FeatureValue::Null => Value::Null,
    }
}
