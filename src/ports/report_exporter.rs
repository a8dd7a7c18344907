//! Feature Report Exporters
//!
//! Render a [`FeatureReportDto`] as pretty JSON or as tab-separated text.

use crate::api::dto::FeatureReportDto;
use crate::ports::ReportExporter;
use serde_json::Value;

pub struct JsonExporter;

impl ReportExporter for JsonExporter {
    fn render(&self, report: &FeatureReportDto) -> std::io::Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}

/// One `context<TAB>value<TAB>count` line per feature, after a `total<TAB>n` header.
pub struct TextExporter;

impl TextExporter {
    fn format_value(value: &Value) -> String {
        match value {
            Value::String(s) => Self::escape(s),
            other => other.to_string(),
        }
    }

    /// Keep one feature per line whatever the string literal contained.
    fn escape(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('\t', "\\t")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
    }
}

impl ReportExporter for TextExporter {
    fn render(&self, report: &FeatureReportDto) -> std::io::Result<String> {
        let mut lines = Vec::with_capacity(report.features.len() + 1);
        lines.push(format!("total\t{}", report.total));
        for feature in &report.features {
            lines.push(format!(
                "{}\t{}\t{}",
                feature.context,
                Self::format_value(&feature.value),
                feature.count
            ));
        }
        Ok(lines.join("\n") + "\n")
    }
}

/// Exporter for a `--format` value.
pub fn exporter_for(format: &str) -> Option<Box<dyn ReportExporter>> {
    match format.to_lowercase().as_str() {
        "json" => Some(Box::new(JsonExporter)),
        "text" | "txt" | "tsv" => Some(Box::new(TextExporter)),
        _ => None,
    }
}
