use crate::api::dto::FeatureReportDto;
use crate::domain::ast::RawAstDescriptor;
use crate::error::Result;
use std::path::Path;

pub mod report_exporter;

/// Source of parser ASTs, one per input file.
/// Shared across corpus workers, so implementations must be Send + Sync.
pub trait AstProvider: Send + Sync {
    fn provide(&self, path: &Path) -> Result<RawAstDescriptor>;
}

pub trait ReportExporter {
    fn render(&self, report: &FeatureReportDto) -> std::io::Result<String>;

    /// Reports one after another, each ending in a newline.
    fn render_all(&self, reports: &[FeatureReportDto]) -> std::io::Result<String> {
        let mut out = String::new();
        for report in reports {
            out.push_str(&self.render(report)?);
            if !out.ends_with('\n') {
                out.push('\n');
            }
        }
        Ok(out)
    }

    fn export(&self, reports: &[FeatureReportDto], path: &Path) -> std::io::Result<()> {
        std::fs::write(path, self.render_all(reports)?)
    }
}
