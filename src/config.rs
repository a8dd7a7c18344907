// Configuration for jast, read from an optional TOML file.
// Every key has a default, so an empty file (or no file) is a valid configuration.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{JastError, Result};

/// Marker the parser script writes between documents on stdout.
pub const STREAM_DELIMITER: &str = "##!!**##";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JastConfig {
    pub parser: ParserConfig,
    pub extraction: ExtractionConfig,
    pub corpus: CorpusConfig,
}

/// How the external parser is invoked: `<program> <script> <input> <target>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub program: String,
    pub script: PathBuf,
    pub delimiter: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            program: "node".to_string(),
            script: PathBuf::from("js_ast.js"),
            delimiter: STREAM_DELIMITER.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Keep the intermediate JSON file after a successful load.
    pub retain_json: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Worker count for corpus runs; half the cores when unset.
    pub workers: Option<usize>,
    /// Directory holding the feature preselection stores.
    pub analysis_path: PathBuf,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            workers: None,
            analysis_path: PathBuf::from("Analysis"),
        }
    }
}

impl JastConfig {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: JastConfig =
            toml::from_str(text).map_err(|e| JastError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| JastError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.parser.program.trim().is_empty() {
            return Err(JastError::Config("parser.program must not be empty".into()));
        }
        if self.parser.delimiter.is_empty() {
            return Err(JastError::Config("parser.delimiter must not be empty".into()));
        }
        if self.corpus.workers == Some(0) {
            return Err(JastError::Config("corpus.workers must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = JastConfig::from_toml_str("").unwrap();
        assert_eq!(config, JastConfig::default());
        assert_eq!(config.parser.program, "node");
        assert_eq!(config.parser.delimiter, "##!!**##");
        assert!(!config.extraction.retain_json);
    }

    #[test]
    fn test_partial_override() {
        let config = JastConfig::from_toml_str(
            r#"
            [parser]
            script = "tools/js_ast.js"

            [corpus]
            workers = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.parser.program, "node");
        assert_eq!(config.parser.script, PathBuf::from("tools/js_ast.js"));
        assert_eq!(config.corpus.workers, Some(3));
        assert_eq!(config.corpus.analysis_path, PathBuf::from("Analysis"));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = JastConfig::from_toml_str("[corpus]\nworkers = 0\n").unwrap_err();
        assert!(matches!(err, JastError::Config(_)));
    }

    #[test]
    fn test_invalid_toml_rejected() {
        assert!(JastConfig::from_toml_str("[parser\nprogram=").is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("jast.toml");
        fs::write(&path, "[extraction]\nretain_json = true\n").unwrap();

        let config = JastConfig::load_or_default(Some(&path)).unwrap();
        assert!(config.extraction.retain_json);
        assert!(JastConfig::load(&dir.path().join("missing.toml")).is_err());
    }
}
