//! External JavaScript parser runner.
//!
//! Runs `<program> <script> <input> <target>` (by default `node js_ast.js`), which writes the
//! Esprima AST of `<input>` either to stdout (target `1`) or to the JSON file `<target>`.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use tempfile::TempDir;
use tracing::{debug, error, warn};

use crate::config::ParserConfig;
use crate::domain::ast::RawAstDescriptor;
use crate::error::{JastError, Result};
use crate::ports::AstProvider;

/// Target argument asking the parser to print to stdout instead of writing a file.
pub const STDOUT_TARGET: &str = "1";

// ═══════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ParserRunner {
    config: ParserConfig,
}

impl ParserRunner {
    pub fn new(config: &ParserConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    /// Streaming mode: the raw JSON blocks the parser printed, split on the delimiter.
    pub fn stream_blocks(&self, input: &Path) -> Result<Vec<String>> {
        let output = self.run(input, None)?;
        let stdout = String::from_utf8(output.stdout).map_err(|e| {
            error!("Parser output for {} is not valid UTF-8", input.display());
            JastError::parse_failure(input, format!("stdout is not valid UTF-8: {}", e))
        })?;
        Ok(split_stream(&stdout, &self.config.delimiter))
    }

    /// File-backed mode: parse the JSON file the parser wrote to `json_path`.
    ///
    /// The file is removed after a successful load unless `retain_json` is set.
    pub fn load_file(
        &self,
        input: &Path,
        json_path: &Path,
        retain_json: bool,
    ) -> Result<RawAstDescriptor> {
        self.run(input, Some(json_path))?;

        let text = fs::read_to_string(json_path).map_err(|e| {
            error!("Parser did not leave a readable AST for {}", input.display());
            JastError::parse_failure(input, format!("cannot read {}: {}", json_path.display(), e))
        })?;

        let descriptor = RawAstDescriptor::from_json(&text).map_err(|e| {
            error!("Malformed AST for {}: {}", input.display(), e);
            JastError::parse_failure(input, e.to_string())
        })?;

        if !retain_json {
            if let Err(e) = fs::remove_file(json_path) {
                warn!("Could not remove {}: {}", json_path.display(), e);
            }
        }

        debug!(
            "Loaded AST for {} ({} top-level statements)",
            input.display(),
            descriptor.body.len()
        );
        Ok(descriptor)
    }

    fn run(&self, input: &Path, json_path: Option<&Path>) -> Result<Output> {
        let spec = build_command_spec(&self.config, input, json_path);
        let output = Command::new(&spec.program)
            .args(&spec.args)
            .output()
            .map_err(|e| {
                error!("Could not start {} for {}", spec.program, input.display());
                let reason = format!("failed to execute {}: {}", spec.program, e);
                JastError::parse_failure(input, reason)
            })?;

        if !output.status.success() {
            error!("Parser could not produce an AST for {}", input.display());
            let stderr = String::from_utf8_lossy(&output.stderr);
            let mut reason = format!("{} exited with {}", spec.program, output.status);
            if !stderr.trim().is_empty() {
                reason.push_str(": ");
                reason.push_str(stderr.trim());
            }
            return Err(JastError::parse_failure(input, reason));
        }
        Ok(output)
    }
}

/// Loader used by corpus runs: file-backed mode, with every intermediate JSON written to one
/// directory of its own instead of next to the sample.
#[derive(Debug)]
pub struct AstLoader {
    runner: ParserRunner,
    json_dir: PathBuf,
    retain_json: bool,
    // deleted together with the loader
    _scratch: Option<TempDir>,
}

impl AstLoader {
    /// Intermediate files go to a private temporary directory and are removed after each load.
    pub fn new(runner: ParserRunner) -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("jast-ast-")
            .tempdir()
            .map_err(|source| JastError::Io {
                path: std::env::temp_dir(),
                source,
            })?;
        Ok(Self {
            runner,
            json_dir: scratch.path().to_path_buf(),
            retain_json: false,
            _scratch: Some(scratch),
        })
    }

    /// Intermediate files are written to, and kept in, `json_dir`.
    pub fn retaining(runner: ParserRunner, json_dir: &Path) -> Result<Self> {
        fs::create_dir_all(json_dir).map_err(|source| JastError::Io {
            path: json_dir.to_path_buf(),
            source,
        })?;
        Ok(Self {
            runner,
            json_dir: json_dir.to_path_buf(),
            retain_json: true,
            _scratch: None,
        })
    }

    /// `<json_dir>/<file name>.json`. The whole file name is kept, so `a.js` and a sibling `a`
    /// never share a file.
    pub fn json_path(&self, input: &Path) -> PathBuf {
        let mut name = input
            .file_name()
            .unwrap_or_else(|| OsStr::new("ast"))
            .to_os_string();
        name.push(".json");
        self.json_dir.join(name)
    }
}

impl AstProvider for AstLoader {
    fn provide(&self, path: &Path) -> Result<RawAstDescriptor> {
        self.runner.load_file(path, &self.json_path(path), self.retain_json)
    }
}

/// Intermediate JSON path for a single `extract`: `a.js` becomes `a.json`, anything else gets
/// `.json` appended.
pub fn default_json_path(input: &Path) -> PathBuf {
    if input.extension().map_or(false, |ext| ext == "js") {
        input.with_extension("json")
    } else {
        let mut path = input.as_os_str().to_owned();
        path.push(".json");
        PathBuf::from(path)
    }
}

/// Split parser stdout into blocks. Newlines are dropped first, then the text is cut exactly
/// on `delimiter`.
pub fn split_stream(stdout: &str, delimiter: &str) -> Vec<String> {
    let joined = stdout.replace('\n', "");
    joined.split(delimiter).map(str::to_string).collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// Command Builder
// ═══════════════════════════════════════════════════════════════════════════

/// Describes the command that would be run for one input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserCommandSpec {
    pub program: String,
    pub args: Vec<String>,
}

pub fn build_command_spec(
    config: &ParserConfig,
    input: &Path,
    json_path: Option<&Path>,
) -> ParserCommandSpec {
    let target = json_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| STDOUT_TARGET.to_string());
    ParserCommandSpec {
        program: config.program.clone(),
        args: vec![config.script.display().to_string(), input.display().to_string(), target],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_json_path() {
        assert_eq!(default_json_path(Path::new("a/sample.js")), PathBuf::from("a/sample.json"));
        assert_eq!(default_json_path(Path::new("a/sample")), PathBuf::from("a/sample.json"));
        assert_eq!(
            default_json_path(Path::new("a/sample.txt")),
            PathBuf::from("a/sample.txt.json")
        );
    }

    #[test]
    fn test_split_stream_on_delimiter() {
        let out = "{\"a\":\n1}##!!**##{\"b\":2}\n";
        assert_eq!(split_stream(out, "##!!**##"), vec!["{\"a\":1}", "{\"b\":2}"]);
    }

    #[test]
    fn test_split_stream_is_exact() {
        // a partial marker is not a delimiter
        let out = "x##!!*y##!!**##z";
        assert_eq!(split_stream(out, "##!!**##"), vec!["x##!!*y", "z"]);
        assert_eq!(split_stream("single", "##!!**##"), vec!["single"]);
    }

    #[test]
    fn test_build_command_spec() {
        let config = ParserConfig::default();
        let spec = build_command_spec(&config, Path::new("in.js"), Some(Path::new("in.json")));
        assert_eq!(spec.program, "node");
        assert_eq!(spec.args, vec!["js_ast.js", "in.js", "in.json"]);

        let streaming = build_command_spec(&config, Path::new("in.js"), None);
        assert_eq!(streaming.args[2], STDOUT_TARGET);
    }

    #[test]
    fn test_loader_json_paths_are_distinct_per_file_name() {
        let loader = AstLoader::new(ParserRunner::new(&ParserConfig::default())).unwrap();
        let js = loader.json_path(Path::new("samples/a.js"));
        let bare = loader.json_path(Path::new("samples/a"));
        assert_ne!(js, bare);
        assert_eq!(js.file_name().unwrap(), "a.js.json");
        assert!(!js.starts_with("samples"));

        let scratch = js.parent().unwrap().to_path_buf();
        assert!(scratch.is_dir());
        drop(loader);
        assert!(!scratch.exists());
    }

    #[test]
    fn test_missing_program_is_a_parse_failure() {
        let config = ParserConfig {
            program: "jast-definitely-missing-parser".to_string(),
            ..ParserConfig::default()
        };
        let runner = ParserRunner::new(&config);
        let err = runner.stream_blocks(Path::new("in.js")).unwrap_err();
        assert!(matches!(err, JastError::ParseFailure { .. }));
    }
}
