use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

pub struct SourceLoader;

impl SourceLoader {
    /// Every regular file directly inside `dir`, sorted by path.
    /// Subdirectories are not descended into; each sample of a corpus sits at the top level.
    pub fn collect_sources(dir: &Path) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let entries = fs::read_dir(dir)
            .with_context(|| format!("Failed to read sample directory {}", dir.display()))?;
        for entry in entries {
            let entry = entry?;
            let path = entry.path();
            if path.is_file() {
                files.push(path);
            }
        }

        files.sort();
        Ok(files)
    }
}
