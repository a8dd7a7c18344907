// Use cases: one file, a stream of documents, or a whole corpus, from path to feature counts.

use std::path::{Path, PathBuf};
use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPool;
use tracing::{error, info, warn};

use crate::domain::ast::RawAstDescriptor;
use crate::domain::features::{FeatureExtractor, FeatureMap};
use crate::domain::store::FeatureStore;
use crate::error::{JastError, Result};
use crate::infrastructure::ParserRunner;
use crate::ports::AstProvider;

/// Result for one file of a corpus run. `features` is `None` when the file failed.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub file_path: PathBuf,
    pub features: Option<FeatureMap>,
}

#[derive(Debug, Clone)]
pub struct CorpusFailure {
    pub file_path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct CorpusRun {
    /// One entry per input path, in input order.
    pub analyses: Vec<Analysis>,
    pub failures: Vec<CorpusFailure>,
}

impl CorpusRun {
    pub fn succeeded(&self) -> usize {
        self.analyses.iter().filter(|a| a.features.is_some()).count()
    }
}

pub struct FeatureUsecase<'a> {
    pub provider: &'a dyn AstProvider,
}

impl<'a> FeatureUsecase<'a> {
    /// Features of one file, or `None` if the file could not be parsed or classified.
    /// Failures are logged, never propagated.
    pub fn extract_file(&self, path: &Path) -> Option<FeatureMap> {
        match self.try_extract(path) {
            Ok(features) => Some(features),
            Err(e) => {
                warn!("No features for {}: {}", path.display(), e);
                None
            }
        }
    }

    pub fn try_extract(&self, path: &Path) -> Result<FeatureMap> {
        let ast = self.provider.provide(path)?;
        features_from_descriptor(&ast)
    }

    /// Extract every path on `pool`. A failing file is recorded in `failures` and does not
    /// stop the others.
    pub fn extract_corpus(&self, paths: &[PathBuf], pool: &ThreadPool) -> CorpusRun {
        let start = Instant::now();

        let outcomes: Vec<(PathBuf, Result<FeatureMap>)> = pool.install(|| {
            paths
                .par_iter()
                .map(|path| (path.clone(), self.try_extract(path)))
                .collect()
        });

        let mut run = CorpusRun::default();
        for (file_path, outcome) in outcomes {
            match outcome {
                Ok(features) => run.analyses.push(Analysis {
                    file_path,
                    features: Some(features),
                }),
                Err(e) => {
                    error!("Something went wrong with {}: {}", file_path.display(), e);
                    run.failures.push(CorpusFailure {
                        file_path: file_path.clone(),
                        reason: e.to_string(),
                    });
                    run.analyses.push(Analysis {
                        file_path,
                        features: None,
                    });
                }
            }
        }

        info!(
            "Features produced for {}/{} files in {:.2?}",
            run.succeeded(),
            paths.len(),
            start.elapsed()
        );
        run
    }
}

/// Build a fresh tree for `ast` and count its features.
pub fn features_from_descriptor(ast: &RawAstDescriptor) -> Result<FeatureMap> {
    let tree = ast.to_tree()?;
    FeatureExtractor::frequencies(&tree)
}

/// Streaming mode: features for every document the parser printed for `path`.
/// A block that is not a valid AST yields `None`; a parser failure fails the whole call.
pub fn extract_stream(runner: &ParserRunner, path: &Path) -> Result<Vec<Option<FeatureMap>>> {
    let blocks = runner.stream_blocks(path)?;
    let results = blocks
        .iter()
        .enumerate()
        .map(|(i, block)| {
            let features = RawAstDescriptor::from_json(block)
                .map_err(|e| JastError::parse_failure(path, format!("block {}: {}", i, e)))
                .and_then(|ast| features_from_descriptor(&ast));
            match features {
                Ok(map) => Some(map),
                Err(e) => {
                    warn!("{}", e);
                    None
                }
            }
        })
        .collect();
    Ok(results)
}

/// Add every successful analysis to `store`. Returns how many files were recorded.
pub fn record_corpus(run: &CorpusRun, store: &dyn FeatureStore) -> usize {
    let start = Instant::now();
    let mut recorded = 0;
    for analysis in &run.analyses {
        let Some(features) = &analysis.features else { continue };
        match store.record_file(features) {
            Ok(()) => recorded += 1,
            Err(e) => error!("Something went wrong with {}: {}", analysis.file_path.display(), e),
        }
    }
    info!("Recorded {} files in {:.2?}", recorded, start.elapsed());
    recorded
}
