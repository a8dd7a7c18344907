// Command-line entry point for jast.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use jast::api::dto::{CorpusReportDto, FeatureCountDto, FeatureReportDto};
use jast::application::{self, FeatureUsecase};
use jast::config::JastConfig;
use jast::domain::store::{DiskFeatureStore, FeatureStore};
use jast::infrastructure::concurrency::build_worker_pool;
use jast::infrastructure::logging::init_logging;
use jast::infrastructure::{AstLoader, ParserRunner, SourceLoader};
use jast::infrastructure::parser_runner::default_json_path;
use jast::ports::report_exporter::exporter_for;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbosity, from 0 (verbose) to 5 (least verbose)
    #[arg(
        long,
        global = true,
        default_value_t = 2,
        value_parser = clap::value_parser!(u8).range(0..=5)
    )]
    verbosity: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the features of one JavaScript file
    Extract {
        /// JavaScript source file
        file: PathBuf,

        /// Where the parser writes its JSON AST (defaults next to the input)
        #[arg(long)]
        json_path: Option<PathBuf>,

        /// Keep the intermediate JSON AST
        #[arg(long)]
        retain_json: bool,

        /// Read the AST from the parser's stdout instead of a file
        #[arg(long, conflicts_with_all = ["json_path", "retain_json"])]
        stream: bool,

        /// Output format (json, text)
        #[arg(short, long, default_value = "json")]
        format: String,

        /// Output file path (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Count, per labelled corpus directory, in how many files each feature appears
    Preselect {
        /// Sample directories
        #[arg(short = 'd', long = "dir", required = true)]
        dirs: Vec<PathBuf>,

        /// One label per directory (e.g. benign, malicious)
        #[arg(short, long = "label", required = true)]
        labels: Vec<String>,

        /// Folder holding the feature stores
        #[arg(long)]
        analysis_path: Option<PathBuf>,

        /// Number of workers (defaults to half the cores)
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbosity)?;

    let config = JastConfig::load_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Command::Extract { file, json_path, retain_json, stream, format, output } => {
            let exporter = match exporter_for(&format) {
                Some(e) => e,
                None => bail!("Unknown output format: {}", format),
            };
            let runner = ParserRunner::new(&config.parser);

            let reports: Vec<FeatureReportDto> = if stream {
                application::extract_stream(&runner, &file)?
                    .iter()
                    .flatten()
                    .map(|features| FeatureReportDto::new(&file, features))
                    .collect()
            } else {
                let retain = retain_json || config.extraction.retain_json;
                let json_path = json_path.unwrap_or_else(|| default_json_path(&file));
                let ast = runner.load_file(&file, &json_path, retain)?;
                let features = application::features_from_descriptor(&ast)?;
                vec![FeatureReportDto::new(&file, &features)]
            };

            match output {
                Some(path) => {
                    exporter
                        .export(&reports, &path)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    info!("Features written to {}", path.display());
                }
                None => print!("{}", exporter.render_all(&reports)?),
            }
        }

        Command::Preselect { dirs, labels, analysis_path, workers } => {
            if dirs.len() != labels.len() {
                bail!(
                    "Expected one --label per --dir ({} dirs, {} labels)",
                    dirs.len(),
                    labels.len()
                );
            }
            let analysis_path =
                analysis_path.unwrap_or_else(|| config.corpus.analysis_path.clone());
            let pool = build_worker_pool(workers.or(config.corpus.workers))?;
            let runner = ParserRunner::new(&config.parser);

            for (dir, label) in dirs.iter().zip(&labels) {
                info!("Currently handling {}", dir.display());
                let loader = if config.extraction.retain_json {
                    AstLoader::retaining(runner.clone(), &analysis_path.join("json").join(label))?
                } else {
                    AstLoader::new(runner.clone())?
                };
                let usecase = FeatureUsecase { provider: &loader };
                let summary = preselect_dir(&usecase, &pool, dir, label, &analysis_path)?;
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }
    }

    Ok(())
}

fn preselect_dir(
    usecase: &FeatureUsecase,
    pool: &rayon::ThreadPool,
    dir: &Path,
    label: &str,
    analysis_path: &Path,
) -> Result<CorpusReportDto> {
    fs::create_dir_all(analysis_path)
        .with_context(|| format!("Failed to create {}", analysis_path.display()))?;

    let files = SourceLoader::collect_sources(dir)?;
    let run = usecase.extract_corpus(&files, pool);

    let store = DiskFeatureStore::open(analysis_path, label)?;
    application::record_corpus(&run, &store);
    store.flush()?;

    let features = store
        .snapshot()?
        .iter()
        .map(|(tuple, count)| FeatureCountDto::new(tuple, *count))
        .collect();

    Ok(CorpusReportDto {
        label: label.to_string(),
        files: files.len(),
        failed: run.failures.len(),
        features,
    })
}
