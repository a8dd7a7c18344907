// Infrastructure implementations for jast: external parser, worker pool, file system, logging.

pub mod concurrency;
pub mod logging;
pub mod parser_runner;
pub mod source_loader;

pub use parser_runner::{AstLoader, ParserRunner};
pub use source_loader::SourceLoader;
