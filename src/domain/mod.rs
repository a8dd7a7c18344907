// Core engine: unit table, node tree, builder, feature extraction and corpus counts.

pub mod ast;
pub mod builder;
pub mod features;
pub mod node;
pub mod store;
pub mod units;
