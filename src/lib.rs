//! tabkit - Stateless transformations for tabular data
//!
//! Inspects, normalizes, imputes, and type-checks CSV/JSON tables, turns
//! row data into SQL, and splits SQL scripts into statement-aligned chunks.
//! The same operations are served over HTTP and from the command line.

pub mod api;
pub mod config;
pub mod error;
pub mod infer;
pub mod model;
pub mod parser;
pub mod server;
pub mod sql;
pub mod transform;

pub use config::Config;
pub use error::{Outcome, TransformError};
pub use model::Table;
