//! Query execution.

mod executor;

pub use executor::{run_to_outcome, Outcome, QueryExecutor};
