//! Parallel execution support for accumc
//!
//! Compiles independent requests concurrently.

mod executor;

pub use executor::{compile_batch, compile_batch_all, CompileRequest, ParallelConfig};
