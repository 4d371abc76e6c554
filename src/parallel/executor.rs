//! Parallel executor for batch compilation
//!
//! Uses Rayon for work-stealing parallelism with a configurable pool size.
//! Requests share nothing mutable, so each one compiles exactly as it would
//! on its own; results come back in input order.

use crate::compiler::{CompileResult, Compiler, VariableMap};
use crate::error::{Error, ErrorSeverity, Result};
use crate::parser::Expr;
use rayon::prelude::*;

/// Configuration for parallel compilation
#[derive(Debug, Clone)]
pub struct ParallelConfig {
    /// Maximum number of worker threads (default: num_cpus)
    pub max_parallelism: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            max_parallelism: num_cpus::get(),
        }
    }
}

/// One independent compilation request
#[derive(Debug, Clone)]
pub struct CompileRequest {
    /// Register assignment for the expression's identifiers
    pub map: VariableMap,
    /// Expression to compile
    pub expr: Expr,
}

impl CompileRequest {
    /// Creates a request from a map and an expression
    pub fn new(map: VariableMap, expr: Expr) -> Self {
        Self { map, expr }
    }

    /// Creates a request whose map is produced by symbol resolution
    pub fn resolved(expr: Expr) -> Self {
        Self {
            map: VariableMap::resolve(&expr),
            expr,
        }
    }
}

/// Compile every request, failing on the first error in input order
///
/// # Returns
/// * `Ok(Vec<CompileResult>)` - One result per request, in input order
/// * `Err(Error)` - The error of the earliest failing request, or a
///   thread pool construction failure
pub fn compile_batch(
    requests: &[CompileRequest],
    compiler: &Compiler,
    config: &ParallelConfig,
) -> Result<Vec<CompileResult>> {
    compile_batch_all(requests, compiler, config)?
        .into_iter()
        .collect()
}

/// Compile every request and keep each outcome
///
/// The outer `Result` only fails if the thread pool cannot be built.
pub fn compile_batch_all(
    requests: &[CompileRequest],
    compiler: &Compiler,
    config: &ParallelConfig,
) -> Result<Vec<Result<CompileResult>>> {
    // Empty batch fast path
    if requests.is_empty() {
        return Ok(Vec::new());
    }

    // Single request - no parallelism needed
    if requests.len() == 1 {
        let req = &requests[0];
        let result = compiler.compile_expr(&req.map, &req.expr);
        if let Err(err) = &result {
            log_failure(0, err);
        }
        return Ok(vec![result]);
    }

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(config.max_parallelism.clamp(1, requests.len()))
        .build()
        .map_err(|e| Error::runtime(format!("Failed to create thread pool: {}", e)))?;

    tracing::debug!(
        requests = requests.len(),
        threads = pool.current_num_threads(),
        "compiling batch"
    );

    let results: Vec<Result<CompileResult>> = pool.install(|| {
        requests
            .par_iter()
            .map(|req| compiler.compile_expr(&req.map, &req.expr))
            .collect()
    });

    for (index, err) in results
        .iter()
        .enumerate()
        .filter_map(|(i, r)| r.as_ref().err().map(|e| (i, e)))
    {
        log_failure(index, err);
    }

    Ok(results)
}

// Bad input is the caller's problem; missing bindings are routine
fn log_failure(index: usize, err: &Error) {
    match err.classify() {
        ErrorSeverity::Fatal => tracing::warn!(index, error = %err, "request failed"),
        ErrorSeverity::Recoverable | ErrorSeverity::Warning => {
            tracing::debug!(index, error = %err, "request failed")
        }
    }
}
