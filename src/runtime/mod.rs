//! Source-level semantics: environments and the expression evaluator

mod environment;
mod evaluator;

pub use environment::Environment;
pub use evaluator::evaluate;
