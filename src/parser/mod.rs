//! accumc Parser Module
//!
//! Parses prefix S-expressions into expression trees.

mod ast;
mod sexpr_parser;

pub use ast::Expr;
pub use sexpr_parser::{SExprParser, MAX_NESTING_DEPTH};

use crate::error::Result;
use crate::lexer::SExprScanner;

/// Scan and parse `source` into an expression
pub fn parse_source(source: &str) -> Result<Expr> {
    let mut scanner = SExprScanner::new(source);
    let tokens = scanner.scan_tokens()?;
    let mut parser = SExprParser::new(tokens);
    parser.parse()
}
