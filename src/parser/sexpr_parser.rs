use super::ast::Expr;
use crate::error::{Error, Result};
use crate::lexer::{Token, TokenKind};

/// Deepest `Sum` nesting the parser accepts
///
/// The parser and the code generator recurse once per level; this keeps
/// both well inside a default thread stack.
pub const MAX_NESTING_DEPTH: usize = 512;

/// S-expression parser for arithmetic source text
///
/// Grammar:
///
/// ```text
/// expr := INTEGER | IDENTIFIER | "(" "+" expr* ")"
/// ```
///
/// `(+ a b c)` folds to the left, `(+ a)` is `a` and `(+)` is `0`.
pub struct SExprParser {
    tokens: Vec<Token>,
    current: usize,
}

impl SExprParser {
    /// Creates a new S-expression parser
    pub fn new(tokens: Vec<Token>) -> Self {
        SExprParser { tokens, current: 0 }
    }

    /// Parses the tokens into a single expression
    pub fn parse(&mut self) -> Result<Expr> {
        if self.is_at_end() {
            return Err(Error::UnexpectedEof);
        }

        let (expr, _) = self.parse_expression(0)?;

        if !self.is_at_end() {
            let token = self.peek();
            return Err(Error::SyntaxError {
                line: token.line,
                col: token.column,
                message: format!(
                    "Trailing {} after expression; a source holds exactly one expression",
                    token.kind
                ),
            });
        }

        Ok(expr)
    }

    /// Parses one expression, returning it with its `Sum` depth
    fn parse_expression(&mut self, nesting: usize) -> Result<(Expr, usize)> {
        match self.peek().kind.clone() {
            TokenKind::Integer(n) => {
                self.advance();
                Ok((Expr::Const(n), 0))
            }
            TokenKind::Identifier(name) => {
                self.advance();
                Ok((Expr::Var(name), 0))
            }
            TokenKind::LeftParen => self.parse_sum(nesting + 1),
            TokenKind::Eof => Err(Error::UnexpectedEof),
            other => Err(self.syntax_error(format!(
                "Unexpected {} in expression.\n\n\
                 Help: Expected one of: integer, identifier, or `(+ ...)`",
                other
            ))),
        }
    }

    /// Parse (+ expr*)
    ///
    /// Both the parenthesis nesting and the depth of the folded tree are
    /// capped at [`MAX_NESTING_DEPTH`].
    fn parse_sum(&mut self, nesting: usize) -> Result<(Expr, usize)> {
        if nesting > MAX_NESTING_DEPTH {
            return Err(self.nesting_error());
        }
        self.consume(TokenKind::LeftParen, "`(`")?;
        self.consume(TokenKind::Plus, "`+`")?;

        let mut acc: Option<(Expr, usize)> = None;
        while !self.check(&TokenKind::RightParen) {
            if self.is_at_end() {
                return Err(Error::UnexpectedEof);
            }
            let (operand, operand_depth) = self.parse_expression(nesting)?;
            acc = Some(match acc {
                Some((lhs, lhs_depth)) => {
                    let depth = 1 + lhs_depth.max(operand_depth);
                    if depth > MAX_NESTING_DEPTH {
                        return Err(self.nesting_error());
                    }
                    (Expr::sum(lhs, operand), depth)
                }
                None => (operand, operand_depth),
            });
        }
        self.consume(TokenKind::RightParen, "`)`")?;

        Ok(acc.unwrap_or((Expr::Const(0), 0)))
    }

    fn nesting_error(&self) -> Error {
        self.syntax_error(format!(
            "Expression nested deeper than {} levels",
            MAX_NESTING_DEPTH
        ))
    }

    fn consume(&mut self, kind: TokenKind, expected: &str) -> Result<()> {
        if self.check(&kind) {
            self.advance();
            return Ok(());
        }
        if self.is_at_end() {
            return Err(Error::UnexpectedEof);
        }
        Err(Error::UnexpectedToken {
            expected: expected.to_string(),
            got: format!(
                "{} at line {}, column {}",
                self.peek().kind,
                self.peek().line,
                self.peek().column
            ),
        })
    }

    fn syntax_error(&self, message: String) -> Error {
        let token = self.peek();
        Error::SyntaxError {
            line: token.line,
            col: token.column,
            message,
        }
    }

    fn check(&self, kind: &TokenKind) -> bool {
        &self.peek().kind == kind
    }

    fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    fn is_at_end(&self) -> bool {
        matches!(self.peek().kind, TokenKind::Eof)
    }

    fn peek(&self) -> &Token {
        // Scanner output always ends in Eof; an empty vector behaves the same
        static EOF: Token = Token {
            kind: TokenKind::Eof,
            lexeme: String::new(),
            line: 1,
            column: 1,
        };
        self.tokens.get(self.current).unwrap_or(&EOF)
    }
}
