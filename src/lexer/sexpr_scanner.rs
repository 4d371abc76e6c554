use super::token::{Token, TokenKind};
use crate::error::{Error, Result};
use crate::machine::Word;

/// Scanner for S-expression arithmetic syntax
pub struct SExprScanner {
    /// Source code as character vector
    source: Vec<char>,
    /// Accumulated tokens
    tokens: Vec<Token>,
    /// Start position of current token
    start: usize,
    /// Column where the current token starts
    start_column: usize,
    /// Current position in source
    current: usize,
    /// Current line number (1-indexed)
    line: usize,
    /// Current column number (1-indexed)
    column: usize,
}

impl SExprScanner {
    /// Creates a new S-expression scanner from source code
    pub fn new(source: &str) -> Self {
        SExprScanner {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            start_column: 1,
            current: 0,
            line: 1,
            column: 1,
        }
    }

    /// Scans all tokens from source code and returns them as a vector
    pub fn scan_tokens(&mut self) -> Result<Vec<Token>> {
        while !self.is_at_end() {
            self.start = self.current;
            self.start_column = self.column;
            self.scan_token()?;
        }

        self.tokens.push(Token::new(
            TokenKind::Eof,
            String::new(),
            self.line,
            self.column,
        ));

        Ok(std::mem::take(&mut self.tokens))
    }

    fn scan_token(&mut self) -> Result<()> {
        let c = self.advance();

        match c {
            ' ' | '\r' | '\t' => {}
            '\n' => {
                self.line += 1;
                self.column = 1;
            }

            ';' => self.skip_line_comment(),

            '(' => self.add_token(TokenKind::LeftParen),
            ')' => self.add_token(TokenKind::RightParen),
            '+' => self.add_token(TokenKind::Plus),

            '-' if self.peek().is_ascii_digit() => {
                return Err(Error::ParseError(format!(
                    "Negative literal at line {}, column {}: values are unsigned",
                    self.line, self.start_column
                )));
            }

            c if c.is_ascii_digit() => self.scan_number()?,

            c if c.is_alphabetic() || c == '_' => self.scan_identifier(),

            _ => {
                return Err(Error::SyntaxError {
                    line: self.line,
                    col: self.start_column,
                    message: format!("Unexpected character '{}'", c.escape_default()),
                });
            }
        }

        Ok(())
    }

    fn skip_line_comment(&mut self) {
        while !self.is_at_end() && self.peek() != '\n' {
            self.advance();
        }
    }

    fn scan_number(&mut self) -> Result<()> {
        while self.peek().is_ascii_digit() {
            self.advance();
        }

        if self.peek().is_alphabetic() || self.peek() == '_' {
            return Err(Error::SyntaxError {
                line: self.line,
                col: self.start_column,
                message: format!("Malformed number '{}{}'", self.lexeme(), self.peek()),
            });
        }

        let text = self.lexeme();
        let value: Word = text
            .parse()
            .map_err(|_| Error::ParseError(format!("Integer literal out of range: {}", text)))?;
        self.add_token(TokenKind::Integer(value));
        Ok(())
    }

    fn scan_identifier(&mut self) {
        while self.peek().is_alphanumeric() || matches!(self.peek(), '_' | '-' | '?' | '!') {
            self.advance();
        }

        let text = self.lexeme();
        self.add_token(TokenKind::Identifier(text));
    }

    fn lexeme(&self) -> String {
        self.source[self.start..self.current].iter().collect()
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }

    fn advance(&mut self) -> char {
        let c = self.source[self.current];
        self.current += 1;
        self.column += 1;
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.source[self.current]
        }
    }

    fn add_token(&mut self, kind: TokenKind) {
        let lexeme = self.lexeme();
        self.tokens
            .push(Token::new(kind, lexeme, self.line, self.start_column));
    }
}
