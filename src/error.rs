//! Error types for the accumc compiler

use crate::machine::{Reg, Word};
use thiserror::Error;

/// accumc errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // Front-end errors
    /// Syntax error encountered while scanning or parsing
    ///
    /// **Triggered by:** Characters outside the expression grammar, malformed lists
    /// **Example:** `(+ x #)`, `(* 1 2)`
    #[error("Syntax error at line {line}, column {col}: {message}")]
    SyntaxError {
        /// Line number where error occurred
        line: usize,
        /// Column number where error occurred
        col: usize,
        /// Error description
        message: String,
    },

    /// General parse error
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Unexpected end of input during parsing
    #[error("Unexpected end of file")]
    UnexpectedEof,

    /// Unexpected token encountered during parsing
    #[error("Unexpected token: expected {expected}, got {got}")]
    UnexpectedToken {
        /// Expected token description
        expected: String,
        /// Actual token received
        got: String,
    },

    // Configuration errors
    /// Identifier with no register (or no value) assigned
    ///
    /// **Triggered by:** A variable map or environment that is not total over
    /// the identifiers of the expression being compiled or evaluated
    /// **Prevention:** Build the map with `VariableMap::resolve`, or call
    /// `VariableMap::validate_for` before compiling
    #[error("Undefined variable: {name}")]
    UndefinedVariable {
        /// Variable name
        name: String,
    },

    /// Variable register at or above the temporary watermark
    ///
    /// **Triggered by:** Compiling with a watermark that does not lie strictly
    /// above every variable register; temporaries would overwrite the variable
    #[error("Variable {name} is assigned register {reg}, which is not below the watermark {watermark}")]
    PreconditionViolation {
        /// Variable name
        name: String,
        /// Register assigned to the variable
        reg: Reg,
        /// Watermark the compilation was requested at
        watermark: Reg,
    },

    /// Initial machine state disagrees with the environment
    #[error("Register {reg} holds {found} but variable {name} has value {expected}")]
    InconsistentState {
        /// Variable name
        name: String,
        /// Register assigned to the variable
        reg: Reg,
        /// Value of the variable in the environment
        expected: Word,
        /// Value found in the register
        found: Word,
    },

    /// Several identifiers share one register
    #[error("Register {reg} is shared by variables {}", names.join(", "))]
    RegisterAliasing {
        /// Shared register
        reg: Reg,
        /// Identifiers mapped to it
        names: Vec<String>,
    },

    /// Temporaries would run past the last addressable register
    ///
    /// **Triggered by:** A watermark (or variable register) so close to
    /// `usize::MAX` that `base + offset` cannot be represented
    #[error("Register index overflow: {base} + {offset} exceeds the register space")]
    RegisterOverflow {
        /// Register allocation starts from
        base: Reg,
        /// Registers needed above `base`
        offset: usize,
    },

    /// Expression nested deeper than the compiler accepts
    ///
    /// **Triggered by:** Trees whose `Sum` depth exceeds
    /// `CompileOptions::max_depth`; code generation recurses once per level
    #[error("Expression nesting depth {depth} exceeds the limit of {limit}")]
    NestingTooDeep {
        /// Depth of the rejected expression
        depth: usize,
        /// Configured limit
        limit: usize,
    },

    // Compiler and runtime
    /// Compiler error
    #[error("Compiler error: {0}")]
    CompilerError(String),

    /// General runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(String),
}

/// Error severity classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Caller error that cannot be recovered from without changing the input
    Fatal,
    /// Configuration problem that may be fixed by supplying more bindings
    Recoverable,
    /// Diagnostic that doesn't prevent compilation
    Warning,
}

impl Error {
    /// Create a runtime error with a message
    pub fn runtime(msg: impl Into<String>) -> Self {
        Error::RuntimeError(msg.into())
    }

    /// Create a compiler error with a message
    pub fn compiler(msg: impl Into<String>) -> Self {
        Error::CompilerError(msg.into())
    }

    /// Create an undefined-variable error
    pub fn undefined(name: impl Into<String>) -> Self {
        Error::UndefinedVariable { name: name.into() }
    }

    /// Classify error severity
    pub fn classify(&self) -> ErrorSeverity {
        match self {
            Error::SyntaxError { .. }
            | Error::ParseError(_)
            | Error::UnexpectedEof
            | Error::UnexpectedToken { .. } => ErrorSeverity::Fatal,

            Error::PreconditionViolation { .. }
            | Error::RegisterOverflow { .. }
            | Error::NestingTooDeep { .. } => ErrorSeverity::Fatal,
            Error::InconsistentState { .. } => ErrorSeverity::Fatal,
            Error::CompilerError(_) => ErrorSeverity::Fatal,

            Error::UndefinedVariable { .. } => ErrorSeverity::Recoverable,
            Error::RuntimeError(_) => ErrorSeverity::Recoverable,

            Error::RegisterAliasing { .. } => ErrorSeverity::Warning,
        }
    }
}

/// Result type for accumc operations
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_precondition_message() {
        let err = Error::PreconditionViolation {
            name: "x".to_string(),
            reg: Reg(4),
            watermark: Reg(3),
        };
        assert_eq!(
            err.to_string(),
            "Variable x is assigned register r4, which is not below the watermark r3"
        );
        assert_eq!(err.classify(), ErrorSeverity::Fatal);
    }

    #[test]
    fn test_aliasing_message() {
        let err = Error::RegisterAliasing {
            reg: Reg(1),
            names: vec!["a".to_string(), "b".to_string()],
        };
        assert!(err.to_string().contains("a, b"));
        assert_eq!(err.classify(), ErrorSeverity::Warning);
    }

    #[test]
    fn test_undefined_is_recoverable() {
        assert_eq!(Error::undefined("y").classify(), ErrorSeverity::Recoverable);
    }
}
