use std::fmt::Display;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::expr::BinaryOp;
use crate::token::Span;

#[derive(Clone, Debug, Error, Diagnostic)]
#[error("Errors while running loxide code")]
#[diagnostic()]
pub struct LoxideErrors {
    #[source_code]
    pub src: String,
    #[related]
    pub nested: Vec<LoxideError>,
}

impl LoxideErrors {
    /// 70 for runtime failures, 65 for anything static.
    pub fn exit_code(&self) -> i32 {
        let runtime = self
            .nested
            .iter()
            .any(|error| matches!(error, LoxideError::RuntimeError(_)));
        if runtime {
            70
        } else {
            65
        }
    }

    /// The canonical line-oriented reporting format, one entry per line:
    ///
    /// ```text
    /// [line 1] Error: Unterminated string.
    /// [line 2] Error at 'x': Invalid assignment target.
    /// [line 3] Error at end: Expect ';' after value.
    /// ```
    ///
    /// Runtime errors render as the message followed by `[line N]`.
    pub fn render(&self) -> String {
        self.nested
            .iter()
            .map(|error| error.render(&self.src))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[derive(Clone, Debug, Error, Diagnostic)]
pub enum LoxideError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    ScanError(#[from] ScanError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    SyntaxError(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    ResolveError(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    RuntimeError(#[from] RuntimeError),
}

impl LoxideError {
    fn source_span(&self) -> SourceSpan {
        match self {
            LoxideError::ScanError(error) => error.source_span(),
            LoxideError::SyntaxError(error) => error.source_span(),
            LoxideError::ResolveError(error) => error.source_span(),
            LoxideError::RuntimeError(error) => error.source_span(),
        }
    }

    pub fn render(&self, src: &str) -> String {
        let span = self.source_span();
        let line = line_at(src, span.offset());
        match self {
            LoxideError::ScanError(error) => format!("[line {line}] Error: {error}"),
            LoxideError::SyntaxError(error) => {
                format!("[line {line}] Error {}: {error}", token_context(src, span))
            }
            LoxideError::ResolveError(error) => {
                format!("[line {line}] Error {}: {error}", token_context(src, span))
            }
            LoxideError::RuntimeError(error) => format!("{error}\n[line {line}]"),
        }
    }
}

fn line_at(src: &str, offset: usize) -> usize {
    let end = offset.min(src.len());
    src.as_bytes()[..end].iter().filter(|b| **b == b'\n').count() + 1
}

fn token_context(src: &str, span: SourceSpan) -> String {
    let offset = span.offset();
    if span.len() == 0 || offset >= src.len() {
        "at end".to_string()
    } else {
        let end = (offset + span.len()).min(src.len());
        format!("at '{}'", &src[offset..end])
    }
}

#[derive(Clone, Debug, Error, Diagnostic)]
pub enum ScanError {
    #[error("Unexpected character.")]
    UnexpectedCharacter {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Unterminated string.")]
    UnterminatedString {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Invalid number.")]
    InvalidNumber {
        #[label("{}", self)]
        span: SourceSpan,
    },
}

impl ScanError {
    pub fn unexpected_character(span: Span) -> LoxideError {
        Self::UnexpectedCharacter { span: span.into() }.into()
    }

    pub fn unterminated_string(span: Span) -> LoxideError {
        Self::UnterminatedString { span: span.into() }.into()
    }

    pub fn invalid_number(span: Span) -> LoxideError {
        Self::InvalidNumber { span: span.into() }.into()
    }

    fn source_span(&self) -> SourceSpan {
        match self {
            Self::UnexpectedCharacter { span }
            | Self::UnterminatedString { span }
            | Self::InvalidNumber { span } => *span,
        }
    }
}

#[derive(Clone, Debug, Error, Diagnostic)]
pub enum SyntaxError {
    #[error("{msg}")]
    Expected {
        msg: String,
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Expect expression.")]
    ExpectedExpression {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Invalid assignment target.")]
    InvalidAssignmentTarget {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Can't have more than 255 parameters.")]
    TooManyParameters {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Can't have more than 255 arguments.")]
    TooManyArguments {
        #[label("{}", self)]
        span: SourceSpan,
    },
}

impl SyntaxError {
    pub fn expected(msg: impl Into<String>, span: Span) -> LoxideError {
        Self::Expected {
            msg: msg.into(),
            span: span.into(),
        }
        .into()
    }

    pub fn expected_expression(span: Span) -> LoxideError {
        Self::ExpectedExpression { span: span.into() }.into()
    }

    pub fn invalid_assignment_target(span: Span) -> LoxideError {
        Self::InvalidAssignmentTarget { span: span.into() }.into()
    }

    pub fn too_many_parameters(span: Span) -> LoxideError {
        Self::TooManyParameters { span: span.into() }.into()
    }

    pub fn too_many_arguments(span: Span) -> LoxideError {
        Self::TooManyArguments { span: span.into() }.into()
    }

    fn source_span(&self) -> SourceSpan {
        match self {
            Self::Expected { span, .. }
            | Self::ExpectedExpression { span }
            | Self::InvalidAssignmentTarget { span }
            | Self::TooManyParameters { span }
            | Self::TooManyArguments { span } => *span,
        }
    }
}

#[derive(Clone, Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("Already a variable with this name in this scope.")]
    AlreadyDeclared {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Can't read local variable in its own initializer.")]
    OwnInitializer {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Can't return from top-level code.")]
    TopLevelReturn {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Can't return a value from an initializer.")]
    ReturnFromInitializer {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Can't use 'this' outside of a class.")]
    ThisOutsideClass {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Can't use 'super' outside of a class.")]
    SuperOutsideClass {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Can't use 'super' in a class with no superclass.")]
    SuperWithoutSuperclass {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("A class can't inherit from itself.")]
    InheritFromSelf {
        #[label("{}", self)]
        span: SourceSpan,
    },
}

impl ResolveError {
    pub fn already_declared(span: Span) -> LoxideError {
        Self::AlreadyDeclared { span: span.into() }.into()
    }

    pub fn own_initializer(span: Span) -> LoxideError {
        Self::OwnInitializer { span: span.into() }.into()
    }

    pub fn top_level_return(span: Span) -> LoxideError {
        Self::TopLevelReturn { span: span.into() }.into()
    }

    pub fn return_from_initializer(span: Span) -> LoxideError {
        Self::ReturnFromInitializer { span: span.into() }.into()
    }

    pub fn this_outside_class(span: Span) -> LoxideError {
        Self::ThisOutsideClass { span: span.into() }.into()
    }

    pub fn super_outside_class(span: Span) -> LoxideError {
        Self::SuperOutsideClass { span: span.into() }.into()
    }

    pub fn super_without_superclass(span: Span) -> LoxideError {
        Self::SuperWithoutSuperclass { span: span.into() }.into()
    }

    pub fn inherit_from_self(span: Span) -> LoxideError {
        Self::InheritFromSelf { span: span.into() }.into()
    }

    fn source_span(&self) -> SourceSpan {
        match self {
            Self::AlreadyDeclared { span }
            | Self::OwnInitializer { span }
            | Self::TopLevelReturn { span }
            | Self::ReturnFromInitializer { span }
            | Self::ThisOutsideClass { span }
            | Self::SuperOutsideClass { span }
            | Self::SuperWithoutSuperclass { span }
            | Self::InheritFromSelf { span } => *span,
        }
    }
}

#[derive(Clone, Debug, Error, Diagnostic)]
pub enum RuntimeError {
    #[error("Operand must be a number.")]
    NonNumberOperand {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Operands must be numbers when using the '{op}' operator.")]
    NonNumberOperands {
        op: BinaryOp,
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Operands must be two numbers or two strings.")]
    AdditionOperands {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Undefined variable '{name}'.")]
    UndefinedVariable {
        name: String,
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Can only call functions and classes.")]
    NotCallable {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Expected {expected} arguments but got {found}.")]
    ArityMismatch {
        expected: usize,
        found: usize,
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Only instances have properties.")]
    NoProperties {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Only instances have fields.")]
    NoFields {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Undefined property '{name}'.")]
    UndefinedProperty {
        name: String,
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Superclass must be a class.")]
    SuperclassNotClass {
        #[label("{}", self)]
        span: SourceSpan,
    },

    #[error("Internal error: {msg}")]
    Internal {
        msg: String,
        #[label("{}", self)]
        span: SourceSpan,
    },
}

impl RuntimeError {
    pub fn non_number_operand(span: Span) -> LoxideError {
        Self::NonNumberOperand { span: span.into() }.into()
    }

    pub fn non_number_operands(op: BinaryOp, span: Span) -> LoxideError {
        Self::NonNumberOperands {
            op,
            span: span.into(),
        }
        .into()
    }

    pub fn addition_operands(span: Span) -> LoxideError {
        Self::AdditionOperands { span: span.into() }.into()
    }

    pub fn undefined_variable(name: impl Into<String>, span: Span) -> LoxideError {
        Self::UndefinedVariable {
            name: name.into(),
            span: span.into(),
        }
        .into()
    }

    pub fn not_callable(span: Span) -> LoxideError {
        Self::NotCallable { span: span.into() }.into()
    }

    pub fn arity_mismatch(expected: usize, found: usize, span: Span) -> LoxideError {
        Self::ArityMismatch {
            expected,
            found,
            span: span.into(),
        }
        .into()
    }

    pub fn no_properties(span: Span) -> LoxideError {
        Self::NoProperties { span: span.into() }.into()
    }

    pub fn no_fields(span: Span) -> LoxideError {
        Self::NoFields { span: span.into() }.into()
    }

    pub fn undefined_property(name: impl Display, span: Span) -> LoxideError {
        Self::UndefinedProperty {
            name: name.to_string(),
            span: span.into(),
        }
        .into()
    }

    pub fn superclass_not_class(span: Span) -> LoxideError {
        Self::SuperclassNotClass { span: span.into() }.into()
    }

    pub fn internal(msg: impl Into<String>, span: Span) -> LoxideError {
        Self::Internal {
            msg: msg.into(),
            span: span.into(),
        }
        .into()
    }

    fn source_span(&self) -> SourceSpan {
        match self {
            Self::NonNumberOperand { span }
            | Self::NonNumberOperands { span, .. }
            | Self::AdditionOperands { span }
            | Self::UndefinedVariable { span, .. }
            | Self::NotCallable { span }
            | Self::ArityMismatch { span, .. }
            | Self::NoProperties { span }
            | Self::NoFields { span }
            | Self::UndefinedProperty { span, .. }
            | Self::SuperclassNotClass { span }
            | Self::Internal { span, .. } => *span,
        }
    }
}
