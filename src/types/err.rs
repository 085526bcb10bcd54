/*!
Error types used in the library.

Names of the error enums --- for the most part --- mirror the module the
error originates from, with [ErrorKind] as the union the driver and CLI
handle. Any error aborts the query in progress; the CLI renders the error
with an `error:` prefix and exits with code 1.
*/

use crate::reports::Report;

/// A union of varied error kinds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// The requested SAT backend is not advertised by the registry.
    UnknownBackend(String),

    /// An error during clausification.
    Clausify(ClausifyError),

    /// An error during parsing.
    Parse(ParseError),

    /// An error while linearizing a theory atom.
    Linear(LinearError),

    /// A failure reported by a backend.
    Backend(BackendError),

    /// The theory reported a conflict, though no literal could be blocked.
    ///
    /// An empty blocking clause rules nothing out, so forward progress
    /// cannot be guaranteed.
    EmptyLearntClause,

    /// A `:status` annotation disagrees with the verdict found.
    ExpectedMismatch {
        /// The status the input declared.
        expected: Report,

        /// The verdict found.
        found: Report,
    },
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownBackend(name) => write!(f, "unknown SAT backend: {name}"),
            Self::Clausify(e) => write!(f, "{e}"),
            Self::Parse(e) => write!(f, "{e}"),
            Self::Linear(e) => write!(f, "{e}"),
            Self::Backend(BackendError::Failure(message)) => {
                write!(f, "backend failure: {message}")
            }
            Self::EmptyLearntClause => write!(f, "theory conflict with an empty unsat core"),
            Self::ExpectedMismatch { expected, .. } => {
                write!(f, "expected result was {expected}")
            }
        }
    }
}

/// Errors during clausification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClausifyError {
    /// A node outside the boolean vocabulary appeared in boolean position.
    UnsupportedNode(&'static str),

    /// Recursion passed the configured depth bound.
    DepthExceeded,
}

impl From<ClausifyError> for ErrorKind {
    fn from(e: ClausifyError) -> Self {
        ErrorKind::Clausify(e)
    }
}

impl std::fmt::Display for ClausifyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnsupportedNode(kind) => {
                write!(f, "cannot clausify a node of kind '{kind}'")
            }
            Self::DepthExceeded => write!(f, "formula too deep to clausify"),
        }
    }
}

/// Errors during parsing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseError {
    /// A malformed token at the noted line.
    Lex(usize),

    /// A token other than the one required at the noted line.
    UnexpectedToken(usize),

    /// Input ended while a form was open.
    UnexpectedEnd,

    /// A command outside the supported set.
    UnsupportedCommand(String),

    /// A sort other than Bool or Real.
    UnsupportedSort(String),

    /// Use of a symbol with no declaration in scope.
    UnknownSymbol(String),

    /// A second declaration of a symbol.
    Redeclaration(String),

    /// An operator applied to arguments of the wrong sort.
    SortMismatch(&'static str),

    /// An operator applied to the wrong number of arguments.
    Arity(&'static str),

    /// A malformed numeral or decimal at the noted line.
    Numeral(usize),
}

impl From<ParseError> for ErrorKind {
    fn from(e: ParseError) -> Self {
        ErrorKind::Parse(e)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lex(line) => write!(f, "malformed token on line {line}"),
            Self::UnexpectedToken(line) => write!(f, "unexpected token on line {line}"),
            Self::UnexpectedEnd => write!(f, "input ended inside an open form"),
            Self::UnsupportedCommand(command) => write!(f, "unsupported command: {command}"),
            Self::UnsupportedSort(sort) => write!(f, "unsupported sort: {sort}"),
            Self::UnknownSymbol(name) => write!(f, "unknown symbol: {name}"),
            Self::Redeclaration(name) => write!(f, "symbol declared twice: {name}"),
            Self::SortMismatch(operator) => {
                write!(f, "arguments of '{operator}' have the wrong sort")
            }
            Self::Arity(operator) => {
                write!(f, "'{operator}' applied to the wrong number of arguments")
            }
            Self::Numeral(line) => write!(f, "malformed number on line {line}"),
        }
    }
}

/// Errors from linearizing an atom for the theory backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LinearError {
    /// A product of two non-constant terms.
    Nonlinear,

    /// Division by zero, or by a non-constant term.
    Division,
}

impl From<LinearError> for ErrorKind {
    fn from(e: LinearError) -> Self {
        ErrorKind::Linear(e)
    }
}

impl std::fmt::Display for LinearError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Nonlinear => write!(f, "non-linear term in an atom"),
            Self::Division => write!(f, "division by zero or by a non-constant term"),
        }
    }
}

/// A failure reported by a SAT or theory backend.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendError {
    /// The backend's own account of the failure.
    Failure(String),
}

impl From<BackendError> for ErrorKind {
    fn from(e: BackendError) -> Self {
        ErrorKind::Backend(e)
    }
}
