use std::backtrace::Backtrace;
pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("constraint scope must name at least one variable")]
    EmptyScope,
    #[error("scope {scope} references variable {variable}, but only {variable_count} variables were declared")]
    ScopeVariableOutOfRange {
        scope: String,
        variable: usize,
        variable_count: usize,
    },
    #[error("unary filter references variable {variable}, but only {variable_count} variables were declared")]
    FilterVariableOutOfRange {
        variable: usize,
        variable_count: usize,
    },
    #[error("scope {scope} is already registered")]
    DuplicateScope { scope: String },
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Inner: {inner}\n{backtrace}")]
    Inner {
        inner: Box<SolverError>,
        backtrace: Box<Backtrace>,
    },
}

impl From<SolverError> for Error {
    fn from(inner: SolverError) -> Self {
        Error::Inner {
            inner: Box::new(inner),
            backtrace: Box::new(std::backtrace::Backtrace::capture()),
        }
    }
}
