// lakehouse-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum DomainError {
    #[error("Circular dependency detected involving: {0}")]
    #[diagnostic(
        code(lakehouse::domain::cycle),
        help("Check the inputs declared by each Gold table.")
    )]
    CircularDependency(String),

    #[error("Column '{column}' of table '{table}' holds {found}, expected {expected}")]
    #[diagnostic(code(lakehouse::domain::schema))]
    SchemaMismatch {
        table: String,
        column: String,
        expected: String,
        found: String,
    },

    #[error("Table '{table}' has no column named '{column}'")]
    #[diagnostic(code(lakehouse::domain::unknown_column))]
    UnknownColumn { table: String, column: String },

    #[error("Invalid raw file name '{0}'")]
    #[diagnostic(
        code(lakehouse::domain::file_name),
        help("Use a plain `<name>.csv` basename without directories.")
    )]
    InvalidFileName(String),

    #[error("Invalid file name pattern: {0}")]
    #[diagnostic(code(lakehouse::domain::pattern))]
    InvalidPattern(String),

    #[error("Invalid query: {0}")]
    #[diagnostic(code(lakehouse::domain::query))]
    InvalidQuery(String),
}
