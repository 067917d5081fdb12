//! Error types for Switchback operations.

use thiserror::Error;

/// All error types that Switchback operations can produce.
#[derive(Error, Debug)]
pub enum SwitchbackError {
    /// Invalid or missing configuration (TOML parse errors, missing required fields, etc.).
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A database query or connection operation failed.
    #[error(transparent)]
    DatabaseError(#[from] sqlx::Error),

    /// The migration library rejected an operation (dirty version, checksum mismatch, ...).
    #[error(transparent)]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    /// The requested direction has nothing left to do.
    #[error("no change")]
    NoChange,

    /// No version marker has been recorded yet.
    #[error("no migration")]
    NilVersion,

    /// The version given for a force could not be read as an integer.
    #[error("expected integer, found '{input}'")]
    ExpectedInteger { input: String },

    /// A menu selection did not match any of the known options.
    #[error("Unknown option '{0}'")]
    UnknownOption(String),

    /// A force targeted a version that no migration file declares.
    #[error("No migration with version {version} exists in the migration source")]
    UnknownVersion { version: i64 },

    /// An applied migration has no down script, so it cannot be reverted.
    #[error("Migration {version} has no down migration and cannot be reverted")]
    Irreversible { version: i64 },

    /// The interactive prompt could not read from the terminal.
    #[error("Prompt failed: {0}")]
    PromptError(String),

    /// A filesystem or terminal I/O operation failed.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, SwitchbackError>`.
pub type Result<T> = std::result::Result<T, SwitchbackError>;
