//! Error types, one enum per layer.

use std::path::PathBuf;

/// Failure to turn a field declaration into a replacement span.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpanError {
    #[error("field name at offset {name_offset} does not follow declaration start {decl_start}")]
    NameBeforeStart { decl_start: usize, name_offset: usize },
}

/// Failure to parse one line of the edit stream.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditParseError {
    #[error("expected 5 `:::`-separated fields, found {found}")]
    MissingFields { found: usize },

    #[error("invalid {field} `{value}`")]
    InvalidNumber { field: &'static str, value: String },

    #[error("span at offset {offset} with length {length} overflows")]
    OutOfRange { offset: usize, length: usize },
}

/// Failure while applying edits to a file.
#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("conflicting replacement text: {file} at offset {offset}, length {length}: \"{text}\" != \"{previous}\"")]
    Conflict { file: PathBuf, offset: usize, length: usize, text: String, previous: String },

    #[error("overlapping edits in {file}: [{offset}, {end}) overlaps an edit starting at {next_offset}")]
    Overlap { file: PathBuf, offset: usize, end: usize, next_offset: usize },

    #[error("edit [{offset}, {end}) is out of bounds for {file} ({size} bytes)")]
    OutOfBounds { file: PathBuf, offset: usize, end: usize, size: usize },

    #[error("unrecognized edit directive \"{kind}\": {file}")]
    UnrecognizedKind { file: PathBuf, kind: String },

    #[error("failed to rewrite {file}: {source}")]
    Io { file: PathBuf, source: std::io::Error },
}

/// Failure to load or query the compilation database.
#[derive(Debug, thiserror::Error)]
pub enum CompileDbError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },

    #[error("entry for {file} has neither `command` nor `arguments`")]
    MissingCommand { file: String },

    #[error("unterminated quote in command for {file}")]
    UnterminatedQuote { file: String },

    #[error("no compile command found for {0}")]
    NoEntryFor(PathBuf),
}

/// Failure of the compiler front end on one translation unit.
#[derive(Debug, thiserror::Error)]
pub enum FrontendError {
    #[error("failed to run `{program}` for {file}: {source}")]
    Spawn { program: String, file: PathBuf, source: std::io::Error },

    #[error("front end failed on {file} ({status}, {errors} error(s))")]
    CompilerFailed { file: PathBuf, status: std::process::ExitStatus, errors: usize },

    #[error("front end produced no usable AST for {file}")]
    EmptyAst { file: PathBuf },

    #[error("failed to deserialize AST for {file}: {source}")]
    InvalidAst { file: PathBuf, source: serde_json::Error },

    #[error("translation unit {file} was cancelled")]
    Cancelled { file: PathBuf },
}

/// Failure to load the configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: std::io::Error },

    #[error("failed to parse {path}: {source}")]
    Parse { path: PathBuf, source: toml::de::Error },
}

/// Run-level failure of the `rewrite` command.
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("{failed} of {total} translation unit(s) failed")]
    UnitsFailed { failed: usize, total: usize },

    #[error(transparent)]
    CompileDb(#[from] CompileDbError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to write edits: {0}")]
    Output(#[from] std::io::Error),
}
