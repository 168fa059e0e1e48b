//! Binding to the clang front end: compilation database, AST dump, typed
//! AST nodes and the pointer-field matcher.

mod ast_dump;
mod clang_nodes;
mod compile_db;
mod matcher;

pub use clang_nodes::{Clang, Node};
pub use compile_db::{COMPILE_COMMANDS_FILE, CompilationDatabase, CompileCommand, split_command_line};
pub use matcher::{MatchOptions, collect_field_sites, is_system_header};

use crate::{config::FrontendSettings, error::FrontendError, rewrite::FieldSite};

/// Deserialize a JSON AST dump.
pub fn parse_ast(json: &str) -> Result<Node, serde_json::Error> {
    serde_json::from_str(json)
}

/// Run the front end on one translation unit and collect its pointer fields,
/// with file paths made absolute.
pub async fn unit_field_sites(
    unit: &CompileCommand,
    settings: &FrontendSettings,
    options: MatchOptions,
) -> Result<Vec<FieldSite>, FrontendError> {
    let json = ast_dump::run_ast_dump(unit, settings).await?;

    let directory = unit.directory.clone();
    let parsed = tokio::task::spawn_blocking(move || {
        let root = parse_ast(&json)?;
        let mut sites = collect_field_sites(&root, options);
        for site in &mut sites {
            matcher::absolutize_file(site, &directory);
        }
        Ok::<_, serde_json::Error>(sites)
    })
    .await
    .map_err(|_| FrontendError::Cancelled {
        file: unit.file.clone(),
    })?;

    parsed.map_err(|source| FrontendError::InvalidAst {
        file: unit.file.clone(),
        source,
    })
}
