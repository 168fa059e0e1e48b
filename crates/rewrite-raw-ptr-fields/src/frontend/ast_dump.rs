use once_cell::sync::Lazy;
use regex::Regex;
use tokio::process::Command;
use tracing::{debug, warn};

use crate::{config::FrontendSettings, error::FrontendError, frontend::compile_db::CompileCommand};

static DIAGNOSTIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.*?):(\d+):(\d+):\s*(error|fatal error|warning|note):\s*(.*)$").unwrap());

fn clang_command(
    program: &str,
    args: &[String],
    directory: &std::path::Path,
) -> Command {
    let mut command = Command::new(program);
    command.kill_on_drop(true).args(args).current_dir(directory);
    command
}

/// Run the front end's JSON AST dump for one translation unit and return the
/// raw JSON string.
///
/// Unlike an interactive consumer, a rewrite cannot use a partial AST: a
/// nonzero exit status fails the unit.
pub(crate) async fn run_ast_dump(
    unit: &CompileCommand,
    settings: &FrontendSettings,
) -> Result<String, FrontendError> {
    let args = unit.frontend_arguments(settings);
    debug!("[ast-dump] {} {}", settings.clang, args.join(" "));

    let mut command = clang_command(&settings.clang, &args, &unit.directory);
    let output = command.output().await.map_err(|source| FrontendError::Spawn {
        program: settings.clang.clone(),
        file: unit.file.clone(),
        source,
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        let errors = count_errors(&stderr);
        for line in stderr.lines().filter(|line| is_error_line(line)) {
            warn!("[ast-dump] compiler error: {line}");
        }
        return Err(FrontendError::CompilerFailed {
            file: unit.file.clone(),
            status: output.status,
            errors,
        });
    }

    let stdout = String::from_utf8(output.stdout).map_err(|_| FrontendError::EmptyAst {
        file: unit.file.clone(),
    })?;
    if stdout.is_empty() || !stdout.starts_with('{') {
        warn!("[ast-dump] produced no usable JSON for {}", unit.file.display());
        return Err(FrontendError::EmptyAst {
            file: unit.file.clone(),
        });
    }

    debug!("[ast-dump] produced {} bytes of JSON for {}", stdout.len(), unit.file.display());
    Ok(stdout)
}

fn is_error_line(line: &str) -> bool {
    DIAGNOSTIC_RE
        .captures(line)
        .is_some_and(|caps| matches!(caps.get(4).map(|m| m.as_str()), Some("error" | "fatal error")))
}

fn count_errors(stderr: &str) -> usize {
    stderr.lines().filter(|line| is_error_line(line)).count()
}

#[cfg(test)]
#[path = "../../tests/src/frontend/ast_dump_tests.rs"]
mod tests;
