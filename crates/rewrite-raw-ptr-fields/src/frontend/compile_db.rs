use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, info};

use crate::{config::FrontendSettings, error::CompileDbError};

pub const COMPILE_COMMANDS_FILE: &str = "compile_commands.json";

/// Flags appended to every front-end invocation.
const AST_DUMP_FLAGS: [&str; 4] = ["-fsyntax-only", "-Xclang", "-ast-dump=json", "-fno-color-diagnostics"];

/// Compiler launchers that prefix the real compiler in recorded commands.
const LAUNCHERS: [&str; 5] = ["ccache", "sccache", "distcc", "gomacc", "rewrapper"];

#[derive(Deserialize)]
struct RawEntry {
    directory: String,
    file: String,
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    arguments: Option<Vec<String>>,
}

/// One translation unit from the compilation database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileCommand {
    /// Working directory of the recorded compiler invocation.
    pub directory: PathBuf,
    /// Source file, absolute.
    pub file: PathBuf,
    /// Recorded argv, compiler included.
    pub arguments: Vec<String>,
}

impl CompileCommand {
    /// Build the argv (without the program) for the AST dump of this unit.
    ///
    /// The recorded compiler and any launcher in front of it are dropped, as
    /// are output and dependency-file flags.
    pub fn frontend_arguments(
        &self,
        settings: &FrontendSettings,
    ) -> Vec<String> {
        let mut recorded = self.arguments.iter().peekable();
        while recorded.next_if(|arg| is_launcher(arg)).is_some() {}
        recorded.next();

        let mut args = Vec::with_capacity(self.arguments.len() + AST_DUMP_FLAGS.len());
        while let Some(arg) = recorded.next() {
            match arg.as_str() {
                "-c" | "-MD" | "-MMD" | "-MP" => {},
                "-o" | "-MF" | "-MT" | "-MQ" => {
                    recorded.next();
                },
                a if a.starts_with("-MF") || a.starts_with("-MT") || a.starts_with("-MQ") => {},
                _ => args.push(arg.clone()),
            }
        }
        args.extend(AST_DUMP_FLAGS.iter().map(|flag| flag.to_string()));
        args.extend(settings.extra_flags.iter().cloned());
        args
    }
}

fn is_launcher(arg: &str) -> bool {
    let name = Path::new(arg).file_name().and_then(|n| n.to_str()).unwrap_or(arg);
    LAUNCHERS.contains(&name)
}

#[derive(Debug, Clone, Default)]
pub struct CompilationDatabase {
    commands: Vec<CompileCommand>,
}

impl CompilationDatabase {
    /// Load `compile_commands.json` from a build directory.
    pub fn load(build_dir: &Path) -> Result<Self, CompileDbError> {
        let path = build_dir.join(COMPILE_COMMANDS_FILE);
        let content = std::fs::read_to_string(&path).map_err(|source| CompileDbError::Read {
            path: path.clone(),
            source,
        })?;
        let db = Self::from_json(&content).map_err(|err| match err {
            CompileDbError::Parse {
                source, ..
            } => CompileDbError::Parse {
                path: path.clone(),
                source,
            },
            other => other,
        })?;
        info!("[compile-db] loaded {} entries from {}", db.commands.len(), path.display());
        Ok(db)
    }

    pub fn from_json(content: &str) -> Result<Self, CompileDbError> {
        let raw: Vec<RawEntry> = serde_json::from_str(content).map_err(|source| CompileDbError::Parse {
            path: PathBuf::from(COMPILE_COMMANDS_FILE),
            source,
        })?;

        let mut commands = Vec::with_capacity(raw.len());
        for entry in raw {
            let arguments = match (entry.arguments, entry.command) {
                (Some(arguments), _) if !arguments.is_empty() => arguments,
                (_, Some(command)) => split_command_line(&command).ok_or_else(|| CompileDbError::UnterminatedQuote {
                    file: entry.file.clone(),
                })?,
                _ => {
                    return Err(CompileDbError::MissingCommand {
                        file: entry.file,
                    });
                },
            };
            let directory = PathBuf::from(&entry.directory);
            let file = directory.join(&entry.file);
            commands.push(CompileCommand {
                directory,
                file,
                arguments,
            });
        }
        Ok(Self {
            commands,
        })
    }

    pub fn commands(&self) -> &[CompileCommand] {
        &self.commands
    }

    /// Commands for the requested sources; every command when none are
    /// requested. A source may map to several commands.
    pub fn select(
        &self,
        sources: &[PathBuf],
    ) -> Result<Vec<CompileCommand>, CompileDbError> {
        if sources.is_empty() {
            return Ok(self.commands.clone());
        }

        let mut selected = Vec::new();
        for source in sources {
            let matching: Vec<&CompileCommand> =
                self.commands.iter().filter(|command| same_file(&command.file, source)).collect();
            if matching.is_empty() {
                return Err(CompileDbError::NoEntryFor(source.clone()));
            }
            debug!("[compile-db] {} -> {} command(s)", source.display(), matching.len());
            selected.extend(matching.into_iter().cloned());
        }
        Ok(selected)
    }
}

fn same_file(
    a: &Path,
    b: &Path,
) -> bool {
    if a == b {
        return true;
    }
    matches!((a.canonicalize(), b.canonicalize()), (Ok(ca), Ok(cb)) if ca == cb)
}

/// Split a recorded command line following POSIX shell quoting: single
/// quotes are literal, double quotes allow `\"` and `\\` escapes, and a
/// backslash outside quotes escapes the next character.
///
/// Returns `None` on an unterminated quote.
pub fn split_command_line(command: &str) -> Option<Vec<String>> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut chars = command.chars();

    while let Some(c) = chars.next() {
        match c {
            c if c.is_whitespace() => {
                if in_word {
                    args.push(std::mem::take(&mut current));
                    in_word = false;
                }
            },
            '\'' => {
                in_word = true;
                loop {
                    match chars.next()? {
                        '\'' => break,
                        c => current.push(c),
                    }
                }
            },
            '"' => {
                in_word = true;
                loop {
                    match chars.next()? {
                        '"' => break,
                        '\\' => match chars.next()? {
                            c @ ('"' | '\\' | '$' | '`') => current.push(c),
                            c => {
                                current.push('\\');
                                current.push(c);
                            },
                        },
                        c => current.push(c),
                    }
                }
            },
            '\\' => {
                in_word = true;
                if let Some(c) = chars.next() {
                    current.push(c);
                }
            },
            c => {
                in_word = true;
                current.push(c);
            },
        }
    }
    if in_word {
        args.push(current);
    }
    Some(args)
}

#[cfg(test)]
#[path = "../../tests/src/frontend/compile_db_tests.rs"]
mod tests;
