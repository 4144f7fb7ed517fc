//! CLI command implementations
//!
//! All command functions return `CliResult<ExitCode>` instead of calling
//! `process::exit`. Error handling and exits happen in the top-level `run()`.

use std::fs;
use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use pepp_syntax::intern::StringPool;
use pepp_syntax::lexer::pep::lex;
use thiserror::Error;

use crate::diagnostics;
use crate::driver::TargetKind;
use crate::driver::pep10::{self, Features, Pep10Pipeline, Stage};
use crate::format::{self, FormatConfig, FormatError};

use super::{CliError, CliResult, ExitCode, OutputFormat};

/// Maximum source file size (16 MB)
///
/// Pep/10 programs address 64 KiB; anything this large is not assembly source.
const MAX_SOURCE_SIZE: u64 = 16 * 1024 * 1024;

/// Failures of the command implementations, before they become a [`CliError`].
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Cannot access file '{path}': {source}")]
    Access { path: PathBuf, source: std::io::Error },
    #[error("Source file '{path}' is too large ({size} bytes, max {MAX_SOURCE_SIZE} bytes)")]
    TooLarge { path: PathBuf, size: u64 },
    #[error("Error writing '{path}': {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("{count} error(s) in {path}")]
    Assembly { path: PathBuf, count: usize },
    #[error("No {what} for {path}; assemble through the {stage} stage first")]
    MissingOutput {
        what: &'static str,
        path: PathBuf,
        stage: Stage,
    },
    #[error("Error formatting '{path}': {source}")]
    Format { path: PathBuf, source: FormatError },
    #[error("Error rendering JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CommandError> for CliError {
    fn from(e: CommandError) -> Self {
        CliError::failure(e.to_string())
    }
}

/// Read source file contents.
///
/// ## Errors
///
/// Returns an error if:
/// - The file cannot be read (I/O error)
/// - The file exceeds `MAX_SOURCE_SIZE`
pub fn read_source(path: &Path) -> Result<String, CommandError> {
    let access = |source| CommandError::Access {
        path: path.to_path_buf(),
        source,
    };
    let metadata = fs::metadata(path).map_err(access)?;
    if metadata.len() > MAX_SOURCE_SIZE {
        return Err(CommandError::TooLarge {
            path: path.to_path_buf(),
            size: metadata.len(),
        });
    }
    fs::read_to_string(path).map_err(access)
}

fn write_output(output: Option<&Path>, text: &str) -> Result<(), CommandError> {
    match output {
        Some(path) => fs::write(path, text).map_err(|source| CommandError::Write {
            path: path.to_path_buf(),
            source,
        }),
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

// ============================================================================
// asm
// ============================================================================

/// Options of the `asm` command.
#[derive(Debug, Clone)]
pub struct AsmOptions {
    pub file: PathBuf,
    pub os: Option<PathBuf>,
    pub stage: Stage,
    pub ignore_undefined: bool,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

/// Build a pipeline for a program and optional operating system, run it through `stage`.
///
/// Returns the pipeline and whether every target reached its goal.
pub fn assemble_sources(user: &str, os: Option<&str>, stage: Stage, features: Features) -> (Pep10Pipeline, bool) {
    let mut pipeline = pep10::pipeline();
    if let Some(os) = os {
        pep10::add_os(&mut pipeline, os, features);
    }
    pep10::add_user(&mut pipeline, user, features);
    let ok = pipeline.assemble_to(stage);
    (pipeline, ok)
}

/// Text for `format`, taken from the user target.
pub fn render_output(pipeline: &Pep10Pipeline, format: OutputFormat, path: &Path) -> Result<String, CommandError> {
    let Some(user) = pipeline.target(TargetKind::User) else {
        return Ok(String::new());
    };
    let symbols = &pipeline.globals.symbols;
    let lines = pep10::lines(user);
    let missing = |what, stage| CommandError::MissingOutput {
        what,
        path: path.to_path_buf(),
        stage,
    };

    let rows = match format {
        OutputFormat::Listing => format::listing(lines, symbols, &FormatConfig::default()),
        OutputFormat::Hex => format::hex_listing(lines, symbols),
        OutputFormat::Json => {
            let object = pep10::object(user).ok_or_else(|| missing("object file", Stage::ExportToObject))?;
            return Ok(format!("{}\n", serde_json::to_string_pretty(&object.to_json())?));
        }
        OutputFormat::Pepo => {
            let object = pep10::object(user).ok_or_else(|| missing("object code", Stage::ExportToObject))?;
            return Ok(object.to_pepo());
        }
    };
    let mut out = rows.join("\n");
    if !out.is_empty() {
        out.push('\n');
    }
    Ok(out)
}

/// Assemble a Pep/10 program.
pub fn assemble_file(options: &AsmOptions) -> CliResult<ExitCode> {
    let user = read_source(&options.file)?;
    let os = options.os.as_deref().map(read_source).transpose()?;
    let features = Features {
        ignore_undefined_symbols: options.ignore_undefined,
        ..Features::default()
    };

    let (pipeline, ok) = assemble_sources(&user, os.as_deref(), options.stage, features);
    if !ok {
        let color = std::io::stderr().is_terminal();
        let mut count = 0;
        let mut failed_path = options.file.clone();
        for target in pipeline.targets() {
            let (path, source) = match target.kind {
                TargetKind::User => (&options.file, user.as_str()),
                TargetKind::Os => match (&options.os, &os) {
                    (Some(path), Some(source)) => (path, source.as_str()),
                    _ => continue,
                },
            };
            let errors = pep10::errors(target);
            if errors.is_empty() {
                continue;
            }
            count += errors.len();
            failed_path = path.clone();
            let name = path.display().to_string();
            for d in diagnostics::from_target_errors(&name, source, &errors) {
                eprintln!("{}", diagnostics::render(&d, color));
            }
        }
        return Err(CommandError::Assembly {
            path: failed_path,
            count,
        }
        .into());
    }

    let text = render_output(&pipeline, options.format, &options.file)?;
    write_output(options.output.as_deref(), &text)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// fmt / lex
// ============================================================================

/// Format a Pep/10 source file.
pub fn format_file(path: &Path, check_mode: bool, diff_mode: bool) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let to_error = |source| CommandError::Format {
        path: path.to_path_buf(),
        source,
    };
    let formatted = format::format_source(&source).map_err(to_error)?;
    let changed = source != formatted;

    if diff_mode && changed {
        println!("--- {}", path.display());
        if let Some(diff) = format::format_diff(&source).map_err(to_error)? {
            print!("{diff}");
        }
    }

    if check_mode || diff_mode {
        if changed {
            return Err(CliError::failure(format!("Would reformat: {}", path.display())));
        }
        println!("✓ {} already formatted", path.display());
    } else if changed {
        write_output(Some(path), &formatted)?;
        println!("Formatted: {}", path.display());
    }
    Ok(ExitCode::SUCCESS)
}

/// Lex and display tokens.
pub fn lex_file(path: &Path) -> CliResult<ExitCode> {
    let source = read_source(path)?;
    let pool = StringPool::shared();
    let tokens = lex(&source, pool.clone());
    let pool = pool.borrow();
    for token in &tokens {
        println!("{} {}", token.interval, token.repr(&pool));
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const OS: &str = ".EXPORT charIn\n.SCALL DECI\nDECI: RET\ncharIn: .BLOCK 1\n";

    #[test]
    fn test_assemble_sources_with_os() {
        let (pipeline, ok) = assemble_sources("@DECI 0,i\nLDBA charIn,d\n", Some(OS), Stage::End, Features::default());
        assert!(ok);
        assert_eq!(pipeline.targets().len(), 2);
        assert!(pipeline.targets().iter().all(|t| t.stage == Stage::End));
    }

    #[test]
    fn test_render_output_formats() {
        let (pipeline, ok) = assemble_sources("RET\n", None, Stage::End, Features::default());
        assert!(ok);
        let path = Path::new("prog.pep");
        assert_eq!(render_output(&pipeline, OutputFormat::Pepo, path).unwrap(), "01 \nzz\n");
        assert_eq!(render_output(&pipeline, OutputFormat::Hex, path).unwrap(), "0000     01\n");
        let json = render_output(&pipeline, OutputFormat::Json, path).unwrap();
        assert!(json.contains("\".text\""));
    }

    #[test]
    fn test_render_output_needs_object_stage() {
        let (pipeline, ok) = assemble_sources("RET\n", None, Stage::AssignAddresses, Features::default());
        assert!(ok);
        let err = render_output(&pipeline, OutputFormat::Json, Path::new("p.pep")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "No object file for p.pep; assemble through the export-to-object stage first"
        );
        let listing = render_output(&pipeline, OutputFormat::Listing, Path::new("p.pep")).unwrap();
        assert_eq!(listing, "0000  01              RET\n");
    }

    #[test]
    fn test_read_source_missing_file() {
        let err = read_source(Path::new("/definitely/not/here.pep")).unwrap_err();
        assert!(matches!(err, CommandError::Access { .. }));
    }
}
