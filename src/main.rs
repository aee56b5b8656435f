//! CLI tool to check and inspect OSCScript files.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use oscscript_rs::{
    AnalysisCache, Error, Location, SymbolIndex, SymbolKind, Vocabulary, include_closure, outline,
    plan_rename, validate,
};
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "OSCSCRIPT_LOG";

#[derive(Debug, Parser)]
#[command(name = "oscscript", version, about = "Check and inspect OSCScript files")]
struct Cli {
    /// TOML file overriding the built-in command tables
    #[arg(long, global = true, value_name = "PATH")]
    vocabulary: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report diagnostics for each file
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List the include closure of a file
    Includes { file: PathBuf },
    /// List subroutine (or variable) definitions and references
    Symbols {
        file: PathBuf,
        /// Show variables instead of subroutines
        #[arg(long)]
        variables: bool,
    },
    /// List the subroutines defined in a file
    Outline { file: PathBuf },
    /// Print the edits that rename a subroutine (or variable)
    Rename {
        file: PathBuf,
        name: String,
        new_name: String,
        /// Rename a variable instead of a subroutine
        #[arg(long)]
        variables: bool,
    },
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(code) => code,
        Err(e @ Error::Vocabulary(_)) => {
            eprintln!("Error: {e}");
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<ExitCode, Error> {
    let vocabulary = match &cli.vocabulary {
        Some(path) => Vocabulary::load(path)?,
        None => Vocabulary::default(),
    };

    let code = match cli.command {
        Command::Check { files } => check(&files, &vocabulary),
        Command::Includes { file } => {
            for path in include_closure(&file, None, &vocabulary) {
                println!("{}", path.display());
            }
            ExitCode::SUCCESS
        }
        Command::Symbols { file, variables } => {
            let cache = AnalysisCache::new(Arc::new(vocabulary));
            let index = if variables {
                cache.variable_index(&file, None, None)
            } else {
                cache.subroutine_index(&file, None, None)
            };
            print_index(&index);
            ExitCode::SUCCESS
        }
        Command::Outline { file } => match read_script(&file) {
            Ok(text) => {
                for entry in outline(&text, &vocabulary) {
                    println!(
                        "{} {}-{}",
                        entry.name,
                        entry.start_line + 1,
                        entry.end_line + 1
                    );
                }
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("{}: {e}", file.display());
                ExitCode::FAILURE
            }
        },
        Command::Rename {
            file,
            name,
            new_name,
            variables,
        } => {
            let kind = if variables {
                SymbolKind::Variable
            } else {
                SymbolKind::Subroutine
            };
            rename(&file, kind, &name, &new_name, vocabulary)?;
            ExitCode::SUCCESS
        }
    };
    Ok(code)
}

fn rename(
    file: &Path,
    kind: SymbolKind,
    name: &str,
    new_name: &str,
    vocabulary: Vocabulary,
) -> Result<(), Error> {
    let cache = AnalysisCache::new(Arc::new(vocabulary));
    let index = match kind {
        SymbolKind::Subroutine => cache.subroutine_index(file, None, None),
        SymbolKind::Variable => cache.variable_index(file, None, None),
    };

    let name = name.trim_start_matches('$').to_lowercase();
    for edit in plan_rename(&index, kind, &name, new_name, cache.vocabulary())? {
        println!(
            "{}-{} {}",
            format_location(&edit.location),
            edit.location.end,
            edit.new_text
        );
    }
    Ok(())
}

fn check(files: &[PathBuf], vocabulary: &Vocabulary) -> ExitCode {
    let mut had_error = false;

    for path in files {
        let content = match read_script(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("{}: {e}", path.display());
                had_error = true;
                continue;
            }
        };

        let absolute = absolute(path);
        let diagnostics = validate(&absolute, &content, vocabulary);
        for diagnostic in &diagnostics {
            println!("{}:{diagnostic}", path.display());
        }

        let errors = diagnostics.iter().filter(|d| d.is_error()).count();
        let warnings = diagnostics.len() - errors;
        if errors > 0 {
            had_error = true;
        }
        eprintln!(
            "{}: {errors} error(s), {warnings} warning(s)",
            path.display()
        );
    }

    if had_error {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn print_index(index: &SymbolIndex) {
    let mut names: Vec<&String> = index.definitions.keys().chain(index.references.keys()).collect();
    names.sort_unstable();
    names.dedup();

    for name in names {
        println!("{name}");
        for location in index.definitions_of(name) {
            println!("  def {}", format_location(location));
        }
        for location in index.references_of(name) {
            println!("  ref {}", format_location(location));
        }
    }
}

fn format_location(location: &Location) -> String {
    format!(
        "{}:{}:{}",
        location.path.display(),
        location.line + 1,
        location.start + 1
    )
}

/// Script text with invalid UTF-8 replaced.
fn read_script(path: &Path) -> io::Result<String> {
    fs::read(path).map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}

fn init_tracing() {
    let filter = std::env::var(LOG_ENV)
        .ok()
        .or_else(|| std::env::var("RUST_LOG").ok())
        .and_then(|expr| EnvFilter::try_new(expr).ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .try_init();
}
