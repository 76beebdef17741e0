use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use tjls_core::text::{byte_offset, line_at};
use tjls_core::{
    AnalysisOptions, Diagnostic, OutlineNode, Position, Symbol, TextEdit, WorkspaceOptions, analyze, context_at,
    document_outline, plan_rename, search_workspace,
};


const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Parser)]
#[command(
    name = "tjls",
    author,
    version,
    about = "Check and navigate TaskJuggler project files",
    long_about = None
)]
struct CliArgs {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Validate files and print their diagnostics; exits non-zero on any error
    Check {
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,

        /// Emit diagnostics as JSON
        #[arg(long)]
        json: bool,

        /// Only print errors, not warnings
        #[arg(long)]
        errors_only: bool,

        /// Do not report undefined accounts in charge/chargeset/revenue/purge
        #[arg(long)]
        no_account_refs: bool,
    },
    /// Print the symbol outline of a file
    Symbols {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Emit the full symbol table as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the block context at a 1-based line and column as JSON
    Context {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "LINE", value_parser = clap::value_parser!(u32).range(1..))]
        line: u32,
        #[arg(value_name = "COL", value_parser = clap::value_parser!(u32).range(1..))]
        col: u32,
    },
    /// Find task, resource, account and scenario definitions under a directory
    Search {
        #[arg(value_name = "ROOT")]
        root: PathBuf,

        /// Case-insensitive substring of an id or name; empty lists everything
        #[arg(value_name = "QUERY", default_value = "")]
        query: String,

        /// Directory names to skip (repeatable); replaces the default list
        #[arg(long = "exclude", value_name = "DIR")]
        exclude: Vec<String>,

        /// Stop after this many files
        #[arg(long, value_name = "N")]
        max_files: Option<usize>,
    },
    /// Rename the task, resource or account at a 1-based line and column
    Rename {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(value_name = "LINE", value_parser = clap::value_parser!(u32).range(1..))]
        line: u32,
        #[arg(value_name = "COL", value_parser = clap::value_parser!(u32).range(1..))]
        col: u32,
        #[arg(value_name = "NEW_NAME")]
        new_name: String,

        /// Rewrite the file instead of printing the edits
        #[arg(long)]
        write: bool,
    },
}

#[derive(Debug, Serialize)]
struct FileReport<'a> {
    file: String,
    diagnostics: Vec<&'a Diagnostic>,
}

fn read_file_content(path: &Path) -> anyhow::Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("Failed to read file '{}'", path.display()))
}

/// 1-based command-line coordinates to a core position.
fn position_from_args(line: u32, col: u32) -> Position {
    Position::new(line.saturating_sub(1), col.saturating_sub(1))
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;

    let filter_expr = std::env::var("TJLS_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok();

    let builder = fmt().with_writer(std::io::stderr).with_ansi(false);

    let builder = match filter_expr.and_then(|expr| EnvFilter::try_new(expr).ok()) {
        Some(filter) => builder.with_env_filter(filter),
        None => builder.with_env_filter(DEFAULT_LOG_FILTER),
    };

    let _ = builder.try_init();
}

fn run_check(files: &[PathBuf], json: bool, errors_only: bool, options: &AnalysisOptions) -> anyhow::Result<ExitCode> {
    let mut analyses = Vec::with_capacity(files.len());
    for path in files {
        let text = read_file_content(path)?;
        analyses.push((path, analyze(&text, options)));
    }

    let mut errors = 0;
    let mut warnings = 0;
    let mut reports = Vec::with_capacity(analyses.len());
    for (path, analysis) in &analyses {
        let diagnostics: Vec<&Diagnostic> = analysis
            .diagnostics
            .iter()
            .filter(|d| !errors_only || d.is_error())
            .collect();
        errors += analysis.error_count();
        warnings += analysis.diagnostics.len() - analysis.error_count();
        reports.push(FileReport {
            file: path.display().to_string(),
            diagnostics,
        });
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        for report in &reports {
            for diag in &report.diagnostics {
                println!("{}:{}", report.file, diag);
            }
        }
        if errors_only {
            println!("{errors} error(s) in {} file(s)", files.len());
        } else {
            println!("{errors} error(s), {warnings} warning(s) in {} file(s)", files.len());
        }
    }

    Ok(if errors > 0 { ExitCode::FAILURE } else { ExitCode::SUCCESS })
}

fn print_outline(nodes: &[OutlineNode], depth: usize) {
    for node in nodes {
        let symbol = &node.symbol;
        let detail = node.detail.as_deref().map(|d| format!("  ({d})")).unwrap_or_default();
        println!(
            "{:indent$}{} {} \"{}\" {}{}",
            "",
            symbol.kind().keyword(),
            symbol.id,
            symbol.name,
            symbol.id_range.start,
            detail,
            indent = depth * 2
        );
        print_outline(&node.children, depth + 1);
    }
}

fn run_symbols(path: &Path, json: bool) -> anyhow::Result<()> {
    let text = read_file_content(path)?;
    let symbols = tjls_core::extract_symbols(&text);
    if json {
        println!("{}", serde_json::to_string_pretty(&symbols)?);
        return Ok(());
    }
    print_outline(&document_outline(&text, &symbols), 0);
    for mac in &symbols.macros {
        println!("macro {} {}", mac.id, mac.id_range.start);
    }
    Ok(())
}

fn run_context(path: &Path, line: u32, col: u32) -> anyhow::Result<()> {
    let text = read_file_content(path)?;
    let ctx = context_at(&text, position_from_args(line, col));
    println!("{}", serde_json::to_string_pretty(&ctx)?);
    Ok(())
}

fn run_search(root: &Path, query: &str, exclude: Vec<String>, max_files: Option<usize>) -> anyhow::Result<()> {
    let mut options = WorkspaceOptions {
        max_files,
        ..WorkspaceOptions::default()
    };
    if !exclude.is_empty() {
        options.exclude = exclude;
    }
    let never = AtomicBool::new(false);
    let found = search_workspace(root, query, &options, &Default::default(), &never)?;
    debug!(count = found.len(), root = %root.display(), "workspace search finished");
    for hit in &found {
        let Symbol { id, name, id_range, .. } = &hit.symbol;
        println!(
            "{}:{} {} {} \"{}\"",
            hit.path.display(),
            id_range.start,
            hit.symbol.kind().keyword(),
            id,
            name
        );
    }
    Ok(())
}

/// Apply non-overlapping edits whose positions refer to `text`.
fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(text.match_indices('\n').map(|(idx, _)| idx + 1))
        .collect();
    let offset = |pos: Position| match line_starts.get(pos.line as usize) {
        Some(&start) => start + byte_offset(line_at(text, pos.line).unwrap_or(""), pos.character),
        None => text.len(),
    };

    let mut ordered: Vec<&TextEdit> = edits.iter().collect();
    ordered.sort_by(|a, b| b.range.start.cmp(&a.range.start));

    let mut out = text.to_string();
    for edit in ordered {
        out.replace_range(offset(edit.range.start)..offset(edit.range.end), &edit.new_text);
    }
    out
}

fn run_rename(path: &Path, line: u32, col: u32, new_name: &str, write: bool) -> anyhow::Result<()> {
    let text = read_file_content(path)?;
    let edits = plan_rename(&text, position_from_args(line, col), new_name)
        .with_context(|| format!("Cannot rename at {}:{line}:{col}", path.display()))?;

    if write {
        std::fs::write(path, apply_edits(&text, &edits))
            .with_context(|| format!("Failed to write file '{}'", path.display()))?;
        println!("Renamed {} occurrence(s) in {}", edits.len(), path.display());
    } else {
        for edit in &edits {
            println!("{}:{} {}", path.display(), edit.range, edit.new_text);
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<ExitCode> {
    init_tracing();

    let CliArgs { command } = CliArgs::parse();
    match command {
        Commands::Check {
            files,
            json,
            errors_only,
            no_account_refs,
        } => {
            let options = AnalysisOptions {
                check_account_references: !no_account_refs,
            };
            run_check(&files, json, errors_only, &options)
        }
        Commands::Symbols { file, json } => run_symbols(&file, json).map(|_| ExitCode::SUCCESS),
        Commands::Context { file, line, col } => run_context(&file, line, col).map(|_| ExitCode::SUCCESS),
        Commands::Search {
            root,
            query,
            exclude,
            max_files,
        } => run_search(&root, &query, exclude, max_files).map(|_| ExitCode::SUCCESS),
        Commands::Rename {
            file,
            line,
            col,
            new_name,
            write,
        } => run_rename(&file, line, col, &new_name, write).map(|_| ExitCode::SUCCESS),
    }
}
