use std::io::IsTerminal;
use std::io::Read as _;

use anyhow::Context;
use anyhow::Result;
use camino::Utf8Path;
use camino::Utf8PathBuf;
use clap::Parser;
use mjl_conf::Settings;
use mjl_diagnostics::validate;
use mjl_diagnostics::Defect;
use mjl_diagnostics::SeverityPolicy;
use mjl_diagnostics::ValidateOptions;
use mjl_source::Diagnostic;
use mjl_source::DiagnosticRenderer;
use mjl_source::LineCol;
use mjl_source::LineIndex;
use mjl_source::Severity;
use mjl_source::Span;

use crate::args::Args;
use crate::commands::Command;
use crate::exit::Exit;
use crate::walk::walk_files;

#[derive(Debug, Parser)]
pub struct Check {
    /// Files or directories to check. Reads from stdin when omitted
    /// and input is piped.
    paths: Vec<Utf8PathBuf>,

    /// Suppress warning-severity diagnostics.
    #[arg(long)]
    no_warnings: bool,

    /// Suppress hint-severity diagnostics.
    #[arg(long)]
    no_hints: bool,
}

impl Command for Check {
    fn execute(&self, _args: &Args) -> Result<Exit> {
        let project_root = resolve_project_root()?;
        let settings =
            Settings::new(project_root.as_std_path()).context("Failed to load settings")?;
        let options = self.build_options(&settings);
        let fmt = pick_renderer();

        let reading_stdin = !std::io::stdin().is_terminal() && self.paths.is_empty();
        if reading_stdin {
            return check_stdin(&options, &fmt);
        }

        let search_roots: Vec<Utf8PathBuf> = if self.paths.is_empty() {
            vec![project_root.clone()]
        } else {
            self.paths
                .iter()
                .map(|p| {
                    if p.is_relative() {
                        project_root.join(p)
                    } else {
                        p.clone()
                    }
                })
                .collect()
        };

        let files = walk_files(&search_roots, is_checkable);
        if files.is_empty() {
            return Ok(Exit::success());
        }

        let mut error_count: usize = 0;
        let mut file_count: usize = 0;

        for path in &files {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {path}"))?;
            let defects = validate(&source, &options);
            if defects.is_empty() {
                continue;
            }

            let errors = render_defects(&source, path.as_str(), &defects, &fmt);
            if errors > 0 {
                file_count += 1;
                error_count += errors;
            }
        }

        if error_count > 0 {
            let file_word = if file_count == 1 { "file" } else { "files" };
            let error_word = if error_count == 1 { "error" } else { "errors" };
            Ok(Exit::error().with_message(format!(
                "Found {error_count} {error_word} in {file_count} {file_word}."
            )))
        } else {
            Ok(Exit::success())
        }
    }
}

impl Check {
    fn build_options(&self, settings: &Settings) -> ValidateOptions {
        ValidateOptions {
            policy: SeverityPolicy {
                show_warnings: settings.diagnostics.show_warnings && !self.no_warnings,
                show_hints: settings.diagnostics.show_hints && !self.no_hints,
            },
            max_length: Some(settings.max_document_bytes),
        }
    }
}

fn check_stdin(options: &ValidateOptions, fmt: &DiagnosticRenderer) -> Result<Exit> {
    let mut source = String::new();
    std::io::stdin()
        .read_to_string(&mut source)
        .context("Failed to read stdin")?;

    let defects = validate(&source, options);
    if defects.is_empty() {
        return Ok(Exit::success());
    }

    let errors = render_defects(&source, "<stdin>", &defects, fmt);
    if errors > 0 {
        let word = if errors == 1 { "error" } else { "errors" };
        Ok(Exit::error().with_message(format!("Found {errors} {word}.")))
    } else {
        Ok(Exit::success())
    }
}

/// Render each defect on its own snippet; returns how many were errors.
///
/// Defects carry line/column positions, so the byte span for snippet
/// underlining is recovered through a fresh line index per file.
fn render_defects(
    source: &str,
    path: &str,
    defects: &[Defect],
    fmt: &DiagnosticRenderer,
) -> usize {
    let line_index = LineIndex::from_text(source);
    let source_length = u32::try_from(source.len()).unwrap_or(u32::MAX);
    let mut errors = 0;

    for defect in defects {
        if defect.severity == Severity::Error {
            errors += 1;
        }

        let start = line_index
            .offset(LineCol::new(defect.line.saturating_sub(1), defect.column))
            .offset();
        let length = defect.length.min(source_length.saturating_sub(start));
        let span = Span::new(start, length);

        let diag = Diagnostic::new(
            source,
            path,
            defect.code,
            &defect.message,
            defect.severity,
            span,
            "",
        );
        println!("{}\n", fmt.render(&diag));
    }

    errors
}

fn resolve_project_root() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|_| anyhow::anyhow!("Current directory is not valid UTF-8"))
}

fn is_checkable(path: &Utf8Path) -> bool {
    matches!(path.extension(), Some("mustache" | "json"))
}

fn pick_renderer() -> DiagnosticRenderer {
    if std::io::stdout().is_terminal() {
        DiagnosticRenderer::styled()
    } else {
        DiagnosticRenderer::plain()
    }
}
