//! Human-readable diagnostic output.

use std::io::{self, Write};

use crate::span_utils::LineOffsetTable;
use crate::{Diagnostic, Severity};

mod colors {
    pub const ERROR: &str = "\x1b[1;31m";
    pub const WARNING: &str = "\x1b[1;33m";
    pub const NOTE: &str = "\x1b[1;36m";
    pub const BOLD: &str = "\x1b[1m";
    pub const RESET: &str = "\x1b[0m";
}

/// Color output mode for the terminal emitter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorMode {
    /// Colors when the output is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorMode {
    pub fn should_use_colors(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

/// Source text a diagnostic's spans point into.
#[derive(Clone, Debug)]
pub struct SourceFile<'a> {
    pub path: &'a str,
    pub text: &'a str,
    lines: LineOffsetTable,
}

impl<'a> SourceFile<'a> {
    pub fn new(path: &'a str, text: &'a str) -> Self {
        SourceFile {
            path,
            text,
            lines: LineOffsetTable::build(text),
        }
    }
}

/// Writes diagnostics as `error[E2001]: message` followed by located
/// labels and notes.
pub struct TerminalEmitter<'a, W: Write> {
    writer: W,
    colors: bool,
    source: Option<SourceFile<'a>>,
}

impl<'a, W: Write> TerminalEmitter<'a, W> {
    pub fn new(writer: W, mode: ColorMode, is_tty: bool) -> Self {
        TerminalEmitter {
            writer,
            colors: mode.should_use_colors(is_tty),
            source: None,
        }
    }

    /// Resolve spans to `path:line:col` against `source`.
    #[must_use]
    pub fn with_source(mut self, source: SourceFile<'a>) -> Self {
        self.source = Some(source);
        self
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    pub fn emit(&mut self, diagnostic: &Diagnostic) -> io::Result<()> {
        let color = match diagnostic.severity {
            Severity::Error => colors::ERROR,
            Severity::Warning => colors::WARNING,
            Severity::Note => colors::NOTE,
        };
        if self.colors {
            write!(
                self.writer,
                "{color}{}{}{}[{}]{}",
                diagnostic.severity,
                colors::RESET,
                colors::BOLD,
                diagnostic.code,
                colors::RESET
            )?;
        } else {
            write!(self.writer, "{}[{}]", diagnostic.severity, diagnostic.code)?;
        }
        writeln!(self.writer, ": {}", diagnostic.message)?;

        for label in &diagnostic.labels {
            let marker = if label.is_primary { "-->" } else { "   " };
            let location = match &self.source {
                Some(src) => {
                    let (line, col) = src.lines.span_start(src.text, label.span);
                    format!("{}:{line}:{col}", src.path)
                }
                None => format!("{:?}", label.span),
            };
            writeln!(self.writer, "  {marker} {location}: {}", label.message)?;
        }

        for note in &diagnostic.notes {
            writeln!(self.writer, "  = note: {note}")?;
        }
        Ok(())
    }

    pub fn emit_all(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        for diagnostic in diagnostics {
            self.emit(diagnostic)?;
        }
        self.writer.flush()
    }
}
