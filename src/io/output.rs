//! Output management for CLI commands.
//!
//! Handles formatting and display for different output formats,
//! providing a unified interface for text and JSON output.

use crate::diagnostics::Diagnostics;
use crate::display::THEME;
use crate::error::SpathError;
use crate::io::exit_code::ExitCode;
use crate::io::format::{JsonResponse, OutputFormat, ResponseMeta};
use serde::Serialize;
use std::fmt::Display;
use std::io::{self, Write};
use std::time::Instant;

/// Manages output formatting and display.
///
/// Results go to stdout. Diagnostics and errors go to stderr in text mode;
/// in JSON mode diagnostics travel inside the envelope.
pub struct OutputManager {
    format: OutputFormat,
    stdout: Box<dyn Write>,
    stderr: Box<dyn Write>,
    started: Instant,
}

impl OutputManager {
    /// Create a new output manager with the specified format.
    pub fn new(format: OutputFormat) -> Self {
        Self::with_writers(format, Box::new(io::stdout()), Box::new(io::stderr()))
    }

    /// Output manager writing somewhere other than the process streams.
    pub fn with_writers(format: OutputFormat, stdout: Box<dyn Write>, stderr: Box<dyn Write>) -> Self {
        Self {
            format,
            stdout,
            stderr,
            started: Instant::now(),
        }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Output a successful result.
    ///
    /// In JSON mode, wraps the data in a success response.
    /// In text mode, displays the data using its Display implementation.
    pub fn success<T>(&mut self, data: T, diagnostics: &Diagnostics) -> io::Result<ExitCode>
    where
        T: Serialize + Display,
    {
        self.result(data, ExitCode::Success, "Operation completed successfully", diagnostics)
    }

    /// Output a result together with an explicit exit code, e.g. an empty
    /// match set reported as `NotFound`.
    pub fn result<T>(
        &mut self,
        data: T,
        code: ExitCode,
        message: &str,
        diagnostics: &Diagnostics,
    ) -> io::Result<ExitCode>
    where
        T: Serialize + Display,
    {
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::success(&data)
                    .with_code(code, message)
                    .with_diagnostics(diagnostics.iter().cloned().collect())
                    .with_meta(self.meta());
                writeln!(self.stdout, "{}", serde_json::to_string_pretty(&response)?)?;
            }
            OutputFormat::Text => {
                write!(self.stdout, "{data}")?;
                if !code.is_success() {
                    writeln!(self.stderr, "{message}")?;
                }
                self.text_diagnostics(diagnostics)?;
            }
        }
        Ok(code)
    }

    /// Output an error with suggestions and "did you mean" candidates.
    pub fn error(
        &mut self,
        error: &SpathError,
        did_you_mean: Vec<String>,
        diagnostics: &Diagnostics,
    ) -> io::Result<ExitCode> {
        match self.format {
            OutputFormat::Json => {
                let response = JsonResponse::from_error(error, did_you_mean)
                    .with_diagnostics(diagnostics.iter().cloned().collect())
                    .with_meta(self.meta());
                writeln!(self.stdout, "{}", serde_json::to_string_pretty(&response)?)?;
            }
            OutputFormat::Text => {
                writeln!(self.stderr, "{}", THEME.error_with_icon(&error.to_string()))?;
                if !did_you_mean.is_empty() {
                    writeln!(self.stderr, "Did you mean:")?;
                    for candidate in &did_you_mean {
                        writeln!(self.stderr, "  {}", THEME.apply(&THEME.code, candidate))?;
                    }
                }
                for suggestion in error.recovery_suggestions() {
                    writeln!(self.stderr, "  Suggestion: {suggestion}")?;
                }
                self.text_diagnostics(diagnostics)?;
            }
        }
        Ok(ExitCode::from_error(error))
    }

    /// Output informational message (text mode only).
    pub fn info(&mut self, message: &str) -> io::Result<()> {
        if matches!(self.format, OutputFormat::Text) {
            writeln!(self.stdout, "{message}")?;
        }
        Ok(())
    }

    fn text_diagnostics(&mut self, diagnostics: &Diagnostics) -> io::Result<()> {
        for diagnostic in diagnostics.iter() {
            writeln!(
                self.stderr,
                "{}",
                THEME.warning_with_icon(&diagnostic.to_string())
            )?;
        }
        Ok(())
    }

    fn meta(&self) -> ResponseMeta {
        ResponseMeta::now(Some(self.started.elapsed().as_millis() as u64))
    }
}
