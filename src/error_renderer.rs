//! Beautiful error rendering using ariadne
//!
//! This module renders Lanes errors with source snippets when the error can
//! be traced back to a place in the program description.

use crate::{CompileError, Error, ExecutionError};
use ariadne::{ColorGenerator, Label, Report, ReportKind, Source};
use std::io::Write;
use std::ops::Range;

/// Render an error with beautiful formatting to stderr
///
/// # Example
/// ```no_run
/// use lanes::{Engine, EngineOptions, render_error};
///
/// let engine = Engine::new(EngineOptions::default(), |_| {});
///
/// let source = r#"{"lanes": {"main": {"cards": [{"Jump": "nowhere"}]}}}"#;
/// if let Err(e) = engine.compile(source.as_bytes()) {
///     render_error(&e, source);
/// }
/// ```
pub fn render_error(error: &Error, source: &str) {
    render_error_to_writer(error, source, &mut std::io::stderr(), true).ok();
}

/// Render an error to a specific writer
pub fn render_error_to(error: &Error, source: &str, writer: &mut dyn Write) -> std::io::Result<()> {
    render_error_to_writer(error, source, writer, true)
}

/// Render an error to a String (useful for tests, web UIs, etc.)
pub fn render_error_to_string(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, true).ok();
    String::from_utf8_lossy(&buf).to_string()
}

/// Render an error to a String without color codes (useful for tests)
pub fn render_error_to_string_no_color(error: &Error, source: &str) -> String {
    let mut buf = Vec::new();
    render_error_to_writer(error, source, &mut buf, false).ok();
    String::from_utf8_lossy(&buf).to_string()
}

fn render_error_to_writer(
    error: &Error,
    source: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    match error {
        Error::Compilation(err) => match compile_error_span(err, source) {
            Some((span, label)) => {
                render_report(source, span, &err.to_string(), label, writer, use_color)
            }
            None => writeln!(writer, "Compilation error: {}", err),
        },
        Error::Load(err) => writeln!(writer, "Load error: {}", err),
        Error::Execution(ExecutionError::Runtime(err)) => writeln!(writer, "Runtime error: {}", err),
        Error::Execution(ExecutionError::ResourceExceeded(err)) => {
            writeln!(writer, "Resource limit exceeded: {}", err)
        }
    }
}

fn render_report(
    source: &str,
    span: Range<usize>,
    message: &str,
    label: &str,
    writer: &mut dyn Write,
    use_color: bool,
) -> std::io::Result<()> {
    let mut colors = ColorGenerator::new();
    colors.next(); // Skip the first color.

    let report = Report::build(ReportKind::Error, ("<program>", span.clone()))
        .with_message(message)
        .with_config(ariadne::Config::default().with_color(use_color))
        .with_label(
            Label::new(("<program>", span))
                .with_message(label)
                .with_color(colors.next()),
        );

    report
        .finish()
        .write(("<program>", Source::from(source)), &mut *writer)
}

/// Best-effort source span for a compile error, in characters.
fn compile_error_span(error: &CompileError, source: &str) -> Option<(Range<usize>, &'static str)> {
    match error {
        CompileError::Malformed { line, column, .. } => {
            let at = char_offset(source, *line, *column);
            Some((at..at + 1, "here"))
        }
        CompileError::DuplicateLane { name } => {
            let quoted = format!("\"{}\"", name);
            let first = source.find(&quoted)?;
            let second = source[first + quoted.len()..]
                .find(&quoted)
                .map(|at| first + quoted.len() + at)
                .unwrap_or(first);
            Some((char_span(source, second, quoted.len()), "declared again here"))
        }
        CompileError::DuplicateArgument { lane, .. } => {
            quoted_span(source, lane).map(|span| (span, "in this lane"))
        }
        _ => {
            let location = error.location()?;
            quoted_span(source, &location.lane).map(|span| (span, "in this lane"))
        }
    }
}

fn quoted_span(source: &str, name: &str) -> Option<Range<usize>> {
    let quoted = format!("\"{}\"", name);
    source
        .find(&quoted)
        .map(|at| char_span(source, at, quoted.len()))
}

fn char_span(source: &str, byte_start: usize, byte_len: usize) -> Range<usize> {
    let start = source[..byte_start].chars().count();
    let len = source[byte_start..byte_start + byte_len].chars().count();
    start..start + len
}

/// Character offset of a 1-based line and column.
fn char_offset(source: &str, line: usize, column: usize) -> usize {
    let mut offset = 0;
    for (index, text) in source.split_inclusive('\n').enumerate() {
        if index + 1 == line {
            return offset + column.saturating_sub(1).min(text.chars().count());
        }
        offset += text.chars().count();
    }
    offset
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Engine, EngineOptions};
    use indoc::indoc;

    fn compile_error(source: &str) -> Error {
        let engine = Engine::new(EngineOptions::default(), |_| {});
        engine
            .compile(source.as_bytes())
            .expect_err("compilation should fail")
    }

    #[test]
    fn test_render_malformed_json() {
        let source = indoc! {r#"
            {
              "lanes": {
                "main": { "cards": [ { "StringLiteral": "x" }, ] }
              }
            }
        "#};
        let output = render_error_to_string_no_color(&compile_error(source), source);

        assert!(output.contains("Error"));
        assert!(output.contains("malformed program description"));
        // Should show the offending line
        assert!(output.contains(r#""main": { "cards""#));
    }

    #[test]
    fn test_render_unresolved_target_points_at_lane() {
        let source = indoc! {r#"
            {
              "lanes": {
                "main": { "cards": [ { "Jump": "nowhere" } ] }
              }
            }
        "#};
        let output = render_error_to_string_no_color(&compile_error(source), source);

        assert!(output.contains("lane `nowhere` does not exist"));
        assert!(output.contains("in this lane"));
        assert!(output.lines().count() > 1);
    }

    #[test]
    fn test_render_without_location() {
        let source = r#"{"lanes": {}}"#;
        let output = render_error_to_string_no_color(&compile_error(source), source);
        assert_eq!(output, "Compilation error: program has no lanes\n");
    }

    #[test]
    fn test_char_offset() {
        let source = "ab\ncdé\nf";
        assert_eq!(char_offset(source, 1, 1), 0);
        assert_eq!(char_offset(source, 2, 3), 5);
        assert_eq!(char_offset(source, 3, 1), 7);
        assert_eq!(char_offset(source, 9, 1), 8);
    }
}
