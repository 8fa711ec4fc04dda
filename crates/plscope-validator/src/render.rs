//! Human-readable diagnostic reports

use ariadne::{Config, Label, Report, ReportKind, Source};
use plscope_ast::{Diagnostic, Span};
use tracing::warn;

/// Render diagnostics against their source as plain-text reports
pub fn render(source: &str, file_name: &str, diagnostics: &[Diagnostic]) -> String {
    let mut out = Vec::new();

    for diagnostic in diagnostics {
        let range = char_range(source, diagnostic.span);
        let result = Report::build(ReportKind::Error, file_name.to_string(), range.start)
            .with_config(Config::default().with_color(false))
            .with_message(&diagnostic.message)
            .with_label(
                Label::new((file_name.to_string(), range)).with_message(&diagnostic.message),
            )
            .finish()
            .write((file_name.to_string(), Source::from(source)), &mut out);

        if let Err(err) = result {
            warn!(error = %err, line = diagnostic.line, "failed to render diagnostic");
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Reports index by character, spans by byte
fn char_range(source: &str, span: Span) -> std::ops::Range<usize> {
    let to_chars = |byte: usize| {
        let byte = byte.min(source.len());
        source.get(..byte).map_or(0, |prefix| prefix.chars().count())
    };
    let start = to_chars(span.start);
    let end = to_chars(span.end).max(start + 1);
    start..end
}
