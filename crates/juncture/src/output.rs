//! Colored terminal output utilities.

use console::{Style, Term};

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    red: Style,
    cyan_bold: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            red: Style::new().red(),
            cyan_bold: Style::new().cyan().bold(),
        }
    }

    /// Print a startup banner: a highlighted title, then one aligned line per
    /// field.
    pub(crate) fn banner(&self, title: &str, fields: &[(&str, String)]) {
        self.highlight(title);
        for line in banner_lines(fields) {
            let _ = self.term.write_line(&line);
        }
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }

    /// Print a highlighted message (cyan bold).
    fn highlight(&self, msg: &str) {
        let _ = self
            .term
            .write_line(&self.cyan_bold.apply_to(msg).to_string());
    }
}

/// Format `label: value` lines with values aligned in one column.
fn banner_lines(fields: &[(&str, String)]) -> Vec<String> {
    let width = fields.iter().map(|(label, _)| label.len() + 1).max().unwrap_or(0);
    fields
        .iter()
        .map(|(label, value)| format!("  {:<width$} {value}", format!("{label}:")))
        .collect()
}
