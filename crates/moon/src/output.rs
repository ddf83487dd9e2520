//! Startup banner and error lines on stderr.

use std::fmt::Display;

use console::{Style, Term};

pub(crate) struct Output {
    term: Term,
    title: Style,
    label: Style,
    on: Style,
    failure: Style,
}

impl Output {
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            title: Style::new().cyan().bold(),
            label: Style::new().dim(),
            on: Style::new().green(),
            failure: Style::new().red(),
        }
    }

    pub(crate) fn title(&self, text: &str) {
        self.line(&self.title.apply_to(text).to_string());
    }

    /// `label: value`, with the label dimmed.
    pub(crate) fn field(&self, label: &str, value: impl Display) {
        self.line(&format!("{} {value}", self.label.apply_to(format!("{label}:"))));
    }

    /// Like [`Output::field`], with the value in green.
    pub(crate) fn field_on(&self, label: &str, value: impl Display) {
        self.field(label, self.on.apply_to(value));
    }

    pub(crate) fn error(&self, err: &dyn Display) {
        self.line(&self.failure.apply_to(format!("Error: {err}")).to_string());
    }

    fn line(&self, text: &str) {
        // Nothing sensible to do when stderr is gone.
        let _ = self.term.write_line(text);
    }
}
