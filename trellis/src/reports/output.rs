//! Line-oriented rendering shared by the `check`, `compile` and `explain` reports.

/// Sink for report lines.
///
/// Reports call the layout methods below; a sink only decides where a
/// finished line goes. Warnings travel on the diagnostic channel, which
/// the terminal maps to stderr.
pub trait Output {
    /// Emit one finished report line.
    fn line(&mut self, line: &str);

    /// Emit one diagnostic line.
    fn diagnostic(&mut self, line: &str) {
        self.line(line);
    }

    /// Component or module heading, underlined.
    fn title(&mut self, text: &str) {
        self.line(text);
        self.line(&"=".repeat(text.chars().count()));
    }

    fn section(&mut self, name: &str) {
        self.line(&format!("{name}:"));
    }

    fn key_value(&mut self, key: &str, value: &str) {
        self.line(&format!("{key}: {value}"));
    }

    /// A key-value pair nested under the preceding title or section.
    fn key_value_indented(&mut self, key: &str, value: &str) {
        self.line(&format!("  {key}: {value}"));
    }

    fn list_item(&mut self, text: &str) {
        self.line(&format!("  - {text}"));
    }

    /// A generated file written to disk.
    fn added_item(&mut self, text: &str) {
        self.line(&format!("  + {text}"));
    }

    fn warning(&mut self, msg: &str) {
        self.diagnostic(&format!("warning: {msg}"));
    }

    /// Text laid out by the caller, such as a render tree. Emitted line by line.
    fn preformatted(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line);
        }
    }

    fn newline(&mut self) {
        self.line("");
    }
}

/// A report that can render itself to an output.
pub trait Report {
    fn render(&self, out: &mut dyn Output);
}

/// Prints report lines to stdout and diagnostics to stderr.
#[derive(Debug, Default)]
pub struct TerminalOutput;

impl TerminalOutput {
    pub fn new() -> Self {
        Self
    }
}

impl Output for TerminalOutput {
    fn line(&mut self, line: &str) {
        println!("{line}");
    }

    fn diagnostic(&mut self, line: &str) {
        eprintln!("{line}");
    }
}

/// Collects rendered lines, for asserting on report layout.
#[cfg(test)]
#[derive(Default)]
pub(crate) struct BufferOutput {
    pub lines: Vec<String>,
    pub diagnostics: Vec<String>,
}

#[cfg(test)]
impl Output for BufferOutput {
    fn line(&mut self, line: &str) {
        self.lines.push(line.to_string());
    }

    fn diagnostic(&mut self, line: &str) {
        self.diagnostics.push(line.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_is_underlined_per_char() {
        let mut out = BufferOutput::default();
        out.title("Card <card-view>");
        assert_eq!(out.lines, ["Card <card-view>", "================"]);
    }

    #[test]
    fn test_warnings_stay_off_report_lines() {
        let mut out = BufferOutput::default();
        out.warning("module AppModule bootstraps nothing");
        out.preformatted("View_App_Host 0 (Host)\n  View_App 1 (Component)");

        assert_eq!(out.diagnostics, ["warning: module AppModule bootstraps nothing"]);
        assert_eq!(out.lines, ["View_App_Host 0 (Host)", "  View_App 1 (Component)"]);
    }
}
