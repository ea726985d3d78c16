//! Indented source text for the generate backend.

/// Accumulates generated source line by line, tracking bracket nesting.
///
/// Consuming methods chain for straight-line output; the `push_*` family
/// takes `&mut self` for use inside loops and recursive walks.
///
/// # Example
///
/// ```
/// use trellis_compiler::backend::CodeBuilder;
///
/// let mut b = CodeBuilder::new().comment("/AppModule/App/component.factory.rs");
/// b.push_open("let View_App = ViewDef {");
/// b.push_line("class: \"View_App\",");
/// b.push_close("};");
///
/// assert_eq!(
///     b.build(),
///     "// /AppModule/App/component.factory.rs\nlet View_App = ViewDef {\n    class: \"View_App\",\n};\n"
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct CodeBuilder {
    depth: usize,
    buffer: String,
}

const INDENT: &str = "    ";

impl CodeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(mut self, s: &str) -> Self {
        self.push_line(s);
        self
    }

    pub fn blank(mut self) -> Self {
        self.push_blank();
        self
    }

    pub fn comment(self, text: &str) -> Self {
        self.line(&format!("// {text}"))
    }

    /// Write a line at the current depth.
    pub fn push_line(&mut self, s: &str) -> &mut Self {
        self.buffer.push_str(&INDENT.repeat(self.depth));
        self.buffer.push_str(s);
        self.buffer.push('\n');
        self
    }

    /// Write an empty line, without trailing indentation.
    pub fn push_blank(&mut self) -> &mut Self {
        self.buffer.push('\n');
        self
    }

    /// Write `header` and nest the following lines one level deeper.
    pub fn push_open(&mut self, header: &str) -> &mut Self {
        self.push_line(header);
        self.depth += 1;
        self
    }

    /// Leave the innermost nesting level and write `close`.
    pub fn push_close(&mut self, close: &str) -> &mut Self {
        self.depth = self.depth.saturating_sub(1);
        self.push_line(close)
    }

    pub fn build(self) -> String {
        self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nested_blocks() {
        let mut b = CodeBuilder::new();
        b.push_open("nodes: [")
            .push_open("Element(\"p\") [")
            .push_line("Text(\"hi\"),")
            .push_close("],")
            .push_close("],");

        assert_eq!(
            b.build(),
            "nodes: [\n    Element(\"p\") [\n        Text(\"hi\"),\n    ],\n],\n"
        );
    }

    #[test]
    fn test_close_never_underflows() {
        let mut b = CodeBuilder::new();
        b.push_close("}").push_blank().push_line("export View_App;");
        assert_eq!(b.build(), "}\n\nexport View_App;\n");
    }

    #[test]
    fn test_comment() {
        let code = CodeBuilder::new().comment("generated").blank().build();
        assert_eq!(code, "// generated\n\n");
    }
}
