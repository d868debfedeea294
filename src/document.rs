//! Append-only line buffer that generated scripts are rendered into.
//!
//! Fragment text is written with 4-space indentation steps; the buffer
//! converts each leading group of four spaces into one indentation unit and
//! prefixes the current nesting depth, so the same fragment source renders
//! correctly at any depth and for any configured indent width.

/// Width of one indentation step in fragment source text.
const SOURCE_STEP: usize = 4;

/// A generated text file, built line by line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    lines: Vec<String>,
    depth: usize,
    unit: usize,
}

impl Document {
    /// Create an empty document indenting with `unit` spaces per level.
    #[must_use]
    pub const fn new(unit: usize) -> Self {
        Self {
            lines: Vec::new(),
            depth: 0,
            unit,
        }
    }

    /// Append one line at the current depth. Blank text yields an empty line.
    pub fn line(&mut self, text: &str) {
        if text.trim().is_empty() {
            self.lines.push(String::new());
        } else {
            let pad = " ".repeat(self.depth * self.unit);
            self.lines.push(format!("{pad}{text}"));
        }
    }

    /// Append an empty line.
    pub fn blank(&mut self) {
        self.lines.push(String::new());
    }

    /// Append every line of `text`, converting 4-space steps to the
    /// document's unit and nesting everything at the current depth.
    pub fn block(&mut self, text: &str) {
        for raw in text.lines() {
            let trimmed = raw.trim_start_matches(' ');
            let leading = raw.len() - trimmed.len();
            let steps = leading / SOURCE_STEP;
            let rest = raw.get(steps * SOURCE_STEP..).unwrap_or(trimmed);
            let converted = format!("{}{rest}", " ".repeat(steps * self.unit));
            self.line(&converted);
        }
    }

    /// Increase nesting depth by `levels`.
    pub const fn indent(&mut self, levels: usize) {
        self.depth += levels;
    }

    /// Decrease nesting depth by `levels`, stopping at zero.
    pub const fn dedent(&mut self, levels: usize) {
        self.depth = self.depth.saturating_sub(levels);
    }

    /// Current nesting depth.
    #[must_use]
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Set the nesting depth.
    pub const fn set_depth(&mut self, depth: usize) {
        self.depth = depth;
    }

    /// Run `f` with a different indentation unit, restoring it afterwards.
    pub fn with_unit(&mut self, unit: usize, f: impl FnOnce(&mut Self)) {
        let saved = self.unit;
        self.unit = unit;
        f(self);
        self.unit = saved;
    }

    /// Drop trailing empty lines.
    pub fn trim_trailing_blanks(&mut self) {
        while self.lines.last().is_some_and(String::is_empty) {
            self.lines.pop();
        }
    }

    /// Registered lines, without terminators.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Whether nothing has been written yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The final text: every line followed by a newline.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.lines.join("\n");
        out.push('\n');
        out
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn line_respects_depth_and_unit() {
        let mut doc = Document::new(2);
        doc.line("a");
        doc.indent(2);
        doc.line("b");
        doc.dedent(1);
        doc.line("c");
        assert_eq!(doc.render(), "a\n    b\n  c\n");
    }

    #[test]
    fn blank_text_is_not_indented() {
        let mut doc = Document::new(4);
        doc.indent(3);
        doc.line("   ");
        doc.blank();
        assert_eq!(doc.lines(), &["", ""]);
    }

    #[test]
    fn block_converts_source_steps() {
        let mut doc = Document::new(2);
        doc.indent(1);
        doc.block("if x\nthen\n    y\n        z\nfi");
        assert_eq!(doc.render(), "  if x\n  then\n    y\n      z\n  fi\n");
    }

    #[test]
    fn block_keeps_partial_steps_verbatim() {
        let mut doc = Document::new(2);
        doc.block("      x");
        assert_eq!(doc.lines(), &["    x"]);
    }

    #[test]
    fn dedent_saturates() {
        let mut doc = Document::new(4);
        doc.dedent(5);
        assert_eq!(doc.depth(), 0);
    }

    #[test]
    fn with_unit_restores_previous_unit() {
        let mut doc = Document::new(4);
        doc.indent(1);
        doc.with_unit(2, |d| d.line("narrow"));
        doc.line("wide");
        assert_eq!(doc.lines(), &["  narrow", "    wide"]);
    }

    #[test]
    fn trim_trailing_blanks_stops_at_text() {
        let mut doc = Document::new(4);
        doc.line("x");
        doc.blank();
        doc.line("y");
        doc.blank();
        doc.blank();
        doc.trim_trailing_blanks();
        assert_eq!(doc.render(), "x\n\ny\n");
    }
}
