// SPDX-License-Identifier: (MIT OR Apache-2.0)

#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Spaces per nesting level.
    pub indent_width: usize,
    /// Calls, arrays and struct literals longer than this are split one element per line.
    pub max_line_width: usize,
}

impl FormatConfig {
    pub fn with_indent(mut self, indent_width: usize) -> Self {
        self.indent_width = indent_width;
        self
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: 4,
            max_line_width: 100,
        }
    }
}
