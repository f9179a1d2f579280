use std::fmt;

///
/// Span
///
/// Source location of a node, used only for diagnostics.
///
/// Spans never take part in structural equality: two nodes that differ only
/// in where they were written compare equal, which is what duplicate
/// elimination and idempotence checks rely on.
///

#[derive(Clone, Copy, Debug, Default)]
pub struct Span {
    pub line: u32,
    pub column: u32,
}

impl Span {
    pub const UNKNOWN: Self = Self { line: 0, column: 0 };

    #[must_use]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }

    #[must_use]
    pub const fn is_known(self) -> bool {
        self.line != 0
    }
}

impl PartialEq for Span {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for Span {}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_known() {
            write!(f, "{}:{}", self.line, self.column)
        } else {
            f.write_str("?")
        }
    }
}

///
/// TESTS
///
