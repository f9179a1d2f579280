use crate::{expr::ExprKind, span::Span};
use std::fmt;

///
/// OptNote
///
/// Category of an optimization note.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum OptNote {
    Flatten,
    RemoveOperand,
    Simplify,
    PreEvaluate,
    Negate,
    Elide,
    Inline,
    DeferError,
    Reorder,
}

impl OptNote {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Flatten => "flatten",
            Self::RemoveOperand => "remove",
            Self::Simplify => "simplify",
            Self::PreEvaluate => "pre-evaluate",
            Self::Negate => "negate",
            Self::Elide => "elide",
            Self::Inline => "inline",
            Self::DeferError => "defer-error",
            Self::Reorder => "reorder",
        }
    }
}

impl fmt::Display for OptNote {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

///
/// Diagnostic
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Diagnostic {
    pub note: OptNote,
    pub message: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.note, self.message)
    }
}

///
/// RewriteEvent
///
/// One whole-node substitution recorded by `replace_with`.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct RewriteEvent {
    pub from: ExprKind,
    pub to: ExprKind,
    pub span: Span,
}

impl fmt::Display for RewriteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} at {}", self.from, self.to, self.span)
    }
}
