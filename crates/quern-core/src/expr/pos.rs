use crate::{
    compile::{CompileContext, OptNote},
    error::{CompileError, EvalError},
    eval::QueryContext,
    expr::{Expr, ExprKind},
    span::Span,
};
use std::fmt;

///
/// PosPredicate
///
/// `position() = min to max`, bounds inclusive. `max == i64::MAX` is
/// unbounded.
///

#[derive(Clone, Debug, PartialEq)]
pub struct PosPredicate {
    pub min: i64,
    pub max: i64,
    pub span: Span,
}

impl PosPredicate {
    #[must_use]
    pub const fn new(min: i64, max: i64, span: Span) -> Self {
        Self { min, max, span }
    }

    pub(crate) fn optimize(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let folded = if self.min > self.max || self.max < 1 {
            false
        } else if self.min <= 1 && self.max == i64::MAX {
            true
        } else {
            return Ok(Expr::Pos(self));
        };
        cc.info(OptNote::PreEvaluate, || self.to_string());

        Ok(cc.replace_with(ExprKind::PositionPredicate, self.span, Expr::bool(folded)))
    }

    /// Both predicates must hold: keep the overlap of the two intervals.
    pub(crate) fn intersect(&self, other: &Self, cc: &mut CompileContext) -> Expr {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        cc.info(OptNote::Simplify, || format!("intersect {self} and {other}"));

        if min > max {
            Expr::bool(false)
        } else {
            Expr::Pos(Self::new(min, max, self.span))
        }
    }

    pub(crate) fn evaluate(&self, qc: &QueryContext) -> Result<bool, EvalError> {
        let focus = qc.focus().ok_or(EvalError::NoContext { span: self.span })?;

        Ok(focus.position >= self.min && focus.position <= self.max)
    }
}

impl fmt::Display for PosPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (min, max) if min == max => write!(f, "position() = {min}"),
            (min, i64::MAX) => write!(f, "position() >= {min}"),
            (min, max) => write!(f, "position() = {min} to {max}"),
        }
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use quern_config::Config;

    fn cc() -> CompileContext {
        CompileContext::new(&Config::default())
    }

    #[test]
    fn degenerate_intervals_fold() {
        let mut cc = cc();

        assert_eq!(Expr::pos(5, 2).compile(&mut cc).unwrap(), Expr::bool(false));
        assert_eq!(Expr::pos(0, 0).compile(&mut cc).unwrap(), Expr::bool(false));
        assert_eq!(
            Expr::pos(1, i64::MAX).compile(&mut cc).unwrap(),
            Expr::bool(true)
        );
        assert_eq!(Expr::pos(2, 3).compile(&mut cc).unwrap(), Expr::pos(2, 3));
    }

    #[test]
    fn intersection_keeps_overlap() {
        let a = PosPredicate::new(1, 5, Span::UNKNOWN);
        let b = PosPredicate::new(3, 9, Span::UNKNOWN);
        let c = PosPredicate::new(7, 9, Span::UNKNOWN);

        assert_eq!(a.intersect(&b, &mut cc()), Expr::pos(3, 5));
        assert_eq!(a.intersect(&c, &mut cc()), Expr::bool(false));
    }

    #[test]
    fn display() {
        assert_eq!(Expr::pos(3, 3).to_string(), "position() = 3");
        assert_eq!(Expr::pos(2, i64::MAX).to_string(), "position() >= 2");
        assert_eq!(Expr::pos(2, 4).to_string(), "position() = 2 to 4");
    }
}
