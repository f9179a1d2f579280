use crate::{
    compile::{CompileContext, OptNote, Var},
    error::{CompileError, EvalError},
    eval::QueryContext,
    expr::{Expr, ExprKind, Transformed},
    span::Span,
    value::{CompareOp, compare_values},
};
use std::fmt;

///
/// GeneralCompare
///
/// Existential comparison of two sequences.
///

#[derive(Clone, Debug, PartialEq)]
pub struct GeneralCompare {
    pub left: Box<Expr>,
    pub op: CompareOp,
    pub right: Box<Expr>,
    pub span: Span,
}

impl GeneralCompare {
    #[must_use]
    pub fn new(left: Expr, op: CompareOp, right: Expr, span: Span) -> Self {
        Self {
            left: Box::new(left),
            op,
            right: Box::new(right),
            span,
        }
    }

    pub(crate) fn compile(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let left = (*self.left).compile(cc)?;
        let right = cc.compile_deferred(*self.right);

        Self::new(left, self.op, right, self.span).optimize(cc)
    }

    pub(crate) fn inline(
        self,
        var: &Var,
        with: &Expr,
        cc: &mut CompileContext,
    ) -> Result<Transformed, CompileError> {
        let (op, span) = (self.op, self.span);
        let left = (*self.left).inline(var, with, cc)?;
        let right = cc.inline_deferred(*self.right, var, with);
        let node = Self::new(left.expr, op, right.expr, span);

        if left.changed || right.changed {
            Ok(Transformed::yes(node.optimize(cc)?))
        } else {
            Ok(Transformed::no(Expr::Compare(node)))
        }
    }

    pub(crate) fn optimize(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        if let (Expr::Literal(left), Expr::Literal(right)) = (self.left.as_ref(), self.right.as_ref())
        {
            let result = compare_values(left, right, self.op, self.span)?;
            cc.info(OptNote::PreEvaluate, || self.to_string());

            return Ok(cc.replace_with(ExprKind::Comparison, self.span, Expr::bool(result)));
        }

        Ok(Expr::Compare(self))
    }

    /// `x = a or x = b` -> `x = (a, b)` for a deterministic `x`.
    pub(crate) fn union(&self, other: &Self, cc: &mut CompileContext) -> Option<Expr> {
        if self.op != CompareOp::Eq
            || other.op != CompareOp::Eq
            || self.left != other.left
            || self.left.has_nondeterminism()
        {
            return None;
        }

        let (Expr::Literal(a), Expr::Literal(b)) = (self.right.as_ref(), other.right.as_ref())
        else {
            return None;
        };

        cc.info(OptNote::Simplify, || format!("merge {self} or {other}"));
        let values = Expr::Literal(a.clone().concat(b.clone()));

        Some(Expr::Compare(Self::new(
            (*self.left).clone(),
            CompareOp::Eq,
            values,
            self.span,
        )))
    }

    pub(crate) fn evaluate(&self, qc: &mut QueryContext) -> Result<bool, EvalError> {
        let left = self.left.evaluate(qc)?;
        let right = self.right.evaluate(qc)?;

        compare_values(&left, &right, self.op, self.span)
    }
}

impl fmt::Display for GeneralCompare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.left, self.op, self.right)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::{Item, Value};
    use quern_config::Config;

    #[test]
    fn literal_comparison_folds() {
        let mut cc = CompileContext::new(&Config::default());
        let expr = Expr::compare(Expr::int(3), CompareOp::Lt, Expr::int(4));

        assert_eq!(expr.compile(&mut cc).unwrap(), Expr::bool(true));
    }

    #[test]
    fn incomparable_literals_fail_to_compile() {
        let mut cc = CompileContext::new(&Config::default());
        let expr = Expr::compare(Expr::int(3), CompareOp::Eq, Expr::string("3"));

        assert!(matches!(
            expr.compile(&mut cc),
            Err(CompileError::Eval(EvalError::Type { .. }))
        ));
    }

    #[test]
    fn equality_over_same_operand_unions() {
        let mut cc = CompileContext::new(&Config::default());
        let x = Expr::pos(1, 1);
        let a = GeneralCompare::new(x.clone(), CompareOp::Eq, Expr::int(1), Span::UNKNOWN);
        let b = GeneralCompare::new(x.clone(), CompareOp::Eq, Expr::int(2), Span::UNKNOWN);

        let merged = a.union(&b, &mut cc).unwrap();
        let values = Value::from(vec![Item::Integer(1), Item::Integer(2)]);
        assert_eq!(
            merged,
            Expr::compare(x.clone(), CompareOp::Eq, Expr::literal(values))
        );

        let lt = GeneralCompare::new(x, CompareOp::Lt, Expr::int(2), Span::UNKNOWN);
        assert!(a.union(&lt, &mut cc).is_none());
    }
}
