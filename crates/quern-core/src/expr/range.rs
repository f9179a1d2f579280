use crate::{
    compile::{CompileContext, OptNote, Var},
    error::{CompileError, EvalError},
    eval::QueryContext,
    expr::{Expr, ExprKind, Transformed},
    span::Span,
    types::AtomType,
    value::{Item, Value, cast_item},
};
use std::fmt;

///
/// RangeCompare
///
/// Numeric interval test: true if some item of the operand lies between
/// `min` and `max`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct RangeCompare {
    pub operand: Box<Expr>,
    pub min: f64,
    pub min_inclusive: bool,
    pub max: f64,
    pub max_inclusive: bool,
    pub span: Span,
}

impl RangeCompare {
    #[must_use]
    pub fn new(
        operand: Expr,
        min: f64,
        min_inclusive: bool,
        max: f64,
        max_inclusive: bool,
        span: Span,
    ) -> Self {
        Self {
            operand: Box::new(operand),
            min,
            min_inclusive,
            max,
            max_inclusive,
            span,
        }
    }

    fn is_empty(&self) -> bool {
        self.min > self.max
            || (self.min == self.max && !(self.min_inclusive && self.max_inclusive))
            || self.min.is_nan()
            || self.max.is_nan()
    }

    fn contains(&self, v: f64) -> bool {
        let above = if self.min_inclusive {
            v >= self.min
        } else {
            v > self.min
        };
        let below = if self.max_inclusive {
            v <= self.max
        } else {
            v < self.max
        };

        above && below
    }

    pub(crate) fn compile(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let Self {
            operand,
            min,
            min_inclusive,
            max,
            max_inclusive,
            span,
        } = self;
        let operand = (*operand).compile(cc)?;

        Self::new(operand, min, min_inclusive, max, max_inclusive, span).optimize(cc)
    }

    pub(crate) fn inline(
        self,
        var: &Var,
        with: &Expr,
        cc: &mut CompileContext,
    ) -> Result<Transformed, CompileError> {
        let Self {
            operand,
            min,
            min_inclusive,
            max,
            max_inclusive,
            span,
        } = self;
        let done = (*operand).inline(var, with, cc)?;
        let node = Self::new(done.expr, min, min_inclusive, max, max_inclusive, span);

        if done.changed {
            Ok(Transformed::yes(node.optimize(cc)?))
        } else {
            Ok(Transformed::no(Expr::Range(node)))
        }
    }

    pub(crate) fn optimize(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        if self.is_empty() {
            cc.info(OptNote::PreEvaluate, || format!("empty range {self}"));
            return Ok(cc.replace_with(ExprKind::RangeComparison, self.span, Expr::bool(false)));
        }

        if let Expr::Literal(value) = self.operand.as_ref() {
            let result = self.test(value)?;
            cc.info(OptNote::PreEvaluate, || self.to_string());

            return Ok(cc.replace_with(ExprKind::RangeComparison, self.span, Expr::bool(result)));
        }

        Ok(Expr::Range(self))
    }

    /// Intersect two ranges over the same single-valued operand.
    pub(crate) fn intersect(&self, other: &Self, cc: &mut CompileContext) -> Option<Expr> {
        if self.operand != other.operand
            || self.operand.has_nondeterminism()
            || !self.operand.seq_type().zero_or_one_items()
        {
            return None;
        }

        let (min, min_inclusive) = if other.min > self.min {
            (other.min, other.min_inclusive)
        } else if other.min < self.min {
            (self.min, self.min_inclusive)
        } else {
            (self.min, self.min_inclusive && other.min_inclusive)
        };
        let (max, max_inclusive) = if other.max < self.max {
            (other.max, other.max_inclusive)
        } else if other.max > self.max {
            (self.max, self.max_inclusive)
        } else {
            (self.max, self.max_inclusive && other.max_inclusive)
        };

        let merged = Self::new(
            (*self.operand).clone(),
            min,
            min_inclusive,
            max,
            max_inclusive,
            self.span,
        );
        cc.info(OptNote::Simplify, || format!("intersect {self} and {other}"));

        Some(if merged.is_empty() {
            Expr::bool(false)
        } else {
            Expr::Range(merged)
        })
    }

    fn test(&self, value: &Value) -> Result<bool, EvalError> {
        for item in value.iter() {
            let number = match item {
                Item::Untyped(_) => cast_item(item, AtomType::Double)?.as_f64(),
                other => other.as_f64(),
            };
            let Some(number) = number else {
                return Err(EvalError::Type {
                    expected: AtomType::Numeric.to_string(),
                    found: item.atom_type().to_string(),
                    span: self.span,
                });
            };

            if self.contains(number) {
                return Ok(true);
            }
        }

        Ok(false)
    }

    pub(crate) fn evaluate(&self, qc: &mut QueryContext) -> Result<bool, EvalError> {
        let value = self.operand.evaluate(qc)?;

        self.test(&value)
    }
}

impl fmt::Display for RangeCompare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lower = if self.min_inclusive { "<=" } else { "<" };
        let upper = if self.max_inclusive { "<=" } else { "<" };

        write!(f, "{} {lower} {} {upper} {}", self.min, self.operand, self.max)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        expr::{CallInfo, ExternalFunction},
        types::SeqType,
    };
    use quern_config::Config;
    use std::sync::Arc;

    struct Num;

    impl ExternalFunction for Num {
        fn name(&self) -> &str {
            "num"
        }

        fn seq_type(&self) -> SeqType {
            SeqType::one(AtomType::Double)
        }

        fn invoke(&self, _: &[Value], _: &CallInfo) -> Result<Value, EvalError> {
            Ok(Value::from(Item::Double(3.0)))
        }
    }

    fn cc() -> CompileContext {
        CompileContext::new(&Config::default())
    }

    fn num() -> Expr {
        Expr::external(Arc::new(Num), Vec::new())
    }

    fn range(min: f64, max: f64) -> RangeCompare {
        RangeCompare::new(num(), min, true, max, true, Span::UNKNOWN)
    }

    #[test]
    fn overlapping_ranges_intersect() {
        let merged = range(1.0, 5.0).intersect(&range(3.0, 9.0), &mut cc());

        assert_eq!(merged, Some(Expr::range(num(), 3.0, 5.0)));
    }

    #[test]
    fn disjoint_ranges_are_false() {
        let merged = range(1.0, 2.0).intersect(&range(3.0, 9.0), &mut cc());

        assert_eq!(merged, Some(Expr::bool(false)));
    }

    #[test]
    fn touching_exclusive_bound_is_empty() {
        let a = range(1.0, 3.0);
        let b = RangeCompare::new(num(), 3.0, false, 9.0, true, Span::UNKNOWN);

        assert_eq!(a.intersect(&b, &mut cc()), Some(Expr::bool(false)));
    }

    #[test]
    fn literal_operand_is_pre_evaluated() {
        let values = Value::from(vec![Item::Integer(0), Item::untyped("4.5")]);
        let expr = Expr::range(Expr::literal(values), 4.0, 5.0);

        assert_eq!(expr.compile(&mut cc()).unwrap(), Expr::bool(true));
    }

    #[test]
    fn non_numeric_operand_fails() {
        let expr = Expr::range(Expr::string("a"), 0.0, 1.0);

        assert!(matches!(
            expr.compile(&mut cc()),
            Err(CompileError::Eval(EvalError::Type { .. }))
        ));
    }
}
