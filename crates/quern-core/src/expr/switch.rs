use crate::{
    compile::{CompileContext, OptNote, Var},
    error::{CompileError, EvalError},
    eval::QueryContext,
    expr::{Expr, ExprKind, Transformed},
    span::Span,
    types::SeqType,
    value::{Item, Value, equiv},
};
use std::fmt;

///
/// SwitchCase
///

#[derive(Clone, Debug, PartialEq)]
pub struct SwitchCase {
    pub value: Expr,
    pub result: Expr,
}

///
/// Switch
///
/// Value-driven dispatch. The operand is evaluated once and compared with
/// each case value in order; exactly one branch runs.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Switch {
    pub operand: Box<Expr>,
    pub cases: Vec<SwitchCase>,
    pub default: Box<Expr>,
    pub span: Span,
}

impl Switch {
    #[must_use]
    pub fn new(operand: Expr, cases: Vec<SwitchCase>, default: Expr, span: Span) -> Self {
        Self {
            operand: Box::new(operand),
            cases,
            default: Box::new(default),
            span,
        }
    }

    /// Common type of every branch, default included.
    #[must_use]
    pub fn seq_type(&self) -> SeqType {
        self.cases
            .iter()
            .fold(self.default.seq_type(), |ty, case| {
                ty.intersect(case.result.seq_type())
            })
    }

    pub(crate) fn compile(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let operand = (*self.operand).compile(cc)?;
        let cases = self
            .cases
            .into_iter()
            .map(|case| SwitchCase {
                value: cc.compile_deferred(case.value),
                result: cc.compile_deferred(case.result),
            })
            .collect();
        let default = cc.compile_deferred(*self.default);

        Self::new(operand, cases, default, self.span).optimize(cc)
    }

    pub(crate) fn inline(
        self,
        var: &Var,
        with: &Expr,
        cc: &mut CompileContext,
    ) -> Result<Transformed, CompileError> {
        let span = self.span;
        let operand = (*self.operand).inline(var, with, cc)?;
        let mut changed = operand.changed;

        let mut cases = Vec::with_capacity(self.cases.len());
        for case in self.cases {
            let value = cc.inline_deferred(case.value, var, with);
            let result = cc.inline_deferred(case.result, var, with);
            changed |= value.changed || result.changed;
            cases.push(SwitchCase {
                value: value.expr,
                result: result.expr,
            });
        }
        let default = cc.inline_deferred(*self.default, var, with);
        changed |= default.changed;

        let node = Self::new(operand.expr, cases, default.expr, span);
        if changed {
            Ok(Transformed::yes(node.optimize(cc)?))
        } else {
            Ok(Transformed::no(Expr::Switch(node)))
        }
    }

    /// Pick the branch at compile time when the operand and every case value
    /// up to the match are literals.
    pub(crate) fn optimize(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let Expr::Literal(value) = self.operand.as_ref() else {
            return Ok(Expr::Switch(self));
        };
        let item = value.atomic_item(self.span)?.cloned();

        let mut chosen = None;
        for (i, case) in self.cases.iter().enumerate() {
            let Expr::Literal(case_value) = &case.value else {
                return Ok(Expr::Switch(self));
            };
            if matches(item.as_ref(), case_value.atomic_item(self.span)?) {
                chosen = Some(i);
                break;
            }
        }

        let span = self.span;
        cc.info(OptNote::PreEvaluate, || format!("switch ({value})"));
        let branch = match chosen {
            Some(i) => {
                let mut cases = self.cases;
                cases.swap_remove(i).result
            }
            None => *self.default,
        };

        Ok(cc.replace_with(ExprKind::Switch, span, branch))
    }

    pub(crate) fn evaluate(&self, qc: &mut QueryContext) -> Result<Value, EvalError> {
        let value = self.operand.evaluate(qc)?;
        let item = value.atomic_item(self.span)?;

        for case in &self.cases {
            qc.check()?;

            let case_value = case.value.evaluate(qc)?;
            if matches(item, case_value.atomic_item(self.span)?) {
                return case.result.evaluate(qc);
            }
        }

        self.default.evaluate(qc)
    }
}

// An empty operand matches an empty case value.
fn matches(operand: Option<&Item>, case: Option<&Item>) -> bool {
    match (operand, case) {
        (None, None) => true,
        (Some(a), Some(b)) => equiv(a, b),
        _ => false,
    }
}

impl fmt::Display for Switch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "switch ({})", self.operand)?;
        for case in &self.cases {
            write!(f, " case {} return {}", case.value, case.result)?;
        }

        write!(f, " default return {}", self.default)
    }
}

///
/// TESTS
///
