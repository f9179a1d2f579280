use crate::{
    compile::{CompileContext, OptNote, Var},
    error::{CompileError, EvalError},
    eval::QueryContext,
    explain::ExplainNode,
    expr::{Expr, ExprKind, Transformed},
    span::Span,
    types::SeqType,
    value::Value,
};
use std::fmt;

///
/// TypeCase
///
/// One branch of a typeswitch. `seq_type == None` is the default case.
/// `var`, when present, is bound to the dispatch value while `result` runs.
///

#[derive(Clone, Debug, PartialEq)]
pub struct TypeCase {
    pub var: Option<Var>,
    pub seq_type: Option<SeqType>,
    pub result: Expr,
}

impl TypeCase {
    #[must_use]
    pub const fn new(var: Option<Var>, seq_type: SeqType, result: Expr) -> Self {
        Self {
            var,
            seq_type: Some(seq_type),
            result,
        }
    }

    #[must_use]
    pub const fn fallback(var: Option<Var>, result: Expr) -> Self {
        Self {
            var,
            seq_type: None,
            result,
        }
    }

    #[must_use]
    pub const fn is_default(&self) -> bool {
        self.seq_type.is_none()
    }

    #[must_use]
    pub fn matches(&self, value: &Value) -> bool {
        self.seq_type.is_none_or(|ty| ty.instance(value))
    }

    // Statically known to produce nothing.
    fn is_vacuous(&self) -> bool {
        match &self.result {
            Expr::Literal(value) => value.is_empty(),
            Expr::Failing(_) => false,
            other => other.seq_type().is_empty() && !other.has_nondeterminism(),
        }
    }

    #[must_use]
    pub fn describe(&self) -> ExplainNode {
        let mut node = ExplainNode::new(if self.is_default() { "Default" } else { "Case" });
        if let Some(ty) = self.seq_type {
            node = node.attr("type", ty);
        }
        if let Some(var) = &self.var {
            node = node.attr("var", &var.name);
        }

        node.child(self.result.describe())
    }
}

impl fmt::Display for TypeCase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.var, self.seq_type) {
            (Some(var), Some(ty)) => write!(f, "case ${} as {ty}", var.name)?,
            (None, Some(ty)) => write!(f, "case {ty}")?,
            (Some(var), None) => write!(f, "default ${}", var.name)?,
            (None, None) => f.write_str("default")?,
        }

        write!(f, " return {}", self.result)
    }
}

///
/// TypeSwitch
///
/// Dispatch on the runtime type of a value. The operand is materialized
/// once; the first matching case binds its variable and runs.
///

#[derive(Clone, Debug, PartialEq)]
pub struct TypeSwitch {
    pub operand: Box<Expr>,
    pub cases: Vec<TypeCase>,
    pub span: Span,
}

impl TypeSwitch {
    #[must_use]
    pub fn new(operand: Expr, cases: Vec<TypeCase>, span: Span) -> Self {
        Self {
            operand: Box::new(operand),
            cases,
            span,
        }
    }

    #[must_use]
    pub fn seq_type(&self) -> SeqType {
        self.cases
            .iter()
            .map(|case| case.result.seq_type())
            .reduce(SeqType::intersect)
            .unwrap_or(SeqType::EMPTY)
    }

    pub(crate) fn compile(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        if !self.cases.last().is_some_and(TypeCase::is_default) {
            return Err(CompileError::MissingDefaultCase { span: self.span });
        }

        let operand = (*self.operand).compile(cc)?;
        let cases = self
            .cases
            .into_iter()
            .map(|case| TypeCase {
                result: cc.compile_deferred(case.result),
                ..case
            })
            .collect();

        Self::new(operand, cases, self.span).optimize(cc)
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
            let done = cc.inline_deferred(case.result, var, with);
            changed |= done.changed;
            cases.push(TypeCase {
                result: done.expr,
                ..case
            });
        }

        let node = Self::new(operand.expr, cases, span);
        if changed {
            Ok(Transformed::yes(node.optimize(cc)?))
        } else {
            Ok(Transformed::no(Expr::TypeSwitch(node)))
        }
    }

    pub(crate) fn optimize(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let span = self.span;

        if self.cases.iter().all(TypeCase::is_vacuous) && !self.operand.has_nondeterminism() {
            cc.info(OptNote::PreEvaluate, || format!("{self} yields nothing"));
            return Ok(cc.replace_with(ExprKind::TypeSwitch, span, Expr::empty()));
        }

        let Expr::Literal(value) = self.operand.as_ref() else {
            return Ok(Expr::TypeSwitch(self));
        };
        let Some(index) = self.cases.iter().position(|case| case.matches(value)) else {
            return Ok(Expr::TypeSwitch(self));
        };

        let with = Expr::Literal(value.clone());
        let mut cases = self.cases;
        let case = cases.swap_remove(index);
        cc.info(OptNote::PreEvaluate, || format!("typeswitch ({with}) {case}"));

        let result = match &case.var {
            Some(var) => {
                cc.info(OptNote::Inline, || format!("${} := {with}", var.name));
                case.result.inline(var, &with, cc)?.expr
            }
            None => case.result,
        };

        Ok(cc.replace_with(ExprKind::TypeSwitch, span, result))
    }

    pub(crate) fn evaluate(&self, qc: &mut QueryContext) -> Result<Value, EvalError> {
        let value = self.operand.evaluate(qc)?;

        for case in &self.cases {
            qc.check()?;
            if !case.matches(&value) {
                continue;
            }

            return match &case.var {
                Some(var) => qc.with_binding(var.id, value, |qc| case.result.evaluate(qc)),
                None => case.result.evaluate(qc),
            };
        }

        Err(EvalError::Type {
            expected: "a matching typeswitch case".to_string(),
            found: value.seq_type().to_string(),
            span: self.span,
        })
    }
}

impl fmt::Display for TypeSwitch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "typeswitch ({})", self.operand)?;
        for case in &self.cases {
            write!(f, " {case}")?;
        }

        Ok(())
    }
}

///
/// TESTS
///
