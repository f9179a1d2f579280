use crate::{
    compile::{CompileContext, OptNote, Var},
    error::{CompileError, EvalError},
    eval::QueryContext,
    expr::{Expr, ExprKind, Transformed},
    span::Span,
    types::SeqType,
    value::{Bln, Value},
};
use std::fmt;

///
/// Function
///
/// Built-in functions the compiler constructs itself.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Function {
    Boolean,
    Not,
}

impl Function {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Not => "not",
        }
    }
}

///
/// Call
///

#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub function: Function,
    pub arg: Box<Expr>,
    pub span: Span,
}

impl Call {
    #[must_use]
    pub fn new(function: Function, arg: Expr, span: Span) -> Self {
        Self {
            function,
            arg: Box::new(arg),
            span,
        }
    }

    pub(crate) fn compile(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let arg = (*self.arg).compile(cc)?;

        Self::new(self.function, arg, self.span).optimize(cc)
    }

    pub(crate) fn inline(
        self,
        var: &Var,
        with: &Expr,
        cc: &mut CompileContext,
    ) -> Result<Transformed, CompileError> {
        let (function, span) = (self.function, self.span);
        let done = (*self.arg).inline(var, with, cc)?;
        let node = Self::new(function, done.expr, span);

        if done.changed {
            Ok(Transformed::yes(node.optimize(cc)?))
        } else {
            Ok(Transformed::no(Expr::Call(node)))
        }
    }

    pub(crate) fn optimize(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let Self {
            function,
            arg,
            span,
        } = self;
        let kind = match function {
            Function::Boolean => ExprKind::Boolean,
            Function::Not => ExprKind::Negation,
        };
        let arg = (*arg).optimize_ebv(cc);

        // pre-evaluate literal arguments
        if let Expr::Literal(value) = &arg {
            let b = value.ebv(span)?;
            cc.info(OptNote::PreEvaluate, || format!("{}({value})", function.name()));

            let folded = match function {
                Function::Boolean => Expr::Literal(Value::from(b)),
                Function::Not => Expr::bool(!b.value()),
            };
            return Ok(cc.replace_with(kind, span, folded));
        }

        match function {
            Function::Boolean if arg.seq_type() == SeqType::BOOLEAN_ONE => {
                cc.info(OptNote::Simplify, || format!("boolean({arg}) is already boolean"));
                Ok(cc.replace_with(kind, span, arg))
            }
            Function::Not => match arg {
                // not(not(x)) -> boolean(x)
                Expr::Call(Self {
                    function: Function::Not,
                    arg: inner,
                    ..
                }) => {
                    cc.info(OptNote::Simplify, || format!("not(not({inner}))"));
                    let expr = cc.function(Function::Boolean, vec![*inner], span)?;
                    Ok(cc.replace_with(kind, span, expr))
                }
                arg => Ok(Expr::Call(Self::new(function, arg, span))),
            },
            Function::Boolean => Ok(Expr::Call(Self::new(function, arg, span))),
        }
    }

    pub(crate) fn ebv(&self, qc: &mut QueryContext) -> Result<Bln, EvalError> {
        let b = self.arg.ebv(qc)?;

        Ok(match self.function {
            Function::Boolean => b,
            Function::Not => Bln::get(!b.value()),
        })
    }

    pub(crate) fn evaluate(&self, qc: &mut QueryContext) -> Result<Value, EvalError> {
        self.ebv(qc).map(Value::from)
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.function.name(), self.arg)
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Item;
    use quern_config::Config;

    fn cc() -> CompileContext {
        CompileContext::new(&Config::default())
    }

    #[test]
    fn literal_arguments_fold() {
        let mut cc = cc();

        assert_eq!(
            Expr::not(Expr::int(0)).compile(&mut cc).unwrap(),
            Expr::bool(true)
        );
        assert_eq!(
            Expr::boolean(Expr::string("x")).compile(&mut cc).unwrap(),
            Expr::bool(true)
        );
    }

    #[test]
    fn literal_with_undefined_ebv_fails() {
        let pair = Expr::literal(vec![Item::Integer(1), Item::Integer(2)]);
        let err = Expr::not(pair).compile(&mut cc()).unwrap_err();

        assert!(matches!(err, CompileError::Eval(EvalError::Ebv { .. })));
    }

    #[test]
    fn double_negation_becomes_boolean() {
        let inner = Expr::pos(2, 4);
        let expr = Expr::not(Expr::not(inner.clone())).compile(&mut cc()).unwrap();

        // pos() is already boolean, so the wrapper disappears too
        assert_eq!(expr, inner);
    }

    #[test]
    fn boolean_of_boolean_is_elided() {
        let cmp = Expr::pos(1, 3);

        assert_eq!(Expr::boolean(cmp.clone()).compile(&mut cc()).unwrap(), cmp);
    }
}
