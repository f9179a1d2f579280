use crate::{
    compile::{CompileContext, Var},
    error::{CompileError, EvalError},
    eval::QueryContext,
    expr::{Expr, Transformed},
    span::Span,
    types::SeqType,
    value::Value,
};
use std::{fmt, sync::Arc};

///
/// ExternalFunction
///
/// Opaque leaf collaborator invoked during evaluation (file listing,
/// pattern matching, string built-ins and the like). Implementations are
/// shared across threads by compiled queries.
///

pub trait ExternalFunction: Send + Sync {
    fn name(&self) -> &str;

    /// Declared result type.
    fn seq_type(&self) -> SeqType;

    /// Two calls with equal arguments return equal results.
    fn is_deterministic(&self) -> bool {
        true
    }

    /// Validate compiled arguments, e.g. a literal pattern, before the
    /// call is kept in the tree.
    fn check(&self, _args: &[Expr], _span: Span) -> Result<(), CompileError> {
        Ok(())
    }

    fn invoke(&self, args: &[Value], info: &CallInfo) -> Result<Value, EvalError>;
}

///
/// CallInfo
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct CallInfo {
    /// The call's result is the enclosing function's result.
    pub tail: bool,
    pub span: Span,
}

///
/// ExtCall
///

#[derive(Clone)]
pub struct ExtCall {
    pub function: Arc<dyn ExternalFunction>,
    pub args: Vec<Expr>,
    pub tail: bool,
    pub span: Span,
}

impl ExtCall {
    #[must_use]
    pub fn new(function: Arc<dyn ExternalFunction>, args: Vec<Expr>, span: Span) -> Self {
        Self {
            function,
            args,
            tail: false,
            span,
        }
    }

    pub(crate) fn compile(self, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let args = cc.compile_operands(self.args)?;
        self.function.check(&args, self.span)?;

        Ok(Expr::External(Self { args, ..self }))
    }

    pub(crate) fn inline(
        self,
        var: &Var,
        with: &Expr,
        cc: &mut CompileContext,
    ) -> Result<Transformed, CompileError> {
        let (args, changed) = cc.inline_operands(self.args, var, with, false)?;

        Ok(Transformed {
            expr: Expr::External(Self { args, ..self }),
            changed,
        })
    }

    pub(crate) fn evaluate(&self, qc: &mut QueryContext) -> Result<Value, EvalError> {
        let mut values = Vec::with_capacity(self.args.len());
        for arg in &self.args {
            qc.check()?;
            values.push(arg.evaluate(qc)?);
        }

        let info = CallInfo {
            tail: self.tail,
            span: self.span,
        };

        self.function.invoke(&values, &info)
    }
}

impl PartialEq for ExtCall {
    fn eq(&self, other: &Self) -> bool {
        self.function.name() == other.function.name() && self.args == other.args
    }
}

impl fmt::Debug for ExtCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtCall")
            .field("function", &self.function.name())
            .field("args", &self.args)
            .field("tail", &self.tail)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for ExtCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function.name())?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }

        f.write_str(")")
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::CastError, types::AtomType, value::Item};
    use quern_config::Config;

    struct Concat;

    impl ExternalFunction for Concat {
        fn name(&self) -> &str {
            "concat"
        }

        fn seq_type(&self) -> SeqType {
            SeqType::one(AtomType::String)
        }

        fn invoke(&self, args: &[Value], info: &CallInfo) -> Result<Value, EvalError> {
            let mut out: String = args.iter().map(ToString::to_string).collect();
            if info.tail {
                out.push('!');
            }

            Ok(Value::from(Item::string(&out)))
        }
    }

    // Fails at runtime; used to check which error surfaces first.
    struct Boom;

    impl ExternalFunction for Boom {
        fn name(&self) -> &str {
            "boom"
        }

        fn seq_type(&self) -> SeqType {
            SeqType::one(AtomType::String)
        }

        fn invoke(&self, _: &[Value], _: &CallInfo) -> Result<Value, EvalError> {
            Err(EvalError::Pattern {
                pattern: "first".to_string(),
                reason: "boom".to_string(),
            })
        }
    }

    // Rejects an unbalanced literal pattern while compiling.
    struct Matches;

    impl ExternalFunction for Matches {
        fn name(&self) -> &str {
            "matches"
        }

        fn seq_type(&self) -> SeqType {
            SeqType::BOOLEAN_ONE
        }

        fn check(&self, args: &[Expr], span: Span) -> Result<(), CompileError> {
            let Some(Expr::Literal(pattern)) = args.get(1) else {
                return Ok(());
            };
            match pattern.as_slice() {
                [Item::String(p)] if p.matches('(').count() != p.matches(')').count() => {
                    Err(CompileError::MalformedPattern {
                        pattern: p.clone(),
                        reason: "unbalanced parentheses".to_string(),
                        span,
                    })
                }
                _ => Ok(()),
            }
        }

        fn invoke(&self, args: &[Value], _: &CallInfo) -> Result<Value, EvalError> {
            Ok(Value::bool(args.iter().all(|arg| !arg.is_empty())))
        }
    }

    fn string_cast_to_integer() -> Expr {
        Expr::cast(Expr::string("abc"), SeqType::one(AtomType::Integer))
    }

    #[test]
    fn arguments_are_compiled_but_call_is_kept() {
        let mut cc = CompileContext::new(&Config::default());
        let call = Expr::external(
            Arc::new(Concat),
            vec![Expr::not(Expr::bool(true)), Expr::int(1)],
        );

        let compiled = call.compile(&mut cc).unwrap();
        assert_eq!(
            compiled,
            Expr::external(Arc::new(Concat), vec![Expr::bool(false), Expr::int(1)])
        );
        assert_eq!(compiled.to_string(), "concat(false(), 1)");
    }

    #[test]
    fn tail_flag_reaches_the_function() {
        let mut qc = QueryContext::new(&Config::default());
        let mut call = Expr::external(Arc::new(Concat), vec![Expr::int(1)]);
        assert_eq!(
            call.evaluate(&mut qc).unwrap(),
            Value::from(Item::string("1"))
        );

        call.mark_tail_calls();
        assert_eq!(
            call.evaluate(&mut qc).unwrap(),
            Value::from(Item::string("1!"))
        );
    }

    #[test]
    fn later_argument_failure_is_deferred() {
        let mut cc = CompileContext::new(&Config::default());
        let mut qc = QueryContext::new(&Config::default());
        let call = Expr::external(
            Arc::new(Concat),
            vec![
                Expr::external(Arc::new(Boom), Vec::new()),
                string_cast_to_integer(),
            ],
        );

        let compiled = call.compile(&mut cc).unwrap();
        assert!(matches!(compiled.children()[1], Expr::Failing(_)));
        assert!(matches!(
            compiled.evaluate(&mut qc),
            Err(EvalError::Pattern { pattern, .. }) if pattern == "first"
        ));
    }

    #[test]
    fn first_argument_failure_propagates() {
        let mut cc = CompileContext::new(&Config::default());
        let call = Expr::external(Arc::new(Concat), vec![string_cast_to_integer()]);

        assert!(matches!(
            call.compile(&mut cc),
            Err(CompileError::Eval(EvalError::Cast(CastError::InvalidLexical { .. })))
        ));
    }

    #[test]
    fn malformed_literal_pattern_is_rejected() {
        let mut cc = CompileContext::new(&Config::default());
        let bad = Expr::external(
            Arc::new(Matches),
            vec![Expr::string("x"), Expr::string("a(b")],
        );
        let good = Expr::external(
            Arc::new(Matches),
            vec![Expr::string("x"), Expr::string("(b)")],
        );

        let err = bad.compile(&mut cc).unwrap_err();
        assert!(
            matches!(&err, CompileError::MalformedPattern { pattern, .. } if pattern == "a(b")
        );
        assert_eq!(err.code(), "FORX0002");
        assert!(good.compile(&mut cc).is_ok());
    }

    #[test]
    fn malformed_pattern_in_later_operand_fails_when_reached() {
        let mut cc = CompileContext::new(&Config::default());
        let mut qc = QueryContext::new(&Config::default());
        let miss = Expr::external(Arc::new(Matches), vec![Expr::empty()]);
        let bad = Expr::external(
            Arc::new(Matches),
            vec![Expr::string("x"), Expr::string("a(b")],
        );

        let compiled = Expr::or(vec![miss, bad]).compile(&mut cc).unwrap();
        assert!(matches!(compiled.children()[1], Expr::Failing(_)));

        let err = compiled.evaluate(&mut qc).unwrap_err();
        assert_eq!(err.code(), "FORX0002");
    }
}
