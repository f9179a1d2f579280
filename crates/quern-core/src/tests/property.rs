use crate::{
    compile::CompileContext,
    error::EvalError,
    eval::{Focus, QueryContext},
    expr::{CallInfo, Expr, ExternalFunction},
    types::{AtomType, SeqType},
    value::{CompareOp, Item, Value},
};
use proptest::prelude::*;
use quern_config::Config;
use std::sync::Arc;

///
/// Flag
///
/// Deterministic boolean leaf. The name encodes the result so equal names
/// always mean equal behaviour.
///

struct Flag {
    name: &'static str,
    value: bool,
}

impl ExternalFunction for Flag {
    fn name(&self) -> &str {
        self.name
    }

    fn seq_type(&self) -> SeqType {
        SeqType::BOOLEAN_ONE
    }

    fn invoke(&self, _: &[Value], _: &CallInfo) -> Result<Value, EvalError> {
        Ok(Value::bool(self.value))
    }
}

///
/// Num
///

struct Num {
    name: String,
    value: i64,
}

impl ExternalFunction for Num {
    fn name(&self) -> &str {
        &self.name
    }

    fn seq_type(&self) -> SeqType {
        SeqType::one(AtomType::Integer)
    }

    fn invoke(&self, _: &[Value], _: &CallInfo) -> Result<Value, EvalError> {
        Ok(Value::from(Item::Integer(self.value)))
    }
}

const FLAGS: [(&str, bool); 4] = [("t1", true), ("t2", true), ("f1", false), ("f2", false)];

fn num(value: i64) -> Expr {
    let num = Num {
        name: format!("n{value}"),
        value,
    };

    Expr::external(Arc::new(num), Vec::new())
}

fn arb_flag() -> impl Strategy<Value = Expr> {
    prop::sample::select(FLAGS.to_vec())
        .prop_map(|(name, value)| Expr::external(Arc::new(Flag { name, value }), Vec::new()))
}

// Boolean-typed atoms that never fold on their own.
fn arb_atom() -> impl Strategy<Value = Expr> {
    prop_oneof![
        arb_flag(),
        (2i64..5, 0i64..3).prop_map(|(min, len)| Expr::pos(min, min + len)),
        (0i64..3, 0i64..3)
            .prop_map(|(n, k)| Expr::compare(num(n), CompareOp::Eq, Expr::int(k))),
        (0i64..3, 0u8..2).prop_map(|(n, lo)| {
            let lo = f64::from(lo);
            Expr::range(num(n), lo, lo + 1.0)
        }),
    ]
}

fn arb_leaf() -> impl Strategy<Value = Expr> {
    prop_oneof![
        4 => arb_atom(),
        1 => any::<bool>().prop_map(Expr::bool),
        1 => (0i64..3).prop_map(Expr::int),
        1 => Just(Expr::empty()),
        1 => Just(Expr::literal(vec![Item::Integer(1), Item::Integer(2)])),
        1 => (0i64..3).prop_map(|min| Expr::pos(min, i64::MAX)),
        1 => (0i64..6, 0i64..6).prop_map(|(min, max)| Expr::pos(min, max)),
    ]
}

fn arb_expr() -> impl Strategy<Value = Expr> {
    arb_leaf().prop_recursive(4, 32, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 1..4).prop_map(Expr::and),
            prop::collection::vec(inner.clone(), 1..4).prop_map(Expr::or),
            inner.clone().prop_map(Expr::not),
            inner.prop_map(Expr::boolean),
        ]
    })
}

fn compile(expr: Expr) -> Result<Expr, crate::error::CompileError> {
    expr.compile(&mut CompileContext::new(&Config::default()))
}

fn run(expr: &Expr, position: i64) -> Result<Value, EvalError> {
    let focus = Focus::new(Item::Integer(position), position, 5);
    let mut qc = QueryContext::new(&Config::default()).with_focus(focus);

    expr.evaluate(&mut qc)
}

proptest! {
    #[test]
    fn folding_is_sound(expr in arb_expr(), position in 1i64..6) {
        let reference = run(&expr, position);

        match compile(expr) {
            Err(_) => prop_assert!(reference.is_err()),
            Ok(compiled) => {
                let optimized = run(&compiled, position);
                match (&reference, &optimized) {
                    (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
                    _ => prop_assert_eq!(reference.is_err(), optimized.is_err()),
                }
            }
        }
    }

    #[test]
    fn compilation_is_idempotent(expr in arb_expr()) {
        if let Ok(once) = compile(expr) {
            let twice = compile(once.clone());
            prop_assert_eq!(twice, Ok(once));
        }
    }

    #[test]
    fn negations_factor_out(a in arb_atom(), b in arb_atom()) {
        let conjunction = Expr::and(vec![Expr::not(a.clone()), Expr::not(b.clone())]);
        let disjunction = compile(Expr::or(vec![a, b])).map(Expr::not);

        prop_assert_eq!(compile(conjunction), disjunction);
    }

    // flags only: conjunction may merge other atoms into a literal
    #[test]
    fn both_connectives_negate_symmetrically(a in arb_flag(), b in arb_flag()) {
        let disjunction = Expr::or(vec![Expr::not(a.clone()), Expr::not(b.clone())]);
        let conjunction = compile(Expr::and(vec![a, b])).map(Expr::not);

        prop_assert_eq!(compile(disjunction), conjunction);
    }
}
