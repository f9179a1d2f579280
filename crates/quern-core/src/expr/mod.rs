//! Expression tree.
//!
//! `Expr` is a closed set of node kinds. Every kind supports the same
//! lifecycle: `compile` once (children first, then node-local rewriting),
//! optionally `inline` a variable, then `evaluate` any number of times on
//! the read-only result.

mod and;
mod call;
mod cast;
mod compare;
mod external;
mod failing;
mod logical;
mod or;
mod pos;
mod range;
mod switch;
mod type_switch;
mod var_ref;


use crate::{
    compile::{CompileContext, OptNote, Var},
    error::{CompileError, EvalError},
    eval::QueryContext,
    explain::ExplainNode,
    index::{IndexAccess, IndexContext, IndexPlan},
    span::Span,
    types::SeqType,
    value::{Bln, CompareOp, Item, Value},
};
use std::{fmt, sync::Arc};

// re-exports
pub use call::{Call, Function};
pub use cast::Cast;
pub use compare::GeneralCompare;
pub use external::{CallInfo, ExtCall, ExternalFunction};
pub use failing::Failing;
pub use logical::Logical;
pub use pos::PosPredicate;
pub use range::RangeCompare;
pub use switch::{Switch, SwitchCase};
pub use type_switch::{TypeCase, TypeSwitch};
pub use var_ref::VarRef;

///
/// ExprKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ExprKind {
    Conjunction,
    Disjunction,
    Switch,
    TypeSwitch,
    Cast,
    Boolean,
    Negation,
    Comparison,
    RangeComparison,
    PositionPredicate,
    Literal,
    VarRef,
    External,
    Failing,
}

impl ExprKind {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Conjunction => "And",
            Self::Disjunction => "Or",
            Self::Switch => "Switch",
            Self::TypeSwitch => "TypeSwitch",
            Self::Cast => "Cast",
            Self::Boolean => "FnBoolean",
            Self::Negation => "FnNot",
            Self::Comparison => "CmpG",
            Self::RangeComparison => "CmpR",
            Self::PositionPredicate => "Pos",
            Self::Literal => "Literal",
            Self::VarRef => "VarRef",
            Self::External => "Call",
            Self::Failing => "Failing",
        }
    }
}

impl fmt::Display for ExprKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// Transformed
///
/// Result of a rewrite that may or may not have changed the node.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Transformed {
    pub expr: Expr,
    pub changed: bool,
}

impl Transformed {
    #[must_use]
    pub const fn yes(expr: Expr) -> Self {
        Self {
            expr,
            changed: true,
        }
    }

    #[must_use]
    pub const fn no(expr: Expr) -> Self {
        Self {
            expr,
            changed: false,
        }
    }
}

///
/// Expr
///
/// Structural equality ignores spans.
///

#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    And(Logical),
    Or(Logical),
    Switch(Switch),
    TypeSwitch(TypeSwitch),
    Cast(Cast),
    Call(Call),
    Compare(GeneralCompare),
    Range(RangeCompare),
    Pos(PosPredicate),
    Literal(Value),
    VarRef(VarRef),
    External(ExtCall),
    Failing(Failing),
}

impl Expr {
    ///
    /// BUILDERS
    ///

    #[must_use]
    pub fn and(children: Vec<Self>) -> Self {
        Self::And(Logical::new(children, Span::UNKNOWN))
    }

    #[must_use]
    pub fn or(children: Vec<Self>) -> Self {
        Self::Or(Logical::new(children, Span::UNKNOWN))
    }

    #[must_use]
    pub fn not(arg: Self) -> Self {
        Self::Call(Call::new(Function::Not, arg, Span::UNKNOWN))
    }

    #[must_use]
    pub fn boolean(arg: Self) -> Self {
        Self::Call(Call::new(Function::Boolean, arg, Span::UNKNOWN))
    }

    #[must_use]
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    #[must_use]
    pub fn bool(value: bool) -> Self {
        Self::Literal(Value::bool(value))
    }

    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::Literal(Value::from(Item::Integer(value)))
    }

    #[must_use]
    pub fn string(value: &str) -> Self {
        Self::Literal(Value::from(Item::string(value)))
    }

    #[must_use]
    pub const fn empty() -> Self {
        Self::Literal(Value::empty())
    }

    #[must_use]
    pub fn var(var: &Var) -> Self {
        Self::VarRef(VarRef::new(var.clone(), Span::UNKNOWN))
    }

    #[must_use]
    pub fn cast(operand: Self, target: SeqType) -> Self {
        Self::Cast(Cast::new(operand, target, Span::UNKNOWN))
    }

    #[must_use]
    pub fn compare(left: Self, op: CompareOp, right: Self) -> Self {
        Self::Compare(GeneralCompare::new(left, op, right, Span::UNKNOWN))
    }

    /// `min <= operand <= max`, both bounds inclusive.
    #[must_use]
    pub fn range(operand: Self, min: f64, max: f64) -> Self {
        Self::Range(RangeCompare::new(operand, min, true, max, true, Span::UNKNOWN))
    }

    #[must_use]
    pub const fn pos(min: i64, max: i64) -> Self {
        Self::Pos(PosPredicate::new(min, max, Span::UNKNOWN))
    }

    #[must_use]
    pub fn switch(operand: Self, cases: Vec<(Self, Self)>, default: Self) -> Self {
        let cases = cases
            .into_iter()
            .map(|(value, result)| SwitchCase { value, result })
            .collect();

        Self::Switch(Switch::new(operand, cases, default, Span::UNKNOWN))
    }

    #[must_use]
    pub fn type_switch(operand: Self, cases: Vec<TypeCase>) -> Self {
        Self::TypeSwitch(TypeSwitch::new(operand, cases, Span::UNKNOWN))
    }

    #[must_use]
    pub fn external(function: Arc<dyn ExternalFunction>, args: Vec<Self>) -> Self {
        Self::External(ExtCall::new(function, args, Span::UNKNOWN))
    }

    /// Attach a source location to this node.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        match &mut self {
            Self::And(node) | Self::Or(node) => node.span = span,
            Self::Switch(node) => node.span = span,
            Self::TypeSwitch(node) => node.span = span,
            Self::Cast(node) => node.span = span,
            Self::Call(node) => node.span = span,
            Self::Compare(node) => node.span = span,
            Self::Range(node) => node.span = span,
            Self::Pos(node) => node.span = span,
            Self::VarRef(node) => node.span = span,
            Self::External(node) => node.span = span,
            Self::Failing(node) => node.span = span,
            Self::Literal(_) => {}
        }

        self
    }

    ///
    /// PROPERTIES
    ///

    #[must_use]
    pub const fn kind(&self) -> ExprKind {
        match self {
            Self::And(_) => ExprKind::Conjunction,
            Self::Or(_) => ExprKind::Disjunction,
            Self::Switch(_) => ExprKind::Switch,
            Self::TypeSwitch(_) => ExprKind::TypeSwitch,
            Self::Cast(_) => ExprKind::Cast,
            Self::Call(call) => match call.function {
                Function::Boolean => ExprKind::Boolean,
                Function::Not => ExprKind::Negation,
            },
            Self::Compare(_) => ExprKind::Comparison,
            Self::Range(_) => ExprKind::RangeComparison,
            Self::Pos(_) => ExprKind::PositionPredicate,
            Self::Literal(_) => ExprKind::Literal,
            Self::VarRef(_) => ExprKind::VarRef,
            Self::External(_) => ExprKind::External,
            Self::Failing(_) => ExprKind::Failing,
        }
    }

    #[must_use]
    pub const fn span(&self) -> Span {
        match self {
            Self::And(node) | Self::Or(node) => node.span,
            Self::Switch(node) => node.span,
            Self::TypeSwitch(node) => node.span,
            Self::Cast(node) => node.span,
            Self::Call(node) => node.span,
            Self::Compare(node) => node.span,
            Self::Range(node) => node.span,
            Self::Pos(node) => node.span,
            Self::VarRef(node) => node.span,
            Self::External(node) => node.span,
            Self::Failing(node) => node.span,
            Self::Literal(_) => Span::UNKNOWN,
        }
    }

    /// Static result type.
    #[must_use]
    pub fn seq_type(&self) -> SeqType {
        match self {
            Self::And(_)
            | Self::Or(_)
            | Self::Call(_)
            | Self::Compare(_)
            | Self::Range(_)
            | Self::Pos(_) => SeqType::BOOLEAN_ONE,
            Self::Switch(node) => node.seq_type(),
            Self::TypeSwitch(node) => node.seq_type(),
            Self::Cast(node) => node.target,
            Self::Literal(value) => value.seq_type(),
            Self::VarRef(node) => node.seq_type(),
            Self::External(node) => node.function.seq_type(),
            Self::Failing(node) => node.seq_type,
        }
    }

    #[must_use]
    pub const fn as_literal(&self) -> Option<&Value> {
        match self {
            Self::Literal(value) => Some(value),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    /// Returns whether two evaluations of this node may differ.
    #[must_use]
    pub fn has_nondeterminism(&self) -> bool {
        match self {
            Self::External(node) => {
                !node.function.is_deterministic()
                    || node.args.iter().any(Self::has_nondeterminism)
            }
            _ => self.children().into_iter().any(Self::has_nondeterminism),
        }
    }

    /// Direct children, in evaluation order.
    #[must_use]
    pub fn children(&self) -> Vec<&Self> {
        match self {
            Self::And(node) | Self::Or(node) => node.children.iter().collect(),
            Self::Switch(node) => {
                let mut out = vec![node.operand.as_ref()];
                for case in &node.cases {
                    out.push(&case.value);
                    out.push(&case.result);
                }
                out.push(node.default.as_ref());
                out
            }
            Self::TypeSwitch(node) => std::iter::once(node.operand.as_ref())
                .chain(node.cases.iter().map(|case| &case.result))
                .collect(),
            Self::Cast(node) => vec![node.operand.as_ref()],
            Self::Call(node) => vec![node.arg.as_ref()],
            Self::Compare(node) => vec![node.left.as_ref(), node.right.as_ref()],
            Self::Range(node) => vec![node.operand.as_ref()],
            Self::External(node) => node.args.iter().collect(),
            Self::Pos(_) | Self::Literal(_) | Self::VarRef(_) | Self::Failing(_) => Vec::new(),
        }
    }

    ///
    /// COMPILATION
    ///

    /// Compile children, then apply node-local optimization.
    pub fn compile(self, cc: &mut CompileContext) -> Result<Self, CompileError> {
        match self {
            Self::And(node) => node.compile(false, cc),
            Self::Or(node) => node.compile(true, cc),
            Self::Switch(node) => node.compile(cc),
            Self::TypeSwitch(node) => node.compile(cc),
            Self::Cast(node) => node.compile(cc),
            Self::Call(node) => node.compile(cc),
            Self::Compare(node) => node.compile(cc),
            Self::Range(node) => node.compile(cc),
            Self::Pos(node) => node.optimize(cc),
            Self::External(node) => node.compile(cc),
            Self::Literal(_) | Self::VarRef(_) | Self::Failing(_) => Ok(self),
        }
    }

    /// Node-local optimization; children are assumed compiled.
    pub fn optimize(self, cc: &mut CompileContext) -> Result<Self, CompileError> {
        match self {
            Self::And(node) => node.optimize(false, cc),
            Self::Or(node) => node.optimize(true, cc),
            Self::Switch(node) => node.optimize(cc),
            Self::TypeSwitch(node) => node.optimize(cc),
            Self::Cast(node) => node.optimize(cc),
            Self::Call(node) => node.optimize(cc),
            Self::Compare(node) => node.optimize(cc),
            Self::Range(node) => node.optimize(cc),
            Self::Pos(node) => node.optimize(cc),
            Self::External(_) | Self::Literal(_) | Self::VarRef(_) | Self::Failing(_) => Ok(self),
        }
    }

    /// Rewrite a node whose result is only used as an effective boolean value.
    #[must_use]
    pub fn optimize_ebv(self, cc: &mut CompileContext) -> Self {
        match self {
            Self::Call(call) if call.function == Function::Boolean => {
                let span = call.span;
                let arg = (*call.arg).optimize_ebv(cc);
                cc.info(OptNote::Simplify, || {
                    format!("boolean({arg}) used as a boolean")
                });

                cc.replace_with(ExprKind::Boolean, span, arg)
            }
            other => other,
        }
    }

    /// Substitute `with` for every reference to `var`, re-optimizing the
    /// nodes that changed.
    pub fn inline(
        self,
        var: &Var,
        with: &Self,
        cc: &mut CompileContext,
    ) -> Result<Transformed, CompileError> {
        match self {
            Self::And(node) => node.inline(false, var, with, cc),
            Self::Or(node) => node.inline(true, var, with, cc),
            Self::Switch(node) => node.inline(var, with, cc),
            Self::TypeSwitch(node) => node.inline(var, with, cc),
            Self::Cast(node) => node.inline(var, with, cc),
            Self::Call(node) => node.inline(var, with, cc),
            Self::Compare(node) => node.inline(var, with, cc),
            Self::Range(node) => node.inline(var, with, cc),
            Self::VarRef(node) => Ok(node.inline(var, with, cc)),
            Self::External(node) => node.inline(var, with, cc),
            Self::Pos(_) | Self::Literal(_) | Self::Failing(_) => Ok(Transformed::no(self)),
        }
    }

    /// Try to combine this operand with the next one under a connective.
    #[must_use]
    pub fn merge(&self, next: &Self, or: bool, cc: &mut CompileContext) -> Option<Self> {
        match (self, next) {
            (Self::Pos(a), Self::Pos(b)) if !or => Some(a.intersect(b, cc)),
            (Self::Range(a), Self::Range(b)) if !or => a.intersect(b, cc),
            (Self::Compare(a), Self::Compare(b)) if or => a.union(b, cc),
            _ => None,
        }
    }

    /// Mark nodes whose result is the enclosing function's result.
    pub fn mark_tail_calls(&mut self) {
        match self {
            Self::And(node) | Self::Or(node) => node.mark_tail_calls(),
            Self::Switch(node) => {
                for case in &mut node.cases {
                    case.result.mark_tail_calls();
                }
                node.default.mark_tail_calls();
            }
            Self::TypeSwitch(node) => {
                for case in &mut node.cases {
                    case.result.mark_tail_calls();
                }
            }
            Self::External(node) => node.tail = true,
            _ => {}
        }
    }

    ///
    /// INDEX ACCESS
    ///

    /// Ask whether this node can be answered from an index. Connectives may
    /// reorder or drop operands; `ic` receives the resulting selectivity.
    pub fn index_accessible(&mut self, ic: &mut IndexContext<'_>) -> bool {
        let collapsed = match self {
            Self::And(node) => return node.and_index_accessible(ic),
            Self::Or(node) => {
                if !node.or_index_accessible(ic) {
                    return false;
                }
                if node.children.len() != 1 {
                    return true;
                }
                let span = node.span;
                let single = std::mem::replace(node, Logical::new(Vec::new(), span));
                ic.collapse(single)
            }
            Self::Failing(_) | Self::Literal(_) => return false,
            leaf => return ic.leaf(leaf),
        };

        match collapsed {
            Some(expr) => {
                *self = expr;
                true
            }
            None => false,
        }
    }

    /// Lower an index-accessible node to its structural set operation.
    #[must_use]
    pub fn index_equivalent(&self, access: &dyn IndexAccess) -> IndexPlan {
        match self {
            Self::And(node) => node.and_index_equivalent(access),
            Self::Or(node) => node.or_index_equivalent(access),
            Self::Literal(value) if value.is_empty() || value == &Value::bool(false) => {
                IndexPlan::Empty
            }
            leaf => access.lower(leaf),
        }
    }

    ///
    /// EVALUATION
    ///

    pub fn evaluate(&self, qc: &mut QueryContext) -> Result<Value, EvalError> {
        match self {
            Self::And(node) => node.and_atomic(qc).map(Value::from),
            Self::Or(node) => node.or_atomic(qc).map(Value::from),
            Self::Switch(node) => node.evaluate(qc),
            Self::TypeSwitch(node) => node.evaluate(qc),
            Self::Cast(node) => node.evaluate(qc),
            Self::Call(node) => node.evaluate(qc),
            Self::Compare(node) => node.evaluate(qc).map(Value::bool),
            Self::Range(node) => node.evaluate(qc).map(Value::bool),
            Self::Pos(node) => node.evaluate(qc).map(Value::bool),
            Self::Literal(value) => Ok(value.clone()),
            Self::VarRef(node) => node.evaluate(qc),
            Self::External(node) => node.evaluate(qc),
            Self::Failing(node) => Err(node.raise()),
        }
    }

    /// Effective boolean value of this node's result.
    pub fn ebv(&self, qc: &mut QueryContext) -> Result<Bln, EvalError> {
        match self {
            Self::And(node) => node.and_atomic(qc),
            Self::Or(node) => node.or_atomic(qc),
            Self::Call(node) => node.ebv(qc),
            Self::Compare(node) => node.evaluate(qc).map(Bln::get),
            Self::Range(node) => node.evaluate(qc).map(Bln::get),
            Self::Pos(node) => node.evaluate(qc).map(Bln::get),
            Self::Literal(value) => value.ebv(Span::UNKNOWN),
            other => other.evaluate(qc)?.ebv(other.span()),
        }
    }

    ///
    /// PLAN
    ///

    /// Structured plan tree for inspection.
    #[must_use]
    pub fn describe(&self) -> ExplainNode {
        let node = ExplainNode::new(self.kind().name());

        match self {
            Self::Switch(_) | Self::Call(_) | Self::And(_) | Self::Or(_) => {}
            Self::TypeSwitch(ts) => {
                let mut node = node.child(ts.operand.describe());
                for case in &ts.cases {
                    node = node.child(case.describe());
                }
                return node;
            }
            Self::Cast(cast) => return node.attr("type", cast.target).child(cast.operand.describe()),
            Self::Compare(cmp) => {
                return node
                    .attr("op", cmp.op)
                    .child(cmp.left.describe())
                    .child(cmp.right.describe());
            }
            Self::Range(range) => {
                return node
                    .attr("min", range.min)
                    .attr("max", range.max)
                    .attr("min_inclusive", range.min_inclusive)
                    .attr("max_inclusive", range.max_inclusive)
                    .child(range.operand.describe());
            }
            Self::Pos(pos) => return node.attr("min", pos.min).attr("max", pos.max),
            Self::Literal(value) => {
                return node.attr("value", value).attr("type", value.seq_type());
            }
            Self::VarRef(var) => return node.attr("name", &var.var.name).attr("id", var.var.id),
            Self::External(ext) => {
                let node = node
                    .attr("name", ext.function.name())
                    .attr("type", ext.function.seq_type())
                    .attr("tail", ext.tail);
                return ext.args.iter().fold(node, |n, arg| n.child(arg.describe()));
            }
            Self::Failing(fail) => {
                return node
                    .attr("code", fail.error.code())
                    .attr("error", &fail.error);
            }
        }

        self.children()
            .into_iter()
            .fold(node, |n, child| n.child(child.describe()))
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Self::Literal(value)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::And(node) => node.fmt_with(f, "and"),
            Self::Or(node) => node.fmt_with(f, "or"),
            Self::Switch(node) => write!(f, "{node}"),
            Self::TypeSwitch(node) => write!(f, "{node}"),
            Self::Cast(node) => write!(f, "{node}"),
            Self::Call(node) => write!(f, "{node}"),
            Self::Compare(node) => write!(f, "{node}"),
            Self::Range(node) => write!(f, "{node}"),
            Self::Pos(node) => write!(f, "{node}"),
            Self::Literal(value) => write!(f, "{value}"),
            Self::VarRef(node) => write!(f, "{node}"),
            Self::External(node) => write!(f, "{node}"),
            Self::Failing(node) => write!(f, "{node}"),
        }
    }
}
