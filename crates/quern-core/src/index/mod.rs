//! Boundary to the storage layer's index collaborator.
//!
//! The collaborator reports how selective an operand is and lowers
//! accessible operands to lookups. Connectives combine those answers:
//! conjunction intersects, disjunction unions.

use crate::{
    compile::{CompileContext, OptNote},
    expr::{Expr, ExprKind, Function, Logical},
};
use serde::Serialize;

///
/// IndexInfo
///
/// `selectivity == 0` means the operand provably matches nothing.
/// `sequential` means the only access path is a full scan.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct IndexInfo {
    pub selectivity: u64,
    pub sequential: bool,
}

impl IndexInfo {
    #[must_use]
    pub const fn new(selectivity: u64) -> Self {
        Self {
            selectivity,
            sequential: false,
        }
    }

    #[must_use]
    pub const fn sequential() -> Self {
        Self {
            selectivity: u64::MAX,
            sequential: true,
        }
    }
}

///
/// IndexAccess
///

pub trait IndexAccess {
    /// Selectivity of a leaf operand, or `None` if no index covers it.
    fn selectivity(&self, operand: &Expr) -> Option<IndexInfo>;

    /// Lower an accessible leaf operand to a lookup.
    fn lower(&self, operand: &Expr) -> IndexPlan;
}

///
/// IndexPlan
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "op", content = "inputs", rename_all = "snake_case")]
pub enum IndexPlan {
    Lookup(String),
    Intersect(Vec<Self>),
    Union(Vec<Self>),
    Empty,
}

///
/// IndexContext
///
/// Working state of one accessibility analysis. `selectivity` carries the
/// estimate of the node analysed last.
///

pub struct IndexContext<'a> {
    access: &'a dyn IndexAccess,
    cc: &'a mut CompileContext,
    pub reorder: bool,
    pub selectivity: u64,
}

impl<'a> IndexContext<'a> {
    pub fn new(access: &'a dyn IndexAccess, cc: &'a mut CompileContext) -> Self {
        let reorder = cc.config().index.reorder;

        Self {
            access,
            cc,
            reorder,
            selectivity: 0,
        }
    }

    /// Ask the collaborator about a leaf operand.
    pub(crate) fn leaf(&mut self, operand: &Expr) -> bool {
        match self.access.selectivity(operand) {
            Some(info) if !info.sequential => {
                self.selectivity = info.selectivity;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn note_order(&mut self, keyword: &str, order: &[u64]) {
        self.cc.info(OptNote::Reorder, || {
            format!("index order of '{keyword}' by selectivity {order:?}")
        });
    }

    /// A disjunction left with one operand becomes that operand as a
    /// boolean, as the optimizer would have produced it.
    pub(crate) fn collapse(&mut self, mut node: Logical) -> Option<Expr> {
        let span = node.span;
        let only = node.children.pop()?;
        let expr = self.cc.function(Function::Boolean, vec![only], span).ok()?;

        Some(self.cc.replace_with(ExprKind::Disjunction, span, expr))
    }

    pub(crate) fn note_dropped(&mut self, keyword: &str, count: usize) {
        self.cc.info(OptNote::RemoveOperand, || {
            format!("drop {count} empty operand(s) from '{keyword}'")
        });
    }
}
