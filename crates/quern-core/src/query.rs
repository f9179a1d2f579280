//! Top-level entry point: compile an expression tree once, then evaluate
//! the read-only result any number of times.

use crate::{
    compile::CompileContext,
    error::{CompileError, EvalError},
    eval::QueryContext,
    explain::ExplainPlan,
    expr::Expr,
    fingerprint::PlanFingerprint,
    index::{IndexAccess, IndexContext, IndexPlan},
    value::Value,
};
use tracing::instrument;

///
/// Query
///
/// An uncompiled expression tree as handed over by the parser.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Query {
    root: Expr,
}

impl Query {
    #[must_use]
    pub const fn new(root: Expr) -> Self {
        Self { root }
    }

    #[must_use]
    pub const fn root(&self) -> &Expr {
        &self.root
    }

    /// Evaluate without compiling. Used as the reference result for
    /// optimized plans.
    pub fn evaluate_uncompiled(&self, qc: &mut QueryContext) -> Result<Value, EvalError> {
        self.root.evaluate(qc)
    }

    /// Compile the tree, mark tail positions and, when a collaborator is
    /// supplied and index analysis is enabled, derive an index plan.
    #[instrument(name = "quern::query::compile", level = "debug", skip_all)]
    pub fn compile(
        self,
        cc: &mut CompileContext,
        index: Option<&dyn IndexAccess>,
    ) -> Result<CompiledQuery, CompileError> {
        let mut root = self.root.compile(cc)?;
        root.mark_tail_calls();

        let mut index_plan = None;
        if let Some(access) = index
            && cc.config().index.enabled
        {
            let mut analysed = root.clone();
            let accessible = {
                let mut ic = IndexContext::new(access, cc);
                analysed.index_accessible(&mut ic)
            };

            if accessible {
                index_plan = Some(analysed.index_equivalent(access));
                root = analysed;
            }
            tracing::debug!(target: "quern::compile", accessible, "index analysis");
        }

        Ok(CompiledQuery::new(root, index_plan))
    }
}

///
/// CompiledQuery
///
/// Read-only after construction; safe to share across threads and to
/// evaluate concurrently, each evaluation with its own `QueryContext`.
///

#[derive(Clone, Debug, PartialEq)]
pub struct CompiledQuery {
    root: Expr,
    index_plan: Option<IndexPlan>,
    fingerprint: PlanFingerprint,
}

impl CompiledQuery {
    fn new(root: Expr, index_plan: Option<IndexPlan>) -> Self {
        let explain = ExplainPlan {
            root: root.describe(),
            index: index_plan.clone(),
        };

        Self {
            fingerprint: PlanFingerprint::of(&explain),
            root,
            index_plan,
        }
    }

    #[must_use]
    pub const fn root(&self) -> &Expr {
        &self.root
    }

    #[must_use]
    pub const fn index_plan(&self) -> Option<&IndexPlan> {
        self.index_plan.as_ref()
    }

    #[must_use]
    pub const fn fingerprint(&self) -> PlanFingerprint {
        self.fingerprint
    }

    pub fn evaluate(&self, qc: &mut QueryContext) -> Result<Value, EvalError> {
        self.root.evaluate(qc)
    }

    #[must_use]
    pub fn explain(&self) -> ExplainPlan {
        ExplainPlan {
            root: self.root.describe(),
            index: self.index_plan.clone(),
        }
    }
}

///
/// TESTS
///
