//! Compile-time services shared by every node: optimization notes, rewrite
//! tracking, deferred failures and built-in function construction.

mod diagnostics;
mod scope;

use crate::{
    error::CompileError,
    expr::{Call, Expr, ExprKind, Failing, Function, Transformed},
    span::Span,
    types::SeqType,
};
use quern_config::Config;

// re-exports
pub use diagnostics::{Diagnostic, OptNote, RewriteEvent};
pub use scope::{StaticScope, Var, VarId};

///
/// CompileContext
///
/// Lives for one query compilation. Threaded explicitly through every
/// `compile`, `optimize` and `inline` call.
///

#[derive(Debug)]
pub struct CompileContext {
    config: Config,
    scope: StaticScope,
    diagnostics: Vec<Diagnostic>,
    rewrites: Vec<RewriteEvent>,
}

impl CompileContext {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self::with_scope(config, StaticScope::new())
    }

    #[must_use]
    pub fn with_scope(config: &Config, scope: StaticScope) -> Self {
        Self {
            config: config.clone(),
            scope,
            diagnostics: Vec::new(),
            rewrites: Vec::new(),
        }
    }

    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    #[must_use]
    pub const fn scope(&self) -> &StaticScope {
        &self.scope
    }

    pub const fn scope_mut(&mut self) -> &mut StaticScope {
        &mut self.scope
    }

    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn rewrites(&self) -> &[RewriteEvent] {
        &self.rewrites
    }

    /// Record an optimization note. `message` only runs when notes are
    /// collected or logged.
    pub fn info(&mut self, note: OptNote, message: impl FnOnce() -> String) {
        let cfg = self.config.diagnostics;
        if !cfg.enabled && !cfg.log {
            return;
        }

        let message = message();
        if cfg.log {
            tracing::debug!(target: "quern::compile", note = %note, "{message}");
        }
        if cfg.enabled {
            self.diagnostics.push(Diagnostic { note, message });
        }
    }

    /// Park `err` in a deferred-failure node standing in for an operand.
    pub fn error(&mut self, err: CompileError, span: Span, seq_type: SeqType) -> Expr {
        self.info(OptNote::DeferError, || format!("defer '{err}' at {span}"));

        Expr::Failing(Failing::new(err, seq_type, span))
    }

    /// Record that a node of kind `from` was replaced by `new`.
    pub fn replace_with(&mut self, from: ExprKind, span: Span, new: Expr) -> Expr {
        if self.config.diagnostics.rewrites {
            let event = RewriteEvent {
                from,
                to: new.kind(),
                span,
            };
            if self.config.diagnostics.log {
                tracing::debug!(target: "quern::compile", "rewrite {event}");
            }
            self.rewrites.push(event);
        }

        new
    }

    /// Build and optimize a call to a built-in function.
    pub fn function(
        &mut self,
        function: Function,
        args: Vec<Expr>,
        span: Span,
    ) -> Result<Expr, CompileError> {
        let [arg]: [Expr; 1] = args.try_into().map_err(|args: Vec<Expr>| CompileError::Arity {
            name: function.name(),
            expected: 1,
            found: args.len(),
            span,
        })?;

        Call::new(function, arg, span).optimize(self)
    }

    /// Compile an operand whose failure must wait for evaluation.
    pub(crate) fn compile_deferred(&mut self, expr: Expr) -> Expr {
        let (span, seq_type) = (expr.span(), expr.seq_type());

        match expr.compile(self) {
            Ok(expr) => expr,
            Err(err) => self.error(err, span, seq_type),
        }
    }

    /// Compile operands left to right. The first failure propagates; later
    /// ones become deferred-failure nodes.
    pub(crate) fn compile_operands(&mut self, exprs: Vec<Expr>) -> Result<Vec<Expr>, CompileError> {
        let mut out = Vec::with_capacity(exprs.len());
        for (i, expr) in exprs.into_iter().enumerate() {
            if i == 0 {
                out.push(expr.compile(self)?);
            } else {
                out.push(self.compile_deferred(expr));
            }
        }

        Ok(out)
    }

    /// Inline an operand whose failure must wait for evaluation.
    pub(crate) fn inline_deferred(&mut self, expr: Expr, var: &Var, with: &Expr) -> Transformed {
        let (span, seq_type) = (expr.span(), expr.seq_type());

        match expr.inline(var, with, self) {
            Ok(done) => done,
            Err(err) => Transformed::yes(self.error(err, span, seq_type)),
        }
    }

    /// Inline into operands left to right with the compile failure policy.
    /// With `truncate`, operands after a deferred failure are dropped since
    /// evaluation can never reach them.
    pub(crate) fn inline_operands(
        &mut self,
        exprs: Vec<Expr>,
        var: &Var,
        with: &Expr,
        truncate: bool,
    ) -> Result<(Vec<Expr>, bool), CompileError> {
        let mut out = Vec::with_capacity(exprs.len());
        let mut changed = false;

        for (i, expr) in exprs.into_iter().enumerate() {
            let (span, seq_type) = (expr.span(), expr.seq_type());
            match expr.inline(var, with, self) {
                Ok(done) => {
                    changed |= done.changed;
                    out.push(done.expr);
                }
                Err(err) if i == 0 => return Err(err),
                Err(err) => {
                    out.push(self.error(err, span, seq_type));
                    changed = true;
                    if truncate {
                        break;
                    }
                }
            }
        }

        Ok((out, changed))
    }
}

///
/// TESTS
///
