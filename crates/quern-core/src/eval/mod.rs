//! Per-evaluation state: variable bindings, focus, cancellation and the
//! scoring switch. A compiled tree is read-only; everything that changes
//! while it runs lives here.

mod cancel;

use crate::{
    compile::VarId,
    error::{CancelledError, EvalError},
    value::{Item, Value},
};
use quern_config::Config;

// re-exports
pub use cancel::CancelToken;

///
/// Focus
///
/// Context item with its 1-based position in a sequence of `size` items.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Focus {
    pub item: Item,
    pub position: i64,
    pub size: i64,
}

impl Focus {
    #[must_use]
    pub const fn new(item: Item, position: i64, size: i64) -> Self {
        Self {
            item,
            position,
            size,
        }
    }
}

///
/// QueryContext
///
/// Owned by exactly one evaluation. Concurrent evaluations of the same
/// compiled query each get their own context.
///

#[derive(Debug)]
pub struct QueryContext {
    bindings: Vec<(VarId, Value)>,
    focus: Option<Focus>,
    cancel: CancelToken,
    scoring: bool,
}

impl QueryContext {
    #[must_use]
    pub fn new(config: &Config) -> Self {
        Self {
            bindings: Vec::new(),
            focus: None,
            cancel: CancelToken::new(),
            scoring: config.eval.scoring,
        }
    }

    #[must_use]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    #[must_use]
    pub fn with_focus(mut self, focus: Focus) -> Self {
        self.focus = Some(focus);
        self
    }

    #[must_use]
    pub fn with_var(mut self, id: VarId, value: Value) -> Self {
        self.bindings.push((id, value));
        self
    }

    pub fn set_focus(&mut self, focus: Option<Focus>) {
        self.focus = focus;
    }

    #[must_use]
    pub const fn focus(&self) -> Option<&Focus> {
        self.focus.as_ref()
    }

    #[must_use]
    pub const fn scoring(&self) -> bool {
        self.scoring
    }

    #[must_use]
    pub const fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Cooperative cancellation point, checked between operands.
    pub fn check(&self) -> Result<(), EvalError> {
        if self.cancel.is_cancelled() {
            tracing::trace!(target: "quern::eval", "evaluation cancelled");
            return Err(CancelledError.into());
        }

        Ok(())
    }

    /// Innermost binding of `id`.
    #[must_use]
    pub fn binding(&self, id: VarId) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find_map(|(bound, value)| (*bound == id).then_some(value))
    }

    /// Run `f` with `id` bound to `value`. The binding is removed afterwards,
    /// whether `f` succeeds or fails.
    pub fn with_binding<T>(
        &mut self,
        id: VarId,
        value: Value,
        f: impl FnOnce(&mut Self) -> Result<T, EvalError>,
    ) -> Result<T, EvalError> {
        self.bindings.push((id, value));
        let out = f(self);
        self.bindings.pop();

        out
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compile::StaticScope;

    #[test]
    fn bindings_are_scoped() {
        let mut scope = StaticScope::new();
        let x = scope.declare("x", None);
        let mut qc = QueryContext::new(&Config::default()).with_var(x.id, Value::bool(true));

        let inner = qc.with_binding(x.id, Value::bool(false), |qc| {
            Ok(qc.binding(x.id).cloned())
        });
        assert_eq!(inner, Ok(Some(Value::bool(false))));
        assert_eq!(qc.binding(x.id), Some(&Value::bool(true)));
    }

    #[test]
    fn binding_is_popped_on_error() {
        let mut scope = StaticScope::new();
        let x = scope.declare("x", None);
        let mut qc = QueryContext::new(&Config::default());

        let out: Result<(), _> = qc.with_binding(x.id, Value::empty(), |_| {
            Err(EvalError::NoContext {
                span: crate::span::Span::UNKNOWN,
            })
        });
        assert!(out.is_err());
        assert_eq!(qc.binding(x.id), None);
    }

    #[test]
    fn check_reports_cancellation() {
        let token = CancelToken::new();
        let qc = QueryContext::new(&Config::default()).with_cancel(token.clone());
        assert!(qc.check().is_ok());

        token.cancel();
        assert!(qc.check().unwrap_err().is_cancelled());
    }
}
