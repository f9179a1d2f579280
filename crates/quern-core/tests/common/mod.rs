#![allow(dead_code)]

use quern_core::{
    error::EvalError,
    eval::CancelToken,
    expr::{CallInfo, Expr, ExternalFunction},
    types::SeqType,
    value::Value,
};
use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

///
/// Probe
///
/// External leaf returning a fixed result and counting its invocations.
/// Optionally cancels a token when called.
///

pub struct Probe {
    name: String,
    seq_type: SeqType,
    result: Result<Value, EvalError>,
    deterministic: bool,
    cancel: Option<CancelToken>,
    calls: AtomicUsize,
}

impl Probe {
    pub fn new(name: &str, seq_type: SeqType, result: Result<Value, EvalError>) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            seq_type,
            result,
            deterministic: true,
            cancel: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn flag(name: &str, value: bool) -> Arc<Self> {
        Self::new(name, SeqType::BOOLEAN_ONE, Ok(Value::bool(value)))
    }

    pub fn random(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            seq_type: SeqType::BOOLEAN_ONE,
            result: Ok(Value::bool(true)),
            deterministic: false,
            cancel: None,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn canceller(name: &str, token: CancelToken) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            seq_type: SeqType::BOOLEAN_ONE,
            result: Ok(Value::bool(true)),
            deterministic: true,
            cancel: Some(token),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn expr(self: &Arc<Self>) -> Expr {
        Expr::external(self.clone(), Vec::new())
    }
}

impl ExternalFunction for Probe {
    fn name(&self) -> &str {
        &self.name
    }

    fn seq_type(&self) -> SeqType {
        self.seq_type
    }

    fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    fn invoke(&self, _: &[Value], _: &CallInfo) -> Result<Value, EvalError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(token) = &self.cancel {
            token.cancel();
        }

        self.result.clone()
    }
}
