//! Expression compilation core for a hierarchical query language: boolean
//! connectives, switch and typeswitch, casts, and the compile context that
//! folds, flattens and reorders them before evaluation.

// public exports are one module level down
pub mod compile;
pub mod error;
pub mod eval;
pub mod explain;
pub mod expr;
pub mod fingerprint;
pub mod index;
pub mod query;
pub mod span;
pub mod types;
pub mod value;

// test
#[cfg(test)]
mod tests;

///
/// Prelude
///
/// Vocabulary needed to build, compile and run a query.
///

pub mod prelude {
    pub use crate::{
        compile::{CompileContext, StaticScope},
        eval::{CancelToken, QueryContext},
        expr::{Expr, TypeCase},
        query::{CompiledQuery, Query},
        types::{AtomType, SeqType},
        value::{CompareOp, Item, Value},
    };
}
