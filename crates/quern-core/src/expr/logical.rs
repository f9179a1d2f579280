use crate::{
    compile::{CompileContext, OptNote, Var},
    error::CompileError,
    expr::{Call, Expr, ExprKind, Function, Transformed},
    span::Span,
    types::SeqType,
};
use std::{collections::VecDeque, fmt};

///
/// Logical
///
/// Operands of an n-ary connective. The same node backs both `Expr::And`
/// and `Expr::Or`; methods that differ take an `or` flag.
///

#[derive(Clone, Debug, PartialEq)]
pub struct Logical {
    pub children: Vec<Expr>,
    pub span: Span,
}

impl Logical {
    #[must_use]
    pub const fn new(children: Vec<Expr>, span: Span) -> Self {
        Self { children, span }
    }

    const fn kind(or: bool) -> ExprKind {
        if or {
            ExprKind::Disjunction
        } else {
            ExprKind::Conjunction
        }
    }

    const fn keyword(or: bool) -> &'static str {
        if or { "or" } else { "and" }
    }

    fn wrap(self, or: bool) -> Expr {
        if or { Expr::Or(self) } else { Expr::And(self) }
    }

    pub(crate) fn compile(self, or: bool, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let children = cc.compile_operands(self.children)?;

        Self::new(children, self.span).optimize(or, cc)
    }

    pub(crate) fn inline(
        self,
        or: bool,
        var: &Var,
        with: &Expr,
        cc: &mut CompileContext,
    ) -> Result<Transformed, CompileError> {
        let span = self.span;
        let (children, changed) = cc.inline_operands(self.children, var, with, true)?;
        let node = Self::new(children, span);

        if changed {
            Ok(Transformed::yes(node.optimize(or, cc)?))
        } else {
            Ok(Transformed::no(node.wrap(or)))
        }
    }

    /// Rewrite the connective after its operands were compiled.
    ///
    /// Operand order is observable through errors, so a literal only
    /// collapses the whole node when no operand precedes it.
    pub(crate) fn optimize(self, or: bool, cc: &mut CompileContext) -> Result<Expr, CompileError> {
        let span = self.span;
        let kind = Self::kind(or);
        let keyword = Self::keyword(or);

        // fold literals, flatten nested connectives of the same kind
        let mut queue: VecDeque<Expr> = self.children.into();
        let mut kept: Vec<Expr> = Vec::with_capacity(queue.len());
        // still at the first operand (flattening keeps it first)
        let mut leading = true;

        while let Some(child) = queue.pop_front() {
            match child.optimize_ebv(cc) {
                Expr::Or(inner) if or => {
                    cc.info(OptNote::Flatten, || format!("flatten nested '{keyword}'"));
                    for grandchild in inner.children.into_iter().rev() {
                        queue.push_front(grandchild);
                    }
                    continue;
                }
                Expr::And(inner) if !or => {
                    cc.info(OptNote::Flatten, || format!("flatten nested '{keyword}'"));
                    for grandchild in inner.children.into_iter().rev() {
                        queue.push_front(grandchild);
                    }
                    continue;
                }
                Expr::Literal(value) => match value.ebv(span) {
                    Err(err) if leading => return Err(err.into()),
                    Err(err) => {
                        // always fails when reached; nothing after it runs
                        let failing = cc.error(err.into(), span, value.seq_type());
                        kept.push(failing);
                        queue.clear();
                    }
                    Ok(b) if b.value() == or => {
                        cc.info(OptNote::PreEvaluate, || {
                            format!("'{keyword}' decided by {value}")
                        });
                        if kept.is_empty() {
                            return Ok(cc.replace_with(kind, span, Expr::bool(or)));
                        }
                        kept.push(Expr::bool(or));
                        queue.clear();
                    }
                    Ok(_) => {
                        cc.info(OptNote::RemoveOperand, || {
                            format!("remove {value} from '{keyword}'")
                        });
                    }
                },
                other => kept.push(other),
            }
            leading = false;
        }

        if kept.is_empty() {
            return Ok(cc.replace_with(kind, span, Expr::bool(!or)));
        }

        // remove duplicates, except operands that may yield different results
        let mut unique: Vec<Expr> = Vec::with_capacity(kept.len());
        for child in kept {
            if !child.has_nondeterminism() && unique.contains(&child) {
                cc.info(OptNote::RemoveOperand, || {
                    format!("remove duplicate {child} from '{keyword}'")
                });
            } else {
                unique.push(child);
            }
        }

        // merge adjacent operands
        let count = unique.len();
        let mut merged: Vec<Expr> = Vec::with_capacity(count);
        for child in unique {
            let combined = merged.last().and_then(|prev| prev.merge(&child, or, cc));
            match combined {
                Some(expr) => {
                    merged.pop();
                    merged.push(expr);
                }
                None => merged.push(child),
            }
        }
        if merged.len() != count {
            cc.info(OptNote::Simplify, || {
                format!("merge operands of '{keyword}' ({count} -> {})", merged.len())
            });

            // a merge may have produced a literal or a new duplicate
            return Self::new(merged, span).optimize(or, cc);
        }

        // single operand: coerce it to a boolean
        if merged.len() == 1 {
            let only = cc.function(Function::Boolean, merged, span)?;
            return Ok(cc.replace_with(kind, span, only));
        }

        // De Morgan: not(a) and not(b) -> not(a or b)
        if merged.iter().all(is_negation) {
            let inner: Vec<Expr> = merged
                .into_iter()
                .filter_map(|child| match child {
                    Expr::Call(call) => Some(*call.arg),
                    _ => None,
                })
                .collect();
            cc.info(OptNote::Negate, || format!("factor out negation of '{keyword}'"));

            let opposite = Self::new(inner, span).optimize(!or, cc)?;
            let negated = cc.function(Function::Not, vec![opposite], span)?;

            return Ok(cc.replace_with(kind, span, negated));
        }

        Ok(Self::new(merged, span).wrap(or))
    }

    /// The last operand may jump straight to its result if it already
    /// yields exactly one boolean.
    pub(crate) fn mark_tail_calls(&mut self) {
        if let Some(last) = self.children.last_mut()
            && last.seq_type() == SeqType::BOOLEAN_ONE
        {
            last.mark_tail_calls();
        }
    }

    pub(crate) fn fmt_with(&self, f: &mut fmt::Formatter<'_>, keyword: &str) -> fmt::Result {
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, " {keyword} ")?;
            }
            match child {
                Expr::And(_) | Expr::Or(_) => write!(f, "({child})")?,
                _ => write!(f, "{child}")?,
            }
        }

        Ok(())
    }
}

const fn is_negation(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Call(Call {
            function: Function::Not,
            ..
        })
    )
}
