use crate::{
    error::EvalError,
    eval::QueryContext,
    expr::{Expr, Logical},
    index::{IndexAccess, IndexContext, IndexPlan},
    value::{Bln, Score},
};

///
/// Disjunction
///

impl Logical {
    /// Any operand must be true. An unscored true operand decides the
    /// result at once; a scored one keeps the scan going so later operands
    /// can add to the score (and raise their errors).
    pub(crate) fn or_atomic(&self, qc: &mut QueryContext) -> Result<Bln, EvalError> {
        let mut score = Score::ZERO;
        let mut found = false;
        for child in &self.children {
            qc.check()?;

            let b = child.ebv(qc)?;
            if b.value() {
                if b.score().is_zero() || !qc.scoring() {
                    return Ok(Bln::TRUE);
                }
                score = score.or(b.score());
                found = true;
            }
        }

        Ok(if found { Bln::scored(score) } else { Bln::FALSE })
    }

    /// Every operand must be index-accessible. Results are unioned, so
    /// selectivities add up and provably empty operands are dropped.
    pub(crate) fn or_index_accessible(&mut self, ic: &mut IndexContext<'_>) -> bool {
        let mut estimates = Vec::with_capacity(self.children.len());
        for child in &mut self.children {
            if !child.index_accessible(ic) {
                return false;
            }
            estimates.push(ic.selectivity);
        }

        let children = std::mem::take(&mut self.children);
        let before = children.len();
        self.children = children
            .into_iter()
            .zip(&estimates)
            .filter(|(_, estimate)| **estimate != 0)
            .map(|(child, _)| child)
            .collect();

        if self.children.len() != before {
            ic.note_dropped("or", before - self.children.len());
        }
        if self.children.is_empty() {
            self.children.push(Expr::bool(false));
        }
        ic.selectivity = estimates.iter().fold(0u64, |sum, e| sum.saturating_add(*e));

        true
    }

    pub(crate) fn or_index_equivalent(&self, access: &dyn IndexAccess) -> IndexPlan {
        match self.children.as_slice() {
            [only] => only.index_equivalent(access),
            children => IndexPlan::Union(
                children
                    .iter()
                    .map(|child| child.index_equivalent(access))
                    .collect(),
            ),
        }
    }
}
