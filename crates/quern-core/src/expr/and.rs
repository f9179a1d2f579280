use crate::{
    error::EvalError,
    eval::QueryContext,
    expr::Logical,
    index::{IndexAccess, IndexContext, IndexPlan},
    value::{Bln, Score},
};

///
/// Conjunction
///

impl Logical {
    /// All operands must be true. Stops at the first false operand; scores
    /// of true operands are combined with the AND combinator.
    pub(crate) fn and_atomic(&self, qc: &mut QueryContext) -> Result<Bln, EvalError> {
        let mut score = Score::ZERO;
        for child in &self.children {
            qc.check()?;

            let b = child.ebv(qc)?;
            if !b.value() {
                return Ok(Bln::FALSE);
            }
            if qc.scoring() {
                score = score.and(b.score());
            }
        }

        Ok(if score.is_zero() {
            Bln::TRUE
        } else {
            Bln::scored(score)
        })
    }

    /// Every operand must be index-accessible. A provably empty operand is
    /// moved to the front; otherwise operands are ordered by ascending
    /// selectivity so the cheapest filter runs first.
    pub(crate) fn and_index_accessible(&mut self, ic: &mut IndexContext<'_>) -> bool {
        let mut estimates = Vec::with_capacity(self.children.len());
        for child in &mut self.children {
            if !child.index_accessible(ic) {
                return false;
            }
            estimates.push(ic.selectivity);
        }

        let mut indexed: Vec<_> = std::mem::take(&mut self.children)
            .into_iter()
            .zip(estimates)
            .collect();

        if let Some(empty) = indexed.iter().position(|(_, estimate)| *estimate == 0) {
            let first = indexed.remove(empty);
            indexed.insert(0, first);
            ic.selectivity = 0;
        } else {
            if ic.reorder {
                indexed.sort_by_key(|(_, estimate)| *estimate);
            }
            ic.selectivity = indexed
                .iter()
                .map(|(_, estimate)| *estimate)
                .min()
                .unwrap_or(0);
        }

        let order: Vec<u64> = indexed.iter().map(|(_, estimate)| *estimate).collect();
        ic.note_order("and", &order);
        self.children = indexed.into_iter().map(|(child, _)| child).collect();

        true
    }

    pub(crate) fn and_index_equivalent(&self, access: &dyn IndexAccess) -> IndexPlan {
        IndexPlan::Intersect(
            self.children
                .iter()
                .map(|child| child.index_equivalent(access))
                .collect(),
        )
    }
}
