use crate::{
    error::EvalError,
    span::Span,
    types::AtomType,
    value::{Item, cast_item},
};
use std::{cmp::Ordering, fmt};

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "!=",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }

    /// Operator with both operands exchanged (`a < b` ⇔ `b > a`).
    #[must_use]
    pub const fn swap(self) -> Self {
        match self {
            Self::Eq | Self::Ne => self,
            Self::Lt => Self::Gt,
            Self::Le => Self::Ge,
            Self::Gt => Self::Lt,
            Self::Ge => Self::Le,
        }
    }

    /// `None` stands for an unordered pair (NaN involved).
    #[must_use]
    pub const fn holds(self, ordering: Option<Ordering>) -> bool {
        match ordering {
            None => matches!(self, Self::Ne),
            Some(ord) => match self {
                Self::Eq => ord.is_eq(),
                Self::Ne => ord.is_ne(),
                Self::Lt => ord.is_lt(),
                Self::Le => ord.is_le(),
                Self::Gt => ord.is_gt(),
                Self::Ge => ord.is_ge(),
            },
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// Value equivalence used by switch dispatch. Never fails: incomparable
/// items are simply not equivalent.
#[must_use]
pub fn equiv(a: &Item, b: &Item) -> bool {
    if let (Item::Integer(x), Item::Integer(y)) = (a, b) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return x == y || (x.is_nan() && y.is_nan());
    }

    match (a, b) {
        (
            Item::String(x) | Item::Untyped(x) | Item::AnyUri(x),
            Item::String(y) | Item::Untyped(y) | Item::AnyUri(y),
        ) => x == y,
        (Item::Bool(x), Item::Bool(y)) => x.value() == y.value(),
        (Item::QName(x), Item::QName(y)) => x == y,
        _ => false,
    }
}

/// Compare two items, promoting untyped operands to the other side's type.
pub fn compare_items(a: &Item, b: &Item, op: CompareOp, span: Span) -> Result<bool, EvalError> {
    match (a, b) {
        (Item::Untyped(_), other) | (other, Item::Untyped(_))
            if !matches!(other, Item::Untyped(_)) =>
        {
            let target = if other.atom_type().is_numeric() {
                AtomType::Double
            } else {
                other.atom_type()
            };
            let (a, b) = if matches!(a, Item::Untyped(_)) {
                (cast_item(a, target)?, b.clone())
            } else {
                (a.clone(), cast_item(b, target)?)
            };

            compare_typed(&a, &b, op, span)
        }
        _ => compare_typed(a, b, op, span),
    }
}

fn compare_typed(a: &Item, b: &Item, op: CompareOp, span: Span) -> Result<bool, EvalError> {
    // integers only widen to double when the other side is a float or double
    if let (Item::Integer(x), Item::Integer(y)) = (a, b) {
        return Ok(op.holds(Some(x.cmp(y))));
    }
    if let (Some(x), Some(y)) = (a.as_f64(), b.as_f64()) {
        return Ok(op.holds(x.partial_cmp(&y)));
    }

    let ordering = match (a, b) {
        (
            Item::String(x) | Item::Untyped(x) | Item::AnyUri(x),
            Item::String(y) | Item::Untyped(y) | Item::AnyUri(y),
        ) => x.cmp(y),
        (Item::Bool(x), Item::Bool(y)) => x.value().cmp(&y.value()),
        (Item::QName(x), Item::QName(y)) if matches!(op, CompareOp::Eq | CompareOp::Ne) => {
            if x == y {
                Ordering::Equal
            } else {
                Ordering::Less
            }
        }
        _ => {
            return Err(EvalError::Type {
                expected: a.atom_type().to_string(),
                found: b.atom_type().to_string(),
                span,
            });
        }
    };

    Ok(op.holds(Some(ordering)))
}

/// Existential general comparison over two sequences.
pub fn compare_values(
    left: &[Item],
    right: &[Item],
    op: CompareOp,
    span: Span,
) -> Result<bool, EvalError> {
    for a in left {
        for b in right {
            if compare_items(a, b, op, span)? {
                return Ok(true);
            }
        }
    }

    Ok(false)
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_equivalence_crosses_types() {
        assert!(equiv(&Item::Integer(2), &Item::Double(2.0)));
        assert!(equiv(&Item::Float(0.5), &Item::Double(0.5)));
        assert!(equiv(&Item::Double(f64::NAN), &Item::Double(f64::NAN)));
        assert!(!equiv(&Item::Integer(2), &Item::string("2")));
        assert!(equiv(&Item::untyped("a"), &Item::string("a")));
    }

    #[test]
    fn large_integers_compare_exactly() {
        let a = Item::Integer(9_007_199_254_740_993);
        let b = Item::Integer(9_007_199_254_740_992);

        assert!(!equiv(&a, &b));
        assert!(equiv(&a, &Item::Integer(9_007_199_254_740_993)));
        assert_eq!(compare_items(&a, &b, CompareOp::Eq, Span::UNKNOWN), Ok(false));
        assert_eq!(compare_items(&a, &b, CompareOp::Gt, Span::UNKNOWN), Ok(true));
        assert_eq!(compare_items(&b, &a, CompareOp::Ne, Span::UNKNOWN), Ok(true));
    }

    #[test]
    fn untyped_is_promoted() {
        let span = Span::UNKNOWN;

        assert_eq!(
            compare_items(&Item::untyped("10"), &Item::Integer(9), CompareOp::Gt, span),
            Ok(true)
        );
        assert_eq!(
            compare_items(&Item::string("b"), &Item::untyped("a"), CompareOp::Gt, span),
            Ok(true)
        );
        assert!(
            compare_items(&Item::untyped("x"), &Item::Integer(1), CompareOp::Eq, span).is_err()
        );
    }

    #[test]
    fn nan_is_unordered() {
        let nan = Item::Double(f64::NAN);

        for op in [CompareOp::Eq, CompareOp::Lt, CompareOp::Ge] {
            assert_eq!(compare_items(&nan, &nan, op, Span::UNKNOWN), Ok(false));
        }
        assert_eq!(
            compare_items(&nan, &nan, CompareOp::Ne, Span::UNKNOWN),
            Ok(true)
        );
    }

    #[test]
    fn incomparable_types_fail() {
        assert!(matches!(
            compare_items(
                &Item::Integer(1),
                &Item::string("1"),
                CompareOp::Eq,
                Span::UNKNOWN
            ),
            Err(EvalError::Type { .. })
        ));
    }

    #[test]
    fn general_comparison_is_existential() {
        let left = [Item::Integer(1), Item::Integer(5)];
        let right = [Item::Integer(5)];

        assert_eq!(
            compare_values(&left, &right, CompareOp::Eq, Span::UNKNOWN),
            Ok(true)
        );
        assert_eq!(
            compare_values(&left, &[], CompareOp::Eq, Span::UNKNOWN),
            Ok(false)
        );
    }
}
