use derive_more::Display;

///
/// Score
///
/// Relevance weight in `[0, 1]` carried by boolean results of ranked
/// predicates. Zero means "unscored": plain boolean logic never produces
/// anything else.
///

#[derive(Clone, Copy, Debug, Default, Display, PartialEq, PartialOrd)]
pub struct Score(f64);

impl Score {
    pub const ZERO: Self = Self(0.0);
    pub const ONE: Self = Self(1.0);

    /// Fallible constructor; rejects NaN and values outside `[0, 1]`.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (0.0..=1.0).contains(&value).then_some(Self(value))
    }

    #[must_use]
    pub const fn get(self) -> f64 {
        self.0
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.0 == 0.0
    }

    /// Conjunctive combination. Unscored operands are neutral; otherwise the
    /// product, so adding conjuncts never raises the score.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        if self.is_zero() {
            other
        } else if other.is_zero() {
            self
        } else {
            Self(self.0 * other.0)
        }
    }

    /// Disjunctive combination (probabilistic sum); never lowers the score.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        Self(other.0.mul_add(-self.0, self.0 + other.0))
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    fn score(v: f64) -> Score {
        Score::new(v).unwrap()
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(Score::new(-0.1).is_none());
        assert!(Score::new(1.5).is_none());
        assert!(Score::new(f64::NAN).is_none());
        assert_eq!(Score::new(0.25), Some(score(0.25)));
    }

    #[test]
    fn and_treats_zero_as_neutral() {
        assert_eq!(Score::ZERO.and(score(0.5)), score(0.5));
        assert_eq!(score(0.5).and(Score::ZERO), score(0.5));
        assert_eq!(score(0.5).and(score(0.5)), score(0.25));
    }

    #[test]
    fn and_never_increases() {
        for (a, b) in [(0.9, 0.8), (0.2, 1.0), (1.0, 1.0), (0.3, 0.3)] {
            let combined = score(a).and(score(b));
            assert!(combined <= score(a));
            assert!(combined <= score(b));
        }
    }

    #[test]
    fn or_never_decreases() {
        for (a, b) in [(0.9, 0.8), (0.0, 0.4), (1.0, 0.1), (0.3, 0.3)] {
            let combined = score(a).or(score(b));
            assert!(combined >= score(a));
            assert!(combined >= score(b));
            assert!(combined <= Score::ONE);
        }
    }
}
