use std::fmt;

///
/// Occ
///
/// Occurrence bounds of a sequence type. `max == usize::MAX` means unbounded.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Occ {
    pub min: usize,
    pub max: usize,
}

impl Occ {
    pub const ZERO: Self = Self::new(0, 0);
    pub const ONE: Self = Self::new(1, 1);
    pub const ZERO_OR_ONE: Self = Self::new(0, 1);
    pub const ZERO_OR_MORE: Self = Self::new(0, usize::MAX);
    pub const ONE_OR_MORE: Self = Self::new(1, usize::MAX);

    #[must_use]
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    #[must_use]
    pub const fn is_one(self) -> bool {
        self.min == 1 && self.max == 1
    }

    #[must_use]
    pub const fn check(self, len: usize) -> bool {
        len >= self.min && len <= self.max
    }

    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        let min = if self.min < other.min {
            self.min
        } else {
            other.min
        };
        let max = if self.max > other.max {
            self.max
        } else {
            other.max
        };

        Self::new(min, max)
    }
}

impl fmt::Display for Occ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.min, self.max) {
            (1, 1) => Ok(()),
            (0, 1) => f.write_str("?"),
            (0, usize::MAX) => f.write_str("*"),
            (1, usize::MAX) => f.write_str("+"),
            (min, usize::MAX) => write!(f, "{{{min},}}"),
            (min, max) => write!(f, "{{{min},{max}}}"),
        }
    }
}
