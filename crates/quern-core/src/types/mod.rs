//! Static sequence types: an atomic item type plus an occurrence range.

mod occ;


use crate::value::Value;
use std::fmt;

// re-exports
pub use occ::Occ;

///
/// AtomType
///
/// Item types known to the compiler. `Item`, `AnyAtomic` and `Numeric` are
/// abstract: no runtime item has them as its own type.
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum AtomType {
    Item,
    AnyAtomic,
    Untyped,
    String,
    Boolean,
    Numeric,
    Integer,
    Float,
    Double,
    AnyUri,
    QName,
}

impl AtomType {
    /// Returns whether every instance of `self` is also an instance of `other`.
    #[must_use]
    pub const fn instance_of(self, other: Self) -> bool {
        match (self, other) {
            (_, Self::Item) => true,
            (Self::Item, _) => false,
            (_, Self::AnyAtomic) => true,
            (Self::Integer | Self::Float | Self::Double | Self::Numeric, Self::Numeric) => true,
            _ => self as u8 == other as u8,
        }
    }

    #[must_use]
    pub const fn is_numeric(self) -> bool {
        matches!(
            self,
            Self::Numeric | Self::Integer | Self::Float | Self::Double
        )
    }

    /// Abstract types cannot be the target of a cast.
    #[must_use]
    pub const fn is_castable_target(self) -> bool {
        !matches!(self, Self::Item | Self::AnyAtomic | Self::Numeric)
    }

    /// Closest common supertype of two item types.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        if self as u8 == other as u8 {
            self
        } else if self.is_numeric() && other.is_numeric() {
            Self::Numeric
        } else if matches!(self, Self::Item) || matches!(other, Self::Item) {
            Self::Item
        } else {
            Self::AnyAtomic
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Item => "item()",
            Self::AnyAtomic => "xs:anyAtomicType",
            Self::Untyped => "xs:untypedAtomic",
            Self::String => "xs:string",
            Self::Boolean => "xs:boolean",
            Self::Numeric => "xs:numeric",
            Self::Integer => "xs:integer",
            Self::Float => "xs:float",
            Self::Double => "xs:double",
            Self::AnyUri => "xs:anyURI",
            Self::QName => "xs:QName",
        }
    }
}

impl fmt::Display for AtomType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

///
/// SeqType
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct SeqType {
    pub atom: AtomType,
    pub occ: Occ,
}

impl SeqType {
    pub const BOOLEAN_ONE: Self = Self::new(AtomType::Boolean, Occ::ONE);
    pub const EMPTY: Self = Self::new(AtomType::Item, Occ::ZERO);
    pub const ITEM_ZM: Self = Self::new(AtomType::Item, Occ::ZERO_OR_MORE);

    #[must_use]
    pub const fn new(atom: AtomType, occ: Occ) -> Self {
        Self { atom, occ }
    }

    #[must_use]
    pub const fn one(atom: AtomType) -> Self {
        Self::new(atom, Occ::ONE)
    }

    #[must_use]
    pub const fn zero_or_one(atom: AtomType) -> Self {
        Self::new(atom, Occ::ZERO_OR_ONE)
    }

    #[must_use]
    pub const fn is_one(self) -> bool {
        self.occ.is_one()
    }

    #[must_use]
    pub const fn zero_or_one_items(self) -> bool {
        self.occ.max <= 1
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.occ.max == 0
    }

    /// Returns whether `value` is an instance of this type.
    #[must_use]
    pub fn instance(&self, value: &Value) -> bool {
        self.occ.check(value.len())
            && value
                .iter()
                .all(|item| item.atom_type().instance_of(self.atom))
    }

    /// Smallest type covering both `self` and `other`.
    ///
    /// Used to type the result of a node that yields one of several branches.
    #[must_use]
    pub const fn intersect(self, other: Self) -> Self {
        let atom = if self.is_empty() {
            other.atom
        } else if other.is_empty() {
            self.atom
        } else {
            self.atom.union(other.atom)
        };

        Self::new(atom, self.occ.union(other.occ))
    }
}

impl fmt::Display for SeqType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("empty-sequence()");
        }

        write!(f, "{}{}", self.atom, self.occ)
    }
}
