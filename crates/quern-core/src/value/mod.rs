//! Runtime values: atomic items and the sequences built from them.

mod cast;
mod compare;
mod score;

#[cfg(test)]
mod tests;

use crate::{
    error::EvalError,
    span::Span,
    types::{AtomType, Occ, SeqType},
};
use derive_more::{Deref, IntoIterator};
use std::fmt;

// re-exports
pub use cast::{cast_item, cast_value};
pub use compare::{CompareOp, compare_items, compare_values, equiv};
pub use score::Score;

///
/// Bln
///
/// Boolean item with an attached relevance score.
///

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bln {
    value: bool,
    score: Score,
}

impl Bln {
    pub const TRUE: Self = Self::get(true);
    pub const FALSE: Self = Self::get(false);

    #[must_use]
    pub const fn get(value: bool) -> Self {
        Self {
            value,
            score: Score::ZERO,
        }
    }

    /// A true result carrying `score`. A zero score is plain `true`.
    #[must_use]
    pub const fn scored(score: Score) -> Self {
        Self { value: true, score }
    }

    #[must_use]
    pub const fn value(self) -> bool {
        self.value
    }

    #[must_use]
    pub const fn score(self) -> Score {
        self.score
    }
}

///
/// QName
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    #[must_use]
    pub fn new(prefix: Option<&str>, local: &str) -> Self {
        Self {
            prefix: prefix.map(str::to_string),
            local: local.to_string(),
        }
    }

    /// Parse `prefix:local` or `local`. Both parts must be NCNames.
    #[must_use]
    pub fn parse(text: &str) -> Option<Self> {
        let (prefix, local) = match text.split_once(':') {
            Some((prefix, local)) => (Some(prefix), local),
            None => (None, text),
        };

        if prefix.is_some_and(|p| !is_ncname(p)) || !is_ncname(local) {
            return None;
        }

        Some(Self::new(prefix, local))
    }
}

fn is_ncname(text: &str) -> bool {
    let mut chars = text.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_alphabetic() || first == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{prefix}:{}", self.local),
            None => f.write_str(&self.local),
        }
    }
}

///
/// Item
///

#[derive(Clone, Debug, PartialEq)]
pub enum Item {
    Bool(Bln),
    Integer(i64),
    Float(f32),
    Double(f64),
    String(String),
    Untyped(String),
    AnyUri(String),
    QName(QName),
}

impl Item {
    #[must_use]
    pub const fn bool(value: bool) -> Self {
        Self::Bool(Bln::get(value))
    }

    #[must_use]
    pub fn string(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    #[must_use]
    pub fn untyped(value: impl Into<String>) -> Self {
        Self::Untyped(value.into())
    }

    #[must_use]
    pub const fn atom_type(&self) -> AtomType {
        match self {
            Self::Bool(_) => AtomType::Boolean,
            Self::Integer(_) => AtomType::Integer,
            Self::Float(_) => AtomType::Float,
            Self::Double(_) => AtomType::Double,
            Self::String(_) => AtomType::String,
            Self::Untyped(_) => AtomType::Untyped,
            Self::AnyUri(_) => AtomType::AnyUri,
            Self::QName(_) => AtomType::QName,
        }
    }

    /// Numeric view of a numeric item; `None` for everything else.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            #[expect(clippy::cast_precision_loss)]
            Self::Integer(v) => Some(*v as f64),
            Self::Float(v) => Some(f64::from(*v)),
            Self::Double(v) => Some(*v),
            _ => None,
        }
    }

    /// Effective boolean value of a single item.
    pub fn ebv(&self, span: Span) -> Result<Bln, EvalError> {
        Ok(match self {
            Self::Bool(b) => *b,
            Self::String(s) | Self::Untyped(s) | Self::AnyUri(s) => Bln::get(!s.is_empty()),
            Self::Integer(v) => Bln::get(*v != 0),
            Self::Float(v) => Bln::get(*v != 0.0 && !v.is_nan()),
            Self::Double(v) => Bln::get(*v != 0.0 && !v.is_nan()),
            Self::QName(_) => {
                return Err(EvalError::Ebv {
                    found: self.atom_type().to_string(),
                    span,
                });
            }
        })
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{}", b.value()),
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => write_double(f, f64::from(*v)),
            Self::Double(v) => write_double(f, *v),
            Self::String(s) | Self::Untyped(s) | Self::AnyUri(s) => f.write_str(s),
            Self::QName(q) => write!(f, "{q}"),
        }
    }
}

// Canonical lexical form: integral doubles print without a fraction.
fn write_double(f: &mut fmt::Formatter<'_>, v: f64) -> fmt::Result {
    if v.is_nan() {
        f.write_str("NaN")
    } else if v.is_infinite() {
        f.write_str(if v > 0.0 { "INF" } else { "-INF" })
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        write!(f, "{v:.0}")
    } else {
        write!(f, "{v}")
    }
}

impl From<bool> for Item {
    fn from(value: bool) -> Self {
        Self::bool(value)
    }
}

impl From<i64> for Item {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for Item {
    fn from(value: f64) -> Self {
        Self::Double(value)
    }
}

impl From<&str> for Item {
    fn from(value: &str) -> Self {
        Self::string(value)
    }
}

///
/// Value
///
/// An ordered sequence of items. The empty sequence is `Value::empty()`.
///

#[derive(Clone, Debug, Default, Deref, IntoIterator, PartialEq)]
#[into_iterator(owned, ref)]
pub struct Value(Vec<Item>);

impl Value {
    #[must_use]
    pub const fn empty() -> Self {
        Self(Vec::new())
    }

    #[must_use]
    pub fn bool(value: bool) -> Self {
        Self::from(Item::bool(value))
    }

    #[must_use]
    pub fn into_items(self) -> Vec<Item> {
        self.0
    }

    /// Append all items of `other`.
    #[must_use]
    pub fn concat(mut self, other: Self) -> Self {
        self.0.extend(other.0);
        self
    }

    /// Effective boolean value of the whole sequence.
    pub fn ebv(&self, span: Span) -> Result<Bln, EvalError> {
        match self.0.as_slice() {
            [] => Ok(Bln::FALSE),
            [item] => item.ebv(span),
            _ => Err(EvalError::Ebv {
                found: format!("sequence of {} items", self.0.len()),
                span,
            }),
        }
    }

    /// The single item of a zero-or-one sequence.
    pub fn atomic_item(&self, span: Span) -> Result<Option<&Item>, EvalError> {
        match self.0.as_slice() {
            [] => Ok(None),
            [item] => Ok(Some(item)),
            _ => Err(EvalError::Type {
                expected: "a single item".to_string(),
                found: format!("sequence of {} items", self.0.len()),
                span,
            }),
        }
    }

    /// Exact static type of this value.
    #[must_use]
    pub fn seq_type(&self) -> SeqType {
        let mut items = self.0.iter();
        let Some(first) = items.next() else {
            return SeqType::EMPTY;
        };

        let atom = items.fold(first.atom_type(), |atom, item| {
            atom.union(item.atom_type())
        });
        let occ = if self.0.len() == 1 {
            Occ::ONE
        } else {
            Occ::ONE_OR_MORE
        };

        SeqType::new(atom, occ)
    }
}

impl From<Item> for Value {
    fn from(item: Item) -> Self {
        Self(vec![item])
    }
}

impl From<Vec<Item>> for Value {
    fn from(items: Vec<Item>) -> Self {
        Self(items)
    }
}

impl From<Bln> for Value {
    fn from(value: Bln) -> Self {
        Self::from(Item::Bool(value))
    }
}

impl FromIterator<Item> for Value {
    fn from_iter<I: IntoIterator<Item = Item>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.as_slice() {
            [] => f.write_str("()"),
            [item] => write_literal(f, item),
            items => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write_literal(f, item)?;
                }
                f.write_str(")")
            }
        }
    }
}

// Query-text form of one item: strings quoted, booleans as function calls.
fn write_literal(f: &mut fmt::Formatter<'_>, item: &Item) -> fmt::Result {
    match item {
        Item::Bool(b) => write!(f, "{}()", b.value()),
        Item::String(s) => write!(f, "\"{}\"", s.replace('"', "\"\"")),
        Item::Untyped(s) => write!(f, "xs:untypedAtomic(\"{s}\")"),
        Item::AnyUri(s) => write!(f, "xs:anyURI(\"{s}\")"),
        Item::QName(q) => write!(f, "xs:QName(\"{q}\")"),
        Item::Float(_) => write!(f, "xs:float(\"{item}\")"),
        Item::Integer(_) | Item::Double(_) => write!(f, "{item}"),
    }
}
