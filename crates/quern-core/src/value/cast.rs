use crate::{
    error::{CastError, EvalError},
    span::Span,
    types::{AtomType, SeqType},
    value::{Item, QName, Value},
};

/// Cast a value to `target`, enforcing its cardinality.
pub fn cast_value(value: &Value, target: SeqType, span: Span) -> Result<Value, EvalError> {
    match value.atomic_item(span)? {
        None if target.occ.min == 0 => Ok(Value::empty()),
        None => Err(CastError::EmptySequence { to: target.atom }.into()),
        Some(item) => Ok(Value::from(cast_item(item, target.atom)?)),
    }
}

/// Convert one item to the atomic type `to`.
pub fn cast_item(item: &Item, to: AtomType) -> Result<Item, CastError> {
    let unsupported = || CastError::Unsupported {
        from: item.atom_type(),
        to,
    };

    match to {
        AtomType::String => Ok(Item::String(item.to_string())),
        AtomType::Untyped => Ok(Item::Untyped(item.to_string())),
        AtomType::Boolean => to_boolean(item).ok_or_else(unsupported)?,
        AtomType::Integer => to_integer(item).ok_or_else(unsupported)?,
        AtomType::Double => to_double(item)
            .ok_or_else(unsupported)?
            .map(Item::Double),
        #[expect(clippy::cast_possible_truncation)]
        AtomType::Float => to_double(item)
            .ok_or_else(unsupported)?
            .map(|v| Item::Float(v as f32)),
        AtomType::AnyUri => match item {
            Item::String(s) | Item::Untyped(s) | Item::AnyUri(s) => {
                Ok(Item::AnyUri(s.trim().to_string()))
            }
            _ => Err(unsupported()),
        },
        AtomType::QName => match item {
            Item::QName(q) => Ok(Item::QName(q.clone())),
            Item::String(s) | Item::Untyped(s) => QName::parse(s.trim())
                .map(Item::QName)
                .ok_or_else(|| invalid(s, to)),
            _ => Err(unsupported()),
        },
        AtomType::Item | AtomType::AnyAtomic | AtomType::Numeric => Err(unsupported()),
    }
}

fn invalid(value: &str, to: AtomType) -> CastError {
    CastError::InvalidLexical {
        value: value.to_string(),
        to,
    }
}

// Each helper returns `None` when the source type has no conversion at all.

fn to_boolean(item: &Item) -> Option<Result<Item, CastError>> {
    let value = match item {
        Item::Bool(b) => b.value(),
        Item::String(s) | Item::Untyped(s) => match s.trim() {
            "true" | "1" => true,
            "false" | "0" => false,
            _ => return Some(Err(invalid(s, AtomType::Boolean))),
        },
        Item::Integer(_) | Item::Float(_) | Item::Double(_) => {
            let v = item.as_f64()?;
            v != 0.0 && !v.is_nan()
        }
        Item::AnyUri(_) | Item::QName(_) => return None,
    };

    Some(Ok(Item::bool(value)))
}

fn to_integer(item: &Item) -> Option<Result<Item, CastError>> {
    let value = match item {
        Item::Integer(v) => Ok(*v),
        Item::Bool(b) => Ok(i64::from(b.value())),
        #[expect(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        Item::Float(_) | Item::Double(_) => {
            let v = item.as_f64()?.trunc();

            if v.is_finite() && v >= i64::MIN as f64 && v < i64::MAX as f64 {
                Ok(v as i64)
            } else {
                Err(CastError::OutOfRange {
                    value: item.to_string(),
                    to: AtomType::Integer,
                })
            }
        }
        Item::String(s) | Item::Untyped(s) => {
            let text = s.trim();
            text.strip_prefix('+')
                .unwrap_or(text)
                .parse::<i64>()
                .map_err(|_| invalid(s, AtomType::Integer))
        }
        Item::AnyUri(_) | Item::QName(_) => return None,
    };

    Some(value.map(Item::Integer))
}

fn to_double(item: &Item) -> Option<Result<f64, CastError>> {
    match item {
        Item::Integer(_) | Item::Float(_) | Item::Double(_) => item.as_f64().map(Ok),
        Item::Bool(b) => Some(Ok(if b.value() { 1.0 } else { 0.0 })),
        Item::String(s) | Item::Untyped(s) => Some(parse_double(s)),
        Item::AnyUri(_) | Item::QName(_) => None,
    }
}

// Only the xs:double lexical space: Rust's `inf`/`infinity`/`nan` are rejected.
fn parse_double(text: &str) -> Result<f64, CastError> {
    let trimmed = text.trim();

    match trimmed {
        "INF" | "+INF" => return Ok(f64::INFINITY),
        "-INF" => return Ok(f64::NEG_INFINITY),
        "NaN" => return Ok(f64::NAN),
        _ => {}
    }

    let lexical = !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '.' | 'e' | 'E'));

    lexical
        .then(|| trimmed.parse::<f64>().ok())
        .flatten()
        .ok_or_else(|| invalid(text, AtomType::Double))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_to_integer() {
        assert_eq!(
            cast_item(&Item::string(" 42 "), AtomType::Integer),
            Ok(Item::Integer(42))
        );
        assert_eq!(
            cast_item(&Item::string("+7"), AtomType::Integer),
            Ok(Item::Integer(7))
        );
        assert!(matches!(
            cast_item(&Item::string("abc"), AtomType::Integer),
            Err(CastError::InvalidLexical { .. })
        ));
    }

    #[test]
    fn string_to_double_rejects_rust_only_spellings() {
        assert_eq!(
            cast_item(&Item::untyped("1.5e1"), AtomType::Double),
            Ok(Item::Double(15.0))
        );
        assert_eq!(
            cast_item(&Item::untyped("-INF"), AtomType::Double),
            Ok(Item::Double(f64::NEG_INFINITY))
        );
        assert!(cast_item(&Item::untyped("inf"), AtomType::Double).is_err());
        assert!(cast_item(&Item::untyped("nan"), AtomType::Double).is_err());
        assert!(cast_item(&Item::untyped("abc"), AtomType::Double).is_err());
    }

    #[test]
    fn double_to_integer_truncates_or_overflows() {
        assert_eq!(
            cast_item(&Item::Double(-3.9), AtomType::Integer),
            Ok(Item::Integer(-3))
        );
        assert!(matches!(
            cast_item(&Item::Double(f64::NAN), AtomType::Integer),
            Err(CastError::OutOfRange { .. })
        ));
        assert!(matches!(
            cast_item(&Item::Double(1e300), AtomType::Integer),
            Err(CastError::OutOfRange { .. })
        ));
    }

    #[test]
    fn boolean_rules() {
        assert_eq!(
            cast_item(&Item::Integer(0), AtomType::Boolean),
            Ok(Item::bool(false))
        );
        assert_eq!(
            cast_item(&Item::string("1"), AtomType::Boolean),
            Ok(Item::bool(true))
        );
        assert!(matches!(
            cast_item(&Item::AnyUri("x".into()), AtomType::Boolean),
            Err(CastError::Unsupported { .. })
        ));
    }

    #[test]
    fn qname_from_string() {
        assert_eq!(
            cast_item(&Item::string("a:b"), AtomType::QName),
            Ok(Item::QName(QName::new(Some("a"), "b")))
        );
        assert!(cast_item(&Item::string("1a"), AtomType::QName).is_err());
    }

    #[test]
    fn value_cardinality() {
        let target = SeqType::one(AtomType::Integer);

        assert!(matches!(
            cast_value(&Value::empty(), target, Span::UNKNOWN),
            Err(EvalError::Cast(CastError::EmptySequence { .. }))
        ));
        assert_eq!(
            cast_value(
                &Value::empty(),
                SeqType::zero_or_one(AtomType::Integer),
                Span::UNKNOWN
            ),
            Ok(Value::empty())
        );

        let two = Value::from(vec![Item::Integer(1), Item::Integer(2)]);
        assert!(matches!(
            cast_value(&two, target, Span::UNKNOWN),
            Err(EvalError::Type { .. })
        ));
    }
}
