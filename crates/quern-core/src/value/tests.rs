use super::*;

#[test]
fn ebv_rules() {
    let span = Span::UNKNOWN;

    assert_eq!(Value::empty().ebv(span), Ok(Bln::FALSE));
    assert_eq!(Value::from(Item::string("")).ebv(span), Ok(Bln::FALSE));
    assert_eq!(Value::from(Item::string("x")).ebv(span), Ok(Bln::TRUE));
    assert_eq!(Value::from(Item::Integer(0)).ebv(span), Ok(Bln::FALSE));
    assert_eq!(Value::from(Item::Double(f64::NAN)).ebv(span), Ok(Bln::FALSE));
    assert_eq!(Value::from(Item::Float(2.5)).ebv(span), Ok(Bln::TRUE));
}

#[test]
fn ebv_keeps_boolean_score() {
    let scored = Bln::scored(Score::new(0.4).unwrap());

    assert_eq!(Value::from(scored).ebv(Span::UNKNOWN), Ok(scored));
}

#[test]
fn ebv_rejects_qnames_and_long_sequences() {
    let qname = Value::from(Item::QName(QName::new(None, "a")));
    let pair = Value::from(vec![Item::Integer(1), Item::Integer(2)]);

    assert!(matches!(
        qname.ebv(Span::UNKNOWN),
        Err(EvalError::Ebv { .. })
    ));
    assert!(matches!(pair.ebv(Span::UNKNOWN), Err(EvalError::Ebv { .. })));
}

#[test]
fn seq_type_of_values() {
    assert_eq!(Value::empty().seq_type(), SeqType::EMPTY);
    assert_eq!(Value::bool(true).seq_type(), SeqType::BOOLEAN_ONE);
    assert_eq!(
        Value::from(vec![Item::Integer(1), Item::Double(2.0)]).seq_type(),
        SeqType::new(AtomType::Numeric, Occ::ONE_OR_MORE)
    );
}

#[test]
fn display_as_query_text() {
    assert_eq!(Value::empty().to_string(), "()");
    assert_eq!(Value::bool(false).to_string(), "false()");
    assert_eq!(Value::from(Item::string("a\"b")).to_string(), "\"a\"\"b\"");
    assert_eq!(
        Value::from(vec![Item::Integer(1), Item::Double(2.0)]).to_string(),
        "(1, 2)"
    );
    assert_eq!(Item::Double(0.5).to_string(), "0.5");
    assert_eq!(Item::Double(f64::INFINITY).to_string(), "INF");
}

#[test]
fn qname_parsing() {
    assert_eq!(QName::parse("a:b"), Some(QName::new(Some("a"), "b")));
    assert_eq!(QName::parse("local"), Some(QName::new(None, "local")));
    assert_eq!(QName::parse(":b"), None);
    assert_eq!(QName::parse("a:b:c"), None);
    assert_eq!(QName::parse("1x"), None);
}
