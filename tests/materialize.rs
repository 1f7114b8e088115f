use bigdecimal::BigDecimal;
use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use pretty_assertions::assert_eq;
use rowcast::prelude::*;
use std::str::FromStr;

fn utc() -> TemporalDecoder {
    TemporalDecoder::new(Zone::UTC, None)
}

fn single(tag: TypeTag, cell: Option<&str>, decoder: &TemporalDecoder) -> CastResult<Value> {
    let mut cursor = MemoryCursor::new(["v"], [tag]).row([cell]);
    let mut rows = materialize(&mut cursor, decoder)?;
    let mut record = rows.next().expect("one row")?;
    Ok(record.take("v").unwrap_or_default())
}

#[test]
fn test_boolean_bytes() {
    assert_eq!(single(TypeTag::Boolean, Some("1"), &utc()).unwrap(), Value::Bool(true));
    assert_eq!(single(TypeTag::Boolean, Some("0"), &utc()).unwrap(), Value::Bool(false));
    assert_eq!(single(TypeTag::Boolean, Some("t"), &utc()).unwrap(), Value::Bool(true));
    assert_eq!(single(TypeTag::Boolean, Some("f"), &utc()).unwrap(), Value::Bool(false));
    assert_eq!(single(TypeTag::Boolean, None, &utc()).unwrap(), Value::Null);
}

#[test]
fn test_scalar_columns() {
    let mut cursor = MemoryCursor::new(
        ["id", "ratio", "price", "payload", "note", "at"],
        [
            TypeTag::Integer,
            TypeTag::Float,
            TypeTag::Numeric,
            TypeTag::Blob,
            TypeTag::Text,
            TypeTag::Time,
        ],
    )
    .row([
        Some(&b"-42"[..]),
        Some(&b"0.5"[..]),
        Some(&b"19.990"[..]),
        Some(&[0u8, 159, 146, 150][..]),
        Some("caf\u{e9}".as_bytes()),
        Some(&b"14:30:00"[..]),
    ]);

    let records: Vec<Record> = materialize(&mut cursor, &utc())
        .unwrap()
        .collect::<CastResult<_>>()
        .unwrap();
    let record = &records[0];

    assert_eq!(record.get_i64("id"), Some(-42));
    assert_eq!(record.get_f64("ratio"), Some(0.5));
    assert_eq!(record.get_decimal("price"), Some(&BigDecimal::from_str("19.990").unwrap()));
    assert_eq!(record.get_bytes("payload"), Some(&[0u8, 159, 146, 150][..]));
    assert_eq!(record.get_str("note"), Some("café"));
    assert_eq!(record.get_str("at"), Some("14:30:00"));
}

#[test]
fn test_numeric_keeps_precision() {
    let value = single(TypeTag::Numeric, Some("0.1000000000000000055511151231"), &utc()).unwrap();
    assert_eq!(
        value.as_decimal().map(|d| d.to_string()),
        Some("0.1000000000000000055511151231".to_string())
    );
}

#[test]
fn test_numeric_wider_than_fixed_precision() {
    let wide = single(TypeTag::Numeric, Some("123456789012345678901234567890"), &utc()).unwrap();
    assert_eq!(
        wide.as_decimal(),
        Some(&BigDecimal::from_str("123456789012345678901234567890").unwrap())
    );

    let fraction = "0.1234567890123456789012345678901234";
    let long = single(TypeTag::Numeric, Some(fraction), &utc()).unwrap();
    let (digits, scale) = long.as_decimal().unwrap().as_bigint_and_exponent();
    assert_eq!(digits.to_string(), "1234567890123456789012345678901234");
    assert_eq!(scale, 34);

    let big = single(TypeTag::Numeric, Some("1e40"), &utc()).unwrap();
    let expanded = BigDecimal::from_str(&format!("1{}", "0".repeat(40))).unwrap();
    assert_eq!(big.as_decimal(), Some(&expanded));
}

#[test]
fn test_numeric_special_values() {
    assert_eq!(
        single(TypeTag::Numeric, Some("NaN"), &utc()).unwrap(),
        Value::Numeric(Numeric::NaN)
    );
    assert_eq!(
        single(TypeTag::Numeric, Some("-Infinity"), &utc()).unwrap(),
        Value::Numeric(Numeric::NegInfinity)
    );
}

#[test]
fn test_invalid_payloads_are_decode_errors() {
    for (tag, cell) in [
        (TypeTag::Integer, "12abc"),
        (TypeTag::Float, "one half"),
        (TypeTag::Numeric, "1.2.3"),
    ] {
        let err = single(tag, Some(cell), &utc()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Decode, "{} {:?}", tag, cell);
    }
}

#[test]
fn test_timestamp_without_context_uses_client_zone() {
    let value = single(TypeTag::Timestamp, Some("2012-06-15 14:30:00"), &utc()).unwrap();
    assert_eq!(
        value,
        Value::Timestamp(Utc.with_ymd_and_hms(2012, 6, 15, 14, 30, 0).unwrap())
    );
}

#[test]
fn test_explicit_suffix_wins() {
    let expected = Value::Timestamp(Utc.with_ymd_and_hms(2012, 6, 15, 12, 30, 0).unwrap());
    for decoder in [
        utc(),
        TemporalDecoder::new(Zone::Fixed(-5 * 3600), None),
        TemporalDecoder::new(Zone::UTC, Some(Zone::Named(Tz::Asia__Tokyo))),
    ] {
        let value = single(TypeTag::Timestamp, Some("2012-06-15 14:30:00+02:00"), &decoder).unwrap();
        assert_eq!(value, expected);
    }
}

#[test]
fn test_named_session_zone_follows_dst() {
    let decoder = TemporalDecoder::new(Zone::UTC, Some(Zone::parse_context("America/New_York")));

    let summer = single(TypeTag::Timestamp, Some("2012-07-01 12:00:00"), &decoder).unwrap();
    let winter = single(TypeTag::Timestamp, Some("2012-01-15 12:00:00"), &decoder).unwrap();
    let repeated = single(TypeTag::Timestamp, Some("2012-11-04 01:30:00"), &decoder).unwrap();

    assert_eq!(summer.as_timestamp(), Utc.with_ymd_and_hms(2012, 7, 1, 16, 0, 0).single());
    assert_eq!(winter.as_timestamp(), Utc.with_ymd_and_hms(2012, 1, 15, 17, 0, 0).single());
    assert_eq!(repeated.as_timestamp(), Utc.with_ymd_and_hms(2012, 11, 4, 5, 30, 0).single());
}

#[test]
fn test_fraction_is_kept_to_the_microsecond() {
    let value = single(TypeTag::Timestamp, Some("2012-06-15 14:30:00.1234567"), &utc()).unwrap();
    let instant = value.as_timestamp().unwrap();
    assert_eq!(instant.timestamp_subsec_micros(), 123456);
}

#[test]
fn test_day_zero_falls_back_to_text() {
    let value = single(TypeTag::Timestamp, Some("2012-06-00 10:00:00"), &utc()).unwrap();
    assert_eq!(value, Value::Text("2012-06-00 10:00:00".to_string()));

    let value = single(TypeTag::Date, Some("not a date"), &utc()).unwrap();
    assert_eq!(value, Value::Text("not a date".to_string()));
}

#[test]
fn test_date_is_taken_in_client_zone() {
    let decoder = TemporalDecoder::new(Zone::Named(Tz::Asia__Tokyo), Some(Zone::UTC));
    let value = single(TypeTag::Date, Some("2012-06-15 23:30:00"), &decoder).unwrap();
    assert_eq!(value, Value::Date(NaiveDate::from_ymd_opt(2012, 6, 16).unwrap()));

    let value = single(TypeTag::Date, Some("2012-06-15"), &utc()).unwrap();
    assert_eq!(value, Value::Date(NaiveDate::from_ymd_opt(2012, 6, 15).unwrap()));
}

#[test]
fn test_every_row_has_every_column() {
    let mut cursor = MemoryCursor::new(["a", "b"], [TypeTag::Integer, TypeTag::Text]);
    for i in 0..25 {
        let n = i.to_string();
        cursor.push_row([Some(n.as_str()), if i % 3 == 0 { None } else { Some("x") }]);
    }

    let records: Vec<Record> = materialize(&mut cursor, &utc())
        .unwrap()
        .collect::<CastResult<_>>()
        .unwrap();

    assert_eq!(records.len(), 25);
    for (i, record) in records.iter().enumerate() {
        assert_eq!(record.len(), 2);
        assert_eq!(record.get_i64("a"), Some(i as i64));
        assert_eq!(record.is_null("b"), i % 3 == 0);
    }
}

#[test]
fn test_load_with_from_record() {
    #[derive(Debug, PartialEq)]
    struct Order {
        id: i64,
        total: BigDecimal,
    }

    impl FromRecord for Order {
        fn from_record(record: Record) -> CastResult<Self> {
            Ok(Order {
                id: record.get_i64("id").unwrap_or_default(),
                total: record.get_decimal("total").cloned().unwrap_or_default(),
            })
        }
    }

    let mut cursor = MemoryCursor::from_json(
        r#"{
            "fields": ["id", "total"],
            "types": ["int8", "numeric"],
            "rows": [["1", "10.50"], ["2", "3"]]
        }"#,
    )
    .unwrap();

    let mut results = ResultSet::new(&mut cursor, utc());
    let orders: Vec<Order> = results.load().unwrap();
    assert_eq!(
        orders,
        vec![
            Order { id: 1, total: BigDecimal::from_str("10.50").unwrap() },
            Order { id: 2, total: BigDecimal::from_str("3").unwrap() },
        ]
    );
    assert_eq!(results.field_types(), vec!["integer", "numeric"]);

    // A second load starts from row 0 again.
    assert_eq!(results.load::<Order>().unwrap().len(), 2);
}

#[test]
fn test_records_serialize_to_json() {
    let mut cursor = MemoryCursor::new(
        ["id", "price", "payload", "created"],
        [TypeTag::Integer, TypeTag::Numeric, TypeTag::Blob, TypeTag::Timestamp],
    )
    .row([Some("1"), Some("9.99"), Some("hi"), Some("2012-06-15 14:30:00.25")]);

    let records: Vec<Record> = materialize(&mut cursor, &utc())
        .unwrap()
        .collect::<CastResult<_>>()
        .unwrap();

    assert_eq!(
        serde_json::to_value(&records).unwrap(),
        serde_json::json!([{
            "id": 1,
            "price": "9.99",
            "payload": "aGk=",
            "created": "2012-06-15T14:30:00.250Z"
        }])
    );
}
