use super::*;
use crate::DatetimeKind;

fn dt(s: &str) -> Datetime {
    s.parse().unwrap()
}

#[test]
fn type_str_covers_all_variants() {
    let cases: [(Value, &str); 7] = [
        (Value::from("s"), "string"),
        (Value::from(1), "integer"),
        (Value::from(1.0), "float"),
        (Value::from(true), "boolean"),
        (Value::from(dt("1979-05-27")), "datetime"),
        (Value::Array(Vec::new()), "array"),
        (Value::Table(Table::new()), "table"),
    ];
    for (value, expected) in cases {
        assert_eq!(value.type_str(), expected);
    }
}

#[test]
fn accessors() {
    let v = Value::from("hello");
    assert_eq!(v.as_str(), Some("hello"));
    assert_eq!(v.as_integer(), None);

    let v = Value::from(42);
    assert_eq!(v.as_integer(), Some(42));
    assert_eq!(v.as_float(), None, "integers do not coerce to floats");

    let v = Value::from(2.5);
    assert_eq!(v.as_float(), Some(2.5));

    let v = Value::from(false);
    assert_eq!(v.as_bool(), Some(false));

    let v = Value::from(dt("07:32:00"));
    assert_eq!(v.as_datetime().map(Datetime::kind), Some(DatetimeKind::LocalTime));

    let mut v = Value::Array(vec![Value::from(1)]);
    assert_eq!(v.as_array().map(Vec::len), Some(1));
    v.as_array_mut().unwrap().push(Value::from(2));
    assert_eq!(v.as_array().map(Vec::len), Some(2));

    let mut v = Value::Table(Table::new());
    v.as_table_mut()
        .unwrap()
        .insert("k".to_owned(), Value::from(1));
    assert!(v.as_table().unwrap().contains_key("k"));
}

#[test]
fn equality_is_structural() {
    assert_eq!(Value::from(1), Value::from(1));
    assert_ne!(Value::from(1), Value::from(1.0));
    assert_eq!(
        Value::Array(vec![Value::from(1), Value::from("a")]),
        Value::Array(vec![Value::from(1), Value::from("a")]),
    );

    let mut a = Table::new();
    a.insert("x".to_owned(), Value::from(1));
    let mut b = Table::new();
    b.insert("x".to_owned(), Value::from(1));
    assert_eq!(Value::Table(a), Value::Table(b));
}

#[test]
fn nan_equals_nan() {
    // nan equality is by type tag, not value
    assert_eq!(Value::from(f64::NAN), Value::from(f64::NAN));
    assert_eq!(Value::from(f64::NAN), Value::from(-f64::NAN));
    assert_ne!(Value::from(f64::NAN), Value::from(1.0));
    assert_eq!(Value::from(f64::INFINITY), Value::from(f64::INFINITY));
}

#[test]
fn datetime_equality_normalizes() {
    assert_eq!(
        Value::from(dt("1979-05-27 07:32:00z")),
        Value::from(dt("1979-05-27T07:32:00Z")),
    );
}

#[test]
fn same_type_distinguishes_datetime_kinds() {
    let date = Value::from(dt("1979-05-27"));
    let time = Value::from(dt("07:32:00"));
    let offset = Value::from(dt("1979-05-27T07:32:00Z"));
    let local = Value::from(dt("1979-05-27T07:32:00"));

    assert!(date.same_type(&date));
    assert!(!date.same_type(&time));
    assert!(!offset.same_type(&local));
    assert!(!date.same_type(&Value::from("1979-05-27")));
}

#[test]
fn same_type_tables_and_arrays() {
    let empty = Value::Table(Table::new());
    let mut full = Table::new();
    full.insert("k".to_owned(), Value::from(1));
    // tables are one type regardless of shape
    assert!(empty.same_type(&Value::Table(full)));

    let ints = Value::Array(vec![Value::from(1)]);
    let strs = Value::Array(vec![Value::from("a")]);
    assert!(ints.same_type(&strs));
}

#[test]
fn homogeneity() {
    assert!(is_homogeneous(&[]));
    assert!(is_homogeneous(&[Value::from(1)]));
    assert!(is_homogeneous(&[Value::from(1), Value::from(2)]));
    assert!(!is_homogeneous(&[Value::from(1), Value::from("2")]));
    assert!(!is_homogeneous(&[Value::from(1), Value::from(2.0)]));
    assert!(!is_homogeneous(&[
        Value::from(dt("1979-05-27")),
        Value::from(dt("07:32:00")),
    ]));
    assert!(is_homogeneous(&[
        Value::Array(vec![Value::from(1)]),
        Value::Array(vec![Value::from("a")]),
    ]));
}
