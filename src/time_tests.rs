use super::*;

#[track_caller]
fn scan_ok(input: &str) -> (usize, DatetimeKind) {
    scan(input.as_bytes()).unwrap_or_else(|_| panic!("scan failed for {input:?}"))
}

#[track_caller]
fn scan_full(input: &str, kind: DatetimeKind) {
    let (len, got) = scan_ok(input);
    assert_eq!(len, input.len(), "consumed wrong amount for {input:?}");
    assert_eq!(got, kind, "wrong kind for {input:?}");
}

#[track_caller]
fn expect_err(input: &str) {
    assert!(scan(input.as_bytes()).is_err(), "scan accepted {input:?}");
}

#[test]
fn full_shapes() {
    scan_full("1979-05-27T07:32:00Z", DatetimeKind::OffsetDateTime);
    scan_full("1979-05-27t07:32:00z", DatetimeKind::OffsetDateTime);
    scan_full("1979-05-27T00:32:00-23:00", DatetimeKind::OffsetDateTime);
    scan_full("2000-12-17T00:32:00.5-07:00", DatetimeKind::OffsetDateTime);
    scan_full("1979-05-27 07:32:00+21:20", DatetimeKind::OffsetDateTime);
    scan_full("1979-05-27T07:32:00", DatetimeKind::LocalDateTime);
    scan_full("1979-05-27 07:32:00.999999999", DatetimeKind::LocalDateTime);
    scan_full("1979-05-27", DatetimeKind::LocalDate);
    scan_full("0000-01-01", DatetimeKind::LocalDate);
    scan_full("07:32:00", DatetimeKind::LocalTime);
    scan_full("00:32:00.5", DatetimeKind::LocalTime);
}

#[test]
fn leap_second_and_leap_year() {
    scan_full("1990-12-31T23:59:60Z", DatetimeKind::OffsetDateTime);
    scan_full("2024-02-29", DatetimeKind::LocalDate);
    scan_full("2000-02-29", DatetimeKind::LocalDate);
    expect_err("2023-02-29");
    expect_err("1900-02-29");
}

#[test]
fn out_of_range_fields() {
    expect_err("2021-00-01");
    expect_err("2021-13-01");
    expect_err("2021-01-00");
    expect_err("2021-01-32");
    expect_err("2021-04-31");
    expect_err("2021-01-01T24:00:00");
    expect_err("2021-01-01T00:60:00");
    expect_err("2021-01-01T00:00:61");
    expect_err("2021-01-01T00:00:00+24:00");
    expect_err("2021-01-01T00:00:00+00:60");
}

#[test]
fn malformed_shapes() {
    // seconds are required
    expect_err("07:32");
    expect_err("1979-05-27T07:32");
    // empty fraction
    expect_err("1979-05-27T07:32:00.");
    // a bare time cannot anchor an offset
    expect_err("07:32:00Z");
    expect_err("07:32:00+01:00");
    // truncated
    expect_err("1979-");
    expect_err("1979-05");
    expect_err("1979-05-");
}

#[test]
fn scan_stops_at_delimiters() {
    let (len, kind) = scan_ok("1979-05-27,");
    assert_eq!((len, kind), (10, DatetimeKind::LocalDate));
    let (len, kind) = scan_ok("07:32:00]");
    assert_eq!((len, kind), (8, DatetimeKind::LocalTime));
    // `T` not followed by a time is not part of the date
    expect_err("1979-05-27Tx");
    // a trailing space is a delimiter, not a separator
    let (len, kind) = scan_ok("1979-05-27 x");
    assert_eq!((len, kind), (10, DatetimeKind::LocalDate));
}

#[test]
fn shape_gate() {
    assert!(looks_like_datetime(b"1979-05-27"));
    assert!(looks_like_datetime(b"07:32:00"));
    assert!(!looks_like_datetime(b"1979"));
    assert!(!looks_like_datetime(b"123-4"));
    assert!(!looks_like_datetime(b"7:32"));
    assert!(!looks_like_datetime(b"inf"));
}

#[test]
fn equality_is_normalized() {
    let a: Datetime = "1979-05-27T07:32:00Z".parse().unwrap();
    let b: Datetime = "1979-05-27 07:32:00z".parse().unwrap();
    let c: Datetime = "1979-05-27t07:32:00Z".parse().unwrap();
    assert_eq!(a, b);
    assert_eq!(a, c);

    let d: Datetime = "1979-05-27T07:32:00".parse().unwrap();
    assert_ne!(a, d, "offset and local date-times differ");
    assert_eq!(d.kind(), DatetimeKind::LocalDateTime);
}

#[test]
fn normalized_form() {
    let dt: Datetime = "1979-05-27 07:32:00z".parse().unwrap();
    assert_eq!(dt.normalized(), "1979-05-27T07:32:00Z");
    assert_eq!(dt.to_string(), "1979-05-27T07:32:00Z");
    // the original text is kept
    assert_eq!(dt.as_str(), "1979-05-27 07:32:00z");
}

#[test]
fn from_str_rejects_partial_matches() {
    assert!("1979-05-27T07:32:00Z".parse::<Datetime>().is_ok());
    assert!("1979-05-27 then some".parse::<Datetime>().is_err());
    assert!("not a date".parse::<Datetime>().is_err());
    assert!("2021-13-01".parse::<Datetime>().is_err());
}
