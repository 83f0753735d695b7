use super::*;

#[test]
fn debug_codes_for_all_kinds() {
    let cases: Vec<(ErrorKind, &str)> = vec![
        (ErrorKind::Unexpected('!'), "unexpected"),
        (
            ErrorKind::Wanted {
                expected: "a value",
                found: "a newline",
            },
            "wanted",
        ),
        (ErrorKind::UnterminatedString, "unterminated-string"),
        (
            ErrorKind::InvalidCharInString('\u{1}'),
            "invalid-char-in-string",
        ),
        (ErrorKind::InvalidEscape('q'), "invalid-escape"),
        (ErrorKind::InvalidHexEscape('g'), "invalid-hex-escape"),
        (ErrorKind::InvalidEscapeValue(0x110000), "invalid-escape-value"),
        (ErrorKind::InvalidUtf8, "invalid-utf8"),
        (ErrorKind::UnquotedString, "unquoted-string"),
        (ErrorKind::MultilineStringKey, "multiline-string-key"),
        (ErrorKind::EmptyKey, "empty-key"),
        (ErrorKind::InvalidNumber, "invalid-number"),
        (ErrorKind::InvalidDateTime, "invalid-datetime"),
        (ErrorKind::DuplicateKey { key: "k".into() }, "duplicate-key"),
        (
            ErrorKind::DuplicateTable { name: "a.b".into() },
            "duplicate-table",
        ),
        (
            ErrorKind::TypeConflict {
                path: "a.b".into(),
                found: "integer",
            },
            "type-conflict",
        ),
        (ErrorKind::ExtendSealed { path: "a".into() }, "extend-sealed"),
        (ErrorKind::HeterogenousArray, "heterogenous-array"),
        (ErrorKind::UnknownValueType("array"), "unknown-value-type"),
    ];
    for (kind, code) in cases {
        assert_eq!(format!("{kind:?}"), code);
    }
}

#[test]
fn display_includes_line() {
    let err = Error::new(ErrorKind::DuplicateKey { key: "name".into() }, 7);
    assert_eq!(err.to_string(), "duplicate key: `name` at line 7");

    let err = Error::encode(ErrorKind::HeterogenousArray);
    assert_eq!(err.to_string(), "array elements must all share one type");
}

#[test]
fn display_escapes_characters() {
    let err = Error::new(ErrorKind::Unexpected('\r'), 1);
    assert_eq!(err.to_string(), "unexpected character found: `\\r` at line 1");

    let err = Error::new(ErrorKind::InvalidEscape('q'), 2);
    assert_eq!(
        err.to_string(),
        "invalid escape character in string: `q` at line 2"
    );
}

#[test]
fn display_wanted() {
    let err = Error::new(
        ErrorKind::Wanted {
            expected: "a right bracket",
            found: "an equals",
        },
        1,
    );
    assert_eq!(err.to_string(), "expected a right bracket, found an equals at line 1");
}

#[test]
fn display_conflicts() {
    let err = Error::new(
        ErrorKind::TypeConflict {
            path: "a.b".into(),
            found: "integer",
        },
        3,
    );
    assert_eq!(
        err.to_string(),
        "cannot redefine `a.b`, already a integer at line 3"
    );

    let err = Error::new(ErrorKind::ExtendSealed { path: "tool".into() }, 9);
    assert_eq!(
        err.to_string(),
        "cannot extend `tool`, it was closed by its definition at line 9"
    );
}
