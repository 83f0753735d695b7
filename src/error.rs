use std::fmt::{self, Debug, Display};

/// Error that can occur when decoding or encoding TOML.
#[derive(Clone, PartialEq)]
pub struct Error {
    /// The error kind.
    pub kind: ErrorKind,
    /// 1-based line number of the offending input. `None` for errors
    /// raised by the writer, which has no source document.
    pub line: Option<usize>,
}

impl Error {
    #[inline]
    pub(crate) fn new(kind: ErrorKind, line: usize) -> Self {
        Self {
            kind,
            line: Some(line),
        }
    }

    #[inline]
    pub(crate) fn encode(kind: ErrorKind) -> Self {
        Self { kind, line: None }
    }
}

impl std::error::Error for Error {}

/// The different kinds of decode and encode failures.
#[derive(Clone, PartialEq)]
pub enum ErrorKind {
    /// An unexpected character was encountered, typically when looking for
    /// the start of a token.
    Unexpected(char),

    /// Wanted one sort of token, but found another.
    Wanted {
        /// Expected token type.
        expected: &'static str,
        /// Actually found token type.
        found: &'static str,
    },

    /// EOF was reached inside a string before the closing delimiter.
    UnterminatedString,

    /// An invalid character was found in a string.
    InvalidCharInString(char),

    /// An invalid character was found as an escape.
    InvalidEscape(char),

    /// An invalid character was found in a hex escape.
    InvalidHexEscape(char),

    /// A hex escape named a value outside the plane of Unicode codepoints.
    InvalidEscapeValue(u32),

    /// The input was not valid UTF-8.
    InvalidUtf8,

    /// A bare value was found where a quoted string was required.
    UnquotedString,

    /// Multiline strings are not allowed for keys.
    MultilineStringKey,

    /// A quoted key with no characters.
    EmptyKey,

    /// A number failed to parse: leading zero, misplaced underscore,
    /// out of range of `i64`.
    InvalidNumber,

    /// A date-time had the right shape but an out-of-range or missing field.
    InvalidDateTime,

    /// Duplicate key in a table.
    DuplicateKey {
        /// The duplicate key.
        key: String,
    },

    /// A `[table]` header repeated an already explicitly defined table.
    DuplicateTable {
        /// The dotted name of the duplicate table.
        name: String,
    },

    /// A key or header addressed an existing value of an incompatible type,
    /// e.g. mixing `[a]` with `[[a]]` or descending through a scalar.
    TypeConflict {
        /// The dotted path of the conflicting value.
        path: String,
        /// Type of the value already present.
        found: &'static str,
    },

    /// Attempt to extend a closed inline table or a static array.
    ExtendSealed {
        /// The dotted path of the sealed value.
        path: String,
    },

    /// An array mixed element types while strict arrays were requested.
    HeterogenousArray,

    /// The writer was handed a value it cannot serialize in this position.
    UnknownValueType(&'static str),
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::Unexpected(..) => "unexpected",
            Self::Wanted { .. } => "wanted",
            Self::UnterminatedString => "unterminated-string",
            Self::InvalidCharInString(..) => "invalid-char-in-string",
            Self::InvalidEscape(..) => "invalid-escape",
            Self::InvalidHexEscape(..) => "invalid-hex-escape",
            Self::InvalidEscapeValue(..) => "invalid-escape-value",
            Self::InvalidUtf8 => "invalid-utf8",
            Self::UnquotedString => "unquoted-string",
            Self::MultilineStringKey => "multiline-string-key",
            Self::EmptyKey => "empty-key",
            Self::InvalidNumber => "invalid-number",
            Self::InvalidDateTime => "invalid-datetime",
            Self::DuplicateKey { .. } => "duplicate-key",
            Self::DuplicateTable { .. } => "duplicate-table",
            Self::TypeConflict { .. } => "type-conflict",
            Self::ExtendSealed { .. } => "extend-sealed",
            Self::HeterogenousArray => "heterogenous-array",
            Self::UnknownValueType(..) => "unknown-value-type",
        };
        f.write_str(text)
    }
}

impl Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

struct Escape(char);

impl Display for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        if self.0.is_whitespace() || self.0.is_control() {
            for esc in self.0.escape_default() {
                f.write_char(esc)?;
            }
            Ok(())
        } else {
            f.write_char(self.0)
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::Unexpected(c) => {
                write!(f, "unexpected character found: `{}`", Escape(*c))?;
            }
            ErrorKind::Wanted { expected, found } => {
                write!(f, "expected {expected}, found {found}")?;
            }
            ErrorKind::UnterminatedString => f.write_str("unterminated string")?,
            ErrorKind::InvalidCharInString(c) => {
                write!(f, "invalid character in string: `{}`", Escape(*c))?;
            }
            ErrorKind::InvalidEscape(c) => {
                write!(f, "invalid escape character in string: `{}`", Escape(*c))?;
            }
            ErrorKind::InvalidHexEscape(c) => {
                write!(f, "invalid hex escape character in string: `{}`", Escape(*c))?;
            }
            ErrorKind::InvalidEscapeValue(v) => {
                write!(f, "invalid escape value: `{v}`")?;
            }
            ErrorKind::InvalidUtf8 => f.write_str("input is not valid UTF-8")?,
            ErrorKind::UnquotedString => {
                f.write_str("invalid TOML value, did you mean to use a quoted string?")?;
            }
            ErrorKind::MultilineStringKey => {
                f.write_str("multiline strings are not allowed for key")?;
            }
            ErrorKind::EmptyKey => f.write_str("keys cannot be empty")?,
            ErrorKind::InvalidNumber => f.write_str("invalid number")?,
            ErrorKind::InvalidDateTime => f.write_str("invalid date-time")?,
            ErrorKind::DuplicateKey { key } => {
                write!(f, "duplicate key: `{key}`")?;
            }
            ErrorKind::DuplicateTable { name } => {
                write!(f, "redefinition of table `{name}`")?;
            }
            ErrorKind::TypeConflict { path, found } => {
                write!(f, "cannot redefine `{path}`, already a {found}")?;
            }
            ErrorKind::ExtendSealed { path } => {
                write!(f, "cannot extend `{path}`, it was closed by its definition")?;
            }
            ErrorKind::HeterogenousArray => {
                f.write_str("array elements must all share one type")?;
            }
            ErrorKind::UnknownValueType(found) => {
                write!(f, "cannot serialize a {found} in this position")?;
            }
        }
        if let Some(line) = self.line {
            write!(f, " at line {line}")?;
        }
        Ok(())
    }
}

impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Error")
            .field("kind", &self.kind)
            .field("line", &self.line)
            .finish()
    }
}

#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;
