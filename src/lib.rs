#![doc = include_str!("../README.md")]
#![deny(missing_docs)]

use std::fmt;

mod error;
mod parser;
mod time;
/// Lexer: tokens, contexts, and the character classes of the grammar.
mod tokenizer;
mod value;
mod writer;

pub use error::{Error, ErrorKind};
pub use time::{Datetime, DatetimeKind};
pub use value::{Array, Table, Value, is_homogeneous};

/// Callback replacing each parsed date-time with a caller-chosen value.
pub type InflateDatetime = Box<dyn Fn(Datetime) -> Value>;

/// Callback replacing each parsed boolean with a caller-chosen value.
pub type InflateBoolean = Box<dyn Fn(bool) -> Value>;

/// Configuration shared by [`parse`] and [`to_toml`].
///
/// The default is permissive: heterogeneous arrays are accepted and
/// date-times and booleans come through as [`Value::Datetime`] and
/// [`Value::Boolean`].
#[derive(Default)]
pub struct Options {
    /// Require every array to hold elements of one TOML type, at parse
    /// and at write time. All [`DatetimeKind`]s count as distinct types.
    pub strict_arrays: bool,
    /// Invoked for each date-time token; its return value replaces the
    /// default [`Value::Datetime`].
    pub inflate_datetime: Option<InflateDatetime>,
    /// Invoked for each boolean token; its return value replaces the
    /// default [`Value::Boolean`].
    pub inflate_boolean: Option<InflateBoolean>,
}

impl Options {
    /// Creates the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets [`strict_arrays`](Self::strict_arrays).
    pub fn strict_arrays(mut self, strict: bool) -> Self {
        self.strict_arrays = strict;
        self
    }

    /// Sets [`inflate_datetime`](Self::inflate_datetime).
    pub fn inflate_datetime(mut self, inflate: impl Fn(Datetime) -> Value + 'static) -> Self {
        self.inflate_datetime = Some(Box::new(inflate));
        self
    }

    /// Sets [`inflate_boolean`](Self::inflate_boolean).
    pub fn inflate_boolean(mut self, inflate: impl Fn(bool) -> Value + 'static) -> Self {
        self.inflate_boolean = Some(Box::new(inflate));
        self
    }
}

impl fmt::Debug for Options {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Options")
            .field("strict_arrays", &self.strict_arrays)
            .field("inflate_datetime", &self.inflate_datetime.is_some())
            .field("inflate_boolean", &self.inflate_boolean.is_some())
            .finish()
    }
}

/// Parses a TOML document into its root [`Table`].
///
/// On failure the whole document is invalid; no partial tree is returned.
pub fn parse(src: &str, options: &Options) -> Result<Table, Error> {
    parser::parse(src, options)
}

/// Parses a TOML document from raw bytes.
///
/// Fails with [`ErrorKind::InvalidUtf8`] when the input is not valid
/// UTF-8, otherwise behaves like [`parse`].
pub fn parse_bytes(src: &[u8], options: &Options) -> Result<Table, Error> {
    match std::str::from_utf8(src) {
        Ok(s) => parser::parse(s, options),
        Err(e) => {
            let line = 1 + src[..e.valid_up_to()]
                .iter()
                .filter(|b| **b == b'\n')
                .count();
            Err(Error::new(ErrorKind::InvalidUtf8, line))
        }
    }
}

/// Dual-return convenience over [`parse`]: exactly one of the pair is
/// `Some`.
pub fn parse_or_pair(src: &str, options: &Options) -> (Option<Table>, Option<Error>) {
    match parser::parse(src, options) {
        Ok(table) => (Some(table), None),
        Err(err) => (None, Some(err)),
    }
}

/// Serializes a value tree to canonical TOML.
///
/// The root must be a [`Value::Table`]; anything else fails with
/// [`ErrorKind::UnknownValueType`]. Output is byte-deterministic for
/// equal trees.
pub fn to_toml(value: &Value, options: &Options) -> Result<String, Error> {
    writer::encode(value, options)
}

/// Bundles [`Options`] for repeated decode and encode calls.
pub struct Codec {
    options: Options,
}

impl Codec {
    /// Creates a codec from the given options.
    pub fn new(options: Options) -> Self {
        Self { options }
    }

    /// The options this codec applies.
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Decodes a TOML document; see [`parse`].
    pub fn decode(&self, src: &str) -> Result<Table, Error> {
        parser::parse(src, &self.options)
    }

    /// Decodes a TOML document from raw bytes; see [`parse_bytes`].
    pub fn decode_bytes(&self, src: &[u8]) -> Result<Table, Error> {
        parse_bytes(src, &self.options)
    }

    /// Encodes a value tree; see [`to_toml`].
    pub fn encode(&self, value: &Value) -> Result<String, Error> {
        writer::encode(value, &self.options)
    }
}

impl fmt::Debug for Codec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Codec").field("options", &self.options).finish()
    }
}

#[cfg(test)]
#[path = "./codec_tests.rs"]
mod tests;
