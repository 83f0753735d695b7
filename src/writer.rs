//! Serializes a value tree to canonical TOML.
//!
//! Output is deterministic: keys emit in lexicographic order, scalars in a
//! single canonical form each. Within a table all `key = value` lines come
//! first (so nothing re-attaches to a later block), then `[[array]]`
//! blocks, then `[table]` blocks. The table path is threaded through the
//! recursion explicitly.

use crate::Options;
use crate::error::{Error, ErrorKind};
use crate::tokenizer::is_keylike_byte;
use crate::value::{Table, Value, is_homogeneous};

pub(crate) fn encode(value: &Value, options: &Options) -> Result<String, Error> {
    let root = match value {
        Value::Table(t) => t,
        other => {
            return Err(Error::encode(ErrorKind::UnknownValueType(other.type_str())));
        }
    };
    let mut writer = Writer {
        out: String::new(),
        strict: options.strict_arrays,
    };
    let mut path = Vec::new();
    writer.table(root, &mut path)?;
    Ok(writer.out)
}

struct Writer {
    out: String,
    strict: bool,
}

impl Writer {
    fn table(&mut self, table: &Table, path: &mut Vec<String>) -> Result<(), Error> {
        // Line entries: scalars, inline arrays, empty tables.
        for (key, value) in table {
            match value {
                Value::Table(t) if t.is_empty() => {
                    self.key(key);
                    self.out.push_str(" = {}\n");
                }
                Value::Table(..) => {}
                Value::Array(arr) => {
                    if self.strict && !is_homogeneous(arr) {
                        return Err(Error::encode(ErrorKind::HeterogenousArray));
                    }
                    let scalars: Vec<&Value> = arr
                        .iter()
                        .filter(|v| !matches!(v, Value::Table(..)))
                        .collect();
                    if scalars.len() == arr.len() {
                        // No table elements (or empty): one inline array.
                        self.key(key);
                        self.out.push_str(" = ");
                        self.inline_array(arr.iter())?;
                        self.out.push('\n');
                    } else if !scalars.is_empty() {
                        // Mixed array: the non-table slice inline here, the
                        // tables as [[key]] blocks below. Not legal TOML,
                        // but nothing is dropped; strict mode refuses it
                        // above.
                        self.key(key);
                        self.out.push_str(" = ");
                        self.inline_array(scalars.into_iter())?;
                        self.out.push('\n');
                    }
                }
                scalar => {
                    self.key(key);
                    self.out.push_str(" = ");
                    self.scalar(scalar)?;
                    self.out.push('\n');
                }
            }
        }

        // Array-of-tables blocks.
        for (key, value) in table {
            if let Value::Array(arr) = value {
                for element in arr {
                    if let Value::Table(t) = element {
                        path.push(key.clone());
                        self.out.push_str("[[");
                        self.header_path(path);
                        self.out.push_str("]]\n");
                        self.table(t, path)?;
                        path.pop();
                    }
                }
            }
        }

        // Table blocks.
        for (key, value) in table {
            if let Value::Table(t) = value {
                if t.is_empty() {
                    continue;
                }
                path.push(key.clone());
                self.out.push('[');
                self.header_path(path);
                self.out.push_str("]\n");
                self.table(t, path)?;
                path.pop();
            }
        }
        Ok(())
    }

    fn header_path(&mut self, path: &[String]) {
        for (i, key) in path.iter().enumerate() {
            if i > 0 {
                self.out.push('.');
            }
            self.key(key);
        }
    }

    // -- inline emission ----------------------------------------------------

    fn inline_value(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::Array(arr) => {
                if self.strict && !is_homogeneous(arr) {
                    return Err(Error::encode(ErrorKind::HeterogenousArray));
                }
                self.inline_array(arr.iter())
            }
            Value::Table(t) => self.inline_table(t),
            scalar => self.scalar(scalar),
        }
    }

    fn inline_array<'v>(
        &mut self,
        values: impl Iterator<Item = &'v Value>,
    ) -> Result<(), Error> {
        self.out.push('[');
        let mut first = true;
        for value in values {
            if !first {
                self.out.push_str(", ");
            }
            first = false;
            self.inline_value(value)?;
        }
        self.out.push(']');
        Ok(())
    }

    fn inline_table(&mut self, table: &Table) -> Result<(), Error> {
        if table.is_empty() {
            self.out.push_str("{}");
            return Ok(());
        }
        self.out.push_str("{ ");
        let mut first = true;
        for (key, value) in table {
            if !first {
                self.out.push_str(", ");
            }
            first = false;
            self.key(key);
            self.out.push_str(" = ");
            self.inline_value(value)?;
        }
        self.out.push_str(" }");
        Ok(())
    }

    // -- scalars ------------------------------------------------------------

    fn scalar(&mut self, value: &Value) -> Result<(), Error> {
        match value {
            Value::String(s) => self.basic_string(s),
            Value::Integer(i) => self.out.push_str(itoa::Buffer::new().format(*i)),
            Value::Float(f) => self.float(*f),
            Value::Boolean(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Value::Datetime(dt) => self.out.push_str(&dt.normalized()),
            Value::Array(..) | Value::Table(..) => {
                return Err(Error::encode(ErrorKind::UnknownValueType(value.type_str())));
            }
        }
        Ok(())
    }

    fn float(&mut self, f: f64) {
        if f.is_nan() {
            // the sign of nan is not preserved
            self.out.push_str("nan");
        } else if f.is_infinite() {
            self.out
                .push_str(if f.is_sign_positive() { "inf" } else { "-inf" });
        } else {
            self.out.push_str(zmij::Buffer::new().format(f));
        }
    }

    // -- keys and strings ---------------------------------------------------

    fn key(&mut self, key: &str) {
        if !key.is_empty() && key.bytes().all(is_keylike_byte) {
            self.out.push_str(key);
        } else if key.starts_with('"')
            && !key.contains('\'')
            && !key.chars().any(|c| c < '\u{20}' || c == '\u{7f}')
        {
            // keys opening with a double quote go in literal quotes
            self.out.push('\'');
            self.out.push_str(key);
            self.out.push('\'');
        } else {
            self.basic_string(key);
        }
    }

    fn basic_string(&mut self, s: &str) {
        const HEX: &[u8; 16] = b"0123456789ABCDEF";

        self.out.push('"');
        for c in s.chars() {
            match c {
                '"' => self.out.push_str("\\\""),
                '\\' => self.out.push_str("\\\\"),
                '\n' => self.out.push_str("\\n"),
                '\r' => self.out.push_str("\\r"),
                '\t' => self.out.push_str("\\t"),
                '\u{c}' => self.out.push_str("\\f"),
                '\u{8}' => self.out.push_str("\\b"),
                c if c < '\u{20}' => {
                    let v = c as u32;
                    self.out.push_str("\\u00");
                    self.out.push(HEX[(v >> 4) as usize] as char);
                    self.out.push(HEX[(v & 0xf) as usize] as char);
                }
                c => self.out.push(c),
            }
        }
        self.out.push('"');
    }
}

#[cfg(test)]
#[path = "./writer_tests.rs"]
mod tests;
