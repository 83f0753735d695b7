//! Lexer for TOML documents.
//!
//! The parser drives [`Tokenizer::next_token`] and supplies a [`Ctx`]
//! because TOML cannot be tokenized context-free: `1979-05-27` is a bare
//! key on the left of an `=` and a date on the right. String decoding is
//! final here; the parser never sees quotes or escapes.

use crate::error::{Error, ErrorKind};
use crate::time::{self, Datetime};

/// Whether the parser is currently expecting a key or a value.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Ctx {
    Key,
    Value,
}

/// A single lexical token. Strings arrive fully decoded, numbers fully
/// parsed, and date-times validated.
#[derive(Debug)]
pub(crate) enum Token {
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Dot,
    Eq,
    Newline,
    Eof,
    /// A bare key (only produced in [`Ctx::Key`]).
    Key(String),
    /// A basic or literal string, with its multiline flag so the parser
    /// can reject multiline strings in key position.
    Str { value: String, multiline: bool },
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
}

impl Token {
    /// Describes the token for `expected X, found Y` error messages.
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Token::LBracket => "a left bracket",
            Token::RBracket => "a right bracket",
            Token::LBrace => "a left brace",
            Token::RBrace => "a right brace",
            Token::Comma => "a comma",
            Token::Dot => "a period",
            Token::Eq => "an equals",
            Token::Newline => "a newline",
            Token::Eof => "eof",
            Token::Key(..) => "an identifier",
            Token::Str { .. } => "a string",
            Token::Integer(..) => "an integer",
            Token::Float(..) => "a float",
            Token::Boolean(..) => "a boolean",
            Token::Datetime(..) => "a date-time",
        }
    }
}

pub(crate) struct Tokenizer<'a> {
    src: &'a str,
    bytes: &'a [u8],
    cursor: usize,
    /// 1-based, maintained solely for error messages.
    line: usize,
}

impl<'a> Tokenizer<'a> {
    pub(crate) fn new(src: &'a str) -> Self {
        let mut t = Tokenizer {
            src,
            bytes: src.as_bytes(),
            cursor: 0,
            line: 1,
        };
        // Eat UTF-8 BOM
        if t.bytes.starts_with(b"\xef\xbb\xbf") {
            t.cursor = 3;
        }
        t
    }

    /// The 1-based line number at the current cursor.
    #[inline]
    pub(crate) fn line(&self) -> usize {
        self.line
    }

    // -- cursor operations --------------------------------------------------

    #[inline]
    fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.cursor).copied()
    }

    #[inline]
    fn peek_byte_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.cursor + offset).copied()
    }

    /// Advances one byte. Newlines must instead go through
    /// [`eat_newline`](Self::eat_newline) or [`next_char`](Self::next_char)
    /// so the line counter stays accurate.
    #[inline]
    fn advance(&mut self) {
        self.cursor += 1;
    }

    #[inline]
    fn eat_byte(&mut self, b: u8) -> bool {
        if self.peek_byte() == Some(b) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consumes an LF or CRLF and bumps the line counter.
    fn eat_newline(&mut self) -> bool {
        match self.peek_byte() {
            Some(b'\n') => {
                self.cursor += 1;
                self.line += 1;
                true
            }
            Some(b'\r') if self.peek_byte_at(1) == Some(b'\n') => {
                self.cursor += 2;
                self.line += 1;
                true
            }
            _ => false,
        }
    }

    /// Reads the next character, folding CRLF into a single `'\n'`.
    fn next_char(&mut self) -> Option<(usize, char)> {
        let i = self.cursor;
        let b = *self.bytes.get(i)?;

        if b == b'\r' && self.bytes.get(i + 1) == Some(&b'\n') {
            self.cursor = i + 2;
            self.line += 1;
            return Some((i, '\n'));
        }
        if b == b'\n' {
            self.cursor = i + 1;
            self.line += 1;
            return Some((i, '\n'));
        }
        if b < 0x80 {
            self.cursor = i + 1;
            return Some((i, b as char));
        }
        let ch = self.src[i..].chars().next()?;
        self.cursor = i + ch.len_utf8();
        Some((i, ch))
    }

    /// Peeks one character without consuming, with CRLF folding.
    fn peek_char(&self) -> Option<(usize, char)> {
        let i = self.cursor;
        let b = *self.bytes.get(i)?;

        if b == b'\r' && self.bytes.get(i + 1) == Some(&b'\n') {
            return Some((i, '\n'));
        }
        if b < 0x80 {
            return Some((i, b as char));
        }
        Some((i, self.src[i..].chars().next()?))
    }

    fn eat_whitespace(&mut self) {
        while let Some(b) = self.peek_byte() {
            if b == b' ' || b == b'\t' {
                self.advance();
            } else {
                break;
            }
        }
    }

    /// Consumes `# ...` up to (not including) the line ending, so the
    /// newline still becomes a [`Token::Newline`]. Comments are never
    /// tokens themselves.
    fn eat_comment(&mut self) {
        if !self.eat_byte(b'#') {
            return;
        }
        loop {
            match self.peek_char() {
                Some((_, ch)) if ch == '\t' || (ch != '\u{7f}' && ch >= '\u{20}') => {
                    self.next_char();
                }
                _ => return,
            }
        }
    }

    // -- error helpers ------------------------------------------------------

    #[inline]
    fn err(&self, kind: ErrorKind) -> Error {
        Error::new(kind, self.line)
    }

    #[inline]
    fn err_at(&self, kind: ErrorKind, line: usize) -> Error {
        Error::new(kind, line)
    }

    // -- tokenization -------------------------------------------------------

    pub(crate) fn next_token(&mut self, ctx: Ctx) -> Result<Token, Error> {
        self.eat_whitespace();
        self.eat_comment();

        let b = match self.peek_byte() {
            Some(b) => b,
            None => return Ok(Token::Eof),
        };
        match b {
            b'\n' => {
                self.eat_newline();
                Ok(Token::Newline)
            }
            b'\r' => {
                if self.eat_newline() {
                    Ok(Token::Newline)
                } else {
                    Err(self.err(ErrorKind::Unexpected('\r')))
                }
            }
            b'[' => {
                self.advance();
                Ok(Token::LBracket)
            }
            b']' => {
                self.advance();
                Ok(Token::RBracket)
            }
            b'{' => {
                self.advance();
                Ok(Token::LBrace)
            }
            b'}' => {
                self.advance();
                Ok(Token::RBrace)
            }
            b',' => {
                self.advance();
                Ok(Token::Comma)
            }
            b'.' => {
                self.advance();
                Ok(Token::Dot)
            }
            b'=' => {
                self.advance();
                Ok(Token::Eq)
            }
            b'"' => {
                self.advance();
                let (value, multiline) = self.read_basic_string()?;
                Ok(Token::Str { value, multiline })
            }
            b'\'' => {
                self.advance();
                let (value, multiline) = self.read_literal_string()?;
                Ok(Token::Str { value, multiline })
            }
            _ => match ctx {
                Ctx::Key => {
                    if is_keylike_byte(b) {
                        Ok(Token::Key(self.read_keylike().to_owned()))
                    } else {
                        let ch = self.peek_char().map(|(_, c)| c).unwrap_or('\0');
                        Err(self.err(ErrorKind::Unexpected(ch)))
                    }
                }
                Ctx::Value => self.value_token(b),
            },
        }
    }

    fn value_token(&mut self, first: u8) -> Result<Token, Error> {
        if first == b'+' {
            self.advance();
            return match self.peek_byte() {
                Some(b) if is_keylike_byte(b) => {
                    let s = self.read_keylike();
                    self.numeric(s)
                }
                _ => Err(self.err(ErrorKind::InvalidNumber)),
            };
        }
        if !is_keylike_byte(first) {
            let ch = self.peek_char().map(|(_, c)| c).unwrap_or('\0');
            return Err(self.err(ErrorKind::Unexpected(ch)));
        }
        if time::looks_like_datetime(&self.bytes[self.cursor..]) {
            return self.datetime();
        }
        let s = self.read_keylike();
        match s {
            "true" => Ok(Token::Boolean(true)),
            "false" => Ok(Token::Boolean(false)),
            _ => {
                if first == b'-' || first.is_ascii_digit() || s == "inf" || s == "nan" {
                    self.numeric(s)
                } else {
                    Err(self.err(ErrorKind::UnquotedString))
                }
            }
        }
    }

    fn datetime(&mut self) -> Result<Token, Error> {
        match time::scan(&self.bytes[self.cursor..]) {
            Ok((len, kind)) => {
                let raw = self.src[self.cursor..self.cursor + len].to_owned();
                self.cursor += len;
                Ok(Token::Datetime(Datetime::from_scanned(raw, kind)))
            }
            Err(()) => Err(self.err(ErrorKind::InvalidDateTime)),
        }
    }

    // -- keylike parsing ----------------------------------------------------

    fn read_keylike(&mut self) -> &'a str {
        let start = self.cursor;
        while let Some(b) = self.peek_byte() {
            if !is_keylike_byte(b) {
                break;
            }
            self.advance();
        }
        // keylike bytes are ASCII, so these are char boundaries
        &self.src[start..self.cursor]
    }

    // -- string parsing -----------------------------------------------------

    /// Reads a basic (double-quoted) string; the cursor is positioned right
    /// after the opening `"`.
    fn read_basic_string(&mut self) -> Result<(String, bool), Error> {
        let start_line = self.line;
        let mut multiline = false;
        if self.eat_byte(b'"') {
            if self.eat_byte(b'"') {
                multiline = true;
            } else {
                return Ok((String::new(), false));
            }
        }
        let mut val = String::new();
        if multiline {
            // A newline immediately following the opening delimiter is
            // dropped.
            self.eat_newline();
        }

        loop {
            match self.next_char() {
                Some((_, '\n')) => {
                    if !multiline {
                        return Err(self.err(ErrorKind::InvalidCharInString('\n')));
                    }
                    val.push('\n');
                }
                Some((_, '"')) => {
                    if !multiline {
                        return Ok((val, false));
                    }
                    if !self.eat_byte(b'"') {
                        val.push('"');
                        continue;
                    }
                    if !self.eat_byte(b'"') {
                        val.push_str("\"\"");
                        continue;
                    }
                    // Up to two more quotes belong to the content.
                    if self.eat_byte(b'"') {
                        val.push('"');
                    }
                    if self.eat_byte(b'"') {
                        val.push('"');
                    }
                    return Ok((val, true));
                }
                Some((_, '\\')) => self.read_escape(&mut val, multiline, start_line)?,
                Some((_, ch)) if ch == '\t' || (ch != '\u{7f}' && ch >= '\u{20}') => {
                    val.push(ch);
                }
                Some((_, ch)) => {
                    return Err(self.err(ErrorKind::InvalidCharInString(ch)));
                }
                None => return Err(self.err_at(ErrorKind::UnterminatedString, start_line)),
            }
        }
    }

    /// Reads a literal (single-quoted) string; no escapes are decoded. The
    /// cursor is positioned right after the opening `'`.
    fn read_literal_string(&mut self) -> Result<(String, bool), Error> {
        let start_line = self.line;
        let mut multiline = false;
        if self.eat_byte(b'\'') {
            if self.eat_byte(b'\'') {
                multiline = true;
            } else {
                return Ok((String::new(), false));
            }
        }
        let mut val = String::new();
        if multiline {
            self.eat_newline();
        }

        loop {
            match self.next_char() {
                Some((_, '\n')) => {
                    if !multiline {
                        return Err(self.err(ErrorKind::InvalidCharInString('\n')));
                    }
                    val.push('\n');
                }
                Some((_, '\'')) => {
                    if !multiline {
                        return Ok((val, false));
                    }
                    if !self.eat_byte(b'\'') {
                        val.push('\'');
                        continue;
                    }
                    if !self.eat_byte(b'\'') {
                        val.push_str("''");
                        continue;
                    }
                    if self.eat_byte(b'\'') {
                        val.push('\'');
                    }
                    if self.eat_byte(b'\'') {
                        val.push('\'');
                    }
                    return Ok((val, true));
                }
                Some((_, ch)) if ch == '\t' || (ch != '\u{7f}' && ch >= '\u{20}') => {
                    val.push(ch);
                }
                Some((_, ch)) => {
                    return Err(self.err(ErrorKind::InvalidCharInString(ch)));
                }
                None => return Err(self.err_at(ErrorKind::UnterminatedString, start_line)),
            }
        }
    }

    fn read_escape(
        &mut self,
        val: &mut String,
        multiline: bool,
        start_line: usize,
    ) -> Result<(), Error> {
        let b = match self.peek_byte() {
            Some(b) => b,
            None => return Err(self.err_at(ErrorKind::UnterminatedString, start_line)),
        };
        match b {
            b'"' => {
                self.advance();
                val.push('"');
            }
            b'\\' => {
                self.advance();
                val.push('\\');
            }
            b'b' => {
                self.advance();
                val.push('\u{8}');
            }
            b'f' => {
                self.advance();
                val.push('\u{c}');
            }
            b'n' => {
                self.advance();
                val.push('\n');
            }
            b'r' => {
                self.advance();
                val.push('\r');
            }
            b't' => {
                self.advance();
                val.push('\t');
            }
            b'u' => {
                self.advance();
                let ch = self.read_hex(4, start_line)?;
                val.push(ch);
            }
            b'U' => {
                self.advance();
                let ch = self.read_hex(8, start_line)?;
                val.push(ch);
            }
            b' ' | b'\t' | b'\n' | b'\r' if multiline => self.line_continuation()?,
            _ => {
                let ch = self.peek_char().map(|(_, c)| c).unwrap_or('\0');
                self.next_char();
                return Err(self.err(ErrorKind::InvalidEscape(ch)));
            }
        }
        Ok(())
    }

    /// A backslash at the end of a line eats the newline and all leading
    /// whitespace of the following lines, across as many chained lines as
    /// keep folding.
    fn line_continuation(&mut self) -> Result<(), Error> {
        if !self.eat_newline() {
            // Only whitespace may sit between the backslash and the line
            // ending.
            loop {
                match self.peek_byte() {
                    Some(b' ' | b'\t') => self.advance(),
                    _ => break,
                }
            }
            if !self.eat_newline() {
                let ch = self.peek_char().map(|(_, c)| c).unwrap_or('\0');
                return Err(self.err(ErrorKind::InvalidEscape(ch)));
            }
        }
        loop {
            match self.peek_byte() {
                Some(b' ' | b'\t') => self.advance(),
                Some(b'\n') => {
                    self.eat_newline();
                }
                Some(b'\r') if self.peek_byte_at(1) == Some(b'\n') => {
                    self.eat_newline();
                }
                _ => break,
            }
        }
        Ok(())
    }

    fn read_hex(&mut self, n: usize, start_line: usize) -> Result<char, Error> {
        let mut val: u32 = 0;
        for _ in 0..n {
            let b = match self.peek_byte() {
                Some(b) => b,
                None => return Err(self.err_at(ErrorKind::UnterminatedString, start_line)),
            };
            let digit = match b {
                b'0'..=b'9' => b - b'0',
                b'a'..=b'f' => b - b'a' + 10,
                b'A'..=b'F' => b - b'A' + 10,
                _ => {
                    let ch = self.peek_char().map(|(_, c)| c).unwrap_or('\0');
                    self.next_char();
                    return Err(self.err(ErrorKind::InvalidHexEscape(ch)));
                }
            };
            self.advance();
            val = (val << 4) | u32::from(digit);
        }
        // Lenient decode: surrogate escapes are replaced rather than
        // rejected.
        if (0xD800..=0xDFFF).contains(&val) {
            return Ok('\u{FFFD}');
        }
        char::from_u32(val).ok_or_else(|| self.err(ErrorKind::InvalidEscapeValue(val)))
    }

    // -- number parsing -----------------------------------------------------

    /// Classifies and parses a numeric literal whose keylike prefix `s` has
    /// already been consumed. Floats may continue past `s` in the source
    /// (`3.14`, `1e+6`), which is why this takes `&mut self`.
    fn numeric(&mut self, s: &'a str) -> Result<Token, Error> {
        if let Some(hex) = s.strip_prefix("0x") {
            self.integer(hex, 16).map(Token::Integer)
        } else if let Some(oct) = s.strip_prefix("0o") {
            self.integer(oct, 8).map(Token::Integer)
        } else if let Some(bin) = s.strip_prefix("0b") {
            self.integer(bin, 2).map(Token::Integer)
        } else if s.contains('e') || s.contains('E') {
            self.float(s, None).map(Token::Float)
        } else if self.eat_byte(b'.') {
            match self.peek_byte() {
                Some(b) if is_keylike_byte(b) => {
                    let after = self.read_keylike();
                    self.float(s, Some(after)).map(Token::Float)
                }
                _ => Err(self.err(ErrorKind::InvalidNumber)),
            }
        } else if s == "inf" {
            Ok(Token::Float(f64::INFINITY))
        } else if s == "-inf" {
            Ok(Token::Float(f64::NEG_INFINITY))
        } else if s == "nan" || s == "-nan" {
            // the sign of nan is not preserved
            Ok(Token::Float(f64::NAN))
        } else {
            self.integer(s, 10).map(Token::Integer)
        }
    }

    fn integer(&mut self, s: &str, radix: u32) -> Result<i64, Error> {
        let allow_sign = radix == 10;
        let allow_leading_zeros = radix != 10;
        let (prefix, suffix) = self.validate_integer(s, allow_sign, allow_leading_zeros, radix)?;
        if !suffix.is_empty() {
            return Err(self.err(ErrorKind::InvalidNumber));
        }
        let cleaned = prefix.replace('_', "");
        match i64::from_str_radix(cleaned.trim_start_matches('+'), radix) {
            Ok(v) => Ok(v),
            Err(_) => Err(self.err(ErrorKind::InvalidNumber)),
        }
    }

    /// Validates digit/underscore/leading-zero structure and splits `s`
    /// into the numeric prefix and whatever trails it.
    fn validate_integer<'s>(
        &self,
        s: &'s str,
        allow_sign: bool,
        allow_leading_zeros: bool,
        radix: u32,
    ) -> Result<(&'s str, &'s str), Error> {
        let mut first = true;
        let mut first_zero = false;
        let mut underscore = false;
        let mut end = s.len();
        for (i, c) in s.char_indices() {
            if i == 0 && (c == '+' || c == '-') && allow_sign {
                continue;
            }
            if c == '0' && first {
                first_zero = true;
            } else if c.is_digit(radix) {
                if !first && first_zero && !allow_leading_zeros {
                    return Err(self.err(ErrorKind::InvalidNumber));
                }
                underscore = false;
            } else if c == '_' && first {
                return Err(self.err(ErrorKind::InvalidNumber));
            } else if c == '_' && !underscore {
                underscore = true;
            } else {
                end = i;
                break;
            }
            first = false;
        }
        if first || underscore {
            return Err(self.err(ErrorKind::InvalidNumber));
        }
        Ok((&s[..end], &s[end..]))
    }

    fn float(&mut self, s: &str, after_decimal: Option<&str>) -> Result<f64, Error> {
        let (integral, mut suffix) = self.validate_integer(s, true, false, 10)?;

        let mut fraction = None;
        if let Some(after) = after_decimal {
            if !suffix.is_empty() {
                return Err(self.err(ErrorKind::InvalidNumber));
            }
            let (frac, rest) = self.validate_integer(after, false, true, 10)?;
            fraction = Some(frac);
            suffix = rest;
        }

        let mut exponent = None;
        if suffix.starts_with('e') || suffix.starts_with('E') {
            let (exp, rest) = if suffix.len() == 1 {
                // The sign split the keylike run: `1e+6` arrives as `1e`
                // with `+6` still in the source.
                self.eat_byte(b'+');
                match self.peek_byte() {
                    Some(b) if is_keylike_byte(b) => {
                        let next = self.read_keylike();
                        self.validate_integer(next, false, true, 10)?
                    }
                    _ => return Err(self.err(ErrorKind::InvalidNumber)),
                }
            } else {
                self.validate_integer(&suffix[1..], true, true, 10)?
            };
            if !rest.is_empty() {
                return Err(self.err(ErrorKind::InvalidNumber));
            }
            exponent = Some(exp);
        } else if !suffix.is_empty() {
            return Err(self.err(ErrorKind::InvalidNumber));
        }

        let mut repr = String::with_capacity(s.len() + 8);
        repr.extend(
            integral
                .trim_start_matches('+')
                .chars()
                .filter(|c| *c != '_'),
        );
        if let Some(fraction) = fraction {
            repr.push('.');
            repr.extend(fraction.chars().filter(|c| *c != '_'));
        }
        if let Some(exponent) = exponent {
            repr.push('E');
            repr.extend(exponent.chars().filter(|c| *c != '_'));
        }
        let n: f64 = match repr.parse() {
            Ok(n) => n,
            Err(_) => return Err(self.err(ErrorKind::InvalidNumber)),
        };
        if n.is_finite() {
            Ok(n)
        } else {
            Err(self.err(ErrorKind::InvalidNumber))
        }
    }
}

// ---------------------------------------------------------------------------
// Grammar tables: the character classes the tokenizer and writer share.
// ---------------------------------------------------------------------------

/// Bare keys (and the spine of numeric literals) are drawn from
/// `[A-Za-z0-9_-]`.
#[inline]
pub(crate) fn is_keylike_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

#[cfg(test)]
#[path = "./tokenizer_tests.rs"]
mod tests;
