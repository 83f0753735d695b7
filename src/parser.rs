//! Interprets tokens into the value tree, enforcing the table-scoping and
//! redefinition rules.
//!
//! Scoping state lives in a per-parse [`Scope`]: a set of explicitly
//! defined header paths and a set of sealed paths (inline tables and
//! static arrays). Paths are resolved: an array-of-tables element is
//! addressed by its index, so `[[a]]` appending a fresh table never
//! inherits seen-state from the previous element.

use crate::Options;
use crate::error::{Error, ErrorKind};
use crate::tokenizer::{Ctx, Token, Tokenizer};
use crate::value::{Table, Value, is_homogeneous};
use foldhash::HashSet;
use smallvec::SmallVec;
use std::collections::btree_map::Entry;

type InlineVec<T> = SmallVec<[T; 5]>;

/// One component of a resolved insertion path.
#[derive(Clone, PartialEq, Eq, Hash)]
enum Seg {
    Key(String),
    Index(usize),
}

type KeyPath = Vec<Seg>;

#[derive(Default)]
struct Scope {
    /// Paths defined by their own `[header]`.
    explicit: HashSet<KeyPath>,
    /// Paths closed against later extension: inline tables and static
    /// arrays.
    sealed: HashSet<KeyPath>,
}

pub(crate) fn parse(src: &str, options: &Options) -> Result<Table, Error> {
    let mut parser = Parser {
        tok: Tokenizer::new(src),
        options,
        root: Table::new(),
        current: KeyPath::new(),
        scope: Scope::default(),
    };
    parser.document()?;
    Ok(parser.root)
}

struct Parser<'a> {
    tok: Tokenizer<'a>,
    options: &'a Options,
    root: Table,
    /// Resolved path of the table the next `key = value` line lands in.
    current: KeyPath,
    scope: Scope,
}

impl<'a> Parser<'a> {
    fn document(&mut self) -> Result<(), Error> {
        loop {
            match self.tok.next_token(Ctx::Key)? {
                Token::Newline => {}
                Token::Eof => return Ok(()),
                Token::LBracket => self.table_header()?,
                t @ (Token::Key(..) | Token::Str { .. }) => self.key_value(t)?,
                t => return Err(self.wanted("a table header or key", &t)),
            }
        }
    }

    fn wanted(&self, expected: &'static str, found: &Token) -> Error {
        Error::new(
            ErrorKind::Wanted {
                expected,
                found: found.describe(),
            },
            self.tok.line(),
        )
    }

    // -- headers ------------------------------------------------------------

    fn table_header(&mut self) -> Result<(), Error> {
        let line = self.tok.line();
        let mut t = self.tok.next_token(Ctx::Key)?;
        let array = matches!(t, Token::LBracket);
        if array {
            t = self.tok.next_token(Ctx::Key)?;
        }
        let (keys, stop) = self.dotted_key(t)?;
        if !matches!(stop, Token::RBracket) {
            return Err(self.wanted("a right bracket", &stop));
        }
        if array {
            let t = self.tok.next_token(Ctx::Key)?;
            if !matches!(t, Token::RBracket) {
                return Err(self.wanted("a right bracket", &t));
            }
        }
        let t = self.tok.next_token(Ctx::Key)?;
        if !matches!(t, Token::Newline | Token::Eof) {
            return Err(self.wanted("a newline", &t));
        }

        self.current = if array {
            Self::install_array_header(&mut self.root, &mut self.scope, &keys, line)?
        } else {
            Self::install_table_header(&mut self.root, &mut self.scope, &keys, line)?
        };
        Ok(())
    }

    // -- key-value lines ----------------------------------------------------

    fn key_value(&mut self, first: Token) -> Result<(), Error> {
        let line = self.tok.line();
        let (keys, stop) = self.dotted_key(first)?;
        if !matches!(stop, Token::Eq) {
            return Err(self.wanted("an equals", &stop));
        }
        let t = self.tok.next_token(Ctx::Value)?;
        let value = self.value(t)?;
        let t = self.tok.next_token(Ctx::Key)?;
        if !matches!(t, Token::Newline | Token::Eof) {
            return Err(self.wanted("a newline", &t));
        }
        Self::install(
            &mut self.root,
            &mut self.scope,
            &self.current,
            &keys,
            value,
            line,
        )
    }

    /// Reads `first (. key)*`, returning the parts and the token that
    /// stopped the run (`=`, `]`, or anything else for the caller to
    /// complain about).
    fn dotted_key(&mut self, first: Token) -> Result<(InlineVec<String>, Token), Error> {
        let mut keys = InlineVec::new();
        keys.push(self.key_name(first)?);
        loop {
            match self.tok.next_token(Ctx::Key)? {
                Token::Dot => {
                    let part = self.tok.next_token(Ctx::Key)?;
                    keys.push(self.key_name(part)?);
                }
                t => return Ok((keys, t)),
            }
        }
    }

    fn key_name(&self, t: Token) -> Result<String, Error> {
        match t {
            Token::Key(name) => Ok(name),
            Token::Str {
                multiline: true, ..
            } => Err(Error::new(ErrorKind::MultilineStringKey, self.tok.line())),
            Token::Str { value, .. } => {
                if value.is_empty() {
                    Err(Error::new(ErrorKind::EmptyKey, self.tok.line()))
                } else {
                    Ok(value)
                }
            }
            t => Err(self.wanted("a table key", &t)),
        }
    }

    // -- values -------------------------------------------------------------

    fn value(&mut self, t: Token) -> Result<Value, Error> {
        match t {
            Token::Str { value, .. } => Ok(Value::String(value)),
            Token::Integer(i) => Ok(Value::Integer(i)),
            Token::Float(f) => Ok(Value::Float(f)),
            Token::Boolean(b) => Ok(match &self.options.inflate_boolean {
                Some(inflate) => inflate(b),
                None => Value::Boolean(b),
            }),
            Token::Datetime(dt) => Ok(match &self.options.inflate_datetime {
                Some(inflate) => inflate(dt),
                None => Value::Datetime(dt),
            }),
            Token::LBracket => self.array(),
            Token::LBrace => self.inline_table(),
            t => Err(self.wanted("a value", &t)),
        }
    }

    /// Parses `[ ... ]` after the opening bracket. Newlines and trailing
    /// commas are allowed; the array is sealed by the caller on install.
    fn array(&mut self) -> Result<Value, Error> {
        let line = self.tok.line();
        let mut values = Vec::new();
        loop {
            let t = self.next_skipping_newlines()?;
            if matches!(t, Token::RBracket) {
                break;
            }
            values.push(self.value(t)?);
            match self.next_skipping_newlines()? {
                Token::Comma => {}
                Token::RBracket => break,
                t => return Err(self.wanted("a comma or right bracket", &t)),
            }
        }
        if self.options.strict_arrays && !is_homogeneous(&values) {
            return Err(Error::new(ErrorKind::HeterogenousArray, line));
        }
        Ok(Value::Array(values))
    }

    fn next_skipping_newlines(&mut self) -> Result<Token, Error> {
        loop {
            let t = self.tok.next_token(Ctx::Value)?;
            if !matches!(t, Token::Newline) {
                return Ok(t);
            }
        }
    }

    /// Parses `{ ... }` after the opening brace. Commas are required,
    /// trailing commas and newlines are not allowed, dotted keys are.
    /// The closed table is sealed by the caller on install.
    fn inline_table(&mut self) -> Result<Value, Error> {
        let mut table = Table::new();
        let mut scope = Scope::default();
        let mut t = self.tok.next_token(Ctx::Key)?;
        if matches!(t, Token::RBrace) {
            return Ok(Value::Table(table));
        }
        loop {
            let line = self.tok.line();
            let (keys, stop) = self.dotted_key(t)?;
            if !matches!(stop, Token::Eq) {
                return Err(self.wanted("an equals", &stop));
            }
            let vt = self.tok.next_token(Ctx::Value)?;
            let value = self.value(vt)?;
            Self::install(&mut table, &mut scope, &[], &keys, value, line)?;
            match self.tok.next_token(Ctx::Key)? {
                Token::RBrace => return Ok(Value::Table(table)),
                Token::Comma => {
                    t = self.tok.next_token(Ctx::Key)?;
                    if matches!(t, Token::RBrace) {
                        return Err(self.wanted("a table key", &t));
                    }
                }
                t => return Err(self.wanted("a comma or right brace", &t)),
            }
        }
    }

    // -- tree installation --------------------------------------------------

    /// Installs `value` at `base ++ keys`, creating implicit intermediate
    /// tables. The final component must be vacant; inline tables and
    /// static arrays seal their path against later extension.
    fn install(
        table: &mut Table,
        scope: &mut Scope,
        base: &[Seg],
        keys: &[String],
        value: Value,
        line: usize,
    ) -> Result<(), Error> {
        let mut path: KeyPath = base.to_vec();
        let target = Self::resolve(table, base);
        let (last, intermediate) = match keys.split_last() {
            Some(split) => split,
            None => unreachable!("dotted keys always have at least one part"),
        };
        let target = Self::descend(target, scope, &mut path, intermediate, line)?;
        path.push(Seg::Key(last.clone()));
        match target.entry(last.clone()) {
            Entry::Occupied(..) => Err(Error::new(
                ErrorKind::DuplicateKey { key: last.clone() },
                line,
            )),
            Entry::Vacant(slot) => {
                let seals = matches!(value, Value::Table(..) | Value::Array(..));
                slot.insert(value);
                if seals {
                    scope.sealed.insert(path);
                }
                Ok(())
            }
        }
    }

    /// Walks an already-resolved path. The parser only stores paths it has
    /// itself created, so every step is known to succeed.
    fn resolve<'t>(mut table: &'t mut Table, base: &[Seg]) -> &'t mut Table {
        let mut i = 0;
        while i < base.len() {
            let key = match &base[i] {
                Seg::Key(k) => k,
                Seg::Index(..) => unreachable!("an index always follows its array key"),
            };
            match table.get_mut(key) {
                Some(Value::Table(t)) => {
                    table = t;
                    i += 1;
                }
                Some(Value::Array(a)) => {
                    let idx = match base.get(i + 1) {
                        Some(Seg::Index(idx)) => *idx,
                        _ => unreachable!("array segments carry an element index"),
                    };
                    match a.get_mut(idx) {
                        Some(Value::Table(t)) => {
                            table = t;
                            i += 2;
                        }
                        _ => unreachable!("array-of-tables elements are tables"),
                    }
                }
                _ => unreachable!("the insertion path always names a table"),
            }
        }
        table
    }

    /// Walks the intermediate parts of a dotted key or header, creating
    /// implicit tables, descending into the last element of an
    /// array-of-tables, and refusing to cross sealed or non-table values.
    fn descend<'t>(
        mut table: &'t mut Table,
        scope: &Scope,
        path: &mut KeyPath,
        keys: &[String],
        line: usize,
    ) -> Result<&'t mut Table, Error> {
        for key in keys {
            path.push(Seg::Key(key.clone()));
            let slot = match table.entry(key.clone()) {
                Entry::Vacant(slot) => slot.insert(Value::Table(Table::new())),
                Entry::Occupied(slot) => slot.into_mut(),
            };
            match slot {
                Value::Table(t) => {
                    if scope.sealed.contains(path) {
                        return Err(Error::new(
                            ErrorKind::ExtendSealed {
                                path: display_path(path),
                            },
                            line,
                        ));
                    }
                    table = t;
                }
                Value::Array(a) => {
                    if scope.sealed.contains(path) {
                        return Err(Error::new(
                            ErrorKind::ExtendSealed {
                                path: display_path(path),
                            },
                            line,
                        ));
                    }
                    let idx = a.len().saturating_sub(1);
                    match a.last_mut() {
                        Some(Value::Table(t)) => {
                            path.push(Seg::Index(idx));
                            table = t;
                        }
                        _ => {
                            return Err(Error::new(
                                ErrorKind::TypeConflict {
                                    path: display_path(path),
                                    found: "array",
                                },
                                line,
                            ));
                        }
                    }
                }
                other => {
                    return Err(Error::new(
                        ErrorKind::TypeConflict {
                            path: display_path(path),
                            found: other.type_str(),
                        },
                        line,
                    ));
                }
            }
        }
        Ok(table)
    }

    /// `[a.b.c]`: create or adopt the table at the path, marking it
    /// explicitly defined. Re-heading an explicit table is an error;
    /// adopting one that was only implicit is not.
    fn install_table_header(
        root: &mut Table,
        scope: &mut Scope,
        keys: &[String],
        line: usize,
    ) -> Result<KeyPath, Error> {
        let mut path = KeyPath::new();
        let (last, intermediate) = match keys.split_last() {
            Some(split) => split,
            None => unreachable!("headers always have at least one part"),
        };
        let table = Self::descend(root, scope, &mut path, intermediate, line)?;
        path.push(Seg::Key(last.clone()));
        match table.entry(last.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(Value::Table(Table::new()));
                scope.explicit.insert(path.clone());
                Ok(path)
            }
            Entry::Occupied(slot) => match slot.into_mut() {
                Value::Table(..) => {
                    if scope.sealed.contains(&path) {
                        Err(Error::new(
                            ErrorKind::ExtendSealed {
                                path: display_path(&path),
                            },
                            line,
                        ))
                    } else if scope.explicit.contains(&path) {
                        Err(Error::new(
                            ErrorKind::DuplicateTable {
                                name: keys.join("."),
                            },
                            line,
                        ))
                    } else {
                        scope.explicit.insert(path.clone());
                        Ok(path)
                    }
                }
                other => Err(Error::new(
                    ErrorKind::TypeConflict {
                        path: display_path(&path),
                        found: other.type_str(),
                    },
                    line,
                )),
            },
        }
    }

    /// `[[a.b.c]]`: append a fresh table to the array at the path. Static
    /// arrays refuse the append; anything that is not an array is a type
    /// conflict.
    fn install_array_header(
        root: &mut Table,
        scope: &mut Scope,
        keys: &[String],
        line: usize,
    ) -> Result<KeyPath, Error> {
        let mut path = KeyPath::new();
        let (last, intermediate) = match keys.split_last() {
            Some(split) => split,
            None => unreachable!("headers always have at least one part"),
        };
        let table = Self::descend(root, scope, &mut path, intermediate, line)?;
        path.push(Seg::Key(last.clone()));
        match table.entry(last.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(Value::Array(vec![Value::Table(Table::new())]));
                path.push(Seg::Index(0));
                Ok(path)
            }
            Entry::Occupied(slot) => match slot.into_mut() {
                Value::Array(a) => {
                    if scope.sealed.contains(&path) {
                        return Err(Error::new(
                            ErrorKind::ExtendSealed {
                                path: display_path(&path),
                            },
                            line,
                        ));
                    }
                    a.push(Value::Table(Table::new()));
                    path.push(Seg::Index(a.len() - 1));
                    Ok(path)
                }
                other => Err(Error::new(
                    ErrorKind::TypeConflict {
                        path: display_path(&path),
                        found: other.type_str(),
                    },
                    line,
                )),
            },
        }
    }
}

fn display_path(path: &[Seg]) -> String {
    let mut out = String::new();
    for seg in path {
        match seg {
            Seg::Key(k) => {
                if !out.is_empty() {
                    out.push('.');
                }
                out.push_str(k);
            }
            Seg::Index(i) => {
                out.push('[');
                out.push_str(itoa::Buffer::new().format(*i));
                out.push(']');
            }
        }
    }
    out
}

#[cfg(test)]
#[path = "./parser_tests.rs"]
mod tests;
