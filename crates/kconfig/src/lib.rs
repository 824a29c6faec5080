//! A flat Kconfig-style configuration engine.
//!
//! Loads a schema tree (`menu`/`source`/`osource`/`config` stanzas) into an
//! ordered symbol table, reads and writes `.config` selection files, and lets
//! a frontend update symbol values. Dependency evaluation (`depends on`,
//! `select`, visibility) is deliberately not part of this engine; schemas
//! using those constructs are rejected at parse time.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

mod dotconfig;
mod error;
mod parse;

pub use error::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Bool,
    String,
    Int,
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKind::Bool => write!(f, "bool"),
            SymbolKind::String => write!(f, "string"),
            SymbolKind::Int => write!(f, "int"),
        }
    }
}

/// A configuration symbol with its canonical string value.
///
/// Booleans are `"y"` or `"n"`, ints a decimal literal, strings unquoted.
#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    pub kind: SymbolKind,
    pub prompt: Option<String>,
    pub value: String,
}

impl Symbol {
    /// True for a boolean symbol whose value is `y`.
    pub fn enabled(&self) -> bool {
        self.value == "y"
    }
}

/// A `menu` block; `symbols` are indices into [`Config::symbols`].
#[derive(Debug, Clone)]
pub struct Menu {
    pub title: String,
    pub symbols: Vec<usize>,
}

/// An evaluated configuration tree.
#[derive(Debug)]
pub struct Config {
    symbols: Vec<Symbol>,
    index: HashMap<String, usize>,
    menus: Vec<Menu>,
}

impl Config {
    /// Parses the schema file at `path`, following `source` and `osource`
    /// includes, and returns the tree with every symbol at its default value.
    pub fn load_tree<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let mut parser = parse::Parser::new();
        parser.parse_file(path.as_ref())?;
        parser.into_config()
    }

    /// Applies a persisted `.config` selection file on top of the defaults.
    /// Entries for symbols the tree no longer defines are skipped.
    pub fn load_config<P: AsRef<Path>>(&mut self, path: P) -> Result<(), Error> {
        dotconfig::load(self, path.as_ref())
    }

    /// Writes every symbol's current value as a `.config` selection file.
    pub fn write_config<P: AsRef<Path>>(&self, path: P) -> Result<(), Error> {
        dotconfig::save(self, path.as_ref())
    }

    /// All defined symbols, in definition order.
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// All `menu` blocks, in definition order.
    pub fn menus(&self) -> &[Menu] {
        &self.menus
    }

    pub fn lookup(&self, name: &str) -> Option<&Symbol> {
        self.index.get(name).map(|&idx| &self.symbols[idx])
    }

    /// Updates a symbol's value. The value must be canonical for the
    /// symbol's kind (`y`/`n` for bools, a decimal literal for ints).
    pub fn set_value(&mut self, name: &str, value: &str) -> Result<(), Error> {
        let idx = *self
            .index
            .get(name)
            .ok_or_else(|| Error::UnknownSymbol(name.to_string()))?;
        let sym = &mut self.symbols[idx];
        if !value_fits(sym.kind, value) {
            return Err(Error::InvalidValue {
                name: sym.name.clone(),
                kind: sym.kind,
                value: value.to_string(),
            });
        }
        sym.value = value.to_string();
        Ok(())
    }

    pub(crate) fn symbol_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn symbol_mut(&mut self, idx: usize) -> &mut Symbol {
        &mut self.symbols[idx]
    }

    pub(crate) fn from_parts(
        symbols: Vec<Symbol>,
        index: HashMap<String, usize>,
        menus: Vec<Menu>,
    ) -> Self {
        Self {
            symbols,
            index,
            menus,
        }
    }
}

pub(crate) fn value_fits(kind: SymbolKind, value: &str) -> bool {
    match kind {
        SymbolKind::Bool => value == "y" || value == "n",
        SymbolKind::String => true,
        SymbolKind::Int => value.parse::<i64>().is_ok(),
    }
}
