//! The symbol table: labels, `.entry` declarations, and `.extern` imports.
//!
//! Kept as a flat growable vector scanned linearly by name, the same shape
//! as `Labels`/`find_label_by_name` in the course implementation this
//! assembler is modeled on — a hash map would not express the one
//! legal case of a duplicate name (an `.entry` declaration paired with its
//! defining occurrence) as simply as a linear scan with an explicit kind
//! check does.

use super::diagnostic::{Diagnostics, Stage};
use super::isa::BASE_ADDRESS;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Code,
    Data,
    Ext,
    /// Created by a `.entry NAME` seen before `NAME`'s definition.
    Unknown,
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: String,
    /// Row index at which the symbol was defined (CODE/DATA). Zero for
    /// EXT and for a pending `.entry` with no definition seen yet.
    pub row_index: usize,
    pub kind: SymbolKind,
    pub is_entry: bool,
    /// Filled in once the row table's addresses are assigned.
    pub resolved_address: Option<u16>,
}

#[derive(Debug, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    pub fn find(&self, name: &str) -> Option<&Symbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    fn find_index(&self, name: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s.name == name)
    }

    /// Declares a CODE or DATA symbol at the row it was defined on. Returns
    /// an error message on redefinition of a non-entry symbol.
    pub fn define(&mut self, name: &str, kind: SymbolKind, row_index: usize) -> Result<(), String> {
        if let Some(idx) = self.find_index(name) {
            let existing = &mut self.symbols[idx];
            match existing.kind {
                SymbolKind::Unknown if existing.is_entry => {
                    existing.kind = kind;
                    existing.row_index = row_index;
                    Ok(())
                }
                _ => Err(format!("label \"{}\" is already defined", name)),
            }
        } else {
            self.symbols.push(Symbol {
                name: name.to_string(),
                row_index,
                kind,
                is_entry: false,
                resolved_address: None,
            });
            Ok(())
        }
    }

    /// Declares `.extern NAME`. Duplicate declarations are errors.
    pub fn declare_extern(&mut self, name: &str) -> Result<(), String> {
        if self.find_index(name).is_some() {
            return Err(format!("\"{}\" is already declared", name));
        }
        self.symbols.push(Symbol {
            name: name.to_string(),
            row_index: 0,
            kind: SymbolKind::Ext,
            is_entry: false,
            resolved_address: None,
        });
        Ok(())
    }

    /// Declares `.entry NAME`. May appear before or after the definition,
    /// but exactly once per name, and never alongside an `.extern` of the
    /// same name.
    pub fn declare_entry(&mut self, name: &str) -> Result<(), String> {
        if let Some(idx) = self.find_index(name) {
            let existing = &mut self.symbols[idx];
            match existing.kind {
                SymbolKind::Ext => Err(format!("\"{}\" cannot be both .entry and .extern", name)),
                _ if existing.is_entry => Err(format!("\"{}\" is already declared .entry", name)),
                _ => {
                    existing.is_entry = true;
                    Ok(())
                }
            }
        } else {
            self.symbols.push(Symbol {
                name: name.to_string(),
                row_index: 0,
                kind: SymbolKind::Unknown,
                is_entry: true,
                resolved_address: None,
            });
            Ok(())
        }
    }

    /// Resolves every CODE/DATA symbol's address as `BASE_ADDRESS +
    /// row_index`; EXT symbols stay unresolved (address 0 is used directly
    /// at encode time; they are not relocated here).
    pub fn resolve_addresses(&mut self) {
        for symbol in &mut self.symbols {
            if matches!(symbol.kind, SymbolKind::Code | SymbolKind::Data) {
                symbol.resolved_address = Some(BASE_ADDRESS + symbol.row_index as u16);
            }
        }
    }

    /// `.entry` declarations that received a CODE/DATA definition and so
    /// have a resolved address. Per spec, an `.entry` with no definition is
    /// not a parse-time error: it is checked only when the entries file
    /// would be emitted, and simply produces no output line rather than
    /// failing the whole file — so this is the one place that check lives,
    /// shared by the entries emitter and this module's own tests.
    pub fn resolved_entries(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter().filter(|s| s.is_entry && s.resolved_address.is_some())
    }
}

/// Runs [`SymbolTable::define`]/[`declare_extern`]/[`declare_entry`] and
/// turns a failure into a parser [`Diagnostic`] at the given source line.
pub fn report_symbol_error(
    diagnostics: &mut Diagnostics,
    file: &str,
    line: usize,
    result: Result<(), String>,
) -> bool {
    match result {
        Ok(()) => true,
        Err(message) => {
            diagnostics.report(Stage::Parser, file, line, message);
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_before_definition_resolves() {
        let mut table = SymbolTable::new();
        table.declare_entry("LOOP").unwrap();
        table.define("LOOP", SymbolKind::Code, 3).unwrap();
        table.resolve_addresses();
        let sym = table.find("LOOP").unwrap();
        assert_eq!(sym.resolved_address, Some(BASE_ADDRESS + 3));
        assert!(sym.is_entry);
    }

    #[test]
    fn entry_after_definition_resolves() {
        let mut table = SymbolTable::new();
        table.define("X", SymbolKind::Data, 0).unwrap();
        table.declare_entry("X").unwrap();
        table.resolve_addresses();
        assert!(table.find("X").unwrap().is_entry);
    }

    #[test]
    fn duplicate_definition_is_rejected() {
        let mut table = SymbolTable::new();
        table.define("L", SymbolKind::Code, 0).unwrap();
        assert!(table.define("L", SymbolKind::Code, 5).is_err());
    }

    #[test]
    fn double_entry_declaration_is_rejected() {
        let mut table = SymbolTable::new();
        table.declare_entry("L").unwrap();
        assert!(table.declare_entry("L").is_err());
    }

    #[test]
    fn entry_and_extern_conflict() {
        let mut table = SymbolTable::new();
        table.declare_extern("K").unwrap();
        assert!(table.declare_entry("K").is_err());
    }

    #[test]
    fn duplicate_extern_is_rejected() {
        let mut table = SymbolTable::new();
        table.declare_extern("K").unwrap();
        assert!(table.declare_extern("K").is_err());
    }

    #[test]
    fn an_entry_with_no_definition_is_excluded_from_resolved_entries() {
        let mut table = SymbolTable::new();
        table.declare_entry("GHOST").unwrap();
        table.resolve_addresses();
        assert_eq!(table.resolved_entries().count(), 0);
    }

    #[test]
    fn a_defined_entry_is_included_in_resolved_entries() {
        let mut table = SymbolTable::new();
        table.define("LOOP", SymbolKind::Code, 2).unwrap();
        table.declare_entry("LOOP").unwrap();
        table.resolve_addresses();
        let resolved: Vec<&Symbol> = table.resolved_entries().collect();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].name, "LOOP");
    }
}
