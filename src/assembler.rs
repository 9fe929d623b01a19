//! Two-pass assembler for a pedagogical 10-bit-word, 16-opcode machine.
//!
//! Each source file passes through three stages — preprocessing (macro
//! expansion), parsing (pass 1: builds the row table and symbol table),
//! and encoding (pass 2: fills in each row's machine word) — followed by
//! rendering the three base-4 text artifacts (`.ob`, `.ent`, `.ext`).
//! A stage that reports any diagnostic skips every later stage for that
//! file; an artifact a prior stage already produced (the expanded
//! source) is still returned. This module never touches the filesystem
//! itself — [`assemble_from_file`] reads the one input it needs, and the
//! caller decides what to do with the text this pipeline returns.

pub mod codegen_utils;
pub mod diagnostic;
pub mod directives;
pub mod emitter;
pub mod encoder;
pub mod instructions;
pub mod isa;
pub mod parser;
pub mod preprocessor;
pub mod row_table;
pub mod statement;
pub mod symbol_table;

use std::fs;

use diagnostic::Diagnostics;
use row_table::RowTable;
use symbol_table::SymbolTable;

/// The result of running one source file through the full pipeline.
pub struct AssembledFile {
    /// The macro-expanded `.am` text, present whenever preprocessing
    /// reported no diagnostics (even if a later stage then failed).
    pub expanded_source: Option<String>,
    pub diagnostics: Diagnostics,
    pub object_text: Option<String>,
    pub entries_text: Option<String>,
    pub externals_text: Option<String>,
}

impl AssembledFile {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}

/// Reads `base_name.as` and runs it through the full pipeline.
pub fn assemble_from_file(base_name: &str) -> Result<AssembledFile, std::io::Error> {
    let source = fs::read_to_string(format!("{}.as", base_name))?;
    Ok(assemble(&source, base_name))
}

/// Runs `source` through the full pipeline as if it were `file`.as.
pub fn assemble(source: &str, file: &str) -> AssembledFile {
    let mut diagnostics = Diagnostics::new();
    let as_name = format!("{}.as", file);

    let expanded_source = preprocessor::preprocess(source, &mut diagnostics, &as_name);
    let expanded = match &expanded_source {
        Some(expanded) => expanded.clone(),
        None => {
            return AssembledFile { expanded_source, diagnostics, object_text: None, entries_text: None, externals_text: None };
        }
    };

    let am_name = format!("{}.am", file);
    let mut table = RowTable::new();
    let mut symbols = SymbolTable::new();
    for (offset, line) in expanded.lines().enumerate() {
        parser::parse_line(&mut table, &mut symbols, &mut diagnostics, &am_name, offset + 1, line);
    }
    if !diagnostics.is_empty() {
        return AssembledFile { expanded_source, diagnostics, object_text: None, entries_text: None, externals_text: None };
    }

    table.assign_addresses();
    symbols.resolve_addresses();

    let externals = encoder::encode(&mut table, &symbols, &mut diagnostics, &am_name);
    if !diagnostics.is_empty() {
        return AssembledFile { expanded_source, diagnostics, object_text: None, entries_text: None, externals_text: None };
    }

    AssembledFile {
        object_text: emitter::render_object(&table),
        entries_text: emitter::render_entries(&symbols),
        externals_text: emitter::render_externals(&externals),
        expanded_source,
        diagnostics,
    }
}
