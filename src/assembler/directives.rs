//! Row emission for the three data directives (`.data`, `.string`, `.mat`)
//! and handling of the two symbol-only directives (`.entry`, `.extern`).
//!
//! Grounded on `add_data_to_table` in the course implementation this
//! assembler is modeled on, which performs the same per-directive row
//! splitting (one row per value, per character, or per matrix cell).

use super::diagnostic::{Diagnostics, Stage};
use super::isa::MAX_ROWS;
use super::row_table::{RowKind, RowTable};
use super::statement::{parse_decimal_literal, split_operands};
use super::symbol_table::{report_symbol_error, SymbolKind, SymbolTable};

/// Shared by every row-emitting stage (directives here, instructions in
/// `super::instructions`) so table-overflow is always checked immediately
/// before a push rather than after.
pub(super) fn overflow_check(table: &RowTable, diagnostics: &mut Diagnostics, file: &str, line: usize) -> bool {
    if table.len() >= MAX_ROWS {
        diagnostics.report(Stage::Parser, file, line, format!("row table overflow: more than {} rows", MAX_ROWS));
        false
    } else {
        true
    }
}

/// `.data n1, n2, …` — one row per value. The label, if any, attaches to
/// the first value's row as a DATA symbol.
pub fn parse_data(
    table: &mut RowTable,
    symbols: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
    file: &str,
    line: usize,
    label: Option<&str>,
    operand_text: &str,
) -> bool {
    let values = split_operands(operand_text);
    if values.is_empty() {
        diagnostics.report(Stage::Parser, file, line, "\".data\" requires at least one value");
        return false;
    }
    let mut ok = true;
    for (i, value) in values.iter().enumerate() {
        if parse_decimal_literal(value).is_none() {
            diagnostics.report(Stage::Parser, file, line, format!("invalid numeric literal \"{}\" in .data", value));
            ok = false;
            continue;
        }
        if !overflow_check(table, diagnostics, file, line) {
            return false;
        }
        let row_index = table.push_new(line, if i == 0 { label.map(str::to_string) } else { None }, RowKind::DataValue, value.clone());
        if i == 0 {
            if let Some(name) = label {
                if !report_symbol_error(diagnostics, file, line, symbols.define(name, SymbolKind::Data, row_index)) {
                    ok = false;
                }
            }
        }
    }
    ok
}

/// `.string "text"` — one row per character, plus a terminating null row.
/// Empty strings and unclosed strings are rejected.
pub fn parse_string(
    table: &mut RowTable,
    symbols: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
    file: &str,
    line: usize,
    label: Option<&str>,
    operand_text: &str,
) -> bool {
    let text = operand_text.trim();
    if !text.starts_with('"') {
        diagnostics.report(Stage::Parser, file, line, "\".string\" requires a quoted string");
        return false;
    }
    if !text.ends_with('"') || text.len() < 2 {
        diagnostics.report(Stage::Parser, file, line, "unclosed string in .string directive");
        return false;
    }
    let inner = &text[1..text.len() - 1];
    if inner.contains('"') {
        diagnostics.report(Stage::Parser, file, line, "unclosed string in .string directive");
        return false;
    }
    if inner.is_empty() {
        diagnostics.report(Stage::Parser, file, line, "empty string in .string directive is not allowed");
        return false;
    }

    let mut first_row_index = None;
    for (i, ch) in inner.chars().enumerate() {
        if !overflow_check(table, diagnostics, file, line) {
            return false;
        }
        let row_label = if i == 0 { label.map(str::to_string) } else { None };
        let idx = table.push_new(line, row_label, RowKind::StringChar, ch.to_string());
        if i == 0 {
            first_row_index = Some(idx);
        }
    }
    if !overflow_check(table, diagnostics, file, line) {
        return false;
    }
    table.push_new(line, None, RowKind::StringChar, "");

    if let Some(name) = label {
        let row_index = first_row_index.expect("non-empty string always has a first row");
        return report_symbol_error(diagnostics, file, line, symbols.define(name, SymbolKind::Data, row_index));
    }
    true
}

/// `.mat [R][C] v1, v2, …` — the first row carries the first value (or zero),
/// the remaining `R*C - 1` rows carry the rest (or zero-fill). More than
/// `R*C` values is an error.
pub fn parse_mat(
    table: &mut RowTable,
    symbols: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
    file: &str,
    line: usize,
    label: Option<&str>,
    operand_text: &str,
) -> bool {
    let text = operand_text.trim();
    let (dims, rest) = match parse_mat_dimensions(text) {
        Some(parsed) => parsed,
        None => {
            diagnostics.report(Stage::Parser, file, line, "malformed matrix dimensions; expected \"[R][C]\"");
            return false;
        }
    };
    let (rows, cols) = dims;
    let capacity = rows * cols;
    if capacity == 0 {
        diagnostics.report(Stage::Parser, file, line, "matrix dimensions must be positive");
        return false;
    }

    let values: Vec<String> = if rest.trim().is_empty() { Vec::new() } else { split_operands(rest) };
    if values.len() > capacity {
        diagnostics.report(Stage::Parser, file, line, format!("too many values for matrix directive (expected at most {})", capacity));
        return false;
    }

    let mut ok = true;
    let mut first_row_index = None;
    for i in 0..capacity {
        let value_text = values.get(i).cloned().unwrap_or_else(|| "0".to_string());
        if parse_decimal_literal(&value_text).is_none() {
            diagnostics.report(Stage::Parser, file, line, format!("invalid numeric literal \"{}\" in .mat", value_text));
            ok = false;
            continue;
        }
        if !overflow_check(table, diagnostics, file, line) {
            return false;
        }
        let idx = table.push_new(line, if i == 0 { label.map(str::to_string) } else { None }, RowKind::DataValue, value_text);
        if i == 0 {
            first_row_index = Some(idx);
        }
    }

    if let Some(name) = label {
        let row_index = first_row_index.unwrap_or(table.len());
        if !report_symbol_error(diagnostics, file, line, symbols.define(name, SymbolKind::Data, row_index)) {
            ok = false;
        }
    }
    ok
}

/// Parses the leading `[R][C]` of a `.mat` directive, returning the
/// dimensions and the remainder of the text (the value list, if any).
fn parse_mat_dimensions(text: &str) -> Option<((usize, usize), &str)> {
    let re = regex::Regex::new(r"^\[([0-9]+)\]\[([0-9]+)\]").unwrap();
    let caps = re.captures(text)?;
    let rows: usize = caps[1].parse().ok()?;
    let cols: usize = caps[2].parse().ok()?;
    let whole = caps.get(0).unwrap();
    Some(((rows, cols), &text[whole.end()..]))
}

/// `.entry NAME`.
pub fn declare_entry(symbols: &mut SymbolTable, diagnostics: &mut Diagnostics, file: &str, line: usize, name: &str) -> bool {
    report_symbol_error(diagnostics, file, line, symbols.declare_entry(name))
}

/// `.extern NAME`.
pub fn declare_extern(symbols: &mut SymbolTable, diagnostics: &mut Diagnostics, file: &str, line: usize, name: &str) -> bool {
    report_symbol_error(diagnostics, file, line, symbols.declare_extern(name))
}
