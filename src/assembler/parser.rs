//! Pass-1 line dispatch: classifies each `.am` line as `.entry`/`.extern`,
//! a data directive, or an instruction, extracts and validates its
//! optional label, then drives the row/symbol table builders.
//!
//! Grounded on `process_file_to_table_and_labels` in the course
//! implementation this assembler is modeled on for the dispatch order:
//! `.entry`/`.extern` first (no label permitted on those lines), then an
//! optional label (a leading token ending in `:`), then the
//! command/directive name.

use super::diagnostic::{Diagnostics, Stage};
use super::directives::{declare_entry, declare_extern, parse_data, parse_mat, parse_string};
use super::instructions::parse_instruction_line;
use super::isa::is_reserved_word;
use super::row_table::RowTable;
use super::statement::{is_valid_label_syntax, lex_line};
use super::symbol_table::SymbolTable;

/// Parses and dispatches one line of a `.am` file. Blank lines and
/// comment lines (leading `;`) are silently skipped.
pub fn parse_line(
    table: &mut RowTable,
    symbols: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
    file: &str,
    line_number: usize,
    line: &str,
) {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with(';') {
        return;
    }

    let mut tokens = lex_line(trimmed).into_iter();
    let first = match tokens.next() {
        Some(token) => token,
        None => return,
    };

    if first.eq_ignore_ascii_case(".entry") {
        dispatch_symbol_directive(symbols, diagnostics, file, line_number, ".entry", tokens, |symbols, diagnostics, file, line_number, name| {
            declare_entry(symbols, diagnostics, file, line_number, name);
        });
        return;
    }
    if first.eq_ignore_ascii_case(".extern") {
        dispatch_symbol_directive(symbols, diagnostics, file, line_number, ".extern", tokens, |symbols, diagnostics, file, line_number, name| {
            declare_extern(symbols, diagnostics, file, line_number, name);
        });
        return;
    }

    let (label, mnemonic, operand_tokens): (Option<String>, String, Vec<String>) = match parse_label_prefix(&first) {
        Some(Ok(label)) => match tokens.next() {
            Some(mnemonic) => (Some(label), mnemonic, tokens.collect()),
            None => {
                diagnostics.report(Stage::Parser, file, line_number, "label is not followed by a command");
                return;
            }
        },
        Some(Err(message)) => {
            diagnostics.report(Stage::Parser, file, line_number, message);
            return;
        }
        None => (None, first, tokens.collect()),
    };

    let operand_text = operand_tokens.join(" ");
    let label_ref = label.as_deref();

    if mnemonic.eq_ignore_ascii_case(".data") {
        parse_data(table, symbols, diagnostics, file, line_number, label_ref, &operand_text);
    } else if mnemonic.eq_ignore_ascii_case(".string") {
        parse_string(table, symbols, diagnostics, file, line_number, label_ref, &operand_text);
    } else if mnemonic.eq_ignore_ascii_case(".mat") {
        parse_mat(table, symbols, diagnostics, file, line_number, label_ref, &operand_text);
    } else if mnemonic.starts_with('.') {
        diagnostics.report(Stage::Parser, file, line_number, format!("unknown directive \"{}\"", mnemonic));
    } else {
        parse_instruction_line(table, symbols, diagnostics, file, line_number, label_ref, &mnemonic, &operand_text);
    }
}

/// Handles `.entry NAME` / `.extern NAME`: exactly one name token, no
/// label permitted on the line itself.
fn dispatch_symbol_directive(
    symbols: &mut SymbolTable,
    diagnostics: &mut Diagnostics,
    file: &str,
    line_number: usize,
    directive: &str,
    mut tokens: impl Iterator<Item = String>,
    apply: impl FnOnce(&mut SymbolTable, &mut Diagnostics, &str, usize, &str),
) {
    match (tokens.next(), tokens.next()) {
        (Some(name), None) => apply(symbols, diagnostics, file, line_number, &name),
        _ => diagnostics.report(Stage::Parser, file, line_number, format!("\"{}\" requires exactly one name", directive)),
    }
}

/// If `token` ends in `:`, validates and returns the label name (or an
/// error message on invalid syntax / reserved word); `None` when the
/// token isn't a label at all, so the caller treats it as the mnemonic.
fn parse_label_prefix(token: &str) -> Option<Result<String, String>> {
    let name = token.strip_suffix(':')?;
    if !is_valid_label_syntax(name) {
        return Some(Err(format!("\"{}\" is not a valid label name", name)));
    }
    if is_reserved_word(name) {
        return Some(Err(format!("\"{}\" is a reserved word and cannot be used as a label", name)));
    }
    Some(Ok(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_fixtures() -> (RowTable, SymbolTable, Diagnostics) {
        (RowTable::new(), SymbolTable::new(), Diagnostics::new())
    }

    #[test]
    fn parses_labeled_instruction_line() {
        let (mut table, mut symbols, mut diags) = new_fixtures();
        parse_line(&mut table, &mut symbols, &mut diags, "x.am", 1, "LOOP: mov r1, r2");
        assert!(diags.is_empty());
        assert_eq!(table.len(), 2);
        assert!(symbols.find("LOOP").is_some());
    }

    #[test]
    fn parses_data_directive_line_without_label() {
        let (mut table, mut symbols, mut diags) = new_fixtures();
        parse_line(&mut table, &mut symbols, &mut diags, "x.am", 1, ".data 1, 2, 3");
        assert!(diags.is_empty());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn parses_entry_directive() {
        let (mut table, mut symbols, mut diags) = new_fixtures();
        parse_line(&mut table, &mut symbols, &mut diags, "x.am", 1, ".entry LOOP");
        assert!(diags.is_empty());
        assert!(table.is_empty());
        assert!(symbols.find("LOOP").is_some());
    }

    #[test]
    fn rejects_reserved_word_as_label() {
        let (mut table, mut symbols, mut diags) = new_fixtures();
        parse_line(&mut table, &mut symbols, &mut diags, "x.am", 1, "mov: stop");
        assert!(!diags.is_empty());
        assert!(table.is_empty());
    }

    #[test]
    fn blank_and_comment_lines_are_ignored() {
        let (mut table, mut symbols, mut diags) = new_fixtures();
        parse_line(&mut table, &mut symbols, &mut diags, "x.am", 1, "   ");
        parse_line(&mut table, &mut symbols, &mut diags, "x.am", 2, "; a comment");
        assert!(diags.is_empty());
        assert!(table.is_empty());
        let _ = &symbols;
    }
}
