//! Pass-2 encoding: walks the row table filling in each row's `word`
//! field by pure bit packing. No addressing-mode legality is checked
//! here — the parser already rejected anything illegal before the row
//! was created, so the only way this stage fails is an unresolved label.
//!
//! Grounded on `encode_command_line`/`encode_operand_row`/`encode_data_row`
//! in the course implementation this assembler is modeled on, including
//! the faithfully-preserved detail that a label's address is truncated to
//! its low 8 bits before being packed into a word's payload field.

use super::codegen_utils::{pack_instruction_header, pack_payload_are, pack_register_pair, pack_single_register};
use super::diagnostic::{Diagnostics, Stage};
use super::isa::Are;
use super::row_table::{OperandRole, RowKind, RowTable};
use super::statement::{parse_decimal_literal, parse_matrix_regs};
use super::symbol_table::{SymbolKind, SymbolTable};

/// One use of an external symbol: the label name and the address of the
/// word that referenced it, needed to render the `.ext` file.
#[derive(Debug, Clone)]
pub struct ExternalReference {
    pub name: String,
    pub address: u16,
}

/// Encodes every row, reporting unresolved labels as [`Stage::Encoder`]
/// diagnostics, and returns the external references collected along the
/// way (always empty when any diagnostic was reported).
pub fn encode(table: &mut RowTable, symbols: &SymbolTable, diagnostics: &mut Diagnostics, file: &str) -> Vec<ExternalReference> {
    let mut externals = Vec::new();
    for index in 0..table.len() {
        let row = table.get(index).clone();
        let line = row.source_line;
        let word = match &row.kind {
            RowKind::InstructionHeader { opcode, src_mode, dst_mode } => Some(pack_instruction_header(
                *opcode as u16,
                src_mode.map(|m| m.bits()).unwrap_or(0),
                dst_mode.map(|m| m.bits()).unwrap_or(0),
            )),
            RowKind::Immediate { .. } => match parse_decimal_literal(row.operand_text.trim_start_matches('#')) {
                Some(value) => Some(pack_payload_are(value as i32, Are::Absolute)),
                None => {
                    diagnostics.report(Stage::Encoder, file, line, format!("invalid immediate operand \"{}\"", row.operand_text));
                    None
                }
            },
            RowKind::DirectLabel { .. } => encode_label_reference(&row.operand_text, symbols, &mut externals, index, table, diagnostics, file, line),
            RowKind::MatrixLabel { .. } => {
                let name = matrix_name(&row.operand_text);
                encode_label_reference(name, symbols, &mut externals, index, table, diagnostics, file, line)
            }
            RowKind::MatrixRegs { .. } => match parse_matrix_regs(&row.operand_text) {
                Some((row_reg, col_reg)) => Some(pack_register_pair(row_reg, col_reg)),
                None => {
                    diagnostics.report(Stage::Encoder, file, line, format!("malformed matrix register pair in \"{}\"", row.operand_text));
                    None
                }
            },
            RowKind::SingleRegister { role } => match super::isa::parse_register(&row.operand_text) {
                Some(reg) => Some(pack_single_register(reg, *role == OperandRole::Source)),
                None => {
                    diagnostics.report(Stage::Encoder, file, line, format!("malformed register operand \"{}\"", row.operand_text));
                    None
                }
            },
            RowKind::RegisterPair => match parse_register_pair_text(&row.operand_text) {
                Some((src, dst)) => Some(pack_register_pair(src, dst)),
                None => {
                    diagnostics.report(Stage::Encoder, file, line, format!("malformed register pair \"{}\"", row.operand_text));
                    None
                }
            },
            RowKind::DataValue => match parse_decimal_literal(&row.operand_text) {
                Some(value) => Some(super::codegen_utils::truncate_to_bits(value as i32, 10)),
                None => {
                    diagnostics.report(Stage::Encoder, file, line, format!("invalid numeric literal \"{}\"", row.operand_text));
                    None
                }
            },
            RowKind::StringChar => {
                let byte = row.operand_text.chars().next().map(|c| c as u16).unwrap_or(0);
                Some(super::codegen_utils::mask10(byte))
            }
        };
        if let Some(word) = word {
            table.get_mut(index).word = word;
        }
    }
    externals
}

/// Extracts the matrix name preceding the first `[` of a matrix operand's
/// text (e.g. `"M1[r2][r3]"` -> `"M1"`).
fn matrix_name(text: &str) -> &str {
    match text.find('[') {
        Some(bracket) => &text[..bracket],
        None => text,
    }
}

/// Encodes a direct/matrix-label word: the label's address truncated to
/// 8 bits, with ARE relocatable for an internal symbol, external with a
/// zero payload (and a recorded reference) for an `.extern` symbol.
fn encode_label_reference(
    name: &str,
    symbols: &SymbolTable,
    externals: &mut Vec<ExternalReference>,
    row_index: usize,
    table: &RowTable,
    diagnostics: &mut Diagnostics,
    file: &str,
    line: usize,
) -> Option<u16> {
    let symbol = match symbols.find(name) {
        Some(symbol) => symbol,
        None => {
            diagnostics.report(Stage::Encoder, file, line, format!("undefined label \"{}\"", name));
            return None;
        }
    };
    match symbol.kind {
        SymbolKind::Ext => {
            externals.push(ExternalReference { name: name.to_string(), address: table.get(row_index).address });
            Some(pack_payload_are(0, Are::External))
        }
        SymbolKind::Code | SymbolKind::Data => {
            let address = symbol.resolved_address.expect("resolve_addresses runs before encode");
            Some(pack_payload_are(address as i32, Are::Relocatable))
        }
        SymbolKind::Unknown => {
            diagnostics.report(Stage::Encoder, file, line, format!("label \"{}\" was declared .entry but never defined", name));
            None
        }
    }
}

/// Parses the `"rX,rY"` text a [`RowKind::RegisterPair`] row carries.
fn parse_register_pair_text(text: &str) -> Option<(u16, u16)> {
    let (src, dst) = text.split_once(',')?;
    let src = super::isa::parse_register(src.trim())?;
    let dst = super::isa::parse_register(dst.trim())?;
    Some((src, dst))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembler::isa::Opcode;
    use crate::assembler::row_table::OperandRole;

    #[test]
    fn encodes_instruction_header_with_resolved_modes() {
        let mut table = RowTable::new();
        table.push_new(
            1,
            None,
            RowKind::InstructionHeader { opcode: Opcode::Rts, src_mode: None, dst_mode: None },
            "",
        );
        let symbols = SymbolTable::new();
        let mut diags = Diagnostics::new();
        encode(&mut table, &symbols, &mut diags, "x.am");
        assert!(diags.is_empty());
        assert_eq!(table.get(0).word & 0b11, Are::Absolute.bits());
    }

    #[test]
    fn encodes_register_pair_into_high_and_low_fields() {
        let mut table = RowTable::new();
        table.push_new(1, None, RowKind::RegisterPair, "r3,r5");
        let symbols = SymbolTable::new();
        let mut diags = Diagnostics::new();
        encode(&mut table, &symbols, &mut diags, "x.am");
        assert!(diags.is_empty());
        let word = table.get(0).word;
        assert_eq!((word >> 6) & 0b1111, 3);
        assert_eq!((word >> 2) & 0b1111, 5);
    }

    #[test]
    fn unresolved_direct_label_is_reported() {
        let mut table = RowTable::new();
        table.push_new(1, None, RowKind::DirectLabel { role: OperandRole::Destination }, "GHOST");
        let symbols = SymbolTable::new();
        let mut diags = Diagnostics::new();
        encode(&mut table, &symbols, &mut diags, "x.am");
        assert!(!diags.is_empty());
    }

    #[test]
    fn extern_label_reference_is_collected_with_zero_payload() {
        let mut table = RowTable::new();
        table.push_new(1, None, RowKind::DirectLabel { role: OperandRole::Destination }, "EXT1");
        table.assign_addresses();
        let mut symbols = SymbolTable::new();
        symbols.declare_extern("EXT1").unwrap();
        let mut diags = Diagnostics::new();
        let externals = encode(&mut table, &symbols, &mut diags, "x.am");
        assert!(diags.is_empty());
        assert_eq!(externals.len(), 1);
        assert_eq!(externals[0].name, "EXT1");
        assert_eq!(table.get(0).word & 0b11, Are::External.bits());
        assert_eq!((table.get(0).word >> 2) & 0xFF, 0);
    }
}
