//! The row table: one [`Row`] per machine word that will appear in the
//! final image, in source order. Populated by the parser, addressed by
//! [`RowTable::assign_addresses`], filled in by the encoder, read by the
//! emitter.

use super::isa::{AddressingMode, BASE_ADDRESS, Opcode};

/// Which role an operand row plays, used by the encoder to pick which half
/// of a register word to fill and by the emitter to find externally-linked
/// use-sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperandRole {
    Source,
    Destination,
    /// `.data`/`.string`/`.mat` payload words have no source/destination role.
    Data,
}

/// The kind of a row, tagged so the encoder can dispatch on it directly
/// instead of re-deriving "what does this row mean" from raw strings.
#[derive(Debug, Clone)]
pub enum RowKind {
    /// First word of an instruction: opcode + addressing modes + ARE. The
    /// modes are already resolved here by the parser (which had to classify
    /// each operand's shape anyway to decide how many rows to emit), so the
    /// encoder only has to pack bits, never re-derive a mode.
    InstructionHeader {
        opcode: Opcode,
        src_mode: Option<AddressingMode>,
        dst_mode: Option<AddressingMode>,
    },
    /// `#n` operand.
    Immediate { role: OperandRole },
    /// A label operand (direct addressing), resolved against the symbol
    /// table at encode time.
    DirectLabel { role: OperandRole },
    /// First row of a matrix operand: the matrix's own label (direct
    /// addressing).
    MatrixLabel { role: OperandRole },
    /// Second row of a matrix operand: the `[rX][rY]` register pair.
    MatrixRegs { role: OperandRole },
    /// A single register operand (the other operand was not a register).
    SingleRegister { role: OperandRole },
    /// Both operands of a two-operand instruction are registers, packed
    /// into one row.
    RegisterPair,
    /// One `.data`/`.mat` numeric value.
    DataValue,
    /// One character of a `.string`, or its terminating null row.
    StringChar,
}

/// One entry of the row table.
#[derive(Debug, Clone)]
pub struct Row {
    pub source_line: usize,
    pub label: Option<String>,
    pub kind: RowKind,
    /// Raw operand text, used by the encoder to classify/parse the operand.
    /// Empty for rows that don't need it (instruction headers, the
    /// already-split second half of a register pair, terminator rows).
    pub operand_text: String,
    pub address: u16,
    pub word: u16,
}

impl Row {
    fn new(source_line: usize, label: Option<String>, kind: RowKind, operand_text: impl Into<String>) -> Row {
        Row {
            source_line,
            label,
            kind,
            operand_text: operand_text.into(),
            address: 0,
            word: 0,
        }
    }
}

#[derive(Debug, Default)]
pub struct RowTable {
    rows: Vec<Row>,
}

impl RowTable {
    pub fn new() -> RowTable {
        RowTable::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn push(&mut self, row: Row) -> usize {
        let index = self.rows.len();
        self.rows.push(row);
        index
    }

    pub fn push_new(
        &mut self,
        source_line: usize,
        label: Option<String>,
        kind: RowKind,
        operand_text: impl Into<String>,
    ) -> usize {
        self.push(Row::new(source_line, label, kind, operand_text))
    }

    pub fn get(&self, index: usize) -> &Row {
        &self.rows[index]
    }

    pub fn get_mut(&mut self, index: usize) -> &mut Row {
        &mut self.rows[index]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.rows.iter_mut()
    }

    /// Walks the table assigning decimal addresses starting at
    /// [`BASE_ADDRESS`], one per row (every row — header, operand, or data
    /// — occupies exactly one address).
    pub fn assign_addresses(&mut self) {
        let mut address = BASE_ADDRESS;
        for row in &mut self.rows {
            row.address = address;
            address += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn addresses_start_at_base_and_increment_by_one_per_row() {
        let mut table = RowTable::new();
        table.push_new(1, None, RowKind::InstructionHeader { opcode: Opcode::Rts, src_mode: None, dst_mode: None }, "");
        table.push_new(2, None, RowKind::DataValue, "5");
        table.push_new(2, None, RowKind::DataValue, "6");
        table.assign_addresses();
        assert_eq!(table.get(0).address, BASE_ADDRESS);
        assert_eq!(table.get(1).address, BASE_ADDRESS + 1);
        assert_eq!(table.get(2).address, BASE_ADDRESS + 2);
    }
}
