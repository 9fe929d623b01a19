//! Lexical helpers for classifying operand text and splitting a line into
//! whitespace/comma-separated lexemes.
//!
//! Operand classification follows a fixed priority — matrix, then
//! immediate, then register, then direct (label) — matching `detect_mode`
//! in the course implementation this assembler is modeled on.

use regex::Regex;

use super::isa;

/// The shape an operand's text takes, independent of whether that shape is
/// legal for the opcode/position it appears in (arity/mode-legality is
/// checked separately by the parser against [`isa::OPCODE_RULES`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperandShape {
    Immediate(i32),
    Register(u16),
    /// `NAME[rX][rY]`
    Matrix { name: String, row_reg: u16, col_reg: u16 },
    /// Anything else that looks like a label.
    Direct(String),
}

impl OperandShape {
    pub fn addressing_mode(&self) -> isa::AddressingMode {
        match self {
            OperandShape::Immediate(_) => isa::AddressingMode::Immediate,
            OperandShape::Register(_) => isa::AddressingMode::Register,
            OperandShape::Matrix { .. } => isa::AddressingMode::Matrix,
            OperandShape::Direct(_) => isa::AddressingMode::Direct,
        }
    }
}

/// Splits a comma-separated operand list into its raw, trimmed operand
/// lexemes. A single operand may itself contain brackets (matrix form),
/// just never a comma, so splitting on top-level commas is always safe
/// here: `mov r1,r2` and `mov r1 , r2` split identically.
pub fn split_operands(text: &str) -> Vec<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Vec::new();
    }
    trimmed.split(',').map(|part| part.trim().to_string()).collect()
}

/// Splits a line into whitespace-delimited lexemes, keeping double-quoted
/// strings intact as a single lexeme (for `.string "..."`).
pub fn lex_line(line: &str) -> Vec<String> {
    let re = Regex::new(r#""[^"]*"|\S+"#).unwrap();
    re.find_iter(line).map(|m| m.as_str().to_string()).collect()
}

/// Classifies an operand's syntactic shape. Returns `None` when the text
/// doesn't parse as anything recognizable (caller reports a syntax error).
pub fn classify_operand(text: &str) -> Option<OperandShape> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    if let Some(matrix) = parse_matrix(text) {
        return Some(matrix);
    }
    if let Some(value) = parse_immediate(text) {
        return Some(OperandShape::Immediate(value));
    }
    if let Some(reg) = isa::parse_register(text) {
        return Some(OperandShape::Register(reg));
    }
    if is_valid_label_syntax(text) {
        return Some(OperandShape::Direct(text.to_string()));
    }
    None
}

/// `#n`, signed decimal.
fn parse_immediate(text: &str) -> Option<i32> {
    let rest = text.strip_prefix('#')?;
    rest.parse::<i32>().ok()
}

/// `NAME[rX][rY]`.
fn parse_matrix(text: &str) -> Option<OperandShape> {
    let bracket = text.find('[')?;
    let name = &text[..bracket];
    if name.is_empty() || !is_valid_label_syntax(name) {
        return None;
    }
    let (row_reg, col_reg) = parse_matrix_regs(text)?;
    Some(OperandShape::Matrix { name: name.to_string(), row_reg, col_reg })
}

/// Parses the `[rX][rY]` register pair out of a matrix operand's full
/// text (the part before the first `[`, if any, is ignored), used by the
/// encoder to re-derive the register pair from a [`super::row_table::RowKind::MatrixRegs`]
/// row's stored text.
pub fn parse_matrix_regs(text: &str) -> Option<(u16, u16)> {
    let bracket = text.find('[')?;
    let rest = &text[bracket..];
    let re = Regex::new(r"^\[r([0-9]+)\]\[r([0-9]+)\]$").unwrap();
    let caps = re.captures(rest)?;
    let row_reg: u16 = caps[1].parse().ok()?;
    let col_reg: u16 = caps[2].parse().ok()?;
    if row_reg > 7 || col_reg > 7 {
        return None;
    }
    Some((row_reg, col_reg))
}

/// Labels must be <=30 chars, start with a letter, and contain only
/// alphanumeric characters afterward.
pub fn is_valid_label_syntax(text: &str) -> bool {
    if text.is_empty() || text.len() > isa::MAX_LABEL_LENGTH {
        return false;
    }
    let mut chars = text.chars();
    let first = chars.next().unwrap();
    if !first.is_ascii_alphabetic() {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric())
}

/// A numeric literal as accepted by `.data`/`.mat` value lists: optional
/// sign, decimal digits.
pub fn parse_decimal_literal(text: &str) -> Option<i64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    text.parse::<i64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_operands_regardless_of_spacing_around_commas() {
        assert_eq!(split_operands("r1,r2"), vec!["r1", "r2"]);
        assert_eq!(split_operands("r1 , r2"), vec!["r1", "r2"]);
        assert_eq!(split_operands("M1[r2][r3], r4"), vec!["M1[r2][r3]", "r4"]);
    }

    #[test]
    fn classifies_by_priority_matrix_immediate_register_direct() {
        assert_eq!(
            classify_operand("M1[r2][r3]"),
            Some(OperandShape::Matrix { name: "M1".into(), row_reg: 2, col_reg: 3 })
        );
        assert_eq!(classify_operand("#-5"), Some(OperandShape::Immediate(-5)));
        assert_eq!(classify_operand("r7"), Some(OperandShape::Register(7)));
        assert_eq!(classify_operand("LOOP"), Some(OperandShape::Direct("LOOP".into())));
    }

    #[test]
    fn rejects_out_of_range_registers_and_malformed_matrices() {
        assert_eq!(classify_operand("r8"), None);
        assert_eq!(classify_operand("M1[r2][r9]"), None);
    }

    #[test]
    fn label_syntax_requires_leading_letter_and_bounded_length() {
        assert!(is_valid_label_syntax("LOOP3"));
        assert!(!is_valid_label_syntax("3LOOP"));
        assert!(!is_valid_label_syntax(""));
        let too_long: String = "A".repeat(31);
        assert!(!is_valid_label_syntax(&too_long));
    }

    #[test]
    fn lex_line_keeps_quoted_strings_intact() {
        let lexemes = lex_line(r#".string "hi there""#);
        assert_eq!(lexemes, vec![".string".to_string(), "\"hi there\"".to_string()]);
    }
}
