//! A two-pass assembler for a pedagogical 10-bit-word machine, featuring:
//! - a macro preprocessor
//! - a two-pass assembler producing base-4 object/entries/externals files

pub mod assembler;
pub mod logging;
