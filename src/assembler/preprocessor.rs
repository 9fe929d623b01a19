//! Macro preprocessing: expands `mcro NAME ... mcroend` blocks inline,
//! leaving every other line untouched, producing the `.am` file text.
//!
//! Grounded on `preprocess_file` in the course implementation this
//! assembler is modeled on, with one deliberate change: the original
//! keeps the macro table in static globals (`macro_table`/`macro_count`),
//! here it is local to one call so two files assembled in the same run
//! never see each other's macros.

use std::collections::HashMap;

use super::diagnostic::{Diagnostics, Stage};
use super::isa::{self, MAX_LINE_LENGTH, MCRO_KEYWORD, MCROEND_KEYWORD};

/// Expands macros in `source`, returning the `.am` text. Returns `None`
/// when any diagnostic was reported — a file whose preprocessing found a
/// problem produces no `.am` file at all, and every later stage is
/// skipped.
pub fn preprocess(source: &str, diagnostics: &mut Diagnostics, file: &str) -> Option<String> {
    let mut macros: HashMap<String, Vec<String>> = HashMap::new();
    let mut output = String::new();
    let mut inside_macro: Option<(String, Vec<String>)> = None;
    let mut inside_invalid_macro = false;

    for (offset, raw_line) in source.lines().enumerate() {
        let line_number = offset + 1;
        if raw_line.len() > MAX_LINE_LENGTH {
            diagnostics.report(Stage::Preprocessor, file, line_number, format!("line exceeds {} characters", MAX_LINE_LENGTH));
            inside_invalid_macro = true;
            continue;
        }
        let line = raw_line.trim();

        if inside_macro.is_some() && is_macro_start(line) {
            diagnostics.report(Stage::Preprocessor, file, line_number, "cannot define a macro inside another macro");
            inside_macro = None;
            continue;
        }

        if inside_macro.is_none() && !inside_invalid_macro && is_macro_end(line) {
            diagnostics.report(Stage::Preprocessor, file, line_number, "'mcroend' without matching 'mcro'");
            continue;
        }

        if let Some((name, mut lines)) = inside_macro.take() {
            if is_macro_end(line) {
                if !line[MCROEND_KEYWORD.len()..].trim().is_empty() {
                    diagnostics.report(Stage::Preprocessor, file, line_number, "text after 'mcroend' is not allowed");
                }
                macros.insert(name, lines);
                inside_invalid_macro = false;
            } else {
                lines.push(raw_line.to_string());
                inside_macro = Some((name, lines));
            }
            continue;
        }

        if is_macro_start(line) {
            match parse_macro_header(line, &macros) {
                Ok(name) => inside_macro = Some((name, Vec::new())),
                Err(message) => {
                    diagnostics.report(Stage::Preprocessor, file, line_number, message);
                    inside_invalid_macro = true;
                }
            }
            continue;
        }

        match expand_if_macro_invocation(line, &macros) {
            Some(Ok(body)) => {
                for expanded in body {
                    output.push_str(&expanded);
                    output.push('\n');
                }
            }
            Some(Err(message)) => diagnostics.report(Stage::Preprocessor, file, line_number, message),
            None => {
                output.push_str(raw_line);
                output.push('\n');
            }
        }
    }

    if let Some((name, _)) = inside_macro {
        diagnostics.report(Stage::Preprocessor, file, source.lines().count(), format!("macro \"{}\" is missing a matching 'mcroend'", name));
    }

    if diagnostics.is_empty() {
        Some(output)
    } else {
        None
    }
}

fn is_macro_start(line: &str) -> bool {
    starts_with_keyword(line, MCRO_KEYWORD)
}

fn is_macro_end(line: &str) -> bool {
    starts_with_keyword(line, MCROEND_KEYWORD)
}

fn starts_with_keyword(line: &str, keyword: &str) -> bool {
    match line.strip_prefix(keyword) {
        Some(rest) => rest.is_empty() || rest.starts_with(char::is_whitespace),
        None => false,
    }
}

/// Validates a `mcro NAME` header line: exactly one name token, not a
/// duplicate, not a reserved word, within the label length limit.
fn parse_macro_header(line: &str, macros: &HashMap<String, Vec<String>>) -> Result<String, String> {
    let rest = line[MCRO_KEYWORD.len()..].trim();
    let mut tokens = rest.split_whitespace();
    let name = tokens.next().ok_or_else(|| "missing macro name".to_string())?;
    if tokens.next().is_some() {
        return Err("text after macro name is not allowed".to_string());
    }
    if name.len() > isa::MAX_LABEL_LENGTH {
        return Err(format!("macro name too long (max {} chars)", isa::MAX_LABEL_LENGTH));
    }
    if macros.contains_key(name) {
        return Err(format!("macro \"{}\" already defined", name));
    }
    if isa::is_reserved_word(name) {
        return Err(format!("macro name \"{}\" is a reserved word", name));
    }
    Ok(name.to_string())
}

/// If `line`'s first token names a defined macro, returns its expanded
/// body (or an error if anything follows the invocation); `None` when the
/// line is not a macro invocation at all, so the caller can pass it
/// through unchanged.
fn expand_if_macro_invocation(line: &str, macros: &HashMap<String, Vec<String>>) -> Option<Result<Vec<String>, String>> {
    let mut tokens = line.split_whitespace();
    let first = tokens.next()?;
    let body = macros.get(first)?;
    if tokens.next().is_some() {
        return Some(Err(format!("unexpected text after macro invocation \"{}\"", first)));
    }
    Some(Ok(body.clone()))
}
