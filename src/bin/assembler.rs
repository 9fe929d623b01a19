use std::{env, fs};

use decasm::assembler::{self, AssembledFile};
use decasm::logging::error;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} base1 [base2 ...]", args[0]);
        std::process::exit(1);
    }

    for base_name in &args[1..] {
        process_file(base_name);
    }

    // Every argument was attempted; per-file success/failure was reported
    // on standard output above, so the process itself always exits 0.
}

/// Assembles one base name's `.as` file, writing whichever of
/// `.am`/`.ob`/`.ent`/`.ext` the pipeline produced, printing every
/// diagnostic it reported, and reporting per-file success on stdout.
fn process_file(base_name: &str) {
    let result: AssembledFile = match assembler::assemble_from_file(base_name) {
        Ok(result) => result,
        Err(e) => {
            error(format!("cannot read \"{}.as\": {}", base_name, e));
            println!("{}: failed", base_name);
            return;
        }
    };

    let mut ok = !result.has_errors();
    for diagnostic in result.diagnostics.iter() {
        eprintln!("{}", diagnostic);
    }

    if let Some(expanded) = &result.expanded_source {
        ok &= write_artifact(base_name, "am", expanded);
    }
    if let Some(object) = &result.object_text {
        ok &= write_artifact(base_name, "ob", object);
    }
    if let Some(entries) = &result.entries_text {
        ok &= write_artifact(base_name, "ent", entries);
    }
    if let Some(externals) = &result.externals_text {
        ok &= write_artifact(base_name, "ext", externals);
    }

    println!("{}: {}", base_name, if ok { "ok" } else { "failed" });
}

fn write_artifact(base_name: &str, extension: &str, contents: &str) -> bool {
    let path = format!("{}.{}", base_name, extension);
    match fs::write(&path, contents) {
        Ok(()) => true,
        Err(e) => {
            error(format!("failed to write \"{}\": {}", path, e));
            false
        }
    }
}
