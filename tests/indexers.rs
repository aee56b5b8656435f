//! Subroutine and variable indexes across include closures.

mod common;

use std::path::Path;

use common::Workspace;
use oscscript_rs::{Indexer, SubroutineIndexer, SymbolKind, VariableIndexer, Vocabulary};

#[test]
fn subroutines_collected_from_every_file() {
    let ws = Workspace::new();
    let main = ws.write("main.osc", "include lib\ngosub Helper\n");
    let lib = ws.write("lib.osc", "subroutine helper\n\tprint hi\nendsubroutine\n");

    let vocab = Vocabulary::default();
    let index = SubroutineIndexer::new(&vocab).index(&main, None);

    let defs = index.definitions_of("helper");
    assert_eq!(defs.len(), 1);
    assert_eq!(defs[0].path, lib);
    assert_eq!((defs[0].line, defs[0].start, defs[0].end), (0, 11, 17));

    let refs = index.references_of("helper");
    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].path, main);
    assert_eq!(refs[0].line, 1);
}

#[test]
fn locations_follow_traversal_order() {
    let ws = Workspace::new();
    let main = ws.write("main.osc", "include a\ninclude b\nsubroutine dup\nendsubroutine\n");
    let a = ws.write("a.osc", "subroutine dup\nendsubroutine\n");
    let b = ws.write("b.osc", "subroutine dup\nendsubroutine\n");

    let vocab = Vocabulary::default();
    let index = SubroutineIndexer::new(&vocab).index(&main, None);
    let paths: Vec<_> = index
        .definitions_of("dup")
        .iter()
        .map(|l| l.path.clone())
        .collect();
    assert_eq!(paths, [main, a, b]);
}

#[test]
fn primary_definition_is_smallest_path_then_line() {
    let ws = Workspace::new();
    let main = ws.write("z_main.osc", "include a_lib\nsubroutine x\nendsubroutine\n");
    let lib = ws.write("a_lib.osc", "\n\nsubroutine x\nendsubroutine\nsubroutine x\n");

    let vocab = Vocabulary::default();
    let index = SubroutineIndexer::new(&vocab).index(&main, None);
    let primary = index.primary_definition("x").expect("defined");
    assert_eq!(primary.path, lib);
    assert_eq!(primary.line, 2);
}

#[test]
fn unsaved_root_text_is_indexed() {
    let ws = Workspace::new();
    let main = ws.write("main.osc", "subroutine old\nendsubroutine\n");

    let vocab = Vocabulary::default();
    let index =
        SubroutineIndexer::new(&vocab).index(&main, Some("subroutine new\nendsubroutine\n"));
    assert!(index.is_defined("new"));
    assert!(!index.is_defined("old"));
}

#[test]
fn included_files_use_disk_content() {
    let ws = Workspace::new();
    let main = ws.write("main.osc", "");
    ws.write("lib.osc", "seti $from_disk 1\n");

    let vocab = Vocabulary::default();
    let text = "include lib\nprint $from_disk\n";
    let index = VariableIndexer::new(&vocab).index(&main, Some(text));
    assert!(index.is_defined("from_disk"));
    assert_eq!(index.references_of("from_disk").len(), 1);
}

#[test]
fn assignment_defines_only_first_argument() {
    let ws = Workspace::new();
    let main = ws.write("main.osc", "seti $x 5\nsets $y $x\nuserinput $name \"Who?\"\n");

    let vocab = Vocabulary::default();
    let index = VariableIndexer::new(&vocab).index(&main, None);
    assert_eq!(index.defined_names(), ["name", "x", "y"]);
    assert_eq!(index.references_of("x").len(), 1);
    assert!(index.references_of("y").is_empty());
}

#[test]
fn variable_names_are_case_insensitive() {
    let vocab = Vocabulary::default();
    let index = VariableIndexer::new(&vocab).index(
        Path::new("/unsaved/main.osc"),
        Some("SETI $Count 1\nprint $COUNT $count\n"),
    );
    assert_eq!(index.definitions_of("count").len(), 1);
    assert_eq!(index.references_of("count").len(), 2);
}

#[test]
fn quoted_variables_are_not_symbols() {
    let vocab = Vocabulary::default();
    let index = VariableIndexer::new(&vocab)
        .index(Path::new("/unsaved/main.osc"), Some("print \"$x\" '$y'\n"));
    assert!(index.references.is_empty());
}

#[test]
fn symbol_at_picks_call_target() {
    let vocab = Vocabulary::default();
    let indexer = SubroutineIndexer::new(&vocab);

    let symbol = indexer.symbol_at("  gosub Draw_Frame", 4, 10).expect("symbol");
    assert_eq!(symbol.name, "draw_frame");
    assert_eq!((symbol.span.line, symbol.span.start, symbol.span.end), (4, 8, 18));

    assert!(indexer.symbol_at("  gosub Draw_Frame", 4, 3).is_none());
    assert!(indexer.symbol_at("print Draw_Frame", 0, 8).is_none());
}

#[test]
fn symbol_at_picks_any_variable() {
    let vocab = Vocabulary::default();
    let indexer = VariableIndexer::new(&vocab);

    let symbol = indexer.symbol_at("if $a eq $B", 2, 10).expect("symbol");
    assert_eq!(symbol.name, "b");
    assert!(indexer.symbol_at("if $a eq $B", 2, 6).is_none());
}

#[test]
fn indexer_kinds() {
    assert_eq!(SubroutineIndexer::KIND, SymbolKind::Subroutine);
    assert_eq!(VariableIndexer::KIND, SymbolKind::Variable);
}
