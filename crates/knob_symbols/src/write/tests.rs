use std::rc::Rc;

use pretty_assertions::assert_eq;

use super::*;
use crate::{Arity, FunctionEntry, Linked};

fn write_to_string(table: &SymbolTable, id: EntryId, prefix: &str, column: usize) -> String {
    let mut buf = Vec::new();
    table.write(id, &mut buf, prefix, column).unwrap();
    String::from_utf8(buf).unwrap()
}

fn noop() -> FunctionEntry {
    FunctionEntry::new(
        Arity::Variadic,
        Rc::new(|table: &mut SymbolTable, _: &[EntryId]| -> Result<EntryId, crate::CallError> {
            Ok(table.make_temp(0.0))
        }),
    )
}

#[test]
fn scalar_without_description() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let x = table.add_value_var(root, "x", "").unwrap();
    table.set_value(x, 2.5).unwrap();
    assert_eq!(write_to_string(&table, x, "", 40), "x = 2.5;\n");
}

#[test]
fn scalar_comment_is_aligned() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let size = table.add_value_var(root, "size", "Number of organisms").unwrap();
    table.set_value(size, 100.0).unwrap();
    assert_eq!(
        write_to_string(&table, size, "", DEFAULT_COMMENT_COLUMN),
        format!("{:<40}// Number of organisms\n", "size = 100;")
    );
}

#[test]
fn long_value_keeps_one_space_before_comment() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let label = table.add_string_var(root, "label", "desc").unwrap();
    table.set_string(label, "a long label").unwrap();
    assert_eq!(
        write_to_string(&table, label, "", 10),
        "label = a long label; // desc\n"
    );
}

#[test]
fn default_text_wins_over_live_value() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let var = Linked::new(0_i32);
    let id = table.link_var(root, "n", &var, "", 3).unwrap();
    var.set(5);
    assert_eq!(write_to_string(&table, id, "", 40), "n = 3;\n");

    table.update_default(root);
    assert_eq!(write_to_string(&table, id, "", 40), "n = 5;\n");
}

#[test]
fn nested_scopes_indent_and_close() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let pop = table.add_scope(root, "pop", "Population settings", "Population").unwrap();
    let size = table.add_value_var(pop, "size", "").unwrap();
    table.set_value(size, 100.0).unwrap();
    let inner = table.add_scope(pop, "inner", "", "").unwrap();
    table.add_string_var(inner, "tag", "").unwrap();

    let expected = format!(
        "{:<40}// Population settings\n  size = 100;\n  inner = {{ \n    tag = ;\n  }}\n}}\n",
        "pop = { "
    );
    assert_eq!(write_to_string(&table, pop, "", 40), expected);
}

#[test]
fn prefix_is_applied_to_every_line() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let pop = table.add_scope(root, "pop", "", "").unwrap();
    table.add_value_var(pop, "size", "").unwrap();
    assert_eq!(
        write_to_string(&table, pop, "    ", 40),
        "    pop = { \n      size = 0;\n    }\n"
    );
}

#[test]
fn functions_and_builtins_are_not_written() {
    let mut table = SymbolTable::new();
    let root = table.root();
    table.add_value_var(root, "a", "").unwrap();
    table.define_function(root, "f", noop(), "does nothing").unwrap();
    table.define_builtin_function(root, "g", noop(), "").unwrap();
    table.add_value_var(root, "b", "").unwrap();
    assert_eq!(table.to_config_string(root), "a = 0;\nb = 0;\n");
}

#[test]
fn contents_follow_insertion_order() {
    let mut table = SymbolTable::new();
    let root = table.root();
    for name in ["zeta", "alpha", "mid"] {
        table.add_value_var(root, name, "").unwrap();
    }
    assert_eq!(
        table.to_config_string(root),
        "zeta = 0;\nalpha = 0;\nmid = 0;\n"
    );
}
