//! Property-based tests for symbol tables.
//!
//! Random scope trees check that:
//! 1. Every registered entry resolves by its dotted path
//! 2. Deep clones are independent of their source
//! 3. Names stay unique within a scope
//! 4. Released temporaries leave the table as it was

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    reason = "Proptest macros generate code with these patterns"
)]

use knob::{EntryId, SymbolError, SymbolTable};
use proptest::prelude::*;

// -- Strategies --

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,6}"
}

/// A tree shape: each node is a list of (name, subtree-or-value).
#[derive(Clone, Debug)]
enum Node {
    Value(f64),
    Scope(Vec<(String, Node)>),
}

fn tree_strategy() -> impl Strategy<Value = Vec<(String, Node)>> {
    let leaf = (-1.0e6..1.0e6_f64).prop_map(Node::Value);
    let node = leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::vec((name_strategy(), inner), 0..4).prop_map(Node::Scope)
    });
    prop::collection::vec((name_strategy(), node), 1..6)
}

/// Build `children` under `scope`, skipping names already taken.
/// Returns (path, id, value) for every scalar that was registered.
fn build(
    table: &mut SymbolTable,
    scope: EntryId,
    prefix: &str,
    children: &[(String, Node)],
    out: &mut Vec<(String, EntryId, f64)>,
) {
    for (name, node) in children {
        if table.get_entry(scope, name).is_some() {
            continue;
        }
        let path = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };
        match node {
            Node::Value(v) => {
                let id = table.add_value_var(scope, name, "").unwrap();
                table.set_value(id, *v).unwrap();
                out.push((path, id, *v));
            }
            Node::Scope(inner) => {
                let id = table.add_scope(scope, name, "", "").unwrap();
                build(table, id, &path, inner, out);
            }
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn registered_entries_resolve_by_path(tree in tree_strategy()) {
        let mut table = SymbolTable::new();
        let root = table.root();
        let mut scalars = Vec::new();
        build(&mut table, root, "", &tree, &mut scalars);

        for (path, id, value) in &scalars {
            prop_assert_eq!(table.lookup_path(root, path), Some(*id));
            prop_assert_eq!(&table.path_of(*id), path);
            prop_assert_eq!(table.as_double(*id).unwrap(), *value);
        }
    }

    #[test]
    fn clones_are_independent(tree in tree_strategy(), bump in 1.0..100.0_f64) {
        let mut table = SymbolTable::new();
        let root = table.root();
        let source = table.add_scope(root, "source", "", "").unwrap();
        let mut scalars = Vec::new();
        build(&mut table, source, "source", &tree, &mut scalars);
        let before = table.to_config_string(source);

        let copy = table.clone_entry(source);
        table.rename(copy, "copy").unwrap();
        table.attach(root, copy).unwrap();
        prop_assert_eq!(table.to_config_string(copy), before.clone());

        for (path, _, value) in &scalars {
            let copied_path = format!("copy{}", &path["source".len()..]);
            let copied = table.lookup_path(root, &copied_path).unwrap();
            table.set_value(copied, value + bump).unwrap();
        }
        prop_assert_eq!(table.to_config_string(source), before);

        table.remove(copy).unwrap();
        for (path, id, _) in &scalars {
            prop_assert_eq!(table.lookup_path(root, path), Some(*id));
        }
    }

    #[test]
    fn duplicate_names_are_rejected(name in name_strategy(), value in any::<f64>()) {
        let mut table = SymbolTable::new();
        let root = table.root();
        table.add_value_var(root, &name, "").unwrap();
        let before = table.len();

        let err = table.add_scope(root, &name, "", "").unwrap_err();
        prop_assert!(
            matches!(err, SymbolError::DuplicateName { .. }),
            "unexpected error: {err}"
        );
        let temp = table.make_temp(value);
        let err = table.add_string_var(root, &name, "").unwrap_err();
        prop_assert!(
            matches!(err, SymbolError::DuplicateName { .. }),
            "unexpected error: {err}"
        );
        table.release(temp).unwrap();
        prop_assert_eq!(table.len(), before);
    }

    #[test]
    fn released_temporaries_are_reused(values in prop::collection::vec(any::<f64>(), 1..16)) {
        let mut table = SymbolTable::new();
        let before = table.len();

        let first: Vec<EntryId> = values.iter().map(|&v| table.make_temp(v)).collect();
        for &id in &first {
            table.release(id).unwrap();
        }
        prop_assert_eq!(table.len(), before);

        let mut second: Vec<EntryId> = values.iter().map(|&v| table.make_temp(v)).collect();
        let mut first_sorted = first.clone();
        first_sorted.sort();
        second.sort();
        prop_assert_eq!(first_sorted, second);
    }
}
