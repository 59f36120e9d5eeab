use std::cell::Cell;

use knob_symbols::{buffer_channel, EntryError};
use pretty_assertions::assert_eq;

use super::*;

fn call(table: &mut SymbolTable, f: EntryId, args: &[EntryId]) -> Result<EntryId, CallError> {
    table.invoke(f, args)
}

#[test]
fn binds_each_fixed_arity() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let zero = table.add_function(root, "pi", || 3.5_f64, "").unwrap();
    let two = table.add_function(root, "add", |a: f64, b: f64| a + b, "").unwrap();
    let six = table
        .add_function(
            root,
            "sum6",
            |a: i32, b: i32, c: i32, d: i32, e: i32, f: i32| a + b + c + d + e + f,
            "",
        )
        .unwrap();

    assert_eq!(table.arity(zero), Some(Arity::Fixed(0)));
    assert_eq!(table.arity(six), Some(Arity::Fixed(6)));

    let r = call(&mut table, zero, &[]).unwrap();
    assert_eq!(table.as_double(r).unwrap(), 3.5);

    let (a, b) = (table.make_temp(2.0), table.make_temp(40.0));
    let r = call(&mut table, two, &[a, b]).unwrap();
    assert_eq!(table.as_double(r).unwrap(), 42.0);

    let args: Vec<EntryId> = (1..=6).map(|n| table.make_temp(f64::from(n))).collect();
    let r = call(&mut table, six, &args).unwrap();
    assert_eq!(table.as_double(r).unwrap(), 21.0);
}

#[test]
fn wrong_argument_count_is_a_call_error() {
    let mut table = SymbolTable::new();
    let channel = buffer_channel();
    table.set_error_channel(channel.clone());
    let root = table.root();
    let add = table.add_function(root, "add", |a: f64, b: f64| a + b, "").unwrap();
    let a = table.make_temp(1.0);

    let err = call(&mut table, add, &[a]).unwrap_err();
    assert_eq!(
        err,
        CallError::ArityMismatch {
            name: "add".to_string(),
            expected: 2,
            received: 1,
        }
    );
    assert_eq!(
        channel.messages(),
        vec!["call to 'add' has wrong number of arguments: expected 2, received 1"]
    );
}

#[test]
fn host_function_not_called_on_bad_arguments() {
    let calls = Rc::new(Cell::new(0));
    let counter = Rc::clone(&calls);
    let mut table = SymbolTable::new();
    table.set_error_channel(knob_symbols::silent_channel());
    let root = table.root();
    let f = table
        .add_function(
            root,
            "scale",
            move |x: f64, label: String| {
                counter.set(counter.get() + 1);
                format!("{label}:{x}")
            },
            "",
        )
        .unwrap();

    let bad = table.make_temp("not a number");
    let label = table.make_temp("size");
    let err = call(&mut table, f, &[bad, label]).unwrap_err();
    assert!(matches!(
        err,
        CallError::ArgumentType {
            position: 1,
            source: EntryError::Parse { .. },
            ..
        }
    ));
    assert_eq!(calls.get(), 0);

    let x = table.make_temp(2.0);
    let r = call(&mut table, f, &[x, label]).unwrap();
    assert_eq!(table.as_string(r).unwrap(), "size:2");
    assert_eq!(calls.get(), 1);
}

#[test]
fn string_result_is_a_string_temporary() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let f = table
        .add_function(root, "concat", |a: String, b: String| a + &b, "")
        .unwrap();
    let (a, b) = (table.make_temp("ab"), table.make_temp("cd"));
    let r = call(&mut table, f, &[a, b]).unwrap();
    assert_eq!(table.as_string(r).unwrap(), "abcd");
    assert!(table.entry(r).is_temporary());
}

#[test]
fn entry_arguments_pass_through() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let x = table.add_value_var(root, "x", "").unwrap();
    let first = table
        .add_function(root, "first", |a: EntryId, _b: EntryId| a, "")
        .unwrap();
    let t = table.make_temp(0.0);
    let r = call(&mut table, first, &[x, t]).unwrap();
    assert_eq!(r, x);
    assert!(!table.release_if_temporary(r));
}

#[test]
fn variadic_receives_raw_handles() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let max = table
        .add_function(
            root,
            "max",
            variadic(|table: &mut SymbolTable, args: &[EntryId]| {
                args.iter()
                    .filter_map(|&id| table.as_double(id).ok())
                    .fold(f64::NEG_INFINITY, f64::max)
            }),
            "",
        )
        .unwrap();
    assert_eq!(table.arity(max), Some(Arity::Variadic));

    let args = [table.make_temp(3.0), table.make_temp(9.0), table.make_temp(4.0)];
    let r = call(&mut table, max, &args).unwrap();
    assert_eq!(table.as_double(r).unwrap(), 9.0);
}

#[test]
fn host_function_can_fail_the_call() {
    let mut table = SymbolTable::new();
    table.set_error_channel(knob_symbols::silent_channel());
    let root = table.root();
    let f = table
        .add_function(
            root,
            "sqrt",
            |x: f64| {
                if x < 0.0 {
                    Err(CallError::NotCallable {
                        name: "sqrt".to_string(),
                    })
                } else {
                    Ok(x.sqrt())
                }
            },
            "",
        )
        .unwrap();
    let neg = table.make_temp(-1.0);
    assert!(call(&mut table, f, &[neg]).is_err());
    let four = table.make_temp(4.0);
    let r = call(&mut table, f, &[four]).unwrap();
    assert_eq!(table.as_double(r).unwrap(), 2.0);
}

#[test]
fn builtin_functions_are_found_but_not_listed() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let f = table.add_builtin_function(root, "pi", || 3.0_f64, "").unwrap();
    assert!(table.entries(root).is_empty());
    assert_eq!(table.lookup_entry(root, "pi", true), Some(f));
}

#[test]
fn bind_function_without_registering() {
    let function = bind_function("neg", |x: f64| -x);
    assert_eq!(function.arity(), Arity::Fixed(1));
}
