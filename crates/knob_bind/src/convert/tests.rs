use pretty_assertions::assert_eq;

use super::*;

#[test]
fn numbers_read_from_numeric_and_text_entries() {
    let mut table = SymbolTable::new();
    let n = table.make_temp(3.75);
    let s = table.make_temp("12");
    assert_eq!(f64::from_arg(&table, n).unwrap(), 3.75);
    assert_eq!(i32::from_arg(&table, n).unwrap(), 3);
    assert_eq!(u64::from_arg(&table, s).unwrap(), 12);
}

#[test]
fn number_from_non_numeric_text_fails() {
    let mut table = SymbolTable::new();
    let s = table.make_temp("twelve");
    assert!(matches!(
        f64::from_arg(&table, s),
        Err(EntryError::Parse { .. })
    ));
}

#[test]
fn large_integers_convert_exactly() {
    let mut table = SymbolTable::new();
    let big = table.make_temp("9007199254740993");
    assert_eq!(u64::from_arg(&table, big).unwrap(), 9_007_199_254_740_993);
    let neg = table.make_temp("-9007199254740993");
    assert_eq!(i64::from_arg(&table, neg).unwrap(), -9_007_199_254_740_993);
}

#[test]
fn integers_reject_values_outside_their_range() {
    let mut table = SymbolTable::new();
    let negative = table.make_temp(-5.0);
    let huge = table.make_temp(300.0);
    let infinite = table.make_temp("inf");
    assert_eq!(
        u64::from_arg(&table, negative),
        Err(EntryError::OutOfRange {
            text: "-5".to_string(),
            target: "u64",
        })
    );
    assert!(matches!(u8::from_arg(&table, huge), Err(EntryError::OutOfRange { .. })));
    assert!(matches!(i32::from_arg(&table, infinite), Err(EntryError::OutOfRange { .. })));
    assert_eq!(i8::from_arg(&table, negative).unwrap(), -5);
}

#[test]
fn bool_accepts_words_and_numbers() {
    let mut table = SymbolTable::new();
    let yes = table.make_temp("true");
    let one = table.make_temp(1.0);
    let zero = table.make_temp(0.0);
    assert!(bool::from_arg(&table, yes).unwrap());
    assert!(bool::from_arg(&table, one).unwrap());
    assert!(!bool::from_arg(&table, zero).unwrap());
}

#[test]
fn string_reads_any_scalar() {
    let mut table = SymbolTable::new();
    let n = table.make_temp(2.0);
    assert_eq!(String::from_arg(&table, n).unwrap(), "2");
    assert!(String::from_arg(&table, table.root()).is_err());
}

#[test]
fn entry_id_passes_through() {
    let table = SymbolTable::new();
    assert_eq!(EntryId::from_arg(&table, table.root()).unwrap(), table.root());
}

#[test]
fn returns_become_temporaries() {
    let mut table = SymbolTable::new();
    let n = 7_u8.into_return(&mut table).unwrap();
    let b = true.into_return(&mut table).unwrap();
    let s = "hi".into_return(&mut table).unwrap();
    let u = ().into_return(&mut table).unwrap();
    assert_eq!(table.as_double(n).unwrap(), 7.0);
    assert_eq!(table.as_double(b).unwrap(), 1.0);
    assert_eq!(table.as_string(s).unwrap(), "hi");
    assert_eq!(table.as_string(u).unwrap(), "");
    for id in [n, b, s, u] {
        assert!(table.entry(id).is_temporary());
    }
}

#[test]
fn entry_return_is_not_copied() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let before = table.len();
    assert_eq!(root.into_return(&mut table).unwrap(), root);
    assert_eq!(table.len(), before);
}

#[test]
fn err_return_fails_the_call() {
    let mut table = SymbolTable::new();
    let failed: Result<f64, CallError> = Err(CallError::NotCallable {
        name: "f".to_string(),
    });
    assert!(failed.into_return(&mut table).is_err());
    let ok: Result<f64, CallError> = Ok(1.0);
    assert!(ok.into_return(&mut table).is_ok());
}

#[test]
fn convert_arg_reports_one_based_position() {
    let mut table = SymbolTable::new();
    let a = table.make_temp(1.0);
    let b = table.make_temp("x");
    let err = convert_arg::<f64>(&table, "add", &[a, b], 1).unwrap_err();
    assert!(matches!(
        err,
        CallError::ArgumentType {
            position: 2,
            expected: "number",
            ..
        }
    ));
}

#[test]
fn check_arity_compares_counts() {
    assert!(check_arity("f", 0, &[]).is_ok());
    assert_eq!(
        check_arity("f", 2, &[]),
        Err(CallError::ArityMismatch {
            name: "f".to_string(),
            expected: 2,
            received: 0,
        })
    );
}
