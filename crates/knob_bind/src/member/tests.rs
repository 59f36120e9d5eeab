use knob_symbols::{buffer_channel, silent_channel};
use pretty_assertions::assert_eq;

use super::*;

#[derive(Default)]
struct Counter {
    count: i64,
}

impl Counter {
    fn bump(&mut self, by: i64) -> i64 {
        self.count += by;
        self.count
    }
}

impl Configurable for Counter {}

#[derive(Default)]
struct Other;

impl Configurable for Other {}

fn bump() -> MemberFunction {
    MemberFunction::bind(TypeTag::of::<Counter>(), "bump", Counter::bump).unwrap()
}

#[test]
fn type_tags_distinguish_types() {
    assert_eq!(TypeTag::of::<Counter>(), TypeTag::of::<Counter>());
    assert_ne!(TypeTag::of::<Counter>(), TypeTag::of::<Other>());
    assert!(TypeTag::of::<Counter>().name().ends_with("Counter"));
}

#[test]
fn bound_member_calls_through_receiver() {
    let mut table = SymbolTable::new();
    let mut counter = Counter::default();
    let member = bump();
    assert_eq!(member.arity(), Arity::Fixed(1));

    let by = table.make_temp(5.0);
    let r = member.call(&mut counter, &mut table, &[by]).unwrap();
    assert_eq!(counter.count, 5);
    assert_eq!(table.as_double(r).unwrap(), 5.0);
}

#[test]
fn binding_to_another_type_is_rejected() {
    let err = MemberFunction::bind(TypeTag::of::<Other>(), "bump", Counter::bump).unwrap_err();
    assert!(matches!(
        err,
        BindError::ReceiverMismatch { ref function, .. } if function == "bump"
    ));
}

#[test]
#[should_panic(expected = "called on wrong object type")]
fn calling_on_wrong_object_is_fatal() {
    let mut table = SymbolTable::new();
    let by = table.make_temp(1.0);
    let _ = bump().call(&mut Other, &mut table, &[by]);
}

#[test]
fn member_arity_is_checked() {
    let mut table = SymbolTable::new();
    let mut counter = Counter::default();
    let err = bump().call(&mut counter, &mut table, &[]).unwrap_err();
    assert!(matches!(err, CallError::ArityMismatch { expected: 1, received: 0, .. }));
    assert_eq!(counter.count, 0);
}

#[test]
fn bind_object_makes_a_plain_function() {
    let mut table = SymbolTable::new();
    let root = table.root();
    let object = object_ref(Counter::default());
    let f = table
        .define_function(root, "bump", bump().bind_object(Rc::clone(&object)), "")
        .unwrap();

    for _ in 0..3 {
        let by = table.make_temp(2.0);
        table.invoke(f, &[by]).unwrap();
    }
    assert_eq!(downcast_object::<Counter>(&object).unwrap().count, 6);
    assert!(downcast_object::<Other>(&object).is_none());
}

#[test]
fn zero_argument_member() {
    let member = MemberFunction::bind(TypeTag::of::<Counter>(), "reset", |c: &mut Counter| {
        c.count = 0;
    })
    .unwrap();
    let mut table = SymbolTable::new();
    let mut counter = Counter { count: 9 };
    member.call(&mut counter, &mut table, &[]).unwrap();
    assert_eq!(counter.count, 0);
}

#[test]
fn reentrant_call_is_a_call_error() {
    let mut table = SymbolTable::new();
    let channel = buffer_channel();
    table.set_error_channel(channel.clone());
    let root = table.root();
    let object = object_ref(Counter::default());

    let poke = MemberFunction::bind(
        TypeTag::of::<Counter>(),
        "poke",
        member_variadic(|_: &mut Counter, table: &mut SymbolTable, args: &[EntryId]| {
            table.invoke(args[0], &[])
        }),
    )
    .unwrap();
    assert_eq!(poke.arity(), Arity::Variadic);
    let f = table
        .define_function(root, "poke", poke.bind_object(Rc::clone(&object)), "")
        .unwrap();

    let err = table.invoke(f, &[f]).unwrap_err();
    assert_eq!(
        err,
        CallError::Reentrant {
            name: "poke".to_string()
        }
    );
    assert!(!channel.messages().is_empty());

    // the object is released again afterwards
    table.set_error_channel(silent_channel());
    assert!(downcast_object::<Counter>(&object).is_some());
}
