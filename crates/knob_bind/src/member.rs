//! Binding member functions of configurable host objects.
//!
//! A member function is written against a concrete receiver type
//! (`Fn(&mut Population, u64) -> R`) and stored type-erased, tagged with the
//! receiver's [`TypeTag`]. Binding checks the tag against the function's
//! receiver type once, up front. At call time the object is downcast again;
//! a mismatch there means the table was wired up wrong and is fatal.

use std::any::{type_name, Any, TypeId};
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use knob_symbols::{Arity, CallError, EntryId, FunctionEntry, SymbolError, SymbolTable};

use crate::convert::{check_arity, convert_arg, FromArg, IntoReturn};
use crate::BindError;

/// Runtime identity of a receiver type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    pub fn of<T: 'static>() -> Self {
        TypeTag {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Rust type name, for messages only.
    pub fn name(&self) -> &'static str {
        self.name
    }
}

/// Upcast to `Any` for downcasting trait objects.
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// A host object that exposes settings and member functions.
pub trait Configurable: AsAny + 'static {
    /// Register this object's settings in its instance scope.
    fn setup_config(&mut self, table: &mut SymbolTable, scope: EntryId) -> Result<(), SymbolError> {
        let _ = (table, scope);
        Ok(())
    }
}

/// Shared handle to a live configurable object.
pub type ObjectRef = Rc<RefCell<dyn Configurable>>;

/// Wrap an object for sharing with the table.
pub fn object_ref<T: Configurable>(object: T) -> ObjectRef {
    Rc::new(RefCell::new(object))
}

/// Borrow a shared object as its concrete type.
///
/// Returns `None` if the object is some other type.
///
/// # Panics
/// Panics if the object is already borrowed (for example from inside one of
/// its own member functions).
pub fn downcast_object<T: 'static>(object: &ObjectRef) -> Option<std::cell::RefMut<'_, T>> {
    std::cell::RefMut::filter_map(object.borrow_mut(), |obj| {
        AsAny::as_any_mut(obj).downcast_mut::<T>()
    })
    .ok()
}

type MemberCall<T> = Rc<dyn Fn(&mut T, &mut SymbolTable, &[EntryId]) -> Result<EntryId, CallError>>;
type ErasedCall = Rc<dyn Fn(&mut dyn Configurable, &mut SymbolTable, &[EntryId]) -> Result<EntryId, CallError>>;

/// A host function with receiver `T` that can be bound as a member.
pub trait IntoMemberFn<T, Shape>: 'static {
    fn arity(&self) -> Arity;
    fn into_member(self, name: &str) -> MemberCall<T>;
}

macro_rules! impl_into_member_fn {
    ($count:literal; $($arg:ident => $idx:tt),*) => {
        impl<T, F, R, $($arg,)*> IntoMemberFn<T, (R, $($arg,)*)> for F
        where
            T: 'static,
            F: Fn(&mut T, $($arg),*) -> R + 'static,
            R: IntoReturn,
            $($arg: FromArg,)*
        {
            fn arity(&self) -> Arity {
                Arity::Fixed($count)
            }

            fn into_member(self, name: &str) -> MemberCall<T> {
                let name = name.to_string();
                Rc::new(
                    move |receiver: &mut T, table: &mut SymbolTable, args: &[EntryId]|
                        -> Result<EntryId, CallError>
                    {
                        check_arity(&name, $count, args)?;
                        let result =
                            (self)(receiver, $(convert_arg::<$arg>(table, &name, args, $idx)?),*);
                        result.into_return(table)
                    },
                )
            }
        }
    };
}

impl_into_member_fn!(0;);
impl_into_member_fn!(1; A1 => 0);
impl_into_member_fn!(2; A1 => 0, A2 => 1);
impl_into_member_fn!(3; A1 => 0, A2 => 1, A3 => 2);
impl_into_member_fn!(4; A1 => 0, A2 => 1, A3 => 2, A4 => 3);
impl_into_member_fn!(5; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4);

/// A member function taking the raw argument handles.
pub struct MemberVariadic<F>(F);

/// Shape marker for [`MemberVariadic`] bindings.
pub struct MemberVariadicShape<R>(PhantomData<R>);

/// Wrap a member function that receives every argument handle unconverted.
pub fn member_variadic<T, F, R>(f: F) -> MemberVariadic<F>
where
    F: Fn(&mut T, &mut SymbolTable, &[EntryId]) -> R + 'static,
    R: IntoReturn,
{
    MemberVariadic(f)
}

impl<T, F, R> IntoMemberFn<T, MemberVariadicShape<R>> for MemberVariadic<F>
where
    T: 'static,
    F: Fn(&mut T, &mut SymbolTable, &[EntryId]) -> R + 'static,
    R: IntoReturn,
{
    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    fn into_member(self, _: &str) -> MemberCall<T> {
        let MemberVariadic(f) = self;
        Rc::new(
            move |receiver: &mut T, table: &mut SymbolTable, args: &[EntryId]|
                -> Result<EntryId, CallError>
            {
                f(receiver, table, args).into_return(table)
            },
        )
    }
}

/// A member function bound to a receiver type, not yet to an object.
#[derive(Clone)]
pub struct MemberFunction {
    name: String,
    tag: TypeTag,
    arity: Arity,
    call: ErasedCall,
}

impl MemberFunction {
    /// Bind `f` as a member of the type identified by `tag`.
    ///
    /// Fails if `f`'s receiver is not that type.
    pub fn bind<T, Shape, F>(tag: TypeTag, name: &str, f: F) -> Result<Self, BindError>
    where
        T: 'static,
        F: IntoMemberFn<T, Shape>,
    {
        let found = TypeTag::of::<T>();
        if found != tag {
            return Err(BindError::ReceiverMismatch {
                function: name.to_string(),
                expected: tag.name(),
                found: found.name(),
            });
        }

        let arity = f.arity();
        let member = f.into_member(name);
        let fn_name = name.to_string();
        let call: ErasedCall = Rc::new(
            move |object: &mut dyn Configurable, table: &mut SymbolTable, args: &[EntryId]|
                -> Result<EntryId, CallError>
            {
                let Some(receiver) = AsAny::as_any_mut(object).downcast_mut::<T>() else {
                    panic!("internal error: member function '{fn_name}' called on wrong object type");
                };
                member(receiver, table, args)
            },
        );
        Ok(MemberFunction {
            name: name.to_string(),
            tag,
            arity,
            call,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Call on `object`.
    ///
    /// # Panics
    /// Panics if `object` is not of the bound receiver type.
    pub fn call(
        &self,
        object: &mut dyn Configurable,
        table: &mut SymbolTable,
        args: &[EntryId],
    ) -> Result<EntryId, CallError> {
        (self.call)(object, table, args)
    }

    /// Close over a live object, giving a plain function entry payload.
    ///
    /// A call that arrives while the object is already borrowed (a member
    /// calling back into its own object) fails with
    /// [`CallError::Reentrant`].
    pub fn bind_object(&self, object: ObjectRef) -> FunctionEntry {
        let call = Rc::clone(&self.call);
        let name = self.name.clone();
        FunctionEntry::new(
            self.arity,
            Rc::new(
                move |table: &mut SymbolTable, args: &[EntryId]| -> Result<EntryId, CallError> {
                    let Ok(mut receiver) = object.try_borrow_mut() else {
                        return Err(CallError::Reentrant { name: name.clone() });
                    };
                    call(&mut *receiver, table, args)
                },
            ),
        )
    }
}

impl std::fmt::Debug for MemberFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemberFunction")
            .field("name", &self.name)
            .field("receiver", &self.tag.name())
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
