//! Binding free functions.
//!
//! Any `Fn(A1, .., An) -> R` (up to six parameters) whose parameters
//! implement [`FromArg`] and whose return implements [`IntoReturn`] becomes
//! a uniform [`NativeFn`]. The generated callable checks the argument count,
//! converts each handle in order, calls the function and wraps the result.
//!
//! The `Shape` parameter on [`IntoHostFn`] only exists to keep the impls for
//! different arities apart; callers never name it.
//!
//! Functions that want the raw argument list go through [`variadic`].

use std::marker::PhantomData;
use std::rc::Rc;

use knob_symbols::{Arity, CallError, EntryId, FunctionEntry, NativeFn, SymbolError, SymbolTable};

use crate::convert::{check_arity, convert_arg, FromArg, IntoReturn};

/// A host function that can be bound into a symbol table.
pub trait IntoHostFn<Shape>: 'static {
    fn arity(&self) -> Arity;

    /// Build the uniform callable; `name` is used in call errors.
    fn into_native(self, name: &str) -> NativeFn;
}

macro_rules! impl_into_host_fn {
    ($count:literal; $($arg:ident => $idx:tt),*) => {
        impl<F, R, $($arg,)*> IntoHostFn<(R, $($arg,)*)> for F
        where
            F: Fn($($arg),*) -> R + 'static,
            R: IntoReturn,
            $($arg: FromArg,)*
        {
            fn arity(&self) -> Arity {
                Arity::Fixed($count)
            }

            fn into_native(self, name: &str) -> NativeFn {
                let name = name.to_string();
                Rc::new(
                    move |table: &mut SymbolTable, args: &[EntryId]| -> Result<EntryId, CallError> {
                        check_arity(&name, $count, args)?;
                        let result = (self)($(convert_arg::<$arg>(table, &name, args, $idx)?),*);
                        result.into_return(table)
                    },
                )
            }
        }
    };
}

impl_into_host_fn!(0;);
impl_into_host_fn!(1; A1 => 0);
impl_into_host_fn!(2; A1 => 0, A2 => 1);
impl_into_host_fn!(3; A1 => 0, A2 => 1, A3 => 2);
impl_into_host_fn!(4; A1 => 0, A2 => 1, A3 => 2, A4 => 3);
impl_into_host_fn!(5; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4);
impl_into_host_fn!(6; A1 => 0, A2 => 1, A3 => 2, A4 => 3, A5 => 4, A6 => 5);

/// A function taking the raw argument handles. Build with [`variadic`].
pub struct Variadic<F>(F);

/// Shape marker for [`Variadic`] bindings.
pub struct VariadicShape<R>(PhantomData<R>);

/// Wrap a function that receives every argument handle unconverted.
///
/// The function may read the arguments through the table and decides for
/// itself what counts as a bad call.
pub fn variadic<F, R>(f: F) -> Variadic<F>
where
    F: Fn(&mut SymbolTable, &[EntryId]) -> R + 'static,
    R: IntoReturn,
{
    Variadic(f)
}

impl<F, R> IntoHostFn<VariadicShape<R>> for Variadic<F>
where
    F: Fn(&mut SymbolTable, &[EntryId]) -> R + 'static,
    R: IntoReturn,
{
    fn arity(&self) -> Arity {
        Arity::Variadic
    }

    fn into_native(self, _: &str) -> NativeFn {
        let Variadic(f) = self;
        Rc::new(
            move |table: &mut SymbolTable, args: &[EntryId]| -> Result<EntryId, CallError> {
                f(table, args).into_return(table)
            },
        )
    }
}

/// Bind a host function as a function entry payload.
pub fn bind_function<Shape, F: IntoHostFn<Shape>>(name: &str, f: F) -> FunctionEntry {
    let arity = f.arity();
    FunctionEntry::new(arity, f.into_native(name))
}

/// Function registration on a [`SymbolTable`].
pub trait FunctionScope {
    /// Bind `f` and register it in `scope`.
    fn add_function<Shape, F: IntoHostFn<Shape>>(
        &mut self,
        scope: EntryId,
        name: &str,
        f: F,
        description: &str,
    ) -> Result<EntryId, SymbolError>;

    /// Bind `f` and register it in `scope` as a builtin (never serialized).
    fn add_builtin_function<Shape, F: IntoHostFn<Shape>>(
        &mut self,
        scope: EntryId,
        name: &str,
        f: F,
        description: &str,
    ) -> Result<EntryId, SymbolError>;
}

impl FunctionScope for SymbolTable {
    fn add_function<Shape, F: IntoHostFn<Shape>>(
        &mut self,
        scope: EntryId,
        name: &str,
        f: F,
        description: &str,
    ) -> Result<EntryId, SymbolError> {
        let function = bind_function(name, f);
        self.define_function(scope, name, function, description)
    }

    fn add_builtin_function<Shape, F: IntoHostFn<Shape>>(
        &mut self,
        scope: EntryId,
        name: &str,
        f: F,
        description: &str,
    ) -> Result<EntryId, SymbolError> {
        let function = bind_function(name, f);
        self.define_builtin_function(scope, name, function, description)
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
