//! Conversions between entry handles and Rust values.
//!
//! [`FromArg`] reads a parameter out of an argument entry; [`IntoReturn`]
//! turns a return value into a result handle. A host function can be bound
//! only if every parameter type implements the first and its return type
//! implements the second.

use knob_symbols::{CallError, EntryError, EntryId, LinkedValue, SymbolTable};

/// A parameter type a bound function can take.
pub trait FromArg: Sized {
    /// Name of the expected value, used in argument errors.
    const EXPECTED: &'static str;

    fn from_arg(table: &SymbolTable, id: EntryId) -> Result<Self, EntryError>;
}

macro_rules! impl_from_arg_float {
    ($($ty:ty),* $(,)?) => {$(
        impl FromArg for $ty {
            const EXPECTED: &'static str = "number";

            fn from_arg(table: &SymbolTable, id: EntryId) -> Result<Self, EntryError> {
                table.as_double(id).map(<$ty as LinkedValue>::from_f64)
            }
        }
    )*};
}

/// Integers parse the argument's text exactly when they can, so values past
/// 2^53 survive. Otherwise the numeric value is truncated toward zero; values
/// outside the type's range, or not finite, are rejected.
macro_rules! impl_from_arg_int {
    ($($ty:ty),* $(,)?) => {$(
        impl FromArg for $ty {
            const EXPECTED: &'static str = stringify!($ty);

            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss,
                clippy::cast_lossless
            )]
            fn from_arg(table: &SymbolTable, id: EntryId) -> Result<Self, EntryError> {
                if let Ok(Ok(value)) = table.as_string(id).map(|text| text.trim().parse::<$ty>()) {
                    return Ok(value);
                }
                let value = table.as_double(id)?.trunc();
                if value.is_finite() && value >= <$ty>::MIN as f64 && value < <$ty>::MAX as f64 + 1.0 {
                    Ok(value as $ty)
                } else {
                    Err(EntryError::OutOfRange {
                        text: table.as_string(id)?,
                        target: stringify!($ty),
                    })
                }
            }
        }
    )*};
}

impl_from_arg_float!(f32, f64);
impl_from_arg_int!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl FromArg for bool {
    const EXPECTED: &'static str = "bool";

    fn from_arg(table: &SymbolTable, id: EntryId) -> Result<Self, EntryError> {
        let text = table.as_string(id)?;
        bool::from_text(&text)
    }
}

impl FromArg for String {
    const EXPECTED: &'static str = "string";

    fn from_arg(table: &SymbolTable, id: EntryId) -> Result<Self, EntryError> {
        table.as_string(id)
    }
}

/// The raw handle, for functions that inspect or pass through entries.
impl FromArg for EntryId {
    const EXPECTED: &'static str = "entry";

    fn from_arg(_: &SymbolTable, id: EntryId) -> Result<Self, EntryError> {
        Ok(id)
    }
}

/// A return type a bound function can produce.
///
/// Scalars come back as fresh temporaries. An [`EntryId`] is passed through
/// as is. `Result<R, CallError>` lets a host function fail the call.
///
/// Types without an impl cannot be bound:
///
/// ```compile_fail
/// use knob_bind::bind_function;
///
/// struct Opaque;
/// let _ = bind_function("make", || Opaque);
/// ```
pub trait IntoReturn {
    fn into_return(self, table: &mut SymbolTable) -> Result<EntryId, CallError>;
}

macro_rules! impl_into_return_number {
    ($($ty:ty),* $(,)?) => {$(
        impl IntoReturn for $ty {
            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_lossless,
                clippy::unnecessary_cast
            )]
            fn into_return(self, table: &mut SymbolTable) -> Result<EntryId, CallError> {
                Ok(table.make_temp(self as f64))
            }
        }
    )*};
}

impl_into_return_number!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize, f32, f64);

impl IntoReturn for bool {
    fn into_return(self, table: &mut SymbolTable) -> Result<EntryId, CallError> {
        Ok(table.make_temp(if self { 1.0 } else { 0.0 }))
    }
}

impl IntoReturn for String {
    fn into_return(self, table: &mut SymbolTable) -> Result<EntryId, CallError> {
        Ok(table.make_temp(self))
    }
}

impl IntoReturn for &'static str {
    fn into_return(self, table: &mut SymbolTable) -> Result<EntryId, CallError> {
        Ok(table.make_temp(self))
    }
}

/// Unit returns an empty string temporary.
impl IntoReturn for () {
    fn into_return(self, table: &mut SymbolTable) -> Result<EntryId, CallError> {
        Ok(table.make_temp(""))
    }
}

impl IntoReturn for EntryId {
    fn into_return(self, _: &mut SymbolTable) -> Result<EntryId, CallError> {
        Ok(self)
    }
}

impl<R: IntoReturn> IntoReturn for Result<R, CallError> {
    fn into_return(self, table: &mut SymbolTable) -> Result<EntryId, CallError> {
        self.and_then(|value| value.into_return(table))
    }
}

/// Convert argument `index` of a call to `name`.
pub(crate) fn convert_arg<T: FromArg>(
    table: &SymbolTable,
    name: &str,
    args: &[EntryId],
    index: usize,
) -> Result<T, CallError> {
    T::from_arg(table, args[index]).map_err(|source| CallError::ArgumentType {
        name: name.to_string(),
        position: index + 1,
        expected: T::EXPECTED,
        source,
    })
}

pub(crate) fn check_arity(name: &str, expected: usize, args: &[EntryId]) -> Result<(), CallError> {
    if args.len() == expected {
        Ok(())
    } else {
        Err(CallError::ArityMismatch {
            name: name.to_string(),
            expected,
            received: args.len(),
        })
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
