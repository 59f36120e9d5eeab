//! Host variables shared with the symbol table.
//!
//! A linked entry reads and writes a variable that lives in host code. The
//! host keeps one [`Linked<T>`] handle, the entry keeps another; both see the
//! same value. Because the cell is reference counted the variable can never
//! be dropped out from under an entry that still points at it.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::{EntryError, ValueKind};

/// A single-threaded shared cell for a host variable.
///
/// Wraps `Rc<RefCell<T>>`. Clones share the same variable. Not `Send`: the
/// symbol table is driven from one thread.
#[repr(transparent)]
pub struct Linked<T>(Rc<RefCell<T>>);

impl<T> Linked<T> {
    /// Create a new host variable holding `value`.
    #[inline]
    pub fn new(value: T) -> Self {
        Linked(Rc::new(RefCell::new(value)))
    }

    /// Borrow the variable immutably.
    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    /// Borrow the variable mutably.
    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    /// Replace the value, returning the old one.
    #[inline]
    pub fn set(&self, value: T) -> T {
        self.0.replace(value)
    }

    /// Returns `true` if both handles point at the same variable.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl<T: Clone> Linked<T> {
    /// Copy the current value out.
    #[inline]
    pub fn get(&self) -> T {
        self.0.borrow().clone()
    }
}

impl<T: LinkedValue> Linked<T> {
    pub(crate) fn target(&self) -> Rc<dyn LinkTarget> {
        // Rc<RefCell<T>> unsizes to Rc<dyn LinkTarget>
        self.0.clone()
    }
}

impl<T> Clone for Linked<T> {
    #[inline]
    fn clone(&self) -> Self {
        Linked(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Linked<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Linked").field(&self.0.borrow()).finish()
    }
}

impl<T: Default> Default for Linked<T> {
    fn default() -> Self {
        Linked::new(T::default())
    }
}

/// Scalar host types that can back a linked entry.
///
/// Numeric writes go through `f64`, the common currency of the script layer;
/// integer targets truncate (and saturate at their bounds). Strings keep
/// their text untouched and only parse when read as a number.
pub trait LinkedValue: Clone + 'static {
    /// Kind reported by entries linked to this type.
    const KIND: ValueKind;

    fn to_f64(&self) -> Result<f64, EntryError>;
    fn from_f64(value: f64) -> Self;
    fn to_text(&self) -> String;
    fn from_text(text: &str) -> Result<Self, EntryError>;
}

/// Parse a number from entry text, ignoring surrounding whitespace.
pub(crate) fn parse_number(text: &str) -> Result<f64, EntryError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| EntryError::parse(text, "number"))
}

/// Format a number the way entries print it (`3`, not `3.0`).
pub(crate) fn format_number(value: f64) -> String {
    value.to_string()
}

macro_rules! impl_linked_number {
    ($kind:expr => $($ty:ty),* $(,)?) => {$(
        impl LinkedValue for $ty {
            const KIND: ValueKind = $kind;

            #[allow(
                clippy::cast_precision_loss,
                clippy::cast_lossless,
                clippy::unnecessary_cast
            )]
            fn to_f64(&self) -> Result<f64, EntryError> {
                Ok(*self as f64)
            }

            #[allow(
                clippy::cast_possible_truncation,
                clippy::cast_sign_loss,
                clippy::cast_precision_loss,
                clippy::unnecessary_cast
            )]
            fn from_f64(value: f64) -> Self {
                value as $ty
            }

            fn to_text(&self) -> String {
                self.to_string()
            }

            /// Exact parse first; text like `2.5` or `1e3` goes through `f64`.
            fn from_text(text: &str) -> Result<Self, EntryError> {
                text.trim()
                    .parse::<$ty>()
                    .or_else(|_| parse_number(text).map(Self::from_f64))
            }
        }
    )*};
}

impl_linked_number!(ValueKind::Int => i8, i16, i32, i64, isize);
impl_linked_number!(ValueKind::Unsigned => u8, u16, u32, u64, usize);
impl_linked_number!(ValueKind::Double => f32, f64);

impl LinkedValue for bool {
    const KIND: ValueKind = ValueKind::Bool;

    fn to_f64(&self) -> Result<f64, EntryError> {
        Ok(if *self { 1.0 } else { 0.0 })
    }

    fn from_f64(value: f64) -> Self {
        value != 0.0
    }

    fn to_text(&self) -> String {
        self.to_string()
    }

    fn from_text(text: &str) -> Result<Self, EntryError> {
        match text.trim() {
            "true" => Ok(true),
            "false" => Ok(false),
            other => parse_number(other)
                .map(Self::from_f64)
                .map_err(|_| EntryError::parse(text, "bool")),
        }
    }
}

impl LinkedValue for String {
    const KIND: ValueKind = ValueKind::String;

    fn to_f64(&self) -> Result<f64, EntryError> {
        parse_number(self)
    }

    fn from_f64(value: f64) -> Self {
        format_number(value)
    }

    fn to_text(&self) -> String {
        self.clone()
    }

    fn from_text(text: &str) -> Result<Self, EntryError> {
        Ok(text.to_string())
    }
}

/// Type-erased access to a host variable or accessor pair.
pub(crate) trait LinkTarget {
    fn kind(&self) -> ValueKind;
    fn as_double(&self) -> Result<f64, EntryError>;
    fn as_string(&self) -> String;
    fn set_value(&self, value: f64);
    fn set_string(&self, text: &str) -> Result<(), EntryError>;
}

impl<T: LinkedValue> LinkTarget for RefCell<T> {
    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn as_double(&self) -> Result<f64, EntryError> {
        self.borrow().to_f64()
    }

    fn as_string(&self) -> String {
        self.borrow().to_text()
    }

    fn set_value(&self, value: f64) {
        *self.borrow_mut() = T::from_f64(value);
    }

    fn set_string(&self, text: &str) -> Result<(), EntryError> {
        let value = T::from_text(text)?;
        *self.borrow_mut() = value;
        Ok(())
    }
}

/// A getter/setter pair standing in for a host variable.
///
/// Used when the "variable" is derived state: reading calls the getter,
/// writing converts and calls the setter.
pub(crate) struct Accessor<T> {
    get: Box<dyn Fn() -> T>,
    set: Box<dyn Fn(T)>,
}

impl<T: LinkedValue> Accessor<T> {
    pub(crate) fn new(get: impl Fn() -> T + 'static, set: impl Fn(T) + 'static) -> Self {
        Accessor {
            get: Box::new(get),
            set: Box::new(set),
        }
    }

    /// Pass `value` straight to the setter.
    pub(crate) fn write(&self, value: T) {
        (self.set)(value);
    }
}

impl<T: LinkedValue> LinkTarget for Accessor<T> {
    fn kind(&self) -> ValueKind {
        T::KIND
    }

    fn as_double(&self) -> Result<f64, EntryError> {
        (self.get)().to_f64()
    }

    fn as_string(&self) -> String {
        (self.get)().to_text()
    }

    fn set_value(&self, value: f64) {
        (self.set)(T::from_f64(value));
    }

    fn set_string(&self, text: &str) -> Result<(), EntryError> {
        (self.set)(T::from_text(text)?);
        Ok(())
    }
}
