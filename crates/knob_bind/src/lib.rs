//! Knob Bind - typed function binding for knob symbol tables.
//!
//! Turns ordinary Rust functions into the uniform handle-in, handle-out
//! callables a [`SymbolTable`](knob_symbols::SymbolTable) stores:
//!
//! - Free functions: [`bind_function`], or [`FunctionScope::add_function`]
//!   to bind and register in one step
//! - Raw argument lists: [`variadic`]
//! - Member functions of host objects: [`MemberFunction`], usually through a
//!   [`TypeRegistry`] that also creates instances
//!
//! Parameters convert through [`FromArg`]; returns through [`IntoReturn`].
//! Wrong argument counts and unconvertible arguments become
//! [`CallError`](knob_symbols::CallError)s at call time.
//!
//! ```text
//! table.add_function(root, "add", |a: f64, b: f64| a + b, "Sum two numbers")?;
//!
//! registry.register_type::<Population>("Population", "A group of organisms")?;
//! registry.add_member_function("Population", "grow", Population::grow, "Add organisms")?;
//! let pop = registry.instantiate("Population", &mut table, root, "pop", "")?;
//! ```

mod convert;
mod errors;
mod function;
mod member;
mod registry;

pub use convert::{FromArg, IntoReturn};
pub use errors::BindError;
pub use function::{bind_function, variadic, FunctionScope, IntoHostFn, Variadic, VariadicShape};
pub use member::{
    downcast_object, member_variadic, object_ref, AsAny, Configurable, IntoMemberFn,
    MemberFunction, MemberVariadic, MemberVariadicShape, ObjectRef, TypeTag,
};
pub use registry::{Instance, MemberInfo, TypeInfo, TypeRegistry};
