//! Knob - configuration symbol tables with typed host-function binding.
//!
//! Host programs expose live variables, nested settings and functions to a
//! configuration script through a tree of scopes. This crate re-exports the
//! two layers that make that up:
//!
//! - `knob_symbols`: entries, scopes, the `SymbolTable` arena, text output
//! - `knob_bind`: turning Rust functions and methods into callable entries
//!
//! It also carries a small literal-argument driver and a demo
//! configuration, both used by the `knob` binary.
//!
//! # Tracing
//!
//! Enable with `RUST_LOG=knob_symbols=debug` (registration and calls) or
//! `RUST_LOG=knob_symbols=trace` (lookups too).

pub mod demo;
pub mod driver;

use std::sync::Once;

pub use knob_bind::{
    bind_function, downcast_object, member_variadic, object_ref, variadic, AsAny, BindError,
    Configurable, FromArg, FunctionScope, Instance, IntoHostFn, IntoMemberFn, IntoReturn,
    MemberFunction, MemberInfo, ObjectRef, TypeInfo, TypeRegistry, TypeTag,
};
pub use knob_symbols::{
    buffer_channel, silent_channel, stderr_channel, Arity, CallError, Entry, EntryError, EntryId,
    ErrorChannel, FunctionEntry, Linked, LinkedValue, NativeFn, Scalar, SharedErrorChannel,
    SymbolError, SymbolTable, ValueKind, DEFAULT_COMMENT_COLUMN,
};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times. Does nothing
/// unless `RUST_LOG` is set.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(tracing_tree::HierarchicalLayer::new(2).with_targets(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}
