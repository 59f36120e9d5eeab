//! Knob Symbols - entries, scopes and the symbol table for configuration trees.
//!
//! Host code declares what can be configured by registering entries in a
//! tree of scopes; a script driver then looks entries up by name, reads and
//! writes them, and invokes bound functions.
//!
//! # Architecture
//!
//! - `SymbolTable`: arena owning every entry, addressed by `EntryId`
//! - `Entry`: shared header plus one value variant (linked host variable,
//!   owned double or string, function, scope)
//! - `Linked<T>`: host-side handle to a variable an entry reads through
//! - `FunctionEntry`: uniform handle-in, handle-out callable; built by
//!   `knob_bind` from typed Rust functions
//! - `ErrorChannel`: where failed calls are reported
//!
//! Lookup is lexical: a scope searches itself, then each enclosing scope.

mod channel;
mod entry;
pub mod errors;
mod id;
mod kind;
mod linked;
mod stack;
mod table;
mod write;

pub use channel::{
    buffer_channel, silent_channel, stderr_channel, BufferChannel, ErrorChannel,
    SharedErrorChannel, StderrChannel,
};
pub use entry::{Arity, Entry, FunctionEntry, NativeFn, Scalar};
pub use errors::{CallError, EntryError, SymbolError};
pub use id::EntryId;
pub use kind::ValueKind;
pub use linked::{Linked, LinkedValue};
pub use table::{SymbolTable, ROOT_NAME};
pub use write::DEFAULT_COMMENT_COLUMN;
