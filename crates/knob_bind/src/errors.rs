//! Binding errors.
//!
//! These are setup-time failures: they come back from registration calls
//! made by host code, never from script calls. Script-time failures are
//! [`CallError`](knob_symbols::CallError)s.

use knob_symbols::SymbolError;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BindError {
    /// A member function was written for a different receiver type than the
    /// one it is being registered on.
    #[error("member function '{function}' takes a {found} receiver but was bound to {expected}")]
    ReceiverMismatch {
        function: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown type '{name}'")]
    UnknownType { name: String },
    #[error("type '{name}' is already registered")]
    DuplicateType { name: String },
    #[error("type '{type_name}' already has a member function '{function}'")]
    DuplicateMember { type_name: String, function: String },
    #[error(transparent)]
    Symbol(#[from] SymbolError),
}
