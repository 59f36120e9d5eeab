//! Error types for entry access, tree edits and function calls.
//!
//! Three families, split by who is expected to handle them:
//!
//! - [`EntryError`]: a scalar read or write the entry cannot perform.
//! - [`SymbolError`]: a registration or tree edit that would break a
//!   scope invariant.
//! - [`CallError`]: a recoverable failure while invoking a bound function.
//!   These are script-author mistakes and go to the error channel.
//!
//! Broken internal state (a stale handle, a member function wired to the
//! wrong receiver type) is not represented here; it panics.

use crate::ValueKind;

/// Failure reading or writing an entry's scalar value.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EntryError {
    /// The entry's variant has no such operation (e.g. a numeric read on a scope).
    #[error("entry '{name}' ({kind}) does not support {op}")]
    Unsupported {
        name: String,
        kind: ValueKind,
        op: &'static str,
    },
    /// Text could not be parsed into the storage type.
    #[error("cannot read '{text}' as {target}")]
    Parse { text: String, target: &'static str },
    /// A number that does not fit the integer type it is read into.
    #[error("{text} is out of range for {target}")]
    OutOfRange { text: String, target: &'static str },
}

impl EntryError {
    pub(crate) fn unsupported(name: &str, kind: ValueKind, op: &'static str) -> Self {
        EntryError::Unsupported {
            name: name.to_string(),
            kind,
            op,
        }
    }

    pub(crate) fn parse(text: &str, target: &'static str) -> Self {
        EntryError::Parse {
            text: text.to_string(),
            target,
        }
    }
}

/// Failure registering or rearranging entries.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SymbolError {
    #[error("'{name}' is already defined in scope '{scope}'")]
    DuplicateName { name: String, scope: String },
    #[error("entry '{name}' is not a scope")]
    NotAScope { name: String },
    #[error("entry '{name}' is not a temporary")]
    NotTemporary { name: String },
    #[error("entry '{name}' already belongs to a scope")]
    AlreadyAttached { name: String },
    #[error("cannot place scope '{name}' inside itself")]
    WouldCycle { name: String },
    #[error("the root scope cannot be moved or removed")]
    RootScope,
    /// The empty name is reserved for temporaries and self-lookup.
    #[error("registered entries need a name")]
    EmptyName,
}

/// Recoverable failure invoking a bound function.
///
/// The call is aborted without a result; the driver surfaces the message to
/// the script author.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("call to '{name}' has wrong number of arguments: expected {expected}, received {received}")]
    ArityMismatch {
        name: String,
        expected: usize,
        received: usize,
    },
    #[error("call to '{name}': argument {position} is not a valid {expected}: {source}")]
    ArgumentType {
        name: String,
        /// 1-based argument position.
        position: usize,
        expected: &'static str,
        source: EntryError,
    },
    #[error("'{name}' is not a function")]
    NotCallable { name: String },
    #[error("call to '{name}' re-entered an object that is already in use")]
    Reentrant { name: String },
}

impl CallError {
    /// Name of the function the failed call targeted.
    pub fn function_name(&self) -> &str {
        match self {
            Self::ArityMismatch { name, .. }
            | Self::ArgumentType { name, .. }
            | Self::NotCallable { name }
            | Self::Reentrant { name } => name,
        }
    }
}
