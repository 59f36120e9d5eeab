//! A minimal script driver.
//!
//! Stands in for a real script front end: argument literals are turned into
//! handles, functions are resolved by dotted path and invoked, and
//! temporaries are released once the result has been read.
//!
//! Literal rules:
//! - anything that parses as a number is a numeric temporary
//! - `"quoted"` text is a string temporary without the quotes
//! - a name that resolves from the calling scope is passed as that entry
//! - anything else is a string temporary

use smallvec::SmallVec;

use knob_symbols::{CallError, EntryError, EntryId, SymbolTable};

#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    #[error("no entry named '{path}'")]
    UnknownEntry { path: String },
    #[error("'{path}' is not a function")]
    NotAFunction { path: String },
    #[error("'{path}' holds no value and cannot be assigned")]
    NotAssignable { path: String },
    #[error("expected `path=value`, found '{text}'")]
    MalformedAssignment { text: String },
    #[error(transparent)]
    Call(#[from] CallError),
    #[error(transparent)]
    Entry(#[from] EntryError),
}

/// An evaluated argument literal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arg {
    /// A temporary the driver created and must release.
    Temp(EntryId),
    /// An existing entry, passed by handle.
    Entry(EntryId),
}

impl Arg {
    pub fn id(self) -> EntryId {
        match self {
            Arg::Temp(id) | Arg::Entry(id) => id,
        }
    }
}

/// Evaluate one argument literal from `scope`.
pub fn eval_literal(table: &mut SymbolTable, scope: EntryId, text: &str) -> Arg {
    if let Ok(n) = text.trim().parse::<f64>() {
        return Arg::Temp(table.make_temp(n));
    }
    if let Some(inner) = text.strip_prefix('"').and_then(|t| t.strip_suffix('"')) {
        return Arg::Temp(table.make_temp(inner));
    }
    match table.lookup_path(scope, text) {
        Some(id) if !text.is_empty() => Arg::Entry(id),
        _ => Arg::Temp(table.make_temp(text)),
    }
}

/// Render a call result: scalars as their value, scopes as config text.
pub fn render(table: &SymbolTable, id: EntryId) -> Result<String, EntryError> {
    if table.entry(id).is_scope() {
        Ok(table.to_config_string(id))
    } else {
        table.as_string(id)
    }
}

/// Resolve `path` from `scope`, call it with `literals` and render the
/// result.
#[tracing::instrument(level = "debug", skip(table, scope))]
pub fn call_path(
    table: &mut SymbolTable,
    scope: EntryId,
    path: &str,
    literals: &[&str],
) -> Result<String, DriverError> {
    let function = table
        .lookup_path(scope, path)
        .ok_or_else(|| DriverError::UnknownEntry {
            path: path.to_string(),
        })?;
    if !table.entry(function).is_function() {
        return Err(DriverError::NotAFunction {
            path: path.to_string(),
        });
    }

    let evaluated: SmallVec<[Arg; 4]> = literals
        .iter()
        .map(|text| eval_literal(table, scope, text))
        .collect();
    let args: SmallVec<[EntryId; 4]> = evaluated.iter().map(|arg| arg.id()).collect();

    let outcome = table.invoke(function, &args).map(|result| {
        let text = render(table, result);
        // a function may hand back one of our own temporaries
        if !evaluated.contains(&Arg::Temp(result)) {
            table.release_if_temporary(result);
        }
        text
    });

    for arg in &evaluated {
        if let Arg::Temp(id) = *arg {
            table.release_if_temporary(id);
        }
    }
    let text = outcome??;
    Ok(text)
}

/// Apply a `path=value` assignment from `scope`.
///
/// The value is written as text, so numeric entries parse it.
pub fn assign(table: &mut SymbolTable, scope: EntryId, assignment: &str) -> Result<(), DriverError> {
    let Some((path, value)) = assignment.split_once('=') else {
        return Err(DriverError::MalformedAssignment {
            text: assignment.to_string(),
        });
    };
    let path = path.trim();
    let id = table
        .lookup_path(scope, path)
        .ok_or_else(|| DriverError::UnknownEntry {
            path: path.to_string(),
        })?;
    let entry = table.entry(id);
    if entry.is_scope() || entry.is_function() {
        return Err(DriverError::NotAssignable {
            path: path.to_string(),
        });
    }
    table.set_string(id, value.trim())?;
    tracing::debug!(path, value, "assigned");
    Ok(())
}
