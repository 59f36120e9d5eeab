//! Text serialization of configuration trees.
//!
//! Output is a nested, brace-delimited listing:
//!
//! ```text
//! pop = {                                 // Population settings
//!   size = 100;                           // Number of organisms
//!   label = founders;
//! }
//! ```
//!
//! Scalars print their default text when one is recorded and their live
//! value otherwise. Descriptions become `//` comments padded out to a
//! fixed column. Functions and builtins are never written.

use std::io::{self, Write};

use crate::{EntryId, SymbolTable};

/// Column `//` comments are aligned to unless the caller picks another.
pub const DEFAULT_COMMENT_COLUMN: usize = 40;

fn pad(out: &mut (impl Write + ?Sized), written: usize, column: usize) -> io::Result<()> {
    let spaces = column.saturating_sub(written);
    write!(out, "{:spaces$}", "")
}

impl SymbolTable {
    /// Write one entry (and, for a scope, everything under it).
    ///
    /// `prefix` is emitted at the start of every line; nested scopes extend
    /// it by two spaces.
    pub fn write(
        &self,
        id: EntryId,
        out: &mut (impl Write + ?Sized),
        prefix: &str,
        comment_column: usize,
    ) -> io::Result<()> {
        let entry = self.entry(id);
        if entry.is_function() {
            return Ok(());
        }
        let name = entry.name();
        let description = entry.description();

        if entry.is_scope() {
            write!(out, "{prefix}{name} = {{ ")?;
            if !description.is_empty() {
                pad(out, prefix.len() + name.len() + 5, comment_column)?;
                write!(out, "// {description}")?;
            }
            writeln!(out)?;
            self.write_contents(id, out, &format!("{prefix}  "), comment_column)?;
            return writeln!(out, "{prefix}}}");
        }

        let Ok(value) = entry.serialized_value() else {
            return Ok(());
        };
        write!(out, "{prefix}{name} = {value};")?;
        if !description.is_empty() {
            let written = prefix.len() + name.len() + value.len() + 4;
            // keep at least one space between a long value and its comment
            pad(out, written, comment_column.max(written + 1))?;
            write!(out, "// {description}")?;
        }
        writeln!(out)
    }

    /// Write the registered children of `scope` in insertion order.
    pub fn write_contents(
        &self,
        scope: EntryId,
        out: &mut (impl Write + ?Sized),
        prefix: &str,
        comment_column: usize,
    ) -> io::Result<()> {
        crate::stack::ensure_sufficient_stack(|| {
            for &child in self.entries(scope) {
                self.write(child, out, prefix, comment_column)?;
            }
            Ok(())
        })
    }

    /// Serialize the contents of `scope` at the default comment column.
    pub fn to_config_string(&self, scope: EntryId) -> String {
        let mut buf = Vec::new();
        // writes into a Vec cannot fail
        let _ = self.write_contents(scope, &mut buf, "", DEFAULT_COMMENT_COLUMN);
        String::from_utf8_lossy(&buf).into_owned()
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
