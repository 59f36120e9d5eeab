//! Entry handles.

use std::fmt;

/// Index into the [`SymbolTable`](crate::SymbolTable) arena.
///
/// This is the opaque value handle the script layer works with: bound
/// functions take a slice of these and hand one back. Copying a handle never
/// copies the entry behind it.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
#[repr(transparent)]
pub struct EntryId(u32);

impl EntryId {
    #[inline]
    pub(crate) const fn new(index: u32) -> Self {
        EntryId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// Get the raw u32 value.
    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntryId({})", self.0)
    }
}

/// Convert an arena length to a `u32` index.
///
/// # Panics
/// Panics if the table has grown past `u32::MAX` slots.
#[inline]
pub(crate) fn to_u32(len: usize) -> u32 {
    match u32::try_from(len) {
        Ok(index) => index,
        Err(_) => panic!("symbol table exceeded {} entries", u32::MAX),
    }
}
