//! Value kinds used for validation and generated documentation.

use std::fmt;

/// What kind of value an entry holds.
///
/// The kind never changes how a value is stored; it tells validators and
/// documentation generators how to treat the text of a value. The string
/// sub-kinds (`Filename` through `Numeric`) all read and write as strings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ValueKind {
    #[default]
    None,
    Scope,

    // Values
    Bool,
    Int,
    Unsigned,
    Double,

    // Strings
    String,
    Filename,
    Path,
    Url,
    Alphabetic,
    Alphanumeric,
    Numeric,
}

impl ValueKind {
    /// Returns `true` for kinds stored as numbers.
    pub fn is_numeric(self) -> bool {
        matches!(self, Self::Bool | Self::Int | Self::Unsigned | Self::Double)
    }

    /// Returns `true` for the plain string kind and all of its sub-kinds.
    pub fn is_string(self) -> bool {
        matches!(
            self,
            Self::String
                | Self::Filename
                | Self::Path
                | Self::Url
                | Self::Alphabetic
                | Self::Alphanumeric
                | Self::Numeric
        )
    }

    /// Lowercase name used in messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Scope => "scope",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Unsigned => "unsigned",
            Self::Double => "double",
            Self::String => "string",
            Self::Filename => "filename",
            Self::Path => "path",
            Self::Url => "url",
            Self::Alphabetic => "alphabetic",
            Self::Alphanumeric => "alphanumeric",
            Self::Numeric => "numeric",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
