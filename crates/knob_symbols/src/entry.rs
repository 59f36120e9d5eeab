//! A single named slot in a configuration tree.
//!
//! Every entry shares the same header (name, description, default text,
//! owning scope, kind, advisory range) and carries one [`EntryValue`]
//! variant. Scalar operations are dispatched on the variant; structural
//! variants answer them with [`EntryError::Unsupported`].

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use crate::linked::{format_number, parse_number, LinkTarget};
use crate::{CallError, EntryError, EntryId, SymbolTable, ValueKind};

/// Uniform shape of every bound function: handles in, one handle out.
///
/// The table is passed back in so the callee can read its arguments and
/// allocate its result.
pub type NativeFn = Rc<dyn Fn(&mut SymbolTable, &[EntryId]) -> Result<EntryId, CallError>>;

/// How many arguments a bound function takes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    /// Exactly this many handles, each converted to a parameter type.
    Fixed(usize),
    /// The raw handle slice, unconverted.
    Variadic,
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(n) => write!(f, "{n}"),
            Self::Variadic => f.write_str("any"),
        }
    }
}

/// A callable entry payload.
#[derive(Clone)]
pub struct FunctionEntry {
    arity: Arity,
    callable: NativeFn,
}

impl FunctionEntry {
    pub fn new(arity: Arity, callable: NativeFn) -> Self {
        FunctionEntry { arity, callable }
    }

    pub fn arity(&self) -> Arity {
        self.arity
    }

    pub(crate) fn callable(&self) -> NativeFn {
        Rc::clone(&self.callable)
    }
}

impl fmt::Debug for FunctionEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionEntry")
            .field("arity", &self.arity)
            .finish_non_exhaustive()
    }
}

/// Children of a scope entry.
#[derive(Debug, Default)]
pub(crate) struct ScopeData {
    /// Registered entries, in insertion order (serialization order).
    pub(crate) entries: Vec<EntryId>,
    /// System-provided entries: visible to lookup, never serialized.
    pub(crate) builtins: Vec<EntryId>,
    /// Name lookup over `entries` and `builtins`.
    pub(crate) index: FxHashMap<String, EntryId>,
    /// Structure type this scope represents (empty for plain namespaces).
    pub(crate) structure_type: String,
}

impl ScopeData {
    pub(crate) fn new(structure_type: &str) -> Self {
        ScopeData {
            structure_type: structure_type.to_string(),
            ..ScopeData::default()
        }
    }

    /// All children, registered entries first.
    pub(crate) fn children(&self) -> impl Iterator<Item = EntryId> + '_ {
        self.entries.iter().chain(self.builtins.iter()).copied()
    }
}

/// A scalar snapshot, used to move values between entries.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    fn as_number(&self) -> Result<f64, EntryError> {
        match self {
            Self::Number(n) => Ok(*n),
            Self::Text(s) => parse_number(s),
        }
    }

    fn into_text(self) -> String {
        match self {
            Self::Number(n) => format_number(n),
            Self::Text(s) => s,
        }
    }
}

impl From<f64> for Scalar {
    fn from(value: f64) -> Self {
        Scalar::Number(value)
    }
}

impl From<String> for Scalar {
    fn from(value: String) -> Self {
        Scalar::Text(value)
    }
}

impl From<&str> for Scalar {
    fn from(value: &str) -> Self {
        Scalar::Text(value.to_string())
    }
}

/// Storage behind an entry.
pub(crate) enum EntryValue {
    /// A host variable or getter/setter pair.
    Linked(Rc<dyn LinkTarget>),
    Double(f64),
    Str(String),
    Function(FunctionEntry),
    Scope(ScopeData),
}

impl fmt::Debug for EntryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Linked(target) => f.debug_tuple("Linked").field(&target.as_string()).finish(),
            Self::Double(v) => f.debug_tuple("Double").field(v).finish(),
            Self::Str(s) => f.debug_tuple("Str").field(s).finish(),
            Self::Function(func) => func.fmt(f),
            Self::Scope(data) => data.fmt(f),
        }
    }
}

/// A named, described slot in the symbol table.
#[derive(Debug)]
pub struct Entry {
    name: String,
    description: String,
    default_text: String,
    pub(crate) scope: Option<EntryId>,
    pub(crate) temporary: bool,
    kind: ValueKind,
    min: Option<f64>,
    max: Option<f64>,
    integer_only: bool,
    pub(crate) value: EntryValue,
}

impl Entry {
    pub(crate) fn new(name: &str, description: &str, value: EntryValue) -> Self {
        let kind = match &value {
            EntryValue::Linked(target) => target.kind(),
            EntryValue::Double(_) => ValueKind::Double,
            EntryValue::Str(_) => ValueKind::String,
            EntryValue::Function(_) => ValueKind::None,
            EntryValue::Scope(_) => ValueKind::Scope,
        };
        Entry {
            name: name.to_string(),
            description: description.to_string(),
            default_text: String::new(),
            scope: None,
            temporary: false,
            kind,
            min: None,
            max: None,
            integer_only: false,
            value,
        }
    }

    /// Copy the header and the value, leaving a scope's children behind.
    ///
    /// Linked entries keep pointing at the same host variable.
    pub(crate) fn shallow_clone(&self) -> Self {
        let value = match &self.value {
            EntryValue::Linked(target) => EntryValue::Linked(Rc::clone(target)),
            EntryValue::Double(v) => EntryValue::Double(*v),
            EntryValue::Str(s) => EntryValue::Str(s.clone()),
            EntryValue::Function(func) => EntryValue::Function(func.clone()),
            EntryValue::Scope(data) => EntryValue::Scope(ScopeData::new(&data.structure_type)),
        };
        Entry {
            name: self.name.clone(),
            description: self.description.clone(),
            default_text: self.default_text.clone(),
            scope: self.scope,
            temporary: self.temporary,
            kind: self.kind,
            min: self.min,
            max: self.max,
            integer_only: self.integer_only,
            value,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn default_text(&self) -> &str {
        &self.default_text
    }

    /// Scope this entry was registered in (`None` for the root, temporaries
    /// and detached clones).
    pub fn scope(&self) -> Option<EntryId> {
        self.scope
    }

    pub fn is_temporary(&self) -> bool {
        self.temporary
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn is_scope(&self) -> bool {
        matches!(self.value, EntryValue::Scope(_))
    }

    pub fn is_function(&self) -> bool {
        matches!(self.value, EntryValue::Function(_))
    }

    pub fn is_linked(&self) -> bool {
        matches!(self.value, EntryValue::Linked(_))
    }

    /// Returns `true` for entries that carry a readable scalar.
    pub fn is_scalar(&self) -> bool {
        !self.is_scope() && !self.is_function()
    }

    pub fn function(&self) -> Option<&FunctionEntry> {
        match &self.value {
            EntryValue::Function(func) => Some(func),
            _ => None,
        }
    }

    /// Structure type of a scope entry; `None` for other variants.
    pub fn structure_type(&self) -> Option<&str> {
        match &self.value {
            EntryValue::Scope(data) => Some(&data.structure_type),
            _ => None,
        }
    }

    /// Inclusive advisory bounds.
    pub fn range(&self) -> (Option<f64>, Option<f64>) {
        (self.min, self.max)
    }

    pub fn integer_only(&self) -> bool {
        self.integer_only
    }

    /// Only the table renames entries, so the scope index stays in step.
    pub(crate) fn set_name(&mut self, name: &str) {
        name.clone_into(&mut self.name);
    }

    pub fn set_description(&mut self, description: &str) -> &mut Self {
        self.description = description.to_string();
        self
    }

    pub fn set_default(&mut self, text: &str) -> &mut Self {
        self.default_text = text.to_string();
        self
    }

    /// Refine the kind (e.g. mark a string entry as a filename).
    pub fn set_kind(&mut self, kind: ValueKind) -> &mut Self {
        self.kind = kind;
        self
    }

    pub fn set_min(&mut self, min: f64) -> &mut Self {
        self.min = Some(min);
        self
    }

    pub fn set_max(&mut self, max: f64) -> &mut Self {
        self.max = Some(max);
        self
    }

    pub fn set_integer_only(&mut self, integer_only: bool) -> &mut Self {
        self.integer_only = integer_only;
        self
    }

    /// Check a candidate value against the advisory constraints.
    ///
    /// Writes are never rejected; this exists for validation reports.
    pub fn accepts(&self, value: f64) -> bool {
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        !self.integer_only || value.fract() == 0.0
    }

    pub fn as_double(&self) -> Result<f64, EntryError> {
        match &self.value {
            EntryValue::Linked(target) => target.as_double(),
            EntryValue::Double(v) => Ok(*v),
            EntryValue::Str(s) => parse_number(s),
            EntryValue::Function(_) | EntryValue::Scope(_) => Err(self.unsupported("numeric read")),
        }
    }

    pub fn as_string(&self) -> Result<String, EntryError> {
        match &self.value {
            EntryValue::Linked(target) => Ok(target.as_string()),
            EntryValue::Double(v) => Ok(format_number(*v)),
            EntryValue::Str(s) => Ok(s.clone()),
            EntryValue::Function(_) | EntryValue::Scope(_) => Err(self.unsupported("string read")),
        }
    }

    pub fn set_value(&mut self, value: f64) -> Result<(), EntryError> {
        if !self.is_scalar() {
            return Err(self.unsupported("numeric write"));
        }
        match &mut self.value {
            EntryValue::Linked(target) => target.set_value(value),
            EntryValue::Double(v) => *v = value,
            EntryValue::Str(s) => *s = format_number(value),
            EntryValue::Function(_) | EntryValue::Scope(_) => {}
        }
        Ok(())
    }

    pub fn set_string(&mut self, text: &str) -> Result<(), EntryError> {
        if !self.is_scalar() {
            return Err(self.unsupported("string write"));
        }
        match &mut self.value {
            EntryValue::Linked(target) => target.set_string(text)?,
            EntryValue::Double(v) => *v = parse_number(text)?,
            EntryValue::Str(s) => text.clone_into(s),
            EntryValue::Function(_) | EntryValue::Scope(_) => {}
        }
        Ok(())
    }

    /// Snapshot the scalar value; `None` for scopes and functions.
    ///
    /// Numeric storage snapshots as a number, string storage as text.
    pub fn snapshot(&self) -> Option<Scalar> {
        match &self.value {
            EntryValue::Linked(target) => {
                if target.kind().is_string() {
                    Some(Scalar::Text(target.as_string()))
                } else {
                    target.as_double().ok().map(Scalar::Number)
                }
            }
            EntryValue::Double(v) => Some(Scalar::Number(*v)),
            EntryValue::Str(s) => Some(Scalar::Text(s.clone())),
            EntryValue::Function(_) | EntryValue::Scope(_) => None,
        }
    }

    /// Write a snapshot into this entry, converting to the storage type.
    ///
    /// Returns `false` (leaving the entry untouched) if the entry holds no
    /// scalar or the snapshot cannot be read in the needed form.
    pub fn assign(&mut self, scalar: Scalar) -> bool {
        let numeric = match &self.value {
            EntryValue::Linked(target) => !target.kind().is_string(),
            EntryValue::Double(_) => true,
            EntryValue::Str(_) => false,
            EntryValue::Function(_) | EntryValue::Scope(_) => return false,
        };
        if numeric {
            match scalar.as_number() {
                Ok(n) => self.set_value(n).is_ok(),
                Err(_) => false,
            }
        } else {
            self.set_string(&scalar.into_text()).is_ok()
        }
    }

    /// Try to copy another entry's value into this one.
    pub fn copy_value(&mut self, other: &Entry) -> bool {
        match other.snapshot() {
            Some(scalar) => self.assign(scalar),
            None => false,
        }
    }

    /// Text to serialize: the recorded default if any, else the live value.
    pub fn serialized_value(&self) -> Result<String, EntryError> {
        if self.default_text.is_empty() {
            self.as_string()
        } else {
            Ok(self.default_text.clone())
        }
    }

    /// Record the current scalar value as the default text.
    pub(crate) fn snapshot_default(&mut self) {
        if let Ok(text) = self.as_string() {
            self.default_text = text;
        }
    }

    fn unsupported(&self, op: &'static str) -> EntryError {
        EntryError::unsupported(&self.name, self.kind, op)
    }
}
