//! The symbol table: an arena of entries organised into a scope tree.
//!
//! Every entry lives in one arena slot and is addressed by [`EntryId`].
//! Scopes hold the ids of their children; children hold the id of their
//! owning scope. Nothing is freed by hand: [`SymbolTable::remove`] detaches
//! a subtree and returns all of its slots to the free list, and temporaries
//! go back through [`SymbolTable::release`].
//!
//! Lookup is lexical along a single chain: a scope consults its own index,
//! then its owning scope's, up to the root. Siblings never see each other.

use std::rc::Rc;

use crate::channel::{stderr_channel, SharedErrorChannel};
use crate::entry::{Entry, EntryValue, FunctionEntry, ScopeData};
use crate::id::to_u32;
use crate::linked::{Accessor, LinkTarget, Linked, LinkedValue};
use crate::stack::ensure_sufficient_stack;
use crate::{Arity, CallError, EntryError, EntryId, Scalar, SymbolError};

/// Name given to the root scope by [`SymbolTable::new`].
pub const ROOT_NAME: &str = "root";

/// Arena of entries rooted at a single scope.
pub struct SymbolTable {
    slots: Vec<Option<Entry>>,
    /// Released slots, reused before the arena grows.
    free: Vec<EntryId>,
    root: EntryId,
    channel: SharedErrorChannel,
}

impl SymbolTable {
    /// Create a table whose root scope is named [`ROOT_NAME`].
    pub fn new() -> Self {
        Self::with_root(ROOT_NAME, "")
    }

    /// Create a table with a named, described root scope.
    pub fn with_root(name: &str, description: &str) -> Self {
        let root = Entry::new(name, description, EntryValue::Scope(ScopeData::new("")));
        SymbolTable {
            slots: vec![Some(root)],
            free: Vec::new(),
            root: EntryId::new(0),
            channel: stderr_channel(),
        }
    }

    #[inline]
    pub fn root(&self) -> EntryId {
        self.root
    }

    /// Channel that failed calls are reported to.
    pub fn error_channel(&self) -> &SharedErrorChannel {
        &self.channel
    }

    pub fn set_error_channel(&mut self, channel: SharedErrorChannel) {
        self.channel = channel;
    }

    /// Number of live entries, temporaries included.
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Always `false`: the root scope lives as long as the table.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn alloc(&mut self, entry: Entry) -> EntryId {
        if let Some(id) = self.free.pop() {
            self.slots[id.index()] = Some(entry);
            id
        } else {
            let id = EntryId::new(to_u32(self.slots.len()));
            self.slots.push(Some(entry));
            id
        }
    }

    /// Get an entry, or `None` if the handle has been freed.
    pub fn get(&self, id: EntryId) -> Option<&Entry> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    /// Get a live entry.
    ///
    /// # Panics
    /// Panics on a freed handle; holding one past `remove`/`release` is a
    /// bug in the caller.
    pub fn entry(&self, id: EntryId) -> &Entry {
        match self.get(id) {
            Some(entry) => entry,
            None => panic!("internal error: stale entry handle {id:?}"),
        }
    }

    /// Get a live entry mutably. Panics like [`SymbolTable::entry`].
    pub fn entry_mut(&mut self, id: EntryId) -> &mut Entry {
        match self.slots.get_mut(id.index()).and_then(Option::as_mut) {
            Some(entry) => entry,
            None => panic!("internal error: stale entry handle {id:?}"),
        }
    }

    fn scope_data(&self, scope: EntryId) -> Result<&ScopeData, SymbolError> {
        let entry = self.entry(scope);
        match &entry.value {
            EntryValue::Scope(data) => Ok(data),
            _ => Err(SymbolError::NotAScope {
                name: entry.name().to_string(),
            }),
        }
    }

    fn scope_data_mut(&mut self, scope: EntryId) -> Result<&mut ScopeData, SymbolError> {
        let entry = self.entry_mut(scope);
        if !entry.is_scope() {
            return Err(SymbolError::NotAScope {
                name: entry.name().to_string(),
            });
        }
        match &mut entry.value {
            EntryValue::Scope(data) => Ok(data),
            _ => unreachable!("entry was checked to be a scope"),
        }
    }

    /// Child lists of a scope (registered, builtin); `None` for other entries.
    fn child_lists(&self, id: EntryId) -> Option<(Vec<EntryId>, Vec<EntryId>)> {
        match &self.entry(id).value {
            EntryValue::Scope(data) => Some((data.entries.clone(), data.builtins.clone())),
            _ => None,
        }
    }

    // Registration

    fn insert(
        &mut self,
        scope: EntryId,
        mut entry: Entry,
        builtin: bool,
    ) -> Result<EntryId, SymbolError> {
        if entry.name().is_empty() {
            return Err(SymbolError::EmptyName);
        }
        let data = self.scope_data(scope)?;
        if data.index.contains_key(entry.name()) {
            return Err(SymbolError::DuplicateName {
                name: entry.name().to_string(),
                scope: self.entry(scope).name().to_string(),
            });
        }

        entry.scope = Some(scope);
        entry.temporary = false;
        let name = entry.name().to_string();
        let id = self.alloc(entry);

        let data = self.scope_data_mut(scope)?;
        if builtin {
            data.builtins.push(id);
        } else {
            data.entries.push(id);
        }
        tracing::debug!(?scope, ?id, %name, builtin, "registered entry");
        data.index.insert(name, id);
        Ok(id)
    }

    /// Add a nested scope. `structure_type` is empty for a plain namespace.
    pub fn add_scope(
        &mut self,
        scope: EntryId,
        name: &str,
        description: &str,
        structure_type: &str,
    ) -> Result<EntryId, SymbolError> {
        let entry = Entry::new(
            name,
            description,
            EntryValue::Scope(ScopeData::new(structure_type)),
        );
        self.insert(scope, entry, false)
    }

    /// Add a numeric variable owned by the table, starting at `0`.
    pub fn add_value_var(
        &mut self,
        scope: EntryId,
        name: &str,
        description: &str,
    ) -> Result<EntryId, SymbolError> {
        self.insert(scope, Entry::new(name, description, EntryValue::Double(0.0)), false)
    }

    /// Add a string variable owned by the table, starting empty.
    pub fn add_string_var(
        &mut self,
        scope: EntryId,
        name: &str,
        description: &str,
    ) -> Result<EntryId, SymbolError> {
        self.insert(
            scope,
            Entry::new(name, description, EntryValue::Str(String::new())),
            false,
        )
    }

    /// Link a host variable.
    ///
    /// The variable is set to `default`, and `default` becomes the entry's
    /// serialized default.
    pub fn link_var<T: LinkedValue>(
        &mut self,
        scope: EntryId,
        name: &str,
        var: &Linked<T>,
        description: &str,
        default: T,
    ) -> Result<EntryId, SymbolError> {
        let mut entry = Entry::new(name, description, EntryValue::Linked(var.target()));
        entry.set_default(&default.to_text());
        let id = self.insert(scope, entry, false)?;
        var.set(default);
        Ok(id)
    }

    /// Link a getter/setter pair in place of a host variable.
    ///
    /// The setter is called once with `default` after registration.
    pub fn link_funs<T: LinkedValue>(
        &mut self,
        scope: EntryId,
        name: &str,
        get: impl Fn() -> T + 'static,
        set: impl Fn(T) + 'static,
        description: &str,
        default: T,
    ) -> Result<EntryId, SymbolError> {
        let accessor = Rc::new(Accessor::new(get, set));
        let target: Rc<dyn LinkTarget> = accessor.clone();
        let mut entry = Entry::new(name, description, EntryValue::Linked(target));
        entry.set_default(&default.to_text());
        let id = self.insert(scope, entry, false)?;
        accessor.write(default);
        Ok(id)
    }

    /// Register a bound function.
    pub fn define_function(
        &mut self,
        scope: EntryId,
        name: &str,
        function: FunctionEntry,
        description: &str,
    ) -> Result<EntryId, SymbolError> {
        self.insert(
            scope,
            Entry::new(name, description, EntryValue::Function(function)),
            false,
        )
    }

    /// Register a bound function as a builtin: found by lookup, never
    /// serialized.
    pub fn define_builtin_function(
        &mut self,
        scope: EntryId,
        name: &str,
        function: FunctionEntry,
        description: &str,
    ) -> Result<EntryId, SymbolError> {
        self.insert(
            scope,
            Entry::new(name, description, EntryValue::Function(function)),
            true,
        )
    }

    // Temporaries

    /// Allocate an unregistered holder for an intermediate value.
    ///
    /// The caller owns the result and must hand it back to
    /// [`SymbolTable::release`].
    pub fn make_temp(&mut self, value: impl Into<Scalar>) -> EntryId {
        let value = match value.into() {
            Scalar::Number(n) => EntryValue::Double(n),
            Scalar::Text(s) => EntryValue::Str(s),
        };
        let mut entry = Entry::new("", "", value);
        entry.temporary = true;
        let id = self.alloc(entry);
        tracing::trace!(?id, "allocated temporary");
        id
    }

    /// Free a temporary.
    pub fn release(&mut self, id: EntryId) -> Result<(), SymbolError> {
        let entry = self.entry(id);
        if !entry.is_temporary() {
            return Err(SymbolError::NotTemporary {
                name: entry.name().to_string(),
            });
        }
        self.free_subtree(id);
        Ok(())
    }

    /// Free `id` if it is a temporary. Returns whether it was freed.
    ///
    /// For call results, which may be a fresh temporary or a registered
    /// entry passed straight through.
    pub fn release_if_temporary(&mut self, id: EntryId) -> bool {
        self.release(id).is_ok()
    }

    // Lookup

    /// Find a direct child of `scope` by name, without consulting enclosing
    /// scopes. Returns `None` if `scope` is not a scope.
    pub fn get_entry(&self, scope: EntryId, name: &str) -> Option<EntryId> {
        match &self.entry(scope).value {
            EntryValue::Scope(data) => data.index.get(name).copied(),
            _ => None,
        }
    }

    /// Resolve `name` from `id`.
    ///
    /// The empty name resolves to `id` itself. A scope checks its own
    /// entries first and, if `scan_enclosing`, then each enclosing scope in
    /// turn. Non-scope entries resolve nothing but the empty name.
    pub fn lookup_entry(&self, id: EntryId, name: &str, scan_enclosing: bool) -> Option<EntryId> {
        if name.is_empty() {
            return Some(id);
        }
        let mut current = id;
        loop {
            let entry = self.entry(current);
            let EntryValue::Scope(data) = &entry.value else {
                return None;
            };
            if let Some(&found) = data.index.get(name) {
                tracing::trace!(name, ?found, "lookup hit");
                return Some(found);
            }
            if !scan_enclosing {
                return None;
            }
            current = entry.scope()?;
        }
    }

    /// Resolve a dotted path such as `world.pop.size`.
    ///
    /// The first segment is looked up lexically from `id`; every later
    /// segment must be a direct child of the scope before it.
    pub fn lookup_path(&self, id: EntryId, path: &str) -> Option<EntryId> {
        if path.is_empty() {
            return Some(id);
        }
        let mut segments = path.split('.');
        let first = segments.next()?;
        let mut current = self.lookup_entry(id, first, true)?;
        for segment in segments {
            current = self.get_entry(current, segment)?;
        }
        Some(current)
    }

    /// Dotted path of `id` from the root (empty for the root itself).
    pub fn path_of(&self, id: EntryId) -> String {
        let mut names = Vec::new();
        let mut current = id;
        while let Some(parent) = self.entry(current).scope() {
            names.push(self.entry(current).name());
            current = parent;
        }
        names.reverse();
        names.join(".")
    }

    /// Registered children of a scope, in insertion order.
    pub fn entries(&self, scope: EntryId) -> &[EntryId] {
        match &self.entry(scope).value {
            EntryValue::Scope(data) => &data.entries,
            _ => &[],
        }
    }

    /// Builtin children of a scope.
    pub fn builtin_entries(&self, scope: EntryId) -> &[EntryId] {
        match &self.entry(scope).value {
            EntryValue::Scope(data) => &data.builtins,
            _ => &[],
        }
    }

    pub fn structure_type(&self, scope: EntryId) -> Option<&str> {
        self.entry(scope).structure_type()
    }

    // Scalar access

    pub fn as_double(&self, id: EntryId) -> Result<f64, EntryError> {
        self.entry(id).as_double()
    }

    pub fn as_string(&self, id: EntryId) -> Result<String, EntryError> {
        self.entry(id).as_string()
    }

    pub fn set_value(&mut self, id: EntryId, value: f64) -> Result<(), EntryError> {
        self.entry_mut(id).set_value(value)
    }

    pub fn set_string(&mut self, id: EntryId, text: &str) -> Result<(), EntryError> {
        self.entry_mut(id).set_string(text)
    }

    /// Copy `src`'s value into `dst`; `false` if the kinds don't allow it.
    pub fn copy_value(&mut self, dst: EntryId, src: EntryId) -> bool {
        match self.entry(src).snapshot() {
            Some(scalar) => self.entry_mut(dst).assign(scalar),
            None => false,
        }
    }

    /// Snapshot the current value of every registered descendant into its
    /// default text.
    pub fn update_default(&mut self, id: EntryId) {
        ensure_sufficient_stack(|| match self.child_lists(id) {
            Some((entries, _)) => {
                for child in entries {
                    self.update_default(child);
                }
            }
            None => self.entry_mut(id).snapshot_default(),
        });
    }

    /// Numeric entries under `scope` whose value breaks their advisory
    /// range or `integer_only` flag, in serialization order.
    pub fn validate(&self, scope: EntryId) -> Vec<EntryId> {
        let mut violations = Vec::new();
        self.collect_violations(scope, &mut violations);
        violations
    }

    fn collect_violations(&self, id: EntryId, out: &mut Vec<EntryId>) {
        ensure_sufficient_stack(|| {
            for &child in self.entries(id) {
                let entry = self.entry(child);
                if entry.is_scope() {
                    self.collect_violations(child, out);
                } else if entry.kind().is_numeric() {
                    if let Ok(value) = entry.as_double() {
                        if !entry.accepts(value) {
                            out.push(child);
                        }
                    }
                }
            }
        });
    }

    // Tree edits

    /// Deep-copy an entry and everything under it.
    ///
    /// The copy is detached (no owning scope); place it with
    /// [`SymbolTable::attach`] or drop it with [`SymbolTable::remove`].
    /// Linked entries in the copy share their host variables with the
    /// original.
    pub fn clone_entry(&mut self, id: EntryId) -> EntryId {
        let copy = self.clone_subtree(id, None);
        tracing::debug!(source = ?id, clone = ?copy, "cloned entry");
        copy
    }

    fn clone_subtree(&mut self, id: EntryId, parent: Option<EntryId>) -> EntryId {
        ensure_sufficient_stack(|| {
            let mut copy = self.entry(id).shallow_clone();
            copy.scope = parent;
            let children = self.child_lists(id);
            let new_id = self.alloc(copy);

            if let Some((entries, builtins)) = children {
                for child in entries {
                    let cloned = self.clone_subtree(child, Some(new_id));
                    self.push_child(new_id, cloned, false);
                }
                for child in builtins {
                    let cloned = self.clone_subtree(child, Some(new_id));
                    self.push_child(new_id, cloned, true);
                }
            }
            new_id
        })
    }

    fn push_child(&mut self, scope: EntryId, child: EntryId, builtin: bool) {
        let name = self.entry(child).name().to_string();
        if let EntryValue::Scope(data) = &mut self.entry_mut(scope).value {
            if builtin {
                data.builtins.push(child);
            } else {
                data.entries.push(child);
            }
            data.index.insert(name, child);
        }
    }

    /// Register a detached entry (a clone, or a temporary being promoted)
    /// under `scope`.
    pub fn attach(&mut self, scope: EntryId, id: EntryId) -> Result<(), SymbolError> {
        if id == self.root {
            return Err(SymbolError::RootScope);
        }
        let entry = self.entry(id);
        let name = entry.name().to_string();
        if entry.scope().is_some() {
            return Err(SymbolError::AlreadyAttached { name });
        }
        if name.is_empty() {
            return Err(SymbolError::EmptyName);
        }
        let mut cursor = Some(scope);
        while let Some(current) = cursor {
            if current == id {
                return Err(SymbolError::WouldCycle { name });
            }
            cursor = self.entry(current).scope();
        }
        if self.scope_data(scope)?.index.contains_key(&name) {
            return Err(SymbolError::DuplicateName {
                name,
                scope: self.entry(scope).name().to_string(),
            });
        }

        let entry = self.entry_mut(id);
        entry.scope = Some(scope);
        entry.temporary = false;
        self.push_child(scope, id, false);
        tracing::debug!(?scope, ?id, %name, "attached entry");
        Ok(())
    }

    /// Rename an entry, keeping its scope's index in step.
    pub fn rename(&mut self, id: EntryId, name: &str) -> Result<(), SymbolError> {
        if name.is_empty() {
            return Err(SymbolError::EmptyName);
        }
        let old = self.entry(id).name().to_string();
        if old == name {
            return Ok(());
        }
        if let Some(scope) = self.entry(id).scope() {
            let scope_name = self.entry(scope).name().to_string();
            let data = self.scope_data_mut(scope)?;
            if data.index.contains_key(name) {
                return Err(SymbolError::DuplicateName {
                    name: name.to_string(),
                    scope: scope_name,
                });
            }
            data.index.remove(&old);
            data.index.insert(name.to_string(), id);
        }
        self.entry_mut(id).set_name(name);
        Ok(())
    }

    /// Detach an entry from its scope and free it with its whole subtree.
    pub fn remove(&mut self, id: EntryId) -> Result<(), SymbolError> {
        if id == self.root {
            return Err(SymbolError::RootScope);
        }
        if let Some(parent) = self.entry(id).scope() {
            let name = self.entry(id).name().to_string();
            let data = self.scope_data_mut(parent)?;
            data.entries.retain(|&child| child != id);
            data.builtins.retain(|&child| child != id);
            data.index.remove(&name);
        }
        self.free_subtree(id);
        tracing::debug!(?id, "removed entry");
        Ok(())
    }

    fn free_subtree(&mut self, id: EntryId) {
        ensure_sufficient_stack(|| {
            let Some(entry) = self.slots.get_mut(id.index()).and_then(Option::take) else {
                return;
            };
            self.free.push(id);
            if let EntryValue::Scope(data) = entry.value {
                for child in data.children() {
                    self.free_subtree(child);
                }
            }
        });
    }

    // Calls

    /// Arity of a function entry; `None` for anything else.
    pub fn arity(&self, id: EntryId) -> Option<Arity> {
        self.entry(id).function().map(FunctionEntry::arity)
    }

    /// Invoke a function entry with argument handles.
    ///
    /// Failures are reported to the error channel and returned. On success
    /// the result handle belongs to the caller; it is either a fresh
    /// temporary or an entry the function passed through.
    #[tracing::instrument(level = "debug", skip(self, args), fields(argc = args.len()))]
    pub fn invoke(&mut self, function: EntryId, args: &[EntryId]) -> Result<EntryId, CallError> {
        let callable = match self.entry(function).function() {
            Some(func) => Ok(func.callable()),
            None => Err(CallError::NotCallable {
                name: self.entry(function).name().to_string(),
            }),
        };
        let result = callable.and_then(|callable| callable(self, args));
        if let Err(err) = &result {
            tracing::debug!(%err, "call failed");
            self.channel.report(err);
        }
        result
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
