//! Registry of configurable types.
//!
//! Each registered type has a factory and a list of member functions.
//! Instantiating a type builds the object, gives it a scope of its own to
//! declare settings in, and installs every member function in that scope
//! bound to the new object.

use std::rc::Rc;

use rustc_hash::FxHashMap;

use knob_symbols::{EntryId, SymbolTable};

use crate::member::{object_ref, Configurable, IntoMemberFn, MemberFunction, ObjectRef, TypeTag};
use crate::BindError;

type Factory = Rc<dyn Fn() -> ObjectRef>;

/// A member function with the description shown to script authors.
#[derive(Clone, Debug)]
pub struct MemberInfo {
    pub function: MemberFunction,
    pub description: String,
}

/// Everything known about one registered type.
pub struct TypeInfo {
    name: String,
    description: String,
    tag: TypeTag,
    factory: Factory,
    members: Vec<MemberInfo>,
}

impl TypeInfo {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Member functions in registration order.
    pub fn members(&self) -> &[MemberInfo] {
        &self.members
    }

    /// Build a fresh object of this type.
    pub fn make(&self) -> ObjectRef {
        (self.factory)()
    }
}

/// A live object together with the scope holding its settings.
pub struct Instance {
    pub object: ObjectRef,
    pub scope: EntryId,
}

/// Configurable types known to a host, by script-visible name.
#[derive(Default)]
pub struct TypeRegistry {
    types: FxHashMap<String, TypeInfo>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T`, building instances with `T::default()`.
    pub fn register_type<T: Configurable + Default>(
        &mut self,
        name: &str,
        description: &str,
    ) -> Result<(), BindError> {
        self.register_type_with(name, description, T::default)
    }

    /// Register `T` with a custom factory.
    pub fn register_type_with<T: Configurable>(
        &mut self,
        name: &str,
        description: &str,
        factory: impl Fn() -> T + 'static,
    ) -> Result<(), BindError> {
        if self.types.contains_key(name) {
            return Err(BindError::DuplicateType {
                name: name.to_string(),
            });
        }
        let info = TypeInfo {
            name: name.to_string(),
            description: description.to_string(),
            tag: TypeTag::of::<T>(),
            factory: Rc::new(move || object_ref(factory())),
            members: Vec::new(),
        };
        tracing::debug!(name, rust_type = info.tag.name(), "registered type");
        self.types.insert(name.to_string(), info);
        Ok(())
    }

    /// Add a member function to a registered type.
    ///
    /// The function's receiver must be the type registered under
    /// `type_name`.
    pub fn add_member_function<T, Shape, F>(
        &mut self,
        type_name: &str,
        name: &str,
        f: F,
        description: &str,
    ) -> Result<(), BindError>
    where
        T: 'static,
        F: IntoMemberFn<T, Shape>,
    {
        let Some(info) = self.types.get_mut(type_name) else {
            return Err(BindError::UnknownType {
                name: type_name.to_string(),
            });
        };
        if info.members.iter().any(|m| m.function.name() == name) {
            return Err(BindError::DuplicateMember {
                type_name: type_name.to_string(),
                function: name.to_string(),
            });
        }
        let function = MemberFunction::bind::<T, Shape, F>(info.tag, name, f)?;
        tracing::debug!(type_name, name, arity = %function.arity(), "registered member function");
        info.members.push(MemberInfo {
            function,
            description: description.to_string(),
        });
        Ok(())
    }

    pub fn get(&self, type_name: &str) -> Option<&TypeInfo> {
        self.types.get(type_name)
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Build an object without placing it in a table.
    pub fn make(&self, type_name: &str) -> Result<ObjectRef, BindError> {
        self.lookup(type_name).map(TypeInfo::make)
    }

    /// Create a named instance of a registered type under `parent`.
    ///
    /// The new scope carries the type name as its structure type. The
    /// object's settings are registered through
    /// [`Configurable::setup_config`] and every member function is added as
    /// a builtin bound to the object. On failure nothing is left behind in
    /// the table.
    pub fn instantiate(
        &self,
        type_name: &str,
        table: &mut SymbolTable,
        parent: EntryId,
        instance_name: &str,
        description: &str,
    ) -> Result<Instance, BindError> {
        let info = self.lookup(type_name)?;
        let object = info.make();
        let scope = table.add_scope(parent, instance_name, description, &info.name)?;

        if let Err(err) = Self::populate(info, table, &object, scope) {
            // the scope was just created, so removal cannot fail
            let _ = table.remove(scope);
            return Err(err);
        }
        tracing::debug!(type_name, instance_name, ?scope, "instantiated");
        Ok(Instance { object, scope })
    }

    fn populate(
        info: &TypeInfo,
        table: &mut SymbolTable,
        object: &ObjectRef,
        scope: EntryId,
    ) -> Result<(), BindError> {
        object.borrow_mut().setup_config(table, scope)?;
        for member in &info.members {
            let function = member.function.bind_object(Rc::clone(object));
            table.define_builtin_function(scope, member.function.name(), function, &member.description)?;
        }
        Ok(())
    }

    fn lookup(&self, type_name: &str) -> Result<&TypeInfo, BindError> {
        self.types.get(type_name).ok_or_else(|| BindError::UnknownType {
            name: type_name.to_string(),
        })
    }
}
