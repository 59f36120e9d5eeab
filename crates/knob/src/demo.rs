//! A small demo configuration.
//!
//! One configurable type (`Population`) with linked settings and member
//! functions, a few free functions at the root, and two linked root
//! settings.
//! Used by the `knob` binary and by integration tests.

use knob_bind::{
    downcast_object, variadic, BindError, Configurable, FunctionScope, Instance, TypeRegistry,
};
use knob_symbols::{EntryId, Linked, SymbolError, SymbolTable, ValueKind};

/// A group of organisms.
pub struct Population {
    pub size: Linked<u64>,
    pub label: Linked<String>,
    pub mutation_rate: Linked<f64>,
}

impl Default for Population {
    fn default() -> Self {
        Population {
            size: Linked::new(0),
            label: Linked::new(String::new()),
            mutation_rate: Linked::new(0.0),
        }
    }
}

impl Population {
    /// Add `n` organisms; returns the new size.
    pub fn grow(&mut self, n: u64) -> u64 {
        let size = self.size.get().saturating_add(n);
        self.size.set(size);
        size
    }

    pub fn describe(&mut self) -> String {
        format!(
            "{} ({} organisms, mutation rate {})",
            self.label.borrow(),
            self.size.get(),
            self.mutation_rate.get()
        )
    }
}

impl Configurable for Population {
    fn setup_config(&mut self, table: &mut SymbolTable, scope: EntryId) -> Result<(), SymbolError> {
        let size = table.link_var(scope, "size", &self.size, "Number of organisms", 100)?;
        table.entry_mut(size).set_min(1.0).set_integer_only(true);

        table.link_var(
            scope,
            "label",
            &self.label,
            "Name used in reports",
            "founders".to_string(),
        )?;

        let rate = table.link_var(
            scope,
            "mutation_rate",
            &self.mutation_rate,
            "Per-site mutation probability",
            0.01,
        )?;
        table.entry_mut(rate).set_min(0.0).set_max(1.0);

        let read = self.mutation_rate.clone();
        let write = self.mutation_rate.clone();
        let percent = table.link_funs(
            scope,
            "mutation_percent",
            move || read.get() * 100.0,
            move |percent: f64| {
                write.set(percent / 100.0);
            },
            "Mutation rate as a percentage",
            1.0,
        )?;
        table.entry_mut(percent).set_min(0.0).set_max(100.0);
        Ok(())
    }
}

/// The demo configuration and the objects behind it.
pub struct Demo {
    pub table: SymbolTable,
    pub registry: TypeRegistry,
    pub output: Linked<String>,
    pub seed: Linked<u64>,
    pub population: Instance,
}

impl Demo {
    /// Typed access to the demo population.
    ///
    /// # Panics
    /// Panics if the population is borrowed elsewhere.
    pub fn with_population<R>(&self, f: impl FnOnce(&mut Population) -> R) -> Option<R> {
        downcast_object::<Population>(&self.population.object).map(|mut pop| f(&mut pop))
    }
}

/// Types available to demo configurations.
pub fn demo_registry() -> Result<TypeRegistry, BindError> {
    let mut registry = TypeRegistry::new();
    registry.register_type::<Population>("Population", "A group of organisms")?;
    registry.add_member_function("Population", "grow", Population::grow, "Add organisms; returns the new size")?;
    registry.add_member_function("Population", "describe", Population::describe, "One-line summary")?;
    Ok(registry)
}

/// Root-level functions.
fn add_root_functions(table: &mut SymbolTable, root: EntryId) -> Result<(), SymbolError> {
    table.add_function(root, "add", |a: f64, b: f64| a + b, "Sum two numbers")?;
    table.add_function(root, "concat", |a: String, b: String| a + &b, "Join two strings")?;
    table.add_function(root, "pi", || std::f64::consts::PI, "The constant pi")?;
    table.add_function(
        root,
        "max",
        variadic(|table: &mut SymbolTable, args: &[EntryId]| {
            args.iter()
                .filter_map(|&id| table.as_double(id).ok())
                .fold(f64::NEG_INFINITY, f64::max)
        }),
        "Largest numeric argument",
    )?;
    table.add_builtin_function(
        root,
        "count",
        variadic(|_: &mut SymbolTable, args: &[EntryId]| args.len()),
        "Number of arguments",
    )?;
    Ok(())
}

/// Build the demo tree:
///
/// ```text
/// output = run.dat;
/// seed = 1;
/// world = {
///   pop = { .. }    // a Population instance
/// }
/// ```
pub fn build_demo() -> Result<Demo, BindError> {
    let registry = demo_registry()?;
    let mut table = SymbolTable::new();
    let root = table.root();

    let output = Linked::default();
    let id = table.link_var(root, "output", &output, "File to write results to", "run.dat".to_string())?;
    table.entry_mut(id).set_kind(ValueKind::Filename);

    let seed = Linked::default();
    let id = table.link_var(root, "seed", &seed, "Random number seed", 1)?;
    table.entry_mut(id).set_integer_only(true);

    let world = table.add_scope(root, "world", "World settings", "")?;
    let population = registry.instantiate("Population", &mut table, world, "pop", "Main population")?;
    add_root_functions(&mut table, root)?;

    Ok(Demo {
        table,
        registry,
        output,
        seed,
        population,
    })
}
