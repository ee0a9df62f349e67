//! The set of models an application declares.

use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::field::FieldSpec;
use crate::index::IndexSpec;
use crate::model::Model;
use crate::rich::RichType;
use crate::types::TypeRegistry;

/// A handle to one definition of a model.
///
/// Redefining the model invalidates handles to the earlier definition.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModelRef {
    name: SmolStr,
    generation: u64,
}

impl ModelRef {
    /// Name of the referenced model.
    pub fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone)]
struct Entry {
    model: Model,
    generation: u64,
}

/// Everything declared for one table, merged across the models stored in it.
#[derive(Debug, Clone)]
pub struct DeclaredTable {
    /// Table name.
    pub name: SmolStr,
    /// Primary key column.
    pub primary_key: SmolStr,
    /// Declared fields, ordered by position.
    pub fields: Vec<FieldSpec>,
    /// Declared indexes.
    pub indexes: Vec<IndexSpec>,
    /// Observed indexes to leave alone.
    pub ignored_indexes: Vec<SmolStr>,
}

impl DeclaredTable {
    /// Get a declared field by name.
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name() == name)
    }

    /// Check whether the table declares an index with the given name.
    pub fn index(&self, name: &str) -> Option<&IndexSpec> {
        self.indexes.iter().find(|i| i.name() == name)
    }
}

/// All defined models, with the type registry they were declared against.
#[derive(Debug, Clone)]
pub struct Catalog {
    types: TypeRegistry,
    models: IndexMap<SmolStr, Entry>,
    next_generation: u64,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new(types: TypeRegistry) -> Self {
        Self {
            types,
            models: IndexMap::new(),
            next_generation: 0,
        }
    }

    /// Type registry used for declarations.
    pub fn types(&self) -> &TypeRegistry {
        &self.types
    }

    /// Define (or redefine) a model.
    pub fn define(&mut self, model: Model) -> ModelRef {
        let name = SmolStr::new(model.name());
        let generation = self.next_generation;
        self.next_generation += 1;

        if self.models.contains_key(&name) {
            debug!(model = %name, generation, "redefined model");
        } else {
            debug!(model = %name, generation, "defined model");
        }
        self.models.insert(name.clone(), Entry { model, generation });
        ModelRef { name, generation }
    }

    /// Start a subclass of a defined model.
    ///
    /// The parent gains the inheritance column and its index; the returned
    /// model is a copy of the parent to declare further fields on before
    /// passing it to [`Catalog::define`].
    pub fn subclass(&mut self, parent: &str, name: impl Into<SmolStr>) -> SchemaResult<Model> {
        let entry = self
            .models
            .get_mut(parent)
            .ok_or_else(|| SchemaError::unknown_model(parent))?;
        entry.model.declare_inheritance_column(&self.types)?;
        Ok(entry.model.subclass(name))
    }

    /// Look up the current definition of a model.
    pub fn lookup(&self, name: &str) -> SchemaResult<ModelRef> {
        self.models
            .get_key_value(name)
            .map(|(name, entry)| ModelRef {
                name: name.clone(),
                generation: entry.generation,
            })
            .ok_or_else(|| SchemaError::unknown_model(name))
    }

    /// Resolve a handle to its model.
    ///
    /// Fails when the model was redefined after the handle was taken.
    pub fn get(&self, model: &ModelRef) -> SchemaResult<&Model> {
        let entry = self
            .models
            .get(&model.name)
            .ok_or_else(|| SchemaError::unknown_model(&*model.name))?;
        if entry.generation != model.generation {
            return Err(SchemaError::stale_model(&*model.name));
        }
        Ok(&entry.model)
    }

    /// Rich type of a model attribute.
    pub fn attr_type(&self, model: &ModelRef, field: &str) -> SchemaResult<Option<&RichType>> {
        Ok(self.get(model)?.attr_type(field))
    }

    /// Get a model by name.
    pub fn model(&self, name: &str) -> Option<&Model> {
        self.models.get(name).map(|e| &e.model)
    }

    /// Iterate over models in definition order.
    pub fn models(&self) -> impl Iterator<Item = &Model> {
        self.models.values().map(|e| &e.model)
    }

    /// Number of defined models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Check if no models are defined.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Tables declared by models that take part in migrations.
    ///
    /// Models sharing a table are merged in definition order; the first
    /// model to declare a field or index name wins.
    pub fn tables(&self) -> Vec<DeclaredTable> {
        let mut tables: IndexMap<SmolStr, DeclaredTable> = IndexMap::new();

        for model in self.models().filter(|m| m.include_in_migration()) {
            let table = tables
                .entry(SmolStr::new(model.table_name()))
                .or_insert_with(|| DeclaredTable {
                    name: SmolStr::new(model.table_name()),
                    primary_key: SmolStr::new(model.primary_key()),
                    fields: Vec::new(),
                    indexes: Vec::new(),
                    ignored_indexes: Vec::new(),
                });

            for field in model.field_specs() {
                if table.field(field.name()).is_none() {
                    let mut field = field.clone();
                    field.set_position(table.fields.len());
                    table.fields.push(field);
                }
            }
            for index in model.index_specs() {
                if table.index(index.name()).is_none() {
                    table.indexes.push(index.clone());
                }
            }
            for ignored in model.ignored_indexes() {
                if !table.ignored_indexes.contains(ignored) {
                    table.ignored_indexes.push(ignored.clone());
                }
            }
        }

        tables.into_values().collect()
    }

    /// Tables that belong only to models outside migrations.
    pub fn excluded_tables(&self) -> Vec<SmolStr> {
        let included: Vec<&str> = self
            .models()
            .filter(|m| m.include_in_migration())
            .map(|m| m.table_name())
            .collect();

        let mut excluded: Vec<SmolStr> = Vec::new();
        for model in self.models().filter(|m| !m.include_in_migration()) {
            let table = SmolStr::new(model.table_name());
            if !included.contains(&model.table_name()) && !excluded.contains(&table) {
                excluded.push(table);
            }
        }
        excluded
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(TypeRegistry::default())
    }
}
