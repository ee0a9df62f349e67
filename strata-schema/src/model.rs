//! Per-model declaration registry.

use convert_case::{Case, Casing};
use indexmap::IndexMap;
use smol_str::SmolStr;
use tracing::debug;

use crate::error::{SchemaError, SchemaResult};
use crate::field::{FieldOptions, FieldSpec, IndexOption};
use crate::index::{IndexOptions, IndexSpec};
use crate::rich::RichType;
use crate::types::TypeRegistry;

/// Default primary key column.
pub const DEFAULT_PRIMARY_KEY: &str = "id";

/// Default single-table-inheritance discriminator column.
pub const DEFAULT_INHERITANCE_COLUMN: &str = "type";

/// Default column used by [`Model::acts_as_list`].
pub const DEFAULT_LIST_COLUMN: &str = "position";

/// Options for a `belongs_to` association.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BelongsToOptions {
    /// Also declare a `<name>_type` column.
    pub polymorphic: bool,
    /// Nullability of the declared columns.
    pub null: Option<bool>,
    /// `None` for the default index name, `Some(false)` for no index.
    pub index: Option<IndexOption>,
}

impl BelongsToOptions {
    /// Create default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the association polymorphic.
    pub fn polymorphic(mut self) -> Self {
        self.polymorphic = true;
        self
    }

    /// Set nullability of the foreign key.
    pub fn null(mut self, null: bool) -> Self {
        self.null = Some(null);
        self
    }

    /// Do not index the foreign key.
    pub fn without_index(mut self) -> Self {
        self.index = Some(IndexOption::Flag(false));
        self
    }

    /// Name the foreign key index.
    pub fn index_named(mut self, name: impl Into<SmolStr>) -> Self {
        self.index = Some(IndexOption::Named(name.into()));
        self
    }
}

/// Naive English plural used for conventional table names.
fn pluralize(word: &str) -> String {
    if let Some(stem) = word.strip_suffix('y') {
        if !stem.ends_with(['a', 'e', 'i', 'o', 'u']) {
            return format!("{stem}ies");
        }
    }
    if word.ends_with(['s', 'x', 'z']) || word.ends_with("ch") || word.ends_with("sh") {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Conventional table name for a model name (`BlogPost` -> `blog_posts`).
pub fn table_name_for(model: &str) -> String {
    pluralize(&model.to_case(Case::Snake))
}

/// A model and its declared fields and indexes.
///
/// Declarations accumulate: a field declared again under the same name
/// replaces the earlier spec but keeps its position.
#[derive(Debug, Clone)]
pub struct Model {
    name: SmolStr,
    table_name: SmolStr,
    primary_key: SmolStr,
    inheritance_column: SmolStr,
    parent: Option<SmolStr>,
    fields: IndexMap<SmolStr, FieldSpec>,
    indexes: Vec<IndexSpec>,
    ignored_indexes: Vec<SmolStr>,
    include_in_migration: bool,
    attr_types: IndexMap<SmolStr, RichType>,
}

impl Model {
    /// Create a model with conventional table and key names.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        let name = name.into();
        let table_name = SmolStr::new(table_name_for(&name));
        Self {
            name,
            table_name,
            primary_key: SmolStr::new_static(DEFAULT_PRIMARY_KEY),
            inheritance_column: SmolStr::new_static(DEFAULT_INHERITANCE_COLUMN),
            parent: None,
            fields: IndexMap::new(),
            indexes: Vec::new(),
            ignored_indexes: Vec::new(),
            include_in_migration: false,
            attr_types: IndexMap::new(),
        }
    }

    /// Use an explicit table name.
    pub fn with_table_name(mut self, table_name: impl Into<SmolStr>) -> Self {
        self.table_name = table_name.into();
        self
    }

    /// Use an explicit primary key column.
    pub fn with_primary_key(mut self, primary_key: impl Into<SmolStr>) -> Self {
        self.primary_key = primary_key.into();
        self
    }

    /// Use an explicit inheritance column.
    pub fn with_inheritance_column(mut self, column: impl Into<SmolStr>) -> Self {
        self.inheritance_column = column.into();
        self
    }

    /// Model name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Table the model is stored in.
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Primary key column.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// Inheritance discriminator column.
    pub fn inheritance_column(&self) -> &str {
        &self.inheritance_column
    }

    /// Name of the parent model, for subclasses.
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Whether the model takes part in migration generation.
    pub fn include_in_migration(&self) -> bool {
        self.include_in_migration
    }

    /// Opt the model in or out of migration generation.
    pub fn set_include_in_migration(&mut self, include: bool) {
        self.include_in_migration = include;
    }

    /// Get a declared field by name.
    pub fn field_spec(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Number of declared fields.
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Declared fields, ordered by position.
    pub fn field_specs(&self) -> Vec<&FieldSpec> {
        let mut specs: Vec<&FieldSpec> = self.fields.values().collect();
        specs.sort_by_key(|f| f.position());
        specs
    }

    /// Declared indexes, in declaration order.
    pub fn index_specs(&self) -> &[IndexSpec] {
        &self.indexes
    }

    /// Names of observed indexes to leave alone.
    pub fn ignored_indexes(&self) -> &[SmolStr] {
        &self.ignored_indexes
    }

    /// Rich type of a declared attribute, if it has one.
    pub fn attr_type(&self, name: &str) -> Option<&RichType> {
        self.attr_types.get(name)
    }

    /// Declare a field.
    ///
    /// The type is resolved immediately, so an unknown type fails here and
    /// leaves the model unchanged.
    pub fn declare_field(
        &mut self,
        name: impl Into<SmolStr>,
        type_name: impl Into<SmolStr>,
        options: FieldOptions,
        types: &TypeRegistry,
    ) -> SchemaResult<()> {
        let index = options.index.clone();
        let unique = options.unique;
        let spec = FieldSpec::new(self, name, type_name, options, types)?;
        let name = SmolStr::new(spec.name());

        match types.rich_types().resolve(spec.type_name()) {
            Some(rich) => {
                self.attr_types.insert(name.clone(), rich.clone());
            }
            None => {
                self.attr_types.shift_remove(&name);
            }
        }

        debug!(
            model = %self.name,
            field = %name,
            sql_type = spec.sql_type(),
            position = spec.position(),
            "declared field"
        );
        self.fields.insert(name.clone(), spec);

        match index {
            Some(IndexOption::Flag(true)) => {
                self.declare_index([name], IndexOptions::new().unique(unique))?;
            }
            Some(IndexOption::Named(index_name)) => {
                self.declare_index([name], IndexOptions::new().unique(unique).name(index_name))?;
            }
            Some(IndexOption::Flag(false)) | None => {}
        }
        Ok(())
    }

    /// Declare an index over an ordered list of fields.
    ///
    /// Returns `false` when an index over the same field list already exists.
    pub fn declare_index<I, S>(&mut self, fields: I, options: IndexOptions) -> SchemaResult<bool>
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let fields: Vec<SmolStr> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(SchemaError::invalid_index(&*self.name, "an index needs at least one field"));
        }
        if self.indexes.iter().any(|index| index.covers(&fields)) {
            debug!(model = %self.name, ?fields, "index already declared");
            return Ok(false);
        }

        let index = IndexSpec::new(self.table_name.clone(), fields, options);
        debug!(model = %self.name, index = index.name(), "declared index");
        self.indexes.push(index);
        Ok(true)
    }

    /// Leave an existing index alone during reconciliation.
    pub fn ignore_index(&mut self, name: impl Into<SmolStr>) {
        let name = name.into();
        if !self.ignored_indexes.contains(&name) {
            self.ignored_indexes.push(name);
        }
    }

    /// Declare the foreign key of a `belongs_to` association.
    ///
    /// Declares `<name>_id` and an index on it. A polymorphic association
    /// also declares `<name>_type` and indexes `[<name>_type, <name>_id]`.
    pub fn belongs_to(
        &mut self,
        name: &str,
        options: BelongsToOptions,
        types: &TypeRegistry,
    ) -> SchemaResult<()> {
        let foreign_key = format!("{name}_id");
        let mut column_options = FieldOptions::new();
        column_options.null = options.null;

        self.declare_field(&*foreign_key, "integer", column_options.clone(), types)?;

        let index_fields = if options.polymorphic {
            let type_column = format!("{name}_type");
            self.declare_field(&*type_column, "string", column_options, types)?;
            vec![SmolStr::new(type_column), SmolStr::new(foreign_key)]
        } else {
            vec![SmolStr::new(foreign_key)]
        };

        match options.index {
            Some(IndexOption::Flag(false)) => {}
            Some(IndexOption::Named(index_name)) => {
                self.declare_index(index_fields, IndexOptions::new().name(index_name))?;
            }
            Some(IndexOption::Flag(true)) | None => {
                self.declare_index(index_fields, IndexOptions::new())?;
            }
        }
        Ok(())
    }

    /// Declare the integer column used to order list members.
    pub fn acts_as_list(&mut self, column: Option<&str>, types: &TypeRegistry) -> SchemaResult<()> {
        self.declare_field(
            column.unwrap_or(DEFAULT_LIST_COLUMN),
            "integer",
            FieldOptions::new(),
            types,
        )
    }

    /// Declare `created_at` and `updated_at`.
    pub fn timestamps(&mut self, types: &TypeRegistry) -> SchemaResult<()> {
        self.declare_field("created_at", "datetime", FieldOptions::new(), types)?;
        self.declare_field("updated_at", "datetime", FieldOptions::new(), types)
    }

    /// Declare the inheritance column and its index.
    pub fn declare_inheritance_column(&mut self, types: &TypeRegistry) -> SchemaResult<()> {
        let column = self.inheritance_column.clone();
        if self.fields.contains_key(&column) {
            return Ok(());
        }
        self.declare_field(column.clone(), "string", FieldOptions::new(), types)?;
        self.declare_index([column], IndexOptions::new())?;
        Ok(())
    }

    /// Create a subclass that starts with a copy of this model's declarations.
    ///
    /// The subclass shares the table. Later declarations on either model do
    /// not affect the other.
    pub fn subclass(&self, name: impl Into<SmolStr>) -> Self {
        let name = name.into();
        let fields = self
            .fields
            .iter()
            .map(|(key, spec)| (key.clone(), spec.with_owner(&name)))
            .collect();

        Self {
            parent: Some(self.name.clone()),
            fields,
            name,
            ..self.clone()
        }
    }

    /// Run a block of declarations and opt the model into migrations.
    pub fn declare<F>(&mut self, types: &TypeRegistry, block: F) -> SchemaResult<()>
    where
        F: FnOnce(&mut FieldDeclarations<'_>) -> SchemaResult<()>,
    {
        self.include_in_migration = true;
        let mut declarations = FieldDeclarations { model: self, types };
        block(&mut declarations)
    }
}

/// Builder handed to [`Model::declare`].
pub struct FieldDeclarations<'a> {
    model: &'a mut Model,
    types: &'a TypeRegistry,
}

impl FieldDeclarations<'_> {
    /// Declare a field.
    pub fn field(
        &mut self,
        name: &str,
        type_name: &str,
        options: FieldOptions,
    ) -> SchemaResult<&mut Self> {
        self.model.declare_field(name, type_name, options, self.types)?;
        Ok(self)
    }

    /// Declare a field without options.
    pub fn column(&mut self, name: &str, type_name: &str) -> SchemaResult<&mut Self> {
        self.field(name, type_name, FieldOptions::new())
    }

    /// Declare `created_at` and `updated_at`.
    pub fn timestamps(&mut self) -> SchemaResult<&mut Self> {
        self.model.timestamps(self.types)?;
        Ok(self)
    }

    /// Declare an index.
    pub fn index(&mut self, fields: &[&str], options: IndexOptions) -> SchemaResult<&mut Self> {
        self.model.declare_index(fields.iter().copied(), options)?;
        Ok(self)
    }

    /// Declare a `belongs_to` foreign key.
    pub fn belongs_to(&mut self, name: &str, options: BelongsToOptions) -> SchemaResult<&mut Self> {
        self.model.belongs_to(name, options, self.types)?;
        Ok(self)
    }

    /// Declare a list position column.
    pub fn acts_as_list(&mut self, column: Option<&str>) -> SchemaResult<&mut Self> {
        self.model.acts_as_list(column, self.types)?;
        Ok(self)
    }

    /// Ignore an existing index.
    pub fn ignore_index(&mut self, name: &str) -> &mut Self {
        self.model.ignore_index(name);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn names(model: &Model) -> Vec<&str> {
        model.field_specs().into_iter().map(|f| f.name()).collect()
    }

    #[test]
    fn test_table_name_convention() {
        assert_eq!(table_name_for("BlogPost"), "blog_posts");
        assert_eq!(table_name_for("Category"), "categories");
        assert_eq!(table_name_for("Address"), "addresses");
        assert_eq!(table_name_for("Day"), "days");
        assert_eq!(Model::new("User").table_name(), "users");
    }

    #[test]
    fn test_declaration_order_and_redeclaration() {
        let types = TypeRegistry::default();
        let mut model = Model::new("Post");
        model.declare_field("title", "string", FieldOptions::new(), &types).unwrap();
        model.declare_field("body", "text", FieldOptions::new(), &types).unwrap();
        model
            .declare_field("title", "string", FieldOptions::new().limit(80), &types)
            .unwrap();

        assert_eq!(names(&model), vec!["title", "body"]);
        assert_eq!(model.field_spec("title").unwrap().limit(), Some(80));
    }

    #[test]
    fn test_redeclaring_with_plain_type_clears_rich_type() {
        let types = TypeRegistry::default();
        let mut model = Model::new("User");
        model
            .declare_field("email", "email_address", FieldOptions::new(), &types)
            .unwrap();
        assert_eq!(model.attr_type("email").map(RichType::name), Some("email_address"));

        model.declare_field("email", "text", FieldOptions::new(), &types).unwrap();
        assert!(model.attr_type("email").is_none());
        assert_eq!(model.field_spec("email").unwrap().sql_type(), "text");

        model
            .declare_field("email", "email_address", FieldOptions::new(), &types)
            .unwrap();
        assert_eq!(model.attr_type("email").map(RichType::name), Some("email_address"));
        assert_eq!(names(&model), vec!["email"]);
    }

    #[test]
    fn test_explicit_position() {
        let types = TypeRegistry::default();
        let mut model = Model::new("Post");
        model
            .declare_field("slug", "string", FieldOptions::new().position(10), &types)
            .unwrap();
        model.declare_field("title", "string", FieldOptions::new(), &types).unwrap();

        assert_eq!(model.field_spec("title").unwrap().position(), 1);
        assert_eq!(names(&model), vec!["title", "slug"]);
    }

    #[test]
    fn test_primary_key_guard_leaves_model_unchanged() {
        let types = TypeRegistry::default();
        let mut model = Model::new("Post").with_primary_key("post_id");
        let err = model
            .declare_field("post_id", "integer", FieldOptions::new(), &types)
            .unwrap_err();

        assert!(matches!(err, SchemaError::PrimaryKeyField { .. }));
        assert_eq!(model.field_count(), 0);
    }

    #[test]
    fn test_unknown_type_leaves_model_unchanged() {
        let types = TypeRegistry::default();
        let mut model = Model::new("Post");
        let err = model
            .declare_field("body", "wiki_markup", FieldOptions::new(), &types)
            .unwrap_err();

        assert!(err.is_unknown_sql_type());
        assert_eq!(model.field_count(), 0);
    }

    #[test]
    fn test_index_deduplication() {
        let mut model = Model::new("Comment");
        assert!(model.declare_index(["post_id", "created_at"], IndexOptions::new()).unwrap());
        assert!(!model.declare_index(["post_id", "created_at"], IndexOptions::new()).unwrap());
        assert!(model.declare_index(["created_at", "post_id"], IndexOptions::new()).unwrap());

        assert_eq!(model.index_specs().len(), 2);
    }

    #[test]
    fn test_empty_index_rejected() {
        let mut model = Model::new("Comment");
        let err = model
            .declare_index(Vec::<SmolStr>::new(), IndexOptions::new())
            .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidIndex { .. }));
    }

    #[test]
    fn test_field_index_option() {
        let types = TypeRegistry::default();
        let mut model = Model::new("User");
        model
            .declare_field("email", "email_address", FieldOptions::new().indexed().unique(), &types)
            .unwrap();
        model
            .declare_field("login", "string", FieldOptions::new().index_named("by_login"), &types)
            .unwrap();

        let indexes = model.index_specs();
        assert_eq!(indexes[0].name(), "index_users_on_email");
        assert!(indexes[0].is_unique());
        assert_eq!(indexes[1].name(), "by_login");
        assert!(!indexes[1].is_unique());
    }

    #[test]
    fn test_rich_attr_type_recorded() {
        let types = TypeRegistry::default();
        let mut model = Model::new("User");
        model
            .declare_field("email", "email_address", FieldOptions::new(), &types)
            .unwrap();
        model.declare_field("name", "string", FieldOptions::new(), &types).unwrap();

        assert_eq!(model.attr_type("email").unwrap().name(), "email_address");
        assert!(model.attr_type("name").is_none());
    }

    #[test]
    fn test_belongs_to() {
        let types = TypeRegistry::default();
        let mut model = Model::new("Comment");
        model
            .belongs_to("post", BelongsToOptions::new().null(false), &types)
            .unwrap();

        let fk = model.field_spec("post_id").unwrap();
        assert_eq!(fk.sql_type(), "integer");
        assert!(!fk.null());
        assert_eq!(model.index_specs()[0].name(), "index_comments_on_post_id");
    }

    #[test]
    fn test_belongs_to_polymorphic() {
        let types = TypeRegistry::default();
        let mut model = Model::new("Comment");
        model
            .belongs_to("commentable", BelongsToOptions::new().polymorphic(), &types)
            .unwrap();

        assert_eq!(names(&model), vec!["commentable_id", "commentable_type"]);
        assert_eq!(
            model.index_specs()[0].fields(),
            &[SmolStr::new("commentable_type"), SmolStr::new("commentable_id")]
        );
    }

    #[test]
    fn test_belongs_to_without_index() {
        let types = TypeRegistry::default();
        let mut model = Model::new("Comment");
        model
            .belongs_to("post", BelongsToOptions::new().without_index(), &types)
            .unwrap();
        assert!(model.index_specs().is_empty());
    }

    #[test]
    fn test_acts_as_list() {
        let types = TypeRegistry::default();
        let mut model = Model::new("Item");
        model.acts_as_list(None, &types).unwrap();
        model.acts_as_list(Some("rank"), &types).unwrap();
        assert_eq!(names(&model), vec!["position", "rank"]);
    }

    #[test]
    fn test_subclass_copies_declarations() {
        let types = TypeRegistry::default();
        let mut parent = Model::new("Animal");
        parent.declare(&types, |f| {
            f.column("name", "string")?;
            Ok(())
        })
        .unwrap();
        parent.declare_inheritance_column(&types).unwrap();

        let mut child = parent.subclass("Dog");
        child.declare_field("breed", "string", FieldOptions::new(), &types).unwrap();

        assert_eq!(child.parent(), Some("Animal"));
        assert_eq!(child.table_name(), "animals");
        assert!(child.include_in_migration());
        assert_eq!(names(&child), vec!["name", "type", "breed"]);
        assert_eq!(child.field_spec("name").unwrap().owner(), "Dog");
        assert_eq!(child.index_specs().len(), 1);

        assert!(parent.field_spec("breed").is_none());
    }

    #[test]
    fn test_declare_block_opts_in() {
        let types = TypeRegistry::default();
        let mut model = Model::new("Post");
        assert!(!model.include_in_migration());

        model
            .declare(&types, |f| {
                f.column("title", "string")?
                    .field("body", "text", FieldOptions::new().null(false))?
                    .timestamps()?
                    .index(&["title"], IndexOptions::new())?;
                Ok(())
            })
            .unwrap();

        assert!(model.include_in_migration());
        assert_eq!(names(&model), vec!["title", "body", "created_at", "updated_at"]);
        assert_eq!(model.index_specs().len(), 1);
    }
}
