//! Declared fields and their comparison against physical columns.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::column::{ColumnDefinition, ObservedColumn};
use crate::error::{SchemaError, SchemaResult};
use crate::model::Model;
use crate::quirks::Attribute;
use crate::types::{ComparisonRules, TypeRegistry, TypeSynonyms};
use crate::value::Value;

/// Resolved types whose storage limit is a meaningful, alterable property.
const LIMITED_TYPES: &[&str] = &["string", "text", "binary", "integer"];

/// Resolved types whose precision and scale are compared.
const NUMERIC_TYPES: &[&str] = &["decimal"];

/// Resolved types whose defaults are compared as date-times.
const DATETIME_TYPES: &[&str] = &["datetime", "timestamp"];

/// Index request attached to a field declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexOption {
    /// `true` indexes with the default name, `false` does nothing.
    Flag(bool),
    /// Index with an explicit name.
    Named(SmolStr),
}

/// Options of a field declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    /// Explicit SQL storage type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_type: Option<SmolStr>,
    /// Storage limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    /// Numeric precision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u32>,
    /// Numeric scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u32>,
    /// Whether NULL is allowed (defaults to `true`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub null: Option<bool>,
    /// Default value.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Index to declare alongside the field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexOption>,
    /// Whether the field's index is unique.
    pub unique: bool,
    /// Explicit ordinal position.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
}

impl FieldOptions {
    /// Create empty options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an explicit SQL type.
    pub fn sql_type(mut self, sql_type: impl Into<SmolStr>) -> Self {
        self.sql_type = Some(sql_type.into());
        self
    }

    /// Set the limit.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Set precision.
    pub fn precision(mut self, precision: u32) -> Self {
        self.precision = Some(precision);
        self
    }

    /// Set scale.
    pub fn scale(mut self, scale: u32) -> Self {
        self.scale = Some(scale);
        self
    }

    /// Set nullability.
    pub fn null(mut self, null: bool) -> Self {
        self.null = Some(null);
        self
    }

    /// Set the default value.
    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Index the field under its default index name.
    pub fn indexed(mut self) -> Self {
        self.index = Some(IndexOption::Flag(true));
        self
    }

    /// Index the field under an explicit name.
    pub fn index_named(mut self, name: impl Into<SmolStr>) -> Self {
        self.index = Some(IndexOption::Named(name.into()));
        self
    }

    /// Make the field's index unique.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Set an explicit position.
    pub fn position(mut self, position: usize) -> Self {
        self.position = Some(position);
        self
    }
}

/// A declared field.
///
/// The SQL storage type is resolved once at construction; a field whose type
/// cannot be resolved is never constructed.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    owner: SmolStr,
    name: SmolStr,
    type_name: SmolStr,
    position: usize,
    options: FieldOptions,
    sql_type: SmolStr,
    native_limit: Option<u32>,
}

impl FieldSpec {
    /// Declare a field on `model`.
    ///
    /// Without an explicit position the field keeps the position of a
    /// same-named earlier declaration, or goes after all declared fields.
    pub fn new(
        model: &Model,
        name: impl Into<SmolStr>,
        type_name: impl Into<SmolStr>,
        mut options: FieldOptions,
        types: &TypeRegistry,
    ) -> SchemaResult<Self> {
        let name = name.into();
        let type_name = type_name.into();

        if name == model.primary_key() {
            return Err(SchemaError::primary_key_field(model.name(), name));
        }

        let sql_type = types
            .resolve_sql_type(&type_name, options.sql_type.as_deref())
            .ok_or_else(|| SchemaError::unknown_sql_type(model.name(), name.as_str(), type_name.as_str()))?;
        let native_limit = types.native_limit(&sql_type);

        let position = options.position.take().unwrap_or_else(|| {
            model
                .field_spec(&name)
                .map(|existing| existing.position())
                .unwrap_or_else(|| model.field_count())
        });

        Ok(Self {
            owner: SmolStr::new(model.name()),
            name,
            type_name,
            position,
            options,
            sql_type,
            native_limit,
        })
    }

    /// Copy of this field owned by another model.
    pub(crate) fn with_owner(&self, owner: &str) -> Self {
        Self {
            owner: SmolStr::new(owner),
            ..self.clone()
        }
    }

    /// Name of the owning model.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Field name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared type name (native or rich).
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Ordinal position.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Move the field to another position.
    pub fn set_position(&mut self, position: usize) {
        self.position = position;
    }

    /// Declaration options.
    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Resolved SQL storage type.
    pub fn sql_type(&self) -> &str {
        &self.sql_type
    }

    /// Storage limit: explicit, or the native default for the type.
    pub fn limit(&self) -> Option<u32> {
        self.options.limit.or(self.native_limit)
    }

    /// Numeric precision.
    pub fn precision(&self) -> Option<u32> {
        self.options.precision
    }

    /// Numeric scale.
    pub fn scale(&self) -> Option<u32> {
        self.options.scale
    }

    /// Whether NULL is allowed.
    pub fn null(&self) -> bool {
        self.options.null.unwrap_or(true)
    }

    /// Default value.
    pub fn default(&self) -> Option<&Value> {
        self.options.default.as_ref()
    }

    /// The column a migration for this field would create.
    pub fn definition(&self) -> ColumnDefinition {
        ColumnDefinition {
            name: self.name.clone(),
            sql_type: self.sql_type.clone(),
            limit: self.limit(),
            precision: self.precision(),
            scale: self.scale(),
            null: self.null(),
            default: self.default().cloned(),
        }
    }

    /// Check whether the observed column has the same type.
    pub fn same_type(&self, column: &ObservedColumn, synonyms: &TypeSynonyms) -> bool {
        synonyms.same(&self.sql_type, column.sql_type())
    }

    /// Attributes that would be compared against a column from `column`'s engine.
    fn checked_attributes(&self, column: &ObservedColumn, rules: &ComparisonRules) -> Vec<Attribute> {
        let sql_type = self.sql_type.as_str();
        let mut checked = vec![Attribute::Null, Attribute::Default];

        if NUMERIC_TYPES.contains(&sql_type) {
            checked.extend([Attribute::Precision, Attribute::Scale]);
        }
        if LIMITED_TYPES.contains(&sql_type) {
            checked.push(Attribute::Limit);
        }

        checked.retain(|attr| !rules.quirks.excludes(column.engine, sql_type, *attr));
        checked
    }

    /// Compare one attribute with the column.
    fn attribute_differs(&self, attribute: Attribute, column: &ObservedColumn) -> bool {
        let observed = &column.definition;
        match attribute {
            Attribute::Null => observed.null != self.null(),
            Attribute::Precision => observed.precision != self.precision(),
            Attribute::Scale => observed.scale != self.scale(),
            Attribute::Limit => observed.limit != self.limit(),
            Attribute::Default if DATETIME_TYPES.contains(&self.sql_type.as_str()) => {
                let declared = self.default().and_then(Value::to_datetime);
                let actual = observed.default.as_ref().and_then(Value::to_datetime);
                declared != actual
            }
            Attribute::Default => observed.default.as_ref() != self.default(),
        }
    }

    /// Attributes in which the column differs from this declaration.
    ///
    /// Only meaningful when [`FieldSpec::same_type`] holds.
    pub fn differences(&self, column: &ObservedColumn, rules: &ComparisonRules) -> Vec<Attribute> {
        self.checked_attributes(column, rules)
            .into_iter()
            .filter(|attr| self.attribute_differs(*attr, column))
            .collect()
    }

    /// Check whether the declaration and the column are out of sync.
    pub fn different_to(&self, column: &ObservedColumn, rules: &ComparisonRules) -> bool {
        !self.same_type(column, &rules.synonyms) || !self.differences(column, rules).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Engine;
    use pretty_assertions::assert_eq;

    fn model() -> Model {
        Model::new("Article")
    }

    fn spec(type_name: &str, options: FieldOptions, engine: Engine) -> FieldSpec {
        FieldSpec::new(&model(), "value", type_name, options, &TypeRegistry::new(engine)).unwrap()
    }

    fn observed(engine: Engine, definition: ColumnDefinition) -> ObservedColumn {
        ObservedColumn::new(engine, definition)
    }

    #[test]
    fn test_primary_key_guard() {
        let err = FieldSpec::new(&model(), "id", "integer", FieldOptions::new(), &TypeRegistry::default())
            .unwrap_err();
        assert!(matches!(err, SchemaError::PrimaryKeyField { .. }));
    }

    #[test]
    fn test_unknown_type_fails_at_construction() {
        let err = FieldSpec::new(&model(), "body", "richtext", FieldOptions::new(), &TypeRegistry::default())
            .unwrap_err();
        match err {
            SchemaError::UnknownSqlType { model, field, type_name } => {
                assert_eq!(model, "Article");
                assert_eq!(field, "body");
                assert_eq!(type_name, "richtext");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_sql_type_resolution_order() {
        let explicit = spec("email_address", FieldOptions::new().sql_type("citext"), Engine::Postgresql);
        assert_eq!(explicit.sql_type(), "citext");

        let native = spec("text", FieldOptions::new(), Engine::Postgresql);
        assert_eq!(native.sql_type(), "text");

        let rich = spec("email_address", FieldOptions::new(), Engine::Postgresql);
        assert_eq!(rich.sql_type(), "string");
        assert_eq!(rich.type_name(), "email_address");
    }

    #[test]
    fn test_derived_accessors() {
        let field = spec("string", FieldOptions::new(), Engine::Mysql);
        assert_eq!(field.limit(), Some(255));
        assert!(field.null());
        assert_eq!(field.default(), None);
        assert_eq!(field.precision(), None);

        let field = spec("string", FieldOptions::new().limit(40).null(false), Engine::Mysql);
        assert_eq!(field.limit(), Some(40));
        assert!(!field.null());
    }

    #[test]
    fn test_not_different_to_its_own_column() {
        let cases = [
            ("string", FieldOptions::new().null(false).default_value("draft")),
            ("text", FieldOptions::new().default_value("")),
            ("integer", FieldOptions::new().default_value(0)),
            ("decimal", FieldOptions::new().precision(10).scale(2)),
            ("datetime", FieldOptions::new().default_value("2024-01-01 00:00:00")),
            ("timestamp", FieldOptions::new()),
            ("boolean", FieldOptions::new().default_value(false)),
            ("binary", FieldOptions::new().limit(1024)),
            ("email_address", FieldOptions::new()),
        ];
        let rules = ComparisonRules::default();

        for engine in [Engine::Postgresql, Engine::Mysql, Engine::Sqlite] {
            for (type_name, options) in cases.iter().cloned() {
                let field = spec(type_name, options, engine);
                let column = observed(engine, field.definition());
                assert!(
                    !field.different_to(&column, &rules),
                    "{type_name} on {engine} should match its own column"
                );
            }
        }
    }

    #[test]
    fn test_type_change_short_circuits() {
        let field = spec("text", FieldOptions::new(), Engine::Postgresql);
        let column = observed(Engine::Postgresql, ColumnDefinition::new("value", "string").limit(255));
        assert!(!field.same_type(&column, &TypeSynonyms::default()));
        assert!(field.different_to(&column, &ComparisonRules::default()));
    }

    #[test]
    fn test_timestamp_datetime_synonyms() {
        let rules = ComparisonRules::default();
        let timestamp = spec("timestamp", FieldOptions::new(), Engine::Postgresql);
        let datetime = spec("datetime", FieldOptions::new(), Engine::Postgresql);

        let datetime_column = observed(Engine::Postgresql, datetime.definition());
        let timestamp_column = observed(Engine::Postgresql, timestamp.definition());

        assert!(timestamp.same_type(&datetime_column, &rules.synonyms));
        assert!(datetime.same_type(&timestamp_column, &rules.synonyms));
        assert!(!timestamp.different_to(&datetime_column, &rules));
        assert!(!datetime.different_to(&timestamp_column, &rules));
    }

    #[test]
    fn test_datetime_default_formatting_ignored() {
        let rules = ComparisonRules::default();
        let field = spec(
            "datetime",
            FieldOptions::new().default_value("2024-03-01T12:30:00"),
            Engine::Postgresql,
        );
        let column = observed(
            Engine::Postgresql,
            ColumnDefinition::new("value", "datetime").default_value("2024-03-01 12:30:00"),
        );
        assert!(!field.different_to(&column, &rules));

        let later = observed(
            Engine::Postgresql,
            ColumnDefinition::new("value", "datetime").default_value("2024-03-01 12:31:00"),
        );
        assert!(field.different_to(&later, &rules));
        assert_eq!(field.differences(&later, &rules), vec![Attribute::Default]);
    }

    #[test]
    fn test_datetime_uncoercible_defaults_compare_as_none() {
        let rules = ComparisonRules::default();
        let field = spec("datetime", FieldOptions::new().default_value("whenever"), Engine::Sqlite);
        let column = observed(Engine::Sqlite, ColumnDefinition::new("value", "datetime"));
        assert!(!field.different_to(&column, &rules));
    }

    #[test]
    fn test_mysql_text_default_excluded() {
        let rules = ComparisonRules::default();
        let field = spec("text", FieldOptions::new().default_value("hello"), Engine::Mysql);

        let mysql = observed(Engine::Mysql, ColumnDefinition::new("value", "text"));
        assert!(!field.different_to(&mysql, &rules));

        let pg = observed(Engine::Postgresql, ColumnDefinition::new("value", "text"));
        assert!(field.different_to(&pg, &rules));
    }

    #[test]
    fn test_decimal_precision_checked_except_sqlite() {
        let rules = ComparisonRules::default();
        let field = spec("decimal", FieldOptions::new().precision(10).scale(2), Engine::Sqlite);

        let sqlite = observed(Engine::Sqlite, ColumnDefinition::new("value", "decimal"));
        assert!(!field.different_to(&sqlite, &rules));

        let pg = observed(Engine::Postgresql, ColumnDefinition::new("value", "decimal").precision_scale(8, 2));
        assert_eq!(field.differences(&pg, &rules), vec![Attribute::Precision]);
    }

    #[test]
    fn test_limit_only_for_sized_types() {
        let rules = ComparisonRules::default();

        let string = spec("string", FieldOptions::new().limit(100), Engine::Postgresql);
        let column = observed(Engine::Postgresql, ColumnDefinition::new("value", "string").limit(255));
        assert_eq!(string.differences(&column, &rules), vec![Attribute::Limit]);

        let float = spec("float", FieldOptions::new().limit(8), Engine::Postgresql);
        let column = observed(Engine::Postgresql, ColumnDefinition::new("value", "float"));
        assert!(!float.different_to(&column, &rules));
    }

    #[test]
    fn test_null_and_default_always_checked() {
        let rules = ComparisonRules::default();
        let field = spec("boolean", FieldOptions::new().null(false).default_value(true), Engine::Postgresql);
        let column = observed(Engine::Postgresql, ColumnDefinition::new("value", "boolean"));
        assert_eq!(
            field.differences(&column, &rules),
            vec![Attribute::Null, Attribute::Default]
        );
    }
}
