//! Storage engines, native column types and type resolution.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::quirks::QuirkTable;
use crate::rich::{RichType, RichTypeRegistry};

/// Name of the pseudo-type used for primary key columns.
pub const PRIMARY_KEY_TYPE: &str = "primary_key";

/// A storage engine (database adapter).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    /// PostgreSQL.
    #[default]
    #[serde(alias = "postgres")]
    Postgresql,
    /// MySQL / MariaDB.
    Mysql,
    /// SQLite.
    Sqlite,
}

impl Engine {
    /// Get the engine name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
            Self::Sqlite => "sqlite",
        }
    }

    /// Parse an engine from a provider name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Some(Self::Postgresql),
            "mysql" | "mariadb" => Some(Self::Mysql),
            "sqlite" | "sqlite3" => Some(Self::Sqlite),
            _ => None,
        }
    }
}

impl std::fmt::Display for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A native column type as the engine spells it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    /// SQL spelling of the type.
    pub sql_name: SmolStr,
    /// Default storage limit, if the engine has one.
    pub limit: Option<u32>,
}

impl NativeType {
    fn new(sql_name: &str, limit: Option<u32>) -> Self {
        Self {
            sql_name: sql_name.into(),
            limit,
        }
    }
}

/// The native type table of one engine, keyed by symbolic type name.
#[derive(Debug, Clone)]
pub struct NativeTypes {
    types: IndexMap<SmolStr, NativeType>,
}

impl NativeTypes {
    /// Build the native type table for an engine.
    pub fn for_engine(engine: Engine) -> Self {
        let entries: [(&str, NativeType); 12] = match engine {
            Engine::Postgresql => [
                (PRIMARY_KEY_TYPE, NativeType::new("SERIAL PRIMARY KEY", None)),
                ("string", NativeType::new("CHARACTER VARYING", Some(255))),
                ("text", NativeType::new("TEXT", None)),
                ("integer", NativeType::new("INTEGER", None)),
                ("float", NativeType::new("FLOAT", None)),
                ("decimal", NativeType::new("DECIMAL", None)),
                ("datetime", NativeType::new("TIMESTAMP", None)),
                ("timestamp", NativeType::new("TIMESTAMP", None)),
                ("time", NativeType::new("TIME", None)),
                ("date", NativeType::new("DATE", None)),
                ("binary", NativeType::new("BYTEA", None)),
                ("boolean", NativeType::new("BOOLEAN", None)),
            ],
            Engine::Mysql => [
                (
                    PRIMARY_KEY_TYPE,
                    NativeType::new("INT(11) NOT NULL AUTO_INCREMENT PRIMARY KEY", None),
                ),
                ("string", NativeType::new("VARCHAR", Some(255))),
                ("text", NativeType::new("TEXT", None)),
                ("integer", NativeType::new("INT", Some(4))),
                ("float", NativeType::new("FLOAT", None)),
                ("decimal", NativeType::new("DECIMAL", None)),
                ("datetime", NativeType::new("DATETIME", None)),
                ("timestamp", NativeType::new("DATETIME", None)),
                ("time", NativeType::new("TIME", None)),
                ("date", NativeType::new("DATE", None)),
                ("binary", NativeType::new("BLOB", None)),
                ("boolean", NativeType::new("TINYINT", Some(1))),
            ],
            Engine::Sqlite => [
                (
                    PRIMARY_KEY_TYPE,
                    NativeType::new("INTEGER PRIMARY KEY AUTOINCREMENT NOT NULL", None),
                ),
                ("string", NativeType::new("VARCHAR", Some(255))),
                ("text", NativeType::new("TEXT", None)),
                ("integer", NativeType::new("INTEGER", None)),
                ("float", NativeType::new("FLOAT", None)),
                ("decimal", NativeType::new("DECIMAL", None)),
                ("datetime", NativeType::new("DATETIME", None)),
                ("timestamp", NativeType::new("DATETIME", None)),
                ("time", NativeType::new("TIME", None)),
                ("date", NativeType::new("DATE", None)),
                ("binary", NativeType::new("BLOB", None)),
                ("boolean", NativeType::new("BOOLEAN", None)),
            ],
        };

        Self {
            types: entries
                .into_iter()
                .map(|(name, native)| (SmolStr::new(name), native))
                .collect(),
        }
    }

    /// Look up a native type by symbolic name.
    pub fn get(&self, name: &str) -> Option<&NativeType> {
        self.types.get(name)
    }

    /// Check whether the table has an entry for the name.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Iterate over the symbolic names in table order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(|k| k.as_str())
    }
}

/// Groups of type names that are interchangeable for comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSynonyms {
    groups: Vec<Vec<SmolStr>>,
}

impl Default for TypeSynonyms {
    fn default() -> Self {
        // Engines may silently store one as the other.
        Self {
            groups: vec![vec![SmolStr::new("timestamp"), SmolStr::new("datetime")]],
        }
    }
}

impl TypeSynonyms {
    /// Create the built-in synonym table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a group of synonymous type names.
    pub fn add_group<I, S>(&mut self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        let group: Vec<SmolStr> = names.into_iter().map(Into::into).collect();
        if group.len() > 1 {
            self.groups.push(group);
        }
    }

    /// Builder form of [`TypeSynonyms::add_group`].
    pub fn with_group<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        self.add_group(names);
        self
    }

    /// Check whether a declared type and an observed type are the same.
    ///
    /// The first group containing `declared` decides the answer.
    pub fn same(&self, declared: &str, observed: &str) -> bool {
        for group in &self.groups {
            if group.iter().any(|t| t == declared) {
                return group.iter().any(|t| t == observed);
            }
        }
        declared == observed
    }

    /// Get the configured groups.
    pub fn groups(&self) -> &[Vec<SmolStr>] {
        &self.groups
    }
}

/// The rules used when comparing a declared field with an observed column.
#[derive(Debug, Clone, Default)]
pub struct ComparisonRules {
    /// Type synonym table.
    pub synonyms: TypeSynonyms,
    /// Engine-specific attribute exclusions.
    pub quirks: QuirkTable,
}

/// Resolves declared type names to SQL storage types for one engine.
#[derive(Debug, Clone)]
pub struct TypeRegistry {
    engine: Engine,
    native: NativeTypes,
    rich: RichTypeRegistry,
    rules: ComparisonRules,
}

impl TypeRegistry {
    /// Create a registry for an engine with the built-in rich types.
    pub fn new(engine: Engine) -> Self {
        Self {
            engine,
            native: NativeTypes::for_engine(engine),
            rich: RichTypeRegistry::with_builtins(),
            rules: ComparisonRules::default(),
        }
    }

    /// Replace the synonym table.
    pub fn with_synonyms(mut self, synonyms: TypeSynonyms) -> Self {
        self.rules.synonyms = synonyms;
        self
    }

    /// Register an additional rich type.
    pub fn with_rich_type(mut self, rich: RichType) -> Self {
        self.rich.register(rich);
        self
    }

    /// Get the engine.
    pub fn engine(&self) -> Engine {
        self.engine
    }

    /// Get the native type table.
    pub fn native_types(&self) -> &NativeTypes {
        &self.native
    }

    /// Get the rich type registry.
    pub fn rich_types(&self) -> &RichTypeRegistry {
        &self.rich
    }

    /// Get a mutable rich type registry.
    pub fn rich_types_mut(&mut self) -> &mut RichTypeRegistry {
        &mut self.rich
    }

    /// Get the comparison rules.
    pub fn rules(&self) -> &ComparisonRules {
        &self.rules
    }

    /// Check whether a name is a native column type usable for a field.
    pub fn is_native(&self, type_name: &str) -> bool {
        type_name != PRIMARY_KEY_TYPE && self.native.contains(type_name)
    }

    /// Resolve a declared type to its SQL storage type.
    ///
    /// An explicit override wins, then native type names, then the column
    /// type of a registered rich type.
    pub fn resolve_sql_type(&self, type_name: &str, explicit: Option<&str>) -> Option<SmolStr> {
        if let Some(sql_type) = explicit {
            return Some(SmolStr::new(sql_type));
        }
        if self.is_native(type_name) {
            return Some(SmolStr::new(type_name));
        }
        self.rich
            .resolve(type_name)
            .map(|rich| rich.column_type().into())
    }

    /// Default limit of a resolved SQL type.
    pub fn native_limit(&self, sql_type: &str) -> Option<u32> {
        self.native.get(sql_type).and_then(|n| n.limit)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new(Engine::default())
    }
}
