//! Engine quirks that exclude column attributes from comparison.
//!
//! Some engines cannot round-trip certain column attributes, so comparing a
//! declaration against what they report would flag a difference on every
//! run. Each entry names the engine, the resolved SQL type and the
//! attributes that are not compared for that combination.

use smol_str::SmolStr;

use crate::types::Engine;

/// A column attribute that takes part in field comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Nullability.
    Null,
    /// Default value.
    Default,
    /// Numeric precision.
    Precision,
    /// Numeric scale.
    Scale,
    /// Storage limit.
    Limit,
}

impl Attribute {
    /// Get the attribute name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Default => "default",
            Self::Precision => "precision",
            Self::Scale => "scale",
            Self::Limit => "limit",
        }
    }
}

impl std::fmt::Display for Attribute {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One engine quirk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quirk {
    /// Engine the observed column comes from.
    pub engine: Engine,
    /// Resolved SQL type of the declared field.
    pub sql_type: SmolStr,
    /// Attributes excluded from comparison.
    pub excluded: Vec<Attribute>,
}

/// Table of engine quirks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuirkTable {
    quirks: Vec<Quirk>,
}

impl Default for QuirkTable {
    fn default() -> Self {
        Self {
            quirks: vec![
                // SQLite columns do not report decimal precision/scale.
                Quirk {
                    engine: Engine::Sqlite,
                    sql_type: SmolStr::new("decimal"),
                    excluded: vec![Attribute::Precision, Attribute::Scale],
                },
                // MySQL cannot keep defaults on TEXT columns.
                Quirk {
                    engine: Engine::Mysql,
                    sql_type: SmolStr::new("text"),
                    excluded: vec![Attribute::Default],
                },
            ],
        }
    }
}

impl QuirkTable {
    /// Create an empty table.
    pub fn empty() -> Self {
        Self { quirks: Vec::new() }
    }

    /// Add a quirk.
    pub fn add(&mut self, quirk: Quirk) {
        self.quirks.push(quirk);
    }

    /// Check whether an attribute is excluded for this engine and type.
    pub fn excludes(&self, engine: Engine, sql_type: &str, attribute: Attribute) -> bool {
        self.quirks.iter().any(|q| {
            q.engine == engine && q.sql_type == sql_type && q.excluded.contains(&attribute)
        })
    }

    /// Get all quirks.
    pub fn quirks(&self) -> &[Quirk] {
        &self.quirks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_quirks() {
        let table = QuirkTable::default();
        assert!(table.excludes(Engine::Sqlite, "decimal", Attribute::Precision));
        assert!(table.excludes(Engine::Sqlite, "decimal", Attribute::Scale));
        assert!(table.excludes(Engine::Mysql, "text", Attribute::Default));

        assert!(!table.excludes(Engine::Postgresql, "decimal", Attribute::Precision));
        assert!(!table.excludes(Engine::Mysql, "decimal", Attribute::Precision));
        assert!(!table.excludes(Engine::Sqlite, "text", Attribute::Default));
        assert!(!table.excludes(Engine::Mysql, "string", Attribute::Default));
    }

    #[test]
    fn test_custom_quirk() {
        let mut table = QuirkTable::empty();
        assert!(!table.excludes(Engine::Mysql, "text", Attribute::Default));

        table.add(Quirk {
            engine: Engine::Postgresql,
            sql_type: "binary".into(),
            excluded: vec![Attribute::Limit],
        });
        assert!(table.excludes(Engine::Postgresql, "binary", Attribute::Limit));
        assert_eq!(table.quirks().len(), 1);
    }
}
