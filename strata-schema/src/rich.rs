//! Rich types: named value types that store as a plain column type.
//!
//! A rich type declares, at registration time, which column type it stores
//! as and whether it can validate and/or format values. Nothing is probed at
//! use time: a type without a validator simply reports `validates() == false`.

use indexmap::IndexMap;
use smol_str::SmolStr;

/// Validation hook: returns an error message for invalid input.
pub type Validator = fn(&str) -> Option<String>;

/// Formatting hook: returns the normalized form of a value.
pub type Formatter = fn(&str) -> String;

/// A registered rich type.
#[derive(Clone)]
pub struct RichType {
    name: SmolStr,
    column_type: SmolStr,
    validator: Option<Validator>,
    formatter: Option<Formatter>,
}

impl RichType {
    /// Create a rich type stored as the given column type.
    pub fn new(name: impl Into<SmolStr>, column_type: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            column_type: column_type.into(),
            validator: None,
            formatter: None,
        }
    }

    /// Attach a validator.
    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    /// Attach a formatter.
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    /// Get the type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the column type values are stored as.
    pub fn column_type(&self) -> &str {
        &self.column_type
    }

    /// Whether values of this type can be validated.
    pub fn validates(&self) -> bool {
        self.validator.is_some()
    }

    /// Whether values of this type can be formatted.
    pub fn formats(&self) -> bool {
        self.formatter.is_some()
    }

    /// Validate a value. Types without a validator accept everything.
    pub fn validate(&self, value: &str) -> Option<String> {
        self.validator.and_then(|v| v(value))
    }

    /// Format a value. Types without a formatter return it unchanged.
    pub fn format(&self, value: &str) -> String {
        match self.formatter {
            Some(f) => f(value),
            None => value.to_string(),
        }
    }
}

impl std::fmt::Debug for RichType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RichType")
            .field("name", &self.name)
            .field("column_type", &self.column_type)
            .field("validates", &self.validates())
            .field("formats", &self.formats())
            .finish()
    }
}

fn validate_email(value: &str) -> Option<String> {
    let valid = value
        .split_once('@')
        .is_some_and(|(local, domain)| {
            !local.is_empty() && domain.contains('.') && !domain.starts_with('.')
        });
    if valid || value.is_empty() {
        None
    } else {
        Some("is not a valid email address".to_string())
    }
}

fn format_email(value: &str) -> String {
    value.trim().to_string()
}

fn validate_password(value: &str) -> Option<String> {
    if value.is_empty() || value.chars().count() >= 6 {
        None
    } else {
        Some("must be at least 6 characters".to_string())
    }
}

/// Registry of rich types by name.
#[derive(Debug, Clone, Default)]
pub struct RichTypeRegistry {
    types: IndexMap<SmolStr, RichType>,
}

impl RichTypeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry holding the built-in rich types.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(
            RichType::new("email_address", "string")
                .with_validator(validate_email)
                .with_formatter(format_email),
        );
        registry.register(RichType::new("password_string", "string").with_validator(validate_password));
        registry.register(RichType::new("html_string", "text"));
        registry.register(RichType::new("markdown_string", "text"));
        registry.register(RichType::new("textile_string", "text"));
        registry.register(RichType::new("lifecycle_state", "string"));
        registry
    }

    /// Register a rich type, replacing any type with the same name.
    pub fn register(&mut self, rich: RichType) {
        tracing::debug!(name = rich.name(), column_type = rich.column_type(), "registered rich type");
        self.types.insert(rich.name.clone(), rich);
    }

    /// Resolve a rich type by name.
    pub fn resolve(&self, name: &str) -> Option<&RichType> {
        self.types.get(name)
    }

    /// Number of registered types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_capabilities() {
        let registry = RichTypeRegistry::with_builtins();

        let email = registry.resolve("email_address").unwrap();
        assert_eq!(email.column_type(), "string");
        assert!(email.validates());
        assert!(email.formats());

        let html = registry.resolve("html_string").unwrap();
        assert_eq!(html.column_type(), "text");
        assert!(!html.validates());
        assert!(!html.formats());

        assert!(registry.resolve("nope").is_none());
    }

    #[test]
    fn test_email_validation() {
        let registry = RichTypeRegistry::with_builtins();
        let email = registry.resolve("email_address").unwrap();

        assert_eq!(email.validate("someone@example.com"), None);
        assert!(email.validate("not-an-email").is_some());
        assert!(email.validate("@example.com").is_some());
        assert_eq!(email.format("  a@b.io "), "a@b.io");
    }

    #[test]
    fn test_type_without_hooks_passes_through() {
        let rich = RichType::new("slug", "string");
        assert_eq!(rich.validate("anything"), None);
        assert_eq!(rich.format("Kept As Is"), "Kept As Is");
    }

    #[test]
    fn test_register_replaces() {
        let mut registry = RichTypeRegistry::new();
        registry.register(RichType::new("state", "string"));
        registry.register(RichType::new("state", "text"));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.resolve("state").unwrap().column_type(), "text");
    }
}
