//! Identifier validation.
//!
//! Schema, table and column names cannot be bound as query parameters, so
//! they are interpolated into SQL text. A client-supplied name only reaches
//! SQL as an [`Identifier`] produced by [`Identifier::parse`], which accepts
//! `[A-Za-z_][A-Za-z0-9_]*` and nothing else.

use std::fmt;

use crate::error::{TablescopeError, TablescopeResult};

/// Schema assumed for unqualified table names.
pub const DEFAULT_SCHEMA: &str = "public";

/// A schema, table or column name that is safe to embed in SQL text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Validate a client-supplied name.
    pub fn parse(name: &str) -> TablescopeResult<Self> {
        if name.is_empty() {
            return Err(TablescopeError::invalid_identifier(name, "Empty identifier"));
        }

        let mut chars = name.chars();
        let starts_ok = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
        let rest_ok = chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !(starts_ok && rest_ok) {
            return Err(TablescopeError::invalid_identifier(
                name,
                format!("Invalid identifier: {name}"),
            ));
        }

        Ok(Self(name.to_string()))
    }

    /// Wrap a name read from the catalog.
    ///
    /// Catalog names are owned by the database, not the client, and may contain
    /// any character; [`Identifier::quoted`] escapes them.
    pub fn from_catalog(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The bare name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a double-quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A validated `schema.table` reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableRef {
    pub schema: Identifier,
    pub table: Identifier,
}

impl TableRef {
    /// Parse `schema.table` or `table` (schema `public`).
    ///
    /// Splits on the first `.`; both parts must be valid identifiers, so a
    /// second `.` is rejected as part of the table name.
    pub fn parse(raw: &str) -> TablescopeResult<Self> {
        let (schema, table) = raw.split_once('.').unwrap_or((DEFAULT_SCHEMA, raw));
        Ok(Self { schema: Identifier::parse(schema)?, table: Identifier::parse(table)? })
    }

    /// `"schema"."table"` for use in a FROM clause.
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.schema.quoted(), self.table.quoted())
    }
}

impl fmt::Display for TableRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_bare_identifiers() {
        for name in ["orders", "_tmp", "Customers_2024", "a", "_", "X9"] {
            assert_eq!(Identifier::parse(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_rejects_unsafe_identifiers() {
        let rejected = [
            "",
            "1orders",
            "public.orders",
            "orders;drop table x",
            "o\"rders",
            "o'rders",
            "orders ",
            " orders",
            "ord-ers",
            "órdenes",
            "orders\0",
        ];
        for name in rejected {
            let err = Identifier::parse(name).unwrap_err();
            assert!(
                matches!(err, TablescopeError::InvalidIdentifier { .. }),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_empty_identifier_message() {
        let err = Identifier::parse("").unwrap_err();
        assert_eq!(err.to_string(), "Empty identifier");
    }

    #[test]
    fn test_quoting_escapes_catalog_names() {
        assert_eq!(Identifier::parse("orders").unwrap().quoted(), "\"orders\"");
        assert_eq!(Identifier::from_catalog("First \"Name\"").quoted(), "\"First \"\"Name\"\"\"");
    }

    #[test]
    fn test_unqualified_table_defaults_to_public() {
        let unqualified = TableRef::parse("orders").unwrap();
        let qualified = TableRef::parse("public.orders").unwrap();
        assert_eq!(unqualified, qualified);
        assert_eq!(unqualified.to_string(), "public.orders");
        assert_eq!(unqualified.qualified(), "\"public\".\"orders\"");
    }

    #[test]
    fn test_table_ref_splits_on_first_dot() {
        let table = TableRef::parse("sales.orders").unwrap();
        assert_eq!(table.schema.as_str(), "sales");
        assert_eq!(table.table.as_str(), "orders");

        assert!(TableRef::parse("a.b.c").is_err());
        assert!(TableRef::parse(".orders").is_err());
        assert!(TableRef::parse("sales.").is_err());
        assert!(TableRef::parse("").is_err());
    }
}
