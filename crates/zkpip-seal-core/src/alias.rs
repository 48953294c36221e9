//! Field lookup across alternative spellings.
//!
//! Loosely-shaped input documents spell the same field several ways
//! (`publicKey`, `pub`, `pk`). Rather than chaining fallbacks inline, callers
//! declare an [`AliasTable`] once and resolve fields through it.

use serde_json::{Map, Value};

/// Return the first alias present in `object` with a non-null value.
pub fn first_defined_of<'a>(object: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .filter_map(|name| object.get(*name))
        .find(|v| !v.is_null())
}

/// A canonical field name and the aliases it may appear under, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

/// A declarative per-field alias table.
#[derive(Debug, Clone, Copy)]
pub struct AliasTable {
    entries: &'static [FieldAliases],
}

impl AliasTable {
    pub const fn new(entries: &'static [FieldAliases]) -> Self {
        Self { entries }
    }

    /// Aliases registered for `field`, if any.
    pub fn aliases(&self, field: &str) -> Option<&'static [&'static str]> {
        self.entries
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.aliases)
    }

    /// Resolve `field` in `object` through its aliases.
    ///
    /// A field with no table entry is looked up under its own name only.
    pub fn get<'a>(&self, object: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
        match self.aliases(field) {
            Some(aliases) => first_defined_of(object, aliases),
            None => object.get(field).filter(|v| !v.is_null()),
        }
    }

    /// Resolve `field` and require a string.
    pub fn get_str<'a>(&self, object: &'a Map<String, Value>, field: &str) -> Option<&'a str> {
        self.get(object, field).and_then(Value::as_str)
    }

    /// Rebuild `object` with every table field under its canonical name.
    ///
    /// Keys not mentioned in the table are carried over unchanged.
    pub fn normalize(&self, object: &Map<String, Value>) -> Map<String, Value> {
        let mut out = Map::new();
        for (k, v) in object {
            if !self.entries.iter().any(|e| e.aliases.contains(&k.as_str())) {
                out.insert(k.clone(), v.clone());
            }
        }
        for entry in self.entries {
            if let Some(v) = first_defined_of(object, entry.aliases) {
                out.insert(entry.field.to_string(), v.clone());
            }
        }
        out
    }
}
