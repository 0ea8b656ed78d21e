//! Identity lookup: source-side identifiers to canonical employee keys.

use std::collections::HashMap;

/// Mapping from source identifier (IP address or other external key) to
/// employee key. Built once per run from the bulk identity fetch and
/// read-only thereafter.
#[derive(Debug, Clone, Default)]
pub struct IdentityTable {
    entries: HashMap<String, String>,
}

impl IdentityTable {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, String)> for IdentityTable {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Lookup wrapper around the identity table. A miss is an expected,
/// reportable condition, not a resolver error: the identity source and the
/// incident source are independently maintained and occasionally drift.
#[derive(Debug, Clone)]
pub struct IdentityResolver {
    table: IdentityTable,
}

impl IdentityResolver {
    pub fn new(table: IdentityTable) -> Self {
        Self { table }
    }

    pub fn resolve(&self, identifier: &str) -> Option<&str> {
        self.table.entries.get(identifier).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_identifier_and_misses_unknown() {
        let resolver = IdentityResolver::new(
            [("10.0.0.5".to_string(), "emp-1".to_string())]
                .into_iter()
                .collect(),
        );
        assert_eq!(resolver.resolve("10.0.0.5"), Some("emp-1"));
        assert_eq!(resolver.resolve("10.0.0.9"), None);
    }
}
