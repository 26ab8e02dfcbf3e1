//! Ordered schema map.

use super::schema::PartialSchema;
use serde::ser::{Serialize, Serializer};
use std::collections::HashMap;

/// Schemas keyed by schema key, in declaration order.
///
/// Iteration always follows insertion order. Inserting an existing key
/// replaces the entry in place.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaMap<S> {
    entries: Vec<(String, S)>,
    index: HashMap<String, usize>,
}

impl<S> Default for SchemaMap<S> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<S> SchemaMap<S> {
    /// Create an empty map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a schema. Returns the replaced schema, if any.
    pub fn insert(&mut self, key: impl Into<String>, schema: S) -> Option<S> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i].1, schema)),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, schema));
                None
            }
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, key: impl Into<String>, schema: S) -> Self {
        self.insert(key, schema);
        self
    }

    /// Get a schema by key.
    pub fn get(&self, key: &str) -> Option<&S> {
        self.index.get(key).map(|&i| &self.entries[i].1)
    }

    /// Get a mutable schema by key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut S> {
        self.index.get(key).map(|&i| &mut self.entries[i].1)
    }

    /// Check if a key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Entries in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &S)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), s))
    }

    /// Number of schemas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl SchemaMap<PartialSchema> {
    /// Insert a declaration under the key its name and namespace call for.
    pub fn declare(&mut self, schema: PartialSchema) -> Option<PartialSchema> {
        self.insert(schema.key(), schema)
    }
}

impl<S> FromIterator<(String, S)> for SchemaMap<S> {
    fn from_iter<I: IntoIterator<Item = (String, S)>>(iter: I) -> Self {
        let mut map = SchemaMap::new();
        for (key, schema) in iter {
            map.insert(key, schema);
        }
        map
    }
}

impl<S> IntoIterator for SchemaMap<S> {
    type Item = (String, S);
    type IntoIter = std::vec::IntoIter<(String, S)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<S: Serialize> Serialize for SchemaMap<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
        serialize_entries(&self.entries, serializer)
    }
}

/// Serialize ordered `(name, value)` pairs as a map.
pub fn serialize_entries<T, S>(entries: &[(String, T)], serializer: S) -> Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    serializer.collect_map(entries.iter().map(|(k, v)| (k, v)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preserves_insertion_order() {
        let map: SchemaMap<u32> = [("b".to_string(), 1), ("a".to_string(), 2), ("c".to_string(), 3)]
            .into_iter()
            .collect();
        assert_eq!(map.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut map = SchemaMap::new().with("a", 1).with("b", 2);
        assert_eq!(map.insert("a", 10), Some(1));
        assert_eq!(map.iter().collect::<Vec<_>>(), vec![("a", &10), ("b", &2)]);
        assert_eq!(map.len(), 2);
        *map.get_mut("b").unwrap() += 1;
        assert_eq!(map.get("b"), Some(&3));
        assert!(!map.contains_key("c"));
    }

    #[test]
    fn test_declare_uses_schema_key() {
        let mut map = SchemaMap::new();
        map.declare(PartialSchema::new("Todo").in_namespace("app"));
        assert!(map.contains_key("app_Todo"));
    }

    #[test]
    fn test_serializes_as_ordered_map() {
        let map = SchemaMap::new().with("z", 1).with("a", 2);
        assert_eq!(serde_json::to_string(&map).unwrap(), r#"{"z":1,"a":2}"#);
    }
}
