use std::fmt;

use serde::{
    de::{MapAccess, Visitor},
    ser::SerializeMap,
    Deserialize, Deserializer, Serialize, Serializer,
};

/* Slogan Table
 * Ordered mapping of slogan text to the score it awards.
 * Order is insertion order, and matters: the first slogan found in a message wins,
 * and the admin listing shows slogans in the order they were added.
 * Serialized as a plain JSON object, keys in table order.
 */
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SloganTable {
    entries: Vec<(String, i64)>,
}

impl SloganTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, slogan: &str) -> Option<i64> {
        self.entries
            .iter()
            .find(|(text, _)| text == slogan)
            .map(|(_, score)| *score)
    }

    pub fn contains(&self, slogan: &str) -> bool {
        self.get(slogan).is_some()
    }

    // Adds a slogan, or replaces the score of an existing one in place.
    // Returns the previous score if there was one.
    pub fn insert(&mut self, slogan: &str, score: i64) -> Option<i64> {
        match self.entries.iter_mut().find(|(text, _)| text == slogan) {
            Some(entry) => Some(std::mem::replace(&mut entry.1, score)),
            None => {
                self.entries.push((slogan.to_string(), score));
                None
            }
        }
    }

    // Removes a slogan by exact text. Returns its score if it existed.
    pub fn remove(&mut self, slogan: &str) -> Option<i64> {
        let index = self.entries.iter().position(|(text, _)| text == slogan)?;
        Some(self.entries.remove(index).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries
            .iter()
            .map(|(text, score)| (text.as_str(), *score))
    }
}

impl<S: AsRef<str>> FromIterator<(S, i64)> for SloganTable {
    fn from_iter<I: IntoIterator<Item = (S, i64)>>(iter: I) -> Self {
        let mut table = SloganTable::new();
        for (slogan, score) in iter {
            table.insert(slogan.as_ref(), score);
        }
        table
    }
}

impl Serialize for SloganTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (slogan, score) in &self.entries {
            map.serialize_entry(slogan, score)?;
        }
        map.end()
    }
}

struct SloganTableVisitor;

impl<'de> Visitor<'de> for SloganTableVisitor {
    type Value = SloganTable;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a map of slogan text to integer score")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut access: M) -> Result<Self::Value, M::Error> {
        let mut table = SloganTable::new();
        while let Some((slogan, score)) = access.next_entry::<String, i64>()? {
            table.insert(&slogan, score);
        }
        Ok(table)
    }
}

impl<'de> Deserialize<'de> for SloganTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SloganTableVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_order() {
        let mut table = SloganTable::new();
        table.insert("zeta", 1);
        table.insert("alpha", 2);
        table.insert("mid", 3);

        let slogans: Vec<&str> = table.iter().map(|(text, _)| text).collect();
        assert_eq!(slogans, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_insert_existing_replaces_in_place() {
        let mut table = SloganTable::from_iter([("a", 1), ("b", 2)]);
        assert_eq!(table.insert("a", 7), Some(1));
        assert_eq!(table.len(), 2);
        assert_eq!(table.iter().next(), Some(("a", 7)));
    }

    #[test]
    fn test_remove() {
        let mut table = SloganTable::from_iter([("a", 1), ("b", 2)]);
        assert_eq!(table.remove("a"), Some(1));
        assert_eq!(table.remove("a"), None);
        assert!(!table.contains("a"));
        assert_eq!(table.get("b"), Some(2));
    }

    #[test]
    fn test_serde_preserves_order() {
        let json = r#"{"zulu":5,"alpha":-2,"شعار":10}"#;
        let table: SloganTable = serde_json::from_str(json).unwrap();
        let slogans: Vec<&str> = table.iter().map(|(text, _)| text).collect();
        assert_eq!(slogans, vec!["zulu", "alpha", "شعار"]);
        assert_eq!(serde_json::to_string(&table).unwrap(), json);
    }

    #[test]
    fn test_deserialize_rejects_non_integer_scores() {
        let result: Result<SloganTable, _> = serde_json::from_str(r#"{"a":"ten"}"#);
        assert!(result.is_err());
    }
}
