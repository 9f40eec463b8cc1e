//! Ordered key/value dictionary used by level documents.

/// A single dictionary value.
#[derive(Debug, Clone, PartialEq)]
pub enum DictValue {
    Integer(i64),
    Real(f64),
    String(String),
    Bool(bool),
    Dict(Dictionary),
}

impl DictValue {
    /// Returns the integer payload, if this is an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Short type label used in diagnostics.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Integer(_) => "integer",
            Self::Real(_) => "real",
            Self::String(_) => "string",
            Self::Bool(_) => "bool",
            Self::Dict(_) => "dict",
        }
    }
}

impl From<i64> for DictValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for DictValue {
    fn from(value: f64) -> Self {
        Self::Real(value)
    }
}

impl From<bool> for DictValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for DictValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for DictValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<Dictionary> for DictValue {
    fn from(value: Dictionary) -> Self {
        Self::Dict(value)
    }
}

/// Insertion-ordered dictionary.
///
/// Keys are unique. Order is preserved so that a parsed document serializes
/// back with its keys in the same sequence.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dictionary {
    entries: Vec<(String, DictValue)>,
}

impl Dictionary {
    /// Create an empty dictionary.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up a value by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&DictValue> {
        self.entries
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value)
    }

    /// Insert a value, replacing an existing entry in place.
    ///
    /// Returns the previous value when the key was already present.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<DictValue>,
    ) -> Option<DictValue> {
        let key = key.into();
        let value = value.into();
        if let Some(slot) = self.entries.iter_mut().find(|(name, _)| *name == key) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.entries.push((key, value));
        None
    }

    /// Remove an entry by key.
    pub fn remove(&mut self, key: &str) -> Option<DictValue> {
        let index = self.entries.iter().position(|(name, _)| name == key)?;
        Some(self.entries.remove(index).1)
    }

    /// Iterate over entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DictValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }
}

impl FromIterator<(String, DictValue)> for Dictionary {
    fn from_iter<I: IntoIterator<Item = (String, DictValue)>>(iter: I) -> Self {
        let mut dict = Self::new();
        for (key, value) in iter {
            dict.insert(key, value);
        }
        dict
    }
}

impl IntoIterator for Dictionary {
    type Item = (String, DictValue);
    type IntoIter = std::vec::IntoIter<(String, DictValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_replaces_in_place() {
        let mut dict = Dictionary::new();
        dict.insert("a", 1_i64);
        dict.insert("b", "two");
        let previous = dict.insert("a", 3_i64);

        assert_eq!(previous, Some(DictValue::Integer(1)));
        let keys: Vec<&str> = dict.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(dict.get("a"), Some(&DictValue::Integer(3)));
    }

    #[test]
    fn test_remove_returns_value() {
        let mut dict = Dictionary::new();
        dict.insert("k", true);
        assert_eq!(dict.remove("k"), Some(DictValue::Bool(true)));
        assert!(dict.is_empty());
        assert_eq!(dict.remove("k"), None);
    }
}
