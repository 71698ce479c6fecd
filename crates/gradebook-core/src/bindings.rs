//! Variable bindings for formula evaluation
//!
//! A [`VariableBindings`] maps grade item names to one student's scores.
//! Names are compared with all whitespace removed, so a binding named
//! `"Test 1"` answers lookups for `"Test1"`, `"Test 1"` and `" Test  1 "`.
//! Case is significant.

use ahash::AHashMap;

/// Strip every whitespace character from a name
///
/// # Example
/// ```rust
/// use gradebook_core::normalize_name;
///
/// assert_eq!(normalize_name(" Test 1 "), "Test1");
/// ```
pub fn normalize_name(name: &str) -> String {
    name.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Ordered name → value map with whitespace-insensitive lookup
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableBindings {
    /// Bindings in insertion order (original names)
    entries: Vec<(String, f64)>,
    /// Normalized name → index into `entries`
    index: AHashMap<String, usize>,
}

impl VariableBindings {
    /// Create an empty set of bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a name to a value
    ///
    /// A name that normalizes to an existing binding replaces it in place
    /// and the previous value is returned.
    pub fn insert(&mut self, name: impl Into<String>, value: f64) -> Option<f64> {
        let name = name.into();
        let key = normalize_name(&name);

        if let Some(&idx) = self.index.get(&key) {
            let previous = self.entries[idx].1;
            self.entries[idx] = (name, value);
            return Some(previous);
        }

        self.index.insert(key, self.entries.len());
        self.entries.push((name, value));
        None
    }

    /// Look up a value by name (whitespace ignored)
    pub fn get(&self, name: &str) -> Option<f64> {
        self.index
            .get(&normalize_name(name))
            .map(|&idx| self.entries[idx].1)
    }

    /// Check whether a name is bound
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(&normalize_name(name))
    }

    /// Number of bindings
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if there are no bindings
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over `(name, value)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), *value))
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for VariableBindings {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut bindings = Self::new();
        bindings.extend(iter);
        bindings
    }
}

impl<S: Into<String>> Extend<(S, f64)> for VariableBindings {
    fn extend<I: IntoIterator<Item = (S, f64)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lookup_ignores_whitespace() {
        let bindings: VariableBindings = [("Test 1", 3.0)].into_iter().collect();

        assert_eq!(bindings.get("Test 1"), Some(3.0));
        assert_eq!(bindings.get("Test1"), Some(3.0));
        assert_eq!(bindings.get(" Test\t1 "), Some(3.0));
        assert_eq!(bindings.get("test1"), None);
    }

    #[test]
    fn test_insert_replaces_normalized_duplicate() {
        let mut bindings = VariableBindings::new();
        assert_eq!(bindings.insert("Final", 80.0), None);
        assert_eq!(bindings.insert("Quiz 2", 7.0), None);
        assert_eq!(bindings.insert("Quiz2", 9.0), Some(7.0));

        assert_eq!(bindings.len(), 2);
        let names: Vec<_> = bindings.iter().collect();
        assert_eq!(names, vec![("Final", 80.0), ("Quiz2", 9.0)]);
    }

    #[test]
    fn test_empty() {
        let bindings = VariableBindings::new();
        assert!(bindings.is_empty());
        assert!(!bindings.contains("Anything"));
    }
}
