//! Students and their raw scores

use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::bindings::normalize_name;

/// A roster entry
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Student {
    pub id: String,
    pub name: String,
    /// Item name → raw score. A missing entry means "no mark".
    #[cfg_attr(feature = "serde", serde(default))]
    pub scores: BTreeMap<String, f64>,
}

impl Student {
    /// Create a student with no scores
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scores: BTreeMap::new(),
        }
    }

    /// Record a score for an item
    pub fn set_score(&mut self, item: impl Into<String>, score: f64) {
        self.scores.insert(item.into(), score);
    }

    /// Builder form of [`Student::set_score`]
    pub fn with_score(mut self, item: impl Into<String>, score: f64) -> Self {
        self.set_score(item, score);
        self
    }

    /// Get the score for an item, matching the name exactly first and
    /// then ignoring whitespace
    pub fn score(&self, item: &str) -> Option<f64> {
        if let Some(score) = self.scores.get(item) {
            return Some(*score);
        }

        let wanted = normalize_name(item);
        self.scores
            .iter()
            .find(|(name, _)| normalize_name(name) == wanted)
            .map(|(_, score)| *score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_lookup() {
        let student = Student::new("s1", "Ada")
            .with_score("Test 1", 14.0)
            .with_score("Final", 88.0);

        assert_eq!(student.score("Final"), Some(88.0));
        assert_eq!(student.score("Test1"), Some(14.0));
        assert_eq!(student.score("Test 2"), None);
    }
}
