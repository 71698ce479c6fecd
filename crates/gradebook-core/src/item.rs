//! Grade items and categories

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::{DEFAULT_ITEM_WEIGHT, DEFAULT_OUT_OF};

/// How a grade item gets its score
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind<'a> {
    /// Entered per student by hand
    Scored,
    /// Computed per student from a formula over other items
    Computed { formula: &'a str },
}

/// A named, scored assessment component (e.g. "Midterm")
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct GradeItem {
    /// Display name; formulas refer to it with whitespace removed
    pub name: String,
    /// Category this item counts towards
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub category: Option<String>,
    /// Maximum score
    #[cfg_attr(feature = "serde", serde(default = "default_out_of"))]
    pub out_of: f64,
    /// Weight inside the category (0 excludes the item from averages)
    #[cfg_attr(feature = "serde", serde(default = "default_weight"))]
    pub weight: f64,
    /// Formula for computed items
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub formula: Option<String>,
}

#[cfg(feature = "serde")]
fn default_out_of() -> f64 {
    DEFAULT_OUT_OF
}

#[cfg(feature = "serde")]
fn default_weight() -> f64 {
    DEFAULT_ITEM_WEIGHT
}

impl GradeItem {
    /// Create an item whose score is entered per student
    pub fn scored(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: None,
            out_of: DEFAULT_OUT_OF,
            weight: DEFAULT_ITEM_WEIGHT,
            formula: None,
        }
    }

    /// Create an item computed from a formula
    pub fn computed(name: impl Into<String>, formula: impl Into<String>) -> Self {
        Self {
            formula: Some(formula.into()),
            ..Self::scored(name)
        }
    }

    /// Place the item in a category
    pub fn in_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    /// Set the maximum score
    pub fn out_of(mut self, out_of: f64) -> Self {
        self.out_of = out_of;
        self
    }

    /// Set the weight inside the category
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    /// Get the item kind
    pub fn kind(&self) -> ItemKind<'_> {
        match &self.formula {
            Some(formula) => ItemKind::Computed { formula },
            None => ItemKind::Scored,
        }
    }

    /// Check if the item is computed from a formula
    pub fn is_computed(&self) -> bool {
        self.formula.is_some()
    }

    /// Convert a raw score to a percentage of `out_of`
    pub fn percentage(&self, score: f64) -> f64 {
        score / self.out_of * 100.0
    }
}

/// A weighted group of grade items (e.g. "Tests" at 60%)
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Category {
    pub name: String,
    pub weight: f64,
}

impl Category {
    /// Create a new category
    pub fn new(name: impl Into<String>, weight: f64) -> Self {
        Self {
            name: name.into(),
            weight,
        }
    }
}
