//! # gradebook-core
//!
//! Core data structures for the gradebook library.
//!
//! This crate provides the fundamental types used throughout gradebook:
//! - [`GradeItem`] and [`Category`] - What gets graded and how it is weighted
//! - [`Student`] - A roster entry with raw scores
//! - [`Gradebook`] - The validated container for all of the above
//! - [`VariableBindings`] - Per-student name → score map consumed by formulas
//!
//! ## Example
//!
//! ```rust
//! use gradebook_core::{Category, GradeItem, Gradebook, Student};
//!
//! let mut book = Gradebook::new();
//! book.add_category(Category::new("Tests", 70.0)).unwrap();
//! book.add_item(GradeItem::scored("Test 1").in_category("Tests").out_of(20.0)).unwrap();
//! book.add_item(GradeItem::computed("Best", "max([Test 1],[Test 2])")).unwrap();
//!
//! let mut ada = Student::new("s1", "Ada");
//! ada.set_score("Test 1", 17.0);
//! book.add_student(ada).unwrap();
//!
//! let bindings = book.bindings_for("s1").unwrap();
//! assert_eq!(bindings.get("Test1"), Some(17.0));
//! ```

pub mod bindings;
pub mod error;
pub mod gradebook;
pub mod item;
pub mod student;

// Re-exports for convenience
pub use bindings::{normalize_name, VariableBindings};
pub use error::{Error, Result};
pub use gradebook::Gradebook;
pub use item::{Category, GradeItem, ItemKind};
pub use student::Student;

/// Default maximum score of a grade item
pub const DEFAULT_OUT_OF: f64 = 100.0;

/// Default weight of a grade item inside its category
pub const DEFAULT_ITEM_WEIGHT: f64 = 1.0;
