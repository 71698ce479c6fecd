//! Gradebook type - the main document structure

use crate::bindings::{normalize_name, VariableBindings};
use crate::error::{Error, Result};
use crate::item::{Category, GradeItem};
use crate::student::Student;

/// A class gradebook
///
/// Holds grade items in display order, weighted categories and the roster.
/// Every `add_*` method validates its input, so a `Gradebook` is always
/// internally consistent: item names are unique ignoring whitespace, every
/// item category exists, and weights and maximum scores are in range.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Gradebook {
    categories: Vec<Category>,
    items: Vec<GradeItem>,
    students: Vec<Student>,
}

impl Gradebook {
    /// Create an empty gradebook
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a category
    pub fn add_category(&mut self, category: Category) -> Result<()> {
        if self.category(&category.name).is_some() {
            return Err(Error::DuplicateCategory(category.name));
        }
        validate_weight(&category.name, category.weight)?;

        self.categories.push(category);
        Ok(())
    }

    /// Add a grade item
    pub fn add_item(&mut self, item: GradeItem) -> Result<()> {
        if normalize_name(&item.name).is_empty() {
            return Err(Error::BlankName);
        }
        if self.item(&item.name).is_some() {
            return Err(Error::DuplicateItem(item.name));
        }
        if let Some(category) = &item.category {
            if self.category(category).is_none() {
                return Err(Error::UnknownCategory {
                    item: item.name,
                    category: category.clone(),
                });
            }
        }
        if !item.out_of.is_finite() || item.out_of <= 0.0 {
            return Err(Error::InvalidOutOf {
                item: item.name,
                value: item.out_of,
            });
        }
        validate_weight(&item.name, item.weight)?;

        self.items.push(item);
        Ok(())
    }

    /// Add a student to the roster
    pub fn add_student(&mut self, student: Student) -> Result<()> {
        if self.student(&student.id).is_some() {
            return Err(Error::DuplicateStudent(student.id));
        }

        self.students.push(student);
        Ok(())
    }

    /// Record a student's mark for a scored item, stored under the item's
    /// display name
    pub fn record_score(&mut self, student_id: &str, item: &str, score: f64) -> Result<()> {
        let name = match self.item(item) {
            Some(found) if !found.is_computed() => found.name.clone(),
            _ => return Err(Error::UnknownItem(item.to_string())),
        };
        let student = self
            .student_mut(student_id)
            .ok_or_else(|| Error::UnknownStudent(student_id.to_string()))?;

        student.set_score(name, score);
        Ok(())
    }

    /// Get a category by name
    pub fn category(&self, name: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.name == name)
    }

    /// Get a grade item by name (whitespace ignored)
    pub fn item(&self, name: &str) -> Option<&GradeItem> {
        let wanted = normalize_name(name);
        self.items.iter().find(|i| normalize_name(&i.name) == wanted)
    }

    /// Get a student by id
    pub fn student(&self, id: &str) -> Option<&Student> {
        self.students.iter().find(|s| s.id == id)
    }

    /// Get a mutable student by id
    pub fn student_mut(&mut self, id: &str) -> Option<&mut Student> {
        self.students.iter_mut().find(|s| s.id == id)
    }

    /// Iterate over categories
    pub fn categories(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Iterate over grade items in display order
    pub fn items(&self) -> impl Iterator<Item = &GradeItem> {
        self.items.iter()
    }

    /// Iterate over computed grade items
    pub fn computed_items(&self) -> impl Iterator<Item = &GradeItem> {
        self.items.iter().filter(|i| i.is_computed())
    }

    /// Iterate over the roster
    pub fn students(&self) -> impl Iterator<Item = &Student> {
        self.students.iter()
    }

    /// Number of students
    pub fn student_count(&self) -> usize {
        self.students.len()
    }

    /// Build the raw bindings for one student: every scored item the
    /// student has a mark for. Computed items are not included.
    pub fn bindings_for(&self, student_id: &str) -> Result<VariableBindings> {
        let student = self
            .student(student_id)
            .ok_or_else(|| Error::UnknownStudent(student_id.to_string()))?;

        Ok(self
            .items
            .iter()
            .filter(|item| !item.is_computed())
            .filter_map(|item| student.score(&item.name).map(|s| (item.name.clone(), s)))
            .collect())
    }
}

fn validate_weight(name: &str, weight: f64) -> Result<()> {
    if !weight.is_finite() || weight < 0.0 {
        return Err(Error::InvalidWeight {
            name: name.to_string(),
            value: weight,
        });
    }
    Ok(())
}

#[cfg(feature = "serde")]
mod file {
    use super::*;
    use serde::{Deserialize, Serialize};

    /// On-disk layout of a gradebook
    #[derive(Serialize, Deserialize)]
    struct GradebookFile {
        #[serde(default)]
        categories: Vec<Category>,
        #[serde(default)]
        items: Vec<GradeItem>,
        #[serde(default)]
        students: Vec<Student>,
    }

    impl Gradebook {
        /// Load and validate a gradebook from JSON
        pub fn from_json(text: &str) -> Result<Self> {
            let file: GradebookFile = serde_json::from_str(text)?;

            let mut book = Gradebook::new();
            for category in file.categories {
                book.add_category(category)?;
            }
            for item in file.items {
                book.add_item(item)?;
            }
            for student in file.students {
                book.add_student(student)?;
            }
            Ok(book)
        }

        /// Serialize the gradebook to pretty-printed JSON
        pub fn to_json(&self) -> Result<String> {
            let file = GradebookFile {
                categories: self.categories.clone(),
                items: self.items.clone(),
                students: self.students.clone(),
            };
            Ok(serde_json::to_string_pretty(&file)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> Gradebook {
        let mut book = Gradebook::new();
        book.add_category(Category::new("Tests", 60.0)).unwrap();
        book.add_item(GradeItem::scored("Test 1").in_category("Tests"))
            .unwrap();
        book.add_item(GradeItem::scored("Test 2").in_category("Tests"))
            .unwrap();
        book.add_item(GradeItem::computed("Best", "max([Test 1],[Test 2])"))
            .unwrap();
        book.add_student(Student::new("s1", "Ada").with_score("Test 1", 70.0))
            .unwrap();
        book
    }

    #[test]
    fn test_duplicate_item_ignores_whitespace() {
        let mut book = sample();
        let err = book.add_item(GradeItem::scored("Test1")).unwrap_err();
        assert!(matches!(err, Error::DuplicateItem(name) if name == "Test1"));
    }

    #[test]
    fn test_unknown_category() {
        let mut book = sample();
        let err = book
            .add_item(GradeItem::scored("Essay").in_category("Writing"))
            .unwrap_err();
        assert!(matches!(err, Error::UnknownCategory { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let mut book = sample();
        assert!(matches!(
            book.add_item(GradeItem::scored("Quiz").out_of(0.0)),
            Err(Error::InvalidOutOf { .. })
        ));
        assert!(matches!(
            book.add_item(GradeItem::scored("Quiz").with_weight(-1.0)),
            Err(Error::InvalidWeight { .. })
        ));
        assert!(matches!(
            book.add_category(Category::new("Labs", f64::NAN)),
            Err(Error::InvalidWeight { .. })
        ));
        assert!(matches!(
            book.add_item(GradeItem::scored("   ")),
            Err(Error::BlankName)
        ));
    }

    #[test]
    fn test_bindings_for_student() {
        let book = sample();
        let bindings = book.bindings_for("s1").unwrap();

        let entries: Vec<_> = bindings.iter().collect();
        assert_eq!(entries, vec![("Test 1", 70.0)]);
        assert!(matches!(
            book.bindings_for("nobody"),
            Err(Error::UnknownStudent(_))
        ));
    }

    #[test]
    fn test_record_score() {
        let mut book = sample();
        book.record_score("s1", "Test2", 55.0).unwrap();
        assert_eq!(book.student("s1").unwrap().score("Test 2"), Some(55.0));

        assert!(matches!(
            book.record_score("s1", "Best", 90.0),
            Err(Error::UnknownItem(_))
        ));
        assert!(matches!(
            book.record_score("s1", "Essay", 90.0),
            Err(Error::UnknownItem(_))
        ));
        assert!(matches!(
            book.record_score("s9", "Test 1", 90.0),
            Err(Error::UnknownStudent(_))
        ));
    }

    #[test]
    fn test_computed_items() {
        let book = sample();
        let names: Vec<_> = book.computed_items().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["Best"]);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_roundtrip() {
        let book = sample();
        let text = book.to_json().unwrap();
        let loaded = Gradebook::from_json(&text).unwrap();
        assert_eq!(loaded, book);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_defaults_and_validation() {
        let text = r#"{
            "items": [{ "name": "Quiz" }],
            "students": [{ "id": "s1", "name": "Ada" }]
        }"#;
        let book = Gradebook::from_json(text).unwrap();
        let quiz = book.item("Quiz").unwrap();
        assert_eq!(quiz.out_of, crate::DEFAULT_OUT_OF);
        assert_eq!(quiz.weight, crate::DEFAULT_ITEM_WEIGHT);

        let text = r#"{ "items": [{ "name": "Quiz", "category": "Nope" }] }"#;
        assert!(matches!(
            Gradebook::from_json(text),
            Err(Error::UnknownCategory { .. })
        ));
        assert!(matches!(Gradebook::from_json("{"), Err(Error::Json(_))));
    }
}
