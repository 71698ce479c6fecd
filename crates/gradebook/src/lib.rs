//! # gradebook
//!
//! A Rust library for weighted gradebooks whose items may be computed per
//! student from grade formulas.
//!
//! ## Features
//!
//! - Grade items, weighted categories and a student roster
//! - Grade formulas such as `avg([Test 1],[Test 2])*0.6 + Final*0.4`
//! - Computed items that read other computed items, evaluated in dependency order
//! - Category averages and overall grades
//! - JSON gradebook files and CSV reports
//!
//! ## Example
//!
//! ```rust
//! use gradebook::prelude::*;
//!
//! let mut book = Gradebook::new();
//! book.add_category(Category::new("Exams", 1.0)).unwrap();
//! book.add_item(GradeItem::scored("Midterm").in_category("Exams")).unwrap();
//! book.add_item(GradeItem::scored("Final").in_category("Exams")).unwrap();
//! book.add_item(
//!     GradeItem::computed("Exam Grade", "[Midterm]*0.4+[Final]*0.6").with_weight(0.0),
//! )
//! .unwrap();
//! book.add_student(
//!     Student::new("s1", "Ada")
//!         .with_score("Midterm", 80.0)
//!         .with_score("Final", 90.0),
//! )
//! .unwrap();
//!
//! let class = book.calculate_all(&CalculationOptions::default()).unwrap();
//! assert_eq!(class.students[0].score("Exam Grade"), Some(86.0));
//! assert_eq!(class.students[0].category_average("Exams"), Some(85.0));
//! ```

pub mod calculation;
pub mod export;
pub mod prelude;

// Re-export calculation types
pub use calculation::{
    CalculationOptions, CalculationStats, CategoryResult, ClassReport, GradebookCalculationExt,
    ItemResult, StudentReport,
};

// Re-export export types
pub use export::{CsvReportOptions, ExportError, ExportResult, LineTerminator, ReportWriter};

// Re-export core types
pub use gradebook_core::{
    normalize_name, Category, Error, GradeItem, Gradebook, ItemKind, Result, Student,
    VariableBindings,
};

// Re-export formula types
pub use gradebook_formula::{
    evaluate, evaluate_formula, evaluate_resolved, formula_references, parse_formula,
    parse_formula_with, parse_formula_with_names, references, resolve, try_evaluate_formula,
    CalculationOrder, DependencyGraph, EvaluationContext, EvaluationOptions, FormulaError,
    FormulaExpr, FormulaResult, ParseOptions,
};
