//! Prelude module - common imports for gradebook users
//!
//! ```rust
//! use gradebook::prelude::*;
//! ```

pub use crate::{
    // Calculation types
    CalculationOptions,
    CalculationStats,
    // Model types
    Category,
    ClassReport,
    // Export types
    CsvReportOptions,
    // Error types
    Error,
    // Formula entry points
    EvaluationOptions,
    FormulaError,
    GradeItem,
    Gradebook,
    // Extension traits
    GradebookCalculationExt,
    ReportWriter,
    Result,
    Student,
    StudentReport,
    VariableBindings,
    evaluate_formula,
    try_evaluate_formula,
};
