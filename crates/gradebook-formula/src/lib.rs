//! # gradebook-formula
//!
//! Grade formula parser and evaluator for gradebook.
//!
//! A grade formula computes one grade item from others, e.g.
//! `max([Test 1],[Test 2])` or `avg(Test1,Test2)*0.6 + Final*0.4`.
//!
//! This crate provides:
//! - Formula parsing (text → AST) with bracketed and bare variable references
//! - Formula evaluation (AST → number) against one student's bindings
//! - Textual variable substitution for the two-phase pipeline
//! - The `max`, `min`, `avg`/`mean` functions
//! - Dependency tracking between computed items
//!
//! Evaluation is fail-soft by default: unknown names, unknown functions and
//! malformed syntax contribute `0` instead of failing, and
//! [`evaluate_formula`] returns `0.0` for anything it cannot compute.
//! [`try_evaluate_formula`] with [`EvaluationOptions::strict`] reports the
//! reason instead.
//!
//! ## Example
//!
//! ```rust
//! use gradebook_core::VariableBindings;
//! use gradebook_formula::evaluate_formula;
//!
//! let vars: VariableBindings = [("Midterm", 80.0), ("Final", 90.0)].into_iter().collect();
//! assert_eq!(evaluate_formula("[Midterm]*0.4+[Final]*0.6", &vars), 86.0);
//! ```

pub mod ast;
pub mod dependency;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod parser;
pub mod resolver;

pub use ast::{BinaryOperator, FormulaExpr, UnaryOperator};
pub use dependency::{references, CalculationOrder, DependencyGraph};
pub use error::{FormulaError, FormulaResult};
pub use evaluator::{
    evaluate, evaluate_expression, try_evaluate_expression, EvaluationContext, EvaluationOptions,
};
pub use parser::{
    parse_expression_with, parse_formula, parse_formula_with, parse_formula_with_names,
    ParseOptions, MAX_NESTING_DEPTH, MAX_OPERATORS,
};
pub use resolver::resolve;

use gradebook_core::VariableBindings;

/// Evaluate a grade formula for one student, fail-soft
///
/// Any failure yields `0.0`; the formula, its substituted expression and
/// the error are logged at `warn` level. Division by zero is not a failure
/// and returns infinity or NaN.
pub fn evaluate_formula(formula: &str, bindings: &VariableBindings) -> f64 {
    match try_evaluate_formula(formula, bindings, &EvaluationOptions::default()) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(
                formula,
                expression = %resolve(formula, bindings),
                error = %e,
                "formula evaluation failed, using 0"
            );
            0.0
        }
    }
}

/// Evaluate a grade formula for one student, reporting failures
///
/// Bound names are recognized bare even when they contain punctuation,
/// so `Test-1*2` reads the variable `Test-1` when it is bound.
pub fn try_evaluate_formula(
    formula: &str,
    bindings: &VariableBindings,
    options: &EvaluationOptions,
) -> FormulaResult<f64> {
    let names: Vec<&str> = bindings.iter().map(|(name, _)| name).collect();
    let ast = parse_formula_with_names(formula, &options.parse_options(), &names)?;
    let value = evaluate(&ast, &EvaluationContext::with_options(bindings, options))?;

    tracing::trace!(formula, value, "evaluated formula");
    Ok(value)
}

/// Evaluate through the two-phase pipeline: textual substitution with
/// [`resolve`], then [`evaluate_expression`]
///
/// Agrees with [`evaluate_formula`] on well-formed formulas; kept for
/// callers that want the substituted text as an intermediate.
pub fn evaluate_resolved(formula: &str, bindings: &VariableBindings) -> f64 {
    let expression = resolve(formula, bindings);
    tracing::trace!(formula, expression = %expression, "resolved formula");
    evaluate_expression(&expression)
}

/// Variable names a formula reads (strict parse)
pub fn formula_references(formula: &str) -> FormulaResult<Vec<String>> {
    let ast = parse_formula_with(formula, &ParseOptions::strict())?;
    Ok(references(&ast))
}
