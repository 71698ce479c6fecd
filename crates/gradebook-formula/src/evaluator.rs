//! Formula evaluator
//!
//! Evaluates formula ASTs against one student's variable bindings.

use crate::ast::{FormulaExpr, UnaryOperator};
use crate::error::{FormulaError, FormulaResult};
use crate::functions::FunctionRegistry;
use crate::parser::{parse_expression_with, ParseOptions};
use gradebook_core::VariableBindings;
use std::sync::OnceLock;

/// Global function registry (lazily initialized)
static FUNCTION_REGISTRY: OnceLock<FunctionRegistry> = OnceLock::new();

fn get_function_registry() -> &'static FunctionRegistry {
    FUNCTION_REGISTRY.get_or_init(FunctionRegistry::new)
}

/// Evaluation behaviour switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationOptions {
    /// Report unresolved variables, unknown functions and malformed syntax
    /// as errors instead of treating them as zero
    pub strict: bool,
}

impl EvaluationOptions {
    /// Strict evaluation
    pub fn strict() -> Self {
        Self { strict: true }
    }

    /// Matching parser options
    pub fn parse_options(&self) -> ParseOptions {
        ParseOptions {
            strict: self.strict,
        }
    }
}

/// Context for formula evaluation
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    /// Grade item name → this student's score
    pub bindings: &'a VariableBindings,
    /// Fail on authoring mistakes instead of substituting zero
    pub strict: bool,
}

impl<'a> EvaluationContext<'a> {
    /// Create a lenient context
    pub fn new(bindings: &'a VariableBindings) -> Self {
        Self {
            bindings,
            strict: false,
        }
    }

    /// Create a context from options
    pub fn with_options(bindings: &'a VariableBindings, options: &EvaluationOptions) -> Self {
        Self {
            bindings,
            strict: options.strict,
        }
    }

    /// Resolve a variable to its bound value
    pub fn get_variable(&self, name: &str) -> FormulaResult<f64> {
        match self.bindings.get(name) {
            Some(value) => Ok(value),
            None if self.strict => Err(FormulaError::UnresolvedVariable(name.to_string())),
            None => {
                tracing::debug!(variable = name, "unresolved variable evaluates to 0");
                Ok(0.0)
            }
        }
    }
}

/// Evaluate a formula expression
pub fn evaluate(expr: &FormulaExpr, ctx: &EvaluationContext) -> FormulaResult<f64> {
    match expr {
        FormulaExpr::Number(n) => Ok(*n),

        FormulaExpr::Variable(name) => ctx.get_variable(name),

        // Division by zero yields inf/NaN, never an error
        FormulaExpr::BinaryOp { op, left, right } => {
            let l = evaluate(left, ctx)?;
            let r = evaluate(right, ctx)?;
            Ok(op.apply(l, r))
        }

        FormulaExpr::UnaryOp {
            op: UnaryOperator::Negate,
            operand,
        } => Ok(-evaluate(operand, ctx)?),

        FormulaExpr::Function { name, args } => evaluate_function(name, args, ctx),
    }
}

/// Evaluate a function call
fn evaluate_function(
    name: &str,
    args: &[FormulaExpr],
    ctx: &EvaluationContext,
) -> FormulaResult<f64> {
    let registry = get_function_registry();

    let func = match registry.get(name) {
        Some(func) => func,
        None if ctx.strict => return Err(FormulaError::UnknownFunction(name.to_string())),
        None => {
            tracing::debug!(function = name, "unknown function evaluates to 0");
            return Ok(0.0);
        }
    };

    // Evaluate arguments
    let mut evaluated_args = Vec::with_capacity(args.len());
    for arg in args {
        evaluated_args.push(evaluate(arg, ctx)?);
    }

    // Call the function
    (func.implementation)(&evaluated_args, ctx)
}

/// Evaluate an already-substituted numeric expression, fail-soft
///
/// Any failure yields `0.0`.
///
/// # Example
/// ```rust
/// use gradebook_formula::evaluate_expression;
///
/// assert_eq!(evaluate_expression("avg(12,16,20)"), 16.0);
/// assert_eq!(evaluate_expression("(2+3)*4"), 20.0);
/// ```
pub fn evaluate_expression(expression: &str) -> f64 {
    match try_evaluate_expression(expression, &EvaluationOptions::default()) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(expression, error = %e, "expression evaluation failed, using 0");
            0.0
        }
    }
}

/// Evaluate an already-substituted numeric expression
///
/// Names left in the expression are treated as unbound variables.
pub fn try_evaluate_expression(
    expression: &str,
    options: &EvaluationOptions,
) -> FormulaResult<f64> {
    let ast = parse_expression_with(expression, &options.parse_options())?;
    let bindings = VariableBindings::new();
    evaluate(&ast, &EvaluationContext::with_options(&bindings, options))
}
