//! Aggregate functions: MAX, MIN, AVG/MEAN
//!
//! Each returns 0 for an empty argument list.

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;

/// MAX function
pub fn fn_max(args: &[f64], _ctx: &EvaluationContext) -> FormulaResult<f64> {
    let max = args
        .iter()
        .copied()
        .fold(None, |acc: Option<f64>, n| Some(acc.map_or(n, |m| m.max(n))));

    Ok(max.unwrap_or(0.0))
}

/// MIN function
pub fn fn_min(args: &[f64], _ctx: &EvaluationContext) -> FormulaResult<f64> {
    let min = args
        .iter()
        .copied()
        .fold(None, |acc: Option<f64>, n| Some(acc.map_or(n, |m| m.min(n))));

    Ok(min.unwrap_or(0.0))
}

/// AVG / MEAN function
pub fn fn_average(args: &[f64], _ctx: &EvaluationContext) -> FormulaResult<f64> {
    if args.is_empty() {
        return Ok(0.0);
    }

    let sum: f64 = args.iter().sum();
    Ok(sum / args.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradebook_core::VariableBindings;

    fn call(f: fn(&[f64], &EvaluationContext) -> FormulaResult<f64>, args: &[f64]) -> f64 {
        let bindings = VariableBindings::new();
        let ctx = EvaluationContext::new(&bindings);
        f(args, &ctx).unwrap()
    }

    #[test]
    fn test_max_min() {
        assert_eq!(call(fn_max, &[14.0, 17.5]), 17.5);
        assert_eq!(call(fn_min, &[5.0, 2.0, 8.0, 1.0]), 1.0);
        assert_eq!(call(fn_max, &[-3.0, -7.0]), -3.0);
        assert_eq!(call(fn_min, &[4.0]), 4.0);
    }

    #[test]
    fn test_average() {
        assert_eq!(call(fn_average, &[12.0, 16.0, 20.0]), 16.0);
        assert_eq!(call(fn_average, &[2.5]), 2.5);
    }

    #[test]
    fn test_empty_arguments() {
        assert_eq!(call(fn_max, &[]), 0.0);
        assert_eq!(call(fn_min, &[]), 0.0);
        assert_eq!(call(fn_average, &[]), 0.0);
    }
}
