//! Property tests for the formula evaluator

use gradebook_core::VariableBindings;
use gradebook_formula::{evaluate_formula, evaluate_resolved};
use proptest::prelude::*;

fn operator() -> impl Strategy<Value = char> {
    prop_oneof![Just('+'), Just('-'), Just('*'), Just('/')]
}

proptest! {
    /// Property: integer-literal arithmetic matches Rust float arithmetic.
    #[test]
    fn arithmetic_matches_native(a in -1000i32..1000, b in -1000i32..1000, op in operator()) {
        prop_assume!(op != '/' || b != 0);

        let (a, b) = (f64::from(a), f64::from(b));
        let expected = match op {
            '+' => a + b,
            '-' => a - b,
            '*' => a * b,
            _ => a / b,
        };

        let formula = format!("{}{}{}", a, op, b);
        prop_assert_eq!(evaluate_formula(&formula, &VariableBindings::new()), expected);
    }

    /// Property: the fail-soft entry points never panic, whatever the input.
    #[test]
    fn never_panics(formula in "\\PC{0,64}") {
        let bindings: VariableBindings = [("Test 1", 12.0), ("Final", 80.0)].into_iter().collect();
        let _ = evaluate_formula(&formula, &bindings);
        let _ = evaluate_resolved(&formula, &bindings);
    }

    /// Property: both pipelines agree on weighted sums of bound variables.
    #[test]
    fn pipelines_agree_on_weighted_sums(
        scores in proptest::collection::vec(0u32..=100, 1..6),
        weight in 1u32..10,
    ) {
        let bindings: VariableBindings = scores
            .iter()
            .enumerate()
            .map(|(i, s)| (format!("Test {}", i + 1), f64::from(*s)))
            .collect();

        let names: Vec<String> = (1..=scores.len()).map(|i| format!("[Test {}]", i)).collect();
        let formula = format!("avg({})*{} + max({})", names.join(","), weight, names.join(","));

        prop_assert_eq!(
            evaluate_formula(&formula, &bindings),
            evaluate_resolved(&formula, &bindings)
        );
    }
}
