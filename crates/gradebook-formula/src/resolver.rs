//! Textual variable substitution
//!
//! Rewrites every variable reference in a formula into the variable's
//! numeric value, leaving a purely numeric expression for
//! [`evaluate_expression`](crate::evaluate_expression). The AST pipeline in
//! [`evaluate_formula`](crate::evaluate_formula) does not need this step;
//! the resolver backs the two-phase pipeline and diagnostics that show the
//! substituted expression.

use gradebook_core::{normalize_name, VariableBindings};
use regex::{NoExpand, Regex};

/// Substitute variable values into a formula
///
/// Whitespace is stripped from the formula and from every variable name.
/// Variables are processed longest name first, so `Test` can never match
/// inside `Test1`. For each one the bracketed form `[Name]` is replaced,
/// then the bare form `Name` wherever it stands between word boundaries.
/// Names with no binding are left in place.
///
/// # Example
/// ```rust
/// use gradebook_core::VariableBindings;
/// use gradebook_formula::resolve;
///
/// let vars: VariableBindings = [("Test", 5.0), ("Test1", 10.0)].into_iter().collect();
/// assert_eq!(resolve("Test1 + Test", &vars), "10+5");
/// ```
pub fn resolve(formula: &str, bindings: &VariableBindings) -> String {
    let mut expression = normalize_name(formula);

    let mut variables: Vec<(String, f64)> = bindings
        .iter()
        .map(|(name, value)| (normalize_name(name), value))
        .filter(|(name, _)| !name.is_empty())
        .collect();
    variables.sort_by(|(a, _), (b, _)| {
        b.chars()
            .count()
            .cmp(&a.chars().count())
            .then_with(|| a.cmp(b))
    });

    for (name, value) in variables {
        let literal = value.to_string();

        let bracketed = format!("[{}]", name);
        if expression.contains(&bracketed) {
            expression = expression.replace(&bracketed, &literal);
        }

        // A numeric name would rewrite the formula's own literals
        if name.chars().all(|c| c.is_ascii_digit() || c == '.') {
            continue;
        }

        let pattern = match bare_pattern(&name) {
            Ok(pattern) => pattern,
            Err(e) => {
                tracing::warn!(variable = %name, error = %e, "skipping bare substitution");
                continue;
            }
        };
        expression = pattern
            .replace_all(&expression, NoExpand(&literal))
            .into_owned();
    }

    expression
}

/// Match `name` on its own: word boundaries are only required on edges
/// where the name itself starts or ends with a word character
fn bare_pattern(name: &str) -> Result<Regex, regex::Error> {
    let is_word = |c: char| c.is_alphanumeric() || c == '_';

    let starts_word = name.chars().next().map_or(false, is_word);
    let ends_word = name.chars().last().map_or(false, is_word);

    Regex::new(&format!(
        "{}{}{}",
        if starts_word { r"\b" } else { "" },
        regex::escape(name),
        if ends_word { r"\b" } else { "" },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn vars(pairs: &[(&str, f64)]) -> VariableBindings {
        pairs.iter().copied().collect()
    }

    #[test]
    fn test_longest_name_first() {
        let bindings = vars(&[("Test", 5.0), ("Test1", 10.0)]);
        assert_eq!(resolve("Test1 + Test", &bindings), "10+5");
        assert_eq!(resolve("Test + Test1", &bindings), "5+10");
    }

    #[test]
    fn test_bracketed_and_bare() {
        let bindings = vars(&[("Midterm", 80.0), ("Final", 90.0)]);
        assert_eq!(
            resolve("[Midterm]*0.4+[Final]*0.6", &bindings),
            "80*0.4+90*0.6"
        );
        assert_eq!(resolve("[Final] - Final", &bindings), "90-90");
    }

    #[test]
    fn test_spaced_names() {
        let bindings = vars(&[("Test 1", 3.0), ("Test 2", 4.0)]);
        assert_eq!(resolve("[Test 1] + [Test 2]", &bindings), "3+4");
        assert_eq!(resolve("Test 1 + Test 2", &bindings), "3+4");
    }

    #[test]
    fn test_word_boundaries() {
        let bindings = vars(&[("Test1", 14.0), ("Test2", 17.5)]);
        assert_eq!(resolve("max(Test1,Test2)", &bindings), "max(14,17.5)");
        assert_eq!(resolve("MyTest12+Test1", &bindings), "MyTest12+14");
    }

    #[test]
    fn test_unbound_left_in_place() {
        assert_eq!(resolve("[Unknown]+5", &VariableBindings::new()), "[Unknown]+5");
    }

    #[test]
    fn test_value_rendering() {
        let bindings = vars(&[("A", -3.0), ("B", 0.25), ("C", 1e20)]);
        assert_eq!(resolve("A*B+C", &bindings), "-3*0.25+100000000000000000000");
    }

    #[test]
    fn test_names_with_symbols() {
        let bindings = vars(&[("Quiz #1", 8.0), ("Lab (A)", 9.0)]);
        assert_eq!(resolve("[Quiz #1] + [Lab (A)]", &bindings), "8+9");
        assert_eq!(resolve("Quiz#1*2", &bindings), "8*2");
    }

    #[test]
    fn test_numeric_names_skip_bare_form() {
        let bindings = vars(&[("1", 50.0)]);
        assert_eq!(resolve("[1]+1", &bindings), "50+1");
    }
}
