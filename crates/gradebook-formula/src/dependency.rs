//! Dependency tracking between computed grade items

use crate::ast::FormulaExpr;
use gradebook_core::normalize_name;
use std::collections::{HashMap, HashSet};

/// Variable names a formula reads, in first-occurrence order, without
/// duplicates
pub fn references(expr: &FormulaExpr) -> Vec<String> {
    let mut names = Vec::new();
    collect_references(expr, &mut names);
    names
}

fn collect_references(expr: &FormulaExpr, names: &mut Vec<String>) {
    match expr {
        FormulaExpr::Number(_) => {}
        FormulaExpr::Variable(name) => {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        FormulaExpr::BinaryOp { left, right, .. } => {
            collect_references(left, names);
            collect_references(right, names);
        }
        FormulaExpr::UnaryOp { operand, .. } => collect_references(operand, names),
        FormulaExpr::Function { args, .. } => {
            for arg in args {
                collect_references(arg, names);
            }
        }
    }
}

/// Evaluation plan for a set of computed items
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationOrder {
    /// Items in an order where every precedent comes first
    pub order: Vec<String>,
    /// Items that lie on a dependency cycle
    pub circular: Vec<String>,
}

/// Dependency graph for grade items
///
/// Nodes are item names with whitespace removed. Tracks which items read
/// which other items, so computed items can be evaluated precedents-first.
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Item → Items that read it (dependents)
    dependents: HashMap<String, HashSet<String>>,
    /// Item → Items it reads (precedents)
    precedents: HashMap<String, HashSet<String>>,
}

impl DependencyGraph {
    /// Create a new empty dependency graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a dependency: dependent reads precedent
    pub fn add_dependency(&mut self, precedent: &str, dependent: &str) {
        let precedent = normalize_name(precedent);
        let dependent = normalize_name(dependent);

        self.dependents
            .entry(precedent.clone())
            .or_default()
            .insert(dependent.clone());
        self.precedents
            .entry(dependent)
            .or_default()
            .insert(precedent);
    }

    /// Record every variable a formula reads as a precedent of `item`
    pub fn add_formula(&mut self, item: &str, expr: &FormulaExpr) {
        for name in references(expr) {
            self.add_dependency(&name, item);
        }
    }

    /// Get items that read the given item
    pub fn get_dependents(&self, item: &str) -> impl Iterator<Item = &str> + '_ {
        self.dependents
            .get(&normalize_name(item))
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Get items the given item reads
    pub fn get_precedents(&self, item: &str) -> impl Iterator<Item = &str> + '_ {
        self.precedents
            .get(&normalize_name(item))
            .into_iter()
            .flat_map(|set| set.iter().map(String::as_str))
    }

    /// Check whether an item lies on a dependency cycle (including reading
    /// itself)
    pub fn has_circular_reference(&self, item: &str) -> bool {
        let start = normalize_name(item);
        let mut visited = HashSet::new();
        self.reaches(&start, &start, &mut visited)
    }

    /// DFS over precedents from `from`, looking for `target`
    fn reaches<'a>(&'a self, from: &'a str, target: &str, visited: &mut HashSet<&'a str>) -> bool {
        let Some(precedents) = self.precedents.get(from) else {
            return false;
        };

        for precedent in precedents {
            if precedent == target {
                return true;
            }
            if visited.insert(precedent.as_str()) && self.reaches(precedent, target, visited) {
                return true;
            }
        }
        false
    }

    /// Plan the evaluation of `items`
    ///
    /// Items on a cycle go to [`CalculationOrder::circular`] and are left out
    /// of the order. Precedents that are not in `items` (scored items) do not
    /// appear in the result. Ties keep the order of `items`.
    pub fn calculation_order<S: AsRef<str>>(&self, items: &[S]) -> CalculationOrder {
        let wanted: Vec<String> = items.iter().map(|i| normalize_name(i.as_ref())).collect();
        let wanted_set: HashSet<&str> = wanted.iter().map(String::as_str).collect();

        let circular: Vec<String> = wanted
            .iter()
            .filter(|item| self.has_circular_reference(item))
            .cloned()
            .collect();
        let circular_set: HashSet<&str> = circular.iter().map(String::as_str).collect();

        let mut order = Vec::new();
        let mut visited = HashSet::new();
        for item in &wanted {
            self.topological_sort(item, &wanted_set, &circular_set, &mut visited, &mut order);
        }

        CalculationOrder { order, circular }
    }

    /// Topological sort helper (DFS, precedents first)
    fn topological_sort<'a>(
        &'a self,
        item: &'a str,
        wanted: &HashSet<&str>,
        circular: &HashSet<&str>,
        visited: &mut HashSet<&'a str>,
        order: &mut Vec<String>,
    ) {
        if circular.contains(item) || !visited.insert(item) {
            return;
        }

        if let Some(precedents) = self.precedents.get(item) {
            // Sorted for a deterministic order between siblings
            let mut precedents: Vec<&String> = precedents.iter().collect();
            precedents.sort();
            for precedent in precedents {
                self.topological_sort(precedent, wanted, circular, visited, order);
            }
        }

        if wanted.contains(item) {
            order.push(item.to_string());
        }
    }
}
