//! Gradebook calculation engine
//!
//! Computes every grade item, category average and overall grade for the
//! students of a [`Gradebook`]. Computed items are evaluated in dependency
//! order, so a formula may read the result of another formula.
//!
//! # Example
//!
//! ```rust
//! use gradebook::prelude::*;
//!
//! let mut book = Gradebook::new();
//! book.add_item(GradeItem::scored("Test 1")).unwrap();
//! book.add_item(GradeItem::scored("Test 2")).unwrap();
//! book.add_item(GradeItem::computed("Best", "max([Test 1],[Test 2])")).unwrap();
//! book.add_student(
//!     Student::new("s1", "Ada")
//!         .with_score("Test 1", 64.0)
//!         .with_score("Test 2", 81.0),
//! )
//! .unwrap();
//!
//! let report = book.calculate_student("s1", &CalculationOptions::default()).unwrap();
//! assert_eq!(report.score("Best"), Some(81.0));
//! ```

use crate::{
    evaluate, normalize_name, parse_formula_with_names, CalculationOrder, DependencyGraph, Error,
    EvaluationContext, EvaluationOptions, FormulaError, FormulaExpr, GradeItem, Gradebook,
    ItemKind, Result, Student,
};
use rayon::prelude::*;
use std::collections::HashMap;

/// Options for gradebook calculation
#[derive(Debug, Clone)]
pub struct CalculationOptions {
    /// Fail on the first formula problem instead of scoring it as zero
    pub strict: bool,
    /// Calculate students on the rayon thread pool in `calculate_all`
    pub parallel: bool,
}

impl Default for CalculationOptions {
    fn default() -> Self {
        Self {
            strict: false,
            parallel: true,
        }
    }
}

impl CalculationOptions {
    /// Strict calculation
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Self::default()
        }
    }

    fn evaluation_options(&self) -> EvaluationOptions {
        EvaluationOptions {
            strict: self.strict,
        }
    }
}

/// Statistics from a calculation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalculationStats {
    /// Number of students calculated
    pub students_calculated: usize,
    /// Number of computed item evaluations
    pub formulas_evaluated: usize,
    /// Number of evaluations that failed and were scored as zero
    pub formulas_zeroed: usize,
    /// Number of computed items on a dependency cycle
    pub circular_items: usize,
}

impl CalculationStats {
    fn merge(&mut self, other: &CalculationStats) {
        self.students_calculated += other.students_calculated;
        self.formulas_evaluated += other.formulas_evaluated;
        self.formulas_zeroed += other.formulas_zeroed;
    }
}

/// One grade item in a student report
#[derive(Debug, Clone, PartialEq)]
pub struct ItemResult {
    pub name: String,
    /// Raw or computed score; `None` if the student has no mark
    pub score: Option<f64>,
    /// Score as a percentage of the item's maximum
    pub percentage: Option<f64>,
}

/// One category in a student report
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryResult {
    pub name: String,
    /// Weighted average percentage; `None` if no item contributed
    pub average: Option<f64>,
}

/// Calculated grades for one student
#[derive(Debug, Clone, PartialEq)]
pub struct StudentReport {
    pub student_id: String,
    pub student_name: String,
    /// Items in gradebook order
    pub items: Vec<ItemResult>,
    /// Categories in gradebook order
    pub categories: Vec<CategoryResult>,
    /// Overall percentage
    pub overall: Option<f64>,
    /// Computed items skipped because of a dependency cycle
    pub circular: Vec<String>,
}

impl StudentReport {
    /// Score of an item (whitespace ignored)
    pub fn score(&self, item: &str) -> Option<f64> {
        self.item(item).and_then(|i| i.score)
    }

    /// Percentage of an item (whitespace ignored)
    pub fn percentage(&self, item: &str) -> Option<f64> {
        self.item(item).and_then(|i| i.percentage)
    }

    /// Average of a category
    pub fn category_average(&self, category: &str) -> Option<f64> {
        self.categories
            .iter()
            .find(|c| c.name == category)
            .and_then(|c| c.average)
    }

    fn item(&self, name: &str) -> Option<&ItemResult> {
        let wanted = normalize_name(name);
        self.items.iter().find(|i| normalize_name(&i.name) == wanted)
    }
}

/// Reports for the whole roster
#[derive(Debug, Clone, PartialEq)]
pub struct ClassReport {
    /// Student reports in roster order
    pub students: Vec<StudentReport>,
    pub stats: CalculationStats,
}

/// Extension trait for Gradebook to add calculation methods
pub trait GradebookCalculationExt {
    /// Calculate one student
    fn calculate_student(
        &self,
        student_id: &str,
        options: &CalculationOptions,
    ) -> Result<StudentReport>;

    /// Calculate every student on the roster
    fn calculate_all(&self, options: &CalculationOptions) -> Result<ClassReport>;
}

impl GradebookCalculationExt for Gradebook {
    fn calculate_student(
        &self,
        student_id: &str,
        options: &CalculationOptions,
    ) -> Result<StudentReport> {
        let student = self
            .student(student_id)
            .ok_or_else(|| Error::UnknownStudent(student_id.to_string()))?;

        let engine = CalculationEngine::new(self, options.clone())?;
        let (report, _) = engine.calculate_student(student)?;
        Ok(report)
    }

    fn calculate_all(&self, options: &CalculationOptions) -> Result<ClassReport> {
        let engine = CalculationEngine::new(self, options.clone())?;
        engine.calculate_all()
    }
}

/// A computed item ready for evaluation
struct ParsedFormula<'a> {
    item: &'a GradeItem,
    /// `Err` holds the parse failure, reported on every evaluation
    ast: std::result::Result<FormulaExpr, FormulaError>,
}

/// The calculation engine
///
/// Parses every formula once and plans the evaluation order; the plan is
/// then shared by all students.
struct CalculationEngine<'a> {
    book: &'a Gradebook,
    options: CalculationOptions,
    /// Parsed formulas, keyed by normalized item name
    formulas: HashMap<String, ParsedFormula<'a>>,
    plan: CalculationOrder,
}

impl<'a> CalculationEngine<'a> {
    fn new(book: &'a Gradebook, options: CalculationOptions) -> Result<Self> {
        let parse_options = options.evaluation_options().parse_options();
        let mut graph = DependencyGraph::new();
        let mut formulas = HashMap::new();
        let mut names = Vec::new();
        let item_names: Vec<&str> = book.items().map(|item| item.name.as_str()).collect();

        // Phase 1: parse formulas and build the dependency graph
        for item in book.computed_items() {
            let ItemKind::Computed { formula: text } = item.kind() else {
                continue;
            };

            let ast = parse_formula_with_names(text, &parse_options, &item_names);
            match &ast {
                Ok(expr) => graph.add_formula(&item.name, expr),
                Err(e) if options.strict => return Err(formula_error(&item.name, e)),
                Err(e) => {
                    tracing::warn!(
                        item = %item.name,
                        formula = text,
                        error = %e,
                        "formula does not parse"
                    );
                }
            }

            let key = normalize_name(&item.name);
            names.push(key.clone());
            formulas.insert(key, ParsedFormula { item, ast });
        }

        // Phase 2: evaluation order and cycles
        let plan = graph.calculation_order(&names);
        if let Some(first) = plan.circular.first() {
            if options.strict {
                return Err(Error::Formula(
                    FormulaError::CircularReference(first.clone()).to_string(),
                ));
            }
            tracing::warn!(items = ?plan.circular, "circular references between computed items");
        }

        Ok(Self {
            book,
            options,
            formulas,
            plan,
        })
    }

    fn calculate_all(&self) -> Result<ClassReport> {
        let students: Vec<&Student> = self.book.students().collect();
        let results = if self.options.parallel && students.len() > 1 {
            students
                .par_iter()
                .map(|s| self.calculate_student(s))
                .collect::<Result<Vec<_>>>()?
        } else {
            students
                .iter()
                .map(|s| self.calculate_student(s))
                .collect::<Result<Vec<_>>>()?
        };

        let mut stats = CalculationStats {
            circular_items: self.plan.circular.len(),
            ..CalculationStats::default()
        };
        let mut reports = Vec::with_capacity(results.len());
        for (report, student_stats) in results {
            stats.merge(&student_stats);
            reports.push(report);
        }

        tracing::debug!(?stats, "gradebook calculated");
        Ok(ClassReport {
            students: reports,
            stats,
        })
    }

    fn calculate_student(&self, student: &Student) -> Result<(StudentReport, CalculationStats)> {
        let mut stats = CalculationStats {
            students_calculated: 1,
            ..CalculationStats::default()
        };
        let mut bindings = self.book.bindings_for(&student.id)?;
        let mut computed: HashMap<&str, f64> = HashMap::new();

        for name in &self.plan.circular {
            if let Some(formula) = self.formulas.get(name) {
                bindings.insert(formula.item.name.clone(), 0.0);
                computed.insert(name.as_str(), 0.0);
            }
        }

        let eval_options = self.options.evaluation_options();
        for name in &self.plan.order {
            let Some(formula) = self.formulas.get(name) else {
                continue;
            };

            let result = match &formula.ast {
                Ok(ast) => {
                    let ctx = EvaluationContext::with_options(&bindings, &eval_options);
                    evaluate(ast, &ctx)
                }
                Err(e) => Err(e.clone()),
            };
            stats.formulas_evaluated += 1;

            let value = match result {
                Ok(value) => value,
                Err(e) if self.options.strict => {
                    return Err(formula_error(&formula.item.name, &e));
                }
                Err(e) => {
                    tracing::warn!(
                        student = %student.id,
                        item = %formula.item.name,
                        error = %e,
                        "formula evaluation failed, using 0"
                    );
                    stats.formulas_zeroed += 1;
                    0.0
                }
            };

            tracing::trace!(
                student = %student.id,
                item = %formula.item.name,
                value,
                "computed item"
            );
            bindings.insert(formula.item.name.clone(), value);
            computed.insert(name.as_str(), value);
        }

        let items: Vec<ItemResult> = self
            .book
            .items()
            .map(|item| {
                let score = match item.kind() {
                    ItemKind::Computed { .. } => {
                        computed.get(normalize_name(&item.name).as_str()).copied()
                    }
                    ItemKind::Scored => student.score(&item.name),
                };
                ItemResult {
                    name: item.name.clone(),
                    score,
                    percentage: score.map(|s| item.percentage(s)),
                }
            })
            .collect();

        let (categories, overall) = self.averages(&items);
        let report = StudentReport {
            student_id: student.id.clone(),
            student_name: student.name.clone(),
            items,
            categories,
            overall,
            circular: self
                .plan
                .circular
                .iter()
                .filter_map(|name| self.formulas.get(name))
                .map(|f| f.item.name.clone())
                .collect(),
        };
        Ok((report, stats))
    }

    /// Category averages and the overall grade
    fn averages(&self, items: &[ItemResult]) -> (Vec<CategoryResult>, Option<f64>) {
        let percentages: Vec<(&GradeItem, f64)> = self
            .book
            .items()
            .zip(items)
            .filter_map(|(item, result)| result.percentage.map(|p| (item, p)))
            .filter(|(item, p)| {
                if !p.is_finite() {
                    tracing::debug!(item = %item.name, "non-finite percentage left out of averages");
                }
                p.is_finite()
            })
            .collect();

        if self.book.categories().next().is_none() {
            // Everything forms one implicit bucket
            let overall = weighted_mean(percentages.iter().map(|(item, p)| (item.weight, *p)));
            return (Vec::new(), overall);
        }

        let categories: Vec<CategoryResult> = self
            .book
            .categories()
            .map(|category| CategoryResult {
                name: category.name.clone(),
                average: weighted_mean(
                    percentages
                        .iter()
                        .filter(|(item, _)| {
                            item.category.as_deref() == Some(category.name.as_str())
                        })
                        .map(|(item, p)| (item.weight, *p)),
                ),
            })
            .collect();

        let overall = weighted_mean(self.book.categories().zip(&categories).filter_map(
            |(category, result)| result.average.map(|avg| (category.weight, avg)),
        ));
        (categories, overall)
    }
}

/// Weighted mean of `(weight, value)` pairs; zero weights are ignored
fn weighted_mean(values: impl Iterator<Item = (f64, f64)>) -> Option<f64> {
    let (total, weights) = values
        .filter(|(weight, _)| *weight > 0.0)
        .fold((0.0, 0.0), |(total, weights), (weight, value)| {
            (total + weight * value, weights + weight)
        });

    (weights > 0.0).then(|| total / weights)
}

fn formula_error(item: &str, error: &FormulaError) -> Error {
    Error::Formula(format!("{}: {}", item, error))
}
