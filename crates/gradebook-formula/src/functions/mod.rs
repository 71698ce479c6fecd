//! Built-in formula functions

pub mod aggregate;

use crate::error::FormulaResult;
use crate::evaluator::EvaluationContext;
use ahash::AHashMap;

/// Function implementation signature
///
/// Arguments arrive already evaluated, left to right. An empty slice is
/// legal for every built-in.
pub type FunctionImpl = fn(&[f64], &EvaluationContext) -> FormulaResult<f64>;

/// Function definition
pub struct FunctionDef {
    /// Function name (lowercase)
    pub name: &'static str,
    /// Implementation
    pub implementation: FunctionImpl,
}

/// Function registry
pub struct FunctionRegistry {
    functions: AHashMap<String, FunctionDef>,
}

impl Default for FunctionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl FunctionRegistry {
    /// Create a new registry with all built-in functions
    pub fn new() -> Self {
        let mut registry = Self {
            functions: AHashMap::new(),
        };

        registry.register_aggregate_functions();

        registry
    }

    /// Look up a function by name (case-insensitive)
    pub fn get(&self, name: &str) -> Option<&FunctionDef> {
        self.functions.get(&name.to_lowercase())
    }

    /// Register a function
    pub fn register(&mut self, def: FunctionDef) {
        self.functions.insert(def.name.to_lowercase(), def);
    }

    /// Names of all registered functions, sorted
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.functions.values().map(|def| def.name).collect();
        names.sort_unstable();
        names
    }

    fn register_aggregate_functions(&mut self) {
        self.register(FunctionDef {
            name: "max",
            implementation: aggregate::fn_max,
        });

        self.register(FunctionDef {
            name: "min",
            implementation: aggregate::fn_min,
        });

        // AVG and MEAN are aliases
        self.register(FunctionDef {
            name: "avg",
            implementation: aggregate::fn_average,
        });
        self.register(FunctionDef {
            name: "mean",
            implementation: aggregate::fn_average,
        });
    }
}
