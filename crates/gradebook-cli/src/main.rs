//! Gradebook CLI - grade formula and report tool

mod telemetry;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use gradebook::prelude::*;
use gradebook::{parse_formula_with, references, resolve, ParseOptions};
use std::io;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "grade")]
#[command(author, version, about = "Grade formula evaluation and gradebook reports")]
struct Cli {
    /// Log level or filter (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a formula and print the score
    Eval {
        /// Grade formula, e.g. "max([Test 1],[Test 2])"
        formula: String,

        #[command(flatten)]
        vars: VarArgs,

        /// Fail on unknown names, unknown functions and malformed syntax
        #[arg(long)]
        strict: bool,
    },

    /// Print the formula with variables substituted
    Resolve {
        /// Grade formula
        formula: String,

        #[command(flatten)]
        vars: VarArgs,
    },

    /// Parse a formula strictly and list the names it reads
    Check {
        /// Grade formula
        formula: String,
    },

    /// Calculate a gradebook and print or export the report
    #[command(alias = "report")]
    Calc {
        /// Gradebook JSON file
        input: PathBuf,

        /// Only calculate this student id
        #[arg(short, long)]
        student: Option<String>,

        /// Write the report as CSV to this file instead of stdout
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Field delimiter for the report
        #[arg(short, long, default_value = ",")]
        delimiter: char,

        /// Fail on the first formula problem instead of scoring it as zero
        #[arg(long)]
        strict: bool,
    },
}

#[derive(Args)]
struct VarArgs {
    /// Variable binding NAME=VALUE (repeatable)
    #[arg(short = 'v', long = "var", value_name = "NAME=VALUE", value_parser = parse_var)]
    vars: Vec<(String, f64)>,
}

impl VarArgs {
    fn bindings(&self) -> VariableBindings {
        self.vars.iter().cloned().collect()
    }
}

/// Parse `NAME=VALUE`; the last `=` separates, so names may contain spaces
fn parse_var(arg: &str) -> std::result::Result<(String, f64), String> {
    let (name, value) = arg
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{}'", arg))?;
    if name.trim().is_empty() {
        return Err(format!("missing variable name in '{}'", arg));
    }
    let value: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid number '{}' for '{}'", value, name))?;
    Ok((name.to_string(), value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init(&cli.log_level)?;

    match cli.command {
        Commands::Eval {
            formula,
            vars,
            strict,
        } => eval(&formula, &vars.bindings(), strict),
        Commands::Resolve { formula, vars } => {
            println!("{}", resolve(&formula, &vars.bindings()));
            Ok(())
        }
        Commands::Check { formula } => check(&formula),
        Commands::Calc {
            input,
            student,
            csv,
            delimiter,
            strict,
        } => calc(&input, student.as_deref(), csv.as_deref(), delimiter, strict),
    }
}

fn eval(formula: &str, bindings: &VariableBindings, strict: bool) -> Result<()> {
    let value = if strict {
        try_evaluate_formula(formula, bindings, &EvaluationOptions::strict())
            .with_context(|| format!("Failed to evaluate '{}'", formula))?
    } else {
        evaluate_formula(formula, bindings)
    };

    println!("{}", value);
    Ok(())
}

fn check(formula: &str) -> Result<()> {
    let ast = parse_formula_with(formula, &ParseOptions::strict())
        .with_context(|| format!("Invalid formula '{}'", formula))?;

    println!("expression: {}", ast);
    println!("references: {}", references(&ast).join(", "));
    Ok(())
}

fn calc(
    input: &Path,
    student: Option<&str>,
    csv: Option<&Path>,
    delimiter: char,
    strict: bool,
) -> Result<()> {
    if !delimiter.is_ascii() {
        bail!("Delimiter must be a single ASCII character, got '{}'", delimiter);
    }

    let text = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read '{}'", input.display()))?;
    let book = Gradebook::from_json(&text)
        .with_context(|| format!("Failed to load gradebook '{}'", input.display()))?;

    let options = CalculationOptions {
        strict,
        ..CalculationOptions::default()
    };

    let class = match student {
        Some(id) => {
            let report = book
                .calculate_student(id, &options)
                .with_context(|| format!("Failed to calculate student '{}'", id))?;
            ClassReport {
                stats: CalculationStats {
                    students_calculated: 1,
                    ..CalculationStats::default()
                },
                students: vec![report],
            }
        }
        None => book
            .calculate_all(&options)
            .context("Failed to calculate gradebook")?,
    };

    if let Some(circular) = class.students.first().map(|s| &s.circular) {
        if !circular.is_empty() {
            eprintln!(
                "Warning: circular formulas scored as 0: {}",
                circular.join(", ")
            );
        }
    }

    let report_options = CsvReportOptions {
        delimiter: delimiter as u8,
        ..CsvReportOptions::default()
    };

    match csv {
        Some(path) => {
            ReportWriter::write_file(&book, &class, path, &report_options)
                .with_context(|| format!("Failed to write '{}'", path.display()))?;
            eprintln!(
                "Wrote {} students to {}",
                class.students.len(),
                path.display()
            );
        }
        None => {
            ReportWriter::write(&book, &class.students, io::stdout().lock(), &report_options)
                .context("Failed to write report")?;
        }
    }

    if student.is_none() {
        eprintln!(
            "Calculated {} students ({} formulas, {} zeroed)",
            class.stats.students_calculated,
            class.stats.formulas_evaluated,
            class.stats.formulas_zeroed
        );
    }
    Ok(())
}
