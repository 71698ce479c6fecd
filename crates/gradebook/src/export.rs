//! CSV report export
//!
//! One row per student: raw and computed item scores, category averages
//! and the overall grade. Missing values are written as empty fields.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use thiserror::Error;

use crate::{ClassReport, Gradebook, StudentReport};

/// Result type for report export
pub type ExportResult<T> = std::result::Result<T, ExportError>;

/// Errors that can occur while writing a report
#[derive(Debug, Error)]
pub enum ExportError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV library error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Options for writing CSV reports
#[derive(Debug, Clone)]
pub struct CsvReportOptions {
    /// Field delimiter (default: comma)
    pub delimiter: u8,
    /// Digits after the decimal point (default: 2)
    pub precision: usize,
    /// Line terminator
    pub line_terminator: LineTerminator,
}

impl Default for CsvReportOptions {
    fn default() -> Self {
        Self {
            delimiter: b',',
            precision: 2,
            line_terminator: LineTerminator::LF,
        }
    }
}

/// Line terminator type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    /// Unix-style (LF)
    LF,
    /// Windows-style (CRLF)
    CRLF,
}

/// CSV report writer
pub struct ReportWriter;

impl ReportWriter {
    /// Write a class report to a CSV file
    pub fn write_file<P: AsRef<Path>>(
        book: &Gradebook,
        report: &ClassReport,
        path: P,
        options: &CsvReportOptions,
    ) -> ExportResult<()> {
        let file = File::create(path)?;
        Self::write(book, &report.students, file, options)
    }

    /// Write student reports to a writer
    ///
    /// Header: `student_id,student_name,<item...>,<category...>,overall`
    pub fn write<W: Write>(
        book: &Gradebook,
        students: &[StudentReport],
        writer: W,
        options: &CsvReportOptions,
    ) -> ExportResult<()> {
        let terminator = match options.line_terminator {
            LineTerminator::LF => csv::Terminator::Any(b'\n'),
            LineTerminator::CRLF => csv::Terminator::CRLF,
        };

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(options.delimiter)
            .terminator(terminator)
            .from_writer(writer);

        let mut header = vec!["student_id".to_string(), "student_name".to_string()];
        header.extend(book.items().map(|i| i.name.clone()));
        header.extend(book.categories().map(|c| c.name.clone()));
        header.push("overall".to_string());
        csv_writer.write_record(&header)?;

        for student in students {
            let mut record = vec![student.student_id.clone(), student.student_name.clone()];
            record.extend(
                student
                    .items
                    .iter()
                    .map(|i| format_value(i.score, options.precision)),
            );
            record.extend(
                student
                    .categories
                    .iter()
                    .map(|c| format_value(c.average, options.precision)),
            );
            record.push(format_value(student.overall, options.precision));
            csv_writer.write_record(&record)?;
        }

        csv_writer.flush()?;
        Ok(())
    }
}

fn format_value(value: Option<f64>, precision: usize) -> String {
    match value {
        Some(v) => format!("{:.*}", precision, v),
        None => String::new(),
    }
}
