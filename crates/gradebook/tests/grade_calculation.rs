//! End-to-end tests for gradebook calculation

use gradebook::prelude::*;
use gradebook::{CalculationStats, LineTerminator};
use pretty_assertions::assert_eq;

const COURSE: &str = r#"{
    "categories": [
        { "name": "Tests", "weight": 60 },
        { "name": "Exam", "weight": 40 }
    ],
    "items": [
        { "name": "Test 1", "category": "Tests", "out_of": 20 },
        { "name": "Test 2", "category": "Tests", "out_of": 20 },
        { "name": "Best Test", "formula": "max([Test 1],[Test 2])", "out_of": 20, "weight": 0, "category": "Tests" },
        { "name": "Final", "category": "Exam" },
        { "name": "Predicted", "formula": "[Best Test]*5*0.5 + Final*0.5" }
    ],
    "students": [
        { "id": "s1", "name": "Ada", "scores": { "Test 1": 14, "Test 2": 18, "Final": 90 } },
        { "id": "s2", "name": "Grace", "scores": { "Test 1": 10, "Final": 70 } },
        { "id": "s3", "name": "Linus", "scores": {} }
    ]
}"#;

fn course() -> Gradebook {
    Gradebook::from_json(COURSE).unwrap()
}

fn approx(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value present");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn test_computed_items_follow_dependencies() {
    let report = course()
        .calculate_student("s1", &CalculationOptions::default())
        .unwrap();

    assert_eq!(report.score("Best Test"), Some(18.0));
    // 18*5*0.5 + 90*0.5
    assert_eq!(report.score("Predicted"), Some(90.0));
    assert_eq!(report.percentage("Best Test"), Some(90.0));
}

#[test]
fn test_weighted_categories() {
    let book = course();
    let options = CalculationOptions::default();

    let ada = book.calculate_student("s1", &options).unwrap();
    // Tests: (70% + 90%) / 2, the zero-weight computed item does not count
    approx(ada.category_average("Tests"), 80.0);
    approx(ada.category_average("Exam"), 90.0);
    approx(ada.overall, 80.0 * 0.6 + 90.0 * 0.4);

    let grace = book.calculate_student("s2", &options).unwrap();
    assert_eq!(grace.score("Test 2"), None);
    approx(grace.category_average("Tests"), 50.0);
    approx(grace.overall, 50.0 * 0.6 + 70.0 * 0.4);
}

#[test]
fn test_missing_marks() {
    let report = course()
        .calculate_student("s3", &CalculationOptions::default())
        .unwrap();

    // Unmarked references contribute 0 to formulas
    assert_eq!(report.score("Best Test"), Some(0.0));
    assert_eq!(report.score("Predicted"), Some(0.0));
    assert_eq!(report.category_average("Tests"), None);
    assert_eq!(report.category_average("Exam"), None);
    assert_eq!(report.overall, None);
}

#[test]
fn test_uncategorized_bucket_without_categories() {
    let mut book = Gradebook::new();
    book.add_item(GradeItem::scored("Quiz").out_of(10.0)).unwrap();
    book.add_item(GradeItem::scored("Essay").with_weight(3.0))
        .unwrap();
    book.add_student(
        Student::new("s1", "Ada")
            .with_score("Quiz", 6.0)
            .with_score("Essay", 80.0),
    )
    .unwrap();

    let report = book
        .calculate_student("s1", &CalculationOptions::default())
        .unwrap();
    assert!(report.categories.is_empty());
    approx(report.overall, (60.0 + 3.0 * 80.0) / 4.0);
}

#[test]
fn test_uncategorized_items_ignored_with_categories() {
    let mut book = Gradebook::new();
    book.add_category(Category::new("Labs", 1.0)).unwrap();
    book.add_item(GradeItem::scored("Lab").in_category("Labs"))
        .unwrap();
    book.add_item(GradeItem::scored("Bonus")).unwrap();
    book.add_student(
        Student::new("s1", "Ada")
            .with_score("Lab", 70.0)
            .with_score("Bonus", 100.0),
    )
    .unwrap();

    let report = book
        .calculate_student("s1", &CalculationOptions::default())
        .unwrap();
    assert_eq!(report.overall, Some(70.0));
}

#[test]
fn test_two_item_cycle_scores_zero() {
    let mut book = Gradebook::new();
    book.add_item(GradeItem::scored("Base")).unwrap();
    book.add_item(GradeItem::computed("A", "B + Base")).unwrap();
    book.add_item(GradeItem::computed("B", "A + Base")).unwrap();
    book.add_item(GradeItem::computed("Double", "Base * 2"))
        .unwrap();
    book.add_student(Student::new("s1", "Ada").with_score("Base", 10.0))
        .unwrap();

    let class = book.calculate_all(&CalculationOptions::default()).unwrap();
    let report = &class.students[0];
    assert_eq!(report.score("A"), Some(0.0));
    assert_eq!(report.score("B"), Some(0.0));
    assert_eq!(report.score("Double"), Some(20.0));
    assert_eq!(report.circular, vec!["A", "B"]);
    assert_eq!(class.stats.circular_items, 2);

    let err = book
        .calculate_all(&CalculationOptions::strict())
        .unwrap_err();
    assert!(matches!(err, Error::Formula(msg) if msg.contains("Circular")));
}

#[test]
fn test_broken_formula_counts_as_zeroed() {
    let mut book = Gradebook::new();
    book.add_item(GradeItem::scored("Test")).unwrap();
    let deep = format!("{}Test", "(".repeat(1_000));
    book.add_item(GradeItem::computed("Deep", deep)).unwrap();
    book.add_item(GradeItem::computed("Fine", "Test + 1"))
        .unwrap();
    book.add_student(Student::new("s1", "Ada").with_score("Test", 5.0))
        .unwrap();
    book.add_student(Student::new("s2", "Bob").with_score("Test", 7.0))
        .unwrap();

    let class = book.calculate_all(&CalculationOptions::default()).unwrap();
    assert_eq!(
        class.stats,
        CalculationStats {
            students_calculated: 2,
            formulas_evaluated: 4,
            formulas_zeroed: 2,
            circular_items: 0,
        }
    );
    assert_eq!(class.students[1].score("Deep"), Some(0.0));
    assert_eq!(class.students[1].score("Fine"), Some(8.0));

    assert!(book.calculate_all(&CalculationOptions::strict()).is_err());
}

#[test]
fn test_parallel_results_keep_roster_order() {
    let mut book = Gradebook::new();
    book.add_item(GradeItem::scored("Test")).unwrap();
    book.add_item(GradeItem::computed("Curved", "min(Test + 5, 100)"))
        .unwrap();
    for i in 0..50 {
        let student = Student::new(format!("s{i}"), format!("Student {i}"));
        book.add_student(student.with_score("Test", i as f64))
            .unwrap();
    }

    let parallel = book.calculate_all(&CalculationOptions::default()).unwrap();
    let sequential = book
        .calculate_all(&CalculationOptions {
            parallel: false,
            ..CalculationOptions::default()
        })
        .unwrap();

    assert_eq!(parallel, sequential);
    assert_eq!(parallel.stats.students_calculated, 50);
    for (i, report) in parallel.students.iter().enumerate() {
        assert_eq!(report.student_id, format!("s{i}"));
        assert_eq!(report.score("Curved"), Some(i as f64 + 5.0));
    }
}

#[test]
fn test_parallel_strict_propagates_error() {
    let mut book = Gradebook::new();
    book.add_item(GradeItem::scored("Test")).unwrap();
    book.add_item(GradeItem::computed("Total", "Test + Missing"))
        .unwrap();
    for i in 0..20 {
        let student = Student::new(format!("s{i}"), "Student");
        book.add_student(student.with_score("Test", 10.0)).unwrap();
    }

    let err = book.calculate_all(&CalculationOptions::strict()).unwrap_err();
    assert!(matches!(err, Error::Formula(msg) if msg.contains("Missing")));
}

#[test]
fn test_bare_names_with_punctuation() {
    let mut book = Gradebook::new();
    book.add_item(GradeItem::scored("Test")).unwrap();
    book.add_item(GradeItem::scored("Test-1")).unwrap();
    book.add_item(GradeItem::scored("Ch.1 Quiz")).unwrap();
    book.add_item(GradeItem::computed("Double", "Test-1*2"))
        .unwrap();
    book.add_item(GradeItem::computed("Quiz Bonus", "Ch.1Quiz + Test"))
        .unwrap();
    book.add_student(
        Student::new("s1", "Ada")
            .with_score("Test", 5.0)
            .with_score("Test-1", 6.0)
            .with_score("Ch.1 Quiz", 8.0),
    )
    .unwrap();

    let report = book
        .calculate_student("s1", &CalculationOptions::strict())
        .unwrap();
    assert_eq!(report.score("Double"), Some(12.0));
    assert_eq!(report.score("Quiz Bonus"), Some(13.0));
}

#[test]
fn test_write_csv_file() {
    let book = course();
    let class = book.calculate_all(&CalculationOptions::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.csv");
    let options = CsvReportOptions {
        precision: 1,
        line_terminator: LineTerminator::LF,
        ..CsvReportOptions::default()
    };
    ReportWriter::write_file(&book, &class, &path, &options).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(
        lines[0],
        "student_id,student_name,Test 1,Test 2,Best Test,Final,Predicted,Tests,Exam,overall"
    );
    assert_eq!(lines[1], "s1,Ada,14.0,18.0,18.0,90.0,90.0,80.0,90.0,84.0");
    assert_eq!(lines[3], "s3,Linus,,,0.0,,0.0,,,");
    assert_eq!(lines.len(), 4);
}
