//! End-to-end tests: query text compiled against derived records.

#![cfg(feature = "derive")]

use std::collections::{BTreeSet, VecDeque};
use std::str::FromStr;

use bigdecimal::BigDecimal;
use chrono::{DateTime, FixedOffset, TimeDelta, TimeZone, Utc};
use querysift::{
    compile, ComparisonOp, FieldType, PropertyShape, QueryBuilder, QueryError, Record, ScalarKind,
    TypeDescriptor,
};
use uuid::Uuid;

// ============================================================================
// Fixtures
// ============================================================================

#[derive(Debug, Clone, Record)]
#[sift(rename_all = "PascalCase")]
struct Employee {
    name: String,
    age: i32,
    active: bool,
    grade: char,
    salary: BigDecimal,
    score: f64,
    hired: DateTime<Utc>,
    shift: TimeDelta,
    badge: Uuid,
    nickname: Option<String>,
    manager_id: Option<u64>,
    skills: Vec<String>,
    ratings: [u8; 3],
    notes: VecDeque<Option<String>>,
    #[sift(rename = "Floors")]
    floor_set: BTreeSet<i16>,
    #[sift(skip)]
    #[allow(dead_code)]
    cache: Vec<u8>,
}

fn badge(n: u128) -> Uuid {
    Uuid::from_u128(n)
}

fn staff() -> Vec<Employee> {
    vec![
        Employee {
            name: "Ada".into(),
            age: 36,
            active: true,
            grade: 'A',
            salary: BigDecimal::from_str("8500.50").unwrap(),
            score: 4.5,
            hired: Utc.with_ymd_and_hms(2015, 3, 1, 9, 0, 0).unwrap(),
            shift: TimeDelta::hours(8),
            badge: badge(1),
            nickname: Some("Countess".into()),
            manager_id: None,
            skills: vec!["math".into(), "engines".into()],
            ratings: [5, 4, 5],
            notes: VecDeque::from(vec![Some("first".into()), None]),
            floor_set: BTreeSet::from([1, 2]),
            cache: vec![],
        },
        Employee {
            name: "Brian".into(),
            age: 28,
            active: false,
            grade: 'B',
            salary: BigDecimal::from_str("4200").unwrap(),
            score: 3.25,
            hired: Utc.with_ymd_and_hms(2021, 7, 15, 12, 30, 0).unwrap(),
            shift: TimeDelta::hours(6) + TimeDelta::minutes(30),
            badge: badge(2),
            nickname: None,
            manager_id: Some(1),
            skills: vec!["support".into()],
            ratings: [3, 3, 4],
            notes: VecDeque::new(),
            floor_set: BTreeSet::from([2]),
            cache: vec![],
        },
        Employee {
            name: "Carla O'Neil".into(),
            age: 45,
            active: true,
            grade: 'A',
            salary: BigDecimal::from_str("12000.00").unwrap(),
            score: f64::NAN,
            hired: Utc.with_ymd_and_hms(2009, 1, 5, 8, 0, 0).unwrap(),
            shift: TimeDelta::hours(9) + TimeDelta::milliseconds(500),
            badge: badge(3),
            nickname: Some("CJ".into()),
            manager_id: Some(1),
            skills: vec!["math".into(), "law".into()],
            ratings: [4, 5, 5],
            notes: VecDeque::from(vec![Some("second".into())]),
            floor_set: BTreeSet::from([3, 4]),
            cache: vec![],
        },
    ]
}

fn names(query: &str) -> Vec<String> {
    let staff = staff();
    compile::<Employee>(query)
        .unwrap_or_else(|e| panic!("{query}: {e}"))
        .filter(&staff)
        .into_iter()
        .map(|e| e.name.clone())
        .collect()
}

fn error(query: &str) -> QueryError {
    match compile::<Employee>(query) {
        Ok(_) => panic!("expected {query} to fail"),
        Err(e) => e,
    }
}

// ============================================================================
// Derive
// ============================================================================

#[test]
fn derive_reports_property_names() {
    assert_eq!(
        Employee::property_names(),
        &[
            "Name", "Age", "Active", "Grade", "Salary", "Score", "Hired", "Shift", "Badge",
            "Nickname", "ManagerId", "Skills", "Ratings", "Notes", "Floors"
        ]
    );
    assert_eq!(Employee::NAME, "Name");
    assert_eq!(Employee::MANAGER_ID, "ManagerId");
    assert_eq!(Employee::FLOORS, "Floors");
    assert!(Employee::property("Cache").is_none());
}

#[test]
fn derive_maps_descriptors() {
    let descriptor = |name: &str| Employee::property(name).unwrap().descriptor();

    assert_eq!(descriptor("Age"), TypeDescriptor::scalar(ScalarKind::I32));
    assert_eq!(descriptor("Hired"), TypeDescriptor::scalar(ScalarKind::DateTime));
    assert_eq!(descriptor("Nickname"), TypeDescriptor::nullable(ScalarKind::String));
    assert_eq!(descriptor("ManagerId"), TypeDescriptor::nullable(ScalarKind::U64));
    assert_eq!(descriptor("Skills"), TypeDescriptor::collection(ScalarKind::String, false));
    assert_eq!(descriptor("Ratings"), TypeDescriptor::array(ScalarKind::U8, false));
    assert_eq!(descriptor("Notes"), TypeDescriptor::collection(ScalarKind::String, true));
    assert_eq!(descriptor("Floors").shape, PropertyShape::Collection);
    assert_eq!(descriptor("Floors"), <BTreeSet<i16> as FieldType>::DESCRIPTOR);
}

// ============================================================================
// Equality on every scalar kind
// ============================================================================

#[test]
fn eq_on_every_scalar_kind() {
    assert_eq!(names("eq('Name', 'Ada')"), vec!["Ada"]);
    assert_eq!(names("eq('Age', '28')"), vec!["Brian"]);
    assert_eq!(names("eq('Active', 'false')"), vec!["Brian"]);
    assert_eq!(names("eq('Active', 'TRUE')"), vec!["Ada", "Carla O'Neil"]);
    assert_eq!(names("eq('Grade', 'B')"), vec!["Brian"]);
    assert_eq!(names("eq('Salary', '4200')"), vec!["Brian"]);
    assert_eq!(names("eq('Score', '3.25')"), vec!["Brian"]);
    assert_eq!(names("eq('Hired', '2015-03-01T09:00:00Z')"), vec!["Ada"]);
    assert_eq!(names("eq('Shift', '06:30:00')"), vec!["Brian"]);
    assert_eq!(
        names(&format!("eq('Badge', '{}')", badge(3))),
        vec!["Carla O'Neil"]
    );
}

#[test]
fn ne_is_the_complement_of_eq() {
    assert_eq!(names("ne('Age', '28')"), vec!["Ada", "Carla O'Neil"]);
    assert_eq!(names("ne('Grade', 'A')"), vec!["Brian"]);
}

#[test]
fn date_times_compare_as_instants() {
    assert_eq!(names("eq('Hired', '2015-03-01T11:00:00+02:00')"), vec!["Ada"]);
    assert_eq!(
        names("lt('Hired', '2015-01-01T00:00:00-05:00')"),
        vec!["Carla O'Neil"]
    );
}

#[test]
fn nan_never_equals() {
    assert!(names("eq('Score', 'NaN')").is_empty());
    assert_eq!(names("ne('Score', 'NaN')").len(), 3);
    // NaN is unordered
    assert_eq!(names("gt('Score', '0')"), vec!["Ada", "Brian"]);
}

#[test]
fn escaped_quotes_in_literals() {
    assert_eq!(names(r"eq('Name', 'Carla O\'Neil')"), vec!["Carla O'Neil"]);
    assert_eq!(names(r"ew('Name', '\'Neil')"), vec!["Carla O'Neil"]);
}

// ============================================================================
// Ordering and string edges
// ============================================================================

#[test]
fn ordering_operators() {
    assert_eq!(names("gt('Age', '36')"), vec!["Carla O'Neil"]);
    assert_eq!(names("gte('Age', '36')"), vec!["Ada", "Carla O'Neil"]);
    assert_eq!(names("lt('Age', '36')"), vec!["Brian"]);
    assert_eq!(names("lte('Age', '36')"), vec!["Ada", "Brian"]);
    assert_eq!(names("gt('Salary', '8500.5')"), vec!["Carla O'Neil"]);
    assert_eq!(names("gte('Shift', '08:00:00')"), vec!["Ada", "Carla O'Neil"]);
    assert_eq!(names("gt('Shift', '09:00:00.4')"), vec!["Carla O'Neil"]);
}

#[test]
fn unset_nullable_never_orders() {
    assert_eq!(names("lt('ManagerId', '5')"), vec!["Brian", "Carla O'Neil"]);
    assert_eq!(names("gte('ManagerId', '0')"), vec!["Brian", "Carla O'Neil"]);
}

#[test]
fn string_edges_are_ordinal() {
    assert_eq!(names("sw('Name', 'Br')"), vec!["Brian"]);
    assert!(names("sw('Name', 'br')").is_empty());
    assert_eq!(names("ew('Name', 'a')"), vec!["Ada"]);
    assert_eq!(names("sw('Nickname', 'C')"), vec!["Ada", "Carla O'Neil"]);
    assert_eq!(names("sw('Name', '')").len(), 3);
}

// ============================================================================
// Null sentinel
// ============================================================================

#[test]
fn sentinel_matches_only_unset() {
    assert_eq!(names("eq('Nickname', $!NULL!$)"), vec!["Brian"]);
    assert_eq!(names("eq('Nickname', '$!NULL!$')"), vec!["Brian"]);
    assert_eq!(names("ne('ManagerId', $!NULL!$)"), vec!["Brian", "Carla O'Neil"]);
    assert_eq!(names("eq('ManagerId', '1')"), vec!["Brian", "Carla O'Neil"]);
}

#[test]
fn sentinel_against_non_nullable_fails() {
    match error("eq('Age', $!NULL!$)") {
        QueryError::Coercion {
            property,
            literal,
            expected,
            ..
        } => {
            assert_eq!(property, "Age");
            assert_eq!(literal, "$!NULL!$");
            assert_eq!(expected, "i32");
        }
        other => panic!("unexpected: {other:?}"),
    }
}

#[test]
fn sentinel_against_non_nullable_fails_for_every_operator() {
    for query in [
        "lt('Age', $!NULL!$)",
        "gte('Age', $!NULL!$)",
        "sw('Name', $!NULL!$)",
        "ew('Name', $!NULL!$)",
        "cov('Age', ['1', $!NULL!$])",
        "ct('Skills', $!NULL!$)",
    ] {
        assert_eq!(error(query).kind(), "coercion", "{query}");
    }
    // nullable properties still reject null orderings and edges
    assert_eq!(error("lt('Nickname', $!NULL!$)").kind(), "unsupported-operator");
    assert_eq!(error("sw('Nickname', $!NULL!$)").kind(), "unsupported-operator");
}

// ============================================================================
// Collections: ct, cov, sequence equality
// ============================================================================

#[test]
fn ct_tests_membership() {
    assert_eq!(names("ct('Skills', 'math')"), vec!["Ada", "Carla O'Neil"]);
    assert_eq!(names("ct('Ratings', '3')"), vec!["Brian"]);
    assert_eq!(names("ct('Floors', '2')"), vec!["Ada", "Brian"]);
    assert_eq!(names("ct('Notes', $!NULL!$)"), vec!["Ada"]);
    assert!(names("ct('Skills', 'cooking')").is_empty());
}

#[test]
fn cov_tests_membership_of_the_value() {
    assert_eq!(names("cov('Age', ['28', '45'])"), vec!["Brian", "Carla O'Neil"]);
    assert_eq!(names("cov('Grade', ['B'])"), vec!["Brian"]);
    assert_eq!(names("cov('Nickname', ['CJ', $!NULL!$])"), vec!["Brian", "Carla O'Neil"]);
}

#[test]
fn list_equality_is_element_wise() {
    assert_eq!(names("eq('Ratings', ['5', '4', '5'])"), vec!["Ada"]);
    assert!(names("eq('Ratings', ['5', '5', '4'])").is_empty());
    assert!(names("eq('Ratings', ['5', '4'])").is_empty());
    assert_eq!(names("ne('Skills', ['support'])"), vec!["Ada", "Carla O'Neil"]);
    assert_eq!(names("eq('Notes', ['first', $!NULL!$])"), vec!["Ada"]);
}

#[test]
fn ct_and_cov_agree_on_singletons() {
    let staff = staff();
    for age in [28, 36, 45, 50] {
        let cov = compile::<Employee>(&format!("cov('Age', ['{age}'])")).unwrap();
        let eq = compile::<Employee>(&format!("eq('Age', '{age}')")).unwrap();
        assert_eq!(cov.filter(&staff).len(), eq.filter(&staff).len());
    }
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn and_or_semantics() {
    assert_eq!(names("eq('Active', 'true') and gt('Age', '40')"), vec!["Carla O'Neil"]);
    assert_eq!(names("eq('Age', '28') or eq('Age', '36')"), vec!["Ada", "Brian"]);
    assert_eq!(names("eq('Age', '28') AND eq('Age', '36')"), Vec::<String>::new());
}

#[test]
fn three_clauses_fold_left() {
    // gt('Age', '40') OR (eq('Active', 'false') AND eq('Grade', 'A'))
    assert_eq!(
        names("eq('Grade', 'A') and eq('Active', 'false') or gt('Age', '40')"),
        vec!["Carla O'Neil"]
    );
    // eq('Grade', 'B') AND (lt('Age', '30') OR eq('Grade', 'A'))
    assert_eq!(
        names("eq('Grade', 'A') or lt('Age', '30') and eq('Grade', 'B')"),
        vec!["Brian"]
    );
}

#[test]
fn property_names_are_case_insensitive() {
    assert_eq!(names("eq('name', 'Ada')"), vec!["Ada"]);
    assert_eq!(names("eq('MANAGERID', '1')").len(), 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn error_kinds() {
    assert_eq!(error("").kind(), "empty-query");
    assert_eq!(error("eq('Salary2', '1')").kind(), "unknown-property");
    assert_eq!(error("cov('Age', ['1', '2')").kind(), "syntax");
    assert_eq!(error("eq('Age', 'old')").kind(), "coercion");
    assert_eq!(error("sw('Skills', 'm')").kind(), "unsupported-operator");
    assert_eq!(error("lt('Name', 'M')").kind(), "unsupported-operator");
}

#[test]
fn unsupported_operator_details() {
    match error("lt('Active', 'true')") {
        QueryError::UnsupportedOperator { op, property, .. } => {
            assert_eq!(op, "lt");
            assert_eq!(property, "Active");
        }
        other => panic!("unexpected: {other:?}"),
    }
    assert!(matches!(
        error("ct('Age', '1')"),
        QueryError::UnsupportedOperator { .. }
    ));
    assert!(matches!(
        error("cov('Skills', ['math'])"),
        QueryError::UnsupportedOperator { .. }
    ));
    assert!(matches!(
        error("gt('Ratings', ['1'])"),
        QueryError::UnsupportedOperator { .. }
    ));
}

#[test]
fn coercion_errors_name_the_literal() {
    for (query, literal) in [
        ("eq('Age', '3000000000')", "3000000000"),
        ("eq('Ratings', ['1', '256', '3'])", "256"),
        ("eq('Hired', '2015-03-01')", "2015-03-01"),
        ("eq('Grade', 'AB')", "AB"),
        ("eq('Badge', 'not-a-uuid')", "not-a-uuid"),
        ("eq('Shift', '8h')", "8h"),
    ] {
        match error(query) {
            QueryError::Coercion { literal: got, .. } => assert_eq!(got, literal, "{query}"),
            other => panic!("{query}: unexpected {other:?}"),
        }
    }
}

#[test]
fn syntax_errors_report_position() {
    match error("eq('Age', '1') xor eq('Age', '2')") {
        QueryError::Syntax {
            position, fragment, ..
        } => {
            assert_eq!(position, 15);
            assert!(fragment.starts_with("xor"));
        }
        other => panic!("unexpected: {other:?}"),
    }
}

// ============================================================================
// Builder output
// ============================================================================

#[test]
fn builder_output_compiles_to_the_intended_predicate() {
    let staff = staff();
    let hired: DateTime<FixedOffset> = Utc
        .with_ymd_and_hms(2015, 3, 1, 9, 0, 0)
        .unwrap()
        .fixed_offset();

    let query = QueryBuilder::new()
        .and_eq(Employee::HIRED, hired)
        .or_eq(Employee::NAME, "Carla O'Neil")
        .and(ComparisonOp::Gte, Employee::SALARY, BigDecimal::from(10_000))
        .build();
    let predicate = compile::<Employee>(&query).unwrap();
    let found: Vec<_> = predicate.filter(&staff).iter().map(|e| e.age).collect();
    assert_eq!(found, vec![45]);

    let shift = QueryBuilder::new()
        .and_eq(Employee::SHIFT, TimeDelta::hours(9) + TimeDelta::milliseconds(500))
        .compile::<Employee>()
        .unwrap();
    assert_eq!(shift.position(&staff), Some(2));

    let unset = QueryBuilder::new()
        .and_eq(Employee::NICKNAME, None::<String>)
        .compile::<Employee>()
        .unwrap();
    assert_eq!(unset.count(&staff), 1);
}

#[test]
fn predicates_are_shared_across_threads() {
    let predicate = std::sync::Arc::new(compile::<Employee>("ct('Skills', 'math')").unwrap());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let predicate = std::sync::Arc::clone(&predicate);
            std::thread::spawn(move || predicate.count(&staff()))
        })
        .collect();
    for handle in handles {
        assert_eq!(handle.join().unwrap(), 2);
    }
}
