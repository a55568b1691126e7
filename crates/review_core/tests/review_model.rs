use review_core::{
    Employee, EmployeeId, EmployeeLookup, RepoError, RepoResult, Review, ValidationError,
    MIN_REVIEW_YEAR,
};
use std::cell::Cell;
use std::collections::HashMap;

/// In-memory lookup that also counts how often it was consulted.
struct StaticLookup {
    employees: HashMap<EmployeeId, Employee>,
    calls: Cell<usize>,
}

impl StaticLookup {
    fn with(employees: &[Employee]) -> Self {
        Self {
            employees: employees
                .iter()
                .map(|employee| (employee.id.unwrap(), employee.clone()))
                .collect(),
            calls: Cell::new(0),
        }
    }
}

impl EmployeeLookup for StaticLookup {
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.calls.set(self.calls.get() + 1);
        Ok(self.employees.get(&id).cloned())
    }
}

fn lee() -> Employee {
    Employee::with_id(1, "Lee", "Manager").unwrap()
}

fn kim() -> Employee {
    Employee::with_id(2, "Kim", "Engineer").unwrap()
}

#[test]
fn valid_years_and_summaries_are_accepted() {
    for year in [MIN_REVIEW_YEAR, 2001, 2023, 2999, i64::MAX] {
        for summary in ["x", "Good work", "  padded  ", "multi\nline"] {
            let review = Review::new(year, summary, lee()).unwrap();
            assert_eq!(review.year(), year);
            assert_eq!(review.summary(), summary);
        }
    }
}

#[test]
fn years_below_floor_are_rejected() {
    let mut review = Review::new(2010, "ok", lee()).unwrap();
    for year in [i64::MIN, -1, 0, 1999] {
        assert_eq!(
            review.set_year(year).unwrap_err(),
            ValidationError::YearTooEarly(year)
        );
        assert_eq!(review.year(), 2010);
    }
}

#[test]
fn blank_summaries_are_rejected() {
    for summary in ["", " ", "\t", "\n \r\n"] {
        assert_eq!(
            Review::new(2020, summary, lee()).unwrap_err(),
            ValidationError::BlankSummary
        );
    }
}

#[test]
fn constructing_with_unsaved_employee_fails() {
    let unsaved = Employee::new("New", "Hire").unwrap();
    assert_eq!(
        Review::new(2020, "ok", unsaved).unwrap_err(),
        ValidationError::UnpersistedEmployee
    );
}

#[test]
fn with_employee_id_resolves_through_lookup() {
    let lookup = StaticLookup::with(&[lee(), kim()]);

    let review = Review::with_employee_id(2021, "resolved", 2, &lookup).unwrap();
    assert_eq!(review.employee(), &kim());
    assert_eq!(review.employee_id(), Some(2));
    assert_eq!(lookup.calls.get(), 1);
}

#[test]
fn with_employee_id_rejects_unknown_employee() {
    let lookup = StaticLookup::with(&[lee()]);

    let err = Review::with_employee_id(2021, "missing", 9, &lookup).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmployeeNotFound(9))
    ));
}

#[test]
fn field_validation_runs_after_resolution() {
    let lookup = StaticLookup::with(&[lee()]);

    let err = Review::with_employee_id(1990, "too old", 1, &lookup).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::YearTooEarly(1990))
    ));
}

#[test]
fn set_employee_id_reassigns_or_keeps_previous_employee() {
    let lookup = StaticLookup::with(&[lee(), kim()]);
    let mut review = Review::new(2022, "switch", lee()).unwrap();

    review.set_employee_id(2, &lookup).unwrap();
    assert_eq!(review.employee_id(), Some(2));

    let err = review.set_employee_id(3, &lookup).unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(ValidationError::EmployeeNotFound(3))
    ));
    assert_eq!(review.employee_id(), Some(2));
}

#[test]
fn lookup_can_be_passed_as_trait_object() {
    let lookup = StaticLookup::with(&[lee()]);
    let dynamic: &dyn EmployeeLookup = &lookup;

    let review = Review::with_employee_id(2022, "dyn", 1, dynamic).unwrap();
    assert_eq!(review.employee_id(), Some(1));
}

#[test]
fn review_serializes_with_nested_employee() {
    let review = Review::with_id(3, 2022, "Solid year", lee()).unwrap();

    let json = serde_json::to_value(&review).unwrap();
    assert_eq!(json["id"], 3);
    assert_eq!(json["year"], 2022);
    assert_eq!(json["summary"], "Solid year");
    assert_eq!(json["employee"]["id"], 1);
    assert_eq!(json["employee"]["job_title"], "Manager");
}

#[test]
fn validation_errors_render_readable_messages() {
    assert_eq!(
        ValidationError::BlankSummary.to_string(),
        "summary must be a non-empty string"
    );
    assert_eq!(
        RepoError::from(ValidationError::UnpersistedEmployee).to_string(),
        "employee must be persisted before assigning to review"
    );
}
