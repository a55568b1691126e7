//! Employee lookup capability and a minimal SQLite employee store.
//!
//! # Responsibility
//! - Define the read-only contract reviews use to resolve foreign keys.
//! - Provide just enough employee persistence for reviews to reference.
//!
//! # Invariants
//! - Lookups never mutate employees.
//! - `resolve_employee` only returns employees with a persisted id.

use crate::model::employee::{Employee, EmployeeId};
use crate::model::error::ValidationError;
use crate::repo::{RepoError, RepoResult};
use log::{debug, info};
use rusqlite::{params, Connection, Row};

const EMPLOYEE_SELECT_SQL: &str = "SELECT id, name, job_title FROM employees";

/// Read access to persisted employees.
pub trait EmployeeLookup {
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
}

impl<T: EmployeeLookup + ?Sized> EmployeeLookup for &T {
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        (**self).find_by_id(id)
    }
}

/// Resolves `id` to a persisted employee or fails with a validation error.
pub fn resolve_employee<L>(lookup: &L, id: EmployeeId) -> RepoResult<Employee>
where
    L: EmployeeLookup + ?Sized,
{
    match lookup.find_by_id(id)? {
        Some(employee) if employee.is_persisted() => Ok(employee),
        Some(_) => Err(ValidationError::UnpersistedEmployee.into()),
        None => Err(ValidationError::EmployeeNotFound(id).into()),
    }
}

/// SQLite-backed employee store.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Creates `employees` if absent.
    pub fn create_table(&self) -> RepoResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS employees (
                id INTEGER PRIMARY KEY,
                name TEXT,
                job_title TEXT
            );",
        )?;
        info!("event=schema_create module=repo status=ok table=employees");
        Ok(())
    }

    /// Drops `employees` if present.
    pub fn drop_table(&self) -> RepoResult<()> {
        self.conn.execute_batch("DROP TABLE IF EXISTS employees;")?;
        info!("event=schema_drop module=repo status=ok table=employees");
        Ok(())
    }

    /// Inserts a new employee and returns it with its assigned id.
    pub fn create(
        &self,
        name: impl Into<String>,
        job_title: impl Into<String>,
    ) -> RepoResult<Employee> {
        let mut employee = Employee::new(name, job_title)?;

        self.conn.execute(
            "INSERT INTO employees (name, job_title) VALUES (?1, ?2);",
            params![employee.name.as_str(), employee.job_title.as_str()],
        )?;
        let id = self.conn.last_insert_rowid();
        employee.id = Some(id);

        debug!("event=employee_insert module=repo status=ok id={id}");
        Ok(employee)
    }

    /// Returns every employee in row order.
    pub fn get_all(&self) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(&format!("{EMPLOYEE_SELECT_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut employees = Vec::new();

        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }

        Ok(employees)
    }
}

impl EmployeeLookup for SqliteEmployeeRepository<'_> {
    fn find_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }

        Ok(None)
    }
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let id: EmployeeId = row.get("id")?;
    let name: Option<String> = row.get("name")?;
    let job_title: Option<String> = row.get("job_title")?;

    Employee::with_id(
        id,
        name.unwrap_or_default(),
        job_title.unwrap_or_default(),
    )
    .map_err(|err| RepoError::InvalidData(format!("employees row {id}: {err}")))
}
