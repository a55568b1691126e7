//! Review repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete over the `reviews` table.
//! - Hydrate rows into cache-consistent `ReviewHandle`s.
//! - Own the `reviews` schema (create-if-absent, drop-if-present).
//!
//! # Invariants
//! - At most one live handle per persisted id; repeated loads of the same
//!   id return the same `Rc`, refreshed in place.
//! - A row is fully validated before any cached instance is touched.
//! - Each write is one autocommitted statement.
//! - Handles are only borrowed through `try_borrow*`; a handle the caller
//!   still borrows yields `RepoError::InstanceBusy`, never a panic.

use crate::model::employee::EmployeeId;
use crate::model::error::ValidationError;
use crate::model::review::{
    validate_id, validate_summary, validate_year, Review, ReviewId,
};
use crate::repo::employee_repo::{resolve_employee, EmployeeLookup};
use crate::repo::identity::{IdentityMap, Shared};
use crate::repo::{RepoError, RepoResult};
use log::{debug, info};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Params, Row};
use std::cell::{Ref, RefCell, RefMut};
use std::rc::Rc;

const REVIEW_SELECT_SQL: &str = "SELECT id, year, summary, employee_id FROM reviews";

/// Shared handle to the live instance of one review.
pub type ReviewHandle = Shared<Review>;

/// Raw `reviews` row prior to hydration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewRow {
    pub id: ReviewId,
    pub year: i64,
    pub summary: String,
    pub employee_id: Option<EmployeeId>,
}

/// Repository interface for review persistence.
pub trait ReviewRepository {
    fn create_table(&self) -> RepoResult<()>;
    fn drop_table(&self) -> RepoResult<()>;
    /// Inserts unsaved reviews and updates saved ones.
    fn save(&mut self, review: &ReviewHandle) -> RepoResult<ReviewHandle>;
    fn create(
        &mut self,
        year: i64,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<ReviewHandle>;
    fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<ReviewHandle>>;
    /// Returns the cached instance for `row.id` refreshed from `row`, or a new
    /// cached instance.
    fn instance_from_row(&mut self, row: ReviewRow) -> RepoResult<ReviewHandle>;
    fn update(&mut self, review: &ReviewHandle) -> RepoResult<()>;
    /// Removes the row and cache entry, then detaches `review`.
    fn delete(&mut self, review: &ReviewHandle) -> RepoResult<()>;
    fn get_all(&mut self) -> RepoResult<Vec<ReviewHandle>>;
    fn find_by_employee(&mut self, employee_id: EmployeeId) -> RepoResult<Vec<ReviewHandle>>;
}

/// SQLite-backed review repository with an owned identity map.
pub struct SqliteReviewRepository<'conn, L: EmployeeLookup> {
    conn: &'conn Connection,
    employees: L,
    identity: IdentityMap<Review>,
}

impl<'conn, L: EmployeeLookup> SqliteReviewRepository<'conn, L> {
    /// Builds a repository with an empty identity map.
    pub fn new(conn: &'conn Connection, employees: L) -> Self {
        Self {
            conn,
            employees,
            identity: IdentityMap::new(),
        }
    }

    /// Employee lookup used for foreign key resolution.
    pub fn employees(&self) -> &L {
        &self.employees
    }

    /// Cached handle for `id`, without touching storage.
    pub fn cached(&self, id: ReviewId) -> Option<ReviewHandle> {
        self.identity.get(id)
    }

    pub fn cache_len(&self) -> usize {
        self.identity.len()
    }

    fn load_rows<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<ReviewRow>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut loaded = Vec::new();

        while let Some(row) = rows.next()? {
            loaded.push(parse_review_row(row)?);
        }

        Ok(loaded)
    }

    fn hydrate_all(&mut self, rows: Vec<ReviewRow>) -> RepoResult<Vec<ReviewHandle>> {
        rows.into_iter()
            .map(|row| self.instance_from_row(row))
            .collect()
    }
}

impl<L: EmployeeLookup> ReviewRepository for SqliteReviewRepository<'_, L> {
    fn create_table(&self) -> RepoResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY,
                year INTEGER,
                summary TEXT,
                employee_id INTEGER,
                FOREIGN KEY (employee_id) REFERENCES employees(id)
            );",
        )?;
        info!("event=schema_create module=repo status=ok table=reviews");
        Ok(())
    }

    fn drop_table(&self) -> RepoResult<()> {
        self.conn.execute_batch("DROP TABLE IF EXISTS reviews;")?;
        info!("event=schema_drop module=repo status=ok table=reviews");
        Ok(())
    }

    fn save(&mut self, review: &ReviewHandle) -> RepoResult<ReviewHandle> {
        if read_handle(review)?.is_persisted() {
            self.update(review)?;
            return Ok(Rc::clone(review));
        }

        let id = {
            let mut current = write_handle(review)?;
            self.conn.execute(
                "INSERT INTO reviews (year, summary, employee_id) VALUES (?1, ?2, ?3);",
                params![current.year(), current.summary(), current.employee_id()],
            )?;
            let id = self.conn.last_insert_rowid();
            current.assign_id(id);
            id
        };
        self.identity.register(id, Rc::clone(review));

        debug!("event=review_insert module=repo status=ok id={id}");
        Ok(Rc::clone(review))
    }

    fn create(
        &mut self,
        year: i64,
        summary: &str,
        employee_id: EmployeeId,
    ) -> RepoResult<ReviewHandle> {
        let review = Review::with_employee_id(year, summary, employee_id, &self.employees)?;
        self.save(&Rc::new(RefCell::new(review)))
    }

    fn find_by_id(&mut self, id: ReviewId) -> RepoResult<Option<ReviewHandle>> {
        let mut rows = self.load_rows(&format!("{REVIEW_SELECT_SQL} WHERE id = ?1;"), [id])?;
        match rows.pop() {
            Some(row) => Ok(Some(self.instance_from_row(row)?)),
            None => Ok(None),
        }
    }

    fn instance_from_row(&mut self, row: ReviewRow) -> RepoResult<ReviewHandle> {
        let ReviewRow {
            id,
            year,
            summary,
            employee_id,
        } = row;

        validate_id(id)?;
        validate_year(year)?;
        validate_summary(&summary)?;
        let employee_id = employee_id.ok_or(ValidationError::MissingEmployee)?;
        let employee = resolve_employee(&self.employees, employee_id)?;

        if let Some(cached) = self.identity.get(id) {
            write_handle(&cached)?.refresh(year, summary, employee);
            return Ok(cached);
        }

        let review = Rc::new(RefCell::new(Review::with_id(id, year, summary, employee)?));
        self.identity.register(id, Rc::clone(&review));
        Ok(review)
    }

    fn update(&mut self, review: &ReviewHandle) -> RepoResult<()> {
        let (id, changed) = {
            let current = read_handle(review)?;
            let id = current.id().ok_or(RepoError::NotPersisted)?;
            let changed = self.conn.execute(
                "UPDATE reviews
                 SET year = ?1, summary = ?2, employee_id = ?3
                 WHERE id = ?4;",
                params![current.year(), current.summary(), current.employee_id(), id],
            )?;
            (id, changed)
        };
        self.identity.register(id, Rc::clone(review));

        debug!("event=review_update module=repo status=ok id={id} rows={changed}");
        Ok(())
    }

    fn delete(&mut self, review: &ReviewHandle) -> RepoResult<()> {
        let mut current = write_handle(review)?;
        if let Some(id) = current.id() {
            let changed = self
                .conn
                .execute("DELETE FROM reviews WHERE id = ?1;", [id])?;
            if self.identity.contains(id) {
                self.identity.remove(id);
            }
            debug!("event=review_delete module=repo status=ok id={id} rows={changed}");
        }

        current.clear_id();
        Ok(())
    }

    fn get_all(&mut self) -> RepoResult<Vec<ReviewHandle>> {
        let rows = self.load_rows(&format!("{REVIEW_SELECT_SQL};"), [])?;
        self.hydrate_all(rows)
    }

    fn find_by_employee(&mut self, employee_id: EmployeeId) -> RepoResult<Vec<ReviewHandle>> {
        let rows = self.load_rows(
            &format!("{REVIEW_SELECT_SQL} WHERE employee_id = ?1;"),
            [employee_id],
        )?;
        self.hydrate_all(rows)
    }
}

fn read_handle(review: &ReviewHandle) -> RepoResult<Ref<'_, Review>> {
    review
        .try_borrow()
        .map_err(|_| RepoError::InstanceBusy(None))
}

fn write_handle(review: &ReviewHandle) -> RepoResult<RefMut<'_, Review>> {
    review.try_borrow_mut().map_err(|_| {
        RepoError::InstanceBusy(review.try_borrow().ok().and_then(|current| current.id()))
    })
}

fn parse_review_row(row: &Row<'_>) -> RepoResult<ReviewRow> {
    let id: ReviewId = row.get("id")?;

    let year = match row.get_ref("year")? {
        ValueRef::Integer(value) => value,
        _ => return Err(ValidationError::YearNotInteger.into()),
    };

    let summary = match row.get_ref("summary")? {
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map_err(|_| {
                RepoError::InvalidData(format!("reviews row {id}: summary is not valid UTF-8"))
            })?
            .to_string(),
        _ => return Err(ValidationError::SummaryNotText.into()),
    };

    let employee_id = match row.get_ref("employee_id")? {
        ValueRef::Null => None,
        ValueRef::Integer(value) => Some(value),
        _ => {
            return Err(RepoError::InvalidData(format!(
                "reviews row {id}: employee_id is not an integer"
            )));
        }
    };

    Ok(ReviewRow {
        id,
        year,
        summary,
        employee_id,
    })
}

#[cfg(test)]
mod tests {
    use super::{ReviewRepository, ReviewRow, SqliteReviewRepository};
    use crate::db::open_db_in_memory;
    use crate::model::error::ValidationError;
    use crate::repo::employee_repo::SqliteEmployeeRepository;
    use crate::repo::RepoError;
    use rusqlite::Connection;

    fn setup(conn: &Connection) -> SqliteReviewRepository<'_, SqliteEmployeeRepository<'_>> {
        let employees = SqliteEmployeeRepository::new(conn);
        employees.create_table().unwrap();
        employees.create("Lee", "Manager").unwrap();
        let repo = SqliteReviewRepository::new(conn, employees);
        repo.create_table().unwrap();
        repo
    }

    #[test]
    fn failed_row_does_not_half_refresh_cached_instance() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = setup(&conn);
        let review = repo.create(2021, "steady", 1).unwrap();

        let err = repo
            .instance_from_row(ReviewRow {
                id: 1,
                year: 2024,
                summary: "changed".to_string(),
                employee_id: Some(99),
            })
            .unwrap_err();

        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::EmployeeNotFound(99))
        ));
        assert_eq!(review.borrow().year(), 2021);
        assert_eq!(review.borrow().summary(), "steady");
    }

    #[test]
    fn row_without_employee_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = setup(&conn);

        let err = repo
            .instance_from_row(ReviewRow {
                id: 4,
                year: 2022,
                summary: "orphan".to_string(),
                employee_id: None,
            })
            .unwrap_err();

        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::MissingEmployee)
        ));
        assert_eq!(repo.cache_len(), 0);
    }

    #[test]
    fn non_integer_year_column_is_a_validation_error() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = setup(&conn);
        conn.execute(
            "INSERT INTO reviews (id, year, summary, employee_id) VALUES (1, 'soon', 'x', 1);",
            [],
        )
        .unwrap();

        let err = repo.find_by_id(1).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::YearNotInteger)
        ));
    }

    #[test]
    fn non_text_summary_column_is_a_validation_error() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = setup(&conn);
        conn.execute(
            "INSERT INTO reviews (id, year, summary, employee_id) VALUES (1, 2022, NULL, 1);",
            [],
        )
        .unwrap();

        let err = repo.find_by_id(1).unwrap_err();
        assert!(matches!(
            err,
            RepoError::Validation(ValidationError::SummaryNotText)
        ));
    }

    #[test]
    fn held_borrow_is_reported_instead_of_panicking() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = setup(&conn);
        let review = repo.create(2021, "steady", 1).unwrap();

        let guard = review.borrow();
        assert!(matches!(
            repo.find_by_id(1),
            Err(RepoError::InstanceBusy(Some(1)))
        ));
        assert!(matches!(
            repo.delete(&review),
            Err(RepoError::InstanceBusy(Some(1)))
        ));
        drop(guard);

        assert_eq!(review.borrow().id(), Some(1));
        assert!(repo.find_by_id(1).unwrap().is_some());
    }

    #[test]
    fn held_mutable_borrow_blocks_save_without_writing() {
        let conn = open_db_in_memory().unwrap();
        let mut repo = setup(&conn);
        let review = repo.create(2021, "steady", 1).unwrap();

        let mut guard = review.borrow_mut();
        guard.set_year(2030).unwrap();
        assert!(matches!(
            repo.save(&review),
            Err(RepoError::InstanceBusy(None))
        ));
        drop(guard);

        let stored: i64 = conn
            .query_row("SELECT year FROM reviews WHERE id = 1;", [], |row| row.get(0))
            .unwrap();
        assert_eq!(stored, 2021);
    }
}
