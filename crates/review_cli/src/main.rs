//! CLI smoke entry point.
//!
//! # Responsibility
//! - Wire config, logging, storage and both repositories end to end.
//! - Seed one employee and one review into an empty database, then print
//!   every stored review.

use log::info;
use review_core::{
    init_logging_from_config, CoreConfig, ReviewRepository, SqliteEmployeeRepository,
    SqliteReviewRepository,
};
use std::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("review_cli error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    init_logging_from_config(&config)?;

    let conn = config.open_connection()?;
    let employees = SqliteEmployeeRepository::new(&conn);
    employees.create_table()?;
    let mut reviews = SqliteReviewRepository::new(&conn, employees);
    reviews.create_table()?;

    if reviews.get_all()?.is_empty() {
        let employee = reviews.employees().create("Sample Employee", "Manager")?;
        if let Some(employee_id) = employee.id {
            reviews.create(2023, "Seeded by review_cli", employee_id)?;
            info!("event=seed module=cli status=ok employee_id={employee_id}");
        }
    }

    println!("review_core version={}", review_core::core_version());
    for review in reviews.get_all()? {
        let review = review.borrow();
        println!("{review} ({})", review.employee().name);
    }

    Ok(())
}
