//! Customer repository

use crate::models::{Customer, NewCustomer};
use dbkit_common::{params, Database, Result, Statement};
use tracing::debug;

const CUSTOMER_COLUMNS: &str =
    "id, name, email, balance, rating, birth_date, married, created_at";

pub async fn insert_customer(db: &Database, customer: &NewCustomer) -> Result<()> {
    let statement = Statement::new(
        "INSERT INTO customers (id, name, email, balance, rating, birth_date, married) \
         VALUES (?, ?, ?, ?, ?, ?, ?)",
    );

    db.execute(
        &statement,
        params![
            &customer.id,
            &customer.name,
            customer.email.clone(),
            customer.balance,
            customer.rating,
            customer.birth_date,
            customer.married,
        ],
    )
    .await?;

    debug!(id = %customer.id, "Inserted customer");
    Ok(())
}

/// Insert using a fixed statement with no parameters
///
/// Only for statement text that contains no caller input.
pub async fn insert_default_customer(db: &Database) -> Result<()> {
    db.execute(
        &Statement::new("INSERT INTO customers (id, name) VALUES ('joko', 'Joko')"),
        params![],
    )
    .await?;
    Ok(())
}

pub async fn find_customer(db: &Database, id: &str) -> Result<Option<Customer>> {
    let statement = Statement::new(format!(
        "SELECT {} FROM customers WHERE id = ?",
        CUSTOMER_COLUMNS
    ));

    db.fetch_optional(&statement, params![id])
        .await?
        .map(|row| row.decode::<Customer>())
        .transpose()
}

/// Every customer, oldest first
pub async fn list_customers(db: &Database) -> Result<Vec<Customer>> {
    let statement = Statement::new(format!(
        "SELECT {} FROM customers ORDER BY created_at, id",
        CUSTOMER_COLUMNS
    ));

    let mut rows = db.query(&statement, params![])?;
    let mut customers = Vec::new();
    while let Some(row) = rows.next().await? {
        customers.push(row.decode::<Customer>()?);
    }
    Ok(customers)
}

/// (id, name) pairs, read column by column
pub async fn list_customer_names(db: &Database) -> Result<Vec<(String, String)>> {
    let statement = Statement::new("SELECT id, name FROM customers ORDER BY id");

    db.fetch_all(&statement, params![])
        .await?
        .into_iter()
        .map(|row| -> Result<(String, String)> {
            Ok((row.get(0)?, row.get(1)?))
        })
        .collect()
}
