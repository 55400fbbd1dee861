//! User repository

use dbkit_common::{params, Database, Result, Statement};
use tracing::{debug, info};

pub async fn create_user(db: &Database, username: &str, password: &str) -> Result<()> {
    db.execute(
        &Statement::new("INSERT INTO users (username, password) VALUES (?, ?)"),
        params![username, password],
    )
    .await?;

    info!(username, "Created user");
    Ok(())
}

/// Look up a user by credentials
///
/// Returns the stored username on a match. Both values are bound, so quote
/// or comment characters in them are compared literally.
pub async fn login(db: &Database, username: &str, password: &str) -> Result<Option<String>> {
    let row = db
        .fetch_optional(
            &Statement::new("SELECT username FROM users WHERE username = ? AND password = ?"),
            params![username, password],
        )
        .await?;

    let matched = row.map(|row| row.get::<String, _>(0)).transpose()?;
    debug!(username, success = matched.is_some(), "Login attempt");
    Ok(matched)
}

/// Change a user's password; returns whether a row was updated
pub async fn change_password(db: &Database, username: &str, password: &str) -> Result<bool> {
    let outcome = db
        .execute(
            &Statement::new("UPDATE users SET password = ? WHERE username = ?"),
            params![password, username],
        )
        .await?;
    Ok(outcome.rows_affected() > 0)
}
