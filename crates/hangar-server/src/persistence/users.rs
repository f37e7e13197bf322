//! User persistence operations.

use hangar_core::{Error, Result, User};

use super::db::{constraint_error, internal, now, Db};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: Option<String>,
    created_at: String,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            username: row.username,
            email: row.email,
            created_at: row.created_at,
        }
    }
}

/// Insert a new user. The password arrives pre-hashed; a username (or
/// email) collision surfaces as `Duplicate` without saying which.
pub async fn create_user(
    db: &Db,
    username: &str,
    email: Option<&str>,
    password_hash: &str,
) -> Result<i64> {
    let ts = now();
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, email, password_hash, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(&ts)
    .bind(&ts)
    .fetch_one(db.pool())
    .await
    .map_err(|e| constraint_error(e, "username is already taken"))
}

/// Look up the id and password hash for a username, if it exists.
pub async fn find_credentials(db: &Db, username: &str) -> Result<Option<(i64, String)>> {
    #[derive(sqlx::FromRow)]
    struct CredentialRow {
        id: i64,
        password_hash: String,
    }

    let row = sqlx::query_as::<_, CredentialRow>(
        "SELECT id, password_hash FROM users WHERE username = $1",
    )
    .bind(username)
    .fetch_optional(db.pool())
    .await
    .map_err(internal)?;

    Ok(row.map(|r| (r.id, r.password_hash)))
}

pub async fn get_user(db: &Db, id: i64) -> Result<Option<User>> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, email, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db.pool())
    .await
    .map_err(internal)?;

    Ok(row.map(User::from))
}

/// Convenience used by handlers that must 404 when the session's user row
/// has been deleted out from under it.
pub async fn require_user(db: &Db, id: i64) -> Result<User> {
    get_user(db, id)
        .await?
        .ok_or_else(|| Error::NotFound("user not found".to_string()))
}
