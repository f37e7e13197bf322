//! Manufacturer persistence operations.

use hangar_core::{required_trimmed, CreateManufacturer, Error, Manufacturer, ManufacturerUpdate, Result};

use super::db::{constraint_error, internal, now, Db};

const DUPLICATE_NAME: &str = "a manufacturer with this name already exists";

#[derive(sqlx::FromRow)]
struct ManufacturerRow {
    id: i64,
    name: String,
    created_at: String,
}

impl From<ManufacturerRow> for Manufacturer {
    fn from(row: ManufacturerRow) -> Self {
        Manufacturer {
            id: row.id,
            name: row.name,
            created_at: row.created_at,
        }
    }
}

pub async fn list(db: &Db, user_id: i64) -> Result<Vec<Manufacturer>> {
    let rows = sqlx::query_as::<_, ManufacturerRow>(
        "SELECT id, name, created_at FROM manufacturers \
         WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await
    .map_err(internal)?;

    Ok(rows.into_iter().map(Manufacturer::from).collect())
}

pub async fn get(db: &Db, user_id: i64, id: i64) -> Result<Manufacturer> {
    sqlx::query_as::<_, ManufacturerRow>(
        "SELECT id, name, created_at FROM manufacturers WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await
    .map_err(internal)?
    .map(Manufacturer::from)
    .ok_or_else(|| Error::NotFound("manufacturer not found".to_string()))
}

pub async fn create(db: &Db, user_id: i64, req: &CreateManufacturer) -> Result<i64> {
    let name = required_trimmed(req.name.as_deref(), "name")?;
    let ts = now();

    sqlx::query_scalar::<_, i64>(
        "INSERT INTO manufacturers (user_id, name, created_at, updated_at) \
         VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(user_id)
    .bind(&name)
    .bind(&ts)
    .bind(&ts)
    .fetch_one(db.pool())
    .await
    .map_err(|e| constraint_error(e, DUPLICATE_NAME))
}

pub async fn update(db: &Db, user_id: i64, id: i64, update: &ManufacturerUpdate) -> Result<()> {
    get(db, user_id, id).await?;
    if update.is_empty() {
        return Err(Error::Validation("no fields to update".to_string()));
    }

    let name = required_trimmed(update.name.as_deref(), "name")?;

    sqlx::query("UPDATE manufacturers SET name = $1, updated_at = $2 WHERE id = $3 AND user_id = $4")
        .bind(&name)
        .bind(now())
        .bind(id)
        .bind(user_id)
        .execute(db.pool())
        .await
        .map_err(|e| constraint_error(e, DUPLICATE_NAME))?;

    Ok(())
}

pub async fn delete(db: &Db, user_id: i64, id: i64) -> Result<()> {
    get(db, user_id, id).await?;

    let in_use: Option<i64> =
        sqlx::query_scalar("SELECT id FROM parts WHERE manufacturer_id = $1 LIMIT 1")
            .bind(id)
            .fetch_optional(db.pool())
            .await
            .map_err(internal)?;
    if in_use.is_some() {
        return Err(Error::InUse(
            "manufacturer is still referenced by one or more parts".to_string(),
        ));
    }

    sqlx::query("DELETE FROM manufacturers WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db.pool())
        .await
        .map_err(internal)?;

    Ok(())
}
