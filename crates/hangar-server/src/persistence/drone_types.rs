//! Drone type persistence operations.

use hangar_core::{required_trimmed, CreateDroneType, DefaultPart, DroneType, DroneTypeUpdate, Error, Result};

use super::db::{bind_args, constraint_error, internal, now, Arg, Db};

const DUPLICATE_NAME: &str = "a drone type with this name already exists";

#[derive(sqlx::FromRow)]
struct DroneTypeRow {
    id: i64,
    name: String,
    default_parts: Option<String>,
    created_at: String,
}

impl From<DroneTypeRow> for DroneType {
    fn from(row: DroneTypeRow) -> Self {
        let default_parts: Vec<DefaultPart> = row
            .default_parts
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();
        DroneType {
            id: row.id,
            name: row.name,
            default_parts,
            created_at: row.created_at,
        }
    }
}

pub async fn list(db: &Db, user_id: i64) -> Result<Vec<DroneType>> {
    let rows = sqlx::query_as::<_, DroneTypeRow>(
        "SELECT id, name, default_parts, created_at FROM drone_types \
         WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await
    .map_err(internal)?;

    Ok(rows.into_iter().map(DroneType::from).collect())
}

pub async fn get(db: &Db, user_id: i64, id: i64) -> Result<DroneType> {
    sqlx::query_as::<_, DroneTypeRow>(
        "SELECT id, name, default_parts, created_at FROM drone_types \
         WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await
    .map_err(internal)?
    .map(DroneType::from)
    .ok_or_else(|| Error::NotFound("drone type not found".to_string()))
}

pub async fn create(db: &Db, user_id: i64, req: &CreateDroneType) -> Result<i64> {
    let name = required_trimmed(req.name.as_deref(), "name")?;
    let default_parts = serde_json::to_string(&req.default_parts)
        .map_err(|e| Error::Internal(e.to_string()))?;
    let ts = now();

    sqlx::query_scalar::<_, i64>(
        "INSERT INTO drone_types (user_id, name, default_parts, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(user_id)
    .bind(&name)
    .bind(&default_parts)
    .bind(&ts)
    .bind(&ts)
    .fetch_one(db.pool())
    .await
    .map_err(|e| constraint_error(e, DUPLICATE_NAME))
}

pub async fn update(db: &Db, user_id: i64, id: i64, update: &DroneTypeUpdate) -> Result<()> {
    get(db, user_id, id).await?;
    if update.is_empty() {
        return Err(Error::Validation("no fields to update".to_string()));
    }

    let mut sets: Vec<String> = Vec::new();
    let mut args: Vec<Arg> = Vec::new();

    if let Some(name) = &update.name {
        let name = required_trimmed(Some(name.as_str()), "name")?;
        args.push(Arg::Text(Some(name)));
        sets.push(format!("name = ${}", args.len()));
    }
    if let Some(default_parts) = &update.default_parts {
        let serialized =
            serde_json::to_string(default_parts).map_err(|e| Error::Internal(e.to_string()))?;
        args.push(Arg::Text(Some(serialized)));
        sets.push(format!("default_parts = ${}", args.len()));
    }

    args.push(Arg::Text(Some(now())));
    sets.push(format!("updated_at = ${}", args.len()));

    let sql = format!(
        "UPDATE drone_types SET {} WHERE id = ${} AND user_id = ${}",
        sets.join(", "),
        args.len() + 1,
        args.len() + 2,
    );
    args.push(Arg::Int(Some(id)));
    args.push(Arg::Int(Some(user_id)));

    bind_args(&sql, args)
        .execute(db.pool())
        .await
        .map_err(|e| constraint_error(e, DUPLICATE_NAME))?;

    Ok(())
}

pub async fn delete(db: &Db, user_id: i64, id: i64) -> Result<()> {
    get(db, user_id, id).await?;

    // Check dependents first so the error names the cause instead of
    // surfacing a raw RESTRICT failure.
    let in_use: Option<i64> = sqlx::query_scalar("SELECT id FROM drones WHERE type_id = $1 LIMIT 1")
        .bind(id)
        .fetch_optional(db.pool())
        .await
        .map_err(internal)?;
    if in_use.is_some() {
        return Err(Error::InUse(
            "drone type is still used by one or more drones".to_string(),
        ));
    }

    sqlx::query("DELETE FROM drone_types WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db.pool())
        .await
        .map_err(internal)?;

    Ok(())
}
