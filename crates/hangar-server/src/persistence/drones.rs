//! Drone persistence operations.
//!
//! Creating a drone also instantiates its type's default-parts template as
//! real part rows, inside one transaction so a half-expanded drone never
//! becomes visible.

use std::collections::HashMap;

use hangar_core::{required_trimmed, CreateDrone, Drone, DroneUpdate, Error, Result};

use super::db::{bind_args, constraint_error, internal, now, Arg, Db};

const DEFAULT_STATUS: &str = "ready";

#[derive(sqlx::FromRow)]
struct DroneRow {
    id: i64,
    name: String,
    type_id: i64,
    type_name: String,
    start_date: String,
    photo: Option<String>,
    status: String,
    created_at: String,
}

impl DroneRow {
    fn into_drone(self, parts: Vec<i64>) -> Drone {
        Drone {
            id: self.id,
            name: self.name,
            type_id: self.type_id,
            type_name: self.type_name,
            start_date: self.start_date,
            photo: self.photo,
            status: self.status,
            parts,
            created_at: self.created_at,
        }
    }
}

const SELECT_DRONE: &str = "SELECT d.id, d.name, d.type_id, dt.name AS type_name, \
     d.start_date, d.photo, d.status, d.created_at \
     FROM drones d JOIN drone_types dt ON d.type_id = dt.id";

/// List the user's drones, newest first, optionally restricted to one type.
pub async fn list(db: &Db, user_id: i64, type_id: Option<i64>) -> Result<Vec<Drone>> {
    let rows = match type_id {
        Some(type_id) => {
            let sql = format!(
                "{SELECT_DRONE} WHERE d.user_id = $1 AND d.type_id = $2 \
                 ORDER BY d.created_at DESC, d.id DESC"
            );
            sqlx::query_as::<_, DroneRow>(&sql)
                .bind(user_id)
                .bind(type_id)
                .fetch_all(db.pool())
                .await
        }
        None => {
            let sql =
                format!("{SELECT_DRONE} WHERE d.user_id = $1 ORDER BY d.created_at DESC, d.id DESC");
            sqlx::query_as::<_, DroneRow>(&sql)
                .bind(user_id)
                .fetch_all(db.pool())
                .await
        }
    }
    .map_err(internal)?;

    // One grouped query for the mounted-part ids instead of one per drone.
    let mut parts_by_drone: HashMap<i64, Vec<i64>> = HashMap::new();
    let part_rows: Vec<(i64, i64)> =
        sqlx::query_as("SELECT id, drone_id FROM parts WHERE user_id = $1 ORDER BY id")
            .bind(user_id)
            .fetch_all(db.pool())
            .await
            .map_err(internal)?;
    for (part_id, drone_id) in part_rows {
        parts_by_drone.entry(drone_id).or_default().push(part_id);
    }

    Ok(rows
        .into_iter()
        .map(|row| {
            let parts = parts_by_drone.remove(&row.id).unwrap_or_default();
            row.into_drone(parts)
        })
        .collect())
}

pub async fn get(db: &Db, user_id: i64, id: i64) -> Result<Drone> {
    let sql = format!("{SELECT_DRONE} WHERE d.id = $1 AND d.user_id = $2");
    let row = sqlx::query_as::<_, DroneRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db.pool())
        .await
        .map_err(internal)?
        .ok_or_else(|| Error::NotFound("drone not found".to_string()))?;

    let parts: Vec<i64> =
        sqlx::query_scalar("SELECT id FROM parts WHERE drone_id = $1 ORDER BY id")
            .bind(id)
            .fetch_all(db.pool())
            .await
            .map_err(internal)?;

    Ok(row.into_drone(parts))
}

/// Create a drone and expand its type's default-parts template.
pub async fn create(db: &Db, user_id: i64, req: &CreateDrone) -> Result<i64> {
    let name = required_trimmed(req.name.as_deref(), "name")?;
    let type_id = req
        .type_id
        .ok_or_else(|| Error::Validation("type is required".to_string()))?;
    let start_date = required_trimmed(req.start_date.as_deref(), "startDate")?;
    let status = req
        .status
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_STATUS)
        .to_string();

    let drone_type = super::drone_types::get(db, user_id, type_id)
        .await
        .map_err(|e| match e {
            Error::NotFound(_) => Error::InvalidReference("invalid drone type".to_string()),
            other => other,
        })?;

    let ts = now();
    let mut tx = db.pool().begin().await.map_err(internal)?;

    let drone_id: i64 = sqlx::query_scalar(
        "INSERT INTO drones (user_id, name, type_id, start_date, photo, status, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
    )
    .bind(user_id)
    .bind(&name)
    .bind(type_id)
    .bind(&start_date)
    .bind(&req.photo)
    .bind(&status)
    .bind(&ts)
    .bind(&ts)
    .fetch_one(&mut *tx)
    .await
    .map_err(internal)?;

    for template in &drone_type.default_parts {
        let part_name = template.name().trim();
        if part_name.is_empty() {
            continue;
        }
        // Template manufacturer references can outlive the manufacturer row.
        let manufacturer_id = match template.manufacturer_id() {
            Some(mid) => sqlx::query_scalar::<_, i64>(
                "SELECT id FROM manufacturers WHERE id = $1 AND user_id = $2",
            )
            .bind(mid)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(internal)?,
            None => None,
        };

        sqlx::query(
            "INSERT INTO parts (user_id, drone_id, name, start_date, manufacturer_id, \
             replacement_history, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(user_id)
        .bind(drone_id)
        .bind(part_name)
        .bind(&start_date)
        .bind(manufacturer_id)
        .bind("[]")
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await
        .map_err(internal)?;
    }

    tx.commit().await.map_err(internal)?;
    Ok(drone_id)
}

pub async fn update(db: &Db, user_id: i64, id: i64, update: &DroneUpdate) -> Result<()> {
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
    if let Some(type_id) = update.type_id {
        let valid: Option<i64> =
            sqlx::query_scalar("SELECT id FROM drone_types WHERE id = $1 AND user_id = $2")
                .bind(type_id)
                .bind(user_id)
                .fetch_optional(db.pool())
                .await
                .map_err(internal)?;
        if valid.is_none() {
            return Err(Error::InvalidReference("invalid drone type".to_string()));
        }
        args.push(Arg::Int(Some(type_id)));
        sets.push(format!("type_id = ${}", args.len()));
    }
    if let Some(start_date) = &update.start_date {
        let start_date = required_trimmed(Some(start_date.as_str()), "startDate")?;
        args.push(Arg::Text(Some(start_date)));
        sets.push(format!("start_date = ${}", args.len()));
    }
    if let Some(photo) = &update.photo {
        args.push(Arg::Text(photo.clone()));
        sets.push(format!("photo = ${}", args.len()));
    }
    if let Some(status) = &update.status {
        let status = required_trimmed(Some(status.as_str()), "status")?;
        args.push(Arg::Text(Some(status)));
        sets.push(format!("status = ${}", args.len()));
    }

    args.push(Arg::Text(Some(now())));
    sets.push(format!("updated_at = ${}", args.len()));

    let sql = format!(
        "UPDATE drones SET {} WHERE id = ${} AND user_id = ${}",
        sets.join(", "),
        args.len() + 1,
        args.len() + 2,
    );
    args.push(Arg::Int(Some(id)));
    args.push(Arg::Int(Some(user_id)));

    bind_args(&sql, args)
        .execute(db.pool())
        .await
        .map_err(|e| constraint_error(e, "drone update violated a constraint"))?;

    Ok(())
}

/// Delete a drone. Parts and repairs follow via the declared cascades.
pub async fn delete(db: &Db, user_id: i64, id: i64) -> Result<()> {
    get(db, user_id, id).await?;

    sqlx::query("DELETE FROM drones WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db.pool())
        .await
        .map_err(internal)?;

    Ok(())
}
