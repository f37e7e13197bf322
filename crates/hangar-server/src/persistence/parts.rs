//! Part persistence operations.

use hangar_core::{required_trimmed, CreatePart, Error, Part, PartUpdate, Result};

use super::db::{bind_args, internal, now, Arg, Db};

#[derive(sqlx::FromRow)]
struct PartRow {
    id: i64,
    drone_id: i64,
    name: String,
    start_date: String,
    manufacturer_id: Option<i64>,
    manufacturer_name: Option<String>,
    replacement_history: Option<String>,
    created_at: String,
}

impl From<PartRow> for Part {
    fn from(row: PartRow) -> Self {
        let replacement_history: Vec<serde_json::Value> = row
            .replacement_history
            .as_deref()
            .and_then(|s| serde_json::from_str(s).ok())
            .unwrap_or_default();
        Part {
            id: row.id,
            drone_id: row.drone_id,
            name: row.name,
            start_date: row.start_date,
            manufacturer_id: row.manufacturer_id,
            manufacturer_name: row.manufacturer_name,
            replacement_history,
            created_at: row.created_at,
        }
    }
}

const SELECT_PART: &str = "SELECT p.id, p.drone_id, p.name, p.start_date, p.manufacturer_id, \
     m.name AS manufacturer_name, p.replacement_history, p.created_at \
     FROM parts p LEFT JOIN manufacturers m ON p.manufacturer_id = m.id";

/// List the user's parts, newest first, optionally restricted to one drone.
pub async fn list(db: &Db, user_id: i64, drone_id: Option<i64>) -> Result<Vec<Part>> {
    let rows = match drone_id {
        Some(drone_id) => {
            let sql = format!(
                "{SELECT_PART} WHERE p.user_id = $1 AND p.drone_id = $2 \
                 ORDER BY p.created_at DESC, p.id DESC"
            );
            sqlx::query_as::<_, PartRow>(&sql)
                .bind(user_id)
                .bind(drone_id)
                .fetch_all(db.pool())
                .await
        }
        None => {
            let sql =
                format!("{SELECT_PART} WHERE p.user_id = $1 ORDER BY p.created_at DESC, p.id DESC");
            sqlx::query_as::<_, PartRow>(&sql)
                .bind(user_id)
                .fetch_all(db.pool())
                .await
        }
    }
    .map_err(internal)?;

    Ok(rows.into_iter().map(Part::from).collect())
}

pub async fn get(db: &Db, user_id: i64, id: i64) -> Result<Part> {
    let sql = format!("{SELECT_PART} WHERE p.id = $1 AND p.user_id = $2");
    sqlx::query_as::<_, PartRow>(&sql)
        .bind(id)
        .bind(user_id)
        .fetch_optional(db.pool())
        .await
        .map_err(internal)?
        .map(Part::from)
        .ok_or_else(|| Error::NotFound("part not found".to_string()))
}

async fn require_drone(db: &Db, user_id: i64, drone_id: i64) -> Result<()> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM drones WHERE id = $1 AND user_id = $2")
            .bind(drone_id)
            .bind(user_id)
            .fetch_optional(db.pool())
            .await
            .map_err(internal)?;
    // Absent drones are a 404, matching the legacy client contract.
    found
        .map(|_| ())
        .ok_or_else(|| Error::NotFound("drone not found".to_string()))
}

async fn check_manufacturer(db: &Db, user_id: i64, manufacturer_id: i64) -> Result<()> {
    let found: Option<i64> =
        sqlx::query_scalar("SELECT id FROM manufacturers WHERE id = $1 AND user_id = $2")
            .bind(manufacturer_id)
            .bind(user_id)
            .fetch_optional(db.pool())
            .await
            .map_err(internal)?;
    found
        .map(|_| ())
        .ok_or_else(|| Error::InvalidReference("invalid manufacturer".to_string()))
}

pub async fn create(db: &Db, user_id: i64, req: &CreatePart) -> Result<i64> {
    let drone_id = req
        .drone_id
        .ok_or_else(|| Error::Validation("droneId is required".to_string()))?;
    let name = required_trimmed(req.name.as_deref(), "name")?;
    let start_date = required_trimmed(req.start_date.as_deref(), "startDate")?;

    require_drone(db, user_id, drone_id).await?;
    if let Some(mid) = req.manufacturer_id {
        check_manufacturer(db, user_id, mid).await?;
    }

    let ts = now();
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO parts (user_id, drone_id, name, start_date, manufacturer_id, \
         replacement_history, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
    )
    .bind(user_id)
    .bind(drone_id)
    .bind(&name)
    .bind(&start_date)
    .bind(req.manufacturer_id)
    .bind("[]")
    .bind(&ts)
    .bind(&ts)
    .fetch_one(db.pool())
    .await
    .map_err(internal)
}

pub async fn update(db: &Db, user_id: i64, id: i64, update: &PartUpdate) -> Result<()> {
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
    if let Some(start_date) = &update.start_date {
        let start_date = required_trimmed(Some(start_date.as_str()), "startDate")?;
        args.push(Arg::Text(Some(start_date)));
        sets.push(format!("start_date = ${}", args.len()));
    }
    if let Some(manufacturer_id) = update.manufacturer_id {
        if let Some(mid) = manufacturer_id {
            check_manufacturer(db, user_id, mid).await?;
        }
        args.push(Arg::Int(manufacturer_id));
        sets.push(format!("manufacturer_id = ${}", args.len()));
    }
    if let Some(history) = &update.replacement_history {
        let serialized =
            serde_json::to_string(history).map_err(|e| Error::Internal(e.to_string()))?;
        args.push(Arg::Text(Some(serialized)));
        sets.push(format!("replacement_history = ${}", args.len()));
    }

    args.push(Arg::Text(Some(now())));
    sets.push(format!("updated_at = ${}", args.len()));

    let sql = format!(
        "UPDATE parts SET {} WHERE id = ${} AND user_id = ${}",
        sets.join(", "),
        args.len() + 1,
        args.len() + 2,
    );
    args.push(Arg::Int(Some(id)));
    args.push(Arg::Int(Some(user_id)));

    bind_args(&sql, args)
        .execute(db.pool())
        .await
        .map_err(internal)?;

    Ok(())
}

/// Delete a part. Repairs referencing it follow via the declared cascade.
pub async fn delete(db: &Db, user_id: i64, id: i64) -> Result<()> {
    get(db, user_id, id).await?;

    sqlx::query("DELETE FROM parts WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db.pool())
        .await
        .map_err(internal)?;

    Ok(())
}
