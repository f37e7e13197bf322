//! Repair log persistence operations.

use hangar_core::{required_trimmed, CreateRepair, Error, Repair, RepairUpdate, Result};

use super::db::{bind_args, internal, now, Arg, Db};

#[derive(sqlx::FromRow)]
struct RepairRow {
    id: i64,
    drone_id: i64,
    part_id: Option<i64>,
    date: String,
    description: String,
    created_at: String,
}

impl From<RepairRow> for Repair {
    fn from(row: RepairRow) -> Self {
        Repair {
            id: row.id,
            drone_id: row.drone_id,
            part_id: row.part_id,
            date: row.date,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// List repairs, newest first, optionally filtered by drone and/or part.
pub async fn list(
    db: &Db,
    user_id: i64,
    drone_id: Option<i64>,
    part_id: Option<i64>,
) -> Result<Vec<Repair>> {
    let mut sql = String::from(
        "SELECT id, drone_id, part_id, date, description, created_at \
         FROM repairs WHERE user_id = $1",
    );
    let mut args: Vec<Arg> = vec![Arg::Int(Some(user_id))];

    if let Some(drone_id) = drone_id {
        args.push(Arg::Int(Some(drone_id)));
        sql.push_str(&format!(" AND drone_id = ${}", args.len()));
    }
    if let Some(part_id) = part_id {
        args.push(Arg::Int(Some(part_id)));
        sql.push_str(&format!(" AND part_id = ${}", args.len()));
    }
    sql.push_str(" ORDER BY created_at DESC, id DESC");

    let mut query = sqlx::query_as::<_, RepairRow>(&sql);
    for arg in args {
        query = match arg {
            Arg::Int(v) => query.bind(v),
            Arg::Text(v) => query.bind(v),
        };
    }

    let rows = query.fetch_all(db.pool()).await.map_err(internal)?;
    Ok(rows.into_iter().map(Repair::from).collect())
}

pub async fn get(db: &Db, user_id: i64, id: i64) -> Result<Repair> {
    sqlx::query_as::<_, RepairRow>(
        "SELECT id, drone_id, part_id, date, description, created_at \
         FROM repairs WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await
    .map_err(internal)?
    .map(Repair::from)
    .ok_or_else(|| Error::NotFound("repair not found".to_string()))
}

pub async fn create(db: &Db, user_id: i64, req: &CreateRepair) -> Result<i64> {
    let drone_id = req
        .drone_id
        .ok_or_else(|| Error::Validation("droneId is required".to_string()))?;
    let date = required_trimmed(req.date.as_deref(), "date")?;
    let description = required_trimmed(req.description.as_deref(), "description")?;

    let drone: Option<i64> =
        sqlx::query_scalar("SELECT id FROM drones WHERE id = $1 AND user_id = $2")
            .bind(drone_id)
            .bind(user_id)
            .fetch_optional(db.pool())
            .await
            .map_err(internal)?;
    if drone.is_none() {
        return Err(Error::NotFound("drone not found".to_string()));
    }

    if let Some(part_id) = req.part_id {
        let part: Option<i64> =
            sqlx::query_scalar("SELECT id FROM parts WHERE id = $1 AND user_id = $2")
                .bind(part_id)
                .bind(user_id)
                .fetch_optional(db.pool())
                .await
                .map_err(internal)?;
        if part.is_none() {
            return Err(Error::NotFound("part not found".to_string()));
        }
    }

    let ts = now();
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO repairs (user_id, drone_id, part_id, date, description, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id",
    )
    .bind(user_id)
    .bind(drone_id)
    .bind(req.part_id)
    .bind(&date)
    .bind(&description)
    .bind(&ts)
    .bind(&ts)
    .fetch_one(db.pool())
    .await
    .map_err(internal)
}

pub async fn update(db: &Db, user_id: i64, id: i64, update: &RepairUpdate) -> Result<()> {
    get(db, user_id, id).await?;
    if update.is_empty() {
        return Err(Error::Validation("no fields to update".to_string()));
    }

    let mut sets: Vec<String> = Vec::new();
    let mut args: Vec<Arg> = Vec::new();

    if let Some(date) = &update.date {
        let date = required_trimmed(Some(date.as_str()), "date")?;
        args.push(Arg::Text(Some(date)));
        sets.push(format!("date = ${}", args.len()));
    }
    if let Some(description) = &update.description {
        let description = required_trimmed(Some(description.as_str()), "description")?;
        args.push(Arg::Text(Some(description)));
        sets.push(format!("description = ${}", args.len()));
    }

    args.push(Arg::Text(Some(now())));
    sets.push(format!("updated_at = ${}", args.len()));

    let sql = format!(
        "UPDATE repairs SET {} WHERE id = ${} AND user_id = ${}",
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

pub async fn delete(db: &Db, user_id: i64, id: i64) -> Result<()> {
    get(db, user_id, id).await?;

    sqlx::query("DELETE FROM repairs WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db.pool())
        .await
        .map_err(internal)?;

    Ok(())
}
