//! One-shot bulk import of a client-side data snapshot.
//!
//! Everything runs in a single transaction in a fixed order so that cross
//! references resolve: drone types, manufacturers, drones, parts, repairs,
//! practice days. Client-assigned ids are remapped to server ids; rows whose
//! references did not import are dropped silently, as the legacy importer
//! did. Any database failure rolls the whole snapshot back.

use std::collections::HashMap;

use hangar_core::{client_key, Error, ImportSnapshot, Result};
use sqlx::{Any, Transaction};
use tracing::info;

use super::db::{now, Db};

fn import_err(err: sqlx::Error) -> Error {
    Error::ImportFailed(err.to_string())
}

async fn find_type_by_name(
    tx: &mut Transaction<'_, Any>,
    user_id: i64,
    name: &str,
) -> Result<Option<i64>> {
    sqlx::query_scalar::<_, i64>("SELECT id FROM drone_types WHERE user_id = $1 AND name = $2")
        .bind(user_id)
        .bind(name)
        .fetch_optional(&mut **tx)
        .await
        .map_err(import_err)
}

async fn insert_type(
    tx: &mut Transaction<'_, Any>,
    user_id: i64,
    name: &str,
    default_parts: &str,
    ts: &str,
) -> Result<i64> {
    sqlx::query_scalar::<_, i64>(
        "INSERT INTO drone_types (user_id, name, default_parts, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(user_id)
    .bind(name)
    .bind(default_parts)
    .bind(ts)
    .bind(ts)
    .fetch_one(&mut **tx)
    .await
    .map_err(import_err)
}

/// Apply an exported snapshot to the user's account.
pub async fn import_snapshot(db: &Db, user_id: i64, snapshot: &ImportSnapshot) -> Result<()> {
    let ts = now();
    let mut tx = db.pool().begin().await.map_err(import_err)?;

    for drone_type in &snapshot.drone_types {
        let name = drone_type.name.trim();
        if name.is_empty() {
            continue;
        }
        if find_type_by_name(&mut tx, user_id, name).await?.is_none() {
            let default_parts = serde_json::to_string(&drone_type.default_parts)
                .map_err(|e| Error::ImportFailed(e.to_string()))?;
            insert_type(&mut tx, user_id, name, &default_parts, &ts).await?;
        }
    }

    for manufacturer in &snapshot.manufacturers {
        let name = manufacturer.name.trim();
        if name.is_empty() {
            continue;
        }
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM manufacturers WHERE user_id = $1 AND name = $2")
                .bind(user_id)
                .bind(name)
                .fetch_optional(&mut *tx)
                .await
                .map_err(import_err)?;
        if existing.is_none() {
            sqlx::query(
                "INSERT INTO manufacturers (user_id, name, created_at, updated_at) \
                 VALUES ($1, $2, $3, $4)",
            )
            .bind(user_id)
            .bind(name)
            .bind(&ts)
            .bind(&ts)
            .execute(&mut *tx)
            .await
            .map_err(import_err)?;
        }
    }

    // Client drone id -> server drone id. Drones without a type name are
    // skipped, which also drops their parts and repairs below.
    let mut drone_map: HashMap<String, i64> = HashMap::new();
    for drone in &snapshot.drones {
        let type_name = drone.type_name.as_deref().map(str::trim).unwrap_or("");
        if type_name.is_empty() {
            continue;
        }
        let type_id = match find_type_by_name(&mut tx, user_id, type_name).await? {
            Some(id) => id,
            None => insert_type(&mut tx, user_id, type_name, "[]", &ts).await?,
        };
        let status = drone.status.as_deref().map(str::trim).unwrap_or("");
        let status = if status.is_empty() { "ready" } else { status };

        let new_id: i64 = sqlx::query_scalar(
            "INSERT INTO drones (user_id, name, type_id, start_date, photo, status, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(user_id)
        .bind(&drone.name)
        .bind(type_id)
        .bind(&drone.start_date)
        .bind(&drone.photo)
        .bind(status)
        .bind(&ts)
        .bind(&ts)
        .fetch_one(&mut *tx)
        .await
        .map_err(import_err)?;

        if let Some(id) = &drone.id {
            drone_map.insert(client_key(id), new_id);
        }
    }

    // Manufacturer references are intentionally not carried over; snapshot
    // manufacturer ids are client-local and there is no reliable mapping.
    let mut part_map: HashMap<String, i64> = HashMap::new();
    for part in &snapshot.parts {
        let drone_id = match part
            .drone_id
            .as_ref()
            .and_then(|id| drone_map.get(&client_key(id)))
        {
            Some(id) => *id,
            None => continue,
        };
        let history = serde_json::to_string(&part.replacement_history)
            .map_err(|e| Error::ImportFailed(e.to_string()))?;

        let new_id: i64 = sqlx::query_scalar(
            "INSERT INTO parts (user_id, drone_id, name, start_date, manufacturer_id, \
             replacement_history, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING id",
        )
        .bind(user_id)
        .bind(drone_id)
        .bind(&part.name)
        .bind(&part.start_date)
        .bind(None::<i64>)
        .bind(&history)
        .bind(&ts)
        .bind(&ts)
        .fetch_one(&mut *tx)
        .await
        .map_err(import_err)?;

        if let Some(id) = &part.id {
            part_map.insert(client_key(id), new_id);
        }
    }

    for repair in &snapshot.repairs {
        let drone_id = match repair
            .drone_id
            .as_ref()
            .and_then(|id| drone_map.get(&client_key(id)))
        {
            Some(id) => *id,
            None => continue,
        };
        let part_id = repair
            .part_id
            .as_ref()
            .and_then(|id| part_map.get(&client_key(id)))
            .copied();

        sqlx::query(
            "INSERT INTO repairs (user_id, drone_id, part_id, date, description, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(user_id)
        .bind(drone_id)
        .bind(part_id)
        .bind(&repair.date)
        .bind(&repair.description)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await
        .map_err(import_err)?;
    }

    for practice_day in &snapshot.practice_days {
        // Pre-insert check instead of catching the unique violation; a
        // failed statement would poison the transaction on PostgreSQL.
        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM practice_days WHERE user_id = $1 AND date = $2")
                .bind(user_id)
                .bind(&practice_day.date)
                .fetch_optional(&mut *tx)
                .await
                .map_err(import_err)?;
        if existing.is_some() {
            continue;
        }
        sqlx::query(
            "INSERT INTO practice_days (user_id, date, note, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user_id)
        .bind(&practice_day.date)
        .bind(&practice_day.note)
        .bind(&ts)
        .bind(&ts)
        .execute(&mut *tx)
        .await
        .map_err(import_err)?;
    }

    tx.commit().await.map_err(import_err)?;

    info!(
        user_id,
        drones = snapshot.drones.len(),
        parts = snapshot.parts.len(),
        "Snapshot import committed"
    );
    Ok(())
}
