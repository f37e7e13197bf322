//! Practice day persistence operations.

use hangar_core::{
    optional_trimmed, required_trimmed, CreatePracticeDay, Error, PracticeDay, PracticeDayUpdate,
    Result,
};

use super::db::{bind_args, constraint_error, internal, now, Arg, Db};

const DUPLICATE_DATE: &str = "a practice day already exists for this date";

#[derive(sqlx::FromRow)]
struct PracticeDayRow {
    id: i64,
    date: String,
    note: Option<String>,
    created_at: String,
}

impl From<PracticeDayRow> for PracticeDay {
    fn from(row: PracticeDayRow) -> Self {
        PracticeDay {
            id: row.id,
            date: row.date,
            note: row.note,
            created_at: row.created_at,
        }
    }
}

/// List the user's practice days, most recent date first.
pub async fn list(db: &Db, user_id: i64) -> Result<Vec<PracticeDay>> {
    let rows = sqlx::query_as::<_, PracticeDayRow>(
        "SELECT id, date, note, created_at FROM practice_days \
         WHERE user_id = $1 ORDER BY date DESC, id DESC",
    )
    .bind(user_id)
    .fetch_all(db.pool())
    .await
    .map_err(internal)?;

    Ok(rows.into_iter().map(PracticeDay::from).collect())
}

pub async fn get(db: &Db, user_id: i64, id: i64) -> Result<PracticeDay> {
    sqlx::query_as::<_, PracticeDayRow>(
        "SELECT id, date, note, created_at FROM practice_days WHERE id = $1 AND user_id = $2",
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db.pool())
    .await
    .map_err(internal)?
    .map(PracticeDay::from)
    .ok_or_else(|| Error::NotFound("practice day not found".to_string()))
}

pub async fn create(db: &Db, user_id: i64, req: &CreatePracticeDay) -> Result<i64> {
    let date = required_trimmed(req.date.as_deref(), "date")?;
    let note = optional_trimmed(req.note.as_deref());
    let ts = now();

    sqlx::query_scalar::<_, i64>(
        "INSERT INTO practice_days (user_id, date, note, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5) RETURNING id",
    )
    .bind(user_id)
    .bind(&date)
    .bind(&note)
    .bind(&ts)
    .bind(&ts)
    .fetch_one(db.pool())
    .await
    .map_err(|e| constraint_error(e, DUPLICATE_DATE))
}

pub async fn update(db: &Db, user_id: i64, id: i64, update: &PracticeDayUpdate) -> Result<()> {
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
    if let Some(note) = &update.note {
        let note = note.as_deref().and_then(|n| optional_trimmed(Some(n)));
        args.push(Arg::Text(note));
        sets.push(format!("note = ${}", args.len()));
    }

    args.push(Arg::Text(Some(now())));
    sets.push(format!("updated_at = ${}", args.len()));

    let sql = format!(
        "UPDATE practice_days SET {} WHERE id = ${} AND user_id = ${}",
        sets.join(", "),
        args.len() + 1,
        args.len() + 2,
    );
    args.push(Arg::Int(Some(id)));
    args.push(Arg::Int(Some(user_id)));

    bind_args(&sql, args)
        .execute(db.pool())
        .await
        .map_err(|e| constraint_error(e, DUPLICATE_DATE))?;

    Ok(())
}

pub async fn delete(db: &Db, user_id: i64, id: i64) -> Result<()> {
    get(db, user_id, id).await?;

    sqlx::query("DELETE FROM practice_days WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db.pool())
        .await
        .map_err(internal)?;

    Ok(())
}
