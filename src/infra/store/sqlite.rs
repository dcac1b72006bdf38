use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqlitePool};
use sqlx::types::Json;
use sqlx::Arguments;

use crate::domain::entity::{Entity, FieldValue};
use crate::domain::models::membership::Membership;
use crate::error::AppError;
use super::sql::Statement;
use super::translate;

fn arguments<'q>(values: Vec<FieldValue>) -> Result<SqliteArguments<'q>, AppError> {
    let mut args = SqliteArguments::default();
    for value in values {
        let added = match value {
            FieldValue::Text(v) => args.add(v),
            FieldValue::Integer(v) => args.add(v),
            FieldValue::Bool(v) => args.add(v),
            FieldValue::Timestamp(v) => args.add(v),
            FieldValue::Json(v) => args.add(Json(v)),
        };
        added.map_err(|e| AppError::InternalWithMsg(format!("Failed to bind SQLite argument: {}", e)))?;
    }
    Ok(args)
}

pub async fn fetch_optional<E: Entity>(conn: &mut SqliteConnection, stmt: Statement) -> Result<Option<E>, AppError> {
    let args = arguments(stmt.values)?;
    sqlx::query_as_with::<_, E, _>(&stmt.sql, args)
        .fetch_optional(&mut *conn)
        .await
        .map_err(translate)
}

pub async fn fetch_one<E: Entity>(conn: &mut SqliteConnection, stmt: Statement) -> Result<E, AppError> {
    let args = arguments(stmt.values)?;
    sqlx::query_as_with::<_, E, _>(&stmt.sql, args)
        .fetch_one(&mut *conn)
        .await
        .map_err(translate)
}

pub async fn fetch_all<E: Entity>(conn: &mut SqliteConnection, stmt: Statement) -> Result<Vec<E>, AppError> {
    let args = arguments(stmt.values)?;
    sqlx::query_as_with::<_, E, _>(&stmt.sql, args)
        .fetch_all(&mut *conn)
        .await
        .map_err(translate)
}

pub async fn fetch_count(conn: &mut SqliteConnection, stmt: Statement) -> Result<i64, AppError> {
    let args = arguments(stmt.values)?;
    sqlx::query_scalar_with::<_, i64, _>(&stmt.sql, args)
        .fetch_one(&mut *conn)
        .await
        .map_err(translate)
}

pub async fn execute(conn: &mut SqliteConnection, stmt: Statement) -> Result<u64, AppError> {
    let args = arguments(stmt.values)?;
    let result = sqlx::query_with(&stmt.sql, args)
        .execute(&mut *conn)
        .await
        .map_err(translate)?;
    Ok(result.rows_affected())
}

/// Runs the conditional invitation update and the membership insert in one
/// transaction. `None` means the invitation was no longer pending.
pub async fn accept_invitation(
    pool: &SqlitePool,
    advance: Statement,
    insert: Statement,
) -> Result<Option<Membership>, AppError> {
    let mut tx = pool.begin().await.map_err(translate)?;

    if execute(&mut *tx, advance).await? == 0 {
        tx.rollback().await.map_err(translate)?;
        return Ok(None);
    }

    let membership = fetch_one::<Membership>(&mut *tx, insert).await?;

    tx.commit().await.map_err(translate)?;
    Ok(Some(membership))
}
