use actix_web::{web, HttpResponse};
use diesel::prelude::*;
use serde_json::json;

use crate::db::DbPool;
use crate::errors::AppError;

/// Reports healthy once a pooled connection can answer `SELECT 1`.
pub async fn health(pool: web::Data<DbPool>) -> Result<HttpResponse, AppError> {
    web::block(move || {
        let mut conn = pool
            .get()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        diesel::sql_query("SELECT 1")
            .execute(&mut conn)
            .map_err(|e| AppError::Internal(e.to_string()))
    })
    .await
    .map_err(|e| AppError::Internal(e.to_string()))??;

    Ok(HttpResponse::Ok().json(json!({ "status": "ok" })))
}
