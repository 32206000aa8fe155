/// Creator handlers - performer/studio profiles
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Creator, UpsertCreatorRequest};
use crate::validators::validate_slug;

const CREATOR_COLUMNS: &str = "id, name, slug, avatar_url, video_count, created_at, updated_at";

/// List all creators ordered by name
pub async fn list_creators(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let creators = sqlx::query_as::<_, Creator>(&format!(
        "SELECT {} FROM creators ORDER BY name",
        CREATOR_COLUMNS
    ))
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::Ok().json(creators))
}

/// Fetch one creator by slug
pub async fn get_creator(pool: web::Data<PgPool>, slug: web::Path<String>) -> Result<HttpResponse> {
    let creator = sqlx::query_as::<_, Creator>(&format!(
        "SELECT {} FROM creators WHERE slug = $1",
        CREATOR_COLUMNS
    ))
    .bind(slug.as_str())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Creator not found".to_string()))?;

    Ok(HttpResponse::Ok().json(creator))
}

/// Create a creator profile
pub async fn create_creator(
    pool: web::Data<PgPool>,
    req: web::Json<UpsertCreatorRequest>,
) -> Result<HttpResponse> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if !validate_slug(&req.slug) {
        return Err(AppError::BadRequest(format!("Invalid slug: {}", req.slug)));
    }

    let creator = sqlx::query_as::<_, Creator>(&format!(
        "INSERT INTO creators (id, name, slug, avatar_url, video_count, created_at, updated_at) \
         VALUES ($1, $2, $3, $4, 0, NOW(), NOW()) \
         ON CONFLICT (slug) DO NOTHING \
         RETURNING {}",
        CREATOR_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(req.name.trim())
    .bind(&req.slug)
    .bind(&req.avatar_url)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::Conflict(format!(
        "Creator slug already exists: {}",
        req.slug
    )))?;

    Ok(HttpResponse::Created().json(creator))
}

/// Update a creator's display name and avatar
pub async fn update_creator(
    pool: web::Data<PgPool>,
    slug: web::Path<String>,
    req: web::Json<UpsertCreatorRequest>,
) -> Result<HttpResponse> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let creator = sqlx::query_as::<_, Creator>(&format!(
        "UPDATE creators SET name = $2, avatar_url = $3, updated_at = NOW() \
         WHERE slug = $1 RETURNING {}",
        CREATOR_COLUMNS
    ))
    .bind(slug.as_str())
    .bind(req.name.trim())
    .bind(&req.avatar_url)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Creator not found".to_string()))?;

    Ok(HttpResponse::Ok().json(creator))
}

/// Delete a creator; their videos keep playing without a profile link
pub async fn delete_creator(
    pool: web::Data<PgPool>,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let creator = sqlx::query_as::<_, Creator>(&format!(
        "DELETE FROM creators WHERE slug = $1 RETURNING {}",
        CREATOR_COLUMNS
    ))
    .bind(slug.as_str())
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Creator not found".to_string()))?;

    sqlx::query("UPDATE videos SET creator_id = NULL, updated_at = NOW() WHERE creator_id = $1")
        .bind(creator.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::NoContent().finish())
}
