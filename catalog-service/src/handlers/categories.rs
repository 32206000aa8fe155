/// Category handlers - browse taxonomy CRUD
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{Category, UpsertCategoryRequest};
use crate::validators::validate_slug;

const CATEGORY_COLUMNS: &str = "id, name, slug, video_count, created_at, updated_at";

/// List all categories ordered by name
pub async fn list_categories(pool: web::Data<PgPool>) -> Result<HttpResponse> {
    let categories = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories ORDER BY name",
        CATEGORY_COLUMNS
    ))
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::Ok().json(categories))
}

/// Fetch one category by slug
pub async fn get_category(
    pool: web::Data<PgPool>,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    let category = sqlx::query_as::<_, Category>(&format!(
        "SELECT {} FROM categories WHERE slug = $1",
        CATEGORY_COLUMNS
    ))
    .bind(slug.as_str())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(category))
}

/// Create a category
pub async fn create_category(
    pool: web::Data<PgPool>,
    req: web::Json<UpsertCategoryRequest>,
) -> Result<HttpResponse> {
    validate_upsert(&req)?;

    let category = sqlx::query_as::<_, Category>(&format!(
        "INSERT INTO categories (id, name, slug, video_count, created_at, updated_at) \
         VALUES ($1, $2, $3, 0, NOW(), NOW()) \
         ON CONFLICT (slug) DO NOTHING \
         RETURNING {}",
        CATEGORY_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(req.name.trim())
    .bind(&req.slug)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::Conflict(format!(
        "Category slug already exists: {}",
        req.slug
    )))?;

    Ok(HttpResponse::Created().json(category))
}

/// Rename a category (slug is immutable)
pub async fn update_category(
    pool: web::Data<PgPool>,
    slug: web::Path<String>,
    req: web::Json<UpsertCategoryRequest>,
) -> Result<HttpResponse> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }

    let category = sqlx::query_as::<_, Category>(&format!(
        "UPDATE categories SET name = $2, updated_at = NOW() WHERE slug = $1 RETURNING {}",
        CATEGORY_COLUMNS
    ))
    .bind(slug.as_str())
    .bind(req.name.trim())
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Category not found".to_string()))?;

    Ok(HttpResponse::Ok().json(category))
}

/// Delete a category; its videos become uncategorized
pub async fn delete_category(
    pool: web::Data<PgPool>,
    slug: web::Path<String>,
) -> Result<HttpResponse> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let category = sqlx::query_as::<_, Category>(&format!(
        "DELETE FROM categories WHERE slug = $1 RETURNING {}",
        CATEGORY_COLUMNS
    ))
    .bind(slug.as_str())
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Category not found".to_string()))?;

    sqlx::query("UPDATE videos SET category_id = NULL, updated_at = NOW() WHERE category_id = $1")
        .bind(category.id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::NoContent().finish())
}

fn validate_upsert(req: &UpsertCategoryRequest) -> Result<()> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("Name is required".to_string()));
    }
    if !validate_slug(&req.slug) {
        return Err(AppError::BadRequest(format!("Invalid slug: {}", req.slug)));
    }
    Ok(())
}
