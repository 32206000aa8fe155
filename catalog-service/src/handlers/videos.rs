/// Video handlers - HTTP endpoints for catalog videos
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::{
    CreateVideoRequest, UpdateVideoRequest, Video, VideoListResponse, VideoResponse,
};

#[derive(Debug, Deserialize)]
pub struct ListVideosQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub category_id: Option<Uuid>,
    pub premium: Option<bool>,
}

/// List published videos with pagination and optional filters
pub async fn list_videos(
    pool: web::Data<PgPool>,
    query: web::Query<ListVideosQuery>,
) -> Result<HttpResponse> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(24).clamp(1, 100);
    let offset = (page - 1) * per_page;

    let videos = sqlx::query_as::<_, Video>(
        "SELECT id, creator_id, category_id, title, description, duration_seconds, \
         video_url, thumbnail_url, is_premium, view_count, status, created_at, updated_at \
         FROM videos \
         WHERE deleted_at IS NULL AND status = 'published' \
         AND ($1::uuid IS NULL OR category_id = $1) \
         AND ($2::bool IS NULL OR is_premium = $2) \
         ORDER BY created_at DESC LIMIT $3 OFFSET $4",
    )
    .bind(query.category_id)
    .bind(query.premium)
    .bind(per_page)
    .bind(offset)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM videos \
         WHERE deleted_at IS NULL AND status = 'published' \
         AND ($1::uuid IS NULL OR category_id = $1) \
         AND ($2::bool IS NULL OR is_premium = $2)",
    )
    .bind(query.category_id)
    .bind(query.premium)
    .fetch_one(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::Ok().json(VideoListResponse {
        videos: videos.into_iter().map(|v| v.into()).collect(),
        page,
        per_page,
        total,
        total_pages: (total + per_page - 1) / per_page,
    }))
}

/// Playback fetch: returns the video and counts the view
pub async fn get_video(
    pool: web::Data<PgPool>,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let video_uuid = Uuid::parse_str(&video_id)
        .map_err(|_| AppError::BadRequest("Invalid video ID".to_string()))?;

    let video = sqlx::query_as::<_, Video>(
        "UPDATE videos SET view_count = view_count + 1 \
         WHERE id = $1 AND deleted_at IS NULL \
         RETURNING id, creator_id, category_id, title, description, duration_seconds, \
         video_url, thumbnail_url, is_premium, view_count, status, created_at, updated_at",
    )
    .bind(video_uuid)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Video not found".to_string()))?;

    Ok(HttpResponse::Ok().json(VideoResponse::from(video)))
}

/// Create a new video
pub async fn create_video(
    pool: web::Data<PgPool>,
    req: web::Json<CreateVideoRequest>,
) -> Result<HttpResponse> {
    if req.title.trim().is_empty() {
        return Err(AppError::BadRequest("Title is required".to_string()));
    }

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let video = sqlx::query_as::<_, Video>(
        "INSERT INTO videos (id, creator_id, category_id, title, description, \
         duration_seconds, video_url, thumbnail_url, is_premium, view_count, status, \
         created_at, updated_at) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 0, 'published', NOW(), NOW()) \
         RETURNING id, creator_id, category_id, title, description, duration_seconds, \
         video_url, thumbnail_url, is_premium, view_count, status, created_at, updated_at",
    )
    .bind(Uuid::new_v4())
    .bind(req.creator_id)
    .bind(req.category_id)
    .bind(req.title.trim())
    .bind(&req.description)
    .bind(req.duration_seconds.unwrap_or(0))
    .bind(&req.video_url)
    .bind(&req.thumbnail_url)
    .bind(req.is_premium.unwrap_or(false))
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    // Keep the denormalized browse counts in step
    if let Some(category_id) = video.category_id {
        sqlx::query(
            "UPDATE categories SET video_count = video_count + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(category_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    }
    if let Some(creator_id) = video.creator_id {
        sqlx::query(
            "UPDATE creators SET video_count = video_count + 1, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(creator_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::Created().json(VideoResponse::from(video)))
}

/// Update video metadata
pub async fn update_video(
    pool: web::Data<PgPool>,
    video_id: web::Path<String>,
    req: web::Json<UpdateVideoRequest>,
) -> Result<HttpResponse> {
    let video_uuid = Uuid::parse_str(&video_id)
        .map_err(|_| AppError::BadRequest("Invalid video ID".to_string()))?;

    if let Some(status) = req.status.as_deref() {
        if crate::models::VideoStatus::from_str(status).is_none() {
            return Err(AppError::BadRequest(format!("Invalid status: {}", status)));
        }
    }

    let existing = sqlx::query_as::<_, Video>(
        "SELECT id, creator_id, category_id, title, description, duration_seconds, \
         video_url, thumbnail_url, is_premium, view_count, status, created_at, updated_at \
         FROM videos WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(video_uuid)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Video not found".to_string()))?;

    let title = req.title.as_ref().unwrap_or(&existing.title);
    let description = req.description.as_ref().or(existing.description.as_ref());
    let category_id = req.category_id.or(existing.category_id);
    let thumbnail_url = req.thumbnail_url.as_ref().or(existing.thumbnail_url.as_ref());
    let is_premium = req.is_premium.unwrap_or(existing.is_premium);
    let status = req.status.as_ref().unwrap_or(&existing.status);

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let updated = sqlx::query_as::<_, Video>(
        "UPDATE videos SET title = $2, description = $3, category_id = $4, \
         thumbnail_url = $5, is_premium = $6, status = $7, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING id, creator_id, category_id, title, description, duration_seconds, \
         video_url, thumbnail_url, is_premium, view_count, status, created_at, updated_at",
    )
    .bind(video_uuid)
    .bind(title)
    .bind(description)
    .bind(category_id)
    .bind(thumbnail_url)
    .bind(is_premium)
    .bind(status)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    // Moving between categories shifts both counts
    if existing.category_id != updated.category_id {
        if let Some(old_id) = existing.category_id {
            sqlx::query(
                "UPDATE categories SET video_count = GREATEST(video_count - 1, 0), \
                 updated_at = NOW() WHERE id = $1",
            )
            .bind(old_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        }
        if let Some(new_id) = updated.category_id {
            sqlx::query(
                "UPDATE categories SET video_count = video_count + 1, updated_at = NOW() \
                 WHERE id = $1",
            )
            .bind(new_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;
        }
    }

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::Ok().json(VideoResponse::from(updated)))
}

/// Related videos for the playback page
pub async fn related_videos(
    pool: web::Data<PgPool>,
    config: web::Data<crate::Config>,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let video_uuid = Uuid::parse_str(&video_id)
        .map_err(|_| AppError::BadRequest("Invalid video ID".to_string()))?;

    let related =
        crate::services::related::find_related(pool.get_ref(), video_uuid, config.related.limit)
            .await?;

    let responses: Vec<VideoResponse> = related.into_iter().map(|v| v.into()).collect();
    Ok(HttpResponse::Ok().json(responses))
}

/// Delete (soft delete) a video
pub async fn delete_video(
    pool: web::Data<PgPool>,
    video_id: web::Path<String>,
) -> Result<HttpResponse> {
    let video_uuid = Uuid::parse_str(&video_id)
        .map_err(|_| AppError::BadRequest("Invalid video ID".to_string()))?;

    let mut tx = pool
        .begin()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    let deleted = sqlx::query_as::<_, Video>(
        "UPDATE videos SET deleted_at = NOW(), updated_at = NOW() \
         WHERE id = $1 AND deleted_at IS NULL \
         RETURNING id, creator_id, category_id, title, description, duration_seconds, \
         video_url, thumbnail_url, is_premium, view_count, status, created_at, updated_at",
    )
    .bind(video_uuid)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Video not found".to_string()))?;

    if let Some(category_id) = deleted.category_id {
        sqlx::query(
            "UPDATE categories SET video_count = GREATEST(video_count - 1, 0), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(category_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    }
    if let Some(creator_id) = deleted.creator_id {
        sqlx::query(
            "UPDATE creators SET video_count = GREATEST(video_count - 1, 0), \
             updated_at = NOW() WHERE id = $1",
        )
        .bind(creator_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;
    }

    tx.commit()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    Ok(HttpResponse::NoContent().finish())
}
