/// Related-video recommendation
///
/// Same-category lookup first; when the category is thin the list is
/// topped up with a random shuffle of recent published videos. No ranking
/// engine, matching what the playback page actually needs.
use rand::seq::SliceRandom;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::{AppError, Result};
use crate::models::Video;

/// How many recent videos feed the shuffle fallback
const FALLBACK_POOL_SIZE: i64 = 60;

pub async fn find_related(pool: &PgPool, video_id: Uuid, limit: usize) -> Result<Vec<Video>> {
    let video = sqlx::query_as::<_, Video>(
        "SELECT id, creator_id, category_id, title, description, duration_seconds, \
         video_url, thumbnail_url, is_premium, view_count, status, created_at, updated_at \
         FROM videos WHERE id = $1 AND deleted_at IS NULL",
    )
    .bind(video_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?
    .ok_or(AppError::NotFound("Video not found".to_string()))?;

    let same_category = match video.category_id {
        Some(category_id) => sqlx::query_as::<_, Video>(
            "SELECT id, creator_id, category_id, title, description, duration_seconds, \
             video_url, thumbnail_url, is_premium, view_count, status, created_at, updated_at \
             FROM videos \
             WHERE category_id = $1 AND id <> $2 AND deleted_at IS NULL \
             AND status = 'published' \
             ORDER BY created_at DESC LIMIT $3",
        )
        .bind(category_id)
        .bind(video_id)
        .bind(limit as i64)
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?,
        None => Vec::new(),
    };

    if same_category.len() >= limit {
        return Ok(same_category);
    }

    let mut fallback = sqlx::query_as::<_, Video>(
        "SELECT id, creator_id, category_id, title, description, duration_seconds, \
         video_url, thumbnail_url, is_premium, view_count, status, created_at, updated_at \
         FROM videos \
         WHERE id <> $1 AND deleted_at IS NULL AND status = 'published' \
         ORDER BY created_at DESC LIMIT $2",
    )
    .bind(video_id)
    .bind(FALLBACK_POOL_SIZE)
    .fetch_all(pool)
    .await
    .map_err(|e| AppError::DatabaseError(e.to_string()))?;

    fallback.shuffle(&mut rand::thread_rng());

    Ok(fill_with_fallback(same_category, fallback, video_id, limit))
}

/// Top up the primary list from the fallback pool, excluding the source
/// video and anything already present.
fn fill_with_fallback(
    primary: Vec<Video>,
    fallback: Vec<Video>,
    exclude: Uuid,
    limit: usize,
) -> Vec<Video> {
    let mut result = primary;
    result.retain(|v| v.id != exclude);
    result.truncate(limit);

    for candidate in fallback {
        if result.len() >= limit {
            break;
        }
        if candidate.id == exclude || result.iter().any(|v| v.id == candidate.id) {
            continue;
        }
        result.push(candidate);
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn video(id: Uuid) -> Video {
        Video {
            id,
            creator_id: None,
            category_id: None,
            title: "clip".to_string(),
            description: None,
            duration_seconds: 60,
            video_url: None,
            thumbnail_url: None,
            is_premium: false,
            view_count: 0,
            status: "published".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_fallback_fills_up_to_limit() {
        let primary = vec![video(Uuid::new_v4())];
        let fallback: Vec<Video> = (0..5).map(|_| video(Uuid::new_v4())).collect();

        let result = fill_with_fallback(primary, fallback, Uuid::new_v4(), 4);
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_source_video_never_included() {
        let source = Uuid::new_v4();
        let primary = vec![video(source), video(Uuid::new_v4())];
        let fallback = vec![video(source), video(Uuid::new_v4())];

        let result = fill_with_fallback(primary, fallback, source, 10);
        assert!(result.iter().all(|v| v.id != source));
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_no_duplicates_across_primary_and_fallback() {
        let shared = video(Uuid::new_v4());
        let primary = vec![shared.clone(), video(Uuid::new_v4())];
        let fallback = vec![shared.clone(), video(Uuid::new_v4()), video(Uuid::new_v4())];

        let result = fill_with_fallback(primary, fallback, Uuid::new_v4(), 10);
        let ids: Vec<Uuid> = result.iter().map(|v| v.id).collect();
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(ids.len(), deduped.len());
    }

    #[test]
    fn test_full_primary_is_untouched_by_fallback() {
        let primary: Vec<Video> = (0..4).map(|_| video(Uuid::new_v4())).collect();
        let primary_ids: Vec<Uuid> = primary.iter().map(|v| v.id).collect();
        let fallback = vec![video(Uuid::new_v4())];

        let result = fill_with_fallback(primary, fallback, Uuid::new_v4(), 4);
        let result_ids: Vec<Uuid> = result.iter().map(|v| v.id).collect();
        assert_eq!(result_ids, primary_ids);
    }
}
