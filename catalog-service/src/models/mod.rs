/// Data models for catalog-service
///
/// This module defines structures for:
/// - Video: catalog entry and playback metadata
/// - Category / Creator: browse taxonomy with denormalized video counts
/// - RemovalRequest: content-removal tickets
/// - Lead: captured marketing emails
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ========================================
// Video Models
// ========================================

/// Video status in the catalog lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Draft,
    Published,
    Archived,
}

impl VideoStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
            Self::Archived => "archived",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            "archived" => Some(Self::Archived),
            _ => None,
        }
    }
}

/// Video database entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Video {
    pub id: Uuid,
    pub creator_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: i32,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_premium: bool,
    pub view_count: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Video {
    pub fn get_status(&self) -> VideoStatus {
        VideoStatus::from_str(&self.status).unwrap_or(VideoStatus::Draft)
    }
}

/// Video response DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoResponse {
    pub id: String,
    pub creator_id: Option<String>,
    pub category_id: Option<String>,
    pub title: String,
    pub description: Option<String>,
    pub duration_seconds: i32,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_premium: bool,
    pub view_count: i64,
    pub status: String,
    pub created_at: i64,
}

impl From<Video> for VideoResponse {
    fn from(video: Video) -> Self {
        Self {
            id: video.id.to_string(),
            creator_id: video.creator_id.map(|id| id.to_string()),
            category_id: video.category_id.map(|id| id.to_string()),
            title: video.title,
            description: video.description,
            duration_seconds: video.duration_seconds,
            video_url: video.video_url,
            thumbnail_url: video.thumbnail_url,
            is_premium: video.is_premium,
            view_count: video.view_count,
            status: video.status,
            created_at: video.created_at.timestamp(),
        }
    }
}

/// Create video request DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateVideoRequest {
    pub title: String,
    pub description: Option<String>,
    pub creator_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub duration_seconds: Option<i32>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
    pub is_premium: Option<bool>,
}

/// Update video request DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateVideoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub thumbnail_url: Option<String>,
    pub is_premium: Option<bool>,
    pub status: Option<String>,
}

/// Paginated video listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoListResponse {
    pub videos: Vec<VideoResponse>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
    pub total_pages: i64,
}

// ========================================
// Category / Creator Models
// ========================================

/// Category entity with denormalized video count
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub video_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Creator entity with denormalized video count
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Creator {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
    pub avatar_url: Option<String>,
    pub video_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertCategoryRequest {
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpsertCreatorRequest {
    pub name: String,
    pub slug: String,
    pub avatar_url: Option<String>,
}

// ========================================
// Removal Request Models
// ========================================

/// Content-removal ticket status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalStatus {
    Pending,
    Reviewing,
    Resolved,
    Rejected,
}

impl RemovalStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Reviewing => "reviewing",
            Self::Resolved => "resolved",
            Self::Rejected => "rejected",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "reviewing" => Some(Self::Reviewing),
            "resolved" => Some(Self::Resolved),
            "rejected" => Some(Self::Rejected),
            _ => None,
        }
    }
}

/// Content-removal request entity
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct RemovalRequest {
    pub id: Uuid,
    pub video_url: String,
    pub reporter_email: String,
    pub reason: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRemovalRequest {
    pub video_url: String,
    pub reporter_email: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateRemovalRequest {
    pub status: String,
}

// ========================================
// Lead Models
// ========================================

/// Captured marketing email
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Lead {
    pub id: Uuid,
    pub email: String,
    pub source: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureLeadRequest {
    pub email: String,
    pub source: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_status_round_trip() {
        for status in [VideoStatus::Draft, VideoStatus::Published, VideoStatus::Archived] {
            assert_eq!(VideoStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(VideoStatus::from_str("processing"), None);
    }

    #[test]
    fn test_removal_status_round_trip() {
        for status in [
            RemovalStatus::Pending,
            RemovalStatus::Reviewing,
            RemovalStatus::Resolved,
            RemovalStatus::Rejected,
        ] {
            assert_eq!(RemovalStatus::from_str(status.as_str()), Some(status));
        }
    }
}
