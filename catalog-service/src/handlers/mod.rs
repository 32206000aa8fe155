/// HTTP handlers for catalog-service
pub mod categories;
pub mod creators;
pub mod leads;
pub mod marketing;
pub mod removals;
pub mod sync;
pub mod videos;

pub use categories::{
    create_category, delete_category, get_category, list_categories, update_category,
};
pub use creators::{create_creator, delete_creator, get_creator, list_creators, update_creator};
pub use leads::{capture_lead, list_leads};
pub use marketing::send_blast;
pub use removals::{create_removal_request, list_removal_requests, update_removal_request};
pub use sync::{sync_repair, sync_report};
pub use videos::{
    create_video, delete_video, get_video, list_videos, related_videos, update_video,
};
