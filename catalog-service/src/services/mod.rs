/// Business logic for catalog-service
pub mod mailer;
pub mod related;
pub mod sync;

pub use mailer::Mailer;
