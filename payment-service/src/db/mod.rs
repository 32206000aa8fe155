/// Database repositories for payment-service
pub mod payment_repo;
pub mod tracking_repo;
