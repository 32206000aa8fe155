/// Business logic for payment-service
pub mod conversion;
pub mod watcher;

pub use conversion::ConversionRecorder;
pub use watcher::{ChargeRef, ConfirmationSink, ConfirmationWatcher, WatchOutcome};
