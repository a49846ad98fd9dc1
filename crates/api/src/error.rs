use slotkeeper_core::CoreError;
use slotkeeper_events::DeliveryError;

/// Application-level error type for command handling.
///
/// None of these are fatal: the poll loop logs them and moves on to the
/// next update.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `slotkeeper_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A reply or broadcast could not be delivered.
    #[error("Delivery failed: {0}")]
    Delivery(#[from] DeliveryError),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;
