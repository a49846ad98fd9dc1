#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Unknown player: {0}")]
    UnknownPlayer(String),

    #[error("No player registered for identity {0}")]
    UnknownIdentity(String),

    #[error("Invalid building index: {0}")]
    InvalidBuilding(u8),

    #[error("Validation failed: {0}")]
    Validation(String),
}
