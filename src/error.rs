pub type ConfettiResult<T> = Result<T, ConfettiError>;

#[derive(thiserror::Error, Debug)]
pub enum ConfettiError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("unauthorized")]
    Unauthorized,

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConfettiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Whether the guest can fix this by changing what they submitted,
    /// as opposed to simply trying again later.
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::Validation(_) | Self::Unauthorized | Self::Image(_))
    }
}
