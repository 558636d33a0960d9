/// Domain-level error shared by every layer of the catalog.
///
/// Each variant maps to one stable error kind at the HTTP boundary; the
/// messages are safe to show to callers and never contain file paths.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Entity not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Rate limited: retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Input bytes are not a decodable raster image.
    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    /// Decode or encode failed part-way through.
    #[error("Image transcoding failed: {0}")]
    TranscodeFailure(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Shorthand for a [`CoreError::NotFound`] on a string id.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }
}

impl From<validator::ValidationErrors> for CoreError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort_unstable();
        CoreError::Validation(format!("Invalid fields: {}", fields.join(", ")))
    }
}
