use rioframe_core::error::CoreError;
use rioframe_db::StoreError;

/// Failure of a catalog operation.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Domain failure: not found, validation, unsupported or broken image.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The collection file or content directory could not be read or
    /// written.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<validator::ValidationErrors> for CatalogError {
    fn from(errors: validator::ValidationErrors) -> Self {
        CatalogError::Core(CoreError::from(errors))
    }
}

pub type CatalogResult<T> = Result<T, CatalogError>;
