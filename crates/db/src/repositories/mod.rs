//! Repositories over the JSON collection files.
//!
//! Each repository owns exactly one [`crate::JsonStore`]; nothing else
//! reads or writes its file.

pub mod contact_repo;
pub mod project_repo;

pub use contact_repo::ContactRepo;
pub use project_repo::ProjectRepo;
