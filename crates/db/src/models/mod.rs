//! Persisted record types and their input DTOs.

pub mod contact;
pub mod project;
