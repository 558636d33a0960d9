//! Domain logic for the portfolio catalog.
//!
//! Nothing in this crate touches the filesystem or the network; the
//! persistence, asset, and HTTP layers build on these types and rules.

pub mod contact;
pub mod error;
pub mod image_ref;
pub mod ordering;
pub mod rate_limit;
pub mod roles;
pub mod sanitize;
pub mod transcode;
pub mod types;
