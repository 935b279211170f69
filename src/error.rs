//! Content errors

use thiserror::Error;

/// Errors raised when a content record breaks one of its invariants
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("missing title in {source_path}")]
    MissingTitle { source_path: String },

    #[error("invalid date `{value}`: expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("invalid site-relative url `{url}`")]
    InvalidUrl { url: String },
}
