use thiserror::Error;

/// Errors surfaced by the grading domain.
///
/// The runner and parser deliberately do not appear here: both degrade at
/// their own boundary (no report / empty outcome map) instead of propagating.
#[derive(Debug, Error)]
pub enum GraderError {
    /// The external task manifest could not be read or parsed.
    #[error("failed to load task manifest: {0}")]
    Manifest(String),

    /// A storage collaborator call failed.
    #[error("storage error: {0}")]
    Store(String),
}
