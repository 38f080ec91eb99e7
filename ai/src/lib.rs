//! AI collaborator: quest-flavoured rephrasing of task instructions.
//!
//! The grading core never calls this; it only consumes instruction text that
//! may have been rephrased here before being handed out.

pub mod cache;
pub mod rephrase;

pub use cache::RephraseCache;
pub use rephrase::Rephraser;
