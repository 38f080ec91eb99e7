//! Grading domain logic: the task catalog, filter resolution, report parsing
//! and reward reconciliation.
//!
//! Everything in this crate is independent of the HTTP layer and of the
//! concrete storage backend; persistence goes through the
//! [`traits::store::RewardStore`] collaborator implemented elsewhere.

pub mod catalog;
pub mod error;
pub mod reconciler;
pub mod report;
pub mod resolver;
pub mod traits;

pub use catalog::{Catalog, TaskDescriptor};
pub use error::GraderError;
pub use reconciler::{ReconcileSummary, TestRecord, reconcile};
pub use report::{TestOutcomeMap, parse_report};
pub use resolver::{DEFAULT_FILTER, resolve, resolve_with};
pub use traits::store::RewardStore;
