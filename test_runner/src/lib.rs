//! Out-of-process execution of the grading suite.
//!
//! One grading request maps to one [`GradeInvocation`]: an isolated working
//! directory, one child process bounded by a wall-clock timeout, and the
//! report file the suite leaves behind. Nothing here is shared between
//! concurrent invocations.

pub mod runner;
pub mod workspace;

pub use runner::{GradeInvocation, run};
pub use workspace::Workspace;
