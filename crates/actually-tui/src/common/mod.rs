//! Shared building blocks for the TUI.

mod task;
mod wrap;

pub use task::{TaskId, TaskSeq, TaskState};
pub use wrap::{WrapMode, line_width, wrap_line};
