//! # Task abstractions.
//!
//! - [`Task`] - trait for long-running async work that stops when its lifetime is cancelled
//! - [`TaskFn`] - closure-backed implementation
//! - [`TaskRef`] - shared handle (`Arc<dyn Task>`) accepted by the supervisor

mod task;
mod task_fn;

pub use task::{Task, TaskRef};
pub use task_fn::TaskFn;
