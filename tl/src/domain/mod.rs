//! Domain types for TaskList
//!
//! `Task` is the only record; the ordered `Vec<Task>` owned by the editor is
//! the source of truth for a session.

mod id;
mod task;

pub use id::{IdResolver, SHORT_ID_LEN, TaskId, generate_task_id, short_id};
pub use task::{Task, iso_millis};
